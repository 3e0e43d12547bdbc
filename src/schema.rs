use teloxide::{
    dispatching::{UpdateFilterExt, UpdateHandler},
    dptree,
    types::Update,
};

use crate::{commands::Command, runner};

/// Commands and plain messages both go through the quiz machine; the state
/// decides what they mean.
pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    let command_handler = teloxide::filter_command::<Command, _>().endpoint(runner::command);

    Update::filter_message()
        .branch(command_handler)
        .branch(dptree::endpoint(runner::message))
}
