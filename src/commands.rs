use teloxide::utils::command::BotCommands;

use crate::machine::Input;

#[derive(Debug, Clone, PartialEq, Eq, BotCommands)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "Start bot")]
    Start,
    #[command(description = "Start solving tasks")]
    Solve,
}

impl From<Command> for Input {
    fn from(command: Command) -> Self {
        match command {
            Command::Start => Input::Start,
            Command::Solve => Input::Solve,
        }
    }
}
