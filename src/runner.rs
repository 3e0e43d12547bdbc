use std::{error::Error, sync::Arc};

use teloxide::{
    payloads::{SendMessageSetters, SendPhotoSetters},
    prelude::Requester,
    types::{ChatId, InputFile, Message, ParseMode},
    Bot,
};
use tracing::{error, info, instrument};

use crate::{
    commands::Command,
    keyboard::reply_markup,
    machine::{Input, QuizMachine},
    render::{Body, Markup, Outbound},
    session::SessionStore,
    HandlerResult, SessionStorage,
};

pub type DeliveryResult = Result<(), Box<dyn Error + Send + Sync + 'static>>;

/// Sends rendered replies to a chat.
#[allow(async_fn_in_trait)]
pub trait Deliver {
    async fn deliver(&self, chat_id: ChatId, reply: &Outbound) -> DeliveryResult;
}

impl Deliver for Bot {
    async fn deliver(&self, chat_id: ChatId, reply: &Outbound) -> DeliveryResult {
        let markup = reply_markup(&reply.keyboard);
        let parse_mode = match reply.markup {
            Markup::Html => Some(ParseMode::Html),
            Markup::Plain => None,
        };

        match &reply.body {
            Body::Text(text) => {
                let mut request = self.send_message(chat_id, text.clone());
                if let Some(markup) = markup {
                    request = request.reply_markup(markup);
                }
                if let Some(parse_mode) = parse_mode {
                    request = request.parse_mode(parse_mode);
                }
                request.await?;
            }
            Body::Photo { path, caption } => {
                let mut request = self
                    .send_photo(chat_id, InputFile::file(path.clone()))
                    .caption(caption.clone());
                if let Some(markup) = markup {
                    request = request.reply_markup(markup);
                }
                if let Some(parse_mode) = parse_mode {
                    request = request.parse_mode(parse_mode);
                }
                request.await?;
            }
        }

        Ok(())
    }
}

#[instrument(level = "info", skip_all, fields(chat_id = %msg.chat.id, ?command))]
pub(crate) async fn command(
    bot: Bot,
    msg: Message,
    command: Command,
    sessions: Arc<SessionStorage>,
    machine: Arc<QuizMachine>,
) -> HandlerResult {
    process(&bot, msg.chat.id, command.into(), &sessions, &machine).await
}

#[instrument(level = "info", skip_all, fields(chat_id = %msg.chat.id))]
pub(crate) async fn message(
    bot: Bot,
    msg: Message,
    sessions: Arc<SessionStorage>,
    machine: Arc<QuizMachine>,
) -> HandlerResult {
    let input = match msg.text() {
        Some(text) => Input::Text(text.to_owned()),
        None => Input::Unsupported,
    };
    process(&bot, msg.chat.id, input, &sessions, &machine).await
}

/// Runs one input through the machine. The new state is stored only after
/// every reply went out; a failed send keeps the previous state.
pub async fn process<D: Deliver, S: SessionStore>(
    courier: &D,
    chat_id: ChatId,
    input: Input,
    sessions: &S,
    machine: &QuizMachine,
) -> HandlerResult {
    let state = sessions.get_state(chat_id).await?;
    let step = machine.handle(&state, &input, &mut rand::thread_rng());

    for reply in &step.replies {
        if let Err(e) = courier.deliver(chat_id, reply).await {
            error!(
                "Failed to deliver reply to {}, keeping state '{}': {}",
                chat_id,
                state.name(),
                e
            );
            return Err(e);
        }
    }

    if state != step.next {
        info!(
            "{}: '{}' -> '{}'",
            chat_id,
            state.name(),
            step.next.name()
        );
    }
    sessions.set_state(chat_id, step.next).await?;

    Ok(())
}
