use std::error::Error;
use std::sync::Arc;

use rustexambot::bank::QuestionBank;
use rustexambot::commands::Command;
use rustexambot::config::Settings;
use rustexambot::machine::QuizMachine;
use rustexambot::schema::schema;
use rustexambot::SessionStorage;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks::{self, Options};
use teloxide::utils::command::BotCommands;
use tracing_log::LogTracer;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let settings = Settings::from_env()?;
    init_tracing(&settings.log_level)?;
    tracing::debug!("{:?}", settings);

    let bank = QuestionBank::load(&settings.question_bank).await?;
    let machine = Arc::new(QuizMachine::new(bank, settings.results_style));

    let bot = Bot::new(settings.teloxide_token.clone());
    bot.set_my_commands(Command::bot_commands()).await?;
    tracing::info!("Starting bot...");

    let mut dispatcher = Dispatcher::builder(bot.clone(), schema())
        .dependencies(dptree::deps![SessionStorage::new(), machine])
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred in the dispatcher",
        ))
        .enable_ctrlc_handler()
        .build();

    match settings.webhook {
        Some(webhook) => {
            tracing::info!("Receiving updates via webhook at {}", webhook.url);
            let listener = webhooks::axum(bot, Options::new(webhook.addr, webhook.url)).await?;
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await
        }
        None => dispatcher.dispatch().await,
    }

    Ok(())
}

fn init_tracing(directives: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    // teloxide logs through `log`
    LogTracer::init()?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(directives)?)
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .log_internal_errors(true)
        .with_line_number(true)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}
