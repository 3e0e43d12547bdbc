use state::QuizState;
use teloxide::dispatching::dialogue::InMemStorage;

pub mod bank;
pub mod commands;
pub mod config;
pub mod keyboard;
pub mod machine;
pub mod render;
pub mod runner;
pub mod schema;
pub mod score;
pub mod session;
pub mod state;

pub type SessionStorage = InMemStorage<QuizState>;
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;
