pub mod loader;
pub mod quiz;

pub use loader::{BankError, QuestionBank};
pub use quiz::{ExamType, Task, Variant};
