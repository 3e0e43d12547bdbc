use std::{fmt, path::Path, path::PathBuf};

use serde::Deserialize;

/// Exam track a variant belongs to. Banks keyed by exam type ask the user
/// to pick one before a variant is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamType {
    Oge,
    Ege,
}

impl ExamType {
    pub const ALL: [ExamType; 2] = [ExamType::Oge, ExamType::Ege];

    /// Button label shown to the user.
    pub fn label(&self) -> &'static str {
        match self {
            ExamType::Oge => "ОГЭ",
            ExamType::Ege => "ЕГЭ",
        }
    }

    /// Case-insensitive match of user text against the exam labels.
    pub fn from_label(text: &str) -> Option<ExamType> {
        let text = text.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|exam| exam.label().to_lowercase() == text)
    }
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExamType::Oge => write!(f, "oge"),
            ExamType::Ege => write!(f, "ege"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Task {
    #[serde(rename = "text")]
    prompt: String,
    #[serde(rename = "path", default)]
    image: Option<PathBuf>,
    answer: String,
}

/// One complete exam attempt: tasks are presented in order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Variant {
    tasks: Vec<Task>,
}

impl Task {
    pub fn new(prompt: impl Into<String>, answer: impl Into<String>, image: Option<PathBuf>) -> Self {
        Self {
            prompt: prompt.into(),
            image,
            answer: answer.into(),
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn image(&self) -> Option<&Path> {
        self.image.as_deref()
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }
}

impl Variant {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, idx: usize) -> Option<&Task> {
        self.tasks.get(idx)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
