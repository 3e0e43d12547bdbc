use crate::bank::ExamType;

/// Per-user progress through a chosen variant.
///
/// `task_index` always equals `answers.len()`: the only way forward is
/// [`Session::record_answer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    exam_type: Option<ExamType>,
    variant_index: usize,
    task_index: usize,
    answers: Vec<String>,
}

/// Partial update applied to a stored session. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionPatch {
    pub exam_type: Option<ExamType>,
    pub variant_index: Option<usize>,
    pub answers: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum QuizState {
    #[default]
    Idle,
    ChoosingExamType,
    Solving(Session),
    ConfirmingStop(Session),
}

impl Session {
    pub fn new(exam_type: Option<ExamType>, variant_index: usize) -> Self {
        Self {
            exam_type,
            variant_index,
            task_index: 0,
            answers: Vec::new(),
        }
    }

    pub fn exam_type(&self) -> Option<ExamType> {
        self.exam_type
    }

    pub fn variant_index(&self) -> usize {
        self.variant_index
    }

    pub fn task_index(&self) -> usize {
        self.task_index
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn record_answer(&mut self, answer: impl Into<String>) {
        self.answers.push(answer.into());
        self.task_index = self.answers.len();
    }

    pub fn apply(&mut self, patch: SessionPatch) {
        if let Some(exam_type) = patch.exam_type {
            self.exam_type = Some(exam_type);
        }
        if let Some(variant_index) = patch.variant_index {
            self.variant_index = variant_index;
        }
        if let Some(answers) = patch.answers {
            self.task_index = answers.len();
            self.answers = answers;
        }
    }
}

impl QuizState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            QuizState::Solving(session) | QuizState::ConfirmingStop(session) => Some(session),
            QuizState::Idle | QuizState::ChoosingExamType => None,
        }
    }

    /// Applies `patch` to the carried session. States without a session are
    /// returned unchanged.
    pub fn patched(self, patch: SessionPatch) -> Self {
        match self {
            QuizState::Solving(mut session) => {
                session.apply(patch);
                QuizState::Solving(session)
            }
            QuizState::ConfirmingStop(mut session) => {
                session.apply(patch);
                QuizState::ConfirmingStop(session)
            }
            other => other,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            QuizState::Idle => "idle",
            QuizState::ChoosingExamType => "choosing_exam_type",
            QuizState::Solving(_) => "solving",
            QuizState::ConfirmingStop(_) => "confirming_stop",
        }
    }
}
