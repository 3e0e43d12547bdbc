use crate::bank::Variant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mark {
    pub given: String,
    pub expected: String,
    pub correct: bool,
}

/// Per-item breakdown of an attempt. Only answered items are listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Results {
    marks: Vec<Mark>,
}

/// Answers are compared to the expected ones verbatim: no trimming, no case folding.
pub fn score(variant: &Variant, answers: &[String]) -> Results {
    let marks = variant
        .tasks()
        .iter()
        .zip(answers)
        .map(|(task, given)| Mark {
            given: given.clone(),
            expected: task.answer().to_owned(),
            correct: given == task.answer(),
        })
        .collect();

    Results { marks }
}

impl Results {
    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    pub fn correct_count(&self) -> usize {
        self.marks.iter().filter(|mark| mark.correct).count()
    }

    pub fn total_count(&self) -> usize {
        self.marks.len()
    }
}
