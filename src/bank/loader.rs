use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use super::quiz::{ExamType, Variant};

#[derive(Debug, Error)]
pub enum BankError {
    #[error("failed to read question bank {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed question bank: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("question bank has no variants")]
    Empty,
    #[error("exam type '{0}' has no variants")]
    EmptyBucket(ExamType),
    #[error("variant №{variant} of '{bucket}' has no tasks")]
    EmptyVariant { bucket: String, variant: usize },
    #[error("image {} of task №{task} in variant №{variant} of '{bucket}' not found", .path.display())]
    MissingImage {
        bucket: String,
        variant: usize,
        task: usize,
        path: PathBuf,
    },
}

/// Static collection of exam variants, loaded once at startup.
///
/// The bank file is either a plain list of variants, or an object keyed by
/// exam type. Only the keyed form asks the user to choose an exam type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum QuestionBank {
    Single(Vec<Variant>),
    ByExamType(BTreeMap<ExamType, Vec<Variant>>),
}

impl QuestionBank {
    #[instrument(level = "info")]
    pub async fn load(path: &Path) -> Result<Self, BankError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| BankError::Read {
                path: path.to_owned(),
                source,
            })?;
        let bank = Self::from_json(&raw)?;
        bank.check_images().await?;

        tracing::info!(
            "Loaded question bank from {}: {} variants",
            path.display(),
            bank.buckets().iter().map(|(_, variants)| variants.len()).sum::<usize>()
        );
        Ok(bank)
    }

    /// Parses and validates the bank without touching image files.
    pub fn from_json(raw: &str) -> Result<Self, BankError> {
        let bank: QuestionBank = serde_json::from_str(raw)?;
        bank.validate()?;
        Ok(bank)
    }

    pub fn requires_exam_type(&self) -> bool {
        matches!(self, QuestionBank::ByExamType(_))
    }

    /// Exam types a user can choose from, in display order.
    pub fn exam_types(&self) -> Vec<ExamType> {
        match self {
            QuestionBank::Single(_) => Vec::new(),
            QuestionBank::ByExamType(buckets) => buckets.keys().copied().collect(),
        }
    }

    pub fn bucket(&self, exam_type: Option<ExamType>) -> Option<&[Variant]> {
        match (self, exam_type) {
            (QuestionBank::Single(variants), None) => Some(variants),
            (QuestionBank::ByExamType(buckets), Some(exam_type)) => {
                buckets.get(&exam_type).map(Vec::as_slice)
            }
            _ => None,
        }
    }

    pub fn variant(&self, exam_type: Option<ExamType>, idx: usize) -> Option<&Variant> {
        self.bucket(exam_type)?.get(idx)
    }

    fn buckets(&self) -> Vec<(Option<ExamType>, &[Variant])> {
        match self {
            QuestionBank::Single(variants) => vec![(None, variants.as_slice())],
            QuestionBank::ByExamType(buckets) => buckets
                .iter()
                .map(|(exam_type, variants)| (Some(*exam_type), variants.as_slice()))
                .collect(),
        }
    }

    fn validate(&self) -> Result<(), BankError> {
        let buckets = self.buckets();
        if buckets.iter().all(|(_, variants)| variants.is_empty()) {
            return Err(BankError::Empty);
        }

        for (exam_type, variants) in buckets {
            if let (Some(exam_type), true) = (exam_type, variants.is_empty()) {
                return Err(BankError::EmptyBucket(exam_type));
            }
            if let Some(idx) = variants.iter().position(Variant::is_empty) {
                return Err(BankError::EmptyVariant {
                    bucket: bucket_name(exam_type),
                    variant: idx + 1,
                });
            }
        }

        Ok(())
    }

    async fn check_images(&self) -> Result<(), BankError> {
        for (exam_type, variants) in self.buckets() {
            for (variant_idx, variant) in variants.iter().enumerate() {
                for (task_idx, task) in variant.tasks().iter().enumerate() {
                    let Some(image) = task.image() else {
                        continue;
                    };
                    if !tokio::fs::try_exists(image).await.unwrap_or(false) {
                        return Err(BankError::MissingImage {
                            bucket: bucket_name(exam_type),
                            variant: variant_idx + 1,
                            task: task_idx + 1,
                            path: image.to_owned(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

fn bucket_name(exam_type: Option<ExamType>) -> String {
    exam_type
        .map(|exam_type| exam_type.to_string())
        .unwrap_or_else(|| "default".to_owned())
}
