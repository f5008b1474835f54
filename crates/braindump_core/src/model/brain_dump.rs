//! Brain dump domain model.
//!
//! # Responsibility
//! - Define the record created from user-submitted free-form text.
//! - Define the structured `Analysis` derived from that text.
//!
//! # Invariants
//! - `id` and `user_id` never change after creation.
//! - `processed` only ever moves from `false` to `true`.
//! - While `processed == false`, every analysis field holds its default value.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a brain dump record.
pub type BrainDumpId = Uuid;

const FALLBACK_SUMMARY: &str =
    "I can see you have a lot on your mind. Let's break this down into manageable pieces.";
const FALLBACK_WHAT_MATTERS: &[&str] = &["Take a deep breath", "Focus on one thing at a time"];
const FALLBACK_WHAT_DOESNT: &[&str] = &["Overwhelming yourself with everything at once"];
const FALLBACK_ACTIONABLE_FOCUS: &str = "Choose the most important item and spend 15 minutes on it";

/// Opaque identity of the authenticated owner, as issued by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Structured analysis of one brain dump.
///
/// Field names serialize in camelCase, which is also the shape the language
/// model is asked to answer with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// Short empathetic summary.
    pub summary: String,
    /// Points that deserve attention, most important first.
    pub what_matters: Vec<String>,
    /// Points that can be let go for now.
    pub what_doesnt: Vec<String>,
    /// Exactly one concrete next step.
    pub actionable_focus: String,
}

impl Analysis {
    /// Returns the fixed analysis written when model output is unavailable.
    ///
    /// The content is identical on every call.
    pub fn fallback() -> Self {
        Self {
            summary: FALLBACK_SUMMARY.to_string(),
            what_matters: FALLBACK_WHAT_MATTERS
                .iter()
                .map(|item| item.to_string())
                .collect(),
            what_doesnt: FALLBACK_WHAT_DOESNT
                .iter()
                .map(|item| item.to_string())
                .collect(),
            actionable_focus: FALLBACK_ACTIONABLE_FOCUS.to_string(),
        }
    }

    /// Returns whether every field still holds its default (empty) value.
    pub fn is_empty(&self) -> bool {
        self.summary.is_empty()
            && self.what_matters.is_empty()
            && self.what_doesnt.is_empty()
            && self.actionable_focus.is_empty()
    }
}

/// Validation failures for `BrainDump` state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrainDumpValidationError {
    /// Owner identity is blank.
    EmptyOwner,
    /// Unprocessed record carries analysis content.
    PartialAnalysis(BrainDumpId),
}

impl Display for BrainDumpValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyOwner => write!(f, "brain dump owner must not be empty"),
            Self::PartialAnalysis(id) => {
                write!(f, "unprocessed brain dump {id} carries analysis fields")
            }
        }
    }
}

impl Error for BrainDumpValidationError {}

/// Canonical brain dump record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrainDump {
    pub id: BrainDumpId,
    pub user_id: UserId,
    /// Raw user text; never rewritten after creation.
    pub original_text: String,
    #[serde(flatten)]
    pub analysis: Analysis,
    pub processed: bool,
    /// Unix epoch milliseconds assigned by the store. Zero until persisted.
    pub created_at: i64,
}

impl BrainDump {
    /// Creates an unprocessed record with a generated ID.
    ///
    /// # Invariants
    /// - Analysis fields start empty.
    /// - `processed` starts as `false`.
    pub fn new(user_id: UserId, original_text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            original_text: original_text.into(),
            analysis: Analysis::default(),
            processed: false,
            created_at: 0,
        }
    }

    /// Returns whether `user_id` owns this record.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    /// Checks record-level invariants.
    ///
    /// # Errors
    /// - `EmptyOwner` when `user_id` is blank.
    /// - `PartialAnalysis` when an unprocessed record has analysis content.
    pub fn validate(&self) -> Result<(), BrainDumpValidationError> {
        if self.user_id.as_str().trim().is_empty() {
            return Err(BrainDumpValidationError::EmptyOwner);
        }
        if !self.processed && !self.analysis.is_empty() {
            return Err(BrainDumpValidationError::PartialAnalysis(self.id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Analysis, BrainDump, BrainDumpValidationError, UserId};

    #[test]
    fn new_record_is_unprocessed_and_empty() {
        let record = BrainDump::new(UserId::from("user-1"), "too much to do");
        assert!(!record.processed);
        assert!(record.analysis.is_empty());
        assert_eq!(record.original_text, "too much to do");
        assert!(record.validate().is_ok());
    }

    #[test]
    fn fallback_is_stable_and_populated() {
        let first = Analysis::fallback();
        let second = Analysis::fallback();
        assert_eq!(first, second);
        assert!(!first.is_empty());
        assert_eq!(first.what_matters.len(), 2);
        assert_eq!(first.what_doesnt.len(), 1);
    }

    #[test]
    fn validate_rejects_partial_analysis_on_unprocessed_record() {
        let mut record = BrainDump::new(UserId::from("user-1"), "text");
        record.analysis.summary = "half written".to_string();
        assert_eq!(
            record.validate(),
            Err(BrainDumpValidationError::PartialAnalysis(record.id))
        );

        record.processed = true;
        assert!(record.validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_owner() {
        let record = BrainDump::new(UserId::from("  "), "text");
        assert_eq!(record.validate(), Err(BrainDumpValidationError::EmptyOwner));
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let record = BrainDump::new(UserId::from("user-1"), "text");
        let json = serde_json::to_value(&record).expect("serialize brain dump");
        assert_eq!(json["userId"], "user-1");
        assert_eq!(json["originalText"], "text");
        assert!(json["whatMatters"].as_array().expect("array").is_empty());
        assert_eq!(json["actionableFocus"], "");
        assert_eq!(json["processed"], false);
    }
}
