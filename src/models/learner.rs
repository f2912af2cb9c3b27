//! Learner model

use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::state::stage::{ProfileField, Stage};
use crate::utils::errors::PjotinhaError;

/// The four attributes collected during onboarding
///
/// Each field is written once, by its profile stage, and never edited
/// afterwards. Updates return a new value instead of mutating in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerProfile {
    pub name: Option<String>,
    pub course: Option<String>,
    pub term: Option<String>,
    pub interests: Option<String>,
}

impl LearnerProfile {
    pub fn get(&self, field: ProfileField) -> Option<&str> {
        match field {
            ProfileField::Name => self.name.as_deref(),
            ProfileField::Course => self.course.as_deref(),
            ProfileField::Term => self.term.as_deref(),
            ProfileField::Interests => self.interests.as_deref(),
        }
    }

    /// Copy of this profile with `field` set, unless it was already set
    pub fn with_field(&self, field: ProfileField, value: impl Into<String>) -> Self {
        if self.get(field).is_some() {
            return self.clone();
        }

        let mut next = self.clone();
        let value = Some(value.into());
        match field {
            ProfileField::Name => next.name = value,
            ProfileField::Course => next.course = value,
            ProfileField::Term => next.term = value,
            ProfileField::Interests => next.interests = value,
        }
        next
    }

    pub fn is_complete(&self) -> bool {
        ProfileField::ALL.iter().all(|f| self.get(*f).is_some())
    }
}

/// Multiple-choice answer letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerLetter {
    A,
    B,
    C,
    D,
    E,
}

impl AnswerLetter {
    pub const ALL: [AnswerLetter; 5] = [
        AnswerLetter::A,
        AnswerLetter::B,
        AnswerLetter::C,
        AnswerLetter::D,
        AnswerLetter::E,
    ];

    /// Letter for a zero-based option index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_char(&self) -> char {
        (b'A' + *self as u8) as char
    }

    /// Interpret a learner message as a quiz answer
    ///
    /// Only a single letter A-E counts, in either case, optionally wrapped
    /// as `(a)` or followed by `)` or `.` the way options are printed.
    pub fn parse_answer(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        let trimmed = trimmed.strip_prefix('(').unwrap_or(trimmed).trim_start();
        let trimmed = trimmed
            .strip_suffix(')')
            .or_else(|| trimmed.strip_suffix('.'))
            .unwrap_or(trimmed)
            .trim();

        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => None,
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(AnswerLetter::A),
            'B' => Some(AnswerLetter::B),
            'C' => Some(AnswerLetter::C),
            'D' => Some(AnswerLetter::D),
            'E' => Some(AnswerLetter::E),
            _ => None,
        }
    }
}

impl fmt::Display for AnswerLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for AnswerLetter {
    type Err = PjotinhaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => None,
        }
        .ok_or_else(|| PjotinhaError::InvalidInput(format!("Not an answer letter: {}", s)))
    }
}

/// The quiz question most recently sent to a learner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingQuestion {
    pub module: u32,
    pub number: u32,
    /// Full question text as delivered, re-sent verbatim on a malformed answer
    pub prompt: String,
    pub answer: AnswerLetter,
}

/// Pointer into paginated lesson content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonCursor {
    pub module: u32,
    pub part: u32,
}

/// Per-sender progress record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerState {
    pub sender_id: String,
    pub stage: Stage,
    pub profile: LearnerProfile,
    pub score: u32,
    pub pending_quiz: Option<PendingQuestion>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LearnerState {
    /// Fresh record for a sender seen for the first time
    pub fn new(sender_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            sender_id: sender_id.into(),
            stage: Stage::Start,
            profile: LearnerProfile::default(),
            score: 0,
            pending_quiz: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Lesson position, present only while a lesson is being delivered
    pub fn lesson_cursor(&self) -> Option<LessonCursor> {
        match self.stage {
            Stage::Lesson { module, part } => Some(LessonCursor { module, part }),
            _ => None,
        }
    }

    /// Expected answer letter for the question awaiting a reply
    pub fn pending_answer(&self) -> Option<AnswerLetter> {
        self.pending_quiz.as_ref().map(|q| q.answer)
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self
    }

    pub fn with_profile(mut self, profile: LearnerProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Score only ever moves up
    pub fn with_point(mut self) -> Self {
        self.score = self.score.saturating_add(1);
        self
    }

    pub fn with_pending(mut self, pending: Option<PendingQuestion>) -> Self {
        self.pending_quiz = pending;
        self
    }

    pub fn touched(mut self) -> Self {
        self.updated_at = Utc::now();
        self
    }

    /// True when `other` differs in anything a store needs to persist
    pub fn differs_from(&self, other: &LearnerState) -> bool {
        self.stage != other.stage
            || self.profile != other.profile
            || self.score != other.score
            || self.pending_quiz != other.pending_quiz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_starts_at_start() {
        let state = LearnerState::new("+1555");
        assert_eq!(state.stage, Stage::Start);
        assert_eq!(state.score, 0);
        assert!(state.lesson_cursor().is_none());
        assert!(state.pending_answer().is_none());
    }

    #[test]
    fn test_profile_fields_are_write_once() {
        let profile = LearnerProfile::default()
            .with_field(ProfileField::Name, "João")
            .with_field(ProfileField::Name, "Maria");
        assert_eq!(profile.name.as_deref(), Some("João"));
        assert!(!profile.is_complete());
    }

    #[test]
    fn test_profile_update_leaves_original_untouched() {
        let original = LearnerProfile::default();
        let updated = original.with_field(ProfileField::Course, "Administração");
        assert!(original.course.is_none());
        assert_eq!(updated.get(ProfileField::Course), Some("Administração"));
    }

    #[test]
    fn test_parse_answer() {
        assert_eq!(AnswerLetter::parse_answer("b"), Some(AnswerLetter::B));
        assert_eq!(AnswerLetter::parse_answer(" E "), Some(AnswerLetter::E));
        assert_eq!(AnswerLetter::parse_answer("c)"), Some(AnswerLetter::C));
        assert_eq!(AnswerLetter::parse_answer("A."), Some(AnswerLetter::A));
        assert_eq!(AnswerLetter::parse_answer("(a)"), Some(AnswerLetter::A));
        assert_eq!(AnswerLetter::parse_answer(" (D) "), Some(AnswerLetter::D));
        assert_eq!(AnswerLetter::parse_answer("(b"), Some(AnswerLetter::B));
        assert_eq!(AnswerLetter::parse_answer("()"), None);
        assert_eq!(AnswerLetter::parse_answer("F"), None);
        assert_eq!(AnswerLetter::parse_answer("ab"), None);
        assert_eq!(AnswerLetter::parse_answer("acho que é a B"), None);
        assert_eq!(AnswerLetter::parse_answer(""), None);
    }

    #[test]
    fn test_letter_indices() {
        assert_eq!(AnswerLetter::from_index(2), Some(AnswerLetter::C));
        assert_eq!(AnswerLetter::from_index(5), None);
        assert_eq!(AnswerLetter::D.index(), 3);
        assert_eq!(AnswerLetter::D.to_string(), "D");
    }

    #[test]
    fn test_lesson_cursor_follows_stage() {
        let state = LearnerState::new("+1555").with_stage(Stage::Lesson { module: 2, part: 3 });
        assert_eq!(state.lesson_cursor(), Some(LessonCursor { module: 2, part: 3 }));
    }
}
