//! Learner stage representation
//!
//! A learner is always at exactly one stage. Stages are parsed once when a
//! record is loaded and matched exhaustively afterwards; the string form only
//! exists at the persistence boundary.

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use crate::utils::errors::PjotinhaError;

/// Profile attribute collected during onboarding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    Name,
    Course,
    Term,
    Interests,
}

impl ProfileField {
    /// Collection order
    pub const ALL: [ProfileField; 4] = [
        ProfileField::Name,
        ProfileField::Course,
        ProfileField::Term,
        ProfileField::Interests,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileField::Name => "name",
            ProfileField::Course => "course",
            ProfileField::Term => "term",
            ProfileField::Interests => "interests",
        }
    }

    /// The field collected after this one, if any
    pub fn next(&self) -> Option<ProfileField> {
        match self {
            ProfileField::Name => Some(ProfileField::Course),
            ProfileField::Course => Some(ProfileField::Term),
            ProfileField::Term => Some(ProfileField::Interests),
            ProfileField::Interests => None,
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node of the learner conversation state machine
///
/// `Lesson { module, part }` means part `part` of `module` is the next block
/// to deliver. `Quiz { module, question }` means question `question` has been
/// sent and is awaiting an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Start,
    Profile(ProfileField),
    Ready,
    Lesson { module: u32, part: u32 },
    Quiz { module: u32, question: u32 },
    Completed,
}

impl Stage {
    /// First stage of a module's lesson
    pub fn first_lesson(module: u32) -> Self {
        Stage::Lesson { module, part: 1 }
    }

    /// First stage of a module's quiz
    pub fn first_quiz(module: u32) -> Self {
        Stage::Quiz { module, question: 1 }
    }
}

impl Default for Stage {
    fn default() -> Self {
        Stage::Start
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Start => f.write_str("start"),
            Stage::Profile(field) => write!(f, "profile_{}", field),
            Stage::Ready => f.write_str("ready"),
            Stage::Lesson { module, part } => write!(f, "module_{}_{}", module, part),
            Stage::Quiz { module, question } => write!(f, "quiz_{}_{}", module, question),
            Stage::Completed => f.write_str("completed"),
        }
    }
}

impl FromStr for Stage {
    type Err = PjotinhaError;

    /// Parse a canonical stage string, or one written by the earlier
    /// Portuguese-keyed deployment (`perfil_nome`, `modulo_pdf_1_2`, ...)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PjotinhaError::InvalidStage(s.to_string());
        let raw = s.trim();

        let stage = match raw {
            "start" | "inicio" => Stage::Start,
            "profile_name" | "perfil_nome" => Stage::Profile(ProfileField::Name),
            "profile_course" | "perfil_curso" => Stage::Profile(ProfileField::Course),
            "profile_term" | "perfil_semestre" => Stage::Profile(ProfileField::Term),
            "profile_interests" | "profile_interesses" | "perfil_interesses" => {
                Stage::Profile(ProfileField::Interests)
            }
            "ready" | "pronto" => Stage::Ready,
            "completed" | "concluido" => Stage::Completed,
            _ => {
                if let Some(rest) = raw.strip_prefix("quiz_modulo_") {
                    let module = parse_index(rest).ok_or_else(invalid)?;
                    Stage::first_quiz(module)
                } else if let Some(rest) = raw.strip_prefix("quiz_") {
                    let (module, question) = parse_pair(rest).ok_or_else(invalid)?;
                    Stage::Quiz { module, question }
                } else if let Some(rest) = raw
                    .strip_prefix("module_")
                    .or_else(|| raw.strip_prefix("modulo_pdf_"))
                    .or_else(|| raw.strip_prefix("modulo_"))
                {
                    let (module, part) = parse_pair(rest).ok_or_else(invalid)?;
                    Stage::Lesson { module, part }
                } else {
                    return Err(invalid());
                }
            }
        };

        Ok(stage)
    }
}

/// Parse a 1-based index
fn parse_index(s: &str) -> Option<u32> {
    s.parse::<u32>().ok().filter(|n| *n >= 1)
}

/// Parse `<a>_<b>` into two 1-based indices
fn parse_pair(s: &str) -> Option<(u32, u32)> {
    let (a, b) = s.split_once('_')?;
    Some((parse_index(a)?, parse_index(b)?))
}

impl Serialize for Stage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Stage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
