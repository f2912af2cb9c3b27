//! Stage transition table
//!
//! Pure functions deciding what an inbound message means at a given stage
//! and which stage follows. Nothing here performs I/O; the orchestrator
//! produces the reply text and persists the result.

use crate::config::{ContentConfig, FlowConfig, Settings};
use crate::models::AnswerLetter;
use crate::state::stage::{ProfileField, Stage};
use crate::utils::helpers::{fold_keyword, folded_words};

/// Shape of the course: how many modules, lesson parts and quiz questions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoursePlan {
    pub module_count: u32,
    pub parts_per_module: u32,
    pub questions_per_module: u32,
}

impl Default for CoursePlan {
    fn default() -> Self {
        Self {
            module_count: 3,
            parts_per_module: 4,
            questions_per_module: 3,
        }
    }
}

impl From<&ContentConfig> for CoursePlan {
    fn from(config: &ContentConfig) -> Self {
        Self {
            module_count: config.module_count.max(1),
            parts_per_module: config.parts_per_module.max(1),
            questions_per_module: config.questions_per_module.max(1),
        }
    }
}

impl CoursePlan {
    /// Map a stage that lies outside this plan onto the nearest valid one
    ///
    /// Records written under a larger plan keep moving forward instead of
    /// pointing at a part or question that no longer exists.
    pub fn normalize(&self, stage: Stage) -> Stage {
        match stage {
            Stage::Lesson { module, .. } | Stage::Quiz { module, .. } if module > self.module_count => {
                Stage::Completed
            }
            Stage::Lesson { module, part } if part > self.parts_per_module => Stage::first_quiz(module),
            Stage::Quiz { module, question } if question > self.questions_per_module => {
                self.next_module(module)
            }
            other => other,
        }
    }

    /// Stage after delivering lesson part `part` of `module`
    pub fn after_lesson(&self, module: u32, part: u32) -> Stage {
        if part >= self.parts_per_module {
            Stage::first_quiz(module)
        } else {
            Stage::Lesson { module, part: part + 1 }
        }
    }

    /// Stage after question `question` of `module` has been answered
    pub fn after_quiz(&self, module: u32, question: u32) -> Stage {
        if question >= self.questions_per_module {
            self.next_module(module)
        } else {
            Stage::Quiz { module, question: question + 1 }
        }
    }

    fn next_module(&self, module: u32) -> Stage {
        if module >= self.module_count {
            Stage::Completed
        } else {
            Stage::first_lesson(module + 1)
        }
    }
}

/// Stage following the collection of `field`
pub fn next_profile_stage(field: ProfileField) -> Stage {
    match field.next() {
        Some(next) => Stage::Profile(next),
        None => Stage::Ready,
    }
}

/// Keyword sets, stored folded (lowercase, accents removed)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keywords {
    start: Vec<String>,
    advance: Vec<String>,
}

impl Keywords {
    pub fn new<S: AsRef<str>>(start: &[S], advance: &[S]) -> Self {
        let fold = |words: &[S]| -> Vec<String> {
            words
                .iter()
                .map(|w| fold_keyword(w.as_ref().trim()))
                .filter(|w| !w.is_empty())
                .collect()
        };

        Self {
            start: fold(start),
            advance: fold(advance),
        }
    }

    /// Message asks to start the course
    pub fn is_start(&self, text: &str) -> bool {
        contains_any(text, &self.start)
    }

    /// Message asks for the next lesson block
    pub fn is_continue(&self, text: &str) -> bool {
        contains_any(text, &self.advance)
    }
}

impl From<&FlowConfig> for Keywords {
    fn from(config: &FlowConfig) -> Self {
        Self::new(&config.start_keywords, &config.continue_keywords)
    }
}

impl Default for Keywords {
    fn default() -> Self {
        Self::from(&Settings::default().flow)
    }
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    folded_words(text).iter().any(|word| keywords.contains(word))
}

/// What an inbound message means at the learner's current stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// First contact, reply with the greeting whatever was said
    Greet,
    CollectProfile(ProfileField),
    StartCourse,
    DeliverLesson { module: u32, part: u32 },
    AnswerQuiz { module: u32, question: u32, letter: AnswerLetter },
    /// Message in a quiz stage that is not a single A-E letter
    RepromptQuiz { module: u32, question: u32 },
    /// No stage rule applies; answered by the open-domain assistant
    Fallback,
}

/// Dispatch a message against a (normalized) stage
pub fn route(stage: Stage, text: &str, keywords: &Keywords) -> Route {
    match stage {
        Stage::Start => Route::Greet,
        Stage::Profile(field) => Route::CollectProfile(field),
        Stage::Ready if keywords.is_start(text) => Route::StartCourse,
        Stage::Lesson { module, part } if keywords.is_continue(text) => Route::DeliverLesson { module, part },
        Stage::Quiz { module, question } => match AnswerLetter::parse_answer(text) {
            Some(letter) => Route::AnswerQuiz { module, question, letter },
            None => Route::RepromptQuiz { module, question },
        },
        Stage::Ready | Stage::Lesson { .. } | Stage::Completed => Route::Fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> CoursePlan {
        CoursePlan::default()
    }

    #[test]
    fn test_any_first_message_greets() {
        let keywords = Keywords::default();
        for text in ["oi", "continuar", "A", "qual o preço?"] {
            assert_eq!(route(Stage::Start, text, &keywords), Route::Greet);
        }
    }

    #[test]
    fn test_profile_chain() {
        assert_eq!(next_profile_stage(ProfileField::Name), Stage::Profile(ProfileField::Course));
        assert_eq!(next_profile_stage(ProfileField::Course), Stage::Profile(ProfileField::Term));
        assert_eq!(next_profile_stage(ProfileField::Term), Stage::Profile(ProfileField::Interests));
        assert_eq!(next_profile_stage(ProfileField::Interests), Stage::Ready);
    }

    #[test]
    fn test_ready_needs_start_keyword() {
        let keywords = Keywords::default();
        assert_eq!(route(Stage::Ready, "Sim, vamos!", &keywords), Route::StartCourse);
        assert_eq!(route(Stage::Ready, "COMEÇAR", &keywords), Route::StartCourse);
        assert_eq!(route(Stage::Ready, "o que é MEI?", &keywords), Route::Fallback);
    }

    #[test]
    fn test_keywords_match_whole_words_only() {
        let keywords = Keywords::default();
        assert!(!keywords.is_start("simples nacional"));
        assert!(keywords.is_continue("pode avançar"));
        assert!(keywords.is_continue("Próximo"));
    }

    #[test]
    fn test_lesson_routes() {
        let keywords = Keywords::default();
        let stage = Stage::Lesson { module: 1, part: 2 };
        assert_eq!(route(stage, "continuar", &keywords), Route::DeliverLesson { module: 1, part: 2 });
        assert_eq!(route(stage, "e se eu não tiver sócio?", &keywords), Route::Fallback);
    }

    #[test]
    fn test_quiz_routes() {
        let keywords = Keywords::default();
        let stage = Stage::Quiz { module: 2, question: 1 };
        assert_eq!(
            route(stage, "b", &keywords),
            Route::AnswerQuiz { module: 2, question: 1, letter: AnswerLetter::B }
        );
        assert_eq!(route(stage, "F", &keywords), Route::RepromptQuiz { module: 2, question: 1 });
        assert_eq!(route(stage, "continuar", &keywords), Route::RepromptQuiz { module: 2, question: 1 });
    }

    #[test]
    fn test_completed_falls_back() {
        assert_eq!(route(Stage::Completed, "continuar", &Keywords::default()), Route::Fallback);
    }

    #[test]
    fn test_lesson_and_quiz_successors() {
        let plan = plan();
        assert_eq!(plan.after_lesson(1, 1), Stage::Lesson { module: 1, part: 2 });
        assert_eq!(plan.after_lesson(1, 4), Stage::first_quiz(1));
        assert_eq!(plan.after_quiz(1, 2), Stage::Quiz { module: 1, question: 3 });
        assert_eq!(plan.after_quiz(1, 3), Stage::first_lesson(2));
        assert_eq!(plan.after_quiz(3, 3), Stage::Completed);
    }

    #[test]
    fn test_normalize_out_of_plan_stages() {
        let plan = plan();
        assert_eq!(plan.normalize(Stage::Lesson { module: 1, part: 9 }), Stage::first_quiz(1));
        assert_eq!(plan.normalize(Stage::Quiz { module: 1, question: 7 }), Stage::first_lesson(2));
        assert_eq!(plan.normalize(Stage::Quiz { module: 3, question: 7 }), Stage::Completed);
        assert_eq!(plan.normalize(Stage::Lesson { module: 5, part: 1 }), Stage::Completed);
        assert_eq!(plan.normalize(Stage::Ready), Stage::Ready);
        assert_eq!(
            plan.normalize(Stage::Lesson { module: 2, part: 3 }),
            Stage::Lesson { module: 2, part: 3 }
        );
    }

    #[test]
    fn test_plan_from_config_never_zero() {
        let config = ContentConfig {
            modules_dir: "content".to_string(),
            module_count: 0,
            parts_per_module: 0,
            questions_per_module: 2,
        };
        let plan = CoursePlan::from(&config);
        assert_eq!(plan.module_count, 1);
        assert_eq!(plan.parts_per_module, 1);
        assert_eq!(plan.questions_per_module, 2);
    }
}
