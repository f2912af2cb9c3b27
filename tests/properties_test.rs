//! Property-based tests for pagination, the course plan and onboarding

mod helpers;

use std::sync::Arc;
use helpers::*;
use pjotinha::models::AnswerLetter;
use pjotinha::services::content::paginate_lesson;
use pjotinha::state::{CoursePlan, Stage};
use proptest::prelude::*;

fn lesson_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::collection::vec("[a-zA-Zçãé]{1,10}", 0..12).prop_map(|words| words.join(" ")),
        0..8,
    )
    .prop_map(|paragraphs| paragraphs.join("\n\n"))
}

fn any_stage() -> impl Strategy<Value = Stage> {
    prop_oneof![
        Just(Stage::Start),
        Just(Stage::Ready),
        Just(Stage::Completed),
        (1u32..6, 1u32..8).prop_map(|(module, part)| Stage::Lesson { module, part }),
        (1u32..6, 1u32..6).prop_map(|(module, question)| Stage::Quiz { module, question }),
    ]
}

proptest! {
    #[test]
    fn pagination_is_deterministic_and_loses_no_words(text in lesson_text(), parts in 1u32..6) {
        let mut words = Vec::new();
        for part in 1..=parts {
            let block = paginate_lesson(&text, part, parts).unwrap();
            let again = paginate_lesson(&text, part, parts).unwrap();
            prop_assert_eq!(&block.text, &again.text);
            prop_assert_eq!(block.is_last, part == parts);
            if block.text != "..." {
                words.extend(block.text.split_whitespace().map(str::to_string));
            }
        }

        let expected: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        prop_assert_eq!(words, expected);
    }

    #[test]
    fn pagination_rejects_parts_out_of_range(text in lesson_text(), parts in 1u32..6) {
        prop_assert!(paginate_lesson(&text, 0, parts).is_err());
        prop_assert!(paginate_lesson(&text, parts + 1, parts).is_err());
    }

    #[test]
    fn normalized_stages_stay_inside_the_plan(stage in any_stage()) {
        let plan = CoursePlan::default();
        match plan.normalize(stage) {
            Stage::Lesson { module, part } => {
                prop_assert!((1..=plan.module_count).contains(&module));
                prop_assert!((1..=plan.parts_per_module).contains(&part));
            }
            Stage::Quiz { module, question } => {
                prop_assert!((1..=plan.module_count).contains(&module));
                prop_assert!((1..=plan.questions_per_module).contains(&question));
            }
            other => prop_assert!(other == stage || other == Stage::Completed),
        }
    }

    #[test]
    fn answer_letters_parse_in_any_case(index in 0usize..5, lower in any::<bool>(), suffix in prop_oneof![Just(""), Just(")"), Just(".")]) {
        let letter = AnswerLetter::from_index(index).unwrap();
        let raw = if lower {
            letter.as_char().to_ascii_lowercase()
        } else {
            letter.as_char()
        };
        prop_assert_eq!(AnswerLetter::parse_answer(&format!(" {}{} ", raw, suffix)), Some(letter));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn any_four_profile_messages_complete_onboarding(
        answers in prop::collection::vec("[a-zA-Z0-9 ]{0,20}[a-zA-Z0-9]", 4),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        runtime.block_on(async {
            let ctx = TestContext::new(Arc::new(FailingCompletion));
            ctx.send(SENDER, "oi").await;
            for answer in &answers {
                ctx.send(SENDER, answer).await;
            }

            let state = ctx.state(SENDER).await;
            assert_eq!(state.stage, Stage::Ready);
            assert!(state.profile.is_complete());
            assert_eq!(state.score, 0);
        });
    }
}
