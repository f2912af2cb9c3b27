//! Conversation orchestrator
//!
//! Turns one inbound `(sender, text)` pair into one outbound reply: loads
//! the learner, runs the transition table, picks fallbacks where an
//! external capability failed and persists the result.

use std::sync::Arc;
use tracing::{debug, error};
use crate::config::{LlmConfig, Settings};
use crate::config::validation::MAX_HISTORY_WINDOW;
use crate::i18n::I18n;
use crate::models::{AnswerLetter, ConversationEntry, LearnerState, PendingQuestion, Role};
use crate::services::content::{fallback_question, paginate_lesson, QuizQuestion};
use crate::services::{ChatTurn, CompletionRequest, ServiceFactory};
use crate::state::{next_profile_stage, route, CoursePlan, Keywords, ProfileField, Route, Stage};
use crate::storage::{LearnerStore, SenderLocks};
use crate::utils::errors::Result;
use crate::utils::logging::{
    log_fallback, log_inbound_message, log_persistence_failure, log_stage_transition,
};

/// Reply plus the learner state it leaves behind
#[derive(Debug, Clone)]
struct Outcome {
    reply: String,
    state: LearnerState,
}

impl Outcome {
    fn new(reply: String, state: LearnerState) -> Self {
        Self { reply, state }
    }
}

#[derive(Clone)]
pub struct ConversationOrchestrator {
    store: Arc<dyn LearnerStore>,
    locks: SenderLocks,
    services: ServiceFactory,
    plan: CoursePlan,
    keywords: Keywords,
    history_window: usize,
    llm: LlmConfig,
}

impl ConversationOrchestrator {
    pub fn new(settings: &Settings, store: Arc<dyn LearnerStore>, services: ServiceFactory) -> Self {
        Self {
            store,
            locks: SenderLocks::new(),
            services,
            plan: CoursePlan::from(&settings.content),
            keywords: Keywords::from(&settings.flow),
            history_window: settings.flow.history_window.clamp(1, MAX_HISTORY_WINDOW),
            llm: settings.llm.clone(),
        }
    }

    pub fn store(&self) -> &Arc<dyn LearnerStore> {
        &self.store
    }

    pub fn plan(&self) -> CoursePlan {
        self.plan
    }

    fn i18n(&self) -> &I18n {
        &self.services.i18n
    }

    /// Handle one inbound message and return the reply text
    ///
    /// Empty sender or body is answered with the invalid-input message and
    /// touches no state. Persistence failures after the reply is computed
    /// are logged and the reply is still returned.
    pub async fn handle_inbound(&self, sender_id: &str, body: &str) -> Result<String> {
        let sender_id = sender_id.trim();
        let text = body.trim();
        if sender_id.is_empty() || text.is_empty() {
            debug!("Rejecting inbound message with empty sender or body");
            return Ok(self.i18n().t("errors.invalid_input", None));
        }

        let _guard = self.locks.acquire(sender_id).await;

        let loaded = self.store.get_or_create(sender_id).await?;
        let current = loaded.clone().with_stage(self.plan.normalize(loaded.stage));
        log_inbound_message(sender_id, &current.stage.to_string(), text.chars().count());

        let learner_entry = ConversationEntry::learner(sender_id, text);
        let learner_logged = match self.store.append_entry(&learner_entry).await {
            Ok(()) => true,
            Err(e) => {
                log_persistence_failure(sender_id, "append_learner_entry", &e.to_string());
                false
            }
        };

        let outcome = self.apply(current, text, learner_logged).await;
        log_stage_transition(sender_id, &loaded.stage.to_string(), &outcome.state.stage.to_string());

        if outcome.state.differs_from(&loaded) {
            if let Err(e) = self.store.save(&outcome.state.clone().touched()).await {
                log_persistence_failure(sender_id, "save_learner", &e.to_string());
            }
        }

        let reply_entry = ConversationEntry::assistant(sender_id, outcome.reply.as_str());
        if let Err(e) = self.store.append_entry(&reply_entry).await {
            log_persistence_failure(sender_id, "append_assistant_entry", &e.to_string());
        }

        Ok(outcome.reply)
    }

    /// Run the transition table for one message
    async fn apply(&self, state: LearnerState, text: &str, learner_logged: bool) -> Outcome {
        match route(state.stage, text, &self.keywords) {
            Route::Greet => {
                let reply = self.i18n().t("greeting", None);
                Outcome::new(reply, state.with_stage(Stage::Profile(ProfileField::Name)))
            }
            Route::CollectProfile(field) => self.collect_profile(state, field, text).await,
            Route::StartCourse => {
                let reply = self.i18n().t("lesson.start", None);
                Outcome::new(reply, state.with_stage(Stage::first_lesson(1)))
            }
            Route::DeliverLesson { module, part } => self.deliver_lesson(state, module, part).await,
            Route::AnswerQuiz { module, question, letter } => {
                match state.pending_quiz.clone().filter(|q| q.module == module && q.number == question) {
                    Some(pending) => self.score_answer(state, pending, letter).await,
                    // Nothing was asked yet for this stage; ask instead of scoring
                    None => {
                        let pending = self.ask_question(&state.sender_id, module, question).await;
                        Outcome::new(pending.prompt.clone(), state.with_pending(Some(pending)))
                    }
                }
            }
            Route::RepromptQuiz { module, question } => {
                let not_understood = self.i18n().t("quiz.not_understood", None);
                match state.pending_quiz.clone().filter(|q| q.module == module && q.number == question) {
                    Some(pending) => Outcome::new(format!("{}\n\n{}", not_understood, pending.prompt), state),
                    None => {
                        let pending = self.ask_question(&state.sender_id, module, question).await;
                        let reply = format!("{}\n\n{}", not_understood, pending.prompt);
                        Outcome::new(reply, state.with_pending(Some(pending)))
                    }
                }
            }
            Route::Fallback => {
                let reply = self.fallback_reply(&state, text, learner_logged).await;
                Outcome::new(reply, state)
            }
        }
    }

    async fn collect_profile(&self, state: LearnerState, field: ProfileField, text: &str) -> Outcome {
        let value = self.services.extractor.extract(&state.sender_id, field, text).await;

        let profile = state.profile.with_field(field, value);
        let next = next_profile_stage(field);
        let reply = match next {
            Stage::Profile(ProfileField::Course) => self.i18n().t_with(
                "profile.course_prompt",
                &[("name", profile.name.as_deref().unwrap_or_default())],
            ),
            Stage::Profile(ProfileField::Term) => self.i18n().t("profile.term_prompt", None),
            Stage::Profile(ProfileField::Interests) => self.i18n().t("profile.interests_prompt", None),
            _ => self.i18n().t("profile.completed", None),
        };

        Outcome::new(reply, state.with_profile(profile).with_stage(next))
    }

    async fn deliver_lesson(&self, state: LearnerState, module: u32, part: u32) -> Outcome {
        let parts = self.plan.parts_per_module;
        let block_text = match self.services.content.module_text(module).await {
            Ok(module_text) => match paginate_lesson(&module_text, part, parts) {
                Ok(block) => block.text,
                Err(e) => {
                    error!(module = module, part = part, error = %e, "Lesson pagination failed");
                    self.i18n().t_with("lesson.unavailable", &[("module", &module.to_string())])
                }
            },
            Err(e) => {
                log_fallback("content", &state.sender_id, &e.to_string());
                self.i18n().t_with("lesson.unavailable", &[("module", &module.to_string())])
            }
        };

        let params = [
            ("module", module.to_string()),
            ("part", part.to_string()),
            ("parts", parts.to_string()),
            ("text", block_text),
        ];
        let params: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();

        match self.plan.after_lesson(module, part) {
            Stage::Quiz { module, question } => {
                let pending = self.ask_question(&state.sender_id, module, question).await;
                let reply = format!("{}\n\n{}", self.i18n().t_with("lesson.last_block", &params), pending.prompt);
                Outcome::new(
                    reply,
                    state.with_stage(Stage::Quiz { module, question }).with_pending(Some(pending)),
                )
            }
            next => Outcome::new(self.i18n().t_with("lesson.block", &params), state.with_stage(next)),
        }
    }

    async fn score_answer(
        &self,
        state: LearnerState,
        pending: PendingQuestion,
        letter: AnswerLetter,
    ) -> Outcome {
        let module = pending.module;
        let state = if letter == pending.answer {
            state.with_point()
        } else {
            state
        };

        let score = state.score.to_string();
        let feedback = if letter == pending.answer {
            self.i18n().t_with("quiz.correct", &[("score", &score)])
        } else {
            self.i18n().t_with(
                "quiz.incorrect",
                &[("answer", &pending.answer.to_string()), ("score", &score)],
            )
        };

        match self.plan.after_quiz(module, pending.number) {
            Stage::Quiz { module, question } => {
                let next = self.ask_question(&state.sender_id, module, question).await;
                let reply = format!("{}\n\n{}", feedback, next.prompt);
                Outcome::new(
                    reply,
                    state.with_stage(Stage::Quiz { module, question }).with_pending(Some(next)),
                )
            }
            next => {
                let module_done = self.i18n().t_with(
                    "quiz.module_done",
                    &[("module", &module.to_string()), ("score", &score)],
                );
                let closing = match next {
                    Stage::Lesson { module: next_module, .. } => self
                        .i18n()
                        .t_with("lesson.next_module", &[("module", &next_module.to_string())]),
                    _ => self.i18n().t_with(
                        "course.completed",
                        &[
                            ("name", state.profile.name.as_deref().unwrap_or_default()),
                            ("score", &score),
                        ],
                    ),
                };

                let reply = format!("{}\n\n{}\n\n{}", feedback, module_done, closing);
                Outcome::new(reply, state.with_stage(next).with_pending(None))
            }
        }
    }

    /// Produce question `number` of `module`, generated or from the built-in bank
    async fn ask_question(&self, sender_id: &str, module: u32, number: u32) -> PendingQuestion {
        let generated = match self.services.content.module_text(module).await {
            Ok(module_text) => self
                .services
                .content
                .generate_quiz_question(&module_text, number)
                .await,
            Err(e) => Err(e),
        };

        let question = match generated {
            Ok(question) => question,
            Err(e) => {
                log_fallback("quiz", sender_id, &e.to_string());
                fallback_question(number)
            }
        };

        PendingQuestion {
            module,
            number,
            prompt: self.render_question(module, number, &question),
            answer: question.answer,
        }
    }

    fn render_question(&self, module: u32, number: u32, question: &QuizQuestion) -> String {
        self.i18n().t_with(
            "quiz.question",
            &[
                ("module", &module.to_string()),
                ("number", &number.to_string()),
                ("total", &self.plan.questions_per_module.to_string()),
                ("question", &question.question),
                ("options", &question.render_options()),
            ],
        )
    }

    /// Open-domain reply from the completion client, or the fixed apology
    async fn fallback_reply(&self, state: &LearnerState, text: &str, learner_logged: bool) -> String {
        let mut turns: Vec<ChatTurn> = match self.store.recent_entries(&state.sender_id, self.history_window).await {
            Ok(entries) => entries.iter().map(ChatTurn::from).collect(),
            Err(e) => {
                log_persistence_failure(&state.sender_id, "recent_entries", &e.to_string());
                Vec::new()
            }
        };

        let current_is_last = learner_logged
            && turns
                .last()
                .is_some_and(|turn| turn.role == Role::Learner && turn.content == text);
        if !current_is_last {
            if turns.len() >= self.history_window {
                turns.remove(0);
            }
            turns.push(ChatTurn::learner(text));
        }

        let request = CompletionRequest {
            system_prompt: self.system_prompt(state),
            turns,
            temperature: self.llm.temperature,
            max_tokens: self.llm.max_tokens,
        };

        match self.services.completion.complete(request).await {
            Ok(reply) => reply,
            Err(e) => {
                log_fallback("assistant", &state.sender_id, &e.to_string());
                self.i18n().t("errors.llm_unavailable", None)
            }
        }
    }

    fn system_prompt(&self, state: &LearnerState) -> String {
        let unknown = self.i18n().t("prompts.unknown", None);
        let field = |field: ProfileField| state.profile.get(field).unwrap_or(unknown.as_str()).to_string();

        let context = self.i18n().t_with(
            "prompts.learner_context",
            &[
                ("name", &field(ProfileField::Name)),
                ("course", &field(ProfileField::Course)),
                ("term", &field(ProfileField::Term)),
                ("interests", &field(ProfileField::Interests)),
                ("stage", &state.stage.to_string()),
                ("score", &state.score.to_string()),
            ],
        );

        format!("{}\n\n{}", self.i18n().t("prompts.system", None), context)
    }
}
