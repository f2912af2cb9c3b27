//! Profile field extraction
//!
//! Learners answer onboarding questions in free text ("me chamo João",
//! "tô no 3º semestre"). The completion client pulls out the bare value;
//! when it cannot, a deterministic heuristic does.

use std::sync::Arc;
use tracing::debug;
use crate::i18n::I18n;
use crate::services::llm::{ChatTurn, CompletionClient, CompletionRequest};
use crate::state::ProfileField;
use crate::utils::errors::ExtractionError;
use crate::utils::helpers::{capitalize, fold_keyword};
use crate::utils::logging::log_fallback;

/// Longest value accepted from the completion client
const MAX_EXTRACTED_CHARS: usize = 80;

const EXTRACTION_MAX_TOKENS: u32 = 30;

/// Leading words skipped when guessing a first name, compared folded
const NAME_FILLERS: &[&str] = &[
    "oi", "ola", "opa", "e", "ai", "bom", "boa", "dia", "tarde", "noite", "meu", "nome", "sou", "o",
    "a", "me", "chamo", "chamam", "pode", "chamar", "de", "eu", "aqui", "prazer", "tudo", "bem",
];

#[derive(Clone)]
pub struct FieldExtractor {
    client: Arc<dyn CompletionClient>,
    i18n: Arc<I18n>,
}

impl FieldExtractor {
    pub fn new(client: Arc<dyn CompletionClient>, i18n: Arc<I18n>) -> Self {
        Self { client, i18n }
    }

    /// Ask the completion client for the field value
    pub async fn try_extract(&self, field: ProfileField, raw: &str) -> Result<String, ExtractionError> {
        let instruction = self.i18n.t_with(
            &format!("prompts.extract.{}", field.as_str()),
            &[("message", raw.trim())],
        );

        let request = CompletionRequest {
            system_prompt: self.i18n.t("prompts.extract_system", None),
            turns: vec![ChatTurn::learner(instruction)],
            temperature: 0.0,
            max_tokens: EXTRACTION_MAX_TOKENS,
        };

        let completion = self.client.complete(request).await?;
        let value = clean_completion(&completion);

        if value.is_empty() {
            return Err(ExtractionError::Malformed("empty value".to_string()));
        }
        if value.contains('\n') || value.chars().count() > MAX_EXTRACTED_CHARS {
            return Err(ExtractionError::Malformed(format!(
                "not a bare value: {}",
                crate::utils::helpers::truncate_text(&value, 40)
            )));
        }

        debug!(field = %field, "Field extracted by completion client");
        Ok(value)
    }

    /// Deterministic value for `field`, never empty for non-empty input
    pub fn fallback(field: ProfileField, raw: &str) -> String {
        let trimmed = raw.trim();
        match field {
            ProfileField::Name => guess_first_name(trimmed).unwrap_or_else(|| trimmed.to_string()),
            _ => trimmed.to_string(),
        }
    }

    /// Extracted value, or the heuristic one if extraction fails
    pub async fn extract(&self, sender_id: &str, field: ProfileField, raw: &str) -> String {
        match self.try_extract(field, raw).await {
            Ok(value) => value,
            Err(e) => {
                log_fallback("extractor", sender_id, &e.to_string());
                Self::fallback(field, raw)
            }
        }
    }
}

/// Strip whitespace, wrapping quotes and a trailing period from a completion
fn clean_completion(text: &str) -> String {
    text.trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '*')
        .trim_end_matches('.')
        .trim()
        .to_string()
}

fn guess_first_name(text: &str) -> Option<String> {
    text.split_whitespace()
        .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|token| !token.is_empty())
        .find(|token| !NAME_FILLERS.contains(&fold_keyword(token).as_str()))
        .map(capitalize)
}
