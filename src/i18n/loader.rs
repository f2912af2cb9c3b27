//! Message catalog loader
//!
//! The pt-BR catalog is compiled into the binary. A translations directory
//! may be configured to override individual keys without a rebuild.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;
use regex::{Captures, Regex};
use serde_json::{Map, Value};
use tokio::fs;
use tracing::{debug, info, warn};
use crate::config::I18nConfig;
use crate::utils::errors::{PjotinhaError, Result};

const EMBEDDED_CATALOG: &str = include_str!("../../translations/pt-BR.json");

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern"));

/// Translation parameters for message formatting
pub type TranslationParams = HashMap<String, String>;

/// Learner-facing message catalog
#[derive(Debug, Clone)]
pub struct I18n {
    messages: Map<String, Value>,
    language: String,
}

impl I18n {
    /// Catalog built from the embedded pt-BR messages
    pub fn embedded(config: &I18nConfig) -> Result<Self> {
        let messages = parse_catalog(EMBEDDED_CATALOG, "embedded")?;
        Ok(Self {
            messages,
            language: config.default_language.clone(),
        })
    }

    /// Embedded catalog plus any overrides found in `translations_dir`
    pub async fn load(config: &I18nConfig) -> Result<Self> {
        let mut i18n = Self::embedded(config)?;
        if let Some(dir) = &config.translations_dir {
            i18n.load_overrides(Path::new(dir)).await?;
        }
        Ok(i18n)
    }

    /// Merge `<dir>/<language>.json` over the current messages
    pub async fn load_overrides(&mut self, dir: &Path) -> Result<()> {
        let file_path = dir.join(format!("{}.json", self.language));
        if !file_path.exists() {
            warn!("Translation file not found: {}, using embedded catalog", file_path.display());
            return Ok(());
        }

        let content = fs::read_to_string(&file_path).await?;
        let overrides = parse_catalog(&content, &file_path.display().to_string())?;
        merge(&mut self.messages, overrides);

        info!("Loaded translation overrides from {}", file_path.display());
        debug!("Catalog now has {} keys", count_keys(&self.messages));
        Ok(())
    }

    /// Get a message, filling `{param}` placeholders
    ///
    /// Unknown keys are logged and returned as-is so a missing message is
    /// visible without breaking the reply.
    pub fn t(&self, key: &str, params: Option<&TranslationParams>) -> String {
        match self.lookup(key) {
            Some(template) => format_message(template, params),
            None => {
                warn!("Translation key '{}' not found", key);
                key.to_string()
            }
        }
    }

    /// Shorthand for [`I18n::t`] with inline parameters
    pub fn t_with(&self, key: &str, params: &[(&str, &str)]) -> String {
        let params: TranslationParams = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.t(key, Some(&params))
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn key_count(&self) -> usize {
        count_keys(&self.messages)
    }

    /// Resolve a dotted key like `quiz.not_understood`
    fn lookup(&self, key: &str) -> Option<&str> {
        let mut parts = key.split('.');
        let mut current = self.messages.get(parts.next()?)?;
        for part in parts {
            current = current.get(part)?;
        }
        current.as_str()
    }
}

fn parse_catalog(content: &str, source: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(content)? {
        Value::Object(map) => Ok(map),
        _ => Err(PjotinhaError::Config(format!(
            "Invalid translation file format in {}",
            source
        ))),
    }
}

fn merge(base: &mut Map<String, Value>, overrides: Map<String, Value>) {
    for (key, value) in overrides {
        match value {
            Value::Object(nested) if matches!(base.get(&key), Some(Value::Object(_))) => {
                if let Some(Value::Object(existing)) = base.get_mut(&key) {
                    merge(existing, nested);
                }
            }
            value => {
                base.insert(key, value);
            }
        }
    }
}

/// Fill `{key}` placeholders in one pass; substituted values are never rescanned
fn format_message(template: &str, params: Option<&TranslationParams>) -> String {
    let Some(params) = params else {
        return template.to_string();
    };

    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match params.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn count_keys(obj: &Map<String, Value>) -> usize {
    obj.values()
        .map(|value| match value {
            Value::Object(nested) => count_keys(nested),
            _ => 1,
        })
        .sum()
}
