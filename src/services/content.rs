//! Lesson and quiz content
//!
//! Module text is loaded once per module and cached. Lessons are cut into a
//! fixed number of parts by a pure, deterministic split; quiz questions are
//! generated by the completion client with a built-in bank behind it.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, LazyLock};
use regex::Regex;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use crate::config::ContentConfig;
use crate::i18n::I18n;
use crate::models::AnswerLetter;
use crate::services::documents::DocumentLoader;
use crate::services::llm::{ChatTurn, CompletionClient, CompletionRequest};
use crate::utils::errors::{ContentError, ContentResult};
use crate::utils::helpers::truncate_text;

/// Module text sent along with a quiz generation request, in characters
const QUIZ_CONTEXT_CHARS: usize = 6000;

const QUIZ_TEMPERATURE: f32 = 0.3;
const QUIZ_MAX_TOKENS: u32 = 400;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("code fence pattern"));

static OPTION_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[A-Ea-e]\s*[\)\.\-:]\s+").expect("option prefix pattern"));

static ANSWER_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\(?([A-Ea-e])\b").expect("answer letter pattern"));

/// Introductory module shipped with the bot, one paragraph per lesson part
const BUILTIN_MODULE_1: &str = "\
Parte 1: O que é empreendedorismo? 🚀
Empreender é identificar uma oportunidade, seja um problema sem solução ou uma necessidade mal atendida, e organizar recursos para transformá-la em valor. Não se trata apenas de abrir uma empresa: é uma atitude de iniciativa, de assumir riscos calculados e de aprender com cada tentativa.

Parte 2: Características de um empreendedor de sucesso.
Quem empreende com sucesso costuma combinar persistência, capacidade de planejamento, disposição para ouvir os clientes e coragem para ajustar a rota. Buscar informação, estabelecer metas claras e construir uma rede de contatos são hábitos que aumentam muito as chances de um negócio dar certo.

Parte 3: Importância do empreendedorismo para a sociedade.
Novos negócios geram empregos, movimentam a economia local e trazem inovação para o dia a dia das pessoas. Ao formalizar uma empresa e abrir o seu CNPJ, o empreendedor passa a ter acesso a crédito, pode emitir notas fiscais e contribui para a arrecadação que financia serviços públicos.

Final do módulo 1!
Você viu o que é empreender, quais características ajudam um empreendedor e por que isso importa para todos. Agora é hora de testar o que aprendeu no quiz!";

/// A lesson block ready to be delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonBlock {
    pub text: String,
    pub part: u32,
    pub is_last: bool,
}

/// A multiple-choice question with exactly one correct letter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: AnswerLetter,
}

impl QuizQuestion {
    /// Options as `A) ...` lines
    pub fn render_options(&self) -> String {
        self.options
            .iter()
            .enumerate()
            .filter_map(|(i, option)| AnswerLetter::from_index(i).map(|l| format!("{}) {}", l, option)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Deterministic split of `text` into `parts` blocks, returning block `part`
pub fn paginate_lesson(text: &str, part: u32, parts: u32) -> ContentResult<LessonBlock> {
    if parts == 0 || part == 0 || part > parts {
        return Err(ContentError::PartOutOfRange { part, parts });
    }

    let paragraphs = split_paragraphs(text);
    let count = parts as usize;
    let index = (part - 1) as usize;

    let block = if paragraphs.len() >= count {
        paragraphs[balanced_range(paragraphs.len(), count, index)].join("\n\n")
    } else {
        let words: Vec<&str> = text.split_whitespace().collect();
        words[balanced_range(words.len(), count, index)].join(" ")
    };

    Ok(LessonBlock {
        text: if block.is_empty() { "...".to_string() } else { block },
        part,
        is_last: part == parts,
    })
}

/// Paragraphs separated by blank lines, each trimmed
fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }

    paragraphs
}

/// Range of the `index`-th of `groups` contiguous, size-balanced groups
fn balanced_range(len: usize, groups: usize, index: usize) -> std::ops::Range<usize> {
    (index * len / groups)..((index + 1) * len / groups)
}

#[derive(Debug, Deserialize)]
struct RawQuizQuestion {
    question: String,
    options: Vec<String>,
    answer: String,
}

/// Parse and validate a completion that should hold a quiz question
pub fn parse_quiz_question(completion: &str) -> ContentResult<QuizQuestion> {
    let body = match CODE_FENCE.captures(completion) {
        Some(captures) => captures.get(1).map_or("", |m| m.as_str()),
        None => completion,
    };
    let json = match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => return Err(ContentError::QuizGeneration("no JSON object in completion".to_string())),
    };

    let raw: RawQuizQuestion = serde_json::from_str(json)
        .map_err(|e| ContentError::QuizGeneration(format!("invalid quiz JSON: {}", e)))?;

    let question = raw.question.trim().to_string();
    if question.is_empty() {
        return Err(ContentError::QuizGeneration("empty question".to_string()));
    }

    let options: Vec<String> = raw
        .options
        .iter()
        .map(|option| OPTION_PREFIX.replace(option.trim(), "").trim().to_string())
        .collect();
    if !(2..=5).contains(&options.len()) || options.iter().any(String::is_empty) {
        return Err(ContentError::QuizGeneration(format!(
            "expected 2 to 5 non-empty options, got {}",
            options.len()
        )));
    }

    let answer = ANSWER_LETTER
        .captures(&raw.answer)
        .and_then(|captures| captures.get(1))
        .and_then(|m| m.as_str().parse::<AnswerLetter>().ok())
        .ok_or_else(|| ContentError::QuizGeneration(format!("invalid answer: {}", raw.answer)))?;
    if answer.index() >= options.len() {
        return Err(ContentError::QuizGeneration(format!(
            "answer {} has no matching option",
            answer
        )));
    }

    Ok(QuizQuestion {
        question,
        options,
        answer,
    })
}

/// Built-in question used when generation fails, chosen by question number
pub fn fallback_question(number: u32) -> QuizQuestion {
    let bank: [(&str, [&str; 4], AnswerLetter); 5] = [
        (
            "O que melhor define empreendedorismo?",
            [
                "Trabalhar sempre sozinho",
                "Identificar oportunidades e transformá-las em valor",
                "Evitar qualquer tipo de risco",
                "Copiar negócios que já existem",
            ],
            AnswerLetter::B,
        ),
        (
            "Qual destas é uma característica comum de empreendedores de sucesso?",
            [
                "Persistência e capacidade de planejamento",
                "Desinteresse pela opinião dos clientes",
                "Medo de mudar de estratégia",
                "Falta de metas",
            ],
            AnswerLetter::A,
        ),
        (
            "Por que o empreendedorismo é importante para a sociedade?",
            [
                "Porque reduz a oferta de empregos",
                "Porque impede a inovação",
                "Porque gera empregos e movimenta a economia",
                "Porque dispensa o pagamento de impostos",
            ],
            AnswerLetter::C,
        ),
        (
            "O que o CNPJ permite a um negócio formalizado?",
            [
                "Deixar de ter clientes",
                "Ignorar a legislação",
                "Trabalhar sem nenhum controle financeiro",
                "Emitir notas fiscais e acessar crédito",
            ],
            AnswerLetter::D,
        ),
        (
            "Qual é um bom primeiro passo antes de abrir uma empresa?",
            [
                "Planejar e entender as necessidades dos clientes",
                "Gastar todo o capital em publicidade",
                "Contratar muitos funcionários de uma vez",
                "Ignorar a concorrência",
            ],
            AnswerLetter::A,
        ),
    ];

    let (question, options, answer) = &bank[(number.saturating_sub(1) as usize) % bank.len()];
    QuizQuestion {
        question: question.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        answer: *answer,
    }
}

/// Built-in text for modules the bot ships with
pub fn builtin_module_text(module: u32) -> Option<&'static str> {
    match module {
        1 => Some(BUILTIN_MODULE_1),
        _ => None,
    }
}

/// Loads, caches and slices course content
pub struct ContentProvider {
    loader: Arc<dyn DocumentLoader>,
    client: Arc<dyn CompletionClient>,
    i18n: Arc<I18n>,
    modules_dir: PathBuf,
    cache: RwLock<HashMap<u32, Arc<str>>>,
}

impl ContentProvider {
    pub fn new(
        config: &ContentConfig,
        loader: Arc<dyn DocumentLoader>,
        client: Arc<dyn CompletionClient>,
        i18n: Arc<I18n>,
    ) -> Self {
        Self {
            loader,
            client,
            i18n,
            modules_dir: PathBuf::from(&config.modules_dir),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn module_path(&self, module: u32) -> PathBuf {
        self.modules_dir.join(format!("modulo_{}.txt", module))
    }

    /// Raw text for a module, loaded once and then served from cache
    ///
    /// A module with built-in text never fails to load.
    pub async fn module_text(&self, module: u32) -> ContentResult<Arc<str>> {
        if let Some(text) = self.cache.read().await.get(&module) {
            return Ok(Arc::clone(text));
        }

        let text: Arc<str> = match self.load(module).await {
            Ok(text) => Arc::from(text),
            Err(e) => match builtin_module_text(module) {
                Some(builtin) => {
                    warn!(module = module, error = %e, "Module document unavailable, using built-in text");
                    Arc::from(builtin)
                }
                None => return Err(e),
            },
        };

        self.cache.write().await.insert(module, Arc::clone(&text));
        info!(module = module, chars = text.chars().count(), "Module text cached");
        Ok(text)
    }

    async fn load(&self, module: u32) -> ContentResult<String> {
        let text = self.loader.load_document_text(&self.module_path(module)).await?;
        if text.trim().is_empty() {
            return Err(ContentError::ModuleUnavailable {
                module,
                reason: "document is empty".to_string(),
            });
        }
        Ok(text)
    }

    pub async fn is_cached(&self, module: u32) -> bool {
        self.cache.read().await.contains_key(&module)
    }

    /// Ask the completion client for question `number` about `module_text`
    pub async fn generate_quiz_question(&self, module_text: &str, number: u32) -> ContentResult<QuizQuestion> {
        let prompt = self.i18n.t_with(
            "prompts.quiz",
            &[
                ("number", &number.to_string()),
                ("content", &truncate_text(module_text, QUIZ_CONTEXT_CHARS)),
            ],
        );

        let request = CompletionRequest {
            system_prompt: self.i18n.t("prompts.quiz_system", None),
            turns: vec![ChatTurn::learner(prompt)],
            temperature: QUIZ_TEMPERATURE,
            max_tokens: QUIZ_MAX_TOKENS,
        };

        let completion = self.client.complete(request).await?;
        let question = parse_quiz_question(&completion)?;
        debug!(number = number, options = question.options.len(), "Quiz question generated");
        Ok(question)
    }
}
