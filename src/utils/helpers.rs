//! Helper functions and utilities
//!
//! This module contains common text helpers used throughout the application.

/// Truncate text to a maximum number of characters with ellipsis
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Fold a word to lowercase ASCII for keyword comparison
///
/// WhatsApp users type "comecar" and "começar" interchangeably, so accented
/// Portuguese vowels and the cedilla are mapped to their base letters.
pub fn fold_keyword(word: &str) -> String {
    word.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Split a message into folded words, dropping punctuation
pub fn folded_words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(fold_keyword)
        .collect()
}

/// Uppercase the first character of a word
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Mask a sender identifier for logs, keeping only its prefix and last digits
pub fn mask_sender(sender_id: &str) -> String {
    let chars: Vec<char> = sender_id.chars().collect();
    if chars.len() <= 6 {
        return "*".repeat(chars.len());
    }

    let keep_head = chars
        .iter()
        .position(|c| c.is_ascii_digit())
        .map(|p| p + 2)
        .unwrap_or(2)
        .min(chars.len() - 4);

    chars
        .iter()
        .enumerate()
        .map(|(i, c)| if i < keep_head || i >= chars.len() - 4 { *c } else { '*' })
        .collect()
}
