//! Search-key normalization and keyword tokenization.
//!
//! The same [`normalize`] must be used when writing search keys and when
//! building queries; prefix and membership matching silently fail otherwise.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Punctuation replaced by a space before splitting into keywords.
static KEYWORD_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[.,!?:;()"'-]"#).expect("keyword punctuation pattern is valid"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

const QUOTE_LIMIT: usize = 50;

fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Folds text to a lowercase, diacritic-free comparable form.
///
/// `ı` becomes `i` before canonical decomposition, combining marks are
/// dropped, and `ç`, `ş`, `ğ` fold to `c`, `s`, `g`.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    text.to_lowercase()
        .replace('ı', "i")
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            'ç' => 'c',
            'ş' => 's',
            'ğ' => 'g',
            other => other,
        })
        .collect()
}

fn tokens_of(normalized: &str) -> Vec<String> {
    let spaced = KEYWORD_PUNCTUATION.replace_all(normalized, " ");
    let collapsed = WHITESPACE_RUN.replace_all(&spaced, " ");
    collapsed.split(' ').map(str::to_string).collect()
}

fn push_unique(keywords: &mut Vec<String>, token: String) {
    if token.chars().count() > 1 && !keywords.contains(&token) {
        keywords.push(token);
    }
}

/// Builds the deduplicated keyword set stored on a recommendation.
///
/// Tokens come from the normalized title and text; the normalized category
/// and the whole normalized title are added as extra tokens. Tokens of one
/// character or less are dropped.
pub fn keywords(title: &str, text: &str, category: &str) -> Vec<String> {
    let title = normalize(title);
    let combined = format!("{title} {}", normalize(text));

    let mut keywords = Vec::new();
    for token in tokens_of(&combined) {
        push_unique(&mut keywords, token);
    }
    push_unique(&mut keywords, normalize(category));
    push_unique(&mut keywords, title);
    keywords
}

/// Tokenizes a search query the same way recommendation text is tokenized.
pub fn query_tokens(query: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for token in tokens_of(&normalize(query.trim())) {
        push_unique(&mut tokens, token);
    }
    tokens
}

/// Quotes user text inside notification messages, capped at 50 characters.
pub fn truncate_quote(text: &str) -> String {
    if text.chars().count() > QUOTE_LIMIT {
        let head: String = text.chars().take(QUOTE_LIMIT).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
