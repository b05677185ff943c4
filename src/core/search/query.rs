//! Query preprocessing for book search.
//!
//! Readers type queries like `Chapter 1: The Return` or `what?!` that
//! Tantivy's query grammar would reject or misread. Preprocessing keeps
//! the useful syntax (phrases, boolean operators, grouping, `content:`
//! and `file_path:` prefixes) and blanks out everything else.
//!
//! Tantivy's parser does not accept backslash escapes for most of these
//! characters, so they are replaced with spaces. The content tokenizer
//! splits on punctuation anyway, so this loses no matches.
//!
//! A "literal" mode blanks ALL special characters and disarms the
//! boolean keywords, so the query is read as plain words.

/// Field names accepted as `field:value` prefixes
const VALID_FIELDS: [&str; 2] = ["content", "file_path"];

/// Characters with a meaning in Tantivy's query grammar
const SPECIAL_CHARS: &[char] = &[
    '+', '-', '^', '`', ':', '{', '}', '"', '[', ']', '(', ')', '!', '\\', '*', '~', '@',
];

/// Preprocess a query string for Tantivy compatibility.
///
/// Normal mode:
/// 1. A fully quoted query is passed through as a phrase
/// 2. Colons are blanked unless they follow a valid field name
/// 3. Unbalanced quotes and parentheses are blanked
/// 4. `+`/`-` survive only as prefixes of a word (and `-` inside one)
/// 5. Range, boost, fuzzy and wildcard characters are blanked
///
/// In literal mode (`literal=true`), ALL special characters are blanked
/// and `AND`/`OR`/`NOT` are lowercased into ordinary words.
///
/// # Examples
///
/// ```
/// use booksearch::core::search::preprocess_query;
///
/// assert_eq!(preprocess_query("Chapter 1: The Return", false), "Chapter 1 The Return");
/// assert_eq!(preprocess_query("content:whale", false), "content:whale");
/// assert_eq!(preprocess_query("\"call me ishmael\"", false), "\"call me ishmael\"");
/// assert_eq!(preprocess_query("a+b", true), "a b");
/// ```
pub fn preprocess_query(query: &str, literal: bool) -> String {
    let trimmed = query.trim();

    if trimmed.is_empty() {
        return String::new();
    }

    if literal {
        return blank_all_special(trimmed);
    }

    if trimmed.len() > 1
        && trimmed.starts_with('"')
        && trimmed.ends_with('"')
        && trimmed.matches('"').count() == 2
    {
        return trimmed.to_string();
    }

    let keep_quotes = trimmed.matches('"').count() % 2 == 0;
    let keep_parens = parens_balanced(trimmed);

    let mut result = String::with_capacity(trimmed.len());
    let mut word_start = 0;
    let mut prev: Option<char> = None;
    let mut chars = trimmed.chars().peekable();

    while let Some(ch) = chars.next() {
        let next_is_word = chars.peek().is_some_and(|c| c.is_alphanumeric() || *c == '"');
        let at_word_start = prev.map_or(true, |p| p.is_whitespace() || p == '(');

        let keep = match ch {
            ':' => {
                let next_is_value = chars.peek().is_some_and(|c| !c.is_whitespace());
                VALID_FIELDS.contains(&&result[word_start..]) && next_is_value
            }
            '"' => keep_quotes,
            '(' | ')' => keep_parens,
            '+' => at_word_start && next_is_word,
            // A hyphen inside a word is an ordinary character
            '-' => !at_word_start || next_is_word,
            c => !SPECIAL_CHARS.contains(&c),
        };

        result.push(if keep { ch } else { ' ' });
        if !(ch.is_alphanumeric() || ch == '_') {
            word_start = result.len();
        }
        prev = Some(ch);
    }

    collapse_whitespace(&result)
}

/// Parentheses close in order and nothing is left open
fn parens_balanced(s: &str) -> bool {
    let mut depth: i32 = 0;
    for ch in s.chars() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Blank ALL special characters for literal search mode.
fn blank_all_special(s: &str) -> String {
    let blanked: String = s
        .chars()
        .map(|ch| if SPECIAL_CHARS.contains(&ch) { ' ' } else { ch })
        .collect();

    blanked
        .split_whitespace()
        .map(|word| match word {
            "AND" | "OR" | "NOT" => word.to_lowercase(),
            _ => word.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
