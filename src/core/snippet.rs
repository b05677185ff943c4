//! Snippet location for search-result previews.
//!
//! Given a document's text and a user query, [`SnippetLocator`] picks the
//! excerpt that best shows why the document matched. Strategies are tried
//! in order and the first hit wins:
//!
//! 1. the whole query as an exact phrase
//! 2. the densest window of whole-word term occurrences
//! 3. the same search over term subsets, matching word prefixes
//! 4. any single term anywhere, even inside a longer word
//!
//! Matching is case-insensitive. Offsets are byte offsets into the
//! original text and always fall on char boundaries.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::panic::{self, AssertUnwindSafe};

use once_cell::sync::Lazy;
use regex::Regex;

/// Default window width in bytes
pub const DEFAULT_WINDOW: usize = 100;

/// Upper bound on term subsets tried by the degraded fallback
pub const MAX_FALLBACK_CANDIDATES: usize = 64;

static TERM_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\-]+").expect("valid term separator regex"));

/// Byte range of a snippet plus the query terms found inside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetWindow {
    pub start: usize,
    pub end: usize,
    pub matched_terms: BTreeSet<String>,
}

impl SnippetWindow {
    /// The raw text slice covered by the window
    pub fn excerpt<'t>(&self, text: &'t str) -> &'t str {
        text.get(self.start..self.end).unwrap_or("")
    }

    /// The excerpt with every matched term wrapped in `open`/`close`,
    /// keeping the source casing
    pub fn highlight(&self, text: &str, open: &str, close: &str) -> String {
        highlight_terms(self.excerpt(text), &self.matched_terms, open, close)
    }
}

/// Result of a snippet search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnippetOutcome {
    Found(SnippetWindow),
    NoMatch,
    MatchError(String),
}

impl SnippetOutcome {
    pub fn window(&self) -> Option<&SnippetWindow> {
        match self {
            SnippetOutcome::Found(window) => Some(window),
            _ => None,
        }
    }
}

/// Stateless snippet finder
#[derive(Debug, Clone, Copy)]
pub struct SnippetLocator {
    window_size: usize,
}

impl Default for SnippetLocator {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl SnippetLocator {
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size: window_size.max(1),
        }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Find the best snippet for `query` using the configured window size
    pub fn find(&self, text: &str, query: &str) -> SnippetOutcome {
        self.find_with_window(text, query, self.window_size)
    }

    /// Find the best snippet for `query` with an explicit window size
    pub fn find_with_window(&self, text: &str, query: &str, window_size: usize) -> SnippetOutcome {
        let window_size = window_size.max(1);
        match panic::catch_unwind(AssertUnwindSafe(|| locate(text, query, window_size))) {
            Ok(Some(window)) => SnippetOutcome::Found(window),
            Ok(None) => SnippetOutcome::NoMatch,
            Err(panic) => {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "snippet search panicked".to_string());
                tracing::warn!("Snippet search failed for query {:?}: {}", query, reason);
                SnippetOutcome::MatchError(reason)
            }
        }
    }
}

/// How a term has to sit in the text to count as an occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TermMatch {
    WholeWord,
    WordPrefix,
}

#[derive(Debug, Clone, Copy)]
struct Occurrence {
    pos: usize,
    len: usize,
    term: usize,
}

fn locate(text: &str, query: &str, window_size: usize) -> Option<SnippetWindow> {
    let phrase = normalize(&query.split_whitespace().collect::<Vec<_>>().join(" "));
    if phrase.is_empty() || text.is_empty() {
        return None;
    }
    let haystack = normalize(text);

    // 1. exact phrase
    if let Some(pos) = haystack.find(&phrase) {
        let (start, end) = centered_window(&haystack, pos, phrase.len(), window_size);
        return Some(SnippetWindow {
            start,
            end,
            matched_terms: BTreeSet::from([phrase]),
        });
    }

    let terms = split_terms(&phrase);
    if terms.is_empty() {
        return None;
    }

    // 2. densest window over whole words
    if let Some(window) = best_window(&haystack, &terms, window_size, TermMatch::WholeWord, false) {
        return Some(window);
    }

    // 3. term subsets, prefixes allowed
    for subset in fallback_subsets(terms.len()) {
        let candidate: Vec<String> = subset.iter().map(|&i| terms[i].clone()).collect();
        if let Some(window) =
            best_window(&haystack, &candidate, window_size, TermMatch::WordPrefix, true)
        {
            return Some(window);
        }
    }

    // 4. any term anywhere
    terms.iter().find_map(|term| {
        haystack.find(term.as_str()).map(|pos| {
            let (start, end) = centered_window(&haystack, pos, term.len(), window_size);
            SnippetWindow {
                start,
                end,
                matched_terms: BTreeSet::from([term.clone()]),
            }
        })
    })
}

/// Lowercase char by char, keeping every char's UTF-8 length so that
/// offsets in the result are valid offsets into the input
fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let mut lower = c.to_lowercase();
        match (lower.next(), lower.next()) {
            (Some(l), None) if l.len_utf8() == c.len_utf8() => out.push(l),
            _ => out.push(c),
        }
    }
    out
}

/// Split a normalized query into distinct terms, keeping first-seen order
fn split_terms(phrase: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    TERM_SEPARATOR
        .split(phrase)
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(*t))
        .map(str::to_string)
        .collect()
}

/// Subsets for the degraded fallback: the full set, then every
/// single-term removal, level by level, never below two terms
fn fallback_subsets(term_count: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([(0..term_count).collect::<Vec<usize>>()]);

    while let Some(subset) = queue.pop_front() {
        if out.len() >= MAX_FALLBACK_CANDIDATES {
            break;
        }
        if !seen.insert(subset.clone()) {
            continue;
        }
        if subset.len() > 2 {
            for skip in 0..subset.len() {
                let mut smaller = subset.clone();
                smaller.remove(skip);
                queue.push_back(smaller);
            }
        }
        out.push(subset);
    }
    out
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Every occurrence of every term, sorted by position
fn occurrences(haystack: &str, terms: &[String], mode: TermMatch) -> Vec<Occurrence> {
    let mut found = Vec::new();
    for (index, term) in terms.iter().enumerate() {
        for (pos, _) in haystack.match_indices(term.as_str()) {
            let before_ok = haystack[..pos]
                .chars()
                .next_back()
                .is_none_or(|c| !is_word_char(c));
            let after_ok = mode == TermMatch::WordPrefix
                || haystack[pos + term.len()..]
                    .chars()
                    .next()
                    .is_none_or(|c| !is_word_char(c));
            if before_ok && after_ok {
                found.push(Occurrence {
                    pos,
                    len: term.len(),
                    term: index,
                });
            }
        }
    }
    found.sort_by_key(|o| (o.pos, o.term));
    found
}

/// Pick the window start covering the most distinct terms, then the most
/// occurrences; the earliest start wins ties. With `require_all`, only a
/// window covering every term is accepted.
fn best_window(
    haystack: &str,
    terms: &[String],
    window_size: usize,
    mode: TermMatch,
    require_all: bool,
) -> Option<SnippetWindow> {
    let occ = occurrences(haystack, terms, mode);
    if occ.is_empty() {
        return None;
    }

    let mut counts = vec![0usize; terms.len()];
    let mut distinct = 0;
    let mut best = (0usize, (0usize, 0usize));
    let mut j = 0;

    for i in 0..occ.len() {
        let limit = occ[i].pos + window_size;
        while j < occ.len() && occ[j].pos < limit {
            if counts[occ[j].term] == 0 {
                distinct += 1;
            }
            counts[occ[j].term] += 1;
            j += 1;
        }

        let score = (distinct, j - i);
        if score > best.1 {
            best = (i, score);
        }

        counts[occ[i].term] -= 1;
        if counts[occ[i].term] == 0 {
            distinct -= 1;
        }
    }

    let (best_index, (best_distinct, _)) = best;
    if require_all && best_distinct < terms.len() {
        return None;
    }

    let pos = occ[best_index].pos;
    let half = window_size / 2;
    let start = floor_boundary(haystack, pos.saturating_sub(half));
    let end = ceil_boundary(haystack, (pos + window_size + half).min(haystack.len()));

    let matched_terms = occ
        .iter()
        .filter(|o| o.pos >= start && o.pos + o.len <= end)
        .map(|o| terms[o.term].clone())
        .collect();

    Some(SnippetWindow {
        start,
        end,
        matched_terms,
    })
}

/// A `window_size` window centered on `[pos, pos + len)`, clamped to the
/// text and always covering the match
fn centered_window(haystack: &str, pos: usize, len: usize, window_size: usize) -> (usize, usize) {
    let total = haystack.len();
    let (start, end) = if len >= window_size {
        (pos, pos + len)
    } else {
        let center = pos + len / 2;
        let mut start = center.saturating_sub(window_size / 2);
        let mut end = start + window_size;
        if end > total {
            end = total;
            start = total.saturating_sub(window_size);
        }
        (start.min(pos), end.max(pos + len))
    };
    (floor_boundary(haystack, start), ceil_boundary(haystack, end.min(total)))
}

fn floor_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

/// Wrap case-insensitive occurrences of `terms` in `excerpt` with
/// `open`/`close`. Overlapping matches are merged.
pub fn highlight_terms<'a>(
    excerpt: &str,
    terms: impl IntoIterator<Item = &'a String>,
    open: &str,
    close: &str,
) -> String {
    let normalized = normalize(excerpt);
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for term in terms {
        let term = normalize(term);
        if term.is_empty() {
            continue;
        }
        ranges.extend(
            normalized
                .match_indices(term.as_str())
                .map(|(pos, m)| (pos, pos + m.len())),
        );
    }
    ranges.sort_unstable();

    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(ranges.len());
    for (start, end) in ranges {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }

    let mut out = String::with_capacity(excerpt.len() + merged.len() * (open.len() + close.len()));
    let mut cursor = 0;
    for (start, end) in merged {
        out.push_str(&excerpt[cursor..start]);
        out.push_str(open);
        out.push_str(&excerpt[start..end]);
        out.push_str(close);
        cursor = end;
    }
    out.push_str(&excerpt[cursor..]);
    out
}
