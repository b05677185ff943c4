//! Visible-text extraction from (X)HTML content documents.
//!
//! Block-level elements become line boundaries; text inside a line is
//! whitespace-normalized and joined with single spaces. Script, style
//! and head content never reaches the output. Traversal uses an
//! explicit stack so deeply nested markup cannot exhaust the call
//! stack.

use scraper::{ElementRef, Html, Node};

/// Elements whose content is never visible text
const SKIPPED_ELEMENTS: &[&str] = &["head", "script", "style", "noscript", "template"];

/// Elements that start and end a line
const BLOCK_ELEMENTS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "body",
    "br",
    "caption",
    "dd",
    "div",
    "dl",
    "dt",
    "figcaption",
    "figure",
    "footer",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "td",
    "th",
    "tr",
    "ul",
];

enum Step<'a> {
    Element(ElementRef<'a>),
    Text(&'a str),
    Break,
}

/// Extract the visible text of an HTML or XHTML document
pub fn visible_text(markup: &str) -> String {
    let document = Html::parse_document(markup);
    let mut lines = LineCollector::default();
    let mut stack = vec![Step::Element(document.root_element())];

    while let Some(step) = stack.pop() {
        match step {
            Step::Text(text) => lines.push_words(text),
            Step::Break => lines.break_line(),
            Step::Element(element) => {
                let name = element.value().name();
                if SKIPPED_ELEMENTS.contains(&name) {
                    continue;
                }

                let block = BLOCK_ELEMENTS.contains(&name);
                if block {
                    lines.break_line();
                    stack.push(Step::Break);
                }

                let children: Vec<_> = element.children().collect();
                for child in children.into_iter().rev() {
                    match child.value() {
                        Node::Text(text) => stack.push(Step::Text(&text.text)),
                        Node::Element(_) => {
                            if let Some(child_element) = ElementRef::wrap(child) {
                                stack.push(Step::Element(child_element));
                            }
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    lines.finish()
}

#[derive(Default)]
struct LineCollector {
    lines: Vec<String>,
    current: String,
}

impl LineCollector {
    fn push_words(&mut self, text: &str) {
        for word in text.split_whitespace() {
            if !self.current.is_empty() {
                self.current.push(' ');
            }
            self.current.push_str(word);
        }
    }

    fn break_line(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(std::mem::take(&mut self.current));
        }
    }

    fn finish(mut self) -> String {
        self.break_line();
        self.lines.join("\n")
    }
}
