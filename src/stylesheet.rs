//! Index of class selectors defined by a page's `<style>` blocks.
//!
//! The presenter only concatenates class names; whether they render is up to
//! the page stylesheet. This index lets callers (and the presenter, once per
//! page) report which of the toast classes the page never defines.

use crate::dom::Document;
use crate::ToastConfig;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default)]
pub struct StylesheetIndex {
    classes: BTreeSet<String>,
    sheets: usize,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Block {
    Rules,
    Declarations,
}

// At-rules whose blocks contain further style rules rather than declarations.
const NESTING_AT_RULES: &[&str] = &["@media", "@supports", "@layer", "@container", "@document"];

impl StylesheetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every `<style>` element in the document
    pub fn from_document(doc: &Document) -> Self {
        let mut index = Self::new();
        for style in doc.elements_by_tag("style") {
            if let Ok(css) = doc.text_content(style) {
                index.add_sheet(&css);
            }
        }
        index
    }

    pub fn from_css(css: &str) -> Self {
        let mut index = Self::new();
        index.add_sheet(css);
        index
    }

    pub fn add_sheet(&mut self, css: &str) {
        self.sheets += 1;
        let css = strip_comments(css);
        let mut stack: Vec<Block> = Vec::new();
        let mut prelude = String::new();

        for c in css.chars() {
            let context = stack.last().copied().unwrap_or(Block::Rules);
            match c {
                '{' => {
                    let next = match context {
                        Block::Declarations => Block::Declarations,
                        Block::Rules => {
                            let head = prelude.trim();
                            if head.starts_with('@') {
                                if NESTING_AT_RULES.iter().any(|r| head.starts_with(r)) {
                                    Block::Rules
                                } else {
                                    Block::Declarations
                                }
                            } else {
                                collect_classes(head, &mut self.classes);
                                Block::Declarations
                            }
                        }
                    };
                    stack.push(next);
                    prelude.clear();
                }
                '}' => {
                    stack.pop();
                    prelude.clear();
                }
                ';' if context == Block::Rules => prelude.clear(),
                _ if context == Block::Rules => prelude.push(c),
                _ => {}
            }
        }
    }

    /// True when no stylesheet was indexed at all
    pub fn is_empty(&self) -> bool {
        self.sheets == 0
    }

    pub fn defines(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    /// Toast classes the indexed sheets never mention: the base class, the
    /// visible marker and every class the given categories map to.
    pub fn missing_classes(&self, config: &ToastConfig, categories: &[&str]) -> Vec<String> {
        let mut required = vec![config.base_class.clone(), config.visible_class.clone()];
        for category in categories {
            let mapped = config
                .category_classes
                .get(*category)
                .map(String::as_str)
                .unwrap_or(*category);
            required.extend(mapped.split_whitespace().map(str::to_string));
        }

        let mut missing = Vec::new();
        for class in required {
            if !self.defines(&class) && !missing.contains(&class) {
                missing.push(class);
            }
        }
        missing
    }
}

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

// Pull `.class` names out of a selector list, skipping attribute selectors and strings.
fn collect_classes(selector: &str, out: &mut BTreeSet<String>) {
    let mut chars = selector.chars().peekable();
    let mut bracket_depth = 0usize;
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            if c == '\\' {
                chars.next();
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '[' => bracket_depth += 1,
            ']' => bracket_depth = bracket_depth.saturating_sub(1),
            '.' if bracket_depth == 0 => {
                let starts_ident = chars
                    .peek()
                    .map(|n| is_ident_char(*n) && !n.is_ascii_digit())
                    .unwrap_or(false);
                if starts_ident {
                    let mut name = String::new();
                    while let Some(n) = chars.peek().copied() {
                        if !is_ident_char(n) {
                            break;
                        }
                        name.push(n);
                        chars.next();
                    }
                    out.insert(name);
                }
            }
            _ => {}
        }
    }
}
