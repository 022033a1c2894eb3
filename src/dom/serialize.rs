// HTML serialization and content fingerprints for `Document`.

use super::{Document, ElementId, Node};
use crate::Result;
use sha2::{Digest, Sha256};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

// Raw text elements keep their content unescaped, as browsers serialize them.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

fn escape_text(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

impl Document {
    /// Serialize the whole tree starting at `<html>`
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_element(self.root, &mut out);
        out
    }

    /// Serialize a single element and its subtree
    pub fn outer_html(&self, id: ElementId) -> Result<String> {
        self.element(id)?;
        let mut out = String::new();
        self.write_element(id, &mut out);
        Ok(out)
    }

    /// Lowercase hex SHA-256 of `to_html()`; stable across runs for equal trees
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.to_html().as_bytes());
        hex::encode(digest)
    }

    fn write_element(&self, id: ElementId, out: &mut String) {
        let mut stack = vec![Step::Open(id)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Text(t, true) => out.push_str(t),
                Step::Text(t, false) => escape_text(t, out),
                Step::Close(tag) => {
                    out.push_str("</");
                    out.push_str(tag);
                    out.push('>');
                }
                Step::Open(id) => {
                    let el = &self.elements[id.0];
                    self.write_start_tag(id, out);
                    if VOID_ELEMENTS.contains(&el.tag.as_str()) {
                        continue;
                    }
                    stack.push(Step::Close(&el.tag));
                    let raw = RAW_TEXT_ELEMENTS.contains(&el.tag.as_str());
                    for child in el.children.iter().rev() {
                        stack.push(match child {
                            Node::Text(t) => Step::Text(t, raw),
                            Node::Element(c) => Step::Open(*c),
                        });
                    }
                }
            }
        }
    }

    fn write_start_tag(&self, id: ElementId, out: &mut String) {
        let el = &self.elements[id.0];
        out.push('<');
        out.push_str(&el.tag);
        if let Some(ident) = &el.id {
            out.push_str(" id=\"");
            escape_attr(ident, out);
            out.push('"');
        }
        if !el.class_list.is_empty() {
            out.push_str(" class=\"");
            escape_attr(&el.class_list.class_name(), out);
            out.push('"');
        }
        for (name, value) in &el.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            escape_attr(value, out);
            out.push('"');
        }
        out.push('>');
    }
}

// Pending serializer work, kept on an explicit stack instead of recursing
enum Step<'a> {
    Open(ElementId),
    // text plus whether it sits in a raw text element
    Text(&'a str, bool),
    Close(&'a str),
}
