//! Loading a `Document` from HTML source (feature: `html`)

use super::{Document, ElementId};
use crate::Result;
use scraper::{ElementRef, Html, Node as HtmlNode};
use std::path::Path;

impl Document {
    /// Parse an HTML document. Parsing is lenient: the resulting tree always
    /// has `<html>`, `<head>` and `<body>`, and comments and doctype are dropped.
    pub fn parse_html(source: &str) -> Self {
        let html = Html::parse_document(source);
        let src_root = html.root_element();

        let mut doc = Document::bare();
        let root = doc.root();
        doc.copy_attributes(root, src_root);

        // Each stack entry pairs a source element with its already-created copy.
        let mut stack: Vec<(ElementRef, ElementId)> = vec![(src_root, root)];
        while let Some((src, dst)) = stack.pop() {
            for child in src.children() {
                match child.value() {
                    HtmlNode::Text(t) => {
                        let text: &str = t;
                        if !text.is_empty() {
                            doc.elements[dst.0]
                                .children
                                .push(super::Node::Text(text.to_string()));
                        }
                    }
                    HtmlNode::Element(_) => {
                        if let Some(el) = ElementRef::wrap(child) {
                            let id = doc.create_element(el.value().name());
                            doc.copy_attributes(id, el);
                            doc.attach(dst, id);
                            stack.push((el, id));
                        }
                    }
                    _ => {}
                }
            }
        }
        doc
    }

    /// Read and parse an HTML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Ok(Self::parse_html(&source))
    }

    fn copy_attributes(&mut self, dst: ElementId, src: ElementRef) {
        let el = &mut self.elements[dst.0];
        for (name, value) in src.value().attrs() {
            match name {
                "id" => el.id = Some(value.to_string()),
                "class" => el.class_list.set(value),
                _ => el.attributes.push((name.to_string(), value.to_string())),
            }
        }
    }
}
