//! In-memory page element tree.
//!
//! The `Document` is an arena of elements addressed by `ElementId`. Handles
//! stay valid for the lifetime of the document, even after an element has
//! been detached from the tree, so timers can hold on to an element the same
//! way a page script holds on to a node reference.

mod class_list;
#[cfg(feature = "html")]
mod parse;
mod serialize;

pub use class_list::ClassList;

use crate::{Error, Result};
use std::fmt;

/// Handle to an element inside a `Document`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A child of an element: either another element or a run of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(ElementId),
    Text(String),
}

/// A single element and its direct children
#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    id: Option<String>,
    class_list: ClassList,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
    parent: Option<ElementId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            id: None,
            class_list: ClassList::new(),
            attributes: Vec::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn class_list(&self) -> &ClassList {
        &self.class_list
    }

    pub fn class_list_mut(&mut self) -> &mut ClassList {
        &mut self.class_list
    }

    /// Attributes other than `id` and `class`, in insertion order
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }
}

/// Page element tree rooted at `<html>`
#[derive(Debug, Clone)]
pub struct Document {
    elements: Vec<Element>,
    root: ElementId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty page: `<html><head></head><body></body></html>`
    pub fn new() -> Self {
        let mut doc = Self::bare();
        let root = doc.root;
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        doc.attach(root, head);
        doc.attach(root, body);
        doc
    }

    /// A document holding only its `<html>` root, with nowhere to attach content
    pub fn bare() -> Self {
        Self {
            elements: vec![Element::new("html")],
            root: ElementId(0),
        }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn head(&self) -> Option<ElementId> {
        self.child_by_tag(self.root, "head")
    }

    pub fn body(&self) -> Option<ElementId> {
        self.child_by_tag(self.root, "body")
    }

    fn child_by_tag(&self, parent: ElementId, tag: &str) -> Option<ElementId> {
        self.elements[parent.0].children.iter().find_map(|n| match n {
            Node::Element(id) if self.elements[id.0].tag == tag => Some(*id),
            _ => None,
        })
    }

    pub fn element(&self, id: ElementId) -> Result<&Element> {
        self.elements.get(id.0).ok_or(Error::UnknownElement(id))
    }

    pub fn element_mut(&mut self, id: ElementId) -> Result<&mut Element> {
        self.elements.get_mut(id.0).ok_or(Error::UnknownElement(id))
    }

    /// Create a detached element. It joins the tree once appended somewhere.
    pub fn create_element(&mut self, tag: &str) -> ElementId {
        self.elements.push(Element::new(tag));
        ElementId(self.elements.len() - 1)
    }

    /// Append `child` as the last child of `parent`, detaching it from its
    /// previous parent first.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<()> {
        self.element(parent)?;
        self.element(child)?;
        if self.is_inclusive_ancestor(child, parent) {
            return Err(Error::HierarchyRequest(format!(
                "cannot append {} inside its own subtree",
                child
            )));
        }
        self.detach(child);
        self.attach(parent, child);
        Ok(())
    }

    /// Remove `child` from `parent`. The element stays addressable but detached.
    pub fn remove_child(&mut self, parent: ElementId, child: ElementId) -> Result<()> {
        if self.element(child)?.parent != Some(parent) {
            return Err(Error::HierarchyRequest(format!(
                "{} is not a child of {}",
                child, parent
            )));
        }
        self.detach(child);
        Ok(())
    }

    /// Append a text node to `parent`
    pub fn append_text(&mut self, parent: ElementId, text: &str) -> Result<()> {
        let el = self.element_mut(parent)?;
        if !text.is_empty() {
            el.children.push(Node::Text(text.to_string()));
        }
        Ok(())
    }

    // Unchecked tree insertion; callers guarantee both ids are valid and `child` is detached.
    fn attach(&mut self, parent: ElementId, child: ElementId) {
        self.elements[child.0].parent = Some(parent);
        self.elements[parent.0].children.push(Node::Element(child));
    }

    fn detach(&mut self, child: ElementId) {
        if let Some(old) = self.elements[child.0].parent.take() {
            self.elements[old.0]
                .children
                .retain(|n| *n != Node::Element(child));
        }
    }

    fn is_inclusive_ancestor(&self, ancestor: ElementId, node: ElementId) -> bool {
        let mut cur = Some(node);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = self.elements[id.0].parent;
        }
        false
    }

    /// Whether `id` is reachable from the document root
    pub fn is_attached(&self, id: ElementId) -> bool {
        id.0 < self.elements.len() && self.is_inclusive_ancestor(self.root, id)
    }

    /// Attached elements below (and including) `from`, in tree order
    pub fn descendants(&self, from: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        if from.0 >= self.elements.len() {
            return out;
        }
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            out.push(id);
            for child in self.elements[id.0].children.iter().rev() {
                if let Node::Element(c) = child {
                    stack.push(*c);
                }
            }
        }
        out
    }

    /// First attached element carrying `id`, in tree order
    pub fn get_element_by_id(&self, id: &str) -> Option<ElementId> {
        self.descendants(self.root)
            .into_iter()
            .find(|e| self.elements[e.0].id.as_deref() == Some(id))
    }

    /// Every attached element carrying `id`
    pub fn elements_by_id(&self, id: &str) -> Vec<ElementId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|e| self.elements[e.0].id.as_deref() == Some(id))
            .collect()
    }

    pub fn elements_by_tag(&self, tag: &str) -> Vec<ElementId> {
        let tag = tag.to_ascii_lowercase();
        self.descendants(self.root)
            .into_iter()
            .filter(|e| self.elements[e.0].tag == tag)
            .collect()
    }

    /// Replace all children of `id` with a single text node holding `text`.
    /// The text is stored verbatim and never interpreted as markup.
    pub fn set_text_content(&mut self, id: ElementId, text: &str) -> Result<()> {
        let children = std::mem::take(&mut self.element_mut(id)?.children);
        for child in children {
            if let Node::Element(c) = child {
                self.elements[c.0].parent = None;
            }
        }
        self.append_text(id, text)
    }

    /// Concatenated text of `id` and all its descendants
    pub fn text_content(&self, id: ElementId) -> Result<String> {
        self.element(id)?;
        let mut out = String::new();
        self.collect_text(id, &mut out);
        Ok(out)
    }

    fn collect_text(&self, id: ElementId, out: &mut String) {
        let mut stack: Vec<&Node> = self.elements[id.0].children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            match node {
                Node::Text(t) => out.push_str(t),
                Node::Element(c) => stack.extend(self.elements[c.0].children.iter().rev()),
            }
        }
    }

    pub fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) -> Result<()> {
        let el = self.element_mut(id)?;
        match name {
            "id" => el.id = Some(value.to_string()),
            "class" => el.class_list.set(value),
            _ => match el.attributes.iter_mut().find(|(k, _)| k == name) {
                Some((_, v)) => *v = value.to_string(),
                None => el.attributes.push((name.to_string(), value.to_string())),
            },
        }
        Ok(())
    }

    pub fn attribute(&self, id: ElementId, name: &str) -> Result<Option<String>> {
        let el = self.element(id)?;
        Ok(match name {
            "id" => el.id.clone(),
            "class" if el.class_list.is_empty() => None,
            "class" => Some(el.class_list.class_name()),
            _ => el
                .attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone()),
        })
    }

    pub fn remove_attribute(&mut self, id: ElementId, name: &str) -> Result<()> {
        let el = self.element_mut(id)?;
        match name {
            "id" => el.id = None,
            "class" => el.class_list = ClassList::new(),
            _ => el.attributes.retain(|(k, _)| k != name),
        }
        Ok(())
    }

    /// Current `className` of an element
    pub fn class_name(&self, id: ElementId) -> Result<String> {
        Ok(self.element(id)?.class_list.class_name())
    }

    /// Text of the first `<title>` element
    pub fn title(&self) -> String {
        self.elements_by_tag("title")
            .first()
            .and_then(|t| self.text_content(*t).ok())
            .map(|t| t.trim().to_string())
            .unwrap_or_default()
    }

    /// Text content of `<body>`, empty when there is no body
    pub fn body_text(&self) -> String {
        self.body()
            .and_then(|b| self.text_content(b).ok())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_has_head_and_body() {
        let doc = Document::new();
        assert!(doc.head().is_some());
        assert!(doc.body().is_some());
        assert!(Document::bare().body().is_none());
    }

    #[test]
    fn created_elements_are_detached_until_appended() {
        let mut doc = Document::new();
        let div = doc.create_element("DIV");
        doc.set_attribute(div, "id", "x").unwrap();
        assert!(!doc.is_attached(div));
        assert_eq!(doc.get_element_by_id("x"), None);

        let body = doc.body().unwrap();
        doc.append_child(body, div).unwrap();
        assert!(doc.is_attached(div));
        assert_eq!(doc.get_element_by_id("x"), Some(div));
        assert_eq!(doc.element(div).unwrap().tag(), "div");
    }

    #[test]
    fn append_moves_between_parents() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let a = doc.create_element("div");
        let b = doc.create_element("span");
        doc.append_child(body, a).unwrap();
        doc.append_child(body, b).unwrap();
        doc.append_child(a, b).unwrap();
        assert_eq!(doc.element(body).unwrap().children(), &[Node::Element(a)]);
        assert_eq!(doc.element(b).unwrap().parent(), Some(a));
    }

    #[test]
    fn append_into_own_subtree_is_rejected() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let a = doc.create_element("div");
        let b = doc.create_element("div");
        doc.append_child(body, a).unwrap();
        doc.append_child(a, b).unwrap();
        assert!(matches!(
            doc.append_child(b, a),
            Err(Error::HierarchyRequest(_))
        ));
        assert!(matches!(
            doc.append_child(a, a),
            Err(Error::HierarchyRequest(_))
        ));
    }

    #[test]
    fn remove_child_requires_parent_match() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let head = doc.head().unwrap();
        let a = doc.create_element("div");
        doc.append_child(body, a).unwrap();
        assert!(doc.remove_child(head, a).is_err());
        doc.remove_child(body, a).unwrap();
        assert!(!doc.is_attached(a));
        // still addressable after removal
        doc.set_text_content(a, "kept").unwrap();
        assert_eq!(doc.text_content(a).unwrap(), "kept");
    }

    #[test]
    fn text_content_replaces_children() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let p = doc.create_element("p");
        let inner = doc.create_element("b");
        doc.append_child(body, p).unwrap();
        doc.append_child(p, inner).unwrap();
        doc.append_text(inner, "bold").unwrap();
        doc.append_text(p, " tail").unwrap();
        assert_eq!(doc.text_content(p).unwrap(), "bold tail");

        doc.set_text_content(p, "<i>plain</i>").unwrap();
        assert_eq!(doc.text_content(p).unwrap(), "<i>plain</i>");
        assert_eq!(
            doc.element(p).unwrap().children(),
            &[Node::Text("<i>plain</i>".into())]
        );
        assert!(!doc.is_attached(inner));

        doc.set_text_content(p, "").unwrap();
        assert!(doc.element(p).unwrap().children().is_empty());
    }

    #[test]
    fn id_and_class_attributes_are_backed_by_fields() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        doc.set_attribute(div, "class", "toast  show").unwrap();
        doc.set_attribute(div, "role", "status").unwrap();
        assert_eq!(doc.class_name(div).unwrap(), "toast show");
        assert_eq!(doc.attribute(div, "class").unwrap().as_deref(), Some("toast show"));
        assert_eq!(doc.attribute(div, "role").unwrap().as_deref(), Some("status"));
        assert_eq!(
            doc.element(div).unwrap().attributes(),
            &[("role".to_string(), "status".to_string())]
        );
        doc.remove_attribute(div, "class").unwrap();
        assert_eq!(doc.attribute(div, "class").unwrap(), None);
        assert_eq!(doc.attribute(div, "id").unwrap(), None);
    }

    #[test]
    fn text_content_handles_deep_nesting() {
        const DEPTH: usize = 200_000;
        let mut doc = Document::new();
        let mut top = doc.create_element("i");
        doc.append_text(top, "!").unwrap();
        for _ in 1..DEPTH {
            let parent = doc.create_element("b");
            doc.append_text(parent, "a").unwrap();
            doc.append_child(parent, top).unwrap();
            top = parent;
        }
        let body = doc.body().unwrap();
        doc.append_child(body, top).unwrap();

        let text = doc.body_text();
        assert_eq!(text.len(), DEPTH);
        assert!(text.starts_with("aaa"));
        assert!(text.ends_with("a!"));
        assert_eq!(doc.descendants(top).len(), DEPTH);
    }

    #[test]
    fn lookup_returns_first_in_tree_order() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let outer = doc.create_element("section");
        let nested = doc.create_element("div");
        let later = doc.create_element("div");
        doc.set_attribute(nested, "id", "dup").unwrap();
        doc.set_attribute(later, "id", "dup").unwrap();
        doc.append_child(body, outer).unwrap();
        doc.append_child(outer, nested).unwrap();
        doc.append_child(body, later).unwrap();
        assert_eq!(doc.get_element_by_id("dup"), Some(nested));
        assert_eq!(doc.elements_by_id("dup"), vec![nested, later]);
    }

    #[test]
    fn unknown_handles_are_errors() {
        let doc = Document::new();
        let mut other = Document::new();
        for _ in 0..8 {
            other.create_element("div");
        }
        let foreign = other.create_element("div");
        assert!(matches!(doc.element(foreign), Err(Error::UnknownElement(_))));
        assert!(!doc.is_attached(foreign));
    }
}
