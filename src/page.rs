//! A page: one document plus the event loop its deferred actions run on.

use crate::dom::Document;
use crate::event_loop::{EventLoop, TimerId};
use crate::{PageConfig, Result, TextSnapshot};

/// Page-rendering context. All mutation, including timer callbacks, happens
/// through `&mut Page`, so a page is only ever driven from one thread.
#[derive(Debug)]
pub struct Page {
    document: Document,
    event_loop: EventLoop,
}

impl Default for Page {
    fn default() -> Self {
        Self::new(PageConfig::default())
    }
}

impl Page {
    /// Blank page with an empty head and body
    pub fn new(config: PageConfig) -> Self {
        Self::with_document(Document::new(), config)
    }

    pub fn with_document(document: Document, config: PageConfig) -> Self {
        Self {
            document,
            event_loop: EventLoop::new(config.timer_iteration_limit),
        }
    }

    /// Page built from HTML source
    #[cfg(feature = "html")]
    pub fn from_html(source: &str, config: PageConfig) -> Self {
        Self::with_document(Document::parse_html(source), config)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    /// Current page time in milliseconds
    pub fn now_ms(&self) -> u64 {
        self.event_loop.now_ms()
    }

    pub fn set_timeout<F>(&mut self, delay_ms: u64, callback: F) -> TimerId
    where
        F: FnOnce(&mut Document) + Send + 'static,
    {
        self.event_loop.set_timeout(delay_ms, callback)
    }

    pub fn clear_timeout(&mut self, id: TimerId) -> bool {
        self.event_loop.clear_timeout(id)
    }

    pub fn pending_timers(&self) -> usize {
        self.event_loop.pending()
    }

    pub fn next_deadline(&mut self) -> Option<u64> {
        self.event_loop.next_deadline()
    }

    /// Advance page time by `delta_ms`, running due timers. Returns how many ran.
    pub fn tick(&mut self, delta_ms: u64) -> usize {
        self.event_loop.tick(delta_ms, &mut self.document)
    }

    /// Advance page time to `target_ms`, running due timers. Returns how many ran.
    pub fn advance_to(&mut self, target_ms: u64) -> usize {
        self.event_loop.advance_to(target_ms, &mut self.document)
    }

    /// Run every pending timer regardless of its deadline
    pub fn run_until_idle(&mut self) -> Result<u64> {
        self.event_loop.run_until_idle(&mut self.document)
    }

    pub fn snapshot(&self) -> TextSnapshot {
        TextSnapshot {
            title: self.document.title(),
            text: self.document.body_text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_timers_mutate_its_document() {
        let mut page = Page::default();
        page.set_timeout(10, |doc: &mut Document| {
            let body = doc.body().unwrap();
            doc.append_text(body, "later").unwrap();
        });
        assert_eq!(page.tick(9), 0);
        assert_eq!(page.snapshot().text, "");
        assert_eq!(page.tick(1), 1);
        assert_eq!(page.snapshot().text, "later");
        assert_eq!(page.now_ms(), 10);
    }

    #[test]
    fn into_document_keeps_applied_changes() {
        let mut page = Page::default();
        page.set_timeout(5, |doc: &mut Document| {
            let body = doc.body().unwrap();
            doc.append_text(body, "fired").unwrap();
        });
        page.set_timeout(50, |doc: &mut Document| {
            let body = doc.body().unwrap();
            doc.append_text(body, " never").unwrap();
        });
        page.tick(5);

        let doc = page.into_document();
        assert_eq!(doc.body_text(), "fired");
        assert_eq!(doc.to_html(), "<html><head></head><body>fired</body></html>");
    }

    #[test]
    fn snapshot_of_a_deeply_nested_page() {
        let mut doc = Document::new();
        let mut top = doc.create_element("p");
        doc.append_text(top, "bottom").unwrap();
        for _ in 0..200_000 {
            let parent = doc.create_element("div");
            doc.append_child(parent, top).unwrap();
            top = parent;
        }
        let body = doc.body().unwrap();
        doc.append_child(body, top).unwrap();

        let mut page = Page::with_document(doc, PageConfig::default());
        crate::toast::show_toast(&mut page, "still works", None).unwrap();
        assert_eq!(page.snapshot().text, "bottomstill works");
    }

    #[cfg(feature = "html")]
    #[test]
    fn snapshot_reads_title_and_body() {
        let page = Page::from_html(
            "<html><head><title> Dashboard </title></head><body><p>Ready</p></body></html>",
            PageConfig::default(),
        );
        let snap = page.snapshot();
        assert_eq!(snap.title, "Dashboard");
        assert_eq!(snap.text, "Ready");
    }
}
