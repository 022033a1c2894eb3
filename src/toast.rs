//! Toast presenter: shows a message on the page's single notification surface.
//!
//! Each call resolves (or lazily creates) the surface, writes the message as
//! plain text, applies `base visible category` classes and schedules a
//! one-shot timer that strips the visible marker after `hide_delay_ms`.
//!
//! Under the default `HidePolicy::Independent` nothing is ever cancelled: if a
//! second toast is shown before the first one's timer fires, that first timer
//! still hides the surface on its original schedule. Text and category follow
//! the most recent call, hide timing follows the earliest pending timer.

use crate::dom::{Document, ElementId};
use crate::event_loop::TimerId;
use crate::stylesheet::StylesheetIndex;
use crate::{Error, HidePolicy, Page, Result, SurfaceSnapshot, ToastConfig};
use log::{debug, warn};
use std::collections::BTreeSet;

pub struct ToastPresenter {
    config: ToastConfig,
    surface: Option<ElementId>,
    pending_hide: Option<TimerId>,
    // built from the page's <style> blocks the first time a toast is shown
    stylesheet: Option<StylesheetIndex>,
    reported_missing: BTreeSet<String>,
}

impl ToastPresenter {
    pub fn new(config: ToastConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            surface: None,
            pending_hide: None,
            stylesheet: None,
            reported_missing: BTreeSet::new(),
        })
    }

    pub fn config(&self) -> &ToastConfig {
        &self.config
    }

    /// Handle of the surface resolved by the last call, if any
    pub fn surface(&self) -> Option<ElementId> {
        self.surface
    }

    /// Show `message` with `category` (the configured default when `None`).
    ///
    /// The surface is visible when this returns. Hiding happens later, when the
    /// page's event loop reaches the scheduled deadline.
    pub fn show_toast(
        &mut self,
        page: &mut Page,
        message: &str,
        category: Option<&str>,
    ) -> Result<ElementId> {
        let category = category
            .unwrap_or(self.config.default_category.as_str())
            .to_string();
        let surface = self.ensure_surface(page)?;
        self.check_contract(page.document(), &category);

        let class_name = self.class_name_for(&category);
        let doc = page.document_mut();
        doc.set_text_content(surface, message)?;
        doc.set_attribute(surface, "class", &class_name)?;

        if self.config.hide_policy == HidePolicy::CancelPrevious {
            if let Some(previous) = self.pending_hide.take() {
                if page.clear_timeout(previous) {
                    debug!("cancelled pending toast hide {}", previous);
                }
            }
        }

        let visible = self.config.visible_class.clone();
        let timer = page.set_timeout(self.config.hide_delay_ms, move |doc: &mut Document| {
            hide_surface(doc, surface, &visible)
        });
        self.pending_hide = Some(timer);

        debug!(
            "toast shown on {} at {}ms (class=\"{}\", hide via {} in {}ms)",
            surface,
            page.now_ms(),
            class_name,
            timer,
            self.config.hide_delay_ms
        );
        Ok(surface)
    }

    /// Current state of the surface, or `None` before it exists
    pub fn surface_snapshot(&self, page: &Page) -> Option<SurfaceSnapshot> {
        let doc = page.document();
        let surface = self
            .surface
            .filter(|s| self.is_live_surface(doc, *s))
            .or_else(|| doc.get_element_by_id(&self.config.surface_id))?;
        snapshot_of(doc, surface, &self.config.visible_class)
    }

    fn is_live_surface(&self, doc: &Document, id: ElementId) -> bool {
        doc.is_attached(id)
            && doc
                .element(id)
                .map(|el| el.id() == Some(self.config.surface_id.as_str()))
                .unwrap_or(false)
    }

    fn ensure_surface(&mut self, page: &mut Page) -> Result<ElementId> {
        if let Some(cached) = self.surface {
            if self.is_live_surface(page.document(), cached) {
                return Ok(cached);
            }
            warn!(
                "toast surface {} is no longer attached as #{}; resolving again",
                cached, self.config.surface_id
            );
            self.surface = None;
        }

        if let Some(found) = page.document().get_element_by_id(&self.config.surface_id) {
            self.surface = Some(found);
            return Ok(found);
        }

        let body = page.document().body().ok_or(Error::MissingBody)?;

        let doc = page.document_mut();
        let el = doc.create_element(&self.config.surface_tag);
        doc.set_attribute(el, "id", &self.config.surface_id)?;
        doc.set_attribute(el, "class", &self.config.base_class)?;
        doc.append_child(body, el)?;
        debug!("created toast surface #{} as {}", self.config.surface_id, el);

        self.surface = Some(el);
        Ok(el)
    }

    fn class_name_for(&self, category: &str) -> String {
        let mapped = self
            .config
            .category_classes
            .get(category)
            .map(String::as_str)
            .unwrap_or(category);
        format!(
            "{} {} {}",
            self.config.base_class, self.config.visible_class, mapped
        )
    }

    /// Warn about classes applied for `category` that the page stylesheet
    /// never defines. Each class is reported once; returns the newly reported ones.
    fn check_contract(&mut self, doc: &Document, category: &str) -> Vec<String> {
        let index = self
            .stylesheet
            .get_or_insert_with(|| StylesheetIndex::from_document(doc));
        if index.is_empty() {
            return Vec::new();
        }
        let fresh: Vec<String> = index
            .missing_classes(&self.config, &[category])
            .into_iter()
            .filter(|class| self.reported_missing.insert(class.clone()))
            .collect();
        if !fresh.is_empty() {
            warn!(
                "page stylesheet does not define toast classes: {}",
                fresh.join(", ")
            );
        }
        fresh
    }
}

fn hide_surface(doc: &mut Document, surface: ElementId, visible_class: &str) {
    match doc.element_mut(surface) {
        Ok(el) => {
            if el.class_list_mut().remove_first(visible_class) {
                debug!("toast surface {} hidden", surface);
            }
        }
        Err(e) => warn!("toast hide skipped: {}", e),
    }
}

fn snapshot_of(
    doc: &Document,
    surface: ElementId,
    visible_class: &str,
) -> Option<SurfaceSnapshot> {
    let el = doc.element(surface).ok()?;
    Some(SurfaceSnapshot {
        text: doc.text_content(surface).ok()?,
        classes: el.class_list().iter().map(str::to_string).collect(),
        visible: el.class_list().contains(visible_class),
    })
}

/// Show a toast with the default configuration.
///
/// The surface is looked up by its identifier on every call, so this works on
/// any page without keeping a presenter around.
pub fn show_toast(page: &mut Page, message: &str, category: Option<&str>) -> Result<ElementId> {
    ToastPresenter::new(ToastConfig::default())?.show_toast(page, message, category)
}
