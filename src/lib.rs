//! Page toasts
//!
//! Transient page notifications ("toasts") over a headless element tree and a
//! single-threaded timer loop. A toast is one reusable surface element: every
//! call sets its text and category, marks it visible, and schedules a one-shot
//! timer that removes the visible marker again.
//!
//! # Example
//!
//! ```
//! use pagetoast::{Page, PageConfig, ToastConfig, ToastPresenter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut page = Page::new(PageConfig::default());
//! let mut toasts = ToastPresenter::new(ToastConfig::default())?;
//!
//! toasts.show_toast(&mut page, "Saved successfully", Some("success"))?;
//! let shown = toasts.surface_snapshot(&page).expect("surface exists");
//! assert!(shown.visible);
//!
//! page.tick(3000);
//! let hidden = toasts.surface_snapshot(&page).expect("surface exists");
//! assert!(!hidden.visible);
//! assert!(hidden.classes.iter().any(|c| c == "success"));
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub mod error;
pub use error::{Error, Result};

pub mod dom;
pub use dom::{ClassList, Document, ElementId};

// Virtual-clock timer queue driving deferred page actions
pub mod event_loop;
pub use event_loop::TimerId;

pub mod page;
pub use page::Page;

pub mod toast;
pub use toast::{show_toast, ToastPresenter};

// Class selectors defined by the page's stylesheets
pub mod stylesheet;

pub mod scenario;

// Async-friendly service backed by a page-owning worker thread
pub mod async_api;
pub use async_api::ToastService;

/// What happens to an earlier pending hide when a new toast is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HidePolicy {
    /// Every call schedules its own hide and none is ever cancelled. An
    /// earlier timer may hide a later message before its full delay.
    #[default]
    Independent,
    /// Cancel the previously scheduled hide before scheduling a new one.
    CancelPrevious,
}

/// Configuration for the toast presenter
///
/// The defaults match the stylesheet contract most pages ship with: a
/// `div#toast-notification.toast` surface, a `show` class for the visible
/// state and a three second display time.
///
/// # Examples
///
/// ```
/// let cfg = pagetoast::ToastConfig::default();
/// assert_eq!(cfg.hide_delay_ms, 3000);
/// assert_eq!(cfg.visible_class, "show");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToastConfig {
    /// Fixed identifier of the notification surface
    pub surface_id: String,
    /// Tag used when the surface has to be created
    pub surface_tag: String,
    /// Class the surface always carries (its hidden appearance)
    pub base_class: String,
    /// Marker class for the visible state
    pub visible_class: String,
    /// Category applied when a caller does not pass one
    pub default_category: String,
    /// Delay before the visible marker is removed, in milliseconds
    pub hide_delay_ms: u64,
    /// Whether a new toast cancels the previous pending hide
    pub hide_policy: HidePolicy,
    /// Category label to class string mapping; unmapped labels pass through as-is
    pub category_classes: BTreeMap<String, String>,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            surface_id: "toast-notification".to_string(),
            surface_tag: "div".to_string(),
            base_class: "toast".to_string(),
            visible_class: "show".to_string(),
            default_category: "info".to_string(),
            hide_delay_ms: 3000,
            hide_policy: HidePolicy::Independent,
            category_classes: BTreeMap::new(),
        }
    }
}

fn is_single_token(s: &str) -> bool {
    !s.is_empty() && !s.chars().any(char::is_whitespace)
}

impl ToastConfig {
    /// Parse a JSON config; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: ToastConfig = serde_json::from_str(json)
            .map_err(|e| Error::ConfigError(format!("invalid toast config: {}", e)))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check the identifiers and class names are usable as single tokens
    pub fn validate(&self) -> Result<()> {
        if !is_single_token(&self.surface_id) {
            return Err(Error::ConfigError(format!(
                "surface_id must be a non-empty token without whitespace, got {:?}",
                self.surface_id
            )));
        }
        if self.surface_tag.is_empty()
            || !self.surface_tag.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(Error::ConfigError(format!(
                "surface_tag must be an alphanumeric tag name, got {:?}",
                self.surface_tag
            )));
        }
        for (field, value) in [
            ("base_class", &self.base_class),
            ("visible_class", &self.visible_class),
        ] {
            if !is_single_token(value) {
                return Err(Error::ConfigError(format!(
                    "{} must be a single class token, got {:?}",
                    field, value
                )));
            }
        }
        if self.base_class == self.visible_class {
            return Err(Error::ConfigError(
                "base_class and visible_class must differ".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for a page environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageConfig {
    /// Maximum callbacks `run_until_idle` runs before giving up (0 => unlimited)
    pub timer_iteration_limit: u64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            timer_iteration_limit: 10_000,
        }
    }
}

/// A textual snapshot of a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextSnapshot {
    /// Page title
    pub title: String,
    /// Text content of the body
    pub text: String,
}

/// State of the notification surface at one instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceSnapshot {
    /// Displayed text
    pub text: String,
    /// Class tokens in order
    pub classes: Vec<String>,
    /// Whether the visible marker is present
    pub visible: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ToastConfig::default();
        assert_eq!(config.surface_id, "toast-notification");
        assert_eq!(config.default_category, "info");
        assert_eq!(config.hide_policy, HidePolicy::Independent);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn json_config_fills_missing_fields() {
        let cfg = ToastConfig::from_json_str(
            r#"{ "hide_delay_ms": 500, "hide_policy": "cancel_previous",
                 "category_classes": { "error": "toast-error urgent" } }"#,
        )
        .unwrap();
        assert_eq!(cfg.hide_delay_ms, 500);
        assert_eq!(cfg.hide_policy, HidePolicy::CancelPrevious);
        assert_eq!(cfg.visible_class, "show");
        assert_eq!(cfg.category_classes["error"], "toast-error urgent");
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let bad_id = ToastConfig {
            surface_id: "toast notification".into(),
            ..Default::default()
        };
        assert!(matches!(bad_id.validate(), Err(Error::ConfigError(_))));

        let same = ToastConfig {
            visible_class: "toast".into(),
            ..Default::default()
        };
        assert!(same.validate().is_err());

        let bad_tag = ToastConfig {
            surface_tag: "<div>".into(),
            ..Default::default()
        };
        assert!(bad_tag.validate().is_err());

        assert!(matches!(
            ToastConfig::from_json_str("{ \"hide_delay_ms\": -1 }"),
            Err(Error::ConfigError(_))
        ));
    }
}
