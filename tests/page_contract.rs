#![cfg(feature = "html")]

use pagetoast::stylesheet::StylesheetIndex;
use pagetoast::{Document, Page, PageConfig, ToastConfig, ToastPresenter};

const ORDERS_PAGE: &str = "tests/pages/orders.html";

#[test]
fn loaded_page_gets_surface_appended_to_body() {
    let doc = Document::from_file(ORDERS_PAGE).expect("fixture page");
    let before = doc.fingerprint();
    let mut page = Page::with_document(doc, PageConfig::default());
    let mut toasts = ToastPresenter::new(ToastConfig::default()).unwrap();

    let el = toasts
        .show_toast(&mut page, "Order #12 shipped", Some("success"))
        .unwrap();
    let doc = page.document();
    assert_ne!(doc.fingerprint(), before);
    assert_eq!(doc.element(el).unwrap().parent(), doc.body());
    assert_eq!(page.snapshot().title, "Orders");
    assert!(page.snapshot().text.contains("3 pending"));
    assert!(page.snapshot().text.contains("Order #12 shipped"));
    assert!(doc.to_html().ends_with(concat!(
        "<div id=\"toast-notification\" class=\"toast show success\">",
        "Order #12 shipped</div></body></html>"
    )));
}

#[test]
fn fixture_stylesheet_covers_default_categories() {
    let doc = Document::from_file(ORDERS_PAGE).unwrap();
    let index = StylesheetIndex::from_document(&doc);
    let config = ToastConfig::default();

    assert!(index
        .missing_classes(&config, &["success", "error"])
        .is_empty());
    assert_eq!(
        index.missing_classes(&config, &["info", "warning"]),
        vec!["info".to_string(), "warning".to_string()]
    );
}

#[test]
fn same_calls_give_same_fingerprint() {
    let run = || {
        let mut page = Page::from_html(
            "<html><head></head><body><p>x</p></body></html>",
            PageConfig::default(),
        );
        let mut toasts = ToastPresenter::new(ToastConfig::default()).unwrap();
        toasts.show_toast(&mut page, "a", Some("error")).unwrap();
        page.tick(3000);
        page.document().fingerprint()
    };
    assert_eq!(run(), run());
}
