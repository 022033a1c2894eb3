use criterion::{criterion_group, criterion_main, Criterion};
use pagetoast::{Page, PageConfig, ToastConfig, ToastPresenter};

fn bench_show_toast(c: &mut Criterion) {
    let mut page = Page::new(PageConfig::default());
    let mut toasts = ToastPresenter::new(ToastConfig::default()).expect("valid config");

    c.bench_function("show_toast", |b| {
        b.iter(|| {
            toasts
                .show_toast(&mut page, "Saved successfully", Some("success"))
                .unwrap();
            // drain the hide so the timer queue stays flat across iterations
            page.tick(3000);
        })
    });
}

fn bench_large_page_lookup(c: &mut Criterion) {
    let mut body = String::new();
    for i in 0..2000 {
        body.push_str(&format!("<div class=row id=r{}><span>{}</span></div>", i, i));
    }
    let html = format!("<html><head></head><body>{}</body></html>", body);
    let mut page = Page::from_html(&html, PageConfig::default());

    c.bench_function("show_toast_uncached_2000_rows", |b| {
        b.iter(|| {
            pagetoast::show_toast(&mut page, "row updated", None).unwrap();
            page.tick(3000);
        })
    });
}

criterion_group!(benches, bench_show_toast, bench_large_page_lookup);
criterion_main!(benches);
