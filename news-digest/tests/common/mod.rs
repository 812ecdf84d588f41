use chrono::{DateTime, TimeZone, Utc};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Fixed "now" used by report tests.
#[allow(dead_code)]
pub fn report_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
}

#[allow(dead_code)]
pub fn rss(items: &[(&str, &str, &str)]) -> String {
    let body: String = items
        .iter()
        .map(|(title, link, date)| {
            format!(
                "<item><title>{}</title><link>{}</link>\
                 <description>About {}</description><pubDate>{}</pubDate></item>",
                title, link, title, date
            )
        })
        .collect();
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel>"#,
            r#"<title>Test</title><link>https://example.com</link><description>test</description>"#,
            "{}</channel></rss>"
        ),
        body
    )
}
