//! End-to-end conversion scenarios over a scripted strategy runner.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{Behavior, MockRunner, article_html, paywalled_html, spa_shell_html};
use evado_core::{
    ConversionOptions, Converter, EvadoError, Orchestrator, StrategyId, UrlCache, decode_body,
};

fn converter(runner: MockRunner) -> Converter {
    Converter::with_parts(
        Orchestrator::with_runner(Arc::new(runner)),
        UrlCache::default(),
    )
}

const EXAMPLE_DOMAIN_HTML: &str = r#"<!doctype html>
<html>
<head><title>Example Domain</title></head>
<body>
<div>
    <h1>Example Domain</h1>
    <p>This domain is for use in illustrative examples in documents. You may
    use this domain in literature without prior coordination or asking for
    permission.</p>
    <p><a href="https://www.iana.org/domains/example">More information...</a></p>
</div>
</body>
</html>"#;

#[tokio::test(start_paused = true)]
async fn direct_conversion_yields_markdown() {
    let runner = MockRunner::new().with(
        StrategyId::Direct,
        Behavior::Html { delay_ms: 10, body: EXAMPLE_DOMAIN_HTML.to_string() },
    );

    let result = converter(runner)
        .convert("https://example.com", &ConversionOptions::default())
        .await
        .unwrap();

    assert_eq!(result.strategy, "direct");
    assert!(!result.from_cache);
    assert_eq!(result.content_type, "text/plain; charset=utf-8");
    assert!(result.content.starts_with("# Example Domain"), "got: {}", result.content);
    assert!(result.content.contains("illustrative examples"));
}

#[tokio::test(start_paused = true)]
async fn paywalled_direct_loses_to_googlebot() {
    let runner = MockRunner::new()
        .with(StrategyId::Direct, Behavior::Html { delay_ms: 10, body: paywalled_html(12_000) })
        .with(StrategyId::Googlebot, Behavior::Html { delay_ms: 30, body: article_html(20_000) })
        .with(StrategyId::Facebookbot, Behavior::Fail { delay_ms: 50, error: "HTTP 403".into() })
        .with(StrategyId::Bingbot, Behavior::Fail { delay_ms: 50, error: "HTTP 403".into() });

    let options = ConversionOptions::builder().bypass(true).build();
    let result = converter(runner)
        .convert("https://paywalled.test/a", &options)
        .await
        .unwrap();

    assert_eq!(result.strategy, "googlebot");
    assert!(result.content.contains("ordinary prose"));
}

#[tokio::test(start_paused = true)]
async fn google_news_served_from_archive() {
    let runner = MockRunner::new().with(
        StrategyId::Archive,
        Behavior::Html { delay_ms: 20, body: article_html(12_000) },
    );

    let options = ConversionOptions::builder().bypass(true).build();
    let result = converter(runner)
        .convert("https://news.google.com/rss/articles/XYZ", &options)
        .await
        .unwrap();

    assert_eq!(result.strategy, "archive");
}

#[tokio::test(start_paused = true)]
async fn spa_site_falls_back_to_jina_markdown() {
    let shell = Behavior::Html { delay_ms: 10, body: spa_shell_html() };
    let jina_markdown = format!("# App Docs\n\n{}", "Useful words. ".repeat(140));
    let runner = MockRunner::new()
        .with(StrategyId::Direct, shell.clone())
        .with(StrategyId::Googlebot, shell.clone())
        .with(StrategyId::Facebookbot, shell.clone())
        .with(StrategyId::Bingbot, shell)
        .with(StrategyId::Twelveft, Behavior::Fail { delay_ms: 5, error: "HTTP 502".into() })
        .with(StrategyId::Archive, Behavior::Fail { delay_ms: 5, error: "no snapshot".into() })
        .with(StrategyId::Jina, Behavior::Markdown { delay_ms: 30, body: jina_markdown.clone() })
        .with(StrategyId::Exa, Behavior::Fail { delay_ms: 5, error: "timeout".into() });

    let options = ConversionOptions::builder().bypass(true).build();
    let result = converter(runner)
        .convert("https://spa.test/app", &options)
        .await
        .unwrap();

    assert_eq!(result.strategy, "jina");
    assert_eq!(result.content, jina_markdown);
}

#[tokio::test(start_paused = true)]
async fn gbk_body_converts_without_mojibake() {
    // The adapter decodes GBK bytes before the orchestrator sees them; feed
    // the decoder's output through the pipeline the way an adapter would.
    let mut page = String::from("<html><head><title>");
    let title_bytes: &[u8] = &[0xc4, 0xe3, 0xba, 0xc3]; // 你好 in GBK
    page.push_str(&decode_body(title_bytes, Some("text/html; charset=gb2312")));
    page.push_str("</title></head><body><p>");
    page.push_str(&decode_body(title_bytes, Some("text/html; charset=gb2312")));
    page.push_str(", reader.</p></body></html>");

    let runner = MockRunner::new()
        .with(StrategyId::Direct, Behavior::Html { delay_ms: 5, body: page });

    let result = converter(runner)
        .convert("https://cn.test/gbk", &ConversionOptions::default())
        .await
        .unwrap();

    assert!(result.content.contains("你好"));
    assert!(!result.content.contains('\u{fffd}'));
}

#[tokio::test(start_paused = true)]
async fn dead_origin_raises_aggregated_failure() {
    let fail = |e: &str| Behavior::Fail { delay_ms: 5, error: e.to_string() };
    let runner = MockRunner::new()
        .with(StrategyId::Direct, fail("connect error"))
        .with(StrategyId::Googlebot, fail("connect error"))
        .with(StrategyId::Facebookbot, fail("connect error"))
        .with(StrategyId::Bingbot, fail("connect error"))
        .with(StrategyId::Twelveft, fail("HTTP 502"))
        .with(StrategyId::Archive, fail("no snapshot"))
        .with(StrategyId::Jina, fail("timeout"))
        .with(StrategyId::Exa, fail("timeout"));

    let options = ConversionOptions::builder().bypass(true).build();
    let err = converter(runner)
        .convert("https://dead.test", &options)
        .await
        .unwrap_err();

    assert!(matches!(err, EvadoError::AllStrategiesFailed { .. }));
    let message = err.to_string();
    for name in ["direct", "googlebot", "jina", "exa"] {
        assert!(message.contains(name));
    }
}

#[tokio::test(start_paused = true)]
async fn invalid_url_rejected_before_any_fetch(){
    let runner = MockRunner::new();
    let err = converter(runner)
        .convert("ftp://example.com/file", &ConversionOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, EvadoError::InvalidUrl(_)));
}

#[tokio::test(start_paused = true)]
async fn second_conversion_within_ttl_hits_cache() {
    let runner = MockRunner::new().with(
        StrategyId::Direct,
        Behavior::Html { delay_ms: 10, body: EXAMPLE_DOMAIN_HTML.to_string() },
    );
    let converter = converter(runner);

    let first = converter
        .convert("https://example.com", &ConversionOptions::default())
        .await
        .unwrap();
    let second = converter
        .convert("https://example.com", &ConversionOptions::default())
        .await
        .unwrap();

    assert!(!first.from_cache);
    assert!(second.from_cache);
    assert_eq!(first.content, second.content);
    assert_eq!(first.strategy, second.strategy);
}

#[tokio::test(start_paused = true)]
async fn expired_entry_is_reconverted() {
    let runner = MockRunner::new().with(
        StrategyId::Direct,
        Behavior::Html { delay_ms: 10, body: EXAMPLE_DOMAIN_HTML.to_string() },
    );
    let converter = Converter::with_parts(
        Orchestrator::with_runner(Arc::new(runner)),
        UrlCache::new(Duration::from_millis(0), 100),
    );

    let first = converter
        .convert("https://example.com", &ConversionOptions::default())
        .await
        .unwrap();
    std::thread::sleep(Duration::from_millis(5));
    let second = converter
        .convert("https://example.com", &ConversionOptions::default())
        .await
        .unwrap();

    assert!(!first.from_cache);
    assert!(!second.from_cache);
}

#[tokio::test(start_paused = true)]
async fn cache_disabled_never_hits() {
    let runner = MockRunner::new().with(
        StrategyId::Direct,
        Behavior::Html { delay_ms: 10, body: EXAMPLE_DOMAIN_HTML.to_string() },
    );
    let converter = converter(runner);
    let options = ConversionOptions::builder().use_cache(false).build();

    let first = converter.convert("https://example.com", &options).await.unwrap();
    let second = converter.convert("https://example.com", &options).await.unwrap();

    assert!(!first.from_cache);
    assert!(!second.from_cache);
}

#[tokio::test(start_paused = true)]
async fn oldest_entry_evicted_after_hundred_and_one_urls() {
    let runner = MockRunner::new().with(
        StrategyId::Direct,
        Behavior::Html { delay_ms: 1, body: EXAMPLE_DOMAIN_HTML.to_string() },
    );
    let converter = converter(runner);
    let options = ConversionOptions::default();

    for i in 0..101 {
        converter
            .convert(&format!("https://example.com/page/{}", i), &options)
            .await
            .unwrap();
    }

    let first_again = converter
        .convert("https://example.com/page/0", &options)
        .await
        .unwrap();
    let recent_again = converter
        .convert("https://example.com/page/100", &options)
        .await
        .unwrap();

    assert!(!first_again.from_cache, "first URL should have been evicted");
    assert!(recent_again.from_cache);
}

#[tokio::test(start_paused = true)]
async fn json_ld_article_preferred_over_readability() {
    let body = "Structured sentence with substance. ".repeat(34); // ~1200 chars
    let html = format!(
        r#"<html><head>
            <title>Ignored Tag Title</title>
            <script type="application/ld+json">
            {{"@type": "Article", "headline": "Structured Headline",
              "articleBody": "{}",
              "author": {{"name": "Structured Author"}},
              "datePublished": "2024-04-01T00:00:00Z"}}
            </script>
        </head><body><article><p>DOM body that must not win.</p></article></body></html>"#,
        body.trim()
    );

    let runner = MockRunner::new()
        .with(StrategyId::Direct, Behavior::Html { delay_ms: 5, body: html });

    let result = converter(runner)
        .convert("https://structured.test/a", &ConversionOptions::default())
        .await
        .unwrap();

    assert!(result.content.starts_with("# Structured Headline\n\n"));
    assert!(result.content.contains("*By Structured Author*"));
    assert!(result.content.contains("Structured sentence with substance."));
    assert!(!result.content.contains("DOM body that must not win"));
    assert_eq!(result.title, Some("Structured Headline".to_string()));
}

#[tokio::test(start_paused = true)]
async fn json_envelope_for_markdown_winner() {
    let runner = MockRunner::new()
        .with(StrategyId::Jina, Behavior::Markdown { delay_ms: 5, body: "# Doc\n\nBody.".into() });

    let options = ConversionOptions::builder()
        .strategy(StrategyId::Jina)
        .json_format(true)
        .build();
    let result = converter(runner)
        .convert("https://example.com/doc", &options)
        .await
        .unwrap();

    assert_eq!(result.content_type, "application/json");
    let envelope: serde_json::Value = serde_json::from_str(&result.content).unwrap();
    assert_eq!(envelope["url"], "https://example.com/doc");
    assert_eq!(envelope["title"], "Extracted Content");
    assert_eq!(envelope["strategy"], "jina");
    assert_eq!(envelope["content"], "# Doc\n\nBody.");
    assert!(envelope["date"].is_string());
    assert!(envelope["elapsed"].is_number());
}

#[tokio::test(start_paused = true)]
async fn json_envelope_for_html_winner_carries_author() {
    let body = "Structured sentence with substance. ".repeat(34);
    let html = format!(
        r#"<html><head><script type="application/ld+json">
        {{"@type": "NewsArticle", "headline": "Enveloped", "articleBody": "{}",
          "author": {{"name": "Jane Writer"}}, "datePublished": "2024-02-02"}}
        </script></head><body></body></html>"#,
        body.trim()
    );

    let runner = MockRunner::new()
        .with(StrategyId::Direct, Behavior::Html { delay_ms: 5, body: html });

    let options = ConversionOptions::builder().json_format(true).build();
    let result = converter(runner)
        .convert("https://structured.test/b", &options)
        .await
        .unwrap();

    let envelope: serde_json::Value = serde_json::from_str(&result.content).unwrap();
    assert_eq!(envelope["title"], "Enveloped");
    assert_eq!(envelope["author"], "Jane Writer");
    assert_eq!(envelope["date"], "2024-02-02");
}

#[tokio::test(start_paused = true)]
async fn preserve_images_false_strips_image_markup() {
    let mut html = String::from(
        r#"<html><head><title>Pictures</title></head><body><article class="post-content">"#,
    );
    html.push_str(r#"<img src="https://ex.com/hero.jpg" alt="hero">"#);
    while html.len() < 2_000 {
        html.push_str("<p>Sentences about the pictures, with commas, and more text to extract.</p>");
    }
    html.push_str("</article></body></html>");

    let runner = MockRunner::new()
        .with(StrategyId::Direct, Behavior::Html { delay_ms: 5, body: html });

    let options = ConversionOptions::builder().preserve_images(false).build();
    let result = converter(runner)
        .convert("https://pics.test/a", &options)
        .await
        .unwrap();

    assert!(!result.content.contains("!["));
    assert!(!result.content.contains("hero.jpg"));
    assert!(result.content.contains("Sentences about the pictures"));
}
