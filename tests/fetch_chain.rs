mod helpers;

use helpers::{ARTICLE_HTML, THIN_HTML, fetch_config};
use newsprobe::{
    acquisition::{Acquire, Acquirer, AcquisitionResult},
    extractor::{DensityExtractor, Heuristic},
    fetcher::StrategyKind,
};
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, method, path, query_param, query_param_is_missing},
};

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html; charset=utf-8")
}

/// The origin's own `/article-a`, not one of its `?amp=1` style variants.
fn origin_article() -> wiremock::MockBuilder {
    Mock::given(method("GET"))
        .and(path("/article-a"))
        .and(query_param_is_missing("amp"))
        .and(query_param_is_missing("outputType"))
}

#[tokio::test]
async fn well_formed_article_is_taken_from_direct_fetch() {
    let origin = MockServer::start().await;
    origin_article()
        .respond_with(html(ARTICLE_HTML))
        .expect(1)
        .mount(&origin)
        .await;

    let target = format!("{}/article-a", origin.uri());
    let result = Acquirer::from_config(&fetch_config(None, None))
        .unwrap()
        .acquire(&format!("{}?utm_source=newsletter", target))
        .await;

    let expected = DensityExtractor
        .extract(ARTICLE_HTML, &Url::parse(&target).unwrap())
        .unwrap();
    match result {
        AcquisitionResult::Text(article) => {
            assert_eq!(article.text, expected);
            assert_eq!(article.strategy, StrategyKind::Direct);
            assert_eq!(article.heuristic, "density");
            assert_eq!(article.url, target);
        }
        other => panic!("expected article text, got {:?}", other),
    }
}

#[tokio::test]
async fn forbidden_direct_fetch_tries_an_alternate_path_once() {
    let origin = MockServer::start().await;
    origin_article()
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&origin)
        .await;
    Mock::given(method("GET"))
        .and(path("/article-a/amp"))
        .respond_with(html(ARTICLE_HTML))
        .expect(1)
        .mount(&origin)
        .await;

    let result = Acquirer::from_config(&fetch_config(None, None))
        .unwrap()
        .acquire(&format!("{}/article-a", origin.uri()))
        .await;

    match result {
        AcquisitionResult::Text(article) => {
            assert_eq!(article.strategy, StrategyKind::AlternatePath)
        }
        other => panic!("expected article text, got {:?}", other),
    }
}

#[tokio::test]
async fn blocked_everywhere_reports_blocked() {
    let origin = MockServer::start().await;
    let render = MockServer::start().await;
    let proxy = MockServer::start().await;

    origin_article()
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&origin)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&origin)
        .await;
    Mock::given(method("POST"))
        .and(path("/content"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&render)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .expect(2)
        .mount(&proxy)
        .await;

    let config = fetch_config(Some(render.uri()), Some(format!("{}/", proxy.uri())));
    let result = Acquirer::from_config(&config)
        .unwrap()
        .acquire(&format!("{}/article-a", origin.uri()))
        .await;

    assert_eq!(result, AcquisitionResult::Blocked { status: 403 });
}

#[tokio::test]
async fn oversized_refusal_still_reports_blocked() {
    let origin = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(403).set_body_raw("x".repeat(6 * 1024 * 1024), "text/html"),
        )
        .mount(&origin)
        .await;

    let result = Acquirer::from_config(&fetch_config(None, None))
        .unwrap()
        .acquire(&format!("{}/article-a", origin.uri()))
        .await;

    assert_eq!(result, AcquisitionResult::Blocked { status: 403 });
}

#[tokio::test]
async fn unusable_markup_escalates_to_render() {
    let origin = MockServer::start().await;
    let render = MockServer::start().await;

    origin_article()
        .respond_with(html(THIN_HTML))
        .expect(1)
        .mount(&origin)
        .await;
    Mock::given(method("GET"))
        .and(path("/article-a/amp"))
        .respond_with(html(ARTICLE_HTML))
        .expect(0)
        .mount(&origin)
        .await;

    let target = format!("{}/article-a", origin.uri());
    Mock::given(method("POST"))
        .and(path("/content"))
        .and(body_partial_json(serde_json::json!({ "url": target })))
        .respond_with(html(ARTICLE_HTML))
        .expect(1)
        .mount(&render)
        .await;

    let result = Acquirer::from_config(&fetch_config(Some(render.uri()), None))
        .unwrap()
        .acquire(&target)
        .await;

    match result {
        AcquisitionResult::Text(article) => assert_eq!(article.strategy, StrategyKind::Render),
        other => panic!("expected article text, got {:?}", other),
    }
}

#[tokio::test]
async fn not_found_goes_straight_to_proxy() {
    let origin = MockServer::start().await;
    let render = MockServer::start().await;
    let proxy = MockServer::start().await;

    origin_article()
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&origin)
        .await;
    Mock::given(method("GET"))
        .and(path("/article-a/amp"))
        .respond_with(html(ARTICLE_HTML))
        .expect(0)
        .mount(&origin)
        .await;
    Mock::given(method("POST"))
        .respond_with(html(ARTICLE_HTML))
        .expect(0)
        .mount(&render)
        .await;

    let target = format!("{}/article-a", origin.uri());
    Mock::given(method("GET"))
        .and(query_param("api_key", "test-key"))
        .and(query_param("url", target.as_str()))
        .and(query_param("render", "true"))
        .respond_with(html(ARTICLE_HTML))
        .expect(1)
        .mount(&proxy)
        .await;

    let config = fetch_config(Some(render.uri()), Some(format!("{}/", proxy.uri())));
    let result = Acquirer::from_config(&config).unwrap().acquire(&target).await;

    match result {
        AcquisitionResult::Text(article) => assert_eq!(article.strategy, StrategyKind::Proxy),
        other => panic!("expected article text, got {:?}", other),
    }
}

#[tokio::test]
async fn nothing_usable_anywhere_is_unavailable() {
    let origin = MockServer::start().await;
    origin_article()
        .respond_with(html(THIN_HTML))
        .mount(&origin)
        .await;

    let result = Acquirer::from_config(&fetch_config(None, None))
        .unwrap()
        .acquire(&format!("{}/article-a", origin.uri()))
        .await;

    assert!(matches!(result, AcquisitionResult::Unavailable { .. }));
}
