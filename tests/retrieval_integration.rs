//! Integration tests for the retrieval loop against mock HTTP servers.
//!
//! A single `wiremock` server plays both roles: the search API (GET on
//! the backend path) and the sites behind each candidate URL (HEAD probes).

use std::time::{Duration, Instant};

use link_retriever::{
    ApiKey, Query, RetrievalError, Retriever, RetrieverConfig, SearchBackend, SearchResult,
};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BING_PATH: &str = "/v7.0/search";
const BRAVE_PATH: &str = "/res/v1/web/search";

fn bing_body(urls: &[String]) -> Value {
    let value: Vec<Value> = urls
        .iter()
        .enumerate()
        .map(|(i, url)| {
            json!({
                "name": format!("Result <b>{i}</b>"),
                "url": url,
                "snippet": format!("Snippet for result {i} &amp; more"),
            })
        })
        .collect();
    json!({ "_type": "SearchResponse", "webPages": { "value": value } })
}

fn site(server: &MockServer, p: &str) -> String {
    format!("{}{p}", server.uri())
}

async fn mount_bing_page(
    server: &MockServer,
    offset: usize,
    urls: &[String],
    expected_calls: u64,
) {
    Mock::given(method("GET"))
        .and(path(BING_PATH))
        .and(query_param("offset", offset.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(bing_body(urls)))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_head(
    server: &MockServer,
    p: &str,
    template: ResponseTemplate,
    expected_calls: u64,
) {
    Mock::given(method("HEAD"))
        .and(path(p))
        .respond_with(template)
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn bing_config(server: &MockServer) -> RetrieverConfig {
    RetrieverConfig {
        base_url: Some(site(server, BING_PATH)),
        probe_timeout_ms: 1_000,
        ..Default::default()
    }
}

fn bing_retriever(config: RetrieverConfig) -> Retriever {
    Retriever::new(config, ApiKey::new("test-key").expect("key")).expect("retriever")
}

fn urls_of(results: &[SearchResult]) -> Vec<&str> {
    results.iter().map(|r| r.url.as_str()).collect()
}

#[tokio::test]
async fn returns_requested_count_in_backend_order_without_extra_probes() {
    let server = MockServer::start().await;
    let candidates: Vec<String> = (0..5).map(|i| site(&server, &format!("/page/{i}"))).collect();

    Mock::given(method("GET"))
        .and(path(BING_PATH))
        .and(header("Ocp-Apim-Subscription-Key", "test-key"))
        .and(query_param("q", "rust ownership"))
        .and(query_param("count", "3"))
        .and(query_param("offset", "0"))
        .and(query_param("responseFilter", "Webpages"))
        .and(query_param("safeSearch", "Strict"))
        .and(query_param("setLang", "en-GB"))
        .and(query_param("textFormat", "HTML"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bing_body(&candidates)))
        .expect(1)
        .mount(&server)
        .await;
    for i in 0..3 {
        mount_head(&server, &format!("/page/{i}"), ResponseTemplate::new(200), 1).await;
    }
    for i in 3..5 {
        mount_head(&server, &format!("/page/{i}"), ResponseTemplate::new(200), 0).await;
    }

    let retriever = bing_retriever(bing_config(&server));
    let results = retriever.retrieve(&Query::new("rust ownership", 3)).await;

    assert_eq!(
        urls_of(&results),
        vec![
            candidates[0].as_str(),
            candidates[1].as_str(),
            candidates[2].as_str(),
        ]
    );
    assert_eq!(results[0].title, "Result 0");
    assert_eq!(results[0].snippet, "Snippet for result 0 & more");
}

#[tokio::test]
async fn too_few_matches_on_first_page_requests_next_offset() {
    let server = MockServer::start().await;
    let first_match = site(&server, "/match/1");
    let second_match = site(&server, "/match/2");

    mount_bing_page(
        &server,
        0,
        &[
            "https://elsewhere.test/a".to_string(),
            first_match.clone(),
            "https://another.test/b".to_string(),
        ],
        1,
    )
    .await;
    mount_bing_page(&server, 5, &[second_match.clone()], 1).await;
    mount_bing_page(&server, 10, &[], 1).await;
    mount_head(&server, "/match/1", ResponseTemplate::new(200), 1).await;
    mount_head(&server, "/match/2", ResponseTemplate::new(200), 1).await;

    let retriever = bing_retriever(bing_config(&server));
    let query = Query::new("x", 5).with_domains(["127.0.0.1"]);
    let report = retriever
        .retrieve_report(&query, &CancellationToken::new())
        .await;

    assert_eq!(
        urls_of(&report.results),
        vec![first_match.as_str(), second_match.as_str()]
    );
    assert!(report.results.iter().all(|r| r.url.to_lowercase().contains("127.0.0.1")));
    assert_eq!(report.stats.domain_mismatch, 2);
    assert_eq!(report.attempts, 3);
}

#[tokio::test]
async fn url_repeated_on_second_page_is_a_duplicate() {
    let server = MockServer::start().await;
    let a = site(&server, "/a");
    let b = site(&server, "/b");
    let c = site(&server, "/c");

    mount_bing_page(&server, 0, &[a.clone(), b.clone()], 1).await;
    mount_bing_page(&server, 3, &[b.clone(), c.clone()], 1).await;
    mount_head(&server, "/a", ResponseTemplate::new(200), 1).await;
    mount_head(&server, "/b", ResponseTemplate::new(200), 1).await;
    mount_head(&server, "/c", ResponseTemplate::new(200), 1).await;

    let retriever = bing_retriever(bing_config(&server));
    let report = retriever
        .retrieve_report(&Query::new("x", 3), &CancellationToken::new())
        .await;

    assert_eq!(urls_of(&report.results), vec![a.as_str(), b.as_str(), c.as_str()]);
    assert_eq!(report.stats.duplicate, 1);
}

#[tokio::test]
async fn probe_timeout_counts_as_dead_link() {
    let server = MockServer::start().await;
    let slow = site(&server, "/slow");
    let fast = site(&server, "/fast");

    mount_bing_page(&server, 0, &[slow.clone(), fast.clone()], 1).await;
    mount_bing_page(&server, 2, &[], 1).await;
    mount_head(
        &server,
        "/slow",
        ResponseTemplate::new(200).set_delay(Duration::from_secs(2)),
        1,
    )
    .await;
    mount_head(&server, "/fast", ResponseTemplate::new(200), 1).await;

    let config = RetrieverConfig {
        probe_timeout_ms: 300,
        ..bing_config(&server)
    };
    let report = bing_retriever(config)
        .retrieve_report(&Query::new("x", 2), &CancellationToken::new())
        .await;

    assert_eq!(urls_of(&report.results), vec![fast.as_str()]);
    assert_eq!(report.stats.dead_link, 1);
    assert!(!report.cancelled);
}

#[tokio::test]
async fn missing_credential_fails_before_any_request() {
    let server = MockServer::start().await;
    let result = Retriever::from_lookup(bing_config(&server), |_| None);

    assert!(matches!(
        result,
        Err(RetrievalError::MissingCredential { var: "BING_API_KEY" })
    ));
    let received = server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty());
}

#[tokio::test]
async fn unusable_pages_never_exceed_attempt_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(BING_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(bing_body(&[
            "https://www.youtube.com/watch?v=1".to_string(),
            "https://youtube.com/watch?v=2".to_string(),
        ])))
        .expect(5)
        .mount(&server)
        .await;

    let report = bing_retriever(bing_config(&server))
        .retrieve_report(&Query::new("x", 4), &CancellationToken::new())
        .await;

    assert!(report.results.is_empty());
    assert_eq!(report.attempts, 5);
    assert_eq!(report.stats.blocked_source, 10);
    assert_eq!(report.stats.domain_filtered(), 10);
}

#[tokio::test]
async fn backend_error_status_returns_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(BING_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let results = bing_retriever(bing_config(&server))
        .retrieve(&Query::new("x", 3))
        .await;
    assert!(results.is_empty());
}

#[tokio::test]
async fn malformed_body_keeps_results_accepted_so_far() {
    let server = MockServer::start().await;
    let a = site(&server, "/a");
    mount_bing_page(&server, 0, &[a.clone()], 1).await;
    Mock::given(method("GET"))
        .and(path(BING_PATH))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .expect(1)
        .mount(&server)
        .await;
    mount_head(&server, "/a", ResponseTemplate::new(200), 1).await;

    let report = bing_retriever(bing_config(&server))
        .retrieve_report(&Query::new("x", 2), &CancellationToken::new())
        .await;

    assert_eq!(urls_of(&report.results), vec![a.as_str()]);
    assert_eq!(report.attempts, 2);
}

#[tokio::test]
async fn dead_and_blocked_links_are_skipped() {
    let server = MockServer::start().await;
    let gone = site(&server, "/gone");
    let live = site(&server, "/live");
    mount_bing_page(
        &server,
        0,
        &[
            "https://www.youtube.com/watch?v=abc".to_string(),
            gone.clone(),
            live.clone(),
        ],
        1,
    )
    .await;
    mount_head(&server, "/gone", ResponseTemplate::new(404), 1).await;
    mount_head(&server, "/live", ResponseTemplate::new(200), 1).await;

    let report = bing_retriever(bing_config(&server))
        .retrieve_report(&Query::new("x", 1), &CancellationToken::new())
        .await;

    assert_eq!(urls_of(&report.results), vec![live.as_str()]);
    assert_eq!(report.stats.blocked_source, 1);
    assert_eq!(report.stats.dead_link, 1);
}

#[tokio::test]
async fn concurrent_probes_keep_page_order() {
    let server = MockServer::start().await;
    let slow = site(&server, "/slow");
    let fast = site(&server, "/fast");
    mount_bing_page(&server, 0, &[slow.clone(), fast.clone()], 1).await;
    mount_head(
        &server,
        "/slow",
        ResponseTemplate::new(200).set_delay(Duration::from_millis(300)),
        1,
    )
    .await;
    mount_head(&server, "/fast", ResponseTemplate::new(200), 1).await;

    let results = bing_retriever(bing_config(&server))
        .retrieve(&Query::new("x", 2))
        .await;

    assert_eq!(urls_of(&results), vec![slow.as_str(), fast.as_str()]);
}

#[tokio::test]
async fn sequential_probing_gives_same_results() {
    let server = MockServer::start().await;
    let urls: Vec<String> = (0..4).map(|i| site(&server, &format!("/p{i}"))).collect();
    mount_bing_page(&server, 0, &urls, 1).await;
    mount_head(&server, "/p0", ResponseTemplate::new(200), 1).await;
    mount_head(&server, "/p1", ResponseTemplate::new(500), 1).await;
    mount_head(&server, "/p2", ResponseTemplate::new(200), 1).await;
    mount_head(&server, "/p3", ResponseTemplate::new(200), 0).await;

    let config = RetrieverConfig {
        probe_concurrency: 1,
        ..bing_config(&server)
    };
    let report = bing_retriever(config)
        .retrieve_report(&Query::new("x", 2), &CancellationToken::new())
        .await;

    assert_eq!(urls_of(&report.results), vec![urls[0].as_str(), urls[2].as_str()]);
    assert_eq!(report.stats.dead_link, 1);
}

#[tokio::test]
async fn cancellation_aborts_in_flight_probe() {
    let server = MockServer::start().await;
    let hang = site(&server, "/hang");
    mount_bing_page(&server, 0, &[hang], 1).await;
    mount_head(
        &server,
        "/hang",
        ResponseTemplate::new(200).set_delay(Duration::from_secs(5)),
        1,
    )
    .await;

    let config = RetrieverConfig {
        probe_timeout_ms: 10_000,
        ..bing_config(&server)
    };
    let retriever = bing_retriever(config);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let report = retriever.retrieve_report(&Query::new("x", 1), &cancel).await;

    assert!(report.cancelled);
    assert!(report.results.is_empty());
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn cancellation_keeps_probes_that_already_succeeded() {
    let server = MockServer::start().await;
    let fast = site(&server, "/fast");
    let hang = site(&server, "/hang");
    mount_bing_page(&server, 0, &[fast.clone(), hang], 1).await;
    mount_head(&server, "/fast", ResponseTemplate::new(200), 1).await;
    mount_head(
        &server,
        "/hang",
        ResponseTemplate::new(200).set_delay(Duration::from_secs(5)),
        1,
    )
    .await;

    let config = RetrieverConfig {
        probe_timeout_ms: 10_000,
        ..bing_config(&server)
    };
    let retriever = bing_retriever(config);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        trigger.cancel();
    });

    let report = retriever.retrieve_report(&Query::new("x", 2), &cancel).await;

    assert!(report.cancelled);
    assert_eq!(urls_of(&report.results), vec![fast.as_str()]);
}

#[tokio::test]
async fn brave_backend_pages_by_index_with_token_header() {
    let server = MockServer::start().await;
    let first = site(&server, "/brave/1");
    let second = site(&server, "/brave/2");

    let brave_body = |urls: &[&str]| {
        let results: Vec<Value> = urls
            .iter()
            .map(|u| {
                json!({
                    "title": "Brave <strong>hit</strong>",
                    "url": u,
                    "description": "desc",
                })
            })
            .collect();
        json!({ "type": "search", "web": { "type": "search", "results": results } })
    };

    Mock::given(method("GET"))
        .and(path(BRAVE_PATH))
        .and(header("X-Subscription-Token", "brave-key"))
        .and(query_param("offset", "0"))
        .and(query_param("count", "2"))
        .and(query_param("safesearch", "strict"))
        .and(query_param("search_lang", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_json(brave_body(&[
            first.as_str(),
            "https://www.youtube.com/watch?v=z",
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(BRAVE_PATH))
        .and(query_param("offset", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(brave_body(&[second.as_str()])))
        .expect(1)
        .mount(&server)
        .await;
    mount_head(&server, "/brave/1", ResponseTemplate::new(200), 1).await;
    mount_head(&server, "/brave/2", ResponseTemplate::new(200), 1).await;

    let config = RetrieverConfig {
        backend: SearchBackend::Brave,
        base_url: Some(site(&server, BRAVE_PATH)),
        probe_timeout_ms: 1_000,
        ..Default::default()
    };
    let retriever = Retriever::from_lookup(config, |var| {
        (var == "BRAVE_API_KEY").then(|| "brave-key".to_string())
    })
    .expect("retriever");

    let results = retriever.retrieve(&Query::new("tokio", 2)).await;

    assert_eq!(urls_of(&results), vec![first.as_str(), second.as_str()]);
    assert_eq!(results[0].title, "Brave hit");
}
