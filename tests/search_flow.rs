//! End-to-end tests for the search flow: HTTP fetch → Atom scan → entities.
//!
//! Each test mounts its own mock server; no state is shared between tests.

use chirp::entities::{HasText, Query, Reloadable};
use chirp::feed::{SearchClient, SearchError};
use pretty_assertions::assert_eq;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:twitter="http://api.twitter.com/">
  <entry>
    <id>tag:search.example.com,2005:1</id>
    <published>2011-03-05T05:51:02Z</published>
    <link type="text/html" href="http://example.com/a/statuses/1" rel="alternate"/>
    <title>first post</title>
    <twitter:lang>en</twitter:lang>
    <author>
      <name>alice</name>
      <uri>http://example.com/alice</uri>
    </author>
  </entry>
  <entry>
    <published>2011-03-05T06:02:11Z</published>
    <link type="text/html" href="http://example.com/b/statuses/2" rel="alternate"/>
    <title>second post</title>
    <author>
      <name>bob</name>
      <uri>http://example.com/bob</uri>
    </author>
  </entry>
</feed>"#;

fn client_for(server: &MockServer) -> SearchClient {
    let endpoint = Url::parse(&format!("{}/search.atom", server.uri())).unwrap();
    SearchClient::with_endpoint(endpoint)
}

async fn mount_feed(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/search.atom"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("Content-Type", "application/xml"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn search_returns_posts_in_document_order() {
    let server = MockServer::start().await;
    mount_feed(&server, SEARCH_FEED).await;

    let posts = client_for(&server).search("rust").await.unwrap();

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].text.as_deref(), Some("first post"));
    assert_eq!(posts[0].author.name.as_deref(), Some("alice"));
    assert_eq!(
        posts[0].published_at.map(|t| t.timestamp()),
        Some(1_299_304_262)
    );
    assert_eq!(posts[1].text.as_deref(), Some("second post"));
    assert_eq!(
        posts[1].permalink.as_ref().map(Url::as_str),
        Some("http://example.com/b/statuses/2")
    );
}

#[tokio::test]
async fn empty_keyword_still_performs_the_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.atom"))
        .and(query_param("q", ""))
        .and(query_param("rpp", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<feed></feed>"))
        .expect(1)
        .mount(&server)
        .await;

    let posts = client_for(&server).search("").await.unwrap();
    assert!(posts.is_empty());
}

#[tokio::test]
async fn keyword_is_percent_encoded_into_the_query() {
    let server = MockServer::start().await;
    // wiremock compares decoded query values
    Mock::given(method("GET"))
        .and(path("/search.atom"))
        .and(query_param("q", "#netbeans"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<feed></feed>"))
        .expect(1)
        .mount(&server)
        .await;

    let posts = client_for(&server).search("#netbeans").await.unwrap();
    assert!(posts.is_empty());
}

#[tokio::test]
async fn non_2xx_surfaces_as_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    match client_for(&server).search("rust").await.unwrap_err() {
        SearchError::HttpStatus(503) => {}
        e => panic!("expected HttpStatus(503), got {:?}", e),
    }
}

#[tokio::test]
async fn truncated_body_surfaces_as_parse_error() {
    let server = MockServer::start().await;
    mount_feed(&server, "<feed><entry><published>2011-").await;

    match client_for(&server).search("rust").await.unwrap_err() {
        SearchError::Parse(_) => {}
        e => panic!("expected Parse, got {:?}", e),
    }
}

#[tokio::test]
async fn reload_replaces_results_on_success() {
    let server = MockServer::start().await;
    mount_feed(&server, SEARCH_FEED).await;

    let mut query = Query::new("rust", client_for(&server));
    assert!(query.posts().is_empty());

    query.reload().await.unwrap();
    assert_eq!(query.posts().len(), 2);
    assert_eq!(query.posts()[0].text.as_deref(), Some("first post"));
}

#[tokio::test]
async fn failed_reload_keeps_previous_results() {
    let server = MockServer::start().await;
    mount_feed(&server, SEARCH_FEED).await;

    let mut query = Query::new("rust", client_for(&server));
    query.reload().await.unwrap();
    assert_eq!(query.posts().len(), 2);

    // The endpoint starts failing; the old results must stay visible.
    server.reset().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = query.reload().await;
    assert!(result.is_err());
    assert_eq!(query.posts().len(), 2);
    assert_eq!(query.posts()[1].text.as_deref(), Some("second post"));
}

#[tokio::test]
async fn query_exposes_its_term_as_text() {
    let server = MockServer::start().await;
    let query = Query::new("rust async", client_for(&server));
    assert_eq!(query.text(), "Query term: rust async");
}

#[tokio::test]
async fn search_query_does_not_mutate_the_query() {
    let server = MockServer::start().await;
    mount_feed(&server, SEARCH_FEED).await;

    let client = client_for(&server);
    let query = Query::new("rust", client.clone());

    let posts = client.search_query(&query).await.unwrap();
    assert_eq!(posts.len(), 2);
    // The query's own list is only ever touched by reload()
    assert!(query.posts().is_empty());
}
