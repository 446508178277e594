use std::sync::Arc;

use chrono::{TimeZone, Utc};
use feed_core::{ListingFilter, ListingQuery, SortOrder};
use feed_engine::{FailureKind, FeedClient, FetchSettings, LemmyClient, ReqwestFetcher};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn post_view(id: i64, comments: i64) -> serde_json::Value {
    json!({
        "post": {
            "id": id,
            "name": format!("Post {id}"),
            "body": "",
            "url": "https://news.example/story",
            "thumbnail_url": null,
            "published": "2024-03-01T10:00:00.000000Z"
        },
        "creator": { "name": "alice", "display_name": "Alice", "avatar": null },
        "community": { "name": "rust", "title": "Rust", "icon": "https://img.example/rust.png" },
        "counts": { "score": 12, "comments": comments }
    })
}

fn client(server: &MockServer, token: Option<&str>) -> LemmyClient {
    let fetcher = ReqwestFetcher::new(FetchSettings::default())
        .with_bearer_token(token.map(str::to_string));
    LemmyClient::new(&server.uri(), Arc::new(fetcher)).unwrap()
}

#[tokio::test]
async fn listing_sends_sort_filter_and_one_based_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/post/list"))
        .and(query_param("sort", "New"))
        .and(query_param("type_", "Local"))
        .and(query_param("page", "3"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "posts": [post_view(7, 41), post_view(8, 0)] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let posts = client(&server, None)
        .list_posts(ListingQuery {
            sort: SortOrder::New,
            filter: ListingFilter::Local,
            page: 2,
        })
        .await
        .unwrap();

    assert_eq!(posts.iter().map(|p| p.id).collect::<Vec<_>>(), vec![7, 8]);
    let first = &posts[0];
    assert_eq!(first.title, "Post 7");
    assert_eq!(first.body, None);
    assert_eq!(first.url.as_deref(), Some("https://news.example/story"));
    assert_eq!(first.comment_count, 41);
    assert_eq!(first.score, 12);
    assert_eq!(first.author.shown_name(), "Alice");
    assert_eq!(first.community.icon_url.as_deref(), Some("https://img.example/rust.png"));
    assert_eq!(
        first.published,
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
    );
}

#[tokio::test]
async fn post_detail_is_unwrapped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/post"))
        .and(query_param("id", "9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "post_view": post_view(9, 3) })))
        .mount(&server)
        .await;

    let post = client(&server, None).get_post(9).await.unwrap();
    assert_eq!(post.id, 9);
    assert_eq!(post.comment_count, 3);
}

#[tokio::test]
async fn comment_page_carries_paths_and_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/comment/list"))
        .and(query_param("post_id", "9"))
        .and(query_param("limit", "40"))
        .and(query_param("page", "2"))
        .and(header("Authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "comments": [{
                "comment": {
                    "id": 11,
                    "post_id": 9,
                    "path": "0.10.11",
                    "content": "agreed",
                    "published": "2024-03-01T10:00:00"
                },
                "creator": { "name": "bob" },
                "counts": { "score": -2 }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let comments = client(&server, Some("tok"))
        .list_comments(9, 2, 40)
        .await
        .unwrap();

    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].path, "0.10.11");
    assert_eq!(comments[0].score, -2);
    assert_eq!(comments[0].author.shown_name(), "bob");
}

#[tokio::test]
async fn unexpected_json_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(path("/api/v3/post/list"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client(&server, None)
        .list_posts(ListingQuery {
            sort: SortOrder::Active,
            filter: ListingFilter::All,
            page: 0,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[test]
fn instance_url_must_parse() {
    let fetcher = Arc::new(ReqwestFetcher::new(FetchSettings::default()));
    let err = LemmyClient::new("lemmy without scheme", fetcher).err().unwrap();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}
