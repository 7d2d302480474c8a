//! End-to-end tests: requests go through `Blog::handle`, the same path the
//! server uses, against a throwaway SQLite file.

use std::sync::Arc;

use leaflet::config::DatabaseConfig;
use leaflet::store::ArticleStore;
use leaflet::{Blog, Method, Request, Response};
use tempfile::TempDir;

async fn blog() -> (TempDir, Arc<Blog>) {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        max_open: 4,
        max_idle: 1,
        ..DatabaseConfig::at(dir.path().join("blog.db"))
    };
    let store = ArticleStore::connect(&config).await.unwrap();
    (dir, Blog::new(store))
}

async fn get(blog: &Arc<Blog>, path: &str) -> Response {
    Arc::clone(blog).handle(Request::new(Method::Get, path)).await
}

async fn post(blog: &Arc<Blog>, path: &str, title: &str, body: &str) -> Response {
    let form = serde_urlencoded::to_string(&[("title", title), ("body", body)]).unwrap();
    let req = Request::new(Method::Post, path)
        .with_header("content-type", "application/x-www-form-urlencoded")
        .with_body(form);
    Arc::clone(blog).handle(req).await
}

#[tokio::test]
async fn static_pages_answer_ok() {
    let (_dir, blog) = blog().await;
    for path in ["/", "/about", "/articles", "/articles/create", "/healthz", "/readyz"] {
        assert_eq!(get(&blog, path).await.status_code(), 200, "GET {path}");
    }
}

#[tokio::test]
async fn unknown_paths_are_404() {
    let (_dir, blog) = blog().await;
    assert_eq!(get(&blog, "/notfound").await.status_code(), 404);
    assert_eq!(get(&blog, "/articles/abc").await.status_code(), 404);
    assert_eq!(Arc::clone(&blog).handle(Request::new(Method::Put, "/articles")).await.status_code(), 404);
}

#[tokio::test]
async fn every_response_is_html() {
    let (_dir, blog) = blog().await;
    let id = blog.store().create("Typed", "content type check").await.unwrap();

    let responses = [
        get(&blog, "/").await,
        get(&blog, "/healthz").await,
        get(&blog, "/notfound").await,
        post(&blog, &format!("/articles/{id}/delete"), "", "").await,
    ];
    for res in responses {
        assert_eq!(res.header("content-type"), Some("text/html; charset=utf-8"));
    }
}

#[tokio::test]
async fn trailing_slash_is_ignored() {
    let (_dir, blog) = blog().await;
    assert_eq!(get(&blog, "/about/").await.status_code(), 200);
    assert_eq!(get(&blog, "/articles/").await.status_code(), 200);
}

#[tokio::test]
async fn missing_article_is_404_everywhere() {
    let (_dir, blog) = blog().await;
    assert_eq!(get(&blog, "/articles/999999").await.status_code(), 404);
    assert_eq!(get(&blog, "/articles/999999/edit").await.status_code(), 404);
    assert_eq!(post(&blog, "/articles/999999", "Valid title", "a valid body text").await.status_code(), 404);
    assert_eq!(post(&blog, "/articles/1/delete", "", "").await.status_code(), 404);
    // Digits, but too large for an id.
    assert_eq!(get(&blog, "/articles/99999999999999999999").await.status_code(), 404);
}

#[tokio::test]
async fn invalid_submission_rerenders_form_without_storing() {
    let (_dir, blog) = blog().await;

    let res = post(&blog, "/articles", "ab", "short body").await;
    assert_eq!(res.status_code(), 200);
    let html = res.body_text();
    assert!(html.contains("title length out of range"));
    assert!(html.contains("value=\"ab\""));
    assert!(html.contains("action=\"/articles\""));
    assert!(blog.store().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_submission_reports_both_fields() {
    let (_dir, blog) = blog().await;
    let html = post(&blog, "/articles", "", "").await.body_text();
    assert!(html.contains("title required"));
    assert!(html.contains("body required"));
}

#[tokio::test]
async fn store_creates_and_confirms_with_id() {
    let (_dir, blog) = blog().await;

    let res = post(&blog, "/articles", "Hello there", "General Kenobi, you are a bold one").await;
    assert_eq!(res.status_code(), 200);

    let articles = blog.store().list().await.unwrap();
    assert_eq!(articles.len(), 1);
    let id = articles[0].id;
    assert!(res.body_text().contains(&format!("ID {id}")));

    let show = get(&blog, &format!("/articles/{id}")).await;
    assert_eq!(show.status_code(), 200);
    assert!(show.body_text().contains("General Kenobi"));
}

#[tokio::test]
async fn edit_form_is_prefilled_and_bound_to_update() {
    let (_dir, blog) = blog().await;
    let id = blog.store().create("Draft & notes", "first draft body").await.unwrap();

    let html = get(&blog, &format!("/articles/{id}/edit")).await.body_text();
    assert!(html.contains(&format!("action=\"/articles/{id}\"")));
    assert!(html.contains("value=\"Draft &amp; notes\""));
    assert!(html.contains("first draft body"));
}

#[tokio::test]
async fn update_redirects_to_article() {
    let (_dir, blog) = blog().await;
    let id = blog.store().create("Before", "the old body text").await.unwrap();

    let res = post(&blog, &format!("/articles/{id}"), "After", "the new body text").await;
    assert_eq!(res.status_code(), 302);
    assert_eq!(res.header("location"), Some(format!("/articles/{id}").as_str()));
    assert_eq!(blog.store().get(id).await.unwrap().title, "After");
}

#[tokio::test]
async fn update_with_same_values_reports_no_changes() {
    let (_dir, blog) = blog().await;
    let id = blog.store().create("Steady", "nothing changes here").await.unwrap();

    let res = post(&blog, &format!("/articles/{id}"), "Steady", "nothing changes here").await;
    assert_eq!(res.status_code(), 200);
    assert!(res.body_text().contains("No changes made."));
}

#[tokio::test]
async fn invalid_update_keeps_stored_article() {
    let (_dir, blog) = blog().await;
    let id = blog.store().create("Original", "original body text").await.unwrap();

    let res = post(&blog, &format!("/articles/{id}"), "x", "tiny").await;
    assert_eq!(res.status_code(), 200);
    let html = res.body_text();
    assert!(html.contains("title length out of range"));
    assert!(html.contains("body too short"));
    assert!(html.contains(&format!("action=\"/articles/{id}\"")));
    assert_eq!(blog.store().get(id).await.unwrap().title, "Original");
}

#[tokio::test]
async fn delete_redirects_to_list_and_removes_row() {
    let (_dir, blog) = blog().await;
    let id = blog.store().create("Ephemeral", "gone in a moment").await.unwrap();

    let res = post(&blog, &format!("/articles/{id}/delete"), "", "").await;
    assert_eq!(res.status_code(), 302);
    assert_eq!(res.header("location"), Some("/articles"));

    assert_eq!(get(&blog, &format!("/articles/{id}")).await.status_code(), 404);
    assert_eq!(post(&blog, &format!("/articles/{id}/delete"), "", "").await.status_code(), 404);
}

#[tokio::test]
async fn index_links_every_article() {
    let (_dir, blog) = blog().await;
    let a = blog.store().create("Alpha", "alpha body text").await.unwrap();
    let b = blog.store().create("Beta", "beta body text").await.unwrap();

    let html = get(&blog, "/articles").await.body_text();
    assert!(html.contains(&format!("<a href=\"/articles/{a}\">Alpha</a>")));
    assert!(html.contains(&format!("<a href=\"/articles/{b}\">Beta</a>")));
}

#[tokio::test]
async fn route_names_reverse_to_urls() {
    let (_dir, blog) = blog().await;
    assert_eq!(blog.url("articles.show", &[("id", "42")]), "/articles/42");
    assert_eq!(blog.url("articles.delete", &[("id", "42")]), "/articles/42/delete");
    assert_eq!(blog.url("articles.index", &[]), "/articles");
    assert_eq!(blog.url("articles.unknown", &[]), "");
    assert_eq!(blog.url("articles.show", &[]), "");
}

#[tokio::test]
async fn storage_failure_is_a_generic_500() {
    let (dir, blog) = blog().await;
    let raw = rusqlite::Connection::open(dir.path().join("blog.db")).unwrap();
    raw.execute_batch("DROP TABLE articles").unwrap();

    let responses = [
        get(&blog, "/articles").await,
        get(&blog, "/articles/1").await,
        get(&blog, "/articles/1/edit").await,
        post(&blog, "/articles", "A fine title", "a body long enough").await,
        post(&blog, "/articles/1/delete", "", "").await,
    ];
    for res in responses {
        assert_eq!(res.status_code(), 500);
        assert_eq!(res.header("content-type"), Some("text/html; charset=utf-8"));
        let html = res.body_text();
        assert!(html.contains("internal server error"));
        assert!(!html.contains("no such table"), "storage detail leaked: {html}");
    }
}

#[tokio::test]
async fn repeated_field_uses_first_value() {
    let (_dir, blog) = blog().await;
    let req = Request::new(Method::Post, "/articles")
        .with_header("content-type", "application/x-www-form-urlencoded")
        .with_body("title=First+title&title=ignored&body=a+body+long+enough");
    assert_eq!(Arc::clone(&blog).handle(req).await.status_code(), 200);

    let articles = blog.store().list().await.unwrap();
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].title, "First title");
}

#[tokio::test]
async fn non_form_body_is_treated_as_empty_submission() {
    let (_dir, blog) = blog().await;
    let req = Request::new(Method::Post, "/articles")
        .with_header("content-type", "text/plain")
        .with_body("title=Plain+title&body=a+body+long+enough");
    let html = Arc::clone(&blog).handle(req).await.body_text();
    assert!(html.contains("title required"));
    assert!(blog.store().list().await.unwrap().is_empty());
}
