//! Article lifecycle handlers.
//!
//! | Route | Handler | Success | Failure |
//! |---|---|---|---|
//! | `GET /articles` | [`index`] | list | 500 |
//! | `GET /articles/{id}` | [`show`] | detail | 404 / 500 |
//! | `GET /articles/create` | [`create`] | empty form | — |
//! | `POST /articles` | [`store`] | confirmation with new id, or form with errors | 500 |
//! | `GET /articles/{id}/edit` | [`edit`] | pre-filled form | 404 / 500 |
//! | `POST /articles/{id}` | [`update`] | 302 to detail, "no changes", or form with errors | 404 / 500 |
//! | `POST /articles/{id}/delete` | [`delete`] | 302 to list | 404 / 500 |
//!
//! A submission that fails validation never reaches the store. Storage
//! detail stays in the logs; clients only see a generic 500 page.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{error, warn};

use crate::error::StoreError;
use crate::store::Article;
use crate::validate::{FieldErrors, validate};
use crate::views::{self, DetailView, FormView, ListItem};
use crate::{Blog, Request, Response, Status};

/// The fields of the create and edit forms. Absent fields decode as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ArticleForm {
    pub title: String,
    pub body: String,
}

// ── Handlers ──────────────────────────────────────────────────────────────────

pub async fn index(_req: Request, blog: Arc<Blog>) -> Response {
    let articles = match blog.store().list().await {
        Ok(articles) => articles,
        Err(e) => return internal_error(&e),
    };

    let items: Vec<ListItem<'_>> = articles.iter()
        .map(|a| ListItem { url: show_url(&blog, a.id), title: &a.title })
        .collect();
    Response::html(views::article_list(&items, &blog.url("articles.create", &[])))
}

pub async fn show(req: Request, blog: Arc<Blog>) -> Response {
    let article = match load(&req, &blog).await {
        Ok(article) => article,
        Err(res) => return res,
    };

    let id = article.id.to_string();
    Response::html(views::article_detail(&DetailView {
        id: article.id,
        title: &article.title,
        body: &article.body,
        edit_url: blog.url("articles.edit", &[("id", id.as_str())]),
        delete_url: blog.url("articles.delete", &[("id", id.as_str())]),
    }))
}

pub async fn create(_req: Request, blog: Arc<Blog>) -> Response {
    let form = ArticleForm::default();
    render_create_form(&blog, &form, &FieldErrors::default())
}

pub async fn store(req: Request, blog: Arc<Blog>) -> Response {
    let form = match parse_form(&req) {
        Ok(form) => form,
        Err(res) => return res,
    };

    let errors = validate(&form.title, &form.body);
    if !errors.is_empty() {
        return render_create_form(&blog, &form, &errors);
    }

    match blog.store().create(&form.title, &form.body).await {
        Ok(id) => Response::html(views::created(id, &show_url(&blog, id))),
        Err(e) => internal_error(&e),
    }
}

pub async fn edit(req: Request, blog: Arc<Blog>) -> Response {
    let article = match load(&req, &blog).await {
        Ok(article) => article,
        Err(res) => return res,
    };

    let form = ArticleForm { title: article.title, body: article.body };
    render_edit_form(&blog, article.id, &form, &FieldErrors::default())
}

pub async fn update(req: Request, blog: Arc<Blog>) -> Response {
    let article = match load(&req, &blog).await {
        Ok(article) => article,
        Err(res) => return res,
    };
    let form = match parse_form(&req) {
        Ok(form) => form,
        Err(res) => return res,
    };

    let errors = validate(&form.title, &form.body);
    if !errors.is_empty() {
        return render_edit_form(&blog, article.id, &form, &errors);
    }

    match blog.store().update(article.id, &form.title, &form.body).await {
        Ok(0) => Response::html(views::no_changes(&show_url(&blog, article.id))),
        Ok(_) => redirect(&show_url(&blog, article.id)),
        Err(e) => internal_error(&e),
    }
}

pub async fn delete(req: Request, blog: Arc<Blog>) -> Response {
    let article = match load(&req, &blog).await {
        Ok(article) => article,
        Err(res) => return res,
    };

    match blog.store().delete(article.id).await {
        Ok(0) => not_found(),
        Ok(_) => redirect(&blog.url("articles.index", &[])),
        Err(e) => internal_error(&e),
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Fetches the article named by the `id` path parameter.
///
/// The registry only routes digit strings here; one too large for `i64`
/// cannot name a stored row, so it is simply not found.
async fn load(req: &Request, blog: &Blog) -> Result<Article, Response> {
    let Some(id) = req.param("id").and_then(|raw| raw.parse::<i64>().ok()) else {
        return Err(not_found());
    };
    blog.store().get(id).await.map_err(|e| match e {
        StoreError::NotFound => not_found(),
        e => internal_error(&e),
    })
}

fn parse_form(req: &Request) -> Result<ArticleForm, Response> {
    req.form::<ArticleForm>().map_err(|e| {
        warn!(error = %e, path = req.path(), "malformed form body");
        Response::builder()
            .status(Status::BadRequest)
            .html(views::message("Bad request", "Please submit the form again."))
    })
}

fn show_url(blog: &Blog, id: i64) -> String {
    blog.url("articles.show", &[("id", id.to_string().as_str())])
}

fn render_create_form(blog: &Blog, form: &ArticleForm, errors: &FieldErrors) -> Response {
    Response::html(views::article_form(&FormView {
        heading: "New article",
        action: blog.url("articles.store", &[]),
        title: &form.title,
        body: &form.body,
        errors,
        submit: "Publish",
    }))
}

fn render_edit_form(blog: &Blog, id: i64, form: &ArticleForm, errors: &FieldErrors) -> Response {
    Response::html(views::article_form(&FormView {
        heading: "Edit article",
        action: blog.url("articles.update", &[("id", id.to_string().as_str())]),
        title: &form.title,
        body: &form.body,
        errors,
        submit: "Save",
    }))
}

/// A failed reversal yields an empty URL; send the visitor home instead of
/// emitting an empty `Location`.
fn redirect(url: &str) -> Response {
    Response::redirect(if url.is_empty() { "/" } else { url })
}

fn not_found() -> Response {
    Response::builder()
        .status(Status::NotFound)
        .html(views::message("404", "article not found"))
}

fn internal_error(err: &StoreError) -> Response {
    error!(error = %err, "article storage failed");
    Response::builder()
        .status(Status::InternalServerError)
        .html(views::message("500", "internal server error"))
}
