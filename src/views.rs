//! HTML pages.
//!
//! Views are plain functions from already-resolved data to markup: URLs
//! arrive reversed, ids arrive as integers. Every user-supplied string goes
//! through [`escape`].

use std::fmt::Write;

use crate::validate::FieldErrors;

/// Escapes text for HTML element content and double-quoted attributes.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, content: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{} | leaflet</title>\n</head>\n<body>\n{content}\n</body>\n</html>\n",
        escape(title),
    )
}

pub fn home() -> String {
    page("Home", "<h1>Hello, welcome to leaflet!</h1>")
}

pub fn about() -> String {
    page(
        "About",
        "<p>This blog keeps programming notes. Feedback and suggestions are welcome at \
         <a href=\"mailto:editor@example.com\">editor@example.com</a>.</p>",
    )
}

/// The body for 404 and 500 answers.
pub fn message(heading: &str, detail: &str) -> String {
    page(heading, &format!("<h1>{}</h1>\n<p>{}</p>", escape(heading), escape(detail)))
}

/// One row of the article list: where it lives and what it is called.
pub struct ListItem<'a> {
    pub url: String,
    pub title: &'a str,
}

pub fn article_list(items: &[ListItem<'_>], create_url: &str) -> String {
    let mut content = String::from("<h1>Articles</h1>\n<ul>\n");
    for item in items {
        let _ = writeln!(content, "<li><a href=\"{}\">{}</a></li>", escape(&item.url), escape(item.title));
    }
    content.push_str("</ul>\n");
    let _ = write!(content, "<p><a href=\"{}\">Write an article</a></p>", escape(create_url));
    page("Articles", &content)
}

pub struct DetailView<'a> {
    pub id: i64,
    pub title: &'a str,
    pub body: &'a str,
    pub edit_url: String,
    pub delete_url: String,
}

pub fn article_detail(view: &DetailView<'_>) -> String {
    let content = format!(
        "<article>\n<h1>{title}</h1>\n<p>ID: {id}</p>\n<div>{body}</div>\n</article>\n\
         <p><a href=\"{edit}\">Edit</a></p>\n\
         <form action=\"{delete}\" method=\"post\">\n\
         <button type=\"submit\" onclick=\"return confirm('Delete this article?')\">Delete</button>\n\
         </form>",
        title = escape(view.title),
        id = view.id,
        body = escape(view.body),
        edit = escape(&view.edit_url),
        delete = escape(&view.delete_url),
    );
    page(view.title, &content)
}

/// A create or edit form, possibly re-rendered with the previous submission.
pub struct FormView<'a> {
    pub heading: &'a str,
    /// Where the form posts. May be empty if the route could not be reversed.
    pub action: String,
    pub title: &'a str,
    pub body: &'a str,
    pub errors: &'a FieldErrors,
    pub submit: &'a str,
}

pub fn article_form(view: &FormView<'_>) -> String {
    let field_error = |field: &str| {
        view.errors
            .get(field)
            .map(|msg| format!("<p class=\"error\">{}</p>\n", escape(msg)))
            .unwrap_or_default()
    };

    let content = format!(
        "<h1>{heading}</h1>\n<form action=\"{action}\" method=\"post\">\n\
         <p><label>Title <input type=\"text\" name=\"title\" value=\"{title}\"></label></p>\n\
         {title_error}\
         <p><label>Body <textarea name=\"body\" cols=\"30\" rows=\"10\">{body}</textarea></label></p>\n\
         {body_error}\
         <p><button type=\"submit\">{submit}</button></p>\n</form>",
        heading = escape(view.heading),
        action = escape(&view.action),
        title = escape(view.title),
        title_error = field_error("title"),
        body = escape(view.body),
        body_error = field_error("body"),
        submit = escape(view.submit),
    );
    page(view.heading, &content)
}

pub fn created(id: i64, show_url: &str) -> String {
    page(
        "Article created",
        &format!("<p>Article created, ID {id}.</p>\n<p><a href=\"{}\">Read it</a></p>", escape(show_url)),
    )
}

pub fn no_changes(show_url: &str) -> String {
    page(
        "No changes",
        &format!("<p>No changes made.</p>\n<p><a href=\"{}\">Back to the article</a></p>", escape(show_url)),
    )
}
