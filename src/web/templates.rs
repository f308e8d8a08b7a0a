use crate::gateway::Issue;
use askama::Template;
use chrono::DateTime;
use pulldown_cmark::{html, Event, Options, Parser};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub claims_preview: Option<String>,
    pub raw_token: Option<String>,
    pub services: Vec<LoginServiceCard>,
    pub missing_app_id: bool,
    pub dashboard_url: String,
    pub cookie_name: &'static str,
}

/// Login provider button plus the client snippet shown once it is chosen
pub struct LoginServiceCard {
    pub slug: String,
    pub friendly_name: String,
    pub snippet: String,
}

/// One line of the setup checklist
pub struct SetupItem {
    pub name: &'static str,
    pub description: &'static str,
    pub configured: bool,
}

#[derive(Template)]
#[template(path = "setup.html")]
pub struct SetupTemplate {
    pub app_id: String,
    pub items: Vec<SetupItem>,
    pub dashboard_url: String,
}

#[derive(Template)]
#[template(path = "admin.html")]
pub struct AdminTemplate {
    pub user_id: String,
    pub admin_only_data: String,
}

#[derive(Template)]
#[template(path = "issue.html")]
pub struct IssueTemplate {
    pub issue: Issue,
    /// Issue body rendered from markdown
    pub body_html: String,
    pub created_on: String,
    pub fetched_note: Option<String>,
    pub more_issues: Vec<Issue>,
    pub more_issues_base: &'static str,
}

impl IssueTemplate {
    pub fn new(
        issue: Issue,
        fetched_note: Option<String>,
        more_issues: Vec<Issue>,
        more_issues_base: &'static str,
    ) -> Self {
        Self {
            body_html: markdown_to_html(&issue.body),
            created_on: display_date(&issue.created_at),
            issue,
            fetched_note,
            more_issues,
            more_issues_base,
        }
    }
}

/// Render GitHub-flavoured markdown to HTML
///
/// Raw HTML in the source is emitted as text, so issue authors cannot inject
/// markup into the page.
pub fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES;
    let events = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

/// `2020-01-31T12:00:00Z` -> `January 31, 2020`; unparseable input is kept
pub fn display_date(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(parsed) => parsed.format("%B %-d, %Y").to_string(),
        Err(_) => timestamp.to_string(),
    }
}

#[derive(Template)]
#[template(path = "feedback.html")]
pub struct FeedbackTemplate {
    pub server_token_configured: bool,
    pub server_side_token_url: String,
}

/// 401: no identity in the session claims
#[derive(Template)]
#[template(path = "unauthorized.html")]
pub struct UnauthorizedTemplate {
    pub cookie_name: &'static str,
    pub service: Option<String>,
}

/// 403: logged in but missing roles; each field is `{"user":{"roles":[...]}}`
#[derive(Template)]
#[template(path = "forbidden.html")]
pub struct ForbiddenTemplate {
    pub cookie_name: &'static str,
    pub held_json: String,
    pub required_json: String,
    pub missing_json: String,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub status: u16,
    pub title: String,
    pub message: String,
    pub link_url: Option<String>,
    pub link_text: String,
}

impl ErrorTemplate {
    pub fn new(status: StatusCode, title: &str, message: &str) -> Self {
        Self {
            status: status.as_u16(),
            title: title.to_string(),
            message: message.to_string(),
            link_url: None,
            link_text: String::new(),
        }
    }

    pub fn with_link(mut self, url: String, text: &str) -> Self {
        self.link_url = Some(url);
        self.link_text = text.to_string();
        self
    }
}

/// Render a template with the given status, falling back to a plain 500
pub fn render<T: Template>(template: &T, status: StatusCode) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Template render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

/// Render an [`ErrorTemplate`] using its own status code
pub fn render_error(template: ErrorTemplate) -> Response {
    let status =
        StatusCode::from_u16(template.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    render(&template, status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_is_rendered() {
        let html = markdown_to_html("# Hello\n\nSome **bold** text and `code`.\n\n- one\n- two\n");
        assert!(html.contains("<h1>Hello</h1>"));
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<code>code</code>"));
        assert!(html.contains("<li>one</li>"));
    }

    #[test]
    fn test_raw_html_in_markdown_is_escaped() {
        let html = markdown_to_html("hi <script>alert(1)</script>\n\n<div>block</div>\n");
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<div>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_display_date() {
        assert_eq!(display_date("2020-01-31T12:00:00Z"), "January 31, 2020");
        assert_eq!(display_date("2021-07-04T23:30:00+02:00"), "July 4, 2021");
        assert_eq!(display_date("yesterday"), "yesterday");
    }
}
