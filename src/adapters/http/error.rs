//! Error pages.
//!
//! Visitors get a generic message. With `features.verbose_errors` on, the
//! underlying error is appended.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::application::AuthError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPage {
    status: StatusCode,
    detail: Option<String>,
}

impl ErrorPage {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            detail: None,
        }
    }

    /// Attaches `detail` when `verbose` is set.
    pub fn with_detail(mut self, detail: impl std::fmt::Display, verbose: bool) -> Self {
        if verbose {
            self.detail = Some(detail.to_string());
        }
        self
    }

    pub fn from_auth_error(err: &AuthError, verbose: bool) -> Self {
        let status = err.status_code();
        if status.is_server_error() {
            tracing::error!(error = %err, fatal = err.is_fatal(), "Request failed");
        }
        Self::new(status).with_detail(err, verbose)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    fn message(&self) -> &'static str {
        match self.status {
            StatusCode::FORBIDDEN => "You are not authorized to view this page.",
            StatusCode::NOT_FOUND => "The page you requested does not exist.",
            _ => "Something went wrong while handling your request.",
        }
    }
}

impl IntoResponse for ErrorPage {
    fn into_response(self) -> Response {
        let title = format!(
            "{} {}",
            self.status.as_u16(),
            self.status.canonical_reason().unwrap_or("Error")
        );
        let detail = self
            .detail
            .as_deref()
            .map(|d| format!("<pre>{}</pre>", escape_html(d)))
            .unwrap_or_default();
        let body = format!(
            "<!DOCTYPE html><html><head><title>{title}</title></head>\
             <body><h1>{title}</h1><p>{}</p>{detail}</body></html>",
            self.message()
        );
        (self.status, Html(body)).into_response()
    }
}

impl From<AuthError> for ErrorPage {
    fn from(err: AuthError) -> Self {
        Self::from_auth_error(&err, false)
    }
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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
