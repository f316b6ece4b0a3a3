//! Minimal HTML form front-end.
//!
//! `GET /` shows a prompt form; `POST /` runs the prompt through the
//! orchestrator and shows the generated query and answer under the form.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use tokio::net::TcpListener;

use crate::error::Result;
use crate::orchestrator::Orchestrator;

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

#[derive(Clone)]
struct WebState {
    orchestrator: Arc<Orchestrator>,
}

#[derive(serde::Deserialize)]
struct PromptForm {
    #[serde(default)]
    prompt: String,
}

/// Build the router serving the form.
pub fn router(orchestrator: Arc<Orchestrator>) -> Router {
    Router::new()
        .route("/", get(handle_index).post(handle_submit))
        .with_state(WebState { orchestrator })
}

/// Bind `addr` and serve the form until the process ends.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn serve(orchestrator: Arc<Orchestrator>, addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    let local_addr: SocketAddr = listener.local_addr()?;
    tracing::info!("research form listening on http://{local_addr}/");
    axum::serve(listener, router(orchestrator)).await?;
    Ok(())
}

async fn handle_index() -> Html<String> {
    Html(render_page("", None))
}

async fn handle_submit(
    State(state): State<WebState>,
    Form(form): Form<PromptForm>,
) -> impl IntoResponse {
    let prompt = form.prompt.trim();
    if prompt.is_empty() {
        let section = Section::Error("Please enter a research question.".into());
        return (StatusCode::BAD_REQUEST, Html(render_page("", Some(&section))));
    }

    match state.orchestrator.run_one(prompt).await {
        Ok(request) => {
            let section = Section::Result {
                query: request.generated_query,
                answer: request.answer,
            };
            (StatusCode::OK, Html(render_page(prompt, Some(&section))))
        }
        Err(err) => {
            tracing::error!(error = %err, "research request failed");
            let section = Section::Error(format!("Research failed: {err}"));
            (StatusCode::BAD_GATEWAY, Html(render_page(prompt, Some(&section))))
        }
    }
}

enum Section {
    Result { query: String, answer: String },
    Error(String),
}

fn render_page(prompt: &str, section: Option<&Section>) -> String {
    let body = match section {
        Some(Section::Result { query, answer }) => format!(
            "<section class=\"result\">\n<h2>Query</h2>\n<p>{}</p>\n<h2>Answer</h2>\n<pre>{}</pre>\n</section>\n",
            escape_html(query),
            escape_html(answer)
        ),
        Some(Section::Error(message)) => {
            format!("<p class=\"error\">{}</p>\n", escape_html(message))
        }
        None => String::new(),
    };

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Research Bot</title>\n</head>\n<body>\n\
         <h1>Research Bot</h1>\n\
         <form method=\"post\" action=\"/\">\n\
         <input type=\"text\" name=\"prompt\" size=\"80\" value=\"{}\" placeholder=\"Ask a research question\">\n\
         <button type=\"submit\">Research</button>\n\
         </form>\n{body}</body>\n</html>\n",
        escape_html(prompt)
    )
}

fn escape_html(text: &str) -> String {
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
