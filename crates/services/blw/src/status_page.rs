//! Status page: one auto refreshing HTML table with the latest results.

use std::{fmt::Write, net::SocketAddr, sync::Arc};

use axum::{Router, extract::State, response::Html, routing::get};
use bl_watcher::{
    StatusCache,
    build::{BuildResultPair, BuildStatus},
};
use chrono::{DateTime, Local};
use tokio::task::JoinHandle;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::{error, info};

use crate::prelude::*;

const REFRESH_SECS: u32 = 10;

pub fn router(cache: StatusCache) -> Router {
    Router::new()
        .route("/", get(status))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .with_state(cache)
}

/// Binds `bind` and serves the page in the background. Errors after the bind
/// are logged by the serving task.
pub async fn serve(
    bind: SocketAddr,
    cache: StatusCache,
) -> Result<(SocketAddr, JoinHandle<()>)> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    let addr = listener.local_addr()?;
    info!("Status page on http://{addr}");
    let app = router(cache);
    let handle = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            error!("Status page on {addr} stopped - {err}");
        }
    });
    Ok((addr, handle))
}

async fn status(State(cache): State<StatusCache>) -> Html<String> {
    Html(render(&cache.snapshot().await, Local::now()))
}

fn color(status: BuildStatus) -> &'static str {
    match status {
        BuildStatus::Succeeded => "green",
        BuildStatus::PartiallySucceeded => "yellow",
        BuildStatus::Failed => "red",
        _ => "gray",
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn render(sets: &[(String, Arc<[BuildResultPair]>)], now: DateTime<Local>) -> String {
    let mut page = String::new();
    // Writing to a String cannot fail.
    let _ = write!(
        page,
        "<html><head><meta http-equiv='refresh' content='{REFRESH_SECS}'>\
         <title>Build Status last shown on {}</title></head><body>\
         <table cellspacing='0' border='1'>",
        now.format("%H:%M")
    );
    for (name, pairs) in sets {
        let _ = write!(
            page,
            "<tr><td bgcolor='silver' colspan='2'>{}</td></tr>",
            escape(name)
        );
        for pair in pairs.iter() {
            let status = pair.last().status;
            let bgcolor = color(status);
            let _ = write!(
                page,
                "<tr><td bgcolor='{bgcolor}'>{}</td><td bgcolor='{bgcolor}'>{status}</td></tr>",
                escape(pair.definition())
            );
        }
    }
    page.push_str("</table></body></html>");
    page
}
