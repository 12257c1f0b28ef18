//! The converter page plus robots.txt and sitemap.xml.

use axum::{
    extract::State,
    http::{HeaderMap, header},
    response::{Html, IntoResponse},
};

use super::SharedState;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// `GET /` — the converter page.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// `GET /robots.txt`
pub async fn robots_txt(State(state): State<SharedState>, headers: HeaderMap) -> impl IntoResponse {
    let root = site_root(state.public_url.as_deref(), &headers);
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        robots_body(&root),
    )
}

/// `GET /sitemap.xml`
pub async fn sitemap_xml(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let root = site_root(state.public_url.as_deref(), &headers);
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    (
        [(header::CONTENT_TYPE, "application/xml")],
        sitemap_body(&root, &today),
    )
}

/// Absolute site root without a trailing slash.
fn site_root(public_url: Option<&str>, headers: &HeaderMap) -> String {
    if let Some(url) = public_url {
        return url.trim_end_matches('/').to_string();
    }
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .filter(|h| !h.is_empty())
        .unwrap_or("localhost");
    format!("http://{host}")
}

fn robots_body(root: &str) -> String {
    format!("User-agent: *\nAllow: /\nSitemap: {root}/sitemap.xml\n")
}

fn sitemap_body(root: &str, lastmod: &str) -> String {
    let root = xml_escape(root);
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc>{root}/</loc>
    <lastmod>{lastmod}</lastmod>
    <changefreq>daily</changefreq>
    <priority>1.0</priority>
  </url>
</urlset>"#
    )
}

/// The host part of `root` comes straight from the request.
fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
