//! HTTP server
//!
//! Pages are rendered per request from the collection compiled at startup.
//! Anything that is not a page or an API route falls through to the static
//! directory.

use anyhow::Result;
use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, Request, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::contact::{self, ContactForm, ContactResponse, MessageSender};
use crate::content::PostCollection;
use crate::helpers::{blog_url, url_for};
use crate::sitemap;
use crate::templates::TemplateRenderer;
use crate::views::{filter_posts, resolve, DetailOutcome, ListingQuery, ListingView, PostSummary};
use crate::Folio;

/// Shared, read-only server state
pub struct AppState {
    pub folio: Folio,
    pub posts: PostCollection,
    pub renderer: TemplateRenderer,
    pub sender: Arc<dyn MessageSender>,
}

impl AppState {
    pub fn new(folio: Folio, posts: PostCollection, sender: Arc<dyn MessageSender>) -> Result<Self> {
        folio.config.validate()?;
        Ok(Self {
            folio,
            posts,
            renderer: TemplateRenderer::new()?,
            sender,
        })
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    let config = &state.folio.config;
    let blog = blog_url(config);

    let mut app = Router::new()
        .route(&url_for(config, "/"), get(home_handler))
        .route(&blog, get(listing_handler))
        .route(&format!("{}*path", blog), get(blog_path_handler))
        .route(&url_for(config, "/sitemap.xml"), get(sitemap_handler))
        .route(&url_for(config, "/robots.txt"), get(robots_handler))
        .route(&url_for(config, "/api/contact"), post(contact_handler));

    let without_slash = blog.trim_end_matches('/').to_string();
    if !without_slash.is_empty() {
        app = app.route(
            &without_slash,
            get(move || async move { Redirect::permanent(&blog) }),
        );
    }

    app.fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(folio: &Folio, ip: &str, port: u16, open: bool) -> Result<()> {
    let posts = folio.load_posts()?;
    tracing::info!("Serving {} posts", posts.len());

    let sender = contact::sender_from_config(&folio.config.contact);
    let state = Arc::new(AppState::new(folio.clone(), posts, sender)?);
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}{}", ip, port, url_for(&folio.config, "/"));
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn home_handler(State(state): State<Arc<AppState>>) -> Response {
    render_page(state.renderer.render_home(&state.folio.config, &state.posts))
}

async fn listing_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListingQuery>,
) -> Response {
    let view = ListingView::build(&state.folio.config, &state.posts, query.normalize());
    render_page(state.renderer.render_listing(&state.folio.config, &view))
}

/// Everything below the blog path: the post index or a post detail page
async fn blog_path_handler(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Response {
    if path == "posts.json" {
        return posts_json(&state);
    }

    let slug = path.trim_matches('/');
    match resolve(&state.folio.config, &state.posts, slug) {
        DetailOutcome::Found(page) => {
            render_page(state.renderer.render_post(&state.folio.config, &page))
        }
        DetailOutcome::NotFound { slug } => {
            tracing::debug!("No post with slug {:?}", slug);
            not_found(&state, Some(&slug))
        }
    }
}

fn posts_json(state: &AppState) -> Response {
    let summaries: Vec<PostSummary> = filter_posts(&state.posts, &ListingQuery::default())
        .into_iter()
        .map(|post| PostSummary::from_post(&state.folio.config, post))
        .collect();
    Json(summaries).into_response()
}

async fn sitemap_handler(State(state): State<Arc<AppState>>) -> Response {
    let entries = sitemap::entries(&state.folio.config, &state.posts);
    (
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        sitemap::to_xml(&entries),
    )
        .into_response()
}

async fn robots_handler(State(state): State<Arc<AppState>>) -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        sitemap::robots_txt(&state.folio.config),
    )
        .into_response()
}

async fn contact_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ContactForm>, JsonRejection>,
) -> (StatusCode, Json<ContactResponse>) {
    match payload {
        Ok(Json(form)) => {
            let (status, body) = contact::submit(state.sender.as_ref(), form).await;
            (status, Json(body))
        }
        Err(rejection) => {
            tracing::debug!("Malformed contact payload: {}", rejection.body_text());
            (
                StatusCode::BAD_REQUEST,
                Json(ContactResponse::Failed {
                    error: "Request body must be a JSON object with name, email and message"
                        .to_string(),
                }),
            )
        }
    }
}

/// Fallback handler that serves static files, or the 404 page
async fn fallback_handler(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
) -> Response {
    let mut service = ServeDir::new(&state.folio.static_dir);
    match service.try_call(request).await {
        Ok(response) if response.status() != StatusCode::NOT_FOUND => response.into_response(),
        Ok(_) => not_found(&state, None),
        Err(e) => {
            tracing::error!("Failed to serve static file: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

fn not_found(state: &AppState, slug: Option<&str>) -> Response {
    match state.renderer.render_not_found(&state.folio.config, slug) {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render 404 page: {}", e);
            (StatusCode::NOT_FOUND, "Not found").into_response()
        }
    }
}

fn render_page(result: Result<String>) -> Response {
    match result {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Failed to render page: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::test_post;
    use crate::error::ContactError;
    use crate::contact::ContactMessage;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<ContactMessage>>,
    }

    #[async_trait]
    impl MessageSender for RecordingSender {
        async fn send(&self, message: &ContactMessage) -> Result<(), ContactError> {
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn app_with(sender: Arc<dyn MessageSender>) -> (tempfile::TempDir, Router) {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut config = SiteConfig::default();
        config.url = "https://example.com".to_string();
        let folio = Folio::with_config(tmp.path(), config);

        std::fs::create_dir_all(&folio.static_dir).unwrap();
        std::fs::write(folio.static_dir.join("favicon.txt"), "icon").unwrap();

        let mut rust = test_post("borrowing", "2024-02-01T00:00:00");
        rust.category = Some("Rust".to_string());
        let mut recap = test_post("2023/recap", "2023-12-31T00:00:00");
        recap.title = "Year in review".to_string();
        let posts = PostCollection::from_posts(vec![
            rust,
            recap,
        ])
        .unwrap();

        let state = AppState::new(folio, posts, sender).unwrap();
        (tmp, router(Arc::new(state)))
    }

    fn app() -> (tempfile::TempDir, Router) {
        app_with(Arc::new(RecordingSender::default()))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn post_json(app: Router, body: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/contact")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_listing_and_filters() {
        let (_tmp, app) = app();
        let (status, html) = get(app.clone(), "/blog/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Post borrowing"));
        assert!(html.contains("Year in review"));

        let (_, html) = get(app.clone(), "/blog/?category=Rust").await;
        assert!(html.contains("Post borrowing"));
        assert!(!html.contains("Year in review"));

        let (status, html) = get(app, "/blog/?search=nothing-matches").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("<div class=\"empty-state listing-empty\">"));
        assert!(html.contains("Reset filters"));
    }

    #[tokio::test]
    async fn test_post_detail_and_unknown_slug() {
        let (_tmp, app) = app();
        let (status, html) = get(app.clone(), "/blog/2023/recap/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("<h1>Year in review</h1>"));

        let (status, html) = get(app, "/blog/does-not-exist/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(html.contains("Post not found"));
    }

    #[tokio::test]
    async fn test_sitemap_robots_and_post_index() {
        let (_tmp, app) = app();
        let (status, xml) = get(app.clone(), "/sitemap.xml").await;
        assert_eq!(status, StatusCode::OK);
        assert!(xml.contains("<loc>https://example.com/blog/borrowing/</loc>"));

        let (_, robots) = get(app.clone(), "/robots.txt").await;
        assert!(robots.contains("Sitemap: https://example.com/sitemap.xml"));

        let (status, json) = get(app, "/blog/posts.json").await;
        assert_eq!(status, StatusCode::OK);
        let index: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(index[0]["slug"], "borrowing");
    }

    #[tokio::test]
    async fn test_static_files_and_missing_pages() {
        let (_tmp, app) = app();
        let (status, body) = get(app.clone(), "/favicon.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "icon");

        let (status, _) = get(app, "/nowhere").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_contact_endpoint() {
        let sender = Arc::new(RecordingSender::default());
        let (_tmp, app) = app_with(sender.clone());

        let (status, body) = post_json(
            app.clone(),
            r#"{"name": "Ada", "email": "ada@example.com", "message": "Hello"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].is_string());
        assert_eq!(sender.sent.lock().unwrap().len(), 1);

        let (status, body) = post_json(app.clone(), r#"{"name": "Ada", "message": "Hello"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Email is required");

        let (status, body) = post_json(app, "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
        assert_eq!(sender.sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_blank_blog_path_is_refused_before_routing() {
        let tmp = tempfile::TempDir::new().unwrap();
        for blog_path in ["", "/"] {
            let mut config = SiteConfig::default();
            config.blog_path = blog_path.to_string();
            let folio = Folio::with_config(tmp.path(), config);
            let sender: Arc<dyn MessageSender> = Arc::new(RecordingSender::default());

            let state = AppState::new(folio, PostCollection::default(), sender);
            assert!(state.is_err(), "accepted blog_path {:?}", blog_path);
        }
    }
}
