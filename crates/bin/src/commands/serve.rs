//! Serve command - runs the Kindred web server.

use std::{collections::HashMap, path::Path, sync::Arc};

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
    Form, Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Path as UrlPath, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::signal::unix::{SignalKind, signal};
use tower_cookies::{Cookie, CookieManagerLayer, Cookies};

use kindred::{
    CollectionKind, CollectionScope, ItemId, Site,
    assets::LocalAssets,
    backend::database::{InMemory, SqlxBackend},
    cms::{EditRequest, EditTarget},
    constants::CONTENT_FILE,
    entity::{
        Activity, Album, Content, DonationMethod, Event, Fields, HeroImage, Photo, SiteText,
    },
    notify::{Notification, NotificationLog, Notifier},
};

use crate::backend::{create_backend, data_dir};
use crate::cli::ServeArgs;
use crate::commands::info::collection_counts;
use crate::session::SessionStore;
use crate::templates::{self, CollectionSummary};

const SESSION_COOKIE: &str = "kindred_session";
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Shared application state
#[derive(Clone)]
struct AppState {
    site: Arc<Site>,
    assets: Arc<LocalAssets>,
    notifications: Arc<NotificationLog>,
    sessions: SessionStore,
    admin_password_hash: Option<Arc<str>>,
}

impl AppState {
    async fn is_admin(&self, cookies: &Cookies) -> bool {
        match cookies.get(SESSION_COOKIE) {
            Some(cookie) => self.sessions.is_valid(cookie.value()).await,
            None => false,
        }
    }
}

/// Login form data
#[derive(Deserialize)]
struct LoginForm {
    password: String,
}

#[derive(Deserialize)]
struct EditModeQuery {
    edit: Option<String>,
}

impl EditModeQuery {
    fn requested(&self) -> bool {
        matches!(self.edit.as_deref(), Some("1" | "true"))
    }
}

/// Drag-and-drop move posted by the overlay
#[derive(Deserialize)]
struct ReorderRequest {
    collection: String,
    parent: Option<String>,
    source: ItemId,
    target: ItemId,
}

#[derive(Serialize)]
struct ReorderResponse {
    /// Optimistic order after the move, before any write lands.
    order: Vec<ItemId>,
}

#[derive(Deserialize)]
struct UploadQuery {
    collection: String,
    parent: Option<String>,
    name: String,
    #[serde(default)]
    caption: String,
}

#[derive(Deserialize)]
struct DeleteForm {
    collection: String,
    parent: Option<String>,
    id: ItemId,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Map a library error onto a JSON error response.
fn error_response(e: &kindred::Error) -> Response {
    let status = if e.is_not_found() {
        StatusCode::NOT_FOUND
    } else if e.is_validation_error() {
        StatusCode::BAD_REQUEST
    } else if e.is_transient() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (
        status,
        Json(ErrorBody {
            error: e.to_string(),
        }),
    )
        .into_response()
}

/// Empty form values arrive as `""`; treat them as "no parent".
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Run the Kindred server
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let backend = create_backend(&args.backend_config).await?;
    let data_dir = data_dir(&args.backend_config);

    let assets_dir = args
        .assets_dir
        .clone()
        .unwrap_or_else(|| data_dir.join("assets"));
    tokio::fs::create_dir_all(&assets_dir).await?;
    let assets = Arc::new(LocalAssets::new(&assets_dir, args.public_base_url.as_str()));
    tracing::info!("Serving assets from {}", assets_dir.display());

    let notifications = Arc::new(NotificationLog::new());
    let site = Arc::new(Site::new(
        Arc::clone(&backend),
        assets.clone(),
        notifications.clone(),
    ));

    if args.admin_password_hash.is_none() {
        tracing::warn!("No admin password hash configured; the admin area is disabled");
    }

    let app_state = AppState {
        site,
        assets,
        notifications,
        sessions: SessionStore::new(),
        admin_password_hash: args.admin_password_hash.as_deref().map(Arc::from),
    };

    // Build router
    let app = Router::new()
        .route("/", get(handle_home))
        .route("/albums/{id}", get(handle_album))
        .route("/assets/{*path}", get(handle_asset))
        .route("/health", get(handle_health_endpoint))
        .route("/login", get(handle_login_page).post(handle_login_submit))
        .route("/logout", post(handle_logout))
        .route("/admin", get(handle_admin))
        .route("/admin/edit", post(handle_edit))
        .route("/admin/reorder", post(handle_reorder))
        .route(
            "/admin/upload",
            post(handle_upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/admin/items/{collection}", post(handle_create_item))
        .route("/admin/delete", post(handle_delete))
        .route("/admin/notifications", get(handle_notifications))
        .layer(CookieManagerLayer::new())
        .with_state(app_state);

    // Bind server
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    println!("Kindred server started");
    println!();
    println!("Site:   http://localhost:{}", local_addr.port());
    println!("Admin:  http://localhost:{}/admin", local_addr.port());
    println!("Backend: {}", backend.kind_label());
    println!();
    println!("Press Ctrl+C to shutdown");

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown..."),
                _ = sigint.recv() => tracing::info!("Received SIGINT, initiating graceful shutdown..."),
            }
        })
        .await?;

    // Save content on shutdown (only needed for InMemory backend)
    if let Some(in_memory_backend) = backend.as_any().downcast_ref::<InMemory>() {
        let json_path = data_dir.join(CONTENT_FILE);
        match in_memory_backend.save_to_file(&json_path).await {
            Ok(()) => {
                tracing::info!("Content saved to {}", json_path.display());
                println!("\nContent saved successfully");
            }
            Err(e) => {
                tracing::error!("Failed to save content: {e:?}");
                eprintln!("Failed to save content: {e:?}");
            }
        }
    }
    if let Some(sql) = backend.as_any().downcast_ref::<SqlxBackend>() {
        sql.close().await;
    }

    println!("Server shut down");
    Ok(())
}

// ============================================================================
// Public Handlers
// ============================================================================

/// Handler for GET / - Home page, with the edit overlay for admins
async fn handle_home(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(query): Query<EditModeQuery>,
) -> Response {
    let edit = query.requested() && state.is_admin(&cookies).await;
    let home = state.site.home_page().await;
    Html(templates::home_page(&home, edit)).into_response()
}

/// Handler for GET /albums/{id} - One album with its photos
async fn handle_album(
    State(state): State<AppState>,
    cookies: Cookies,
    UrlPath(id): UrlPath<String>,
    Query(query): Query<EditModeQuery>,
) -> Response {
    let edit = query.requested() && state.is_admin(&cookies).await;
    match state.site.album_page(&ItemId::from(id)).await {
        Some(page) => Html(templates::album_page(&page, edit)).into_response(),
        None => (StatusCode::NOT_FOUND, "Album not found").into_response(),
    }
}

fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("avif") => "image/avif",
        _ => "application/octet-stream",
    }
}

/// Handler for GET /assets/{*path} - Uploaded files
async fn handle_asset(State(state): State<AppState>, UrlPath(path): UrlPath<String>) -> Response {
    let Some(file) = state.assets.resolve(&path) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match tokio::fs::read(&file).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type(&file))], bytes).into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "Could not read asset");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    backend: &'static str,
}

/// Handler for GET /health - Health check endpoint
async fn handle_health_endpoint(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        backend: state.site.backend().kind_label(),
    })
}

// ============================================================================
// Authentication Handlers
// ============================================================================

fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::error!("Configured admin password hash is invalid: {e}");
            false
        }
    }
}

/// Handler for GET /login - Show login page
async fn handle_login_page(State(state): State<AppState>, cookies: Cookies) -> Response {
    if state.is_admin(&cookies).await {
        return Redirect::to("/admin").into_response();
    }
    Html(templates::login_page(None)).into_response()
}

/// Handler for POST /login - Check the admin password
async fn handle_login_submit(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> Response {
    let Some(hash) = state.admin_password_hash.as_deref() else {
        return Html(templates::login_page(Some("Admin login is disabled on this server")))
            .into_response();
    };
    if !verify_password(hash, &form.password) {
        tracing::warn!("Rejected admin login");
        return Html(templates::login_page(Some("Wrong password"))).into_response();
    }

    let session_token = state.sessions.create_session().await;
    let mut cookie = Cookie::new(SESSION_COOKIE, session_token);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookies.add(cookie);
    tracing::info!("Admin logged in");
    Redirect::to("/admin").into_response()
}

/// Handler for POST /logout - Logout and destroy session
async fn handle_logout(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    if let Some(cookie) = cookies.get(SESSION_COOKIE) {
        state.sessions.destroy_session(cookie.value()).await;
        cookies.remove(Cookie::from(SESSION_COOKIE));
    }
    Redirect::to("/")
}

// ============================================================================
// Admin Handlers
// ============================================================================

/// Handler for GET /admin - Collection overview and creation forms
async fn handle_admin(State(state): State<AppState>, cookies: Cookies) -> Response {
    if !state.is_admin(&cookies).await {
        return Redirect::to("/login").into_response();
    }

    let summaries = match collection_counts(state.site.backend().as_ref()).await {
        Ok(counts) => counts
            .into_iter()
            .filter_map(|(kind, count)| {
                // Photos are listed per album on the album pages.
                let scope = CollectionScope::new(kind, None).ok()?;
                Some(CollectionSummary {
                    label: kind.to_string().replace('_', " "),
                    scope,
                    count,
                })
            })
            .collect(),
        Err(e) => {
            state
                .notifications
                .notify(Notification::error(format!("Could not count items: {e}")));
            Vec::new()
        }
    };
    let albums = state.site.albums().await;
    Html(templates::admin_page(&summaries, &albums)).into_response()
}

/// Handler for POST /admin/edit - Save an in-place edit
///
/// Empty values clear the field. Failures are queued as notifications by the
/// site; either way the browser goes back to the page it came from.
async fn handle_edit(
    State(state): State<AppState>,
    cookies: Cookies,
    headers: HeaderMap,
    Form(mut form): Form<HashMap<String, String>>,
) -> Response {
    if !state.is_admin(&cookies).await {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let Some(target) = form.remove("target") else {
        return (StatusCode::BAD_REQUEST, "Missing edit target").into_response();
    };
    let target: EditTarget = match target.parse() {
        Ok(target) => target,
        Err(e) => return error_response(&kindred::Error::from(e)),
    };

    let fields: Fields = form
        .into_iter()
        .map(|(name, value)| {
            let value = if value.is_empty() {
                serde_json::Value::Null
            } else {
                serde_json::Value::String(value)
            };
            (name, value)
        })
        .collect();

    // The site reports failures to the notification log.
    let _ = state.site.edit(EditRequest::new(target, fields)).await;

    Redirect::to(&return_path(&headers)).into_response()
}

/// Where to send the editor after a form post: the referring page if it is
/// on this host, otherwise the home page in edit mode.
fn return_path(headers: &HeaderMap) -> String {
    const FALLBACK: &str = "/?edit=1";
    let header_str = |name: header::HeaderName| headers.get(name).and_then(|v| v.to_str().ok());
    let Some(referer) = header_str(header::REFERER) else {
        return FALLBACK.to_string();
    };

    if referer.starts_with('/') {
        if referer.starts_with("//") || referer.contains('\\') {
            return FALLBACK.to_string();
        }
        return referer.to_string();
    }

    let Ok(url) = url::Url::parse(referer) else {
        return FALLBACK.to_string();
    };
    let authority = match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => return FALLBACK.to_string(),
    };
    let same_host = header_str(header::HOST) == Some(authority.as_str());
    if !same_host || !matches!(url.scheme(), "http" | "https") {
        return FALLBACK.to_string();
    }
    match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_string(),
    }
}

/// Apply a move to the local order and persist it in the background.
async fn reorder<T: Content>(
    site: &Site,
    scope: CollectionScope,
    source: &ItemId,
    target: &ItemId,
) -> kindred::Result<Vec<ItemId>> {
    let mut manager = site.reorder_manager::<T>(scope).await?;
    if let Some(pending) = manager.plan_drop(source, target)? {
        tokio::spawn(pending.persist());
    }
    Ok(manager.ids())
}

/// Handler for POST /admin/reorder - Drag-and-drop move
///
/// Answers with the optimistic order straight away. Failed writes show up
/// later through `/admin/notifications`.
async fn handle_reorder(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(request): Json<ReorderRequest>,
) -> Response {
    if !state.is_admin(&cookies).await {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let scope = match CollectionScope::parse(&request.collection, request.parent.as_deref()) {
        Ok(scope) => scope,
        Err(e) => return error_response(&e.into()),
    };

    let site = state.site.as_ref();
    let (source, target) = (&request.source, &request.target);
    let result = match scope.kind() {
        CollectionKind::HeroImages => reorder::<HeroImage>(site, scope, source, target).await,
        CollectionKind::Albums => reorder::<Album>(site, scope, source, target).await,
        CollectionKind::Photos => reorder::<Photo>(site, scope, source, target).await,
        CollectionKind::Activities => reorder::<Activity>(site, scope, source, target).await,
        CollectionKind::Events => reorder::<Event>(site, scope, source, target).await,
        CollectionKind::SiteTexts => reorder::<SiteText>(site, scope, source, target).await,
        CollectionKind::DonationMethods => {
            reorder::<DonationMethod>(site, scope, source, target).await
        }
    };

    match result {
        Ok(order) => Json(ReorderResponse { order }).into_response(),
        Err(e) => error_response(&e),
    }
}

#[derive(Serialize)]
struct Created {
    id: ItemId,
}

/// Handler for POST /admin/upload - Raw image body
///
/// `collection` is `hero_images`, `photos` (with `parent`) or `cover` (with
/// `parent`, the album).
async fn handle_upload(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Response {
    if !state.is_admin(&cookies).await {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let site = state.site.as_ref();
    let bytes = body.to_vec();
    let parent = non_empty(query.parent.as_deref()).map(ItemId::from);

    let result = match (query.collection.as_str(), parent) {
        ("hero_images", _) => site
            .add_hero_image(bytes, &query.name, &query.caption)
            .await
            .map(|item| item.id),
        ("photos", Some(album)) => site
            .add_photo(&album, bytes, &query.name, &query.caption)
            .await
            .map(|item| item.id),
        ("cover", Some(album)) => site
            .set_album_cover(&album, bytes, &query.name)
            .await
            .map(|item| item.id),
        (collection, _) => {
            return (
                StatusCode::BAD_REQUEST,
                format!("Cannot upload to {collection}"),
            )
                .into_response();
        }
    };

    match result {
        Ok(id) => (StatusCode::CREATED, Json(Created { id })).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Parse an event start time from a form.
///
/// Accepts RFC 3339 and the `datetime-local` format browsers send, which is
/// read as UTC.
fn parse_starts_at(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

/// Build stored fields from a creation form. Empty values are left out.
fn form_fields(form: HashMap<String, String>) -> Fields {
    form.into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| {
            if name == "starts_at"
                && let Some(starts_at) = parse_starts_at(&value)
            {
                return (name, serde_json::Value::String(starts_at.to_rfc3339()));
            }
            (name, serde_json::Value::String(value))
        })
        .collect()
}

async fn create_from_form(
    site: &Site,
    kind: CollectionKind,
    fields: &Fields,
) -> kindred::Result<Option<ItemId>> {
    let id = match kind {
        CollectionKind::Albums => site.create_album(Album::from_fields(fields)?).await?.id,
        CollectionKind::Activities => {
            site.create_activity(Activity::from_fields(fields)?)
                .await?
                .id
        }
        CollectionKind::Events => site.create_event(Event::from_fields(fields)?).await?.id,
        CollectionKind::DonationMethods => {
            site.create_donation_method(DonationMethod::from_fields(fields)?)
                .await?
                .id
        }
        _ => return Ok(None),
    };
    Ok(Some(id))
}

/// Handler for POST /admin/items/{collection} - Create an item from a form
async fn handle_create_item(
    State(state): State<AppState>,
    cookies: Cookies,
    UrlPath(collection): UrlPath<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if !state.is_admin(&cookies).await {
        return Redirect::to("/login").into_response();
    }
    let kind: CollectionKind = match collection.parse() {
        Ok(kind) => kind,
        Err(e) => return error_response(&kindred::Error::from(e)),
    };

    let fields = form_fields(form);
    match create_from_form(&state.site, kind, &fields).await {
        Ok(Some(id)) => {
            tracing::debug!(%kind, %id, "Created from admin form");
            Redirect::to("/admin").into_response()
        }
        Ok(None) => (
            StatusCode::BAD_REQUEST,
            format!("{kind} items are created by upload or by editing"),
        )
            .into_response(),
        Err(e) => {
            // Decode errors never reached the site, so report them here.
            if !e.is_backend_error() {
                state
                    .notifications
                    .notify(Notification::error(format!("Could not add to {kind}: {e}")));
            }
            Redirect::to("/admin").into_response()
        }
    }
}

/// Handler for POST /admin/delete - Delete one item
async fn handle_delete(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<DeleteForm>,
) -> Response {
    if !state.is_admin(&cookies).await {
        return Redirect::to("/login").into_response();
    }
    let scope = match CollectionScope::parse(&form.collection, form.parent.as_deref()) {
        Ok(scope) => scope,
        Err(e) => return error_response(&e.into()),
    };
    // Failures are already in the notification log.
    let _ = state.site.remove_item(&scope, &form.id).await;
    Redirect::to("/admin").into_response()
}

/// Handler for GET /admin/notifications - Drain pending notifications
async fn handle_notifications(State(state): State<AppState>, cookies: Cookies) -> Response {
    if !state.is_admin(&cookies).await {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(state.notifications.drain()).into_response()
}
