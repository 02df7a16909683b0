use axum::{
    Router,
    body::Body,
    extract::{DefaultBodyLimit, Host, Multipart, Path, Query, Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post, put},
};
use axum_extra::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Basic};
use chrono::{DateTime, Utc};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::{IntoParams, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use api_shared::auth::{BasicCredentials, CHALLENGE, UNAUTHORIZED_BODY};
use api_shared::{HealthRes, HealthService};
use depot_core::{
    CATEGORIES, CategoryStore, DeletedKind, DepotConfig, DepotError, DepotService, Disposition,
    FileEntry, ROOT_LABEL, resolve_upload_filename,
};

const DEFAULT_PORT: u16 = 9999;
const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_PASSWORD: &str = "admin";
const DEFAULT_FILES_DIR: &str = "./files";
const DEFAULT_PUBLIC_DIR: &str = "./public";

/// Multipart uploads above this size are rejected by the transport.
const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024 * 1024;

/// Application state shared across handlers.
///
/// Fixed at startup and read-only thereafter; the filesystem tree under the
/// store root is the only mutable state.
#[derive(Clone)]
struct AppState {
    depot: DepotService,
    credentials: BasicCredentials,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_files,
        list_categories,
        download_file,
        upload_file,
        delete_entry,
        rename_entry,
        move_file,
        create_folder
    ),
    components(schemas(
        HealthRes,
        FileEntryRes,
        UploadRes,
        MessageRes,
        PathChangeRes,
        RenameReq,
        MoveReq,
        CreateFolderReq,
        ErrorRes
    ))
)]
struct ApiDoc;

/// Main entry point for the depot server.
///
/// # Environment Variables
/// - `PORT`: listen port (default: 9999)
/// - `DEPOT_USERNAME` / `DEPOT_PASSWORD`: the single Basic-auth credential
///   pair (default: admin/admin — a deployment responsibility to change)
/// - `DEPOT_FILES_DIR`: store root (default: "./files")
/// - `DEPOT_PUBLIC_DIR`: static UI directory (default: "./public")
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("depot_run=info".parse()?)
                .add_directive("depot_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port: u16 = match std::env::var("PORT") {
        Ok(value) => value.parse()?,
        Err(_) => DEFAULT_PORT,
    };
    let username =
        std::env::var("DEPOT_USERNAME").unwrap_or_else(|_| DEFAULT_USERNAME.to_string());
    let password =
        std::env::var("DEPOT_PASSWORD").unwrap_or_else(|_| DEFAULT_PASSWORD.to_string());
    let files_dir =
        std::env::var("DEPOT_FILES_DIR").unwrap_or_else(|_| DEFAULT_FILES_DIR.to_string());
    let public_dir =
        std::env::var("DEPOT_PUBLIC_DIR").unwrap_or_else(|_| DEFAULT_PUBLIC_DIR.to_string());

    let credentials = BasicCredentials::new(username, password);
    tracing::info!(
        username = %credentials.username(),
        password = if std::env::var("DEPOT_PASSWORD").is_ok() { "set" } else { "using default" },
        "environment loaded"
    );
    tracing::info!(%files_dir, "store root");

    let config = DepotConfig::new(PathBuf::from(files_dir))?;
    let store = CategoryStore::new(&config);
    store.ensure_layout()?;

    let state = AppState {
        depot: DepotService::new(store),
        credentials,
    };
    let app = build_router(state, PathBuf::from(public_dir));

    let addr = format!("0.0.0.0:{port}");
    tracing::info!("++ Starting depot on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: AppState, public_dir: PathBuf) -> Router {
    // Browsing and direct downloads are open; every mutating route and the
    // static UI sit behind the shared credential.
    let open = Router::new()
        .route("/health", get(health))
        .route("/api/files", get(list_files))
        .route("/download/*path", get(download_file));

    let gated = Router::new()
        .route("/api/categories", get(list_categories))
        .route(
            "/api/upload",
            post(upload_file).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/files/*path", delete(delete_entry))
        .route("/api/files/rename", put(rename_entry))
        .route("/api/files/move", put(move_file))
        .route("/api/create-folder", post(create_folder))
        .fallback_service(ServeDir::new(public_dir))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_basic_auth,
        ));

    Router::new()
        .merge(open)
        .merge(gated)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Basic-auth challenge wrapping every gated route.
async fn require_basic_auth(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Basic>>>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(TypedHeader(Authorization(basic))) = &auth {
        if state.credentials.verify(basic.username(), basic.password()) {
            return next.run(request).await;
        }
    }

    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, CHALLENGE)],
        UNAUTHORIZED_BODY,
    )
        .into_response()
}

/// Error surfaced to API clients as `{"error": …}` JSON.
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<DepotError> for ApiError {
    fn from(err: DepotError) -> Self {
        let status = match &err {
            DepotError::EmptyPath
            | DepotError::Traversal
            | DepotError::InvalidInput(_)
            | DepotError::TargetDirMissing(_) => StatusCode::BAD_REQUEST,
            DepotError::NotFound(_) => StatusCode::NOT_FOUND,
            DepotError::DirRead(_)
            | DepotError::DirCreation(_)
            | DepotError::FileWrite(_)
            | DepotError::Delete(_)
            | DepotError::Rename(_) => {
                tracing::error!(%err, "operation failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorRes {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[derive(Serialize, ToSchema)]
struct ErrorRes {
    error: String,
}

#[derive(Serialize, ToSchema)]
struct MessageRes {
    message: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct PathChangeRes {
    message: String,
    new_path: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct FileEntryRes {
    name: String,
    category: String,
    is_directory: bool,
    /// `"X.XX MB"` for files, empty for directories.
    size: String,
    last_modified: DateTime<Utc>,
    /// Absolute direct-download URL; `null` for directories.
    download_url: Option<String>,
}

impl FileEntryRes {
    fn from_entry(entry: FileEntry, host: &str) -> Self {
        let download_url = if entry.is_directory {
            None
        } else {
            Some(download_url(host, &entry.relative_path))
        };
        Self {
            name: entry.name,
            category: entry.category,
            is_directory: entry.is_directory,
            size: entry.size,
            last_modified: entry.last_modified,
            download_url,
        }
    }
}

/// Absolute download URL for a store-relative path, percent-encoding each
/// segment but keeping the separators.
fn download_url(host: &str, relative_path: &str) -> String {
    let encoded = relative_path
        .split('/')
        .map(|segment| utf8_percent_encode(segment, NON_ALPHANUMERIC).to_string())
        .collect::<Vec<_>>()
        .join("/");
    format!("http://{host}/download/{encoded}")
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Health check response", body = HealthRes))
)]
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[derive(Deserialize, IntoParams)]
struct ListQuery {
    /// Category to list; omitted means the store root.
    category: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/files",
    params(ListQuery),
    responses(
        (status = 200, description = "One directory level of the store", body = [FileEntryRes]),
        (status = 400, description = "Invalid category path", body = ErrorRes),
        (status = 500, description = "Directory could not be read", body = ErrorRes)
    )
)]
async fn list_files(
    State(state): State<AppState>,
    Host(host): Host,
    Query(query): Query<ListQuery>,
) -> Result<Response, ApiError> {
    let entries = state.depot.list(query.category.as_deref())?;
    let list: Vec<FileEntryRes> = entries
        .into_iter()
        .map(|entry| FileEntryRes::from_entry(entry, &host))
        .collect();

    // The listing is also opened directly in browsers, so keep it readable.
    let body = serde_json::to_string_pretty(&list).map_err(|err| ApiError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: format!("failed to serialise listing: {err}"),
    })?;

    Ok((
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses((status = 200, description = "Fixed category names", body = [String]))
)]
async fn list_categories() -> Json<Vec<&'static str>> {
    Json(CATEGORIES.to_vec())
}

#[utoipa::path(
    get,
    path = "/download/{path}",
    params(("path" = String, Path, description = "Store-relative file path")),
    responses(
        (status = 200, description = "File bytes, inline or as attachment"),
        (status = 400, description = "Invalid path"),
        (status = 404, description = "File not found")
    )
)]
async fn download_file(State(state): State<AppState>, Path(rel): Path<String>) -> Response {
    let download = match state.depot.resolve_download(&rel) {
        Ok(download) => download,
        Err(err @ (DepotError::EmptyPath | DepotError::Traversal)) => {
            return (StatusCode::BAD_REQUEST, err.to_string()).into_response();
        }
        Err(DepotError::NotFound(_)) => {
            return (StatusCode::NOT_FOUND, "File not found").into_response();
        }
        Err(err) => {
            tracing::error!(%err, %rel, "download resolution failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Download failed").into_response();
        }
    };

    let file = match tokio::fs::File::open(&download.path).await {
        Ok(file) => file,
        Err(err) => {
            tracing::error!(%err, path = %download.path.display(), "download open failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Download failed").into_response();
        }
    };
    let length = file.metadata().await.ok().map(|m| m.len());

    let mut builder = Response::builder().status(StatusCode::OK);
    match download.disposition {
        Disposition::Inline(content_type) => {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        Disposition::Attachment => {
            builder = builder
                .header(header::CONTENT_TYPE, "application/octet-stream")
                .header(
                    header::CONTENT_DISPOSITION,
                    attachment_header(&download.file_name),
                );
        }
    }
    if let Some(length) = length {
        builder = builder.header(header::CONTENT_LENGTH, length);
    }

    builder
        .body(Body::from_stream(ReaderStream::new(file)))
        .unwrap_or_else(|err| {
            tracing::error!(%err, "download response build failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Download failed").into_response()
        })
}

fn attachment_header(file_name: &str) -> HeaderValue {
    let encoded = utf8_percent_encode(file_name, NON_ALPHANUMERIC).to_string();
    HeaderValue::from_str(&format!(
        "attachment; filename=\"{encoded}\"; filename*=UTF-8''{encoded}"
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"download\""))
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
struct UploadQuery {
    /// Destination category; omitted means the store root.
    category: Option<String>,
    /// Optional subpath under the category; only its directory part is used.
    relative_path: Option<String>,
    /// Base64-encoded exact filename (side channel for Unicode names).
    filename: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct UploadRes {
    message: String,
    file: String,
    category: String,
    download_url: String,
}

#[utoipa::path(
    post,
    path = "/api/upload",
    params(UploadQuery),
    responses(
        (status = 200, description = "Stored filename and download URL", body = UploadRes),
        (status = 400, description = "Missing file field or invalid path", body = ErrorRes),
        (status = 401, description = "Unauthorized")
    )
)]
async fn upload_file(
    State(state): State<AppState>,
    Host(host): Host,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Result<Json<UploadRes>, ApiError> {
    let mut stored = None;
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(format!("invalid multipart body: {err}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let transport_name = field.file_name().unwrap_or("unnamed").to_string();
        let filename = resolve_upload_filename(&transport_name, query.filename.as_deref());
        let prepared = state.depot.prepare_upload(
            query.category.as_deref(),
            query.relative_path.as_deref(),
            &filename,
        )?;

        // The upload is streamed to disk chunk by chunk; it is never held
        // whole in memory.
        let mut file = tokio::fs::File::create(&prepared.path)
            .await
            .map_err(|err| ApiError::from(DepotError::FileWrite(err)))?;
        let mut size: u64 = 0;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|err| ApiError::bad_request(format!("failed to read upload: {err}")))?
        {
            size += chunk.len() as u64;
            file.write_all(&chunk)
                .await
                .map_err(|err| ApiError::from(DepotError::FileWrite(err)))?;
        }
        file.flush()
            .await
            .map_err(|err| ApiError::from(DepotError::FileWrite(err)))?;
        tracing::info!(path = %prepared.path.display(), size, "stored upload");

        stored = Some(prepared);
        break;
    }

    let stored = stored.ok_or_else(|| ApiError::bad_request("Missing file field"))?;
    Ok(Json(UploadRes {
        message: "Upload successful".into(),
        download_url: download_url(&host, &stored.relative_path),
        file: stored.name,
        category: query
            .category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| ROOT_LABEL.to_string()),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/files/{path}",
    params(("path" = String, Path, description = "Store-relative path to delete")),
    responses(
        (status = 200, description = "Deleted", body = MessageRes),
        (status = 400, description = "Invalid path", body = ErrorRes),
        (status = 404, description = "Not found", body = ErrorRes),
        (status = 401, description = "Unauthorized")
    )
)]
async fn delete_entry(
    State(state): State<AppState>,
    Path(rel): Path<String>,
) -> Result<Json<MessageRes>, ApiError> {
    let kind = state.depot.delete(&rel)?;
    Ok(Json(MessageRes {
        message: match kind {
            DeletedKind::Directory => "Directory deleted successfully".into(),
            DeletedKind::File => "File deleted successfully".into(),
        },
    }))
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct RenameReq {
    old_path: Option<String>,
    new_name: Option<String>,
}

#[utoipa::path(
    put,
    path = "/api/files/rename",
    request_body = RenameReq,
    responses(
        (status = 200, description = "Renamed", body = PathChangeRes),
        (status = 400, description = "Missing or invalid input", body = ErrorRes),
        (status = 404, description = "Source not found", body = ErrorRes),
        (status = 401, description = "Unauthorized")
    )
)]
async fn rename_entry(
    State(state): State<AppState>,
    Json(req): Json<RenameReq>,
) -> Result<Json<PathChangeRes>, ApiError> {
    let (Some(old_path), Some(new_name)) = (req.old_path, req.new_name) else {
        return Err(ApiError::bad_request("Missing oldPath or newName"));
    };

    let new_path = state.depot.rename(&old_path, &new_name)?;
    Ok(Json(PathChangeRes {
        message: "File renamed successfully".into(),
        new_path,
    }))
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct MoveReq {
    old_path: Option<String>,
    /// Empty string, `/`, or the root label all denote the store root.
    target_dir: Option<String>,
}

#[utoipa::path(
    put,
    path = "/api/files/move",
    request_body = MoveReq,
    responses(
        (status = 200, description = "Moved", body = PathChangeRes),
        (status = 400, description = "Missing input or target directory does not exist", body = ErrorRes),
        (status = 404, description = "Source not found", body = ErrorRes),
        (status = 401, description = "Unauthorized")
    )
)]
async fn move_file(
    State(state): State<AppState>,
    Json(req): Json<MoveReq>,
) -> Result<Json<PathChangeRes>, ApiError> {
    let (Some(old_path), Some(target_dir)) = (req.old_path, req.target_dir) else {
        return Err(ApiError::bad_request("Missing oldPath or targetDir"));
    };

    let new_path = state.depot.move_entry(&old_path, &target_dir)?;
    Ok(Json(PathChangeRes {
        message: "File moved successfully".into(),
        new_path,
    }))
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct CreateFolderReq {
    category: Option<String>,
    folder_path: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/create-folder",
    request_body = CreateFolderReq,
    responses(
        (status = 200, description = "Created (idempotent)", body = MessageRes),
        (status = 400, description = "Missing or invalid folderPath", body = ErrorRes),
        (status = 401, description = "Unauthorized")
    )
)]
async fn create_folder(
    State(state): State<AppState>,
    Json(req): Json<CreateFolderReq>,
) -> Result<Json<MessageRes>, ApiError> {
    let Some(folder_path) = req.folder_path else {
        return Err(ApiError::bad_request("Missing folderPath"));
    };

    state
        .depot
        .create_folder(req.category.as_deref(), &folder_path)?;
    Ok(Json(MessageRes {
        message: "Folder created successfully".into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    // admin:admin
    const AUTH: &str = "Basic YWRtaW46YWRtaW4=";
    const HOST: &str = "localhost:9999";

    fn test_app() -> (TempDir, Router) {
        let temp = TempDir::new().unwrap();
        let config = DepotConfig::new(temp.path().join("files")).unwrap();
        let store = CategoryStore::new(&config);
        store.ensure_layout().unwrap();

        let public_dir = temp.path().join("public");
        fs::create_dir_all(&public_dir).unwrap();
        fs::write(public_dir.join("index.html"), "<!doctype html><title>depot</title>").unwrap();

        let state = AppState {
            depot: DepotService::new(store),
            credentials: BasicCredentials::new("admin", "admin"),
        };
        (temp, build_router(state, public_dir))
    }

    async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn req(method: &str, uri: &str) -> axum::http::request::Builder {
        axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .header("host", HOST)
    }

    #[tokio::test]
    async fn gated_route_challenges_without_credentials() {
        let (_temp, app) = test_app();

        let response = app
            .oneshot(req("GET", "/api/categories").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            CHALLENGE
        );
        assert_eq!(body_string(response).await, UNAUTHORIZED_BODY);
    }

    #[tokio::test]
    async fn categories_listed_with_credentials() {
        let (_temp, app) = test_app();

        let response = app
            .oneshot(
                req("GET", "/api/categories")
                    .header(header::AUTHORIZATION, AUTH)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        for category in CATEGORIES {
            assert!(body.contains(category), "missing {category}");
        }
    }

    #[tokio::test]
    async fn listing_is_public_and_labels_root() {
        let (_temp, app) = test_app();

        let response = app
            .oneshot(req("GET", "/api/files").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("videos"));
        assert!(body.contains(ROOT_LABEL));
        assert!(body.contains("\"downloadUrl\": null"));
    }

    #[tokio::test]
    async fn listing_reports_file_size_and_download_url() {
        let (temp, app) = test_app();
        fs::write(
            temp.path().join("files/documents/big.bin"),
            vec![0u8; 2_097_152],
        )
        .unwrap();

        let response = app
            .oneshot(
                req("GET", "/api/files?category=documents")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("2.00 MB"));
        assert!(body.contains("http://localhost:9999/download/documents/"));
    }

    #[tokio::test]
    async fn download_missing_file_is_404() {
        let (_temp, app) = test_app();

        let response = app
            .oneshot(req("GET", "/download/nope.txt").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, "File not found");
    }

    #[tokio::test]
    async fn download_traversal_is_400() {
        let (_temp, app) = test_app();

        let response = app
            .oneshot(
                req("GET", "/download/..%2F..%2Fetc%2Fpasswd")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn png_downloads_inline_with_content_type() {
        let (temp, app) = test_app();
        fs::write(temp.path().join("files/pictures/cat.png"), b"png-bytes").unwrap();

        let response = app
            .oneshot(
                req("GET", "/download/pictures/cat.png")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/png"
        );
        assert!(response.headers().get(header::CONTENT_DISPOSITION).is_none());
        assert_eq!(body_string(response).await, "png-bytes");
    }

    #[tokio::test]
    async fn zip_downloads_as_attachment_with_filename() {
        let (temp, app) = test_app();
        fs::write(temp.path().join("files/archive.zip"), b"zip-bytes").unwrap();

        let response = app
            .oneshot(
                req("GET", "/download/archive.zip")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment"));
        assert!(disposition.contains("archive"));
    }

    #[tokio::test]
    async fn upload_stores_base64_named_file() {
        let (temp, app) = test_app();

        let boundary = "depot-test-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"fallback.bin\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             hello depot\r\n\
             --{boundary}--\r\n"
        );

        // filename query is base64 for "foo.txt"
        let response = app
            .oneshot(
                req(
                    "POST",
                    "/api/upload?category=documents&filename=Zm9vLnR4dA%3D%3D",
                )
                .header(header::AUTHORIZATION, AUTH)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("\"file\":\"foo.txt\""));

        let stored = temp.path().join("files/documents/foo.txt");
        assert_eq!(fs::read(stored).unwrap(), b"hello depot");
    }

    #[tokio::test]
    async fn upload_traversal_filename_stays_in_store() {
        let (temp, app) = test_app();

        let boundary = "depot-test-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"../../evil.bin\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             contained\r\n\
             --{boundary}--\r\n"
        );

        let response = app
            .oneshot(
                req("POST", "/api/upload")
                    .header(header::AUTHORIZATION, AUTH)
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("\"file\":\"evil.bin\""));

        // Lands at the store root, never above it.
        assert!(temp.path().join("files/evil.bin").exists());
        assert!(!temp.path().join("evil.bin").exists());
    }

    #[tokio::test]
    async fn upload_without_file_field_is_400() {
        let (_temp, app) = test_app();

        let boundary = "depot-test-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"other\"\r\n\r\n\
             data\r\n\
             --{boundary}--\r\n"
        );

        let response = app
            .oneshot(
                req("POST", "/api/upload")
                    .header(header::AUTHORIZATION, AUTH)
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_string(response).await.contains("Missing file field"));
    }

    #[tokio::test]
    async fn delete_missing_path_is_404_json() {
        let (_temp, app) = test_app();

        let response = app
            .oneshot(
                req("DELETE", "/api/files/ghost.txt")
                    .header(header::AUTHORIZATION, AUTH)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_string(response).await.contains("File not found"));
    }

    #[tokio::test]
    async fn rename_with_missing_fields_is_400() {
        let (_temp, app) = test_app();

        let response = app
            .oneshot(
                req("PUT", "/api/files/rename")
                    .header(header::AUTHORIZATION, AUTH)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(
            body_string(response)
                .await
                .contains("Missing oldPath or newName")
        );
    }

    #[tokio::test]
    async fn move_to_missing_target_is_400_and_keeps_source() {
        let (temp, app) = test_app();
        fs::write(temp.path().join("files/keep.txt"), b"x").unwrap();

        let response = app
            .oneshot(
                req("PUT", "/api/files/move")
                    .header(header::AUTHORIZATION, AUTH)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"oldPath":"keep.txt","targetDir":"nowhere"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(
            body_string(response)
                .await
                .contains("Target directory does not exist")
        );
        assert!(temp.path().join("files/keep.txt").exists());
    }

    #[tokio::test]
    async fn move_to_root_label_succeeds() {
        let (temp, app) = test_app();
        fs::write(temp.path().join("files/videos/clip.mp4"), b"v").unwrap();

        let body = serde_json::json!({
            "oldPath": "videos/clip.mp4",
            "targetDir": ROOT_LABEL,
        });
        let response = app
            .oneshot(
                req("PUT", "/api/files/move")
                    .header(header::AUTHORIZATION, AUTH)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("\"newPath\":\"clip.mp4\""));
        assert!(temp.path().join("files/clip.mp4").exists());
    }

    #[tokio::test]
    async fn create_folder_twice_succeeds_both_times() {
        let (temp, app) = test_app();

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(
                    req("POST", "/api/create-folder")
                        .header(header::AUTHORIZATION, AUTH)
                        .header(header::CONTENT_TYPE, "application/json")
                        .body(Body::from(
                            r#"{"category":"documents","folderPath":"projects"}"#,
                        ))
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        assert!(temp.path().join("files/documents/projects").is_dir());
    }

    #[tokio::test]
    async fn static_ui_is_gated() {
        let (_temp, app) = test_app();

        let response = app
            .clone()
            .oneshot(req("GET", "/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(
                req("GET", "/")
                    .header(header::AUTHORIZATION, AUTH)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_is_public() {
        let (_temp, app) = test_app();

        let response = app
            .oneshot(req("GET", "/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("depot is alive"));
    }
}
