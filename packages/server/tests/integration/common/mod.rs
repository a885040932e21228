use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use common::storage::FilesystemUploadStore;
use reqwest::Client;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tempfile::TempDir;

use labeler_server::config::{AppConfig, CorsConfig, DatabaseConfig, ServerConfig, StorageConfig};
use labeler_server::state::AppState;

/// Upload limit used by the test server.
pub const MAX_UPLOAD_SIZE: u64 = 64 * 1024;

pub mod routes {
    pub const IMAGES: &str = "/api/images";
    pub const LABELS: &str = "/api/labels";

    pub fn image(id: i32) -> String {
        format!("/api/images/{id}")
    }

    pub fn image_labels(image_id: i32) -> String {
        format!("/api/images/{image_id}/labels")
    }

    pub fn image_label(image_id: i32, label_id: i32) -> String {
        format!("/api/images/{image_id}/labels/{label_id}")
    }
}

/// A running test server backed by a throwaway SQLite database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    pub uploads_dir: PathBuf,
    _dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let uploads_dir = dir.path().join("uploads");
        let public_dir = dir.path().join("public");
        std::fs::create_dir_all(&public_dir).expect("Failed to create public dir");
        std::fs::write(
            public_dir.join("index.html"),
            "<!doctype html><title>Image Labeler</title>",
        )
        .expect("Failed to write index.html");

        let app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            database: DatabaseConfig {
                url: format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display()),
                max_connections: 5,
            },
            storage: StorageConfig {
                uploads_dir: uploads_dir.clone(),
                public_dir,
                max_upload_size: MAX_UPLOAD_SIZE,
            },
        };

        let db = labeler_server::database::init_db(&app_config.database)
            .await
            .expect("Failed to initialize test database");
        let uploads = FilesystemUploadStore::new(uploads_dir.clone(), MAX_UPLOAD_SIZE)
            .await
            .expect("Failed to create upload store");

        let state = AppState {
            db: db.clone(),
            uploads: Arc::new(uploads),
            config: app_config,
        };

        let app = labeler_server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            uploads_dir,
            _dir: dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn post_raw(&self, path: &str, body: &'static str) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("Failed to send DELETE request");

        TestResponse::from_response(res).await
    }

    /// Send a multipart upload with the file in the given field.
    pub async fn upload_field(
        &self,
        field: &str,
        file_name: &str,
        file_bytes: Vec<u8>,
        mime: Option<&str>,
    ) -> TestResponse {
        let mut part = reqwest::multipart::Part::bytes(file_bytes).file_name(file_name.to_string());
        if let Some(mime) = mime {
            part = part.mime_str(mime).expect("Failed to set MIME type");
        }
        let form = reqwest::multipart::Form::new().part(field.to_string(), part);

        let res = self
            .client
            .post(self.url(routes::IMAGES))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart upload request");

        TestResponse::from_response(res).await
    }

    pub async fn upload(&self, file_name: &str, file_bytes: Vec<u8>) -> TestResponse {
        self.upload_field("image", file_name, file_bytes, None).await
    }

    /// Upload a small image and return its `image_id`.
    pub async fn upload_image(&self, file_name: &str) -> i32 {
        let res = self.upload(file_name, b"\x89PNG\r\n\x1a\nfake".to_vec()).await;
        assert_eq!(res.status, 200, "upload_image failed: {}", res.text);
        res.body["image_id"]
            .as_i64()
            .expect("upload response should contain 'image_id'") as i32
    }

    /// Create a label via the API and return its `id`.
    pub async fn create_label(&self, name: &str) -> i32 {
        let res = self
            .post(routes::LABELS, &serde_json::json!({ "name": name }))
            .await;
        assert_eq!(res.status, 201, "create_label failed: {}", res.text);
        res.id()
    }

    /// Attach a label to an image and return the association id.
    pub async fn attach(&self, image_id: i32, label_id: i32) -> i32 {
        let res = self
            .post(
                &routes::image_labels(image_id),
                &serde_json::json!({ "label_id": label_id }),
            )
            .await;
        assert_eq!(res.status, 201, "attach failed: {}", res.text);
        res.body["annotation_id"]
            .as_i64()
            .expect("attach response should contain 'annotation_id'") as i32
    }

    /// Path on disk of a stored upload given its public URL.
    pub fn stored_path(&self, url: &str) -> PathBuf {
        let filename = url
            .strip_prefix("/uploads/")
            .expect("upload url should start with /uploads/");
        self.uploads_dir.join(filename)
    }
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    pub fn id(&self) -> i32 {
        self.body["id"]
            .as_i64()
            .expect("response body should contain 'id'") as i32
    }

    pub fn code(&self) -> &str {
        self.body["code"].as_str().unwrap_or_default()
    }
}
