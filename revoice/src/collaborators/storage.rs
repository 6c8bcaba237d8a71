//! Client for the artifact storage uploader.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ArtifactStore, UploadReceipt, describe_failure};
use crate::utils::http_client::endpoint;
use crate::{Error, Result};

#[derive(Debug, Serialize)]
struct UploadRequest<'a> {
    file_path: &'a str,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    status: Option<String>,
    file_id: Option<String>,
    message: Option<String>,
}

/// `POST /upload {file_path}` -> `{status, file_id}`.
///
/// The storage service reads the file from a shared volume, so only the path
/// travels over the wire.
pub struct StorageClient {
    client: reqwest::Client,
    url: String,
}

impl StorageClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            url: endpoint(base_url, "/upload"),
        }
    }
}

#[async_trait]
impl ArtifactStore for StorageClient {
    async fn upload(&self, path: &Path) -> Result<UploadReceipt> {
        let file_path = path.to_string_lossy();
        let response = self
            .client
            .post(&self.url)
            .json(&UploadRequest {
                file_path: &file_path,
            })
            .send()
            .await
            .map_err(|e| Error::Storage(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Storage(describe_failure(response).await));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| Error::Storage(format!("unreadable response: {}", e)))?;

        match (body.status.as_deref(), body.file_id) {
            (Some("success"), Some(file_id)) => Ok(UploadReceipt { file_id }),
            (status, _) => Err(Error::Storage(body.message.unwrap_or_else(|| {
                format!("unexpected status {:?}", status.unwrap_or("missing"))
            }))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::StatusCode, routing::post};
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_upload_success() {
        let router = Router::new().route(
            "/upload",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["file_path"], "temp/talk_rewritten.txt");
                Json(json!({ "status": "success", "file_id": "1AbC" }))
            }),
        );
        let client = StorageClient::new(reqwest::Client::new(), &serve(router).await);

        let receipt = client
            .upload(Path::new("temp/talk_rewritten.txt"))
            .await
            .unwrap();
        assert_eq!(receipt.file_id, "1AbC");
    }

    #[tokio::test]
    async fn test_upload_service_error() {
        let router = Router::new().route(
            "/upload",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "status": "error", "message": "token.json not found" })),
                )
            }),
        );
        let client = StorageClient::new(reqwest::Client::new(), &serve(router).await);

        let err = client.upload(Path::new("a.wav")).await.unwrap_err();
        assert!(matches!(err, Error::Storage(ref m) if m.contains("token.json not found")));
    }

    #[tokio::test]
    async fn test_upload_non_success_status_in_body() {
        let router = Router::new().route(
            "/upload",
            post(|| async { Json(json!({ "status": "pending" })) }),
        );
        let client = StorageClient::new(reqwest::Client::new(), &serve(router).await);

        let err = client.upload(Path::new("a.wav")).await.unwrap_err();
        assert!(matches!(err, Error::Storage(ref m) if m.contains("pending")));
    }
}
