use std::path::{Path, PathBuf};

use crate::collaborators::ArtifactStore;
use crate::logging::LogSink;

/// Outcome of uploading one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded { path: PathBuf, file_id: String },
    Failed { path: PathBuf, reason: String },
}

impl UploadOutcome {
    pub fn path(&self) -> &Path {
        match self {
            UploadOutcome::Uploaded { path, .. } | UploadOutcome::Failed { path, .. } => path,
        }
    }

    pub fn is_uploaded(&self) -> bool {
        matches!(self, UploadOutcome::Uploaded { .. })
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Upload each artifact in turn. One failure never stops the others.
pub async fn persist_artifacts(
    store: &dyn ArtifactStore,
    sink: &LogSink,
    paths: &[PathBuf],
) -> Vec<UploadOutcome> {
    let mut outcomes = Vec::with_capacity(paths.len());

    for path in paths {
        let name = display_name(path);
        sink.info(format!("Uploading {}...", name));

        let outcome = match store.upload(path).await {
            Ok(receipt) => {
                sink.info(format!("Uploaded {} (file id: {})", name, receipt.file_id));
                UploadOutcome::Uploaded {
                    path: path.clone(),
                    file_id: receipt.file_id,
                }
            }
            Err(e) => {
                sink.error(format!("Upload failed for {}: {}", name, e));
                UploadOutcome::Failed {
                    path: path.clone(),
                    reason: e.to_string(),
                }
            }
        };
        outcomes.push(outcome);
    }

    let uploaded = outcomes.iter().filter(|o| o.is_uploaded()).count();
    sink.info(format!(
        "Uploads finished: {}/{} succeeded",
        uploaded,
        outcomes.len()
    ));

    outcomes
}
