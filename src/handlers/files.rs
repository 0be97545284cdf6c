//! Reading and writing files under the serving directory.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::http::request::Request;
use crate::http::response::{Response, content_type};

const FILES_PREFIX: &str = "/files/";

/// Per-path write exclusion.
///
/// Writers to the same resolved path take turns; writers to different paths
/// proceed in parallel. Entries nobody holds or waits on are pruned on the
/// next acquire.
#[derive(Debug, Clone, Default)]
pub struct WriteLocks {
    table: Arc<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>>,
}

impl WriteLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other writer holds `path` and returns the guard.
    pub async fn acquire(&self, path: &Path) -> OwnedMutexGuard<()> {
        let lock = {
            let mut table = self.table.lock().await;
            table.retain(|_, lock| Arc::strong_count(lock) > 1);
            table.entry(path.to_path_buf()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Number of paths currently held or waited on.
    pub async fn tracked_paths(&self) -> usize {
        self.table
            .lock()
            .await
            .values()
            .filter(|lock| Arc::strong_count(lock) > 1)
            .count()
    }
}

/// Maps `/files/<name>` onto the serving directory.
///
/// Returns `None` when the prefix is missing, the name is empty, or the name
/// contains anything but plain components (`..`, `.`, a root).
pub fn resolve(directory: &Path, request_path: &str) -> Option<PathBuf> {
    let name = request_path.strip_prefix(FILES_PREFIX)?;
    if name.is_empty() {
        return None;
    }

    let relative = Path::new(name);
    let plain = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)));

    plain.then(|| directory.join(relative))
}

/// `GET /files/<name>`: the file's bytes as `application/octet-stream`.
///
/// A missing file is 404, and so is `/files` with no name after it. A
/// rejected name or any other failure is 400.
pub async fn read_file(request: &Request, directory: &Path) -> Response {
    if !request.path.starts_with(FILES_PREFIX) {
        tracing::debug!(path = %request.path, "No file name in path");
        return Response::not_found();
    }

    let Some(path) = resolve(directory, &request.path) else {
        tracing::warn!(path = %request.path, "Rejected file name");
        return Response::bad_request();
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => Response::ok(content_type::OCTET_STREAM, bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(file = %path.display(), "File not found");
            Response::not_found()
        }
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "Failed to read file");
            Response::bad_request()
        }
    }
}

/// `POST /files/<name>`: stores the request body, creating or truncating
/// the file.
///
/// The request must carry `Content-Type: application/octet-stream` exactly;
/// otherwise nothing is written and the answer is 400.
pub async fn write_file(request: &Request, directory: &Path, locks: &WriteLocks) -> Response {
    if request.header("Content-Type") != Some(content_type::OCTET_STREAM) {
        tracing::warn!(path = %request.path, "File upload without octet-stream content type");
        return Response::bad_request();
    }

    let Some(path) = resolve(directory, &request.path) else {
        tracing::warn!(path = %request.path, "Rejected file name");
        return Response::bad_request();
    };

    let _guard = locks.acquire(&path).await;

    match tokio::fs::write(&path, &request.body).await {
        Ok(()) => {
            tracing::debug!(file = %path.display(), bytes = request.body.len(), "File written");
            Response::created()
        }
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "Failed to write file");
            Response::bad_request()
        }
    }
}
