//! The network side of the proxy.

use super::http::{Method, Request, Response};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// A request that produced no response at all.
///
/// HTTP error statuses are not fetch errors; they arrive as a [`Response`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    /// URL that was requested.
    pub url: String,
    /// Why no response was produced.
    pub reason: String,
}

impl FetchError {
    /// Create a fetch error.
    #[must_use]
    pub fn new(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fetch of {} failed: {}", self.url, self.reason)
    }
}

impl std::error::Error for FetchError {}

/// Something that can answer requests.
///
/// Implementations are shared between concurrently handled requests.
pub trait Network: Send + Sync {
    /// Perform a request.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] when no response could be obtained.
    fn fetch(&self, request: &Request) -> Result<Response, FetchError>;
}

/// Serves one origin from a local directory.
///
/// `GET {origin}/a/b.js` reads `{root}/a/b.js`. Requests for other origins
/// fail as if the host were unreachable.
#[derive(Debug, Clone)]
pub struct DirectoryOrigin {
    origin: String,
    root: PathBuf,
}

impl DirectoryOrigin {
    /// Serve `origin` from `root`.
    #[must_use]
    pub fn new(origin: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            origin: origin.into().trim_end_matches('/').to_string(),
            root: root.into(),
        }
    }

    /// Directory being served.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a URL path onto the served directory, refusing to leave it.
    fn local_path(&self, path: &str) -> Option<PathBuf> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = path.trim_start_matches('/');
        let path = if path.is_empty() { "index.html" } else { path };

        let relative = Path::new(path);
        if relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            Some(self.root.join(relative))
        } else {
            None
        }
    }
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("css") => "text/css; charset=utf-8",
        Some("png") => "image/png",
        Some("svg") => "image/svg+xml",
        Some("webmanifest") => "application/manifest+json",
        _ => "application/octet-stream",
    }
}

impl Network for DirectoryOrigin {
    fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        let Some(path) = request
            .url
            .strip_prefix(&self.origin)
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
        else {
            return Err(FetchError::new(&request.url, "no route to host"));
        };

        if !matches!(request.method, Method::Get | Method::Head) {
            return Ok(Response::new(405, Vec::new()).with_header("Allow", "GET, HEAD"));
        }

        let Some(file) = self.local_path(path) else {
            return Ok(Response::new(403, Vec::new()));
        };

        match fs::read(&file) {
            Ok(bytes) => {
                let body = if request.method == Method::Head {
                    Vec::new()
                } else {
                    bytes
                };
                Ok(Response::ok(body).with_header("Content-Type", content_type(&file)))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound || file.is_dir() => {
                Ok(Response::new(404, Vec::new()))
            }
            Err(e) => Err(FetchError::new(&request.url, e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin_with(files: &[(&str, &str)]) -> (tempfile::TempDir, DirectoryOrigin) {
        let dir = tempfile::tempdir().unwrap();
        for (name, contents) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, contents).unwrap();
        }
        let origin = DirectoryOrigin::new("http://localhost/", dir.path());
        (dir, origin)
    }

    #[test]
    fn test_serves_existing_file() {
        let (_dir, origin) = origin_with(&[("levels.js", "const gameLevels = [];")]);
        let response = origin
            .fetch(&Request::get("http://localhost/levels.js"))
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"const gameLevels = [];");
        assert_eq!(
            response.header("content-type"),
            Some("text/javascript; charset=utf-8")
        );
    }

    #[test]
    fn test_root_serves_index() {
        let (_dir, origin) = origin_with(&[("index.html", "<html></html>")]);
        let response = origin.fetch(&Request::get("http://localhost/")).unwrap();
        assert!(response.is_ok());
        let response = origin
            .fetch(&Request::get("http://localhost/index.html?v=2"))
            .unwrap();
        assert!(response.is_ok());
    }

    #[test]
    fn test_missing_file_is_404() {
        let (_dir, origin) = origin_with(&[]);
        let response = origin
            .fetch(&Request::get("http://localhost/missing.png"))
            .unwrap();
        assert_eq!(response.status, 404);
    }

    #[test]
    fn test_foreign_origin_fails() {
        let (_dir, origin) = origin_with(&[("a.js", "")]);
        let err = origin
            .fetch(&Request::get("https://cdn.example/a.js"))
            .unwrap_err();
        assert_eq!(err.url, "https://cdn.example/a.js");
        assert!(origin
            .fetch(&Request::get("http://localhostile/a.js"))
            .is_err());
    }

    #[test]
    fn test_parent_traversal_refused() {
        let (_dir, origin) = origin_with(&[]);
        let response = origin
            .fetch(&Request::get("http://localhost/../etc/passwd"))
            .unwrap();
        assert_eq!(response.status, 403);
    }

    #[test]
    fn test_write_methods_not_allowed() {
        let (_dir, origin) = origin_with(&[("score", "")]);
        let response = origin
            .fetch(&Request::new(Method::Post, "http://localhost/score"))
            .unwrap();
        assert_eq!(response.status, 405);
    }
}
