use crate::models::{FetchNotesResponse, NewNote, Note, SearchMoviesResponse};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    /// Transport failure (DNS, refused connection, aborted fetch).
    Network,
    /// Non-2xx response; status preserved for sub-cases (404, 4xx).
    Http { status: u16 },
    /// 2xx response whose body did not match the expected shape.
    Parse,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    fn http(status: reqwest::StatusCode, body: String, ctx: &str) -> Self {
        Self {
            kind: ApiErrorKind::Http {
                status: status.as_u16(),
            },
            message: format!("{ctx} ({status}): {body}"),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self.kind {
            ApiErrorKind::Http { status } => Some(status),
            _ => None,
        }
    }

    /// HTTP 404 — delete of an id the server no longer knows.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Any 4xx other than 404 — the server rejected the request shape.
    /// The server is the source of truth for constraints; we do no local
    /// validation beyond type shape.
    pub fn is_validation(&self) -> bool {
        matches!(self.status(), Some(s) if (400..500).contains(&s) && s != 404)
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

/// Runtime configuration, read from `window.ENV` so tokens and base URLs can
/// be swapped per deployment without rebuilding the wasm bundle.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EnvConfig {
    pub notes_api_url: String,
    pub notes_token: Option<String>,
    pub tmdb_api_url: String,
    pub tmdb_token: Option<String>,
}

#[cfg(target_arch = "wasm32")]
fn env_string(env: &wasm_bindgen::JsValue, key: &str) -> Option<String> {
    js_sys::Reflect::get(env, &key.into())
        .ok()
        .and_then(|v| v.as_string())
        .filter(|s| !s.trim().is_empty())
}

impl EnvConfig {
    pub fn new() -> Self {
        let mut cfg = Self {
            notes_api_url: "https://notehub-public.goit.study/api".to_string(),
            notes_token: None,
            tmdb_api_url: "https://api.themoviedb.org/3".to_string(),
            tmdb_token: None,
        };

        #[cfg(target_arch = "wasm32")]
        if let Some(window) = web_sys::window() {
            if let Some(env) = window.get("ENV") {
                if !env.is_undefined() && env.is_object() {
                    if let Some(url) = env_string(&env, "NOTES_API_URL") {
                        cfg.notes_api_url = url;
                    }
                    if let Some(url) = env_string(&env, "TMDB_API_URL") {
                        cfg.tmdb_api_url = url;
                    }
                    cfg.notes_token = env_string(&env, "NOTES_TOKEN");
                    cfg.tmdb_token = env_string(&env, "TMDB_TOKEN");
                }
            }
        }

        cfg
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn with_bearer(req: reqwest::RequestBuilder, token: &Option<String>) -> reqwest::RequestBuilder {
    if let Some(token) = token {
        req.header("Authorization", format!("Bearer {}", token))
    } else {
        req
    }
}

async fn send_json<T: serde::de::DeserializeOwned>(
    req: reqwest::RequestBuilder,
    ctx: &str,
) -> ApiResult<T> {
    let res = req.send().await.map_err(ApiError::network)?;

    if res.status().is_success() {
        res.json().await.map_err(ApiError::parse)
    } else {
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        Err(ApiError::http(status, body, ctx))
    }
}

/// NoteHub client. Bearer-token authenticated; no retries.
#[derive(Clone, Debug)]
pub(crate) struct NotesApi {
    base_url: String,
    token: Option<String>,
}

impl NotesApi {
    pub fn new(base_url: String, token: Option<String>) -> Self {
        Self { base_url, token }
    }

    pub fn from_env(cfg: &EnvConfig) -> Self {
        Self::new(cfg.notes_api_url.clone(), cfg.notes_token.clone())
    }

    pub async fn fetch_notes(
        &self,
        page: u32,
        per_page: u32,
        search: &str,
    ) -> ApiResult<FetchNotesResponse> {
        let client = reqwest::Client::new();
        let mut req = client.get(format!("{}/notes", self.base_url)).query(&[
            ("page", page.to_string()),
            ("perPage", per_page.to_string()),
        ]);

        let search = search.trim();
        if !search.is_empty() {
            req = req.query(&[("search", search)]);
        }

        send_json(with_bearer(req, &self.token), "Fetching notes failed").await
    }

    pub async fn create_note(&self, note: &NewNote) -> ApiResult<Note> {
        let client = reqwest::Client::new();
        let req = client.post(format!("{}/notes", self.base_url)).json(note);
        send_json(with_bearer(req, &self.token), "Creating note failed").await
    }

    pub async fn delete_note(&self, id: &str) -> ApiResult<Note> {
        let client = reqwest::Client::new();
        let req = client.delete(format!(
            "{}/notes/{}",
            self.base_url,
            urlencoding::encode(id)
        ));
        send_json(with_bearer(req, &self.token), "Deleting note failed").await
    }
}

/// TMDB search client. Callers are expected to skip the call entirely for an
/// empty query; the fetch cycle disables the query instead of issuing it.
#[derive(Clone, Debug)]
pub(crate) struct MoviesApi {
    base_url: String,
    token: Option<String>,
}

impl MoviesApi {
    pub fn new(base_url: String, token: Option<String>) -> Self {
        Self { base_url, token }
    }

    pub fn from_env(cfg: &EnvConfig) -> Self {
        Self::new(cfg.tmdb_api_url.clone(), cfg.tmdb_token.clone())
    }

    pub async fn search_movies(&self, query: &str, page: u32) -> ApiResult<SearchMoviesResponse> {
        let client = reqwest::Client::new();
        let req = client
            .get(format!("{}/search/movie", self.base_url))
            .query(&[
                ("query", query.to_string()),
                ("page", page.to_string()),
                ("language", "en-US".to_string()),
            ]);

        send_json(with_bearer(req, &self.token), "Movie search failed").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http_error(status: u16) -> ApiError {
        ApiError {
            kind: ApiErrorKind::Http { status },
            message: format!("Request failed ({status})"),
        }
    }

    #[test]
    fn test_http_error_status_sub_cases() {
        assert!(http_error(404).is_not_found());
        assert!(!http_error(404).is_validation());

        assert!(http_error(400).is_validation());
        assert!(http_error(422).is_validation());
        assert!(!http_error(500).is_validation());
        assert!(!http_error(500).is_not_found());
    }

    #[test]
    fn test_network_error_has_no_status() {
        let e = ApiError {
            kind: ApiErrorKind::Network,
            message: "connection refused".to_string(),
        };
        assert!(e.status().is_none());
        assert!(!e.is_not_found());
        assert!(!e.is_validation());
    }

    #[test]
    fn test_api_error_display_is_message() {
        let e = ApiError {
            kind: ApiErrorKind::Parse,
            message: "missing field `notes`".to_string(),
        };
        assert_eq!(e.to_string(), "missing field `notes`");
    }

    #[test]
    fn test_notes_api_new() {
        let api = NotesApi::new(
            "https://notehub-public.goit.study/api".to_string(),
            Some("t".to_string()),
        );
        assert_eq!(api.base_url, "https://notehub-public.goit.study/api");
        assert_eq!(api.token.as_deref(), Some("t"));
    }

    #[test]
    fn test_movies_api_new_without_token() {
        let api = MoviesApi::new("https://api.themoviedb.org/3".to_string(), None);
        assert!(api.token.is_none());
    }
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_env_config_defaults_without_window_env() {
        let cfg = EnvConfig::new();
        assert_eq!(cfg.notes_api_url, "https://notehub-public.goit.study/api");
        assert_eq!(cfg.tmdb_api_url, "https://api.themoviedb.org/3");
        assert!(cfg.notes_token.is_none());
        assert!(cfg.tmdb_token.is_none());
    }
}
