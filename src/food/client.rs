use std::{sync::RwLock, time::Duration};

use async_trait::async_trait;
use reqwest::{
    header::{ACCEPT, LOCATION},
    redirect::Policy,
    Client,
};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::{form_urlencoded, Url};

use crate::{config::FoodApiConfig, error::ApiError};

#[derive(Debug, Error)]
pub enum FoodError {
    #[error("nutrition API connection error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("nutrition API redirected (HTTP {status}) to {location}; point FOOD_API_BASE_URL at the final host")]
    Redirect { status: u16, location: String },

    #[error("nutrition API error: HTTP {status} / {body}{hint}")]
    Status {
        status: u16,
        body: String,
        hint: &'static str,
    },

    #[error("nutrition API response is not JSON: {0}")]
    NotJson(String),

    #[error("nutrition API reported {code} / {message}")]
    ResultCode { code: String, message: String },

    #[error("nutrition API response could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid nutrition API url: {0}")]
    Url(#[from] url::ParseError),

    #[error("no nutrition API service key configured")]
    NoKey,
}

impl From<FoodError> for ApiError {
    fn from(e: FoodError) -> Self {
        ApiError::Upstream(e.to_string())
    }
}

/// Anything that can answer a food-name query with the raw nutrition API body.
#[async_trait]
pub trait FoodSource: Send + Sync {
    async fn search_by_name(&self, query: &str, page: u32, rows: u32) -> Result<String, FoodError>;
}

/// Which of the two issued service keys to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMode {
    /// Raw key, percent-encoded on the way out.
    Decoded,
    /// Key already in URL-encoded form, sent verbatim.
    Encoded,
}

impl KeyMode {
    fn other(self) -> Self {
        match self {
            KeyMode::Decoded => KeyMode::Encoded,
            KeyMode::Encoded => KeyMode::Decoded,
        }
    }
}

const PROBE_QUERY: &str = "김밥";

pub struct PublicFoodClient {
    http: Client,
    base_url: String,
    endpoint: String,
    key_encoded: Option<String>,
    key_decoded: Option<String>,
    working: RwLock<Option<KeyMode>>,
}

impl PublicFoodClient {
    pub fn new(cfg: &FoodApiConfig) -> anyhow::Result<Self> {
        if cfg.key_encoded.is_none() && cfg.key_decoded.is_none() {
            anyhow::bail!("nutrition API needs at least one service key");
        }
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .read_timeout(Duration::from_secs(10))
            .redirect(Policy::none())
            .build()?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim().to_string(),
            endpoint: cfg.endpoint.trim().to_string(),
            key_encoded: cfg.key_encoded.clone(),
            key_decoded: cfg.key_decoded.clone(),
            working: RwLock::new(None),
        })
    }

    fn key(&self, mode: KeyMode) -> Option<&str> {
        match mode {
            KeyMode::Decoded => self.key_decoded.as_deref(),
            KeyMode::Encoded => self.key_encoded.as_deref(),
        }
    }

    pub fn working_mode(&self) -> Option<KeyMode> {
        self.working.read().ok().and_then(|g| *g)
    }

    fn remember(&self, mode: KeyMode) {
        if let Ok(mut g) = self.working.write() {
            if *g != Some(mode) {
                info!(?mode, "nutrition API key mode selected");
            }
            *g = Some(mode);
        }
    }

    /// Tries the raw key first, then the encoded one, with a one-row probe.
    async fn detect_working_key(&self, sample: &str) -> Result<KeyMode, FoodError> {
        let probe = if sample.trim().is_empty() { PROBE_QUERY } else { sample };
        let mut last_err = None;
        for mode in [KeyMode::Decoded, KeyMode::Encoded] {
            if self.key(mode).is_none() {
                continue;
            }
            match self.call(probe, 1, 1, mode).await {
                Ok(_) => {
                    self.remember(mode);
                    return Ok(mode);
                }
                Err(e) => {
                    warn!(?mode, error = %e, "nutrition API key probe failed");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or(FoodError::NoKey))
    }

    /// One request, plus one retry without `www.` when the API redirects.
    async fn call(&self, query: &str, page: u32, rows: u32, mode: KeyMode) -> Result<String, FoodError> {
        let key = self.key(mode).ok_or(FoodError::NoKey)?;
        let url = build_url(&self.base_url, &self.endpoint, key, mode, query, page, rows)?;
        match self.call_once(url).await {
            Err(FoodError::Redirect { status, location }) => match strip_www(&self.base_url) {
                Some(alt_base) => {
                    warn!(status, %location, "nutrition API redirected; retrying without www");
                    let url = build_url(&alt_base, &self.endpoint, key, mode, query, page, rows)?;
                    self.call_once(url).await
                }
                None => Err(FoodError::Redirect { status, location }),
            },
            other => other,
        }
    }

    async fn call_once(&self, url: Url) -> Result<String, FoodError> {
        debug!(host = url.host_str().unwrap_or(""), path = url.path(), "nutrition API request");
        let res = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = res.status();
        if status.is_redirection() {
            let location = res
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();
            return Err(FoodError::Redirect {
                status: status.as_u16(),
                location,
            });
        }

        let body = res.text().await?;
        if !status.is_success() {
            let hint = if body.contains("SERVICE KEY IS NOT REGISTERED") {
                " (check that the service key application is approved)"
            } else {
                ""
            };
            return Err(FoodError::Status {
                status: status.as_u16(),
                body: abbreviate(&body, 500),
                hint,
            });
        }
        // Key errors come back as an XML envelope with HTTP 200.
        if !body.trim_start().starts_with('{') {
            return Err(FoodError::NotJson(abbreviate(&body, 400)));
        }
        Ok(body)
    }
}

#[async_trait]
impl FoodSource for PublicFoodClient {
    async fn search_by_name(&self, query: &str, page: u32, rows: u32) -> Result<String, FoodError> {
        let q = query.trim();
        let page = page.max(1);
        let rows = rows.clamp(1, 50);

        let mode = match self.working_mode() {
            Some(m) => m,
            None => self.detect_working_key(q).await?,
        };

        match self.call(q, page, rows, mode).await {
            Ok(body) => Ok(body),
            Err(first) => {
                let alt = mode.other();
                if self.key(alt).is_none() {
                    return Err(first);
                }
                warn!(error = %first, ?alt, "nutrition API call failed; retrying with alternate key");
                let body = self.call(q, page, rows, alt).await?;
                self.remember(alt);
                Ok(body)
            }
        }
    }
}

fn encode(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

fn join_url(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", &base[..base.len() - 1], path),
        (false, false) if !path.is_empty() => format!("{base}/{path}"),
        _ => format!("{base}{path}"),
    }
}

pub(crate) fn build_url(
    base: &str,
    endpoint: &str,
    key: &str,
    mode: KeyMode,
    query: &str,
    page: u32,
    rows: u32,
) -> Result<Url, url::ParseError> {
    let service_key = match mode {
        KeyMode::Encoded => key.to_string(),
        KeyMode::Decoded => encode(key),
    };
    Url::parse(&format!(
        "{}?serviceKey={}&type=json&pageNo={}&numOfRows={}&foodNm={}",
        join_url(base, endpoint),
        service_key,
        page,
        rows,
        encode(query)
    ))
}

fn strip_www(base: &str) -> Option<String> {
    base.contains("://www.")
        .then(|| base.replacen("://www.", "://", 1))
}

fn abbreviate(s: &str, max: usize) -> String {
    let flat = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > max {
        let head: String = flat.chars().take(max).collect();
        format!("{head}...")
    } else {
        flat
    }
}

#[cfg(test)]
pub(crate) mod stub {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    use super::*;

    /// Answers every query with a canned body and records what was asked.
    pub struct StubFoodSource {
        pub body: String,
        pub calls: AtomicUsize,
        pub queries: Mutex<Vec<String>>,
    }

    impl StubFoodSource {
        pub fn new(body: impl Into<String>) -> Self {
            Self {
                body: body.into(),
                calls: AtomicUsize::new(0),
                queries: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FoodSource for StubFoodSource {
        async fn search_by_name(&self, query: &str, _page: u32, _rows: u32) -> Result<String, FoodError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().unwrap().push(query.to_string());
            Ok(self.body.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        collections::HashMap,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
    };

    use axum::{extract::Query, routing::get, Router};

    #[test]
    fn join_url_handles_slashes() {
        assert_eq!(join_url("https://a.kr/", "/x"), "https://a.kr/x");
        assert_eq!(join_url("https://a.kr", "x"), "https://a.kr/x");
        assert_eq!(join_url("https://a.kr", "/x"), "https://a.kr/x");
        assert_eq!(join_url("https://a.kr/", "x"), "https://a.kr/x");
    }

    #[test]
    fn build_url_encodes_decoded_key_only() {
        let url = build_url("https://a.kr", "/svc", "ab+c/d==", KeyMode::Decoded, "김밥", 2, 10).unwrap();
        let q = url.query().unwrap();
        assert!(q.starts_with("serviceKey=ab%2Bc%2Fd%3D%3D&type=json&pageNo=2&numOfRows=10&foodNm="));
        assert!(!q.contains("김밥"));

        let url = build_url("https://a.kr", "/svc", "ab%2Bc", KeyMode::Encoded, "rice", 1, 1).unwrap();
        assert!(url.query().unwrap().starts_with("serviceKey=ab%2Bc&"));
        assert!(url.query().unwrap().ends_with("foodNm=rice"));
    }

    #[test]
    fn strip_www_only_rewrites_www_hosts() {
        assert_eq!(
            strip_www("https://www.api.data.go.kr").as_deref(),
            Some("https://api.data.go.kr")
        );
        assert_eq!(strip_www("https://apis.data.go.kr"), None);
    }

    #[test]
    fn abbreviate_flattens_and_truncates() {
        assert_eq!(abbreviate("a\n  b\tc", 10), "a b c");
        assert_eq!(abbreviate("abcdef", 3), "abc...");
    }

    #[test]
    fn new_requires_a_key() {
        let cfg = FoodApiConfig {
            base_url: "http://localhost".into(),
            endpoint: "/x".into(),
            key_encoded: None,
            key_decoded: None,
        };
        assert!(PublicFoodClient::new(&cfg).is_err());
    }

    /// Upstream that only accepts `serviceKey=good` and answers anything else in XML.
    async fn spawn_upstream(hits: Arc<AtomicUsize>) -> String {
        let app = Router::new().route(
            "/food",
            get(move |Query(q): Query<HashMap<String, String>>| {
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    if q.get("serviceKey").map(String::as_str) == Some("good") {
                        format!(r#"{{"records":[{{"foodNm":"{}","enerc":"100"}}]}}"#, q["foodNm"])
                    } else {
                        "<OpenAPI_ServiceResponse><returnAuthMsg>SERVICE_KEY_IS_NOT_REGISTERED_ERROR</returnAuthMsg></OpenAPI_ServiceResponse>".to_string()
                    }
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn falls_back_to_encoded_key_and_remembers_it() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base = spawn_upstream(hits.clone()).await;
        let client = PublicFoodClient::new(&FoodApiConfig {
            base_url: base,
            endpoint: "food".into(),
            key_encoded: Some("good".into()),
            key_decoded: Some("bad key".into()),
        })
        .unwrap();

        let body = client.search_by_name("rice", 1, 10).await.unwrap();
        assert!(body.contains("\"foodNm\":\"rice\""));
        assert_eq!(client.working_mode(), Some(KeyMode::Encoded));
        // decoded probe, encoded probe, real call
        assert_eq!(hits.load(Ordering::SeqCst), 3);

        client.search_by_name("bread", 1, 10).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn surfaces_non_json_when_no_key_works() {
        let hits = Arc::new(AtomicUsize::new(0));
        let base = spawn_upstream(hits).await;
        let client = PublicFoodClient::new(&FoodApiConfig {
            base_url: base,
            endpoint: "/food".into(),
            key_encoded: None,
            key_decoded: Some("nope".into()),
        })
        .unwrap();

        let err = client.search_by_name("rice", 1, 10).await.unwrap_err();
        assert!(matches!(err, FoodError::NotJson(_)), "got {err:?}");
        assert_eq!(client.working_mode(), None);
    }
}
