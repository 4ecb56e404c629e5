use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::interface::{Record, RecordSet};

/// Turns a fetch target (a URL or a path) into records.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, target: &str) -> Result<RecordSet, FetchError>;
}

/// Parses a body shaped as a JSON array of objects.
pub fn parse_record_set(body: &str) -> Result<RecordSet, FetchError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        other => {
            return Err(FetchError::Shape(format!(
                "expected an array of objects, found {}",
                kind(&other)
            )))
        }
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            serde_json::Value::Object(object) => Ok(Record::from_object(object)),
            other => Err(FetchError::Shape(format!(
                "element {} is {}, not an object",
                index,
                kind(&other)
            ))),
        })
        .collect()
}

fn kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

pub struct HttpFetcher {
    client: Client,
    base: Option<Url>,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<HttpFetcher, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;
        let base = match &config.base_url {
            Some(base) => {
                Some(Url::parse(base).map_err(|_| FetchError::InvalidTarget(base.clone()))?)
            }
            None => None,
        };
        Ok(HttpFetcher { client, base })
    }

    /// Absolute URLs are used as-is; relative ones are joined onto the base URL.
    pub fn resolve(&self, target: &str) -> Result<Url, FetchError> {
        let invalid = || FetchError::InvalidTarget(target.to_owned());
        match Url::parse(target) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = self.base.as_ref().ok_or_else(invalid)?;
                base.join(target).map_err(|_| invalid())
            }
            Err(_) => Err(invalid()),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, target: &str) -> Result<RecordSet, FetchError> {
        let url = self.resolve(target)?;
        debug!(%url, "GET");
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.text().await?;
        parse_record_set(&body)
    }
}

pub struct FileFetcher;

#[async_trait]
impl Fetcher for FileFetcher {
    async fn fetch(&self, target: &str) -> Result<RecordSet, FetchError> {
        let path = match Url::parse(target) {
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map_err(|_| FetchError::InvalidTarget(target.to_owned()))?,
            _ => PathBuf::from(target),
        };
        debug!(path = %path.display(), "reading");
        let body = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| FetchError::Io { path, source })?;
        parse_record_set(&body)
    }
}

/// Sends web targets to [`HttpFetcher`] and everything else to [`FileFetcher`].
pub struct SourceFetcher {
    http: HttpFetcher,
    file: FileFetcher,
}

impl SourceFetcher {
    pub fn new(config: &FetchConfig) -> Result<SourceFetcher, FetchError> {
        Ok(SourceFetcher {
            http: HttpFetcher::new(config)?,
            file: FileFetcher,
        })
    }

    fn is_web(&self, target: &str) -> bool {
        match Url::parse(target) {
            Ok(url) => matches!(url.scheme(), "http" | "https"),
            Err(url::ParseError::RelativeUrlWithoutBase) => self.http.base.is_some(),
            Err(_) => false,
        }
    }
}

#[async_trait]
impl Fetcher for SourceFetcher {
    async fn fetch(&self, target: &str) -> Result<RecordSet, FetchError> {
        if self.is_web(target) {
            self.http.fetch(target).await
        } else {
            self.file.fetch(target).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::Value;

    const PRODUCTS: &str = r#"[{"name":"Pablo","qty":3},{"name":"Vanessa","qty":5}]"#;

    #[test]
    fn parses_array_of_objects() {
        let records = parse_record_set(PRODUCTS).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("name"), Some(&Value::from("Vanessa")));
        assert_eq!(records[0].keys().collect::<Vec<_>>(), ["name", "qty"]);
        assert!(parse_record_set("[]").unwrap().is_empty());
    }

    #[test]
    fn rejects_wrong_shapes() {
        assert!(matches!(parse_record_set("{\"a\":1}"), Err(FetchError::Shape(_))));
        assert!(matches!(parse_record_set("[{\"a\":1}, 2]"), Err(FetchError::Shape(msg)) if msg.contains("element 1")));
        assert!(matches!(parse_record_set("[{"), Err(FetchError::Parse(_))));
    }

    #[test]
    fn resolves_relative_targets_against_base() {
        let config = FetchConfig {
            base_url: Some("http://localhost:8080/app/".to_string()),
            ..FetchConfig::default()
        };
        let fetcher = HttpFetcher::new(&config).unwrap();
        assert_eq!(
            fetcher.resolve("/api/v1/products").unwrap().as_str(),
            "http://localhost:8080/api/v1/products"
        );
        assert_eq!(
            fetcher.resolve("https://example.com/x").unwrap().as_str(),
            "https://example.com/x"
        );

        let bare = HttpFetcher::new(&FetchConfig::default()).unwrap();
        assert!(matches!(bare.resolve("/api"), Err(FetchError::InvalidTarget(_))));
    }

    #[tokio::test]
    async fn http_fetch() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/products")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(PRODUCTS)
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();
        let records = fetcher
            .fetch(&format!("{}/api/v1/products", server.url()))
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn http_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body("No products found.")
            .create_async()
            .await;

        let config = FetchConfig {
            base_url: Some(server.url()),
            ..FetchConfig::default()
        };
        let fetcher = SourceFetcher::new(&config).unwrap();
        let err = fetcher.fetch("/missing").await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn refused_connection_is_a_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = FetchConfig {
            timeout_secs: 2,
            ..FetchConfig::default()
        };
        let fetcher = HttpFetcher::new(&config).unwrap();
        let err = fetcher
            .fetch(&format!("http://{}/api/v1/products", addr))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Network(_)), "{}", err);
    }

    #[tokio::test]
    async fn file_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.json");
        std::fs::write(&path, PRODUCTS).unwrap();

        let fetcher = SourceFetcher::new(&FetchConfig::default()).unwrap();
        let records = fetcher.fetch(path.to_str().unwrap()).await.unwrap();
        assert_eq!(records.len(), 2);

        let err = fetcher
            .fetch(dir.path().join("gone.json").to_str().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }));
    }
}
