use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
#[error("cannot append <{child}> inside <{parent}>")]
pub struct HierarchyError {
    pub parent: String,
    pub child: String,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no records to render: the header row is derived from the first record")]
    EmptyInput,
    #[error("record {index} has fields {found:?}, expected {expected:?}")]
    SchemaMismatch {
        index: usize,
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("render target is a <{0}> element, not a <table>")]
    InvalidTarget(String),
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("cannot resolve fetch target {0:?}")]
    InvalidTarget(String),
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("body is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unexpected body shape: {0}")]
    Shape(String),
}

#[derive(Debug, Error)]
pub enum PageError {
    #[error("no control with id {0:?}")]
    UnknownControl(String),
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("empty query")]
    EmptyQuery,
    #[error(transparent)]
    Database(#[from] duckdb::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}
