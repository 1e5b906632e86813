use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouteVizError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("connectivity error: {0}")]
    Connectivity(String),
    #[error("request error: {0}")]
    Request(String),
    #[error("runtime error: {0}")]
    Runtime(String),
}

pub type Result<T> = std::result::Result<T, RouteVizError>;
