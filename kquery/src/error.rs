use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Index {0} not exists")]
    IndexNotFound(String),

    #[error("At least one field must be selected")]
    EmptyFieldList,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Elasticsearch returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
