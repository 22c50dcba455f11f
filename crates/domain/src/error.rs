/// Shared error type used across all daypost crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    /// The corpus source exists but holds no text.
    #[error("empty corpus: {0}")]
    EmptyCorpus(String),

    /// The corpus source could not be read.
    #[error("reading corpus {path}: {message}")]
    Read { path: String, message: String },

    /// The messaging transport rejected or failed to deliver a message.
    #[error("send: {0}")]
    Send(String),

    /// A cursor store get or set failed.
    #[error("store: {0}")]
    Store(String),

    #[error("config: {0}")]
    Config(String),

    #[error("auth: {0}")]
    Auth(String),
}

pub type Result<T> = std::result::Result<T, Error>;
