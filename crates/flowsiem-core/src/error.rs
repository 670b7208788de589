//! Error types for flowsiem

/// Result type alias using flowsiem's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for flowsiem operations
///
/// Every variant except the delivery report path is fatal to a run: the
/// controller propagates it and stops. A non-2xx answer from the event
/// ingestion endpoint is not an error at all, see `DeliveryReport`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad credentials or a malformed authentication response
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The text-generation backend could not produce a response
    #[error("inference error: {0}")]
    Inference(String),

    /// Persisted event file is not a well-formed list of serialized events
    #[error("corrupt event store: {0}")]
    CorruptStore(String),

    /// The ingestion endpoint could not be reached at all
    #[error("delivery error: {0}")]
    Delivery(String),

    /// An input line could not be decoded as a flow record
    #[error("invalid flow record on line {line}: {source}")]
    InvalidRecord {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new authentication error
    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a new inference error
    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    /// Create a new corrupt store error
    pub fn corrupt_store(msg: impl Into<String>) -> Self {
        Self::CorruptStore(msg.into())
    }

    /// Create a new delivery error
    pub fn delivery(msg: impl Into<String>) -> Self {
        Self::Delivery(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
