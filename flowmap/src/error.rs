pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A flow endpoint or selected location that is not in the graph.
    #[error("unknown location id: {id}")]
    UnknownLocation { id: String },

    #[error("invalid direction: {got} (expected inbound, outbound or both)")]
    InvalidDirection { got: String },

    #[error("invalid display: {got} (expected all or top10)")]
    InvalidDisplay { got: String },

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("invalid path data at byte {offset}: {message}")]
    PathParse { offset: usize, message: String },

    #[error("viewport width must be positive and finite, got {width}")]
    InvalidViewport { width: f64 },
}

impl Error {
    /// Stable machine-readable code for bindings.
    pub fn code(&self) -> &'static str {
        match self {
            Error::UnknownLocation { .. } => "unknown_location",
            Error::InvalidDirection { .. } => "invalid_direction",
            Error::InvalidDisplay { .. } => "invalid_display",
            Error::Config(_) => "invalid_config",
            Error::PathParse { .. } => "invalid_path",
            Error::InvalidViewport { .. } => "invalid_viewport",
        }
    }

    pub(crate) fn unknown_location(id: impl Into<String>) -> Self {
        Error::UnknownLocation { id: id.into() }
    }
}
