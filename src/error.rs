use thiserror::Error;

/// Error types for the localems library.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// An antenna pattern axis has too few samples to interpolate.
    #[error("antenna pattern error: {0}")]
    PatternData(String),

    /// Degenerate link geometry, e.g. zero distance between antennas.
    #[error("geometry error: {0}")]
    Geometry(String),

    /// A required parameter is missing and no documented default applies.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A site or antenna file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A site or antenna file could not be parsed.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}
