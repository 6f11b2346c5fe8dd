use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ThermologError {
    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("all text backends failed: {0}")]
    ExtractionChainFailed(String),

    #[error("failed to load parser config from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("invalid parser config: {0}")]
    ConfigInvalid(String),

    #[error("report layout does not match profile '{0}'")]
    LayoutMismatch(String),

    #[error("failed to load location registry from {path}: {reason}")]
    RegistryLoad { path: PathBuf, reason: String },

    #[error("failed to save location registry to {path}: {reason}")]
    RegistrySave { path: PathBuf, reason: String },

    #[error("unknown location '{0}'")]
    UnknownLocation(String),

    #[error("cannot merge location '{0}' into itself")]
    SelfMerge(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
