use thiserror::Error;

/// Errors that can occur while configuring segmentation or fallback extraction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SegmentError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
