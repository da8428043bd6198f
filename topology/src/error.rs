use crate::config::ConfigError;

/// Failures surfaced by the editor facade.
///
/// Model integrity faults (unknown ids, dangling links) are not errors; they
/// are logged and the offending entity is skipped.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("inbound message could not be decoded: {0}")]
    Codec(#[from] frames::CodecError),
    #[error("event could not be decoded: {0}")]
    Event(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
