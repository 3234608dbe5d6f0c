use airhub_core::EncodeError;
use airhub_net::SessionError;

/// Client-layer errors. Command methods fail only if the frame cannot be
/// encoded or the session task is gone; a live session accepts everything.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("command encoding failed: {0}")]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Session(#[from] SessionError),
}
