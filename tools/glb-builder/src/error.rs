//! Container assembly errors

/// Errors from serializing a glTF document or assembling its container
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("Failed to serialize glTF JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Container would be {0} bytes, over the 32-bit GLB length limit")]
    TooLarge(u64),
}
