//! Error types
//!
//! Asset/startup failures end a session in `GameStatus::Failed`; they never
//! reach the tick. API failures belong to the embedding page.

/// A session could not start
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssetError {
    /// The environment cannot run the game (no window, no 2D context, ...)
    #[error("platform capability missing: {0}")]
    CapabilityMissing(String),

    /// The pet image failed to load
    #[error("failed to load image '{url}': {reason}")]
    ImageLoad { url: String, reason: String },

    /// Drawing surface could not be created
    #[error("drawing surface unavailable: {0}")]
    Surface(String),
}

/// Host lifecycle and binding errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// The game-over handler reported a failure
    #[error("game over handler failed: {0}")]
    Callback(String),

    /// Operation requires a mounted session
    #[error("no session is mounted")]
    NotMounted,

    /// DOM / JS binding failure
    #[error("binding error: {0}")]
    Binding(String),
}

/// Score and ranking API failures
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("server returned HTTP {status}")]
    Status { status: u16 },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Network access is only wired up in the browser build
    #[error("HTTP transport is not available on this platform")]
    Unsupported,
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for HostError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        HostError::Binding(js_error_string(&value))
    }
}

/// Best-effort string form of a thrown JS value
#[cfg(target_arch = "wasm32")]
pub(crate) fn js_error_string(value: &wasm_bindgen::JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(value, &wasm_bindgen::JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}
