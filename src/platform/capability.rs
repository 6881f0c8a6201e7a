//! One-time check that the environment can run a session

use crate::error::AssetError;

/// What the current environment can do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCapability {
    /// Browser with a document to mount into
    Browser,
    /// No display; the simulation runs against an in-memory surface
    Headless,
    /// The game cannot run here
    Unavailable(String),
}

impl PlatformCapability {
    /// Probe the environment
    #[cfg(target_arch = "wasm32")]
    pub fn detect() -> Self {
        let Some(window) = web_sys::window() else {
            return Self::Unavailable("no window".into());
        };
        if window.document().is_none() {
            return Self::Unavailable("no document".into());
        }
        if window.performance().is_none() {
            return Self::Unavailable("no performance clock".into());
        }
        Self::Browser
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn detect() -> Self {
        Self::Headless
    }

    /// Error out unless a session can start
    pub fn ensure(&self) -> Result<(), AssetError> {
        match self {
            Self::Browser | Self::Headless => Ok(()),
            Self::Unavailable(reason) => Err(AssetError::CapabilityMissing(reason.clone())),
        }
    }
}
