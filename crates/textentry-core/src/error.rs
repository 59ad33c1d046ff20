// SPDX-License-Identifier: MIT
//
// Unified error types for the text entry bridge.

use thiserror::Error;

/// Top-level error type for all bridge operations.
#[derive(Debug, Error)]
pub enum TextEntryError {
    /// A platform call (JNI, view hierarchy, input-method service) failed.
    #[error("platform bridge error: {0}")]
    Bridge(String),

    /// Text entry is not available on this platform.
    #[error("text entry not available on this platform")]
    PlatformUnavailable,
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TextEntryError>;
