// SPDX-License-Identifier: MIT
//
// Text entry bridge between a native text-input widget and a game engine
// core.
//
// The engine drives the bridge with five commands (activate, deactivate,
// keyboard type, capitalisation, text buffer) and receives two
// notifications (text changed, keyboard dismissed). The widget, the
// UI-thread dispatcher, and the notifier are trait seams; `TextEntryBridge`
// itself is platform-independent.

pub mod entry;
pub mod traits;

#[cfg(target_os = "android")]
pub mod android;

#[cfg(not(target_os = "android"))]
pub mod stub;

use std::sync::Arc;

use textentry_core::config::TextEntryConfig;
use textentry_core::error::Result;

use entry::TextEntryBridge;
use traits::EngineNotifier;

/// Widget type for the build target.
#[cfg(target_os = "android")]
pub type PlatformWidget = android::AndroidTextWidget;

/// Widget type for the build target.
#[cfg(not(target_os = "android"))]
pub type PlatformWidget = stub::StubWidget;

/// Build a text entry bridge for the target operating system.
///
/// On Android this creates the hidden JNI-backed view and the UI-thread
/// pump; elsewhere it wires up the in-memory stub so hosting code and tests
/// run unchanged.
pub fn platform_text_entry(
    notifier: Arc<dyn EngineNotifier>,
    config: TextEntryConfig,
) -> Result<TextEntryBridge<PlatformWidget>> {
    #[cfg(target_os = "android")]
    {
        let widget = android::AndroidTextWidget::new()?;
        let dispatcher = Arc::new(android::AndroidUiDispatcher::attach()?);
        Ok(TextEntryBridge::new(widget, dispatcher, notifier, config))
    }
    #[cfg(not(target_os = "android"))]
    {
        let widget = stub::StubWidget::new();
        let dispatcher = Arc::new(stub::InlineDispatcher);
        Ok(TextEntryBridge::new(widget, dispatcher, notifier, config))
    }
}
