// SPDX-License-Identifier: MIT
//
// Seams between the bridge and its collaborators.
//
// The bridge never talks to a widget toolkit, a thread dispatcher, or the
// engine core directly. Each of those is injected behind one of the traits
// below, so the same bridge logic runs against the JNI-backed widget on
// device and against the in-memory stub on desktop and in CI.

use textentry_core::error::Result;
use textentry_core::types::{ImeAction, Key};

/// A unit of work scheduled onto the UI thread.
pub type UiTask = Box<dyn FnOnce() + Send>;

/// Fire-and-forget dispatch onto the platform UI thread.
///
/// `post` must not block, and callers receive no completion signal. The
/// dispatcher is the only path by which the bridge touches widget state, so
/// the widget's single-owner-thread rule holds as long as the platform
/// integration runs posted tasks on the UI thread.
pub trait UiDispatcher: Send + Sync {
    /// Queue a task for execution on the UI thread.
    fn post(&self, task: UiTask);
}

/// Outbound notifications into the engine core.
///
/// Both calls fire synchronously on the UI thread inside widget event
/// callbacks; crossing back to an engine thread is the implementor's
/// responsibility.
pub trait EngineNotifier: Send + Sync {
    /// The widget's text buffer changed; `text` is the full resulting
    /// string, not a diff.
    fn on_text_changed(&self, text: &str);

    /// The user dismissed the keyboard with a key press or editor action.
    fn on_keyboard_dismissed(&self);
}

/// Event handlers the bridge installs on its widget.
///
/// The boolean-returning handlers report whether the event was consumed;
/// consumed events must be marked handled on the platform side so default
/// behaviour is suppressed.
pub struct WidgetHandlers {
    /// Invoked after every change to the widget's text buffer, including
    /// programmatic overwrites, with the full resulting string.
    pub on_text_changed: Box<dyn Fn(&str) + Send + Sync>,
    /// Invoked for pre-IME key presses while the widget has focus.
    pub on_key: Box<dyn Fn(Key) -> bool + Send + Sync>,
    /// Invoked for soft-keyboard editor actions.
    pub on_editor_action: Box<dyn Fn(ImeAction) -> bool + Send + Sync>,
}

/// A handle to the single hidden text-input widget.
///
/// Implementations are cheap clones over shared platform state (a JNI global
/// reference on Android). All mutating methods must only be called on the UI
/// thread; the bridge guarantees this by routing every call through the
/// [`UiDispatcher`].
pub trait TextWidget: Clone + Send + Sync + 'static {
    /// Add the widget to the view hierarchy. No-op if already attached.
    fn attach(&self) -> Result<()>;

    /// Remove the widget from its parent if it has one.
    ///
    /// Returns whether the widget was attached. Detached widgets are left
    /// untouched so repeated dismissal has no side effects.
    fn detach_if_attached(&self) -> Result<bool>;

    /// Give the widget input focus and place the caret at end-of-text.
    fn focus_caret_end(&self) -> Result<()>;

    /// Ask the input-method service to show the soft keyboard.
    fn show_soft_keyboard(&self) -> Result<()>;

    /// Toggle the soft keyboard closed after the widget is detached.
    fn toggle_soft_keyboard(&self) -> Result<()>;

    /// Apply the combined input-type mask.
    fn set_input_mask(&self, mask: i32) -> Result<()>;

    /// Overwrite the full text buffer.
    fn set_text(&self, text: &str) -> Result<()>;

    /// Install the bridge's event handlers, replacing any previous set.
    fn register_handlers(&self, handlers: WidgetHandlers);
}
