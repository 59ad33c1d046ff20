// SPDX-License-Identifier: MIT
//
// In-memory widget and dispatcher for desktop/CI builds where no native
// widget toolkit is available.
//
// Unlike a bare no-op stub, the widget keeps real attach/detach/text state
// and fires its registered handlers, so the bridge can be exercised end to
// end off-device. Soft-keyboard visibility is tracked as a flag; there is
// nothing to show on a desktop host.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use textentry_core::error::Result;
use textentry_core::types::{ImeAction, Key};

use crate::traits::{TextWidget, UiDispatcher, UiTask, WidgetHandlers};

/// Runs posted tasks immediately on the calling thread.
///
/// Desktop hosts have no dedicated UI thread, so the calling thread is the
/// owner thread by definition.
pub struct InlineDispatcher;

impl UiDispatcher for InlineDispatcher {
    fn post(&self, task: UiTask) {
        task();
    }
}

#[derive(Default)]
struct WidgetState {
    attached: bool,
    focused: bool,
    caret: usize,
    keyboard_visible: bool,
    input_mask: i32,
    text: String,
    attach_count: usize,
    detach_count: usize,
    keyboard_toggle_count: usize,
    handlers: Option<Arc<WidgetHandlers>>,
}

/// In-memory text widget. Clones share one underlying state.
#[derive(Clone, Default)]
pub struct StubWidget {
    state: Arc<Mutex<WidgetState>>,
}

impl StubWidget {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, WidgetState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn handlers(&self) -> Option<Arc<WidgetHandlers>> {
        self.state().handlers.clone()
    }

    // -- Event simulation ---------------------------------------------------

    /// Append `input` to the buffer as if the user typed it, firing the
    /// text-changed handler with the full resulting string.
    pub fn type_str(&self, input: &str) {
        let full = {
            let mut state = self.state();
            state.text.push_str(input);
            state.caret = state.text.chars().count();
            state.text.clone()
        };
        if let Some(handlers) = self.handlers() {
            (handlers.on_text_changed)(&full);
        }
    }

    /// Deliver a pre-IME key press. Returns whether it was consumed.
    pub fn press_key(&self, key: Key) -> bool {
        match self.handlers() {
            Some(handlers) => (handlers.on_key)(key),
            None => false,
        }
    }

    /// Deliver a soft-keyboard editor action. Returns whether it was
    /// consumed.
    pub fn editor_action(&self, action: ImeAction) -> bool {
        match self.handlers() {
            Some(handlers) => (handlers.on_editor_action)(action),
            None => false,
        }
    }

    // -- Inspection ---------------------------------------------------------

    pub fn is_attached(&self) -> bool {
        self.state().attached
    }

    pub fn is_focused(&self) -> bool {
        self.state().focused
    }

    pub fn keyboard_visible(&self) -> bool {
        self.state().keyboard_visible
    }

    pub fn input_mask(&self) -> i32 {
        self.state().input_mask
    }

    pub fn text(&self) -> String {
        self.state().text.clone()
    }

    pub fn caret(&self) -> usize {
        self.state().caret
    }

    /// Times the widget actually joined the view hierarchy.
    pub fn attach_count(&self) -> usize {
        self.state().attach_count
    }

    /// Times the widget was actually removed from the view hierarchy.
    pub fn detach_count(&self) -> usize {
        self.state().detach_count
    }

    /// Times the soft keyboard was toggled closed.
    pub fn keyboard_toggle_count(&self) -> usize {
        self.state().keyboard_toggle_count
    }
}

impl TextWidget for StubWidget {
    fn attach(&self) -> Result<()> {
        let mut state = self.state();
        if !state.attached {
            state.attached = true;
            state.attach_count += 1;
            debug!("stub widget attached");
        }
        Ok(())
    }

    fn detach_if_attached(&self) -> Result<bool> {
        let mut state = self.state();
        if state.attached {
            state.attached = false;
            state.focused = false;
            state.detach_count += 1;
            debug!("stub widget detached");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn focus_caret_end(&self) -> Result<()> {
        let mut state = self.state();
        state.focused = true;
        state.caret = state.text.chars().count();
        Ok(())
    }

    fn show_soft_keyboard(&self) -> Result<()> {
        warn!("soft keyboard requested on stub widget; tracking visibility only");
        self.state().keyboard_visible = true;
        Ok(())
    }

    fn toggle_soft_keyboard(&self) -> Result<()> {
        let mut state = self.state();
        state.keyboard_visible = !state.keyboard_visible;
        state.keyboard_toggle_count += 1;
        Ok(())
    }

    fn set_input_mask(&self, mask: i32) -> Result<()> {
        self.state().input_mask = mask;
        Ok(())
    }

    fn set_text(&self, text: &str) -> Result<()> {
        let changed = {
            let mut state = self.state();
            let changed = state.text != text;
            if changed {
                state.text = text.to_owned();
                state.caret = state.text.chars().count();
            }
            changed
        };
        // The platform widget's text watcher fires for programmatic writes
        // as well as user edits.
        if changed {
            if let Some(handlers) = self.handlers() {
                (handlers.on_text_changed)(text);
            }
        }
        Ok(())
    }

    fn register_handlers(&self, handlers: WidgetHandlers) {
        self.state().handlers = Some(Arc::new(handlers));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_without_handlers_are_not_consumed() {
        let widget = StubWidget::new();
        assert!(!widget.press_key(Key::Back));
        assert!(!widget.editor_action(ImeAction::Done));
    }

    #[test]
    fn setting_identical_text_does_not_refire() {
        let widget = StubWidget::new();
        let fired = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&fired);
        widget.register_handlers(WidgetHandlers {
            on_text_changed: Box::new(move |_| {
                *counter.lock().expect("counter lock") += 1;
            }),
            on_key: Box::new(|_| false),
            on_editor_action: Box::new(|_| false),
        });

        widget.set_text("same").expect("set_text");
        widget.set_text("same").expect("set_text");
        assert_eq!(*fired.lock().expect("counter lock"), 1);
    }

    #[test]
    fn repeated_detach_counts_once() {
        let widget = StubWidget::new();
        widget.attach().expect("attach");
        assert!(widget.detach_if_attached().expect("detach"));
        assert!(!widget.detach_if_attached().expect("detach"));
        assert_eq!(widget.detach_count(), 1);
    }
}
