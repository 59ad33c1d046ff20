// SPDX-License-Identifier: MIT
//
// The text entry bridge.
//
// Owns one hidden text-input widget for its whole lifetime and translates
// between engine commands (activate, deactivate, set buffer, configure
// keyboard) and widget events (text changed, dismissal gestures). Engine
// commands may arrive on any thread; every widget mutation is marshalled
// onto the UI thread through the injected dispatcher. Widget events arrive
// on the UI thread and are forwarded to the engine notifier synchronously
// inside the callback.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, error};

use textentry_core::config::TextEntryConfig;
use textentry_core::error::Result;
use textentry_core::types::{Capitalisation, ImeAction, Key, KeyboardType};

use crate::traits::{EngineNotifier, TextWidget, UiDispatcher, WidgetHandlers};

/// The two independently settable halves of the widget's input-type mask.
struct InputFlags {
    keyboard_type: KeyboardType,
    capitalisation: Capitalisation,
}

impl InputFlags {
    fn mask(&self) -> i32 {
        self.keyboard_type.mask() | self.capitalisation.mask()
    }
}

/// Bridge between the engine core and the platform text-input widget.
///
/// The bridge is reusable for the process lifetime: it starts inactive,
/// becomes active via [`activate`](Self::activate), and returns to inactive
/// via [`deactivate`](Self::deactivate) or a user dismissal gesture.
pub struct TextEntryBridge<W: TextWidget> {
    widget: W,
    dispatcher: Arc<dyn UiDispatcher>,
    flags: Arc<Mutex<InputFlags>>,
}

impl<W: TextWidget> TextEntryBridge<W> {
    /// Build a bridge around `widget`, wire its events to `notifier`, and
    /// apply `config` on the UI thread.
    pub fn new(
        widget: W,
        dispatcher: Arc<dyn UiDispatcher>,
        notifier: Arc<dyn EngineNotifier>,
        config: TextEntryConfig,
    ) -> Self {
        widget.register_handlers(make_handlers(widget.clone(), notifier));

        let flags = Arc::new(Mutex::new(InputFlags {
            keyboard_type: config.keyboard_type,
            capitalisation: config.capitalisation,
        }));

        let bridge = Self {
            widget,
            dispatcher,
            flags,
        };
        bridge.apply_initial_config(config.initial_buffer);
        bridge
    }

    /// Activate text entry: attach the widget, focus it with the caret at
    /// end-of-text, and show the soft keyboard. Idempotent when already
    /// active.
    pub fn activate(&self) {
        debug!("text entry activation requested");
        let widget = self.widget.clone();
        self.dispatcher.post(Box::new(move || {
            if let Err(e) = show_entry(&widget) {
                error!(error = %e, "failed to activate text entry");
            }
        }));
    }

    /// Deactivate text entry, detaching the widget and closing the soft
    /// keyboard. Does not fire the dismissed notification; that is reserved
    /// for user gestures.
    pub fn deactivate(&self) {
        debug!("text entry deactivation requested");
        let widget = self.widget.clone();
        self.dispatcher.post(Box::new(move || {
            if let Err(e) = dismiss(&widget) {
                error!(error = %e, "failed to deactivate text entry");
            }
        }));
    }

    /// Set the keyboard layout from its engine integer form and re-apply
    /// the combined input-type mask.
    ///
    /// Unrecognised values log an error and behave as plain text.
    pub fn set_keyboard_type(&self, raw: i32) {
        let keyboard_type = KeyboardType::from_raw(raw).unwrap_or_else(|| {
            error!(raw, "unrecognised keyboard type value, using plain text");
            KeyboardType::default()
        });
        let flags = Arc::clone(&self.flags);
        let widget = self.widget.clone();
        self.dispatcher.post(Box::new(move || {
            let mask = {
                let mut flags = flags.lock().unwrap_or_else(PoisonError::into_inner);
                flags.keyboard_type = keyboard_type;
                flags.mask()
            };
            if let Err(e) = widget.set_input_mask(mask) {
                error!(error = %e, mask, "failed to apply input mask");
            }
        }));
    }

    /// Set the capitalisation method from its engine integer form and
    /// re-apply the combined input-type mask.
    ///
    /// Unrecognised values log an error and behave as no capitalisation.
    pub fn set_capitalisation(&self, raw: i32) {
        let capitalisation = Capitalisation::from_raw(raw).unwrap_or_else(|| {
            error!(raw, "unrecognised capitalisation value, using none");
            Capitalisation::default()
        });
        let flags = Arc::clone(&self.flags);
        let widget = self.widget.clone();
        self.dispatcher.post(Box::new(move || {
            let mask = {
                let mut flags = flags.lock().unwrap_or_else(PoisonError::into_inner);
                flags.capitalisation = capitalisation;
                flags.mask()
            };
            if let Err(e) = widget.set_input_mask(mask) {
                error!(error = %e, mask, "failed to apply input mask");
            }
        }));
    }

    /// Overwrite the widget's text buffer wholesale.
    ///
    /// The change notification fires once the widget applies the new text,
    /// exactly as for user edits.
    pub fn set_text_buffer(&self, text: &str) {
        let widget = self.widget.clone();
        let text = text.to_owned();
        self.dispatcher.post(Box::new(move || {
            if let Err(e) = widget.set_text(&text) {
                error!(error = %e, "failed to set text buffer");
            }
        }));
    }

    /// Push the configured mask and initial buffer to the widget.
    fn apply_initial_config(&self, initial_buffer: String) {
        let widget = self.widget.clone();
        let mask = self
            .flags
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .mask();
        self.dispatcher.post(Box::new(move || {
            if let Err(e) = widget.set_input_mask(mask) {
                error!(error = %e, mask, "failed to apply initial input mask");
            }
            if !initial_buffer.is_empty() {
                if let Err(e) = widget.set_text(&initial_buffer) {
                    error!(error = %e, "failed to apply initial text buffer");
                }
            }
        }));
    }
}

/// Attach, focus, and show the keyboard. Runs on the UI thread.
fn show_entry<W: TextWidget>(widget: &W) -> Result<()> {
    widget.attach()?;
    widget.focus_caret_end()?;
    widget.show_soft_keyboard()
}

/// Detach the widget and close the soft keyboard if it is attached.
///
/// Returns whether a dismissal actually happened. Runs on the UI thread.
fn dismiss<W: TextWidget>(widget: &W) -> Result<bool> {
    if widget.detach_if_attached()? {
        widget.toggle_soft_keyboard()?;
        debug!("text entry dismissed");
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Build the handler set installed on the widget.
///
/// The dismissal handlers run the dismissal before notifying the engine and
/// consume the triggering event so the platform's default handling is
/// suppressed.
fn make_handlers<W: TextWidget>(widget: W, notifier: Arc<dyn EngineNotifier>) -> WidgetHandlers {
    let on_text_changed = {
        let notifier = Arc::clone(&notifier);
        Box::new(move |text: &str| notifier.on_text_changed(text))
    };

    let on_key = {
        let widget = widget.clone();
        let notifier = Arc::clone(&notifier);
        Box::new(move |key: Key| -> bool {
            match key {
                Key::Back | Key::Enter | Key::Action => {
                    dismiss_and_notify(&widget, &notifier);
                    true
                }
            }
        })
    };

    let on_editor_action = Box::new(move |action: ImeAction| -> bool {
        match action {
            ImeAction::Done | ImeAction::Go | ImeAction::Next => {
                dismiss_and_notify(&widget, &notifier);
                true
            }
        }
    });

    WidgetHandlers {
        on_text_changed,
        on_key,
        on_editor_action,
    }
}

fn dismiss_and_notify<W: TextWidget>(widget: &W, notifier: &Arc<dyn EngineNotifier>) {
    if let Err(e) = dismiss(widget) {
        error!(error = %e, "dismissal failed on keyboard gesture");
    }
    notifier.on_keyboard_dismissed();
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::stub::{InlineDispatcher, StubWidget};

    /// Records every outbound notification.
    #[derive(Default)]
    struct RecordingNotifier {
        texts: Mutex<Vec<String>>,
        dismissals: AtomicUsize,
    }

    impl RecordingNotifier {
        fn texts(&self) -> Vec<String> {
            self.texts.lock().expect("texts lock").clone()
        }

        fn dismissals(&self) -> usize {
            self.dismissals.load(Ordering::SeqCst)
        }
    }

    impl EngineNotifier for RecordingNotifier {
        fn on_text_changed(&self, text: &str) {
            self.texts.lock().expect("texts lock").push(text.to_owned());
        }

        fn on_keyboard_dismissed(&self) {
            self.dismissals.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn bridge_with_config(
        config: TextEntryConfig,
    ) -> (TextEntryBridge<StubWidget>, StubWidget, Arc<RecordingNotifier>) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("textentry_bridge=trace")
            .with_test_writer()
            .try_init();
        let widget = StubWidget::new();
        let notifier = Arc::new(RecordingNotifier::default());
        let bridge = TextEntryBridge::new(
            widget.clone(),
            Arc::new(InlineDispatcher),
            Arc::clone(&notifier) as Arc<dyn EngineNotifier>,
            config,
        );
        (bridge, widget, notifier)
    }

    fn bridge() -> (TextEntryBridge<StubWidget>, StubWidget, Arc<RecordingNotifier>) {
        bridge_with_config(TextEntryConfig::default())
    }

    #[test]
    fn activate_attaches_focuses_and_shows_keyboard() {
        let (bridge, widget, _) = bridge();
        bridge.activate();
        assert!(widget.is_attached());
        assert!(widget.is_focused());
        assert!(widget.keyboard_visible());
    }

    #[test]
    fn activate_twice_is_idempotent() {
        let (bridge, widget, _) = bridge();
        bridge.activate();
        bridge.activate();
        assert!(widget.is_attached());
        assert_eq!(widget.attach_count(), 1);
    }

    #[test]
    fn deactivate_detaches_without_notifying() {
        let (bridge, widget, notifier) = bridge();
        bridge.activate();
        bridge.deactivate();
        assert!(!widget.is_attached());
        assert!(!widget.keyboard_visible());
        assert_eq!(notifier.dismissals(), 0);
    }

    #[test]
    fn dismissal_while_inactive_is_a_noop() {
        let (bridge, widget, _) = bridge();
        bridge.deactivate();
        assert_eq!(widget.detach_count(), 0);
        assert_eq!(widget.keyboard_toggle_count(), 0);
    }

    #[test]
    fn back_key_dismisses_exactly_once() {
        let (bridge, widget, notifier) = bridge();
        bridge.activate();
        let handled = widget.press_key(Key::Back);
        assert!(handled);
        assert!(!widget.is_attached());
        assert_eq!(notifier.dismissals(), 1);
        assert_eq!(widget.detach_count(), 1);
        assert_eq!(widget.keyboard_toggle_count(), 1);
    }

    #[test]
    fn enter_key_dismisses() {
        let (bridge, widget, notifier) = bridge();
        bridge.activate();
        assert!(widget.press_key(Key::Enter));
        assert_eq!(notifier.dismissals(), 1);
    }

    #[test]
    fn done_action_dismisses_exactly_once() {
        let (bridge, widget, notifier) = bridge();
        bridge.activate();
        let handled = widget.editor_action(ImeAction::Done);
        assert!(handled);
        assert!(!widget.is_attached());
        assert_eq!(notifier.dismissals(), 1);
        assert_eq!(widget.detach_count(), 1);
        assert_eq!(widget.keyboard_toggle_count(), 1);
    }

    #[test]
    fn text_changes_carry_the_full_buffer() {
        let (bridge, widget, notifier) = bridge();
        bridge.activate();
        bridge.set_text_buffer("hello");
        widget.type_str("!");
        let texts = notifier.texts();
        assert_eq!(texts.last().map(String::as_str), Some("hello!"));
        // The programmatic overwrite notifies too, just like a user edit.
        assert_eq!(texts, vec!["hello".to_owned(), "hello!".to_owned()]);
    }

    #[test]
    fn unrecognised_keyboard_type_falls_back_to_text() {
        let (bridge, widget, _) = bridge();
        bridge.set_keyboard_type(42);
        assert_eq!(
            widget.input_mask(),
            KeyboardType::Text.mask() | Capitalisation::None.mask()
        );
    }

    #[test]
    fn unrecognised_capitalisation_falls_back_to_none() {
        let (bridge, widget, _) = bridge();
        bridge.set_keyboard_type(1);
        bridge.set_capitalisation(99);
        assert_eq!(
            widget.input_mask(),
            KeyboardType::Numeric.mask() | Capitalisation::None.mask()
        );
    }

    #[test]
    fn type_and_capitalisation_flags_persist_independently() {
        let (bridge, widget, _) = bridge();
        bridge.set_keyboard_type(0);
        bridge.set_capitalisation(2);
        bridge.set_keyboard_type(1);
        assert_eq!(
            widget.input_mask(),
            KeyboardType::Numeric.mask() | Capitalisation::Words.mask()
        );
    }

    #[test]
    fn config_is_applied_at_construction() {
        let (_, widget, notifier) = bridge_with_config(TextEntryConfig {
            keyboard_type: KeyboardType::Numeric,
            capitalisation: Capitalisation::Words,
            initial_buffer: "seed".into(),
        });
        assert_eq!(
            widget.input_mask(),
            KeyboardType::Numeric.mask() | Capitalisation::Words.mask()
        );
        assert_eq!(widget.text(), "seed");
        assert_eq!(notifier.texts(), vec!["seed".to_owned()]);
    }

    #[test]
    fn caret_lands_at_end_of_text_on_activation() {
        let (bridge, widget, _) = bridge_with_config(TextEntryConfig {
            initial_buffer: "resume".into(),
            ..TextEntryConfig::default()
        });
        bridge.activate();
        assert_eq!(widget.caret(), "resume".chars().count());
    }

    #[test]
    fn bridge_is_reusable_after_dismissal() {
        let (bridge, widget, notifier) = bridge();
        bridge.activate();
        widget.press_key(Key::Back);
        assert!(!widget.is_attached());

        bridge.activate();
        assert!(widget.is_attached());
        widget.editor_action(ImeAction::Go);
        assert!(!widget.is_attached());
        assert_eq!(notifier.dismissals(), 2);
    }
}
