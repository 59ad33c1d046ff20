// SPDX-License-Identifier: MIT
//
// Android text-input widget via JNI.
//
// Requires the Android NDK and targets `aarch64-linux-android` or
// `armv7-linux-androideabi`. Widget mutations go through JNI calls into the
// ART runtime; widget events come back through the exported native
// functions at the bottom of this file.
//
// ## Java glue contract
//
// The host app ships two small Java classes in the `dev.textentry`
// package:
//
// - `TextEntryView extends EditText`: overrides `onKeyPreIme` to call
//   `nativeOnKeyPreIme(keyCode)` and return its result, registers a
//   `TextWatcher` whose `onTextChanged` calls `nativeOnTextChanged(text)`,
//   and an `OnEditorActionListener` whose `onEditorAction` calls
//   `nativeOnEditorAction(actionId)` and returns its result.
// - `TextEntryPump`: holds a `Handler` on the main looper; `schedule()`
//   posts a runnable that calls `nativeDrain()`.
//
// One widget exists per process, so event delivery goes through a single
// process-wide handler slot rather than per-object routing.

#![cfg(target_os = "android")]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use jni::objects::{GlobalRef, JClass, JObject, JString, JValue};
use jni::sys::{jboolean, jint, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;

use textentry_core::error::{Result, TextEntryError};
use textentry_core::types::{ImeAction, Key};

use crate::traits::{TextWidget, UiDispatcher, UiTask, WidgetHandlers};

/// Fully qualified name of the Java view subclass.
const VIEW_CLASS: &str = "dev/textentry/TextEntryView";

/// Fully qualified name of the Java UI-thread pump.
const PUMP_CLASS: &str = "dev/textentry/TextEntryPump";

/// Width and height of the hidden view. Any value works; the view is fully
/// transparent and exists only to own input focus.
const VIEW_SIZE: i32 = 100;

/// InputMethodManager.SHOW_IMPLICIT
const SHOW_IMPLICIT: i32 = 1;

/// Handlers installed by the bridge, read by the exported native functions.
static WIDGET_HANDLERS: Mutex<Option<Arc<WidgetHandlers>>> = Mutex::new(None);

/// Tasks awaiting the UI thread, drained by `nativeDrain`.
static UI_TASKS: Mutex<VecDeque<UiTask>> = Mutex::new(VecDeque::new());

// ---------------------------------------------------------------------------
// JNI bootstrap helpers
// ---------------------------------------------------------------------------

/// Run `f` with a JNI environment attached to the current thread and the
/// hosting Activity.
///
/// The `JavaVM*` and Activity `jobject` come from
/// `ndk_context::android_context()`, set by the NDK glue at process start
/// and valid for the process lifetime.
fn with_env<T>(f: impl FnOnce(&mut JNIEnv<'_>, &JObject<'_>) -> Result<T>) -> Result<T> {
    let ctx = ndk_context::android_context();
    // SAFETY: `ctx.vm()` is the `JavaVM*` installed by the NDK glue code
    // and stays valid for the lifetime of the process.
    let vm = unsafe { jni::JavaVM::from_raw(ctx.vm().cast()) }
        .map_err(|e| TextEntryError::Bridge(format!("failed to obtain JavaVM: {e}")))?;
    let mut guard = vm
        .attach_current_thread()
        .map_err(|e| TextEntryError::Bridge(format!("failed to attach JNI thread: {e}")))?;

    let activity_ptr = ctx.context();
    if activity_ptr.is_null() {
        return Err(TextEntryError::Bridge(
            "Android context is null; native activity not initialised".into(),
        ));
    }
    // SAFETY: the NDK guarantees this pointer is a valid global jobject for
    // the hosting Activity.
    let activity = unsafe { JObject::from_raw(activity_ptr.cast()) };

    f(&mut guard, &activity)
}

/// Convenience: map any `jni::errors::Error` into `TextEntryError::Bridge`.
fn jni_err(context: &str, e: jni::errors::Error) -> TextEntryError {
    TextEntryError::Bridge(format!("{context}: {e}"))
}

/// Look up the `InputMethodManager` system service.
fn input_method_manager<'a>(
    env: &mut JNIEnv<'a>,
    activity: &JObject<'_>,
) -> Result<JObject<'a>> {
    let j_name: JString = env
        .new_string("input_method")
        .map_err(|e| jni_err("new_string(input_method)", e))?;

    let imm: JObject = env
        .call_method(
            activity,
            "getSystemService",
            "(Ljava/lang/String;)Ljava/lang/Object;",
            &[JValue::Object(&j_name)],
        )
        .map_err(|e| jni_err("getSystemService", e))?
        .l()
        .map_err(|e| jni_err("getSystemService->l", e))?;

    if imm.is_null() {
        return Err(TextEntryError::Bridge(
            "input method service unavailable".into(),
        ));
    }
    Ok(imm)
}

/// Current snapshot of the installed handler set.
fn installed_handlers() -> Option<Arc<WidgetHandlers>> {
    WIDGET_HANDLERS
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

// ---------------------------------------------------------------------------
// Widget handle
// ---------------------------------------------------------------------------

/// Handle to the hidden `TextEntryView`. Clones share one global reference.
#[derive(Clone)]
pub struct AndroidTextWidget {
    view: GlobalRef,
}

impl AndroidTextWidget {
    /// Create the hidden view once for the process lifetime.
    ///
    /// The view is sized but fully transparent; it is not part of the view
    /// hierarchy until [`TextWidget::attach`] runs.
    pub fn new() -> Result<Self> {
        with_env(|env, activity| {
            let view: JObject = env
                .new_object(
                    VIEW_CLASS,
                    "(Landroid/content/Context;)V",
                    &[JValue::Object(activity)],
                )
                .map_err(|e| jni_err("new TextEntryView", e))?;

            env.call_method(&view, "setWidth", "(I)V", &[JValue::Int(VIEW_SIZE)])
                .map_err(|e| jni_err("setWidth", e))?;
            env.call_method(&view, "setHeight", "(I)V", &[JValue::Int(VIEW_SIZE)])
                .map_err(|e| jni_err("setHeight", e))?;
            env.call_method(&view, "setAlpha", "(F)V", &[JValue::Float(0.0)])
                .map_err(|e| jni_err("setAlpha", e))?;

            let view = env
                .new_global_ref(&view)
                .map_err(|e| jni_err("new_global_ref(view)", e))?;

            tracing::info!("text entry view created");
            Ok(Self { view })
        })
    }
}

impl TextWidget for AndroidTextWidget {
    /// Add the view to the Activity's content hierarchy. Skips the call if
    /// the view already has a parent.
    fn attach(&self) -> Result<()> {
        with_env(|env, activity| {
            let parent: JObject = env
                .call_method(
                    self.view.as_obj(),
                    "getParent",
                    "()Landroid/view/ViewParent;",
                    &[],
                )
                .map_err(|e| jni_err("getParent", e))?
                .l()
                .map_err(|e| jni_err("getParent->l", e))?;

            if !parent.is_null() {
                return Ok(());
            }

            let params: JObject = env
                .new_object(
                    "android/view/ViewGroup$LayoutParams",
                    "(II)V",
                    &[JValue::Int(VIEW_SIZE), JValue::Int(VIEW_SIZE)],
                )
                .map_err(|e| jni_err("new LayoutParams", e))?;

            env.call_method(
                activity,
                "addContentView",
                "(Landroid/view/View;Landroid/view/ViewGroup$LayoutParams;)V",
                &[JValue::Object(self.view.as_obj()), JValue::Object(&params)],
            )
            .map_err(|e| jni_err("addContentView", e))?;

            tracing::debug!("text entry view attached");
            Ok(())
        })
    }

    fn detach_if_attached(&self) -> Result<bool> {
        with_env(|env, _| {
            let parent: JObject = env
                .call_method(
                    self.view.as_obj(),
                    "getParent",
                    "()Landroid/view/ViewParent;",
                    &[],
                )
                .map_err(|e| jni_err("getParent", e))?
                .l()
                .map_err(|e| jni_err("getParent->l", e))?;

            if parent.is_null() {
                return Ok(false);
            }

            env.call_method(
                &parent,
                "removeView",
                "(Landroid/view/View;)V",
                &[JValue::Object(self.view.as_obj())],
            )
            .map_err(|e| jni_err("removeView", e))?;

            tracing::debug!("text entry view detached");
            Ok(true)
        })
    }

    fn focus_caret_end(&self) -> Result<()> {
        with_env(|env, _| {
            env.call_method(self.view.as_obj(), "requestFocus", "()Z", &[])
                .map_err(|e| jni_err("requestFocus", e))?;

            let editable: JObject = env
                .call_method(
                    self.view.as_obj(),
                    "getText",
                    "()Landroid/text/Editable;",
                    &[],
                )
                .map_err(|e| jni_err("getText", e))?
                .l()
                .map_err(|e| jni_err("getText->l", e))?;

            let length: i32 = env
                .call_method(&editable, "length", "()I", &[])
                .map_err(|e| jni_err("Editable.length", e))?
                .i()
                .map_err(|e| jni_err("length->i", e))?;

            env.call_method(
                self.view.as_obj(),
                "setSelection",
                "(I)V",
                &[JValue::Int(length)],
            )
            .map_err(|e| jni_err("setSelection", e))?;

            Ok(())
        })
    }

    fn show_soft_keyboard(&self) -> Result<()> {
        with_env(|env, activity| {
            let imm = input_method_manager(env, activity)?;
            env.call_method(
                &imm,
                "showSoftInput",
                "(Landroid/view/View;I)Z",
                &[
                    JValue::Object(self.view.as_obj()),
                    JValue::Int(SHOW_IMPLICIT),
                ],
            )
            .map_err(|e| jni_err("showSoftInput", e))?;
            Ok(())
        })
    }

    fn toggle_soft_keyboard(&self) -> Result<()> {
        with_env(|env, activity| {
            let imm = input_method_manager(env, activity)?;
            env.call_method(
                &imm,
                "toggleSoftInput",
                "(II)V",
                &[JValue::Int(0), JValue::Int(0)],
            )
            .map_err(|e| jni_err("toggleSoftInput", e))?;
            Ok(())
        })
    }

    fn set_input_mask(&self, mask: i32) -> Result<()> {
        with_env(|env, _| {
            env.call_method(
                self.view.as_obj(),
                "setInputType",
                "(I)V",
                &[JValue::Int(mask)],
            )
            .map_err(|e| jni_err("setInputType", e))?;
            Ok(())
        })
    }

    fn set_text(&self, text: &str) -> Result<()> {
        with_env(|env, _| {
            let j_text: JString = env
                .new_string(text)
                .map_err(|e| jni_err("new_string(text)", e))?;
            env.call_method(
                self.view.as_obj(),
                "setText",
                "(Ljava/lang/CharSequence;)V",
                &[JValue::Object(&j_text)],
            )
            .map_err(|e| jni_err("setText", e))?;
            Ok(())
        })
    }

    fn register_handlers(&self, handlers: WidgetHandlers) {
        *WIDGET_HANDLERS
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(handlers));
    }
}

// ---------------------------------------------------------------------------
// UI-thread dispatch
// ---------------------------------------------------------------------------

/// Dispatcher backed by the Java-side `TextEntryPump`.
///
/// `post` enqueues the task and pokes the pump; the pump's main-looper
/// Handler then calls `nativeDrain` on the UI thread, which runs everything
/// queued so far in order.
#[derive(Clone)]
pub struct AndroidUiDispatcher {
    pump: GlobalRef,
}

impl AndroidUiDispatcher {
    /// Create the pump object bound to the hosting Activity.
    pub fn attach() -> Result<Self> {
        with_env(|env, activity| {
            let pump: JObject = env
                .new_object(
                    PUMP_CLASS,
                    "(Landroid/app/Activity;)V",
                    &[JValue::Object(activity)],
                )
                .map_err(|e| jni_err("new TextEntryPump", e))?;

            let pump = env
                .new_global_ref(&pump)
                .map_err(|e| jni_err("new_global_ref(pump)", e))?;

            tracing::info!("UI task pump created");
            Ok(Self { pump })
        })
    }
}

impl UiDispatcher for AndroidUiDispatcher {
    fn post(&self, task: UiTask) {
        UI_TASKS
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(task);

        let result = with_env(|env, _| {
            env.call_method(self.pump.as_obj(), "schedule", "()V", &[])
                .map_err(|e| jni_err("TextEntryPump.schedule", e))?;
            Ok(())
        });
        if let Err(e) = result {
            tracing::error!(error = %e, "failed to schedule UI task");
        }
    }
}

// ---------------------------------------------------------------------------
// Exported native functions (called from the Java glue)
// ---------------------------------------------------------------------------

/// `TextEntryView`'s text watcher forwards every buffer change here with
/// the full resulting string.
#[unsafe(no_mangle)]
pub extern "system" fn Java_dev_textentry_TextEntryView_nativeOnTextChanged<'local>(
    mut env: JNIEnv<'local>,
    _view: JObject<'local>,
    text: JString<'local>,
) {
    let Some(handlers) = installed_handlers() else {
        return;
    };
    match env.get_string(&text) {
        Ok(s) => {
            let text: String = s.into();
            (handlers.on_text_changed)(&text);
        }
        Err(e) => tracing::error!(error = %e, "failed to read changed text"),
    }
}

/// `TextEntryView.onKeyPreIme` forwards key codes here; a `true` return
/// tells the view to report the event handled.
#[unsafe(no_mangle)]
pub extern "system" fn Java_dev_textentry_TextEntryView_nativeOnKeyPreIme<'local>(
    _env: JNIEnv<'local>,
    _view: JObject<'local>,
    key_code: jint,
) -> jboolean {
    let Some(handlers) = installed_handlers() else {
        return JNI_FALSE;
    };
    match Key::from_raw(key_code) {
        Some(key) if (handlers.on_key)(key) => JNI_TRUE,
        _ => JNI_FALSE,
    }
}

/// `TextEntryView`'s editor action listener forwards action ids here; a
/// `true` return consumes the action.
#[unsafe(no_mangle)]
pub extern "system" fn Java_dev_textentry_TextEntryView_nativeOnEditorAction<'local>(
    _env: JNIEnv<'local>,
    _view: JObject<'local>,
    action_id: jint,
) -> jboolean {
    let Some(handlers) = installed_handlers() else {
        return JNI_FALSE;
    };
    match ImeAction::from_raw(action_id) {
        Some(action) if (handlers.on_editor_action)(action) => JNI_TRUE,
        _ => JNI_FALSE,
    }
}

/// Called by `TextEntryPump` on the UI thread; runs every queued task in
/// FIFO order.
#[unsafe(no_mangle)]
pub extern "system" fn Java_dev_textentry_TextEntryPump_nativeDrain<'local>(
    _env: JNIEnv<'local>,
    _class: JClass<'local>,
) {
    loop {
        let task = UI_TASKS
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match task {
            Some(task) => task(),
            None => break,
        }
    }
}
