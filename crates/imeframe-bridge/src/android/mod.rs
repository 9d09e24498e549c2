// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android host via JNI.
//
// Requires the Android NDK and targets `aarch64-linux-android` or
// `armv7-linux-androideabi`. Each trait method reads the corresponding
// Android API through JNI calls into the ART runtime.
//
// ## Architecture notes
//
// Everything that can be answered synchronously (Build fields, Display sizes,
// the root view's visible display frame, InputMethodManager state) is read
// here on the calling thread, which must be the UI thread.
//
// `ViewTreeObserver.OnGlobalLayoutListener` is an interface that Rust cannot
// implement directly, so registration goes through the small Java proxy
// `io.imeframe.LayoutSignalProxy`. The proxy installs itself on the root view
// and forwards every `onGlobalLayout` to the native method exported at the
// bottom of this file, which runs the callback installed in `crate::signal`.

#![cfg(target_os = "android")]

use jni::JNIEnv;
use jni::objects::{JClass, JObject, JString, JValue};

use imeframe_core::error::{ImeframeError, Result};
use imeframe_core::types::{Rect, ScreenMetrics, Size};

use crate::traits::*;

// ---------------------------------------------------------------------------
// JNI bootstrap helpers
// ---------------------------------------------------------------------------

/// `android.R.id.content`.
const ANDROID_CONTENT_ID: i32 = 0x0102_0002;

/// `KeyEvent.KEYCODE_BACK`.
const KEYCODE_BACK: i32 = 4;

/// `InputMethodManager.HIDE_NOT_ALWAYS`.
const HIDE_NOT_ALWAYS: i32 = 2;

/// `InputMethodManager.SHOW_IMPLICIT`.
const SHOW_IMPLICIT: i32 = 1;

/// `Build.VERSION_CODES.JELLY_BEAN_MR1`, first level with `Display.getRealSize`.
const API_REAL_SIZE: i32 = 17;

/// Java proxy that owns the `OnGlobalLayoutListener`.
const LAYOUT_PROXY_CLASS: &str = "io/imeframe/LayoutSignalProxy";

/// Vendor dimension resource carrying the rounded-corner height.
const ROUNDED_CORNER_DIMEN: &str = "vivo_r_height";

/// Obtain a [`JNIEnv`] handle from the global Android context.
fn jni_env() -> Result<JNIEnv<'static>> {
    let ctx = ndk_context::android_context();
    // SAFETY: `ctx.vm()` returns the `JavaVM*` set by the NDK glue code.
    // The pointer is guaranteed valid for the lifetime of the process.
    let vm = unsafe { jni::JavaVM::from_raw(ctx.vm().cast()) }
        .map_err(|e| ImeframeError::Bridge(format!("failed to obtain JavaVM: {e}")))?;
    vm.attach_current_thread_permanently()
        .map_err(|e| ImeframeError::Bridge(format!("failed to attach JNI thread: {e}")))
}

/// Obtain the hosting `Activity` as a [`JObject`].
fn activity() -> Result<JObject<'static>> {
    let ctx = ndk_context::android_context();
    let ptr = ctx.context();
    if ptr.is_null() {
        return Err(ImeframeError::Bridge(
            "Android context is null — native activity not initialised".into(),
        ));
    }
    // SAFETY: the NDK guarantees this pointer is a valid global jobject for
    // the hosting Activity.
    Ok(unsafe { JObject::from_raw(ptr.cast()) })
}

/// Convenience: map any `jni::errors::Error` into `ImeframeError::Bridge`.
fn jni_err(context: &str, e: jni::errors::Error) -> ImeframeError {
    ImeframeError::Bridge(format!("{context}: {e}"))
}

fn static_string(env: &mut JNIEnv, class: &str, field: &str) -> Result<String> {
    let obj = env
        .get_static_field(class, field, "Ljava/lang/String;")
        .map_err(|e| jni_err(field, e))?
        .l()
        .map_err(|e| jni_err(field, e))?;
    if obj.is_null() {
        return Ok(String::new());
    }
    let value: String = env
        .get_string(&JString::from(obj))
        .map_err(|e| jni_err(field, e))?
        .into();
    Ok(value)
}

fn int_field(env: &mut JNIEnv, obj: &JObject, name: &str) -> Result<i32> {
    env.get_field(obj, name, "I")
        .map_err(|e| jni_err(name, e))?
        .i()
        .map_err(|e| jni_err(name, e))
}

fn sdk_int(env: &mut JNIEnv) -> Result<i32> {
    env.get_static_field("android/os/Build$VERSION", "SDK_INT", "I")
        .map_err(|e| jni_err("SDK_INT", e))?
        .i()
        .map_err(|e| jni_err("SDK_INT", e))
}

/// `activity.getWindow().getCurrentFocus()`, possibly null.
fn current_focus<'a>(env: &mut JNIEnv<'a>, activity: &JObject) -> Result<JObject<'a>> {
    let window = env
        .call_method(activity, "getWindow", "()Landroid/view/Window;", &[])
        .map_err(|e| jni_err("getWindow", e))?
        .l()
        .map_err(|e| jni_err("getWindow->l", e))?;
    env.call_method(&window, "getCurrentFocus", "()Landroid/view/View;", &[])
        .map_err(|e| jni_err("getCurrentFocus", e))?
        .l()
        .map_err(|e| jni_err("getCurrentFocus->l", e))
}

/// `activity.getWindowManager().getDefaultDisplay()`
fn default_display<'a>(env: &mut JNIEnv<'a>, activity: &JObject) -> Result<JObject<'a>> {
    let wm = env
        .call_method(activity, "getWindowManager", "()Landroid/view/WindowManager;", &[])
        .map_err(|e| jni_err("getWindowManager", e))?
        .l()
        .map_err(|e| jni_err("getWindowManager->l", e))?;
    env.call_method(&wm, "getDefaultDisplay", "()Landroid/view/Display;", &[])
        .map_err(|e| jni_err("getDefaultDisplay", e))?
        .l()
        .map_err(|e| jni_err("getDefaultDisplay->l", e))
}

/// Call `display.<method>(Point)` and read the point back.
fn display_size(env: &mut JNIEnv, method: &str) -> Result<Size> {
    let activity = activity()?;
    let display = default_display(env, &activity)?;
    let point = env
        .new_object("android/graphics/Point", "()V", &[])
        .map_err(|e| jni_err("new Point", e))?;
    env.call_method(
        &display,
        method,
        "(Landroid/graphics/Point;)V",
        &[JValue::Object(&point)],
    )
    .map_err(|e| jni_err(method, e))?;
    Ok(Size {
        width: int_field(env, &point, "x")?,
        height: int_field(env, &point, "y")?,
    })
}

/// `activity.findViewById(android.R.id.content)`
fn content_view<'a>(env: &mut JNIEnv<'a>, activity: &JObject) -> Result<JObject<'a>> {
    let view = env
        .call_method(
            activity,
            "findViewById",
            "(I)Landroid/view/View;",
            &[JValue::Int(ANDROID_CONTENT_ID)],
        )
        .map_err(|e| jni_err("findViewById(content)", e))?
        .l()
        .map_err(|e| jni_err("findViewById->l", e))?;
    if view.is_null() {
        return Err(ImeframeError::Bridge("content view not inflated yet".into()));
    }
    Ok(view)
}

fn resources<'a>(env: &mut JNIEnv<'a>, activity: &JObject) -> Result<JObject<'a>> {
    env.call_method(activity, "getResources", "()Landroid/content/res/Resources;", &[])
        .map_err(|e| jni_err("getResources", e))?
        .l()
        .map_err(|e| jni_err("getResources->l", e))
}

/// Resolve a dimension resource by name; `None` when the package lacks it.
fn dimen_px(
    env: &mut JNIEnv,
    resources: &JObject,
    name: &str,
    package: &str,
) -> Result<Option<i32>> {
    let j_name = env.new_string(name).map_err(|e| jni_err("new_string(name)", e))?;
    let j_type = env.new_string("dimen").map_err(|e| jni_err("new_string(dimen)", e))?;
    let j_pkg = env
        .new_string(package)
        .map_err(|e| jni_err("new_string(package)", e))?;
    let id = env
        .call_method(
            resources,
            "getIdentifier",
            "(Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;)I",
            &[
                JValue::Object(&j_name),
                JValue::Object(&j_type),
                JValue::Object(&j_pkg),
            ],
        )
        .map_err(|e| jni_err("getIdentifier", e))?
        .i()
        .map_err(|e| jni_err("getIdentifier->i", e))?;
    if id == 0 {
        return Ok(None);
    }
    let px = env
        .call_method(resources, "getDimensionPixelSize", "(I)I", &[JValue::Int(id)])
        .map_err(|e| jni_err("getDimensionPixelSize", e))?
        .i()
        .map_err(|e| jni_err("getDimensionPixelSize->i", e))?;
    Ok(Some(px))
}

fn input_method_manager<'a>(env: &mut JNIEnv<'a>, activity: &JObject) -> Result<JObject<'a>> {
    let service = env
        .new_string("input_method")
        .map_err(|e| jni_err("new_string(input_method)", e))?;
    env.call_method(
        activity,
        "getSystemService",
        "(Ljava/lang/String;)Ljava/lang/Object;",
        &[JValue::Object(&service)],
    )
    .map_err(|e| jni_err("getSystemService(input_method)", e))?
    .l()
    .map_err(|e| jni_err("getSystemService->l", e))
}

// ---------------------------------------------------------------------------
// Host struct
// ---------------------------------------------------------------------------

/// Android implementation of the host display.
///
/// Holds only the registration flag; all geometry lives on the Java side and
/// is read fresh on every call.
pub struct AndroidHost {
    registered: bool,
}

impl AndroidHost {
    /// Create a new Android host.
    ///
    /// This does **not** touch JNI — the first JNI call happens lazily when
    /// a trait method is invoked.
    pub fn new() -> Self {
        Self { registered: false }
    }
}

impl Default for AndroidHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostDisplay for AndroidHost {
    fn platform_name(&self) -> &str {
        "Android"
    }
}

// ---------------------------------------------------------------------------
// DeviceInfo — android.os.Build, Display, ViewConfiguration
// ---------------------------------------------------------------------------

impl DeviceInfo for AndroidHost {
    fn vendor(&self) -> Result<String> {
        let mut env = jni_env()?;
        static_string(&mut env, "android/os/Build", "BRAND")
    }

    fn model(&self) -> Result<String> {
        let mut env = jni_env()?;
        static_string(&mut env, "android/os/Build", "MODEL")
    }

    fn os_api_level(&self) -> Result<u32> {
        let mut env = jni_env()?;
        let level = sdk_int(&mut env)?;
        u32::try_from(level)
            .map_err(|_| ImeframeError::Bridge(format!("negative SDK_INT {level}")))
    }

    /// `Display.getRealSize`; falls back to `getSize` before API 17 where the
    /// real size cannot be queried.
    fn screen_real_size(&self) -> Result<Size> {
        let mut env = jni_env()?;
        if sdk_int(&mut env)? < API_REAL_SIZE {
            return display_size(&mut env, "getSize");
        }
        display_size(&mut env, "getRealSize")
    }

    fn screen_current_size(&self) -> Result<Size> {
        let mut env = jni_env()?;
        display_size(&mut env, "getSize")
    }

    fn has_permanent_menu_key(&self) -> Result<bool> {
        let mut env = jni_env()?;
        let activity = activity()?;
        let config = env
            .call_static_method(
                "android/view/ViewConfiguration",
                "get",
                "(Landroid/content/Context;)Landroid/view/ViewConfiguration;",
                &[JValue::Object(&activity)],
            )
            .map_err(|e| jni_err("ViewConfiguration.get", e))?
            .l()
            .map_err(|e| jni_err("ViewConfiguration.get->l", e))?;
        env.call_method(&config, "hasPermanentMenuKey", "()Z", &[])
            .map_err(|e| jni_err("hasPermanentMenuKey", e))?
            .z()
            .map_err(|e| jni_err("hasPermanentMenuKey->z", e))
    }

    fn has_hardware_back_key(&self) -> Result<bool> {
        let mut env = jni_env()?;
        env.call_static_method(
            "android/view/KeyCharacterMap",
            "deviceHasKey",
            "(I)Z",
            &[JValue::Int(KEYCODE_BACK)],
        )
        .map_err(|e| jni_err("KeyCharacterMap.deviceHasKey", e))?
        .z()
        .map_err(|e| jni_err("deviceHasKey->z", e))
    }

    /// Rounded-corner height from the application's vendor dimension, if the
    /// app ships one.
    fn rounded_corner_inset(&self) -> Result<Option<i32>> {
        let mut env = jni_env()?;
        let activity = activity()?;
        let res = resources(&mut env, &activity)?;
        let j_pkg = env
            .call_method(&activity, "getPackageName", "()Ljava/lang/String;", &[])
            .map_err(|e| jni_err("getPackageName", e))?
            .l()
            .map_err(|e| jni_err("getPackageName->l", e))?;
        let package: String = env
            .get_string(&JString::from(j_pkg))
            .map_err(|e| jni_err("get_string(packageName)", e))?
            .into();
        dimen_px(&mut env, &res, ROUNDED_CORNER_DIMEN, &package)
    }
}

// ---------------------------------------------------------------------------
// WindowGeometry — root view visible frame and DisplayMetrics
// ---------------------------------------------------------------------------

impl WindowGeometry for AndroidHost {
    fn visible_display_frame(&self) -> Result<Rect> {
        let mut env = jni_env()?;
        let activity = activity()?;
        let root = content_view(&mut env, &activity)?;
        let rect = env
            .new_object("android/graphics/Rect", "()V", &[])
            .map_err(|e| jni_err("new Rect", e))?;
        env.call_method(
            &root,
            "getWindowVisibleDisplayFrame",
            "(Landroid/graphics/Rect;)V",
            &[JValue::Object(&rect)],
        )
        .map_err(|e| jni_err("getWindowVisibleDisplayFrame", e))?;
        Ok(Rect {
            left: int_field(&mut env, &rect, "left")?,
            top: int_field(&mut env, &rect, "top")?,
            right: int_field(&mut env, &rect, "right")?,
            bottom: int_field(&mut env, &rect, "bottom")?,
        })
    }

    fn screen_metrics(&self) -> Result<ScreenMetrics> {
        let mut env = jni_env()?;
        let activity = activity()?;
        let res = resources(&mut env, &activity)?;
        let dm = env
            .call_method(&res, "getDisplayMetrics", "()Landroid/util/DisplayMetrics;", &[])
            .map_err(|e| jni_err("getDisplayMetrics", e))?
            .l()
            .map_err(|e| jni_err("getDisplayMetrics->l", e))?;
        let density = env
            .get_field(&dm, "density", "F")
            .map_err(|e| jni_err("density", e))?
            .f()
            .map_err(|e| jni_err("density->f", e))?;
        let status_bar_height = dimen_px(&mut env, &res, "status_bar_height", "android")?;
        let navigation_bar_height = dimen_px(&mut env, &res, "navigation_bar_height", "android")?;

        tracing::debug!(
            density,
            status_bar = ?status_bar_height,
            navigation_bar = ?navigation_bar_height,
            "Android: read display metrics"
        );

        Ok(ScreenMetrics {
            width_px: int_field(&mut env, &dm, "widthPixels")?,
            height_px: int_field(&mut env, &dm, "heightPixels")?,
            density,
            status_bar_height: status_bar_height.unwrap_or(0),
            navigation_bar_height: navigation_bar_height.unwrap_or(0),
        })
    }

    fn root_height(&self) -> Result<i32> {
        let mut env = jni_env()?;
        let activity = activity()?;
        let root = content_view(&mut env, &activity)?;
        env.call_method(&root, "getHeight", "()I", &[])
            .map_err(|e| jni_err("getHeight", e))?
            .i()
            .map_err(|e| jni_err("getHeight->i", e))
    }
}

// ---------------------------------------------------------------------------
// LayoutObserver — io.imeframe.LayoutSignalProxy
// ---------------------------------------------------------------------------

impl LayoutObserver for AndroidHost {
    fn register_layout_listener(&mut self) -> Result<()> {
        if self.registered {
            return Err(ImeframeError::AlreadyRegistered);
        }
        let mut env = jni_env()?;
        let activity = activity()?;
        let root = content_view(&mut env, &activity)?;
        env.call_static_method(
            LAYOUT_PROXY_CLASS,
            "attach",
            "(Landroid/view/View;)V",
            &[JValue::Object(&root)],
        )
        .map_err(|e| jni_err("LayoutSignalProxy.attach", e))?;
        self.registered = true;
        tracing::info!("Android: global layout listener registered");
        Ok(())
    }

    fn unregister_layout_listener(&mut self) -> Result<()> {
        if !self.registered {
            return Ok(());
        }
        let mut env = jni_env()?;
        let activity = activity()?;
        let root = content_view(&mut env, &activity)?;
        env.call_static_method(
            LAYOUT_PROXY_CLASS,
            "detach",
            "(Landroid/view/View;)V",
            &[JValue::Object(&root)],
        )
        .map_err(|e| jni_err("LayoutSignalProxy.detach", e))?;
        self.registered = false;
        tracing::info!("Android: global layout listener removed");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ImeControl — android.view.inputmethod.InputMethodManager
// ---------------------------------------------------------------------------

impl ImeControl for AndroidHost {
    /// Focus the current input view (or the content root) and request the
    /// soft input for it.
    fn show_keyboard(&self) -> Result<()> {
        let mut env = jni_env()?;
        let activity = activity()?;
        let mut view = current_focus(&mut env, &activity)?;
        if view.is_null() {
            view = content_view(&mut env, &activity)?;
        }
        env.call_method(&view, "requestFocus", "()Z", &[])
            .map_err(|e| jni_err("requestFocus", e))?;
        let imm = input_method_manager(&mut env, &activity)?;
        let shown = env
            .call_method(
                &imm,
                "showSoftInput",
                "(Landroid/view/View;I)Z",
                &[JValue::Object(&view), JValue::Int(SHOW_IMPLICIT)],
            )
            .map_err(|e| jni_err("showSoftInput", e))?
            .z()
            .map_err(|e| jni_err("showSoftInput->z", e))?;
        tracing::debug!(shown, "Android: soft input requested");
        Ok(())
    }

    /// Clear the focused view and hide the soft input from its window.
    fn hide_keyboard(&self) -> Result<()> {
        let mut env = jni_env()?;
        let activity = activity()?;
        let focus = current_focus(&mut env, &activity)?;
        if focus.is_null() {
            tracing::debug!("Android: no focused view, nothing to hide");
            return Ok(());
        }

        env.call_method(&focus, "clearFocus", "()V", &[])
            .map_err(|e| jni_err("clearFocus", e))?;
        let token = env
            .call_method(&focus, "getWindowToken", "()Landroid/os/IBinder;", &[])
            .map_err(|e| jni_err("getWindowToken", e))?
            .l()
            .map_err(|e| jni_err("getWindowToken->l", e))?;
        let imm = input_method_manager(&mut env, &activity)?;
        env.call_method(
            &imm,
            "hideSoftInputFromWindow",
            "(Landroid/os/IBinder;I)Z",
            &[JValue::Object(&token), JValue::Int(HIDE_NOT_ALWAYS)],
        )
        .map_err(|e| jni_err("hideSoftInputFromWindow", e))?;
        Ok(())
    }

    fn is_keyboard_active(&self) -> Result<bool> {
        let mut env = jni_env()?;
        let activity = activity()?;
        let imm = input_method_manager(&mut env, &activity)?;
        env.call_method(&imm, "isActive", "()Z", &[])
            .map_err(|e| jni_err("isActive", e))?
            .z()
            .map_err(|e| jni_err("isActive->z", e))
    }
}

// ---------------------------------------------------------------------------
// LayoutSignalProxy native callback
// ---------------------------------------------------------------------------

/// `io.imeframe.LayoutSignalProxy.nativeOnGlobalLayout()`, called on the UI
/// thread from `onGlobalLayout`.
#[unsafe(no_mangle)]
pub extern "system" fn Java_io_imeframe_LayoutSignalProxy_nativeOnGlobalLayout(
    _env: JNIEnv,
    _class: JClass,
) {
    if !crate::signal::dispatch_layout_signal() {
        tracing::debug!("Android: layout signal with no callback installed");
    }
}
