//! Browser bindings
//!
//! LocalStorage, the 2D canvas, `requestAnimationFrame`, and DOM events for
//! the embedding page.

use std::cell::RefCell;
use std::collections::HashMap;
use std::f64::consts::TAU;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{CanvasRenderingContext2d, CustomEvent, CustomEventInit, HtmlCanvasElement, ImageData};

use super::{FrameSlot, OrientationInfo, is_mobile_user_agent};
use crate::game::{FrameHandle, FrameScheduler, HostEvents};
use crate::persistence::{KeyValueStore, StorageError};
use crate::renderer::{Bitmap, Canvas, Rgba, SpriteKey, TextAlign, TextStyle};

pub const GAME_START_EVENT: &str = "motorcyclegamestart";
pub const GAME_OVER_EVENT: &str = "motorcyclegameover";

fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

fn js_error(e: JsValue) -> StorageError {
    StorageError::Unavailable(format!("{:?}", e))
}

/// `window.localStorage`
pub struct LocalStorageStore {
    storage: Option<web_sys::Storage>,
}

impl LocalStorageStore {
    /// Private browsing can deny storage; the store then reads empty and
    /// every write fails
    pub fn new() -> Self {
        let storage = window()
            .and_then(|w| w.local_storage())
            .ok()
            .flatten();
        if storage.is_none() {
            log::warn!("LocalStorage unavailable, high scores will not persist");
        }
        Self { storage }
    }
}

impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = self
            .storage
            .as_ref()
            .ok_or_else(|| StorageError::Unavailable("no localStorage".into()))?;
        storage.set_item(key, value).map_err(js_error)
    }
}

/// `Canvas` over a `CanvasRenderingContext2d`
///
/// Each sprite bitmap is uploaded once into its own offscreen canvas and
/// drawn with `drawImage` afterwards.
pub struct WebCanvas {
    element: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    uploads: HashMap<SpriteKey, HtmlCanvasElement>,
}

impl WebCanvas {
    pub fn new(element: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = context_2d(&element)?;
        ctx.set_image_smoothing_enabled(false);
        Ok(Self {
            element,
            ctx,
            uploads: HashMap::new(),
        })
    }

    pub fn element(&self) -> &HtmlCanvasElement {
        &self.element
    }

    fn upload(&self, bitmap: &Bitmap) -> Result<HtmlCanvasElement, JsValue> {
        let document = window()?
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let offscreen: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        offscreen.set_width(bitmap.width);
        offscreen.set_height(bitmap.height);
        let image = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(bitmap.as_bytes()),
            bitmap.width,
            bitmap.height,
        )?;
        context_2d(&offscreen)?.put_image_data(&image, 0.0, 0.0)?;
        Ok(offscreen)
    }
}

fn context_2d(element: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    element
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()
        .map_err(JsValue::from)
}

impl Canvas for WebCanvas {
    fn size(&self) -> (u32, u32) {
        (self.element.width(), self.element.height())
    }

    fn clear(&mut self) {
        let (w, h) = self.size();
        self.ctx.clear_rect(0.0, 0.0, w as f64, h as f64);
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.ctx.set_global_alpha(alpha.clamp(0.0, 1.0) as f64);
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba) {
        self.ctx.set_fill_style_str(&color.css());
        self.ctx
            .fill_rect(x as f64, y as f64, width as f64, height as f64);
    }

    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32, line: f32, color: Rgba) {
        self.ctx.set_stroke_style_str(&color.css());
        self.ctx.set_line_width(line as f64);
        self.ctx
            .stroke_rect(x as f64, y as f64, width as f64, height as f64);
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba) {
        self.ctx.set_fill_style_str(&color.css());
        self.ctx.begin_path();
        if self
            .ctx
            .arc(cx as f64, cy as f64, radius.max(0.0) as f64, 0.0, TAU)
            .is_ok()
        {
            self.ctx.fill();
        }
    }

    fn draw_bitmap(&mut self, key: &SpriteKey, bitmap: &Bitmap, x: i32, y: i32) {
        if !self.uploads.contains_key(key) {
            match self.upload(bitmap) {
                Ok(offscreen) => {
                    self.uploads.insert(*key, offscreen);
                }
                Err(e) => {
                    log::warn!("Sprite upload failed for {:?}: {:?}", key, e);
                    return;
                }
            }
        }
        if let Some(offscreen) = self.uploads.get(key) {
            let _ = self
                .ctx
                .draw_image_with_html_canvas_element(offscreen, x as f64, y as f64);
        }
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, style: TextStyle) {
        self.ctx.set_font(&style.css_font());
        self.ctx.set_fill_style_str(&style.color.css());
        self.ctx.set_text_align(match style.align {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        });
        self.ctx
            .set_text_baseline(if style.middle { "middle" } else { "alphabetic" });
        let _ = self.ctx.fill_text(text, x as f64, y as f64);
    }
}

type FrameCallback = Rc<dyn Fn(FrameHandle)>;

/// Slot the frame callback is bound into once the game exists
pub type FrameTarget = Rc<RefCell<Option<FrameCallback>>>;

/// `requestAnimationFrame` scheduler
pub struct RafScheduler {
    target: FrameTarget,
    next_handle: FrameHandle,
    slot: Rc<RefCell<FrameSlot>>,
}

impl RafScheduler {
    pub fn new() -> Self {
        Self {
            target: Rc::new(RefCell::new(None)),
            next_handle: 0,
            slot: Rc::new(RefCell::new(FrameSlot::new())),
        }
    }

    /// Shared slot; bind it to `GameLoop::on_frame` after construction
    pub fn target(&self) -> FrameTarget {
        self.target.clone()
    }
}

impl Default for RafScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_handle += 1;
        let handle = self.next_handle;
        let target = self.target.clone();
        let slot = self.slot.clone();
        let callback = Closure::once_into_js(move |_time: f64| {
            // Cleared before running so the frame can request its successor
            slot.borrow_mut().fired(handle);
            let callback = target.borrow().clone();
            if let Some(callback) = callback {
                callback(handle);
            }
        });
        match window().and_then(|w| w.request_animation_frame(callback.unchecked_ref())) {
            Ok(raf_id) => {
                if let Some(displaced) = self.slot.borrow_mut().arm(handle, raf_id) {
                    cancel_raf(displaced);
                }
            }
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Some(raf_id) = self.slot.borrow_mut().take(handle) {
            cancel_raf(raf_id);
        }
    }
}

fn cancel_raf(raf_id: i32) {
    if let Ok(w) = window() {
        let _ = w.cancel_animation_frame(raf_id);
    }
}

/// Dispatches the lifecycle as DOM events on `window`
#[derive(Debug, Clone, Copy, Default)]
pub struct DomHost;

impl DomHost {
    fn dispatch(name: &str, detail: Option<JsValue>) {
        let init = CustomEventInit::new();
        if let Some(detail) = detail {
            init.set_detail(&detail);
        }
        let result = CustomEvent::new_with_event_init_dict(name, &init)
            .and_then(|event| window()?.dispatch_event(&event));
        if let Err(e) = result {
            log::warn!("Could not dispatch {}: {:?}", name, e);
        }
    }
}

impl HostEvents for DomHost {
    fn game_started(&mut self) {
        Self::dispatch(GAME_START_EVENT, None);
    }

    fn game_ended(&mut self, final_score: u64) {
        Self::dispatch(GAME_OVER_EVENT, Some(JsValue::from_f64(final_score as f64)));
    }
}

/// Read screen orientation from whichever API the browser offers
pub fn orientation_info() -> OrientationInfo {
    let Ok(window) = window() else {
        return OrientationInfo::default();
    };
    let user_agent = window.navigator().user_agent().unwrap_or_default();

    let orientation_type = window
        .screen()
        .ok()
        .and_then(|screen| js_sys::Reflect::get(&screen, &"orientation".into()).ok())
        .filter(|o| o.is_object())
        .and_then(|o| js_sys::Reflect::get(&o, &"type".into()).ok())
        .and_then(|t| t.as_string());
    let legacy_angle = js_sys::Reflect::get(&window, &"orientation".into())
        .ok()
        .and_then(|a| a.as_f64())
        .map(|a| a as i32);

    let dimension = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32;
    OrientationInfo {
        is_mobile: is_mobile_user_agent(&user_agent),
        orientation_type,
        legacy_angle,
        width: dimension(window.inner_width()),
        height: dimension(window.inner_height()),
    }
}
