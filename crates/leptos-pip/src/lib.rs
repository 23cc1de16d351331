//! Leptos Picture-in-Picture Utilities
//!
//! Opens Document Picture-in-Picture windows, copies the host page's
//! stylesheets into them and mounts a Leptos view inside.
//! `MirrorSlot` keeps at most one surface open per page.

use std::any::Any;

use leptos::prelude::*;
use serde::Serialize;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

/// Name of the browser entry point for detached document windows
const PIP_ENTRY: &str = "documentPictureInPicture";

#[derive(Debug, thiserror::Error)]
pub enum PipError {
    #[error("picture-in-picture windows are not supported by this browser")]
    Unsupported,
    #[error("picture-in-picture request failed: {0}")]
    Request(String),
}

fn js_error(value: JsValue) -> PipError {
    PipError::Request(format!("{:?}", value))
}

/// Requested size of a detached window (serialized as the `requestWindow` options object)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl WindowSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Whether the current browser exposes `window.documentPictureInPicture`
pub fn pip_supported() -> bool {
    web_sys::window()
        .map(|win| js_sys::Reflect::has(&win, &JsValue::from_str(PIP_ENTRY)).unwrap_or(false))
        .unwrap_or(false)
}

/// Ask the browser for a new detached window
pub async fn request_window(size: WindowSize) -> Result<web_sys::Window, PipError> {
    let win = web_sys::window().ok_or(PipError::Unsupported)?;
    let entry = js_sys::Reflect::get(&win, &JsValue::from_str(PIP_ENTRY)).map_err(js_error)?;
    if entry.is_undefined() || entry.is_null() {
        return Err(PipError::Unsupported);
    }

    let request = js_sys::Reflect::get(&entry, &JsValue::from_str("requestWindow"))
        .map_err(js_error)?
        .dyn_into::<js_sys::Function>()
        .map_err(|_| PipError::Unsupported)?;
    let options = serde_wasm_bindgen::to_value(&size).map_err(|e| PipError::Request(e.to_string()))?;

    let promise = request
        .call1(&entry, &options)
        .map_err(js_error)?
        .dyn_into::<js_sys::Promise>()
        .map_err(js_error)?;
    let opened = JsFuture::from(promise).await.map_err(js_error)?;
    opened.dyn_into::<web_sys::Window>().map_err(js_error)
}

/// Clone every stylesheet owner node of `from` into the head of `to`.
///
/// One-time copy: later changes to the host page are not propagated.
/// Returns the number of sheets copied.
pub fn copy_stylesheets(from: &web_sys::Document, to: &web_sys::Document) -> u32 {
    let Some(head) = to.head() else {
        return 0;
    };
    let sheets = from.style_sheets();
    let mut copied = 0;
    for index in 0..sheets.length() {
        let Some(owner) = sheets.item(index).and_then(|sheet| sheet.owner_node()) else {
            continue;
        };
        match owner.clone_node_with_deep(true) {
            Ok(clone) => {
                if head.append_child(&clone).is_ok() {
                    copied += 1;
                }
            }
            Err(err) => log::debug!("[PIP] skipping stylesheet {}: {:?}", index, err),
        }
    }
    copied
}

/// A secondary display surface that can be closed from the primary page
pub trait MirrorSurface {
    fn close(&self);
}

/// An open picture-in-picture window with a mounted Leptos view
pub struct PipWindow {
    window: web_sys::Window,
    // Kept alive for as long as the window is tracked
    on_pagehide: Closure<dyn FnMut(web_sys::Event)>,
    _mounted: Box<dyn Any>,
}

impl MirrorSurface for PipWindow {
    fn close(&self) {
        // Closed from this side: the handle is dropped before pagehide fires
        let _ = self
            .window
            .remove_event_listener_with_callback("pagehide", self.on_pagehide.as_ref().unchecked_ref());
        if let Err(err) = self.window.close() {
            log::warn!("[PIP] close failed: {:?}", err);
        }
    }
}

/// Open a detached window, copy styles into it and mount `view` in its body.
///
/// `on_closed` runs when the window fires `pagehide`, whichever side closed it.
pub async fn open_surface<F, N>(
    size: WindowSize,
    view: F,
    mut on_closed: impl FnMut() + 'static,
) -> Result<PipWindow, PipError>
where
    F: FnOnce() -> N + 'static,
    N: IntoView,
    N::State: 'static,
{
    if !pip_supported() {
        return Err(PipError::Unsupported);
    }
    let window = request_window(size).await?;
    let document = window
        .document()
        .ok_or_else(|| PipError::Request("window has no document".to_string()))?;

    if let Some(host) = web_sys::window().and_then(|w| w.document()) {
        let copied = copy_stylesheets(&host, &document);
        log::debug!("[PIP] copied {} stylesheets", copied);
    }

    let body = document
        .body()
        .ok_or_else(|| PipError::Request("document has no body".to_string()))?;
    let mounted = leptos::mount::mount_to(body, view);

    let on_pagehide = Closure::<dyn FnMut(web_sys::Event)>::new(move |_ev: web_sys::Event| {
        on_closed();
    });
    window
        .add_event_listener_with_callback("pagehide", on_pagehide.as_ref().unchecked_ref())
        .map_err(js_error)?;

    Ok(PipWindow {
        window,
        on_pagehide,
        _mounted: Box::new(mounted),
    })
}

/// Tracks the single mirror surface of a page.
///
/// Every open attempt gets a new generation; close notifications carrying an
/// older generation are ignored so they can never clear a newer surface.
pub struct MirrorSlot<S> {
    current: Option<(u64, S)>,
    latest: u64,
}

impl<S> Default for MirrorSlot<S> {
    fn default() -> Self {
        Self {
            current: None,
            latest: 0,
        }
    }
}

impl<S: MirrorSurface> MirrorSlot<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an open attempt: closes any open surface and reserves a generation
    pub fn begin(&mut self) -> u64 {
        self.close();
        self.latest += 1;
        self.latest
    }

    /// Install the surface produced by the attempt `generation`.
    ///
    /// A surface from a superseded attempt is closed immediately.
    pub fn install(&mut self, generation: u64, surface: S) -> bool {
        if generation != self.latest {
            surface.close();
            return false;
        }
        self.close();
        self.current = Some((generation, surface));
        true
    }

    /// Open `surface` as a new generation, closing the previous one
    pub fn open(&mut self, surface: S) -> u64 {
        let generation = self.begin();
        self.install(generation, surface);
        generation
    }

    /// The surface of `generation` reported itself closed
    pub fn surface_closed(&mut self, generation: u64) -> bool {
        match &self.current {
            Some((current, _)) if *current == generation => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    /// Close the open surface from the primary side
    pub fn close(&mut self) -> bool {
        match self.current.take() {
            Some((_, surface)) => {
                surface.close();
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn generation(&self) -> Option<u64> {
        self.current.as_ref().map(|(generation, _)| *generation)
    }
}
