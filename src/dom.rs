//! `wasm-bindgen` surface for the host page.
//!
//! [`AnnotatorHandle::mount`] binds an [`Engine`] to a canvas laid over a
//! video and wires the DOM listeners:
//!
//! - canvas `pointerdown` / `pointermove` / `pointerleave`;
//! - document `pointerup`, so a drag released outside the canvas still ends;
//! - window `resize` and video `loadedmetadata`, which resize the surface.
//!
//! Listeners live as long as the handle and are removed when it is dropped.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::{JsCast, closure::Closure};
use web_sys::{Event, EventTarget, HtmlCanvasElement, HtmlVideoElement, PointerEvent};

use crate::config::EngineConfig;
use crate::doc::ToolKind;
use crate::engine::{Engine, EngineCore};
use crate::geom::Point;
use crate::input::Button;
use crate::logging;

/// `HTMLMediaElement.HAVE_METADATA`.
const HAVE_METADATA: u16 = 1;

type SharedEngine = Rc<RefCell<Engine>>;

struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Drop for Listener {
    fn drop(&mut self) {
        if let Err(err) =
            self.target.remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref())
        {
            log::warn!("failed to remove {} listener: {err:?}", self.event);
        }
    }
}

fn js_error(err: &JsValue) -> JsError {
    JsError::new(&format!("{err:?}"))
}

fn listen(
    target: &EventTarget,
    event: &'static str,
    engine: &SharedEngine,
    mut handler: impl FnMut(&mut Engine, &Event) + 'static,
) -> Result<Listener, JsError> {
    let engine = Rc::clone(engine);
    let callback = Closure::wrap(Box::new(move |ev: Event| {
        let Ok(mut engine) = engine.try_borrow_mut() else {
            log::warn!("{event} dropped: engine busy");
            return;
        };
        handler(&mut *engine, &ev);
    }) as Box<dyn FnMut(Event)>);
    target
        .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
        .map_err(|err| js_error(&err))?;
    Ok(Listener { target: target.clone(), event, callback })
}

fn client_point(ev: &PointerEvent) -> Point {
    Point::new(f64::from(ev.client_x()), f64::from(ev.client_y()))
}

/// Annotation engine mounted on one canvas and video.
#[wasm_bindgen]
pub struct AnnotatorHandle {
    engine: SharedEngine,
    _listeners: Vec<Listener>,
}

#[wasm_bindgen]
impl AnnotatorHandle {
    /// Install console logging at `level` (default `info`).
    #[wasm_bindgen(js_name = initLogging)]
    pub fn init_logging(level: Option<String>) {
        let level = level.as_deref().and_then(logging::parse_level).unwrap_or(log::Level::Info);
        logging::init(level);
    }

    /// Bind an engine to `canvas` over `video`.
    ///
    /// # Errors
    ///
    /// Fails if `config_json` is invalid or a listener cannot be attached.
    pub fn mount(
        canvas: HtmlCanvasElement,
        video: HtmlVideoElement,
        video_id: String,
        config_json: Option<String>,
    ) -> Result<AnnotatorHandle, JsError> {
        let config = match config_json {
            Some(json) => EngineConfig::from_json(&json)?,
            None => EngineConfig::default(),
        };
        let window = web_sys::window().ok_or_else(|| JsError::new("no window"))?;
        let document = window.document().ok_or_else(|| JsError::new("no document"))?;

        let canvas_target: EventTarget = canvas.clone().into();
        let video_target: EventTarget = video.clone().into();
        let ready = video.ready_state() >= HAVE_METADATA;
        let engine = Rc::new(RefCell::new(Engine::new(canvas, video, EngineCore::new(config, video_id))));

        let listeners = vec![
            listen(&canvas_target, "pointerdown", &engine, |engine, ev| {
                if let Some(ev) = ev.dyn_ref::<PointerEvent>() {
                    ev.prevent_default();
                    engine.on_pointer_down(client_point(ev), Button::from_dom(ev.button()));
                }
            })?,
            listen(&canvas_target, "pointermove", &engine, |engine, ev| {
                if let Some(ev) = ev.dyn_ref::<PointerEvent>() {
                    engine.on_pointer_move(client_point(ev));
                }
            })?,
            listen(&canvas_target, "pointerleave", &engine, |engine, _| engine.on_pointer_leave())?,
            // Canvas releases bubble here too.
            listen(&document.into(), "pointerup", &engine, |engine, _| engine.on_pointer_up())?,
            listen(&window.into(), "resize", &engine, |engine, _| engine.sync_surface())?,
            listen(&video_target, "loadedmetadata", &engine, |engine, _| engine.sync_surface())?,
        ];

        if ready {
            engine.borrow_mut().sync_surface();
        }
        log::info!("annotator mounted");
        Ok(Self { engine, _listeners: listeners })
    }

    /// Switch tool by name (`"pen"`, `"right-angle"`, ...).
    ///
    /// # Errors
    ///
    /// Fails for an unknown tool name.
    #[wasm_bindgen(js_name = setTool)]
    pub fn set_tool(&self, name: &str) -> Result<(), JsError> {
        let tool: ToolKind = name.parse()?;
        self.with_engine(|engine| engine.set_tool(tool));
        Ok(())
    }

    #[wasm_bindgen(js_name = setColor)]
    pub fn set_color(&self, color: &str) {
        self.with_engine(|engine| engine.set_color(color));
    }

    #[wasm_bindgen(js_name = setWidth)]
    pub fn set_width(&self, width: f64) {
        self.with_engine(|engine| engine.set_width(width));
    }

    pub fn undo(&self) {
        self.with_engine(Engine::undo);
    }

    pub fn redo(&self) {
        self.with_engine(Engine::redo);
    }

    pub fn clear(&self) {
        self.with_engine(Engine::clear);
    }

    /// Resize the surface to the video now.
    #[wasm_bindgen(js_name = syncSurface)]
    pub fn sync_surface(&self) {
        self.with_engine(Engine::sync_surface);
    }

    /// The annotation set as JSON, for saving.
    ///
    /// # Errors
    ///
    /// Fails if the engine is busy or encoding fails.
    #[wasm_bindgen(js_name = strokesJson)]
    pub fn strokes_json(&self) -> Result<String, JsError> {
        let engine = self.engine.try_borrow().map_err(|_| JsError::new("engine busy"))?;
        Ok(engine.core.strokes_json()?)
    }

    /// Replace the annotation set with saved JSON. History starts over.
    ///
    /// # Errors
    ///
    /// Fails if the engine is busy or the JSON is rejected.
    #[wasm_bindgen(js_name = loadJson)]
    pub fn load_json(&self, json: &str) -> Result<(), JsError> {
        let mut engine = self.engine.try_borrow_mut().map_err(|_| JsError::new("engine busy"))?;
        Ok(engine.load_json(json)?)
    }

    /// Current playback position of the video, in seconds.
    #[wasm_bindgen(js_name = playbackTime)]
    #[must_use]
    pub fn playback_time(&self) -> f64 {
        match self.engine.try_borrow() {
            Ok(engine) => engine.playback_time(),
            Err(_) => 0.0,
        }
    }

    /// Number of committed strokes.
    #[wasm_bindgen(js_name = strokeCount)]
    #[must_use]
    pub fn stroke_count(&self) -> usize {
        match self.engine.try_borrow() {
            Ok(engine) => engine.core.doc.len(),
            Err(_) => 0,
        }
    }
}

impl AnnotatorHandle {
    fn with_engine(&self, f: impl FnOnce(&mut Engine)) {
        match self.engine.try_borrow_mut() {
            Ok(mut engine) => f(&mut *engine),
            Err(_) => log::warn!("engine busy; call dropped"),
        }
    }
}
