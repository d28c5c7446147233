use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlVideoElement};

use crate::config::EngineConfig;
use crate::doc::{AnnotationSet, DocError, Stroke, ToolKind};
use crate::geom::Point;
use crate::hit;
use crate::history::History;
use crate::input::{Button, InputState, UiState};
use crate::render::{self, Preview, Surface, SurfaceError};
use crate::store::{AnnotationId, AnnotationStore, StoreError};
use crate::viewport::{Rect, Viewport};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A stroke was appended to the annotation set.
    StrokeCommitted(Stroke),
    /// A free-draw gesture ended with too few points to keep.
    StrokeDiscarded,
    /// The erase gesture removed these strokes.
    StrokesErased(Vec<Stroke>),
    /// The host video should seek to this playback position, in seconds.
    SeekTo(f64),
    RenderNeeded,
}

/// Core engine state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    pub doc: AnnotationSet,
    pub history: History,
    pub viewport: Viewport,
    pub ui: UiState,
    pub input: InputState,
    pub config: EngineConfig,
    /// Video the annotation set belongs to; passed through to the store.
    pub video_id: String,
    /// Last known playback position in seconds. Stamped on commit.
    pub playback_time: f64,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(EngineConfig::default(), String::new())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(config: EngineConfig, video_id: impl Into<String>) -> Self {
        Self {
            doc: AnnotationSet::new(),
            history: History::new(),
            viewport: Viewport::default(),
            ui: UiState::from_config(&config),
            input: InputState::default(),
            config,
            video_id: video_id.into(),
            playback_time: 0.0,
        }
    }

    // --- Toolbar ---

    /// Switch the active tool. Any half-placed angle is dropped.
    pub fn set_tool(&mut self, tool: ToolKind) -> Vec<Action> {
        self.ui.tool = tool;
        if matches!(self.input, InputState::AnglePlacing { .. }) {
            self.input = InputState::Idle;
            return vec![Action::RenderNeeded];
        }
        Vec::new()
    }

    /// Set the color for new strokes. Returns `false` if the value was rejected.
    pub fn set_color(&mut self, color: &str) -> bool {
        let color = color.trim();
        if color.is_empty() {
            log::warn!("ignoring empty stroke color");
            return false;
        }
        color.clone_into(&mut self.ui.color);
        true
    }

    /// Set the width for new strokes. Returns `false` if the value was rejected.
    pub fn set_width(&mut self, width: f64) -> bool {
        if !width.is_finite() || width <= 0.0 {
            log::warn!("ignoring stroke width {width}");
            return false;
        }
        self.ui.width = width;
        true
    }

    /// Record the host video's playback position.
    pub fn set_playback_time(&mut self, seconds: f64) {
        if seconds.is_finite() && seconds >= 0.0 {
            self.playback_time = seconds;
        }
    }

    // --- Surface ---

    /// Resize the surface buffer to the video's displayed rectangle.
    pub fn fit_surface(&mut self, display: Rect) -> Vec<Action> {
        self.viewport.fit_to(display);
        vec![Action::RenderNeeded]
    }

    /// Update where the surface is shown on the page without resizing its buffer.
    pub fn set_display_rect(&mut self, display: Rect) {
        if display.has_area() {
            self.viewport.display = display;
        }
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, client: Point, button: Button) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        let Some((surface, point)) = self.map_client(client) else {
            log::warn!("pointer down ignored: surface has no size");
            return Vec::new();
        };

        if let InputState::AnglePlacing { tool, .. } = self.input
            && tool == self.ui.tool
        {
            return self.place_angle_point(point);
        }

        // A down without a matching up still finishes the previous drag.
        let mut actions = self.end_gesture();
        let tool = self.ui.tool;
        if tool.is_free_draw() {
            let stroke = Stroke::new(tool, point, self.ui.color.clone(), self.ui.width);
            self.input = InputState::FreeDrawing { stroke };
            actions.push(Action::RenderNeeded);
        } else if tool.is_angle() {
            self.input = InputState::AnglePlacing { tool, points: vec![point], cursor: None };
            actions.push(Action::RenderNeeded);
        } else {
            self.input = InputState::Erasing;
            actions.extend(self.erase_at(surface));
        }
        actions
    }

    pub fn on_pointer_move(&mut self, client: Point) -> Vec<Action> {
        if self.input == InputState::Idle {
            return Vec::new();
        }
        let Some((surface, point)) = self.map_client(client) else {
            log::debug!("pointer move ignored: surface has no size");
            return Vec::new();
        };

        if self.input == InputState::Erasing {
            return self.erase_at(surface);
        }
        match &mut self.input {
            InputState::FreeDrawing { stroke } => {
                stroke.points.push(point);
                vec![Action::RenderNeeded]
            }
            InputState::AnglePlacing { cursor, .. } => {
                *cursor = Some(point);
                vec![Action::RenderNeeded]
            }
            InputState::Idle | InputState::Erasing => Vec::new(),
        }
    }

    /// Pointer released, on the surface or anywhere in the document.
    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        self.end_gesture()
    }

    /// Pointer left the surface.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.end_gesture()
    }

    // --- History ---

    pub fn undo(&mut self) -> Vec<Action> {
        if self.history.undo(&mut self.doc) {
            vec![Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    pub fn redo(&mut self) -> Vec<Action> {
        if self.history.redo(&mut self.doc) {
            vec![Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    // --- Data ---

    /// Replace the annotation set for editing. History starts over.
    pub fn load_set(&mut self, set: AnnotationSet) -> Vec<Action> {
        log::info!("loaded {} strokes for video {}", set.len(), self.video_id);
        self.doc = set;
        self.history.reset();
        self.input = InputState::Idle;
        vec![Action::RenderNeeded]
    }

    /// Parse and load a serialized annotation set.
    ///
    /// # Errors
    ///
    /// Returns [`DocError`] if the JSON is malformed or a stroke is invalid.
    /// The current set is left untouched.
    pub fn load_json(&mut self, json: &str) -> Result<Vec<Action>, DocError> {
        let set = AnnotationSet::from_json(json)?;
        Ok(self.load_set(set))
    }

    /// Serialize the current annotation set.
    ///
    /// # Errors
    ///
    /// Returns [`DocError`] if encoding fails.
    pub fn strokes_json(&self) -> Result<String, DocError> {
        self.doc.to_json()
    }

    /// Drop every stroke and all history.
    pub fn clear(&mut self) -> Vec<Action> {
        log::info!("cleared {} strokes", self.doc.len());
        self.doc.clear();
        self.history.reset();
        self.input = InputState::Idle;
        vec![Action::RenderNeeded]
    }

    /// Save the current set stamped with `timestamp`, the video position at save time.
    ///
    /// The caller passes the position explicitly; `playback_time` only tracks
    /// the last pointer event and may be stale by the time a save is requested.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] from the store. The set is only cleared on success.
    pub async fn save_to<S: AnnotationStore>(
        &mut self,
        store: &S,
        timestamp: f64,
        clear_after: bool,
    ) -> Result<AnnotationId, StoreError> {
        let id = store.save(&self.video_id, &self.doc, timestamp).await?;
        log::info!("saved annotation {id} with {} strokes at {timestamp:.2}s", self.doc.len());
        if clear_after {
            self.clear();
        }
        Ok(id)
    }

    /// Load a saved annotation for editing and seek to where it was made.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] from the store. The current set is left untouched.
    pub async fn load_from<S: AnnotationStore>(&mut self, store: &S, id: AnnotationId) -> Result<Vec<Action>, StoreError> {
        let saved = store.load(id).await?;
        if saved.video_id != self.video_id {
            log::warn!("annotation {id} belongs to video {}, not {}", saved.video_id, self.video_id);
        }
        self.playback_time = saved.timestamp;
        let mut actions = vec![Action::SeekTo(saved.timestamp)];
        actions.extend(self.load_set(saved.strokes));
        Ok(actions)
    }

    // --- Render ---

    /// The overlay for the gesture in progress.
    #[must_use]
    pub fn preview(&self) -> Preview<'_> {
        match &self.input {
            InputState::FreeDrawing { stroke } => Preview::Stroke(stroke),
            InputState::AnglePlacing { points, cursor, .. } => {
                Preview::Angle { points, cursor: *cursor, color: &self.ui.color, width: self.ui.width }
            }
            InputState::Idle | InputState::Erasing => Preview::None,
        }
    }

    /// Redraw the committed strokes and the preview.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError`] if a surface call fails.
    pub fn draw(&self, surface: &mut impl Surface) -> Result<(), SurfaceError> {
        render::draw(surface, self.doc.strokes(), &self.viewport, &self.preview(), &self.config.label_font)
    }

    // --- Internals ---

    /// Map a client point to surface pixels and normalized space.
    fn map_client(&self, client: Point) -> Option<(Point, Point)> {
        let surface = self.viewport.client_to_surface(client)?;
        let point = self.viewport.surface_to_normalized(surface)?;
        Some((surface, point))
    }

    fn place_angle_point(&mut self, point: Point) -> Vec<Action> {
        let InputState::AnglePlacing { tool, points, .. } = &mut self.input else {
            return Vec::new();
        };
        points.push(point);
        if !tool.clicks_to_complete().is_some_and(|needed| points.len() >= needed) {
            return vec![Action::RenderNeeded];
        }

        let InputState::AnglePlacing { tool, points, .. } = std::mem::take(&mut self.input) else {
            return Vec::new();
        };
        let stroke = Stroke { tool, points, color: self.ui.color.clone(), width: self.ui.width, timestamp: 0.0 };
        self.commit(stroke)
    }

    fn end_gesture(&mut self) -> Vec<Action> {
        if !self.input.ends_on_release() {
            return Vec::new();
        }
        match std::mem::take(&mut self.input) {
            InputState::FreeDrawing { stroke } if stroke.points.len() > 1 => self.commit(stroke),
            InputState::FreeDrawing { stroke } => {
                log::debug!("discarded single-point {} stroke", stroke.tool);
                vec![Action::StrokeDiscarded, Action::RenderNeeded]
            }
            InputState::Idle | InputState::AnglePlacing { .. } | InputState::Erasing => Vec::new(),
        }
    }

    fn commit(&mut self, mut stroke: Stroke) -> Vec<Action> {
        stroke.timestamp = self.playback_time;
        log::debug!("committed {} stroke with {} points", stroke.tool, stroke.points.len());
        self.doc.push(stroke.clone());
        self.history.on_commit();
        vec![Action::StrokeCommitted(stroke), Action::RenderNeeded]
    }

    fn erase_at(&mut self, surface: Point) -> Vec<Action> {
        let hits = hit::hit_test(self.doc.strokes(), surface, self.ui.erase_radius, &self.viewport);
        if hits.is_empty() {
            return Vec::new();
        }
        let removed = self.doc.remove_indices(&hits);
        log::debug!("erased {} strokes", removed.len());
        vec![Action::StrokesErased(removed), Action::RenderNeeded]
    }
}

/// The full engine. Wraps `EngineCore` and owns the canvas and video elements.
pub struct Engine {
    canvas: HtmlCanvasElement,
    video: HtmlVideoElement,
    context: Option<CanvasRenderingContext2d>,
    pub core: EngineCore,
}

impl Engine {
    /// Create an engine drawing on `canvas` over `video`.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement, video: HtmlVideoElement, core: EngineCore) -> Self {
        Self { canvas, video, context: None, core }
    }

    // --- Toolbar ---

    pub fn set_tool(&mut self, tool: ToolKind) {
        let actions = self.core.set_tool(tool);
        self.apply(&actions);
    }

    pub fn set_color(&mut self, color: &str) {
        if self.core.set_color(color) {
            self.render();
        }
    }

    pub fn set_width(&mut self, width: f64) {
        if self.core.set_width(width) {
            self.render();
        }
    }

    pub fn undo(&mut self) {
        let actions = self.core.undo();
        self.apply(&actions);
    }

    pub fn redo(&mut self) {
        let actions = self.core.redo();
        self.apply(&actions);
    }

    pub fn clear(&mut self) {
        let actions = self.core.clear();
        self.apply(&actions);
    }

    /// Load a serialized set for editing.
    ///
    /// # Errors
    ///
    /// Returns [`DocError`] if the JSON is rejected.
    pub fn load_json(&mut self, json: &str) -> Result<(), DocError> {
        let actions = self.core.load_json(json)?;
        self.apply(&actions);
        Ok(())
    }

    // --- Persistence ---

    /// Save the current set at the video's current position.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] from the store.
    pub async fn save_to<S: AnnotationStore>(&mut self, store: &S, clear_after: bool) -> Result<AnnotationId, StoreError> {
        let timestamp = self.video.current_time();
        self.core.set_playback_time(timestamp);
        let id = self.core.save_to(store, timestamp, clear_after).await?;
        if clear_after {
            self.render();
        }
        Ok(id)
    }

    /// Load a saved annotation, seek the video to it and redraw.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] from the store.
    pub async fn load_from<S: AnnotationStore>(&mut self, store: &S, id: AnnotationId) -> Result<(), StoreError> {
        let actions = self.core.load_from(store, id).await?;
        self.apply(&actions);
        Ok(())
    }

    /// Current playback position of the host video, in seconds.
    #[must_use]
    pub fn playback_time(&self) -> f64 {
        self.video.current_time()
    }

    // --- Surface sizing ---

    /// Match the canvas buffer and CSS size to the video's displayed rectangle.
    pub fn sync_surface(&mut self) {
        let rect = self.video.get_bounding_client_rect();
        let display = Rect::new(rect.left(), rect.top(), rect.width(), rect.height());
        let actions = self.core.fit_surface(display);

        let (width, height) = self.core.viewport.buffer_size();
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        let style = self.canvas.style();
        for (property, value) in [("width", display.width), ("height", display.height)] {
            if let Err(err) = style.set_property(property, &format!("{value}px")) {
                log::warn!("failed to pin canvas {property}: {err:?}");
            }
        }
        log::debug!("surface sized to {width}x{height}");
        self.apply(&actions);
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, client: Point, button: Button) {
        self.refresh_input_context();
        let actions = self.core.on_pointer_down(client, button);
        self.apply(&actions);
    }

    pub fn on_pointer_move(&mut self, client: Point) {
        self.refresh_input_context();
        let actions = self.core.on_pointer_move(client);
        self.apply(&actions);
    }

    pub fn on_pointer_up(&mut self) {
        self.core.set_playback_time(self.video.current_time());
        let actions = self.core.on_pointer_up();
        self.apply(&actions);
    }

    pub fn on_pointer_leave(&mut self) {
        self.core.set_playback_time(self.video.current_time());
        let actions = self.core.on_pointer_leave();
        self.apply(&actions);
    }

    // --- Render ---

    /// Draw the current state to the canvas.
    pub fn render(&mut self) {
        if !self.core.viewport.is_ready() {
            log::warn!("render skipped: surface has no size");
            return;
        }
        let Some(mut context) = self.context() else {
            return;
        };
        if let Err(err) = self.core.draw(&mut context) {
            log::error!("render failed: {err}");
        }
    }

    // --- Internals ---

    fn apply(&mut self, actions: &[Action]) {
        let mut render = false;
        for action in actions {
            match action {
                Action::RenderNeeded => render = true,
                Action::SeekTo(seconds) => self.video.set_current_time(*seconds),
                Action::StrokeCommitted(_) | Action::StrokeDiscarded | Action::StrokesErased(_) => {}
            }
        }
        if render {
            self.render();
        }
    }

    /// The canvas may have moved since the last resize; pointer mapping uses where it is now.
    fn refresh_input_context(&mut self) {
        let rect = self.canvas.get_bounding_client_rect();
        self.core.set_display_rect(Rect::new(rect.left(), rect.top(), rect.width(), rect.height()));
        self.core.set_playback_time(self.video.current_time());
    }

    fn context(&mut self) -> Option<CanvasRenderingContext2d> {
        if self.context.is_none() {
            match self.canvas.get_context("2d") {
                Ok(Some(object)) => match object.dyn_into::<CanvasRenderingContext2d>() {
                    Ok(context) => self.context = Some(context),
                    Err(_) => log::warn!("2d context has an unexpected type"),
                },
                Ok(None) => log::warn!("2d context unavailable"),
                Err(err) => log::warn!("getContext failed: {err:?}"),
            }
        }
        self.context.clone()
    }
}
