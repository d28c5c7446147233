//! Video annotation engine.
//!
//! This crate is compiled to WebAssembly and runs in the browser over a
//! playing video. It turns pointer input into annotation strokes (freehand,
//! arrows, circles, angle measurements), erases strokes under the cursor,
//! keeps undo/redo history, and redraws the whole set on a 2D canvas. Strokes
//! are stored in normalized video coordinates and serialize to JSON for the
//! host's persistence layer.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`doc`] | Strokes, tool kinds, and the annotation set |
//! | [`geom`] | Distances, three-point angles, perpendiculars |
//! | [`viewport`] | Client, surface, and normalized coordinate spaces |
//! | [`input`] | Toolbar state and the gesture state machine |
//! | [`hit`] | Erase hit-testing |
//! | [`history`] | Undo/redo snapshots |
//! | [`render`] | Drawing strokes and previews to a [`render::Surface`] |
//! | [`store`] | Persistence trait and in-memory store |
//! | [`config`] | Engine tunables |
//! | [`dom`] | `wasm-bindgen` handle and DOM listeners |
//! | [`logging`] | Console logging setup |
//! | [`consts`] | Shared drawing constants |

pub mod config;
pub mod consts;
pub mod doc;
pub mod dom;
pub mod engine;
pub mod geom;
pub mod history;
pub mod hit;
pub mod input;
pub mod logging;
pub mod render;
pub mod store;
pub mod viewport;
