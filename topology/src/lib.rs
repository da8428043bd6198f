//! Interaction core of the collaborative network-topology editor.
//!
//! This crate turns raw keyboard, mouse and touch input into edits of a
//! diagram of devices, interfaces, links and groups, and keeps that diagram
//! in step with other clients through the message protocol defined in
//! [`frames`]. It is compiled to WebAssembly for the browser and natively for
//! tests and the `topo` CLI. Rendering and the socket itself belong to the
//! host; the crate hands back [`engine::Action`]s for both.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::Editor`] facade: the single entry point for every input |
//! | [`fsm`] | State-machine engine: controllers, chain, transitions |
//! | [`machines`] | The interaction machines and their chain order |
//! | [`session`] | Mutable editor context: pointer, selection, outbox |
//! | [`sync`] | Applying messages to the model; undo inverses; snapshots |
//! | [`history`] | Shared undo/redo history |
//! | [`diagram`] | Device, link and group store with cross-reference upkeep |
//! | [`model`] | Devices, interfaces, links, groups and their hit tests |
//! | [`geometry`] | Segment distance, intersection and anchor placement |
//! | [`viewport`] | Pan/zoom and screen/world conversion |
//! | [`seq`] | Monotonic id sequences |
//! | [`input`] | Input and command event types |
//! | [`config`] | Editor settings and environment overrides |
//! | [`bindings`] | `wasm-bindgen` handle for browser hosts |
//! | [`consts`] | Shared numeric constants (zoom limits, hit bands, etc.) |

pub mod bindings;
pub mod config;
pub mod consts;
pub mod diagram;
pub mod engine;
pub mod error;
pub mod fsm;
pub mod geometry;
pub mod history;
pub mod input;
pub mod machines;
pub mod model;
pub mod seq;
pub mod session;
pub mod sync;
pub mod viewport;

pub use config::{ConfigError, EditorConfig};
pub use engine::{Action, Editor};
pub use error::EditorError;
pub use input::Event;
