//! knitline is a knitting-machine pattern composition and job execution
//! engine.
//!
//! It covers the headless core of a machine-knitting workstation: loading a
//! raster pattern, transforming it, previewing it against a schematic of the
//! needle bed, and driving a pluggable knitting protocol on a background
//! worker.
//!
//! # Pipeline overview
//!
//! 1. **Load/transform**: `Pattern` in, `Pattern` out — pure operations in
//!    [`crate::pattern::transform`], nothing mutates in place.
//! 2. **Compose**: `SceneParams` (an immutable host-state snapshot) ->
//!    `Scene` — needle-relative placement of the pattern plus the machine
//!    schematic, limit markers, and progress marker.
//! 3. **Rasterize**: `Scene -> FrameRgba` (premultiplied RGBA8 preview).
//! 4. **Knit**: the enabled [`KnitPlugin`]'s blocking routine runs on one
//!    background worker under the [`Coordinator`]; events flow back through
//!    an ordered queue, with blocking prompts as the single cross-thread
//!    rendezvous.
//!
//! Key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Single writer**: the foreground thread owns the pattern, view state,
//!   and the enabled-plugin pointer; the worker communicates only via the
//!   event queue.
//! - **One worker**: at most one knitting job exists at a time; a second
//!   `start` is rejected as an invalid transition.
//! - **Full re-render**: every mutation of pattern, needle range, alignment,
//!   or progress recomposes the scene from a fresh snapshot.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;
mod knit;
mod pattern;
mod plugin;
mod scene;
mod session;

pub use foundation::core::{
    AlignMode, Dimensions, Machine, NeedleRange, ProgressState, Rect, Rgba8Premul, ZoomLevel,
};
pub use foundation::error::{KnitlineError, KnitlineResult};
pub use knit::coordinator::{Coordinator, JobOutcome, JobState};
pub use knit::event::{EventQueue, HostLink, KnitEvent, PromptKind, PromptRequest};
pub use pattern::image::{Pattern, decode_pattern, load_pattern};
pub use pattern::transform::{flip, invert, mirror, repeat, rotate};
pub use plugin::api::{HostUi, KnitPlugin, NullHostUi};
pub use plugin::registry::{PluginDescriptor, PluginFactory, PluginManifest, PluginRegistry};
pub use plugin::simulator::{SIMULATOR_PLUGIN_NAME, SimulatorPlugin};
pub use scene::compose::{
    LEFT_BED_COLOR, LIMIT_MARKER_COLOR, PROGRESS_MARKER_COLOR, RIGHT_BED_COLOR, Scene, SceneItem,
    SceneParams, compose,
};
pub use scene::layout::{
    limit_marker_rects, pattern_left_edge, pattern_rect, progress_marker_rect, schematic_rects,
};
pub use scene::raster::{FrameRgba, rasterize};
pub use session::{ControlPanel, Session, TransformOp};
