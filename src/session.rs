//! Foreground host state: the single-writer record of everything the
//! operator manipulates between knitting jobs.

use std::path::Path;
use std::str::FromStr;

use crate::foundation::core::{AlignMode, NeedleRange, ProgressState, ZoomLevel};
use crate::foundation::error::{KnitlineError, KnitlineResult};
use crate::knit::coordinator::{Coordinator, JobOutcome};
use crate::knit::event::{KnitEvent, PromptRequest};
use crate::pattern::image::{Pattern, load_pattern};
use crate::pattern::transform;
use crate::plugin::api::HostUi;
use crate::plugin::registry::PluginRegistry;
use crate::scene::compose::{Scene, SceneParams, compose};
use crate::scene::raster::{FrameRgba, rasterize};

/// One image transform as requested by the operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformOp {
    /// Quarter turn counter-clockwise.
    RotateLeft,
    /// Quarter turn clockwise.
    RotateRight,
    /// Horizontal reflection.
    Mirror,
    /// Vertical reflection.
    Flip,
    /// Color inversion (alpha preserved).
    Invert,
    /// Tile repetition.
    Repeat {
        /// Vertical tile count, >= 1.
        vertical: u32,
        /// Horizontal tile count, >= 1.
        horizontal: u32,
    },
}

/// Host control area populated by the enabled plugin's `setup_ui`.
#[derive(Clone, Debug, Default)]
pub struct ControlPanel {
    controls: Vec<String>,
    status: Option<String>,
}

impl ControlPanel {
    /// Labels of the currently registered plugin controls.
    pub fn controls(&self) -> &[String] {
        &self.controls
    }

    /// Latest status text written by a plugin hook.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
}

impl HostUi for ControlPanel {
    fn add_control(&mut self, label: &str) {
        self.controls.push(label.to_string());
    }

    fn clear_controls(&mut self) {
        self.controls.clear();
    }

    fn status(&mut self, text: &str) {
        self.status = Some(text.to_string());
    }
}

/// Consolidated host state: current pattern, view parameters, the plugin
/// registry, and the execution coordinator.
///
/// All mutation happens on the owning (foreground) thread; the background
/// worker reaches the session only through the coordinator's event queue,
/// drained by [`Session::pump_events`].
pub struct Session {
    pattern: Option<Pattern>,
    range: NeedleRange,
    align: AlignMode,
    zoom: ZoomLevel,
    progress: ProgressState,
    status: Option<String>,
    controls: ControlPanel,
    registry: PluginRegistry,
    coordinator: Coordinator,
}

impl Session {
    /// Session with default view state and the given registry.
    pub fn new(registry: PluginRegistry) -> Self {
        Self {
            pattern: None,
            range: NeedleRange::default(),
            align: AlignMode::default(),
            zoom: ZoomLevel::default(),
            progress: ProgressState::default(),
            status: None,
            controls: ControlPanel::default(),
            registry,
            coordinator: Coordinator::new(),
        }
    }

    /// Current pattern, if one has been loaded.
    pub fn pattern(&self) -> Option<&Pattern> {
        self.pattern.as_ref()
    }

    /// Active needle span.
    pub fn range(&self) -> NeedleRange {
        self.range
    }

    /// Current alignment mode.
    pub fn align(&self) -> AlignMode {
        self.align
    }

    /// Current zoom level.
    pub fn zoom(&self) -> ZoomLevel {
        self.zoom
    }

    /// Current knitting progress.
    pub fn progress(&self) -> ProgressState {
        self.progress
    }

    /// Latest status-line text, if any.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Plugin registry.
    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Plugin registry, mutable.
    pub fn registry_mut(&mut self) -> &mut PluginRegistry {
        &mut self.registry
    }

    /// Execution coordinator.
    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Execution coordinator, mutable.
    pub fn coordinator_mut(&mut self) -> &mut Coordinator {
        &mut self.coordinator
    }

    /// Plugin control area.
    pub fn controls(&self) -> &ControlPanel {
        &self.controls
    }

    /// Make `name` the enabled plugin, running teardown/setup hooks against
    /// this session's control panel.
    pub fn enable_plugin(&mut self, name: &str) -> KnitlineResult<()> {
        self.registry.set_enabled(name, &mut self.controls)?;
        if let (Some(plugin), Some(pattern)) = (self.registry.enabled(), self.pattern.as_ref()) {
            plugin.set_image_dimensions(pattern.dimensions());
        }
        Ok(())
    }

    /// Open the enabled plugin's settings surface.
    pub fn configure_plugin(&mut self) -> KnitlineResult<()> {
        let plugin = self
            .registry
            .enabled()
            .ok_or_else(|| KnitlineError::plugin("no plugin enabled"))?;
        plugin.configure(&mut self.controls)
    }

    /// Load a pattern file, replacing the current pattern wholesale.
    ///
    /// Resets progress and reports the new dimensions to the enabled plugin.
    #[tracing::instrument(skip(self))]
    pub fn load_pattern(&mut self, path: &Path) -> KnitlineResult<()> {
        let pattern = load_pattern(path)?;
        self.replace_pattern(pattern);
        Ok(())
    }

    /// Install an in-memory pattern (tests, builders).
    pub fn set_pattern(&mut self, pattern: Pattern) {
        self.replace_pattern(pattern);
    }

    /// Apply a pure transform to the current pattern.
    ///
    /// On failure the previous pattern stays in force and the error is both
    /// logged and returned; a transform never partially applies. On success
    /// the enabled plugin learns the new dimensions.
    pub fn apply_transform(&mut self, op: TransformOp) -> KnitlineResult<()> {
        let pattern = self
            .pattern
            .as_ref()
            .ok_or_else(|| KnitlineError::transform("no pattern loaded"))?;

        let result = match op {
            TransformOp::RotateLeft => transform::rotate(pattern, 90.0),
            TransformOp::RotateRight => transform::rotate(pattern, -90.0),
            TransformOp::Mirror => transform::mirror(pattern),
            TransformOp::Flip => transform::flip(pattern),
            TransformOp::Invert => transform::invert(pattern),
            TransformOp::Repeat {
                vertical,
                horizontal,
            } => transform::repeat(pattern, vertical, horizontal),
        };

        match result {
            Ok(next) => {
                self.replace_pattern(next);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(?op, error = %e, "transform rejected, pattern unchanged");
                Err(e)
            }
        }
    }

    /// Set the zoom level, clamping to `[1, 5]`.
    pub fn set_zoom(&mut self, level: i32) {
        self.zoom = ZoomLevel::clamped(level);
    }

    /// Step the zoom level (mouse-wheel style), re-clamping.
    pub fn step_zoom(&mut self, delta: i32) {
        self.zoom = self.zoom.stepped(delta);
    }

    /// Replace the active needle span.
    pub fn set_needle_range(&mut self, range: NeedleRange) {
        self.range = range;
    }

    /// Replace the alignment mode.
    pub fn set_alignment(&mut self, align: AlignMode) {
        self.align = align;
    }

    /// Start a knitting job on the enabled plugin.
    pub fn start_knitting(&mut self) -> KnitlineResult<()> {
        let plugin = self
            .registry
            .enabled()
            .ok_or_else(|| KnitlineError::plugin("no plugin enabled for knitting"))?;
        self.coordinator.start(plugin)
    }

    /// Request cooperative cancellation of the running job.
    pub fn cancel_knitting(&mut self) -> KnitlineResult<()> {
        self.coordinator.cancel()
    }

    /// Collect the job's terminal outcome if the worker has finished.
    pub fn finish_knitting(&mut self) -> KnitlineResult<Option<JobOutcome>> {
        self.coordinator.try_finish()
    }

    /// Drain pending worker events in emission order, updating host state.
    ///
    /// `Progress` updates the progress state; `Notification` becomes the
    /// status line; `NeedleRange` replaces the span when valid (invalid
    /// spans are logged and ignored); `Alignment` with an unrecognized
    /// spelling is logged and leaves the mode - and therefore the pattern
    /// position - unchanged; `Prompt` is answered through `on_prompt`.
    pub fn pump_events<F>(&mut self, mut on_prompt: F) -> KnitlineResult<()>
    where
        F: FnMut(&PromptRequest) -> bool,
    {
        for event in self.coordinator.events().drain() {
            match event {
                KnitEvent::Progress { row, total } => {
                    self.progress = ProgressState::new(row, total);
                }
                KnitEvent::Notification(text) => {
                    tracing::info!(text, "notification");
                    self.status = Some(text);
                }
                KnitEvent::NeedleRange { start, stop } => match NeedleRange::new(start, stop) {
                    Ok(range) => self.range = range,
                    Err(e) => {
                        tracing::warn!(start, stop, error = %e, "ignoring invalid needle range");
                    }
                },
                KnitEvent::Alignment(mode) => match AlignMode::from_str(&mode) {
                    Ok(align) => self.align = align,
                    Err(e) => {
                        tracing::warn!(mode, error = %e, "alignment unchanged");
                    }
                },
                KnitEvent::Prompt(request) => {
                    let answer = on_prompt(&request);
                    request.respond(answer)?;
                }
            }
        }
        Ok(())
    }

    /// Immutable snapshot of everything the renderer consumes.
    pub fn snapshot(&self) -> KnitlineResult<SceneParams> {
        let pattern = self
            .pattern
            .as_ref()
            .ok_or_else(|| KnitlineError::transform("no pattern loaded"))?;
        Ok(SceneParams {
            pattern: pattern.dimensions(),
            range: self.range,
            align: self.align,
            zoom: self.zoom,
            progress: self.progress,
        })
    }

    /// Compose the preview scene from a fresh snapshot.
    pub fn compose_scene(&self) -> KnitlineResult<Scene> {
        Ok(compose(self.snapshot()?))
    }

    /// Compose and rasterize the preview from a fresh snapshot.
    pub fn render_preview(&self) -> KnitlineResult<FrameRgba> {
        let scene = self.compose_scene()?;
        let pattern = self
            .pattern
            .as_ref()
            .ok_or_else(|| KnitlineError::transform("no pattern loaded"))?;
        rasterize(&scene, pattern)
    }

    fn replace_pattern(&mut self, pattern: Pattern) {
        let dims = pattern.dimensions();
        self.pattern = Some(pattern);
        self.progress = ProgressState::default();
        if let Some(plugin) = self.registry.enabled() {
            plugin.set_image_dimensions(dims);
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
