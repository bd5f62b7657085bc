use crate::foundation::core::Dimensions;
use crate::foundation::error::KnitlineResult;
use crate::knit::event::HostLink;

/// Capability contract every knitting-protocol plugin exposes.
///
/// The registry and coordinator drive plugins through this surface only and
/// never inspect their internals. `knit` runs on the background worker and
/// must observe `cancel` cooperatively; everything else is called on the
/// foreground thread.
pub trait KnitPlugin: Send + Sync {
    /// Stable plugin name used by the registry.
    fn name(&self) -> &str;

    /// Called on activation; may register plugin-specific controls.
    fn setup_ui(&self, host: &mut dyn HostUi) -> KnitlineResult<()>;

    /// Called before deactivation or switch; removes plugin controls.
    fn cleanup_ui(&self, host: &mut dyn HostUi) -> KnitlineResult<()>;

    /// Open plugin-specific settings on demand.
    fn configure(&self, host: &mut dyn HostUi) -> KnitlineResult<()>;

    /// Inform the plugin of the current pattern size.
    fn set_image_dimensions(&self, dims: Dimensions);

    /// Blocking knitting routine; runs on the background worker and reports
    /// through `link`.
    fn knit(&self, link: &HostLink) -> KnitlineResult<()>;

    /// Request cooperative stop of an in-progress `knit`.
    fn cancel(&self);
}

/// Host-side control surface plugins may populate during `setup_ui`.
pub trait HostUi {
    /// Register a plugin-specific control by label.
    fn add_control(&mut self, label: &str);

    /// Remove all controls registered by the outgoing plugin.
    fn clear_controls(&mut self);

    /// Show a status-area message.
    fn status(&mut self, text: &str);
}

/// No-op host surface for headless use.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullHostUi;

impl HostUi for NullHostUi {
    fn add_control(&mut self, _label: &str) {}

    fn clear_controls(&mut self) {}

    fn status(&mut self, text: &str) {
        tracing::info!(text, "plugin status");
    }
}
