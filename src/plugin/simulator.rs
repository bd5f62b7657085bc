use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::foundation::core::{AlignMode, Dimensions, Machine};
use crate::foundation::error::{KnitlineError, KnitlineResult};
use crate::knit::event::HostLink;
use crate::plugin::api::{HostUi, KnitPlugin};

/// Name the simulator registers under.
pub const SIMULATOR_PLUGIN_NAME: &str = "simulator";

/// Built-in loopback plugin: knits one row per tick without any machine
/// attached.
///
/// The simulator reports the pattern height as the job's row count, emits a
/// progress event per row, honors `cancel` between rows, and refuses to knit
/// before the host has reported pattern dimensions.
#[derive(Debug)]
pub struct SimulatorPlugin {
    dims: Mutex<Option<Dimensions>>,
    cancel_requested: AtomicBool,
    row_delay: Duration,
}

impl SimulatorPlugin {
    /// Simulator with the default per-row delay.
    pub fn new() -> Self {
        Self::with_row_delay(Duration::from_millis(20))
    }

    /// Simulator with an explicit per-row delay (tests use zero).
    pub fn with_row_delay(row_delay: Duration) -> Self {
        Self {
            dims: Mutex::new(None),
            cancel_requested: AtomicBool::new(false),
            row_delay,
        }
    }
}

impl Default for SimulatorPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl KnitPlugin for SimulatorPlugin {
    fn name(&self) -> &str {
        SIMULATOR_PLUGIN_NAME
    }

    fn setup_ui(&self, host: &mut dyn HostUi) -> KnitlineResult<()> {
        host.add_control("simulator: row delay");
        Ok(())
    }

    fn cleanup_ui(&self, host: &mut dyn HostUi) -> KnitlineResult<()> {
        host.clear_controls();
        Ok(())
    }

    fn configure(&self, host: &mut dyn HostUi) -> KnitlineResult<()> {
        host.status("simulator has no machine settings");
        Ok(())
    }

    fn set_image_dimensions(&self, dims: Dimensions) {
        *self.dims.lock().expect("dims lock poisoned") = Some(dims);
    }

    #[tracing::instrument(skip(self, link))]
    fn knit(&self, link: &HostLink) -> KnitlineResult<()> {
        self.cancel_requested.store(false, Ordering::SeqCst);

        let dims = self
            .dims
            .lock()
            .expect("dims lock poisoned")
            .ok_or_else(|| KnitlineError::transition("knit requested before a pattern was loaded"))?;

        let total = dims.height;
        let (start, stop) = centered_span(dims.width);
        link.notify(format!("simulating {total} rows"))?;
        link.needle_range(start, stop)?;
        link.alignment(AlignMode::Center.as_str())?;
        for row in 1..=total {
            if self.cancel_requested.load(Ordering::SeqCst) {
                link.notify("knitting cancelled")?;
                return Ok(());
            }
            link.progress(row, total)?;
            if !self.row_delay.is_zero() {
                std::thread::sleep(self.row_delay);
            }
        }
        link.notify("knitting finished")?;
        Ok(())
    }

    fn cancel(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
    }
}

/// Needle span centered on the bed for a pattern of `width` stitches,
/// saturating at the full bed for oversized patterns.
fn centered_span(width: u32) -> (u16, u16) {
    let width = width.clamp(1, u32::from(Machine::NEEDLE_COUNT)) as u16;
    let start = (Machine::NEEDLE_COUNT - width) / 2;
    (start, start + width - 1)
}

#[cfg(test)]
#[path = "../../tests/unit/plugin/simulator.rs"]
mod tests;
