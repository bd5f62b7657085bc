use super::*;

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::foundation::core::Dimensions;
use crate::knit::event::KnitEvent;
use crate::plugin::api::HostUi;

/// Scripted plugin: runs a configurable routine and tracks cancel requests.
struct ScriptedPlugin {
    behavior: Behavior,
    cancel_requested: AtomicBool,
    release: Mutex<Option<std::sync::mpsc::Receiver<()>>>,
}

enum Behavior {
    /// Emit `rows` progress events, then return.
    Finish { rows: u32 },
    /// Spin until cancelled, emitting progress ticks.
    UntilCancelled,
    /// Return a state-machine violation.
    RaiseTransition,
    /// Return a plugin error.
    RaisePluginError,
    /// Panic mid-routine.
    Panic,
    /// Block until the paired sender fires, then return.
    HoldUntilReleased,
}

impl ScriptedPlugin {
    fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            cancel_requested: AtomicBool::new(false),
            release: Mutex::new(None),
        })
    }

    fn held(behavior: Behavior) -> (Arc<Self>, std::sync::mpsc::Sender<()>) {
        let (tx, rx) = std::sync::mpsc::channel();
        let plugin = Self::new(behavior);
        *plugin.release.lock().unwrap() = Some(rx);
        (plugin, tx)
    }
}

impl KnitPlugin for ScriptedPlugin {
    fn name(&self) -> &str {
        "scripted"
    }

    fn setup_ui(&self, _host: &mut dyn HostUi) -> KnitlineResult<()> {
        Ok(())
    }

    fn cleanup_ui(&self, _host: &mut dyn HostUi) -> KnitlineResult<()> {
        Ok(())
    }

    fn configure(&self, _host: &mut dyn HostUi) -> KnitlineResult<()> {
        Ok(())
    }

    fn set_image_dimensions(&self, _dims: Dimensions) {}

    fn knit(&self, link: &HostLink) -> KnitlineResult<()> {
        match &self.behavior {
            Behavior::Finish { rows } => {
                for row in 1..=*rows {
                    link.progress(row, *rows)?;
                }
                Ok(())
            }
            Behavior::UntilCancelled => {
                let mut row = 0;
                while !self.cancel_requested.load(Ordering::SeqCst) {
                    row += 1;
                    link.progress(row, 0)?;
                    std::thread::sleep(Duration::from_millis(1));
                }
                Ok(())
            }
            Behavior::RaiseTransition => {
                Err(KnitlineError::transition("machine is not in knit mode"))
            }
            Behavior::RaisePluginError => Err(KnitlineError::plugin("serial port vanished")),
            Behavior::Panic => panic!("routine blew up"),
            Behavior::HoldUntilReleased => {
                let rx = self.release.lock().unwrap().take().expect("release armed");
                let _ = rx.recv();
                Ok(())
            }
        }
    }

    fn cancel(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
    }
}

#[test]
fn start_from_idle_transitions_to_knitting() {
    let mut coordinator = Coordinator::new();
    assert_eq!(coordinator.state(), JobState::Idle);

    let (plugin, release) = ScriptedPlugin::held(Behavior::HoldUntilReleased);
    coordinator.start(plugin).unwrap();
    assert_eq!(coordinator.state(), JobState::Knitting);

    release.send(()).unwrap();
    assert_eq!(coordinator.wait().unwrap(), JobOutcome::Completed);
    assert_eq!(coordinator.state(), JobState::Idle);
}

#[test]
fn second_start_is_rejected_and_leaves_the_job_running() {
    let mut coordinator = Coordinator::new();
    let (plugin, release) = ScriptedPlugin::held(Behavior::HoldUntilReleased);
    coordinator.start(plugin).unwrap();

    let err = coordinator
        .start(ScriptedPlugin::new(Behavior::Finish { rows: 1 }))
        .unwrap_err();
    assert!(matches!(err, KnitlineError::Transition(_)));
    assert_eq!(coordinator.state(), JobState::Knitting);

    release.send(()).unwrap();
    assert_eq!(coordinator.wait().unwrap(), JobOutcome::Completed);
}

#[test]
fn completed_job_resets_to_idle_and_accepts_a_new_start() {
    let mut coordinator = Coordinator::new();
    coordinator
        .start(ScriptedPlugin::new(Behavior::Finish { rows: 3 }))
        .unwrap();
    assert_eq!(coordinator.wait().unwrap(), JobOutcome::Completed);

    let rows: Vec<u32> = coordinator
        .events()
        .drain()
        .into_iter()
        .filter_map(|e| match e {
            KnitEvent::Progress { row, .. } => Some(row),
            _ => None,
        })
        .collect();
    assert_eq!(rows, vec![1, 2, 3]);

    coordinator
        .start(ScriptedPlugin::new(Behavior::Finish { rows: 1 }))
        .unwrap();
    assert_eq!(coordinator.wait().unwrap(), JobOutcome::Completed);
}

#[test]
fn cancel_while_idle_is_an_invalid_transition() {
    let mut coordinator = Coordinator::new();
    assert!(matches!(
        coordinator.cancel().unwrap_err(),
        KnitlineError::Transition(_)
    ));
}

#[test]
fn cancel_while_knitting_eventually_yields_cancelled() {
    let mut coordinator = Coordinator::new();
    coordinator
        .start(ScriptedPlugin::new(Behavior::UntilCancelled))
        .unwrap();

    // Let the worker emit a few events first.
    while coordinator.events().try_next().is_none() {
        std::thread::yield_now();
    }
    coordinator.cancel().unwrap();
    assert_eq!(coordinator.wait().unwrap(), JobOutcome::Cancelled);
    assert_eq!(coordinator.state(), JobState::Idle);
}

#[test]
fn worker_may_emit_events_after_cancel_is_requested() {
    let mut coordinator = Coordinator::new();
    coordinator
        .start(ScriptedPlugin::new(Behavior::UntilCancelled))
        .unwrap();
    while coordinator.events().try_next().is_none() {
        std::thread::yield_now();
    }
    coordinator.cancel().unwrap();
    assert_eq!(coordinator.wait().unwrap(), JobOutcome::Cancelled);
    // No panic or error from late deliveries; whatever arrived is ordered.
    let rows: Vec<u32> = coordinator
        .events()
        .drain()
        .into_iter()
        .filter_map(|e| match e {
            KnitEvent::Progress { row, .. } => Some(row),
            _ => None,
        })
        .collect();
    for pair in rows.windows(2) {
        assert!(pair[0] < pair[1]);
    }
}

#[test]
fn transition_violation_is_absorbed_into_failed() {
    let mut coordinator = Coordinator::new();
    coordinator
        .start(ScriptedPlugin::new(Behavior::RaiseTransition))
        .unwrap();
    assert_eq!(coordinator.wait().unwrap(), JobOutcome::Failed);
    assert_eq!(coordinator.state(), JobState::Idle);
}

#[test]
fn other_worker_errors_propagate_instead_of_mapping_to_failed() {
    let mut coordinator = Coordinator::new();
    coordinator
        .start(ScriptedPlugin::new(Behavior::RaisePluginError))
        .unwrap();
    let err = coordinator.wait().unwrap_err();
    assert!(matches!(err, KnitlineError::Plugin(_)));
    // The failed job is still discarded.
    assert_eq!(coordinator.state(), JobState::Idle);
}

#[test]
fn worker_panic_surfaces_as_an_error() {
    let mut coordinator = Coordinator::new();
    coordinator
        .start(ScriptedPlugin::new(Behavior::Panic))
        .unwrap();
    let err = coordinator.wait().unwrap_err();
    assert!(matches!(err, KnitlineError::Plugin(_)));
    assert!(err.to_string().contains("panicked"));
}

#[test]
fn try_finish_returns_none_while_running() {
    let mut coordinator = Coordinator::new();
    let (plugin, release) = ScriptedPlugin::held(Behavior::HoldUntilReleased);
    coordinator.start(plugin).unwrap();
    assert!(coordinator.try_finish().unwrap().is_none());
    assert_eq!(coordinator.state(), JobState::Knitting);

    release.send(()).unwrap();
    loop {
        if let Some(outcome) = coordinator.try_finish().unwrap() {
            assert_eq!(outcome, JobOutcome::Completed);
            break;
        }
        std::thread::yield_now();
    }
}

#[test]
fn wait_with_answers_prompts_while_waiting() {
    struct PromptingPlugin;

    impl KnitPlugin for PromptingPlugin {
        fn name(&self) -> &str {
            "prompting"
        }
        fn setup_ui(&self, _host: &mut dyn HostUi) -> KnitlineResult<()> {
            Ok(())
        }
        fn cleanup_ui(&self, _host: &mut dyn HostUi) -> KnitlineResult<()> {
            Ok(())
        }
        fn configure(&self, _host: &mut dyn HostUi) -> KnitlineResult<()> {
            Ok(())
        }
        fn set_image_dimensions(&self, _dims: Dimensions) {}
        fn knit(&self, link: &HostLink) -> KnitlineResult<()> {
            let proceed =
                link.blocking_prompt("insert yarn and continue?", crate::knit::event::PromptKind::Question)?;
            assert!(proceed);
            link.progress(1, 1)
        }
        fn cancel(&self) {}
    }

    let mut coordinator = Coordinator::new();
    coordinator.start(Arc::new(PromptingPlugin)).unwrap();

    let mut prompts = 0;
    let outcome = coordinator
        .wait_with(|event| {
            if let KnitEvent::Prompt(request) = event {
                prompts += 1;
                request.respond(true).unwrap();
            }
        })
        .unwrap();
    assert_eq!(outcome, JobOutcome::Completed);
    assert_eq!(prompts, 1);
}
