use super::*;

use crate::knit::event::{EventQueue, KnitEvent};

#[test]
fn knit_emits_one_progress_event_per_row() {
    let plugin = SimulatorPlugin::with_row_delay(Duration::ZERO);
    plugin.set_image_dimensions(Dimensions {
        width: 4,
        height: 3,
    });

    let (link, queue) = EventQueue::channel();
    plugin.knit(&link).unwrap();

    let events = queue.drain();
    let rows: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            KnitEvent::Progress { row, total } => {
                assert_eq!(*total, 3);
                Some(*row)
            }
            _ => None,
        })
        .collect();
    assert_eq!(rows, vec![1, 2, 3]);
    assert!(matches!(
        events.last(),
        Some(KnitEvent::Notification(text)) if text == "knitting finished"
    ));
}

#[test]
fn knit_reports_a_centered_needle_span() {
    let plugin = SimulatorPlugin::with_row_delay(Duration::ZERO);
    plugin.set_image_dimensions(Dimensions {
        width: 4,
        height: 1,
    });

    let (link, queue) = EventQueue::channel();
    plugin.knit(&link).unwrap();

    let events = queue.drain();
    assert!(events.iter().any(|e| matches!(
        e,
        KnitEvent::NeedleRange {
            start: 98,
            stop: 101
        }
    )));
    assert!(
        events
            .iter()
            .any(|e| matches!(e, KnitEvent::Alignment(mode) if mode == "center"))
    );
}

#[test]
fn knit_without_dimensions_is_a_transition_error() {
    let plugin = SimulatorPlugin::with_row_delay(Duration::ZERO);
    let (link, _queue) = EventQueue::channel();
    let err = plugin.knit(&link).unwrap_err();
    assert!(matches!(err, KnitlineError::Transition(_)));
}

#[test]
fn stale_cancel_from_a_previous_run_does_not_abort_a_new_knit() {
    let plugin = SimulatorPlugin::with_row_delay(Duration::ZERO);
    plugin.set_image_dimensions(Dimensions {
        width: 4,
        height: 100,
    });

    let (link, queue) = EventQueue::channel();
    plugin.cancel();
    // knit() resets the flag at entry, so the run completes.
    plugin.knit(&link).unwrap();
    let events = queue.drain();
    assert!(matches!(
        events.last(),
        Some(KnitEvent::Notification(text)) if text == "knitting finished"
    ));
}
