//! Property-based tests for the tracker and report composition.

use proptest::prelude::*;
use reversejoy::controller::{compose_report, ComposeOptions, AXIS_MAX, AXIS_MIN};
use reversejoy::input::{InputEvent, InputHandler, InputTracker, KeyCode, SharedInputState};
use reversejoy::mapping::TOGGLE_KEY;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

fn tracker(sensitivity: f32) -> InputTracker {
    InputTracker::new(
        SharedInputState::default(),
        sensitivity,
        Arc::new(Notify::new()),
        CancellationToken::new(),
    )
}

fn any_key() -> impl Strategy<Value = KeyCode> {
    prop_oneof![
        Just(KeyCode::W),
        Just(KeyCode::A),
        Just(KeyCode::S),
        Just(KeyCode::D),
        Just(KeyCode::Q),
        Just(KeyCode::E),
        Just(KeyCode::Z),
        Just(KeyCode::C),
        Just(KeyCode::Space),
        (0u32..256).prop_map(KeyCode::from_virtual_key),
    ]
}

fn any_event() -> impl Strategy<Value = InputEvent> {
    prop_oneof![
        any_key().prop_map(InputEvent::KeyDown),
        any_key().prop_map(InputEvent::KeyUp),
        (-5000i32..5000, -5000i32..5000).prop_map(|(dx, dy)| InputEvent::MouseMove { dx, dy }),
    ]
}

proptest! {
    #[test]
    fn prop_opposing_keys_cancel(
        extra in prop::collection::vec(any_key(), 0..8),
        vertical_first in any::<bool>(),
    ) {
        let tracker = tracker(1.0);
        for key in &extra {
            tracker.key_down(*key);
        }
        let pairs = if vertical_first {
            [KeyCode::W, KeyCode::S, KeyCode::A, KeyCode::D]
        } else {
            [KeyCode::D, KeyCode::A, KeyCode::S, KeyCode::W]
        };
        for key in pairs {
            tracker.key_down(key);
        }

        let report = compose_report(&tracker.state().snapshot(), &ComposeOptions::default());
        prop_assert_eq!(report.thumb_lx, 0);
        prop_assert_eq!(report.thumb_ly, 0);
    }

    #[test]
    fn prop_left_stick_only_takes_extreme_or_zero(
        events in prop::collection::vec(any_event(), 0..64),
    ) {
        let tracker = tracker(1.0);
        for event in events {
            tracker.handle_input_event(event);
        }

        let report = compose_report(&tracker.state().snapshot(), &ComposeOptions::default());
        for axis in [i32::from(report.thumb_lx), i32::from(report.thumb_ly)] {
            prop_assert!(axis == 0 || axis == AXIS_MAX || axis == AXIS_MIN);
        }
    }

    #[test]
    fn prop_pending_delta_stays_in_range(
        moves in prop::collection::vec((any::<i32>(), any::<i32>()), 1..32),
        sensitivity in 0.01f32..20000.0,
    ) {
        let tracker = tracker(sensitivity);
        for (dx, dy) in moves {
            tracker.mouse_move(dx, dy);
            let (x, y) = tracker.state().snapshot().pending_delta();
            prop_assert!((AXIS_MIN..=AXIS_MAX).contains(&x));
            prop_assert!((AXIS_MIN..=AXIS_MAX).contains(&y));
        }

        let state = tracker.state().snapshot();
        let report = compose_report(&state, &ComposeOptions::default());
        prop_assert_eq!(i32::from(report.thumb_rx), state.pending_delta().0);
        prop_assert_eq!(i32::from(report.thumb_ry), state.pending_delta().1);
    }

    #[test]
    fn prop_compose_is_idempotent(
        events in prop::collection::vec(any_event(), 0..64),
        dpad_mirror in any::<bool>(),
    ) {
        let tracker = tracker(7.0);
        for event in events {
            tracker.handle_input_event(event);
        }

        let options = ComposeOptions { dpad_mirror };
        let first = compose_report(&tracker.state().snapshot(), &options);
        let second = compose_report(&tracker.state().snapshot(), &options);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_toggle_parity(presses in 0usize..20, repeats in 1usize..4) {
        let tracker = tracker(1.0);
        for _ in 0..presses {
            for _ in 0..repeats {
                tracker.key_down(TOGGLE_KEY);
            }
            tracker.key_up(TOGGLE_KEY);
        }

        let passthrough = tracker.state().snapshot().passthrough_enabled();
        prop_assert_eq!(passthrough, presses % 2 == 1);
    }
}
