use std::cell::RefCell;
use std::rc::Rc;

use axis_rs::AxisError;
use axis_rs::core::{Range, RangeEvent, RangeState, RangeStateConfig, Unit, Value};
use axis_rs::error::AxisResult;

fn state(min: f64, max: f64) -> RangeState {
    RangeState::from_bounds(min, max, Unit::Dimensionless).expect("valid state")
}

fn range(min: f64, max: f64) -> Range {
    Range::new(min, max, Unit::Dimensionless).expect("valid range")
}

fn value(magnitude: f64) -> Value {
    Value::new(magnitude, Unit::Dimensionless)
}

fn record(state: &mut RangeState) -> Rc<RefCell<Vec<RangeEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    state.subscribe(move |event: &RangeEvent| sink.borrow_mut().push(*event));
    events
}

#[test]
fn reversed_bounds_fail_construction() {
    let result = RangeState::from_bounds(5.0, 1.0, Unit::Dimensionless);
    assert!(matches!(
        result,
        Err(AxisError::Construction { min, max }) if min == 5.0 && max == 1.0
    ));
    assert!(RangeState::from_bounds(f64::NAN, 1.0, Unit::Dimensionless).is_err());
}

#[test]
fn set_range_round_trips_and_notifies() {
    let mut state = state(0.0, 10.0);
    let events = record(&mut state);

    state.set_range(range(2.0, 10.0)).expect("set range");

    assert_eq!(state.range(), range(2.0, 10.0));
    assert_eq!(
        *events.borrow(),
        vec![
            RangeEvent::MinimumChanged { old: 0.0, new: 2.0 },
            RangeEvent::Updated {
                range: range(2.0, 10.0),
                log: false
            },
        ]
    );
}

#[test]
fn unchanged_range_is_a_no_op() {
    let mut state = state(0.0, 10.0);
    let events = record(&mut state);

    state.set_range(range(0.0, 10.0)).expect("set range");

    assert!(events.borrow().is_empty());
    assert!(!state.can_undo());
}

#[test]
fn set_range_converts_compatible_units() {
    let mut state = RangeState::from_bounds(0.0, 1.0, Unit::Kilometers).expect("valid state");
    state
        .set_range(Range::new(500.0, 2_000.0, Unit::Meters).expect("valid range"))
        .expect("meters convert to kilometers");

    assert_eq!(state.unit(), Unit::Kilometers);
    assert!((state.range().min() - 0.5).abs() <= 1e-12);
    assert!((state.range().max() - 2.0).abs() <= 1e-12);
}

#[test]
fn incompatible_units_leave_state_unchanged() {
    let mut state = RangeState::from_bounds(0.0, 1.0, Unit::Meters).expect("valid state");
    let events = record(&mut state);

    let result = state.set_range(Range::new(0.0, 5.0, Unit::Seconds).expect("valid range"));

    assert_eq!(
        result,
        Err(AxisError::IncompatibleUnits {
            from: Unit::Seconds,
            to: Unit::Meters
        })
    );
    assert_eq!(state.range(), Range::new(0.0, 1.0, Unit::Meters).expect("valid"));
    assert!(events.borrow().is_empty());
}

#[test]
fn set_bounds_reorders_values() {
    let mut state = state(0.0, 1.0);
    state.set_bounds(value(9.0), value(3.0)).expect("set bounds");
    assert_eq!(state.range(), range(3.0, 9.0));
}

#[test]
fn inconsistent_minimum_is_held_without_notification() {
    let mut state = state(0.0, 10.0);
    let events = record(&mut state);

    state.set_minimum(value(20.0)).expect("proposal accepted");

    assert!(events.borrow().is_empty());
    assert_eq!(state.range(), range(0.0, 10.0));
    assert_eq!(state.pending_minimum(), Some(value(20.0)));
    assert!(!state.can_undo());
}

#[test]
fn pending_minimum_commits_with_its_counterpart() {
    let mut state = state(0.0, 10.0);
    let events = record(&mut state);

    state.set_minimum(value(20.0)).expect("proposal accepted");
    state.set_maximum(value(30.0)).expect("counterpart accepted");

    assert_eq!(state.range(), range(20.0, 30.0));
    assert_eq!(state.pending_minimum(), None);
    assert_eq!(state.pending_maximum(), None);
    assert_eq!(
        *events.borrow(),
        vec![
            RangeEvent::MinimumChanged {
                old: 0.0,
                new: 20.0
            },
            RangeEvent::MaximumChanged {
                old: 10.0,
                new: 30.0
            },
            RangeEvent::Updated {
                range: range(20.0, 30.0),
                log: false
            },
        ]
    );
    assert_eq!(state.history(), vec![range(0.0, 10.0)]);
}

#[test]
fn consistent_bound_commits_immediately() {
    let mut state = state(0.0, 10.0);
    state.set_maximum(value(4.0)).expect("set maximum");
    assert_eq!(state.range(), range(0.0, 4.0));
}

#[test]
fn set_range_discards_pending_bounds() {
    let mut state = state(0.0, 10.0);
    state.set_minimum(value(50.0)).expect("proposal accepted");
    state.set_range(range(1.0, 2.0)).expect("set range");

    assert_eq!(state.pending_minimum(), None);
    state.set_maximum(value(60.0)).expect("set maximum");
    assert_eq!(state.range(), range(1.0, 60.0));
}

#[test]
fn lock_collapses_bound_updates_into_one_history_entry() {
    let mut state = state(0.0, 10.0);
    let events = record(&mut state);

    {
        let mut guard = state.mutator_lock();
        guard.set_minimum(value(20.0)).expect("min");
        guard.set_maximum(value(30.0)).expect("max");
        assert!(guard.is_adjusting());
    }

    assert!(!state.is_adjusting());
    assert_eq!(state.range(), range(20.0, 30.0));
    assert_eq!(state.history(), vec![range(0.0, 10.0)]);
    assert_eq!(
        *events.borrow(),
        vec![RangeEvent::Updated {
            range: range(20.0, 30.0),
            log: false
        }]
    );
}

#[test]
fn lock_without_net_change_records_nothing() {
    let mut state = state(0.0, 10.0);
    let events = record(&mut state);

    let mut guard = state.mutator_lock();
    guard.set_range(range(3.0, 4.0)).expect("set range");
    guard.set_range(range(0.0, 10.0)).expect("restore");
    guard.release();

    assert!(!state.can_undo());
    assert!(events.borrow().is_empty());
}

#[test]
fn nested_lock_is_ignored() {
    let mut state = state(0.0, 10.0);
    let mut outer = state.mutator_lock();
    {
        let mut inner = outer.mutator_lock();
        inner.set_range(range(1.0, 2.0)).expect("set range");
    }
    assert!(outer.is_adjusting());
    outer.release();

    assert!(!state.is_adjusting());
    assert_eq!(state.history().len(), 1);
}

fn failing_update(state: &mut RangeState) -> AxisResult<()> {
    let mut guard = state.mutator_lock();
    guard.set_minimum(value(1.0))?;
    guard.set_maximum(Value::new(5.0, Unit::Seconds))?;
    Ok(())
}

#[test]
fn lock_is_released_on_error_path() {
    let mut state = state(0.0, 10.0);

    let result = failing_update(&mut state);

    assert!(matches!(result, Err(AxisError::IncompatibleUnits { .. })));
    assert!(!state.is_adjusting());
    assert_eq!(state.range(), range(1.0, 10.0));
    assert_eq!(state.history(), vec![range(0.0, 10.0)]);
}

#[test]
fn history_is_capped_and_most_recent_first() {
    let mut state = state(0.0, 1.0);
    for step in 1..=15 {
        let step = f64::from(step);
        state.set_range(range(step, step + 1.0)).expect("set range");
    }

    let history = state.history();
    assert_eq!(history.len(), 10);
    assert_eq!(history[0], range(14.0, 15.0));
    assert_eq!(history[9], range(5.0, 6.0));
}

#[test]
fn undo_then_redo_restores_range() {
    let mut state = state(0.0, 1.0);
    state.set_range(range(0.0, 2.0)).expect("first");
    state.set_range(range(0.0, 3.0)).expect("second");

    assert!(state.undo());
    assert_eq!(state.range(), range(0.0, 2.0));
    assert!(state.can_redo());

    assert!(state.redo());
    assert_eq!(state.range(), range(0.0, 3.0));
    assert!(!state.can_redo());
}

#[test]
fn new_change_clears_redo() {
    let mut state = state(0.0, 1.0);
    state.set_range(range(0.0, 2.0)).expect("first");
    assert!(state.undo());
    state.set_range(range(0.0, 5.0)).expect("branch");

    assert!(!state.can_redo());
    assert!(!state.redo());
}

#[test]
fn undo_on_empty_history_is_false() {
    let mut state = state(0.0, 1.0);
    assert!(!state.undo());
    assert!(!state.redo());
}

#[test]
fn log_mode_substitutes_non_positive_bounds() {
    let mut state = state(-5.0, -1.0);
    let events = record(&mut state);

    state.set_log(true);

    assert!(state.is_log());
    assert_eq!(state.range(), range(0.1, 100.0));
    assert_eq!(
        *events.borrow(),
        vec![
            RangeEvent::MaximumChanged {
                old: -1.0,
                new: 100.0
            },
            RangeEvent::MinimumChanged {
                old: -5.0,
                new: 0.1
            },
            RangeEvent::LogChanged { log: true },
            RangeEvent::Updated {
                range: range(0.1, 100.0),
                log: true
            },
        ]
    );
    let (low, high) = state.transformed_bounds();
    assert!((low + 1.0).abs() <= 1e-12);
    assert!((high - 2.0).abs() <= 1e-12);
}

#[test]
fn log_toggle_clears_history_and_restores_positive_range() {
    let mut state = state(1.0, 50.0);
    state.set_range(range(2.0, 50.0)).expect("set range");
    assert!(state.can_undo());

    state.set_log(true);
    assert!(!state.can_undo());
    state.set_log(false);

    assert_eq!(state.range(), range(2.0, 50.0));
    assert_eq!(state.transformed_bounds(), (2.0, 50.0));
}

#[test]
fn log_mode_rejects_non_positive_bounds() {
    let mut state = state(1.0, 10.0);
    state.set_log(true);

    assert!(matches!(
        state.set_range(range(-1.0, 10.0)),
        Err(AxisError::InvalidData(_))
    ));
    assert!(state.set_minimum(value(0.0)).is_err());
    assert_eq!(state.range(), range(1.0, 10.0));
}

#[test]
fn favorites_are_deduplicated_and_applied() {
    let mut state = state(0.0, 10.0);
    assert!(state.add_to_favorites());
    assert!(!state.add_to_favorites());

    state.set_range(range(5.0, 6.0)).expect("set range");
    state.apply_favorite(0).expect("apply favorite");
    assert_eq!(state.range(), range(0.0, 10.0));

    assert!(state.apply_favorite(3).is_err());
    assert!(state.remove_favorite(&range(0.0, 10.0)));
    assert!(state.favorites().is_empty());
}

#[test]
fn unsubscribed_observer_stops_receiving() {
    let mut state = state(0.0, 10.0);
    let events = Rc::new(RefCell::new(0usize));
    let sink = Rc::clone(&events);
    let id = state.subscribe(move |_: &RangeEvent| *sink.borrow_mut() += 1);

    state.set_range(range(0.0, 5.0)).expect("set range");
    let seen = *events.borrow();
    assert!(state.unsubscribe(id));
    state.set_range(range(0.0, 6.0)).expect("set range");

    assert_eq!(*events.borrow(), seen);
    assert!(!state.unsubscribe(id));
}

#[test]
fn pan_and_zoom_go_through_history() {
    let mut state = state(0.0, 10.0);

    state.pan_by_fraction(0.5).expect("pan");
    assert_eq!(state.range(), range(5.0, 15.0));

    state.zoom_by_factor(2.0, 0.5).expect("zoom");
    assert_eq!(state.range(), range(7.5, 12.5));

    assert_eq!(state.history(), vec![range(5.0, 15.0), range(0.0, 10.0)]);
    assert!(state.zoom_by_factor(0.0, 0.5).is_err());
}

#[test]
fn log_zoom_operates_on_decades() {
    let mut state = state(1.0, 10_000.0);
    state.set_log(true);

    state.zoom_by_factor(2.0, 0.5).expect("zoom");

    assert!((state.range().min() - 10.0).abs() <= 1e-9);
    assert!((state.range().max() - 1_000.0).abs() <= 1e-9);
}

#[test]
fn history_limit_is_configurable() {
    let mut state = RangeState::with_config(range(0.0, 1.0), RangeStateConfig { history_limit: 3 });
    for step in 2..8 {
        state.set_range(range(0.0, f64::from(step))).expect("set range");
    }
    assert_eq!(state.history().len(), 3);
}
