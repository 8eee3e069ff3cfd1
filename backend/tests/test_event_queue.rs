//! Tests for EventQueue
//!
//! Wake-ups come out in (due time, insertion order) order and the clock
//! only moves when one is popped.

use terminal_simulator_core_rs::{ClockError, EventQueue, SimTime};

fn t(value: f64) -> SimTime {
    SimTime::new(value).unwrap()
}

#[test]
fn test_new_queue_is_empty_at_zero() {
    let queue: EventQueue<&str> = EventQueue::new();
    assert_eq!(queue.now(), SimTime::ZERO);
    assert!(queue.is_empty());
    assert_eq!(queue.peek_due(), None);
}

#[test]
fn test_pops_in_due_order() {
    let mut queue = EventQueue::new();
    queue.schedule_after(5.0, "late").unwrap();
    queue.schedule_after(1.0, "early").unwrap();
    queue.schedule_after(3.0, "middle").unwrap();

    let order: Vec<&str> = std::iter::from_fn(|| queue.pop_next())
        .map(|w| w.continuation)
        .collect();
    assert_eq!(order, vec!["early", "middle", "late"]);
}

#[test]
fn test_ties_break_by_insertion_order() {
    let mut queue = EventQueue::new();
    for name in ["a", "b", "c", "d"] {
        queue.schedule_after(2.0, name).unwrap();
    }

    let order: Vec<&str> = std::iter::from_fn(|| queue.pop_next())
        .map(|w| w.continuation)
        .collect();
    assert_eq!(order, vec!["a", "b", "c", "d"]);
}

#[test]
fn test_clock_moves_only_on_pop() {
    let mut queue = EventQueue::new();
    queue.schedule_after(4.0, 1).unwrap();
    assert_eq!(queue.now(), SimTime::ZERO);
    assert_eq!(queue.peek_due(), Some(t(4.0)));

    let wakeup = queue.pop_next().unwrap();
    assert_eq!(wakeup.due, t(4.0));
    assert_eq!(queue.now(), t(4.0));
}

#[test]
fn test_delays_are_relative_to_now() {
    let mut queue = EventQueue::new();
    queue.schedule_after(10.0, "first").unwrap();
    queue.pop_next();

    let handle = queue.schedule_after(2.5, "second").unwrap();
    assert_eq!(handle.due, t(12.5));
}

#[test]
fn test_zero_delay_fires_at_current_instant() {
    let mut queue = EventQueue::new();
    queue.schedule_after(3.0, "x").unwrap();
    queue.pop_next();

    let handle = queue.schedule_now("y");
    assert_eq!(handle.due, t(3.0));
    assert_eq!(queue.pop_next().unwrap().due, t(3.0));
    assert_eq!(queue.now(), t(3.0));
}

#[test]
fn test_negative_delay_rejected() {
    let mut queue = EventQueue::new();
    assert_eq!(
        queue.schedule_after(-1.0, ()).unwrap_err(),
        ClockError::InvalidDelay(-1.0)
    );
    assert!(queue.is_empty());
}

#[test]
fn test_nan_delay_rejected() {
    let mut queue = EventQueue::new();
    assert!(matches!(
        queue.schedule_after(f64::NAN, ()),
        Err(ClockError::InvalidDelay(_))
    ));
}

#[test]
fn test_handles_are_unique() {
    let mut queue = EventQueue::new();
    let a = queue.schedule_after(1.0, ()).unwrap();
    let b = queue.schedule_after(1.0, ()).unwrap();
    assert_ne!(a, b);
    assert_eq!(a.due, b.due);
}

#[test]
fn test_len_tracks_pending() {
    let mut queue = EventQueue::new();
    queue.schedule_now(1);
    queue.schedule_after(1.0, 2).unwrap();
    assert_eq!(queue.len(), 2);

    queue.pop_next();
    assert_eq!(queue.len(), 1);
}
