// Host-side tests for the frame loop, driven with synthetic timestamps.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use storm_core::{Clock, FrameScheduler, FrameTime};

#[test]
fn first_tick_has_zero_delta() {
    let mut clock = Clock::new();
    let ft = clock.advance_to(12.5);
    assert_eq!(ft, FrameTime { elapsed: 0.0, delta: 0.0, frame: 0 });
    let ft = clock.advance_to(12.75);
    assert_eq!(ft.elapsed, 0.25);
    assert_eq!(ft.delta, 0.25);
    assert_eq!(ft.frame, 1);
}

#[test]
fn backwards_timestamps_do_not_rewind() {
    let mut clock = Clock::new();
    clock.advance_to(1.0);
    clock.advance_to(2.0);
    let ft = clock.advance_to(1.5);
    assert_eq!(ft.elapsed, 1.0);
    assert_eq!(ft.delta, 0.0);
    assert_eq!(clock.frames(), 3);
}

#[test]
fn fixed_steps_accumulate() {
    let mut clock = Clock::new();
    let mut last = FrameTime::default();
    for _ in 0..5 {
        last = clock.advance_by(0.5);
    }
    assert_eq!(last.elapsed, 2.0);
    assert_eq!(last.delta, 0.5);
    assert_eq!(last.frame, 4);
    assert_eq!(clock.elapsed(), 2.0);
}

#[test]
fn ticks_run_once_per_refresh_with_synthetic_time() {
    let sched = FrameScheduler::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = seen.clone();
    let _handle = sched.run(move |ft| log.borrow_mut().push(ft));

    for i in 0..4 {
        assert!(sched.on_refresh(100.0 + i as f64 * 0.25));
    }
    let seen = seen.borrow();
    assert_eq!(seen.len(), 4);
    assert_eq!(seen[0].delta, 0.0);
    assert_eq!(seen[3].elapsed, 0.75);
    assert_eq!(seen[3].frame, 3);
    assert_eq!(sched.frames(), 4);
}

#[test]
fn long_gap_produces_one_tick_not_a_catch_up() {
    let sched = FrameScheduler::new();
    let count = Rc::new(Cell::new(0));
    let c = count.clone();
    let _handle = sched.run(move |_| c.set(c.get() + 1));
    sched.on_refresh(0.0);
    sched.on_refresh(10.0);
    assert_eq!(count.get(), 2);
}

#[test]
fn stop_prevents_further_ticks() {
    let sched = FrameScheduler::new();
    let count = Rc::new(Cell::new(0));
    let c = count.clone();
    let handle = sched.run(move |_| c.set(c.get() + 1));

    sched.on_refresh_after(1.0 / 60.0);
    handle.stop();
    assert!(!handle.is_running());
    assert!(!sched.on_refresh_after(1.0 / 60.0));
    assert!(!sched.on_refresh_after(1.0 / 60.0));
    assert_eq!(count.get(), 1);
}

#[test]
fn stop_from_inside_a_tick_finishes_that_tick() {
    let sched = FrameScheduler::new();
    let handle_slot: Rc<RefCell<Option<storm_core::FrameHandle>>> = Rc::new(RefCell::new(None));
    let finished = Rc::new(Cell::new(0));

    let slot = handle_slot.clone();
    let done = finished.clone();
    let handle = sched.run(move |_| {
        if let Some(h) = slot.borrow().as_ref() {
            h.stop();
        }
        done.set(done.get() + 1);
    });
    *handle_slot.borrow_mut() = Some(handle);

    assert!(!sched.on_refresh(0.0));
    assert!(!sched.on_refresh(0.016));
    assert_eq!(finished.get(), 1);
}

#[test]
fn stale_handle_cannot_stop_a_new_run() {
    let sched = FrameScheduler::new();
    let old = sched.run(|_| {});
    old.stop();
    let new = sched.run(|_| {});
    old.stop();
    assert!(new.is_running());
    assert!(sched.on_refresh(0.0));
}

#[test]
fn posted_callbacks_run_between_ticks_in_order() {
    let sched = FrameScheduler::new();
    let events = Rc::new(RefCell::new(Vec::<String>::new()));

    let ev = events.clone();
    let _handle = sched.run(move |ft| ev.borrow_mut().push(format!("tick{}", ft.frame)));

    for name in ["click-a", "click-b"] {
        let ev = events.clone();
        sched.post(move || ev.borrow_mut().push(name.to_string()));
    }
    assert_eq!(sched.pending(), 2);
    sched.on_refresh(0.0);
    sched.on_refresh(0.016);

    assert_eq!(
        *events.borrow(),
        vec!["click-a", "click-b", "tick0", "tick1"]
    );
    assert_eq!(sched.pending(), 0);
}

#[test]
fn callbacks_posted_during_a_tick_wait_for_the_next_refresh() {
    let sched = Rc::new(FrameScheduler::new());
    let events = Rc::new(RefCell::new(Vec::<String>::new()));

    let s = sched.clone();
    let ev = events.clone();
    let _handle = sched.run(move |ft| {
        ev.borrow_mut().push(format!("tick{}", ft.frame));
        if ft.frame == 0 {
            let ev2 = ev.clone();
            s.post(move || ev2.borrow_mut().push("posted".into()));
        }
    });

    sched.on_refresh(0.0);
    assert_eq!(*events.borrow(), vec!["tick0"]);
    sched.on_refresh(0.016);
    assert_eq!(*events.borrow(), vec!["tick0", "posted", "tick1"]);
}

#[test]
fn reentrant_refresh_is_ignored() {
    let sched = Rc::new(FrameScheduler::new());
    let depth = Rc::new(Cell::new(0));
    let max_depth = Rc::new(Cell::new(0));
    let ticks = Rc::new(Cell::new(0));

    let s = sched.clone();
    let (d, m, n) = (depth.clone(), max_depth.clone(), ticks.clone());
    let _handle = sched.run(move |ft| {
        d.set(d.get() + 1);
        m.set(m.get().max(d.get()));
        n.set(n.get() + 1);
        s.on_refresh(ft.elapsed as f64 + 1.0);
        d.set(d.get() - 1);
    });

    for i in 0..3 {
        sched.on_refresh(i as f64);
    }
    assert_eq!(ticks.get(), 3);
    assert_eq!(max_depth.get(), 1);
}

#[test]
fn refresh_without_run_does_nothing() {
    let sched = FrameScheduler::new();
    let hit = Rc::new(Cell::new(false));
    let h = hit.clone();
    sched.post(move || h.set(true));
    assert!(!sched.on_refresh(0.0));
    // Posted work still drains even when no loop is installed.
    assert!(hit.get());
    assert_eq!(sched.frames(), 0);
}
