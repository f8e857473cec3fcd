//! Cooperative single-threaded frame loop.
//!
//! The platform calls [`FrameScheduler::on_refresh`] once per display refresh
//! (requestAnimationFrame, a winit redraw, or a test loop with synthetic
//! timestamps). Each call first drains callbacks posted since the last
//! refresh, then runs at most one tick. Nothing here ever runs two ticks at
//! once or runs a callback in the middle of a tick, so ticks and callbacks
//! can share `Rc<RefCell<_>>` state without further synchronization.

use crate::clock::{Clock, FrameTime};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

type TickFn = Box<dyn FnMut(FrameTime)>;
type Deferred = Box<dyn FnOnce()>;

#[derive(Default)]
struct RunState {
    running: Cell<bool>,
    generation: Cell<u64>,
}

/// Stops the run it was returned from. Stopping never interrupts a tick that
/// is already executing; it only prevents the next one.
#[derive(Clone)]
pub struct FrameHandle {
    state: Rc<RunState>,
    generation: u64,
}

impl FrameHandle {
    pub fn stop(&self) {
        if self.state.generation.get() == self.generation && self.state.running.replace(false) {
            log::info!("[frame] loop stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.generation.get() == self.generation && self.state.running.get()
    }
}

#[derive(Default)]
pub struct FrameScheduler {
    clock: RefCell<Clock>,
    tick: RefCell<Option<TickFn>>,
    idle: RefCell<VecDeque<Deferred>>,
    state: Rc<RunState>,
    busy: Cell<bool>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `tick` and start invoking it on every refresh. Replaces any
    /// previous run; handles from that run become inert.
    pub fn run(&self, tick: impl FnMut(FrameTime) + 'static) -> FrameHandle {
        *self.tick.borrow_mut() = Some(Box::new(tick));
        let generation = self.state.generation.get() + 1;
        self.state.generation.set(generation);
        self.state.running.set(true);
        log::info!("[frame] loop started");
        FrameHandle {
            state: self.state.clone(),
            generation,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.running.get()
    }

    /// Queue `f` for the next idle slot between ticks.
    pub fn post(&self, f: impl FnOnce() + 'static) {
        self.idle.borrow_mut().push_back(Box::new(f));
    }

    pub fn pending(&self) -> usize {
        self.idle.borrow().len()
    }

    pub fn frames(&self) -> u64 {
        self.clock.borrow().frames()
    }

    /// One display refresh at absolute time `now_sec`. Returns whether the
    /// loop wants another refresh.
    pub fn on_refresh(&self, now_sec: f64) -> bool {
        self.refresh_with(|clock| clock.advance_to(now_sec))
    }

    /// One refresh `dt_sec` after the previous one.
    pub fn on_refresh_after(&self, dt_sec: f64) -> bool {
        self.refresh_with(|clock| clock.advance_by(dt_sec))
    }

    fn refresh_with(&self, advance: impl FnOnce(&mut Clock) -> FrameTime) -> bool {
        if self.busy.get() {
            log::debug!("[frame] re-entrant refresh ignored");
            return self.is_running();
        }
        self.busy.set(true);
        self.drain_idle();
        let tick = if self.is_running() {
            self.tick.borrow_mut().take()
        } else {
            None
        };
        let Some(mut tick) = tick else {
            self.busy.set(false);
            return false;
        };
        let ft = advance(&mut *self.clock.borrow_mut());
        tick(ft);
        self.busy.set(false);

        // `run` may have installed a new tick from inside this one.
        let mut slot = self.tick.borrow_mut();
        if slot.is_none() {
            *slot = Some(tick);
        }
        self.is_running()
    }

    fn drain_idle(&self) {
        let batch = std::mem::take(&mut *self.idle.borrow_mut());
        for f in batch {
            f();
        }
    }
}
