use crate::platform::{Clock, Ticker};
use gloo_timers::callback::Interval;
use std::rc::Rc;

/// Persistence timer over `setInterval`
///
/// The interval is cancelled when dropped, so `stop` just lets it go.
pub struct WebTicker {
    on_tick: Rc<dyn Fn()>,
    interval: Option<Interval>,
}

impl WebTicker {
    pub fn new(on_tick: impl Fn() + 'static) -> Self {
        Self {
            on_tick: Rc::new(on_tick),
            interval: None,
        }
    }
}

impl Ticker for WebTicker {
    fn start(&mut self, period_ms: u64) {
        let on_tick = Rc::clone(&self.on_tick);
        let period = u32::try_from(period_ms).unwrap_or(u32::MAX);
        self.interval = Some(Interval::new(period, move || on_tick()));
    }

    fn stop(&mut self) {
        self.interval = None;
    }

    fn is_running(&self) -> bool {
        self.interval.is_some()
    }
}

/// `Date.now()`
#[derive(Debug, Default, Clone, Copy)]
pub struct JsClock;

impl Clock for JsClock {
    fn now_ms(&self) -> u64 {
        js_sys::Date::now() as u64
    }
}
