//! Task bodies whose scheduling depends on what their hardware reports.
//!
//! The drivers behind them are out of scope; each adapter talks to its driver
//! through a small trait and turns the answer into a [`TaskContext`] request.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use fcsched::{cmp_time_us, CheckFn, TaskBody, TaskContext, TimeDelta, TimeUs};

/// Barometer driver state machine.
pub trait BaroDriver {
    /// Advances the conversion and returns the microseconds until the next
    /// step is due, or 0 to keep the current period.
    fn update(&mut self, now: TimeUs) -> u32;
}

/// Runs the barometer and follows the conversion timing it asks for.
pub struct BaroTask<D> {
    driver: D,
}

impl<D: BaroDriver> BaroTask<D> {
    pub fn new(driver: D) -> Self {
        Self { driver }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }
}

impl<D: BaroDriver> TaskBody for BaroTask<D> {
    fn run(&mut self, ctx: &mut TaskContext) {
        let next = self.driver.update(ctx.now());
        if next != 0 {
            ctx.reschedule(next);
        }
    }
}

pub const RX_REFRESH_RATE_MIN_US: u32 = 1_000;
pub const RX_REFRESH_RATE_MAX_US: u32 = 30_000;

/// Set by the receiver driver when a complete frame is waiting.
#[derive(Debug, Clone, Default)]
pub struct RxFrameSignal {
    pending: Arc<AtomicBool>,
}

impl RxFrameSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&self) {
        self.pending.store(true, Ordering::Release);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }
}

/// Check predicate for the RX task: ready once a frame has arrived.
#[derive(Debug, Clone)]
pub struct RxUpdateCheck {
    signal: RxFrameSignal,
}

impl RxUpdateCheck {
    pub fn new(signal: RxFrameSignal) -> Self {
        Self { signal }
    }
}

impl CheckFn for RxUpdateCheck {
    fn check(&mut self, _now: TimeUs, _elapsed_since_check: TimeDelta) -> bool {
        self.signal.take()
    }
}

/// Receiver frame processing.
pub trait RxReceiver {
    /// Decodes pending input; false when no new channel data came out of it.
    fn process(&mut self, now: TimeUs) -> bool;

    /// Interval between the last two frames, when the protocol reports it.
    fn frame_delta_us(&self) -> Option<TimeDelta> {
        None
    }

    /// Called after a frame produced new channel data.
    fn on_new_data(&mut self, _refresh_rate_us: u32) {}
}

/// Measured RX refresh rate, readable from other tasks.
#[derive(Debug, Clone, Default)]
pub struct RxRefreshRate {
    rate_us: Arc<AtomicU32>,
}

impl RxRefreshRate {
    pub fn get(&self) -> u32 {
        self.rate_us.load(Ordering::Relaxed)
    }

    fn set(&self, rate_us: u32) {
        self.rate_us.store(rate_us, Ordering::Relaxed);
    }
}

pub struct RxTask<R> {
    receiver: R,
    last_rx_at: TimeUs,
    refresh_rate: RxRefreshRate,
}

impl<R: RxReceiver> RxTask<R> {
    pub fn new(receiver: R) -> Self {
        Self {
            receiver,
            last_rx_at: 0,
            refresh_rate: RxRefreshRate::default(),
        }
    }

    pub fn refresh_rate(&self) -> RxRefreshRate {
        self.refresh_rate.clone()
    }

    pub fn receiver(&self) -> &R {
        &self.receiver
    }
}

impl<R: RxReceiver> TaskBody for RxTask<R> {
    fn run(&mut self, ctx: &mut TaskContext) {
        let now = ctx.now();
        if !self.receiver.process(now) {
            return;
        }

        let delta = self
            .receiver
            .frame_delta_us()
            .unwrap_or_else(|| cmp_time_us(now, self.last_rx_at));
        self.last_rx_at = now;

        let rate = delta.clamp(RX_REFRESH_RATE_MIN_US as TimeDelta, RX_REFRESH_RATE_MAX_US as TimeDelta) as u32;
        self.refresh_rate.set(rate);
        self.receiver.on_new_data(rate);
    }
}

/// The control loop run by the guaranteed task.
pub trait ControlLoop {
    fn run(&mut self, now: TimeUs);

    /// Interval the gyro is actually sampling at, once known.
    fn measured_interval_us(&self) -> Option<u32> {
        None
    }
}

/// Guaranteed gyro/PID task.
///
/// When the gyro's measured sample interval drifts from the configured loop
/// time, the next deadline follows the measurement for one pass so the loop
/// stays locked to the sensor.
pub struct GyroPidTask<L> {
    control: L,
}

impl<L: ControlLoop> GyroPidTask<L> {
    pub fn new(control: L) -> Self {
        Self { control }
    }

    pub fn control(&self) -> &L {
        &self.control
    }
}

impl<L: ControlLoop> TaskBody for GyroPidTask<L> {
    fn run(&mut self, ctx: &mut TaskContext) {
        self.control.run(ctx.now());
        if let Some(measured) = self.control.measured_interval_us() {
            if measured != ctx.desired_period_us() {
                ctx.override_next_period(measured);
            }
        }
    }
}
