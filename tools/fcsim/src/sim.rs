//! Simulated flight controller: the full task table with synthetic bodies
//! driven by a manual clock.

use std::collections::BTreeMap;

use fcsched::{
    cmp_time_us, ManualClock, PassReport, Scheduler, SchedulerConfig, TaskContext, TimeUs,
    TraceHook,
};
use fctasks::{
    build_flight_scheduler, BaroDriver, BaroTask, BuildCapabilities, ControlLoop, FeatureSnapshot,
    FlightTask, GyroPidTask, InitError, RxFrameSignal, RxReceiver, RxTask, RxUpdateCheck,
    TaskBindings,
};
use log::debug;

/// Pass spacing used when there is no gyro to pace the loop.
const FALLBACK_LOOPTIME_US: u32 = 1_000;

/// Execution time charged to a task body when none is configured.
pub fn default_cost_us(task: FlightTask) -> u32 {
    match task {
        FlightTask::GyroPid => 45,
        FlightTask::Rx => 30,
        FlightTask::Serial => 20,
        FlightTask::Osd | FlightTask::Cms => 120,
        FlightTask::Gps | FlightTask::Telemetry => 40,
        FlightTask::Accel | FlightTask::Attitude => 25,
        FlightTask::Baro | FlightTask::Compass => 30,
        FlightTask::LedStrip => 60,
        _ => 10,
    }
}

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub passes: u32,
    /// Per-task execution time overrides.
    pub costs: BTreeMap<FlightTask, u32>,
    /// Interval between receiver frames; `None` leaves RX on its fallback timer.
    pub rx_frame_interval_us: Option<u32>,
    /// Gyro sample interval reported by the control loop.
    pub gyro_measured_us: Option<u32>,
    /// Alternating conversion times the simulated barometer asks for.
    pub baro_steps_us: [u32; 2],
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            passes: 10_000,
            costs: BTreeMap::new(),
            rx_frame_interval_us: Some(6_667),
            gyro_measured_us: None,
            baro_steps_us: [5_000, 26_000],
        }
    }
}

impl SimConfig {
    pub fn cost_us(&self, task: FlightTask) -> u32 {
        self.costs
            .get(&task)
            .copied()
            .unwrap_or_else(|| default_cost_us(task))
    }
}

struct SimControl {
    clock: ManualClock,
    cost_us: u32,
    measured_us: Option<u32>,
}

impl ControlLoop for SimControl {
    fn run(&mut self, _now: TimeUs) {
        self.clock.advance(self.cost_us);
    }

    fn measured_interval_us(&self) -> Option<u32> {
        self.measured_us
    }
}

struct SimReceiver {
    clock: ManualClock,
    cost_us: u32,
}

impl RxReceiver for SimReceiver {
    fn process(&mut self, _now: TimeUs) -> bool {
        self.clock.advance(self.cost_us);
        true
    }
}

struct SimBaro {
    clock: ManualClock,
    cost_us: u32,
    steps_us: [u32; 2],
    next: usize,
}

impl BaroDriver for SimBaro {
    fn update(&mut self, _now: TimeUs) -> u32 {
        self.clock.advance(self.cost_us);
        let step = self.steps_us[self.next];
        self.next = (self.next + 1) % self.steps_us.len();
        step
    }
}

pub struct Simulation {
    scheduler: Scheduler<ManualClock>,
    clock: ManualClock,
    config: SimConfig,
    looptime_us: u32,
    rx_signal: RxFrameSignal,
    next_rx_frame: TimeUs,
    passes_run: u32,
}

impl Simulation {
    pub fn new(
        config: SimConfig,
        scheduler_config: SchedulerConfig,
        capabilities: &BuildCapabilities,
        snapshot: &FeatureSnapshot,
        trace: Option<TraceHook>,
    ) -> Result<Self, InitError> {
        let clock = ManualClock::new(0);
        let rx_signal = RxFrameSignal::new();
        let bindings = bind_tasks(&config, capabilities, &clock, &rx_signal);

        let scheduler = build_flight_scheduler(
            scheduler_config,
            capabilities,
            snapshot,
            bindings,
            trace,
            clock.clone(),
        )?;

        let looptime_us = if snapshot.sensors.gyro {
            snapshot.gyro_target_looptime_us
        } else {
            FALLBACK_LOOPTIME_US
        };

        Ok(Self {
            next_rx_frame: config.rx_frame_interval_us.unwrap_or(0),
            scheduler,
            clock,
            config,
            looptime_us,
            rx_signal,
            passes_run: 0,
        })
    }

    /// Runs one pass at the next gyro tick, or straight away when the
    /// previous pass ran past it.
    pub fn step(&mut self) -> PassReport {
        let tick = self.passes_run.wrapping_mul(self.looptime_us);
        if cmp_time_us(tick, self.clock.now()) > 0 {
            self.clock.set(tick);
        }
        self.deliver_rx_frame();
        self.passes_run = self.passes_run.wrapping_add(1);
        self.scheduler.run_pass()
    }

    pub fn run(&mut self) {
        let passes = self.config.passes;
        let mut overruns = 0u32;
        for _ in 0..passes {
            if self.step().overrun {
                overruns += 1;
            }
        }
        debug!(
            "simulated {} passes up to {}us, {} overruns",
            passes,
            self.clock.now(),
            overruns
        );
    }

    fn deliver_rx_frame(&mut self) {
        let Some(interval) = self.config.rx_frame_interval_us else {
            return;
        };
        let now = self.clock.now();
        if cmp_time_us(now, self.next_rx_frame) < 0 {
            return;
        }
        self.rx_signal.notify();
        self.next_rx_frame = self.next_rx_frame.wrapping_add(interval);
        if cmp_time_us(now, self.next_rx_frame) >= 0 {
            self.next_rx_frame = now.wrapping_add(interval);
        }
    }

    pub fn scheduler(&self) -> &Scheduler<ManualClock> {
        &self.scheduler
    }

    pub fn elapsed_us(&self) -> TimeUs {
        self.clock.now()
    }

    pub fn passes_run(&self) -> u32 {
        self.passes_run
    }
}

fn bind_tasks(
    config: &SimConfig,
    capabilities: &BuildCapabilities,
    clock: &ManualClock,
    rx_signal: &RxFrameSignal,
) -> TaskBindings {
    let mut bindings = TaskBindings::new();
    for task in capabilities.tasks() {
        let cost_us = config.cost_us(task);
        let clock = clock.clone();
        bindings = match task {
            FlightTask::GyroPid => bindings.body(
                task,
                GyroPidTask::new(SimControl {
                    clock,
                    cost_us,
                    measured_us: config.gyro_measured_us,
                }),
            ),
            FlightTask::Rx => bindings
                .body(task, RxTask::new(SimReceiver { clock, cost_us }))
                .check(task, RxUpdateCheck::new(rx_signal.clone())),
            FlightTask::Baro => bindings.body(
                task,
                BaroTask::new(SimBaro {
                    clock,
                    cost_us,
                    steps_us: config.baro_steps_us,
                    next: 0,
                }),
            ),
            _ => bindings.body(task, move |_ctx: &mut TaskContext| clock.advance(cost_us)),
        };
    }
    bindings
}
