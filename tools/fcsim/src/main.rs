use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser};
use fcsched::SchedulerConfig;
use fcsim::cli::{self, RxProtocol};
use fcsim::{logger, Report, SimConfig, Simulation, TraceCapture};
use fctasks::{BuildCapabilities, FeatureSnapshot, FlightTask};

#[derive(Parser, Debug)]
#[command(author, version, about = "Simulate the flight controller task scheduler")]
struct Opts {
    /// Number of scheduler passes to run.
    #[arg(long, default_value_t = 10_000)]
    passes: u32,

    /// Feature snapshot as JSON; flags below are applied on top.
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Build capabilities as JSON.
    #[arg(long, value_name = "FILE")]
    capabilities: Option<PathBuf>,

    #[arg(long, value_enum)]
    rx: Option<RxProtocol>,

    #[arg(long)]
    telemetry: bool,

    #[arg(long)]
    acc: bool,

    #[arg(long)]
    baro: bool,

    #[arg(long)]
    mag: bool,

    #[arg(long)]
    gps: bool,

    #[arg(long)]
    osd: bool,

    /// Gyro loop time in microseconds.
    #[arg(long, value_name = "US")]
    looptime: Option<u32>,

    /// Interval between receiver frames; 0 leaves RX on its fallback timer.
    #[arg(long = "rx-frame-us", value_name = "US", default_value_t = 6_667)]
    rx_frame_us: u32,

    /// Gyro sample interval reported by the control loop.
    #[arg(long = "gyro-measured-us", value_name = "US")]
    gyro_measured_us: Option<u32>,

    /// Execution time of a task body, e.g. `--cost osd=150`. Repeatable.
    #[arg(long = "cost", value_name = "TASK=US", value_parser = parse_cost)]
    costs: Vec<(FlightTask, u32)>,

    /// Let background tasks run even when they would delay the gyro loop.
    #[arg(long)]
    no_budget: bool,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,

    /// Include disabled tasks in the listing.
    #[arg(long)]
    all: bool,

    /// Print the last N trace records.
    #[arg(long, value_name = "N")]
    trace: Option<usize>,

    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn parse_cost(arg: &str) -> Result<(FlightTask, u32), String> {
    cli::parse_cost(arg).map_err(|err| format!("{err:#}"))
}

impl Opts {
    fn snapshot(&self) -> Result<FeatureSnapshot> {
        let mut snapshot: FeatureSnapshot = match &self.snapshot {
            Some(path) => cli::load_json(path)?,
            None => FeatureSnapshot::default(),
        };

        if let Some(protocol) = self.rx {
            snapshot.serial_rx_provider = Some(protocol.into());
        }
        if let Some(looptime) = self.looptime {
            snapshot.gyro_target_looptime_us = looptime;
        }
        snapshot.features.telemetry |= self.telemetry;
        snapshot.features.gps |= self.gps;
        snapshot.features.osd |= self.osd;
        snapshot.osd_initialized |= self.osd;
        snapshot.sensors.acc |= self.acc;
        snapshot.sensors.baro |= self.baro;
        snapshot.sensors.mag |= self.mag;
        Ok(snapshot)
    }

    fn capabilities(&self) -> Result<BuildCapabilities> {
        match &self.capabilities {
            Some(path) => cli::load_json(path),
            None => Ok(BuildCapabilities::default()),
        }
    }

    fn sim_config(&self) -> SimConfig {
        SimConfig {
            passes: self.passes,
            costs: self.costs.iter().copied().collect::<BTreeMap<_, _>>(),
            rx_frame_interval_us: (self.rx_frame_us > 0).then_some(self.rx_frame_us),
            gyro_measured_us: self.gyro_measured_us,
            ..SimConfig::default()
        }
    }
}

fn main() -> Result<()> {
    let opts = Opts::parse();
    logger::init(logger::level_for(opts.verbose)).map_err(|err| anyhow!("logger: {err}"))?;

    let snapshot = opts.snapshot()?;
    let capabilities = opts.capabilities()?;
    let scheduler_config = SchedulerConfig::builder()
        .name("FCSIM")
        .enforce_budget(!opts.no_budget)
        .build();

    let capture = TraceCapture::new();
    let trace = opts.trace.map(|_| capture.hook());

    let mut sim = Simulation::new(
        opts.sim_config(),
        scheduler_config,
        &capabilities,
        &snapshot,
        trace,
    )
    .context("building the task table")?;
    sim.run();

    let report = Report::capture(sim.scheduler(), sim.elapsed_us(), opts.all);
    if opts.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.to_text());
    }

    if let Some(limit) = opts.trace {
        let records = capture.records();
        for record in records.iter().skip(records.len().saturating_sub(limit)) {
            println!("{record}");
        }
    }

    Ok(())
}
