//! Argument parsing helpers.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use fctasks::{FlightTask, SerialRxProvider};
use serde::de::DeserializeOwned;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RxProtocol {
    Spektrum1024,
    Spektrum2048,
    Sbus,
    Sumd,
    Sumh,
    Xbus,
    XbusRj01,
    Ibus,
    Jetiexbus,
    Crsf,
    Srxl,
    Fport,
}

impl From<RxProtocol> for SerialRxProvider {
    fn from(protocol: RxProtocol) -> Self {
        match protocol {
            RxProtocol::Spektrum1024 => Self::Spektrum1024,
            RxProtocol::Spektrum2048 => Self::Spektrum2048,
            RxProtocol::Sbus => Self::Sbus,
            RxProtocol::Sumd => Self::Sumd,
            RxProtocol::Sumh => Self::Sumh,
            RxProtocol::Xbus => Self::XbusModeB,
            RxProtocol::XbusRj01 => Self::XbusModeBRj01,
            RxProtocol::Ibus => Self::Ibus,
            RxProtocol::Jetiexbus => Self::Jetiexbus,
            RxProtocol::Crsf => Self::Crsf,
            RxProtocol::Srxl => Self::Srxl,
            RxProtocol::Fport => Self::Fport,
        }
    }
}

/// Looks a task up by its label, ignoring case and `-`/`_` differences.
pub fn parse_task(name: &str) -> Result<FlightTask> {
    let wanted = name.trim().replace('-', "_").to_ascii_uppercase();
    FlightTask::ALL
        .into_iter()
        .find(|task| task.label() == wanted)
        .ok_or_else(|| anyhow!("unknown task `{name}`"))
}

/// Parses `TASK=US`, e.g. `osd=150`.
pub fn parse_cost(arg: &str) -> Result<(FlightTask, u32)> {
    let (task, cost) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("expected TASK=US, got `{arg}`"))?;
    let task = parse_task(task)?;
    let cost = cost
        .trim()
        .parse()
        .with_context(|| format!("invalid cost for {task}"))?;
    Ok((task, cost))
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}
