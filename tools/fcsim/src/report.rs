//! Task listing output, text or JSON.

use colored::Colorize;
use fcsched::{Clock, Scheduler, SchedulerStats, TaskInfo, TaskPriority};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Report {
    pub elapsed_us: u32,
    pub system_load_percent: u32,
    pub stats: SchedulerStats,
    pub tasks: Vec<TaskInfo>,
}

impl Report {
    pub fn capture<C: Clock>(scheduler: &Scheduler<C>, elapsed_us: u32, include_disabled: bool) -> Self {
        Self {
            elapsed_us,
            system_load_percent: scheduler.average_system_load_percent(),
            stats: scheduler.stats(),
            tasks: scheduler
                .tasks()
                .filter(|info| include_disabled || info.enabled)
                .collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Renders the listing in the layout of the flight controller's `tasks`
    /// CLI command.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{}\n",
            "Task list             rate/hz  max/us  avg/us maxload avgload  total/ms".bold()
        ));

        for task in &self.tasks {
            out.push_str(&task_line(task));
            out.push('\n');
            if let Some(check) = task.check {
                let rate = task.rate_hz();
                out.push_str(&format!(
                    "   - ({:>15}) {:6} {:7} {:7} {:>7} {:>7} {:9}\n",
                    "checkfunc",
                    "",
                    check.max_us,
                    check.average_us(),
                    "",
                    load_percent(check.average_us(), rate),
                    check.total_us / 1_000,
                ));
            }
        }

        let stats = &self.stats;
        out.push_str(&format!(
            "\n{} passes in {}ms, guaranteed overruns {}, idle passes {}, resyncs {}\n",
            stats.passes,
            self.elapsed_us / 1_000,
            overrun_text(stats.guaranteed_overruns),
            stats.idle_passes,
            stats.backlog_resyncs,
        ));
        out.push_str(&format!("Average system load: {}%\n", self.system_load_percent));
        out
    }
}

fn task_line(task: &TaskInfo) -> String {
    let name = match task.sub_name {
        Some(sub_name) => format!("{} {}", task.name, sub_name),
        None => task.name.to_string(),
    };
    let rate = task.rate_hz();
    let line = format!(
        "{:02} - ({:>15}) {:6} {:7} {:7} {:>7} {:>7} {:9}",
        task.id.0,
        name,
        rate,
        task.max_execution_us,
        task.average_execution_us,
        load_percent(task.max_execution_us, rate),
        load_percent(task.average_execution_us, rate),
        task.total_execution_us / 1_000,
    );

    if !task.enabled {
        line.dimmed().to_string()
    } else if task.static_priority == TaskPriority::Realtime {
        line.bright_green().to_string()
    } else {
        line
    }
}

fn overrun_text(overruns: u64) -> String {
    if overruns == 0 {
        overruns.to_string().green().to_string()
    } else {
        overruns.to_string().bright_red().bold().to_string()
    }
}

/// CPU share of a task running `execution_us` at `rate_hz`, one decimal.
pub fn load_percent(execution_us: u32, rate_hz: u32) -> String {
    let permille = execution_us as u64 * rate_hz as u64 / 1_000;
    format!("{}.{}%", permille / 10, permille % 10)
}
