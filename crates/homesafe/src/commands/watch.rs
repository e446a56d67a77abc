//! `homesafe watch`: run the coordinator and print one line per snapshot.

use chrono::{DateTime, Local, Utc};
use owo_colors::OwoColorize;
use serde::Serialize;

use homesafe_core::catalog::{self, ReadingValue};
use homesafe_core::{CoordinatorState, FailureKind, FleetSnapshot};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;
use crate::session::FleetCoordinator;

/// Binary fields that count as an active alarm.
const ALARM_KEYS: &[&str] = &["smoke_alarm", "co_alarm", "hardwire_smoke"];

#[derive(Debug, Serialize)]
struct SnapshotSummary {
    generation: u64,
    fetched_at: DateTime<Utc>,
    devices: usize,
    offline: Vec<String>,
    alarms: Vec<String>,
}

impl From<&FleetSnapshot> for SnapshotSummary {
    fn from(snapshot: &FleetSnapshot) -> Self {
        let mut offline = Vec::new();
        let mut alarms = Vec::new();

        for device in snapshot.devices().values() {
            for reading in catalog::readings(device) {
                let ReadingValue::Binary(Some(on)) = reading.value else {
                    continue;
                };
                if reading.key == "offline" && !on {
                    offline.push(device.label());
                } else if on && ALARM_KEYS.contains(&reading.key) {
                    alarms.push(format!("{}: {}", device.label(), reading.name));
                }
            }
        }

        Self {
            generation: snapshot.generation(),
            fetched_at: snapshot.fetched_at(),
            devices: snapshot.len(),
            offline,
            alarms,
        }
    }
}

fn summary_line(s: &SnapshotSummary, color: bool) -> String {
    let time = s.fetched_at.with_timezone(&Local).format("%H:%M:%S");
    let mut line = format!("[{time}] #{} {} devices", s.generation, s.devices);
    if !s.offline.is_empty() {
        line.push_str(&format!(", offline: {}", s.offline.join(", ")));
    }
    if s.alarms.is_empty() {
        line.push_str(", no alarms");
    } else {
        let alarms = format!("ALARM {}", s.alarms.join("; "));
        line.push_str(", ");
        if color {
            line.push_str(&alarms.red().bold().to_string());
        } else {
            line.push_str(&alarms);
        }
    }
    line
}

fn print_snapshot(snapshot: &FleetSnapshot, global: &GlobalOpts, color: bool) {
    let summary = SnapshotSummary::from(snapshot);
    let out = match global.output {
        OutputFormat::Json | OutputFormat::JsonCompact => output::render_json(&summary, true),
        OutputFormat::Table | OutputFormat::Plain => summary_line(&summary, color),
    };
    output::print_output(&out, global.quiet);
}

pub async fn handle(coordinator: &FleetCoordinator, global: &GlobalOpts) -> Result<(), CliError> {
    if coordinator.config().update_interval.is_zero() {
        return Err(CliError::Validation {
            field: "interval".into(),
            reason: "watch needs a poll interval greater than zero".into(),
        });
    }

    let color = output::should_color(global.color);
    let mut snapshots = coordinator.subscribe();
    let mut states = coordinator.watch_state();

    if let Err(e) = coordinator.start().await {
        if e.is_auth() {
            coordinator.shutdown().await;
            return Err(e.into());
        }
        eprintln!("initial refresh failed, retrying on the next poll: {e}");
    }

    if let Some(snapshot) = snapshots.borrow_and_update().clone() {
        print_snapshot(&snapshot, global, color);
    }
    states.borrow_and_update();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let result = loop {
        tokio::select! {
            _ = &mut ctrl_c => break Ok(()),
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                if let Some(snapshot) = snapshots.borrow_and_update().clone() {
                    print_snapshot(&snapshot, global, color);
                }
            }
            changed = states.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let state = *states.borrow_and_update();
                if let CoordinatorState::Failed(kind) = state {
                    let Some(err) = coordinator.last_error() else { continue };
                    if kind == FailureKind::Auth {
                        break Err(CliError::from(err));
                    }
                    eprintln!("refresh failed, keeping last snapshot: {err}");
                }
            }
        }
    };

    coordinator.shutdown().await;
    result
}
