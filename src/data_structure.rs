use std::io;

use serde::{Deserialize, Serialize};

use crate::actuator_lib::TraceLog;

/// One recorded call across the actuation seam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriverEvent {
    Attach { pin: u8 },
    Command { pin: u8, angle: u8 },
    Pause { millis: u64 },
}

/// Snapshot of a recorded driver log.
///
/// The tests and benches drive the controller against the recording doubles
/// and then query the resulting trace through this type. Export helpers write
/// the same trace out as CSV or JSON for offline inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepTrace {
    events: Vec<DriverEvent>,
}

impl SweepTrace {
    pub fn snapshot(log: &TraceLog) -> Self {
        Self {
            events: log.borrow().clone(),
        }
    }

    pub fn events(&self) -> &[DriverEvent] {
        &self.events
    }

    /// Pins bound so far, in binding order.
    pub fn attached_pins(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|event| match event {
                DriverEvent::Attach { pin } => Some(*pin),
                _ => None,
            })
            .collect()
    }

    /// Every angle commanded on `pin`, in command order.
    pub fn commands_for_pin(&self, pin: u8) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|event| match event {
                DriverEvent::Command { pin: p, angle } if *p == pin => Some(*angle),
                _ => None,
            })
            .collect()
    }

    /// The order in which pins received command groups, consecutive
    /// duplicates collapsed. A strictly sequential sweep yields one entry per
    /// pin per pass.
    pub fn command_groups(&self) -> Vec<u8> {
        let mut groups = Vec::new();
        for event in &self.events {
            if let DriverEvent::Command { pin, .. } = event {
                if groups.last() != Some(pin) {
                    groups.push(*pin);
                }
            }
        }
        groups
    }

    pub fn command_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, DriverEvent::Command { .. }))
            .count()
    }

    pub fn pause_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, DriverEvent::Pause { .. }))
            .count()
    }

    /// Tabular export, one row per event.
    pub fn write_csv<W: io::Write>(&self, out: W) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(["event", "pin", "angle", "millis"])?;
        for event in &self.events {
            let record = match event {
                DriverEvent::Attach { pin } => {
                    ["attach".to_string(), pin.to_string(), String::new(), String::new()]
                }
                DriverEvent::Command { pin, angle } => {
                    ["command".to_string(), pin.to_string(), angle.to_string(), String::new()]
                }
                DriverEvent::Pause { millis } => {
                    ["pause".to_string(), String::new(), String::new(), millis.to_string()]
                }
            };
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator_lib::trace_log;

    fn sample_log() -> TraceLog {
        let log = trace_log();
        log.borrow_mut().extend([
            DriverEvent::Attach { pin: 14 },
            DriverEvent::Command { pin: 14, angle: 0 },
            DriverEvent::Pause { millis: 20 },
            DriverEvent::Command { pin: 14, angle: 5 },
            DriverEvent::Pause { millis: 20 },
            DriverEvent::Command { pin: 37, angle: 0 },
        ]);
        log
    }

    #[test]
    fn trace_queries_filter_by_event_and_pin() {
        let trace = SweepTrace::snapshot(&sample_log());

        assert_eq!(trace.attached_pins(), vec![14]);
        assert_eq!(trace.commands_for_pin(14), vec![0, 5]);
        assert_eq!(trace.commands_for_pin(37), vec![0]);
        assert_eq!(trace.command_groups(), vec![14, 37]);
        assert_eq!(trace.command_count(), 3);
        assert_eq!(trace.pause_count(), 2);
    }

    #[test]
    fn csv_export_writes_one_row_per_event() {
        let trace = SweepTrace::snapshot(&sample_log());

        let mut out = Vec::new();
        trace.write_csv(&mut out).unwrap();

        let csv = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "event,pin,angle,millis");
        assert_eq!(lines[1], "attach,14,,");
        assert_eq!(lines[2], "command,14,0,");
        assert_eq!(lines[3], "pause,,,20");
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn json_export_tags_events_by_kind() {
        let log = trace_log();
        log.borrow_mut().push(DriverEvent::Command { pin: 27, angle: 90 });

        let json = SweepTrace::snapshot(&log).to_json().unwrap();
        assert!(json.contains("\"Command\""));
        assert!(json.contains("\"pin\": 27"));
        assert!(json.contains("\"angle\": 90"));
    }
}
