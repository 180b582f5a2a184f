use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::scheduler::schedule_event::ScheduleEvent;
use crate::error::Result;

/// Target of the structured `tracing` events emitted for every scheduling decision.
pub const ANALYTICS_TARGET: &str = "grid_task_scheduler::analytics";

/// Column names of the exported event log, in output order.
pub const EVENT_HEADERS: [&str; 4] = ["Sequence", "Kind", "TaskId", "NodeId"];

/// Writes the events as a `;` separated table with a header row.
pub fn write_events_csv<W: Write>(writer: W, events: &[ScheduleEvent]) -> Result<()> {
    let mut csv_wtr = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);

    csv_wtr.write_record(EVENT_HEADERS)?;

    for event in events {
        let node = event.node_id.as_ref().map(|id| id.to_string()).unwrap_or_default();
        csv_wtr.write_record([event.sequence.to_string(), event.kind.to_string(), event.task_id.to_string(), node])?;
    }

    csv_wtr.flush()?;
    Ok(())
}

pub fn export_events_csv(path: impl AsRef<Path>, events: &[ScheduleEvent]) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_events_csv(file, events)?;
    log::info!("Exported {} scheduling events to '{}'.", events.len(), path.as_ref().display());
    Ok(())
}
