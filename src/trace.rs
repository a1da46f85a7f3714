//! Pointer trace loading and replay
//!
//! A trace is a CSV file with the header `at_ms,phase,x,y`. Rows are replayed
//! against a running stick in real time, relative to the start of replay.
//! `x`/`y` may be left empty on release rows.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

use crate::stick::{PointerEvent, PointerPhase, StickHandle};

/// One recorded pointer event
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TraceRow {
    /// Offset from the start of the trace
    pub at_ms: u64,
    pub phase: PointerPhase,
    #[serde(default)]
    pub x: Option<f32>,
    #[serde(default)]
    pub y: Option<f32>,
}

impl TraceRow {
    pub fn event(&self) -> PointerEvent {
        PointerEvent {
            phase: self.phase,
            x: self.x.unwrap_or_default(),
            y: self.y.unwrap_or_default(),
        }
    }
}

/// Parse a trace from any CSV reader
pub fn parse_trace<R: std::io::Read>(reader: R) -> Result<Vec<TraceRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut rows = Vec::new();
    for (index, record) in csv_reader.deserialize::<TraceRow>().enumerate() {
        let row = record.with_context(|| format!("Invalid trace row {}", index + 1))?;

        if row.phase != PointerPhase::Release && (row.x.is_none() || row.y.is_none()) {
            bail!("Trace row {}: {:?} needs x and y", index + 1, row.phase);
        }
        if let Some(prev) = rows.last().map(|r: &TraceRow| r.at_ms) {
            if row.at_ms < prev {
                bail!("Trace row {}: at_ms goes backwards ({} < {})", index + 1, row.at_ms, prev);
            }
        }

        rows.push(row);
    }

    Ok(rows)
}

/// Load a trace file
pub fn load_trace(path: &Path) -> Result<Vec<TraceRow>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open trace file: {}", path.display()))?;
    let rows = parse_trace(file)
        .with_context(|| format!("Failed to parse trace file: {}", path.display()))?;
    info!("Loaded {} trace rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Feed `rows` to `stick`, honouring their timestamps
pub async fn replay(stick: &StickHandle, rows: &[TraceRow]) -> Result<()> {
    let start = Instant::now();

    for row in rows {
        sleep_until(start + Duration::from_millis(row.at_ms)).await;
        debug!(at_ms = row.at_ms, phase = ?row.phase, "Replaying pointer event");
        stick.pointer(row.event())?;
    }

    Ok(())
}
