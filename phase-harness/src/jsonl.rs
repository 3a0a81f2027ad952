//! JSON Lines recording backend
//!
//! Writes one JSON object per committed event. The writer sits behind a mutex
//! so containers running on different threads can share one output.

use phase_correlator::{CorrelatorError, EventRecorder, PhaseEvent, Result};
use serde::Serialize;
use std::io::Write;
use std::sync::Mutex;

/// One output line: the event plus the human-readable phase vocabulary
#[derive(Serialize)]
struct EventLine<'a> {
    #[serde(flatten)]
    event: &'a PhaseEvent,
    label: &'static str,
    description: &'static str,
}

impl<'a> From<&'a PhaseEvent> for EventLine<'a> {
    fn from(event: &'a PhaseEvent) -> Self {
        Self {
            event,
            label: event.phase().label(),
            description: event.phase().description(),
        }
    }
}

/// Recorder that serializes committed events as JSON Lines
pub struct JsonLinesRecorder<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesRecorder<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Flush buffered output
    pub fn flush(&self) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| CorrelatorError::Backend("output writer poisoned".to_string()))?;
        writer.flush()?;
        Ok(())
    }

    /// Give back the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> EventRecorder for JsonLinesRecorder<W> {
    fn commit(&self, event: PhaseEvent) -> Result<()> {
        let line = serde_json::to_string(&EventLine::from(&event))
            .map_err(|e| CorrelatorError::Backend(format!("Failed to serialize event: {}", e)))?;

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| CorrelatorError::Backend("output writer poisoned".to_string()))?;
        writeln!(writer, "{}", line)?;
        Ok(())
    }
}
