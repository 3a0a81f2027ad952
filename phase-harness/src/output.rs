//! Output backend selection

use crate::jsonl::JsonLinesRecorder;
use anyhow::{Context, Result};
use phase_correlator::{EventRecorder, LogRecorder, MemoryRecorder};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, LineWriter, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// JSON Lines target (default: stdout)
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Memory,
    Log,
    Jsonl,
}

/// Build the recorder described by the output settings
pub fn build_recorder(config: &OutputConfig) -> Result<Box<dyn EventRecorder>> {
    let recorder: Box<dyn EventRecorder> = match config.format {
        OutputFormat::Memory => Box::new(MemoryRecorder::new()),
        OutputFormat::Log => Box::new(LogRecorder),
        OutputFormat::Jsonl => {
            let writer: Box<dyn Write + Send> = match &config.path {
                Some(path) => {
                    let file = File::create(path)
                        .with_context(|| format!("Failed to create output file: {:?}", path))?;
                    Box::new(LineWriter::new(file))
                }
                None => Box::new(io::stdout()),
            };
            Box::new(JsonLinesRecorder::new(writer))
        }
    };

    Ok(recorder)
}
