use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::features::Features;

/// Appends one JSON object per tick, pairing features with the heading
/// that was in force, for offline predictor training.
#[derive(Debug)]
pub struct FeatureRecorder<W: Write> {
    writer: W,
    samples: u64,
}

#[derive(Serialize)]
struct Sample<'a> {
    tick: u64,
    #[serde(flatten)]
    features: &'a Features,
}

impl FeatureRecorder<BufWriter<File>> {
    /// Opens `path` for appending, creating parent directories when needed.
    pub fn create(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::options().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> FeatureRecorder<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, samples: 0 }
    }

    /// Writes one sample line.
    pub fn record(&mut self, tick: u64, features: &Features) -> io::Result<()> {
        let line = serde_json::to_string(&Sample { tick, features })
            .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?;
        writeln!(self.writer, "{line}")?;
        self.samples += 1;
        Ok(())
    }

    #[must_use]
    pub fn samples(&self) -> u64 {
        self.samples
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
