//! Report Logger
//!
//! Append-only JSONL report logging: one header line, then one line per
//! reported tick.

use bevy_ecs::prelude::*;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use border_events::{ReportRecord, RunHeader, TickReport};

/// Resource for logging reports to a JSONL file
#[derive(Resource)]
pub struct ReportLogger {
    writer: Option<BufWriter<File>>,
    record_count: u64,
}

impl ReportLogger {
    /// Create a new report logger writing to the specified path
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            record_count: 0,
        })
    }

    /// Create a logger that discards records (for testing)
    pub fn null() -> Self {
        Self {
            writer: None,
            record_count: 0,
        }
    }

    /// Get the number of records logged so far
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Log a record to the file
    pub fn log(&mut self, record: &ReportRecord) -> std::io::Result<()> {
        self.record_count += 1;
        if let Some(ref mut writer) = self.writer {
            let json = serde_json::to_string(record)?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    pub fn log_header(&mut self, header: RunHeader) -> std::io::Result<()> {
        self.log(&ReportRecord::Header(header))
    }

    pub fn log_tick(&mut self, report: TickReport) -> std::io::Result<()> {
        self.log(&ReportRecord::Tick(report))
    }

    /// Flush the buffer to disk
    pub fn flush(&mut self) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for ReportLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!("Failed to flush report logger: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader};

    #[test]
    fn test_report_logging() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports.jsonl");

        let mut logger = ReportLogger::new(&path).unwrap();
        logger.log_header(RunHeader::new(7, 20, 2)).unwrap();
        logger
            .log_tick(TickReport {
                tick: 1,
                mean_sound: 0.4,
                ..Default::default()
            })
            .unwrap();
        logger.flush().unwrap();

        let file = File::open(&path).unwrap();
        let lines: Vec<String> = BufReader::new(file).lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines.len(), 2);

        match serde_json::from_str::<ReportRecord>(&lines[0]).unwrap() {
            ReportRecord::Header(header) => assert_eq!(header.seed, 7),
            other => panic!("expected header, got {:?}", other),
        }
        match serde_json::from_str::<ReportRecord>(&lines[1]).unwrap() {
            ReportRecord::Tick(report) => assert_eq!(report.tick, 1),
            other => panic!("expected tick, got {:?}", other),
        }
    }

    #[test]
    fn test_drop_flushes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dropped.jsonl");
        {
            let mut logger = ReportLogger::new(&path).unwrap();
            logger.log_tick(TickReport::default()).unwrap();
        }
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn test_null_logger() {
        let mut logger = ReportLogger::null();
        logger.log_tick(TickReport::default()).unwrap();
        logger.log_tick(TickReport::default()).unwrap();
        assert_eq!(logger.record_count(), 2);
    }
}
