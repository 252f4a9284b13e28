//! Per-generation metrics and the sinks that consume them.
//!
//! The engine reports one [`GenerationRecord`] per completed generation to a
//! [`MetricsSink`]. Formatting and persistence belong to the sink; the crate ships a
//! [`CsvMetricsWriter`] producing the usual
//!
//! ```text
//! Iteration,AverageFitness,MaxFitness
//! 1,5.4,8
//! 2,6.1,9
//! ```
//!
//! layout, with the cell of an untracked metric left empty.

use std::io::{self, Write};

use serde::Serialize;

/// Fitness statistics of one generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationRecord {
    /// 1-based index of the generation.
    pub generation: usize,
    /// `None` when average tracking is disabled for the run.
    pub average_fitness: Option<f64>,
    /// `None` when max tracking is disabled for the run.
    pub max_fitness: Option<f64>,
}

/// Consumer of generation records.
///
/// An error from the sink aborts the run.
pub trait MetricsSink {
    fn record(&mut self, record: &GenerationRecord) -> io::Result<()>;
}

impl<F> MetricsSink for F
where
    F: FnMut(&GenerationRecord) -> io::Result<()>,
{
    fn record(&mut self, record: &GenerationRecord) -> io::Result<()> {
        self(record)
    }
}

impl MetricsSink for Vec<GenerationRecord> {
    fn record(&mut self, record: &GenerationRecord) -> io::Result<()> {
        self.push(*record);
        Ok(())
    }
}

/// Discards every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl MetricsSink for NullSink {
    fn record(&mut self, _record: &GenerationRecord) -> io::Result<()> {
        Ok(())
    }
}

/// Writes records as comma-separated rows.
#[derive(Debug)]
pub struct CsvMetricsWriter<W> {
    writer: W,
}

impl<W> CsvMetricsWriter<W>
where
    W: Write,
{
    pub const HEADER: &'static str = "Iteration,AverageFitness,MaxFitness";

    /// Writes the header line and returns the writer.
    pub fn new(mut writer: W) -> io::Result<Self> {
        writeln!(writer, "{}", Self::HEADER)?;
        Ok(Self { writer })
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W> MetricsSink for CsvMetricsWriter<W>
where
    W: Write,
{
    fn record(&mut self, record: &GenerationRecord) -> io::Result<()> {
        write!(self.writer, "{},", record.generation)?;
        if let Some(average) = record.average_fitness {
            write!(self.writer, "{average}")?;
        }
        write!(self.writer, ",")?;
        if let Some(max) = record.max_fitness {
            write!(self.writer, "{max}")?;
        }
        writeln!(self.writer)
    }
}
