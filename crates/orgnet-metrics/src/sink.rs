//! Output collaborators for engine results.
//!
//! The engine never formats output itself. A run hands its
//! [`MetricsReport`] to a [`ReportSink`] and its [`GraphView`] to a
//! [`VisualizationSink`]; table printers, JSON exporters and renderers
//! implement these traits.

use std::io::{self, Write};

use crate::report::MetricsReport;
use crate::view::GraphView;

/// Consumes the metrics table of a run.
pub trait ReportSink {
    /// Write one report.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the underlying writer fails.
    fn write_report(&mut self, report: &MetricsReport) -> io::Result<()>;
}

/// Consumes the node/edge view of a run.
pub trait VisualizationSink {
    /// Write one view.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the underlying writer fails.
    fn write_view(&mut self, view: &GraphView) -> io::Result<()>;
}

/// Writes pretty-printed JSON documents, one per call, newline-terminated.
#[derive(Debug)]
pub struct JsonSink<W> {
    writer: W,
}

impl<W: Write> JsonSink<W> {
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_value<T: serde::Serialize>(&mut self, value: &T) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, value).map_err(io::Error::other)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

impl<W: Write> ReportSink for JsonSink<W> {
    fn write_report(&mut self, report: &MetricsReport) -> io::Result<()> {
        self.write_value(report)
    }
}

impl<W: Write> VisualizationSink for JsonSink<W> {
    fn write_view(&mut self, view: &GraphView) -> io::Result<()> {
        self.write_value(view)
    }
}

/// Keeps every report and view it receives.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub reports: Vec<MetricsReport>,
    pub views: Vec<GraphView>,
}

impl ReportSink for MemorySink {
    fn write_report(&mut self, report: &MetricsReport) -> io::Result<()> {
        self.reports.push(report.clone());
        Ok(())
    }
}

impl VisualizationSink for MemorySink {
    fn write_view(&mut self, view: &GraphView) -> io::Result<()> {
        self.views.push(view.clone());
        Ok(())
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ReportSink for NullSink {
    fn write_report(&mut self, _report: &MetricsReport) -> io::Result<()> {
        Ok(())
    }
}

impl VisualizationSink for NullSink {
    fn write_view(&mut self, _view: &GraphView) -> io::Result<()> {
        Ok(())
    }
}
