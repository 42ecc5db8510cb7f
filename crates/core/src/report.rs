//! Shared plumbing for the `;`-delimited CSV reports.
//!
//! Every row is flushed as soon as it is written, so a failing run never
//! leaves a half-written row behind.

use std::io::{self, Write};

use csv::{Writer, WriterBuilder};
use thiserror::Error;

use crate::profile::ConfigError;

pub const DELIMITER: u8 = b';';

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write CSV record: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to flush CSV output: {0}")]
    Io(#[from] io::Error),
    #[error("Could not derive micro name from '{key}': {source}")]
    MicroName { key: String, source: ConfigError },
}

pub(crate) fn writer<W: Write>(out: W) -> Writer<W> {
    WriterBuilder::new().delimiter(DELIMITER).has_headers(false).from_writer(out)
}

pub(crate) fn write_row<W, I, T>(w: &mut Writer<W>, row: I) -> Result<(), ReportError>
where
    W: Write,
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    w.write_record(row)?;
    w.flush()?;
    Ok(())
}

/// Fractions and percentages are always rendered with five decimals.
pub(crate) fn fraction(value: f64) -> String {
    format!("{value:.5}")
}
