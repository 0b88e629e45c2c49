//! Tabular sinks: cells are printed left to right, rows are ended with
//! `println`. An empty row separates tables.

use std::io::Write;

use csv::WriterBuilder;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::ExportError;

pub trait SpreadsheetWriter {
    /// What `finish` hands back
    type Output;

    /// Append a cell to the current row
    fn print(&mut self, cell: &str) -> Result<(), ExportError>;

    /// End the current row
    fn println(&mut self) -> Result<(), ExportError>;

    /// Flush pending output
    fn finish(self) -> Result<Self::Output, ExportError>
    where
        Self: Sized;
}

// ============================================================================
// Delimited text
// ============================================================================

/// Writes comma-separated text with standard quoting
pub struct CsvSpreadsheetWriter<W: Write> {
    out: W,
    delimiter: u8,
    current: Vec<String>,
}

impl<W: Write> CsvSpreadsheetWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            delimiter: b',',
            current: Vec::new(),
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl<W: Write> SpreadsheetWriter for CsvSpreadsheetWriter<W> {
    type Output = W;

    fn print(&mut self, cell: &str) -> Result<(), ExportError> {
        self.current.push(cell.to_string());
        Ok(())
    }

    fn println(&mut self) -> Result<(), ExportError> {
        if self.current.is_empty() {
            self.out.write_all(b"\n")?;
            return Ok(());
        }
        // one record per writer, so a blank row stays a truly empty line
        let mut record = WriterBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_writer(Vec::new());
        record.write_record(&self.current)?;
        let bytes = record
            .into_inner()
            .map_err(|e| ExportError::Io(e.into_error()))?;
        self.out.write_all(&bytes)?;
        self.current.clear();
        Ok(())
    }

    fn finish(mut self) -> Result<W, ExportError> {
        if !self.current.is_empty() {
            self.println()?;
        }
        self.out.flush()?;
        Ok(self.out)
    }
}

// ============================================================================
// Workbooks
// ============================================================================

/// Builds a single-sheet xlsx workbook in memory
pub struct XlsxSpreadsheetWriter {
    sheet: Worksheet,
    row: u32,
    col: u16,
}

impl Default for XlsxSpreadsheetWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl XlsxSpreadsheetWriter {
    pub fn new() -> Self {
        Self {
            sheet: Worksheet::new(),
            row: 0,
            col: 0,
        }
    }

    /// Name the worksheet
    pub fn with_sheet_name(mut self, name: &str) -> Result<Self, ExportError> {
        self.sheet
            .set_name(name)
            .map_err(|e| ExportError::Format(e.to_string()))?;
        Ok(self)
    }
}

impl SpreadsheetWriter for XlsxSpreadsheetWriter {
    type Output = Vec<u8>;

    fn print(&mut self, cell: &str) -> Result<(), ExportError> {
        if !cell.is_empty() {
            self.sheet
                .write_string(self.row, self.col, cell)
                .map_err(|e| ExportError::Format(e.to_string()))?;
        }
        self.col += 1;
        Ok(())
    }

    fn println(&mut self) -> Result<(), ExportError> {
        self.row += 1;
        self.col = 0;
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>, ExportError> {
        let mut workbook = Workbook::new();
        workbook.push_worksheet(self.sheet);
        workbook
            .save_to_buffer()
            .map_err(|e| ExportError::Format(format!("Failed to create Excel: {e}")))
    }
}
