//! Cell source adapters.
//!
//! Both delimited text and binary workbooks are normalized into a flat list
//! of [`Row`]s of trimmed string cells. Blank rows are kept: they separate
//! the tables of a multi-table input.

use std::io::{Cursor, Read};

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::ReaderBuilder;

use crate::{ImportConfig, ImportError, SpreadsheetFormat};

/// Columns a tab character counts for when measuring indentation
const TAB_WIDTH: usize = 4;

/// One row of cells
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Row {
    /// 1-based position in the source
    pub number: usize,
    cells: Vec<String>,
    indents: Vec<usize>,
}

impl Row {
    /// Build a row from raw cell text; cells are trimmed and their leading
    /// indentation is remembered.
    pub fn from_raw<I, S>(number: usize, raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cells = Vec::new();
        let mut indents = Vec::new();
        for cell in raw {
            let cell = cell.as_ref();
            indents.push(indentation(cell));
            cells.push(cell.trim().to_string());
        }
        Self {
            number,
            cells,
            indents,
        }
    }

    /// Trimmed cell text; `None` past the end of the row
    pub fn cell(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }

    /// Trimmed cell text, `None` when absent or empty
    pub fn value(&self, index: usize) -> Option<&str> {
        self.cell(index).filter(|c| !c.is_empty())
    }

    /// Leading whitespace width of a cell before trimming
    pub fn indent(&self, index: usize) -> usize {
        self.indents.get(index).copied().unwrap_or(0)
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All cells empty
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(String::is_empty)
    }
}

fn indentation(cell: &str) -> usize {
    cell.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
        .sum()
}

/// Read every row of `reader` in the given format
pub fn read_rows<R: Read>(
    format: SpreadsheetFormat,
    reader: R,
    config: &ImportConfig,
) -> Result<Vec<Row>, ImportError> {
    match format {
        SpreadsheetFormat::Csv => read_csv_rows(reader, config),
        SpreadsheetFormat::Xlsx => read_workbook_rows(reader, config),
    }
}

// ============================================================================
// Delimited text
// ============================================================================

/// Read delimited text.
///
/// The csv reader silently drops empty lines, so the text is first split
/// into blocks at blank lines outside quoted fields; each block is parsed on
/// its own and a blank row is emitted between blocks. A quote only opens a
/// quoted field at the start of the field, as in the csv reader itself.
pub fn read_csv_rows<R: Read>(
    mut reader: R,
    config: &ImportConfig,
) -> Result<Vec<Row>, ImportError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let mut rows = Vec::new();
    for (index, block) in split_blocks(text, config.csv_delimiter).into_iter().enumerate() {
        if index > 0 {
            rows.push(Row::from_raw(block.first_line - 1, Vec::<String>::new()));
        }
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(config.csv_delimiter as u8)
            .from_reader(block.text.as_bytes());
        for record in csv_reader.records() {
            let record = record?;
            let line = record.position().map_or(1, |p| p.line() as usize);
            rows.push(Row::from_raw(block.first_line + line - 1, record.iter()));
        }
    }
    Ok(rows)
}

/// A run of non-blank lines
#[derive(Debug, PartialEq, Eq)]
struct Block {
    /// 1-based line number of the first line
    first_line: usize,
    text: String,
}

/// Where a line leaves the quote scanner
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Quoting {
    FieldStart,
    Unquoted,
    Quoted,
    /// A quote inside a quoted field: closes it unless another quote follows
    QuotedQuote,
}

fn scan_line(line: &str, delimiter: char, mut state: Quoting) -> Quoting {
    for c in line.chars() {
        state = match (state, c) {
            (Quoting::Quoted, '"') => Quoting::QuotedQuote,
            (Quoting::Quoted, _) => Quoting::Quoted,
            (Quoting::QuotedQuote, '"') | (Quoting::FieldStart, '"') => Quoting::Quoted,
            (_, c) if c == delimiter => Quoting::FieldStart,
            _ => Quoting::Unquoted,
        };
    }
    match state {
        Quoting::Quoted => Quoting::Quoted,
        _ => Quoting::FieldStart,
    }
}

fn split_blocks(text: &str, delimiter: char) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current: Option<Block> = None;
    let mut state = Quoting::FieldStart;

    for (index, line) in text.split('\n').enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if state != Quoting::Quoted && line.trim().is_empty() {
            blocks.extend(current.take());
            continue;
        }
        let block = current.get_or_insert_with(|| Block {
            first_line: index + 1,
            text: String::new(),
        });
        block.text.push_str(line);
        block.text.push('\n');
        state = scan_line(line, delimiter, state);
    }
    blocks.extend(current);
    blocks
}

// ============================================================================
// Workbooks
// ============================================================================

/// Read the first worksheet of a workbook (xlsx, xls, xlsb or ods)
pub fn read_workbook_rows<R: Read>(
    mut reader: R,
    config: &ImportConfig,
) -> Result<Vec<Row>, ImportError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ImportError::NoWorksheet)??;

    let first_row = range.start().map_or(0, |(row, _)| row as usize);
    Ok(range
        .rows()
        .enumerate()
        .map(|(i, cells)| {
            Row::from_raw(
                first_row + i + 1,
                cells
                    .iter()
                    .map(|cell| cell_text(cell, &config.short_date_format)),
            )
        })
        .collect())
}

/// Render a workbook cell the way it would appear in delimited text
fn cell_text(cell: &Data, date_format: &str) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Float(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => datetime.format(date_format).to_string(),
            None => dt.as_f64().to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn csv(text: &str) -> Vec<Row> {
        read_csv_rows(text.as_bytes(), &ImportConfig::default()).unwrap()
    }

    #[test]
    fn row_trims_and_measures_indent() {
        let row = Row::from_raw(3, ["  child ", "\tx", ""]);
        assert_eq!(row.cell(0), Some("child"));
        assert_eq!(row.indent(0), 2);
        assert_eq!(row.indent(1), TAB_WIDTH);
        assert_eq!(row.value(2), None);
        assert_eq!(row.cell(2), Some(""));
        assert_eq!(row.cell(9), None);
        assert!(!row.is_blank());
        assert!(Row::from_raw(1, ["", " "]).is_blank());
    }

    #[test]
    fn blank_lines_separate_tables() {
        let rows = csv("Name,ID\nt1,1\n\n\nName,e-mail\nJoe,joe@example.com\n");
        let numbers: Vec<usize> = rows.iter().map(|r| r.number).collect();
        let blank: Vec<bool> = rows.iter().map(Row::is_blank).collect();
        assert_eq!(numbers, vec![1, 2, 4, 5, 6]);
        assert_eq!(blank, vec![false, false, true, false, false]);
        assert_eq!(rows[4].cell(1), Some("joe@example.com"));
    }

    #[test]
    fn quoted_newlines_do_not_split() {
        let rows = csv("Name,Notes\nt1,\"first\n\nsecond\"\nt2,plain\n");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].cell(1), Some("first\n\nsecond"));
        assert_eq!(rows[2].number, 5);
    }

    #[test]
    fn quotes_inside_fields_are_literal() {
        let rows = csv("Name,Notes,Resources\nt1,use 5\" screws,Joe\nt2,\"6\"\" nails\",Joe\n\nName\nJoe\n");
        let numbers: Vec<usize> = rows.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(rows[1].cell(1), Some("use 5\" screws"));
        assert_eq!(rows[2].cell(1), Some("6\" nails"));
        assert!(rows[3].is_blank());
        assert_eq!(rows[5].cell(0), Some("Joe"));
    }

    #[test]
    fn quote_scanner_tracks_open_fields() {
        assert_eq!(scan_line("t1,\"open", ',', Quoting::FieldStart), Quoting::Quoted);
        assert_eq!(scan_line("t1,5\" x", ',', Quoting::FieldStart), Quoting::FieldStart);
        assert_eq!(scan_line("still\",x", ',', Quoting::Quoted), Quoting::FieldStart);
        assert_eq!(scan_line("a;\"b", ';', Quoting::FieldStart), Quoting::Quoted);
        assert_eq!(scan_line("a,\"b", ';', Quoting::FieldStart), Quoting::FieldStart);
    }

    #[test]
    fn crlf_and_bom() {
        let rows = csv("\u{feff}Name,ID\r\nt1,1\r\n\r\nName\r\n");
        assert_eq!(rows[0].cell(0), Some("Name"));
        assert_eq!(rows[1].cell(1), Some("1"));
        assert!(rows[2].is_blank());
        assert_eq!(rows[3].number, 4);
    }

    #[test]
    fn ragged_rows_are_accepted() {
        let rows = csv("a,b,c\nd\n");
        assert_eq!(rows[0].len(), 3);
        assert_eq!(rows[1].len(), 1);
    }

    #[test]
    fn custom_delimiter() {
        let config = ImportConfig::default().with_csv_delimiter(';');
        let rows = read_csv_rows("Name;Duration\nt1;4\n".as_bytes(), &config).unwrap();
        assert_eq!(rows[1].cells(), &["t1".to_string(), "4".to_string()]);
    }

    #[test]
    fn workbook_cells_render_like_text() {
        assert_eq!(cell_text(&Data::Float(4.0), "%d/%m/%y"), "4");
        assert_eq!(cell_text(&Data::Float(2.5), "%d/%m/%y"), "2.5");
        assert_eq!(cell_text(&Data::Int(7), "%d/%m/%y"), "7");
        assert_eq!(cell_text(&Data::Bool(true), "%d/%m/%y"), "true");
        assert_eq!(cell_text(&Data::Empty, "%d/%m/%y"), "");
    }

    #[test]
    fn workbook_dates_render_with_date_format() {
        use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Begin date").unwrap();
        let date = ExcelDateTime::from_ymd(2012, 7, 23).unwrap();
        let format = Format::new().set_num_format("dd/mm/yy");
        sheet.write_datetime_with_format(1, 0, &date, &format).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let rows = read_workbook_rows(bytes.as_slice(), &ImportConfig::default()).unwrap();
        assert_eq!(rows[0].cell(0), Some("Begin date"));
        assert_eq!(rows[1].cell(0), Some("23/07/12"));
        assert_eq!(rows[1].number, 2);
    }

    #[test]
    fn garbage_is_not_a_workbook() {
        let result = read_workbook_rows("not a workbook".as_bytes(), &ImportConfig::default());
        assert!(matches!(result, Err(ImportError::Spreadsheet(_))));
    }
}
