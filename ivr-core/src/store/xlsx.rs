//! Spreadsheet-backed [`CallStore`].
//!
//! The workbook holds one worksheet: a header row naming the columns in
//! [`COLUMNS`] order, then one row per call record. Every `load` opens and
//! parses the whole file; every `persist` rebuilds the workbook and writes
//! it over the old one. Both run on tokio's blocking pool.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook};

use crate::config::StoreConfig;
use crate::error::IvrError;
use crate::models::{CallRecord, CallTable, COLUMNS};

use super::CallStore;

#[derive(Debug, Clone)]
pub struct XlsxStore {
    path: PathBuf,
    sheet_name: String,
}

impl XlsxStore {
    pub fn new(path: impl Into<PathBuf>, sheet_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sheet_name: sheet_name.into(),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(&config.path, &config.sheet_name)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CallStore for XlsxStore {
    async fn load(&self) -> Result<CallTable, IvrError> {
        let path = self.path.clone();
        let sheet_name = self.sheet_name.clone();
        let table = tokio::task::spawn_blocking(move || {
            if !path.exists() {
                tracing::info!("Store {} not found, creating it empty", path.display());
                write_workbook(&path, &sheet_name, &CallTable::new())?;
                return Ok(CallTable::new());
            }
            read_workbook(&path, &sheet_name)
        })
        .await??;

        tracing::debug!("Loaded {} call records from {}", table.len(), self.path.display());
        Ok(table)
    }

    async fn persist(&self, table: &CallTable) -> Result<(), IvrError> {
        let path = self.path.clone();
        let sheet_name = self.sheet_name.clone();
        let table = table.clone();
        let count = table.len();
        tokio::task::spawn_blocking(move || write_workbook(&path, &sheet_name, &table)).await??;

        tracing::debug!("Persisted {} call records to {}", count, self.path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ============================================================================
// Reading
// ============================================================================

fn read_workbook(path: &Path, sheet_name: &str) -> Result<CallTable, IvrError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let names = workbook.sheet_names();
    let sheet = match names.iter().find(|n| n.as_str() == sheet_name) {
        Some(name) => name.clone(),
        None => match names.first() {
            Some(first) => first.clone(),
            None => return Ok(CallTable::new()),
        },
    };

    let range = workbook.worksheet_range(&sheet)?;
    parse_range(&range)
}

fn parse_range(range: &Range<Data>) -> Result<CallTable, IvrError> {
    // Range starts at the first used cell; keep row numbers relative to the sheet
    let first_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);
    let mut rows = range.rows();

    let header = match rows.next() {
        Some(h) => h,
        None => return Ok(CallTable::new()),
    };
    let positions = column_positions(header, first_row + 1)?;

    let mut table = CallTable::new();
    for (i, row) in rows.enumerate() {
        if row.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        let row_number = first_row + i + 2;
        let record = parse_row(row, &positions, row_number)?;
        table.insert(record).map_err(|e| match e {
            IvrError::DuplicateCallId(id) => IvrError::CorruptStore {
                row: row_number,
                reason: format!("Call_ID {} appears more than once", id),
            },
            other => other,
        })?;
    }
    Ok(table)
}

/// Index of each of [`COLUMNS`] within the header row.
fn column_positions(header: &[Data], row_number: usize) -> Result<[usize; 10], IvrError> {
    let mut positions = [0usize; 10];
    for (slot, column) in positions.iter_mut().zip(COLUMNS) {
        *slot = header
            .iter()
            .position(|cell| cell_text(cell).trim() == column)
            .ok_or_else(|| IvrError::CorruptStore {
                row: row_number,
                reason: format!("missing column {}", column),
            })?;
    }
    Ok(positions)
}

fn parse_row(row: &[Data], positions: &[usize; 10], row_number: usize) -> Result<CallRecord, IvrError> {
    let cell = |i: usize| row.get(positions[i]).unwrap_or(&Data::Empty);
    let text = |i: usize| cell_text(cell(i));

    Ok(CallRecord {
        call_id: cell_call_id(cell(0), row_number)?,
        customer_name: text(1),
        phone_number: text(2),
        policy_number: text(3),
        question_asked: text(4),
        customer_response: text(5),
        response_type: text(6),
        call_status: text(7),
        confidence_score: cell_score(cell(8), row_number)?,
        agent_action_required: text(9),
    })
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Integral floats render without a trailing `.0` (phone numbers typed as numbers).
fn format_number(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        (f as i64).to_string()
    } else {
        f.to_string()
    }
}

/// Largest magnitude an f64 cell holds without losing integer precision.
const MAX_EXACT_FLOAT_INT: i64 = 1 << 53;

fn cell_call_id(cell: &Data, row: usize) -> Result<i64, IvrError> {
    let bad = |reason: String| IvrError::CorruptStore { row, reason };
    match cell {
        Data::Int(i) => Ok(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() <= MAX_EXACT_FLOAT_INT as f64 => {
            Ok(*f as i64)
        }
        Data::Float(f) => Err(bad(format!("Call_ID {} is not an exact integer", f))),
        Data::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| bad(format!("Call_ID {:?} is not an integer", s))),
        Data::Empty => Err(bad("Call_ID is empty".to_string())),
        other => Err(bad(format!("Call_ID {} is not an integer", other))),
    }
}

fn cell_score(cell: &Data, row: usize) -> Result<f64, IvrError> {
    let bad = |reason: String| IvrError::CorruptStore { row, reason };
    let score = match cell {
        Data::Float(f) => *f,
        Data::Int(i) => *i as f64,
        Data::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| bad(format!("Confidence_Score {:?} is not a number", s)))?,
        Data::Empty => return Err(bad("Confidence_Score is empty".to_string())),
        other => return Err(bad(format!("Confidence_Score {} is not a number", other))),
    };
    if !(0.0..=1.0).contains(&score) {
        return Err(bad(format!("Confidence_Score {} is outside 0..=1", score)));
    }
    Ok(score)
}

// ============================================================================
// Writing
// ============================================================================

fn write_workbook(path: &Path, sheet_name: &str, table: &CallTable) -> Result<(), IvrError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name)?;

    for (col, name) in COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &header_format)?;
    }

    for (i, record) in table.iter().enumerate() {
        let row = u32::try_from(i + 1).unwrap_or(u32::MAX);
        if record.call_id.unsigned_abs() <= MAX_EXACT_FLOAT_INT as u64 {
            sheet.write_number(row, 0, record.call_id as f64)?;
        } else {
            // Beyond 2^53 a number cell would round the id
            sheet.write_string(row, 0, record.call_id.to_string())?;
        }
        sheet.write_string(row, 1, &record.customer_name)?;
        sheet.write_string(row, 2, &record.phone_number)?;
        sheet.write_string(row, 3, &record.policy_number)?;
        sheet.write_string(row, 4, &record.question_asked)?;
        sheet.write_string(row, 5, &record.customer_response)?;
        sheet.write_string(row, 6, &record.response_type)?;
        sheet.write_string(row, 7, &record.call_status)?;
        sheet.write_number(row, 8, record.confidence_score)?;
        sheet.write_string(row, 9, &record.agent_action_required)?;
    }

    workbook.save(path)?;
    Ok(())
}
