//! Spreadsheet Ingestion Ability
//!
//! Resolves a target sheet inside a workbook file and materializes it as a
//! `TabularValue`. Supports every workbook format calamine auto-detects
//! (xls, xlsx, xlsb, ods); one sheet is read per invocation.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use async_trait::async_trait;
use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use tracing::{debug, info};

use super::{Ability, AbilityDescriptor, InvocationRequest, ParameterSpec, ParameterType};
use crate::error::{AbilityError, AbilityResult};
use crate::table::{CellValue, TabularValue};

/// Reads one sheet of a workbook into the canonical tabular shape.
///
/// Sheet resolution is deliberately forgiving: an omitted, empty, or
/// unmatched `sheet_name` silently resolves to the FIRST sheet in workbook
/// order instead of failing. A caller passing a misspelled sheet name gets
/// the first sheet, not an error; callers that need a hard failure must
/// check the sheet list themselves.
pub struct SpreadsheetIngestAbility {
    descriptor: AbilityDescriptor,
}

impl SpreadsheetIngestAbility {
    pub fn new() -> Self {
        Self {
            descriptor: AbilityDescriptor::new(
                "ingest_spreadsheet",
                "Read one sheet of a spreadsheet workbook (xls/xlsx/xlsb/ods) and return it \
                 as a table. If sheet_name is omitted or does not match, the first sheet is read.",
                vec![
                    ParameterSpec::required(
                        "file_path",
                        ParameterType::String,
                        "Path to the workbook file.",
                    ),
                    ParameterSpec::optional(
                        "sheet_name",
                        ParameterType::String,
                        "Name of the sheet to read. Falls back to the first sheet when omitted \
                         or not found.",
                    ),
                ],
                "tabular",
            ),
        }
    }

    fn open_workbook(path: &Path) -> AbilityResult<Sheets<BufReader<File>>> {
        // Existence is checked before any workbook probe so a bad path is
        // always SourceNotFound, never a format error.
        if !path.is_file() {
            return Err(AbilityError::SourceNotFound {
                path: path.display().to_string(),
            });
        }
        open_workbook_auto(path).map_err(|e| match e {
            calamine::Error::Io(_) => AbilityError::SourceNotFound {
                path: path.display().to_string(),
            },
            other => AbilityError::UnsupportedFormat {
                path: path.display().to_string(),
                detail: other.to_string(),
            },
        })
    }

    /// Apply the first-sheet fallback rule.
    ///
    /// The fallback is the one documented silent recovery in this crate:
    /// a requested name that does not appear among `names` resolves to the
    /// first sheet rather than erroring.
    fn resolve_sheet<'a>(names: &'a [String], requested: Option<&str>) -> Option<&'a String> {
        match requested {
            Some(name) if !name.is_empty() && names.iter().any(|n| n == name) => {
                names.iter().find(|n| n.as_str() == name)
            }
            _ => names.first(),
        }
    }

    fn header_name(cell: Option<&Data>, index: usize) -> String {
        let raw = cell.map(Self::cell_value).unwrap_or(CellValue::Null);
        match raw {
            CellValue::Text(s) if !s.trim().is_empty() => s.trim().to_string(),
            CellValue::Null => format!("column_{index}"),
            CellValue::Text(_) => format!("column_{index}"),
            other => match serde_json::to_value(&other) {
                Ok(v) => v.to_string().trim_matches('"').to_string(),
                Err(_) => format!("column_{index}"),
            },
        }
    }

    fn cell_value(cell: &Data) -> CellValue {
        match cell {
            Data::Empty => CellValue::Null,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Int(i) => CellValue::Int(*i),
            Data::Float(f) => CellValue::Float(*f),
            Data::Bool(b) => CellValue::Bool(*b),
            // Spreadsheet error cells (#DIV/0! etc.) materialize as nulls,
            // keeping the row shape intact.
            Data::Error(_) => CellValue::Null,
            Data::DateTime(dt) => dt
                .as_datetime()
                .map(CellValue::DateTime)
                .unwrap_or(CellValue::Float(dt.as_f64())),
            Data::DateTimeIso(s) => CellValue::Text(s.clone()),
            Data::DurationIso(s) => CellValue::Text(s.clone()),
        }
    }

    /// First row of the used range becomes the header; every following row
    /// becomes a data row in source order, indexed from 0.
    fn range_to_table(range: &Range<Data>, sheet: &str) -> AbilityResult<TabularValue> {
        let mut rows = range.rows();
        let header = match rows.next() {
            Some(header) => header,
            None => return Ok(TabularValue::new(Vec::new())),
        };

        let columns: Vec<String> = header
            .iter()
            .enumerate()
            .map(|(i, cell)| Self::header_name(Some(cell), i))
            .collect();

        let mut table = TabularValue::new(columns);
        for row in rows {
            table
                .push_row(row.iter().map(Self::cell_value).collect())
                .map_err(|e| AbilityError::ParseError {
                    source_id: sheet.to_string(),
                    detail: e.to_string(),
                })?;
        }
        Ok(table)
    }
}

impl Default for SpreadsheetIngestAbility {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ability for SpreadsheetIngestAbility {
    fn descriptor(&self) -> &AbilityDescriptor {
        &self.descriptor
    }

    async fn invoke(&self, request: &InvocationRequest) -> AbilityResult<TabularValue> {
        self.descriptor.validate(request)?;

        let file_path = request
            .str_arg("file_path")
            .ok_or_else(|| AbilityError::InvalidArgument("file_path must be a string".into()))?
            .to_string();
        let requested_sheet = request.str_arg("sheet_name").map(str::to_string);

        info!(task_id = %request.task_id, path = %file_path, "ingesting spreadsheet");

        // The workbook open is the lightweight metadata probe: sheet names
        // are available immediately, sheet content is parsed on demand. The
        // handle is dropped on every exit path.
        let path = Path::new(&file_path);
        let mut workbook = Self::open_workbook(path)?;
        let sheet_names = workbook.sheet_names().to_vec();

        let sheet = Self::resolve_sheet(&sheet_names, requested_sheet.as_deref())
            .cloned()
            .ok_or_else(|| AbilityError::ParseError {
                source_id: file_path.clone(),
                detail: "workbook contains no sheets".to_string(),
            })?;

        if requested_sheet.as_deref() != Some(sheet.as_str()) {
            debug!(
                requested = requested_sheet.as_deref().unwrap_or("<none>"),
                resolved = %sheet,
                "sheet name fell back to first sheet"
            );
        }

        let range = workbook
            .worksheet_range(&sheet)
            .map_err(|e| AbilityError::ParseError {
                source_id: format!("{file_path}#{sheet}"),
                detail: e.to_string(),
            })?;

        let table = Self::range_to_table(&range, &sheet)?;
        info!(
            task_id = %request.task_id,
            sheet = %sheet,
            rows = table.row_count(),
            columns = table.column_count(),
            "spreadsheet ingested"
        );
        Ok(table)
    }
}
