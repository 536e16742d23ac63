use super::report_error::ReportError;
use super::result_row::ResultRow;
use std::fs;
use std::path::Path;

pub const RESULT_TABLE_FILE_NAME: &str = "results.table";

/// Read side of a suite's `results.table` (JSON Lines, one flat object per trial).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultTable {
    pub rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn read(path: &Path) -> Result<Self, ReportError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ReportError> {
        let rows = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| ResultRow::from_json_line(index + 1, line))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn completed(&self) -> impl Iterator<Item = &ResultRow> {
        self.rows.iter().filter(|row| row.is_completed())
    }

    pub fn failed(&self) -> impl Iterator<Item = &ResultRow> {
        self.rows.iter().filter(|row| !row.is_completed())
    }
}
