use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::assemble::{PositionReport, Report};
use crate::rows::{Cell, HIDDEN_COLUMNS, header, row};

// Header row plus the Position and Name columns stay visible while scrolling.
const FROZEN_ROWS: u32 = 1;
const FROZEN_COLS: u16 = 2;
const NAME_COL_WIDTH: f64 = 22.0;

pub struct ExportSummary {
    pub sheets: usize,
    pub rows: usize,
}

struct Formats {
    header: Format,
    percent: Format,
    currency: Format,
    number: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            header: Format::new().set_bold(),
            percent: Format::new().set_num_format("0.0%"),
            currency: Format::new().set_num_format("$#,##0"),
            number: Format::new().set_num_format("0.##"),
        }
    }
}

/// Write one worksheet per position, in report order.
pub fn export_report(path: &Path, report: &Report) -> Result<ExportSummary> {
    let formats = Formats::new();
    let mut workbook = Workbook::new();
    let mut rows = 0;
    for position_report in &report.positions {
        let sheet = workbook.add_worksheet();
        sheet
            .set_name(position_report.position.as_str())
            .with_context(|| format!("name sheet {}", position_report.position))?;
        rows += write_position(sheet, position_report, &formats)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportSummary {
        sheets: report.positions.len(),
        rows,
    })
}

fn write_position(
    sheet: &mut Worksheet,
    report: &PositionReport,
    formats: &Formats,
) -> Result<usize> {
    let columns = header(report.position);
    for (col_idx, name) in columns.iter().enumerate() {
        sheet
            .write_string_with_format(0, col_idx as u16, *name, &formats.header)
            .with_context(|| format!("write header ({col_idx})"))?;
    }

    for (idx, player) in report.players.iter().enumerate() {
        let row_idx = idx as u32 + 1;
        for (col_idx, cell) in row(player).iter().enumerate() {
            write_cell(sheet, row_idx, col_idx as u16, cell, formats)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }

    let last_col = columns.len().saturating_sub(1) as u16;
    let last_row = report.players.len() as u32;
    sheet.set_freeze_panes(FROZEN_ROWS, FROZEN_COLS)?;
    sheet.autofilter(0, 0, last_row, last_col)?;
    sheet.set_column_width(1, NAME_COL_WIDTH)?;
    for (col_idx, name) in columns.iter().enumerate() {
        if HIDDEN_COLUMNS.contains(name) {
            sheet.set_column_hidden(col_idx as u16)?;
        }
    }
    Ok(report.players.len())
}

fn write_cell(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    formats: &Formats,
) -> Result<()> {
    match cell {
        Cell::Text(text) => {
            sheet.write_string(row, col, text)?;
        }
        Cell::Number(value) => {
            sheet.write_number_with_format(row, col, *value, &formats.number)?;
        }
        Cell::Integer(value) => {
            sheet.write_number(row, col, *value as f64)?;
        }
        Cell::Percent(value) => {
            sheet.write_number_with_format(row, col, *value, &formats.percent)?;
        }
        Cell::Currency(value) => {
            sheet.write_number_with_format(row, col, *value, &formats.currency)?;
        }
        Cell::Blank => {}
    }
    Ok(())
}
