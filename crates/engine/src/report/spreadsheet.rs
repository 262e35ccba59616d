//! `.xlsx` encoder: one sheet, header row, data rows, total row.

use chrono::Datelike;
use rust_xlsxwriter::{DocProperties, ExcelDateTime, Format, Workbook, XlsxError};

use crate::{EngineError, ResultEngine};

use super::{Report, format_date};

const AMOUNT_FORMAT: &str = "0.00";

pub(super) fn render(report: &Report) -> ResultEngine<Vec<u8>> {
    write_workbook(report).map_err(|err| EngineError::Render(err.to_string()))
}

fn write_workbook(report: &Report) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();

    // Pin the document timestamp so identical reports produce identical files.
    let created = ExcelDateTime::from_ymd(
        report.generated_on.year() as u16,
        report.generated_on.month() as u8,
        report.generated_on.day() as u8,
    )?;
    let title = report.title();
    let properties = DocProperties::new()
        .set_title(&title)
        .set_creation_datetime(&created);
    workbook.set_properties(&properties);

    let header = Format::new().set_bold();
    let amount = Format::new().set_num_format(AMOUNT_FORMAT);

    let sheet = workbook.add_worksheet();
    sheet.set_name(report.kind.title())?;

    for (col, title) in report.headers().iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, title.as_str(), &header)?;
    }

    let mut row: u32 = 1;
    for line in &report.lines {
        sheet.write_string(row, 0, format_date(line.date).as_str())?;
        sheet.write_string(row, 1, line.description.as_str())?;
        sheet.write_string(row, 2, line.mode.as_str())?;
        sheet.write_number_with_format(row, 3, line.amount.as_f64(), &amount)?;
        row += 1;
    }

    let total = report.total_row();
    sheet.write_string(row, 2, total[2].as_str())?;
    sheet.write_number_with_format(row, 3, report.total.as_f64(), &amount)?;

    for (col, width) in report.column_widths().iter().enumerate() {
        sheet.set_column_width(col as u16, *width as f64)?;
    }

    workbook.save_to_buffer()
}
