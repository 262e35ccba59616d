//! Tabular exports of a scoped, date ordered entry set.
//!
//! A [`Report`] holds the rows in export order plus their total; the two
//! encoders in this module turn it into a spreadsheet or a paginated
//! document. Both encoders only depend on the report content, so the same
//! report always produces the same bytes.

use chrono::NaiveDate;

use crate::{EntryKind, LedgerEntry, Money, ResultEngine};

mod document;
mod spreadsheet;

/// Extra character cells added to the widest value of a spreadsheet column.
pub const COLUMN_PADDING: usize = 2;

pub const DEFAULT_CURRENCY_LABEL: &str = "INR";

const TOTAL_LABEL: &str = "Total";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportFormat {
    Spreadsheet,
    Paginated,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Spreadsheet => "xlsx",
            Self::Paginated => "pdf",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Spreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            Self::Paginated => "application/pdf",
        }
    }
}

impl TryFrom<&str> for ReportFormat {
    type Error = crate::EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "xlsx" => Ok(Self::Spreadsheet),
            "pdf" => Ok(Self::Paginated),
            other => Err(crate::EngineError::Validation(format!(
                "unsupported export format: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportLine {
    pub date: NaiveDate,
    pub description: String,
    pub mode: String,
    pub amount: Money,
}

/// One rendered table row: date, description, mode, amount.
pub type Cells = [String; 4];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub kind: EntryKind,
    /// Day the export was produced; used in the file name and document
    /// metadata.
    pub generated_on: NaiveDate,
    pub currency_label: String,
    pub lines: Vec<ReportLine>,
    pub total: Money,
}

impl Report {
    /// Order `entries` oldest first (date, then creation time, then id) and
    /// compute their total.
    pub fn build(
        kind: EntryKind,
        mut entries: Vec<LedgerEntry>,
        generated_on: NaiveDate,
        currency_label: impl Into<String>,
    ) -> Self {
        entries.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });

        let total = entries.iter().map(|e| e.amount).sum();
        let lines = entries
            .into_iter()
            .map(|entry| ReportLine {
                date: entry.date,
                description: entry.description,
                mode: entry.mode,
                amount: entry.amount,
            })
            .collect();

        Self {
            kind,
            generated_on,
            currency_label: currency_label.into(),
            lines,
            total,
        }
    }

    pub fn title(&self) -> String {
        format!("{} Report", self.kind.title())
    }

    pub fn headers(&self) -> Cells {
        [
            "Date".to_string(),
            "Description".to_string(),
            "Mode".to_string(),
            format!("Amount ({})", self.currency_label),
        ]
    }

    /// Data rows followed by the total row.
    pub fn rows(&self) -> Vec<Cells> {
        self.lines
            .iter()
            .map(|line| {
                [
                    format_date(line.date),
                    line.description.clone(),
                    line.mode.clone(),
                    line.amount.to_string(),
                ]
            })
            .chain(std::iter::once(self.total_row()))
            .collect()
    }

    pub fn total_row(&self) -> Cells {
        [
            String::new(),
            String::new(),
            TOTAL_LABEL.to_string(),
            self.total.to_string(),
        ]
    }

    /// Spreadsheet column widths: longest rendered value (header included)
    /// plus [`COLUMN_PADDING`].
    pub fn column_widths(&self) -> [usize; 4] {
        let mut widths = [0usize; 4];
        for row in std::iter::once(self.headers()).chain(self.rows()) {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.chars().count());
            }
        }
        widths.map(|w| w + COLUMN_PADDING)
    }

    /// `{kind}_{YYYY-MM-DD}.{ext}`, e.g. `expenses_2025-01-31.xlsx`.
    pub fn file_name(&self, format: ReportFormat) -> String {
        format!(
            "{}_{}.{}",
            self.kind.export_name(),
            self.generated_on.format("%Y-%m-%d"),
            format.extension()
        )
    }

    pub fn render(&self, format: ReportFormat) -> ResultEngine<Vec<u8>> {
        match format {
            ReportFormat::Spreadsheet => spreadsheet::render(self),
            ReportFormat::Paginated => document::render(self),
        }
    }
}

/// `05-Jan-2025`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d-%b-%Y").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn entry(day: u32, description: &str, mode: &str, amount: &str) -> LedgerEntry {
        LedgerEntry::new(
            EntryKind::Expense,
            "alice",
            NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            description,
            mode,
            amount.parse().unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap(),
        )
    }

    fn sample() -> Report {
        Report::build(
            EntryKind::Expense,
            vec![
                entry(20, "Groceries", "sbi", "200.00"),
                entry(5, "Rent", "cash", "500.00"),
            ],
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            DEFAULT_CURRENCY_LABEL,
        )
    }

    #[test]
    fn rows_are_oldest_first_with_total() {
        let report = sample();
        let rows = report.rows();

        assert_eq!(rows.len(), report.lines.len() + 1);
        assert_eq!(rows[0], ["05-Jan-2025", "Rent", "cash", "500.00"]);
        assert_eq!(rows[1], ["20-Jan-2025", "Groceries", "sbi", "200.00"]);
        assert_eq!(rows[2], ["", "", "Total", "700.00"]);
    }

    #[test]
    fn total_matches_sum_of_data_rows() {
        let report = sample();
        let sum: Money = report
            .rows()
            .iter()
            .take(report.lines.len())
            .map(|row| row[3].parse::<Money>().unwrap())
            .sum();
        assert_eq!(sum, report.total);
    }

    #[test]
    fn empty_report_has_only_total_row() {
        let report = Report::build(
            EntryKind::Income,
            Vec::new(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            DEFAULT_CURRENCY_LABEL,
        );
        assert_eq!(report.rows(), vec![["", "", "Total", "0.00"].map(String::from)]);
    }

    #[test]
    fn column_widths_pad_longest_value() {
        let report = sample();
        // "20-Jan-2025", "Description", "Total", "Amount (INR)".
        assert_eq!(report.column_widths(), [13, 13, 7, 14]);
    }

    #[test]
    fn file_names_follow_kind_and_date() {
        let report = sample();
        assert_eq!(
            report.file_name(ReportFormat::Spreadsheet),
            "expenses_2025-01-31.xlsx"
        );
        assert_eq!(
            report.file_name(ReportFormat::Paginated),
            "expenses_2025-01-31.pdf"
        );
        assert_eq!(report.title(), "Expenses Report");
    }

    #[test]
    fn rendering_is_deterministic() {
        let report = sample();
        for format in [ReportFormat::Spreadsheet, ReportFormat::Paginated] {
            let first = report.render(format).unwrap();
            let second = report.clone().render(format).unwrap();
            assert!(!first.is_empty());
            assert_eq!(first, second);
        }
    }

    #[test]
    fn encoders_emit_expected_containers() {
        let report = sample();
        let xlsx = report.render(ReportFormat::Spreadsheet).unwrap();
        assert_eq!(&xlsx[..2], b"PK");
        let pdf = report.render(ReportFormat::Paginated).unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
    }
}
