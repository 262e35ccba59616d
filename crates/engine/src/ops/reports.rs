use chrono::NaiveDate;

use crate::{EntryKind, Report, ReportFormat, ResultEngine};

use super::Engine;

/// A rendered export ready to be written or served.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Export {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl Engine {
    /// Every entry of `kind` visible to `username`, ordered for export.
    pub async fn report(
        &self,
        username: &str,
        kind: EntryKind,
        generated_on: NaiveDate,
    ) -> ResultEngine<Report> {
        let scope = self.scope_for(username).await?;
        let entries = self.entries(kind, &scope, None).await?;
        Ok(Report::build(
            kind,
            entries,
            generated_on,
            self.currency_label.clone(),
        ))
    }

    /// Render the report of `kind` for `username` in `format`.
    pub async fn export(
        &self,
        username: &str,
        kind: EntryKind,
        format: ReportFormat,
        generated_on: NaiveDate,
    ) -> ResultEngine<Export> {
        let report = self.report(username, kind, generated_on).await?;
        let bytes = report.render(format)?;
        tracing::info!(
            user = username,
            kind = kind.as_str(),
            format = format.extension(),
            rows = report.lines.len(),
            "export rendered"
        );
        Ok(Export {
            file_name: report.file_name(format),
            content_type: format.content_type(),
            bytes,
        })
    }
}
