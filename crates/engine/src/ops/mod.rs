use sea_orm::DatabaseConnection;

use crate::{ModeCatalog, ResultEngine, report::DEFAULT_CURRENCY_LABEL};

mod access;
mod dashboard;
mod entries;
mod reports;
mod sessions;

pub use entries::DateRange;
pub use reports::Export;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    modes: ModeCatalog,
    currency_label: String,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    modes: Option<ModeCatalog>,
    currency_label: Option<String>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Replace the default payment modes.
    pub fn modes(mut self, modes: ModeCatalog) -> EngineBuilder {
        self.modes = Some(modes);
        self
    }

    /// Currency shown in export headers, `INR` when unset or blank.
    pub fn currency_label(mut self, label: impl Into<String>) -> EngineBuilder {
        self.currency_label = Some(label.into());
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let currency_label = self
            .currency_label
            .map(|label| label.trim().to_string())
            .filter(|label| !label.is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY_LABEL.to_string());
        Ok(Engine {
            database: self.database,
            modes: self.modes.unwrap_or_default(),
            currency_label,
        })
    }
}
