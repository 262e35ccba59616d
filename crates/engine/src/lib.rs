pub use aggregation::{
    MONTH_WINDOW, ModeTotal, MonthBucket, RECENT_LIMIT, RECENT_PER_KIND, RecentItem, Summary,
    mode_breakdown, monthly_series, recent_activity, summarize,
};
pub use commands::{CreateEntryCmd, RegisterUserCmd, UpdateEntryCmd};
pub use entry::{EntryKind, LedgerEntry};
pub use error::EngineError;
pub use modes::ModeCatalog;
pub use money::Money;
pub use ops::{DateRange, Engine, EngineBuilder, Export};
pub use profiles::{Profile, Role};
pub use report::{DEFAULT_CURRENCY_LABEL, Report, ReportFormat, format_date};
pub use scope::{Scope, resolve_scope};
pub use sessions::Session;
pub use users::User;
pub use util::parse_date;

mod aggregation;
mod commands;
mod entry;
mod error;
mod modes;
mod money;
mod ops;
mod profiles;
mod report;
mod scope;
mod sessions;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
