//! Allowed payment modes.
//!
//! Both income and expense entries draw their mode from a closed set. The sets
//! are supplied at engine construction so deployments can extend them.

use crate::{EngineError, EntryKind, ResultEngine};

const DEFAULT_MODES: [&str; 7] = ["cash", "d_cash", "icici", "idfc", "sbi", "alpha", "hdfc"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModeCatalog {
    income: Vec<String>,
    expense: Vec<String>,
}

impl Default for ModeCatalog {
    fn default() -> Self {
        let defaults: Vec<String> = DEFAULT_MODES.iter().map(ToString::to_string).collect();
        Self {
            income: defaults.clone(),
            expense: defaults,
        }
    }
}

impl ModeCatalog {
    /// Build a catalog from explicit lists. Codes are trimmed, duplicates are
    /// dropped keeping the first occurrence, and each list must end up
    /// non-empty.
    pub fn new<I, E>(income: I, expense: E) -> ResultEngine<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Ok(Self {
            income: normalize_list(income, EntryKind::Income)?,
            expense: normalize_list(expense, EntryKind::Expense)?,
        })
    }

    pub fn allowed(&self, kind: EntryKind) -> &[String] {
        match kind {
            EntryKind::Income => &self.income,
            EntryKind::Expense => &self.expense,
        }
    }

    /// Return the canonical mode code or a validation error.
    pub fn validate(&self, kind: EntryKind, mode: &str) -> ResultEngine<String> {
        let trimmed = mode.trim();
        self.allowed(kind)
            .iter()
            .find(|allowed| allowed.as_str() == trimmed)
            .cloned()
            .ok_or_else(|| {
                EngineError::Validation(format!(
                    "invalid {} mode: {trimmed}",
                    kind.as_str()
                ))
            })
    }
}

fn normalize_list<L>(modes: L, kind: EntryKind) -> ResultEngine<Vec<String>>
where
    L: IntoIterator,
    L::Item: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for mode in modes {
        let mode = mode.as_ref().trim();
        if mode.is_empty() {
            return Err(EngineError::Validation(format!(
                "{} mode must not be empty",
                kind.as_str()
            )));
        }
        if !out.iter().any(|m| m == mode) {
            out.push(mode.to_string());
        }
    }
    if out.is_empty() {
        return Err(EngineError::Validation(format!(
            "at least one {} mode is required",
            kind.as_str()
        )));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_is_closed_for_both_kinds() {
        let catalog = ModeCatalog::default();
        assert_eq!(catalog.validate(EntryKind::Expense, "cash").unwrap(), "cash");
        assert_eq!(catalog.validate(EntryKind::Income, " sbi ").unwrap(), "sbi");
        assert!(catalog.validate(EntryKind::Income, "paypal").is_err());
        assert!(catalog.validate(EntryKind::Expense, "").is_err());
    }

    #[test]
    fn custom_catalog_dedups_and_rejects_blank() {
        let catalog = ModeCatalog::new(["cash", "cash", "upi"], ["cash"]).unwrap();
        assert_eq!(catalog.allowed(EntryKind::Income), ["cash", "upi"]);
        assert!(ModeCatalog::new(["cash", " "], ["cash"]).is_err());
        assert!(ModeCatalog::new(Vec::<String>::new(), ["cash"]).is_err());
    }
}
