//! Per-batch error ledger.

use std::fmt;

/// Ordered mapping of item name to the error strings recorded for it.
///
/// Names keep first-seen order. A name recorded twice (two variations of
/// the same item, say) accumulates both rows' errors under one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorLedger {
    entries: Vec<(String, Vec<String>)>,
}

impl ErrorLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `errors` under `name`.
    pub fn record(&mut self, name: &str, errors: impl IntoIterator<Item = String>) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => existing.extend(errors),
            None => self.entries.push((name.to_string(), errors.into_iter().collect())),
        }
    }

    /// Errors recorded for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, errors)| errors.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct item names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, errors)| (name.as_str(), errors.as_slice()))
    }
}

/// Tab-indented listing: each name on its own line, its errors below it.
impl fmt::Display for ErrorLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, errors) in self.iter() {
            writeln!(f, "\t{name}")?;
            for error in errors {
                writeln!(f, "\t\t{error}")?;
            }
        }
        Ok(())
    }
}
