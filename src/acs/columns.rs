//! Column discovery for binned ACS tables.
//!
//! ACS exports name their bin columns after the bin itself, e.g.
//! `"$10,000 to $14,999_income"` or `"15 to 17 years_population"`.
//! [`ColumnSelector`] finds bins by the numbers embedded in such names;
//! [`BinTable`] is the explicit alternative when the bins are known up front.

use std::collections::HashSet;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// How numbers embedded in column names are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberFormat {
    /// Digit-group separator, e.g. `,` in `25,000`. `None` means plain digits.
    pub thousands_separator: Option<char>,
}

impl NumberFormat {
    pub const PLAIN: Self = Self { thousands_separator: None };

    pub const fn with_thousands(separator: char) -> Self {
        Self { thousands_separator: Some(separator) }
    }

    /// Parse a number token, ignoring digit-group separators.
    pub fn parse(&self, token: &str) -> Option<f64> {
        let token = token.trim();
        match self.thousands_separator {
            Some(sep) => token.chars().filter(|&c| c != sep).collect::<String>().parse().ok(),
            None => token.parse().ok(),
        }
    }

    /// Pattern matching one grouped number (`10,000`) under this format.
    pub fn grouped_number_pattern(&self) -> String {
        match self.thousands_separator {
            Some(sep) => format!(r"\d.*?\d{}\d+", regex::escape(&sep.to_string())),
            None => r"\d+".to_string(),
        }
    }
}

impl Default for NumberFormat {
    fn default() -> Self { Self::with_thousands(',') }
}

/// Selects columns whose names embed a number inside a half-open range.
#[derive(Debug, Clone)]
pub struct ColumnSelector {
    pattern: Regex,
    format: NumberFormat,
}

impl ColumnSelector {
    /// `pattern` extracts the number tokens from each column name.
    pub fn new(pattern: &str, format: NumberFormat) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .with_context(|| format!("[acs::columns] invalid column pattern: {pattern}"))?;
        Ok(Self { pattern, format })
    }

    /// Names containing at least one extracted number `n` with `lo <= n < hi`.
    pub fn select<'a>(&self, columns: impl IntoIterator<Item = &'a str>, lo: f64, hi: f64) -> HashSet<String> {
        columns.into_iter()
            .filter(|name| self.pattern.find_iter(name)
                .filter_map(|m| self.format.parse(m.as_str()))
                .any(|n| lo <= n && n < hi))
            .map(str::to_string)
            .collect()
    }
}

/// A single labelled bin covering `[lo, hi)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub label: String,
    pub lo: f64,
    pub hi: f64,
}

/// Explicit mapping from bin labels to their ranges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BinTable {
    bins: Vec<Bin>,
}

impl BinTable {
    pub fn new<'a>(bins: impl IntoIterator<Item = (&'a str, f64, f64)>) -> Self {
        Self {
            bins: bins.into_iter()
                .map(|(label, lo, hi)| Bin { label: label.to_string(), lo, hi })
                .collect(),
        }
    }

    /// Labels of every bin lying entirely inside `[lo, hi)`.
    pub fn within(&self, lo: f64, hi: f64) -> HashSet<String> {
        self.bins.iter()
            .filter(|bin| lo <= bin.lo && bin.hi <= hi)
            .map(|bin| bin.label.clone())
            .collect()
    }
}
