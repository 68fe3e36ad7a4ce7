//! Column helpers shared by the cleaners, the linker and the combiner.

use anyhow::{ensure, Context, Result};
use polars::{frame::DataFrame, prelude::{Column, DataType, SortMultipleOptions}};
use tracing::warn;

/// Join key shared by every table.
pub const KEY: &str = "GEOID";

/// Get a column as f64 values, nulls preserved.
pub(crate) fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df.column(name)
        .with_context(|| format!("[acs::frame] missing column {name:?}"))?
        .cast(&DataType::Float64)
        .with_context(|| format!("[acs::frame] column {name:?} is not numeric"))?;
    Ok(column.f64()?.into_iter().collect())
}

/// Row-wise sum over `names`, treating missing cells as zero.
/// Names are summed in sorted order so results do not depend on set iteration order.
pub(crate) fn row_sum<'a>(df: &DataFrame, names: impl IntoIterator<Item = &'a String>) -> Result<Vec<Option<f64>>> {
    let mut names = names.into_iter().collect::<Vec<_>>();
    names.sort();

    let mut sums = vec![0.0; df.height()];
    for name in names {
        for (sum, value) in sums.iter_mut().zip(f64_values(df, name)?) {
            *sum += value.unwrap_or(0.0);
        }
    }
    Ok(sums.into_iter().map(Some).collect())
}

/// Element-wise `numerator / denominator`. A zero or missing operand gives a missing ratio.
pub(crate) fn ratio(name: &str, numerator: &[Option<f64>], denominator: &[Option<f64>]) -> Vec<Option<f64>> {
    let values = numerator.iter().zip(denominator)
        .map(|(&n, &d)| match (n, d) {
            (Some(n), Some(d)) if d != 0.0 => Some(n / d),
            _ => None,
        })
        .collect::<Vec<_>>();

    let undefined = values.iter().filter(|v| v.is_none()).count();
    if undefined > 0 {
        warn!(column = name, undefined, "ratio left undefined where the denominator is zero or missing");
    }
    values
}

/// The key column of `df`, cast to i64. Rejects keys that are missing or not integers.
pub(crate) fn key_column(df: &DataFrame) -> Result<Column> {
    let column = df.column(KEY)
        .with_context(|| format!("[acs::frame] missing key column {KEY:?}"))?
        .cast(&DataType::Int64)
        .with_context(|| format!("[acs::frame] key column {KEY:?} cannot be read as integers"))?;
    ensure!(column.null_count() == 0, "[acs::frame] key column {KEY:?} has missing or non-integer values");
    Ok(column)
}

/// Build a table of the key column of `df` plus the given derived columns.
pub(crate) fn keyed_frame(df: &DataFrame, columns: Vec<(&str, Vec<Option<f64>>)>) -> Result<DataFrame> {
    let mut out = vec![key_column(df)?];
    out.extend(columns.into_iter().map(|(name, values)| Column::new(name.into(), values)));
    Ok(DataFrame::new(out)?)
}

/// Sort rows by key.
pub(crate) fn sort_by_key(df: &DataFrame) -> Result<DataFrame> {
    Ok(df.sort([KEY], SortMultipleOptions::default())?)
}
