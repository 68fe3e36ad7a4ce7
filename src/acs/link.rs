use std::path::Path;

use anyhow::{bail, Context, Result};
use polars::{frame::DataFrame, prelude::*};
use tracing::{debug, info};

use crate::{common::require_dir_exists, io::csv::read_csv};
use super::{
    clean::{self, Cleaner, EMPLOYMENT_COL, VEHICLES_COL},
    columns::NumberFormat,
    frame::{f64_values, ratio, sort_by_key, KEY},
};

/// Every ACS table in the input folder, paired with its cleaner.
pub const ACS_SOURCES: [(&str, Cleaner); 7] = [
    ("population.csv", clean::clean_population),
    ("income.csv", clean::clean_income),
    ("race.csv", clean::clean_race),
    ("commute_time.csv", clean::clean_commute),
    ("employment.csv", clean::clean_employment),
    ("num_vehicles.csv", clean::clean_vehicles),
    ("hispanic_res.csv", clean::clean_hispanic),
];

/// (numerator, denominator, new column) ratios that need columns from more than one table.
pub const PER_POP: [(&str, &str, &str); 2] = [
    (EMPLOYMENT_COL, "total_pop", "pct_employed"),
    (VEHICLES_COL, "total_pop", "vehicles_per_capita"),
];

/// Load, clean and link every ACS table in `folder` into one table keyed by `GEOID`.
pub fn link_acs(folder: &Path, sources: &[(&str, Cleaner)], format: NumberFormat) -> Result<DataFrame> {
    require_dir_exists(folder)?;

    let tables = sources.iter()
        .map(|(file, cleaner)| {
            let raw = read_csv(&folder.join(file))?;
            let cleaned = cleaner(&raw, format)
                .with_context(|| format!("[acs::link] Failed to clean {file}"))?;
            debug!(file, rows = cleaned.height(), "cleaned ACS table");
            Ok(cleaned)
        })
        .collect::<Result<Vec<_>>>()?;

    let linked = find_per_pop(merge_on_key(tables)?, &PER_POP)?;
    info!(tables = sources.len(), rows = linked.height(), "linked ACS tables");
    Ok(linked)
}

/// Progressively inner-join tables on `GEOID`, keeping only keys present in all of them.
pub fn merge_on_key(tables: Vec<DataFrame>) -> Result<DataFrame> {
    let mut tables = tables.into_iter();
    let Some(first) = tables.next() else { bail!("[acs::link] no tables to merge") };

    let merged = tables.try_fold(first, |acc, df| acc.inner_join(&df, [KEY], [KEY]))?;
    sort_by_key(&merged)
}

/// Replace each numerator column by its ratio to the denominator, under a new name.
pub fn find_per_pop(mut df: DataFrame, triples: &[(&str, &str, &str)]) -> Result<DataFrame> {
    for &(numerator, denominator, name) in triples {
        let values = ratio(name, &f64_values(&df, numerator)?, &f64_values(&df, denominator)?);
        df.with_column(Column::new(name.into(), values))?;
        df.drop_in_place(numerator)?;
    }
    Ok(df)
}
