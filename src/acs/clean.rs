//! One cleaner per ACS table. Each returns `GEOID` plus its derived columns.

use std::collections::HashSet;

use anyhow::Result;
use polars::frame::DataFrame;

use super::{
    columns::{BinTable, ColumnSelector, NumberFormat},
    frame::{f64_values, keyed_frame, ratio, row_sum},
};

/// Signature shared by every table cleaner.
pub type Cleaner = fn(&DataFrame, NumberFormat) -> Result<DataFrame>;

/// Raw employment count, converted to a share of `total_pop` after linking.
pub const EMPLOYMENT_COL: &str = "Total_employment";

/// Raw vehicle count, converted to vehicles per capita after linking.
pub const VEHICLES_COL: &str = "Aggregate number of vehicles available_num_vehicles";

/// Commute-time bins of the ACS travel-time table, in minutes.
const COMMUTE_BINS: [(&str, f64, f64); 9] = [
    ("Less than 10 minutes_commute_time", 0.0, 10.0),
    ("10 to 14 minutes_commute_time", 10.0, 15.0),
    ("15 to 19 minutes_commute_time", 15.0, 20.0),
    ("20 to 24 minutes_commute_time", 20.0, 25.0),
    ("25 to 29 minutes_commute_time", 25.0, 30.0),
    ("30 to 34 minutes_commute_time", 30.0, 35.0),
    ("35 to 44 minutes_commute_time", 35.0, 45.0),
    ("45 to 59 minutes_commute_time", 45.0, 60.0),
    ("60 or more minutes_commute_time", 60.0, f64::INFINITY),
];

/// Median commute is 30-34 minutes, so anything from 35 up counts as long.
const LONG_COMMUTE_MIN: f64 = 35.0;

/// Commute mode columns and the share columns derived from them.
const COMMUTE_MODES: [(&str, &str); 4] = [
    ("Car, truck, or van_commute_time", "pct_car"),
    ("Walked_commute_time", "pct_walk"),
    ("Taxicab, motorcycle, bicycle, or other means_commute_time", "pct_other_mode"),
    ("Public transportation (excluding taxicab)_commute_time", "pct_transit"),
];

/// Closest income bin edge below the poverty line for a family of four ($26,200).
const POVERTY_INCOME: f64 = 25_000.0;

fn column_names(df: &DataFrame) -> Vec<&str> {
    df.get_column_names().into_iter().map(|name| name.as_str()).collect()
}

/// `total_pop` and the share of residents aged 15 to 64.
pub fn clean_population(df: &DataFrame, format: NumberFormat) -> Result<DataFrame> {
    let total = f64_values(df, "Total_population")?;
    let working_age = ColumnSelector::new(r"\d\d", format)?
        .select(column_names(df), 15.0, 65.0);
    let working_age = row_sum(df, &working_age)?;

    keyed_frame(df, vec![
        ("pct_working_age", ratio("pct_working_age", &working_age, &total)),
        ("total_pop", total),
    ])
}

/// `total_hh` and the share of households earning under $25,000.
pub fn clean_income(df: &DataFrame, format: NumberFormat) -> Result<DataFrame> {
    let total = f64_values(df, "Total_income")?;
    let poverty = ColumnSelector::new(&format.grouped_number_pattern(), format)?
        .select(column_names(df), 0.0, POVERTY_INCOME);
    let poverty = row_sum(df, &poverty)?;

    keyed_frame(df, vec![
        ("pct_hh_pov", ratio("pct_hh_pov", &poverty, &total)),
        ("total_hh", total),
    ])
}

/// White and Black shares; everything else is the complement and is not clamped.
pub fn clean_race(df: &DataFrame, _format: NumberFormat) -> Result<DataFrame> {
    let total = f64_values(df, "Total_race")?;
    let white = ratio("pct_white", &f64_values(df, "White alone_race")?, &total);
    let black = ratio("pct_black", &f64_values(df, "Black or African American alone_race")?, &total);
    let other = white.iter().zip(&black)
        .map(|(w, b)| Some(1.0 - (w.as_ref()? + b.as_ref()?)))
        .collect();

    keyed_frame(df, vec![("pct_white", white), ("pct_black", black), ("pct_other_race", other)])
}

/// Share of long commutes plus one share column per commute mode.
pub fn clean_commute(df: &DataFrame, _format: NumberFormat) -> Result<DataFrame> {
    let total = f64_values(df, "Total_commute_time")?;
    let long: HashSet<String> = BinTable::new(COMMUTE_BINS).within(LONG_COMMUTE_MIN, f64::INFINITY);
    let long = row_sum(df, &long)?;

    let mut columns = vec![("pct_long_commute", ratio("pct_long_commute", &long, &total))];
    for (mode, name) in COMMUTE_MODES {
        columns.push((name, ratio(name, &f64_values(df, mode)?, &total)));
    }
    keyed_frame(df, columns)
}

/// Employed count only; becomes `pct_employed` once `total_pop` is linked in.
pub fn clean_employment(df: &DataFrame, _format: NumberFormat) -> Result<DataFrame> {
    keyed_frame(df, vec![(EMPLOYMENT_COL, f64_values(df, EMPLOYMENT_COL)?)])
}

/// Vehicle count only; becomes `vehicles_per_capita` once `total_pop` is linked in.
pub fn clean_vehicles(df: &DataFrame, _format: NumberFormat) -> Result<DataFrame> {
    keyed_frame(df, vec![(VEHICLES_COL, f64_values(df, VEHICLES_COL)?)])
}

/// Share of residents of Hispanic or Latino origin.
pub fn clean_hispanic(df: &DataFrame, _format: NumberFormat) -> Result<DataFrame> {
    let total = f64_values(df, "Total_hispanic_res")?;
    let hispanic = f64_values(df, "Hispanic or Latino_hispanic_res")?;
    keyed_frame(df, vec![("pct_hispanic", ratio("pct_hispanic", &hispanic, &total))])
}
