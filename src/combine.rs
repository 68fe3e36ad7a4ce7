use anyhow::Result;
use polars::{frame::DataFrame, prelude::Column};
use tracing::info;

use crate::acs::{f64_values, merge_on_key, ratio};

/// Join linked ACS attributes with the block-group geography table on `GEOID`, then add
/// `density` (people per square mile) and `interaction` (stop count × transit share).
pub fn combine(attributes: &DataFrame, geography: &DataFrame) -> Result<DataFrame> {
    let mut df = merge_on_key(vec![attributes.clone(), geography.clone()])?;

    let density = ratio("density", &f64_values(&df, "total_pop")?, &f64_values(&df, "area")?);
    let interaction = f64_values(&df, "num_stops")?.into_iter()
        .zip(f64_values(&df, "pct_transit")?)
        .map(|(stops, transit)| Some(stops? * transit?))
        .collect::<Vec<_>>();

    df.with_column(Column::new("density".into(), density))?;
    df.with_column(Column::new("interaction".into(), interaction))?;

    info!(rows = df.height(), columns = df.width(), "combined attributes with geography");
    Ok(df)
}
