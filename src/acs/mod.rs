//! ACS attribute tables: column discovery, per-table cleaners and linking.

mod clean;
mod columns;
mod frame;
mod link;

pub use clean::{
    clean_commute, clean_employment, clean_hispanic, clean_income, clean_population, clean_race,
    clean_vehicles, Cleaner, EMPLOYMENT_COL, VEHICLES_COL,
};
pub use columns::{Bin, BinTable, ColumnSelector, NumberFormat};
pub use frame::KEY;
pub use link::{find_per_pop, link_acs, merge_on_key, ACS_SOURCES, PER_POP};

pub(crate) use frame::{f64_values, ratio};
