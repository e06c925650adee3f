//! Userbase Export
//!
//! CSV export of collected customer data for marketing follow-up.

pub mod csv;

pub use csv::customers_to_csv;
