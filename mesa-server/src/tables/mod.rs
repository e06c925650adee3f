//! Table Occupancy
//!
//! Reservation, occupancy and merge-group management for dining tables.
//! Every status mutation is a check-and-set against the table version, so
//! two terminals racing for the same table can never both win.

pub mod service;

pub use service::{BatchFailure, BatchOutcome, MergeResult, TableService};
