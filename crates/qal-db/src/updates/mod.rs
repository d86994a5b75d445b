//! Update builder types for metrics mutations.
//!
//! Each builder produces an update struct with `Option` fields. Only `Some`
//! fields generate SET clauses in the dynamic UPDATE SQL. The structs also
//! deserialize directly from PUT request bodies, so an absent JSON field
//! means "leave unchanged".

pub mod pnl_metrics;
pub mod sub_pnl_detail;
pub mod sub_pnl_metrics;
