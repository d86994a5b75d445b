//! Repository modules implementing CRUD and history operations.
//!
//! Each module adds methods to `MetricsService` via `impl MetricsService`
//! blocks. Tracked metrics mutations record their history entry through
//! `record_history` in the `history` module.

pub mod history;
pub mod pnl;
pub mod sub_pnl;
pub mod sub_pnl_detail;
