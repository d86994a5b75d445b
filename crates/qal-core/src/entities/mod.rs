//! Entity structs for all QAlytics domain objects.
//!
//! Each entity maps to a table in the libSQL database. All structs derive
//! `Serialize` and `Deserialize`; their JSON form is the wire form served
//! by `qal-server`, so optional fields serialize as explicit nulls.

mod history;
mod pnl;
mod sub_pnl;

pub use history::{ActorRef, HistoryEntry, NewHistoryEntry};
pub use pnl::{Pnl, PnlMetrics};
pub use sub_pnl::{SubPnl, SubPnlDetailMetrics, SubPnlMetrics};
