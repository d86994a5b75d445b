//! HTTP handlers, one module per resource.

pub(crate) mod history;
pub(crate) mod meta;
pub(crate) mod metrics;
pub(crate) mod pnls;
pub(crate) mod sub_pnls;

use crate::error::ApiError;

/// Path ids arrive as strings so bad ones become a 400 validation error
/// before any storage call, not a router-level rejection.
pub(crate) fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::Validation(format!("invalid id: {raw}")))
}
