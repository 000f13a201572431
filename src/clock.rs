use cosmwasm_std::{StdError, StdResult};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::error::ContractError;

pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 60 * 60;

/// 9999-12-31T23:59:59Z, the last instant [`rfc3339`] can render.
pub const MAX_TIMESTAMP: u64 = 253_402_300_799;

/// Liveness of anything with an end time. The stored flag alone is never
/// trusted: an entity stops being live once `now` reaches `end_time`, whether
/// or not anyone flipped the flag.
pub fn is_live(active: bool, end_time: u64, now: u64) -> bool {
    active && now < end_time
}

pub fn has_passed(deadline: u64, now: u64) -> bool {
    now >= deadline
}

/// End of a period starting at `now`. Anything past [`MAX_TIMESTAMP`] is
/// rejected so stored end times stay renderable by queries.
pub fn end_time(now: u64, duration: u64) -> Result<u64, ContractError> {
    match now.checked_add(duration) {
        Some(end) if end <= MAX_TIMESTAMP => Ok(end),
        _ => Err(ContractError::invalid(format!(
            "end time must not be later than {MAX_TIMESTAMP}"
        ))),
    }
}

pub fn rfc3339(seconds: u64) -> StdResult<String> {
    let seconds = i64::try_from(seconds).map_err(|_| StdError::generic_err("Invalid timestamp"))?;
    OffsetDateTime::from_unix_timestamp(seconds)
        .map_err(|_| StdError::generic_err("Invalid timestamp"))?
        .format(&Rfc3339)
        .map_err(|_| StdError::generic_err("Failed to format timestamp"))
}
