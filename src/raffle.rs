use cosmwasm_std::{
    Addr, Deps, DepsMut, Env, MessageInfo, Order, Response, StdError, StdResult, Uint128, Uint256,
};
use cw_storage_plus::Bound;

use crate::clock::{end_time, has_passed, is_live, rfc3339};
use crate::custody;
use crate::error::ContractError;
use crate::msg::{RaffleEntriesResponse, RaffleResponse};
use crate::randomness;
use crate::state::{
    Config, Raffle, RaffleEntry, RaffleStatus, RandomnessConsumer, CONFIG, NEXT_RAFFLE_ID,
    RAFFLES, RAFFLE_ENTRIES, RAFFLE_PARTICIPANTS,
};

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 30;

pub fn create_raffle(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    ticket_price: Uint128,
    duration: u64,
) -> Result<Response, ContractError> {
    custody::nonpayable(&info)?;
    if ticket_price.is_zero() {
        return Err(ContractError::invalid("ticket price must be greater than zero"));
    }
    if duration == 0 {
        return Err(ContractError::invalid("duration must be greater than zero"));
    }

    let id = NEXT_RAFFLE_ID.load(deps.storage)?;
    let raffle = Raffle {
        id,
        creator: info.sender,
        ticket_price,
        end_time: end_time(env.block.time.seconds(), duration)?,
        active: true,
        status: RaffleStatus::Open,
        participant_count: 0,
        total_tickets: 0,
        total_pool: Uint128::zero(),
        pending_request: None,
        winner: None,
    };

    RAFFLES.save(deps.storage, id, &raffle)?;
    NEXT_RAFFLE_ID.save(deps.storage, &(id + 1))?;

    Ok(Response::new()
        .add_attribute("method", "create_raffle")
        .add_attribute("raffle_id", id.to_string())
        .add_attribute("ticket_price", ticket_price)
        .add_attribute("end_time", raffle.end_time.to_string()))
}

pub fn buy_ticket(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    raffle_id: u64,
    ticket_count: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut raffle = RAFFLES.load(deps.storage, raffle_id)?;

    if raffle.status != RaffleStatus::Open
        || !is_live(raffle.active, raffle.end_time, env.block.time.seconds())
    {
        return Err(ContractError::RaffleClosed {});
    }
    if ticket_count == 0 {
        return Err(ContractError::invalid("ticket count must be at least one"));
    }
    let cost = raffle.ticket_price.checked_mul(Uint128::from(ticket_count))?;
    custody::must_pay_exact(&info, &config.denom, cost)?;

    let total_tickets = raffle
        .total_tickets
        .checked_add(ticket_count)
        .ok_or_else(|| ContractError::invalid("ticket count overflow"))?;
    let total_pool = raffle.total_pool.checked_add(cost)?;

    let known = RAFFLE_PARTICIPANTS.may_load(deps.storage, (raffle_id, &info.sender))?;
    let (index, entry) = match known {
        Some(index) => {
            let mut entry = RAFFLE_ENTRIES.load(deps.storage, (raffle_id, index))?;
            // Per-entry counts never exceed the total, so they cannot overflow.
            entry.tickets += ticket_count;
            (index, entry)
        }
        None => {
            let index = raffle.participant_count;
            raffle.participant_count = index
                .checked_add(1)
                .ok_or_else(|| ContractError::invalid("participant count overflow"))?;
            (index, RaffleEntry { participant: info.sender.clone(), tickets: ticket_count })
        }
    };
    raffle.total_tickets = total_tickets;
    raffle.total_pool = total_pool;

    if known.is_none() {
        RAFFLE_PARTICIPANTS.save(deps.storage, (raffle_id, &info.sender), &index)?;
    }
    RAFFLE_ENTRIES.save(deps.storage, (raffle_id, index), &entry)?;
    RAFFLES.save(deps.storage, raffle_id, &raffle)?;
    custody::commit(deps.storage, cost)?;

    Ok(Response::new()
        .add_attribute("method", "buy_ticket")
        .add_attribute("raffle_id", raffle_id.to_string())
        .add_attribute("buyer", info.sender.to_string())
        .add_attribute("tickets", ticket_count.to_string())
        .add_attribute("total_pool", raffle.total_pool))
}

/// Closes a finished raffle and asks for randomness. Nobody is paid here; the
/// payout happens when the oracle fulfils the request.
pub fn close_and_draw(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    raffle_id: u64,
) -> Result<Response, ContractError> {
    custody::nonpayable(&info)?;
    let config = CONFIG.load(deps.storage)?;
    let mut raffle = RAFFLES.load(deps.storage, raffle_id)?;

    if raffle.pending_request.is_some() {
        return Err(ContractError::DrawPending { id: raffle_id });
    }
    if !raffle.active || raffle.status != RaffleStatus::Open {
        return Err(ContractError::RaffleClosed {});
    }
    if !has_passed(raffle.end_time, env.block.time.seconds()) {
        return Err(ContractError::RaffleNotEnded {});
    }

    raffle.active = false;
    let response = Response::new()
        .add_attribute("method", "close_and_draw")
        .add_attribute("raffle_id", raffle_id.to_string());

    if raffle.participant_count == 0 {
        // Nothing was collected, so there is nothing to refund or pay.
        raffle.status = RaffleStatus::Resolved;
        RAFFLES.save(deps.storage, raffle_id, &raffle)?;
        return Ok(response.add_attribute("winner", "none"));
    }

    let request = randomness::request(
        deps.storage,
        &env,
        &config,
        RandomnessConsumer::Raffle { raffle_id },
    )?;
    raffle.status = RaffleStatus::AwaitingRandomness;
    raffle.pending_request = Some(request.id);
    RAFFLES.save(deps.storage, raffle_id, &raffle)?;
    deps.api.debug(&format!(
        "raffle {raffle_id} requested randomness, request {}",
        request.id
    ));

    Ok(randomness::request_attributes(response, &request))
}

/// Callback from the randomness gateway. Pays the entire pool to the drawn
/// participant.
pub(crate) fn on_randomness(
    deps: DepsMut,
    config: &Config,
    raffle_id: u64,
    request_id: u64,
    random_value: Uint256,
) -> Result<Response, ContractError> {
    let mut raffle = RAFFLES.load(deps.storage, raffle_id)?;
    if raffle.status != RaffleStatus::AwaitingRandomness
        || raffle.pending_request != Some(request_id)
    {
        return Err(ContractError::UnknownRequest { id: request_id });
    }

    let entries = RAFFLE_ENTRIES
        .prefix(raffle_id)
        .range(deps.storage, None, None, Order::Ascending)
        .map(|item| item.map(|(_, entry)| entry));
    let winner = draw_winner(entries, raffle.total_tickets, random_value)?;
    let payout = raffle.total_pool;

    raffle.status = RaffleStatus::Resolved;
    raffle.pending_request = None;
    raffle.winner = Some(winner.clone());
    RAFFLES.save(deps.storage, raffle_id, &raffle)?;
    custody::release(deps.storage, payout)?;

    let response = Response::new()
        .add_attribute("method", "raffle_drawn")
        .add_attribute("raffle_id", raffle_id.to_string())
        .add_attribute("winner", winner.to_string())
        .add_attribute("payout", payout);
    Ok(custody::pay(response, &winner, payout, &config.denom))
}

/// Maps a random value onto the weighted draw space.
///
/// Ticket `i` (0-based, `i = random_value mod total_tickets`) belongs to the
/// first entry whose running ticket total exceeds `i`, walking entries in
/// first-purchase order. With entries holding 2 and 3 tickets, indices 0..2 pick
/// the first participant and 2..5 the second. Entries are read lazily and the
/// walk stops at the owning entry.
pub fn draw_winner<I>(entries: I, total_tickets: u64, random_value: Uint256) -> StdResult<Addr>
where
    I: IntoIterator<Item = StdResult<RaffleEntry>>,
{
    if total_tickets == 0 {
        return Err(StdError::generic_err("No tickets sold"));
    }

    let index = random_value % Uint256::from(total_tickets);
    // index < total_tickets, so it fits in a u64.
    let index = Uint128::try_from(index)
        .map_err(|_| StdError::generic_err("Ticket index overflow"))?
        .u128() as u64;

    let mut cumulative = 0u64;
    for entry in entries {
        let entry = entry?;
        cumulative += entry.tickets;
        if index < cumulative {
            return Ok(entry.participant);
        }
    }
    Err(StdError::generic_err("Ticket index outside the draw space"))
}

pub fn query_raffle(deps: Deps, env: Env, raffle_id: u64) -> StdResult<RaffleResponse> {
    let raffle = RAFFLES.load(deps.storage, raffle_id)?;
    let now = env.block.time.seconds();

    Ok(RaffleResponse {
        active: raffle.status == RaffleStatus::Open
            && is_live(raffle.active, raffle.end_time, now),
        ends_at: rfc3339(raffle.end_time)?,
        id: raffle.id,
        creator: raffle.creator,
        ticket_price: raffle.ticket_price,
        end_time: raffle.end_time,
        status: raffle.status,
        participant_count: raffle.participant_count,
        total_tickets: raffle.total_tickets,
        total_pool: raffle.total_pool,
        pending_request: raffle.pending_request,
        winner: raffle.winner,
    })
}

/// Entries in draw order, paginated by participant index.
pub fn query_raffle_entries(
    deps: Deps,
    raffle_id: u64,
    start_after: Option<u32>,
    limit: Option<u32>,
) -> StdResult<RaffleEntriesResponse> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.map(Bound::exclusive);

    let entries = RAFFLE_ENTRIES
        .prefix(raffle_id)
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| item.map(|(_, entry)| entry))
        .collect::<StdResult<Vec<_>>>()?;

    Ok(RaffleEntriesResponse { entries })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<StdResult<RaffleEntry>> {
        vec![
            Ok(RaffleEntry { participant: Addr::unchecked("alice"), tickets: 2 }),
            Ok(RaffleEntry { participant: Addr::unchecked("bob"), tickets: 3 }),
        ]
    }

    #[test]
    fn draw_maps_value_onto_cumulative_ranges() {
        let pick = |v: u64| draw_winner(entries(), 5, Uint256::from(v)).unwrap().to_string();

        assert_eq!(pick(0), "alice");
        assert_eq!(pick(1), "alice");
        assert_eq!(pick(2), "bob");
        assert_eq!(pick(4), "bob");
        // 7 mod 5 = 2
        assert_eq!(pick(7), "bob");
        // 10 mod 5 = 0
        assert_eq!(pick(10), "alice");
    }

    #[test]
    fn draw_reduces_full_width_values() {
        // 2^256 - 1 mod 5 = 0
        assert_eq!(draw_winner(entries(), 5, Uint256::MAX).unwrap().as_str(), "alice");
    }

    #[test]
    fn draw_without_tickets_fails() {
        assert!(draw_winner(Vec::<StdResult<RaffleEntry>>::new(), 0, Uint256::from(3u64)).is_err());
    }

    #[test]
    fn draw_stops_at_the_owning_entry() {
        let entries = vec![
            Ok(RaffleEntry { participant: Addr::unchecked("alice"), tickets: 2 }),
            Err(StdError::generic_err("unreadable")),
        ];
        assert_eq!(draw_winner(entries, 5, Uint256::from(1u64)).unwrap().as_str(), "alice");
    }

    #[test]
    fn draw_is_proportional_to_tickets() {
        let bob_wins = (0u64..500)
            .filter(|v| draw_winner(entries(), 5, Uint256::from(*v)).unwrap().as_str() == "bob")
            .count();
        assert_eq!(bob_wins, 300);
    }
}
