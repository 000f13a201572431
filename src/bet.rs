use cosmwasm_std::{Deps, DepsMut, Env, HexBinary, MessageInfo, Order, Response, StdResult};
use cw_storage_plus::Bound;

use crate::clock::has_passed;
use crate::custody;
use crate::error::ContractError;
use crate::msg::BetsResponse;
use crate::state::{Bet, BetState, BETS, BET_COUNTER, CONFIG};

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 30;

pub fn create_bet(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    description: String,
    event_id: HexBinary,
    deadline: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if has_passed(deadline, env.block.time.seconds()) {
        return Err(ContractError::DeadlineInPast {});
    }
    let amount = custody::must_pay(&info, &config.denom)?;

    let counter = BET_COUNTER.load(deps.storage)? + 1;
    let bet = Bet {
        id: counter,
        creator: info.sender,
        challenger: None,
        amount,
        challenger_amount: Default::default(),
        description,
        event_id,
        deadline,
        state: BetState::Open,
        winner: None,
    };

    BETS.save(deps.storage, counter, &bet)?;
    BET_COUNTER.save(deps.storage, &counter)?;
    custody::commit(deps.storage, amount)?;

    Ok(Response::new()
        .add_attribute("method", "create_bet")
        .add_attribute("bet_id", counter.to_string())
        .add_attribute("creator", bet.creator.to_string())
        .add_attribute("amount", amount)
        .add_attribute("deadline", deadline.to_string()))
}

pub fn accept_bet(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    bet_id: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut bet = BETS.load(deps.storage, bet_id)?;

    if bet.state != BetState::Open {
        return Err(ContractError::BetNotOpen { id: bet_id });
    }
    if has_passed(bet.deadline, env.block.time.seconds()) {
        return Err(ContractError::BetExpired {});
    }
    custody::must_pay_exact(&info, &config.denom, bet.amount)?;
    if info.sender == bet.creator {
        return Err(ContractError::SelfAcceptance {});
    }

    bet.challenger = Some(info.sender.clone());
    bet.challenger_amount = bet.amount;
    bet.state = BetState::Accepted;
    BETS.save(deps.storage, bet_id, &bet)?;
    custody::commit(deps.storage, bet.challenger_amount)?;

    Ok(Response::new()
        .add_attribute("method", "accept_bet")
        .add_attribute("bet_id", bet_id.to_string())
        .add_attribute("challenger", info.sender.to_string())
        .add_attribute("amount", bet.challenger_amount))
}

pub fn resolve_bet(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    bet_id: u64,
    winner: String,
) -> Result<Response, ContractError> {
    custody::nonpayable(&info)?;
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.oracle {
        return Err(ContractError::Unauthorized {});
    }

    let mut bet = BETS.load(deps.storage, bet_id)?;
    match bet.state {
        BetState::Accepted => {}
        BetState::Resolved => return Err(ContractError::AlreadyResolved { id: bet_id }),
        _ => return Err(ContractError::BetNotAccepted { id: bet_id }),
    }
    if !has_passed(bet.deadline, env.block.time.seconds()) {
        return Err(ContractError::DeadlineNotReached {});
    }

    let winner = deps.api.addr_validate(&winner)?;
    if winner != bet.creator && Some(&winner) != bet.challenger.as_ref() {
        return Err(ContractError::InvalidWinner {});
    }

    let payout = bet.held();
    bet.state = BetState::Resolved;
    bet.winner = Some(winner.clone());
    BETS.save(deps.storage, bet_id, &bet)?;
    custody::release(deps.storage, payout)?;

    let response = Response::new()
        .add_attribute("method", "resolve_bet")
        .add_attribute("bet_id", bet_id.to_string())
        .add_attribute("winner", winner.to_string())
        .add_attribute("payout", payout);
    Ok(custody::pay(response, &winner, payout, &config.denom))
}

/// Lets the creator take their stake back once the deadline passed without a
/// challenger.
pub fn cancel_bet(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    bet_id: u64,
) -> Result<Response, ContractError> {
    custody::nonpayable(&info)?;
    let config = CONFIG.load(deps.storage)?;
    let mut bet = BETS.load(deps.storage, bet_id)?;

    if info.sender != bet.creator {
        return Err(ContractError::Unauthorized {});
    }
    if bet.state != BetState::Open {
        return Err(ContractError::BetNotOpen { id: bet_id });
    }
    if !has_passed(bet.deadline, env.block.time.seconds()) {
        return Err(ContractError::DeadlineNotReached {});
    }

    let refund = bet.held();
    bet.state = BetState::Cancelled;
    BETS.save(deps.storage, bet_id, &bet)?;
    custody::release(deps.storage, refund)?;

    let response = Response::new()
        .add_attribute("method", "cancel_bet")
        .add_attribute("bet_id", bet_id.to_string())
        .add_attribute("refund", refund);
    Ok(custody::pay(response, &bet.creator, refund, &config.denom))
}

pub fn query_bet(deps: Deps, bet_id: u64) -> StdResult<Bet> {
    BETS.load(deps.storage, bet_id)
}

pub fn query_bets(deps: Deps, start_after: Option<u64>, limit: Option<u32>) -> StdResult<BetsResponse> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.map(Bound::exclusive);

    let bets = BETS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| item.map(|(_, bet)| bet))
        .collect::<StdResult<Vec<_>>>()?;

    Ok(BetsResponse { bets })
}
