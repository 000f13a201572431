use cosmwasm_std::{Deps, DepsMut, Env, MessageInfo, Response, StdError, StdResult};

use crate::clock::{end_time, is_live, rfc3339};
use crate::custody;
use crate::error::ContractError;
use crate::msg::{HasVotedResponse, PollResponse};
use crate::state::{Poll, NEXT_POLL_ID, POLLS, VOTER_STATE};

pub const MIN_OPTIONS: u32 = 2;
pub const MAX_OPTIONS: u32 = 32;

pub fn create_poll(
    deps: DepsMut,
    info: MessageInfo,
    env: Env,
    question: String,
    option_count: u32,
    duration: u64,
) -> Result<Response, ContractError> {
    custody::nonpayable(&info)?;
    if question.trim().is_empty() {
        return Err(ContractError::invalid("question must not be empty"));
    }
    if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&option_count) {
        return Err(ContractError::invalid(format!(
            "option count must be between {MIN_OPTIONS} and {MAX_OPTIONS}"
        )));
    }
    if duration == 0 {
        return Err(ContractError::invalid("duration must be greater than zero"));
    }

    let now = env.block.time.seconds();
    let id = NEXT_POLL_ID.load(deps.storage)?;
    let new_poll = Poll {
        id,
        creator: info.sender,
        question,
        votes: vec![0; option_count as usize],
        voter_count: 0,
        start_time: now,
        end_time: end_time(now, duration)?,
        active: true,
    };

    POLLS.save(deps.storage, id, &new_poll)?;
    NEXT_POLL_ID.save(deps.storage, &(id + 1))?;

    Ok(Response::new()
        .add_attribute("method", "create_poll")
        .add_attribute("poll_id", id.to_string())
        .add_attribute("creator", new_poll.creator.to_string())
        .add_attribute("end_time", new_poll.end_time.to_string()))
}

pub fn vote(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    poll_id: u64,
    option_index: u32,
) -> Result<Response, ContractError> {
    custody::nonpayable(&info)?;
    let mut poll = POLLS.load(deps.storage, poll_id)?;

    if !is_live(poll.active, poll.end_time, env.block.time.seconds()) {
        return Err(ContractError::PollClosed {});
    }

    let option_count = poll.votes.len() as u32;
    if option_index >= option_count {
        return Err(ContractError::InvalidOption { index: option_index, option_count });
    }

    let voter_key = (poll_id, &info.sender);
    if VOTER_STATE.may_load(deps.storage, voter_key)?.unwrap_or(false) {
        return Err(ContractError::AlreadyVoted {});
    }

    poll.votes[option_index as usize] += 1;
    poll.voter_count += 1;
    POLLS.save(deps.storage, poll_id, &poll)?;
    VOTER_STATE.save(deps.storage, voter_key, &true)?;

    Ok(Response::new()
        .add_attribute("method", "vote")
        .add_attribute("poll_id", poll_id.to_string())
        .add_attribute("voter", info.sender.to_string())
        .add_attribute("option", option_index.to_string()))
}

pub fn close_poll(
    deps: DepsMut,
    info: MessageInfo,
    poll_id: u64,
) -> Result<Response, ContractError> {
    custody::nonpayable(&info)?;
    let mut poll = POLLS.load(deps.storage, poll_id)?;
    if info.sender != poll.creator {
        return Err(ContractError::Unauthorized {});
    }

    if !poll.active {
        return Err(ContractError::PollClosed {});
    }

    poll.active = false;
    POLLS.save(deps.storage, poll_id, &poll)?;

    Ok(Response::new()
        .add_attribute("method", "close_poll")
        .add_attribute("poll_id", poll_id.to_string()))
}

fn poll_response(poll: Poll, now: u64) -> StdResult<PollResponse> {
    Ok(PollResponse {
        active: is_live(poll.active, poll.end_time, now),
        ends_at: rfc3339(poll.end_time)?,
        id: poll.id,
        creator: poll.creator,
        question: poll.question,
        votes: poll.votes,
        voter_count: poll.voter_count,
        start_time: poll.start_time,
        end_time: poll.end_time,
    })
}

pub fn query_poll(deps: Deps, env: Env, poll_id: u64) -> StdResult<PollResponse> {
    let poll = POLLS.load(deps.storage, poll_id)?;
    poll_response(poll, env.block.time.seconds())
}

/// Final tallies; only available once the poll stopped accepting votes.
pub fn query_poll_results(deps: Deps, env: Env, poll_id: u64) -> StdResult<PollResponse> {
    let poll = POLLS.load(deps.storage, poll_id)?;
    let now = env.block.time.seconds();
    if is_live(poll.active, poll.end_time, now) {
        return Err(StdError::generic_err(ContractError::PollStillOpen {}.to_string()));
    }

    poll_response(poll, now)
}

pub fn query_has_voted(deps: Deps, poll_id: u64, voter: String) -> StdResult<HasVotedResponse> {
    let voter = deps.api.addr_validate(&voter)?;
    let voted = VOTER_STATE
        .may_load(deps.storage, (poll_id, &voter))?
        .unwrap_or(false);
    Ok(HasVotedResponse { voted })
}
