use cosmwasm_std::{entry_point, to_json_binary, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult};

use crate::custody;
use crate::error::ContractError;
use crate::msg::{CustodyResponse, ExecuteMsg, InstantiateMsg, QueryMsg};
use crate::state::{
    Config, BET_COUNTER, COMMITTED, CONFIG, GUARD, NEXT_POLL_ID, NEXT_RAFFLE_ID,
    NEXT_STAKE_POOL_ID, REQUEST_COUNTER,
};
use crate::{bet, poll, raffle, randomness, stake};

#[entry_point]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    if msg.denom.trim().is_empty() {
        return Err(ContractError::invalid("denom must not be empty"));
    }

    let config = Config {
        owner: info.sender,
        oracle: deps.api.addr_validate(&msg.oracle)?,
        randomness_oracle: deps.api.addr_validate(&msg.randomness_oracle)?,
        key_hash: msg.key_hash,
        subscription_id: msg.subscription_id,
        denom: msg.denom,
        stake_apr_bps: msg.stake_apr_bps,
    };

    CONFIG.save(deps.storage, &config)?;
    BET_COUNTER.save(deps.storage, &0)?;
    NEXT_POLL_ID.save(deps.storage, &0)?;
    NEXT_RAFFLE_ID.save(deps.storage, &0)?;
    NEXT_STAKE_POOL_ID.save(deps.storage, &0)?;
    REQUEST_COUNTER.save(deps.storage, &0)?;
    COMMITTED.save(deps.storage, &Default::default())?;
    GUARD.save(deps.storage, &false)?;

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("owner", config.owner.to_string())
        .add_attribute("oracle", config.oracle.to_string())
        .add_attribute("randomness_oracle", config.randomness_oracle.to_string()))
}

/// Every mutating call runs under the reentrancy guard; it is released whether
/// the call succeeds or fails.
#[entry_point]
pub fn execute(
    mut deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    custody::enter(deps.storage)?;
    let result = dispatch(deps.branch(), env, info, msg);
    custody::exit(deps.storage)?;
    result
}

fn dispatch(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::CreateBet { description, event_id, deadline } => bet::create_bet(deps, env, info, description, event_id, deadline),
        ExecuteMsg::AcceptBet { bet_id } => bet::accept_bet(deps, env, info, bet_id),
        ExecuteMsg::ResolveBet { bet_id, winner } => bet::resolve_bet(deps, env, info, bet_id, winner),
        ExecuteMsg::CancelBet { bet_id } => bet::cancel_bet(deps, env, info, bet_id),
        ExecuteMsg::CreatePoll { question, option_count, duration } => poll::create_poll(deps, info, env, question, option_count, duration),
        ExecuteMsg::Vote { poll_id, option_index } => poll::vote(deps, env, info, poll_id, option_index),
        ExecuteMsg::ClosePoll { poll_id } => poll::close_poll(deps, info, poll_id),
        ExecuteMsg::CreateRaffle { ticket_price, duration } => raffle::create_raffle(deps, env, info, ticket_price, duration),
        ExecuteMsg::BuyTicket { raffle_id, ticket_count } => raffle::buy_ticket(deps, env, info, raffle_id, ticket_count),
        ExecuteMsg::CloseAndDraw { raffle_id } => raffle::close_and_draw(deps, env, info, raffle_id),
        ExecuteMsg::CreateStakePool { name, max_stake, apr_basis_points, duration } => stake::create_stake_pool(deps, info, name, max_stake, apr_basis_points, duration),
        ExecuteMsg::Stake { lock_duration, pool_id } => stake::stake(deps, env, info, lock_duration, pool_id),
        ExecuteMsg::Unstake {} => stake::unstake(deps, env, info),
        ExecuteMsg::FulfillRandomness { request_id, random_value } => randomness::fulfill(deps, env, info, request_id, random_value),
        ExecuteMsg::Fund {} => custody::fund(deps, info),
    }
}

#[entry_point]
pub fn query(
    deps: Deps,
    env: Env,
    msg: QueryMsg
) -> StdResult<Binary> {

    match msg {
        QueryMsg::Config {} => to_json_binary(&CONFIG.load(deps.storage)?),
        QueryMsg::Custody {} => to_json_binary(&query_custody(deps, env)?),
        QueryMsg::Bet { bet_id } => to_json_binary(&bet::query_bet(deps, bet_id)?),
        QueryMsg::Bets { start_after, limit } => to_json_binary(&bet::query_bets(deps, start_after, limit)?),
        QueryMsg::Poll { poll_id } => to_json_binary(&poll::query_poll(deps, env, poll_id)?),
        QueryMsg::PollResults { poll_id } => to_json_binary(&poll::query_poll_results(deps, env, poll_id)?),
        QueryMsg::HasVoted { poll_id, voter } => to_json_binary(&poll::query_has_voted(deps, poll_id, voter)?),
        QueryMsg::Raffle { raffle_id } => to_json_binary(&raffle::query_raffle(deps, env, raffle_id)?),
        QueryMsg::RaffleEntries { raffle_id, start_after, limit } => to_json_binary(&raffle::query_raffle_entries(deps, raffle_id, start_after, limit)?),
        QueryMsg::StakePool { pool_id } => to_json_binary(&stake::query_stake_pool(deps, pool_id)?),
        QueryMsg::Stake { owner } => to_json_binary(&stake::query_stake(deps, env, owner)?),
        QueryMsg::RandomnessRequest { request_id } => to_json_binary(&randomness::query_request(deps, request_id)?),
    }
}

fn query_custody(deps: Deps, env: Env) -> StdResult<CustodyResponse> {
    let balance = custody::balance(deps, &env)?;
    let committed = custody::committed(deps.storage)?;

    Ok(CustodyResponse {
        balance,
        committed,
        free_reserve: balance.saturating_sub(committed),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::testing::{mock_dependencies, mock_env, mock_info};
    use cosmwasm_std::{coins, from_json, HexBinary, StdError};

    use crate::error::ErrorKind;

    fn instantiate_msg() -> InstantiateMsg {
        InstantiateMsg {
            oracle: "oracle".to_string(),
            randomness_oracle: "coordinator".to_string(),
            key_hash: HexBinary::from(vec![0x17; 32]),
            subscription_id: 1,
            denom: "uarb".to_string(),
            stake_apr_bps: 1_000,
        }
    }

    #[test]
    fn instantiate_stores_config() {
        let mut deps = mock_dependencies();
        let res = instantiate(deps.as_mut(), mock_env(), mock_info("owner", &[]), instantiate_msg()).unwrap();
        assert_eq!(res.attributes[0].value, "instantiate");

        let bin = query(deps.as_ref(), mock_env(), QueryMsg::Config {}).unwrap();
        let config: Config = from_json(bin).unwrap();
        assert_eq!(config.owner.as_str(), "owner");
        assert_eq!(config.randomness_oracle.as_str(), "coordinator");
        assert_eq!(config.subscription_id, 1);
    }

    #[test]
    fn instantiate_rejects_empty_denom() {
        let mut deps = mock_dependencies();
        let msg = InstantiateMsg { denom: " ".to_string(), ..instantiate_msg() };
        let err = instantiate(deps.as_mut(), mock_env(), mock_info("owner", &[]), msg).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn held_guard_rejects_execution_and_is_released_after_failures() {
        let mut deps = mock_dependencies();
        instantiate(deps.as_mut(), mock_env(), mock_info("owner", &[]), instantiate_msg()).unwrap();

        // A failing call must not leave the guard behind.
        let err = execute(deps.as_mut(), mock_env(), mock_info("alice", &[]), ExecuteMsg::Unstake {}).unwrap_err();
        assert_eq!(err, ContractError::NoPosition {});
        assert!(!GUARD.load(&deps.storage).unwrap());

        GUARD.save(deps.as_mut().storage, &true).unwrap();
        let msg = ExecuteMsg::CreateRaffle { ticket_price: 10u128.into(), duration: 60 };
        let err = execute(deps.as_mut(), mock_env(), mock_info("alice", &[]), msg).unwrap_err();
        assert_eq!(err, ContractError::Reentrancy {});
        assert_eq!(err.kind(), ErrorKind::Reentrancy);
        assert_eq!(NEXT_RAFFLE_ID.load(&deps.storage).unwrap(), 0);
    }

    #[test]
    fn unknown_ids_are_caller_errors() {
        let mut deps = mock_dependencies();
        instantiate(deps.as_mut(), mock_env(), mock_info("owner", &[]), instantiate_msg()).unwrap();

        let msgs = [
            ExecuteMsg::CancelBet { bet_id: 7 },
            ExecuteMsg::Vote { poll_id: 7, option_index: 0 },
            ExecuteMsg::CloseAndDraw { raffle_id: 7 },
            ExecuteMsg::Stake { lock_duration: 60, pool_id: Some(7) },
        ];
        for msg in msgs {
            let funds = match &msg {
                ExecuteMsg::Stake { .. } => coins(100, "uarb"),
                _ => vec![],
            };
            let err = execute(deps.as_mut(), mock_env(), mock_info("alice", &funds), msg).unwrap_err();
            assert!(matches!(err, ContractError::Std(StdError::NotFound { .. })));
            assert_eq!(err.kind(), ErrorKind::Precondition);
        }

        let err = ContractError::Std(StdError::generic_err("boom"));
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
