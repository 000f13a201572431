use cosmwasm_std::{Deps, DepsMut, Env, MessageInfo, Response, StdError, StdResult, Uint128};

use crate::clock::{end_time, has_passed, rfc3339, SECONDS_PER_YEAR};
use crate::custody;
use crate::error::ContractError;
use crate::msg::StakeResponse;
use crate::state::{StakePool, StakePosition, CONFIG, NEXT_STAKE_POOL_ID, STAKES, STAKE_POOLS};

const BPS_DENOMINATOR: u128 = 10_000;

pub fn create_stake_pool(
    deps: DepsMut,
    info: MessageInfo,
    name: String,
    max_stake: Uint128,
    apr_basis_points: u16,
    duration: u64,
) -> Result<Response, ContractError> {
    custody::nonpayable(&info)?;
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.owner {
        return Err(ContractError::Unauthorized {});
    }
    if name.trim().is_empty() {
        return Err(ContractError::invalid("pool name must not be empty"));
    }
    if max_stake.is_zero() {
        return Err(ContractError::invalid("max stake must be greater than zero"));
    }
    if duration == 0 {
        return Err(ContractError::invalid("duration must be greater than zero"));
    }

    let id = NEXT_STAKE_POOL_ID.load(deps.storage)?;
    let pool = StakePool { id, name, max_stake, apr_bps: apr_basis_points, duration };
    STAKE_POOLS.save(deps.storage, id, &pool)?;
    NEXT_STAKE_POOL_ID.save(deps.storage, &(id + 1))?;

    Ok(Response::new()
        .add_attribute("method", "create_stake_pool")
        .add_attribute("pool_id", id.to_string())
        .add_attribute("name", pool.name)
        .add_attribute("apr_bps", apr_basis_points.to_string()))
}

pub fn stake(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    lock_duration: u64,
    pool_id: Option<u64>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let principal = custody::must_pay(&info, &config.denom)?;
    if lock_duration == 0 {
        return Err(ContractError::invalid("lock duration must be greater than zero"));
    }

    let apr_bps = match pool_id {
        Some(pool_id) => {
            let pool = STAKE_POOLS.load(deps.storage, pool_id)?;
            if principal > pool.max_stake {
                return Err(ContractError::StakeAboveMax { max: pool.max_stake });
            }
            if lock_duration < pool.duration {
                return Err(ContractError::LockTooShort { min: pool.duration });
            }
            pool.apr_bps
        }
        None => config.stake_apr_bps,
    };

    if let Some(existing) = STAKES.may_load(deps.storage, &info.sender)? {
        if !existing.withdrawn {
            return Err(ContractError::PositionExists {});
        }
    }

    let start_time = env.block.time.seconds();
    // Unlock time must be representable.
    end_time(start_time, lock_duration)?;

    let position = StakePosition {
        owner: info.sender.clone(),
        principal,
        lock_duration,
        start_time,
        apr_bps,
        pool_id,
        withdrawn: false,
    };
    STAKES.save(deps.storage, &info.sender, &position)?;
    custody::commit(deps.storage, principal)?;

    Ok(Response::new()
        .add_attribute("method", "stake")
        .add_attribute("owner", info.sender.to_string())
        .add_attribute("amount", principal)
        .add_attribute("lock_duration", lock_duration.to_string()))
}

pub fn unstake(deps: DepsMut, env: Env, info: MessageInfo) -> Result<Response, ContractError> {
    custody::nonpayable(&info)?;
    let config = CONFIG.load(deps.storage)?;
    let mut position = STAKES
        .may_load(deps.storage, &info.sender)?
        .ok_or(ContractError::NoPosition {})?;

    if position.withdrawn {
        return Err(ContractError::AlreadyWithdrawn {});
    }
    let unlocks_at = end_time(position.start_time, position.lock_duration)?;
    if !has_passed(unlocks_at, env.block.time.seconds()) {
        return Err(ContractError::NotMatured { unlocks_at });
    }

    let reward = reward(&position)?;
    let available = custody::free_reserve(deps.as_ref(), &env)?;
    if reward > available {
        return Err(ContractError::InsufficientReserve { needed: reward, available });
    }
    let payout = position.principal.checked_add(reward)?;

    position.withdrawn = true;
    STAKES.save(deps.storage, &info.sender, &position)?;
    custody::release(deps.storage, position.principal)?;

    let response = Response::new()
        .add_attribute("method", "unstake")
        .add_attribute("owner", info.sender.to_string())
        .add_attribute("principal", position.principal)
        .add_attribute("reward", reward);
    Ok(custody::pay(response, &info.sender, payout, &config.denom))
}

/// `principal * apr_bps * lock_duration / (10_000 * SECONDS_PER_YEAR)`,
/// rounded down so the reserve never pays out more than accrued.
pub fn reward(position: &StakePosition) -> Result<Uint128, ContractError> {
    let numerator = u128::from(position.apr_bps) * u128::from(position.lock_duration);
    let denominator = BPS_DENOMINATOR * u128::from(SECONDS_PER_YEAR);
    Ok(position.principal.checked_multiply_ratio(numerator, denominator)?)
}

pub fn query_stake_pool(deps: Deps, pool_id: u64) -> StdResult<StakePool> {
    STAKE_POOLS.load(deps.storage, pool_id)
}

pub fn query_stake(deps: Deps, env: Env, owner: String) -> StdResult<StakeResponse> {
    let owner = deps.api.addr_validate(&owner)?;
    let position = STAKES.load(deps.storage, &owner)?;
    let unlocks_at = position.start_time.saturating_add(position.lock_duration);
    let projected_reward = reward(&position)
        .map_err(|e| StdError::generic_err(e.to_string()))?;

    Ok(StakeResponse {
        matured: has_passed(unlocks_at, env.block.time.seconds()),
        matures_at: rfc3339(unlocks_at)?,
        projected_reward,
        position,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::Addr;

    fn position(principal: u128, apr_bps: u16, lock_duration: u64) -> StakePosition {
        StakePosition {
            owner: Addr::unchecked("alice"),
            principal: Uint128::new(principal),
            lock_duration,
            start_time: 0,
            apr_bps,
            pool_id: None,
            withdrawn: false,
        }
    }

    #[test]
    fn full_year_pays_the_rate() {
        let p = position(1_000_000, 1_000, SECONDS_PER_YEAR);
        assert_eq!(reward(&p).unwrap(), Uint128::new(100_000));
    }

    #[test]
    fn partial_year_rounds_down() {
        // 1 ether at 10% for one day: 10^18 * 1000 * 86400 / (10^4 * 31_536_000)
        let p = position(1_000_000_000_000_000_000, 1_000, 86_400);
        assert_eq!(reward(&p).unwrap(), Uint128::new(273_972_602_739_726));

        // 1 unit never earns anything in a day
        let p = position(1, 1_000, 86_400);
        assert_eq!(reward(&p).unwrap(), Uint128::zero());
    }

    #[test]
    fn zero_rate_pays_principal_only() {
        let p = position(5_000, 0, SECONDS_PER_YEAR * 3);
        assert!(reward(&p).unwrap().is_zero());
    }
}
