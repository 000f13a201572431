use cosmwasm_std::{
    coins, Addr, BankMsg, Deps, DepsMut, Env, MessageInfo, Response, StdResult, Storage, Uint128,
};

use crate::error::ContractError;
use crate::state::{COMMITTED, CONFIG, GUARD};

/// Amount of `denom` attached to the call. Zero when nothing was sent.
pub fn paid_amount(info: &MessageInfo, denom: &str) -> Result<Uint128, ContractError> {
    match info.funds.as_slice() {
        [] => Ok(Uint128::zero()),
        [coin] if coin.denom == denom => Ok(coin.amount),
        [_] => Err(ContractError::WrongDenom { denom: denom.to_string() }),
        _ => Err(ContractError::MultipleDenoms {}),
    }
}

/// Requires a non-zero payment in `denom` and returns it.
pub fn must_pay(info: &MessageInfo, denom: &str) -> Result<Uint128, ContractError> {
    let amount = paid_amount(info, denom)?;
    if amount.is_zero() {
        return Err(ContractError::NoFunds {});
    }
    Ok(amount)
}

/// Requires the attached value to equal `expected` exactly.
pub fn must_pay_exact(
    info: &MessageInfo,
    denom: &str,
    expected: Uint128,
) -> Result<(), ContractError> {
    let received = paid_amount(info, denom)?;
    if received != expected {
        return Err(ContractError::PaymentMismatch { expected, received });
    }
    Ok(())
}

pub fn nonpayable(info: &MessageInfo) -> Result<(), ContractError> {
    if !info.funds.is_empty() {
        return Err(ContractError::UnexpectedFunds {});
    }
    Ok(())
}

pub fn committed(storage: &dyn Storage) -> StdResult<Uint128> {
    Ok(COMMITTED.may_load(storage)?.unwrap_or_default())
}

pub fn commit(storage: &mut dyn Storage, amount: Uint128) -> Result<Uint128, ContractError> {
    let total = committed(storage)?.checked_add(amount)?;
    COMMITTED.save(storage, &total)?;
    Ok(total)
}

pub fn release(storage: &mut dyn Storage, amount: Uint128) -> Result<Uint128, ContractError> {
    let total = committed(storage)?.checked_sub(amount)?;
    COMMITTED.save(storage, &total)?;
    Ok(total)
}

pub fn balance(deps: Deps, env: &Env) -> StdResult<Uint128> {
    let denom = CONFIG.load(deps.storage)?.denom;
    Ok(deps.querier.query_balance(&env.contract.address, denom)?.amount)
}

/// Value held but not promised to any live entity; rewards come out of this.
pub fn free_reserve(deps: Deps, env: &Env) -> StdResult<Uint128> {
    Ok(balance(deps, env)?.saturating_sub(committed(deps.storage)?))
}

/// Appends a transfer to the response. Callers release the entity's committed
/// amount and persist its new state before calling this.
pub fn pay(response: Response, to: &Addr, amount: Uint128, denom: &str) -> Response {
    if amount.is_zero() {
        return response;
    }
    response.add_message(BankMsg::Send {
        to_address: to.to_string(),
        amount: coins(amount.u128(), denom),
    })
}

pub fn fund(deps: DepsMut, info: MessageInfo) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let amount = must_pay(&info, &config.denom)?;

    Ok(Response::new()
        .add_attribute("method", "fund")
        .add_attribute("sender", info.sender.to_string())
        .add_attribute("amount", amount))
}

/// Takes the reentrancy guard for the duration of one entry point.
pub fn enter(storage: &mut dyn Storage) -> Result<(), ContractError> {
    if GUARD.may_load(storage)?.unwrap_or(false) {
        return Err(ContractError::Reentrancy {});
    }
    GUARD.save(storage, &true)?;
    Ok(())
}

pub fn exit(storage: &mut dyn Storage) -> StdResult<()> {
    GUARD.save(storage, &false)
}
