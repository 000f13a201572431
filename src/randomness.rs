//! Two-phase randomness: a consumer records a request now, and the configured
//! randomness oracle delivers the value in a later, separate call. The gateway
//! only tracks requests and routes fulfilments; it never holds funds.

use cosmwasm_std::{Deps, DepsMut, Env, MessageInfo, Response, StdResult, Storage, Uint256};

use crate::custody;
use crate::error::ContractError;
use crate::raffle;
use crate::state::{
    Config, RandomnessConsumer, RandomnessRequest, RequestStatus, CONFIG, RANDOMNESS_REQUESTS,
    REQUEST_COUNTER,
};

/// Words asked of the oracle per request.
pub const NUM_WORDS: u32 = 1;

/// Records a new request in `Requested` state and returns it. The caller adds
/// [`request_attributes`] to its response so the off-chain service picks it up.
pub fn request(
    storage: &mut dyn Storage,
    env: &Env,
    config: &Config,
    consumer: RandomnessConsumer,
) -> Result<RandomnessRequest, ContractError> {
    let id = REQUEST_COUNTER.may_load(storage)?.unwrap_or_default() + 1;
    let request = RandomnessRequest {
        id,
        requester: env.contract.address.clone(),
        consumer,
        key_hash: config.key_hash.clone(),
        subscription_id: config.subscription_id,
        status: RequestStatus::Requested,
        requested_at: env.block.time.seconds(),
        random_value: None,
    };

    RANDOMNESS_REQUESTS.save(storage, id, &request)?;
    REQUEST_COUNTER.save(storage, &id)?;
    Ok(request)
}

pub fn request_attributes(response: Response, request: &RandomnessRequest) -> Response {
    response
        .add_attribute("randomness_request_id", request.id.to_string())
        .add_attribute("key_hash", request.key_hash.to_hex())
        .add_attribute("subscription_id", request.subscription_id.to_string())
        .add_attribute("num_words", NUM_WORDS.to_string())
}

pub fn fulfill(
    mut deps: DepsMut,
    env: Env,
    info: MessageInfo,
    request_id: u64,
    random_value: Uint256,
) -> Result<Response, ContractError> {
    custody::nonpayable(&info)?;
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.randomness_oracle {
        return Err(ContractError::Unauthorized {});
    }

    let mut request = RANDOMNESS_REQUESTS
        .may_load(deps.storage, request_id)?
        .ok_or(ContractError::UnknownRequest { id: request_id })?;
    if request.status != RequestStatus::Requested {
        deps.api.debug(&format!("duplicate fulfilment for request {request_id}"));
        return Err(ContractError::DuplicateFulfillment { id: request_id });
    }

    // The consumer validates before writing anything, so a rejected callback
    // leaves the request pending.
    let response = match request.consumer {
        RandomnessConsumer::Raffle { raffle_id } => {
            raffle::on_randomness(deps.branch(), &config, raffle_id, request_id, random_value)?
        }
    };

    request.status = RequestStatus::Fulfilled;
    request.random_value = Some(random_value);
    RANDOMNESS_REQUESTS.save(deps.storage, request_id, &request)?;
    deps.api.debug(&format!(
        "randomness request {request_id} fulfilled at {}",
        env.block.time.seconds()
    ));

    Ok(response
        .add_attribute("randomness_request_id", request_id.to_string())
        .add_attribute("random_value", random_value.to_string()))
}

pub fn query_request(deps: Deps, request_id: u64) -> StdResult<RandomnessRequest> {
    RANDOMNESS_REQUESTS.load(deps.storage, request_id)
}
