use cosmwasm_std::{Addr, HexBinary, Uint128, Uint256};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use cw_storage_plus::{Map, Item};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct Config {
    pub owner: Addr,
    /// Resolves bets.
    pub oracle: Addr,
    /// Only sender allowed to deliver randomness fulfilments.
    pub randomness_oracle: Addr,
    pub key_hash: HexBinary,
    pub subscription_id: u64,
    pub denom: String,
    /// Reward rate for stakes that are not bound to a pool.
    pub stake_apr_bps: u16,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BetState {
    Open,
    Accepted,
    Resolved,
    Cancelled,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct Bet {
    pub id: u64,
    pub creator: Addr,
    pub challenger: Option<Addr>,
    pub amount: Uint128,
    pub challenger_amount: Uint128,
    pub description: String,
    pub event_id: HexBinary,
    pub deadline: u64,
    pub state: BetState,
    pub winner: Option<Addr>,
}

impl Bet {
    /// Value this bet currently holds in custody.
    pub fn held(&self) -> Uint128 {
        match self.state {
            BetState::Open => self.amount,
            BetState::Accepted => self.amount + self.challenger_amount,
            BetState::Resolved | BetState::Cancelled => Uint128::zero(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct Poll {
    pub id: u64,
    pub creator: Addr,
    pub question: String,
    /// One counter per option, indexed by option.
    pub votes: Vec<u64>,
    pub voter_count: u64,
    pub start_time: u64,
    pub end_time: u64,
    pub active: bool,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RaffleStatus {
    Open,
    AwaitingRandomness,
    Resolved,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct RaffleEntry {
    pub participant: Addr,
    pub tickets: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct Raffle {
    pub id: u64,
    pub creator: Addr,
    pub ticket_price: Uint128,
    pub end_time: u64,
    pub active: bool,
    pub status: RaffleStatus,
    /// Number of distinct participants, and the index the next new one gets.
    pub participant_count: u32,
    pub total_tickets: u64,
    pub total_pool: Uint128,
    pub pending_request: Option<u64>,
    pub winner: Option<Addr>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct StakePool {
    pub id: u64,
    pub name: String,
    pub max_stake: Uint128,
    pub apr_bps: u16,
    /// Minimum lock duration in seconds.
    pub duration: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct StakePosition {
    pub owner: Addr,
    pub principal: Uint128,
    pub lock_duration: u64,
    pub start_time: u64,
    pub apr_bps: u16,
    pub pool_id: Option<u64>,
    pub withdrawn: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RandomnessConsumer {
    Raffle { raffle_id: u64 },
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Requested,
    Fulfilled,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct RandomnessRequest {
    pub id: u64,
    pub requester: Addr,
    pub consumer: RandomnessConsumer,
    pub key_hash: HexBinary,
    pub subscription_id: u64,
    pub status: RequestStatus,
    pub requested_at: u64,
    pub random_value: Option<Uint256>,
}

// State
pub const CONFIG: Item<Config> = Item::new("config");
pub const GUARD: Item<bool> = Item::new("reentrancy_guard");
pub const COMMITTED: Item<Uint128> = Item::new("committed");

pub const BETS: Map<u64, Bet> = Map::new("bets");
pub const BET_COUNTER: Item<u64> = Item::new("bet_counter");

pub const POLLS: Map<u64, Poll> = Map::new("polls");
pub const VOTER_STATE: Map<(u64, &Addr), bool> = Map::new("voter_state");
pub const NEXT_POLL_ID: Item<u64> = Item::new("next_poll_id");

pub const RAFFLES: Map<u64, Raffle> = Map::new("raffles");
pub const NEXT_RAFFLE_ID: Item<u64> = Item::new("next_raffle_id");
/// Entries keyed by (raffle, participant index); index order is first-purchase
/// order and defines the draw space.
pub const RAFFLE_ENTRIES: Map<(u64, u32), RaffleEntry> = Map::new("raffle_entries");
pub const RAFFLE_PARTICIPANTS: Map<(u64, &Addr), u32> = Map::new("raffle_participants");

pub const STAKE_POOLS: Map<u64, StakePool> = Map::new("stake_pools");
pub const NEXT_STAKE_POOL_ID: Item<u64> = Item::new("next_stake_pool_id");
pub const STAKES: Map<&Addr, StakePosition> = Map::new("stakes");

pub const RANDOMNESS_REQUESTS: Map<u64, RandomnessRequest> = Map::new("randomness_requests");
pub const REQUEST_COUNTER: Item<u64> = Item::new("request_counter");
