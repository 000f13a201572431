use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, HexBinary, Uint128, Uint256};

use crate::state::{
    Bet, Config, RaffleEntry, RaffleStatus, RandomnessRequest, StakePool, StakePosition,
};

#[cw_serde]
pub struct InstantiateMsg {
    /// Address allowed to resolve bets.
    pub oracle: String,
    /// Address allowed to deliver randomness fulfilments.
    pub randomness_oracle: String,
    pub key_hash: HexBinary,
    pub subscription_id: u64,
    pub denom: String,
    pub stake_apr_bps: u16,
}

#[cw_serde]
pub enum ExecuteMsg {
    CreateBet {
        description: String,
        event_id: HexBinary,
        deadline: u64,
    },
    AcceptBet {
        bet_id: u64,
    },
    ResolveBet {
        bet_id: u64,
        winner: String,
    },
    CancelBet {
        bet_id: u64,
    },
    CreatePoll {
        question: String,
        option_count: u32,
        duration: u64,
    },
    Vote {
        poll_id: u64,
        option_index: u32,
    },
    ClosePoll {
        poll_id: u64,
    },
    CreateRaffle {
        ticket_price: Uint128,
        duration: u64,
    },
    BuyTicket {
        raffle_id: u64,
        ticket_count: u64,
    },
    CloseAndDraw {
        raffle_id: u64,
    },
    CreateStakePool {
        name: String,
        max_stake: Uint128,
        apr_basis_points: u16,
        duration: u64,
    },
    Stake {
        lock_duration: u64,
        pool_id: Option<u64>,
    },
    Unstake {},
    FulfillRandomness {
        request_id: u64,
        random_value: Uint256,
    },
    /// Tops up the reserve that staking rewards are paid from.
    Fund {},
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(Config)]
    Config {},
    #[returns(CustodyResponse)]
    Custody {},
    #[returns(Bet)]
    Bet { bet_id: u64 },
    #[returns(BetsResponse)]
    Bets {
        start_after: Option<u64>,
        limit: Option<u32>,
    },
    #[returns(PollResponse)]
    Poll { poll_id: u64 },
    #[returns(PollResponse)]
    PollResults { poll_id: u64 },
    #[returns(HasVotedResponse)]
    HasVoted { poll_id: u64, voter: String },
    #[returns(RaffleResponse)]
    Raffle { raffle_id: u64 },
    #[returns(RaffleEntriesResponse)]
    RaffleEntries {
        raffle_id: u64,
        start_after: Option<u32>,
        limit: Option<u32>,
    },
    #[returns(StakePool)]
    StakePool { pool_id: u64 },
    #[returns(StakeResponse)]
    Stake { owner: String },
    #[returns(RandomnessRequest)]
    RandomnessRequest { request_id: u64 },
}

#[cw_serde]
pub struct CustodyResponse {
    pub balance: Uint128,
    pub committed: Uint128,
    pub free_reserve: Uint128,
}

#[cw_serde]
pub struct BetsResponse {
    pub bets: Vec<Bet>,
}

#[cw_serde]
pub struct PollResponse {
    pub id: u64,
    pub creator: Addr,
    pub question: String,
    pub votes: Vec<u64>,
    pub voter_count: u64,
    pub start_time: u64,
    pub end_time: u64,
    pub ends_at: String,
    /// Computed from `end_time` at query time.
    pub active: bool,
}

#[cw_serde]
pub struct HasVotedResponse {
    pub voted: bool,
}

#[cw_serde]
pub struct RaffleResponse {
    pub id: u64,
    pub creator: Addr,
    pub ticket_price: Uint128,
    pub end_time: u64,
    pub ends_at: String,
    /// Computed from `end_time` at query time.
    pub active: bool,
    pub status: RaffleStatus,
    pub participant_count: u32,
    pub total_tickets: u64,
    pub total_pool: Uint128,
    pub pending_request: Option<u64>,
    pub winner: Option<Addr>,
}

#[cw_serde]
pub struct RaffleEntriesResponse {
    pub entries: Vec<RaffleEntry>,
}

#[cw_serde]
pub struct StakeResponse {
    pub position: StakePosition,
    pub matured: bool,
    pub matures_at: String,
    pub projected_reward: Uint128,
}
