#![allow(dead_code)]

use std::collections::HashMap;

use cosmwasm_std::testing::{
    mock_dependencies, mock_env, mock_info, MockApi, MockQuerier, MockStorage, MOCK_CONTRACT_ADDR,
};
use cosmwasm_std::{
    coins, from_json, BankMsg, Coin, CosmosMsg, Env, HexBinary, OwnedDeps, Response, StdResult,
    Uint128,
};
use serde::de::DeserializeOwned;

use unigame::contract::{execute, instantiate, query};
use unigame::msg::{
    CustodyResponse, ExecuteMsg, InstantiateMsg, QueryMsg, RaffleEntriesResponse, RaffleResponse,
};
use unigame::state::{Bet, RaffleEntry, RaffleStatus, NEXT_RAFFLE_ID};
use unigame::ContractError;

pub const DENOM: &str = "uarb";
pub const OWNER: &str = "owner";
pub const ORACLE: &str = "oracle";
pub const COORDINATOR: &str = "coordinator";
pub const ALICE: &str = "alice";
pub const BOB: &str = "bob";
pub const CAROL: &str = "carol";

/// One native unit with 18 decimals.
pub const UNIT: u128 = 1_000_000_000_000_000_000;
pub const DEFAULT_APR_BPS: u16 = 1_000;

/// Drives the contract entry points and plays the bank: attached funds are
/// credited to the contract before it runs (and returned if the call fails),
/// `BankMsg::Send` debits it afterwards.
pub struct Suite {
    pub deps: OwnedDeps<MockStorage, MockApi, MockQuerier>,
    pub env: Env,
    pub contract_balance: u128,
    pub received: HashMap<String, u128>,
    stakers: Vec<String>,
}

impl Suite {
    pub fn new() -> Self {
        let mut suite = Suite {
            deps: mock_dependencies(),
            env: mock_env(),
            contract_balance: 0,
            received: HashMap::new(),
            stakers: vec![],
        };
        let msg = InstantiateMsg {
            oracle: ORACLE.to_string(),
            randomness_oracle: COORDINATOR.to_string(),
            key_hash: HexBinary::from(vec![0x17; 32]),
            subscription_id: 1,
            denom: DENOM.to_string(),
            stake_apr_bps: DEFAULT_APR_BPS,
        };
        instantiate(suite.deps.as_mut(), suite.env.clone(), mock_info(OWNER, &[]), msg).unwrap();
        suite.sync_balance();
        suite
    }

    pub fn now(&self) -> u64 {
        self.env.block.time.seconds()
    }

    pub fn advance(&mut self, seconds: u64) {
        self.env.block.time = self.env.block.time.plus_seconds(seconds);
        self.env.block.height += seconds / 5 + 1;
    }

    pub fn execute(
        &mut self,
        sender: &str,
        amount: u128,
        msg: ExecuteMsg,
    ) -> Result<Response, ContractError> {
        let funds = if amount == 0 { vec![] } else { coins(amount, DENOM) };
        self.execute_with(sender, &funds, msg)
    }

    pub fn execute_with(
        &mut self,
        sender: &str,
        funds: &[Coin],
        msg: ExecuteMsg,
    ) -> Result<Response, ContractError> {
        if let ExecuteMsg::Stake { .. } = msg {
            if !self.stakers.iter().any(|s| s == sender) {
                self.stakers.push(sender.to_string());
            }
        }

        let attached: u128 = funds
            .iter()
            .filter(|c| c.denom == DENOM)
            .map(|c| c.amount.u128())
            .sum();
        self.set_balance(self.contract_balance + attached);

        let result = execute(self.deps.as_mut(), self.env.clone(), mock_info(sender, funds), msg);
        if let Ok(response) = &result {
            self.contract_balance += attached;
            for sub in &response.messages {
                if let CosmosMsg::Bank(BankMsg::Send { to_address, amount }) = &sub.msg {
                    let sent: u128 = amount.iter().map(|c| c.amount.u128()).sum();
                    self.contract_balance -= sent;
                    *self.received.entry(to_address.clone()).or_default() += sent;
                }
            }
        }
        self.sync_balance();
        self.assert_custody_balanced();
        result
    }

    pub fn query<T: DeserializeOwned>(&self, msg: QueryMsg) -> StdResult<T> {
        from_json(query(self.deps.as_ref(), self.env.clone(), msg)?)
    }

    pub fn custody(&self) -> CustodyResponse {
        self.query(QueryMsg::Custody {}).unwrap()
    }

    pub fn bet(&self, bet_id: u64) -> Bet {
        self.query(QueryMsg::Bet { bet_id }).unwrap()
    }

    pub fn raffle(&self, raffle_id: u64) -> RaffleResponse {
        self.query(QueryMsg::Raffle { raffle_id }).unwrap()
    }

    pub fn raffle_entries(&self, raffle_id: u64) -> Vec<RaffleEntry> {
        let mut entries: Vec<RaffleEntry> = vec![];
        loop {
            let start_after = entries.len().checked_sub(1).map(|last| last as u32);
            let page: RaffleEntriesResponse = self
                .query(QueryMsg::RaffleEntries { raffle_id, start_after, limit: Some(30) })
                .unwrap();
            if page.entries.is_empty() {
                return entries;
            }
            entries.extend(page.entries);
        }
    }

    pub fn received(&self, addr: &str) -> u128 {
        self.received.get(addr).copied().unwrap_or_default()
    }

    /// The committed ledger must equal what live entities hold, and never
    /// exceed what the contract actually holds.
    pub fn assert_custody_balanced(&self) {
        let custody = self.custody();
        assert_eq!(custody.balance.u128(), self.contract_balance);
        assert!(custody.committed <= custody.balance, "committed exceeds balance");
        assert_eq!(custody.committed, self.live_commitments());
    }

    fn live_commitments(&self) -> Uint128 {
        let mut total = Uint128::zero();

        let mut start_after = None;
        loop {
            let page: unigame::msg::BetsResponse = self
                .query(QueryMsg::Bets { start_after, limit: Some(30) })
                .unwrap();
            if page.bets.is_empty() {
                break;
            }
            for bet in &page.bets {
                total += bet.held();
            }
            start_after = page.bets.last().map(|b| b.id);
        }

        let raffle_count = NEXT_RAFFLE_ID.load(&self.deps.storage).unwrap();
        for raffle_id in 0..raffle_count {
            let raffle = self.raffle(raffle_id);
            if raffle.status != RaffleStatus::Resolved {
                total += raffle.total_pool;
            }
        }

        for owner in &self.stakers {
            if let Ok(stake) = self
                .query::<unigame::msg::StakeResponse>(QueryMsg::Stake { owner: owner.clone() })
            {
                if !stake.position.withdrawn {
                    total += stake.position.principal;
                }
            }
        }

        total
    }

    fn sync_balance(&mut self) {
        self.set_balance(self.contract_balance);
    }

    fn set_balance(&mut self, amount: u128) {
        self.deps
            .querier
            .update_balance(MOCK_CONTRACT_ADDR, coins(amount, DENOM));
    }
}

pub fn attr<'a>(response: &'a Response, key: &str) -> Option<&'a str> {
    response
        .attributes
        .iter()
        .find(|a| a.key == key)
        .map(|a| a.value.as_str())
}
