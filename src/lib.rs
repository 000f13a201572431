pub mod bet;
pub mod clock;
pub mod contract;
pub mod custody;
pub mod error;
pub mod msg;
pub mod poll;
pub mod raffle;
pub mod randomness;
pub mod stake;
pub mod state;

pub use crate::error::ContractError;
