pub mod blockchain;
pub mod cli;
pub mod clock;
pub mod config;
pub mod hardhat;

pub use {blockchain::Ethereum, clock::SystemClock, hardhat::Artifacts};
