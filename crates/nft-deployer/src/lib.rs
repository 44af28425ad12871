pub mod domain;
pub mod infra;
pub mod runner;
mod run;
pub mod traits;

pub use self::run::{run, start};
