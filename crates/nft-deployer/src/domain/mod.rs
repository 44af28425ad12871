pub mod deployment;

pub use deployment::{Config, Confirmation, Deployed, DeploymentParameters, Failed, Pending};
