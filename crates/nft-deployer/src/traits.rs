//! Trait definitions for external system boundaries.
//!
//! These traits abstract the ledger and the wall clock to enable unit testing
//! with mocks.

use {
    crate::domain::{Confirmation, DeploymentParameters},
    alloy::primitives::TxHash,
    anyhow::Result,
    chrono::{DateTime, Utc},
};

/// Looks up compiled contract templates by name.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ContractFactories: Send + Sync {
    /// Returns a factory able to instantiate the contract `template`.
    async fn factory(&self, template: &str) -> Result<Box<dyn Factory>>;
}

/// Instantiates one contract template.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Factory: Send + Sync {
    /// Submits a new contract instance. The parameters are passed to the
    /// constructor in the order given by
    /// [`DeploymentParameters::constructor_args`].
    ///
    /// Returns as soon as the submission got accepted by the node; the
    /// deployment is not confirmed at that point.
    async fn deploy(
        &self,
        parameters: &DeploymentParameters,
    ) -> Result<Box<dyn PendingDeployment>>;
}

/// A submitted deployment that still has to be confirmed.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PendingDeployment: Send + Sync {
    /// Hash of the contract creation transaction.
    fn transaction(&self) -> TxHash;

    /// Waits until the deployment is confirmed and returns where the contract
    /// ended up.
    async fn confirmation(&self) -> Result<Confirmation>;
}

/// Source of the current wall clock time.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    /// The current time in UTC.
    fn now(&self) -> DateTime<Utc>;
}
