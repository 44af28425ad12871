use {
    crate::{
        domain::{Config, Confirmation, Deployed, Failed, Pending, deployment::InvalidParameters},
        traits::{Clock, ContractFactories},
    },
    anyhow::{Context, Result},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    InvalidParameters(#[from] InvalidParameters),
    #[error(transparent)]
    Deployment(#[from] Failed),
}

/// Deploys a single instance of the configured contract template.
///
/// The deployment is attempted exactly once: there are no retries and nothing
/// is remembered between calls, so every successful call creates a new
/// contract.
pub async fn deploy(
    config: &Config,
    factories: &dyn ContractFactories,
    clock: &dyn Clock,
) -> Result<Deployed, Error> {
    let parameters = config.parameters(clock.now())?;
    if !parameters.metadata_base_uri().ends_with('/') {
        tracing::warn!(
            uri = parameters.metadata_base_uri(),
            "metadata base URI does not end with '/', token ids will be appended directly"
        );
    }
    tracing::info!(
        template = %config.template,
        contract_name = parameters.name(),
        symbol = parameters.symbol(),
        cost = %number::units::format_units(parameters.unit_cost(), config.decimals)
            .unwrap_or_else(|_| parameters.unit_cost().to_string()),
        max_supply = %parameters.max_supply(),
        mint_opens_at = parameters.mint_opens_at(),
        metadata_base_uri = parameters.metadata_base_uri(),
        "deploying contract"
    );

    let mut pending = Pending::new(&config.template, parameters);
    match submit(&mut pending, factories).await {
        Ok(confirmation) => Ok(pending.confirm(confirmation)),
        Err(err) => Err(pending.fail(err).into()),
    }
}

async fn submit(pending: &mut Pending, factories: &dyn ContractFactories) -> Result<Confirmation> {
    let factory = factories
        .factory(pending.template())
        .await
        .with_context(|| format!("contract factory for {}", pending.template()))?;
    let deployment = factory
        .deploy(pending.parameters())
        .await
        .context("submit deployment")?;
    pending.submitted(deployment.transaction());
    deployment
        .confirmation()
        .await
        .context("await deployment confirmation")
}
