//! Parameters of a single contract deployment and its lifecycle.
//!
//! A deployment starts out [`Pending`] once its parameters are assembled and
//! ends either [`Deployed`] or [`Failed`]. Both transitions consume the pending
//! value, so a finished deployment can not be driven any further.

use {
    alloy::{
        dyn_abi::DynSolValue,
        primitives::{Address, TxHash, U256},
    },
    chrono::{DateTime, Utc},
    std::time::Duration,
};

/// Name of the compiled contract that gets deployed by default.
pub const DEFAULT_TEMPLATE: &str = "NFT";

/// The deployment configuration: everything needed to assemble
/// [`DeploymentParameters`] except for the current time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Name of the contract artifact to instantiate.
    pub template: String,
    pub name: String,
    pub symbol: String,
    /// Price of a single token as a human readable decimal amount.
    pub cost: String,
    /// Denomination exponent used to scale `cost` into base units.
    pub decimals: u8,
    pub max_supply: u64,
    /// How long after deployment minting opens.
    pub mint_delay: Duration,
    pub metadata_base_uri: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            name: "Tangle_punks".to_string(),
            symbol: "TP".to_string(),
            cost: "10".to_string(),
            decimals: number::units::ETHER_DECIMALS,
            max_supply: 25,
            mint_delay: Duration::from_secs(60),
            metadata_base_uri: "ipfs://bafybeibzbvazpuh55f67cnoabsusjzwwp545stdzxtkhd3wyc26oauv5ma/"
                .to_string(),
        }
    }
}

impl Config {
    /// Validates the configuration and assembles the constructor parameters
    /// for a deployment happening at `now`.
    pub fn parameters(
        &self,
        now: DateTime<Utc>,
    ) -> Result<DeploymentParameters, InvalidParameters> {
        if self.name.is_empty() {
            return Err(InvalidParameters::EmptyName);
        }
        if self.symbol.is_empty() {
            return Err(InvalidParameters::EmptySymbol);
        }
        if self.metadata_base_uri.is_empty() {
            return Err(InvalidParameters::EmptyMetadataBaseUri);
        }
        if self.max_supply == 0 {
            return Err(InvalidParameters::ZeroMaxSupply);
        }
        let unit_cost = number::units::parse_units(&self.cost, self.decimals)
            .map_err(InvalidParameters::Cost)?;

        Ok(DeploymentParameters {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            unit_cost,
            max_supply: U256::from(self.max_supply),
            mint_opens_at: mint_date(now, self.mint_delay)?,
            metadata_base_uri: self.metadata_base_uri.clone(),
        })
    }
}

/// Unix timestamp in whole seconds at which minting opens: `now + delay`
/// with the sub-second part truncated.
pub fn mint_date(now: DateTime<Utc>, delay: Duration) -> Result<u64, InvalidParameters> {
    i64::try_from(delay.as_millis())
        .ok()
        .and_then(|delay| now.timestamp_millis().checked_add(delay))
        .and_then(|millis| u64::try_from(millis).ok())
        .map(|millis| millis / 1000)
        .ok_or(InvalidParameters::MintDate { now, delay })
}

#[derive(Debug, thiserror::Error)]
pub enum InvalidParameters {
    #[error("contract name must not be empty")]
    EmptyName,
    #[error("contract symbol must not be empty")]
    EmptySymbol,
    #[error("metadata base URI must not be empty")]
    EmptyMetadataBaseUri,
    #[error("max supply must be positive")]
    ZeroMaxSupply,
    #[error("invalid unit cost: {0:#}")]
    Cost(anyhow::Error),
    #[error("mint date {delay:?} after {now} is not a valid unix timestamp")]
    MintDate { now: DateTime<Utc>, delay: Duration },
}

/// Constructor parameters of the NFT contract. Built once per run through
/// [`Config::parameters`] and never modified afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentParameters {
    name: String,
    symbol: String,
    unit_cost: U256,
    max_supply: U256,
    mint_opens_at: u64,
    metadata_base_uri: String,
}

impl DeploymentParameters {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Price per token in the smallest ledger denomination.
    pub fn unit_cost(&self) -> U256 {
        self.unit_cost
    }

    pub fn max_supply(&self) -> U256 {
        self.max_supply
    }

    /// Unix timestamp (seconds) from which minting is permitted.
    pub fn mint_opens_at(&self) -> u64 {
        self.mint_opens_at
    }

    pub fn metadata_base_uri(&self) -> &str {
        &self.metadata_base_uri
    }

    /// Constructor arguments in the order the contract declares them: name,
    /// symbol, cost, max supply, mint date and base URI.
    pub fn constructor_args(&self) -> Vec<DynSolValue> {
        vec![
            DynSolValue::String(self.name.clone()),
            DynSolValue::String(self.symbol.clone()),
            DynSolValue::Uint(self.unit_cost, 256),
            DynSolValue::Uint(self.max_supply, 256),
            DynSolValue::Uint(U256::from(self.mint_opens_at), 256),
            DynSolValue::String(self.metadata_base_uri.clone()),
        ]
    }
}

/// What the ledger reports once a deployment transaction got accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Confirmation {
    pub address: Address,
    pub transaction: TxHash,
    pub block: Option<u64>,
}

/// A deployment whose parameters are assembled but which is not confirmed
/// yet.
#[derive(Debug)]
pub struct Pending {
    template: String,
    parameters: DeploymentParameters,
    transaction: Option<TxHash>,
}

impl Pending {
    pub fn new(template: &str, parameters: DeploymentParameters) -> Self {
        Self {
            template: template.to_string(),
            parameters,
            transaction: None,
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn parameters(&self) -> &DeploymentParameters {
        &self.parameters
    }

    /// Records the hash of the submitted deployment transaction.
    pub fn submitted(&mut self, transaction: TxHash) {
        tracing::debug!(template = %self.template, ?transaction, "deployment submitted");
        self.transaction = Some(transaction);
    }

    pub fn confirm(self, confirmation: Confirmation) -> Deployed {
        tracing::info!(
            template = %self.template,
            address = ?confirmation.address,
            transaction = ?confirmation.transaction,
            block = ?confirmation.block,
            "deployment confirmed"
        );
        Deployed {
            template: self.template,
            parameters: self.parameters,
            confirmation,
        }
    }

    pub fn fail(self, error: anyhow::Error) -> Failed {
        tracing::error!(
            template = %self.template,
            transaction = ?self.transaction,
            ?error,
            "deployment failed"
        );
        Failed {
            template: self.template,
            transaction: self.transaction,
            error,
        }
    }
}

#[derive(Debug)]
pub struct Deployed {
    pub template: String,
    pub parameters: DeploymentParameters,
    pub confirmation: Confirmation,
}

impl Deployed {
    pub fn address(&self) -> Address {
        self.confirmation.address
    }
}

#[derive(Debug, thiserror::Error)]
#[error("deploying {template} failed: {error:#}")]
pub struct Failed {
    pub template: String,
    /// Set if the failure happened after the transaction was submitted.
    pub transaction: Option<TxHash>,
    pub error: anyhow::Error,
}
