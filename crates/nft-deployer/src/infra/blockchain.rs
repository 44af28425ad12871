use {
    crate::{
        domain::{Confirmation, DeploymentParameters},
        infra::hardhat::{Artifact, Artifacts},
        traits::{ContractFactories, Factory, PendingDeployment},
    },
    alloy::{
        dyn_abi::{DynSolValue, JsonAbiExt},
        network::{EthereumWallet, TransactionBuilder},
        primitives::{Address, Bytes, TxHash},
        providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder},
        rpc::types::TransactionRequest,
        signers::local::PrivateKeySigner,
    },
    anyhow::{Context, Result, ensure},
    std::time::Duration,
    url::Url,
};

/// When a submitted deployment counts as confirmed.
#[derive(Clone, Copy, Debug)]
pub struct ConfirmationPolicy {
    /// Number of blocks including the one with the deployment.
    pub confirmations: u64,
    pub timeout: Option<Duration>,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            confirmations: 1,
            timeout: None,
        }
    }
}

/// Deploys Hardhat artifacts to an Ethereum node.
pub struct Ethereum {
    provider: DynProvider,
    sender: Address,
    artifacts: Artifacts,
    policy: ConfirmationPolicy,
}

impl Ethereum {
    /// Connects to the node at `url`. Transactions are signed locally with
    /// `signer` or, without one, by the node with its first unlocked account.
    pub async fn new(
        url: &Url,
        signer: Option<PrivateKeySigner>,
        artifacts: Artifacts,
        policy: ConfirmationPolicy,
    ) -> Result<Self> {
        let (provider, sender) = match signer {
            Some(signer) => {
                let sender = signer.address();
                let provider = ProviderBuilder::new()
                    .wallet(EthereumWallet::new(signer))
                    .connect_http(url.clone())
                    .erased();
                (provider, sender)
            }
            None => {
                let provider = ProviderBuilder::new().connect_http(url.clone()).erased();
                let sender = provider
                    .get_accounts()
                    .await
                    .context("eth_accounts")?
                    .into_iter()
                    .next()
                    .context("node has no unlocked accounts, a private key is required")?;
                (provider, sender)
            }
        };
        let chain_id = provider
            .get_chain_id()
            .await
            .with_context(|| format!("could not connect to node at {url}"))?;
        tracing::info!(chain_id, ?sender, artifacts = ?artifacts.root(), "connected to node");

        Ok(Self {
            provider,
            sender,
            artifacts,
            policy,
        })
    }
}

#[async_trait::async_trait]
impl ContractFactories for Ethereum {
    async fn factory(&self, template: &str) -> Result<Box<dyn Factory>> {
        let artifact = self.artifacts.load(template).await?;
        Ok(Box::new(ArtifactFactory {
            provider: self.provider.clone(),
            sender: self.sender,
            artifact,
            policy: self.policy,
        }))
    }
}

struct ArtifactFactory {
    provider: DynProvider,
    sender: Address,
    artifact: Artifact,
    policy: ConfirmationPolicy,
}

#[async_trait::async_trait]
impl Factory for ArtifactFactory {
    async fn deploy(
        &self,
        parameters: &DeploymentParameters,
    ) -> Result<Box<dyn PendingDeployment>> {
        let code = creation_code(&self.artifact, &parameters.constructor_args())?;
        let tx = TransactionRequest::default()
            .from(self.sender)
            .with_deploy_code(code);
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .with_context(|| format!("failed to send {} deployment", self.artifact.contract_name))?;
        Ok(Box::new(Submitted {
            provider: self.provider.clone(),
            transaction: *pending.tx_hash(),
            policy: self.policy,
        }))
    }
}

/// Creation bytecode followed by the ABI encoded constructor arguments.
fn creation_code(artifact: &Artifact, args: &[DynSolValue]) -> Result<Bytes> {
    let constructor = artifact
        .abi
        .constructor
        .as_ref()
        .with_context(|| format!("{} declares no constructor", artifact.contract_name))?;
    ensure!(
        constructor.inputs.len() == args.len(),
        "{} constructor takes {} arguments, got {}",
        artifact.contract_name,
        constructor.inputs.len(),
        args.len()
    );
    let encoded = constructor.abi_encode_input(args).with_context(|| {
        format!(
            "arguments do not match the {} constructor",
            artifact.contract_name
        )
    })?;
    Ok([artifact.bytecode.as_ref(), encoded.as_slice()].concat().into())
}

struct Submitted {
    provider: DynProvider,
    transaction: TxHash,
    policy: ConfirmationPolicy,
}

#[async_trait::async_trait]
impl PendingDeployment for Submitted {
    fn transaction(&self) -> TxHash {
        self.transaction
    }

    async fn confirmation(&self) -> Result<Confirmation> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), self.transaction)
            .with_required_confirmations(self.policy.confirmations)
            .with_timeout(self.policy.timeout)
            .get_receipt()
            .await
            .context("failed to get deployment receipt")?;
        ensure!(
            receipt.status(),
            "deployment transaction {:?} reverted",
            receipt.transaction_hash
        );
        let address = receipt
            .contract_address
            .context("receipt does not contain a contract address")?;

        Ok(Confirmation {
            address,
            transaction: receipt.transaction_hash,
            block: receipt.block_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{domain::Config, infra::hardhat::tests::nft_artifact},
        alloy::primitives::U256,
        chrono::{TimeZone, Utc},
    };

    fn artifact() -> Artifact {
        Artifact::parse("NFT", &serde_json::to_vec(&nft_artifact("NFT")).unwrap()).unwrap()
    }

    fn parameters() -> DeploymentParameters {
        Config::default()
            .parameters(Utc.timestamp_millis_opt(1_700_000_000_000).unwrap())
            .unwrap()
    }

    /// Reads the 32 byte head word of constructor argument `index`.
    fn word(encoded: &[u8], index: usize) -> U256 {
        U256::from_be_slice(&encoded[index * 32..(index + 1) * 32])
    }

    #[test]
    fn appends_arguments_to_bytecode() {
        let artifact = artifact();
        let code = creation_code(&artifact, &parameters().constructor_args()).unwrap();

        assert!(code.starts_with(&artifact.bytecode));
        let encoded = &code[artifact.bytecode.len()..];
        // six head words followed by the tails of the three strings
        assert_eq!(encoded.len() % 32, 0);
        assert!(encoded.len() > 6 * 32);
        assert_eq!(word(encoded, 2), U256::from(10_000_000_000_000_000_000u128));
        assert_eq!(word(encoded, 3), U256::from(25));
        assert_eq!(word(encoded, 4), U256::from(1_700_000_060u64));
    }

    #[test]
    fn rejects_mismatching_constructor() {
        let artifact = artifact();
        let mut args = parameters().constructor_args();
        args.pop();
        assert!(creation_code(&artifact, &args).is_err());

        // cost where the name is expected
        let mut args = parameters().constructor_args();
        args.swap(0, 2);
        assert!(creation_code(&artifact, &args).is_err());
    }

    #[test]
    fn requires_constructor() {
        let mut json = nft_artifact("NFT");
        json["abi"] = serde_json::json!([]);
        let artifact = Artifact::parse("NFT", &serde_json::to_vec(&json).unwrap()).unwrap();

        let err = creation_code(&artifact, &parameters().constructor_args()).unwrap_err();

        assert!(err.to_string().contains("declares no constructor"));
    }
}
