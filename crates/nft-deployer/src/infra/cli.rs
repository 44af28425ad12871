//! CLI arguments for the `nft-deployer` binary.

use {
    alloy::signers::local::PrivateKeySigner,
    clap::Parser,
    std::{path::PathBuf, time::Duration},
    url::Url,
};

/// Deploy the NFT contract and print its address.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// The log filter.
    #[arg(long, env, default_value = "warn,nft_deployer=debug")]
    pub log: String,

    /// Output log events as JSON.
    #[arg(long, env)]
    pub use_json_logs: bool,

    /// The Ethereum node URL to connect to.
    #[arg(long, env, default_value = "http://localhost:8545")]
    pub node_url: Url,

    /// Private key of the deployer account. If omitted the first account
    /// unlocked on the node is used.
    #[arg(long, env)]
    pub private_key: Option<PrivateKeySigner>,

    /// Directory containing the Hardhat compilation artifacts.
    #[arg(long, env, default_value = "artifacts")]
    pub artifacts: PathBuf,

    /// Path to a TOML file overriding the deployment parameters.
    #[arg(long, env)]
    pub config: Option<PathBuf>,

    /// Number of blocks to wait for before a deployment counts as confirmed.
    /// Defaults to the block including the deployment.
    #[arg(long, env, value_parser = clap::value_parser!(u64).range(1..))]
    pub confirmations: Option<u64>,

    /// Give up waiting for the confirmation after this long.
    #[arg(long, env, value_parser = humantime::parse_duration)]
    pub confirmation_timeout: Option<Duration>,
}

impl std::fmt::Display for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "log: {}", self.log)?;
        writeln!(f, "use_json_logs: {}", self.use_json_logs)?;
        writeln!(f, "node_url: {}", self.node_url)?;
        match &self.private_key {
            Some(signer) => writeln!(f, "private_key: SECRET ({:?})", signer.address())?,
            None => writeln!(f, "private_key: None")?,
        }
        writeln!(f, "artifacts: {}", self.artifacts.display())?;
        writeln!(f, "config: {:?}", self.config)?;
        writeln!(f, "confirmations: {:?}", self.confirmations)?;
        writeln!(f, "confirmation_timeout: {:?}", self.confirmation_timeout)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // First default account of local development nodes.
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn defaults_need_no_flags() {
        let args = Args::try_parse_from(["nft-deployer"]).unwrap();
        assert_eq!(args.node_url.as_str(), "http://localhost:8545/");
        assert_eq!(args.artifacts, PathBuf::from("artifacts"));
        assert!(args.confirmations.is_none());
        assert!(args.private_key.is_none());
        assert!(args.config.is_none());
        assert!(args.confirmation_timeout.is_none());
    }

    #[test]
    fn confirmations_must_include_the_block() {
        assert!(Args::try_parse_from(["nft-deployer", "--confirmations", "0"]).is_err());
        let args = Args::try_parse_from(["nft-deployer", "--confirmations", "3"]).unwrap();
        assert_eq!(args.confirmations, Some(3));
    }

    #[test]
    fn display_hides_private_key() {
        let args = Args::try_parse_from([
            "nft-deployer",
            "--private-key",
            DEV_KEY,
            "--confirmation-timeout",
            "2m",
        ])
        .unwrap();
        assert_eq!(args.confirmation_timeout, Some(Duration::from_secs(120)));

        let displayed = args.to_string();
        assert!(!displayed.contains(&DEV_KEY[2..]));
        assert!(displayed.contains("private_key: SECRET"));
    }
}
