use {
    crate::domain::Config,
    anyhow::{Context, Result},
    serde::Deserialize,
    std::{path::Path, time::Duration},
    tokio::fs,
};

/// Deployment parameters as written in the TOML file. Every field is optional
/// and falls back to [`Config::default`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct File {
    /// Name of the compiled contract to deploy.
    template: Option<String>,
    name: Option<String>,
    symbol: Option<String>,
    /// Decimal price per token, e.g. `"0.05"`.
    cost: Option<String>,
    /// Denomination exponent of `cost`.
    decimals: Option<u8>,
    max_supply: Option<u64>,
    /// Delay between deployment and the opening of the mint, e.g. `"1h"`.
    #[serde(default, with = "humantime_serde")]
    mint_delay: Option<Duration>,
    metadata_base_uri: Option<String>,
}

impl File {
    fn into_config(self) -> Config {
        let default = Config::default();
        Config {
            template: self.template.unwrap_or(default.template),
            name: self.name.unwrap_or(default.name),
            symbol: self.symbol.unwrap_or(default.symbol),
            cost: self.cost.unwrap_or(default.cost),
            decimals: self.decimals.unwrap_or(default.decimals),
            max_supply: self.max_supply.unwrap_or(default.max_supply),
            mint_delay: self.mint_delay.unwrap_or(default.mint_delay),
            metadata_base_uri: self.metadata_base_uri.unwrap_or(default.metadata_base_uri),
        }
    }
}

/// Load the deployment configuration from a TOML file.
pub async fn load(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)
        .await
        .with_context(|| format!("I/O error while reading {path:?}"))?;
    load_str(&data).with_context(|| format!("invalid deployment config {path:?}"))
}

/// Load the deployment configuration from a TOML string.
pub fn load_str(data: &str) -> Result<Config> {
    let file = toml::de::from_str::<File>(data).context("TOML syntax error")?;
    Ok(file.into_config())
}

#[cfg(test)]
mod tests {
    use {super::*, std::io::Write};

    #[test]
    fn empty_file_uses_defaults() {
        assert_eq!(load_str("").unwrap(), Config::default());
    }

    #[test]
    fn overrides_given_fields() {
        let config = load_str(
            r#"
            name = "Moon_cats"
            symbol = "MC"
            cost = "0.05"
            max-supply = 10000
            mint-delay = "1h 30m"
            "#,
        )
        .unwrap();

        assert_eq!(
            config,
            Config {
                name: "Moon_cats".to_string(),
                symbol: "MC".to_string(),
                cost: "0.05".to_string(),
                max_supply: 10_000,
                mint_delay: Duration::from_secs(90 * 60),
                ..Default::default()
            }
        );
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(load_str("price = \"10\"").is_err());
    }

    #[tokio::test]
    async fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "template = \"Punks\"").unwrap();
        writeln!(file, "metadata-base-uri = \"ipfs://punks/\"").unwrap();

        let config = load(file.path()).await.unwrap();

        assert_eq!(config.template, "Punks");
        assert_eq!(config.metadata_base_uri, "ipfs://punks/");
        assert_eq!(config.symbol, "TP");
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("missing.toml")).await.is_err());
    }
}
