use {
    crate::{
        domain::{Config, Deployed},
        infra::{
            Artifacts,
            Ethereum,
            SystemClock,
            blockchain::ConfirmationPolicy,
            cli,
            config,
        },
        runner,
    },
    anyhow::Result,
    clap::Parser,
    std::{io::Write, process::ExitCode},
};

const SUCCESS: u8 = 0;
const FAILURE: u8 = 1;

/// Entry point of the binary: deploys the contract and maps the outcome to
/// the process exit code.
pub async fn start(args: impl Iterator<Item = String>) -> ExitCode {
    let args = cli::Args::parse_from(args);
    let mut observe = observe::Config::default()
        .with_env_filter(&args.log)
        .with_stderr_threshold(tracing::Level::WARN);
    if args.use_json_logs {
        observe = observe.with_json_format();
    }
    observe::tracing::initialize(&observe);
    tracing::info!("running nft deployer with validated arguments:\n{args}");

    let result = run(args).await;
    ExitCode::from(report(
        result,
        &mut std::io::stdout().lock(),
        &mut std::io::stderr().lock(),
    ))
}

/// Wires the ledger backed infrastructure and runs a single deployment.
pub async fn run(args: cli::Args) -> Result<Deployed> {
    let config = match &args.config {
        Some(path) => config::file::load(path).await?,
        None => Config::default(),
    };
    let policy = confirmation_policy(&args);
    let ethereum = Ethereum::new(
        &args.node_url,
        args.private_key,
        Artifacts::new(args.artifacts),
        policy,
    )
    .await?;
    Ok(runner::deploy(&config, &ethereum, &SystemClock).await?)
}

/// The confirmation policy with the flags given on the command line applied.
fn confirmation_policy(args: &cli::Args) -> ConfirmationPolicy {
    let default = ConfirmationPolicy::default();
    ConfirmationPolicy {
        confirmations: args.confirmations.unwrap_or(default.confirmations),
        timeout: args.confirmation_timeout.or(default.timeout),
    }
}

/// Prints the outcome for the operator and returns the exit code.
fn report(result: Result<Deployed>, stdout: &mut impl Write, stderr: &mut impl Write) -> u8 {
    // Nothing sensible is left to do if the terminal is gone.
    match result {
        Ok(deployed) => {
            let _ = writeln!(
                stdout,
                "{} deployed to: {}\n",
                deployed.template,
                deployed.address()
            );
            SUCCESS
        }
        Err(err) => {
            let _ = writeln!(stderr, "{err:?}");
            FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::domain::Confirmation,
        alloy::primitives::{Address, TxHash},
        chrono::{TimeZone, Utc},
    };

    #[test]
    fn prints_address_on_success() {
        let parameters = Config::default()
            .parameters(Utc.timestamp_millis_opt(1_700_000_000_000).unwrap())
            .unwrap();
        let deployed = Deployed {
            template: "NFT".to_string(),
            parameters,
            confirmation: Confirmation {
                address: Address::repeat_byte(0xab),
                transaction: TxHash::ZERO,
                block: Some(1),
            },
        };
        let (mut stdout, mut stderr) = (Vec::new(), Vec::new());

        let code = report(Ok(deployed), &mut stdout, &mut stderr);

        assert_eq!(code, SUCCESS);
        assert_eq!(
            String::from_utf8(stdout).unwrap(),
            format!("NFT deployed to: {}\n\n", Address::repeat_byte(0xab))
        );
        assert!(stderr.is_empty());
    }

    #[test]
    fn prints_error_on_failure() {
        let (mut stdout, mut stderr) = (Vec::new(), Vec::new());

        let code = report(
            Err(anyhow::anyhow!("connection refused").context("could not connect to node")),
            &mut stdout,
            &mut stderr,
        );

        assert_eq!(code, FAILURE);
        assert!(stdout.is_empty());
        let printed = String::from_utf8(stderr).unwrap();
        assert!(printed.contains("could not connect to node"));
        assert!(printed.contains("connection refused"));
    }

    #[test]
    fn confirmation_flags_override_policy() {
        let args = cli::Args::try_parse_from(["nft-deployer"]).unwrap();
        let policy = confirmation_policy(&args);
        assert_eq!(policy.confirmations, 1);
        assert_eq!(policy.timeout, None);

        let args = cli::Args::try_parse_from([
            "nft-deployer",
            "--confirmations",
            "5",
            "--confirmation-timeout",
            "10m",
        ])
        .unwrap();
        let policy = confirmation_policy(&args);
        assert_eq!(policy.confirmations, 5);
        assert_eq!(policy.timeout, Some(std::time::Duration::from_secs(600)));
    }

    #[tokio::test]
    async fn invalid_config_file_fails_before_connecting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployment.toml");
        std::fs::write(&path, "max-supply = \"many\"").unwrap();
        let args = cli::Args::try_parse_from([
            "nft-deployer",
            "--config",
            path.to_str().unwrap(),
            // nothing listens here
            "--node-url",
            "http://127.0.0.1:1",
        ])
        .unwrap();

        let err = run(args).await.unwrap_err();

        assert!(format!("{err:?}").contains("invalid deployment config"));
    }
}
