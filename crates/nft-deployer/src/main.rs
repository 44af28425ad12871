#[tokio::main]
async fn main() -> std::process::ExitCode {
    nft_deployer::start(std::env::args()).await
}
