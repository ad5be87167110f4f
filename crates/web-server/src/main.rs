use std::path::Path;
use tracing_subscriber::EnvFilter;

// This main function is the entry point when running `cargo run -p web-server`.
// It loads `footfall.toml` from the working directory and serves it; the
// `footfall` binary offers the same with file logging and a CLI.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = configuration::load_config(Path::new("footfall.toml"))?;
    web_server::run_server(config).await
}
