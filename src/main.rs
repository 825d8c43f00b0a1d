mod cli;

use clap::Parser;
use mockstore::{Server, ServerConfig, logging};

use cli::Args;

#[async_std::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let loaded = args.config.as_deref().map(ServerConfig::load).transpose();
    let mut config = match &loaded {
        Ok(Some(config)) => config.clone(),
        _ => ServerConfig::default(),
    };
    args.apply(&mut config);

    logging::init(&config.log_level)?;
    if let Err(err) = &loaded {
        tracing::warn!("{err}");
        tracing::warn!("Fall back to default config");
    }

    let server = Server::bind(config).await?;
    server.run().await?;
    Ok(())
}
