use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tb_domain::config::Config;
use tb_gateway::cli::{Cli, Command, ConfigCommand};
use tb_gateway::telegram::TelegramTransport;
use tb_gateway::{deliver_all, Engine};
use tb_providers::{OzonProvider, TravelProvider};
use tb_sessions::FileKv;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Default to serve when no subcommand is given.
        None | Some(Command::Serve) => {
            init_tracing();
            let (config, config_path) = tb_gateway::cli::load_config()?;
            tracing::info!(path = %config_path, "config loaded");
            serve(config).await
        }
        Some(Command::Config(ConfigCommand::Validate)) => {
            match tb_gateway::cli::load_config() {
                Ok((_, path)) => {
                    println!("{path}: OK");
                    Ok(())
                }
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(1);
                }
            }
        }
        Some(Command::Config(ConfigCommand::Show)) => {
            let (config, _) = tb_gateway::cli::load_config()?;
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        Some(Command::Version) => {
            println!("tourbot {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TOURBOT_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Wire the store, provider and engine, then run the long-poll loop.
async fn serve(config: Config) -> anyhow::Result<()> {
    let token = std::env::var(&config.telegram.token_env).with_context(|| {
        format!("bot token env var '{}' not set", config.telegram.token_env)
    })?;

    let kv = Arc::new(FileKv::new(&config.storage.state_path).context("opening session store")?);
    let provider = Arc::new(OzonProvider::from_config(&config.provider)?);
    tracing::info!(provider = provider.provider_id(), "travel provider ready");

    let engine = Arc::new(Engine::new(kv, provider, &config));
    let transport = Arc::new(TelegramTransport::new(&token, &config.telegram)?);

    // Periodic session lock pruning.
    {
        let engine = engine.clone();
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(std::time::Duration::from_secs(60));
            loop {
                interval.tick().await;
                engine.prune_idle_locks();
            }
        });
    }

    tracing::info!("polling for updates");

    let mut offset = 0i64;
    loop {
        let (next_offset, messages) = match transport.poll(offset).await {
            Ok(batch) => batch,
            Err(e) => {
                tracing::warn!(error = %e, "poll failed, backing off");
                tokio::time::sleep(std::time::Duration::from_secs(3)).await;
                continue;
            }
        };
        offset = next_offset;

        // One task per message; the engine's per-user lock keeps turns
        // of the same user serialized.
        for msg in messages {
            let engine = engine.clone();
            let transport = transport.clone();
            tokio::spawn(async move {
                match engine.handle_message(&msg).await {
                    Ok(batch) => {
                        deliver_all(transport.as_ref(), &batch).await;
                    }
                    Err(e) => {
                        tracing::error!(user_id = msg.user_id, error = %e, "message handling failed");
                    }
                }
            });
        }
    }
}
