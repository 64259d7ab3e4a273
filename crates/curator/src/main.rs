mod cli;

use std::collections::BTreeSet;
use std::env;
use std::fs;

use clap::Parser;
use dotenvy::dotenv;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use base64::prelude::*;
use curator::clients::ChainLedger;
use curator::{ConfirmOutcome, Curator, CuratorConfig, NewAlbum};
use seal::{SealClient, SealConfig};
use store::{StoreClient, StoreConfig};
use sui::SuiInterface;
use walrus::WalrusClient;

use crate::cli::{Cli, Commands};

type AtelierCurator = Curator<SealClient, WalrusClient, ChainLedger, StoreClient>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let rpc_url = sui::resolve_rpc_url(cli.rpc_url.clone(), cli.chain.clone())?;
    let curator = build_curator(&rpc_url)?;

    match cli.command {
        Commands::Create {
            name,
            tier,
            price,
            description,
            tag,
            content,
        } => {
            let mut content_refs = Vec::new();
            let mut raw_contents = Vec::new();
            for path in &content {
                let bytes = fs::read(path)?;
                content_refs.push(path.display().to_string());
                raw_contents.push(BASE64_STANDARD.encode(bytes));
            }
            let album = curator
                .create_album(NewAlbum {
                    name,
                    tier,
                    price,
                    description,
                    tags: tag.into_iter().collect::<BTreeSet<_>>(),
                    content_refs,
                    raw_contents,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&album)?);
        }

        Commands::Submit { album } => {
            let album = curator.submit_for_approval(&album).await?;
            println!("Album {} is now {:?}", album.id, album.status);
        }

        Commands::Approve { album } => {
            let album = curator.approve(&album).await?;
            println!("Album {} is now {:?}", album.id, album.status);
        }

        Commands::Reject { album } => {
            let album = curator.reject(&album).await?;
            println!("Album {} is now {:?}", album.id, album.status);
        }

        Commands::Pending => {
            for album in curator.pending_approvals().await? {
                println!("{}  {}  by {}", album.id, album.name, album.owner);
            }
        }

        Commands::List { owner } => {
            let owner = match owner {
                Some(owner) => owner,
                None => env::var("SUI_ADDRESS")
                    .map_err(|_| anyhow::anyhow!("--owner not given and SUI_ADDRESS not set"))?,
            };
            for album in curator.albums_by_owner(&owner).await? {
                println!(
                    "{}  {}  {:?}  {} blobs",
                    album.id,
                    album.name,
                    album.status,
                    album.published_blobs.len()
                );
            }
        }

        Commands::Publish { album } => {
            let (album, outcome) = curator.publish_album(&album).await?;
            println!(
                "Stored {} blobs for album {}",
                outcome.records.len(),
                album.id
            );
            if outcome.dropped() > 0 {
                println!(
                    "WARNING: {} items were dropped ({} at encryption, {} at upload)",
                    outcome.dropped(),
                    outcome.dropped_encrypt,
                    outcome.dropped_upload
                );
            }
            for record in &outcome.records {
                println!("  {}  ({} bytes, cost {})", record.blob_id, record.size, record.cost);
            }
        }

        Commands::Confirm { album, blob } => {
            let outcomes = match blob {
                Some(blob) => vec![(blob.clone(), curator.confirm_blob(&album, &blob).await?)],
                None => curator.confirm_all(&album).await?,
            };
            for (blob_id, outcome) in outcomes {
                match outcome {
                    ConfirmOutcome::Published => println!("{}  published", blob_id),
                    ConfirmOutcome::AlreadyPublished => println!("{}  already published", blob_id),
                    ConfirmOutcome::TxFailed { reason } => {
                        println!("{}  FAILED: {}", blob_id, reason)
                    }
                    ConfirmOutcome::SignerRejected => {
                        println!("{}  rejected by signer", blob_id)
                    }
                }
            }
        }

        Commands::Fetch { album, blob, out } => {
            let bytes = curator.fetch_blob(&album, &blob).await?;
            match out {
                Some(path) => {
                    fs::write(&path, &bytes)?;
                    println!("Wrote {} bytes to {}", bytes.len(), path.display());
                }
                None => {
                    use std::io::Write;
                    std::io::stdout().write_all(&bytes)?;
                }
            }
        }

        Commands::Unpublished { album } => {
            for record in curator.list_unpublished(&album).await? {
                println!("{}  ({} bytes)", record.blob_id, record.size);
            }
        }

        Commands::Profile { address } => {
            let profile = curator.store().get_profile(&address).await?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }

        Commands::UpdateProfile {
            address,
            display_name,
            bio,
            avatar,
        } => {
            let avatar = match avatar {
                Some(path) => {
                    let bytes = fs::read(&path)?;
                    let filename = path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "avatar".to_string());
                    Some((filename, bytes))
                }
                None => None,
            };
            let profile = curator
                .store()
                .update_profile(
                    &store::CreatorProfile {
                        address,
                        display_name,
                        bio,
                        avatar_url: None,
                    },
                    avatar,
                )
                .await?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
    }

    Ok(())
}

fn build_curator(rpc_url: &str) -> anyhow::Result<AtelierCurator> {
    let config = CuratorConfig::from_env()?;

    // The access policy usually lives in the albums package itself
    let seal_config = SealConfig::from_env(Some(&config.package_id))?;

    let interface = match SuiInterface::with_env_signer(rpc_url) {
        Ok(interface) => interface,
        Err(e) => {
            warn!("No signer available ({}); transactions will be rejected", e);
            SuiInterface::new(rpc_url)
        }
    };

    Ok(Curator::new(
        SealClient::new(seal_config),
        WalrusClient::new(),
        ChainLedger::new(interface, config.package_id.clone()),
        StoreClient::new(StoreConfig::from_env()),
        config,
    ))
}
