use std::path::PathBuf;

use clap::{Parser, Subcommand};
use store::Tier;

#[derive(Parser)]
#[command(name = "curator")]
#[command(about = "Atelier album publishing CLI", long_about = None)]
pub struct Cli {
    /// Override the blockchain network (devnet, testnet, or mainnet)
    #[arg(long, global = true, env = "SUI_CHAIN")]
    pub chain: Option<String>,

    #[arg(long, global = true, env = "SUI_RPC_URL")]
    pub rpc_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Mint a new album on-chain and store its draft
    Create {
        #[arg(long)]
        name: String,

        #[arg(long, value_parser = parse_tier, default_value = "standard")]
        tier: Tier,

        /// Price in MIST
        #[arg(long)]
        price: u64,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long)]
        tag: Vec<String>,

        /// Content files to encrypt and publish later
        #[arg(long)]
        content: Vec<PathBuf>,
    },

    /// Submit a draft for approval
    Submit {
        /// The album id
        album: String,
    },

    /// Approve a pending album
    Approve { album: String },

    /// Reject a pending album
    Reject { album: String },

    /// List albums awaiting approval
    Pending,

    /// List albums for an owner (defaults to the configured signer)
    List {
        #[arg(long)]
        owner: Option<String>,
    },

    /// Encrypt and upload an approved album's contents
    Publish { album: String },

    /// Confirm publication on-chain for one blob, or all unpublished blobs
    Confirm {
        album: String,

        /// Confirm only this blob
        #[arg(long)]
        blob: Option<String>,
    },

    /// Download one of an album's uploaded ciphertexts
    Fetch {
        album: String,

        blob: String,

        /// Write the ciphertext here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// List blobs still awaiting confirmation
    Unpublished { album: String },

    /// Show a creator profile
    Profile { address: String },

    /// Update a creator profile
    UpdateProfile {
        address: String,

        #[arg(long)]
        display_name: String,

        #[arg(long, default_value = "")]
        bio: String,

        #[arg(long)]
        avatar: Option<PathBuf>,
    },
}

fn parse_tier(s: &str) -> Result<Tier, String> {
    match s.to_lowercase().as_str() {
        "standard" => Ok(Tier::Standard),
        "premium" => Ok(Tier::Premium),
        "exclusive" => Ok(Tier::Exclusive),
        "principle" => Ok(Tier::Principle),
        other => Err(format!(
            "unknown tier '{}'; expected standard, premium, exclusive, or principle",
            other
        )),
    }
}
