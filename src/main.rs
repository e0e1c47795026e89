use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use asset_ledger::ledger::AssetLedger;
use asset_ledger::storage::SledStore;

#[derive(Parser)]
#[command(name = "asset-ledger", about = "Ledger-backed dealer asset registry")]
struct Cli {
    /// Path of the database directory.
    #[arg(long, default_value = "asset_ledger_data")]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a new asset record.
    Create {
        dealer_id: String,
        msisdn: String,
        mpin: String,
        balance: f64,
        status: String,
    },
    /// Apply a debit or credit transaction to an asset.
    Update {
        msisdn: String,
        trans_amount: f64,
        trans_type: String,
        remarks: String,
    },
    /// Print the current asset record.
    Query { msisdn: String },
    /// Print every stored version of an asset, oldest first.
    History { msisdn: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let store = SledStore::new(&cli.db)
        .with_context(|| format!("Failed to open database at {}", cli.db.display()))?;
    let ledger = AssetLedger::new(Arc::new(store));

    match cli.command {
        Command::Create {
            dealer_id,
            msisdn,
            mpin,
            balance,
            status,
        } => {
            ledger.create(&dealer_id, &msisdn, &mpin, balance, &status)?;
            println!("Asset {} created successfully", msisdn);
        }
        Command::Update {
            msisdn,
            trans_amount,
            trans_type,
            remarks,
        } => {
            ledger.update_balance(&msisdn, trans_amount, &trans_type, &remarks)?;
            println!("Balance for asset {} updated successfully", msisdn);
        }
        Command::Query { msisdn } => {
            let asset = ledger.query(&msisdn)?;
            println!("{}", serde_json::to_string_pretty(&asset)?);
        }
        Command::History { msisdn } => {
            for asset in ledger.get_history(&msisdn)? {
                println!("{}", serde_json::to_string(&asset)?);
            }
        }
    }

    Ok(())
}
