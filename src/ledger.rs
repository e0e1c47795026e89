use std::sync::Arc;

use thiserror::Error;

use crate::storage::{Store, StoreError};
use crate::types::{Asset, TransType};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
    #[error("Asset not found: {0}")]
    NotFound(String),
    #[error("Failed to decode asset record {msisdn}: {source}")]
    Decode {
        msisdn: String,
        source: serde_json::Error,
    },
    #[error("Failed to encode asset record {msisdn}: {source}")]
    Encode {
        msisdn: String,
        source: serde_json::Error,
    },
    #[error("Invalid transaction type: {0}")]
    InvalidTransType(String),
}

/// Façade over an injected [`Store`] implementing the four asset operations.
pub struct AssetLedger<S: Store> {
    store: Arc<S>,
}

impl<S: Store> AssetLedger<S> {
    pub fn new(store: Arc<S>) -> Self {
        AssetLedger { store }
    }

    /// Register a new asset record under its msisdn.
    ///
    /// No field is validated; the last-transaction fields start at their
    /// zero values. Writing an msisdn that already exists replaces the
    /// current record, with the prior versions still visible through
    /// [`AssetLedger::get_history`].
    pub fn create(
        &self,
        dealer_id: &str,
        msisdn: &str,
        mpin: &str,
        balance: f64,
        status: &str,
    ) -> Result<(), LedgerError> {
        let asset = Asset {
            dealer_id: dealer_id.to_string(),
            msisdn: msisdn.to_string(),
            mpin: mpin.to_string(),
            balance,
            status: status.to_string(),
            ..Asset::default()
        };

        self.store.put(msisdn, &encode(&asset)?)?;
        tracing::info!(msisdn, "asset created");
        Ok(())
    }

    /// Apply a debit or credit transaction to an existing asset.
    ///
    /// The transaction type is validated before anything is written, so a
    /// rejected transaction never mutates stored state. There is no
    /// balance-sufficiency check: debits may drive the balance negative.
    pub fn update_balance(
        &self,
        msisdn: &str,
        trans_amount: f64,
        trans_type: &str,
        remarks: &str,
    ) -> Result<(), LedgerError> {
        let mut asset = self.query(msisdn)?;

        let trans = TransType::parse(trans_type)
            .ok_or_else(|| LedgerError::InvalidTransType(trans_type.to_string()))?;

        asset.balance = trans.apply(asset.balance, trans_amount);
        asset.trans_amount = trans_amount;
        asset.trans_type = trans.as_str().to_string();
        asset.remarks = remarks.to_string();

        self.store.put(msisdn, &encode(&asset)?)?;
        tracing::info!(msisdn, trans_type, trans_amount, "balance updated");
        Ok(())
    }

    /// Fetch the current record for an msisdn.
    pub fn query(&self, msisdn: &str) -> Result<Asset, LedgerError> {
        let encoded = self
            .store
            .get(msisdn)?
            .ok_or_else(|| LedgerError::NotFound(msisdn.to_string()))?;
        serde_json::from_slice(&encoded).map_err(|source| LedgerError::Decode {
            msisdn: msisdn.to_string(),
            source,
        })
    }

    /// Enumerate every stored version of the record, oldest first.
    ///
    /// A version that no longer decodes contributes a zero-valued record
    /// instead of aborting the scan. A cursor failure aborts the whole call
    /// and discards the partial result.
    pub fn get_history(&self, msisdn: &str) -> Result<Vec<Asset>, LedgerError> {
        let mut history = Vec::new();
        for entry in self.store.history(msisdn)? {
            let encoded = entry?;
            history.push(serde_json::from_slice(&encoded).unwrap_or_default());
        }
        Ok(history)
    }
}

fn encode(asset: &Asset) -> Result<Vec<u8>, LedgerError> {
    serde_json::to_vec(asset).map_err(|source| LedgerError::Encode {
        msisdn: asset.msisdn.clone(),
        source,
    })
}
