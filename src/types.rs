//! Core record definitions for the asset ledger.
//!
//! This module contains the `Asset` record as it is persisted in the store
//! and the closed set of transaction types accepted by balance updates.

use serde::{Deserialize, Serialize};

/// A dealer asset record.
///
/// The serde renames fix the persisted JSON layout. Records already stored
/// under these key names must keep decoding, so the names are load-bearing.
///
/// `trans_amount`, `trans_type` and `remarks` describe the most recent
/// transaction only; every balance update overwrites them. The durable
/// transaction log is the store's own per-key history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(rename = "dealerID")]
    pub dealer_id: String,
    /// Subscriber identifier, doubles as the store key. Immutable once set.
    pub msisdn: String,
    pub mpin: String,
    pub balance: f64,
    pub status: String,
    #[serde(rename = "transAmount")]
    pub trans_amount: f64,
    #[serde(rename = "transType")]
    pub trans_type: String,
    pub remarks: String,
}

/// Recognized transaction types for balance updates.
///
/// The stored `transType` field stays a plain string so the zero value `""`
/// of a freshly created record remains representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransType {
    Debit,
    Credit,
}

impl TransType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "debit" => Some(TransType::Debit),
            "credit" => Some(TransType::Credit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransType::Debit => "debit",
            TransType::Credit => "credit",
        }
    }

    /// Apply the amount to a balance. Debits subtract, credits add; the
    /// result may go negative.
    pub fn apply(&self, balance: f64, amount: f64) -> f64 {
        match self {
            TransType::Debit => balance - amount,
            TransType::Credit => balance + amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_asset() -> Asset {
        Asset {
            dealer_id: "D1".to_string(),
            msisdn: "5550100".to_string(),
            mpin: "1234".to_string(),
            balance: 12.75,
            status: "active".to_string(),
            trans_amount: 2.5,
            trans_type: "credit".to_string(),
            remarks: "topup".to_string(),
        }
    }

    #[test]
    fn wire_format_field_names_and_order() {
        let json = serde_json::to_string(&sample_asset()).unwrap();
        assert_eq!(
            json,
            r#"{"dealerID":"D1","msisdn":"5550100","mpin":"1234","balance":12.75,"status":"active","transAmount":2.5,"transType":"credit","remarks":"topup"}"#
        );
    }

    #[test]
    fn wire_format_round_trip() {
        let asset = sample_asset();
        let encoded = serde_json::to_vec(&asset).unwrap();
        let decoded: Asset = serde_json::from_slice(&encoded).unwrap();
        assert_eq!(decoded, asset);
        // re-encoding must reproduce the exact bytes, fractional values included
        assert_eq!(serde_json::to_vec(&decoded).unwrap(), encoded);
    }

    #[test]
    fn decodes_records_written_by_other_tooling() {
        // field order and whitespace are not ours to rely on
        let raw = r#"{ "balance": 100.5, "dealerID": "D9", "mpin": "0000",
                       "msisdn": "5550199", "remarks": "", "status": "blocked",
                       "transAmount": 0, "transType": "" }"#;
        let decoded: Asset = serde_json::from_str(raw).unwrap();
        assert_eq!(decoded.dealer_id, "D9");
        assert_eq!(decoded.balance, 100.5);
        assert_eq!(decoded.status, "blocked");
    }

    #[test]
    fn default_is_the_zero_record() {
        let asset = Asset::default();
        assert_eq!(asset.balance, 0.0);
        assert_eq!(asset.trans_amount, 0.0);
        assert_eq!(asset.dealer_id, "");
        assert_eq!(asset.trans_type, "");
        assert_eq!(asset.remarks, "");
    }

    #[test]
    fn trans_type_parsing() {
        assert_eq!(TransType::parse("debit"), Some(TransType::Debit));
        assert_eq!(TransType::parse("credit"), Some(TransType::Credit));
        assert_eq!(TransType::parse("Credit"), None);
        assert_eq!(TransType::parse("bogus"), None);
        assert_eq!(TransType::parse(""), None);
    }

    #[test]
    fn trans_type_application() {
        assert_eq!(TransType::Debit.apply(100.0, 30.0), 70.0);
        assert_eq!(TransType::Credit.apply(70.0, 5.5), 75.5);
        // debits may drive the balance negative
        assert_eq!(TransType::Debit.apply(10.0, 25.0), -15.0);
    }
}
