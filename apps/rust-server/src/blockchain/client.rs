// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! XRP Ledger client for account queries and transaction submission.
//!
//! [`LedgerClient`] is the capability the workflows depend on. [`XrplClient`]
//! implements it over rippled's JSON-RPC API: transactions are autofilled,
//! signed locally and then polled until they appear in a validated ledger.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::codec::{self, CodecError};
use super::signing::{KeyError, Wallet};
use super::transactions::Transaction;
use super::types::*;

/// Engine result reported when a transaction can no longer be included.
pub const TEF_MAX_LEDGER: &str = "tefMAX_LEDGER";

/// Fee cap (2 XRP), matching the usual client default.
const DEFAULT_MAX_FEE_DROPS: u64 = 2_000_000;

/// Floor used when the server reports no fee.
const DEFAULT_BASE_FEE_DROPS: u64 = 10;

/// HTTP timeout for a single RPC or faucet call.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Operations the workflows need from a ledger.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Root account state in the latest validated ledger, `None` if the
    /// account does not exist yet.
    async fn account_info(&self, address: &str) -> Result<Option<AccountInfo>, LedgerError>;

    /// Trust lines of `address`, optionally restricted to one counterparty.
    async fn account_lines(
        &self,
        address: &str,
        peer: Option<&str>,
    ) -> Result<Vec<TrustLine>, LedgerError>;

    /// Autofill, sign, submit and wait for the transaction to be validated.
    ///
    /// Returns the final outcome whatever its result code; only transport
    /// and protocol failures are errors.
    async fn submit_and_wait(
        &self,
        wallet: &Wallet,
        tx: Transaction,
    ) -> Result<SubmitOutcome, LedgerError>;

    /// Ask the test-network faucet to fund `address`.
    async fn fund_wallet(&self, address: &str) -> Result<(), LedgerError>;

    /// Order book for `taker_gets`/`taker_pays`, as returned by the ledger.
    async fn book_offers(
        &self,
        taker_gets: &Asset,
        taker_pays: &Asset,
        limit: u32,
    ) -> Result<Value, LedgerError>;

    /// Index of the latest validated ledger.
    async fn validated_ledger_index(&self) -> Result<u32, LedgerError>;
}

/// How long to wait for submitted transactions to be validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    /// Delay between `tx` lookups
    pub poll_interval: Duration,
    /// Wall-clock limit for a single transaction
    pub timeout: Duration,
    /// `LastLedgerSequence` = current ledger + offset
    pub ledger_offset: u32,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(60),
            ledger_offset: 20,
        }
    }
}

/// JSON-RPC client for a rippled server.
pub struct XrplClient {
    network: NetworkConfig,
    http: reqwest::Client,
    confirmation: ConfirmationPolicy,
    max_fee_drops: u64,
}

impl XrplClient {
    /// Create a client for the given network.
    pub fn new(network: NetworkConfig, confirmation: ConfirmationPolicy) -> Result<Self, LedgerError> {
        for endpoint in [&network.rpc_url, &network.faucet_url] {
            url::Url::parse(endpoint)
                .map_err(|e| LedgerError::InvalidRpcUrl(format!("{endpoint}: {e}")))?;
        }

        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| LedgerError::Transport(e.to_string()))?;

        Ok(Self {
            network,
            http,
            confirmation,
            max_fee_drops: DEFAULT_MAX_FEE_DROPS,
        })
    }

    /// Create a client for the public testnet.
    pub fn testnet() -> Result<Self, LedgerError> {
        Self::new(NetworkConfig::testnet(), ConfirmationPolicy::default())
    }

    /// Get the network configuration.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Issue one JSON-RPC call and return its `result` object.
    async fn request(&self, method: &str, params: Value) -> Result<Value, LedgerError> {
        let body = json!({ "method": method, "params": [params] });

        let response = self
            .http
            .post(&self.network.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LedgerError::Transport(format!("{method}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LedgerError::Transport(format!("{method}: HTTP {status}")));
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| LedgerError::MalformedResponse(format!("{method}: {e}")))?;

        let result = envelope
            .get("result")
            .cloned()
            .ok_or_else(|| LedgerError::MalformedResponse(format!("{method}: missing result")))?;

        check_rpc_status(method, result)
    }

    /// Fill in `Sequence`, `Fee` and `LastLedgerSequence`.
    async fn autofill(&self, tx: &mut Transaction) -> Result<(), LedgerError> {
        let result = self
            .request(
                "account_info",
                json!({ "account": tx.account, "ledger_index": "current" }),
            )
            .await?;
        let info: AccountInfoResult = parse_result("account_info", result)?;

        let fee_result = self.request("fee", json!({})).await?;
        let fee: FeeResult = parse_result("fee", fee_result)?;

        let current = info.ledger_current_index.ok_or_else(|| {
            LedgerError::MalformedResponse("account_info: missing ledger_current_index".to_string())
        })?;

        tx.sequence.get_or_insert(info.account_data.sequence);
        tx.fee_drops
            .get_or_insert(select_fee(&fee.drops, self.max_fee_drops));
        tx.last_ledger_sequence
            .get_or_insert(current + self.confirmation.ledger_offset);
        Ok(())
    }

    /// Look the transaction up; `Some` only once it is in a validated ledger.
    async fn lookup_validated(&self, hash: &str) -> Result<Option<(String, Option<u32>)>, LedgerError> {
        match self.request("tx", json!({ "transaction": hash })).await {
            Ok(result) => {
                let tx: TxResult = parse_result("tx", result)?;
                if !tx.validated {
                    return Ok(None);
                }
                let code = tx
                    .meta
                    .and_then(|m| m.transaction_result)
                    .ok_or_else(|| LedgerError::MalformedResponse(format!("tx {hash}: missing meta")))?;
                Ok(Some((code, tx.ledger_index)))
            }
            Err(LedgerError::Rpc { code, .. }) if code == "txnNotFound" => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn wait_for_validation(
        &self,
        hash: &str,
        last_ledger_sequence: u32,
        transaction_type: &str,
    ) -> Result<SubmitOutcome, LedgerError> {
        let deadline = Instant::now() + self.confirmation.timeout;
        let outcome = |result_code: String, ledger_index: Option<u32>| SubmitOutcome {
            transaction_type: transaction_type.to_string(),
            hash: hash.to_string(),
            result_code,
            ledger_index,
        };

        loop {
            tokio::time::sleep(self.confirmation.poll_interval).await;

            if let Some((code, ledger_index)) = self.lookup_validated(hash).await? {
                return Ok(outcome(code, ledger_index));
            }

            if self.validated_ledger_index().await? > last_ledger_sequence {
                // The validated ledger may have moved past us right after
                // the lookup above; check once more before giving up.
                if let Some((code, ledger_index)) = self.lookup_validated(hash).await? {
                    return Ok(outcome(code, ledger_index));
                }
                tracing::warn!(hash = %hash, last_ledger_sequence, "Transaction expired unvalidated");
                return Ok(outcome(TEF_MAX_LEDGER.to_string(), None));
            }

            if Instant::now() >= deadline {
                return Err(LedgerError::ConfirmationTimeout(hash.to_string()));
            }
        }
    }
}

#[async_trait]
impl LedgerClient for XrplClient {
    async fn account_info(&self, address: &str) -> Result<Option<AccountInfo>, LedgerError> {
        let params = json!({ "account": address, "ledger_index": "validated" });
        match self.request("account_info", params).await {
            Ok(result) => {
                let info: AccountInfoResult = parse_result("account_info", result)?;
                Ok(Some(AccountInfo {
                    account: info.account_data.account,
                    balance: info.account_data.balance,
                    sequence: info.account_data.sequence,
                }))
            }
            Err(LedgerError::Rpc { code, .. }) if code == "actNotFound" => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn account_lines(
        &self,
        address: &str,
        peer: Option<&str>,
    ) -> Result<Vec<TrustLine>, LedgerError> {
        let mut lines = Vec::new();
        let mut marker: Option<Value> = None;

        loop {
            let mut params = json!({ "account": address, "ledger_index": "validated" });
            if let Some(peer) = peer {
                params["peer"] = json!(peer);
            }
            if let Some(m) = marker.take() {
                params["marker"] = m;
            }

            let result = self.request("account_lines", params).await?;
            let page: AccountLinesResult = parse_result("account_lines", result)?;
            lines.extend(page.lines);

            match page.marker {
                Some(m) if !m.is_null() => marker = Some(m),
                _ => break,
            }
        }

        Ok(lines)
    }

    async fn submit_and_wait(
        &self,
        wallet: &Wallet,
        mut tx: Transaction,
    ) -> Result<SubmitOutcome, LedgerError> {
        self.autofill(&mut tx).await?;
        let transaction_type = tx.transaction_type();
        let last_ledger_sequence = tx
            .last_ledger_sequence
            .ok_or(LedgerError::Codec(CodecError::MissingField("LastLedgerSequence")))?;

        let signed = codec::sign(wallet, &tx)?;
        let result = self
            .request("submit", json!({ "tx_blob": signed.tx_blob }))
            .await?;
        let engine_result = result
            .get("engine_result")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();

        tracing::debug!(
            account = %tx.account,
            transaction_type,
            hash = %signed.hash,
            engine_result = %engine_result,
            "Transaction submitted"
        );

        if is_terminal_rejection(&engine_result) {
            return Ok(SubmitOutcome {
                transaction_type: transaction_type.to_string(),
                hash: signed.hash,
                result_code: engine_result,
                ledger_index: None,
            });
        }

        self.wait_for_validation(&signed.hash, last_ledger_sequence, transaction_type)
            .await
    }

    async fn fund_wallet(&self, address: &str) -> Result<(), LedgerError> {
        let response = self
            .http
            .post(&self.network.faucet_url)
            .json(&json!({ "destination": address }))
            .send()
            .await
            .map_err(|e| LedgerError::Faucet(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LedgerError::Faucet(format!("HTTP {status}: {body}")));
        }

        tracing::info!(address = %address, "Faucet funding requested");
        Ok(())
    }

    async fn book_offers(
        &self,
        taker_gets: &Asset,
        taker_pays: &Asset,
        limit: u32,
    ) -> Result<Value, LedgerError> {
        self.request(
            "book_offers",
            json!({
                "taker_gets": taker_gets.to_json(),
                "taker_pays": taker_pays.to_json(),
                "limit": limit,
                "ledger_index": "validated",
            }),
        )
        .await
    }

    async fn validated_ledger_index(&self) -> Result<u32, LedgerError> {
        let result = self
            .request("ledger", json!({ "ledger_index": "validated" }))
            .await?;

        result
            .get("ledger_index")
            .and_then(value_as_u32)
            .or_else(|| {
                result
                    .get("ledger")
                    .and_then(|l| l.get("ledger_index"))
                    .and_then(value_as_u32)
            })
            .ok_or_else(|| LedgerError::MalformedResponse("ledger: missing ledger_index".to_string()))
    }
}

// =============================================================================
// Response Parsing
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AccountData {
    account: String,
    #[serde(default)]
    balance: Option<String>,
    sequence: u32,
}

#[derive(Debug, Deserialize)]
struct AccountInfoResult {
    account_data: AccountData,
    #[serde(default)]
    ledger_current_index: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct AccountLinesResult {
    #[serde(default)]
    lines: Vec<TrustLine>,
    #[serde(default)]
    marker: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct FeeDrops {
    #[serde(default)]
    base_fee: Option<String>,
    #[serde(default)]
    open_ledger_fee: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FeeResult {
    #[serde(default)]
    drops: FeeDrops,
}

#[derive(Debug, Deserialize)]
struct TxMeta {
    #[serde(rename = "TransactionResult")]
    transaction_result: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TxResult {
    #[serde(default)]
    validated: bool,
    #[serde(default)]
    ledger_index: Option<u32>,
    #[serde(default)]
    meta: Option<TxMeta>,
}

fn check_rpc_status(method: &str, result: Value) -> Result<Value, LedgerError> {
    if result.get("status").and_then(Value::as_str) == Some("error") {
        let code = result
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        let message = result
            .get("error_message")
            .and_then(Value::as_str)
            .unwrap_or(&code)
            .to_string();
        return Err(LedgerError::Rpc {
            method: method.to_string(),
            code,
            message,
        });
    }
    Ok(result)
}

fn parse_result<T: serde::de::DeserializeOwned>(method: &str, result: Value) -> Result<T, LedgerError> {
    serde_json::from_value(result).map_err(|e| LedgerError::MalformedResponse(format!("{method}: {e}")))
}

fn value_as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Pick the open-ledger fee, never below the base fee, capped at `max`.
fn select_fee(drops: &FeeDrops, max: u64) -> u64 {
    let parse = |v: &Option<String>| v.as_deref().and_then(|s| s.parse::<u64>().ok());
    let base = parse(&drops.base_fee).unwrap_or(DEFAULT_BASE_FEE_DROPS);
    let open = parse(&drops.open_ledger_fee).unwrap_or(base);
    open.max(base).min(max)
}

/// Malformed (`tem`), failed (`tef`) and local (`tel`) results are final
/// at submission time; everything else may still make it into a ledger.
fn is_terminal_rejection(engine_result: &str) -> bool {
    ["tem", "tef", "tel"]
        .iter()
        .any(|prefix| engine_result.starts_with(prefix))
}

/// Errors that can occur while talking to the ledger.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Invalid endpoint URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("RPC error in {method}: {code} ({message})")]
    Rpc {
        method: String,
        code: String,
        message: String,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Faucet error: {0}")]
    Faucet(String),

    #[error("Transaction {0} was not validated in time")]
    ConfirmationTimeout(String),

    #[error("Signing failed: {0}")]
    Signing(#[from] KeyError),

    #[error("Serialization failed: {0}")]
    Codec(#[from] CodecError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_error_status_becomes_error() {
        let result = json!({
            "status": "error",
            "error": "actNotFound",
            "error_message": "Account not found."
        });
        match check_rpc_status("account_info", result) {
            Err(LedgerError::Rpc { method, code, message }) => {
                assert_eq!(method, "account_info");
                assert_eq!(code, "actNotFound");
                assert_eq!(message, "Account not found.");
            }
            other => panic!("unexpected {other:?}"),
        }

        let ok = json!({ "status": "success", "ledger_index": 5 });
        assert_eq!(check_rpc_status("ledger", ok.clone()).unwrap(), ok);
    }

    #[test]
    fn account_info_result_parses_balance_and_sequence() {
        let result = json!({
            "account_data": {
                "Account": "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh",
                "Balance": "100000000",
                "Flags": 0,
                "Sequence": 42
            },
            "ledger_current_index": 1000,
            "status": "success"
        });
        let info: AccountInfoResult = parse_result("account_info", result).unwrap();
        assert_eq!(info.account_data.balance.as_deref(), Some("100000000"));
        assert_eq!(info.account_data.sequence, 42);
        assert_eq!(info.ledger_current_index, Some(1000));
    }

    #[test]
    fn account_lines_result_ignores_extra_fields() {
        let result = json!({
            "account": "rIssuer",
            "lines": [{
                "account": "rHolder",
                "balance": "-1000",
                "currency": "BRL",
                "limit": "0",
                "limit_peer": "1000000",
                "quality_in": 0,
                "quality_out": 0,
                "peer_authorized": true
            }],
            "marker": null
        });
        let page: AccountLinesResult = parse_result("account_lines", result).unwrap();
        assert_eq!(page.lines.len(), 1);
        assert_eq!(page.lines[0].account, "rHolder");
        assert_eq!(page.lines[0].balance, "-1000");
        assert!(page.marker.map(|m| m.is_null()).unwrap_or(true));
    }

    #[test]
    fn tx_result_reads_validated_meta() {
        let result = json!({
            "hash": "ABC",
            "validated": true,
            "ledger_index": 77,
            "meta": { "TransactionResult": "tesSUCCESS" }
        });
        let tx: TxResult = parse_result("tx", result).unwrap();
        assert!(tx.validated);
        assert_eq!(tx.ledger_index, Some(77));
        assert_eq!(tx.meta.unwrap().transaction_result.as_deref(), Some("tesSUCCESS"));
    }

    #[test]
    fn fee_selection_prefers_open_ledger_within_cap() {
        let drops = FeeDrops {
            base_fee: Some("10".into()),
            open_ledger_fee: Some("12".into()),
        };
        assert_eq!(select_fee(&drops, 2_000_000), 12);

        let spiking = FeeDrops {
            base_fee: Some("10".into()),
            open_ledger_fee: Some("5000000".into()),
        };
        assert_eq!(select_fee(&spiking, 2_000_000), 2_000_000);

        assert_eq!(select_fee(&FeeDrops::default(), 2_000_000), DEFAULT_BASE_FEE_DROPS);
    }

    #[test]
    fn terminal_rejections() {
        assert!(is_terminal_rejection("temBAD_AMOUNT"));
        assert!(is_terminal_rejection("tefPAST_SEQ"));
        assert!(is_terminal_rejection("telINSUF_FEE_P"));
        assert!(!is_terminal_rejection("tesSUCCESS"));
        assert!(!is_terminal_rejection("terQUEUED"));
        assert!(!is_terminal_rejection("tecNO_LINE"));
    }

    #[test]
    fn ledger_index_accepts_number_or_string() {
        assert_eq!(value_as_u32(&json!(12)), Some(12));
        assert_eq!(value_as_u32(&json!("13")), Some(13));
        assert_eq!(value_as_u32(&json!(null)), None);
    }

    #[test]
    fn new_rejects_invalid_endpoint() {
        let mut network = NetworkConfig::testnet();
        network.rpc_url = "not a url".to_string();
        assert!(matches!(
            XrplClient::new(network, ConfirmationPolicy::default()),
            Err(LedgerError::InvalidRpcUrl(_))
        ));
        assert!(XrplClient::testnet().is_ok());
    }

    // -------------------------------------------------------------------------
    // JSON-RPC round trips against an in-process rippled stand-in
    // -------------------------------------------------------------------------

    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, routing::post, Json, Router};

    const GENESIS_SEED: &str = "snoPBrXtMeMyMHUVTgbuqAfg1SUTb";
    const ISSUER: &str = "rvYAfWj5gh67oV6fW32ZzP3Aw4Eubs59B";

    /// Scripted rippled responses plus a log of every call received.
    struct Rippled {
        calls: Vec<(String, Value)>,
        engine_result: String,
        tx_script: VecDeque<Value>,
        validated_ledger: u32,
        line_pages: HashMap<String, Value>,
        funded: Vec<String>,
    }

    impl Rippled {
        fn new() -> Self {
            Self {
                calls: Vec::new(),
                engine_result: "tesSUCCESS".to_string(),
                tx_script: VecDeque::new(),
                validated_ledger: 100,
                line_pages: HashMap::new(),
                funded: Vec::new(),
            }
        }

        fn count(&self, method: &str) -> usize {
            self.calls.iter().filter(|(m, _)| m == method).count()
        }

        fn params_of(&self, method: &str) -> Vec<Value> {
            self.calls
                .iter()
                .filter(|(m, _)| m == method)
                .map(|(_, p)| p.clone())
                .collect()
        }
    }

    fn txn_not_found() -> Value {
        json!({ "status": "error", "error": "txnNotFound", "error_message": "Transaction not found." })
    }

    async fn rpc(State(node): State<Arc<Mutex<Rippled>>>, Json(body): Json<Value>) -> Json<Value> {
        let method = body["method"].as_str().unwrap_or_default().to_string();
        let params = body["params"][0].clone();
        let mut node = node.lock().unwrap();
        node.calls.push((method.clone(), params.clone()));

        let result = match method.as_str() {
            "account_info" if params["ledger_index"] == "current" => json!({
                "account_data": { "Account": params["account"], "Balance": "100000000", "Sequence": 5 },
                "ledger_current_index": 100,
                "status": "success"
            }),
            "account_info" => json!({
                "status": "error", "error": "actNotFound", "error_message": "Account not found."
            }),
            "fee" => json!({ "drops": { "base_fee": "10", "open_ledger_fee": "12" }, "status": "success" }),
            "submit" => json!({ "engine_result": node.engine_result, "status": "success" }),
            "tx" => match node.tx_script.pop_front() {
                Some(scripted) => scripted,
                None => txn_not_found(),
            },
            "ledger" => json!({ "ledger_index": node.validated_ledger, "status": "success" }),
            "account_lines" => {
                let marker = params["marker"].as_str().unwrap_or_default().to_string();
                node.line_pages
                    .get(&marker)
                    .cloned()
                    .unwrap_or_else(|| json!({ "lines": [], "status": "success" }))
            }
            _ => json!({ "status": "error", "error": "unknownCmd" }),
        };
        Json(json!({ "result": result }))
    }

    async fn faucet(State(node): State<Arc<Mutex<Rippled>>>, Json(body): Json<Value>) -> Json<Value> {
        let destination = body["destination"].as_str().unwrap_or_default().to_string();
        node.lock().unwrap().funded.push(destination.clone());
        Json(json!({ "account": { "classicAddress": destination } }))
    }

    async fn client_for(node: Rippled) -> (XrplClient, Arc<Mutex<Rippled>>) {
        let node = Arc::new(Mutex::new(node));
        let app = Router::new()
            .route("/", post(rpc))
            .route("/faucet", post(faucet))
            .with_state(node.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let network = NetworkConfig {
            name: "stub".to_string(),
            rpc_url: format!("http://{addr}/"),
            faucet_url: format!("http://{addr}/faucet"),
            explorer_url: "https://testnet.xrpl.org".to_string(),
        };
        let confirmation = ConfirmationPolicy {
            poll_interval: Duration::from_millis(1),
            timeout: Duration::from_millis(100),
            ledger_offset: 20,
        };
        (XrplClient::new(network, confirmation).unwrap(), node)
    }

    fn trust_set(wallet: &Wallet) -> Transaction {
        Transaction::trust_set(wallet.address(), "USD", ISSUER, "100", 0)
    }

    #[tokio::test]
    async fn account_lines_follows_marker_across_pages() {
        let mut node = Rippled::new();
        node.line_pages.insert(
            String::new(),
            json!({
                "lines": [{ "account": "rHolderOne", "currency": "BRL", "balance": "-10", "limit": "0" }],
                "marker": "page-2",
                "status": "success"
            }),
        );
        node.line_pages.insert(
            "page-2".to_string(),
            json!({
                "lines": [{ "account": "rHolderTwo", "currency": "TKA", "balance": "-20", "limit": "0" }],
                "status": "success"
            }),
        );
        let (client, node) = client_for(node).await;

        let lines = client.account_lines(ISSUER, Some("rHolderTwo")).await.unwrap();
        let holders: Vec<&str> = lines.iter().map(|l| l.account.as_str()).collect();
        assert_eq!(holders, vec!["rHolderOne", "rHolderTwo"]);

        let requests = node.lock().unwrap().params_of("account_lines");
        assert_eq!(requests.len(), 2);
        assert!(requests[0].get("marker").is_none());
        assert_eq!(requests[1]["marker"], "page-2");
        for request in &requests {
            assert_eq!(request["peer"], "rHolderTwo");
            assert_eq!(request["ledger_index"], "validated");
        }
    }

    #[tokio::test]
    async fn submit_waits_through_txn_not_found_until_validated() {
        let mut node = Rippled::new();
        node.tx_script = VecDeque::from(vec![
            txn_not_found(),
            json!({ "validated": false, "status": "success" }),
            json!({
                "validated": true,
                "ledger_index": 101,
                "meta": { "TransactionResult": "tesSUCCESS" },
                "status": "success"
            }),
        ]);
        let (client, node) = client_for(node).await;
        let wallet = Wallet::from_seed(GENESIS_SEED).unwrap();

        let outcome = client.submit_and_wait(&wallet, trust_set(&wallet)).await.unwrap();
        assert_eq!(outcome.transaction_type, "TrustSet");
        assert_eq!(outcome.result_code, TES_SUCCESS);
        assert_eq!(outcome.ledger_index, Some(101));

        let node = node.lock().unwrap();
        let lookups = node.params_of("tx");
        assert_eq!(lookups.len(), 3);
        assert!(lookups.iter().all(|p| p["transaction"] == outcome.hash.as_str()));

        // The submitted blob is the one whose hash was polled.
        let blob = node.params_of("submit")[0]["tx_blob"].as_str().unwrap().to_string();
        assert_eq!(codec::transaction_hash(&hex::decode(blob).unwrap()), outcome.hash);
        assert_eq!(node.params_of("account_info")[0]["ledger_index"], "current");
    }

    #[tokio::test]
    async fn expired_transaction_reports_max_ledger() {
        let mut node = Rippled::new();
        // Autofill sets LastLedgerSequence to 100 + 20.
        node.validated_ledger = 121;
        let (client, node) = client_for(node).await;
        let wallet = Wallet::from_seed(GENESIS_SEED).unwrap();

        let outcome = client.submit_and_wait(&wallet, trust_set(&wallet)).await.unwrap();
        assert_eq!(outcome.result_code, TEF_MAX_LEDGER);
        assert_eq!(outcome.ledger_index, None);
        assert_eq!(node.lock().unwrap().count("tx"), 2);
    }

    #[tokio::test]
    async fn malformed_submission_returns_without_polling() {
        let mut node = Rippled::new();
        node.engine_result = "temMALFORMED".to_string();
        let (client, node) = client_for(node).await;
        let wallet = Wallet::from_seed(GENESIS_SEED).unwrap();

        let outcome = client.submit_and_wait(&wallet, trust_set(&wallet)).await.unwrap();
        assert_eq!(outcome.result_code, "temMALFORMED");
        assert!(!outcome.is_success());

        let node = node.lock().unwrap();
        assert_eq!(node.count("submit"), 1);
        assert_eq!(node.count("tx"), 0);
        assert_eq!(node.count("ledger"), 0);
    }

    #[tokio::test]
    async fn unvalidated_transaction_times_out() {
        let (client, node) = client_for(Rippled::new()).await;
        let wallet = Wallet::from_seed(GENESIS_SEED).unwrap();

        let err = client
            .submit_and_wait(&wallet, trust_set(&wallet))
            .await
            .unwrap_err();
        let LedgerError::ConfirmationTimeout(hash) = err else {
            panic!("expected a confirmation timeout, got {err:?}");
        };
        assert!(node.lock().unwrap().params_of("tx").iter().all(|p| p["transaction"] == hash.as_str()));
    }

    #[tokio::test]
    async fn unknown_account_and_faucet_funding() {
        let (client, node) = client_for(Rippled::new()).await;

        assert!(client.account_info("rUnfunded").await.unwrap().is_none());
        client.fund_wallet("rUnfunded").await.unwrap();
        assert_eq!(node.lock().unwrap().funded, vec!["rUnfunded"]);
        assert_eq!(client.validated_ledger_index().await.unwrap(), 100);
    }
}
