// tapcard/src/wallet.rs

//! Interface to the wallet engine that consumes scanned card data.
//!
//! Only the calls and their value types live here; no engine is provided.

use derive_more::Display;
use thiserror::Error;

/// Satoshi amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Display)]
#[display(fmt = "{} sat", _0)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sats(
    /// Amount in satoshis.
    pub u64,
);

/// What a wallet is created from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WalletSource {
    /// Output descriptor such as `wpkh(...)`.
    Descriptor(String),
    /// Extended public key.
    Xpub(String),
    /// Mnemonic words.
    Mnemonic(Vec<String>),
}

const DESCRIPTOR_PREFIXES: [&str; 4] = ["tr(", "wpkh(", "wsh(", "sh("];
const XPUB_PREFIXES: [&str; 3] = ["xpub", "tpub", "vpub"];

impl WalletSource {
    /// Classify user-entered text by its prefix. Anything that is neither a
    /// descriptor nor an extended public key is read as mnemonic words.
    pub fn classify(text: &str) -> Self {
        let text = text.trim();
        if DESCRIPTOR_PREFIXES.iter().any(|p| text.starts_with(p)) {
            WalletSource::Descriptor(text.to_string())
        } else if XPUB_PREFIXES.iter().any(|p| text.starts_with(p)) {
            WalletSource::Xpub(text.to_string())
        } else {
            WalletSource::Mnemonic(text.split_whitespace().map(str::to_string).collect())
        }
    }
}

/// Opaque reference to a wallet created by an engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WalletHandle(
    /// Engine-assigned identifier.
    pub String,
);

/// Wallet balance split by confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Balance {
    /// Funds in confirmed outputs.
    pub confirmed: Sats,
    /// Funds in unconfirmed outputs.
    pub pending: Sats,
}

impl Balance {
    /// Confirmed plus pending, saturating at `u64::MAX`.
    pub fn total(&self) -> Sats {
        Sats(self.confirmed.0.saturating_add(self.pending.0))
    }
}

/// One wallet transaction as listed by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransactionSummary {
    /// Transaction id, hex.
    pub txid: String,
    /// Amount leaving the wallet.
    pub sent: Sats,
    /// Amount arriving in the wallet.
    pub received: Sats,
    /// Fee paid, when the engine knows it.
    pub fee: Option<Sats>,
    /// Block height, `None` while unconfirmed.
    pub confirmation_height: Option<u32>,
}

impl TransactionSummary {
    /// Whether the transaction is in a block.
    pub fn is_confirmed(&self) -> bool {
        self.confirmation_height.is_some()
    }
}

/// Transaction built by the engine but not yet signed (PSBT bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTx {
    /// Serialized PSBT.
    pub psbt: Vec<u8>,
}

/// Failure reported by a wallet engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// No wallet has been created yet.
    #[error("no wallet loaded")]
    NoWallet,
    /// Source text the engine cannot parse.
    #[error("invalid wallet source: {0}")]
    InvalidSource(String),
    /// Destination address the engine cannot parse.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    /// Amount plus fee exceeds the spendable balance.
    #[error("insufficient funds: needed {needed}, available {available}")]
    InsufficientFunds {
        /// Amount plus fee.
        needed: Sats,
        /// Spendable balance.
        available: Sats,
    },
    /// Any other engine failure.
    #[error("wallet engine error: {0}")]
    Engine(String),
}

/// Calls made into a wallet engine.
pub trait WalletEngine {
    /// Create a wallet from `source` and make it current.
    fn create_wallet(&mut self, source: &WalletSource) -> Result<WalletHandle, WalletError>;

    /// Balance of the current wallet.
    fn balance(&self) -> Result<Balance, WalletError>;

    /// Transactions of the current wallet.
    fn transactions(&self) -> Result<Vec<TransactionSummary>, WalletError>;

    /// Build an unsigned payment of `amount` to `address`.
    fn build_transaction(
        &self,
        address: &str,
        amount: Sats,
        fee_rate_sat_per_vb: f32,
    ) -> Result<UnsignedTx, WalletError>;

    /// Fee `tx` would pay.
    fn calculate_fee(&self, tx: &UnsignedTx) -> Result<Sats, WalletError>;

    /// Build, sign and broadcast a payment.
    fn send(
        &mut self,
        address: &str,
        amount: Sats,
        fee_rate_sat_per_vb: f32,
    ) -> Result<(), WalletError>;
}
