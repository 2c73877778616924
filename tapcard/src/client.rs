// tapcard/src/client.rs

use crate::error::ProtocolError;
use crate::transport::ApduTransport;
use crate::utils::encode_hex;

/// Drives a card-level command over an [`ApduTransport`].
///
/// Implementations issue their exchanges one at a time and decide for
/// themselves what a non-success status word means.
pub trait CardProtocolClient: Send + Sync {
    /// Read the card status over `transport`.
    fn status(&self, transport: &mut dyn ApduTransport) -> Result<StatusResult, ProtocolError>;
}

impl<F> CardProtocolClient for F
where
    F: Fn(&mut dyn ApduTransport) -> Result<StatusResult, ProtocolError> + Send + Sync,
{
    fn status(&self, transport: &mut dyn ApduTransport) -> Result<StatusResult, ProtocolError> {
        self(transport)
    }
}

/// Card family reported by a status query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    /// Bearer card with spendable slots.
    SatsCard,
    /// Signing card holding one key.
    TapSigner,
    /// TAPSIGNER variant in chip form.
    SatsChip,
}

/// Card status as returned by a status query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusResult {
    /// Protocol version.
    pub proto: u64,
    /// Firmware version.
    pub ver: String,
    /// Block height at card birth.
    pub birth: u64,
    /// `(active, total)` slot numbers; SATSCARD only.
    pub slots: Option<(u64, u64)>,
    /// Abbreviated deposit address of the active slot.
    pub addr: Option<String>,
    /// Set on TAPSIGNER cards.
    pub tapsigner: bool,
    /// Set on SATSCHIP cards.
    pub satschip: bool,
    /// Derivation path; TAPSIGNER only.
    pub path: Option<Vec<u64>>,
    /// Number of backups taken; TAPSIGNER only.
    pub num_backups: Option<u64>,
    /// Card public key (33 bytes, compressed).
    pub pubkey: Vec<u8>,
    /// Nonce to use in the next authenticated command.
    pub card_nonce: Vec<u8>,
    /// Set when the card is on testnet.
    pub testnet: bool,
    /// Seconds the card still enforces after failed PIN attempts.
    pub auth_delay: Option<u64>,
}

impl StatusResult {
    /// Card family, from the `satschip` / `tapsigner` flags.
    pub fn kind(&self) -> CardKind {
        if self.satschip {
            CardKind::SatsChip
        } else if self.tapsigner {
            CardKind::TapSigner
        } else {
            CardKind::SatsCard
        }
    }

    /// Card public key as lowercase hex.
    pub fn pubkey_hex(&self) -> String {
        encode_hex(&self.pubkey)
    }

    /// Card nonce as lowercase hex.
    pub fn card_nonce_hex(&self) -> String {
        encode_hex(&self.card_nonce)
    }

    /// Active slot number; SATSCARD only.
    pub fn active_slot(&self) -> Option<u64> {
        self.slots.map(|(active, _)| active)
    }
}
