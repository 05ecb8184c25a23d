//! Core data types shared across the sync driver, the fork-choice view, and
//! the exchange/engine adapters.

use std::cmp::Ordering;
use std::fmt;

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

/// A block hash. Ethereum headers and bodies are both keyed by this digest.
pub type BlockHash = B256;

/// Identifies a block by height and hash. Total order is by `number`; the
/// hash only disambiguates siblings at the same height.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId {
    /// Height of the block.
    pub number: u64,
    /// Hash of the block.
    pub hash: BlockHash,
}

impl BlockId {
    /// Creates a new [BlockId].
    pub fn new(number: u64, hash: BlockHash) -> Self {
        Self { number, hash }
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.number, self.hash)
    }
}

impl PartialOrd for BlockId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BlockId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number.cmp(&other.number).then_with(|| self.hash.cmp(&other.hash))
    }
}

/// A raw, opaque transaction. The core never decodes transaction content; it
/// only moves bytes between the exchange and the execution engine.
#[derive(Clone, PartialEq, Eq)]
pub struct RawTransaction(pub Vec<u8>);

impl fmt::Debug for RawTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

impl Serialize for RawTransaction {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(&self.0)))
    }
}

impl<'de> Deserialize<'de> for RawTransaction {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tx: String = Deserialize::deserialize(deserializer)?;
        let tx = tx.strip_prefix("0x").unwrap_or(&tx);
        Ok(RawTransaction(
            hex::decode(tx).map_err(serde::de::Error::custom)?,
        ))
    }
}

/// A block body. Opaque to the core beyond the raw transaction list it
/// carries through to `insert_blocks`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockBody {
    /// Encoded transactions, in block order.
    pub transactions: Vec<RawTransaction>,
}

/// A block header as the core understands it: parent linkage, self
/// identity, and the declared (non-cumulative) difficulty contributed by
/// this block. Anything else about a header (state root, timestamp, gas
/// fields, and so on) is opaque `extra` the core never interprets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Hash of the parent header.
    pub parent_hash: BlockHash,
    /// Height of this header.
    pub number: u64,
    /// Hash of this header.
    pub hash: BlockHash,
    /// Declared (per-block, not cumulative) difficulty.
    pub difficulty: u128,
    /// Opaque remainder the core does not interpret (state root, timestamp,
    /// gas fields, and so on), carried through unchanged.
    #[serde(default)]
    pub extra: Vec<u8>,
}

impl BlockHeader {
    /// The [BlockId] identifying this header.
    pub fn id(&self) -> BlockId {
        BlockId::new(self.number, self.hash)
    }
}

/// A downloaded block: a header plus its body, with the two mutable fields
/// the core attaches as it flows through the driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// The block's header.
    pub header: BlockHeader,
    /// The block's body.
    pub body: BlockBody,
    /// Cumulative total difficulty, computed by [`crate::fork_choice::ForkChoiceView::add`]
    /// when this block's header is added to the view. `0` until then.
    pub total_difficulty: u128,
    /// Set by the exchange when this block should be gossiped to peers via
    /// an `OutboundNewBlock` announcement.
    pub to_announce: bool,
}

impl Block {
    /// Creates a new block with `total_difficulty` unset and `to_announce`
    /// `false`.
    pub fn new(header: BlockHeader, body: BlockBody) -> Self {
        Self { header, body, total_difficulty: 0, to_announce: false }
    }

    /// The [BlockId] identifying this block.
    pub fn id(&self) -> BlockId {
        self.header.id()
    }
}

/// A snapshot of the currently preferred chain head: its identity and the
/// cumulative total difficulty backing it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainHead {
    /// The head's identity.
    pub id: BlockId,
    /// The head's cumulative total difficulty.
    pub total_difficulty: u128,
}

impl ChainHead {
    /// Creates a new [ChainHead].
    pub fn new(id: BlockId, total_difficulty: u128) -> Self {
        Self { id, total_difficulty }
    }

    /// Height of the head.
    pub fn number(&self) -> u64 {
        self.id.number
    }

    /// Hash of the head.
    pub fn hash(&self) -> BlockHash {
        self.id.hash
    }
}
