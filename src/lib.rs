//! Consensus rules for the mini-blockchain network
//!
//! This crate is the deterministic rule engine every validating node
//! must agree on, bit for bit:
//! - Compact 32-bit encoding of 256-bit proof-of-work targets
//! - Height-tiered block issuance with stepwise integer decay
//! - Difficulty retargeting over a bounded ancestor window, with a
//!   height-based fork between two algorithm variants and a
//!   minimum-difficulty rule for test networks
//! - Read-only ancestor traversal behind the [`HeaderView`] trait
//! - Per-network consensus parameters
//!
//! Everything here is a pure function of its inputs: no I/O, no shared
//! state, no floating point. Validation, mining, storage, and
//! networking live in other crates and call into this one.
//!
//! # Example
//!
//! ```rust
//! use mini_consensus::{block_subsidy, next_work_required, ConsensusParams, HeaderArena, HeaderView, COIN};
//!
//! let params = ConsensusParams::main();
//!
//! // Issuance is a pure function of height
//! assert_eq!(block_subsidy(2, &params), 512 * COIN);
//!
//! // With too little history the retarget falls back to the pow limit
//! let mut arena = HeaderArena::new();
//! arena.push(1_395_342_829, 0x1e0fffff);
//! let tip = arena.tip().unwrap();
//! let bits = next_work_required(&tip, tip.timestamp() + 60, &params);
//! assert_eq!(bits, 0x1e0fffff);
//! ```

pub mod chain;
pub mod compact;
pub mod difficulty;
pub mod params;
pub mod subsidy;

// Re-export commonly used items
pub use chain::{Ancestors, ArenaHeader, HeaderArena, HeaderView};
pub use compact::{decode_compact, encode_compact};
pub use difficulty::next_work_required;
pub use params::{ConsensusParams, Network, ParamsError, SubsidyTier, COIN};
pub use subsidy::block_subsidy;
