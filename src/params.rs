//! Network consensus parameters
//!
//! Everything the rule engine needs to know about a deployment: the
//! easiest allowed proof-of-work target, the block schedule, the
//! minimum-difficulty relaxation flag, the retarget fork height, and the
//! issuance schedule. Parameters are built once per network and never
//! mutated; peers, seeds, address prefixes and checkpoints live outside
//! this crate.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of base currency units in one coin
pub const COIN: u64 = 100_000_000;

/// Parameter resolution errors
#[derive(Error, Debug)]
pub enum ParamsError {
    #[error("Unknown network: {0}")]
    UnknownNetwork(String),
}

/// Supported networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Network {
    /// Production network
    Main,
    /// Public test network
    Test,
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Main => write!(f, "main"),
            Network::Test => write!(f, "test"),
        }
    }
}

impl FromStr for Network {
    type Err = ParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main" => Ok(Network::Main),
            "test" => Ok(Network::Test),
            other => Err(ParamsError::UnknownNetwork(other.to_string())),
        }
    }
}

/// One entry of the issuance schedule
///
/// A tier governs every height from `start_height` up to the next tier's
/// start. Within a tier the subsidy starts at `base_subsidy` and is
/// multiplied by `decay_numerator / decay_denominator` once per elapsed
/// `decay_interval`, flooring at each step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsidyTier {
    /// First height governed by this tier
    pub start_height: u64,
    /// Issuance at the start of the tier, in base units
    pub base_subsidy: u64,
    /// Number of blocks between decay steps
    pub decay_interval: u64,
    /// Numerator of the per-step decay ratio
    pub decay_numerator: u64,
    /// Denominator of the per-step decay ratio
    pub decay_denominator: u64,
    /// Lower bound applied after decay, if the tier has one
    pub floor: Option<u64>,
}

/// Consensus parameters for one network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusParams {
    /// Easiest (numerically largest) target any block may claim
    pub pow_limit: BigUint,
    /// Scheduled seconds between blocks
    pub pow_target_spacing: i64,
    /// Allow a minimum-difficulty block after a long gap (test networks)
    pub allow_min_difficulty_blocks: bool,
    /// First block height retargeted with the fixed 24-block window
    pub retarget_fork_height: u64,
    /// Reward paid by the chain origin block
    pub genesis_subsidy: u64,
    /// One-time reward paid at height 1
    pub premine_subsidy: u64,
    /// Issuance schedule, ordered by ascending start height
    pub subsidy_tiers: Vec<SubsidyTier>,
}

impl ConsensusParams {
    /// Parameters for the production network
    pub fn main() -> Self {
        Self {
            pow_limit: pow_limit_from_hex(
                "00000fffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            ),
            pow_target_spacing: 60,
            allow_min_difficulty_blocks: false,
            retarget_fork_height: 100_000,
            genesis_subsidy: COIN,
            premine_subsidy: 240_640 * COIN,
            subsidy_tiers: subsidy_schedule(),
        }
    }

    /// Parameters for the public test network
    ///
    /// Same schedule as main, but with an easier pow limit and the
    /// min-difficulty escape valve enabled so a single node can keep the
    /// chain moving.
    pub fn test() -> Self {
        Self {
            pow_limit: pow_limit_from_hex(
                "000000ffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            ),
            allow_min_difficulty_blocks: true,
            ..Self::main()
        }
    }

    /// Parameters for the given network
    pub fn for_network(network: Network) -> Self {
        match network {
            Network::Main => Self::main(),
            Network::Test => Self::test(),
        }
    }
}

/// The issuance schedule, shared by both networks
fn subsidy_schedule() -> Vec<SubsidyTier> {
    vec![
        // 512 coins, -6% every 10080 blocks (roughly weekly at 60s spacing)
        SubsidyTier {
            start_height: 0,
            base_subsidy: 512 * COIN,
            decay_interval: 10_080,
            decay_numerator: 47,
            decay_denominator: 50,
            floor: Some(5 * COIN),
        },
        // 250 coins, -10% every 1440 blocks (roughly daily)
        SubsidyTier {
            start_height: 120_000,
            base_subsidy: 250 * COIN,
            decay_interval: 1_440,
            decay_numerator: 45,
            decay_denominator: 50,
            floor: None,
        },
        // 25 coins, -1% every 10080 blocks
        SubsidyTier {
            start_height: 150_000,
            base_subsidy: 25 * COIN,
            decay_interval: 10_080,
            decay_numerator: 99,
            decay_denominator: 100,
            floor: Some(5 * COIN),
        },
    ]
}

fn pow_limit_from_hex(hex_limit: &str) -> BigUint {
    let bytes = hex::decode(hex_limit).expect("pow limit literals are valid hex");
    BigUint::from_bytes_be(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_roundtrip() {
        for network in [Network::Main, Network::Test] {
            let parsed: Network = network.to_string().parse().unwrap();
            assert_eq!(parsed, network);
        }
    }

    #[test]
    fn test_unknown_network_rejected() {
        let err = "regtest".parse::<Network>().unwrap_err();
        assert!(matches!(err, ParamsError::UnknownNetwork(name) if name == "regtest"));
    }

    #[test]
    fn test_pow_limits_differ() {
        let main = ConsensusParams::main();
        let test = ConsensusParams::test();
        assert_ne!(main.pow_limit, test.pow_limit);
        assert_eq!(main.pow_limit.bits(), 236);
        assert_eq!(test.pow_limit.bits(), 232);
    }

    #[test]
    fn test_tiers_ordered_and_cover_origin() {
        let params = ConsensusParams::main();
        assert_eq!(params.subsidy_tiers[0].start_height, 0);
        for pair in params.subsidy_tiers.windows(2) {
            assert!(pair[0].start_height < pair[1].start_height);
        }
    }

    #[test]
    fn test_networks_share_schedule() {
        assert_eq!(
            ConsensusParams::main().subsidy_tiers,
            ConsensusParams::test().subsidy_tiers
        );
    }
}
