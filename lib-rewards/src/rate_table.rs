//! Package Rate Table
//!
//! Static lookup of the per-level reward rates of every package tier, plus
//! the package catalog price that sits next to them.
//!
//! # Versioning
//!
//! A [`RateTable`] is immutable once built and carries a content fingerprint
//! ([`RateTableVersion`]). Every report produced from a table records that
//! version, so a historical aggregate can always be reproduced against the
//! exact rates that produced it. Rate changes mean building a new table, never
//! mutating a shared one.
//!
//! # Absent rates
//!
//! Levels outside `1..=4` and unconfigured `(tier, level, type)` combinations
//! read as zero. "No reward configured" is a valid state, not a fault.

use crate::errors::{RewardError, RewardResult};
use lib_types::{Amount, PackageTier, RewardBreakdown, RewardType, MAX_REWARD_LEVEL};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

const LEVELS: usize = MAX_REWARD_LEVEL as usize;

// =============================================================================
// CONFIGURATION SHAPE
// =============================================================================

/// Rates paid to an upline member for one descendant at `level`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LevelRateConfig {
    pub level: u8,
    #[serde(default)]
    pub cash: Amount,
    #[serde(default)]
    pub pool_reward: Amount,
    #[serde(default)]
    pub token: Amount,
    #[serde(default)]
    pub cashback: Amount,
}

impl LevelRateConfig {
    pub fn breakdown(&self) -> RewardBreakdown {
        RewardBreakdown::new(self.cash, self.pool_reward, self.token, self.cashback)
    }
}

/// Catalog entry for a package tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRateConfig {
    pub tier: PackageTier,
    #[serde(default)]
    pub price: Amount,
    #[serde(default)]
    pub levels: Vec<LevelRateConfig>,
}

/// External configuration for the rate table (e.g. the `[[rates.packages]]` TOML array)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTableConfig {
    #[serde(default)]
    pub packages: Vec<PackageRateConfig>,
}

// =============================================================================
// VERSION FINGERPRINT
// =============================================================================

/// BLAKE3 fingerprint of a rate table's contents
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RateTableVersion(pub [u8; 32]);

impl RateTableVersion {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short form used in logs and table output
    pub fn short(&self) -> String {
        hex::encode(&self.0[..6])
    }
}

impl fmt::Debug for RateTableVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RateTableVersion({})", self.short())
    }
}

impl fmt::Display for RateTableVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for RateTableVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for RateTableVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let bytes = hex::decode(&raw).map_err(serde::de::Error::custom)?;
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("rate table version must be 32 bytes"))?;
        Ok(RateTableVersion(array))
    }
}

// =============================================================================
// RATE TABLE
// =============================================================================

/// Price and level 1..=4 rates of one package tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PackageRates {
    pub price: Amount,
    pub levels: [RewardBreakdown; LEVELS],
}

/// Immutable, versioned rate lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateTable {
    version: RateTableVersion,
    packages: BTreeMap<PackageTier, PackageRates>,
}

impl RateTable {
    /// Start building a table in code
    pub fn builder() -> RateTableBuilder {
        RateTableBuilder::default()
    }

    /// An empty table: every lookup is zero
    pub fn empty() -> Self {
        Self::from_packages(BTreeMap::new())
    }

    /// Validate and freeze an external configuration
    pub fn from_config(config: &RateTableConfig) -> RewardResult<Self> {
        let mut packages = BTreeMap::new();

        for package in &config.packages {
            if packages.contains_key(&package.tier) {
                return Err(RewardError::Config(format!(
                    "package {} configured more than once",
                    package.tier
                )));
            }

            let mut rates = PackageRates {
                price: package.price,
                levels: [RewardBreakdown::ZERO; LEVELS],
            };
            let mut seen = [false; LEVELS];

            for level in &package.levels {
                if level.level == 0 || level.level > MAX_REWARD_LEVEL {
                    return Err(RewardError::Config(format!(
                        "package {} has level {} outside 1..={}",
                        package.tier, level.level, MAX_REWARD_LEVEL
                    )));
                }
                let index = (level.level - 1) as usize;
                if seen[index] {
                    return Err(RewardError::Config(format!(
                        "package {} configures level {} more than once",
                        package.tier, level.level
                    )));
                }
                seen[index] = true;
                rates.levels[index] = level.breakdown();
            }

            packages.insert(package.tier, rates);
        }

        Ok(Self::from_packages(packages))
    }

    fn from_packages(packages: BTreeMap<PackageTier, PackageRates>) -> Self {
        let version = fingerprint(&packages);
        Self { version, packages }
    }

    pub fn version(&self) -> RateTableVersion {
        self.version
    }

    /// Reward for one descendant on `tier` at `level`, for one reward type
    pub fn rate(&self, tier: PackageTier, level: u8, reward_type: RewardType) -> Amount {
        self.level_rates(tier, level).get(reward_type)
    }

    /// All four rates for one descendant on `tier` at `level`
    pub fn level_rates(&self, tier: PackageTier, level: u8) -> RewardBreakdown {
        if level == 0 || level > MAX_REWARD_LEVEL {
            return RewardBreakdown::ZERO;
        }
        self.packages
            .get(&tier)
            .map(|rates| rates.levels[(level - 1) as usize])
            .unwrap_or(RewardBreakdown::ZERO)
    }

    /// Catalog price of a tier, if the tier is configured
    pub fn price(&self, tier: PackageTier) -> Option<Amount> {
        self.packages.get(&tier).map(|rates| rates.price)
    }

    /// Configured tiers in ascending order
    pub fn tiers(&self) -> impl Iterator<Item = PackageTier> + '_ {
        self.packages.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Export back to the configuration shape (zero levels omitted)
    pub fn to_config(&self) -> RateTableConfig {
        RateTableConfig {
            packages: self
                .packages
                .iter()
                .map(|(tier, rates)| PackageRateConfig {
                    tier: *tier,
                    price: rates.price,
                    levels: rates
                        .levels
                        .iter()
                        .enumerate()
                        .filter(|(_, row)| !row.is_zero())
                        .map(|(index, row)| LevelRateConfig {
                            level: index as u8 + 1,
                            cash: row.cash,
                            pool_reward: row.pool_reward,
                            token: row.token,
                            cashback: row.cashback,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::empty()
    }
}

/// Domain-separated hash over every tier, price and rate in table order
fn fingerprint(packages: &BTreeMap<PackageTier, PackageRates>) -> RateTableVersion {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"rate-table.v1");
    for (tier, rates) in packages {
        hasher.update(&[*tier as u8]);
        hasher.update(&rates.price.to_le_bytes());
        for row in &rates.levels {
            for reward_type in RewardType::ALL {
                hasher.update(&row.get(reward_type).to_le_bytes());
            }
        }
    }
    RateTableVersion(hasher.finalize().into())
}

// =============================================================================
// BUILDER
// =============================================================================

/// Incremental construction of a [`RateTable`]
#[derive(Debug, Clone, Default)]
pub struct RateTableBuilder {
    config: RateTableConfig,
}

impl RateTableBuilder {
    fn entry(&mut self, tier: PackageTier) -> &mut PackageRateConfig {
        let position = match self.config.packages.iter().position(|p| p.tier == tier) {
            Some(position) => position,
            None => {
                self.config.packages.push(PackageRateConfig {
                    tier,
                    price: 0,
                    levels: Vec::new(),
                });
                self.config.packages.len() - 1
            }
        };
        &mut self.config.packages[position]
    }

    /// Set the catalog price of a tier
    pub fn price(mut self, tier: PackageTier, price: Amount) -> Self {
        self.entry(tier).price = price;
        self
    }

    /// Set all four rates of a tier at one level
    pub fn level(mut self, tier: PackageTier, level: u8, rates: RewardBreakdown) -> Self {
        self.entry(tier).levels.push(LevelRateConfig {
            level,
            cash: rates.cash,
            pool_reward: rates.pool_reward,
            token: rates.token,
            cashback: rates.cashback,
        });
        self
    }

    pub fn build(self) -> RewardResult<RateTable> {
        RateTable::from_config(&self.config)
    }
}
