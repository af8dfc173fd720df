//! Engine configuration
//!
//! One TOML document drives every component:
//!
//! ```toml
//! [traversal]
//! max_depth = 4
//! max_descendants = 100000
//! deadline_ms = 2000
//!
//! [qualification]
//! min_tier = "regular_plus"
//!
//! [palliative]
//! threshold = 200000
//!
//! [palliative.targets]
//! vehicle = 5000000
//!
//! [[rates.packages]]
//! tier = "regular_plus"
//! price = 50000
//! levels = [{ level = 1, cash = 500 }]
//! ```

use crate::errors::{RewardError, RewardResult};
use crate::graph::{TraversalLimits, DEFAULT_MAX_DESCENDANTS};
use crate::palliative::PalliativeConfig;
use crate::qualification::QualificationPolicy;
use crate::rate_table::{RateTable, RateTableConfig};
use lib_types::MAX_REWARD_LEVEL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::debug;

/// Bounds for downline traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    pub max_depth: u8,
    pub max_descendants: usize,
    /// Per-call time budget; unset means no deadline
    pub deadline_ms: Option<u64>,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_REWARD_LEVEL,
            max_descendants: DEFAULT_MAX_DESCENDANTS,
            deadline_ms: None,
        }
    }
}

impl TraversalConfig {
    /// Limits for a traversal starting now
    pub fn limits(&self) -> TraversalLimits {
        let limits = TraversalLimits::new(self.max_descendants);
        match self.deadline_ms {
            Some(ms) => limits.with_deadline(Instant::now() + Duration::from_millis(ms)),
            None => limits,
        }
    }
}

/// Full engine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub traversal: TraversalConfig,
    pub qualification: QualificationPolicy,
    pub palliative: PalliativeConfig,
    pub rates: RateTableConfig,
}

impl EngineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(raw: &str) -> RewardResult<Self> {
        let config: EngineConfig = toml::from_str(raw)
            .map_err(|e| RewardError::Config(format!("Invalid engine config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_file(path: &Path) -> RewardResult<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            RewardError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&raw)?;
        debug!(
            path = %path.display(),
            packages = config.rates.packages.len(),
            "engine config loaded"
        );
        Ok(config)
    }

    pub fn validate(&self) -> RewardResult<()> {
        if self.traversal.max_depth == 0 || self.traversal.max_depth > MAX_REWARD_LEVEL {
            return Err(RewardError::Config(format!(
                "traversal.max_depth must be within 1..={}",
                MAX_REWARD_LEVEL
            )));
        }
        if self.traversal.max_descendants == 0 {
            return Err(RewardError::Config(
                "traversal.max_descendants must be positive".to_string(),
            ));
        }
        self.qualification.validate()?;
        self.palliative.validate()?;
        Ok(())
    }

    /// Build the immutable rate table this configuration describes
    pub fn rate_table(&self) -> RewardResult<RateTable> {
        RateTable::from_config(&self.rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_types::{PackageTier, RewardType, TargetType};
    use std::io::Write;

    const SAMPLE: &str = r#"
[traversal]
max_depth = 3
deadline_ms = 500

[qualification]
min_tier = "gold"
option1_direct = 20

[palliative]
threshold = 150000

[palliative.targets]
vehicle = 900000

[[rates.packages]]
tier = "regular_plus"
price = 50000
levels = [
    { level = 1, cash = 500, token = 10 },
    { level = 2, cash = 100 },
]
"#;

    #[test]
    fn test_parse_sample() {
        let config = EngineConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.traversal.max_depth, 3);
        assert_eq!(config.traversal.max_descendants, DEFAULT_MAX_DESCENDANTS);
        assert_eq!(config.qualification.min_tier, PackageTier::Gold);
        assert_eq!(config.qualification.option1_direct, 20);
        assert_eq!(config.qualification.option2_first_gen, 50);
        assert_eq!(config.palliative.threshold, 150_000);
        assert_eq!(config.palliative.target_amount(TargetType::Vehicle), Some(900_000));
        // Unlisted targets keep their defaults
        assert_eq!(config.palliative.target_amount(TargetType::Housing), Some(20_000_000));
        assert_eq!(config.palliative.target_amount(TargetType::Education), Some(2_000_000));

        let table = config.rate_table().unwrap();
        assert_eq!(table.rate(PackageTier::RegularPlus, 1, RewardType::Cash), 500);
        assert_eq!(table.rate(PackageTier::RegularPlus, 2, RewardType::Token), 0);
        assert_eq!(table.price(PackageTier::RegularPlus), Some(50_000));
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert!(config.rate_table().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_depth_rejected() {
        let err = EngineConfig::from_toml_str("[traversal]\nmax_depth = 5\n").unwrap_err();
        assert!(matches!(err, RewardError::Config(_)));
    }

    #[test]
    fn test_single_target_override_keeps_the_rest_selectable() {
        use crate::ledger::{InMemoryPoolLedger, ReferralCredit};
        use crate::palliative::{PalliativeEngine, PalliativeState};
        use lib_types::MemberId;

        let config = EngineConfig::from_toml_str("[palliative.targets]\nvehicle = 900000\n").unwrap();
        assert_eq!(config.palliative.target_amount(TargetType::Vehicle), Some(900_000));

        let engine = PalliativeEngine::new(config.palliative, InMemoryPoolLedger::new());
        engine
            .record_credit(&ReferralCredit::new("evt-1", MemberId(3), 200_000))
            .unwrap();
        engine.select_target(MemberId(3), TargetType::Housing).unwrap();
        let account = engine.account(MemberId(3)).unwrap();
        assert_eq!(account.state, PalliativeState::TargetActive);
        assert_eq!(account.target_amount, Some(20_000_000));
    }

    #[test]
    fn test_zero_target_override_rejected() {
        let err = EngineConfig::from_toml_str("[palliative.targets]\nland = 0\n").unwrap_err();
        assert!(matches!(err, RewardError::Config(_)));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let err = EngineConfig::from_toml_str("[traversal\n").unwrap_err();
        assert!(matches!(err, RewardError::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.palliative.threshold, 150_000);

        let missing = EngineConfig::from_file(Path::new("/nonexistent/rewards.toml"));
        assert!(matches!(missing, Err(RewardError::Config(_))));
    }

    #[test]
    fn test_deadline_becomes_limit() {
        let config = EngineConfig::from_toml_str(SAMPLE).unwrap();
        assert!(config.traversal.limits().deadline.is_some());
        assert!(TraversalConfig::default().limits().deadline.is_none());
    }
}
