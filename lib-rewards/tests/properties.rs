//! Property tests for the reward engine laws

use lib_rewards::{
    project_earnings, EarningsAggregator, InMemoryPoolLedger, InMemoryReferralGraph, MemberId,
    PackageTier, PalliativeConfig, PalliativeEngine, PalliativeState, QualificationEvaluator,
    QualificationRegistry, RateTable, ReferralCredit, RewardBreakdown, RewardType,
    MAX_REWARD_LEVEL,
};
use proptest::prelude::*;
use proptest::sample::Index;

/// Every tier pays at every level; amounts differ per tier, level and type
fn full_table() -> RateTable {
    let mut builder = RateTable::builder();
    for (t, tier) in PackageTier::ALL.iter().enumerate() {
        let t = t as u64 + 1;
        builder = builder.price(*tier, t * 10_000);
        for level in 1..=MAX_REWARD_LEVEL {
            let l = level as u64;
            builder = builder.level(
                *tier,
                level,
                RewardBreakdown::new(t * 100 / l, t * 10 / l, t, (t + l) % 3),
            );
        }
    }
    builder.build().unwrap()
}

fn tier_from(code: u8) -> Option<PackageTier> {
    match code {
        0 => None,
        n => PackageTier::ALL.get((n - 1) as usize).copied(),
    }
}

/// Members 1..=n; member 1 is the root and member k sponsors only lower ids
fn build_forest(shape: &[(Index, u8)]) -> (InMemoryReferralGraph, Vec<Option<u64>>) {
    let mut graph = InMemoryReferralGraph::new();
    graph.add_root(MemberId(1), tier_from(shape[0].1)).unwrap();
    // sponsors[k] is the sponsor of member k (index 0 unused)
    let mut sponsors = vec![None, None];

    for (offset, (index, code)) in shape.iter().enumerate().skip(1) {
        let member = offset as u64 + 1;
        let sponsor = 1 + index.index(offset) as u64;
        graph
            .activate(MemberId(member), MemberId(sponsor), tier_from(*code))
            .unwrap();
        sponsors.push(Some(sponsor));
    }
    (graph, sponsors)
}

fn depth_below(sponsors: &[Option<u64>], root: u64, member: u64) -> Option<u8> {
    let mut depth = 0u8;
    let mut current = member;
    while let Some(sponsor) = sponsors[current as usize] {
        depth += 1;
        if sponsor == root {
            return Some(depth);
        }
        current = sponsor;
    }
    None
}

fn forest_shape() -> impl Strategy<Value = Vec<(Index, u8)>> {
    prop::collection::vec((any::<Index>(), 0u8..=6), 1..120)
}

proptest! {
    #[test]
    fn prop_projection_counts_follow_fan_out(invites in 1u64..100_000) {
        let projection = project_earnings(&full_table(), PackageTier::RegularPlus, invites).unwrap();
        for level in 1..=MAX_REWARD_LEVEL {
            let expected = invites * 10u64.pow(level as u32 - 1);
            prop_assert_eq!(projection.level_count(level), expected);
        }
    }

    #[test]
    fn prop_projection_grand_total_is_breakdown_sum(
        invites in 1u64..10_000,
        rates in prop::collection::vec(0u64..5_000, 16),
    ) {
        let mut builder = RateTable::builder();
        for level in 1..=MAX_REWARD_LEVEL {
            let i = (level as usize - 1) * 4;
            builder = builder.level(
                PackageTier::Gold,
                level,
                RewardBreakdown::new(rates[i], rates[i + 1], rates[i + 2], rates[i + 3]),
            );
        }
        let projection = project_earnings(&builder.build().unwrap(), PackageTier::Gold, invites).unwrap();

        let summed: u64 = projection
            .levels
            .iter()
            .flat_map(|level| RewardType::ALL.map(|t| level.totals.get(t)))
            .sum();
        prop_assert_eq!(projection.grand_total, summed);
        for level in &projection.levels {
            for t in RewardType::ALL {
                prop_assert_eq!(level.totals.get(t), level.rates.get(t) * level.member_count);
            }
        }
    }

    #[test]
    fn prop_aggregation_matches_brute_force(shape in forest_shape(), root_pick in any::<Index>()) {
        let (graph, sponsors) = build_forest(&shape);
        let rates = full_table();
        let root = 1 + root_pick.index(shape.len()) as u64;

        let report = EarningsAggregator::new(&rates).aggregate(&graph, MemberId(root)).unwrap();

        let mut expected = RewardBreakdown::ZERO;
        let mut counted = 0u64;
        for member in 1..=shape.len() as u64 {
            let Some(depth) = depth_below(&sponsors, root, member) else { continue };
            if depth > MAX_REWARD_LEVEL {
                continue;
            }
            counted += 1;
            if let Some(tier) = tier_from(shape[member as usize - 1].1) {
                expected = expected.checked_add(&rates.level_rates(tier, depth)).unwrap();
            }
        }

        prop_assert!(!report.truncated);
        prop_assert_eq!(report.descendant_count(), counted);
        prop_assert_eq!(report.totals_by_type, expected);
        prop_assert_eq!(report.grand_total, expected.checked_total().unwrap());
    }

    #[test]
    fn prop_qualification_never_reverts(
        shapes in prop::collection::vec(forest_shape(), 1..6),
    ) {
        let registry = QualificationRegistry::new();
        let evaluator = QualificationEvaluator::default();
        let mut was_qualified = false;

        for (run, shape) in shapes.iter().enumerate() {
            let (graph, _) = build_forest(shape);
            let outcome = registry
                .evaluate_and_record(&evaluator, &graph, MemberId(1), run as u64)
                .unwrap();
            if was_qualified {
                prop_assert!(outcome.status.is_qualified);
                prop_assert!(!outcome.newly_qualified);
            }
            was_qualified = outcome.status.is_qualified;
        }
    }

    #[test]
    fn prop_threshold_fires_exactly_once(
        amounts in prop::collection::vec(1u64..60_000, 1..40),
    ) {
        let engine = PalliativeEngine::new(PalliativeConfig::default(), InMemoryPoolLedger::new());
        let member = MemberId(1);
        let mut fired = 0;
        let mut total = 0u64;

        for (i, amount) in amounts.iter().enumerate() {
            total += amount;
            let outcome = engine
                .record_credit(&ReferralCredit::new(format!("evt-{}", i), member, *amount))
                .unwrap();
            prop_assert_eq!(outcome.balance, total);
            if let Some(transition) = outcome.transition {
                prop_assert_eq!(transition.to, PalliativeState::ThresholdReached);
                prop_assert!(outcome.balance >= 200_000);
                prop_assert!(outcome.balance - amount < 200_000);
                fired += 1;
            }
        }

        prop_assert_eq!(fired, usize::from(total >= 200_000));
    }

    #[test]
    fn prop_progress_never_exceeds_full(amounts in prop::collection::vec(1u64..500_000, 1..10)) {
        let engine = PalliativeEngine::new(PalliativeConfig::default(), InMemoryPoolLedger::new());
        for (i, amount) in amounts.iter().enumerate() {
            engine
                .record_credit(&ReferralCredit::new(format!("evt-{}", i), MemberId(2), *amount))
                .unwrap();
            prop_assert!(engine.account(MemberId(2)).unwrap().progress_bps() <= 10_000);
        }
    }
}
