//! Scenario tests across the engine components

use lib_rewards::{
    project_earnings, EarningsAggregator, EngineConfig, GraphSnapshot, InMemoryPoolLedger,
    InMemoryReferralGraph, MemberId, PackageTier, PalliativeEngine, PalliativeState, PoolLedger,
    QualificationEvaluator, QualificationMethod, QualificationRegistry, RateTable,
    ReferralCredit, RewardBreakdown, RewardError, RewardType, SnapshotMember, TargetType,
    TraversalLimits, TruncationReason,
};
use std::path::Path;
use std::sync::Arc;

fn sample_config() -> EngineConfig {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("config")
        .join("rewards.toml");
    EngineConfig::from_file(&path).unwrap()
}

/// Leader 1 (gold) with `direct` sponsees on `tier`, each bringing `each` more on `tier`
fn leader_graph(direct: u64, each: u64, tier: PackageTier) -> InMemoryReferralGraph {
    let mut graph = InMemoryReferralGraph::new();
    graph.add_root(MemberId(1), Some(PackageTier::Gold)).unwrap();
    let mut next = 1_000;
    for i in 0..direct {
        let child = MemberId(10 + i);
        graph.activate(child, MemberId(1), Some(tier)).unwrap();
        for _ in 0..each {
            graph.activate(MemberId(next), child, Some(tier)).unwrap();
            next += 1;
        }
    }
    graph
}

#[test]
fn sample_config_is_complete() {
    let config = sample_config();
    let rates = config.rate_table().unwrap();

    assert_eq!(rates.tiers().count(), PackageTier::ALL.len());
    assert_eq!(rates.rate(PackageTier::RegularPlus, 1, RewardType::Cash), 500);
    assert_eq!(rates.rate(PackageTier::RegularPlus, 2, RewardType::Cash), 100);
    for target in TargetType::ALL {
        assert!(config.palliative.target_amount(*target).is_some());
    }
}

#[test]
fn regular_plus_projection_scenario() {
    let rates = sample_config().rate_table().unwrap();
    let projection = project_earnings(&rates, PackageTier::RegularPlus, 10).unwrap();

    assert_eq!(projection.level(1).unwrap().totals.cash, 5_000);
    assert_eq!(projection.level_count(2), 100);
    assert_eq!(projection.level(2).unwrap().totals.cash, 10_000);
    assert_eq!(projection.rate_table_version, rates.version());
}

#[test]
fn seventy_one_direct_qualifies_via_breadth() {
    let graph = leader_graph(71, 0, PackageTier::RegularPlus);
    let report = QualificationEvaluator::default().evaluate(&graph, MemberId(1)).unwrap();

    assert_eq!(report.method, QualificationMethod::Option1);
    assert_eq!(report.option1.direct_qualified_count, 71);
    assert_eq!(report.option1_percentage(), 100.0);
}

#[test]
fn depth_path_uses_binding_constraint() {
    // 50 first generation, 25 second generation: 100% and 50% -> 50%
    let mut graph = leader_graph(50, 0, PackageTier::RegularPlus);
    for i in 0..25 {
        graph
            .activate(MemberId(5_000 + i), MemberId(10 + i), Some(PackageTier::Platinum))
            .unwrap();
    }
    let report = QualificationEvaluator::default().evaluate(&graph, MemberId(1)).unwrap();

    assert_eq!(report.option2.first_gen, 50);
    assert_eq!(report.option2.second_gen, 25);
    assert_eq!(report.option2_percentage(), 50.0);
    assert_eq!(report.method, QualificationMethod::None);
    // Option 1 sits at 50/70 = 71.42%, ahead of Option 2
    assert_eq!(report.recommendation, Some(QualificationMethod::Option1));
}

#[test]
fn sponsees_below_regular_plus_do_not_count() {
    let graph = leader_graph(80, 0, PackageTier::Regular);
    let report = QualificationEvaluator::default().evaluate(&graph, MemberId(1)).unwrap();
    assert_eq!(report.option1.direct_qualified_count, 0);
    assert!(!report.qualifies());
}

#[test]
fn member_below_tier_cannot_qualify() {
    let mut graph = leader_graph(71, 0, PackageTier::Gold);
    graph.set_package(MemberId(1), Some(PackageTier::Regular)).unwrap();
    let report = QualificationEvaluator::default().evaluate(&graph, MemberId(1)).unwrap();

    assert!(report.option1.satisfied);
    assert!(!report.has_qualifying_tier);
    assert_eq!(report.method, QualificationMethod::None);
}

#[test]
fn qualification_survives_downline_loss() {
    let registry = QualificationRegistry::new();
    let evaluator = QualificationEvaluator::default();
    let mut graph = leader_graph(70, 0, PackageTier::RegularPlus);

    assert!(registry
        .evaluate_and_record(&evaluator, &graph, MemberId(1), 10)
        .unwrap()
        .newly_qualified);

    for i in 0..70 {
        graph.set_package(MemberId(10 + i), None).unwrap();
    }
    let outcome = registry
        .evaluate_and_record(&evaluator, &graph, MemberId(1), 20)
        .unwrap();
    assert!(!outcome.report.qualifies());
    assert!(outcome.status.is_qualified);
    assert_eq!(outcome.status.method, QualificationMethod::Option1);
}

#[test]
fn cyclic_snapshot_is_a_graph_integrity_error() {
    let snapshot = GraphSnapshot {
        members: vec![
            SnapshotMember::new(1, None, Some(PackageTier::Gold)),
            SnapshotMember::new(2, Some(3), Some(PackageTier::Gold)),
            SnapshotMember::new(3, Some(2), Some(PackageTier::Gold)),
        ],
    };
    let graph = InMemoryReferralGraph::from_snapshot(&snapshot).unwrap();
    let rates = RateTable::empty();

    let err = EarningsAggregator::new(&rates).aggregate(&graph, MemberId(2)).unwrap_err();
    assert!(matches!(err, RewardError::GraphIntegrity { .. }));
    assert!(matches!(graph.validate_forest(), Err(RewardError::GraphIntegrity { .. })));

    // The healthy part of the forest is unaffected
    let fine = EarningsAggregator::new(&rates).aggregate(&graph, MemberId(1)).unwrap();
    assert_eq!(fine.descendant_count(), 0);
}

#[test]
fn long_sponsor_ring_is_rejected_by_every_component() {
    // 1 -> 2 -> 3 -> 4 -> 5 -> 1, longer than any traversal window
    let snapshot = GraphSnapshot {
        members: vec![
            SnapshotMember::new(1, Some(5), Some(PackageTier::Gold)),
            SnapshotMember::new(2, Some(1), Some(PackageTier::Gold)),
            SnapshotMember::new(3, Some(2), Some(PackageTier::Gold)),
            SnapshotMember::new(4, Some(3), Some(PackageTier::Gold)),
            SnapshotMember::new(5, Some(4), Some(PackageTier::Gold)),
        ],
    };
    let graph = InMemoryReferralGraph::from_snapshot(&snapshot).unwrap();
    let rates = sample_config().rate_table().unwrap();

    let err = EarningsAggregator::new(&rates).aggregate(&graph, MemberId(1)).unwrap_err();
    assert!(matches!(err, RewardError::GraphIntegrity { .. }));

    let err = QualificationEvaluator::default().evaluate(&graph, MemberId(1)).unwrap_err();
    assert!(matches!(err, RewardError::GraphIntegrity { .. }));
}

#[test]
fn oversized_downline_is_flagged_partial() {
    let graph = leader_graph(30, 3, PackageTier::RegularPlus);
    let rates = sample_config().rate_table().unwrap();

    let report = EarningsAggregator::new(&rates)
        .with_limits(TraversalLimits::new(40))
        .aggregate(&graph, MemberId(1))
        .unwrap();

    assert!(report.truncated);
    assert_eq!(report.truncation, Some(TruncationReason::DescendantCap));
    assert_eq!(report.descendant_count(), 40);
    // All 30 direct plus the first 10 second-level members
    assert_eq!(report.level(1).unwrap().member_count, 30);
    assert_eq!(report.level(2).unwrap().member_count, 10);
}

#[test]
fn expired_deadline_is_flagged_partial() {
    let graph = leader_graph(5, 0, PackageTier::Gold);
    let rates = RateTable::empty();
    let report = EarningsAggregator::new(&rates)
        .with_limits(TraversalLimits::default().with_deadline(std::time::Instant::now()))
        .aggregate(&graph, MemberId(1))
        .unwrap();

    assert!(report.truncated);
    assert_eq!(report.truncation, Some(TruncationReason::Deadline));
}

#[test]
fn inactive_descendants_contribute_zero() {
    let mut graph = leader_graph(3, 0, PackageTier::Diamond);
    graph.set_package(MemberId(11), None).unwrap();
    let rates = RateTable::builder()
        .level(PackageTier::Diamond, 1, RewardBreakdown::new(10, 1, 1, 1))
        .build()
        .unwrap();

    let report = EarningsAggregator::new(&rates).aggregate(&graph, MemberId(1)).unwrap();
    let level1 = report.level(1).unwrap();
    assert_eq!(level1.member_count, 3);
    assert_eq!(level1.active_count, 2);
    assert_eq!(report.grand_total, 26);
}

#[test]
fn palliative_threshold_scenario() {
    let ledger = Arc::new(InMemoryPoolLedger::new());
    let config = sample_config().palliative;
    let engine = PalliativeEngine::new(config, Arc::clone(&ledger));
    let member = MemberId(42);

    engine
        .record_credit(&ReferralCredit::new("evt-1", member, 195_000))
        .unwrap();
    let outcome = engine
        .record_credit(&ReferralCredit::new("evt-2", member, 5_000))
        .unwrap();

    assert_eq!(outcome.state, PalliativeState::ThresholdReached);
    assert_eq!(outcome.balance, 200_000);
    assert_eq!(ledger.current_balance(member).unwrap(), 200_000);

    let again = engine
        .record_credit(&ReferralCredit::new("evt-3", member, 5_000))
        .unwrap();
    assert_eq!(again.transition, None);
}

#[test]
fn palliative_target_lifecycle_with_package_credits() {
    let config = sample_config();
    let rates = config.rate_table().unwrap();
    let engine = PalliativeEngine::new(config.palliative.clone(), InMemoryPoolLedger::new());
    let member = MemberId(7);

    // Ten diamond referrals: 10 x 20,000
    for i in 0..10 {
        let credit =
            ReferralCredit::for_package(format!("ref-{}", i), member, PackageTier::Diamond, &rates)
                .unwrap();
        engine.record_credit(&credit).unwrap();
    }
    assert_eq!(engine.account(member).unwrap().state, PalliativeState::ThresholdReached);

    engine.select_target(member, TargetType::SolarEquipment).unwrap();
    let account = engine.account(member).unwrap();
    assert_eq!(account.state, PalliativeState::TargetActive);
    assert_eq!(account.current_balance, 200_000);
    assert_eq!(account.progress_bps(), 1_333);

    assert!(!engine.check_maturity(member, 1).unwrap().matured);

    engine
        .record_credit(&ReferralCredit::new("bonus", member, 1_300_000))
        .unwrap();
    let check = engine.check_maturity(member, 2).unwrap();
    assert!(check.matured);
    let record = check.record.unwrap();
    assert_eq!(record.target_type, TargetType::SolarEquipment);
    assert_eq!(record.target_amount, 1_500_000);
    assert_eq!(record.balance_at_maturity, 1_500_000);
}

#[test]
fn selecting_target_early_is_rejected() {
    let engine = PalliativeEngine::new(sample_config().palliative, InMemoryPoolLedger::new());
    engine
        .record_credit(&ReferralCredit::new("evt-1", MemberId(1), 1_000))
        .unwrap();

    let err = engine.select_target(MemberId(1), TargetType::Housing).unwrap_err();
    assert_eq!(
        err,
        RewardError::InvalidTransition {
            state: PalliativeState::AccumulatingPool,
            action: "select_target",
        }
    );
}
