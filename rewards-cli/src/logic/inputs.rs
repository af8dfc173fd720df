//! Input document parsing
//!
//! The CLI reads three JSON documents:
//!
//! ```text
//! graph:  { "members": [ { "id": 1, "sponsor": null, "package": "gold" }, ... ] }
//! status: { "statuses": { "1": { "is_qualified": true, "method": "OPTION_1", "qualified_at": 1700000000 } } }
//! events: [ { "type": "credit", "event_id": "e1", "member": 1, "amount": 5000 },
//!           { "type": "credit", "event_id": "e2", "member": 1, "referred_package": "gold" },
//!           { "type": "select_target", "member": 1, "target": "vehicle" } ]
//! ```

use crate::error::{CliError, CliResult};
use lib_rewards::{
    Amount, GraphSnapshot, MemberId, PackageTier, RateTable, ReferralCredit, StatusSnapshot,
    TargetType,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// One entry of a palliative event log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PalliativeEvent {
    /// Pool credit, either with an explicit amount or sized from the referred package
    Credit {
        event_id: String,
        member: MemberId,
        #[serde(default)]
        amount: Option<Amount>,
        #[serde(default)]
        referred_package: Option<PackageTier>,
    },
    SelectTarget {
        member: MemberId,
        target: TargetType,
    },
}

impl PalliativeEvent {
    pub fn member(&self) -> MemberId {
        match self {
            PalliativeEvent::Credit { member, .. } | PalliativeEvent::SelectTarget { member, .. } => {
                *member
            }
        }
    }

    /// Convert a credit event into the engine's credit
    ///
    /// An explicit amount wins over the package-derived one.
    pub fn to_credit(&self, rates: &RateTable) -> CliResult<Option<ReferralCredit>> {
        let PalliativeEvent::Credit {
            event_id,
            member,
            amount,
            referred_package,
        } = self
        else {
            return Ok(None);
        };

        let credit = match (amount, referred_package) {
            (Some(amount), package) => ReferralCredit {
                referred_package: *package,
                ..ReferralCredit::new(event_id.clone(), *member, *amount)
            },
            (None, Some(package)) => {
                ReferralCredit::for_package(event_id.clone(), *member, *package, rates)?
            }
            (None, None) => {
                return Err(CliError::InvalidArgument(format!(
                    "credit event '{}' needs an amount or a referred_package",
                    event_id
                )))
            }
        };
        Ok(Some(credit))
    }
}

fn parse_document<T: DeserializeOwned>(raw: &str, path: &str) -> CliResult<T> {
    serde_json::from_str(raw).map_err(|e| CliError::InvalidInputFile {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

pub fn parse_graph_snapshot(raw: &str, path: &str) -> CliResult<GraphSnapshot> {
    parse_document(raw, path)
}

pub fn parse_status_snapshot(raw: &str, path: &str) -> CliResult<StatusSnapshot> {
    parse_document(raw, path)
}

pub fn parse_events(raw: &str, path: &str) -> CliResult<Vec<PalliativeEvent>> {
    parse_document(raw, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_rewards::RewardBreakdown;

    #[test]
    fn test_parse_graph() {
        let raw = r#"{ "members": [
            { "id": 1, "sponsor": null, "package": "gold" },
            { "id": 2, "sponsor": 1, "package": "regular_plus" },
            { "id": 3, "sponsor": 2 }
        ] }"#;
        let snapshot = parse_graph_snapshot(raw, "graph.json").unwrap();
        assert_eq!(snapshot.members.len(), 3);
        assert_eq!(snapshot.members[1].sponsor, Some(MemberId(1)));
        assert_eq!(snapshot.members[2].package, None);
    }

    #[test]
    fn test_bad_document_names_the_file() {
        let err = parse_graph_snapshot("{ nope", "graph.json").unwrap_err();
        assert!(err.to_string().contains("graph.json"));
    }

    #[test]
    fn test_parse_events() {
        let raw = r#"[
            { "type": "credit", "event_id": "e1", "member": 4, "amount": 5000 },
            { "type": "select_target", "member": 4, "target": "solar_equipment" }
        ]"#;
        let events = parse_events(raw, "events.json").unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].member(), MemberId(4));
        assert!(matches!(
            events[1],
            PalliativeEvent::SelectTarget { target: TargetType::SolarEquipment, .. }
        ));
    }

    #[test]
    fn test_credit_from_package_price() {
        let rates = RateTable::builder()
            .price(PackageTier::Platinum, 80_000)
            .level(PackageTier::Platinum, 1, RewardBreakdown::new(1, 0, 0, 0))
            .build()
            .unwrap();
        let event = PalliativeEvent::Credit {
            event_id: "e1".to_string(),
            member: MemberId(1),
            amount: None,
            referred_package: Some(PackageTier::Platinum),
        };
        let credit = event.to_credit(&rates).unwrap().unwrap();
        assert_eq!(credit.amount, 8_000);
    }

    #[test]
    fn test_credit_without_amount_or_package() {
        let event = PalliativeEvent::Credit {
            event_id: "e1".to_string(),
            member: MemberId(1),
            amount: None,
            referred_package: None,
        };
        assert!(matches!(
            event.to_credit(&RateTable::empty()),
            Err(CliError::InvalidArgument(_))
        ));
    }
}
