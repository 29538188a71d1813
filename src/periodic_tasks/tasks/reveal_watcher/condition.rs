use serde::{Deserialize, Serialize};

/// Contract state observed by one watcher poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ChainSnapshot {
    pub block_number: u64,
    pub total_supply: u64,
    pub paused: bool,
    /// Only queried when the active condition looks at it.
    pub revealed: Option<bool>,
}

/// Predicate deciding when the collection is revealed.
pub(super) trait RevealCondition: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether polls must read the contract's `revealed()` flag.
    fn needs_revealed_flag(&self) -> bool;

    fn is_met(&self, snapshot: &ChainSnapshot, max_supply: u64) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum RevealConditionKind {
    /// Every token has been minted.
    SupplyReached,
    /// The contract's `revealed()` flag is set.
    RevealedFlag,
    /// Either of the above.
    Any,
}

impl RevealConditionKind {
    pub(super) fn build(self) -> Box<dyn RevealCondition> {
        match self {
            Self::SupplyReached => Box::new(SupplyReached),
            Self::RevealedFlag => Box::new(RevealedFlag),
            Self::Any => Box::new(AnyOf(vec![Box::new(SupplyReached), Box::new(RevealedFlag)])),
        }
    }
}

struct SupplyReached;

impl RevealCondition for SupplyReached {
    fn name(&self) -> &'static str {
        "supply_reached"
    }

    fn needs_revealed_flag(&self) -> bool {
        false
    }

    fn is_met(&self, snapshot: &ChainSnapshot, max_supply: u64) -> bool {
        snapshot.total_supply >= max_supply
    }
}

struct RevealedFlag;

impl RevealCondition for RevealedFlag {
    fn name(&self) -> &'static str {
        "revealed_flag"
    }

    fn needs_revealed_flag(&self) -> bool {
        true
    }

    fn is_met(&self, snapshot: &ChainSnapshot, _max_supply: u64) -> bool {
        snapshot.revealed == Some(true)
    }
}

struct AnyOf(Vec<Box<dyn RevealCondition>>);

impl RevealCondition for AnyOf {
    fn name(&self) -> &'static str {
        "any"
    }

    fn needs_revealed_flag(&self) -> bool {
        self.0.iter().any(|condition| condition.needs_revealed_flag())
    }

    fn is_met(&self, snapshot: &ChainSnapshot, max_supply: u64) -> bool {
        self.0
            .iter()
            .any(|condition| condition.is_met(snapshot, max_supply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(total_supply: u64, revealed: Option<bool>) -> ChainSnapshot {
        ChainSnapshot {
            block_number: 1,
            total_supply,
            paused: false,
            revealed,
        }
    }

    #[test]
    fn supply_reached_requires_full_mint() {
        let condition = RevealConditionKind::SupplyReached.build();

        assert!(!condition.needs_revealed_flag());
        assert!(!condition.is_met(&snapshot(9_999, Some(true)), 10_000));
        assert!(condition.is_met(&snapshot(10_000, None), 10_000));
    }

    #[test]
    fn revealed_flag_ignores_supply() {
        let condition = RevealConditionKind::RevealedFlag.build();

        assert!(condition.needs_revealed_flag());
        assert!(condition.is_met(&snapshot(3, Some(true)), 10_000));
        assert!(!condition.is_met(&snapshot(10_000, Some(false)), 10_000));
        assert!(!condition.is_met(&snapshot(10_000, None), 10_000));
    }

    #[test]
    fn any_accepts_either_signal() {
        let condition = RevealConditionKind::Any.build();

        assert_eq!(condition.name(), "any");
        assert!(condition.needs_revealed_flag());
        assert!(condition.is_met(&snapshot(10_000, Some(false)), 10_000));
        assert!(condition.is_met(&snapshot(1, Some(true)), 10_000));
        assert!(!condition.is_met(&snapshot(1, Some(false)), 10_000));
    }
}
