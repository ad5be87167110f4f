use core_types::{Strategy, StrategyId};
use std::collections::HashMap;

/// The configured set of strategies, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct StrategyCatalog {
    strategies: Vec<Strategy>,
    index: HashMap<StrategyId, usize>,
}

impl StrategyCatalog {
    /// Builds a catalog. A repeated id keeps its first definition.
    pub fn new(strategies: impl IntoIterator<Item = Strategy>) -> Self {
        let mut catalog = Self::default();
        for strategy in strategies {
            if catalog.index.contains_key(&strategy.id) {
                tracing::warn!(
                    strategy_id = %strategy.id,
                    "Duplicate strategy id in catalog; keeping the first."
                );
                continue;
            }
            catalog.index.insert(strategy.id.clone(), catalog.strategies.len());
            catalog.strategies.push(strategy);
        }
        catalog
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn get(&self, id: &StrategyId) -> Option<&Strategy> {
        self.index.get(id).map(|&i| &self.strategies[i])
    }

    /// Strategies whose name contains `query`, ignoring case, in catalog order.
    /// Only the empty query matches everything; whitespace is matched as given.
    pub fn search(&self, query: &str) -> Vec<Strategy> {
        let needle = query.to_lowercase();
        self.strategies
            .iter()
            .filter(|s| needle.is_empty() || s.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy(id: &str, name: &str) -> Strategy {
        Strategy {
            id: StrategyId::new(id).unwrap(),
            name: name.to_string(),
            description: String::new(),
        }
    }

    fn catalog() -> StrategyCatalog {
        StrategyCatalog::new([
            strategy("momentum-pro", "Momentum PRO"),
            strategy("mean-revert", "Mean Reversion"),
            strategy("grid", "Grid Trader Pro"),
            strategy("scalper", "Scalper"),
        ])
    }

    fn ids(strategies: &[Strategy]) -> Vec<&str> {
        strategies.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn empty_query_returns_catalog_in_order() {
        assert_eq!(
            ids(&catalog().search("")),
            vec!["momentum-pro", "mean-revert", "grid", "scalper"]
        );
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        assert_eq!(ids(&catalog().search("pro")), vec!["momentum-pro", "grid"]);
        assert_eq!(ids(&catalog().search("REVERS")), vec!["mean-revert"]);
    }

    #[test]
    fn surrounding_whitespace_is_part_of_the_query() {
        let catalog = StrategyCatalog::new([
            strategy("momentum-pro", "Momentum Pro"),
            strategy("prolific", "Prolific"),
            strategy("scalper", "Scalper"),
        ]);
        assert_eq!(ids(&catalog.search(" pro")), vec!["momentum-pro"]);
        assert_eq!(ids(&catalog.search(" ")), vec!["momentum-pro"]);
    }

    #[test]
    fn unmatched_query_is_empty() {
        assert!(catalog().search("XYZ-no-match").is_empty());
    }

    #[test]
    fn duplicate_ids_keep_first_definition() {
        let catalog = StrategyCatalog::new([strategy("a", "First"), strategy("a", "Second")]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(&StrategyId::new("a").unwrap()).unwrap().name, "First");
    }
}
