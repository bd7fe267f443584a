//! Index selection and key/filter splitting.
//!
//! Given a condition list and a document's [`IndexCatalog`], decides whether
//! the request can be answered by a keyed query, which index serves it, and
//! which conditions go into the key condition versus the filter.
//!
//! Selection is first-match: the primary index is tried first, then the
//! secondary indexes in declaration order, and the first one whose partition
//! key is pinned by equality wins. Reordering index declarations can change
//! which index a request uses.
//!
//! Only top-level predicates are considered for keys. Nested groups always
//! stay in the filter, and a list that joins any top-level condition with
//! `OR` is never split, since the key condition would otherwise narrow away
//! items the `OR` branch should match.

use ruststack_odm_model::KeyType;
use tracing::debug;

use crate::expression::OperatorKind;
use crate::index::{IndexCatalog, SelectedIndex};
use crate::predicate::{BooleanOperator, Condition, Predicate};

/// Entry point: `ConditionAnalyzer::analyze(&conditions).on(&catalog)`.
#[derive(Debug, Clone, Copy)]
pub struct PendingAnalysis<'a> {
    conditions: &'a [Condition],
}

impl<'a> PendingAnalysis<'a> {
    /// Bind the catalog of the document type being queried.
    #[must_use]
    pub fn on(self, catalog: &'a IndexCatalog) -> ConditionAnalyzer<'a> {
        ConditionAnalyzer {
            conditions: self.conditions,
            catalog,
            hint: None,
        }
    }
}

/// Read-only analysis of one condition list against one catalog.
#[derive(Debug, Clone, Copy)]
pub struct ConditionAnalyzer<'a> {
    conditions: &'a [Condition],
    catalog: &'a IndexCatalog,
    hint: Option<&'a str>,
}

impl<'a> ConditionAnalyzer<'a> {
    /// Start an analysis of `conditions`.
    #[must_use]
    pub fn analyze(conditions: &'a [Condition]) -> PendingAnalysis<'a> {
        PendingAnalysis { conditions }
    }

    /// Restrict selection to the index named `hint` (`""` is the primary
    /// index). `None` lets every index compete.
    #[must_use]
    pub fn with_index(mut self, hint: Option<&'a str>) -> Self {
        self.hint = hint;
        self
    }

    /// Conditions under analysis.
    #[must_use]
    pub fn conditions(&self) -> &'a [Condition] {
        self.conditions
    }

    /// Index hint, if any.
    #[must_use]
    pub fn hint(&self) -> Option<&'a str> {
        self.hint
    }

    /// Conditions on the primary key, when they form a valid key condition
    /// for the primary index.
    ///
    /// `None` unless the partition key is pinned by equality and any sort
    /// key predicates use range-capable kinds.
    #[must_use]
    pub fn identifier_conditions(&self) -> Option<Vec<Condition>> {
        if !self.splittable() {
            return None;
        }
        let primary = self.catalog.primary();
        if !self.column_capable(&primary.hash_attribute, KeyType::Hash) {
            return None;
        }
        if let Some(range) = primary.range_attribute.as_deref() {
            if self.has_column(range) && !self.column_capable(range, KeyType::Range) {
                return None;
            }
        }
        let positions =
            self.first_positions(&primary.hash_attribute, primary.range_attribute.as_deref());
        Some(self.pick(&positions))
    }

    /// First index whose key the conditions can drive, or `None` when the
    /// request has to scan.
    #[must_use]
    pub fn selected_index(&self) -> Option<SelectedIndex> {
        if !self.splittable() {
            debug!("top-level OR present, no index selected");
            return None;
        }
        let selected = self
            .catalog
            .iter()
            .filter(|index| self.hint.is_none_or(|hint| hint == index.name))
            .find(|index| self.column_capable(&index.hash_attribute, KeyType::Hash))
            .map(|index| SelectedIndex {
                name: index.name.clone(),
                hash_attribute: index.hash_attribute.clone(),
                range_attribute: index
                    .range_attribute
                    .as_deref()
                    .filter(|range| self.column_capable(range, KeyType::Range))
                    .map(str::to_owned),
            });
        match &selected {
            Some(index) => debug!(
                index = %index.name,
                hash = %index.hash_attribute,
                range = ?index.range_attribute,
                "selected index"
            ),
            None => debug!(hint = ?self.hint, "no eligible index, falling back to scan"),
        }
        selected
    }

    /// Same as [`ConditionAnalyzer::selected_index`].
    #[must_use]
    pub fn index(&self) -> Option<SelectedIndex> {
        self.selected_index()
    }

    /// Conditions that go into the key condition, in their original order.
    #[must_use]
    pub fn key_conditions(&self) -> Vec<Condition> {
        self.pick(&self.key_positions())
    }

    /// Every condition not in [`ConditionAnalyzer::key_conditions`], in its
    /// original order.
    #[must_use]
    pub fn filter_conditions(&self) -> Vec<Condition> {
        let keys = self.key_positions();
        self.conditions
            .iter()
            .enumerate()
            .filter(|(i, _)| !keys.contains(i))
            .map(|(_, c)| c.clone())
            .collect()
    }

    /// Whether the conditions pin the primary key by equality only, so a
    /// single-item read could serve the request.
    #[must_use]
    pub fn is_exact_search(&self) -> bool {
        !self.conditions.is_empty()
            && self
                .identifier_conditions()
                .is_some_and(|keys| !keys.is_empty())
            && self
                .conditions
                .iter()
                .all(|c| c.kind() == Some(OperatorKind::Eq))
    }

    fn key_positions(&self) -> Vec<usize> {
        match self.selected_index() {
            Some(index) => {
                self.first_positions(&index.hash_attribute, index.range_attribute.as_deref())
            }
            None => {
                if self.identifier_conditions().is_none() {
                    return Vec::new();
                }
                let primary = self.catalog.primary();
                self.first_positions(&primary.hash_attribute, primary.range_attribute.as_deref())
            }
        }
    }

    fn splittable(&self) -> bool {
        self.conditions
            .iter()
            .skip(1)
            .all(|c| c.boolean() == BooleanOperator::And)
    }

    fn predicates(&self) -> impl Iterator<Item = (usize, &'a Predicate)> {
        self.conditions
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_predicate().map(|p| (i, p)))
    }

    fn has_column(&self, column: &str) -> bool {
        self.predicates().any(|(_, p)| p.column == column)
    }

    /// At least one predicate on `column`, and every one of them usable in
    /// the given key role.
    fn column_capable(&self, column: &str, role: KeyType) -> bool {
        let mut on_column = self.predicates().filter(|(_, p)| p.column == column).peekable();
        on_column.peek().is_some() && on_column.all(|(_, p)| p.kind.is_query_capable(role))
    }

    /// Position of the first predicate on `hash` and on `range`, ascending.
    ///
    /// A key condition allows one predicate per key attribute; any further
    /// predicate on the same attribute belongs to the filter.
    fn first_positions(&self, hash: &str, range: Option<&str>) -> Vec<usize> {
        let first_on = |column: &str| {
            self.predicates()
                .find(|(_, p)| p.column == column)
                .map(|(i, _)| i)
        };
        let mut positions: Vec<usize> = std::iter::once(first_on(hash))
            .chain(range.map(first_on))
            .flatten()
            .collect();
        positions.sort_unstable();
        positions
    }

    fn pick(&self, positions: &[usize]) -> Vec<Condition> {
        positions.iter().map(|&i| self.conditions[i].clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use ruststack_odm_model::IndexDescriptor;

    use super::*;

    fn catalog() -> IndexCatalog {
        IndexCatalog::new(IndexDescriptor::primary("pk", Some("sk")))
            .with_secondary(IndexDescriptor::secondary("GSI1", "gsi_pk", Some("gsi_sk")))
    }

    #[test]
    fn test_should_prefer_primary_index_over_secondary() {
        let catalog = catalog().with_secondary(IndexDescriptor::secondary("GSI2", "pk", Some("sk")));
        let conditions = vec![Condition::eq("pk", "A"), Condition::eq("sk", "B")];
        let analyzer = ConditionAnalyzer::analyze(&conditions).on(&catalog);
        let index = analyzer.selected_index().unwrap();
        assert!(index.is_primary());
        assert_eq!(index.range_attribute.as_deref(), Some("sk"));
    }

    #[test]
    fn test_should_detect_exact_search() {
        let catalog = catalog();
        let exact = vec![Condition::eq("pk", "A"), Condition::eq("sk", "B")];
        assert!(ConditionAnalyzer::analyze(&exact).on(&catalog).is_exact_search());

        let ranged = vec![Condition::eq("pk", "A"), Condition::begins_with("sk", "B")];
        assert!(!ConditionAnalyzer::analyze(&ranged).on(&catalog).is_exact_search());

        let empty: Vec<Condition> = Vec::new();
        assert!(!ConditionAnalyzer::analyze(&empty).on(&catalog).is_exact_search());
    }

    #[test]
    fn test_should_split_key_and_filter_conditions() {
        let catalog = catalog();
        let conditions = vec![
            Condition::gt("price", 10),
            Condition::eq("pk", "USER#1"),
            Condition::begins_with("sk", "ORDER#"),
            Condition::nested(vec![Condition::eq("pk", "X")]),
        ];
        let analyzer = ConditionAnalyzer::analyze(&conditions).on(&catalog);
        assert_eq!(
            analyzer.key_conditions(),
            vec![conditions[1].clone(), conditions[2].clone()]
        );
        assert_eq!(
            analyzer.filter_conditions(),
            vec![conditions[0].clone(), conditions[3].clone()]
        );
    }

    #[test]
    fn test_should_partition_conditions_exactly_once() {
        let catalog = catalog();
        let lists = vec![
            vec![],
            vec![Condition::eq("pk", 1), Condition::eq("pk", 1)],
            vec![Condition::eq("gsi_pk", 1), Condition::contains("gsi_sk", "x")],
            vec![Condition::ne("pk", 1), Condition::eq("sk", 2)],
            vec![Condition::eq("pk", 1), Condition::eq("sk", 2).or()],
            vec![Condition::eq("pk", 1), Condition::ge("sk", 1), Condition::le("sk", 5)],
        ];
        for conditions in lists {
            let analyzer = ConditionAnalyzer::analyze(&conditions).on(&catalog);
            let keys = analyzer.key_conditions();
            let filters = analyzer.filter_conditions();
            assert_eq!(keys.len() + filters.len(), conditions.len());
            let mut rebuilt = keys;
            rebuilt.extend(filters);
            for c in &conditions {
                let expected = conditions.iter().filter(|x| *x == c).count();
                assert_eq!(rebuilt.iter().filter(|x| *x == c).count(), expected);
            }
        }
    }

    #[test]
    fn test_should_keep_one_predicate_per_key_attribute() {
        let catalog = catalog();
        let conditions = vec![
            Condition::eq("pk", "A"),
            Condition::ge("sk", 1),
            Condition::eq("pk", "A"),
            Condition::le("sk", 5),
        ];
        let analyzer = ConditionAnalyzer::analyze(&conditions).on(&catalog);
        assert_eq!(
            analyzer.key_conditions(),
            vec![conditions[0].clone(), conditions[1].clone()]
        );
        assert_eq!(
            analyzer.filter_conditions(),
            vec![conditions[2].clone(), conditions[3].clone()]
        );
        assert_eq!(analyzer.identifier_conditions().unwrap().len(), 2);
    }

    #[test]
    fn test_should_demote_non_capable_range_predicate_to_filter() {
        let catalog = catalog();
        let conditions = vec![Condition::eq("pk", "A"), Condition::contains("sk", "x")];
        let analyzer = ConditionAnalyzer::analyze(&conditions).on(&catalog);
        let index = analyzer.selected_index().unwrap();
        assert!(index.is_primary());
        assert_eq!(index.range_attribute, None);
        assert_eq!(analyzer.key_conditions(), vec![conditions[0].clone()]);
        assert_eq!(analyzer.filter_conditions(), vec![conditions[1].clone()]);
        assert!(analyzer.identifier_conditions().is_none());
    }

    #[test]
    fn test_should_select_secondary_index() {
        let catalog = catalog();
        let conditions = vec![Condition::eq("gsi_pk", "T"), Condition::ge("gsi_sk", 5)];
        let analyzer = ConditionAnalyzer::analyze(&conditions).on(&catalog);
        let index = analyzer.selected_index().unwrap();
        assert_eq!(index.name, "GSI1");
        assert_eq!(analyzer.filter_conditions(), Vec::<Condition>::new());
        assert!(analyzer.identifier_conditions().is_none());
    }

    #[test]
    fn test_should_honor_index_hint() {
        let catalog = catalog().with_secondary(IndexDescriptor::secondary("ByPk", "pk", None));
        let conditions = vec![Condition::eq("pk", "A"), Condition::eq("sk", "B")];
        let analyzer = ConditionAnalyzer::analyze(&conditions)
            .on(&catalog)
            .with_index(Some("ByPk"));
        let index = analyzer.selected_index().unwrap();
        assert_eq!(index.name, "ByPk");
        assert_eq!(analyzer.key_conditions(), vec![conditions[0].clone()]);

        let missing = ConditionAnalyzer::analyze(&conditions)
            .on(&catalog)
            .with_index(Some("GSI1"));
        assert!(missing.selected_index().is_none());
    }

    #[test]
    fn test_should_fall_back_to_scan() {
        let catalog = catalog();
        let conditions = vec![Condition::gt("pk", "A"), Condition::eq("status", "open")];
        let analyzer = ConditionAnalyzer::analyze(&conditions).on(&catalog);
        assert!(analyzer.selected_index().is_none());
        assert!(analyzer.key_conditions().is_empty());
        assert_eq!(analyzer.filter_conditions(), conditions);
    }

    #[test]
    fn test_should_not_split_top_level_or() {
        let catalog = catalog();
        let conditions = vec![Condition::eq("pk", "A"), Condition::eq("status", "x").or()];
        let analyzer = ConditionAnalyzer::analyze(&conditions).on(&catalog);
        assert!(analyzer.selected_index().is_none());
        assert!(!analyzer.is_exact_search());
        assert_eq!(analyzer.filter_conditions().len(), 2);
    }

    #[test]
    fn test_should_ignore_nested_groups_for_key_selection() {
        let catalog = catalog();
        let conditions = vec![Condition::nested(vec![Condition::eq("pk", "A")])];
        let analyzer = ConditionAnalyzer::analyze(&conditions).on(&catalog);
        assert!(analyzer.selected_index().is_none());
    }
}
