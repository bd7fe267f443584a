//! Analyzer and compiler scenarios spanning several modules.

#[cfg(test)]
mod tests {
    use ruststack_odm_core::{
        BooleanOperator, Condition, ConditionAnalyzer, ConditionBuilder, ExpressionState,
        IndexCatalog, IndexMetadata,
    };
    use ruststack_odm_model::{AttributeValue, IndexDescriptor, KeySchemaElement};
    use serde_json::json;

    use crate::init_tracing;

    struct Orders;

    impl IndexMetadata for Orders {
        fn primary_index(&self) -> IndexDescriptor {
            IndexDescriptor::from_key_schema(
                "",
                &[KeySchemaElement::hash("pk"), KeySchemaElement::range("sk")],
            )
            .unwrap()
        }

        fn global_indexes(&self) -> Vec<IndexDescriptor> {
            vec![
                IndexDescriptor::secondary("ByStatus", "status", None),
                IndexDescriptor::secondary("ByStatusDate", "status", Some("created_at")),
            ]
        }
    }

    #[test]
    fn test_should_compile_primary_key_query_end_to_end() {
        init_tracing();
        let catalog = IndexCatalog::from_metadata(&Orders);
        let conditions = vec![
            Condition::eq("pk", "USER#1"),
            Condition::begins_with("sk", "ORDER#"),
        ];
        let analyzer = ConditionAnalyzer::analyze(&conditions).on(&catalog);

        assert!(analyzer.index().unwrap().is_primary());
        assert!(!analyzer.is_exact_search());

        let mut state = ExpressionState::new();
        let key = state
            .key_conditions()
            .compile(&analyzer.key_conditions())
            .unwrap();
        let filter = state
            .filter()
            .compile(&analyzer.filter_conditions())
            .unwrap();
        assert_eq!(key, "#pk = :a1 AND begins_with(#sk, :a2)");
        assert_eq!(filter, "");

        let (names, values) = state.into_attribute_maps();
        assert_eq!(names.len(), 2);
        assert_eq!(values[":a2"], AttributeValue::S("ORDER#".to_owned()));
    }

    #[test]
    fn test_should_pick_first_declared_secondary_index() {
        init_tracing();
        let catalog = IndexCatalog::from_metadata(&Orders);
        let conditions = vec![
            Condition::eq("status", "shipped"),
            Condition::ge("created_at", "2024-01-01"),
        ];
        let analyzer = ConditionAnalyzer::analyze(&conditions).on(&catalog);
        let index = analyzer.selected_index().unwrap();
        assert_eq!(index.name, "ByStatus");
        assert_eq!(index.range_attribute, None);
        assert_eq!(analyzer.filter_conditions(), vec![conditions[1].clone()]);

        let hinted = ConditionAnalyzer::analyze(&conditions)
            .on(&catalog)
            .with_index(Some("ByStatusDate"));
        assert_eq!(hinted.selected_index().unwrap().name, "ByStatusDate");
        assert!(hinted.filter_conditions().is_empty());
    }

    #[test]
    fn test_should_compile_builder_output_with_nested_groups() {
        init_tracing();
        let conditions = ConditionBuilder::new()
            .and("pk", "=", json!("USER#1"))
            .and("meta.tags", "contains", json!("rust"))
            .group(BooleanOperator::And, |g| {
                g.and("price", "between", json!([10, 20]))
                    .or("discount", "not_null", json!(null))
            })
            .build()
            .unwrap();

        let catalog = IndexCatalog::from_metadata(&Orders);
        let analyzer = ConditionAnalyzer::analyze(&conditions).on(&catalog);
        let mut state = ExpressionState::new();
        let key = state
            .key_conditions()
            .compile(&analyzer.key_conditions())
            .unwrap();
        let filter = state
            .filter()
            .compile(&analyzer.filter_conditions())
            .unwrap();

        assert_eq!(key, "#pk = :a1");
        assert_eq!(
            filter,
            "contains(#meta.#tags, :a2) AND ((#price BETWEEN :a3 AND :a4) OR attribute_exists(#discount))"
        );
        assert_eq!(state.values().len(), 4);
        assert_eq!(state.names().get("#tags"), Some("tags"));
    }

    #[test]
    fn test_should_keep_independent_states_isolated() {
        init_tracing();
        let mut first = ExpressionState::new();
        let mut second = ExpressionState::new();
        first
            .filter()
            .compile(&[Condition::eq("a", 1), Condition::eq("b", 2)])
            .unwrap();
        let expr = second.filter().compile(&[Condition::eq("c", 3)]).unwrap();
        assert_eq!(expr, "#c = :a1");
        assert!(second.names().get("#a").is_none());
    }
}
