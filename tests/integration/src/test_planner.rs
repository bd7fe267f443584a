//! Planner scenarios executed against the in-memory store.

#[cfg(test)]
mod tests {
    use ruststack_odm_core::{Condition, ItemUpdate, OdmError, ReadOptions, RequestField};
    use ruststack_odm_model::input::{QueryInput, UpdateItemInput};
    use ruststack_odm_model::{AttributeValue, ReturnValue, StoreOperation};
    use serde_json::{Map, Value, json};

    use crate::orders_fixture;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_should_put_then_get_item_by_exact_key() {
        let (planner, store) = orders_fixture();

        planner
            .plan_put(
                &object(json!({"pk": "USER#1", "sk": "PROFILE", "name": "Ada"})),
                &[Condition::is_null("pk")],
            )
            .unwrap()
            .finalize()
            .prepare(&store)
            .put_item()
            .unwrap();
        assert_eq!(store.len(), 1);

        let plan = planner
            .plan_read(
                &[Condition::eq("pk", "USER#1"), Condition::eq("sk", "PROFILE")],
                &ReadOptions::new(),
            )
            .unwrap();
        assert_eq!(plan.operation, StoreOperation::GetItem);
        let response = plan.execute(&store).unwrap();
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0]["name"], AttributeValue::S("Ada".to_owned()));
        assert_eq!(
            store.operations(),
            vec![StoreOperation::PutItem, StoreOperation::GetItem]
        );
    }

    #[test]
    fn test_should_reject_duplicate_put_with_existence_guard() {
        let (planner, store) = orders_fixture();
        let item = object(json!({"pk": "USER#1", "sk": "PROFILE"}));
        let guard = [Condition::is_null("pk")];

        let put = planner.plan_put(&item, &guard).unwrap().finalize();
        put.clone().prepare(&store).put_item().unwrap();
        let err = put.prepare(&store).put_item().unwrap_err();
        assert!(err.is_conditional_check_failed());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_should_delete_and_return_old_item() {
        let (planner, store) = orders_fixture();
        let key = object(json!({"pk": "USER#1", "sk": "PROFILE"}));
        planner
            .plan_put(&key, &[])
            .unwrap()
            .finalize()
            .prepare(&store)
            .put_item()
            .unwrap();

        let mut delete = planner
            .plan_delete(&key, &[Condition::not_null("pk")])
            .unwrap();
        delete.set_return_values(ReturnValue::AllOld);
        let response = delete.finalize().prepare(&store).delete_item().unwrap();

        assert!(store.is_empty());
        assert_eq!(
            response.attributes["pk"],
            AttributeValue::S("USER#1".to_owned())
        );
    }

    #[test]
    fn test_should_send_query_payload_with_fresh_placeholders() {
        let (planner, store) = orders_fixture();
        let options = ReadOptions::new().with_limit(5).project(["total"]);

        for _ in 0..2 {
            let plan = planner
                .plan_read(
                    &[
                        Condition::eq("gsi_pk", "STATUS#open"),
                        Condition::between("gsi_sk", "2024-01", "2024-12"),
                        Condition::gt("total", 50),
                    ],
                    &options,
                )
                .unwrap();
            plan.execute(&store).unwrap();

            let sent: QueryInput = store.last_request().unwrap().into_input().unwrap();
            assert_eq!(sent.index_name.as_deref(), Some("GSI1"));
            assert_eq!(
                sent.key_condition_expression.as_deref(),
                Some("#gsi_pk = :a1 AND (#gsi_sk BETWEEN :a2 AND :a3)")
            );
            assert_eq!(sent.filter_expression.as_deref(), Some("#total > :a4"));
            assert_eq!(sent.projection_expression.as_deref(), Some("#total"));
            assert_eq!(sent.limit, Some(5));
            assert_eq!(sent.expression_attribute_values.len(), 4);
        }
        assert_eq!(
            store.operations(),
            vec![StoreOperation::Query, StoreOperation::Query]
        );
    }

    #[test]
    fn test_should_build_update_payload() {
        let (planner, store) = orders_fixture();
        let request = planner
            .plan_update(
                &object(json!({"pk": "USER#1", "sk": "PROFILE"})),
                &ItemUpdate::new()
                    .set("address.city", "Oslo")
                    .set("visits", 3)
                    .remove("legacy_flag")
                    .returning(ReturnValue::UpdatedNew),
            )
            .unwrap();

        let input: UpdateItemInput = request.finalize().into_input().unwrap();
        assert_eq!(
            input.update_expression.as_deref(),
            Some("SET #address.#city = :address_city, #visits = :visits REMOVE #legacy_flag")
        );
        assert_eq!(input.expression_attribute_names["#city"], "city");
        assert_eq!(
            input.expression_attribute_values[":visits"],
            AttributeValue::N("3".to_owned())
        );

        let err = request.finalize().prepare(&store).update_item().unwrap_err();
        assert!(matches!(err, OdmError::Store(_)));
    }

    #[test]
    fn test_should_scan_with_every_condition_in_filter() {
        let (planner, store) = orders_fixture();
        let plan = planner
            .plan_read(
                &[
                    Condition::eq("pk", "USER#1"),
                    Condition::is_in("status", ["open", "held"]).or(),
                ],
                &ReadOptions::new().consistent(true),
            )
            .unwrap();
        assert_eq!(plan.operation, StoreOperation::Scan);
        let payload = plan.finalize();
        assert_eq!(
            payload.get_str(RequestField::FilterExpression),
            Some("#pk = :a1 OR #status IN (:a2, :a3)")
        );
        assert_eq!(payload.get(RequestField::ConsistentRead), Some(&json!(true)));
        plan.execute(&store).unwrap();
    }
}
