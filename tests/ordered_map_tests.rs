use shareurl::{OrderedMap, Value};

#[cfg(test)]
mod ordered_map_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        // keys keep the position of their first set; values are the last one set
        #[test]
        fn test_first_occurrence_order_and_last_value(
            ops in proptest::collection::vec(("k[0-6]", any::<i64>()), 0..40)
        ) {
            let mut map = OrderedMap::new();
            for (key, value) in &ops {
                map.set(key.as_str(), *value);
            }

            let mut expected_order: Vec<&str> = Vec::new();
            for (key, _) in &ops {
                if !expected_order.contains(&key.as_str()) {
                    expected_order.push(key);
                }
            }
            prop_assert_eq!(map.keys().collect::<Vec<_>>(), expected_order.clone());
            prop_assert_eq!(map.len(), expected_order.len());

            for key in &expected_order {
                let last = ops.iter().rev().find(|(k, _)| k == key).map(|(_, v)| *v);
                prop_assert_eq!(map.get(key).and_then(Value::as_i64), last);
            }
        }

        #[test]
        fn test_serialized_keys_follow_iteration_order(
            ops in proptest::collection::vec(("[a-z]{1,3}", any::<bool>()), 1..20)
        ) {
            let map: OrderedMap = ops.iter().map(|(k, v)| (k.as_str(), *v)).collect();
            let json = map.to_json_string().unwrap();
            let reparsed = OrderedMap::from_json_str(&json).unwrap();
            prop_assert_eq!(
                reparsed.keys().collect::<Vec<_>>(),
                map.keys().collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn test_delete_then_reinsert_moves_to_end() {
        let mut map: OrderedMap = [("a", 1i64), ("b", 2), ("c", 3)].into_iter().collect();
        assert_eq!(map.delete("a"), Some(Value::Int(1)));
        map.set("a", 4i64);
        assert_eq!(map.to_json_string().unwrap(), r#"{"b":2,"c":3,"a":4}"#);
    }

    #[test]
    fn test_json_document_order_survives_round_trip() {
        let json = r#"{"z":1,"a":{"y":true,"b":[1,"x",null]},"m":"s"}"#;
        let map = OrderedMap::from_json_str(json).unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["z", "a", "m"]);
        assert_eq!(map.to_json_string().unwrap(), json);
    }
}
