//! Property-based tests for result shaping using proptest

use proptest::prelude::*;
use rust_database_helper::prelude::*;
use rust_database_helper::{row, ResultShaper};
use std::collections::HashMap;

fn character_rows() -> impl Strategy<Value = Vec<DatabaseRow>> {
    prop::collection::vec(("[a-d]{1,2}", "[A-Z][a-z]{0,6}", any::<i64>()), 0..40).prop_map(
        |tuples| {
            tuples
                .into_iter()
                .map(|(id, name, score)| {
                    row([
                        ("id", DatabaseValue::from(id)),
                        ("name", DatabaseValue::from(name)),
                        ("score", DatabaseValue::from(score)),
                    ])
                })
                .collect()
        },
    )
}

// ============================================================================
// Unkeyed Shaping
// ============================================================================

proptest! {
    /// Unkeyed shaping keeps every row in order
    #[test]
    fn test_unkeyed_preserves_rows(rows in character_rows()) {
        let shaped = ResultShaper::new(FieldSpec::None, FieldSpec::None).shape(rows.clone());
        let list = shaped.into_list().unwrap();
        prop_assert_eq!(list.len(), rows.len());
        for (record, original) in list.iter().zip(&rows) {
            prop_assert_eq!(record.as_row(), Some(original));
        }
    }

    /// A single value column yields that column for every row
    #[test]
    fn test_unkeyed_single_value(rows in character_rows()) {
        let shaped = ResultShaper::new(FieldSpec::None, "score").shape(rows.clone());
        let list = shaped.into_list().unwrap();
        prop_assert_eq!(list.len(), rows.len());
        for (record, original) in list.iter().zip(&rows) {
            prop_assert_eq!(record.as_scalar(), original.get("score"));
        }
    }
}

// ============================================================================
// Keyed Shaping
// ============================================================================

proptest! {
    /// One entry per distinct key, holding the last row with that key
    #[test]
    fn test_keyed_last_row_wins(rows in character_rows()) {
        let shaped = ResultShaper::new("id", FieldSpec::None).shape(rows.clone());
        let map = shaped.into_keyed().unwrap();

        let mut expected: HashMap<String, &DatabaseRow> = HashMap::new();
        for r in &rows {
            expected.insert(r["id"].as_string(), r);
        }
        prop_assert_eq!(map.len(), expected.len());
        for (key, record) in &map {
            prop_assert_eq!(record.as_row(), Some(expected[key]));
        }
    }

    /// Keys keep the order in which they first appeared
    #[test]
    fn test_keyed_first_seen_order(rows in character_rows()) {
        let shaped = ResultShaper::new("id", "name").shape(rows.clone());
        let keys: Vec<String> = shaped.into_keyed().unwrap().into_keys().collect();

        let mut first_seen: Vec<String> = Vec::new();
        for r in &rows {
            let id = r["id"].as_string();
            if !first_seen.contains(&id) {
                first_seen.push(id);
            }
        }
        prop_assert_eq!(keys, first_seen);
    }

    /// Composite keys concatenate the key columns in order
    #[test]
    fn test_composite_key_concatenates(rows in character_rows()) {
        let shaper = ResultShaper::new(["id", "name"], FieldSpec::None);
        for r in &rows {
            let expected = format!("{}{}", r["id"].as_string(), r["name"].as_string());
            prop_assert_eq!(shaper.composite_key(r), Some(expected));
        }
    }

    /// Shaping in two batches matches shaping everything at once
    #[test]
    fn test_shape_into_matches_single_pass(rows in character_rows(), split in 0usize..40) {
        let split = split.min(rows.len());
        let shaper = ResultShaper::new("id", ["score"]);

        let mut batched = shaper.empty();
        shaper.shape_into(rows[..split].to_vec(), &mut batched).unwrap();
        shaper.shape_into(rows[split..].to_vec(), &mut batched).unwrap();

        prop_assert_eq!(batched, shaper.shape(rows));
    }
}
