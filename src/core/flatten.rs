use crate::domain::model::{FlatTable, Record, TypeMap};
use serde_json::Value;

pub const LOCATION_TYPE: &str = "location";

/// Scalar pieces of a composite location value. Every field is optional;
/// a missing or unparseable source key reads as null, never an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationComponents {
    pub latitude: Option<Value>,
    pub longitude: Option<Value>,
    pub address: Option<Value>,
    pub city: Option<Value>,
    pub state: Option<Value>,
    pub zip: Option<Value>,
}

impl LocationComponents {
    /// Component keys in merge order.
    pub const KEYS: [&'static str; 6] = ["latitude", "longitude", "address", "city", "state", "zip"];

    fn component(&self, key: &str) -> Value {
        let slot = match key {
            "latitude" => self.latitude.as_ref(),
            "longitude" => self.longitude.as_ref(),
            "address" => self.address.as_ref(),
            "city" => self.city.as_ref(),
            "state" => self.state.as_ref(),
            "zip" => self.zip.as_ref(),
            _ => None,
        };
        slot.cloned().unwrap_or(Value::Null)
    }
}

fn non_null(value: Option<&Value>) -> Option<Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(value) => Some(value.clone()),
    }
}

/// Decompose a raw location value of the form
///
/// ```json
/// {"human_address": "{\"address\": \"10230 VISTADALE DR\", \"city\": \"DALLAS\",
///                     \"state\": \"TX\", \"zip\": \"75238\"}",
///  "latitude": "32.888392",
///  "longitude": "-96.707833"}
/// ```
///
/// into its scalar components. The address bundle may also arrive as a nested
/// object, or already expanded on the location object itself.
pub fn parse_location(value: Option<&Value>) -> LocationComponents {
    let mut parsed = LocationComponents::default();
    let Some(Value::Object(location)) = value else {
        return parsed;
    };

    parsed.latitude = non_null(location.get("latitude"));
    parsed.longitude = non_null(location.get("longitude"));

    // Some portals return the address fields pre-expanded on the location
    // object; the human_address bundle below takes precedence when present.
    parsed.address = non_null(location.get("address"));
    parsed.city = non_null(location.get("city"));
    parsed.state = non_null(location.get("state"));
    parsed.zip = non_null(location.get("zip"));

    if let Some(bundle) = location.get("human_address") {
        let decoded = match bundle {
            Value::String(encoded) => serde_json::from_str(encoded).unwrap_or(Value::Null),
            other => other.clone(),
        };
        if let Value::Object(address) = decoded {
            if let Some(value) = non_null(address.get("address")) {
                parsed.address = Some(value);
            }
            if let Some(value) = non_null(address.get("city")) {
                parsed.city = Some(value);
            }
            if let Some(value) = non_null(address.get("state")) {
                parsed.state = Some(value);
            }
            if let Some(value) = non_null(address.get("zip")) {
                parsed.zip = Some(value);
            }
        }
    }

    parsed
}

/// Flatten raw result rows into a rectangular table.
///
/// Every column typed `location` in the type map that occurs in the record
/// set is replaced by its scalar components. Component keys colliding with an
/// existing column name (including keys introduced by an earlier location
/// column) get a `_<location_column>` suffix. Location columns declared in
/// the type map but absent from the results are skipped.
pub fn flatten_results(raw_records: Vec<Record>, dtypes: &TypeMap) -> FlatTable {
    let mut rows = raw_records;

    // Union of keys across rows, first-encountered order. Row maps are
    // unordered, so keys are visited sorted to keep the order deterministic.
    let mut columns: Vec<String> = Vec::new();
    for row in &rows {
        let mut keys: Vec<&String> = row.data.keys().collect();
        keys.sort();
        for key in keys {
            if !columns.iter().any(|column| column == key) {
                columns.push(key.clone());
            }
        }
    }

    let location_columns: Vec<String> = columns
        .iter()
        .filter(|column| dtypes.get(column.as_str()).map(String::as_str) == Some(LOCATION_TYPE))
        .cloned()
        .collect();

    for column in location_columns {
        let components: Vec<LocationComponents> = rows
            .iter_mut()
            .map(|row| parse_location(row.data.remove(&column).as_ref()))
            .collect();
        columns.retain(|existing| existing != &column);

        for key in LocationComponents::KEYS {
            let out_key = if columns.iter().any(|existing| existing == key) {
                format!("{}_{}", key, column)
            } else {
                key.to_string()
            };
            if !columns.contains(&out_key) {
                columns.push(out_key.clone());
            }
            for (row, parsed) in rows.iter_mut().zip(&components) {
                row.data.insert(out_key.clone(), parsed.component(key));
            }
        }
    }

    FlatTable { columns, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(fields) => Record {
                data: fields.into_iter().collect(),
            },
            other => panic!("expected a JSON object, got {}", other),
        }
    }

    fn dtypes(entries: &[(&str, &str)]) -> TypeMap {
        entries
            .iter()
            .map(|(field, dtype)| (field.to_string(), dtype.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_location_with_encoded_human_address() {
        let location = json!({
            "latitude": "32.888392",
            "longitude": "-96.707833",
            "human_address": "{\"address\": \"10230 VISTADALE DR\", \"city\": \"DALLAS\", \"state\": \"TX\", \"zip\": \"75238\"}"
        });

        let parsed = parse_location(Some(&location));

        assert_eq!(parsed.latitude, Some(json!("32.888392")));
        assert_eq!(parsed.longitude, Some(json!("-96.707833")));
        assert_eq!(parsed.address, Some(json!("10230 VISTADALE DR")));
        assert_eq!(parsed.city, Some(json!("DALLAS")));
        assert_eq!(parsed.state, Some(json!("TX")));
        assert_eq!(parsed.zip, Some(json!("75238")));
    }

    #[test]
    fn test_parse_location_with_nested_human_address() {
        let location = json!({
            "latitude": "47.6",
            "human_address": {"address": "400 BROAD ST", "city": "SEATTLE"}
        });

        let parsed = parse_location(Some(&location));

        assert_eq!(parsed.latitude, Some(json!("47.6")));
        assert_eq!(parsed.longitude, None);
        assert_eq!(parsed.address, Some(json!("400 BROAD ST")));
        assert_eq!(parsed.city, Some(json!("SEATTLE")));
        assert_eq!(parsed.state, None);
        assert_eq!(parsed.zip, None);
    }

    #[test]
    fn test_parse_location_with_expanded_address_keys() {
        let location = json!({
            "latitude": "32.8",
            "address": "1 MAIN ST",
            "city": "DALLAS",
            "state": "TX",
            "zip": "75201"
        });

        let parsed = parse_location(Some(&location));

        assert_eq!(parsed.address, Some(json!("1 MAIN ST")));
        assert_eq!(parsed.city, Some(json!("DALLAS")));
        assert_eq!(parsed.state, Some(json!("TX")));
        assert_eq!(parsed.zip, Some(json!("75201")));
    }

    #[test]
    fn test_parse_location_null_and_missing() {
        assert_eq!(parse_location(None), LocationComponents::default());
        assert_eq!(
            parse_location(Some(&Value::Null)),
            LocationComponents::default()
        );
        assert_eq!(
            parse_location(Some(&json!("not an object"))),
            LocationComponents::default()
        );
    }

    #[test]
    fn test_parse_location_malformed_human_address_yields_nulls() {
        let location = json!({
            "latitude": "32.8",
            "human_address": "{not valid json"
        });

        let parsed = parse_location(Some(&location));

        assert_eq!(parsed.latitude, Some(json!("32.8")));
        assert_eq!(parsed.address, None);
        assert_eq!(parsed.city, None);
        assert_eq!(parsed.state, None);
        assert_eq!(parsed.zip, None);
    }

    #[test]
    fn test_flatten_expands_location_column() {
        let rows = vec![record(json!({
            "incident_id": "1",
            "loc": {
                "latitude": "32.8",
                "longitude": "-96.7",
                "human_address": "{\"address\": \"1 MAIN ST\", \"city\": \"DALLAS\", \"state\": \"TX\", \"zip\": \"75201\"}"
            }
        }))];
        let dtypes = dtypes(&[("incident_id", "text"), ("loc", "location")]);

        let table = flatten_results(rows, &dtypes);

        assert_eq!(
            table.columns,
            vec!["incident_id", "latitude", "longitude", "address", "city", "state", "zip"]
        );
        let row = &table.rows[0].data;
        assert_eq!(row.get("incident_id"), Some(&json!("1")));
        assert_eq!(row.get("latitude"), Some(&json!("32.8")));
        assert_eq!(row.get("longitude"), Some(&json!("-96.7")));
        assert_eq!(row.get("address"), Some(&json!("1 MAIN ST")));
        assert_eq!(row.get("city"), Some(&json!("DALLAS")));
        assert_eq!(row.get("state"), Some(&json!("TX")));
        assert_eq!(row.get("zip"), Some(&json!("75201")));
        assert!(!row.contains_key("loc"));
    }

    #[test]
    fn test_flatten_null_location_yields_null_components() {
        let rows = vec![record(json!({"incident_id": "2", "loc": null}))];
        let dtypes = dtypes(&[("incident_id", "text"), ("loc", "location")]);

        let table = flatten_results(rows, &dtypes);

        let row = &table.rows[0].data;
        assert_eq!(row.get("incident_id"), Some(&json!("2")));
        for key in LocationComponents::KEYS {
            assert_eq!(row.get(key), Some(&Value::Null), "component {}", key);
        }
        assert!(!row.contains_key("loc"));
    }

    #[test]
    fn test_flatten_keeps_table_rectangular() {
        let rows = vec![
            record(json!({
                "id": "1",
                "loc": {"latitude": "1.0", "longitude": "2.0"}
            })),
            // No loc key at all for this row.
            record(json!({"id": "2"})),
        ];
        let dtypes = dtypes(&[("id", "text"), ("loc", "location")]);

        let table = flatten_results(rows, &dtypes);

        assert_eq!(table.rows.len(), 2);
        for row in &table.rows {
            for key in LocationComponents::KEYS {
                assert!(row.data.contains_key(key), "missing component {}", key);
            }
        }
        assert_eq!(table.rows[1].data.get("latitude"), Some(&Value::Null));
    }

    #[test]
    fn test_flatten_without_location_columns_is_identity() {
        let rows = vec![
            record(json!({"id": "1", "name": "a"})),
            record(json!({"id": "2", "name": "b"})),
        ];
        let dtypes = dtypes(&[("id", "text"), ("name", "text")]);

        let first = flatten_results(rows.clone(), &dtypes);
        assert_eq!(first.columns, vec!["id", "name"]);
        for (flat, original) in first.rows.iter().zip(&rows) {
            assert_eq!(flat.data, original.data);
        }

        // Running the flattener again over already-flat rows changes nothing.
        let second = flatten_results(first.rows.clone(), &dtypes);
        assert_eq!(second.columns, first.columns);
        for (again, once) in second.rows.iter().zip(&first.rows) {
            assert_eq!(again.data, once.data);
        }
    }

    #[test]
    fn test_flatten_suffixes_colliding_component_keys() {
        let rows = vec![record(json!({
            "address": "hand-entered street",
            "location": {
                "latitude": "32.8",
                "human_address": "{\"address\": \"1 MAIN ST\", \"city\": \"DALLAS\"}"
            }
        }))];
        let dtypes = dtypes(&[("address", "text"), ("location", "location")]);

        let table = flatten_results(rows, &dtypes);

        let row = &table.rows[0].data;
        assert_eq!(row.get("address"), Some(&json!("hand-entered street")));
        assert_eq!(row.get("address_location"), Some(&json!("1 MAIN ST")));
        assert_eq!(row.get("city"), Some(&json!("DALLAS")));
        assert!(table.columns.contains(&"address_location".to_string()));
    }

    #[test]
    fn test_flatten_two_location_columns_chain_suffixes() {
        let rows = vec![record(json!({
            "id": "1",
            "home": {
                "latitude": "1.0",
                "human_address": "{\"city\": \"DALLAS\"}"
            },
            "work": {
                "latitude": "2.0",
                "human_address": "{\"city\": \"PLANO\"}"
            }
        }))];
        let dtypes = dtypes(&[
            ("id", "text"),
            ("home", "location"),
            ("work", "location"),
        ]);

        let table = flatten_results(rows, &dtypes);

        let row = &table.rows[0].data;
        // home is processed first (sorted key order), work's components collide.
        assert_eq!(row.get("latitude"), Some(&json!("1.0")));
        assert_eq!(row.get("city"), Some(&json!("DALLAS")));
        assert_eq!(row.get("latitude_work"), Some(&json!("2.0")));
        assert_eq!(row.get("city_work"), Some(&json!("PLANO")));
    }

    #[test]
    fn test_flatten_skips_declared_but_absent_location_column() {
        let rows = vec![record(json!({"id": "1"}))];
        let dtypes = dtypes(&[("id", "text"), ("loc", "location")]);

        let table = flatten_results(rows, &dtypes);

        assert_eq!(table.columns, vec!["id"]);
        assert_eq!(table.rows[0].data.len(), 1);
    }

    #[test]
    fn test_flatten_ignores_undeclared_columns() {
        // A column in the results but not the type map passes through as-is,
        // even when it looks like a location object.
        let rows = vec![record(json!({
            "id": "1",
            "mystery": {"latitude": "1.0"}
        }))];
        let dtypes = dtypes(&[("id", "text")]);

        let table = flatten_results(rows, &dtypes);

        assert_eq!(table.columns, vec!["id", "mystery"]);
        assert_eq!(
            table.rows[0].data.get("mystery"),
            Some(&json!({"latitude": "1.0"}))
        );
    }

    #[test]
    fn test_flatten_empty_records() {
        let table = flatten_results(Vec::new(), &dtypes(&[("loc", "location")]));

        assert!(table.columns.is_empty());
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_flatten_absent_key_reads_as_null() {
        let rows = vec![
            record(json!({"id": "1", "note": "x"})),
            record(json!({"id": "2"})),
        ];
        let table = flatten_results(rows, &HashMap::new());

        assert_eq!(table.columns, vec!["id", "note"]);
        assert_eq!(table.rows[1].data.get("note"), None);
    }
}
