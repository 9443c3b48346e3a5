//! Parsed records for the IECA API query and hierarchy payloads.
//!
//! The API returns loosely typed JSON: text fields are sometimes numbers or
//! null, child lists are sometimes null. Decoding normalizes those quirks so
//! the transform code only sees strings and vectors.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::DataError;

/// Full response of the `consulta/{id}` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryPayload {
    pub metainfo: QueryMetadata,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hierarchies: Vec<HierarchyRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub measures: Vec<Measure>,
    #[serde(default)]
    pub data: Option<Vec<Vec<Cell>>>,
}

impl QueryPayload {
    /// Decode a raw JSON value, reporting shape problems as [`DataError`].
    pub fn from_value(value: Value) -> Result<Self, DataError> {
        serde_json::from_value(value).map_err(|error| DataError::MalformedPayload {
            message: error.to_string(),
        })
    }

    /// Observation rows, or an empty slice when the API returned none.
    pub fn rows(&self) -> &[Vec<Cell>] {
        self.data.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryMetadata {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub subtitle: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub activity: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub source: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub periodicity: String,
    #[serde(default, rename = "type", deserialize_with = "lenient_text")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub notes: String,
}

/// Summary of one hierarchy as listed inside a query payload.
#[derive(Debug, Clone, Deserialize)]
pub struct HierarchyRef {
    #[serde(deserialize_with = "lenient_text")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub cod: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub des: String,
    #[serde(deserialize_with = "lenient_text")]
    pub alias: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Measure {
    #[serde(deserialize_with = "lenient_text")]
    pub des: String,
}

/// One observation cell. Hierarchy cells carry a code path, measure cells a
/// value and its display format.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Coded {
        #[serde(deserialize_with = "text_list")]
        cod: Vec<String>,
    },
    Value {
        #[serde(default, deserialize_with = "lenient_text")]
        val: String,
        #[serde(default, deserialize_with = "lenient_text")]
        format: String,
    },
}

/// Response of a hierarchy URL.
#[derive(Debug, Clone, Deserialize)]
pub struct HierarchyPayload {
    pub data: HierarchyNode,
}

impl HierarchyPayload {
    pub fn from_value(value: Value) -> Result<Self, DataError> {
        serde_json::from_value(value).map_err(|error| DataError::MalformedPayload {
            message: error.to_string(),
        })
    }
}

/// Node of a nested hierarchy tree.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HierarchyNode {
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<HierarchyNode>,
    #[serde(default, rename = "isLastLevel", deserialize_with = "null_as_default")]
    pub is_last_level: bool,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl HierarchyNode {
    /// Property value rendered as text; absent and null properties are empty.
    pub fn property(&self, name: &str) -> String {
        self.properties.get(name).map(value_text).unwrap_or_default()
    }

    /// True when this node contributes no further level.
    pub fn is_terminal(&self) -> bool {
        self.children.is_empty() || self.is_last_level
    }
}

/// Render a JSON scalar the way the API's consumers expect to see it.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        other => other.to_string(),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(value_text).unwrap_or_default())
}

fn text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<Value>::deserialize(deserializer)?;
    Ok(values.iter().map(value_text).collect())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_query_payload() {
        let payload = QueryPayload::from_value(json!({
            "metainfo": {"id": 42, "title": "Paro", "periodicity": null},
            "hierarchies": [{"url": "u", "cod": "1", "des": "Sexo", "alias": "D_SEXO_0"}],
            "measures": [{"des": "Personas"}],
            "data": [[{"cod": ["P1_1", 2]}, {"val": 12.5, "format": "12,5"}]]
        }))
        .expect("decode");
        assert_eq!(payload.metainfo.id, "42");
        assert_eq!(payload.metainfo.periodicity, "");
        assert_eq!(payload.rows().len(), 1);
        assert_eq!(
            payload.rows()[0][0],
            Cell::Coded {
                cod: vec!["P1_1".to_string(), "2".to_string()]
            }
        );
        assert_eq!(
            payload.rows()[0][1],
            Cell::Value {
                val: "12.5".to_string(),
                format: "12,5".to_string()
            }
        );
    }

    #[test]
    fn null_data_has_no_rows() {
        let payload = QueryPayload::from_value(json!({
            "metainfo": {},
            "hierarchies": null,
            "measures": [],
            "data": null
        }))
        .expect("decode");
        assert!(payload.rows().is_empty());
        assert!(payload.hierarchies.is_empty());
    }

    #[test]
    fn missing_metainfo_is_data_error() {
        let error = QueryPayload::from_value(json!({"data": []})).unwrap_err();
        assert!(matches!(error, DataError::MalformedPayload { .. }));
    }

    #[test]
    fn hierarchy_node_properties() {
        let payload = HierarchyPayload::from_value(json!({
            "data": {
                "id": 7, "cod": "P1_A", "label": "Andalucía", "parentId": null,
                "children": null, "isLastLevel": true
            }
        }))
        .expect("decode");
        let node = payload.data;
        assert_eq!(node.property("id"), "7");
        assert_eq!(node.property("parentId"), "");
        assert_eq!(node.property("missing"), "");
        assert!(node.is_terminal());
    }
}
