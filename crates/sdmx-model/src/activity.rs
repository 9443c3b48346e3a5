//! Consolidated activity descriptor written as `configuracion.yaml`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Queries sharing a metadata title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryGroup {
    /// 1-based id assigned in first-seen order.
    pub id: String,
    pub consultas: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPeriodicity {
    pub frecuencia: String,
    #[serde(rename = "validFrom", skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<String>,
    #[serde(rename = "validTo", skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<String>,
}

/// Descriptor keyed the way downstream SDMX tooling expects.
///
/// Group order follows first appearance, so groups are kept in a `Vec` and
/// serialized as an ordered mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDescriptor {
    #[serde(rename = "NOMBRE")]
    pub nombre: String,
    pub categoria: String,
    pub subcategoria: String,
    #[serde(with = "ordered_groups")]
    pub grupos_consultas: Vec<(String, QueryGroup)>,
    pub variables: Vec<String>,
    pub metadatos_title: BTreeMap<String, String>,
    pub metadatos_subtitle: BTreeMap<String, String>,
    pub periodicidad: BTreeMap<String, QueryPeriodicity>,
}

impl ActivityDescriptor {
    pub fn group(&self, title: &str) -> Option<&QueryGroup> {
        self.grupos_consultas
            .iter()
            .find(|(name, _)| name == title)
            .map(|(_, group)| group)
    }
}

mod ordered_groups {
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};
    use std::fmt;

    use super::QueryGroup;

    pub fn serialize<S>(groups: &[(String, QueryGroup)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(groups.len()))?;
        for (title, group) in groups {
            map.serialize_entry(title, group)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<(String, QueryGroup)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct GroupsVisitor;

        impl<'de> Visitor<'de> for GroupsVisitor {
            type Value = Vec<(String, QueryGroup)>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of group titles")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut groups = Vec::new();
                while let Some(entry) = access.next_entry::<String, QueryGroup>()? {
                    groups.push(entry);
                }
                Ok(groups)
            }
        }

        deserializer.deserialize_map(GroupsVisitor)
    }
}
