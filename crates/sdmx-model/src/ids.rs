//! Identifier construction for queries, hierarchies and output columns.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Placeholder used when a hierarchy URL carries no numeric id.
pub const UNKNOWN_HIERARCHY_NUMBER: &str = "no_encontrado";

const QUERY_ID_MAX_LEN: usize = 8;

static HIERARCHY_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"jerarquia/(\d+)\?consultaId").expect("valid hierarchy url pattern")
});

/// Short, stable query identifier used for file names and descriptor keys.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct QueryId(String);

impl QueryId {
    /// Derive the short id from the configured API id.
    ///
    /// Ids longer than eight characters are cut at the first `?` so that
    /// `"12345?CodOper=1"` becomes `"12345"`. Shorter ids are kept verbatim.
    pub fn from_configured(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.chars().count() > QUERY_ID_MAX_LEN {
            let head = raw.split('?').next().unwrap_or(raw);
            return Self(head.to_string());
        }
        Self(raw.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Internal dimension code of a hierarchy, disambiguated by its source id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HierarchyAlias(String);

impl HierarchyAlias {
    /// Build the alias from the API-declared base alias and the hierarchy URL.
    ///
    /// The numeric id found in `url` is inserted before the two-character
    /// level suffix: `D_SEXO_0` with `.../jerarquia/123?consultaId=9` yields
    /// `D_SEXO_123_0`. Temporal aliases are returned unchanged.
    pub fn build(base: &str, url: &str) -> Self {
        if base.contains("TEMPORAL") {
            return Self(base.to_string());
        }
        let number = extract_hierarchy_number(url);
        let number = number.as_deref().unwrap_or(UNKNOWN_HIERARCHY_NUMBER);
        Self::with_number(base, number)
    }

    /// Insert `number` before the last two characters of `base`.
    pub fn with_number(base: &str, number: &str) -> Self {
        let split = base
            .char_indices()
            .rev()
            .nth(1)
            .map_or(0, |(index, _)| index);
        let (head, suffix) = base.split_at(split);
        Self(format!("{head}_{number}{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key of the dimension map and stem of the exported hierarchy files.
    pub fn map_name(&self) -> &str {
        &self.0
    }

    /// Name used in the hierarchy and concept catalogs.
    pub fn catalog_name(&self) -> String {
        short_name(&self.0)
    }
}

impl fmt::Display for HierarchyAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Numeric hierarchy id embedded in an API hierarchy URL.
pub fn extract_hierarchy_number(url: &str) -> Option<String> {
    HIERARCHY_NUMBER
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}

/// Strip the `D_` prefix and `_0` suffix used by internal dimension codes.
pub fn short_name(name: &str) -> String {
    let name = name.strip_prefix("D_").unwrap_or(name);
    let name = name.strip_suffix("_0").unwrap_or(name);
    name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_id_keeps_short_ids() {
        assert_eq!(QueryId::from_configured("12345").as_str(), "12345");
        assert_eq!(QueryId::from_configured("1234?a=1").as_str(), "1234?a=1");
    }

    #[test]
    fn query_id_truncates_at_question_mark() {
        assert_eq!(QueryId::from_configured("42185?CodOper=b3_151").as_str(), "42185");
        assert_eq!(QueryId::from_configured("123456789").as_str(), "123456789");
    }

    #[test]
    fn alias_embeds_hierarchy_number() {
        let url = "https://x/rest/v1.0/jerarquia/1507?consultaId=42185";
        assert_eq!(HierarchyAlias::build("D_SEXO_0", url).as_str(), "D_SEXO_1507_0");
    }

    #[test]
    fn alias_without_number_uses_placeholder() {
        let alias = HierarchyAlias::build("D_EDAD_1", "https://x/other");
        assert_eq!(alias.as_str(), "D_EDAD_no_encontrado_1");
    }

    #[test]
    fn temporal_alias_is_unchanged() {
        let url = "https://x/jerarquia/77?consultaId=1";
        assert_eq!(HierarchyAlias::build("D_TEMPORAL_0", url).as_str(), "D_TEMPORAL_0");
    }

    #[test]
    fn short_alias_keeps_all_characters() {
        assert_eq!(HierarchyAlias::with_number("X", "5").as_str(), "_5X");
    }

    #[test]
    fn catalog_name_strips_affixes() {
        assert_eq!(HierarchyAlias::with_number("D_SEXO_0", "1507").catalog_name(), "SEXO_1507");
        assert_eq!(HierarchyAlias::with_number("D_EDAD_1", "3").catalog_name(), "EDAD_3_1");
        assert_eq!(short_name("INDICATOR"), "INDICATOR");
    }
}
