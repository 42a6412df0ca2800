//! Model alias table mapping caller-facing model names to iFlow models.
//!
//! The table is built once at startup and shared read-only across requests.
//! Lookups never fail: a model that is not in the table (or no model at all)
//! resolves to [`DEFAULT_UPSTREAM_MODEL`].

use std::collections::HashMap;

/// Upstream model used when the requested model has no alias.
pub const DEFAULT_UPSTREAM_MODEL: &str = "TBStars2-200B-A13B";

/// Built-in aliases, in the order they are advertised by `/v1/models`.
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("gpt-3.5-turbo", "qwen3-max"),
    ("gpt-4", "glm-4.6"),
    ("gpt-4-turbo", "Kimi-K2"),
    ("gpt-4o", "deepseek-v3.2"),
    ("claude-3-opus", "deepseek-v3"),
    ("claude-3-sonnet", "tstars2.0"),
];

/// Immutable alias table with O(1) lookup and stable listing order.
#[derive(Debug, Clone)]
pub struct ModelAliasTable {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
    default_model: String,
}

impl ModelAliasTable {
    /// Build a table from `(alias, upstream)` pairs.
    ///
    /// A repeated alias keeps its first position and takes the last upstream value.
    pub fn new<I, K, V>(aliases: I, default_model: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries: Vec<(String, String)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (alias, upstream) in aliases {
            let alias = alias.into();
            let upstream = upstream.into();
            match index.get(&alias) {
                Some(&position) => entries[position].1 = upstream,
                None => {
                    index.insert(alias.clone(), entries.len());
                    entries.push((alias, upstream));
                }
            }
        }

        Self {
            entries,
            index,
            default_model: default_model.into(),
        }
    }

    /// The built-in iFlow alias table.
    pub fn builtin() -> Self {
        Self::new(BUILTIN_ALIASES.iter().copied(), DEFAULT_UPSTREAM_MODEL)
    }

    /// Resolve a caller model name to the upstream model name.
    pub fn resolve(&self, model: Option<&str>) -> &str {
        model
            .and_then(|name| self.index.get(name))
            .map(|&position| self.entries[position].1.as_str())
            .unwrap_or(self.default_model.as_str())
    }

    /// Caller-facing model names in declaration order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(alias, _)| alias.as_str())
    }

    /// `(alias, upstream)` pairs in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(alias, upstream)| (alias.as_str(), upstream.as_str()))
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Log the alias table at startup.
    pub fn log_aliases(&self) {
        for (alias, upstream) in self.entries() {
            tracing::info!(alias = %alias, upstream = %upstream, "Model alias");
        }
        tracing::info!(
            default_model = %self.default_model,
            aliases = self.len(),
            "Unmapped models fall back to the default upstream model"
        );
    }
}

impl Default for ModelAliasTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_mappings() {
        let table = ModelAliasTable::builtin();
        assert_eq!(table.resolve(Some("gpt-3.5-turbo")), "qwen3-max");
        assert_eq!(table.resolve(Some("gpt-4")), "glm-4.6");
        assert_eq!(table.resolve(Some("gpt-4-turbo")), "Kimi-K2");
        assert_eq!(table.resolve(Some("gpt-4o")), "deepseek-v3.2");
        assert_eq!(table.resolve(Some("claude-3-opus")), "deepseek-v3");
        assert_eq!(table.resolve(Some("claude-3-sonnet")), "tstars2.0");
    }

    #[test]
    fn test_unknown_model_uses_default() {
        let table = ModelAliasTable::builtin();
        assert_eq!(table.resolve(Some("foo")), DEFAULT_UPSTREAM_MODEL);
        assert_eq!(table.resolve(Some("")), DEFAULT_UPSTREAM_MODEL);
        // Lookup is exact, upstream names are not aliases of themselves
        assert_eq!(table.resolve(Some("glm-4.6")), DEFAULT_UPSTREAM_MODEL);
        assert_eq!(table.resolve(Some("GPT-4")), DEFAULT_UPSTREAM_MODEL);
    }

    #[test]
    fn test_absent_model_uses_default() {
        let table = ModelAliasTable::builtin();
        assert_eq!(table.resolve(None), "TBStars2-200B-A13B");
    }

    #[test]
    fn test_aliases_keep_declaration_order() {
        let table = ModelAliasTable::builtin();
        let aliases: Vec<&str> = table.aliases().collect();
        assert_eq!(
            aliases,
            vec![
                "gpt-3.5-turbo",
                "gpt-4",
                "gpt-4-turbo",
                "gpt-4o",
                "claude-3-opus",
                "claude-3-sonnet"
            ]
        );
        assert_eq!(table.len(), 6);
        assert!(!table.is_empty());
    }

    #[test]
    fn test_default_model_not_listed() {
        let table = ModelAliasTable::builtin();
        assert!(!table.aliases().any(|a| a == table.default_model()));
    }

    #[test]
    fn test_repeated_alias_keeps_position_and_last_value() {
        let table = ModelAliasTable::new(
            vec![("a", "one"), ("b", "two"), ("a", "three")],
            "fallback",
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.resolve(Some("a")), "three");
        let entries: Vec<(&str, &str)> = table.entries().collect();
        assert_eq!(entries, vec![("a", "three"), ("b", "two")]);
    }

    #[test]
    fn test_empty_table() {
        let table = ModelAliasTable::new(Vec::<(String, String)>::new(), "only");
        assert!(table.is_empty());
        assert_eq!(table.resolve(Some("gpt-4")), "only");
    }

    #[test]
    fn test_default_is_builtin() {
        let table = ModelAliasTable::default();
        assert_eq!(table.default_model(), DEFAULT_UPSTREAM_MODEL);
        assert_eq!(table.len(), BUILTIN_ALIASES.len());
    }
}
