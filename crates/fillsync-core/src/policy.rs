//! Column exclusion policy
//!
//! Decides which (column name, type tag) pairs are dropped before a
//! declaration is synthesized. Built once per run from configuration; the
//! per-model additions (e.g. a soft-delete column) are layered on through
//! [`ExclusionPolicy::effective`] without ever mutating the base policy.

use std::collections::HashSet;
use std::fmt;

use crate::config::SyncConfig;

/// Predicate over (column name, type tag); `true` excludes the column.
pub type ExcludeFn = dyn Fn(&str, &str) -> bool + Send + Sync;

/// Run-wide exclusion rules: by name, by type tag, or by custom predicate.
pub struct ExclusionPolicy {
    excluded_columns: HashSet<String>,
    excluded_types: HashSet<String>,
    predicate: Option<Box<ExcludeFn>>,
}

impl ExclusionPolicy {
    /// Build a policy from the configured name and type lists.
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            excluded_columns: config.excluded_columns.iter().cloned().collect(),
            excluded_types: config.excluded_types.iter().cloned().collect(),
            predicate: None,
        }
    }

    /// Attach a custom exclusion predicate.
    ///
    /// The predicate receives the column name and its type tag (empty in
    /// catalog mode, where tags are unavailable).
    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str, &str) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Box::new(predicate));
        self
    }

    /// Layer per-model exclusions on top of this policy.
    pub fn effective(&self, extra_columns: Vec<String>) -> EffectivePolicy<'_> {
        EffectivePolicy {
            base: self,
            extra_columns,
        }
    }

    fn excludes(&self, name: &str, type_tag: &str) -> bool {
        if self.excluded_columns.contains(name) {
            return true;
        }
        if self.excluded_types.contains(type_tag) {
            return true;
        }
        if let Some(pred) = &self.predicate
            && pred(name, type_tag)
        {
            return true;
        }
        false
    }
}

impl fmt::Debug for ExclusionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExclusionPolicy")
            .field("excluded_columns", &self.excluded_columns)
            .field("excluded_types", &self.excluded_types)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

/// A base policy plus per-model derived exclusions, valid for one entity.
#[derive(Debug)]
pub struct EffectivePolicy<'a> {
    base: &'a ExclusionPolicy,
    extra_columns: Vec<String>,
}

impl EffectivePolicy<'_> {
    /// Whether the (name, type tag) pair is excluded from synthesis.
    pub fn excludes(&self, name: &str, type_tag: &str) -> bool {
        self.extra_columns.iter().any(|c| c == name) || self.base.excludes(name, type_tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_policy() -> ExclusionPolicy {
        let config = SyncConfig {
            excluded_columns: vec!["created_at".into(), "updated_at".into()],
            excluded_types: vec!["json".into()],
            ..SyncConfig::default()
        };
        ExclusionPolicy::from_config(&config)
    }

    #[test]
    fn excludes_by_name() {
        let policy = base_policy();
        let effective = policy.effective(Vec::new());
        assert!(effective.excludes("created_at", "timestamp"));
        assert!(!effective.excludes("name", "string"));
    }

    #[test]
    fn excludes_by_type_tag() {
        let policy = base_policy();
        let effective = policy.effective(Vec::new());
        assert!(effective.excludes("settings", "json"));
        assert!(!effective.excludes("settings", "text"));
    }

    #[test]
    fn excludes_by_predicate() {
        let policy = base_policy().with_predicate(|name, _| name.starts_with("secret_"));
        let effective = policy.effective(Vec::new());
        assert!(effective.excludes("secret_token", "string"));
        assert!(!effective.excludes("token", "string"));
    }

    #[test]
    fn derived_columns_only_affect_one_effective_policy() {
        let policy = base_policy();

        let with_derived = policy.effective(vec!["deleted_at".into()]);
        assert!(with_derived.excludes("deleted_at", "timestamp"));

        let without = policy.effective(Vec::new());
        assert!(!without.excludes("deleted_at", "timestamp"));
    }
}
