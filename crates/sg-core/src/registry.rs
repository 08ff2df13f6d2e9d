//! Target whitelist

use crate::config::TargetEntry;

/// Immutable id → URL mapping of authorized targets.
///
/// Iteration follows configuration order so `/targets` is stable between
/// restarts.
#[derive(Debug, Clone)]
pub struct TargetRegistry {
    entries: Vec<TargetEntry>,
}

impl TargetRegistry {
    pub fn new(entries: Vec<TargetEntry>) -> Self {
        Self { entries }
    }

    /// Resolve an identifier to its URL. Only exact matches count.
    pub fn resolve(&self, id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.url.as_str())
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TargetRegistry {
        TargetRegistry::new(vec![
            TargetEntry::new("zeta", "http://z.test/?id=1"),
            TargetEntry::new("alpha", "http://a.test/?id=1"),
        ])
    }

    #[test]
    fn test_resolve_exact_id() {
        let registry = registry();
        assert_eq!(registry.resolve("alpha"), Some("http://a.test/?id=1"));
        assert_eq!(registry.resolve("ALPHA"), None);
        assert_eq!(registry.resolve("alph"), None);
        assert_eq!(registry.resolve(""), None);
    }

    #[test]
    fn test_ids_keep_configuration_order() {
        let registry = registry();
        let ids: Vec<&str> = registry.ids().collect();
        assert_eq!(ids, vec!["zeta", "alpha"]);
    }
}
