//! Catalog container and schema-level validation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use relic_core::Relic;

/// A defect found while validating catalog data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogIssue {
    /// Id of the offending relic, when attributable.
    pub relic_id: Option<String>,
    pub message: String,
}

impl std::fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.relic_id {
            Some(id) => write!(f, "[{id}] {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// A set of relics as shipped in content files.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub relics: Vec<Relic>,
}

impl Catalog {
    pub fn new(relics: Vec<Relic>) -> Self {
        Self { relics }
    }

    pub fn len(&self) -> usize {
        self.relics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relics.is_empty()
    }

    /// Schema-level checks on top of per-relic structural validation:
    /// unique ids, unique names, effect ids unique across the catalog,
    /// and conflict references that resolve within the catalog.
    pub fn issues(&self) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();
        let mut seen_ids = BTreeSet::new();
        let mut seen_names = BTreeSet::new();
        let mut seen_effect_ids = BTreeSet::new();
        let all_ids: BTreeSet<&str> = self.relics.iter().map(|r| r.id.as_str()).collect();

        for relic in &self.relics {
            if !seen_ids.insert(relic.id.as_str()) {
                issues.push(CatalogIssue {
                    relic_id: Some(relic.id.to_string()),
                    message: "duplicate relic id".to_owned(),
                });
            }
            if !seen_names.insert(relic.name.as_str()) {
                issues.push(CatalogIssue {
                    relic_id: Some(relic.id.to_string()),
                    message: format!("duplicate relic name '{}'", relic.name),
                });
            }
            for message in relic.structural_issues() {
                issues.push(CatalogIssue {
                    relic_id: Some(relic.id.to_string()),
                    message,
                });
            }
            for effect in &relic.effects {
                if !seen_effect_ids.insert(effect.id.as_str()) {
                    issues.push(CatalogIssue {
                        relic_id: Some(relic.id.to_string()),
                        message: format!("duplicate effect id '{}'", effect.id),
                    });
                }
                for message in effect.structural_issues() {
                    issues.push(CatalogIssue {
                        relic_id: Some(relic.id.to_string()),
                        message: format!("effect '{}': {message}", effect.id),
                    });
                }
            }
            for conflict in &relic.conflicts {
                if !all_ids.contains(conflict.as_str()) {
                    issues.push(CatalogIssue {
                        relic_id: Some(relic.id.to_string()),
                        message: format!("conflict references unknown relic '{conflict}'"),
                    });
                }
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relic_core::{Quality, Rarity, RelicCategory};

    fn relic(id: &str, name: &str) -> Relic {
        Relic::new(id, name, RelicCategory::Attack, Rarity::Common, Quality::Delicate, 1)
    }

    #[test]
    fn clean_catalog_has_no_issues() {
        let catalog = Catalog::new(vec![relic("a", "Alpha"), relic("b", "Beta")]);
        assert!(catalog.issues().is_empty());
    }

    #[test]
    fn duplicate_ids_and_names_are_reported() {
        let catalog = Catalog::new(vec![
            relic("a", "Alpha"),
            relic("a", "Beta"),
            relic("c", "Alpha"),
        ]);
        let issues = catalog.issues();
        assert!(issues.iter().any(|i| i.message.contains("duplicate relic id")));
        assert!(issues.iter().any(|i| i.message.contains("duplicate relic name")));
    }

    #[test]
    fn dangling_conflicts_are_reported() {
        let catalog = Catalog::new(vec![relic("a", "Alpha").with_conflict("ghost")]);
        let issues = catalog.issues();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("ghost"));
    }
}
