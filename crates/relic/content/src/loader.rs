//! Catalog file loaders.

use std::path::Path;

use anyhow::{Context, Result, bail};

use super::catalog::Catalog;

/// Parses and validates a catalog from a JSON string.
pub fn load_catalog_str(content: &str) -> Result<Catalog> {
    let catalog: Catalog =
        serde_json::from_str(content).context("failed to parse relic catalog JSON")?;
    let issues = catalog.issues();
    if !issues.is_empty() {
        let rendered: Vec<String> = issues.iter().map(ToString::to_string).collect();
        bail!("relic catalog failed validation:\n  {}", rendered.join("\n  "));
    }
    Ok(catalog)
}

/// Reads, parses, and validates a catalog file.
pub fn load_catalog_file(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read relic catalog at {path:?}"))?;
    load_catalog_str(&content).with_context(|| format!("in catalog file {path:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_a_minimal_catalog() {
        let json = r#"{
            "relics": [
                {
                    "id": "warrior_band",
                    "name": "Warrior Band",
                    "category": "attack",
                    "rarity": "common",
                    "quality": "delicate",
                    "obtainment_difficulty": 2,
                    "effects": [
                        {
                            "id": "warrior_band_edge",
                            "name": "Edge",
                            "effect_type": "attack_percentage",
                            "value": 5,
                            "stacking_rule": "additive"
                        }
                    ]
                }
            ]
        }"#;
        let catalog = load_catalog_str(json).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.relics[0].effects.len(), 1);
    }

    #[test]
    fn rejects_invalid_values_with_context() {
        let json = r#"{
            "relics": [
                {
                    "id": "bad",
                    "name": "Bad",
                    "category": "attack",
                    "rarity": "common",
                    "quality": "delicate",
                    "obtainment_difficulty": 2,
                    "effects": [
                        {
                            "id": "bad_e",
                            "name": "Broken",
                            "effect_type": "attack_flat",
                            "value": -3,
                            "stacking_rule": "additive"
                        }
                    ]
                }
            ]
        }"#;
        let error = load_catalog_str(json).unwrap_err();
        assert!(error.to_string().contains("failed validation"));
    }

    #[test]
    fn unknown_condition_tags_load_fine() {
        let json = r#"{
            "relics": [
                {
                    "id": "future",
                    "name": "Future Relic",
                    "category": "utility",
                    "rarity": "rare",
                    "quality": "polished",
                    "obtainment_difficulty": 4,
                    "effects": [
                        {
                            "id": "future_e",
                            "name": "Mystery",
                            "effect_type": "unique",
                            "value": 1,
                            "stacking_rule": "unique",
                            "conditions": [{"type": "moon_phase", "value": "full"}]
                        }
                    ]
                }
            ]
        }"#;
        let catalog = load_catalog_str(json).unwrap();
        assert_eq!(catalog.len(), 1);
    }
}
