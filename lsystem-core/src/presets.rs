//! Preset Catalog - Read-Only Grammar Bundles
//!
//! Built-in plants plus optional JSON preset files. The pipeline only reads
//! from the registry; it never mutates it during a render.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::RenderError;
use crate::grammar::Grammar;

pub type PresetName = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub name: PresetName,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub grammar: Grammar,
    pub angle: f64,
    pub step: f64,
    pub iterations: u32,
    #[serde(default = "default_engine_min_version")]
    pub engine_min_version: String,
}

fn default_engine_min_version() -> String { crate::MIN_PRESET_ENGINE_VERSION.to_string() }

fn builtin(
    name: &str,
    axiom: &str,
    rules: &[(char, &str)],
    angle: f64,
    step: f64,
    iterations: u32,
    description: &str,
) -> Preset {
    Preset {
        name: name.to_string(),
        description: description.to_string(),
        grammar: Grammar::from_static(axiom, rules),
        angle,
        step,
        iterations,
        engine_min_version: default_engine_min_version(),
    }
}

/// The shipped plants: small, medium and large.
pub fn builtin_presets() -> Vec<Preset> {
    vec![
        builtin(
            "weed",
            "F",
            &[('F', "F[+F]F[-F]F")],
            22.5,
            5.0,
            3,
            "Small, fast branching sprout with a few side shoots; good for quick previews.",
        ),
        builtin(
            "fern",
            "X",
            &[('X', "F[+X]F[-X]+X"), ('F', "FF")],
            20.0,
            3.0,
            5,
            "Fractal fern-like plant with repeated fronds; medium complexity and balanced detail.",
        ),
        builtin(
            "bush",
            "F",
            &[('F', "FF+[+F-F-F]-[-F+F+F]")],
            22.5,
            2.5,
            4,
            "Dense shrub/bush with many short branches creating a rounded canopy; more detailed and visually fuller.",
        ),
    ]
}

/// Preset registry - keyed and listed by name.
pub struct PresetRegistry {
    presets: BTreeMap<PresetName, Preset>,
}

impl PresetRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self { presets: BTreeMap::new() }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for preset in builtin_presets() {
            registry.register(preset);
        }
        registry
    }

    /// Built-ins overlaid with every `*.json` preset in `dir`. Files that
    /// fail to read or parse are skipped.
    pub fn load_from_dir(dir: &Path) -> Result<Self, RenderError> {
        let mut registry = Self::with_builtins();
        if !dir.exists() {
            warn!(dir = %dir.display(), "preset directory does not exist, using built-ins");
            return Ok(registry);
        }

        let entries = fs::read_dir(dir).map_err(|e| RenderError::CatalogUnreadable {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut paths: Vec<_> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().map_or(false, |e| e == "json"))
            .collect();
        paths.sort();

        for path in paths {
            let content = match fs::read_to_string(&path) {
                Ok(c) => c,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable preset");
                    continue;
                }
            };
            match serde_json::from_str::<Preset>(&content) {
                Ok(preset) => {
                    debug!(name = %preset.name, path = %path.display(), "loaded preset");
                    registry.register(preset);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping invalid preset");
                }
            }
        }
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.get(name)
    }

    /// Like [`get`](Self::get), but names the alternatives on failure.
    pub fn require(&self, name: &str) -> Result<&Preset, RenderError> {
        self.get(name).ok_or_else(|| RenderError::PresetNotFound {
            name: name.to_string(),
            available: self.names().join(", "),
        })
    }

    /// Sorted by name.
    pub fn list(&self) -> Vec<&Preset> {
        self.presets.values().collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.presets.keys().map(String::as_str).collect()
    }

    pub fn register(&mut self, preset: Preset) {
        self.presets.insert(preset.name.clone(), preset);
    }
}

impl Default for PresetRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{expand, MAX_ITERATIONS};
    use crate::turtle::interpret;

    #[test]
    fn test_builtin_names_sorted() {
        let registry = PresetRegistry::with_builtins();
        assert_eq!(registry.names(), vec!["bush", "fern", "weed"]);
    }

    #[test]
    fn test_builtins_are_valid_grammars() {
        for preset in builtin_presets() {
            let g = &preset.grammar;
            let rebuilt = Grammar::new(g.axiom(), g.rules().clone()).unwrap();
            assert_eq!(&rebuilt, g);
            assert!(preset.iterations <= MAX_ITERATIONS);
            assert!(preset.step > 0.0);
        }
    }

    #[test]
    fn test_builtins_render_to_segments() {
        for preset in builtin_presets() {
            let program = expand(&preset.grammar, preset.iterations).unwrap();
            let segments = interpret(&program, preset.angle, preset.step).unwrap();
            assert!(!segments.is_empty(), "{} drew nothing", preset.name);
        }
    }

    #[test]
    fn test_weed_segment_count() {
        // Each F becomes five Fs: 5^3 segments after three iterations.
        let registry = PresetRegistry::default();
        let weed = registry.get("weed").unwrap();
        let program = expand(&weed.grammar, weed.iterations).unwrap();
        assert_eq!(interpret(&program, weed.angle, weed.step).unwrap().len(), 125);
    }

    #[test]
    fn test_require_lists_available() {
        let registry = PresetRegistry::default();
        let err = registry.require("nope").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("nope"));
        assert!(msg.contains("bush, fern, weed"));
    }

    #[test]
    fn test_preset_json_shape() {
        let json = r#"{
            "name": "koch",
            "axiom": "F",
            "rules": {"F": "F+F-F-F+F"},
            "angle": 90,
            "step": 1.5,
            "iterations": 2
        }"#;
        let preset: Preset = serde_json::from_str(json).unwrap();
        assert_eq!(preset.name, "koch");
        assert_eq!(preset.grammar.rule('F'), Some("F+F-F-F+F"));
        assert_eq!(preset.engine_min_version, crate::MIN_PRESET_ENGINE_VERSION);
        assert!(preset.description.is_empty());
    }

    #[test]
    fn test_preset_json_rejects_bad_rule_key() {
        let json = r#"{"name":"bad","axiom":"F","rules":{"FF":"F"},"angle":1,"step":1,"iterations":1}"#;
        assert!(serde_json::from_str::<Preset>(json).is_err());
    }

    #[test]
    fn test_preset_json_rejects_repeated_rule_key() {
        let json = r#"{"name":"dup","axiom":"F","rules":{"F":"FF","F":"F-F"},"angle":1,"step":1,"iterations":1}"#;
        assert!(serde_json::from_str::<Preset>(json).is_err());
    }

    #[test]
    fn test_load_from_dir_overlays_and_skips_invalid() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("koch.json"),
            r#"{"name":"koch","axiom":"F","rules":{"F":"F+F-F-F+F"},"angle":90,"step":1,"iterations":3}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("weed.json"),
            r#"{"name":"weed","axiom":"F","rules":{"F":"FF"},"angle":10,"step":1,"iterations":1}"#,
        )
        .unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let registry = PresetRegistry::load_from_dir(dir.path()).unwrap();
        assert_eq!(registry.names(), vec!["bush", "fern", "koch", "weed"]);
        assert_eq!(registry.get("weed").unwrap().iterations, 1);
    }

    #[test]
    fn test_load_from_missing_dir_uses_builtins() {
        let dir = tempfile::tempdir().unwrap();
        let registry = PresetRegistry::load_from_dir(&dir.path().join("absent")).unwrap();
        assert_eq!(registry.list().len(), 3);
    }
}
