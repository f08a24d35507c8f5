//! Grammar Model - Deterministic, Context-Free L-Systems
//!
//! Rules map exactly one symbol to a replacement string. Expansion is
//! simultaneous: every generation is rewritten from the complete previous
//! generation into a fresh buffer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::RenderError;

/// Upper bound on expansion depth.
pub const MAX_ITERATIONS: u32 = 15;

/// Upper bound on the number of symbols in any generation.
pub const MAX_OUTPUT_LENGTH: usize = 10_000_000;

/// An immutable, validated L-system grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GrammarDef", into = "GrammarDef")]
pub struct Grammar {
    axiom: String,
    rules: BTreeMap<char, String>,
}

/// Wire form used by preset files and manifests.
///
/// Rules stay a list of entries so a key repeated in the JSON object
/// reaches the duplicate check instead of silently replacing the first.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GrammarDef {
    axiom: String,
    #[serde(with = "rule_entries")]
    rules: Vec<(String, String)>,
}

mod rule_entries {
    use serde::de::{MapAccess, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(rules: &[(String, String)], s: S) -> Result<S::Ok, S::Error> {
        s.collect_map(rules.iter().map(|(k, v)| (k, v)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<(String, String)>, D::Error> {
        struct Entries;

        impl<'de> Visitor<'de> for Entries {
            type Value = Vec<(String, String)>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of symbol to replacement")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry()? {
                    entries.push(entry);
                }
                Ok(entries)
            }
        }

        d.deserialize_map(Entries)
    }
}

impl TryFrom<GrammarDef> for Grammar {
    type Error = RenderError;

    fn try_from(def: GrammarDef) -> Result<Self, Self::Error> {
        Grammar::from_pairs(def.axiom, def.rules)
    }
}

impl From<Grammar> for GrammarDef {
    fn from(grammar: Grammar) -> Self {
        GrammarDef {
            axiom: grammar.axiom,
            rules: grammar
                .rules
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }
}

impl Grammar {
    pub fn new(
        axiom: impl Into<String>,
        rules: BTreeMap<char, String>,
    ) -> Result<Self, RenderError> {
        let axiom = axiom.into();
        if axiom.is_empty() {
            return Err(RenderError::InvalidGrammar("axiom must be non-empty".into()));
        }
        if rules.is_empty() {
            return Err(RenderError::InvalidGrammar("rule set must be non-empty".into()));
        }
        Ok(Self { axiom, rules })
    }

    /// Build from string-keyed pairs, rejecting keys that are not exactly
    /// one symbol and keys that appear twice.
    pub fn from_pairs<K, V>(
        axiom: impl Into<String>,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self, RenderError>
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut rules = BTreeMap::new();
        for (key, replacement) in pairs {
            let symbol = single_symbol(key.as_ref())?;
            if rules.insert(symbol, replacement.into()).is_some() {
                return Err(RenderError::InvalidGrammar(format!(
                    "duplicate rule for '{}'",
                    symbol
                )));
            }
        }
        Self::new(axiom, rules)
    }

    /// Parse a `SYMBOL=REPLACEMENT` rule definition.
    pub fn parse_rule(definition: &str) -> Result<(char, String), RenderError> {
        let (key, replacement) = definition.split_once('=').ok_or_else(|| {
            RenderError::InvalidGrammar(format!(
                "rule {:?} must have the form SYMBOL=REPLACEMENT",
                definition
            ))
        })?;
        Ok((single_symbol(key)?, replacement.to_string()))
    }

    /// Built-in catalog entries are checked by tests instead of at runtime.
    pub(crate) fn from_static(axiom: &str, rules: &[(char, &str)]) -> Self {
        Self {
            axiom: axiom.to_string(),
            rules: rules.iter().map(|&(k, v)| (k, v.to_string())).collect(),
        }
    }

    pub fn axiom(&self) -> &str {
        &self.axiom
    }

    pub fn rules(&self) -> &BTreeMap<char, String> {
        &self.rules
    }

    pub fn rule(&self, symbol: char) -> Option<&str> {
        self.rules.get(&symbol).map(String::as_str)
    }
}

fn single_symbol(key: &str) -> Result<char, RenderError> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(symbol), None) => Ok(symbol),
        _ => Err(RenderError::InvalidGrammar(format!(
            "rule key {:?} must be exactly one symbol",
            key
        ))),
    }
}

/// Expand `grammar` for `iterations` generations.
pub fn expand(grammar: &Grammar, iterations: u32) -> Result<String, RenderError> {
    if iterations > MAX_ITERATIONS {
        return Err(RenderError::IterationOutOfRange {
            requested: i64::from(iterations),
            max: MAX_ITERATIONS,
        });
    }

    let mut current = grammar.axiom.clone();
    if current.chars().count() > MAX_OUTPUT_LENGTH {
        return Err(RenderError::OutputTooLarge { limit: MAX_OUTPUT_LENGTH });
    }
    if iterations == 0 {
        return Ok(current);
    }

    // Replacement lengths in symbols, so the running total is exact.
    let table: BTreeMap<char, (&str, usize)> = grammar
        .rules
        .iter()
        .map(|(&k, v)| (k, (v.as_str(), v.chars().count())))
        .collect();

    for _ in 0..iterations {
        let mut next = String::with_capacity(current.len());
        let mut total = 0usize;
        for symbol in current.chars() {
            let (replacement, len) = match table.get(&symbol) {
                Some(&entry) => (Some(entry.0), entry.1),
                None => (None, 1),
            };
            total += len;
            if total > MAX_OUTPUT_LENGTH {
                return Err(RenderError::OutputTooLarge { limit: MAX_OUTPUT_LENGTH });
            }
            match replacement {
                Some(text) => next.push_str(text),
                None => next.push(symbol),
            }
        }
        current = next;
    }

    Ok(current)
}
