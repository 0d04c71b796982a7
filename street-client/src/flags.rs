//! Feature flag layering. Overrides are applied in order, so a later layer
//! (role, then user, then session) wins over an earlier one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagValue {
    pub value: bool,
    /// Where the current value came from: `initial`, `role:<ROLE>`, `user`
    /// or `session`.
    pub source: String,
}

pub type Flags = BTreeMap<String, FlagValue>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagOverride {
    pub flag: String,
    pub value: bool,
    pub source: String,
}

/// Defaults every flag starts from before overrides.
pub fn initial_flags<'a>(defaults: impl IntoIterator<Item = (&'a str, bool)>) -> Flags {
    defaults
        .into_iter()
        .map(|(flag, value)| {
            (
                flag.to_string(),
                FlagValue {
                    value,
                    source: "initial".to_string(),
                },
            )
        })
        .collect()
}

pub fn generate_overrides(values: &BTreeMap<String, bool>, source: &str) -> Vec<FlagOverride> {
    values
        .iter()
        .map(|(flag, value)| FlagOverride {
            flag: flag.clone(),
            value: *value,
            source: source.to_string(),
        })
        .collect()
}

/// Session overrides kept in local storage. Either a map of flag to bool or
/// a map of flag to `{ "value": bool }`; anything unreadable yields none.
pub fn session_overrides(raw: Option<&str>) -> Vec<FlagOverride> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Stored {
        Plain(bool),
        Tagged { value: bool },
    }

    let Some(raw) = raw else {
        return Vec::new();
    };

    match serde_json::from_str::<BTreeMap<String, Stored>>(raw) {
        Ok(stored) => {
            let values = stored
                .into_iter()
                .map(|(flag, v)| match v {
                    Stored::Plain(value) | Stored::Tagged { value } => (flag, value),
                })
                .collect();
            generate_overrides(&values, "session")
        }
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring unreadable session flag overrides");
            Vec::new()
        }
    }
}

pub fn apply_overrides<'a>(flags: &mut Flags, layers: impl IntoIterator<Item = &'a [FlagOverride]>) {
    for layer in layers {
        for o in layer {
            flags.insert(
                o.flag.clone(),
                FlagValue {
                    value: o.value,
                    source: o.source.clone(),
                },
            );
        }
    }
}
