use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Extension asking for both address families in one lookup.
pub const RETURN_BOTH_V4_AND_V6: &str = "return_both_v4_and_v6";

/// Integer spelling of an enabled extension flag.
pub const EXTENSION_TRUE: u32 = 1000;
/// Integer spelling of a disabled extension flag.
pub const EXTENSION_FALSE: u32 = 1001;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtensionValue {
    Flag(bool),
    Int(u32),
    Text(String),
    List(Vec<ExtensionValue>),
    Dict(Extensions),
}

impl ExtensionValue {
    /// Approximate heap footprint, used when accounting a copy against an allocator.
    fn footprint(&self) -> usize {
        let nested = match self {
            ExtensionValue::Flag(_) | ExtensionValue::Int(_) => 0,
            ExtensionValue::Text(text) => text.len(),
            ExtensionValue::List(items) => items.iter().map(ExtensionValue::footprint).sum(),
            ExtensionValue::Dict(dict) => dict.footprint(),
        };
        std::mem::size_of::<ExtensionValue>() + nested
    }
}

/// Ordered dictionary of per-lookup extensions.
///
/// Values own all their data, so `deep_copy` never aliases the caller's dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Extensions {
    entries: BTreeMap<String, ExtensionValue>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style flag setter.
    pub fn with_flag(mut self, name: &str, enabled: bool) -> Self {
        self.insert(name, ExtensionValue::Flag(enabled));
        self
    }

    pub fn insert(&mut self, name: &str, value: ExtensionValue) -> Option<ExtensionValue> {
        self.entries.insert(name.to_string(), value)
    }

    pub fn get(&self, name: &str) -> Option<&ExtensionValue> {
        self.entries.get(name)
    }

    /// Reads a boolean extension. Missing keys and anything other than
    /// `true` / `EXTENSION_TRUE` read as disabled.
    pub fn get_flag(&self, name: &str) -> bool {
        matches!(
            self.entries.get(name),
            Some(ExtensionValue::Flag(true)) | Some(ExtensionValue::Int(EXTENSION_TRUE))
        )
    }

    pub fn deep_copy(&self) -> Self {
        self.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExtensionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn footprint(&self) -> usize {
        std::mem::size_of::<Self>()
            + self
                .entries
                .iter()
                .map(|(k, v)| k.len() + v.footprint())
                .sum::<usize>()
    }
}
