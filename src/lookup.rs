//! Value dictionaries that translate legacy codes into new identifiers.
//!
//! Tables are plain data: the built-in ones reproduce the mapping used when
//! the dumps were produced, and any of them can be replaced from the
//! `[lookups]` section of the configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{MigrateError, MigrateResult};

/// A named mapping from legacy code to new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupTable {
    name: String,
    entries: BTreeMap<String, String>,
}

impl LookupTable {
    pub fn new(name: impl Into<String>, entries: BTreeMap<String, String>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }

    /// Build a table from `(legacy, new)` pairs.
    pub fn from_pairs<'a>(name: &str, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let entries = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self::new(name, entries)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Translate a legacy code. A missing key is fatal for the run.
    pub fn translate(&self, key: &str) -> MigrateResult<&str> {
        self.entries
            .get(key.trim())
            .map(String::as_str)
            .ok_or_else(|| MigrateError::lookup_miss(&self.name, key))
    }
}

/// Criticality code → `IdCriticidad`.
pub fn criticality() -> LookupTable {
    LookupTable::from_pairs(
        "criticality",
        [
            ("MC", "1"),
            ("CA", "2"),
            ("CM", "3"),
            ("CB", "4"),
            ("SC", "5"),
            ("NULL", "5"),
        ],
    )
}

/// Activity flag → `IdEstadoActivo`.
pub fn activity() -> LookupTable {
    LookupTable::from_pairs("activity", [("0", "1"), ("1", "2"), ("2", "3")])
}

const USER_IDS: &[(&str, &str)] = &[
    ("1", "81e47e59-a3d5-4c7b-b3f7-077da98a369f"),
    ("2", "eedc8529-76e8-4dfc-93c8-1dd0dbfa85d1"),
    ("3", "bf368d2b-7199-47ad-8524-3f3db3e9461a"),
    ("4", "e3649caf-53ee-440b-b887-cae785448c25"),
    ("5", "b63bc715-6fb6-4121-8877-9ccc477614b3"),
    ("6", "d350b266-910c-4262-8b87-6fcebe3ce465"),
    ("7", "bf73fcbe-ba8f-4fc3-8f71-ad28157b5dca"),
    ("8", "73776e05-11d6-4b04-9c4a-09e00ed90965"),
    ("9", "e1fc54bd-605c-4e6b-a314-b10e1f1b073e"),
    ("10", "83fe4b80-5932-4aed-87e4-bd75d27ce694"),
    ("11", "a7fac1e5-c319-433a-acbc-52dfa8fc2829"),
    ("12", "500698e0-5b0a-4e26-88df-957eb018696b"),
    ("13", "a7fac1e5-c319-433a-acbc-52dfa8fc2829"),
    ("14", "a7fac1e5-c319-433a-acbc-52dfa8fc2829"),
    ("15", "59d2ef0d-a562-4d56-8429-aeddaf35a546"),
    ("16", "13525e67-6853-438d-984a-7a6b647aebd9"),
    ("17", "492b03f9-3bd8-4396-a20f-7eb8d1dcd364"),
    ("18", "562559aa-fbc4-4f82-a533-224e3d5f8c34"),
    ("19", "dec0f3d2-278f-4e5a-8763-d3e275dff091"),
    ("20", "ac8fa91b-013f-4f67-aa45-ce6f2cd33339"),
    ("21", "c88f4e63-1597-4d80-afda-f8e9906516c5"),
    ("22", "6b2d48b4-eb40-4c86-b728-330b69bef14f"),
    ("23", "5a602495-d87f-4823-932e-193484a939df"),
    ("24", "6078c069-2d1f-44b4-b419-e2ff12d9af05"),
    ("25", "a7fac1e5-c319-433a-acbc-52dfa8fc2829"),
    ("26", "1d781f50-7fbc-4109-a715-94ca9cde1b5e"),
    ("27", "e94641cf-3886-48a4-8db5-f5bb82ac3fa2"),
    ("28", "d6a07a3b-c844-40df-8f44-da616cccd16e"),
    ("29", "4242dc66-15d0-42aa-bc8c-a9cfaf79bb75"),
    ("30", "f7840970-2a26-47b8-a5c9-1289a668ceca"),
    ("31", "8ba7cbaf-532f-4abd-8c99-c541071e1c0a"),
    ("32", "a7fac1e5-c319-433a-acbc-52dfa8fc2829"),
];

/// Legacy user id → user UUID, for order creators.
///
/// Legacy user 14 has no creator entry. Orders without a creator are
/// attributed to legacy user 2.
pub fn creators() -> LookupTable {
    let pairs = USER_IDS
        .iter()
        .copied()
        .filter(|(legacy, _)| *legacy != "14")
        .chain([("NULL", "eedc8529-76e8-4dfc-93c8-1dd0dbfa85d1")]);
    LookupTable::from_pairs("creators", pairs)
}

/// Legacy user id → user UUID, for assignments and their history.
pub fn users() -> LookupTable {
    LookupTable::from_pairs("users", USER_IDS.iter().copied())
}

/// The full set of dictionaries handed to the transforms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookups {
    pub criticality: LookupTable,
    pub activity: LookupTable,
    pub creators: LookupTable,
    pub users: LookupTable,
}

impl Default for Lookups {
    fn default() -> Self {
        Self {
            criticality: criticality(),
            activity: activity(),
            creators: creators(),
            users: users(),
        }
    }
}

/// Replacement tables as they appear in the configuration file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LookupOverrides {
    pub criticality: Option<BTreeMap<String, String>>,
    pub activity: Option<BTreeMap<String, String>>,
    pub creators: Option<BTreeMap<String, String>>,
    pub users: Option<BTreeMap<String, String>>,
}

impl Lookups {
    /// Built-in tables with any configured replacements applied.
    pub fn with_overrides(overrides: &LookupOverrides) -> Self {
        let mut lookups = Self::default();
        let replace = |slot: &mut LookupTable, entries: &Option<BTreeMap<String, String>>| {
            if let Some(entries) = entries {
                *slot = LookupTable::new(slot.name().to_string(), entries.clone());
            }
        };
        replace(&mut lookups.criticality, &overrides.criticality);
        replace(&mut lookups.activity, &overrides.activity);
        replace(&mut lookups.creators, &overrides.creators);
        replace(&mut lookups.users, &overrides.users);
        lookups
    }
}
