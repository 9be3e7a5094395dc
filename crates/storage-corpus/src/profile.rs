//! Profile records and their identifiers.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Attribute key used by legacy feedback matching.
pub const NAME_KEY: &str = "name";

/// String-valued attribute mapping. Absent keys read as empty.
///
/// Deserialisation is lenient so metadata exported by dataframe tooling loads
/// as-is: numbers and booleans keep their textual form, `null` becomes empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProfileAttributes(BTreeMap<String, String>);

impl ProfileAttributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> &str {
        self.0.get(key).map_or("", String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ProfileAttributes
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for ProfileAttributes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_json::Map::<String, Value>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .map(|(key, value)| (key, scalar_text(value)))
            .collect())
    }
}

fn scalar_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    }
}

/// Content-addressed profile identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(String);

impl ProfileId {
    /// Hash of the sorted attribute pairs, hex encoded (128 bits).
    #[must_use]
    pub fn from_attributes(attributes: &ProfileAttributes) -> Self {
        let mut hasher = blake3::Hasher::new();
        for (key, value) in attributes.iter() {
            hasher.update(key.as_bytes());
            hasher.update(&[0u8]);
            hasher.update(value.as_bytes());
            hasher.update(&[0u8]);
        }
        let hex = hasher.finalize().to_hex();
        Self(hex.as_str()[..32].to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn with_suffix(&self, n: usize) -> Self {
        Self(format!("{}-{n}", self.0))
    }
}

impl From<&str> for ProfileId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ProfileId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub attributes: ProfileAttributes,
}

impl Profile {
    #[must_use]
    pub const fn new(id: ProfileId, attributes: ProfileAttributes) -> Self {
        Self { id, attributes }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> &str {
        self.attributes.get(key)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.attributes.get(NAME_KEY)
    }
}

/// Assign unique content-addressed ids; exact duplicates get `-{n}` suffixes
/// in input order.
#[must_use]
pub fn assign_ids(records: Vec<ProfileAttributes>) -> Vec<Profile> {
    let mut seen: BTreeMap<ProfileId, usize> = BTreeMap::new();
    records
        .into_iter()
        .map(|attributes| {
            let base = ProfileId::from_attributes(&attributes);
            let count = seen.entry(base.clone()).or_insert(0);
            let id = if *count == 0 {
                base
            } else {
                base.with_suffix(*count)
            };
            *count += 1;
            Profile::new(id, attributes)
        })
        .collect()
}
