use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for Vec<String> {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(v) => vec![v],
            OneOrMany::Many(vs) => vs,
        }
    }
}

/// Attribute-value set describing an experiment or a single file.
///
/// Each attribute code maps to an ordered list of values. A code that is absent
/// from the set and a code present with zero values are indistinguishable to
/// readers: both yield an empty slice from [`AttributeValueSet::values`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct AttributeValueSet {
    #[serde(deserialize_with = "deserialize_entries")]
    entries: BTreeMap<String, Vec<String>>,
}

fn deserialize_entries<'de, D>(deserializer: D) -> Result<BTreeMap<String, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, OneOrMany>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|(k, v)| (k, v.into())).collect())
}

impl AttributeValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value to `code`, keeping previously inserted values in order.
    pub fn insert(&mut self, code: impl Into<String>, value: impl Into<String>) {
        self.entries
            .entry(code.into())
            .or_default()
            .push(value.into());
    }

    /// Replaces every value of `code`. An empty list keeps the code but with no values.
    pub fn set_values<I, S>(&mut self, code: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .insert(code.into(), values.into_iter().map(Into::into).collect());
    }

    pub fn with(mut self, code: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(code, value);
        self
    }

    pub fn values(&self, code: &str) -> &[String] {
        self.entries.get(code).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn first(&self, code: &str) -> Option<&str> {
        self.values(code).first().map(String::as_str)
    }

    /// Whether `code` carries at least one value.
    pub fn has_values(&self, code: &str) -> bool {
        !self.values(code).is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(code, values)| (code.as_str(), values.as_slice()))
    }
}

impl<K, V> FromIterator<(K, V)> for AttributeValueSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut set = Self::new();
        for (code, value) in iter {
            set.insert(code, value);
        }
        set
    }
}
