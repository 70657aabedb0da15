use serde::{Deserialize, Serialize};

/// A record a `Ref` can expand into: anything with a backend id and a
/// human-readable display name.
pub trait RefTarget {
    fn id(&self) -> &str;
    fn display_name(&self) -> &str;
}

/// Reference field as the backend serves it: sometimes a bare id string,
/// sometimes the populated record. Replaces the predecessor's scattered
/// runtime type checks with one union and two accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ref<T> {
    Expanded(T),
    Id(String),
}

impl<T: RefTarget> Ref<T> {
    pub fn resolve_id(&self) -> &str {
        match self {
            Ref::Id(id) => id,
            Ref::Expanded(record) => record.id(),
        }
    }

    /// Display name when the record is populated; the id is the only text
    /// available otherwise.
    pub fn resolve_name(&self) -> &str {
        match self {
            Ref::Id(id) => id,
            Ref::Expanded(record) => record.display_name(),
        }
    }
}
