//! # Raw Query Parameters
//!
//! Request query parameters as received, before any interpretation.
//!
//! Keys use the bracket convention common to web frameworks:
//! - `name=Max` is a plain value
//! - `tag=a&tag=b` and `tag[]=a&tag[]=b` collect into a list
//! - `age[gte]=5` nests into a map (`{"age": {"gte": "5"}}`)

use std::collections::BTreeMap;

use super::errors::{QueryError, QueryResult};

/// Keys that control the pipeline and never become filter fields
pub const RESERVED_KEYS: [&str; 4] = ["select", "sort", "page", "limit"];

/// Bracket segments beyond this depth are kept as one literal key
const MAX_DEPTH: usize = 5;

/// A single raw parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    /// Single string value
    Text(String),
    /// Repeated or `[]`-suffixed values, in request order
    List(Vec<String>),
    /// Bracketed sub-keys
    Map(RawQuery),
}

impl RawValue {
    /// Values joined with commas; `None` for nested maps
    fn joined(&self) -> Option<String> {
        match self {
            RawValue::Text(s) => Some(s.clone()),
            RawValue::List(items) => Some(items.join(",")),
            RawValue::Map(_) => None,
        }
    }

    /// First value; `None` for nested maps and empty lists
    fn first(&self) -> Option<&str> {
        match self {
            RawValue::Text(s) => Some(s),
            RawValue::List(items) => items.first().map(String::as_str),
            RawValue::Map(_) => None,
        }
    }
}

/// Parsed query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawQuery {
    entries: BTreeMap<String, RawValue>,
}

impl RawQuery {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from decoded `(key, value)` pairs in request order
    pub fn from_pairs<I, K, V>(pairs: I) -> QueryResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut query = Self::new();
        for (key, value) in pairs {
            query.push(key.as_ref(), value.into())?;
        }
        Ok(query)
    }

    /// Add a single decoded pair
    pub fn push(&mut self, key: &str, value: String) -> QueryResult<()> {
        let (root, segments) = split_key(key);
        insert(&mut self.entries, &root, &segments, value, key)
    }

    /// Get a parameter by name
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.entries.get(key)
    }

    /// Comma-joined text of a parameter, if it is not a nested map
    pub fn joined(&self, key: &str) -> Option<String> {
        self.entries.get(key).and_then(RawValue::joined)
    }

    /// First text value of a parameter
    pub fn first(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(RawValue::first)
    }

    /// Copy of this parameter set with the reserved keys removed
    pub fn without_reserved(&self) -> RawQuery {
        RawQuery {
            entries: self
                .entries
                .iter()
                .filter(|(k, _)| !RESERVED_KEYS.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Iterate parameters in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One bracket segment of a parameter key
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Push,
}

/// Split `a[b][]` into root `a` and segments `[Key(b), Push]`.
///
/// Keys with unbalanced brackets or a leading bracket are literal.
fn split_key(key: &str) -> (String, Vec<Segment>) {
    let open = match key.find('[') {
        Some(pos) if pos > 0 => pos,
        _ => return (key.to_string(), Vec::new()),
    };

    let root = &key[..open];
    let mut segments = Vec::new();
    let mut rest = &key[open..];

    while !rest.is_empty() {
        if segments.len() == MAX_DEPTH {
            segments.push(Segment::Key(rest.to_string()));
            break;
        }

        let close = match (rest.starts_with('['), rest.find(']')) {
            (true, Some(close)) => close,
            _ => return (key.to_string(), Vec::new()),
        };

        let inner = &rest[1..close];
        if inner.is_empty() {
            segments.push(Segment::Push);
        } else {
            segments.push(Segment::Key(inner.to_string()));
        }
        rest = &rest[close + 1..];
    }

    (root.to_string(), segments)
}

fn insert(
    entries: &mut BTreeMap<String, RawValue>,
    key: &str,
    segments: &[Segment],
    value: String,
    full_key: &str,
) -> QueryResult<()> {
    match segments.split_first() {
        None | Some((Segment::Push, [])) => {
            let push = !segments.is_empty();
            match entries.remove(key) {
                None if push => {
                    entries.insert(key.to_string(), RawValue::List(vec![value]));
                }
                None => {
                    entries.insert(key.to_string(), RawValue::Text(value));
                }
                Some(RawValue::Text(old)) => {
                    entries.insert(key.to_string(), RawValue::List(vec![old, value]));
                }
                Some(RawValue::List(mut items)) => {
                    items.push(value);
                    entries.insert(key.to_string(), RawValue::List(items));
                }
                Some(map @ RawValue::Map(_)) => {
                    entries.insert(key.to_string(), map);
                    return Err(QueryError::ConflictingParameter(full_key.to_string()));
                }
            }
            Ok(())
        }
        Some((Segment::Push, _)) => Err(QueryError::ConflictingParameter(full_key.to_string())),
        Some((Segment::Key(next), rest)) => {
            let entry = entries
                .entry(key.to_string())
                .or_insert_with(|| RawValue::Map(RawQuery::new()));
            match entry {
                RawValue::Map(nested) => insert(&mut nested.entries, next, rest, value, full_key),
                _ => Err(QueryError::ConflictingParameter(full_key.to_string())),
            }
        }
    }
}
