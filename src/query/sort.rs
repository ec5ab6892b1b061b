//! Sort order from the `sort` parameter.

/// Field that documents are sorted by when the request names none
pub const DEFAULT_SORT_FIELD: &str = "createdAt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Parse `name` (ascending) or `-name` (descending)
    fn parse(token: &str) -> Self {
        match token.strip_prefix('-') {
            Some(field) => Self::desc(field),
            None => Self::asc(token),
        }
    }
}

/// Ordered sort keys, earlier keys take precedence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            keys: vec![SortKey::desc(DEFAULT_SORT_FIELD)],
        }
    }
}

impl SortSpec {
    pub fn new(keys: Vec<SortKey>) -> Self {
        Self { keys }
    }

    /// Parse a comma separated `sort` value; absent or blank means newest first
    pub fn from_param(sort: Option<&str>) -> Self {
        let keys: Vec<SortKey> = sort
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != "-")
            .map(SortKey::parse)
            .collect();

        if keys.is_empty() {
            Self::default()
        } else {
            Self { keys }
        }
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_directions() {
        let spec = SortSpec::from_param(Some("-rating,name"));
        assert_eq!(
            spec.keys(),
            [SortKey::desc("rating"), SortKey::asc("name")]
        );
    }

    #[test]
    fn test_default_is_newest_first() {
        let expected = [SortKey::desc("createdAt")];
        assert_eq!(SortSpec::from_param(None).keys(), expected);
        assert_eq!(SortSpec::from_param(Some("")).keys(), expected);
        assert_eq!(SortSpec::from_param(Some(",-")).keys(), expected);
    }
}
