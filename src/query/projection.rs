//! Field selection from the `select` parameter.

use super::errors::{QueryError, QueryResult};

/// Fields to return for each document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Projection {
    /// Every field
    #[default]
    All,
    /// Only these fields, in request order (`_id` is always kept)
    Include(Vec<String>),
    /// Every field except these
    Exclude(Vec<String>),
}

impl Projection {
    /// Parse a comma separated `select` value.
    ///
    /// `name,age` selects fields; `-password` drops them. Absent or blank
    /// values select everything.
    pub fn from_select(select: Option<&str>) -> QueryResult<Self> {
        let select = match select {
            Some(s) => s,
            None => return Ok(Projection::All),
        };

        let tokens: Vec<&str> = select
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if tokens.is_empty() {
            return Ok(Projection::All);
        }

        let excluded = tokens.iter().filter(|t| t.starts_with('-')).count();
        if excluded == 0 {
            Ok(Projection::Include(
                tokens.into_iter().map(str::to_string).collect(),
            ))
        } else if excluded == tokens.len() {
            Ok(Projection::Exclude(
                tokens
                    .into_iter()
                    .map(|t| t.trim_start_matches('-').to_string())
                    .collect(),
            ))
        } else {
            Err(QueryError::MixedProjection(select.to_string()))
        }
    }

    /// Field names in order; empty for [`Projection::All`]
    pub fn fields(&self) -> &[String] {
        match self {
            Projection::All => &[],
            Projection::Include(fields) | Projection::Exclude(fields) => fields,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Projection::All)
    }
}
