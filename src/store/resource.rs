//! # Resources
//!
//! The document collections served by the API.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Unknown collection name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown resource: {0}")]
pub struct UnknownResource(pub String);

/// A served collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Ngos,
    Animals,
    Reviews,
    Users,
}

impl Resource {
    pub const ALL: [Resource; 4] = [
        Resource::Ngos,
        Resource::Animals,
        Resource::Reviews,
        Resource::Users,
    ];

    /// Collection name, also used as the URL segment and seed file stem
    pub fn collection_name(&self) -> &'static str {
        match self {
            Resource::Ngos => "ngos",
            Resource::Animals => "animals",
            Resource::Reviews => "reviews",
            Resource::Users => "users",
        }
    }

    /// Singular name used in messages
    pub fn label(&self) -> &'static str {
        match self {
            Resource::Ngos => "NGO",
            Resource::Animals => "Animal",
            Resource::Reviews => "Review",
            Resource::Users => "User",
        }
    }

    /// Fields a new document must carry
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Resource::Ngos => &["name", "description", "address", "goals"],
            Resource::Animals => &["animal_species", "description", "address", "rescue_priority"],
            Resource::Reviews => &["title", "text", "overall"],
            Resource::Users => &["name", "email"],
        }
    }

    /// Field referencing the owning NGO, for resources nested under one
    pub fn parent_field(&self) -> Option<&'static str> {
        match self {
            Resource::Animals | Resource::Reviews => Some("ngo"),
            Resource::Ngos | Resource::Users => None,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection_name())
    }
}

impl FromStr for Resource {
    type Err = UnknownResource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|r| r.collection_name() == s)
            .ok_or_else(|| UnknownResource(s.to_string()))
    }
}
