//! # Database
//!
//! One in-memory collection per resource, plus the cross-collection
//! bookkeeping that accompanies writes:
//! - NGOs get a URL slug derived from their name
//! - Animals get `vaccinated` and `photo` defaults
//! - Deleting an NGO deletes its animals
//! - Writing or deleting a review refreshes the NGO's `averageRating`

use std::path::Path;

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::query::FilterExpression;

use super::errors::EngineResult;
use super::memory::MemoryCollection;
use super::resource::Resource;
use super::snapshot::load_snapshot;

/// Photo stored for animals created without one
pub const DEFAULT_ANIMAL_PHOTO: &str = "no-photo";

/// All collections served by the API
#[derive(Debug)]
pub struct Database {
    ngos: MemoryCollection,
    animals: MemoryCollection,
    reviews: MemoryCollection,
    users: MemoryCollection,
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl Database {
    pub fn new() -> Self {
        Self {
            ngos: MemoryCollection::new(Resource::Ngos.collection_name()),
            animals: MemoryCollection::new(Resource::Animals.collection_name()),
            reviews: MemoryCollection::new(Resource::Reviews.collection_name()),
            users: MemoryCollection::new(Resource::Users.collection_name()),
        }
    }

    pub fn collection(&self, resource: Resource) -> &MemoryCollection {
        match resource {
            Resource::Ngos => &self.ngos,
            Resource::Animals => &self.animals,
            Resource::Reviews => &self.reviews,
            Resource::Users => &self.users,
        }
    }

    /// Load `<collection>.json` for every resource that has one in `dir`.
    ///
    /// Returns the number of documents loaded.
    pub fn seed_from_dir(&self, dir: &Path) -> EngineResult<usize> {
        let mut total = 0;
        for resource in Resource::ALL {
            let path = dir.join(format!("{}.json", resource.collection_name()));
            if !path.is_file() {
                debug!(path = %path.display(), "no seed file");
                continue;
            }

            let loaded = self.collection(resource).insert_many(load_snapshot(&path)?)?;
            info!(collection = %resource, documents = loaded, "collection seeded");
            total += loaded;
        }
        Ok(total)
    }

    /// Insert a document and apply the resource's write hooks
    pub fn insert(&self, resource: Resource, mut doc: Value) -> EngineResult<Value> {
        match resource {
            Resource::Ngos => apply_slug(&mut doc),
            Resource::Animals => apply_animal_defaults(&mut doc),
            Resource::Reviews | Resource::Users => {}
        }

        let doc = self.collection(resource).insert(doc)?;

        if resource == Resource::Reviews {
            self.refresh_ngo_rating(&doc)?;
        }
        Ok(doc)
    }

    /// Merge `patch` into a document and apply the resource's write hooks
    pub fn update(
        &self,
        resource: Resource,
        id: &str,
        mut patch: Value,
    ) -> EngineResult<Option<Value>> {
        if resource == Resource::Ngos {
            apply_slug(&mut patch);
        }

        let previous = match resource {
            Resource::Reviews => self.reviews.get(id)?,
            _ => None,
        };

        let updated = self.collection(resource).update(id, patch)?;

        if let (Resource::Reviews, Some(doc)) = (resource, &updated) {
            self.refresh_ngo_rating(doc)?;
            // A review moved to another NGO leaves the old one to recompute
            if let Some(old) = previous.filter(|old| old.get("ngo") != doc.get("ngo")) {
                self.refresh_ngo_rating(&old)?;
            }
        }
        Ok(updated)
    }

    /// Delete a document along with whatever depends on it
    pub fn delete(&self, resource: Resource, id: &str) -> EngineResult<Option<Value>> {
        let deleted = match self.collection(resource).delete(id)? {
            Some(doc) => doc,
            None => return Ok(None),
        };

        match resource {
            Resource::Ngos => {
                let orphans = FilterExpression::new().with_equals("ngo", id);
                let removed = self.animals.delete_many(&orphans)?;
                debug!(ngo = id, animals = removed, "cascaded NGO delete");
            }
            Resource::Reviews => self.refresh_ngo_rating(&deleted)?,
            Resource::Animals | Resource::Users => {}
        }
        Ok(Some(deleted))
    }

    /// Recompute `averageRating` for the NGO a review belongs to
    fn refresh_ngo_rating(&self, review: &Value) -> EngineResult<()> {
        let ngo_id = match review.get("ngo").and_then(Value::as_str) {
            Some(id) => id,
            None => return Ok(()),
        };

        let reviews = self
            .reviews
            .find_all(&FilterExpression::new().with_equals("ngo", ngo_id))?;
        let ratings: Vec<f64> = reviews
            .iter()
            .filter_map(|r| r.get("overall").and_then(Value::as_f64))
            .collect();

        let average = if ratings.is_empty() {
            Value::Null
        } else {
            serde_json::Number::from_f64(ratings.iter().sum::<f64>() / ratings.len() as f64)
                .map(Value::Number)
                .unwrap_or(Value::Null)
        };

        self.ngos
            .update(ngo_id, json!({ "averageRating": average }))?;
        Ok(())
    }
}

/// Set `slug` from `name` when a name is present
fn apply_slug(doc: &mut Value) {
    let slug = match doc.get("name").and_then(Value::as_str) {
        Some(name) => slugify(name),
        None => return,
    };
    if let Some(obj) = doc.as_object_mut() {
        obj.insert("slug".to_string(), Value::String(slug));
    }
}

fn apply_animal_defaults(doc: &mut Value) {
    if let Some(obj) = doc.as_object_mut() {
        obj.entry("vaccinated").or_insert(Value::Bool(false));
        obj.entry("photo")
            .or_insert_with(|| Value::String(DEFAULT_ANIMAL_PHOTO.to_string()));
    }
}

/// Lowercase, with runs of non-alphanumerics collapsed to single dashes
pub fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
