//! Geometry collection providers.
//!
//! A [`GeoDataSource`] hands out whole collections by kind. Callers treat every
//! error as "unavailable" and degrade; nothing here retries on its own.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use crate::collection::{CollectionKind, FeatureCollection};
use crate::error::GeoError;

pub trait GeoDataSource: Send + Sync {
    fn fetch(&self, kind: CollectionKind) -> Result<FeatureCollection, GeoError>;
}

/// Reads `<root>/<kind>.geojson` from the filesystem.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, kind: CollectionKind) -> PathBuf {
        self.root.join(kind.file_name())
    }
}

impl GeoDataSource for DirectorySource {
    fn fetch(&self, kind: CollectionKind) -> Result<FeatureCollection, GeoError> {
        let path = self.path_for(kind);
        let payload = std::fs::read_to_string(&path)
            .map_err(|e| GeoError::Unavailable(format!("{}: {e}", path.display())))?;
        FeatureCollection::from_geojson_str(&payload)
    }
}

/// Fixed collections held in memory; a missing kind fails as unavailable.
///
/// Counts fetches per kind so callers can verify load-once behaviour.
#[derive(Debug, Default)]
pub struct InMemorySource {
    collections: BTreeMap<CollectionKind, FeatureCollection>,
    fetches: [AtomicU32; 3],
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: CollectionKind, collection: FeatureCollection) -> Self {
        self.collections.insert(kind, collection);
        self
    }

    pub fn fetch_count(&self, kind: CollectionKind) -> u32 {
        self.fetches[slot(kind)].load(Ordering::Relaxed)
    }
}

fn slot(kind: CollectionKind) -> usize {
    match kind {
        CollectionKind::Cantons => 0,
        CollectionKind::Districts => 1,
        CollectionKind::Communities => 2,
    }
}

impl GeoDataSource for InMemorySource {
    fn fetch(&self, kind: CollectionKind) -> Result<FeatureCollection, GeoError> {
        self.fetches[slot(kind)].fetch_add(1, Ordering::Relaxed);
        self.collections
            .get(&kind)
            .cloned()
            .ok_or_else(|| GeoError::Unavailable(format!("{kind} not provided")))
    }
}
