use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::collection::{CollectionKind, FeatureCollection};
use crate::error::GeoError;

/// Load lifecycle of one geometry collection.
///
/// Unloaded → Loading → Resident, or Loading → Failed. A failed collection is
/// eligible for another load; a resident one is never fetched again.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loading,
    Resident,
    Failed,
}

#[derive(Debug)]
struct Slot {
    state: LoadState,
    data: Option<FeatureCollection>,
    fetches: u32,
}

impl Default for Slot {
    fn default() -> Self {
        Self {
            state: LoadState::Unloaded,
            data: None,
            fetches: 0,
        }
    }
}

/// Session cache for the geometry collections.
///
/// The loading guard serializes fetch initiation: while a collection is
/// `Loading`, further [`CollectionCache::begin_load`] calls return `false`
/// so concurrent requests share the outstanding fetch.
#[derive(Debug, Default)]
pub struct CollectionCache {
    slots: BTreeMap<CollectionKind, Slot>,
}

impl CollectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, kind: CollectionKind) -> LoadState {
        self.slots
            .get(&kind)
            .map(|s| s.state)
            .unwrap_or(LoadState::Unloaded)
    }

    pub fn get(&self, kind: CollectionKind) -> Option<&FeatureCollection> {
        self.slots.get(&kind).and_then(|s| s.data.as_ref())
    }

    pub fn is_resident(&self, kind: CollectionKind) -> bool {
        self.state(kind) == LoadState::Resident
    }

    /// Number of fetches initiated for `kind` this session.
    pub fn fetch_count(&self, kind: CollectionKind) -> u32 {
        self.slots.get(&kind).map(|s| s.fetches).unwrap_or(0)
    }

    /// Claims the right to fetch `kind`.
    ///
    /// Returns `true` only when the caller must start a fetch; `false` when the
    /// collection is already resident or a fetch is in flight.
    pub fn begin_load(&mut self, kind: CollectionKind) -> bool {
        let slot = self.slots.entry(kind).or_default();
        match slot.state {
            LoadState::Resident | LoadState::Loading => false,
            LoadState::Unloaded | LoadState::Failed => {
                slot.state = LoadState::Loading;
                slot.fetches = slot.fetches.saturating_add(1);
                debug!(collection = %kind, "geometry fetch started");
                true
            }
        }
    }

    /// Records the outcome of a fetch. Returns `true` if the collection is
    /// resident afterwards.
    ///
    /// A result for an already resident collection is ignored so the data of
    /// the first successful fetch stays authoritative.
    pub fn complete(
        &mut self,
        kind: CollectionKind,
        result: Result<FeatureCollection, GeoError>,
    ) -> bool {
        let slot = self.slots.entry(kind).or_default();
        if slot.state == LoadState::Resident {
            return true;
        }
        match result {
            Ok(fc) => {
                debug!(collection = %kind, features = fc.len(), "geometry collection resident");
                slot.data = Some(fc);
                slot.state = LoadState::Resident;
                true
            }
            Err(err) => {
                warn!(collection = %kind, error = %err, "geometry collection unavailable");
                slot.data = None;
                slot.state = LoadState::Failed;
                false
            }
        }
    }
}
