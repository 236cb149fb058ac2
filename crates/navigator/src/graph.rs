use std::collections::{BTreeMap, BTreeSet};

use foundation::ids::{AdminId, ROOT_ID, district_id};
use foundation::level::Level;
use geodata::{
    AdminLookup, CollectionCache, CollectionKind, FeatureCollection, GeoDataSource, GeoError,
    LoadState, NodeDescriptor, COMMUNITY_FALLBACK_NAME, DISTRICT_FALLBACK_NAME,
    communities_for_parent, community_name, district_name, districts_for_canton,
};
use tracing::{debug, warn};

use crate::Navigate;
use crate::base::base_nodes;
use crate::node::Node;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigatorConfig {
    /// Start and fallback node. Unknown ids fall back to the country root.
    pub root_id: String,
    /// Suppresses `go_back` (quiz runner).
    pub disable_back: bool,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            root_id: ROOT_ID.to_string(),
            disable_back: false,
        }
    }
}

/// A geometry collection the graph needs; satisfied through
/// [`NodeGraph::on_collection_loaded`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchRequest {
    pub kind: CollectionKind,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Expansion {
    Districts(String),
    Communities(String),
}

impl Expansion {
    fn kind(&self) -> CollectionKind {
        match self {
            Expansion::Districts(_) => CollectionKind::Districts,
            Expansion::Communities(_) => CollectionKind::Communities,
        }
    }
}

/// The hierarchy navigator.
///
/// Owns every node record and the current position. Levels below the
/// cantons are materialized lazily from geometry collections: an expansion
/// whose collection is not resident yet is parked until the host reports
/// the fetch outcome.
///
/// Invariants:
/// - the root and the 26 cantons are always present;
/// - `current` always names a present node;
/// - each collection is fetched at most once at a time, and never again
///   after it became resident.
#[derive(Debug)]
pub struct NodeGraph {
    root_id: String,
    disable_back: bool,
    nodes: BTreeMap<String, Node>,
    current: String,
    cache: CollectionCache,
    expanded_cantons: BTreeSet<String>,
    expanded_parents: BTreeSet<String>,
    pending: BTreeSet<Expansion>,
    outbox: Vec<FetchRequest>,
}

impl Default for NodeGraph {
    fn default() -> Self {
        Self::new(NavigatorConfig::default())
    }
}

impl NodeGraph {
    pub fn new(config: NavigatorConfig) -> Self {
        let nodes = base_nodes();
        let root_id = if nodes.contains_key(config.root_id.trim()) {
            config.root_id.trim().to_string()
        } else {
            warn!(root = %config.root_id, "unknown navigator root, using country");
            ROOT_ID.to_string()
        };
        Self {
            current: root_id.clone(),
            root_id,
            disable_back: config.disable_back,
            nodes,
            cache: CollectionCache::new(),
            expanded_cantons: BTreeSet::new(),
            expanded_parents: BTreeSet::new(),
            pending: BTreeSet::new(),
            outbox: Vec::new(),
        }
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    pub fn current_id(&self) -> &str {
        &self.current
    }

    /// # Panics
    ///
    /// Never in practice: the root is a base node and pruning only ever
    /// removes community nodes.
    pub fn current(&self) -> &Node {
        self.nodes
            .get(&self.current)
            .or_else(|| self.nodes.get(&self.root_id))
            .expect("base graph always holds the root")
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &BTreeMap<String, Node> {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Child records of the current node; dangling ids are skipped.
    pub fn children(&self) -> Vec<&Node> {
        self.current()
            .children_ids
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .collect()
    }

    /// Root-to-current path following `parent_id` links.
    ///
    /// A revisited id ends the walk; the partial path is returned.
    pub fn breadcrumb(&self) -> Vec<&Node> {
        let mut path = Vec::new();
        let mut seen = BTreeSet::new();
        let mut cursor = Some(self.current());
        while let Some(node) = cursor {
            if !seen.insert(node.id.as_str()) {
                warn!(id = %node.id, "parent cycle in breadcrumb");
                break;
            }
            path.push(node);
            cursor = node.parent_id.as_deref().and_then(|p| self.nodes.get(p));
        }
        path.reverse();
        path
    }

    pub fn can_go_back(&self) -> bool {
        !self.disable_back && self.current != self.root_id && self.current().parent_id.is_some()
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded_cantons.contains(id) || self.expanded_parents.contains(id)
    }

    pub fn collection_state(&self, kind: CollectionKind) -> LoadState {
        self.cache.state(kind)
    }

    pub fn collection(&self, kind: CollectionKind) -> Option<&FeatureCollection> {
        self.cache.get(kind)
    }

    /// Moves to `id`, materializing it first when only its id is known.
    pub fn go_to(&mut self, id: &str) {
        let key = id.trim();
        if key.is_empty() {
            return;
        }

        if let Some(level) = self.nodes.get(key).map(|n| n.level) {
            self.current = key.to_string();
            match level {
                Level::Canton => self.expand_districts(key),
                Level::District => self.expand_communities(key),
                Level::Country | Level::Community => {}
            }
            return;
        }

        match AdminId::parse(key) {
            Ok(AdminId::District { canton, district }) => {
                let name = self
                    .cache
                    .get(CollectionKind::Districts)
                    .and_then(|fc| district_name(fc, &canton, &district))
                    .unwrap_or_else(|| DISTRICT_FALLBACK_NAME.to_string());
                self.insert_placeholder(key, name, Level::District, canton.clone());
                self.current = key.to_string();
                self.expand_districts(&canton);
                self.expand_communities(key);
            }
            Ok(AdminId::Community { canton, local }) => {
                let parent = self.placeholder_community_parent(&canton, &local);
                let name = self
                    .cache
                    .get(CollectionKind::Communities)
                    .and_then(|fc| community_name(fc, &canton, &local))
                    .unwrap_or_else(|| COMMUNITY_FALLBACK_NAME.to_string());
                self.insert_placeholder(key, name, Level::Community, parent.clone());
                self.current = key.to_string();
                self.expand_communities(&parent);
            }
            _ => {
                warn!(id = key, "unknown node id, returning to root");
                self.current = self.root_id.clone();
            }
        }
    }

    pub fn go_back(&mut self) {
        if self.disable_back {
            return;
        }
        let parent = self.current().parent_id.clone();
        match parent {
            Some(p) if self.nodes.contains_key(&p) => self.current = p,
            _ => {
                if self.current != self.root_id {
                    self.current = self.root_id.clone();
                }
            }
        }
    }

    /// Jumps to the deepest unit a position lookup resolved.
    pub fn apply_admin_lookup(&mut self, lookup: &AdminLookup) {
        if let Some(id) = lookup.deepest_id() {
            let id = id.to_string();
            self.go_to(&id);
        }
    }

    /// Drains the fetches the host has to perform.
    pub fn take_fetch_requests(&mut self) -> Vec<FetchRequest> {
        std::mem::take(&mut self.outbox)
    }

    /// Reports the outcome of a fetch and runs the expansions parked on it.
    ///
    /// On failure the parked expansions are dropped without being marked,
    /// so the next navigation to the same node asks again.
    pub fn on_collection_loaded(
        &mut self,
        kind: CollectionKind,
        result: Result<FeatureCollection, GeoError>,
    ) {
        let resident = self.cache.complete(kind, result);
        let parked: Vec<Expansion> = self
            .pending
            .iter()
            .filter(|e| e.kind() == kind)
            .cloned()
            .collect();
        for e in &parked {
            self.pending.remove(e);
        }

        if !resident {
            debug!(collection = %kind, dropped = parked.len(), "expansions dropped");
            return;
        }
        for e in parked {
            self.apply(e);
        }
        // District nodes can be the missing parents of community placeholders.
        self.reconcile_community_placeholders();
    }

    /// Satisfies queued fetches from `source` until none are left.
    pub fn pump(&mut self, source: &dyn GeoDataSource) {
        loop {
            let requests = self.take_fetch_requests();
            if requests.is_empty() {
                break;
            }
            for req in requests {
                let result = source.fetch(req.kind);
                self.on_collection_loaded(req.kind, result);
            }
        }
    }

    fn expand_districts(&mut self, canton: &str) {
        if self.expanded_cantons.contains(canton) {
            return;
        }
        self.request(Expansion::Districts(canton.to_string()));
    }

    fn expand_communities(&mut self, parent: &str) {
        if self.expanded_parents.contains(parent) {
            return;
        }
        self.request(Expansion::Communities(parent.to_string()));
    }

    fn request(&mut self, expansion: Expansion) {
        let kind = expansion.kind();
        if self.cache.is_resident(kind) {
            self.apply(expansion);
            return;
        }
        if !self.pending.insert(expansion) {
            return;
        }
        if self.cache.begin_load(kind) {
            self.outbox.push(FetchRequest { kind });
        }
    }

    fn apply(&mut self, expansion: Expansion) {
        match expansion {
            Expansion::Districts(canton) => self.apply_districts(&canton),
            Expansion::Communities(parent) => self.apply_communities(&parent),
        }
    }

    fn apply_districts(&mut self, canton: &str) {
        if self.expanded_cantons.contains(canton) || !self.nodes.contains_key(canton) {
            return;
        }
        let Some(fc) = self.cache.get(CollectionKind::Districts) else {
            return;
        };
        let descriptors = districts_for_canton(fc, canton);
        let ids: Vec<String> = descriptors.iter().map(|d| d.id.clone()).collect();
        for d in descriptors {
            self.merge(d);
        }
        self.expanded_cantons.insert(canton.to_string());
        debug!(canton, districts = ids.len(), "districts expanded");

        if ids.is_empty() {
            // Communities hang directly below; an earlier community
            // expansion of this canton already listed them.
            self.expand_communities(canton);
            return;
        }
        if let Some(node) = self.nodes.get_mut(canton) {
            node.children_ids = ids;
        }
    }

    fn apply_communities(&mut self, parent: &str) {
        let Some(fc) = self.cache.get(CollectionKind::Communities) else {
            return;
        };
        let descriptors = communities_for_parent(fc, parent);
        let ids: Vec<String> = descriptors.iter().map(|d| d.id.clone()).collect();
        let fresh: BTreeSet<&str> = ids.iter().map(String::as_str).collect();

        // Membership is authoritative: earlier communities of this parent
        // that are gone now are dropped, except the one being shown.
        let stale: Vec<String> = self
            .nodes
            .values()
            .filter(|n| {
                n.level == Level::Community
                    && n.id != self.root_id
                    && n.parent_id.as_deref() == Some(parent)
                    && !fresh.contains(n.id.as_str())
                    && n.id != self.current
            })
            .map(|n| n.id.clone())
            .collect();
        for id in &stale {
            self.nodes.remove(id);
        }

        for d in descriptors {
            self.merge(d);
        }

        let lists_districts = self.nodes.get(parent).is_some_and(|p| {
            p.children_ids
                .iter()
                .any(|c| self.nodes.get(c).is_some_and(|n| n.level == Level::District))
        });
        let Some(node) = self.nodes.get_mut(parent) else {
            // Parent not materialized yet; leave it unmarked so it expands once it is.
            return;
        };
        if !lists_districts {
            node.children_ids = ids.clone();
        }
        self.expanded_parents.insert(parent.to_string());
        debug!(parent, communities = ids.len(), pruned = stale.len(), "communities expanded");
    }

    /// Inserts or reconciles one authoritative node.
    ///
    /// A placeholder is replaced but keeps the children it already has and
    /// keeps its name when the incoming one is only the generic label. An
    /// authoritative node already present is left alone.
    fn merge(&mut self, d: NodeDescriptor) {
        match self.nodes.get_mut(&d.id) {
            Some(existing) if !existing.placeholder => {}
            Some(existing) => {
                if !d.generic_name {
                    existing.name = d.name;
                }
                existing.parent_id = Some(d.parent_id);
                existing.placeholder = false;
                debug!(id = %existing.id, "placeholder reconciled");
            }
            None => {
                let node = Node::new(d.id.clone(), d.name, d.level, Some(d.parent_id));
                self.nodes.insert(d.id, node);
            }
        }
    }

    fn insert_placeholder(&mut self, id: &str, name: String, level: Level, parent: String) {
        let mut node = Node::new(id, name, level, Some(parent));
        node.placeholder = true;
        debug!(id, level = %level, "placeholder synthesized");
        self.nodes.insert(id.to_string(), node);
    }

    /// Parent of a community that is not materialized yet.
    ///
    /// The resident community collection decides when it lists the
    /// community; its district is expanded first so it can take the child.
    /// Without data, or while that district is still unknown, the parent is
    /// inferred from the current position.
    fn placeholder_community_parent(&mut self, canton: &str, local: &str) -> String {
        if let Some(parent) = self.resident_community_parent(canton, local) {
            if !self.nodes.contains_key(&parent) {
                self.expand_districts(canton);
            }
            if self.nodes.contains_key(&parent) {
                return parent;
            }
        }
        self.inferred_community_parent(canton)
    }

    /// Parent recorded for `m-<canton>-<local>` in the resident community
    /// collection.
    fn resident_community_parent(&self, canton: &str, local: &str) -> Option<String> {
        let fc = self.cache.get(CollectionKind::Communities)?;
        let feature = fc.iter().find(|f| {
            f.canton_no().as_deref() == Some(canton) && f.local_id().as_deref() == Some(local)
        })?;
        Some(match feature.district_no() {
            Some(no) => district_id(canton, &no),
            None => canton.to_string(),
        })
    }

    /// The current district when it belongs to the same canton, else the
    /// canton itself.
    fn inferred_community_parent(&self, canton: &str) -> String {
        let current = self.current();
        if current.level == Level::District
            && AdminId::parse(&current.id).is_ok_and(|id| id.canton() == canton)
        {
            return current.id.clone();
        }
        canton.to_string()
    }

    /// Corrects parent and name of community placeholders from the resident
    /// community collection, then expands their true parent so the
    /// placeholder gets replaced.
    fn reconcile_community_placeholders(&mut self) {
        let Some(fc) = self.cache.get(CollectionKind::Communities) else {
            return;
        };
        let mut moves = Vec::new();
        for node in self.nodes.values().filter(|n| n.placeholder && n.level == Level::Community) {
            let Ok(AdminId::Community { canton, local }) = AdminId::parse(&node.id) else {
                continue;
            };
            let Some(parent) = self.resident_community_parent(&canton, &local) else {
                continue;
            };
            let name = community_name(fc, &canton, &local);
            moves.push((node.id.clone(), parent, name));
        }

        let mut parents = BTreeSet::new();
        for (id, parent, name) in moves {
            let parent_known = self.nodes.contains_key(&parent);
            let Some(node) = self.nodes.get_mut(&id) else {
                continue;
            };
            if let Some(name) = name {
                node.name = name;
            }
            if !parent_known {
                continue;
            }
            if node.parent_id.as_deref() != Some(parent.as_str()) {
                debug!(id, parent = %parent, "placeholder re-parented");
                node.parent_id = Some(parent.clone());
            }
            parents.insert(parent);
        }
        for parent in parents {
            self.expand_communities(&parent);
        }
    }
}

impl Navigate for NodeGraph {
    fn go_to(&mut self, id: &str) {
        NodeGraph::go_to(self, id);
    }

    fn current_id(&self) -> &str {
        NodeGraph::current_id(self)
    }

    fn root_id(&self) -> &str {
        NodeGraph::root_id(self)
    }
}

#[cfg(test)]
mod tests {
    use super::{FetchRequest, NavigatorConfig, NodeGraph};
    use crate::base::base_nodes;
    use foundation::level::Level;
    use geodata::{CollectionKind, FeatureCollection, GeoError, InMemorySource, LoadState};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn districts() -> FeatureCollection {
        FeatureCollection::from_geojson_value(json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "properties": { "kantonsnummer": 1, "bezirksnummer": 101, "name": "Affoltern" }, "geometry": null },
                { "type": "Feature", "properties": { "kantonsnummer": 1, "bezirksnummer": 102, "name": "Andelfingen" }, "geometry": null },
                { "type": "Feature", "properties": { "kantonsnummer": 2, "bezirksnummer": 241, "name": "Jura bernois" }, "geometry": null }
            ]
        }))
        .unwrap()
    }

    fn communities() -> FeatureCollection {
        FeatureCollection::from_geojson_value(json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "properties": { "kantonsnummer": 1, "bezirksnummer": 101, "id": 1, "name": "Aeugst am Albis" }, "geometry": null },
                { "type": "Feature", "properties": { "kantonsnummer": 1, "bezirksnummer": 101, "id": 2, "name": "Affoltern am Albis" }, "geometry": null },
                { "type": "Feature", "properties": { "kantonsnummer": 1, "bezirksnummer": 102, "id": 21, "name": "Adlikon" }, "geometry": null },
                { "type": "Feature", "properties": { "kantonsnummer": 4, "id": 1201, "name": "Altdorf" }, "geometry": null },
                { "type": "Feature", "properties": { "kantonsnummer": 4, "id": 1202, "name": "Andermatt" }, "geometry": null }
            ]
        }))
        .unwrap()
    }

    fn source() -> InMemorySource {
        InMemorySource::new()
            .with(CollectionKind::Districts, districts())
            .with(CollectionKind::Communities, communities())
    }

    #[test]
    fn starts_at_root() {
        let g = NodeGraph::default();
        assert_eq!(g.current_id(), "ch");
        assert_eq!(g.children().len(), 26);
        assert!(!g.can_go_back());
        assert_eq!(g.breadcrumb().len(), 1);
    }

    #[test]
    fn unknown_root_falls_back_to_country() {
        let g = NodeGraph::new(NavigatorConfig {
            root_id: "nowhere".into(),
            disable_back: false,
        });
        assert_eq!(g.root_id(), "ch");
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut g = NodeGraph::default();
        g.go_to("2");
        g.go_to("   ");
        assert_eq!(g.current_id(), "2");
    }

    #[test]
    fn canton_requests_districts_once() {
        let mut g = NodeGraph::default();
        g.go_to("1");
        g.go_to("1");
        assert_eq!(
            g.take_fetch_requests(),
            vec![FetchRequest {
                kind: CollectionKind::Districts
            }]
        );
        g.go_to("2");
        assert!(g.take_fetch_requests().is_empty());
        assert_eq!(g.collection_state(CollectionKind::Districts), LoadState::Loading);

        g.on_collection_loaded(CollectionKind::Districts, Ok(districts()));
        assert_eq!(g.node("1").unwrap().children_ids, vec!["d-1-101", "d-1-102"]);
        assert_eq!(g.node("2").unwrap().children_ids, vec!["d-2-241"]);
        assert!(g.is_expanded("1"));
    }

    #[test]
    fn district_expansion_lists_communities() {
        let src = source();
        let mut g = NodeGraph::default();
        g.go_to("1");
        g.pump(&src);
        g.go_to("d-1-101");
        g.pump(&src);

        let names: Vec<&str> = g.children().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Aeugst am Albis", "Affoltern am Albis"]);
        let crumbs: Vec<&str> = g.breadcrumb().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(crumbs, vec!["ch", "1", "d-1-101"]);
        assert!(g.can_go_back());
    }

    #[test]
    fn canton_without_districts_gets_communities() {
        let src = source();
        let mut g = NodeGraph::default();
        g.go_to("4");
        g.pump(&src);

        let kids = g.children();
        assert_eq!(kids.len(), 2);
        for k in kids {
            assert_eq!(k.level, Level::Community);
            assert_eq!(k.parent_id.as_deref(), Some("4"));
            assert!(k.id.starts_with("m-4-"));
        }
    }

    #[test]
    fn failed_fetch_retries_on_next_visit() {
        let mut g = NodeGraph::default();
        g.go_to("1");
        assert_eq!(g.take_fetch_requests().len(), 1);
        g.on_collection_loaded(
            CollectionKind::Districts,
            Err(GeoError::Unavailable("offline".into())),
        );
        assert!(g.children().is_empty());
        assert!(!g.is_expanded("1"));

        g.go_to("1");
        assert_eq!(g.take_fetch_requests().len(), 1);
        g.on_collection_loaded(CollectionKind::Districts, Ok(districts()));
        assert_eq!(g.children().len(), 2);
    }

    #[test]
    fn unknown_district_becomes_placeholder() {
        let mut g = NodeGraph::default();
        g.go_to("d-7-99");
        let cur = g.current();
        assert_eq!(cur.level, Level::District);
        assert_eq!(cur.name, "Bezirk");
        assert_eq!(cur.parent_id.as_deref(), Some("7"));
        assert!(cur.placeholder);

        let mut kinds: Vec<CollectionKind> =
            g.take_fetch_requests().into_iter().map(|r| r.kind).collect();
        kinds.sort();
        assert_eq!(kinds, vec![CollectionKind::Districts, CollectionKind::Communities]);
    }

    #[test]
    fn placeholder_district_replaced_by_authoritative_node() {
        let mut g = NodeGraph::default();
        g.go_to("d-1-102");
        assert_eq!(g.current().name, "Bezirk");
        g.pump(&source());

        let node = g.node("d-1-102").unwrap();
        assert_eq!(node.name, "Andelfingen");
        assert!(!node.placeholder);
        assert_eq!(node.children_ids, vec!["m-1-21"]);
        let listed = g.node("1").unwrap().children_ids.iter().filter(|c| *c == "d-1-102").count();
        assert_eq!(listed, 1);
    }

    #[test]
    fn unknown_community_uses_current_district_as_parent() {
        let src = source();
        let mut g = NodeGraph::default();
        g.go_to("1");
        g.pump(&src);
        g.go_to("d-1-101");
        g.go_to("m-1-2");
        assert_eq!(g.current().parent_id.as_deref(), Some("d-1-101"));
        g.pump(&src);
        assert_eq!(g.current().name, "Affoltern am Albis");
    }

    #[test]
    fn community_placeholder_is_moved_under_its_district() {
        let src = source();
        let mut g = NodeGraph::default();
        g.go_to("m-1-21");
        assert_eq!(g.current().parent_id.as_deref(), Some("1"));
        g.go_to("1");
        g.go_to("m-1-21");
        g.pump(&src);

        let node = g.node("m-1-21").unwrap();
        assert_eq!(node.parent_id.as_deref(), Some("d-1-102"));
        assert_eq!(node.name, "Adlikon");
        assert!(!node.placeholder);
        assert_eq!(
            g.node("1").unwrap().children_ids,
            vec!["d-1-101", "d-1-102"]
        );
    }

    #[test]
    fn deep_link_then_canton_keeps_direct_communities() {
        let src = source();
        let mut g = NodeGraph::default();
        g.go_to("m-4-1201");
        g.pump(&src);
        assert_eq!(g.node("4").unwrap().children_ids, vec!["m-4-1201", "m-4-1202"]);

        g.go_to("4");
        g.pump(&src);
        assert!(g.is_expanded("4"));
        let kids: Vec<&str> = g.children().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(kids, vec!["m-4-1201", "m-4-1202"]);
    }

    #[test]
    fn resident_communities_place_placeholder_under_its_district() {
        let src = source();
        let mut g = NodeGraph::default();
        g.go_to("1");
        g.pump(&src);
        g.go_to("d-1-101");
        g.pump(&src);
        assert!(g.node("m-1-21").is_none());

        g.go_to("ch");
        g.go_to("m-1-21");
        assert!(g.take_fetch_requests().is_empty());

        let node = g.node("m-1-21").unwrap();
        assert_eq!(node.parent_id.as_deref(), Some("d-1-102"));
        assert_eq!(node.name, "Adlikon");
        assert!(!node.placeholder);
        let crumbs: Vec<&str> = g.breadcrumb().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(crumbs, vec!["ch", "1", "d-1-102", "m-1-21"]);
    }

    #[test]
    fn breadcrumb_stops_at_parent_cycle() {
        let mut g = NodeGraph::default();
        g.go_to("1");
        g.nodes.get_mut("1").unwrap().parent_id = Some("2".to_string());
        g.nodes.get_mut("2").unwrap().parent_id = Some("1".to_string());

        let crumbs: Vec<&str> = g.breadcrumb().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(crumbs, vec!["2", "1"]);
    }

    #[test]
    fn pruning_only_drops_stale_communities() {
        let src = source();
        let mut g = NodeGraph::default();
        g.go_to("m-4-9999");
        assert!(g.current().placeholder);
        g.go_to("4");
        g.pump(&src);

        assert!(g.node("m-4-9999").is_none());
        for id in base_nodes().keys() {
            assert!(g.node(id).is_some(), "base node {id} missing");
        }
        assert_eq!(g.current_id(), "4");
        assert_eq!(g.children().len(), 2);
    }

    #[test]
    fn garbage_id_returns_to_root() {
        let mut g = NodeGraph::default();
        g.go_to("2");
        g.go_to("x-9");
        assert_eq!(g.current_id(), "ch");
        g.go_to("2");
        g.go_to("27");
        assert_eq!(g.current_id(), "ch");
    }

    #[test]
    fn go_back_climbs_and_stops_at_root() {
        let src = source();
        let mut g = NodeGraph::default();
        g.go_to("1");
        g.pump(&src);
        g.go_to("d-1-101");
        g.pump(&src);
        g.go_back();
        assert_eq!(g.current_id(), "1");
        g.go_back();
        g.go_back();
        assert_eq!(g.current_id(), "ch");
    }

    #[test]
    fn disabled_back_stays_put() {
        let mut g = NodeGraph::new(NavigatorConfig {
            root_id: "ch".into(),
            disable_back: true,
        });
        g.go_to("3");
        assert!(!g.can_go_back());
        g.go_back();
        assert_eq!(g.current_id(), "3");
    }
}
