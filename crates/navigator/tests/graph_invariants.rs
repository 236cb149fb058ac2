use geodata::{CollectionKind, FeatureCollection, InMemorySource};
use navigator::{NodeGraph, Node};
use foundation::level::Level;
use serde_json::{Value, json};

fn feature(props: Value) -> Value {
    json!({ "type": "Feature", "properties": props, "geometry": null })
}

fn collection(features: Vec<Value>) -> FeatureCollection {
    FeatureCollection::from_geojson_value(json!({
        "type": "FeatureCollection",
        "features": features,
    }))
    .unwrap()
}

fn source() -> InMemorySource {
    let districts = collection(vec![
        feature(json!({ "kantonsnummer": 1, "bezirksnummer": 101, "name": "Affoltern" })),
        feature(json!({ "kantonsnummer": 1, "bezirksnummer": 102, "name": "Andelfingen" })),
        feature(json!({ "kantonsnummer": 2, "bezirksnummer": 241, "name": "Jura bernois" })),
        feature(json!({ "kantonsnummer": 2, "bezirksnummer": 242, "bezirksname": "Biel/Bienne" })),
        feature(json!({ "kantonsnummer": 7, "bezirksnummer": "", "name": "Nidwalden" })),
    ]);
    let communities = collection(vec![
        feature(json!({ "kantonsnummer": 1, "bezirksnummer": 101, "id": 1, "name": "Aeugst am Albis" })),
        feature(json!({ "kantonsnummer": 1, "bezirksnummer": 102, "id": 21, "name": "Adlikon" })),
        feature(json!({ "kantonsnummer": 2, "bezirksnummer": 242, "id": 371, "gemeindename": "Biel/Bienne" })),
        feature(json!({ "kantonsnummer": 7, "id": 1501, "name": "Beckenried" })),
        feature(json!({ "kantonsnummer": 7, "id": 1502, "name": "Buochs" })),
        feature(json!({ "kantonsnummer": 7, "id": "1509", "name": "Stans" })),
    ]);
    InMemorySource::new()
        .with(CollectionKind::Districts, districts)
        .with(CollectionKind::Communities, communities)
}

fn assert_consistent(g: &NodeGraph) {
    let roots: Vec<&Node> = g.nodes().values().filter(|n| n.parent_id.is_none()).collect();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].level, Level::Country);

    for n in g.nodes().values() {
        if n.level != Level::Country {
            assert!(n.parent_id.is_some(), "{} has no parent", n.id);
        }
        let mut seen = std::collections::BTreeSet::new();
        for child_id in &n.children_ids {
            assert!(seen.insert(child_id), "{} lists {} twice", n.id, child_id);
            let child = g.node(child_id).unwrap_or_else(|| panic!("dangling child {child_id}"));
            assert_eq!(child.parent_id.as_deref(), Some(n.id.as_str()));
            assert!(n.level.admits_child(child.level), "{} -> {}", n.id, child.id);
        }
    }
}

#[test]
fn graph_stays_consistent_through_a_session() {
    let src = source();
    let mut g = NodeGraph::default();
    for id in ["1", "d-1-101", "m-1-1", "2", "d-2-242", "7", "m-7-1509", "d-7-99", "ch", "m-2-371"] {
        g.go_to(id);
        g.pump(&src);
        assert_consistent(&g);
    }
}

#[test]
fn concurrent_canton_expansion_fetches_once() {
    let src = source();
    let mut g = NodeGraph::default();
    g.go_to("1");
    g.go_to("ch");
    g.go_to("1");
    g.pump(&src);
    g.go_to("1");
    g.pump(&src);

    assert_eq!(src.fetch_count(CollectionKind::Districts), 1);
    assert_eq!(g.node("1").unwrap().children_ids, vec!["d-1-101", "d-1-102"]);
    let districts = g.nodes().values().filter(|n| n.level == Level::District).count();
    assert_eq!(districts, 2);
}

#[test]
fn canton_without_districts_lists_communities_directly() {
    let src = source();
    let mut g = NodeGraph::default();
    g.go_to("7");
    g.pump(&src);

    let kids: Vec<&str> = g.children().iter().map(|n| n.id.as_str()).collect();
    assert_eq!(kids, vec!["m-7-1501", "m-7-1502", "m-7-1509"]);
    assert!(kids.iter().all(|id| !id.contains("d-")));
    assert_eq!(src.fetch_count(CollectionKind::Communities), 1);
}

#[test]
fn unseen_district_never_duplicates() {
    let src = source();
    let mut g = NodeGraph::default();
    g.go_to("d-7-99");
    assert_eq!(g.current().level, Level::District);
    g.pump(&src);
    g.go_to("7");
    g.pump(&src);

    let copies = g.nodes().keys().filter(|k| k.as_str() == "d-7-99").count();
    assert_eq!(copies, 1);
    assert_consistent(&g);
}

#[test]
fn name_fallback_keys_are_used() {
    let src = source();
    let mut g = NodeGraph::default();
    g.go_to("2");
    g.pump(&src);
    assert_eq!(g.node("d-2-242").unwrap().name, "Biel/Bienne");
    g.go_to("d-2-242");
    g.pump(&src);
    assert_eq!(g.node("m-2-371").unwrap().name, "Biel/Bienne");
}

#[test]
fn breadcrumb_walks_from_root() {
    let src = source();
    let mut g = NodeGraph::default();
    g.go_to("m-1-21");
    g.pump(&src);
    g.go_to("1");
    g.pump(&src);
    g.go_to("m-1-21");

    let crumbs: Vec<&str> = g.breadcrumb().iter().map(|n| n.name.as_str()).collect();
    assert_eq!(crumbs, vec!["Schweiz", "Kanton Zürich", "Andelfingen", "Adlikon"]);
}
