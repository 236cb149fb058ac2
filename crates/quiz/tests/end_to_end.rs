use std::sync::Arc;

use foundation::time::Millis;
use geodata::{CollectionKind, FeatureCollection, InMemorySource};
use navigator::NodeGraph;
use pretty_assertions::assert_eq;
use quiz::{Phase, QuizEngine, QuizModeCatalog, QuizTarget, SolvedTier, cantons_mode};
use serde_json::json;

fn districts() -> FeatureCollection {
    FeatureCollection::from_geojson_value(json!({
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "properties": { "kantonsnummer": 2, "bezirksnummer": 241, "name": "Jura bernois" }, "geometry": null },
            { "type": "Feature", "properties": { "kantonsnummer": 2, "bezirksnummer": 242, "name": "Biel/Bienne" }, "geometry": null }
        ]
    }))
    .unwrap()
}

fn communities() -> FeatureCollection {
    FeatureCollection::from_geojson_value(json!({
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "properties": { "kantonsnummer": 2, "bezirksnummer": 242, "id": 371, "name": "Biel/Bienne" }, "geometry": null },
            { "type": "Feature", "properties": { "kantonsnummer": 4, "id": 1201, "name": "Altdorf" }, "geometry": null }
        ]
    }))
    .unwrap()
}

#[test]
fn three_canton_round() {
    let mut nav = NodeGraph::default();
    let mut engine = QuizEngine::with_seed(42);
    let ticket = engine.select_mode(&cantons_mode());
    let pool = vec![
        QuizTarget::new("Zürich", ["1"]),
        QuizTarget::new("Bern", ["2"]),
        QuizTarget::new("Uri", ["4"]),
    ];
    assert!(engine.on_pool_loaded(&ticket, Ok(pool), &mut nav));
    assert_eq!(engine.phase(), Phase::Armed);
    engine.start_quiz();

    let mut now = 0;
    let mut solved = Vec::new();
    while !engine.finished() {
        let id = engine.target().unwrap().path[0].clone();
        assert_eq!(engine.step(), 0);
        engine.on_select_node(&id, &mut nav);
        assert_eq!(engine.locked_fills()[id.as_str()], SolvedTier::White);
        solved.push(id);
        assert_eq!(engine.remaining().len(), 3 - solved.len());

        if solved.len() < 3 {
            let left: Vec<String> = engine.remaining().iter().map(|t| t.path[0].clone()).collect();
            now += 650;
            engine.advance_to(Millis(now), &mut nav);
            assert!(left.contains(&engine.target().unwrap().path[0]));
        } else {
            now += 650;
            engine.advance_to(Millis(now), &mut nav);
        }
    }

    solved.sort();
    assert_eq!(solved, vec!["1", "2", "4"]);
    assert_eq!(engine.progress_done(), 3);
    assert_eq!(engine.skill_percent(), 100);

    let frozen = engine.elapsed_sec();
    assert_eq!(frozen, 1);
    engine.advance_to(Millis(now + 10_000), &mut nav);
    assert_eq!(engine.elapsed_sec(), frozen);
}

#[test]
fn district_mode_starts_inside_its_canton() {
    let source = Arc::new(
        InMemorySource::new()
            .with(CollectionKind::Districts, districts())
            .with(CollectionKind::Communities, communities()),
    );
    let catalog = QuizModeCatalog::new(source.clone());
    let mode = catalog.mode("ch-districts-2").unwrap();

    let mut nav = NodeGraph::default();
    let mut engine = QuizEngine::with_seed(5);
    engine.select_and_load(mode, catalog.source(), &mut nav);
    nav.pump(source.as_ref());

    assert_eq!(nav.current_id(), "2");
    assert_eq!(nav.children().len(), 2);
    assert_eq!(engine.progress_total(), 2);

    engine.start_quiz();
    let target = engine.target().unwrap().clone();
    engine.on_select_node(&target.path[0], &mut nav);
    engine.advance_to(Millis(650), &mut nav);
    assert_eq!(engine.phase(), Phase::Running);
    assert_eq!(nav.current_id(), "2");
}

#[test]
fn community_round_walks_the_hierarchy() {
    let source = InMemorySource::new()
        .with(CollectionKind::Districts, districts())
        .with(CollectionKind::Communities, communities());
    let mut nav = NodeGraph::default();
    let mut engine = QuizEngine::with_seed(9);
    let ticket = engine.select_mode(&quiz::communities_mode());
    engine.on_pool_loaded(
        &ticket,
        Ok(vec![QuizTarget::new("Biel/Bienne", ["2", "d-2-242", "m-2-371"])]),
        &mut nav,
    );
    engine.start_quiz();

    engine.on_select_node("2", &mut nav);
    nav.pump(&source);
    assert_eq!(nav.current_id(), "2");
    assert_eq!(nav.children().len(), 2);

    engine.on_select_node("d-2-241", &mut nav);
    engine.on_select_node("d-2-242", &mut nav);
    nav.pump(&source);
    assert_eq!(nav.current_id(), "d-2-242");
    let kids: Vec<&str> = nav.children().iter().map(|n| n.id.as_str()).collect();
    assert_eq!(kids, vec!["m-2-371"]);

    engine.on_select_node("m-2-371", &mut nav);
    assert_eq!(engine.locked_fills()["m-2-371"], SolvedTier::White);
    engine.advance_to(Millis(650), &mut nav);
    assert!(engine.finished());
    assert_eq!(engine.result().unwrap().percent, 100);
}
