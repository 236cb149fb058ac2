//! Interactive sessions: stdin commands, background geometry fetches and a
//! ticker driving the quiz timers, all on one task.

use std::sync::Arc;
use std::time::Duration;

use foundation::time::Millis;
use geodata::{CollectionKind, DirectorySource, FeatureCollection, GeoError};
use navigator::{NavigatorConfig, NodeGraph};
use quiz::{QuizEngine, QuizModeDefinition, QuizTimings};
use rand::rngs::SmallRng;
use scores::{ScoreStore, load_best, save_best_if_better};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::input::{self, HELP, Input};
use crate::render;

const TICK: Duration = Duration::from_millis(50);

type Completion = (CollectionKind, Result<FeatureCollection, GeoError>);

/// Serves the navigator's fetch requests from disk without blocking input.
struct Fetcher {
    source: Arc<DirectorySource>,
    tx: mpsc::UnboundedSender<Completion>,
}

impl Fetcher {
    fn new(source: Arc<DirectorySource>) -> (Self, mpsc::UnboundedReceiver<Completion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { source, tx }, rx)
    }

    fn dispatch(&self, nav: &mut NodeGraph) {
        for request in nav.take_fetch_requests() {
            let kind = request.kind;
            let path = self.source.path_for(kind);
            let tx = self.tx.clone();
            debug!(collection = %kind, path = %path.display(), "fetch started");
            tokio::spawn(async move {
                let result = match tokio::fs::read_to_string(&path).await {
                    Ok(payload) => FeatureCollection::from_geojson_str(&payload),
                    Err(err) => Err(GeoError::Unavailable(format!("{}: {err}", path.display()))),
                };
                if tx.send((kind, result)).is_err() {
                    debug!(collection = %kind, "fetch finished after session end");
                }
            });
        }
    }
}

pub async fn explore(source: Arc<DirectorySource>) -> Result<(), Box<dyn std::error::Error>> {
    let (fetcher, mut completions) = Fetcher::new(source);
    let mut nav = NodeGraph::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    print!("{}", render::node_view(&nav, None));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match input::parse(&line) {
                    Input::Quit => break,
                    Input::Empty | Input::Start => continue,
                    Input::Help => {
                        println!("{HELP}");
                        continue;
                    }
                    Input::Back => nav.go_back(),
                    Input::Up => {
                        if let Some(parent) = nav.current().parent_id.clone() {
                            nav.go_to(&parent);
                        }
                    }
                    Input::Pick(n) => match input::child_id(&nav, n) {
                        Some(id) => nav.go_to(&id),
                        None => {
                            println!("no entry {n}");
                            continue;
                        }
                    },
                    Input::Id(id) => nav.go_to(&id),
                }
                fetcher.dispatch(&mut nav);
                print!("{}", render::node_view(&nav, None));
            }
            Some((kind, result)) = completions.recv() => {
                nav.on_collection_loaded(kind, result);
                fetcher.dispatch(&mut nav);
                print!("{}", render::node_view(&nav, None));
            }
        }
    }
    Ok(())
}

/// What the quiz screen shows, minus the ticking clock.
#[derive(Debug, PartialEq, Eq)]
struct ScreenKey {
    current: String,
    children: usize,
    snapshot: quiz::QuizSnapshot,
}

fn screen_key(nav: &NodeGraph, engine: &QuizEngine) -> ScreenKey {
    let mut snapshot = engine.snapshot();
    snapshot.elapsed_sec = 0;
    snapshot.elapsed_text.clear();
    ScreenKey {
        current: nav.current_id().to_string(),
        children: nav.children().len(),
        snapshot,
    }
}

pub async fn quiz(
    source: Arc<DirectorySource>,
    mode: QuizModeDefinition,
    rng: SmallRng,
    store: &mut dyn ScoreStore,
) -> Result<(), Box<dyn std::error::Error>> {
    let (fetcher, mut completions) = Fetcher::new(source.clone());
    let mut nav = NodeGraph::new(NavigatorConfig {
        disable_back: true,
        ..NavigatorConfig::default()
    });
    let mut engine = QuizEngine::new(QuizTimings::default(), rng);
    println!("{}: {}", mode.title, mode.description);

    let (pool_tx, mut pools) = mpsc::unbounded_channel();
    let ticket = engine.select_mode(&mode);
    {
        let mode = mode.clone();
        let source = source.clone();
        tokio::task::spawn_blocking(move || {
            let result = mode.load_pool(source.as_ref());
            let _ = pool_tx.send((ticket, result));
        });
    }

    let epoch = Instant::now();
    let mut ticker = tokio::time::interval(TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut shown = None;

    loop {
        tokio::select! {
            Some((ticket, result)) = pools.recv() => {
                engine.on_pool_loaded(&ticket, result, &mut nav);
            }
            _ = ticker.tick() => {
                let now = Millis(u64::try_from(epoch.elapsed().as_millis()).unwrap_or(u64::MAX));
                engine.advance_to(now, &mut nav);
            }
            Some((kind, result)) = completions.recv() => {
                nav.on_collection_loaded(kind, result);
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match input::parse(&line) {
                    Input::Quit => break,
                    Input::Empty => {}
                    Input::Help => println!("{HELP}"),
                    Input::Start => engine.start_quiz(),
                    Input::Back | Input::Up => println!("going back is disabled during a quiz"),
                    Input::Pick(n) => match input::child_id(&nav, n) {
                        Some(id) => engine.on_select_node(&id, &mut nav),
                        None => println!("no entry {n}"),
                    },
                    Input::Id(id) => engine.on_select_node(&id, &mut nav),
                }
            }
        }

        fetcher.dispatch(&mut nav);
        let key = screen_key(&nav, &engine);
        if shown.as_ref() != Some(&key) {
            print!("{}", render::node_view(&nav, Some(&engine)));
            println!("{}", render::quiz_status(&engine));
            shown = Some(key);
        }

        if let Some(result) = engine.result() {
            let previous = load_best(store, &mode.id);
            let saved = match save_best_if_better(store, &mode.id, result) {
                Ok(saved) => saved,
                Err(err) => {
                    warn!(mode = %mode.id, error = %err, "best score not saved");
                    false
                }
            };
            println!("{}", render::result_lines(result, previous, saved));
            break;
        }
    }

    engine.teardown();
    Ok(())
}
