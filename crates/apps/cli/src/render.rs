use std::fmt::Write as _;

use geodata::{AdminLookup, CollectionKind, LoadState};
use navigator::NodeGraph;
use quiz::{FlashColor, Phase, QuizEngine, QuizModeDefinition};
use scores::{QuizBest, format_time_mmss};

pub fn breadcrumb(nav: &NodeGraph) -> String {
    nav.breadcrumb()
        .iter()
        .map(|n| n.name.as_str())
        .collect::<Vec<_>>()
        .join(" > ")
}

fn loading(nav: &NodeGraph) -> bool {
    [CollectionKind::Districts, CollectionKind::Communities]
        .into_iter()
        .any(|kind| nav.collection_state(kind) == LoadState::Loading)
}

/// Current position and its numbered children. Solved nodes carry their
/// tier when an engine is given.
pub fn node_view(nav: &NodeGraph, engine: Option<&QuizEngine>) -> String {
    let mut out = String::new();
    let current = nav.current();
    let _ = writeln!(out, "[{}] {}", current.level, breadcrumb(nav));

    let children = nav.children();
    if children.is_empty() {
        if loading(nav) {
            out.push_str("  (loading...)\n");
        } else {
            out.push_str("  (no entries)\n");
        }
    }
    for (i, child) in children.iter().enumerate() {
        let mut marks = String::new();
        if let Some(engine) = engine {
            if let Some(tier) = engine.locked_fills().get(&child.id) {
                let _ = write!(marks, " [{}]", tier.as_str());
            }
            if let Some((id, color)) = engine.flash()
                && id == child.id
            {
                marks.push_str(match color {
                    FlashColor::Red => " <- wrong",
                    FlashColor::Blue => " <- here",
                });
            }
        }
        let _ = writeln!(out, "  {:>3}. {} ({}){}", i + 1, child.name, child.id, marks);
    }
    out
}

pub fn quiz_status(engine: &QuizEngine) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "{} | {}/{} solved | {}% clean",
        engine.elapsed_text(),
        engine.progress_done(),
        engine.progress_total(),
        engine.skill_percent()
    );
    match engine.phase() {
        Phase::Idle => out.push_str(" | loading pool..."),
        Phase::Armed if engine.target().is_none() => out.push_str(" | no targets available"),
        Phase::Armed => out.push_str(" | type s to start"),
        Phase::Running | Phase::Transition => {
            if let Some(target) = engine.target() {
                let _ = write!(
                    out,
                    " | find: {} (step {}/{})",
                    target.name,
                    engine.step() + 1,
                    target.path.len()
                );
            }
            if engine.hint_active() {
                out.push_str(" | hint active");
            }
        }
        Phase::Finished => out.push_str(" | finished"),
    }
    out
}

pub fn result_lines(result: QuizBest, previous: Option<QuizBest>, saved: bool) -> String {
    let mut out = format!(
        "Result: {}% in {}",
        result.percent,
        format_time_mmss(result.time_sec)
    );
    match (previous, saved) {
        (_, true) => out.push_str("\nNew best!"),
        (Some(best), false) => {
            let _ = write!(
                out,
                "\nBest: {}% in {}",
                best.percent,
                format_time_mmss(best.time_sec)
            );
        }
        (None, false) => {}
    }
    out
}

pub fn mode_line(mode: &QuizModeDefinition, best: Option<QuizBest>) -> String {
    let best = match best {
        Some(b) => format!("best {}% / {}", b.percent, format_time_mmss(b.time_sec)),
        None => "not played".to_string(),
    };
    format!("{:<18} {:<28} {}", mode.id, mode.title, best)
}

pub fn lookup_lines(found: &AdminLookup) -> String {
    let rows = [
        ("canton", &found.canton),
        ("district", &found.district),
        ("community", &found.community),
    ];
    let lines: Vec<String> = rows
        .iter()
        .filter_map(|(label, r)| {
            r.as_ref()
                .map(|r| format!("{label:<10} {} ({})", r.name, r.id))
        })
        .collect();
    if lines.is_empty() {
        "outside Switzerland".to_string()
    } else {
        lines.join("\n")
    }
}
