use std::collections::BTreeMap;

use foundation::ids::ROOT_ID;
use foundation::time::{Millis, format_mmss};
use navigator::Navigate;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use runtime::{Generation, GenerationCounter, TimerId, TimerWheel};
use scores::QuizBest;
use serde::Serialize;
use tracing::{debug, warn};

use crate::mode::{PoolError, QuizModeDefinition};
use crate::target::{QuizTarget, dedupe_by_key};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizTimings {
    pub stopwatch_ms: u64,
    pub hint_flash_ms: u64,
    pub flash_clear_ms: u64,
    pub transition_ms: u64,
    /// Consecutive wrong clicks that switch the hint on.
    pub hint_after_wrong: u32,
}

impl Default for QuizTimings {
    fn default() -> Self {
        Self {
            stopwatch_ms: 1000,
            hint_flash_ms: 800,
            flash_clear_ms: 450,
            transition_ms: 650,
            hint_after_wrong: 3,
        }
    }
}

/// Permanent colour of a solved node, by how hard the final step was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SolvedTier {
    White,
    Yellow,
    Orange,
    Red,
}

impl SolvedTier {
    fn rate(wrong_attempts: u32, hint_used: bool) -> Self {
        if hint_used {
            return SolvedTier::Red;
        }
        match wrong_attempts {
            0 => SolvedTier::White,
            1 => SolvedTier::Yellow,
            _ => SolvedTier::Orange,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SolvedTier::White => "white",
            SolvedTier::Yellow => "yellow",
            SolvedTier::Orange => "orange",
            SolvedTier::Red => "red",
        }
    }
}

/// Transient highlight: red for a wrong click, blue for the hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashColor {
    Red,
    Blue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// No mode, or its pool is still loading.
    Idle,
    /// Pool loaded, waiting for `start_quiz`.
    Armed,
    Running,
    /// A target was just solved; input is locked until the next one is up.
    Transition,
    Finished,
}

/// Proof of a pending pool load; only the latest ticket is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolTicket {
    pub generation: Generation,
    pub mode_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuizTimer {
    Stopwatch,
    HintFlash,
    FlashClear,
    Transition,
}

/// What the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSnapshot {
    pub mode_id: Option<String>,
    pub phase: Phase,
    pub started: bool,
    pub finished: bool,
    pub elapsed_sec: u64,
    pub elapsed_text: String,
    pub progress_done: usize,
    pub progress_total: usize,
    pub target: Option<QuizTarget>,
    pub step: usize,
    pub flash_id: Option<String>,
    pub flash_color: Option<FlashColor>,
    pub hint_active: bool,
    pub hint_expected_id: Option<String>,
    pub locked_fills: BTreeMap<String, SolvedTier>,
    pub white_count: usize,
    pub skill_percent: u32,
}

/// Per-mode quiz session.
///
/// The engine never touches the node graph itself: correct intermediate
/// clicks and target changes go through [`Navigate::go_to`]. Timers run on
/// virtual time supplied by [`QuizEngine::advance_to`].
#[derive(Debug)]
pub struct QuizEngine {
    timings: QuizTimings,
    rng: SmallRng,
    generations: GenerationCounter,
    timers: TimerWheel<QuizTimer>,

    mode_id: Option<String>,
    start_scope: String,
    phase: Phase,

    pool: Vec<QuizTarget>,
    remaining: Vec<QuizTarget>,
    target: Option<QuizTarget>,
    step: usize,
    elapsed_sec: u64,

    wrong_streak: u32,
    wrong_attempts: u32,
    hint_used: bool,
    hint_expected: Option<String>,
    flash: Option<(String, FlashColor)>,
    locked_fills: BTreeMap<String, SolvedTier>,
    lock: bool,

    stopwatch: Option<TimerId>,
    hint_timer: Option<TimerId>,
    flash_timer: Option<TimerId>,
    transition_timer: Option<TimerId>,
}

impl QuizEngine {
    pub fn new(timings: QuizTimings, rng: SmallRng) -> Self {
        Self {
            timings,
            rng,
            generations: GenerationCounter::new(),
            timers: TimerWheel::new(),
            mode_id: None,
            start_scope: ROOT_ID.to_string(),
            phase: Phase::Idle,
            pool: Vec::new(),
            remaining: Vec::new(),
            target: None,
            step: 0,
            elapsed_sec: 0,
            wrong_streak: 0,
            wrong_attempts: 0,
            hint_used: false,
            hint_expected: None,
            flash: None,
            locked_fills: BTreeMap::new(),
            lock: true,
            stopwatch: None,
            hint_timer: None,
            flash_timer: None,
            transition_timer: None,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(QuizTimings::default(), SmallRng::seed_from_u64(seed))
    }

    /// Discards the current session and starts a new one for `mode`.
    ///
    /// The pool has to be delivered through [`QuizEngine::on_pool_loaded`]
    /// with the returned ticket; results for older tickets are dropped.
    pub fn select_mode(&mut self, mode: &QuizModeDefinition) -> PoolTicket {
        let generation = self.generations.bump();
        self.cancel_timers();

        self.mode_id = Some(mode.id.clone());
        self.start_scope = mode.start_scope().to_string();
        self.phase = Phase::Idle;
        self.pool.clear();
        self.remaining.clear();
        self.target = None;
        self.step = 0;
        self.elapsed_sec = 0;
        self.wrong_streak = 0;
        self.reset_step_rating();
        self.hint_expected = None;
        self.flash = None;
        self.locked_fills.clear();
        self.lock = true;

        debug!(mode = %mode.id, generation = generation.value(), "quiz mode selected");
        PoolTicket {
            generation,
            mode_id: mode.id.clone(),
        }
    }

    /// Selects `mode` and loads its pool from `source` right away.
    pub fn select_and_load(
        &mut self,
        mode: &QuizModeDefinition,
        source: &dyn geodata::GeoDataSource,
        nav: &mut dyn Navigate,
    ) {
        let ticket = self.select_mode(mode);
        let result = mode.load_pool(source);
        self.on_pool_loaded(&ticket, result, nav);
    }

    /// Commits a loaded pool. Returns `false` when the ticket is stale.
    ///
    /// A failed load arms the engine with an empty pool and no target.
    pub fn on_pool_loaded(
        &mut self,
        ticket: &PoolTicket,
        result: Result<Vec<QuizTarget>, PoolError>,
        nav: &mut dyn Navigate,
    ) -> bool {
        if !self.generations.is_current(ticket.generation) {
            warn!(mode = %ticket.mode_id, "stale quiz pool discarded");
            return false;
        }

        match result {
            Ok(targets) => {
                let pool = dedupe_by_key(targets);
                self.remaining = pool.clone();
                self.pool = pool;
                self.target = self.pick_remaining();
                self.step = 0;
                self.reset_step_rating();
                self.return_to_start(nav);
                debug!(mode = %ticket.mode_id, targets = self.pool.len(), "quiz pool loaded");
            }
            Err(err) => {
                warn!(mode = %ticket.mode_id, error = %err, "quiz pool unavailable");
                self.pool.clear();
                self.remaining.clear();
                self.target = None;
                self.step = 0;
            }
        }
        self.phase = Phase::Armed;
        true
    }

    /// Armed to running. Without a target there is nothing to run.
    pub fn start_quiz(&mut self) {
        if self.phase != Phase::Armed || self.target.is_none() {
            return;
        }
        self.phase = Phase::Running;
        self.lock = false;
        self.wrong_streak = 0;
        self.reset_step_rating();
        self.stop_hint();

        if let Some(id) = self.stopwatch.take() {
            self.timers.cancel(id);
        }
        self.elapsed_sec = 0;
        self.stopwatch = Some(
            self.timers
                .schedule_every(self.timings.stopwatch_ms, QuizTimer::Stopwatch),
        );
        debug!(mode = ?self.mode_id, "quiz started");
    }

    /// Handles a click on the node `id`.
    pub fn on_select_node(&mut self, id: &str, nav: &mut dyn Navigate) {
        if self.phase != Phase::Running || self.lock || self.locked_fills.contains_key(id) {
            return;
        }
        let Some(target) = self.target.as_ref() else {
            return;
        };
        let Some(expected) = target.path.get(self.step).cloned() else {
            return;
        };
        let is_last = self.step + 1 >= target.path.len();
        let solved = target.key();

        if self.hint_expected.as_deref().is_some_and(|h| h != id) {
            return;
        }
        self.stop_hint();

        if id != expected {
            self.show_flash(id, FlashColor::Red);
            self.wrong_streak += 1;
            self.wrong_attempts += 1;
            if self.wrong_streak >= self.timings.hint_after_wrong.max(1) {
                self.wrong_streak = 0;
                self.start_hint(expected);
            }
            return;
        }

        self.wrong_streak = 0;
        if !is_last {
            self.reset_step_rating();
            nav.go_to(id);
            self.step += 1;
            return;
        }

        self.lock = true;
        self.phase = Phase::Transition;
        let tier = SolvedTier::rate(self.wrong_attempts, self.hint_used);
        self.locked_fills.insert(id.to_string(), tier);

        self.remaining.retain(|t| t.key() != solved);
        debug!(id, tier = tier.as_str(), remaining = self.remaining.len(), "target solved");

        if let Some(t) = self.transition_timer.take() {
            self.timers.cancel(t);
        }
        self.transition_timer = Some(
            self.timers
                .schedule_once(self.timings.transition_ms, QuizTimer::Transition),
        );
    }

    /// Fires every timer due up to `now`, in order.
    pub fn advance_to(&mut self, now: Millis, nav: &mut dyn Navigate) {
        while let Some(fired) = self.timers.pop_due(now) {
            match fired.payload {
                QuizTimer::Stopwatch => self.elapsed_sec += 1,
                QuizTimer::HintFlash => {
                    if let Some(expected) = self.hint_expected.clone() {
                        self.show_flash(&expected, FlashColor::Blue);
                    }
                }
                QuizTimer::FlashClear => {
                    self.flash = None;
                    self.flash_timer = None;
                }
                QuizTimer::Transition => {
                    self.transition_timer = None;
                    self.next_target(nav);
                }
            }
        }
    }

    pub fn now(&self) -> Millis {
        self.timers.now()
    }

    /// Stops every timer and invalidates outstanding pool tickets.
    pub fn teardown(&mut self) {
        self.generations.bump();
        self.cancel_timers();
        self.hint_expected = None;
        self.flash = None;
        self.lock = true;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode_id(&self) -> Option<&str> {
        self.mode_id.as_deref()
    }

    pub fn start_scope(&self) -> &str {
        &self.start_scope
    }

    pub fn started(&self) -> bool {
        matches!(self.phase, Phase::Running | Phase::Transition | Phase::Finished)
    }

    pub fn finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn is_locked(&self) -> bool {
        self.lock
    }

    pub fn pool(&self) -> &[QuizTarget] {
        &self.pool
    }

    pub fn remaining(&self) -> &[QuizTarget] {
        &self.remaining
    }

    pub fn target(&self) -> Option<&QuizTarget> {
        self.target.as_ref()
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn elapsed_sec(&self) -> u64 {
        self.elapsed_sec
    }

    pub fn elapsed_text(&self) -> String {
        format_mmss(self.elapsed_sec)
    }

    pub fn wrong_attempts(&self) -> u32 {
        self.wrong_attempts
    }

    pub fn flash(&self) -> Option<(&str, FlashColor)> {
        self.flash.as_ref().map(|(id, c)| (id.as_str(), *c))
    }

    pub fn hint_active(&self) -> bool {
        self.hint_expected.is_some()
    }

    pub fn hint_expected_id(&self) -> Option<&str> {
        self.hint_expected.as_deref()
    }

    pub fn locked_fills(&self) -> &BTreeMap<String, SolvedTier> {
        &self.locked_fills
    }

    pub fn progress_done(&self) -> usize {
        self.pool.len().saturating_sub(self.remaining.len())
    }

    pub fn progress_total(&self) -> usize {
        self.pool.len()
    }

    pub fn white_count(&self) -> usize {
        self.locked_fills
            .values()
            .filter(|t| **t == SolvedTier::White)
            .count()
    }

    /// Share of the pool solved without any mistake, rounded to a percent.
    pub fn skill_percent(&self) -> u32 {
        let total = self.pool.len();
        if total == 0 {
            return 0;
        }
        ((self.white_count() as f64 / total as f64) * 100.0).round() as u32
    }

    /// Final score, available once the session finished.
    pub fn result(&self) -> Option<QuizBest> {
        self.finished().then(|| QuizBest {
            percent: self.skill_percent(),
            time_sec: self.elapsed_sec,
        })
    }

    pub fn snapshot(&self) -> QuizSnapshot {
        QuizSnapshot {
            mode_id: self.mode_id.clone(),
            phase: self.phase,
            started: self.started(),
            finished: self.finished(),
            elapsed_sec: self.elapsed_sec,
            elapsed_text: self.elapsed_text(),
            progress_done: self.progress_done(),
            progress_total: self.progress_total(),
            target: self.target.clone(),
            step: self.step,
            flash_id: self.flash.as_ref().map(|(id, _)| id.clone()),
            flash_color: self.flash.as_ref().map(|(_, c)| *c),
            hint_active: self.hint_active(),
            hint_expected_id: self.hint_expected.clone(),
            locked_fills: self.locked_fills.clone(),
            white_count: self.white_count(),
            skill_percent: self.skill_percent(),
        }
    }

    fn next_target(&mut self, nav: &mut dyn Navigate) {
        if self.remaining.is_empty() {
            self.phase = Phase::Finished;
            self.lock = true;
            self.stop_hint();
            if let Some(id) = self.stopwatch.take() {
                self.timers.cancel(id);
            }
            debug!(mode = ?self.mode_id, elapsed_sec = self.elapsed_sec, "quiz finished");
            return;
        }
        self.target = self.pick_remaining();
        self.step = 0;
        self.reset_step_rating();
        self.return_to_start(nav);
        self.phase = Phase::Running;
        self.lock = false;
    }

    fn pick_remaining(&mut self) -> Option<QuizTarget> {
        if self.remaining.is_empty() {
            return None;
        }
        let idx = self.rng.gen_range(0..self.remaining.len());
        Some(self.remaining[idx].clone())
    }

    fn return_to_start(&self, nav: &mut dyn Navigate) {
        if nav.current_id() != self.start_scope {
            nav.go_to(&self.start_scope);
        }
    }

    fn reset_step_rating(&mut self) {
        self.wrong_attempts = 0;
        self.hint_used = false;
    }

    fn show_flash(&mut self, id: &str, color: FlashColor) {
        self.flash = Some((id.to_string(), color));
        if let Some(t) = self.flash_timer.take() {
            self.timers.cancel(t);
        }
        self.flash_timer = Some(
            self.timers
                .schedule_once(self.timings.flash_clear_ms, QuizTimer::FlashClear),
        );
    }

    fn start_hint(&mut self, expected: String) {
        self.hint_used = true;
        self.stop_hint();
        self.show_flash(&expected, FlashColor::Blue);
        self.hint_timer = Some(
            self.timers
                .schedule_every(self.timings.hint_flash_ms, QuizTimer::HintFlash),
        );
        debug!(expected = %expected, "hint shown");
        self.hint_expected = Some(expected);
    }

    fn stop_hint(&mut self) {
        if let Some(t) = self.hint_timer.take() {
            self.timers.cancel(t);
        }
        self.hint_expected = None;
    }

    fn cancel_timers(&mut self) {
        self.timers.cancel_all();
        self.stopwatch = None;
        self.hint_timer = None;
        self.flash_timer = None;
        self.transition_timer = None;
    }
}
