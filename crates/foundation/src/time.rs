/// Virtual time in milliseconds.
///
/// The quiz and navigation state machines never read the wall clock; hosts
/// advance them with explicit `Millis` values so runs are replayable.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Millis(pub u64);

impl Millis {
    pub const ZERO: Millis = Millis(0);

    pub fn as_u64(self) -> u64 {
        self.0
    }

    pub fn plus(self, ms: u64) -> Self {
        Millis(self.0.saturating_add(ms))
    }

    /// Milliseconds elapsed since `earlier`, saturating at zero.
    pub fn since(self, earlier: Millis) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

/// Formats whole seconds as `MM:SS`; minutes keep counting past 99.
pub fn format_mmss(total_sec: u64) -> String {
    format!("{:02}:{:02}", total_sec / 60, total_sec % 60)
}
