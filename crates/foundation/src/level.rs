/// Administrative level of a node, strictly ordered from the country down.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Country,
    Canton,
    District,
    Community,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Country => "country",
            Level::Canton => "canton",
            Level::District => "district",
            Level::Community => "community",
        }
    }

    /// Whether `child` may hang directly below a node of this level.
    ///
    /// Cantons without districts own their communities directly, so
    /// `Canton -> Community` is a valid edge next to the regular successors.
    pub fn admits_child(self, child: Level) -> bool {
        matches!(
            (self, child),
            (Level::Country, Level::Canton)
                | (Level::Canton, Level::District)
                | (Level::Canton, Level::Community)
                | (Level::District, Level::Community)
        )
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
