use foundation::level::Level;
use serde::Serialize;

/// A single administrative unit in the navigation graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub name: String,
    #[serde(serialize_with = "level_str")]
    pub level: Level,
    /// `None` only for the country root.
    pub parent_id: Option<String>,
    /// Known children in display order; empty until expanded.
    pub children_ids: Vec<String>,
    /// Synthesized ahead of authoritative data; replaced once it lands.
    #[serde(skip)]
    pub placeholder: bool,
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        level: Level,
        parent_id: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            level,
            parent_id,
            children_ids: Vec::new(),
            placeholder: false,
        }
    }
}

fn level_str<S: serde::Serializer>(level: &Level, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(level.as_str())
}
