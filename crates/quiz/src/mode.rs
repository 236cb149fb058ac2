use std::sync::Arc;

use foundation::ids::{ROOT_ID, community_id, district_id};
use geodata::{CollectionKind, FeatureCollection, GeoDataSource, GeoError};
use navigator::{CANTONS, canton_short_name};

use crate::target::QuizTarget;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    Geo(GeoError),
    /// The loader ran but produced no playable target.
    Empty(String),
}

impl std::fmt::Display for PoolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolError::Geo(err) => write!(f, "pool geometry unavailable: {err}"),
            PoolError::Empty(mode) => write!(f, "quiz mode {mode} has no targets"),
        }
    }
}

impl std::error::Error for PoolError {}

impl From<GeoError> for PoolError {
    fn from(err: GeoError) -> Self {
        PoolError::Geo(err)
    }
}

/// Produces the target pool of a quiz mode.
pub trait PoolLoader: Send + Sync {
    fn load(&self, source: &dyn GeoDataSource) -> Result<Vec<QuizTarget>, PoolError>;
}

impl<F> PoolLoader for F
where
    F: Fn(&dyn GeoDataSource) -> Result<Vec<QuizTarget>, PoolError> + Send + Sync,
{
    fn load(&self, source: &dyn GeoDataSource) -> Result<Vec<QuizTarget>, PoolError> {
        self(source)
    }
}

#[derive(Clone)]
pub struct QuizModeDefinition {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Where every target starts; the country root when unset.
    pub start_scope_id: Option<String>,
    pub loader: Arc<dyn PoolLoader>,
}

impl std::fmt::Debug for QuizModeDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizModeDefinition")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("start_scope_id", &self.start_scope_id)
            .finish_non_exhaustive()
    }
}

impl QuizModeDefinition {
    pub fn start_scope(&self) -> &str {
        self.start_scope_id.as_deref().unwrap_or(ROOT_ID)
    }

    /// Runs the loader; an empty pool is reported as [`PoolError::Empty`].
    pub fn load_pool(&self, source: &dyn GeoDataSource) -> Result<Vec<QuizTarget>, PoolError> {
        let pool = self.loader.load(source)?;
        if pool.is_empty() {
            return Err(PoolError::Empty(self.id.clone()));
        }
        Ok(pool)
    }
}

pub const CANTONS_MODE_ID: &str = "ch-cantons";
pub const COMMUNITIES_MODE_ID: &str = "ch-communities";
pub const DISTRICTS_MODE_PREFIX: &str = "ch-districts-";

pub fn cantons_mode() -> QuizModeDefinition {
    QuizModeDefinition {
        id: CANTONS_MODE_ID.to_string(),
        title: "Kantone – Schweiz".to_string(),
        description: "Finde den richtigen Kanton auf der Karte".to_string(),
        start_scope_id: None,
        loader: Arc::new(load_cantons),
    }
}

pub fn communities_mode() -> QuizModeDefinition {
    QuizModeDefinition {
        id: COMMUNITIES_MODE_ID.to_string(),
        title: "Gemeinden – Schweiz".to_string(),
        description: "Finde Gemeinden über Kanton und Bezirk".to_string(),
        start_scope_id: None,
        loader: Arc::new(load_communities),
    }
}

/// Districts of one canton; every target starts inside the canton.
pub fn districts_mode(canton_id: &str) -> QuizModeDefinition {
    let label = match canton_short_name(canton_id) {
        Some(name) => format!("Kanton {name}"),
        None => format!("Kanton {canton_id}"),
    };
    QuizModeDefinition {
        id: format!("{DISTRICTS_MODE_PREFIX}{canton_id}"),
        title: format!("Bezirke – {label}"),
        description: format!("Finde die Bezirke von {label}"),
        start_scope_id: Some(canton_id.to_string()),
        loader: Arc::new(DistrictPoolLoader {
            canton_id: canton_id.to_string(),
        }),
    }
}

fn load_cantons(_: &dyn GeoDataSource) -> Result<Vec<QuizTarget>, PoolError> {
    Ok(canton_pool())
}

fn load_communities(source: &dyn GeoDataSource) -> Result<Vec<QuizTarget>, PoolError> {
    let fc = source.fetch(CollectionKind::Communities)?;
    Ok(community_pool(&fc))
}

struct DistrictPoolLoader {
    canton_id: String,
}

impl PoolLoader for DistrictPoolLoader {
    fn load(&self, source: &dyn GeoDataSource) -> Result<Vec<QuizTarget>, PoolError> {
        let fc = source.fetch(CollectionKind::Districts)?;
        Ok(district_pool(&fc, &self.canton_id))
    }
}

/// One single-step target per canton, named without the `Kanton` prefix.
pub fn canton_pool() -> Vec<QuizTarget> {
    CANTONS
        .iter()
        .map(|(id, name)| QuizTarget::new(name.trim_start_matches("Kanton "), [*id]))
        .collect()
}

/// Every community with canton, id and name; the path passes through the
/// district when the community has one.
pub fn community_pool(communities: &FeatureCollection) -> Vec<QuizTarget> {
    let mut pool = Vec::new();
    for f in communities.iter() {
        let (Some(canton), Some(local), Some(name)) =
            (f.canton_no(), f.local_id(), f.name("gemeindename"))
        else {
            continue;
        };
        let community = community_id(&canton, &local);
        let path = match f.district_no() {
            Some(no) => vec![canton.clone(), district_id(&canton, &no), community],
            None => vec![canton, community],
        };
        pool.push(QuizTarget { name, path });
    }
    pool
}

pub fn district_pool(districts: &FeatureCollection, canton_id: &str) -> Vec<QuizTarget> {
    districts
        .iter()
        .filter(|f| f.canton_no().as_deref() == Some(canton_id))
        .filter_map(|f| {
            let no = f.district_no()?;
            let name = f.name("bezirksname")?;
            Some(QuizTarget::new(name, [district_id(canton_id, &no)]))
        })
        .collect()
}
