/// Failure to obtain a usable geometry collection.
///
/// Never fatal: callers degrade to an empty child set and may retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeoError {
    Unavailable(String),
    Parse(String),
    NotAFeatureCollection,
}

impl std::fmt::Display for GeoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoError::Unavailable(msg) => write!(f, "geometry collection unavailable: {msg}"),
            GeoError::Parse(msg) => write!(f, "geometry collection parse error: {msg}"),
            GeoError::NotAFeatureCollection => write!(f, "expected GeoJSON FeatureCollection"),
        }
    }
}

impl std::error::Error for GeoError {}
