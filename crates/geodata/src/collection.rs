use foundation::bounds::Aabb2;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::GeoError;

pub const PROP_CANTON_NO: &str = "kantonsnummer";
pub const PROP_DISTRICT_NO: &str = "bezirksnummer";
pub const PROP_LOCAL_ID: &str = "id";
pub const PROP_LOCAL_ID_ALT: &str = "bfs_nummer";
pub const PROP_NAME: &str = "name";

/// The three administrative geometry collections, each fetched at most once.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CollectionKind {
    Cantons,
    Districts,
    Communities,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 3] = [
        CollectionKind::Cantons,
        CollectionKind::Districts,
        CollectionKind::Communities,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CollectionKind::Cantons => "cantons",
            CollectionKind::Districts => "districts",
            CollectionKind::Communities => "communities",
        }
    }

    /// Stable path of the collection relative to the data root.
    pub fn file_name(self) -> &'static str {
        match self {
            CollectionKind::Cantons => "cantons.geojson",
            CollectionKind::Districts => "districts.geojson",
            CollectionKind::Communities => "communities.geojson",
        }
    }
}

impl std::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Polygonal footprint of a feature, lon/lat degrees.
///
/// `polygons[p][r]` is ring `r` of polygon `p`; ring 0 is the outer ring.
#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    pub polygons: Vec<Vec<Vec<[f64; 2]>>>,
    pub bounds: Aabb2,
}

impl Area {
    fn from_polygons(polygons: Vec<Vec<Vec<[f64; 2]>>>) -> Option<Self> {
        let mut bounds: Option<Aabb2> = None;
        for p in polygons.iter().flat_map(|poly| poly.first()).flatten() {
            match bounds.as_mut() {
                Some(b) => b.extend(*p),
                None => bounds = Some(Aabb2::from_point(*p)),
            }
        }
        Some(Self {
            bounds: bounds?,
            polygons,
        })
    }

    /// Even-odd containment; holes are honoured because every ring toggles.
    pub fn contains(&self, p: [f64; 2]) -> bool {
        if !self.bounds.contains(p) {
            return false;
        }
        self.polygons.iter().any(|rings| {
            rings
                .iter()
                .filter(|ring| ring_crosses(ring, p))
                .count()
                % 2
                == 1
        })
    }
}

fn ring_crosses(ring: &[[f64; 2]], p: [f64; 2]) -> bool {
    let mut inside = false;
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (ring[i][0], ring[i][1]);
        let (xj, yj) = (ring[j][0], ring[j][1]);
        if (yi > p[1]) != (yj > p[1]) && p[0] < (xj - xi) * (p[1] - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub properties: Map<String, Value>,
    pub area: Option<Area>,
}

impl Feature {
    pub fn new(properties: Map<String, Value>) -> Self {
        Self {
            properties,
            area: None,
        }
    }

    /// Scalar property as trimmed text; numbers print without a fraction
    /// when integral. Empty strings count as absent.
    pub fn prop(&self, key: &str) -> Option<String> {
        scalar_to_string(self.properties.get(key)?)
    }

    pub fn canton_no(&self) -> Option<String> {
        self.prop(PROP_CANTON_NO)
    }

    pub fn district_no(&self) -> Option<String> {
        self.prop(PROP_DISTRICT_NO)
    }

    pub fn local_id(&self) -> Option<String> {
        self.prop(PROP_LOCAL_ID)
            .or_else(|| self.prop(PROP_LOCAL_ID_ALT))
    }

    /// `name`, then the level-specific alternative key.
    pub fn name(&self, alt_key: &str) -> Option<String> {
        self.prop(PROP_NAME).or_else(|| self.prop(alt_key))
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.area
            .as_ref()
            .is_some_and(|a| a.contains([lon, lat]))
    }
}

fn scalar_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => {
            let t = s.trim();
            (!t.is_empty()).then(|| t.to_string())
        }
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else {
                let f = n.as_f64()?;
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    Some(format!("{}", f as i64))
                } else {
                    Some(f.to_string())
                }
            }
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

#[derive(Deserialize)]
struct RawCollection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<Value>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    pub fn from_geojson_str(payload: &str) -> Result<Self, GeoError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| GeoError::Parse(e.to_string()))?;
        Self::from_geojson_value(value)
    }

    /// Lenient import: features that are not objects are skipped and
    /// unreadable geometry leaves `area` empty, since the hierarchy only
    /// needs properties.
    pub fn from_geojson_value(value: Value) -> Result<Self, GeoError> {
        let raw: RawCollection =
            serde_json::from_value(value).map_err(|_| GeoError::NotAFeatureCollection)?;
        if raw.kind != "FeatureCollection" {
            return Err(GeoError::NotAFeatureCollection);
        }

        let mut features = Vec::with_capacity(raw.features.len());
        for feat_val in raw.features {
            let Value::Object(mut feat_obj) = feat_val else {
                continue;
            };
            let properties = match feat_obj.remove("properties") {
                Some(Value::Object(map)) => map,
                _ => Map::new(),
            };
            let area = feat_obj
                .get("geometry")
                .and_then(|g| parse_area(g).ok())
                .and_then(Area::from_polygons);
            features.push(Feature { properties, area });
        }

        Ok(Self { features })
    }
}

fn parse_area(value: &Value) -> Result<Vec<Vec<Vec<[f64; 2]>>>, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;
    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?;

    match ty {
        "Polygon" => Ok(vec![parse_polygon(coords)?]),
        "MultiPolygon" => {
            let polys = coords
                .as_array()
                .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;
            polys.iter().map(parse_polygon).collect()
        }
        other => Err(format!("unsupported geometry type: {other}")),
    }
}

fn parse_polygon(coords: &Value) -> Result<Vec<Vec<[f64; 2]>>, String> {
    let rings = coords
        .as_array()
        .ok_or("Polygon coordinates must be an array of rings".to_string())?;
    rings.iter().map(parse_ring).collect()
}

fn parse_ring(ring: &Value) -> Result<Vec<[f64; 2]>, String> {
    let points = ring
        .as_array()
        .ok_or("ring must be an array".to_string())?;
    let mut out = Vec::with_capacity(points.len());
    for p in points {
        let arr = p
            .as_array()
            .ok_or("position must be an array".to_string())?;
        if arr.len() < 2 {
            return Err("position must have [lon, lat]".to_string());
        }
        let lon = arr[0].as_f64().ok_or("lon must be a number".to_string())?;
        let lat = arr[1].as_f64().ok_or("lat must be a number".to_string())?;
        out.push([lon, lat]);
    }
    Ok(out)
}
