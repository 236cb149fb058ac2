//! Derives child node descriptors from raw geometry collections.
//!
//! Stateless: every call filters the whole collection again. Results keep
//! feature order and drop repeated ids (first occurrence wins).

use std::collections::BTreeSet;

use foundation::ids::{AdminId, community_id, district_id};
use foundation::level::Level;

use crate::collection::{Feature, FeatureCollection};

pub const DISTRICT_FALLBACK_NAME: &str = "Bezirk";
pub const COMMUNITY_FALLBACK_NAME: &str = "Gemeinde";

const DISTRICT_NAME_ALT: &str = "bezirksname";
const COMMUNITY_NAME_ALT: &str = "gemeindename";

/// A child node as derived from geometry, before it enters the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDescriptor {
    pub id: String,
    pub name: String,
    pub level: Level,
    pub parent_id: String,
    /// The feature carried no name and `name` is the generic label.
    pub generic_name: bool,
}

/// Districts of `canton_id`: features of that canton with a district number.
pub fn districts_for_canton(districts: &FeatureCollection, canton_id: &str) -> Vec<NodeDescriptor> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for f in districts.iter() {
        if f.canton_no().as_deref() != Some(canton_id) {
            continue;
        }
        let Some(no) = f.district_no() else {
            continue;
        };
        let id = district_id(canton_id, &no);
        if !seen.insert(id.clone()) {
            continue;
        }
        let (name, generic_name) = named(f, DISTRICT_NAME_ALT, DISTRICT_FALLBACK_NAME);
        out.push(NodeDescriptor {
            id,
            name,
            level: Level::District,
            parent_id: canton_id.to_string(),
            generic_name,
        });
    }
    out
}

/// Communities below `parent_id`.
///
/// A district parent (`d-<canton>-<no>`) takes the canton's communities with
/// that district number; a canton parent takes the canton's communities that
/// carry no district number at all. Any other parent yields nothing.
pub fn communities_for_parent(
    communities: &FeatureCollection,
    parent_id: &str,
) -> Vec<NodeDescriptor> {
    let (canton, district) = match AdminId::parse(parent_id) {
        Ok(AdminId::District { canton, district }) => (canton, Some(district)),
        Ok(AdminId::Canton(canton)) => (canton, None),
        _ => return Vec::new(),
    };

    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for f in communities.iter() {
        if f.canton_no().as_deref() != Some(canton.as_str()) {
            continue;
        }
        if f.district_no() != district {
            continue;
        }
        let Some(local) = f.local_id() else {
            continue;
        };
        let id = community_id(&canton, &local);
        if !seen.insert(id.clone()) {
            continue;
        }
        let (name, generic_name) = named(f, COMMUNITY_NAME_ALT, COMMUNITY_FALLBACK_NAME);
        out.push(NodeDescriptor {
            id,
            name,
            level: Level::Community,
            parent_id: parent_id.to_string(),
            generic_name,
        });
    }
    out
}

/// Best-effort display name of a district, for placeholder nodes.
pub fn district_name(districts: &FeatureCollection, canton: &str, district: &str) -> Option<String> {
    districts
        .iter()
        .find(|f| {
            f.canton_no().as_deref() == Some(canton) && f.district_no().as_deref() == Some(district)
        })
        .and_then(|f| f.name(DISTRICT_NAME_ALT))
}

/// Best-effort display name of a community, for placeholder nodes.
pub fn community_name(communities: &FeatureCollection, canton: &str, local: &str) -> Option<String> {
    communities
        .iter()
        .find(|f| f.canton_no().as_deref() == Some(canton) && f.local_id().as_deref() == Some(local))
        .and_then(|f| f.name(COMMUNITY_NAME_ALT))
}

/// Whether any feature of `canton` carries a district number.
pub fn canton_has_districts(districts: &FeatureCollection, canton: &str) -> bool {
    districts
        .iter()
        .any(|f| f.canton_no().as_deref() == Some(canton) && f.district_no().is_some())
}

fn named(f: &Feature, alt_key: &str, fallback: &str) -> (String, bool) {
    match f.name(alt_key) {
        Some(name) => (name, false),
        None => (fallback.to_string(), true),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        NodeDescriptor, canton_has_districts, communities_for_parent, community_name,
        districts_for_canton, district_name,
    };
    use crate::collection::FeatureCollection;
    use foundation::level::Level;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn fc(props: Vec<Value>) -> FeatureCollection {
        let features: Vec<Value> = props
            .into_iter()
            .map(|p| json!({ "type": "Feature", "properties": p, "geometry": null }))
            .collect();
        FeatureCollection::from_geojson_value(json!({
            "type": "FeatureCollection",
            "features": features
        }))
        .unwrap()
    }

    fn districts() -> FeatureCollection {
        fc(vec![
            json!({ "kantonsnummer": 1, "bezirksnummer": 101, "name": "Affoltern" }),
            json!({ "kantonsnummer": 1, "bezirksnummer": 102, "bezirksname": "Andelfingen" }),
            json!({ "kantonsnummer": 1, "bezirksnummer": 101, "name": "Affoltern (dup)" }),
            json!({ "kantonsnummer": 1 }),
            json!({ "kantonsnummer": 2, "bezirksnummer": 241 }),
        ])
    }

    fn communities() -> FeatureCollection {
        fc(vec![
            json!({ "kantonsnummer": 1, "bezirksnummer": 101, "id": 1, "name": "Aeugst" }),
            json!({ "kantonsnummer": 1, "bezirksnummer": 102, "id": 21, "gemeindename": "Adlikon" }),
            json!({ "kantonsnummer": 16, "id": 3101, "name": "Appenzell" }),
            json!({ "kantonsnummer": 16, "bezirksnummer": "", "id": 3102 }),
            json!({ "kantonsnummer": 16, "name": "no id" }),
        ])
    }

    #[test]
    fn districts_filter_by_canton_and_require_a_number() {
        let got = districts_for_canton(&districts(), "1");
        assert_eq!(
            got,
            vec![
                NodeDescriptor {
                    id: "d-1-101".to_string(),
                    name: "Affoltern".to_string(),
                    level: Level::District,
                    parent_id: "1".to_string(),
                    generic_name: false,
                },
                NodeDescriptor {
                    id: "d-1-102".to_string(),
                    name: "Andelfingen".to_string(),
                    level: Level::District,
                    parent_id: "1".to_string(),
                    generic_name: false,
                },
            ]
        );

        let bern = districts_for_canton(&districts(), "2");
        assert_eq!(bern.len(), 1);
        assert_eq!(bern[0].name, "Bezirk");
        assert!(bern[0].generic_name);

        assert!(districts_for_canton(&districts(), "16").is_empty());
    }

    #[test]
    fn communities_of_a_district_match_its_number() {
        let got = communities_for_parent(&communities(), "d-1-102");
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].id, "m-1-21");
        assert_eq!(got[0].name, "Adlikon");
        assert_eq!(got[0].parent_id, "d-1-102");
    }

    #[test]
    fn communities_of_a_canton_without_districts_have_no_number() {
        let got = communities_for_parent(&communities(), "16");
        let ids: Vec<_> = got.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["m-16-3101", "m-16-3102"]);
        assert_eq!(got[1].name, "Gemeinde");
        assert!(got.iter().all(|d| d.parent_id == "16"));

        // Canton 1 communities all belong to districts.
        assert!(communities_for_parent(&communities(), "1").is_empty());
    }

    #[test]
    fn unknown_parent_shapes_yield_nothing() {
        assert!(communities_for_parent(&communities(), "ch").is_empty());
        assert!(communities_for_parent(&communities(), "m-1-1").is_empty());
    }

    #[test]
    fn name_lookups_for_placeholders() {
        assert_eq!(district_name(&districts(), "1", "102").as_deref(), Some("Andelfingen"));
        assert_eq!(district_name(&districts(), "7", "99"), None);
        assert_eq!(community_name(&communities(), "16", "3101").as_deref(), Some("Appenzell"));
        assert!(canton_has_districts(&districts(), "1"));
        assert!(!canton_has_districts(&districts(), "16"));
    }
}
