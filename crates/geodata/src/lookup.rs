use foundation::ids::{community_id, district_id};

use crate::collection::{Feature, FeatureCollection};
use crate::resolver::{COMMUNITY_FALLBACK_NAME, DISTRICT_FALLBACK_NAME};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminRef {
    pub id: String,
    pub name: String,
}

/// Administrative units containing a point; deeper levels are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminLookup {
    pub canton: Option<AdminRef>,
    pub district: Option<AdminRef>,
    pub community: Option<AdminRef>,
}

impl AdminLookup {
    /// Id of the deepest resolved unit.
    pub fn deepest_id(&self) -> Option<&str> {
        self.community
            .as_ref()
            .or(self.district.as_ref())
            .or(self.canton.as_ref())
            .map(|r| r.id.as_str())
    }
}

/// Resolves canton, district and community containing `(lon, lat)`.
///
/// Missing collections simply stop the descent. Communities are searched
/// among the found district's communities first, then the whole canton.
pub fn admin_at(
    lon: f64,
    lat: f64,
    cantons: Option<&FeatureCollection>,
    districts: Option<&FeatureCollection>,
    communities: Option<&FeatureCollection>,
) -> AdminLookup {
    let mut out = AdminLookup::default();

    let Some(canton_feature) = cantons.and_then(|c| c.iter().find(|f| f.contains(lon, lat))) else {
        return out;
    };
    let Some(canton_id) = canton_feature.canton_no() else {
        return out;
    };
    let canton_name = canton_feature
        .name("kantonsname")
        .unwrap_or_else(|| format!("Kanton {canton_id}"));
    out.canton = Some(AdminRef {
        id: canton_id.clone(),
        name: canton_name,
    });

    let in_canton = |f: &&Feature| f.canton_no().as_deref() == Some(canton_id.as_str());

    let district_no = districts
        .and_then(|d| d.iter().filter(in_canton).find(|f| f.contains(lon, lat)))
        .and_then(|f| {
            let no = f.district_no()?;
            out.district = Some(AdminRef {
                id: district_id(&canton_id, &no),
                name: f
                    .name("bezirksname")
                    .unwrap_or_else(|| DISTRICT_FALLBACK_NAME.to_string()),
            });
            Some(no)
        });

    if let Some(communities) = communities {
        let in_district = |f: &&Feature| district_no.is_some() && f.district_no() == district_no;
        let found = communities
            .iter()
            .filter(in_canton)
            .filter(in_district)
            .find(|f| f.contains(lon, lat))
            .or_else(|| {
                communities
                    .iter()
                    .filter(in_canton)
                    .find(|f| f.contains(lon, lat))
            });
        if let Some(f) = found
            && let Some(local) = f.local_id()
        {
            out.community = Some(AdminRef {
                id: community_id(&canton_id, &local),
                name: f
                    .name("gemeindename")
                    .unwrap_or_else(|| COMMUNITY_FALLBACK_NAME.to_string()),
            });
        }
    }

    out
}
