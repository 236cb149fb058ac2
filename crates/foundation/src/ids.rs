use crate::level::Level;

/// Identifier of the single country-level root node.
pub const ROOT_ID: &str = "ch";

/// Lineage-encoding identifier of a node below the country.
///
/// String forms:
/// - canton: bare numeral, `"1"`..`"26"`
/// - district: `d-<canton>-<districtNo>`
/// - community: `m-<canton>-<localId>`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AdminId {
    Canton(String),
    District { canton: String, district: String },
    Community { canton: String, local: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminIdError {
    Empty,
    Unrecognized(String),
}

impl std::fmt::Display for AdminIdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdminIdError::Empty => write!(f, "empty node id"),
            AdminIdError::Unrecognized(id) => write!(f, "unrecognized node id: {id}"),
        }
    }
}

impl std::error::Error for AdminIdError {}

impl AdminId {
    pub fn parse(raw: &str) -> Result<Self, AdminIdError> {
        let s = raw.trim();
        if s.is_empty() {
            return Err(AdminIdError::Empty);
        }
        if is_numeral(s) {
            return Ok(AdminId::Canton(s.to_string()));
        }
        if let Some(rest) = s.strip_prefix("d-")
            && let Some((canton, district)) = rest.split_once('-')
            && is_numeral(canton)
            && is_numeral(district)
        {
            return Ok(AdminId::District {
                canton: canton.to_string(),
                district: district.to_string(),
            });
        }
        // The local part of a community id is opaque; only the canton is numeric.
        if let Some(rest) = s.strip_prefix("m-")
            && let Some((canton, local)) = rest.split_once('-')
            && is_numeral(canton)
            && !local.is_empty()
        {
            return Ok(AdminId::Community {
                canton: canton.to_string(),
                local: local.to_string(),
            });
        }
        Err(AdminIdError::Unrecognized(s.to_string()))
    }

    pub fn canton(&self) -> &str {
        match self {
            AdminId::Canton(c) => c,
            AdminId::District { canton, .. } => canton,
            AdminId::Community { canton, .. } => canton,
        }
    }

    pub fn level(&self) -> Level {
        match self {
            AdminId::Canton(_) => Level::Canton,
            AdminId::District { .. } => Level::District,
            AdminId::Community { .. } => Level::Community,
        }
    }
}

impl std::str::FromStr for AdminId {
    type Err = AdminIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AdminId::parse(s)
    }
}

impl std::fmt::Display for AdminId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdminId::Canton(c) => write!(f, "{c}"),
            AdminId::District { canton, district } => write!(f, "d-{canton}-{district}"),
            AdminId::Community { canton, local } => write!(f, "m-{canton}-{local}"),
        }
    }
}

pub fn district_id(canton: &str, district: &str) -> String {
    format!("d-{canton}-{district}")
}

pub fn community_id(canton: &str, local: &str) -> String {
    format!("m-{canton}-{local}")
}

fn is_numeral(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
