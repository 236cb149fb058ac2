use std::collections::BTreeMap;

use foundation::ids::ROOT_ID;
use foundation::level::Level;

use crate::node::Node;

pub const ROOT_NAME: &str = "Schweiz";

/// Cantons by official number, `1`..`26`.
pub const CANTONS: [(&str, &str); 26] = [
    ("1", "Kanton Zürich"),
    ("2", "Kanton Bern"),
    ("3", "Kanton Luzern"),
    ("4", "Kanton Uri"),
    ("5", "Kanton Schwyz"),
    ("6", "Kanton Obwalden"),
    ("7", "Kanton Nidwalden"),
    ("8", "Kanton Glarus"),
    ("9", "Kanton Zug"),
    ("10", "Kanton Fribourg"),
    ("11", "Kanton Solothurn"),
    ("12", "Kanton Basel-Stadt"),
    ("13", "Kanton Basel-Landschaft"),
    ("14", "Kanton Schaffhausen"),
    ("15", "Kanton Appenzell Ausserrhoden"),
    ("16", "Kanton Appenzell Innerrhoden"),
    ("17", "Kanton St. Gallen"),
    ("18", "Kanton Graubünden"),
    ("19", "Kanton Aargau"),
    ("20", "Kanton Thurgau"),
    ("21", "Kanton Tessin"),
    ("22", "Kanton Waadt"),
    ("23", "Kanton Wallis"),
    ("24", "Kanton Neuchâtel"),
    ("25", "Kanton Genève"),
    ("26", "Kanton Jura"),
];

/// Short canton name without the `Kanton ` prefix.
pub fn canton_short_name(canton_id: &str) -> Option<&'static str> {
    CANTONS
        .iter()
        .find(|(id, _)| *id == canton_id)
        .map(|(_, name)| name.trim_start_matches("Kanton "))
}

/// The graph every session starts from: the country and its 26 cantons.
pub fn base_nodes() -> BTreeMap<String, Node> {
    let mut nodes = BTreeMap::new();

    let mut root = Node::new(ROOT_ID, ROOT_NAME, Level::Country, None);
    root.children_ids = CANTONS.iter().map(|(id, _)| id.to_string()).collect();
    nodes.insert(root.id.clone(), root);

    for (id, name) in CANTONS {
        nodes.insert(
            id.to_string(),
            Node::new(id, name, Level::Canton, Some(ROOT_ID.to_string())),
        );
    }
    nodes
}
