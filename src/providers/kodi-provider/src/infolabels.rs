use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Raw JSON-RPC field name to canonical info-label name.
const INFO_LABELS: &[(&str, &str)] = &[
    ("title", "title"),
    ("originaltitle", "originaltitle"),
    ("showtitle", "tvshowtitle"),
    ("plot", "plot"),
    ("tagline", "tagline"),
    ("year", "year"),
    ("premiered", "premiered"),
    ("firstaired", "aired"),
    ("dateadded", "dateadded"),
    ("lastplayed", "lastplayed"),
    ("playcount", "playcount"),
    ("rating", "rating"),
    ("userrating", "userrating"),
    ("votes", "votes"),
    ("top250", "top250"),
    ("mpaa", "mpaa"),
    ("runtime", "duration"),
    ("genre", "genre"),
    ("director", "director"),
    ("writer", "writer"),
    ("studio", "studio"),
    ("country", "country"),
    ("set", "set"),
    ("setid", "setid"),
    ("season", "season"),
    ("episode", "episode"),
    ("trailer", "trailer"),
    ("productioncode", "code"),
    ("file", "path"),
];

pub fn info_label_for(field: &str) -> Option<&'static str> {
    INFO_LABELS
        .iter()
        .find(|(raw, _)| *raw == field)
        .map(|(_, label)| *label)
}

/// Empty values and the library's `-1` "not set" marker.
pub fn is_unset(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f == 0.0 || f == -1.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Maps a record's fields onto canonical info labels, dropping unset values.
pub fn map_info_labels(meta: &Map<String, Value>) -> BTreeMap<String, Value> {
    meta.iter()
        .filter(|(_, value)| !is_unset(value))
        .filter_map(|(field, value)| {
            info_label_for(field).map(|label| (label.to_string(), value.clone()))
        })
        .collect()
}
