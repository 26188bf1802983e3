use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// A library identifier as the media center knows it.
///
/// Video library entities use numeric ids; addons are addressed by their
/// string id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DbId {
    Number(i64),
    Name(String),
}

impl DbId {
    /// Zero and the empty string mean "no item".
    pub fn is_falsy(&self) -> bool {
        match self {
            DbId::Number(n) => *n == 0,
            DbId::Name(s) => s.is_empty(),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            DbId::Number(n) => Value::from(*n),
            DbId::Name(s) => Value::from(s.as_str()),
        }
    }
}

impl fmt::Display for DbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbId::Number(n) => write!(f, "{n}"),
            DbId::Name(s) => f.write_str(s),
        }
    }
}

impl From<i64> for DbId {
    fn from(value: i64) -> Self {
        DbId::Number(value)
    }
}

impl From<&str> for DbId {
    fn from(value: &str) -> Self {
        DbId::Name(value.to_owned())
    }
}

impl From<String> for DbId {
    fn from(value: String) -> Self {
        DbId::Name(value)
    }
}

/// Flat string properties attached to a list item, ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InfoProperties(BTreeMap<String, String>);

impl InfoProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn extend(&mut self, other: InfoProperties) {
        self.0.extend(other.0);
    }
}

impl FromIterator<(String, String)> for InfoProperties {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One member of a cast list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastMember {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub thumbnail: String,
}

/// Technical stream details reported by the video library.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamDetails {
    #[serde(default)]
    pub video: Vec<VideoStream>,
    #[serde(default)]
    pub audio: Vec<AudioStream>,
    #[serde(default)]
    pub subtitle: Vec<SubtitleStream>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoStream {
    #[serde(default)]
    pub codec: String,
    #[serde(default)]
    pub aspect: f64,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    /// Seconds.
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub stereomode: String,
    #[serde(default)]
    pub hdrtype: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioStream {
    #[serde(default)]
    pub codec: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub channels: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleStream {
    #[serde(default)]
    pub language: String,
}

/// Typed video metadata carried alongside the flat properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub media_type: String,
    pub dbid: DbId,
    /// Canonical info-label name to raw value.
    pub labels: BTreeMap<String, Value>,
    pub unique_ids: BTreeMap<String, String>,
    pub stream_details: StreamDetails,
    pub cast: Vec<CastMember>,
}

/// A display item ready for a listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub label: String,
    pub label2: String,
    pub path: String,
    pub art: BTreeMap<String, String>,
    pub properties: InfoProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoInfo>,
}

impl ListItem {
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key)
    }

    /// Folder-ness follows the `isfolder` property.
    pub fn is_folder(&self) -> bool {
        self.property("isfolder")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}

/// The `(path, item, is_folder)` triple a listing consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub path: String,
    pub item: ListItem,
    pub is_folder: bool,
}

impl DirectoryEntry {
    pub fn from_item(item: ListItem) -> Self {
        Self {
            path: item.path.clone(),
            is_folder: item.is_folder(),
            item,
        }
    }
}
