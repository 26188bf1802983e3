//! Turns fetched library records into list items.

use crate::infolabels::map_info_labels;
use crate::lookups::EntityKind;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use skinkit_core::format::value_to_string;
use skinkit_core::{
    CastMember, DbId, Flattener, InfoProperties, ListItem, LookupResolver, StreamDetails,
    VideoInfo,
};
use std::collections::BTreeMap;

/// Builds the display item for one record.
///
/// Returns `None` for an empty record so the caller can drop it from the
/// listing. Sub-lookups for `kind` go through `resolver`.
pub fn build_item(
    kind: EntityKind,
    dbid: &DbId,
    meta: &Map<String, Value>,
    resolver: &dyn LookupResolver,
) -> Option<ListItem> {
    if meta.is_empty() {
        return None;
    }

    let flattened = Flattener::with_sub_lookups(resolver, kind.sub_lookups()).flatten(meta);
    let mut properties = flattened.properties;

    let video = kind.is_video().then(|| {
        let labels = map_info_labels(meta);
        add_episode_totals(kind, &labels, &mut properties);
        VideoInfo {
            media_type: kind.dbtype().to_string(),
            dbid: dbid.clone(),
            labels,
            unique_ids: string_map(meta.get("uniqueid")),
            stream_details: decode_field::<StreamDetails>(meta, "streamdetails"),
            cast: cast_members(meta),
        }
    });

    Some(ListItem {
        label: meta.get("label").map(value_to_string).unwrap_or_default(),
        label2: String::new(),
        path: item_path(kind, dbid, meta),
        art: artwork(meta),
        properties,
        video,
    })
}

/// Browsable path for an entity.
pub fn item_path(kind: EntityKind, dbid: &DbId, meta: &Map<String, Value>) -> String {
    let field = |name: &str| meta.get(name).map(value_to_string).unwrap_or_default();
    match kind {
        EntityKind::Addon => String::new(),
        EntityKind::Movie => format!("videodb://movies/titles/{dbid}"),
        EntityKind::Set => format!("videodb://movies/sets/{dbid}/"),
        EntityKind::TvShow => format!("videodb://tvshows/titles/{dbid}/"),
        EntityKind::Season => {
            format!("videodb://tvshows/titles/{}/{}/", field("tvshowid"), field("season"))
        }
        EntityKind::Episode => format!(
            "videodb://tvshows/titles/{}/{}/{dbid}",
            field("tvshowid"),
            field("season")
        ),
    }
}

/// The record's `art` map with `fanart` and `thumb` filled from the
/// top-level fields when missing.
pub fn artwork(meta: &Map<String, Value>) -> BTreeMap<String, String> {
    let mut art = string_map(meta.get("art"));
    let top_level = |name: &str| meta.get(name).map(value_to_string).unwrap_or_default();
    art.entry("fanart".to_string())
        .or_insert_with(|| top_level("fanart"));
    art.entry("thumb".to_string())
        .or_insert_with(|| top_level("thumbnail"));
    art
}

/// One item per cast member, in billing order.
pub fn build_cast_items(meta: &Map<String, Value>) -> Vec<ListItem> {
    cast_members(meta)
        .into_iter()
        .map(|member| {
            let mut properties = InfoProperties::new();
            properties.insert("name", member.name.clone());
            properties.insert("role", member.role.clone());
            properties.insert("order", member.order.to_string());
            properties.insert("thumbnail", member.thumbnail.clone());

            let mut art = BTreeMap::new();
            if !member.thumbnail.is_empty() {
                art.insert("thumb".to_string(), member.thumbnail.clone());
            }

            ListItem {
                label: member.name,
                label2: member.role,
                path: String::new(),
                art,
                properties,
                video: None,
            }
        })
        .collect()
}

fn cast_members(meta: &Map<String, Value>) -> Vec<CastMember> {
    let mut cast: Vec<CastMember> = decode_field(meta, "cast");
    cast.sort_by_key(|member| member.order);
    cast
}

/// Typed view of one record field; missing or mismatched fields read as the default.
fn decode_field<T: DeserializeOwned + Default>(meta: &Map<String, Value>, field: &str) -> T {
    let Some(value) = meta.get(field) else {
        return T::default();
    };
    serde_json::from_value(value.clone()).unwrap_or_else(|e| {
        tracing::debug!(field, error = %e, "ignoring undecodable field");
        T::default()
    })
}

fn string_map(value: Option<&Value>) -> BTreeMap<String, String> {
    match value {
        Some(Value::Object(map)) => map
            .iter()
            .map(|(k, v)| (k.clone(), value_to_string(v)))
            .collect(),
        _ => BTreeMap::new(),
    }
}

fn add_episode_totals(
    kind: EntityKind,
    labels: &BTreeMap<String, Value>,
    properties: &mut InfoProperties,
) {
    if !matches!(kind, EntityKind::TvShow | EntityKind::Season) {
        return;
    }

    let label_count = |name: &str| labels.get(name).and_then(Value::as_i64).unwrap_or(0);
    let total_episodes = label_count("episode");
    let watched: i64 = properties
        .get("watchedepisodes")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    properties.insert("totalepisodes", total_episodes.to_string());
    properties.insert("unwatchedepisodes", (total_episodes - watched).to_string());
    if kind == EntityKind::TvShow {
        properties.insert("totalseasons", label_count("season").to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use skinkit_core::Lookup;

    struct NoLookups;

    impl LookupResolver for NoLookups {
        fn has_lookup(&self, _field: &str) -> bool {
            false
        }

        fn lookup(&self, _field: &str, _id: i64) -> Lookup {
            Lookup::Empty
        }
    }

    fn meta(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn empty_record_builds_nothing() {
        assert!(build_item(EntityKind::Movie, &DbId::Number(1), &Map::new(), &NoLookups).is_none());
    }

    #[test]
    fn season_path_uses_show_and_season() {
        let record = meta(json!({"tvshowid": 5, "season": 2}));
        assert_eq!(
            item_path(EntityKind::Season, &DbId::Number(40), &record),
            "videodb://tvshows/titles/5/2/"
        );
    }

    #[test]
    fn paths_per_kind() {
        let record = meta(json!({"tvshowid": 5, "season": 2}));
        let id = DbId::Number(9);
        assert_eq!(item_path(EntityKind::Movie, &id, &record), "videodb://movies/titles/9");
        assert_eq!(item_path(EntityKind::Set, &id, &record), "videodb://movies/sets/9/");
        assert_eq!(item_path(EntityKind::TvShow, &id, &record), "videodb://tvshows/titles/9/");
        assert_eq!(
            item_path(EntityKind::Episode, &id, &record),
            "videodb://tvshows/titles/5/2/9"
        );
        assert_eq!(item_path(EntityKind::Addon, &DbId::from("script.x"), &record), "");
    }

    #[test]
    fn artwork_falls_back_to_top_level_images() {
        let record = meta(json!({
            "art": {"poster": "poster.jpg", "thumb": "art-thumb.jpg"},
            "fanart": "fanart.jpg",
            "thumbnail": "thumbnail.jpg"
        }));
        let art = artwork(&record);
        assert_eq!(art["poster"], "poster.jpg");
        assert_eq!(art["thumb"], "art-thumb.jpg");
        assert_eq!(art["fanart"], "fanart.jpg");

        let art = artwork(&meta(json!({"label": "x"})));
        assert_eq!(art["fanart"], "");
        assert_eq!(art["thumb"], "");
    }

    #[test]
    fn movie_item_carries_video_info() {
        let record = meta(json!({
            "label": "Heat",
            "title": "Heat",
            "rating": 8.3,
            "top250": -1,
            "uniqueid": {"imdb": "tt0113277", "tmdb": "949"},
            "streamdetails": {"video": [{"codec": "h264", "width": 1920, "height": 1080}], "audio": [], "subtitle": []},
            "cast": [
                {"name": "Robert De Niro", "role": "Neil McCauley", "order": 1},
                {"name": "Al Pacino", "role": "Vincent Hanna", "order": 0, "thumbnail": "pacino.jpg"}
            ]
        }));
        let item = build_item(EntityKind::Movie, &DbId::Number(7), &record, &NoLookups).unwrap();

        assert_eq!(item.label, "Heat");
        assert_eq!(item.path, "videodb://movies/titles/7");
        assert!(item.is_folder());
        assert_eq!(item.property("rating_percentage"), Some("83%"));

        let video = item.video.expect("movies carry video info");
        assert_eq!(video.media_type, "movie");
        assert_eq!(video.dbid, DbId::Number(7));
        assert_eq!(video.labels.get("rating"), Some(&json!(8.3)));
        assert!(!video.labels.contains_key("top250"));
        assert_eq!(video.unique_ids["imdb"], "tt0113277");
        assert_eq!(video.stream_details.video[0].width, 1920);
        assert_eq!(video.cast[0].name, "Al Pacino");
    }

    #[test]
    fn malformed_stream_details_and_cast_fall_back_to_empty() {
        let record = meta(json!({
            "label": "Heat",
            "streamdetails": {"video": "not-a-list"},
            "cast": [{"name": "Al Pacino", "order": "first"}]
        }));
        let item = build_item(EntityKind::Movie, &DbId::Number(7), &record, &NoLookups).unwrap();
        let video = item.video.as_ref().expect("movies carry video info");
        assert_eq!(video.stream_details, StreamDetails::default());
        assert!(video.cast.is_empty());
        assert_eq!(item.property("cast.0.name"), Some("Al Pacino"));
    }

    #[test]
    fn tvshow_item_counts_episodes() {
        let record = meta(json!({
            "label": "Twin Peaks",
            "episode": 30,
            "season": 2,
            "watchedepisodes": 12
        }));
        let item = build_item(EntityKind::TvShow, &DbId::Number(5), &record, &NoLookups).unwrap();
        assert_eq!(item.property("totalepisodes"), Some("30"));
        assert_eq!(item.property("totalseasons"), Some("2"));
        assert_eq!(item.property("unwatchedepisodes"), Some("18"));
    }

    #[test]
    fn season_item_counts_episodes_without_seasons() {
        let record = meta(json!({"label": "Season 1", "episode": 8, "tvshowid": 5, "season": 1}));
        let item = build_item(EntityKind::Season, &DbId::Number(11), &record, &NoLookups).unwrap();
        assert_eq!(item.property("totalepisodes"), Some("8"));
        assert_eq!(item.property("unwatchedepisodes"), Some("8"));
        assert!(item.property("totalseasons").is_none());
        assert_eq!(item.path, "videodb://tvshows/titles/5/1/");
    }

    #[test]
    fn addon_item_has_no_video_info() {
        let record = meta(json!({"addonid": "script.x", "name": "X", "version": "1.0.0"}));
        let item = build_item(EntityKind::Addon, &DbId::from("script.x"), &record, &NoLookups)
            .unwrap();
        assert!(item.video.is_none());
        assert_eq!(item.path, "");
        assert_eq!(item.property("version"), Some("1.0.0"));
    }

    #[test]
    fn cast_items_follow_billing_order() {
        let record = meta(json!({
            "cast": [
                {"name": "B", "role": "Second", "order": 1},
                {"name": "A", "role": "First", "order": 0, "thumbnail": "a.jpg"}
            ]
        }));
        let items = build_cast_items(&record);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].label, "A");
        assert_eq!(items[0].label2, "First");
        assert_eq!(items[0].art["thumb"], "a.jpg");
        assert_eq!(items[0].property("order"), Some("0"));
        assert!(!items[0].is_folder());
        assert!(items[1].art.is_empty());
    }
}
