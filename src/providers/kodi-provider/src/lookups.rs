//! Fixed JSON-RPC lookup definitions per library entity.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How to fetch one entity's details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupSpec {
    pub method: &'static str,
    /// Parameter name carrying the id, also the field name that triggers a
    /// sub-lookup for this entity.
    pub id_param: &'static str,
    /// Member of `result` holding the record.
    pub result_key: &'static str,
    pub properties: &'static [&'static str],
}

const ADDON: LookupSpec = LookupSpec {
    method: "Addons.GetAddonDetails",
    id_param: "addonid",
    result_key: "addon",
    properties: &[
        "name", "version", "summary", "description", "path", "author", "thumbnail",
        "disclaimer", "fanart", "dependencies", "broken", "extrainfo", "rating", "enabled",
        "installed", "deprecated",
    ],
};

const SET: LookupSpec = LookupSpec {
    method: "VideoLibrary.GetMovieSetDetails",
    id_param: "setid",
    result_key: "setdetails",
    properties: &["title", "plot", "playcount", "fanart", "thumbnail", "art"],
};

const MOVIE: LookupSpec = LookupSpec {
    method: "VideoLibrary.GetMovieDetails",
    id_param: "movieid",
    result_key: "moviedetails",
    properties: &[
        "file", "title", "plot", "playcount", "year", "trailer", "tagline", "originaltitle",
        "mpaa", "runtime", "set", "setid", "lastplayed", "premiered", "dateadded", "userrating",
        "rating", "votes", "top250", "genre", "director", "writer", "studio", "cast", "country",
        "fanart", "thumbnail", "art", "ratings", "uniqueid", "streamdetails",
    ],
};

const TVSHOW: LookupSpec = LookupSpec {
    method: "VideoLibrary.GetTVShowDetails",
    id_param: "tvshowid",
    result_key: "tvshowdetails",
    properties: &[
        "file", "title", "plot", "playcount", "year", "lastplayed", "premiered",
        "originaltitle", "watchedepisodes", "dateadded", "userrating", "rating", "votes", "mpaa",
        "season", "episode", "genre", "studio", "cast", "fanart", "thumbnail", "art", "ratings",
        "uniqueid",
    ],
};

const SEASON: LookupSpec = LookupSpec {
    method: "VideoLibrary.GetSeasonDetails",
    id_param: "seasonid",
    result_key: "seasondetails",
    properties: &[
        "title", "showtitle", "playcount", "watchedepisodes", "season", "episode", "tvshowid",
        "fanart", "thumbnail", "art",
    ],
};

const EPISODE: LookupSpec = LookupSpec {
    method: "VideoLibrary.GetEpisodeDetails",
    id_param: "episodeid",
    result_key: "episodedetails",
    properties: &[
        "file", "showtitle", "title", "plot", "playcount", "firstaired", "runtime",
        "productioncode", "lastplayed", "dateadded", "season", "episode", "originaltitle",
        "userrating", "rating", "votes", "tvshowid", "seasonid", "writer", "director", "cast",
        "fanart", "thumbnail", "art", "ratings", "uniqueid", "streamdetails",
    ],
};

/// Properties requested for cast listings.
pub const CAST_PROPERTIES: &[&str] = &["cast"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Addon,
    Set,
    Movie,
    TvShow,
    Season,
    Episode,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Addon,
        EntityKind::Set,
        EntityKind::Movie,
        EntityKind::TvShow,
        EntityKind::Season,
        EntityKind::Episode,
    ];

    pub fn spec(self) -> &'static LookupSpec {
        match self {
            EntityKind::Addon => &ADDON,
            EntityKind::Set => &SET,
            EntityKind::Movie => &MOVIE,
            EntityKind::TvShow => &TVSHOW,
            EntityKind::Season => &SEASON,
            EntityKind::Episode => &EPISODE,
        }
    }

    /// The entity a foreign-key field such as `tvshowid` points at.
    pub fn from_id_param(field: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.spec().id_param == field)
    }

    /// Fields that trigger nested lookups while flattening this entity.
    pub fn sub_lookups(self) -> &'static [&'static str] {
        match self {
            EntityKind::Set => &["movieid"],
            EntityKind::Season => &["tvshowid"],
            EntityKind::Episode => &["seasonid", "tvshowid"],
            EntityKind::Addon | EntityKind::Movie | EntityKind::TvShow => &[],
        }
    }

    /// Media type name used by the video library.
    pub fn dbtype(self) -> &'static str {
        match self {
            EntityKind::Addon => "addon",
            EntityKind::Set => "set",
            EntityKind::Movie => "movie",
            EntityKind::TvShow => "tvshow",
            EntityKind::Season => "season",
            EntityKind::Episode => "episode",
        }
    }

    /// Content hint for a listing of this entity.
    pub fn content(self) -> Option<&'static str> {
        match self {
            EntityKind::Addon => None,
            EntityKind::Set => Some("sets"),
            EntityKind::Movie => Some("movies"),
            EntityKind::TvShow => Some("tvshows"),
            EntityKind::Season => Some("seasons"),
            EntityKind::Episode => Some("episodes"),
        }
    }

    pub fn is_video(self) -> bool {
        !matches!(self, EntityKind::Addon)
    }

    /// Addons are addressed by string id, everything else by number.
    pub fn uses_string_id(self) -> bool {
        matches!(self, EntityKind::Addon)
    }

    pub fn supports_cast(self) -> bool {
        matches!(
            self,
            EntityKind::Movie | EntityKind::TvShow | EntityKind::Episode
        )
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dbtype())
    }
}

#[derive(Debug, Error)]
#[error("unknown entity kind '{0}' (expected addon, set, movie, tvshow, season or episode)")]
pub struct ParseEntityKindError(String);

impl FromStr for EntityKind {
    type Err = ParseEntityKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.dbtype() == lowered)
            .ok_or_else(|| ParseEntityKindError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_params_resolve_to_kinds() {
        assert_eq!(EntityKind::from_id_param("tvshowid"), Some(EntityKind::TvShow));
        assert_eq!(EntityKind::from_id_param("seasonid"), Some(EntityKind::Season));
        assert_eq!(EntityKind::from_id_param("movieid"), Some(EntityKind::Movie));
        assert_eq!(EntityKind::from_id_param("genreid"), None);
    }

    #[test]
    fn every_sub_lookup_has_a_definition() {
        for kind in EntityKind::ALL {
            for field in kind.sub_lookups() {
                assert!(
                    EntityKind::from_id_param(field).is_some(),
                    "{kind} sub-lookup {field} has no definition"
                );
            }
        }
    }

    #[test]
    fn season_and_episode_request_their_foreign_keys() {
        assert!(EntityKind::Season.spec().properties.contains(&"tvshowid"));
        assert!(EntityKind::Episode.spec().properties.contains(&"seasonid"));
        assert!(EntityKind::Episode.spec().properties.contains(&"tvshowid"));
    }

    #[test]
    fn kinds_parse_from_dbtype() {
        assert_eq!("movie".parse::<EntityKind>().unwrap(), EntityKind::Movie);
        assert_eq!("TVShow".parse::<EntityKind>().unwrap(), EntityKind::TvShow);
        assert!("album".parse::<EntityKind>().is_err());
    }
}
