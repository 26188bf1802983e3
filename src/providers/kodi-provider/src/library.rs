use crate::item::{build_cast_items, build_item};
use crate::lookups::{EntityKind, CAST_PROPERTIES};
use crate::protocol::details_params;
use crate::transport::{HttpTransport, RpcError, RpcResult, RpcTransport};
use serde_json::{Map, Value};
use skinkit_core::{DbId, Directory, DirectoryEntry, KodiConfig, Lookup, LookupResolver};
use std::sync::Arc;

const CAST_CONTENT: &str = "actors";

/// Video/addon library access over JSON-RPC.
#[derive(Clone)]
pub struct KodiLibrary {
    transport: Arc<dyn RpcTransport>,
}

impl KodiLibrary {
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self { transport }
    }

    pub fn from_config(config: &KodiConfig) -> RpcResult<Self> {
        Ok(Self::new(Arc::new(HttpTransport::new(config)?)))
    }

    /// Fetches one entity's details with its fixed property list.
    ///
    /// An absent or `null` record comes back as an empty map.
    pub fn fetch_record(&self, kind: EntityKind, dbid: &DbId) -> RpcResult<Map<String, Value>> {
        self.fetch_with(kind, dbid, kind.spec().properties)
    }

    fn fetch_with(
        &self,
        kind: EntityKind,
        dbid: &DbId,
        properties: &[&str],
    ) -> RpcResult<Map<String, Value>> {
        let spec = kind.spec();
        let result = self
            .transport
            .call(spec.method, details_params(spec.id_param, dbid, properties))?;

        match result.get(spec.result_key) {
            None | Some(Value::Null) => Ok(Map::new()),
            Some(Value::Object(record)) => Ok(record.clone()),
            Some(other) => Err(RpcError::Decode {
                method: spec.method.to_string(),
                message: format!("expected an object under '{}', got {other}", spec.result_key),
            }),
        }
    }

    /// Fetch failures are logged and read as "no record".
    fn fetch_or_empty(&self, kind: EntityKind, dbid: &DbId, properties: &[&str]) -> Map<String, Value> {
        self.fetch_with(kind, dbid, properties).unwrap_or_else(|e| {
            tracing::warn!(kind = %kind, dbid = %dbid, error = %e, "library lookup failed");
            Map::new()
        })
    }

    /// Zero or one `(path, item, is_folder)` entries for `dbid`.
    pub fn get_items(&self, kind: EntityKind, dbid: &DbId) -> Vec<DirectoryEntry> {
        if dbid.is_falsy() {
            return Vec::new();
        }

        let meta = self.fetch_or_empty(kind, dbid, kind.spec().properties);
        build_item(kind, dbid, &meta, self)
            .map(DirectoryEntry::from_item)
            .into_iter()
            .collect()
    }

    pub fn get_directory(&self, kind: EntityKind, dbid: &DbId, directory: &mut dyn Directory) {
        let items = self.get_items(kind, dbid);
        tracing::debug!(kind = %kind, dbid = %dbid, count = items.len(), "populating directory");
        directory.add_items(items, kind.content());
    }

    /// One entry per cast member of a movie, show or episode.
    pub fn get_cast_items(&self, kind: EntityKind, dbid: &DbId) -> Vec<DirectoryEntry> {
        if !kind.supports_cast() {
            tracing::warn!(kind = %kind, "cast listings are not available for this kind");
            return Vec::new();
        }
        if dbid.is_falsy() {
            return Vec::new();
        }

        let meta = self.fetch_or_empty(kind, dbid, CAST_PROPERTIES);
        build_cast_items(&meta)
            .into_iter()
            .map(DirectoryEntry::from_item)
            .collect()
    }

    pub fn get_cast_directory(&self, kind: EntityKind, dbid: &DbId, directory: &mut dyn Directory) {
        let items = self.get_cast_items(kind, dbid);
        directory.add_items(items, Some(CAST_CONTENT));
    }
}

impl LookupResolver for KodiLibrary {
    fn has_lookup(&self, field: &str) -> bool {
        EntityKind::from_id_param(field).is_some()
    }

    fn lookup(&self, field: &str, id: i64) -> Lookup {
        let Some(kind) = EntityKind::from_id_param(field) else {
            return Lookup::Empty;
        };
        match self.fetch_record(kind, &DbId::Number(id)) {
            Ok(record) if record.is_empty() => Lookup::Empty,
            Ok(record) => Lookup::Found(record),
            Err(e) => {
                tracing::warn!(field, id, error = %e, "sub-lookup failed");
                Lookup::Failed(e.to_string())
            }
        }
    }
}

/// Extracts the addon id from a `plugin://<addonid>/...` path.
pub fn addon_id_from_plugin_path(path: &str) -> Option<String> {
    let rest = path.strip_prefix("plugin://")?;
    let end = rest.rfind('/')?;
    Some(rest[..end].to_string())
}
