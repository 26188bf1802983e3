//! Kodi video/addon library access over JSON-RPC.
//!
//! [`KodiLibrary`] fetches one entity's details, flattens them into
//! properties (running the entity's sub-lookups through itself) and hands
//! the resulting list items to a [`skinkit_core::Directory`].

mod infolabels;
pub mod item;
pub mod library;
pub mod lookups;
pub mod protocol;
pub mod transport;

pub use infolabels::map_info_labels;
pub use library::{addon_id_from_plugin_path, KodiLibrary};
pub use lookups::{EntityKind, LookupSpec, ParseEntityKindError, CAST_PROPERTIES};
pub use transport::{HttpTransport, RpcError, RpcResult, RpcTransport};
