pub mod abort;
pub mod config;
pub mod directory;
pub mod flatten;
pub mod format;
pub mod lock;
pub mod logging;
pub mod models;
pub mod paths;

pub use abort::{AbortFlag, AbortSignal, Deadline, NeverAbort};
pub use config::{Config, ConfigError, KodiConfig, LockConfig, LogLevel, LoggingConfig, ValidationError};
pub use directory::{Directory, MemoryDirectory};
pub use flatten::{
    CollectionAccumulator, Flattened, Flattener, Lookup, LookupOutcome, LookupResolver, SkipReason,
    SubLookupReport,
};
pub use lock::{FileMutex, LockError, LockOptions, LockOutcome};
pub use logging::{init_logging, LoggingError, LoggingGuard};
pub use models::{CastMember, DbId, DirectoryEntry, InfoProperties, ListItem, StreamDetails, VideoInfo};
pub use paths::{AppDirs, DirsError};

pub const APP_NAME: &str = "skinkit";
pub const APP_AUTHOR: &str = "Skinkit";
pub const APP_QUALIFIER: &str = "io";
