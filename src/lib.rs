pub mod config;
pub mod error;
pub mod extract;
pub mod indexer;
pub mod model;
pub mod store;
pub mod walker;

pub use config::AppConfig;
pub use error::{EngramError, Result};
pub use extract::EntityExtractor;
pub use indexer::{forget_project, index_project, IndexReport};
pub use model::{Entity, EntityCounts, EntityKind, FileRecord, ProjectMetadata, ProjectStatus};
pub use store::{
    connect, ClearStats, KeySpace, MetadataTracker, QueryEngine, Repository, RunSummary,
    WriteBatch,
};
pub use walker::{collect_source_files, SourceFile};
