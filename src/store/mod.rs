pub mod batch;
pub mod keys;
pub mod metadata;
pub mod query;
pub mod repository;

use std::time::Duration;

use fred::prelude::*;
use fred::types::scan::Scanner;
use futures::TryStreamExt;

use crate::error::Result;

pub use batch::{BatchOp, WriteBatch};
pub use keys::KeySpace;
pub use metadata::{merge as merge_metadata, MetadataTracker, RunSummary, UPDATED_FILES_CAP};
pub use query::QueryEngine;
pub use repository::{ClearStats, Repository};

/// Connect to the store endpoint. A failure here is fatal to the whole
/// command; nothing is written before the connection is up.
pub async fn connect(url: &str) -> Result<Client> {
    let config = Config::from_url(url)?;
    let client = Builder::from_config(config)
        .with_connection_config(|cfg| {
            cfg.connection_timeout = Duration::from_secs(5);
        })
        .build()?;
    client.init().await?;
    Ok(client)
}

/// Collect every key matching a pattern via incremental SCAN.
pub(crate) async fn scan_keys(client: &Client, pattern: &str) -> Result<Vec<String>> {
    let mut stream = client.scan(pattern, Some(100), None);
    let mut keys = Vec::new();
    while let Some(mut page) = stream.try_next().await? {
        if let Some(page_keys) = page.take_results() {
            keys.extend(
                page_keys
                    .into_iter()
                    .filter_map(|key| key.into_string()),
            );
        }
        let _ = page.next();
    }
    Ok(keys)
}
