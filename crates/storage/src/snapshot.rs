//! Codec between `PersistedSnapshot` and the four string keys it occupies in a
//! `DurableStore`.

use shared::{
    domain::{Article, SortColumn, SortDirection},
    snapshot::PersistedSnapshot,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::DurableStore;

pub const KEY_ARTICLES: &str = "articles";
pub const KEY_STOP: &str = "stop";
pub const KEY_SORT_DIRECTION: &str = "sortDir";
pub const KEY_SORT_COLUMN: &str = "sortContext";
pub const SNAPSHOT_KEYS: [&str; 4] = [KEY_ARTICLES, KEY_STOP, KEY_SORT_DIRECTION, KEY_SORT_COLUMN];

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("stored '{key}' is not valid JSON: {source}")]
    Corrupt {
        key: &'static str,
        source: serde_json::Error,
    },
    #[error("stored '{key}' has unrecognized value '{value}'")]
    InvalidValue { key: &'static str, value: String },
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Reads the snapshot. Absent `articles` means no snapshot was ever written.
pub async fn load_snapshot(
    store: &dyn DurableStore,
) -> Result<Option<PersistedSnapshot>, SnapshotError> {
    let Some(raw_articles) = store.get(KEY_ARTICLES).await? else {
        return Ok(None);
    };
    let articles: Vec<Article> =
        serde_json::from_str(&raw_articles).map_err(|source| SnapshotError::Corrupt {
            key: KEY_ARTICLES,
            source,
        })?;

    let stop = match store.get(KEY_STOP).await? {
        Some(raw) => parse_stop(&raw).unwrap_or_else(|| {
            warn!(raw = %raw, "stored stop is not a number; showing every stored article");
            articles.len()
        }),
        None => articles.len(),
    };

    let direction = match store.get(KEY_SORT_DIRECTION).await? {
        Some(raw) => Some(raw.parse::<SortDirection>().map_err(|_| {
            SnapshotError::InvalidValue {
                key: KEY_SORT_DIRECTION,
                value: raw,
            }
        })?),
        None => None,
    };
    let column = match store.get(KEY_SORT_COLUMN).await? {
        Some(raw) => Some(raw.parse::<SortColumn>().map_err(|_| {
            SnapshotError::InvalidValue {
                key: KEY_SORT_COLUMN,
                value: raw,
            }
        })?),
        None => None,
    };

    debug!(
        articles = articles.len(),
        stop,
        ?direction,
        ?column,
        "loaded persisted snapshot"
    );
    Ok(Some(PersistedSnapshot {
        articles,
        stop,
        direction,
        column,
    }))
}

/// Writes each key separately; a failure part-way leaves earlier keys updated.
pub async fn save_snapshot(
    store: &dyn DurableStore,
    snapshot: &PersistedSnapshot,
) -> Result<(), SnapshotError> {
    let articles = serde_json::to_string(&snapshot.articles).map_err(|source| {
        SnapshotError::Corrupt {
            key: KEY_ARTICLES,
            source,
        }
    })?;
    store.set(KEY_ARTICLES, &articles).await?;
    store.set(KEY_STOP, &snapshot.stop.to_string()).await?;
    if let Some(direction) = snapshot.direction {
        store.set(KEY_SORT_DIRECTION, direction.as_str()).await?;
    }
    if let Some(column) = snapshot.column {
        store.set(KEY_SORT_COLUMN, column.as_str()).await?;
    }
    debug!(
        articles = snapshot.articles.len(),
        stop = snapshot.stop,
        "saved snapshot"
    );
    Ok(())
}

pub async fn clear_snapshot(store: &dyn DurableStore) -> Result<(), SnapshotError> {
    for key in SNAPSHOT_KEYS {
        store.remove(key).await?;
    }
    Ok(())
}

/// Accepts `20`, `" 20 "` and `20.0`; the bound has been stored as a string.
pub(crate) fn parse_stop(raw: &str) -> Option<usize> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<usize>() {
        return Some(value);
    }
    let value = raw.parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0).then(|| value.trunc() as usize)
}
