// src/trips.rs
//! Trip catalog: category-scoped collections of trip documents returned verbatim.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripCategory {
    Recent,
    Popular,
}

impl TripCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripCategory::Recent => "recent",
            TripCategory::Popular => "popular",
        }
    }
}

impl fmt::Display for TripCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCategory(pub String);

impl FromStr for TripCategory {
    type Err = InvalidCategory;

    // exact, lowercase only
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recent" => Ok(TripCategory::Recent),
            "popular" => Ok(TripCategory::Popular),
            other => Err(InvalidCategory(other.to_string())),
        }
    }
}

/// A stored trip document with its id merged in, e.g. `{ "id": "goa-weekend", "title": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[async_trait]
pub trait TripStore: Send + Sync {
    async fn list(&self, category: TripCategory) -> Result<Vec<TripRecord>>;
}

pub type DynTripStore = Arc<dyn TripStore>;

/// One JSON object per file: `{root}/{category}/{id}.json`, listed in id order.
pub struct JsonDirTripStore {
    root: PathBuf,
}

impl JsonDirTripStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl TripStore for JsonDirTripStore {
    async fn list(&self, category: TripCategory) -> Result<Vec<TripRecord>> {
        let dir = self.root.join(category.as_str());
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(rd) => rd,
            // an empty collection simply has no directory yet
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).with_context(|| format!("listing {}", dir.display())),
        };

        let mut out = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };

            let raw = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            let mut fields: Map<String, Value> = serde_json::from_str(&raw)
                .with_context(|| format!("parsing {}", path.display()))?;
            if fields.remove("id").is_some() {
                warn!(%id, "document carries its own id field; file name wins");
            }
            out.push(TripRecord { id, fields });
        }

        out.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(out)
    }
}
