//! The bundled static dataset and the seeding routine that uploads it.

use super::RecordStore;
use crate::error::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

const BUNDLED: &str = include_str!("../../data/colleges-seed.json");

pub const SEED_BATCH_SIZE: usize = 10;
pub const SEED_BATCH_PAUSE: Duration = Duration::from_millis(500);

#[derive(Debug, Deserialize)]
struct SeedPayload {
    colleges: Vec<Value>,
}

/// Where the dataset rows were read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetOrigin {
    Bundled,
    File(PathBuf),
}

/// Rows of the fallback dataset, in file order, still in their raw camelCase shape.
#[derive(Debug, Clone)]
pub struct StaticDataset {
    rows: Vec<Value>,
    origin: DatasetOrigin,
}

impl StaticDataset {
    /// The copy compiled into the binary.
    pub fn bundled() -> Result<Self> {
        let rows = parse_payload(BUNDLED).context("Bundled dataset is malformed")?;
        Ok(Self {
            rows,
            origin: DatasetOrigin::Bundled,
        })
    }

    /// Read a `{ "colleges": [...] }` file.
    pub async fn from_file(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read dataset {}", path.display()))?;
        let rows = parse_payload(&contents)
            .with_context(|| format!("Failed to parse dataset {}", path.display()))?;
        Ok(Self {
            rows,
            origin: DatasetOrigin::File(path.to_path_buf()),
        })
    }

    /// Use `path` when given and readable, the bundled copy otherwise.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            match Self::from_file(path).await {
                Ok(dataset) => {
                    tracing::info!("Loaded {} dataset rows from {}", dataset.len(), path.display());
                    return Ok(dataset);
                }
                Err(e) => {
                    tracing::warn!("Dataset override unusable, using bundled copy: {:#}", e);
                }
            }
        }
        Self::bundled()
    }

    pub fn from_rows(rows: Vec<Value>) -> Self {
        Self {
            rows,
            origin: DatasetOrigin::Bundled,
        }
    }

    pub fn rows(&self) -> &[Value] {
        &self.rows
    }

    pub fn origin(&self) -> &DatasetOrigin {
        &self.origin
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The raw row whose `slug` equals `slug`.
    pub fn find_by_slug(&self, slug: &str) -> Option<&Value> {
        self.rows
            .iter()
            .find(|row| row.get("slug").and_then(Value::as_str) == Some(slug))
    }
}

fn parse_payload(contents: &str) -> Result<Vec<Value>> {
    let payload: SeedPayload = serde_json::from_str(contents)?;
    Ok(payload.colleges)
}

/// One dataset row reshaped for the store's lowercase column names.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SeedRow {
    pub name: String,
    pub slug: String,
    pub city: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estd: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approvals: Option<Vec<String>>,
    #[serde(default, rename(deserialize = "campusArea"), skip_serializing_if = "Option::is_none")]
    pub campusarea: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intake: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, rename(deserialize = "highestPackage"), skip_serializing_if = "Option::is_none")]
    pub highestpackage: Option<String>,
    #[serde(default, rename(deserialize = "averagePackage"), skip_serializing_if = "Option::is_none")]
    pub averagepackage: Option<String>,
    #[serde(default, rename(deserialize = "placementPercent"), skip_serializing_if = "Option::is_none")]
    pub placementpercent: Option<String>,
    #[serde(default, rename(deserialize = "feeRange"), skip_serializing_if = "Option::is_none")]
    pub feerange: Option<String>,
    #[serde(default, rename(deserialize = "notableRecruiters"), skip_serializing_if = "Option::is_none")]
    pub notablerecruiters: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SeedRow {
    pub fn from_value(row: &Value) -> Option<Self> {
        serde_json::from_value(row.clone()).ok()
    }
}

/// Outcome of a seeding run, counted in rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: usize,
    pub failed: usize,
    pub batches: usize,
}

impl SeedReport {
    pub const fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Upload every dataset row into `table`, `batch_size` rows per request.
///
/// A failed batch counts all its rows as failed and seeding continues with
/// the next batch. Rows missing a required field are counted as failed
/// without being sent.
pub async fn seed_store(
    store: &dyn RecordStore,
    table: &str,
    dataset: &StaticDataset,
    batch_size: usize,
    pause: Duration,
) -> SeedReport {
    let mut report = SeedReport::default();
    let batch_size = batch_size.max(1);

    for (index, chunk) in dataset.rows().chunks(batch_size).enumerate() {
        if index > 0 && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }

        let rows: Vec<SeedRow> = chunk.iter().filter_map(SeedRow::from_value).collect();
        let skipped = chunk.len() - rows.len();
        if skipped > 0 {
            tracing::warn!("Batch {}: skipped {} malformed rows", index + 1, skipped);
            report.failed += skipped;
        }
        if rows.is_empty() {
            continue;
        }

        report.batches += 1;
        let count = rows.len();
        let payload = match serde_json::to_value(&rows) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("Batch {}: failed to encode rows: {}", index + 1, e);
                report.failed += count;
                continue;
            }
        };

        match store.insert(table, payload).await {
            Ok(()) => {
                tracing::info!("Batch {} inserted: {} colleges", index + 1, count);
                report.inserted += count;
            }
            Err(e) => {
                tracing::error!("Batch {} failed: {}", index + 1, e);
                report.failed += count;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use serde_json::json;

    #[test]
    fn bundled_dataset_parses() {
        let dataset = StaticDataset::bundled().unwrap();
        check!(dataset.len() >= 14);
        check!(dataset.origin() == &DatasetOrigin::Bundled);
        check!(dataset.rows().iter().all(|row| row.get("slug").is_some()));
    }

    #[tokio::test]
    async fn unreadable_override_uses_bundled_copy() {
        let dataset = StaticDataset::load(Some(Path::new("/nonexistent/colleges.json")))
            .await
            .unwrap();
        check!(dataset.origin() == &DatasetOrigin::Bundled);
    }

    #[tokio::test]
    async fn override_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("colleges.json");
        std::fs::write(&path, r#"{"colleges":[{"name":"Only","slug":"only"}]}"#).unwrap();

        let dataset = StaticDataset::load(Some(&path)).await.unwrap();
        check!(dataset.len() == 1);
        check!(dataset.origin() == &DatasetOrigin::File(path));
    }

    #[test]
    fn seed_row_maps_to_lowercase_columns() {
        let row = SeedRow::from_value(&json!({
            "name": "A", "slug": "a", "city": "Delhi", "state": "Delhi",
            "campusArea": "20 acres", "placementPercent": "90%",
            "notableRecruiters": ["Infosys"]
        }))
        .unwrap();
        let out = serde_json::to_value(&row).unwrap();
        check!(out["campusarea"] == "20 acres");
        check!(out["placementpercent"] == "90%");
        check!(out["notablerecruiters"] == json!(["Infosys"]));
        check!(out.get("estd").is_none());
        check!(out.get("campusArea").is_none());
    }

    #[test]
    fn find_by_slug_matches_exactly() {
        let dataset = StaticDataset::from_rows(vec![json!({"slug": "a"}), json!({"slug": "b"})]);
        check!(dataset.find_by_slug("b") == Some(&json!({"slug": "b"})));
        check!(dataset.find_by_slug("c").is_none());
    }
}
