/*!
`GoldWriter` implementations. `MemoryGoldWriter` keeps the gold annotations in memory and
`JsonLinesGoldWriter` appends them, one JSON object per line, to a file.
*/
use crate::error::Result;
use crate::gold::{GoldCandidate, GoldWriter};
use serde::{Deserialize, Serialize};
use serde_jsonlines::{append_json_lines, json_lines};
use std::convert::Infallible;
use std::path::{Path, PathBuf};

/// A written gold annotation, with the identity it was given and the collection it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldRecord {
    pub id: String,
    pub collection: String,
    #[serde(flatten)]
    pub candidate: GoldCandidate,
}

fn record_id(collection: &str, index: usize) -> String {
    format!("{}-{}", collection, index)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryGoldWriter {
    collection: String,
    records: Vec<GoldRecord>,
}

impl MemoryGoldWriter {
    pub fn new<S: Into<String>>(collection: S) -> Self {
        Self {
            collection: collection.into(),
            records: vec![],
        }
    }

    pub fn records(&self) -> &[GoldRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<GoldRecord> {
        self.records
    }
}

impl GoldWriter for MemoryGoldWriter {
    type Error = Infallible;
    fn write(&mut self, candidate: &GoldCandidate) -> std::result::Result<String, Infallible> {
        let id = record_id(&self.collection, self.records.len());
        self.records.push(GoldRecord {
            id: id.clone(),
            collection: self.collection.clone(),
            candidate: candidate.clone(),
        });
        Ok(id)
    }
}

/// Appends the gold annotations to a JSON lines file. The file is created on the first write.
/// Every line is a `GoldRecord`.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonLinesGoldWriter {
    path: PathBuf,
    collection: String,
    next_index: usize,
}

impl JsonLinesGoldWriter {
    /// Identities continue after the records already present in the file, if any.
    pub fn new<P: Into<PathBuf>, S: Into<String>>(path: P, collection: S) -> Result<Self> {
        let path = path.into();
        let next_index = if path.exists() {
            load_gold_records(&path)?.len()
        } else {
            0
        };
        Ok(Self {
            path,
            collection: collection.into(),
            next_index,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GoldWriter for JsonLinesGoldWriter {
    type Error = std::io::Error;
    fn write(&mut self, candidate: &GoldCandidate) -> std::io::Result<String> {
        let record = GoldRecord {
            id: record_id(&self.collection, self.next_index),
            collection: self.collection.clone(),
            candidate: candidate.clone(),
        };
        append_json_lines(&self.path, [&record])?;
        self.next_index += 1;
        Ok(record.id)
    }
}

/// Reads back the records of a file written by `JsonLinesGoldWriter`.
pub fn load_gold_records<P: AsRef<Path>>(path: P) -> Result<Vec<GoldRecord>> {
    let records = json_lines::<GoldRecord, P>(path)?.collect::<std::io::Result<Vec<_>>>()?;
    Ok(records)
}
