//! Route persistence: a serializable snapshot and a JSON-file store.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::{RouteFlags, StartingPoint, Stop};
use crate::traits::RouteStore;

/// Everything a session needs to resume: stops in order, starting point, flags.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteSnapshot {
    pub stops: Vec<Stop>,
    #[serde(default)]
    pub starting_point: Option<StartingPoint>,
    #[serde(default)]
    pub flags: RouteFlags,
}

/// Stores one JSON document per user under a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// File for `user_id`, named by the hex of its bytes so distinct ids never share a file.
    pub fn path_for(&self, user_id: &str) -> PathBuf {
        self.root.join(format!("{}.json", hex::encode(user_id)))
    }
}

impl RouteStore for JsonFileStore {
    fn load(&self, user_id: &str) -> Result<Option<RouteSnapshot>, StoreError> {
        let file = match File::open(self.path_for(user_id)) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let snapshot = serde_json::from_reader(BufReader::new(file))?;
        Ok(Some(snapshot))
    }

    fn save(&self, user_id: &str, snapshot: &RouteSnapshot) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)?;
        let dest = self.path_for(user_id);
        let tmp_path = dest.with_extension("tmp");
        write_json(&tmp_path, snapshot)?;
        fs::rename(tmp_path, dest)?;
        Ok(())
    }
}

fn write_json(path: &Path, snapshot: &RouteSnapshot) -> Result<(), StoreError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, snapshot)?;
    writer.flush()?;
    Ok(())
}
