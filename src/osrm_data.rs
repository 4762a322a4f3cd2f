//! Local OSRM dataset provisioning (Geofabrik extract + docker preprocessing).
//!
//! Used to run a private `osrm-routed` for integration tests instead of the
//! public demo server.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::info;

const OSRM_IMAGE: &str = "osrm/osrm-backend";

#[derive(Debug, Clone)]
pub struct GeofabrikRegion {
    /// Geofabrik region path, e.g. "europe/czech-republic".
    pub path: String,
}

impl GeofabrikRegion {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn czech_republic() -> Self {
        Self::new("europe/czech-republic")
    }

    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or("region")
    }

    pub fn url(&self) -> String {
        format!("https://download.geofabrik.de/{}-latest.osm.pbf", self.path)
    }
}

#[derive(Debug, Clone)]
pub struct DatasetConfig {
    pub region: GeofabrikRegion,
    pub data_root: PathBuf,
    /// Lua profile shipped in the OSRM image, e.g. "car".
    pub profile: String,
}

impl DatasetConfig {
    pub fn new(region: GeofabrikRegion, data_root: impl Into<PathBuf>) -> Self {
        Self {
            region,
            data_root: data_root.into(),
            profile: "car".to_string(),
        }
    }
}

/// A preprocessed (MLD) dataset ready for `osrm-routed --algorithm mld`.
#[derive(Debug, Clone)]
pub struct OsrmDataset {
    pub data_dir: PathBuf,
    pub osrm_base: PathBuf,
}

#[derive(Debug)]
pub enum DatasetError {
    Io(io::Error),
    Http(reqwest::Error),
    Docker(String),
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetError::Io(err) => write!(f, "dataset I/O error: {}", err),
            DatasetError::Http(err) => write!(f, "dataset download failed: {}", err),
            DatasetError::Docker(msg) => write!(f, "OSRM preprocessing failed: {}", msg),
        }
    }
}

impl std::error::Error for DatasetError {}

impl From<io::Error> for DatasetError {
    fn from(err: io::Error) -> Self {
        DatasetError::Io(err)
    }
}

impl From<reqwest::Error> for DatasetError {
    fn from(err: reqwest::Error) -> Self {
        DatasetError::Http(err)
    }
}

impl OsrmDataset {
    /// Downloads and preprocesses the region unless the outputs already exist.
    pub fn prepare(config: &DatasetConfig) -> Result<Self, DatasetError> {
        let data_root = if config.data_root.is_absolute() {
            config.data_root.clone()
        } else {
            std::env::current_dir()?.join(&config.data_root)
        };
        let name = config.region.name();
        let data_dir = data_root.join(name);
        fs::create_dir_all(&data_dir)?;

        let pbf_path = data_dir.join(format!("{}-latest.osm.pbf", name));
        if !pbf_path.exists() {
            info!(url = %config.region.url(), "downloading OSM extract");
            download(&config.region.url(), &pbf_path)?;
        }

        let osrm_base = data_dir.join(format!("{}-latest.osrm", name));
        let base_in_container = format!("/data/{}", file_name(&osrm_base));

        if !osrm_base.exists() {
            let profile = format!("/opt/{}.lua", config.profile);
            let pbf_in_container = format!("/data/{}", file_name(&pbf_path));
            run_osrm_tool(&data_dir, &["osrm-extract", "-p", &profile, &pbf_in_container])?;
        }
        if !mld_ready(&osrm_base) {
            run_osrm_tool(&data_dir, &["osrm-partition", &base_in_container])?;
            run_osrm_tool(&data_dir, &["osrm-customize", &base_in_container])?;
        }

        Ok(Self { data_dir, osrm_base })
    }

    /// Path of the `.osrm` base as seen inside a container mounting `data_dir` at `/data`.
    pub fn container_path(&self) -> String {
        format!("/data/{}", file_name(&self.osrm_base))
    }
}

fn download(url: &str, dest: &Path) -> Result<(), DatasetError> {
    let bytes = reqwest::blocking::get(url)?.error_for_status()?.bytes()?;
    let tmp_path = dest.with_extension("tmp");
    let mut writer = BufWriter::new(File::create(&tmp_path)?);
    writer.write_all(&bytes)?;
    writer.flush()?;
    fs::rename(tmp_path, dest)?;
    Ok(())
}

fn mld_ready(osrm_base: &Path) -> bool {
    ["osrm.partition", "osrm.mldgr", "osrm.cells"]
        .iter()
        .all(|ext| osrm_base.with_extension(ext).exists())
        && osrm_base.exists()
}

fn run_osrm_tool(data_dir: &Path, args: &[&str]) -> Result<(), DatasetError> {
    info!(tool = args.first().copied().unwrap_or_default(), "running OSRM preprocessing step");
    let status = Command::new("docker")
        .args(["run", "--rm", "-t", "-v"])
        .arg(format!("{}:/data", data_dir.display()))
        .arg(OSRM_IMAGE)
        .args(args)
        .status()?;

    if status.success() {
        Ok(())
    } else {
        Err(DatasetError::Docker(format!("{} exited with {}", args.join(" "), status)))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string()
}
