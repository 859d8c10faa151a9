//! Location and loading of a map's export tables.
//!
//! A map export is three CSV files, `meta.csv`, `topics.csv` and `data.csv`,
//! kept either in a local directory or below an HTTP(S) base URL.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::fetch::auth::ApiKey;
use crate::fetch::{BasicClient, HttpClient, fetch_bytes};
use crate::parser::parse_table;
use crate::table::{MapTables, Table};

pub const META_FILE: &str = "meta.csv";
pub const TOPICS_FILE: &str = "topics.csv";
pub const DATA_FILE: &str = "data.csv";

/// Where the export files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapLocation {
    Dir(PathBuf),
    Remote(String),
}

impl MapLocation {
    /// Anything starting with `http` is a remote base URL, everything else a directory.
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http") {
            MapLocation::Remote(source.trim_end_matches('/').to_string())
        } else {
            MapLocation::Dir(PathBuf::from(source))
        }
    }

    /// Full path or URL of the export file `file`.
    pub fn file(&self, file: &str) -> String {
        match self {
            MapLocation::Dir(dir) => dir.join(file).display().to_string(),
            MapLocation::Remote(base) => format!("{base}/{file}"),
        }
    }

    /// Short map name for logs and default output names.
    pub fn map_name(&self) -> String {
        match self {
            MapLocation::Dir(dir) => dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            MapLocation::Remote(base) => extract_map_name(base),
        }
    }
}

/// Pulls the map name out of a map URL of the form `.../data/<org>/<map>[/map]`.
///
/// Inputs that do not look like a map URL are returned unchanged.
pub fn extract_map_name(url_or_name: &str) -> String {
    let trimmed = url_or_name.trim_end_matches('/');
    let candidates = [Some(trimmed), trimmed.strip_suffix("/map")];

    for path in candidates.into_iter().flatten() {
        let segments: Vec<&str> = path.split('/').collect();
        // `<prefix>/data/<org>/<map>`
        if let [.., _, "data", org, map] = segments.as_slice() {
            if !org.is_empty() && !map.is_empty() {
                return map.to_string();
            }
        }
    }

    url_or_name.to_string()
}

/// Raw bytes of the three export files, in meta/topics/data order.
pub struct ExportFiles {
    pub meta: Vec<u8>,
    pub topics: Vec<u8>,
    pub data: Vec<u8>,
}

impl ExportFiles {
    pub fn parse(&self) -> Result<MapTables> {
        let table = |name: &str, bytes: &[u8]| -> Result<Table> {
            parse_table(bytes).with_context(|| format!("Failed to parse {name}"))
        };
        Ok(MapTables {
            meta: table(META_FILE, &self.meta)?,
            topics: table(TOPICS_FILE, &self.topics)?,
            data: table(DATA_FILE, &self.data)?,
        })
    }

    /// Writes the three files into `dir`, creating it if needed.
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        for (name, bytes) in [
            (META_FILE, &self.meta),
            (TOPICS_FILE, &self.topics),
            (DATA_FILE, &self.data),
        ] {
            let path = dir.join(name);
            std::fs::write(&path, bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            debug!(path = %path.display(), bytes = bytes.len(), "Export file saved");
        }
        Ok(())
    }
}

/// Reads the three export files from `location`.
///
/// Remote exports are fetched one after another; `token`, when set, is sent
/// as a bearer token.
#[tracing::instrument(skip_all, fields(location = ?location))]
pub async fn fetch_exports(location: &MapLocation, token: Option<&str>) -> Result<ExportFiles> {
    let files = match location {
        MapLocation::Dir(_) => {
            let read = |file: &str| -> Result<Vec<u8>> {
                let path = location.file(file);
                std::fs::read(&path).with_context(|| format!("Failed to read {path}"))
            };
            ExportFiles {
                meta: read(META_FILE)?,
                topics: read(TOPICS_FILE)?,
                data: read(DATA_FILE)?,
            }
        }
        MapLocation::Remote(_) => match token.filter(|t| !t.is_empty()) {
            Some(token) => {
                let client = ApiKey::bearer(BasicClient::new()?, token)?;
                fetch_remote(&client, location).await?
            }
            None => fetch_remote(&BasicClient::new()?, location).await?,
        },
    };

    info!(
        meta_bytes = files.meta.len(),
        topics_bytes = files.topics.len(),
        data_bytes = files.data.len(),
        "Export files loaded"
    );
    Ok(files)
}

async fn fetch_remote<C: HttpClient>(client: &C, location: &MapLocation) -> Result<ExportFiles> {
    Ok(ExportFiles {
        meta: fetch_bytes(client, &location.file(META_FILE)).await?,
        topics: fetch_bytes(client, &location.file(TOPICS_FILE)).await?,
        data: fetch_bytes(client, &location.file(DATA_FILE)).await?,
    })
}

/// Loads and parses the export tables from `location`.
pub async fn load_tables(location: &MapLocation, token: Option<&str>) -> Result<MapTables> {
    let tables = fetch_exports(location, token).await?.parse()?;
    info!(
        topics = tables.meta.len(),
        memberships = tables.topics.len(),
        items = tables.data.len(),
        "Map tables parsed"
    );
    Ok(tables)
}
