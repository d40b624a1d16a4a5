use crate::catalog::Catalog;
use crate::model::SalonRecord;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_salons: u32,
    pub created_at: String,
    pub version: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Json,
    Bincode,
}

impl CatalogFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("json") => Ok(CatalogFormat::Json),
            Some("bin") => Ok(CatalogFormat::Bincode),
            other => bail!("unsupported catalog file extension {:?} for {}", other, path.display()),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            CatalogFormat::Json => "json",
            CatalogFormat::Bincode => "bin",
        }
    }
}

/// Layout of an exported catalog directory.
pub struct CatalogPaths {
    pub root: PathBuf,
}

impl CatalogPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn salons(&self, format: CatalogFormat) -> PathBuf { self.root.join(format!("salons.{}", format.extension())) }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

pub fn save_catalog(path: &Path, format: CatalogFormat, salons: &[SalonRecord]) -> Result<()> {
    if let Some(dir) = path.parent() {
        create_dir_all(dir)?;
    }
    let mut f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let bytes = match format {
        CatalogFormat::Json => serde_json::to_vec_pretty(salons)?,
        CatalogFormat::Bincode => bincode::serialize(salons)?,
    };
    f.write_all(&bytes)?;
    Ok(())
}

/// Load a catalog file, picking the decoder from the file extension.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let format = CatalogFormat::from_path(path)?;
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let salons: Vec<SalonRecord> = match format {
        CatalogFormat::Json => serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parsing {}", path.display()))?,
        CatalogFormat::Bincode => {
            let mut buf = Vec::new();
            BufReader::new(f).read_to_end(&mut buf)?;
            bincode::deserialize(&buf).with_context(|| format!("decoding {}", path.display()))?
        }
    };
    tracing::debug!(path = %path.display(), salons = salons.len(), "catalog loaded");
    Ok(Catalog::new(salons))
}

pub fn save_meta(paths: &CatalogPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &CatalogPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

/// Write the salons file plus `meta.json` into `paths.root`.
pub fn export_catalog(paths: &CatalogPaths, format: CatalogFormat, catalog: &Catalog) -> Result<PathBuf> {
    let out = paths.salons(format);
    save_catalog(&out, format, catalog.records())?;
    let meta = MetaFile {
        num_salons: catalog.len() as u32,
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default(),
        version: SNAPSHOT_VERSION,
    };
    save_meta(paths, &meta)?;
    Ok(out)
}
