//! Schema files on disk, and the autosave hook.

use crate::error::PairerError;
use crate::helpers::fs::atomic_write;
use crate::schema::FileSchema;
use crate::schema::SchemaError;
use crate::schema::SCHEMA_VERSION;
use anyhow::Context;
use log::debug;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

/// Pretty-printed JSON of a schema.
pub fn to_json(schema: &FileSchema) -> Result<String, PairerError> {
    Ok(serde_json::to_string_pretty(schema)?)
}

/// Writes `schema` to `path` through a temp file, so `path` is never left truncated.
pub fn save(schema: &FileSchema, path: &Path) -> Result<(), PairerError> {
    atomic_write(path, |file| -> Result<(), PairerError> {
        serde_json::to_writer_pretty(&mut *file, schema)?;
        file.write_all(b"\n")?;
        Ok(())
    })?;
    debug!("Wrote schema with {} sheet(s) to '{}'", schema.sheets.len(), path.display());
    Ok(())
}

/// Reads and structurally checks a schema file.
/// Range and shape validation is left to the registry.
pub fn load(path: &Path) -> Result<FileSchema, PairerError> {
    if !path.is_file() {
        Err(SchemaError::FileNotFound { path: path.display().to_string() })?;
    }
    let text = fs::read_to_string(path)?;
    let unrecognized = |message: String| SchemaError::UnrecognizedSchema {
        path: path.display().to_string(),
        message,
    };

    let value: serde_json::Value = serde_json::from_str(&text).map_err(|error| unrecognized(error.to_string()))?;
    match value.get("version").map(serde_json::Value::as_u64) {
        Some(Some(SCHEMA_VERSION)) => (),
        Some(Some(version)) => Err(SchemaError::UnsupportedVersion {
            path: path.display().to_string(),
            version,
        })?,
        Some(None) => Err(unrecognized("'version' must be a positive integer".to_owned()))?,
        None => Err(unrecognized("missing field `version`".to_owned()))?,
    }
    let schema = serde_json::from_value::<FileSchema>(value).map_err(|error| unrecognized(error.to_string()))?;
    Ok(schema)
}

/// Receives the schema after every change.
pub trait SchemaObserver {
    fn schema_changed(&mut self, schema: &FileSchema) -> anyhow::Result<()>;
}

/// Saves every change to one file.
#[derive(Clone, Debug)]
pub struct FileAutosave {
    path: PathBuf,
}

impl FileAutosave {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileAutosave { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SchemaObserver for FileAutosave {
    fn schema_changed(&mut self, schema: &FileSchema) -> anyhow::Result<()> {
        save(schema, &self.path).with_context(|| format!("Failed to autosave schema to '{}'", self.path.display()))
    }
}

/// `<dir>/<workbook stem>_autosave.json`
pub fn autosave_path(dir: &Path, workbook: &Path) -> PathBuf {
    let stem = workbook
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "workbook".to_owned());
    dir.join(format!("{stem}_autosave.json"))
}

/// The workbook path with a `.json` extension.
pub fn default_schema_path(workbook: &Path) -> PathBuf {
    workbook.with_extension("json")
}
