//! Policy file read/write.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::GameConfig;
use crate::explore::StateTable;

/// Errors raised while saving or loading a policy file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),
    #[error("unsupported policy file extension: {0:?}")]
    UnsupportedFormat(PathBuf),
}

/// On-disk encoding of a `StateTable`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Format {
    /// Human-readable, keyed by state id.
    #[default]
    Json,
    /// Same structure, encoded with `bincode`.
    Bincode,
}

impl Format {
    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Bincode => "bin",
        }
    }

    /// Pick the format from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self, StoreError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("bin") => Ok(Format::Bincode),
            _ => Err(StoreError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Directory-backed store for policy files.
#[derive(Clone, Debug)]
pub struct PolicyStore {
    dir: PathBuf,
    format: Format,
}

impl PolicyStore {
    /// Store writing JSON files into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            format: Format::Json,
        }
    }

    /// Set the format used by `save`.
    #[must_use]
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn format(&self) -> Format {
        self.format
    }

    /// `policy{rows}x{cols}st{count}m{target}.{ext}`
    #[must_use]
    pub fn file_name(config: &GameConfig, state_count: usize, format: Format) -> String {
        format!(
            "policy{}x{}st{}m{}.{}",
            config.rows,
            config.cols,
            state_count,
            config.target,
            format.extension()
        )
    }

    /// Full path `save` would write for this table.
    #[must_use]
    pub fn path_for(&self, config: &GameConfig, state_count: usize) -> PathBuf {
        self.dir.join(Self::file_name(config, state_count, self.format))
    }

    /// Write `table` and return the file path.
    pub fn save(&self, table: &StateTable, config: &GameConfig) -> Result<PathBuf, StoreError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(config, table.len());
        write_table(&path, table, self.format)?;
        info!("saved {} states to {}", table.len(), path.display());
        Ok(path)
    }

    /// Read a table, choosing the format from the extension.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<StateTable, StoreError> {
        let path = path.as_ref();
        let format = Format::from_path(path)?;
        let table = read_table(path, format)?;
        info!("loaded {} states from {}", table.len(), path.display());
        Ok(table)
    }
}

fn write_table(path: &Path, table: &StateTable, format: Format) -> Result<(), StoreError> {
    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        Format::Json => serde_json::to_writer(&mut writer, table)?,
        Format::Bincode => bincode::serialize_into(&mut writer, table)?,
    }
    writer.flush()?;
    Ok(())
}

fn read_table(path: &Path, format: Format) -> Result<StateTable, StoreError> {
    let reader = BufReader::new(File::open(path)?);
    let table = match format {
        Format::Json => serde_json::from_reader(reader)?,
        Format::Bincode => bincode::deserialize_from(reader)?,
    };
    Ok(table)
}
