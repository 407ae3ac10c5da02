//! Where tabulated nk data comes from.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thinfilm_data::NkTable;
#[cfg(feature = "archive")]
use thinfilm_data::MaterialArchive;

use crate::error::{Result, ThinFilmError};

/// A provider of tabulated (energy, n, k) data by material name.
pub trait MaterialSource: Send + Sync {
    /// Load the table for `name`. Lookup is case-insensitive.
    fn load(&self, name: &str) -> Result<NkTable>;
}

/// Parse a text nk file: one `energy_eV n k` triple per line.
///
/// Blank lines and lines starting with `#`, `%` or `/*` are ignored.
/// Lines that do not hold three numbers are skipped with a warning.
/// `k` is stored as its absolute value.
pub fn parse_nk_table(name: &str, text: &str) -> NkTable {
    let mut table = NkTable {
        name: name.to_string(),
        energy_ev: Vec::new(),
        n: Vec::new(),
        k: Vec::new(),
    };

    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim_start();
        if line.is_empty() || line.starts_with('#') || line.starts_with('%') || line.starts_with("/*")
        {
            continue;
        }
        let values: Vec<f64> = line
            .split_whitespace()
            .take(3)
            .map_while(|w| w.parse().ok())
            .collect();
        if values.len() < 3 {
            log::warn!("{name}: skipping malformed line {}: {line:?}", lineno + 1);
            continue;
        }
        table.energy_ev.push(values[0]);
        table.n.push(values[1]);
        table.k.push(values[2].abs());
    }
    table
}

/// Material files in a directory, one file per material.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectorySource { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn locate(&self, name: &str) -> Result<PathBuf> {
        let direct = self.dir.join(name);
        if direct.is_file() {
            return Ok(direct);
        }

        let unresolved = |reason: String| ThinFilmError::Resolution {
            name: name.to_string(),
            reason,
        };
        let entries = std::fs::read_dir(&self.dir)
            .map_err(|e| unresolved(format!("cannot read {}: {e}", self.dir.display())))?;
        let wanted = name.to_lowercase();
        for entry in entries.flatten() {
            if entry.file_name().to_string_lossy().to_lowercase() == wanted
                && entry.path().is_file()
            {
                return Ok(entry.path());
            }
        }
        Err(unresolved(format!("no file in {}", self.dir.display())))
    }
}

impl MaterialSource for DirectorySource {
    fn load(&self, name: &str) -> Result<NkTable> {
        let path = self.locate(name)?;
        let text = std::fs::read_to_string(&path).map_err(|e| ThinFilmError::Resolution {
            name: name.to_string(),
            reason: format!("cannot read {}: {e}", path.display()),
        })?;
        Ok(parse_nk_table(name, &text))
    }
}

/// Tables held in memory, keyed by lowercase name.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: HashMap<String, NkTable>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a table.
    pub fn insert(&mut self, table: NkTable) {
        self.tables.insert(table.name.to_lowercase(), table);
    }

    pub fn with_table(mut self, table: NkTable) -> Self {
        self.insert(table);
        self
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Build from a zstd-compressed postcard [`MaterialArchive`].
    #[cfg(feature = "archive")]
    pub fn from_archive(bytes: &[u8]) -> Result<Self> {
        let archive = decode_archive(bytes)?;
        log::debug!(
            "archive {}: {} materials",
            archive.version,
            archive.tables.len()
        );
        let mut source = MemorySource::new();
        for table in archive.tables {
            source.insert(table);
        }
        Ok(source)
    }
}

impl MaterialSource for MemorySource {
    fn load(&self, name: &str) -> Result<NkTable> {
        self.tables
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| ThinFilmError::Resolution {
                name: name.to_string(),
                reason: "not in material archive".to_string(),
            })
    }
}

/// Decompress and deserialize a packed material archive.
#[cfg(feature = "archive")]
pub fn decode_archive(bytes: &[u8]) -> Result<MaterialArchive> {
    let mut decoder = ruzstd::decoding::StreamingDecoder::new(bytes)
        .map_err(|e| ThinFilmError::Archive(format!("bad zstd frame: {e:?}")))?;
    let mut decompressed = Vec::new();
    std::io::Read::read_to_end(&mut decoder, &mut decompressed)
        .map_err(|e| ThinFilmError::Archive(format!("decompression failed: {e}")))?;
    postcard::from_bytes(&decompressed).map_err(|e| ThinFilmError::Archive(e.to_string()))
}
