use std::{
    fmt::{self, Write as _},
    fs,
    io::{BufWriter, Write},
    path::Path,
    str::FromStr,
};

use log::{info, warn};
use tempfile::NamedTempFile;

use crate::{error::ConvertError, metadata::BlogMetadata};

/// On-disk encoding of the blog index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum IndexFormat {
    #[default]
    Yaml,
    Json,
}

impl IndexFormat {
    pub fn default_filename(self) -> &'static str {
        match self {
            IndexFormat::Yaml => "blogs.yaml",
            IndexFormat::Json => "blogs.json",
        }
    }

    pub fn store(self) -> Box<dyn IndexStore> {
        match self {
            IndexFormat::Yaml => Box::new(YamlIndex),
            IndexFormat::Json => Box::new(JsonIndex),
        }
    }
}

impl FromStr for IndexFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(IndexFormat::Yaml),
            "json" => Ok(IndexFormat::Json),
            other => Err(format!("unknown index format `{other}` (expected yaml or json)")),
        }
    }
}

impl fmt::Display for IndexFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IndexFormat::Yaml => "yaml",
            IndexFormat::Json => "json",
        })
    }
}

/// Reads and writes a whole index in one encoding.
///
/// Implementors only provide the encoding; the provided `load` and `save`
/// handle the missing-file fallback and the atomic replace.
pub(crate) trait IndexStore {
    fn decode(&self, path: &Path, text: &str) -> Result<Vec<BlogMetadata>, ConvertError>;
    fn encode(&self, path: &Path, entries: &[BlogMetadata]) -> Result<String, ConvertError>;

    fn try_load(&self, path: &Path) -> Result<Vec<BlogMetadata>, ConvertError> {
        if !path.exists() {
            info!("Index file({path:?}) does not exist. starting a new one...");
            return Ok(vec![]);
        }
        let text = fs::read_to_string(path).map_err(|e| ConvertError::UnreadableIndex {
            path: path.to_owned(),
            message: e.to_string(),
        })?;
        if text.trim().is_empty() {
            return Ok(vec![]);
        }
        self.decode(path, &text)
    }

    /// Never fails: an unreadable index is reported and replaced by an empty one.
    fn load(&self, path: &Path) -> Vec<BlogMetadata> {
        self.try_load(path).unwrap_or_else(|e| {
            warn!("{e}. continuing with an empty index");
            vec![]
        })
    }

    fn save(&self, path: &Path, entries: &[BlogMetadata]) -> Result<(), ConvertError> {
        let text = self.encode(path, entries)?;
        write_atomic(path, text.as_bytes())
    }
}

pub(crate) struct YamlIndex;

impl IndexStore for YamlIndex {
    fn decode(&self, path: &Path, text: &str) -> Result<Vec<BlogMetadata>, ConvertError> {
        serde_yaml::from_str::<Option<Vec<BlogMetadata>>>(text)
            .map(Option::unwrap_or_default)
            .map_err(|e| ConvertError::UnreadableIndex {
                path: path.to_owned(),
                message: e.to_string(),
            })
    }

    // Every value is double-quoted, so YAML 1.1 readers keep dates and
    // `yes`/`no`/`on` as strings. A JSON string literal is a valid YAML
    // double-quoted scalar.
    fn encode(&self, path: &Path, entries: &[BlogMetadata]) -> Result<String, ConvertError> {
        if entries.is_empty() {
            return Ok("[]\n".to_string());
        }

        let mut text = String::new();
        for entry in entries {
            for (i, (key, value)) in entry.fields().into_iter().enumerate() {
                let scalar = serde_json::to_string(value).map_err(|e| ConvertError::Serialize {
                    path: path.to_owned(),
                    message: e.to_string(),
                })?;
                let indent = if i == 0 { "- " } else { "  " };
                let _ = writeln!(text, "{indent}{key}: {scalar}");
            }
        }
        Ok(text)
    }
}

pub(crate) struct JsonIndex;

impl IndexStore for JsonIndex {
    fn decode(&self, path: &Path, text: &str) -> Result<Vec<BlogMetadata>, ConvertError> {
        serde_json::from_str(text).map_err(|e| ConvertError::UnreadableIndex {
            path: path.to_owned(),
            message: e.to_string(),
        })
    }

    fn encode(&self, path: &Path, entries: &[BlogMetadata]) -> Result<String, ConvertError> {
        let mut text = serde_json::to_string_pretty(entries).map_err(|e| ConvertError::Serialize {
            path: path.to_owned(),
            message: e.to_string(),
        })?;
        text.push('\n');
        Ok(text)
    }
}

/// Inserts `entry`, replacing any entry with the same id, and re-sorts newest first.
pub(crate) fn merge(index: &mut Vec<BlogMetadata>, entry: BlogMetadata) {
    if let Some(existing) = index.iter_mut().find(|e| e.id == entry.id) {
        info!("Updated existing blog: {}", entry.title);
        *existing = entry;
    } else {
        info!("Added new blog: {}", entry.title);
        index.push(entry);
    }
    sort_by_date(index);
}

// plain string order: only ISO dates sort chronologically
pub(crate) fn sort_by_date(index: &mut [BlogMetadata]) {
    index.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Loads the index at `path`, merges `entry` into it and writes it back.
pub(crate) fn update_index(
    store: &dyn IndexStore,
    path: &Path,
    entry: BlogMetadata,
) -> Result<Vec<BlogMetadata>, ConvertError> {
    let mut index = store.load(path);
    merge(&mut index, entry);
    store.save(path, &index)?;
    info!("Updated index file: {path:?}");
    Ok(index)
}

/// Writes through a temporary sibling file so readers never see a partial index.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), ConvertError> {
    let write_err = |source| ConvertError::Write {
        path: path.to_owned(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(write_err)?;
    }

    let tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        writer.write_all(contents).map_err(write_err)?;
        writer.flush().map_err(write_err)?;
    }
    // temp files are created owner-only; published files must stay world-readable
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .map_err(write_err)?;
    }
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    Ok(())
}
