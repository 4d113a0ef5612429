use std::io::Read;
use std::path::Path;

use crate::{Error, Result, SandboxConfig};

const DEFAULT_MAX_CONFIG_BYTES: u64 = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// `.json` is JSON; `.toml` or no extension is TOML.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") | None => Ok(Self::Toml),
            Some(other) => Err(Error::InvalidConfig(format!(
                "unsupported config format {other:?}; expected .toml or .json"
            ))),
        }
    }
}

pub fn parse_config(raw: &str, format: ConfigFormat) -> Result<SandboxConfig> {
    match format {
        ConfigFormat::Json => serde_json::from_str(raw)
            .map_err(|err| Error::InvalidConfig(format!("invalid json config: {err}"))),
        ConfigFormat::Toml => toml::from_str(raw)
            .map_err(|err| Error::InvalidConfig(format!("invalid toml config: {err}"))),
    }
}

/// Reads a config file without validating it; roots may still come from the command line.
pub fn load_config(path: impl AsRef<Path>) -> Result<SandboxConfig> {
    load_config_limited(path, DEFAULT_MAX_CONFIG_BYTES)
}

pub fn load_config_limited(path: impl AsRef<Path>, max_bytes: u64) -> Result<SandboxConfig> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)?;
    let meta = std::fs::metadata(path).map_err(|err| Error::io_path("metadata", path, err))?;
    if !meta.is_file() {
        return Err(Error::InvalidConfig(format!(
            "config path {} is not a regular file",
            path.display()
        )));
    }

    let mut bytes = Vec::<u8>::new();
    std::fs::File::open(path)
        .map_err(|err| Error::io_path("open", path, err))?
        .take(max_bytes.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(|err| Error::io_path("read", path, err))?;
    if bytes.len() as u64 > max_bytes {
        return Err(Error::FileTooLarge {
            path: path.to_path_buf(),
            size_bytes: bytes.len() as u64,
            max_bytes,
        });
    }

    let raw = std::str::from_utf8(&bytes).map_err(|_| Error::InvalidUtf8(path.to_path_buf()))?;
    parse_config(raw, format)
}
