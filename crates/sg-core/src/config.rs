//! Gate configuration
//!
//! Loaded once at startup from TOML. Anything not present in the file falls
//! back to the stock lab deployment below.

use crate::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use url::Url;

/// One whitelisted scan target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetEntry {
    pub id: String,
    pub url: String,
}

impl TargetEntry {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateConfig {
    /// Scanner invocation name, resolved through PATH
    pub tool: String,
    /// Wall-clock bound for one scan (seconds)
    pub timeout_secs: u64,
    /// Authorized targets, in the order `/targets` lists them
    pub targets: Vec<TargetEntry>,
    /// Substrings that may not appear in any user flag (case-insensitive)
    pub forbidden_flags: Vec<String>,
}

const DEFAULT_TARGETS: &[&str] = &[
    "http://testphp.vulnweb.com/listproducts.php?cat=1",
    "http://testphp.vulnweb.com/artists.php?artist=1",
];

pub const DEFAULT_FORBIDDEN_FLAGS: &[&str] = &[
    "--os-shell",
    "--os-pwn",
    "--os-smb",
    "--os-bof",
    "--priv-esc",
    "--reg-read",
    "--reg-add",
    "--reg-del",
    "--file-write",
    "--file-read",
    "--file-dest",
    "--sql-shell",
    "--eval",
    "--smart",
    "--wizard",
    "--dns-domain",
    "--eta",
];

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            tool: sg_tools::sqlmap::SQLMAP.to_string(),
            timeout_secs: 60,
            // The demo deployment uses each URL as its own identifier
            targets: DEFAULT_TARGETS
                .iter()
                .map(|url| TargetEntry::new(*url, *url))
                .collect(),
            forbidden_flags: DEFAULT_FORBIDDEN_FLAGS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl GateConfig {
    /// Load and validate a TOML file
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        tracing::info!(
            "Loaded gate config from {} ({} targets, {} forbidden flags)",
            path.display(),
            config.targets.len(),
            config.forbidden_flags.len()
        );
        Ok(config)
    }

    pub fn from_toml(content: &str) -> CoreResult<Self> {
        let config: GateConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.tool.trim().is_empty() {
            return Err(CoreError::Config("tool must not be empty".to_string()));
        }

        if self.timeout_secs == 0 {
            return Err(CoreError::Config("timeout_secs must be greater than zero".to_string()));
        }

        if self.targets.is_empty() {
            return Err(CoreError::Config("at least one target is required".to_string()));
        }

        let mut seen = HashSet::new();
        for target in &self.targets {
            if target.id.is_empty() {
                return Err(CoreError::Config("target id must not be empty".to_string()));
            }
            if !seen.insert(target.id.as_str()) {
                return Err(CoreError::Config(format!("duplicate target id '{}'", target.id)));
            }

            let url = Url::parse(&target.url).map_err(|e| {
                CoreError::Config(format!("target '{}' has an invalid url: {}", target.id, e))
            })?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(CoreError::Config(format!(
                    "target '{}' must use http or https, got {}",
                    target.id,
                    url.scheme()
                )));
            }
        }

        if self.forbidden_flags.iter().any(|f| f.trim().is_empty()) {
            return Err(CoreError::Config("forbidden flag entries must not be empty".to_string()));
        }

        Ok(())
    }
}
