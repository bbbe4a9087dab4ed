use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::IdentityError;

/// Per-tenant alias set, normalized for comparisons.
///
/// Read-only input to classification; the resolver never mutates it.
#[derive(Debug, Clone)]
pub struct AliasConfig {
    site_id: String,
    aliases: HashSet<String>,
}

impl AliasConfig {
    /// Addresses are lower-cased and trimmed on construction so
    /// membership checks compare normalized forms only.
    pub fn new<I, S>(site_id: impl Into<String>, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            site_id: site_id.into(),
            aliases: aliases
                .into_iter()
                .map(|a| a.as_ref().trim().to_lowercase())
                .collect(),
        }
    }

    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    pub fn is_alias(&self, address: &str) -> bool {
        self.aliases.contains(&address.trim().to_lowercase())
    }
}

/// On-disk configuration: tenant settings keyed by site id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default)]
    pub tenants: HashMap<String, TenantConfig>,
}

/// Tenant configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantConfig {
    /// Display name for the tenant
    pub name: Option<String>,

    /// Shared mailbox addresses (catch-all and team inboxes)
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl IdentityConfig {
    /// Normalized alias set for one tenant, `None` if unknown.
    pub fn alias_config(&self, site_id: &str) -> Option<AliasConfig> {
        self.tenants
            .get(site_id)
            .map(|t| AliasConfig::new(site_id, &t.aliases))
    }

    /// Load configuration from a specific path.
    pub fn from_path(path: &Path) -> Result<Self, IdentityError> {
        info!("Loading configuration from: {:?}", path);

        let content = fs::read_to_string(path)
            .map_err(|e| IdentityError::Config(format!("Failed to read config: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| IdentityError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load configuration from the first default path that exists,
    /// falling back to an empty config.
    pub fn load() -> Result<Self, IdentityError> {
        for path in default_config_paths() {
            if path.exists() {
                info!("Found config at: {:?}", path);
                return Self::from_path(&path);
            }
        }

        info!("No config file found, using empty config");
        Ok(Self::default())
    }
}

/// Get default config paths
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // XDG config path
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("mail-identity").join("config.toml"));
    }

    // Home directory fallback
    if let Some(home_dir) = dirs::home_dir() {
        paths.push(
            home_dir
                .join(".config")
                .join("mail-identity")
                .join("config.toml"),
        );
    }

    paths
}
