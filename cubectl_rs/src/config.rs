//! Configuration file support for cubectl.
//!
//! Loads `<config_dir>/cubectl/config.yaml` (or the file named by
//! `CUBECTL_CONFIG`), then applies `CUBECTL_*` environment overrides. A
//! missing file is created with defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::request::{LowerConfig, Method, SetMethodPolicy};
use crate::transport::TlsFiles;
use crate::types::ColorMode;

pub const CONFIG_ENV: &str = "CUBECTL_CONFIG";

const CONFIG_FILE: &str = "config.yaml";
const HISTORY_FILE: &str = "history.log";
const DEFAULT_URL: &str = "http://localhost:9000/polycube/v1/";

const CONFIG_HEADER: &str = "\
# debug: print request details and the response status line
# expert: list expert-only commands (services) in help
# url: base url of the daemon REST API
# single_parameter_workaround: send `set` with one field as <path>/<field>/ and a bare value
# cacert: CA certificate used to verify the daemon
# cert: client certificate presented to the daemon
# key: private key of the client certificate
# api_version: daemon API version; \"1\" makes `set` use PUT instead of PATCH
# api_versions: per-resource API version, keyed by the first path segment
# log_commands: append every command and its output to history.log
# color: auto | always | never

";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub debug: bool,
    pub expert: bool,
    pub url: String,
    pub single_parameter_workaround: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cacert: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub api_versions: BTreeMap<String, String>,
    pub log_commands: bool,
    pub color: ColorMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            expert: true,
            url: DEFAULT_URL.to_string(),
            single_parameter_workaround: true,
            cacert: None,
            cert: None,
            key: None,
            api_version: None,
            api_versions: BTreeMap::new(),
            log_commands: true,
            color: ColorMode::Auto,
        }
    }
}

/// A loaded configuration plus the notes gathered while loading it.
///
/// Warnings are returned instead of logged because logging is configured
/// from the loaded `debug` flag.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub path: Option<PathBuf>,
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// `history.log` next to the config file.
    pub fn history_path(&self) -> Option<PathBuf> {
        self.path.as_ref().map(|path| path.with_file_name(HISTORY_FILE))
    }
}

/// Boolean grammar shared by the env overrides and body field coercion.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cubectl").join(CONFIG_FILE))
}

/// `CUBECTL_CONFIG` if set and non-empty, else the platform default.
pub fn config_path<F>(lookup: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(CONFIG_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(default_config_path)
}

impl Config {
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).context("failed to parse config")
    }

    /// Read `path`, or write a default file there when it does not exist.
    pub fn load(path: &Path, warnings: &mut Vec<String>) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            if let Err(err) = config.save(path) {
                warnings.push(format!("could not write default config: {:#}", err));
            }
            return Ok(config);
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Write this config with the commented header.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            create_private_dir(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        let body = serde_yaml::to_string(self).context("failed to serialize config")?;
        fs::write(path, format!("{}{}", CONFIG_HEADER, body))
            .with_context(|| format!("failed to write {}", path.display()))
    }

    /// Apply `CUBECTL_*` overrides. Empty values are ignored, and so are
    /// booleans that do not parse.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());

        if let Some(url) = get("CUBECTL_URL") {
            self.url = url;
        }
        if let Some(debug) = get("CUBECTL_DEBUG").as_deref().and_then(parse_bool) {
            self.debug = debug;
        }
        if let Some(expert) = get("CUBECTL_EXPERT").as_deref().and_then(parse_bool) {
            self.expert = expert;
        }
        if let Some(cacert) = get("CUBECTL_CACERT") {
            self.cacert = Some(PathBuf::from(cacert));
        }
        if let Some(cert) = get("CUBECTL_CERT") {
            self.cert = Some(PathBuf::from(cert));
        }
        if let Some(key) = get("CUBECTL_KEY") {
            self.key = Some(PathBuf::from(key));
        }
    }

    /// Check the TLS settings. Returns warnings for material that would be
    /// ignored over plain http.
    pub fn validate(&self) -> Result<Vec<String>> {
        let mut warnings = Vec::new();

        if self.url.starts_with("https") {
            if self.cacert.is_none() {
                bail!("https is used but there is no CA cert defined");
            }
        } else {
            for (name, value) in [("cacert", &self.cacert), ("cert", &self.cert), ("key", &self.key)] {
                if value.is_some() {
                    warnings.push(format!("{} defined but using http", name));
                }
            }
        }

        match (&self.cert, &self.key) {
            (Some(_), None) => bail!("cert is defined but key is not"),
            (None, Some(_)) => bail!("key is defined but cert is not"),
            _ => {}
        }

        Ok(warnings)
    }

    /// The base URL with exactly one trailing `/`.
    pub fn base_url(&self) -> String {
        format!("{}/", self.url.trim_end_matches('/'))
    }

    pub fn tls_files(&self) -> TlsFiles<'_> {
        TlsFiles {
            cacert: self.cacert.as_deref(),
            cert: self.cert.as_deref(),
            key: self.key.as_deref(),
        }
    }

    pub fn lower_config(&self) -> LowerConfig<'_> {
        LowerConfig {
            base_url: &self.url,
            single_parameter_workaround: self.single_parameter_workaround,
            policy: self,
        }
    }
}

/// Per-resource version first, then the global one. Version `1` daemons take
/// `PUT`; everything newer takes `PATCH`.
impl SetMethodPolicy for Config {
    fn set_method(&self, resource: Option<&str>) -> Method {
        let version = resource
            .and_then(|name| self.api_versions.get(name))
            .or(self.api_version.as_ref());
        match version.map(String::as_str) {
            Some("1") => Method::Put,
            _ => Method::Patch,
        }
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)
}

/// Resolve the config path, load the file, apply env overrides and validate.
pub fn load_config<F>(lookup: F) -> Result<LoadedConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let path = config_path(&lookup);
    let mut warnings = Vec::new();

    let mut config = match &path {
        Some(path) => Config::load(path, &mut warnings)?,
        None => Config::default(),
    };
    config.apply_env(&lookup);
    warnings.extend(config.validate()?);

    Ok(LoadedConfig {
        config,
        path,
        warnings,
    })
}
