//! Runtime configuration for talking to a Zotero library.
//!
//! Values come from `ZB_*` environment variables. Parsing goes through a
//! lookup function so tests never touch the process environment.

use std::env;
use std::path::{Path, PathBuf};

use crate::util::{normalize_base_url, normalize_text_option};
use crate::{Error, Result};

pub const ENV_LIBRARY_PREFIX: &str = "ZB_SEARCH_PREFIX_URI";
pub const ENV_API_KEY: &str = "ZB_API_KEY";
pub const ENV_SEARCH_TAG: &str = "ZB_SEARCH_TAG";
pub const ENV_MIRROR_FILE: &str = "ZB_FILE";
pub const ENV_VERSION_FILE: &str = "ZB_VERSION_FILE";
pub const ENV_API_BASE_URL: &str = "ZB_API_BASE_URL";
pub const ENV_LIBRARY_URL: &str = "ZB_LIBRARY_URL";

pub const DEFAULT_API_BASE_URL: &str = "https://api.zotero.org";
pub const DEFAULT_WEB_BASE_URL: &str = "https://www.zotero.org";

/// Zotero connection and file settings.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ZoteroConfig {
    /// Library path such as `groups/2480461` or `users/12345`.
    pub library_prefix: Option<String>,
    /// Bearer credential for the web API.
    pub api_key: Option<String>,
    /// Only list items carrying this tag.
    pub search_tag: Option<String>,
    /// Mirror file holding the fetched item collection.
    pub mirror_file: Option<PathBuf>,
    /// Watermark file holding the last synchronized library version.
    pub version_file: Option<PathBuf>,
    /// API root, `https://api.zotero.org` unless overridden.
    pub api_base_url: Option<String>,
    /// Web base used for report deep links.
    pub library_url: Option<String>,
}

impl std::fmt::Debug for ZoteroConfig {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ZoteroConfig")
            .field("library_prefix", &self.library_prefix)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("search_tag", &self.search_tag)
            .field("mirror_file", &self.mirror_file)
            .field("version_file", &self.version_file)
            .field("api_base_url", &self.api_base_url)
            .field("library_url", &self.library_url)
            .finish()
    }
}

impl ZoteroConfig {
    /// Load configuration from `ZB_*` environment variables.
    pub fn from_env() -> Result<Self> {
        parse_config(|key| env::var(key).ok())
    }

    /// Library prefix required for any remote request.
    pub fn require_library_prefix(&self) -> Result<&str> {
        self.library_prefix.as_deref().ok_or_else(|| {
            Error::Configuration(format!(
                "{ENV_LIBRARY_PREFIX} is not set (expected e.g. groups/2480461)"
            ))
        })
    }

    /// API root without trailing slash.
    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL)
    }

    /// Web base for deep links into the library.
    ///
    /// Prefers `ZB_LIBRARY_URL`; otherwise derives it from the library prefix.
    pub fn library_web_url(&self) -> Result<String> {
        if let Some(url) = &self.library_url {
            return Ok(url.clone());
        }
        let prefix = self.library_prefix.as_deref().ok_or_else(|| {
            Error::Configuration(format!(
                "Set {ENV_LIBRARY_URL} or {ENV_LIBRARY_PREFIX} to build item links"
            ))
        })?;
        Ok(format!("{DEFAULT_WEB_BASE_URL}/{prefix}"))
    }

    /// Mirror file path, with an explicit override taking precedence.
    pub fn resolve_mirror_file(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.mirror_file.clone())
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "No mirror file given; pass a path or set {ENV_MIRROR_FILE}"
                ))
            })
    }

    /// Watermark file path: explicit override, then `ZB_VERSION_FILE`, then
    /// `<mirror file>.version`.
    pub fn resolve_version_file(&self, explicit: Option<&Path>, mirror_file: &Path) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.version_file.clone())
            .unwrap_or_else(|| default_version_file(mirror_file))
    }
}

/// Derive the default watermark path next to the mirror file.
pub fn default_version_file(mirror_file: &Path) -> PathBuf {
    let mut name = mirror_file.as_os_str().to_os_string();
    name.push(".version");
    PathBuf::from(name)
}

pub(crate) fn parse_config(lookup: impl Fn(&str) -> Option<String>) -> Result<ZoteroConfig> {
    let library_prefix = normalize_text_option(lookup(ENV_LIBRARY_PREFIX))
        .map(normalize_library_prefix)
        .transpose()?;
    let api_base_url = normalize_text_option(lookup(ENV_API_BASE_URL))
        .map(|value| normalize_http_url(value, ENV_API_BASE_URL))
        .transpose()?;
    let library_url = normalize_text_option(lookup(ENV_LIBRARY_URL))
        .map(|value| normalize_http_url(value, ENV_LIBRARY_URL))
        .transpose()?;

    Ok(ZoteroConfig {
        library_prefix,
        api_key: normalize_text_option(lookup(ENV_API_KEY)),
        search_tag: normalize_text_option(lookup(ENV_SEARCH_TAG)),
        mirror_file: normalize_text_option(lookup(ENV_MIRROR_FILE)).map(PathBuf::from),
        version_file: normalize_text_option(lookup(ENV_VERSION_FILE)).map(PathBuf::from),
        api_base_url,
        library_url,
    })
}

fn normalize_library_prefix(raw: String) -> Result<String> {
    let prefix = raw.trim_matches('/');
    let valid = prefix
        .split_once('/')
        .is_some_and(|(scope, id)| {
            matches!(scope, "groups" | "users")
                && !id.is_empty()
                && id.chars().all(|ch| ch.is_ascii_digit())
        });
    if valid {
        Ok(prefix.to_string())
    } else {
        Err(Error::Configuration(format!(
            "{ENV_LIBRARY_PREFIX} must look like groups/<id> or users/<id>, got '{prefix}'"
        )))
    }
}

fn normalize_http_url(raw: String, field: &str) -> Result<String> {
    normalize_base_url(&raw).ok_or_else(|| {
        Error::Configuration(format!(
            "{field} must be an http:// or https:// URL, got '{raw}'"
        ))
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn parse_from_map(map: &HashMap<&str, &str>) -> Result<ZoteroConfig> {
        parse_config(|key| map.get(key).map(|value| (*value).to_string()))
    }

    #[test]
    fn parse_config_empty_env_is_valid() {
        let config = parse_from_map(&HashMap::new()).unwrap();
        assert_eq!(config, ZoteroConfig::default());
        assert_eq!(config.api_base_url(), DEFAULT_API_BASE_URL);
    }

    #[test]
    fn missing_library_prefix_is_a_configuration_error() {
        let config = parse_from_map(&HashMap::new()).unwrap();
        let error = config.require_library_prefix().unwrap_err();
        assert!(matches!(error, Error::Configuration(_)));
        assert!(error.to_string().contains(ENV_LIBRARY_PREFIX));
    }

    #[test]
    fn library_prefix_is_trimmed_and_validated() {
        let mut map = HashMap::new();
        map.insert(ENV_LIBRARY_PREFIX, " /groups/2480461/ ");
        let config = parse_from_map(&map).unwrap();
        assert_eq!(config.require_library_prefix().unwrap(), "groups/2480461");

        map.insert(ENV_LIBRARY_PREFIX, "teams/abc");
        assert!(parse_from_map(&map).is_err());
    }

    #[test]
    fn api_base_url_requires_http_scheme() {
        let mut map = HashMap::new();
        map.insert(ENV_API_BASE_URL, "api.zotero.org");
        assert!(parse_from_map(&map).is_err());

        map.insert(ENV_API_BASE_URL, "http://localhost:8080/");
        let config = parse_from_map(&map).unwrap();
        assert_eq!(config.api_base_url(), "http://localhost:8080");
    }

    #[test]
    fn library_web_url_prefers_explicit_value() {
        let mut map = HashMap::new();
        map.insert(ENV_LIBRARY_PREFIX, "groups/2480461");
        let config = parse_from_map(&map).unwrap();
        assert_eq!(
            config.library_web_url().unwrap(),
            "https://www.zotero.org/groups/2480461"
        );

        map.insert(
            ENV_LIBRARY_URL,
            "https://www.zotero.org/groups/2480461/ag-gipp/",
        );
        let config = parse_from_map(&map).unwrap();
        assert_eq!(
            config.library_web_url().unwrap(),
            "https://www.zotero.org/groups/2480461/ag-gipp"
        );
    }

    #[test]
    fn version_file_defaults_next_to_mirror() {
        let config = ZoteroConfig::default();
        let resolved = config.resolve_version_file(None, Path::new("data/bib.json"));
        assert_eq!(resolved, PathBuf::from("data/bib.json.version"));

        let config = ZoteroConfig {
            version_file: Some(PathBuf::from("state/version.txt")),
            ..Default::default()
        };
        let resolved = config.resolve_version_file(None, Path::new("data/bib.json"));
        assert_eq!(resolved, PathBuf::from("state/version.txt"));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = ZoteroConfig {
            api_key: Some("secret".to_string()),
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
