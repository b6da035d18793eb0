//! Catalog loading.
//!
//! Without a path the built-in catalog is used. A TOML catalog replaces it
//! entirely:
//!
//! ```toml
//! default_email = "team@example.org"
//!
//! [forks.emc]
//! branches = ["develop"]
//! url = "https://github.com/ufs-community/ufs-weather-model"
//!
//! [systems.hera]
//! compilers = ["intel"]
//! default_compiler = "intel"
//! default_project = "gmtb"
//! default_rtconfig = { intel = "rt.conf" }
//! email = "hera-watch@example.org"
//! ```

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::core::catalog::Catalog;
use crate::error::ConfigError;

/// Load and validate the catalog from `path`, or the built-in one.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog, ConfigError> {
    let Some(path) = path else {
        debug!("using built-in catalog");
        let catalog = Catalog::builtin();
        catalog.validate()?;
        return Ok(catalog);
    };
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let catalog = parse_catalog(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    catalog.validate()?;
    info!(
        path = %path.display(),
        forks = catalog.forks.len(),
        systems = catalog.systems.len(),
        "loaded catalog"
    );
    Ok(catalog)
}

fn parse_catalog(contents: &str) -> Result<Catalog, toml::de::Error> {
    toml::from_str(contents)
}
