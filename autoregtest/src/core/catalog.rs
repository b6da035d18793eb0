//! Known forks and systems.
//!
//! The catalog is plain immutable data: built once at startup (either the
//! built-in table or a TOML file, see `io::config`) and passed by reference
//! to the resolver.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Recipient used when neither the caller nor the system names one.
pub const DEFAULT_EMAIL_RECIPIENT: &str = "heinzell@ucar.edu";

/// A named upstream repository variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fork {
    /// Branches that may be tested from this fork.
    pub branches: Vec<String>,
    /// Clone URL.
    pub url: String,
}

/// A target machine with its toolchains and accounting defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct System {
    pub compilers: Vec<String>,
    pub default_compiler: String,
    pub default_project: String,
    /// Regression test config file per compiler.
    pub default_rtconfig: BTreeMap<String, String>,
    /// Overrides the catalog-wide default recipient on this system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Catalog {
    #[serde(default = "default_email")]
    pub default_email: String,
    pub forks: BTreeMap<String, Fork>,
    pub systems: BTreeMap<String, System>,
}

fn default_email() -> String {
    DEFAULT_EMAIL_RECIPIENT.to_string()
}

impl Catalog {
    /// The table shipped with the binary.
    pub fn builtin() -> Self {
        let forks = BTreeMap::from([
            (
                "dtc".to_string(),
                fork(&["dtc/develop"], "https://github.com/NCAR/ufs-weather-model"),
            ),
            (
                "emc".to_string(),
                fork(
                    &["develop"],
                    "https://github.com/ufs-community/ufs-weather-model",
                ),
            ),
            // Development fork.
            (
                "dom".to_string(),
                fork(
                    &["nems_machine_env_var"],
                    "https://github.com/climbfuji/ufs-weather-model",
                ),
            ),
        ]);

        let systems = BTreeMap::from([
            (
                "cheyenne".to_string(),
                system(
                    &[("intel", "rt.conf"), ("gnu", "rt_gnu.conf")],
                    "intel",
                    "P48503002",
                ),
            ),
            (
                "hera".to_string(),
                system(&[("intel", "rt.conf")], "intel", "gmtb"),
            ),
        ]);

        Self {
            default_email: default_email(),
            forks,
            systems,
        }
    }

    pub fn fork(&self, name: &str) -> Option<&Fork> {
        self.forks.get(name)
    }

    pub fn system(&self, name: &str) -> Option<&System> {
        self.systems.get(name)
    }

    /// Check internal consistency, so that resolution can only fail on the
    /// caller's selections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_email.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "default_email must not be empty".to_string(),
            ));
        }
        for (name, fork) in &self.forks {
            if fork.branches.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "fork '{name}' lists no branches"
                )));
            }
            if fork.url.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("fork '{name}' has no url")));
            }
        }
        for (name, system) in &self.systems {
            if !system.compilers.contains(&system.default_compiler) {
                return Err(ConfigError::Invalid(format!(
                    "system '{name}': default compiler '{}' is not in its compiler list",
                    system.default_compiler
                )));
            }
            if let Some(compiler) = system
                .compilers
                .iter()
                .find(|c| !system.default_rtconfig.contains_key(*c))
            {
                return Err(ConfigError::Invalid(format!(
                    "system '{name}': no default rtconfig for compiler '{compiler}'"
                )));
            }
        }
        Ok(())
    }
}

fn fork(branches: &[&str], url: &str) -> Fork {
    Fork {
        branches: branches.iter().map(|b| b.to_string()).collect(),
        url: url.to_string(),
    }
}

fn system(rtconfigs: &[(&str, &str)], default_compiler: &str, default_project: &str) -> System {
    System {
        compilers: rtconfigs.iter().map(|(c, _)| c.to_string()).collect(),
        default_compiler: default_compiler.to_string(),
        default_project: default_project.to_string(),
        default_rtconfig: rtconfigs
            .iter()
            .map(|(c, r)| (c.to_string(), r.to_string()))
            .collect(),
        email: None,
    }
}
