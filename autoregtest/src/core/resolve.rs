//! Turn the caller's selections into validated run parameters.

use crate::core::catalog::Catalog;
use crate::error::ConfigError;

/// Raw selections as given on the command line.
///
/// Optional fields fall back to the selected system's defaults. Empty
/// strings count as "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub fork: String,
    pub branch: String,
    pub system: String,
    pub compiler: Option<String>,
    pub project: Option<String>,
    pub rtconfig: Option<String>,
    pub keep: bool,
    pub email: Option<String>,
}

/// Fully resolved parameters of one run. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunParams {
    pub fork: String,
    pub branch: String,
    /// Clone URL of `fork`.
    pub url: String,
    pub system: String,
    pub compiler: String,
    pub project: String,
    pub rtconfig: String,
    pub keep: bool,
    pub email: String,
}

/// Validate `selection` against `catalog` and apply defaults.
///
/// Order of checks: fork, branch, system, compiler, rtconfig. The project is
/// not validated; any accounting id the caller passes is used as-is.
pub fn resolve(catalog: &Catalog, selection: &Selection) -> Result<RunParams, ConfigError> {
    let fork = catalog
        .fork(&selection.fork)
        .ok_or_else(|| ConfigError::UnknownFork(selection.fork.clone()))?;
    if !fork.branches.contains(&selection.branch) {
        return Err(ConfigError::UnknownBranch {
            fork: selection.fork.clone(),
            branch: selection.branch.clone(),
        });
    }

    let system = catalog
        .system(&selection.system)
        .ok_or_else(|| ConfigError::UnknownSystem(selection.system.clone()))?;

    let compiler = given(&selection.compiler).unwrap_or(&system.default_compiler);
    if !system.compilers.iter().any(|c| c == compiler) {
        return Err(ConfigError::UnknownCompiler {
            system: selection.system.clone(),
            compiler: compiler.to_string(),
        });
    }

    let project = given(&selection.project).unwrap_or(&system.default_project);

    let rtconfig = match given(&selection.rtconfig) {
        Some(rtconfig) => rtconfig,
        None => system
            .default_rtconfig
            .get(compiler)
            .map(String::as_str)
            .ok_or_else(|| ConfigError::MissingRtConfig {
                system: selection.system.clone(),
                compiler: compiler.to_string(),
            })?,
    };

    let email = given(&selection.email)
        .or(system.email.as_deref())
        .unwrap_or(&catalog.default_email);

    Ok(RunParams {
        fork: selection.fork.clone(),
        branch: selection.branch.clone(),
        url: fork.url.clone(),
        system: selection.system.clone(),
        compiler: compiler.to_string(),
        project: project.to_string(),
        rtconfig: rtconfig.to_string(),
        keep: selection.keep,
        email: email.to_string(),
    })
}

fn given(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::DEFAULT_EMAIL_RECIPIENT;

    fn select(fork: &str, branch: &str, system: &str) -> Selection {
        Selection {
            fork: fork.to_string(),
            branch: branch.to_string(),
            system: system.to_string(),
            ..Selection::default()
        }
    }

    #[test]
    fn hera_defaults_apply() {
        let params = resolve(&Catalog::builtin(), &select("emc", "develop", "hera")).expect("ok");
        assert_eq!(params.compiler, "intel");
        assert_eq!(params.project, "gmtb");
        assert_eq!(params.rtconfig, "rt.conf");
        assert_eq!(params.url, "https://github.com/ufs-community/ufs-weather-model");
        assert_eq!(params.email, DEFAULT_EMAIL_RECIPIENT);
        assert!(!params.keep);
    }

    #[test]
    fn rtconfig_follows_selected_compiler() {
        let mut selection = select("dtc", "dtc/develop", "cheyenne");
        selection.compiler = Some("gnu".to_string());
        let params = resolve(&Catalog::builtin(), &selection).expect("ok");
        assert_eq!(params.compiler, "gnu");
        assert_eq!(params.rtconfig, "rt_gnu.conf");
        assert_eq!(params.project, "P48503002");
    }

    #[test]
    fn explicit_values_override_defaults() {
        let mut selection = select("emc", "develop", "cheyenne");
        selection.project = Some("P00000000".to_string());
        selection.rtconfig = Some("rt_short.conf".to_string());
        selection.email = Some("someone@example.org".to_string());
        selection.keep = true;
        let params = resolve(&Catalog::builtin(), &selection).expect("ok");
        assert_eq!(params.project, "P00000000");
        assert_eq!(params.rtconfig, "rt_short.conf");
        assert_eq!(params.email, "someone@example.org");
        assert!(params.keep);
    }

    #[test]
    fn empty_overrides_count_as_missing() {
        let mut selection = select("emc", "develop", "hera");
        selection.compiler = Some(String::new());
        selection.email = Some(String::new());
        let params = resolve(&Catalog::builtin(), &selection).expect("ok");
        assert_eq!(params.compiler, "intel");
        assert_eq!(params.email, DEFAULT_EMAIL_RECIPIENT);
    }

    #[test]
    fn system_email_beats_catalog_default() {
        let mut catalog = Catalog::builtin();
        catalog.systems.get_mut("hera").expect("hera").email = Some("hera@example.org".to_string());
        let params = resolve(&catalog, &select("emc", "develop", "hera")).expect("ok");
        assert_eq!(params.email, "hera@example.org");
    }

    #[test]
    fn unknown_fork_is_rejected() {
        let err =
            resolve(&Catalog::builtin(), &select("nope", "develop", "hera")).expect_err("fail");
        assert!(matches!(err, ConfigError::UnknownFork(ref f) if f == "nope"));
    }

    #[test]
    fn branch_of_other_fork_is_rejected() {
        let err =
            resolve(&Catalog::builtin(), &select("emc", "dtc/develop", "hera")).expect_err("fail");
        assert!(matches!(err, ConfigError::UnknownBranch { .. }));
        assert_eq!(err.to_string(), "invalid branch 'dtc/develop' of fork 'emc'");
    }

    #[test]
    fn every_unlisted_fork_branch_pair_is_rejected() {
        let catalog = Catalog::builtin();
        let branches = ["develop", "dtc/develop", "nems_machine_env_var", "main", ""];
        for fork in ["dtc", "emc", "dom", "ncar", ""] {
            for branch in branches {
                let listed = catalog
                    .fork(fork)
                    .is_some_and(|f| f.branches.iter().any(|b| b == branch));
                let result = resolve(&catalog, &select(fork, branch, "hera"));
                assert_eq!(result.is_ok(), listed, "fork={fork} branch={branch}");
            }
        }
    }

    #[test]
    fn unknown_system_is_rejected() {
        let err =
            resolve(&Catalog::builtin(), &select("emc", "develop", "orion")).expect_err("fail");
        assert!(matches!(err, ConfigError::UnknownSystem(ref s) if s == "orion"));
    }

    #[test]
    fn compiler_not_available_on_system_is_rejected() {
        let mut selection = select("emc", "develop", "hera");
        selection.compiler = Some("gnu".to_string());
        let err = resolve(&Catalog::builtin(), &selection).expect_err("fail");
        assert_eq!(err.to_string(), "invalid compiler 'gnu' for system 'hera'");
    }

    #[test]
    fn missing_rtconfig_for_compiler_is_rejected() {
        let mut catalog = Catalog::builtin();
        catalog
            .systems
            .get_mut("hera")
            .expect("hera")
            .default_rtconfig
            .clear();
        let err = resolve(&catalog, &select("emc", "develop", "hera")).expect_err("fail");
        assert!(matches!(err, ConfigError::MissingRtConfig { .. }));
    }
}
