//! Package categories and their install locations.

use crate::core::UnhacsError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The kind of add-on a package is.
///
/// Categories are a closed set: each one maps to exactly one directory under
/// the Home Assistant configuration root, and adding a category means adding
/// an arm to [`PackageCategory::install_dir`].
///
/// Serialized in kebab-case:
///
/// ```rust,no_run
/// use unhacs_cli::core::PackageCategory;
///
/// let parsed: PackageCategory = "appdaemon-app".parse().unwrap();
/// assert_eq!(parsed, PackageCategory::AppdaemonApp);
/// assert_eq!(parsed.to_string(), "appdaemon-app");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackageCategory {
    /// Custom integration, installed under `custom_components/`
    Integration,
    /// Lovelace frontend plugin (cards, rows), installed under `www/community/`
    Plugin,
    /// Frontend theme
    Theme,
    /// AppDaemon application
    AppdaemonApp,
    /// NetDaemon application
    NetdaemonApp,
    /// `python_script` integration script
    PythonScript,
}

impl PackageCategory {
    /// Every supported category, in display order.
    pub const ALL: [Self; 6] = [
        Self::Integration,
        Self::Plugin,
        Self::Theme,
        Self::AppdaemonApp,
        Self::NetdaemonApp,
        Self::PythonScript,
    ];

    /// Directory, relative to the configuration root, that holds packages of
    /// this category.
    #[must_use]
    pub const fn install_dir(&self) -> &'static str {
        match self {
            Self::Integration => "custom_components",
            Self::Plugin => "www/community",
            Self::Theme => "themes",
            Self::AppdaemonApp => "appdaemon/apps",
            Self::NetdaemonApp => "netdaemon/apps",
            Self::PythonScript => "python_scripts",
        }
    }

    /// Destination directory of a package named `name` under `target_root`.
    #[must_use]
    pub fn destination(&self, target_root: &Path, name: &str) -> PathBuf {
        target_root.join(self.install_dir()).join(name)
    }

    /// Canonical kebab-case name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Integration => "integration",
            Self::Plugin => "plugin",
            Self::Theme => "theme",
            Self::AppdaemonApp => "appdaemon-app",
            Self::NetdaemonApp => "netdaemon-app",
            Self::PythonScript => "python-script",
        }
    }
}

impl std::fmt::Display for PackageCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PackageCategory {
    type Err = UnhacsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "integration" => Ok(Self::Integration),
            "plugin" => Ok(Self::Plugin),
            "theme" => Ok(Self::Theme),
            "appdaemon-app" | "appdaemon" => Ok(Self::AppdaemonApp),
            "netdaemon-app" | "netdaemon" => Ok(Self::NetdaemonApp),
            "python-script" => Ok(Self::PythonScript),
            _ => Err(UnhacsError::InvalidCategory {
                category: s.to_string(),
            }),
        }
    }
}
