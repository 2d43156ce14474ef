//! Page resources
//!
//! The page `.ui` definitions are compiled into the binary. A configured
//! override directory replaces individual pages by file name, which allows
//! a distribution to restyle or drop pages without rebuilding.

use shellprefs_common::error::ResourceLoadError;
use shellprefs_common::paths::{self, RESOURCE_PREFIX};
use std::borrow::Cow;
use std::path::PathBuf;
use tracing::debug;

const EMBEDDED: &[(&str, &str)] = &[
    ("general.ui", include_str!("../resources/pages/general.ui")),
    ("appearance.ui", include_str!("../resources/pages/appearance.ui")),
    ("keyboard.ui", include_str!("../resources/pages/keyboard.ui")),
    ("network.ui", include_str!("../resources/pages/network.ui")),
    ("about.ui", include_str!("../resources/pages/about.ui")),
];

/// Resolves page resource paths to UI definition text
#[derive(Debug, Default, Clone)]
pub struct PageResources {
    overrides: Option<PathBuf>,
}

impl PageResources {
    pub fn new(overrides: Option<PathBuf>) -> Self {
        Self { overrides }
    }

    /// Definition text for `path` (`/io/github/tduarte/Settings/pages/<file>`)
    pub fn source(&self, path: &str) -> Result<Cow<'static, str>, ResourceLoadError> {
        if !path.starts_with(RESOURCE_PREFIX) {
            return Err(ResourceLoadError::NotFound(path.to_string()));
        }
        let file_name = paths::resource_file_name(path);

        if let Some(dir) = &self.overrides {
            let candidate = dir.join(file_name);
            if candidate.is_file() {
                debug!("Loading {} from {:?}", file_name, candidate);
                return std::fs::read_to_string(&candidate)
                    .map(Cow::Owned)
                    .map_err(|e| ResourceLoadError::Malformed {
                        path: candidate.display().to_string(),
                        reason: e.to_string(),
                    });
            }
        }

        EMBEDDED
            .iter()
            .find(|(name, _)| *name == file_name)
            .map(|(_, source)| Cow::Borrowed(*source))
            .ok_or_else(|| ResourceLoadError::NotFound(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_pages_have_root() {
        let resources = PageResources::default();
        for name in ["general", "appearance", "keyboard", "network", "about"] {
            let source = resources.source(&paths::page_resource(name)).unwrap();
            assert!(source.contains(r#"id="root""#), "{} has no root", name);
        }
    }

    #[test]
    fn test_embedded_pages_expose_bound_controls() {
        let resources = PageResources::default();
        let general = resources.source(&paths::page_resource("general")).unwrap();
        assert!(general.contains(r#"id="launch_row""#));
        assert!(general.contains(r#"id="notif_row""#));

        let appearance = resources.source(&paths::page_resource("appearance")).unwrap();
        assert!(appearance.contains(r#"id="color_combo""#));

        let network = resources.source(&paths::page_resource("network")).unwrap();
        assert!(network.contains(r#"id="network_row""#));
    }

    #[test]
    fn test_unknown_page_not_found() {
        let resources = PageResources::default();
        assert_eq!(
            resources.source(&paths::page_resource("bluetooth")),
            Err(ResourceLoadError::NotFound(paths::page_resource("bluetooth")))
        );
        assert!(resources.source("/org/example/general.ui").is_err());
    }

    #[test]
    fn test_override_directory_replaces_by_file_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("about.ui"), "<interface/>").unwrap();

        let resources = PageResources::new(Some(dir.path().to_path_buf()));
        let about = resources.source(&paths::page_resource("about")).unwrap();
        assert_eq!(about, "<interface/>");

        let general = resources.source(&paths::page_resource("general")).unwrap();
        assert!(general.contains("launch_row"));
    }
}
