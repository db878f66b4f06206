//! Component kinds and their capability descriptors
//!
//! Every kind is handled by the same generic engine; what differs between
//! kinds is captured in a [`KindSpec`]: where generated sources go, which
//! runtime configuration field lists them, whether a feature flag follows the
//! list, and whether the kind supports mounting or per-project enabling.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Plugin,
    AddOn,
    Decorator,
    Layout,
    Router,
    Seed,
    Visualizer,
}

/// Where a kind's registered paths end up in the runtime configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigTarget {
    /// A list of directories, e.g. `plugin.basePaths`
    PathList(&'static str),
    /// The `rest.components` router table keyed by component name
    RestComponents,
}

/// Capability descriptor for one component kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindSpec {
    pub kind: ComponentKind,
    /// Directory (relative to the project root) new components are generated into
    pub source_dir: &'static str,
    /// Directory test stubs are generated into, for kinds that have them
    pub test_dir: Option<&'static str>,
    pub config: ConfigTarget,
    /// Flag that is `true` iff the kind has at least one registered path
    pub enable_flag: Option<&'static str>,
    /// Whether components carry a mount point (routers)
    pub mountable: bool,
    /// Root-node registry entry toggled by `enable`/`disable`
    pub registry_key: Option<&'static str>,
}

impl KindSpec {
    pub fn is_enableable(&self) -> bool {
        self.registry_key.is_some()
    }

    /// Path-list field in the runtime configuration, if the kind has one
    pub fn path_list_field(&self) -> Option<&'static str> {
        match self.config {
            ConfigTarget::PathList(field) => Some(field),
            ConfigTarget::RestComponents => None,
        }
    }
}

static KIND_SPECS: [KindSpec; 7] = [
    KindSpec {
        kind: ComponentKind::Plugin,
        source_dir: "src/plugins",
        test_dir: Some("test/plugins"),
        config: ConfigTarget::PathList("plugin.basePaths"),
        enable_flag: None,
        mountable: false,
        registry_key: Some("validPlugins"),
    },
    KindSpec {
        kind: ComponentKind::AddOn,
        source_dir: "src/addOns",
        test_dir: None,
        config: ConfigTarget::PathList("addOn.basePaths"),
        enable_flag: Some("addOn.enable"),
        mountable: false,
        registry_key: Some("usedAddOns"),
    },
    KindSpec {
        kind: ComponentKind::Decorator,
        source_dir: "src/decorators",
        test_dir: None,
        config: ConfigTarget::PathList("visualization.decoratorPaths"),
        enable_flag: None,
        mountable: false,
        registry_key: None,
    },
    KindSpec {
        kind: ComponentKind::Layout,
        source_dir: "src/layouts",
        test_dir: None,
        config: ConfigTarget::PathList("visualization.layout.basePaths"),
        enable_flag: None,
        mountable: false,
        registry_key: None,
    },
    KindSpec {
        kind: ComponentKind::Router,
        source_dir: "src/routers",
        test_dir: None,
        config: ConfigTarget::RestComponents,
        enable_flag: None,
        mountable: true,
        registry_key: None,
    },
    KindSpec {
        kind: ComponentKind::Seed,
        source_dir: "src/seeds",
        test_dir: None,
        config: ConfigTarget::PathList("seedProjects.basePaths"),
        enable_flag: Some("seedProjects.enable"),
        mountable: false,
        registry_key: None,
    },
    KindSpec {
        kind: ComponentKind::Visualizer,
        source_dir: "src/visualizers/panels",
        test_dir: None,
        config: ConfigTarget::PathList("visualization.panelPaths"),
        enable_flag: None,
        mountable: false,
        registry_key: None,
    },
];

impl ComponentKind {
    pub const ALL: [ComponentKind; 7] = [
        ComponentKind::Plugin,
        ComponentKind::AddOn,
        ComponentKind::Decorator,
        ComponentKind::Layout,
        ComponentKind::Router,
        ComponentKind::Seed,
        ComponentKind::Visualizer,
    ];

    /// Key used for this kind in both manifest mappings
    pub fn manifest_key(self) -> &'static str {
        match self {
            ComponentKind::Plugin => "plugins",
            ComponentKind::AddOn => "addons",
            ComponentKind::Decorator => "decorators",
            ComponentKind::Layout => "layouts",
            ComponentKind::Router => "routers",
            ComponentKind::Seed => "seeds",
            ComponentKind::Visualizer => "visualizers",
        }
    }

    /// Singular, human-facing name
    pub fn label(self) -> &'static str {
        match self {
            ComponentKind::Plugin => "plugin",
            ComponentKind::AddOn => "add-on",
            ComponentKind::Decorator => "decorator",
            ComponentKind::Layout => "layout",
            ComponentKind::Router => "router",
            ComponentKind::Seed => "seed",
            ComponentKind::Visualizer => "visualizer",
        }
    }

    pub fn spec(self) -> &'static KindSpec {
        // KIND_SPECS is ordered like ALL
        &KIND_SPECS[self as usize]
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ComponentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', '_'], "");
        ComponentKind::ALL
            .into_iter()
            .find(|kind| {
                let label = kind.label().replace('-', "");
                wanted == label || wanted == kind.manifest_key()
            })
            .ok_or_else(|| {
                let known: Vec<&str> = ComponentKind::ALL.iter().map(|k| k.label()).collect();
                format!("Unknown component kind '{}'. Expected one of: {}", s, known.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specs_follow_kind_order() {
        for kind in ComponentKind::ALL {
            assert_eq!(kind.spec().kind, kind);
        }
    }

    #[test]
    fn test_parse_kind_aliases() {
        assert!(matches!("plugin".parse::<ComponentKind>(), Ok(ComponentKind::Plugin)));
        assert!(matches!("plugins".parse::<ComponentKind>(), Ok(ComponentKind::Plugin)));
        assert!(matches!("add-on".parse::<ComponentKind>(), Ok(ComponentKind::AddOn)));
        assert!(matches!("addons".parse::<ComponentKind>(), Ok(ComponentKind::AddOn)));
        assert!(matches!("AddOn".parse::<ComponentKind>(), Ok(ComponentKind::AddOn)));
        assert!(matches!("Router".parse::<ComponentKind>(), Ok(ComponentKind::Router)));
        assert!("widget".parse::<ComponentKind>().is_err());
    }

    #[test]
    fn test_capabilities() {
        assert!(ComponentKind::Router.spec().mountable);
        assert!(ComponentKind::Plugin.spec().is_enableable());
        assert!(ComponentKind::AddOn.spec().is_enableable());
        assert!(!ComponentKind::Seed.spec().is_enableable());
        assert_eq!(ComponentKind::Router.spec().path_list_field(), None);
        assert_eq!(
            ComponentKind::Seed.spec().enable_flag,
            Some("seedProjects.enable")
        );
    }
}
