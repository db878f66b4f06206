//! Toggling components inside live project data

use crate::errors::ComponentError;
use crate::logger;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use webgme_config::{layout, Settings};

/// Plugin run against the project to edit its root-node registry
pub const TOGGLE_PLUGIN: &str = "ConfigureComponents";

/// Entry script of the framework's plugin runner, relative to the project root
const RUN_PLUGIN_SCRIPT: &str = "webgme/src/bin/run_plugin.js";

/// Launcher staged next to the toggle plugin
const LAUNCHER: &str = "run_toggle.js";

/// Adds the staged plugin directory to the project's plugin base paths, then
/// hands the remaining arguments to the framework's runner. The runner loads
/// the project config through `require`, so it sees the same object.
///
/// Usage: node run_toggle.js <pluginBasePath> <run_plugin.js> [runner args]
const LAUNCHER_JS: &str = r"'use strict';
var path = require('path');
var gmeConfig = require(path.join(process.cwd(), 'config'));
var runPlugin = require(process.argv[3]);

gmeConfig.plugin.basePaths.push(process.argv[2]);

runPlugin.main(process.argv.slice(0, 2).concat(process.argv.slice(4)), function (err) {
    process.exit(err ? 1 : 0);
});
";

const TOGGLE_PLUGIN_JS: &str = r"/*globals define*/
define(['plugin/PluginBase', 'text!./metadata.json'], function (PluginBase, pluginMetadata) {
    'use strict';

    pluginMetadata = JSON.parse(pluginMetadata);

    function ConfigureComponents() {
        PluginBase.call(this);
        this.pluginMetadata = pluginMetadata;
    }

    ConfigureComponents.metadata = pluginMetadata;
    ConfigureComponents.prototype = Object.create(PluginBase.prototype);
    ConfigureComponents.prototype.constructor = ConfigureComponents;

    ConfigureComponents.prototype.main = function (callback) {
        var self = this,
            config = self.getCurrentConfig(),
            current = self.core.getRegistry(self.rootNode, config.field) || '',
            names = current.split(' ').filter(function (name) {
                return name && name !== config.component;
            });

        if (config.enable) {
            names.push(config.component);
        }
        self.core.setRegistry(self.rootNode, config.field, names.join(' '));

        self.save('Set ' + config.field + ' for ' + config.component, function (err) {
            if (err) {
                return callback(err, self.result);
            }
            self.result.setSuccess(true);
            callback(null, self.result);
        });
    };

    return ConfigureComponents;
});
";

/// One enable/disable request for a component in a modeling project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleRequest<'a> {
    pub root: &'a Path,
    /// Root-node registry entry holding the enabled names
    pub registry_key: &'static str,
    pub component: &'a str,
    pub project: &'a str,
    pub branch: &'a str,
    pub enabled: bool,
}

/// Plugin config handed to the toggle plugin
#[derive(Debug, Serialize)]
struct TogglePluginConfig<'a> {
    field: &'a str,
    component: &'a str,
    enable: bool,
}

/// Executes graph-mutation plugins against a project
pub trait PluginRuntime {
    fn toggle(&self, request: &ToggleRequest<'_>) -> Result<(), ComponentError>;
}

/// Toggle plugin, launcher and plugin config written to a scratch directory
///
/// Everything is deleted when this is dropped.
struct StagedToggle {
    dir: TempDir,
}

impl StagedToggle {
    fn write(config: &TogglePluginConfig<'_>) -> Result<Self, ComponentError> {
        let dir = tempfile::Builder::new().prefix("webgme-toggle-").tempdir()?;

        let plugin_dir = dir.path().join("plugins").join(TOGGLE_PLUGIN);
        fs::create_dir_all(&plugin_dir)?;
        fs::write(
            plugin_dir.join(format!("{}.js", TOGGLE_PLUGIN)),
            TOGGLE_PLUGIN_JS,
        )?;
        let metadata = serde_json::json!({
            "id": TOGGLE_PLUGIN,
            "name": TOGGLE_PLUGIN,
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Adds or removes a component in a root-node registry entry",
            "configStructure": [],
        });
        fs::write(plugin_dir.join("metadata.json"), to_json(&metadata)?)?;

        fs::write(dir.path().join(LAUNCHER), LAUNCHER_JS)?;
        fs::write(dir.path().join("config.json"), to_json(config)?)?;

        Ok(StagedToggle { dir })
    }

    fn launcher(&self) -> PathBuf {
        self.dir.path().join(LAUNCHER)
    }

    fn plugin_base_path(&self) -> PathBuf {
        self.dir.path().join("plugins")
    }

    fn config(&self) -> PathBuf {
        self.dir.path().join("config.json")
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ComponentError> {
    serde_json::to_string_pretty(value).map_err(|e| ComponentError::Runtime(e.to_string()))
}

/// Runs the framework's `run_plugin.js` with node
pub struct NodePluginRuntime {
    node_path: String,
}

impl NodePluginRuntime {
    pub fn new(node_path: impl Into<String>) -> Self {
        NodePluginRuntime {
            node_path: node_path.into(),
        }
    }

    /// Use the configured node, or `node` on PATH
    pub fn from_settings(settings: &Settings) -> Self {
        NodePluginRuntime::new(settings.get("node-path").unwrap_or_else(|| "node".to_string()))
    }

    fn script_path(root: &Path) -> PathBuf {
        root.join(layout::NODE_MODULES_DIR).join(RUN_PLUGIN_SCRIPT)
    }

    fn command(&self, staged: &StagedToggle, script: &Path, request: &ToggleRequest<'_>) -> Command {
        let mut command = Command::new(&self.node_path);
        command
            .arg(staged.launcher())
            .arg(staged.plugin_base_path())
            .arg(script)
            .arg(TOGGLE_PLUGIN)
            .arg(request.project)
            .args(["-b", request.branch, "-j"])
            .arg(staged.config())
            .current_dir(request.root);
        command
    }
}

impl PluginRuntime for NodePluginRuntime {
    fn toggle(&self, request: &ToggleRequest<'_>) -> Result<(), ComponentError> {
        let script = Self::script_path(request.root);
        if !script.exists() {
            return Err(ComponentError::Runtime(format!(
                "{} not found; run npm install in {}",
                script.display(),
                request.root.display()
            )));
        }

        let staged = StagedToggle::write(&TogglePluginConfig {
            field: request.registry_key,
            component: request.component,
            enable: request.enabled,
        })?;
        let mut command = self.command(&staged, &script, request);
        logger::debug(&format!("Running: {:?}", command));

        let output = command.output().map_err(|e| {
            ComponentError::Runtime(format!("Failed to run {}: {}", self.node_path, e))
        })?;

        logger::capture_output(&format!("run_plugin {}", TOGGLE_PLUGIN), &output);

        if output.status.success() {
            Ok(())
        } else {
            Err(ComponentError::Runtime(format!(
                "{} failed on project '{}' (branch '{}')",
                TOGGLE_PLUGIN, request.project, request.branch
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    fn request(root: &Path) -> ToggleRequest<'_> {
        ToggleRequest {
            root,
            registry_key: "validPlugins",
            component: "Foo",
            project: "demo",
            branch: "master",
            enabled: true,
        }
    }

    fn config() -> TogglePluginConfig<'static> {
        TogglePluginConfig {
            field: "usedAddOns",
            component: "Watcher",
            enable: false,
        }
    }

    #[test]
    fn test_toggle_without_framework_install_fails() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let runtime = NodePluginRuntime::new("node");
        assert!(matches!(
            runtime.toggle(&request(temp_dir.path())),
            Err(ComponentError::Runtime(msg)) if msg.contains("run_plugin.js")
        ));
    }

    #[test]
    fn test_toggle_plugin_config_shape() {
        assert_eq!(
            serde_json::to_string(&config()).ok().as_deref(),
            Some(r#"{"field":"usedAddOns","component":"Watcher","enable":false}"#)
        );
    }

    #[test]
    fn test_staged_toggle_ships_plugin_and_launcher() {
        let Ok(staged) = StagedToggle::write(&config()) else {
            return;
        };
        let plugin_dir = staged.plugin_base_path().join(TOGGLE_PLUGIN);

        let plugin = fs::read_to_string(plugin_dir.join("ConfigureComponents.js"));
        assert!(plugin.is_ok_and(|js| js.contains("setRegistry")));
        let metadata = fs::read_to_string(plugin_dir.join("metadata.json"));
        assert!(metadata.is_ok_and(|m| m.contains("\"id\": \"ConfigureComponents\"")));
        let launcher = fs::read_to_string(staged.launcher());
        assert!(launcher.is_ok_and(|js| js.contains("gmeConfig.plugin.basePaths.push")));
        let plugin_config = fs::read_to_string(staged.config());
        assert!(plugin_config.is_ok_and(|c| c.contains("\"field\": \"usedAddOns\"")));

        let dir = staged.dir.path().to_path_buf();
        drop(staged);
        assert!(!dir.exists());
    }

    #[test]
    fn test_toggle_command_line() {
        let Ok(root) = TempDir::new() else {
            return;
        };
        let Ok(staged) = StagedToggle::write(&config()) else {
            return;
        };
        let runtime = NodePluginRuntime::new("/opt/node/bin/node");
        let script = NodePluginRuntime::script_path(root.path());
        let command = runtime.command(&staged, &script, &request(root.path()));

        assert_eq!(command.get_program(), OsStr::new("/opt/node/bin/node"));
        assert_eq!(command.get_current_dir(), Some(root.path()));

        let args: Vec<&OsStr> = command.get_args().collect();
        let launcher = staged.launcher();
        let base_path = staged.plugin_base_path();
        let plugin_config = staged.config();
        let expected: Vec<&OsStr> = vec![
            launcher.as_os_str(),
            base_path.as_os_str(),
            script.as_os_str(),
            OsStr::new("ConfigureComponents"),
            OsStr::new("demo"),
            OsStr::new("-b"),
            OsStr::new("master"),
            OsStr::new("-j"),
            plugin_config.as_os_str(),
        ];
        assert_eq!(args, expected);
        assert!(script.ends_with("node_modules/webgme/src/bin/run_plugin.js"));
    }
}
