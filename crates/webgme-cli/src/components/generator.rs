//! Boilerplate for newly created components

use crate::errors::ComponentError;
use regex::Regex;
use std::path::PathBuf;
use webgme_manifest::runtime_config::default_mount;
use webgme_manifest::{ComponentKind, KindSpec, Record};

/// One file to write, relative to the project root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub content: String,
}

/// What a generator produced: the files and the record describing them
#[derive(Debug, Clone, PartialEq)]
pub struct Scaffold {
    pub record: Record,
    pub files: Vec<GeneratedFile>,
}

/// Produces the files of a new component
pub trait Generator {
    fn generate(&self, spec: &KindSpec, name: &str) -> Result<Scaffold, ComponentError>;
}

/// Minimal per-kind skeletons
pub struct TemplateGenerator {
    name_pattern: Regex,
}

impl TemplateGenerator {
    pub fn new() -> Result<Self, ComponentError> {
        let name_pattern = Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$")
            .map_err(|e| ComponentError::Generator(e.to_string()))?;
        Ok(TemplateGenerator { name_pattern })
    }

    fn check_name(&self, name: &str) -> Result<(), ComponentError> {
        if self.name_pattern.is_match(name) {
            Ok(())
        } else {
            Err(ComponentError::Generator(format!(
                "'{}' is not a valid component name (letters, digits, '_' and '$'; not starting with a digit)",
                name
            )))
        }
    }
}

fn file(dir: &str, file_name: &str, content: String) -> GeneratedFile {
    GeneratedFile {
        path: PathBuf::from(format!("{}/{}", dir, file_name)),
        content,
    }
}

impl Generator for TemplateGenerator {
    fn generate(&self, spec: &KindSpec, name: &str) -> Result<Scaffold, ComponentError> {
        self.check_name(name)?;

        let src_dir = format!("{}/{}", spec.source_dir, name);
        let mut record = Record::local(src_dir.clone());
        let mut files = Vec::new();

        match spec.kind {
            ComponentKind::Plugin => {
                files.push(file(&src_dir, &format!("{}.js", name), plugin_js(name)));
                files.push(file(&src_dir, "metadata.json", plugin_metadata(name)));
                if let Some(test_root) = spec.test_dir {
                    let test_dir = format!("{}/{}", test_root, name);
                    files.push(file(&test_dir, &format!("{}.spec.js", name), plugin_test(name)));
                    record = record.with_test(test_dir);
                }
            }
            ComponentKind::AddOn => {
                files.push(file(&src_dir, &format!("{}.js", name), addon_js(name)));
            }
            ComponentKind::Decorator => {
                files.push(file(&src_dir, &format!("{}.js", name), decorator_js(name)));
            }
            ComponentKind::Layout => {
                files.push(file(&src_dir, &format!("{}.js", name), layout_js(name)));
            }
            ComponentKind::Router => {
                files.push(file(&src_dir, &format!("{}.js", name), router_js(name)));
                record = record.with_mount(default_mount(name));
            }
            ComponentKind::Seed => {
                files.push(file(&src_dir, "README.md", seed_readme(name)));
            }
            ComponentKind::Visualizer => {
                files.push(file(&src_dir, &format!("{}Panel.js", name), panel_js(name)));
                let widget_dir = format!("src/visualizers/widgets/{}", name);
                files.push(file(&widget_dir, &format!("{}Widget.js", name), widget_js(name)));
                record.widget = Some(widget_dir);
            }
        }

        Ok(Scaffold { record, files })
    }
}

fn plugin_js(name: &str) -> String {
    format!(
        r"/*globals define*/
define(['plugin/PluginBase', 'text!./metadata.json'], function (PluginBase, pluginMetadata) {{
    'use strict';

    pluginMetadata = JSON.parse(pluginMetadata);

    function {name}() {{
        PluginBase.call(this);
        this.pluginMetadata = pluginMetadata;
    }}

    {name}.metadata = pluginMetadata;
    {name}.prototype = Object.create(PluginBase.prototype);
    {name}.prototype.constructor = {name};

    {name}.prototype.main = function (callback) {{
        this.result.setSuccess(true);
        callback(null, this.result);
    }};

    return {name};
}});
"
    )
}

fn plugin_metadata(name: &str) -> String {
    let metadata = serde_json::json!({
        "id": name,
        "name": name,
        "version": "0.1.0",
        "description": "",
        "configStructure": [],
    });
    serde_json::to_string_pretty(&metadata).map_or_else(|_| String::from("{}\n"), |s| s + "\n")
}

fn plugin_test(name: &str) -> String {
    format!(
        r"describe('{name}', function () {{
    it('should run', function () {{
    }});
}});
"
    )
}

fn addon_js(name: &str) -> String {
    format!(
        r"/*globals define*/
define(['addon/AddOnBase'], function (AddOnBase) {{
    'use strict';

    function {name}(mainLogger, gmeConfig) {{
        AddOnBase.call(this, mainLogger, gmeConfig);
    }}

    {name}.prototype = Object.create(AddOnBase.prototype);
    {name}.prototype.constructor = {name};

    {name}.prototype.getName = function () {{
        return '{name}';
    }};

    {name}.prototype.update = function (rootNode, commitObj, callback) {{
        callback(null);
    }};

    return {name};
}});
"
    )
}

fn decorator_js(name: &str) -> String {
    format!(
        r"/*globals define*/
define(['js/Decorators/DecoratorBase'], function (DecoratorBase) {{
    'use strict';

    function {name}(params) {{
        DecoratorBase.apply(this, [params]);
    }}

    {name}.prototype = Object.create(DecoratorBase.prototype);
    {name}.prototype.constructor = {name};
    {name}.prototype.DECORATORID = '{name}';

    return {name};
}});
"
    )
}

fn layout_js(name: &str) -> String {
    format!(
        r"/*globals define*/
define(['lib/jquery/jquery.layout'], function () {{
    'use strict';

    function {name}(params) {{
        this._logger = params.logger;
    }}

    {name}.prototype.init = function () {{
    }};

    return {name};
}});
"
    )
}

fn router_js(name: &str) -> String {
    format!(
        r"'use strict';

var express = require('express'),
    router = express.Router();

function initialize(middlewareOpts) {{
    router.get('/', function (req, res) {{
        res.json({{name: '{name}'}});
    }});
}}

function start(callback) {{
    callback();
}}

function stop(callback) {{
    callback();
}}

module.exports = {{
    initialize: initialize,
    router: router,
    start: start,
    stop: stop
}};
"
    )
}

fn seed_readme(name: &str) -> String {
    format!("# {name}\n\nExport a project to `{name}.webgmex` in this directory to use it as a seed.\n")
}

fn panel_js(name: &str) -> String {
    format!(
        r"/*globals define*/
define(['js/PanelBase/PanelBaseWithHeader', 'widgets/{name}/{name}Widget'], function (PanelBaseWithHeader, {name}Widget) {{
    'use strict';

    function {name}Panel(layoutManager, params) {{
        PanelBaseWithHeader.apply(this, [{{LOGGER_INSTANCE_NAME: '{name}Panel'}}, layoutManager]);
        this.widget = new {name}Widget(this.logger, this.$el);
    }}

    {name}Panel.prototype = Object.create(PanelBaseWithHeader.prototype);
    {name}Panel.prototype.constructor = {name}Panel;

    return {name}Panel;
}});
"
    )
}

fn widget_js(name: &str) -> String {
    format!(
        r"/*globals define*/
define([], function () {{
    'use strict';

    function {name}Widget(logger, container) {{
        this._logger = logger.fork('Widget');
        this._el = container;
    }}

    return {name}Widget;
}});
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(kind: ComponentKind, name: &str) -> Result<Scaffold, ComponentError> {
        TemplateGenerator::new()?.generate(kind.spec(), name)
    }

    #[test]
    fn test_plugin_scaffold_includes_test_stub() {
        let Ok(scaffold) = generate(ComponentKind::Plugin, "Foo") else {
            panic!("plugin scaffold failed");
        };
        assert_eq!(scaffold.record.src.as_deref(), Some("src/plugins/Foo"));
        assert_eq!(scaffold.record.test.as_deref(), Some("test/plugins/Foo"));
        let paths: Vec<PathBuf> = scaffold.files.iter().map(|f| f.path.clone()).collect();
        assert!(paths.contains(&PathBuf::from("src/plugins/Foo/Foo.js")));
        assert!(paths.contains(&PathBuf::from("src/plugins/Foo/metadata.json")));
        assert!(paths.contains(&PathBuf::from("test/plugins/Foo/Foo.spec.js")));
    }

    #[test]
    fn test_router_scaffold_has_default_mount() {
        let scaffold = generate(ComponentKind::Router, "Api");
        assert!(scaffold.is_ok_and(|s| s.record.mount.as_deref() == Some("routers/Api")
            && s.files[0].content.contains("module.exports")));
    }

    #[test]
    fn test_visualizer_scaffold_owns_widget_dir() {
        let scaffold = generate(ComponentKind::Visualizer, "Graph");
        assert!(scaffold.is_ok_and(|s| s.record.widget.as_deref()
            == Some("src/visualizers/widgets/Graph")
            && s.record.src.as_deref() == Some("src/visualizers/panels/Graph")));
    }

    #[test]
    fn test_rejects_invalid_names() {
        for name in ["", "1Foo", "foo/bar", "../Foo", "Foo Bar"] {
            assert!(
                matches!(generate(ComponentKind::Plugin, name), Err(ComponentError::Generator(_))),
                "{} should be rejected",
                name
            );
        }
    }
}
