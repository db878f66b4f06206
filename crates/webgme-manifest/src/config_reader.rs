//! Reading another project's framework configuration
//!
//! Foreign configuration is source code we must not run. Instead the
//! statements that matter for component lookup are recognized one line at a
//! time: `push` calls, single-line array assignments, boolean flags and
//! `rest.components` entries. JSON configuration is walked by field name.
//!
//! Paths in the resulting [`ConfigDocument`] are relative to the directory of
//! the file they came from, unless absolute.

use crate::errors::ManifestError;
use crate::kinds::{ComponentKind, ConfigTarget};
use crate::runtime_config::{ConfigDocument, RestComponent};
use regex::Regex;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;
use webgme_config::layout;

/// Configuration files probed in a foreign project, in priority order
pub const CONFIG_CANDIDATES: &[&str] = &[
    "config/config.webgme.js",
    "config/config.default.js",
    "config/index.js",
    "config/config.json",
];

/// Existing configuration files of the project at `project_root`
pub fn find_config_files(project_root: &Path) -> Vec<PathBuf> {
    CONFIG_CANDIDATES
        .iter()
        .map(|candidate| project_root.join(candidate))
        .filter(|path| path.is_file())
        .collect()
}

/// Read a configuration file into a typed document
pub fn read_config_document(path: &Path) -> Result<ConfigDocument, ManifestError> {
    let content = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let doc = if is_json {
        let value: Value =
            serde_json::from_str(&content).map_err(|e| ManifestError::ConfigRead {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        parse_json_config(&value)
    } else {
        JsConfigParser::new()?.parse(&content)
    };

    debug!(
        "Read {} path list(s) from {}",
        doc.path_lists.len(),
        path.display()
    );
    Ok(doc)
}

/// Collect the capability-table fields out of a JSON configuration
pub fn parse_json_config(value: &Value) -> ConfigDocument {
    let mut doc = ConfigDocument::default();

    for kind in ComponentKind::ALL {
        let spec = kind.spec();
        match spec.config {
            ConfigTarget::PathList(field) => {
                if let Some(Value::Array(items)) = lookup(value, field) {
                    for item in items.iter().filter_map(Value::as_str) {
                        doc.push_path(field, item);
                    }
                }
            }
            ConfigTarget::RestComponents => {
                if let Some(Value::Object(table)) = lookup(value, "rest.components") {
                    for (name, entry) in table {
                        let src = entry.get("src").and_then(Value::as_str);
                        let mount = entry.get("mount").and_then(Value::as_str).unwrap_or("");
                        if let Some(src) = src {
                            doc.rest_components.insert(
                                name.clone(),
                                RestComponent {
                                    src: layout::normalize_separators(src),
                                    mount: mount.to_string(),
                                },
                            );
                        }
                    }
                }
            }
        }

        if let Some(flag) = spec.enable_flag {
            if let Some(Value::Bool(enabled)) = lookup(value, flag) {
                doc.flags.insert(flag.to_string(), *enabled);
            }
        }
    }

    doc
}

fn lookup<'a>(value: &'a Value, dotted: &str) -> Option<&'a Value> {
    dotted
        .split('.')
        .try_fold(value, |current, key| current.get(key))
}

/// Statement recognizer for JavaScript configuration modules
pub struct JsConfigParser {
    push_regex: Regex,
    array_regex: Regex,
    flag_regex: Regex,
    rest_regex: Regex,
    rest_src_regex: Regex,
    rest_mount_regex: Regex,
    dirname_concat_regex: Regex,
    path_join_regex: Regex,
    literal_regex: Regex,
}

impl JsConfigParser {
    pub fn new() -> Result<Self, ManifestError> {
        Ok(Self {
            // config.plugin.basePaths.push(__dirname + '/../src/plugins');
            push_regex: Regex::new(r"^\s*config\.([A-Za-z_$][\w$.]*)\.push\((.*)\)\s*;?\s*$")?,

            // config.plugin.basePaths = ['./src/plugins'];
            array_regex: Regex::new(r"^\s*config\.([A-Za-z_$][\w$.]*)\s*=\s*\[(.*)\]\s*;?\s*$")?,

            // config.addOn.enable = true;
            flag_regex: Regex::new(r"^\s*config\.([A-Za-z_$][\w$.]*)\s*=\s*(true|false)\s*;?\s*$")?,

            // config.rest.components['Search'] = {src: ..., mount: 'api/search', options: {}};
            rest_regex: Regex::new(
                r#"^\s*config\.rest\.components\[\s*['"]([^'"]+)['"]\s*\]\s*=\s*\{(.*)\}\s*;?\s*$"#,
            )?,
            rest_src_regex: Regex::new(
                r#"\bsrc\s*:\s*((?:__dirname\s*\+\s*)?'[^']*'|(?:__dirname\s*\+\s*)?"[^"]*"|path\.(?:join|resolve)\([^)]*\))"#,
            )?,
            rest_mount_regex: Regex::new(r#"\bmount\s*:\s*['"]([^'"]*)['"]"#)?,

            dirname_concat_regex: Regex::new(r#"^__dirname\s*\+\s*(?:'([^']*)'|"([^"]*)")$"#)?,
            path_join_regex: Regex::new(r"^path\.(?:join|resolve)\(\s*__dirname\s*,(.*)\)$")?,
            literal_regex: Regex::new(r#"^(?:'([^']*)'|"([^"]*)")$"#)?,
        })
    }

    pub fn parse(&self, source: &str) -> ConfigDocument {
        let mut doc = ConfigDocument::default();

        for line in source.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with("//") || trimmed.starts_with('*') {
                continue;
            }

            if let Some(caps) = self.rest_regex.captures(trimmed) {
                let name = caps[1].to_string();
                let body = &caps[2];
                let src = self
                    .rest_src_regex
                    .captures(body)
                    .and_then(|c| self.eval_path_expr(c[1].trim()));
                let mount = self
                    .rest_mount_regex
                    .captures(body)
                    .map(|c| c[1].to_string())
                    .unwrap_or_default();
                if let Some(src) = src {
                    doc.rest_components
                        .insert(name, RestComponent { src, mount });
                }
            } else if let Some(caps) = self.push_regex.captures(trimmed) {
                let field = &caps[1];
                for arg in split_top_level(&caps[2]) {
                    if let Some(path) = self.eval_path_expr(arg) {
                        doc.push_path(field, &path);
                    }
                }
            } else if let Some(caps) = self.flag_regex.captures(trimmed) {
                doc.flags.insert(caps[1].to_string(), &caps[2] == "true");
            } else if let Some(caps) = self.array_regex.captures(trimmed) {
                // assignment replaces whatever was pushed before
                let field = caps[1].to_string();
                doc.path_lists.insert(field.clone(), Vec::new());
                for arg in split_top_level(&caps[2]) {
                    if let Some(path) = self.eval_path_expr(arg) {
                        doc.push_path(&field, &path);
                    }
                }
            }
        }

        doc
    }

    /// Evaluate the path expressions configuration files use in practice
    ///
    /// `__dirname + '/x'` and `path.join(__dirname, 'x')` become `x` (relative
    /// to the file's directory); string literals are taken as written.
    fn eval_path_expr(&self, expr: &str) -> Option<String> {
        let expr = expr.trim();

        if let Some(caps) = self.dirname_concat_regex.captures(expr) {
            let literal = caps.get(1).or(caps.get(2))?.as_str();
            return Some(relative_to_dirname(literal));
        }

        if let Some(caps) = self.path_join_regex.captures(expr) {
            let parts: Vec<String> = split_top_level(&caps[1])
                .into_iter()
                .map(|part| self.string_literal(part))
                .collect::<Option<Vec<_>>>()?;
            return Some(relative_to_dirname(&parts.join("/")));
        }

        self.string_literal(expr)
    }

    fn string_literal(&self, expr: &str) -> Option<String> {
        let caps = self.literal_regex.captures(expr.trim())?;
        caps.get(1).or(caps.get(2)).map(|m| m.as_str().to_string())
    }
}

fn relative_to_dirname(literal: &str) -> String {
    let stripped = literal.trim_start_matches(['/', '\\']);
    if stripped.is_empty() {
        ".".to_string()
    } else {
        stripped.to_string()
    }
}

/// Split a call's argument list on commas outside quotes and brackets
fn split_top_level(args: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (idx, ch) in args.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"' | '`') => quote = Some(ch),
            (None, '(' | '[' | '{') => depth += 1,
            (None, ')' | ']' | '}') => depth -= 1,
            (None, ',') if depth == 0 => {
                parts.push(args[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(args[start..].trim());
    parts.retain(|part| !part.is_empty());
    parts
}
