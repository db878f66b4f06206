//! Installing the projects components are imported from

use crate::errors::ComponentError;
use crate::logger;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use webgme_config::Settings;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Installs a package specifier into a project
pub trait PackageInstaller {
    /// Install `spec` with `root` as working directory; `Ok` means exit code 0
    fn install(&self, root: &Path, spec: &str) -> Result<(), ComponentError>;
}

/// Runs `npm install <spec> --save`
pub struct NpmInstaller {
    npm_path: String,
    timeout: Option<Duration>,
}

impl NpmInstaller {
    pub fn new(npm_path: impl Into<String>, timeout: Option<Duration>) -> Self {
        NpmInstaller {
            npm_path: npm_path.into(),
            timeout,
        }
    }

    /// Use the configured npm, or `npm` on PATH
    pub fn from_settings(settings: &Settings) -> Self {
        let npm_path = settings.get("npm-path").unwrap_or_else(|| "npm".to_string());
        NpmInstaller::new(npm_path, settings.install_timeout())
    }

    fn failed(spec: &str, reason: impl Into<String>) -> ComponentError {
        ComponentError::DependencyInstallFailed {
            package: spec.to_string(),
            reason: reason.into(),
        }
    }
}

impl PackageInstaller for NpmInstaller {
    fn install(&self, root: &Path, spec: &str) -> Result<(), ComponentError> {
        logger::debug(&format!(
            "Running: {} install {} --save (in {})",
            self.npm_path,
            spec,
            root.display()
        ));

        // Output goes to unnamed temp files so a chatty install cannot fill a pipe while we poll
        let mut stdout_file = tempfile::tempfile()?;
        let mut stderr_file = tempfile::tempfile()?;

        logger::spinner_start(&format!("Installing {}", spec));
        let mut child = Command::new(&self.npm_path)
            .args(["install", spec, "--save"])
            .current_dir(root)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout_file.try_clone()?))
            .stderr(Stdio::from(stderr_file.try_clone()?))
            .spawn()
            .map_err(|e| {
                logger::spinner_error(&format!("Failed to run {}", self.npm_path));
                Self::failed(spec, format!("failed to run {}: {}", self.npm_path, e))
            })?;

        let status = match wait_with_timeout(&mut child, self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                logger::spinner_error(&format!("Installing {} timed out", spec));
                let secs = self.timeout.map_or(0, |t| t.as_secs());
                return Err(Self::failed(spec, format!("timed out after {}s", secs)));
            }
            Err(e) => {
                logger::spinner_error(&format!("Installing {} failed", spec));
                return Err(Self::failed(spec, e.to_string()));
            }
        };

        let output = Output {
            status,
            stdout: read_back(&mut stdout_file),
            stderr: read_back(&mut stderr_file),
        };
        logger::capture_output(&format!("npm install {}", spec), &output);

        if status.success() {
            logger::spinner_success(&format!("Installed {}", spec));
            Ok(())
        } else {
            logger::spinner_error(&format!("npm install {} failed", spec));
            let reason = match status.code() {
                Some(code) => format!("npm exited with status {}", code),
                None => "npm was terminated by a signal".to_string(),
            };
            Err(Self::failed(spec, reason))
        }
    }
}

/// Wait for `child`, killing it once `timeout` elapses
///
/// Returns `Ok(None)` when the child was killed.
fn wait_with_timeout(
    child: &mut Child,
    timeout: Option<Duration>,
) -> std::io::Result<Option<ExitStatus>> {
    let Some(timeout) = timeout else {
        return child.wait().map(Some);
    };

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            child.kill()?;
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn read_back(file: &mut std::fs::File) -> Vec<u8> {
    let mut buf = Vec::new();
    if file.seek(SeekFrom::Start(0)).is_ok() {
        let _ = file.read_to_end(&mut buf);
    }
    buf
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings_uses_configured_npm_without_discovery() {
        let installer = NpmInstaller::from_settings(&Settings::default());
        assert_eq!(installer.npm_path, "npm");
        assert_eq!(installer.timeout, None);

        let mut settings = Settings::default();
        assert!(settings.set("npm-path", "/opt/npm/bin/npm".to_string()).is_ok());
        assert!(settings.set("install-timeout", "30".to_string()).is_ok());
        let installer = NpmInstaller::from_settings(&settings);
        assert_eq!(installer.npm_path, "/opt/npm/bin/npm");
        assert_eq!(installer.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_wait_with_timeout_kills_slow_child() {
        let Ok(mut child) = Command::new("sleep").arg("5").spawn() else {
            return;
        };
        let result = wait_with_timeout(&mut child, Some(Duration::from_millis(100)));
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn test_wait_with_timeout_returns_status() {
        let Ok(mut child) = Command::new("true").spawn() else {
            return;
        };
        let result = wait_with_timeout(&mut child, Some(Duration::from_secs(5)));
        assert!(result.is_ok_and(|status| status.is_some_and(|s| s.success())));
    }

    #[test]
    fn test_missing_npm_reports_install_failure() {
        let Ok(temp_dir) = tempfile::TempDir::new() else {
            return;
        };
        let installer = NpmInstaller::new("/nonexistent/npm", None);
        let result = installer.install(temp_dir.path(), "webgme-widgets");
        assert!(matches!(
            result,
            Err(ComponentError::DependencyInstallFailed { .. })
        ));
    }
}
