//! Browser extension assets
//!
//! Writes a Manifest V3 extension that auto-selects the IE entity and
//! rejects cookies on the brokerage's sites, then packs the same files into
//! a ZIP archive. Only KNOWN hosts that served a pinned certificate are
//! granted host permissions, and nothing is written while any KNOWN host
//! serves a mismatched certificate.

use crate::models::{ProbeResult, Report, Tier};
use crate::utils::{ExtensionError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const EXTENSION_NAME: &str = "BrokerSiteHelper";
pub const EXTENSION_VERSION: &str = "1.0.0";

const MANIFEST_FILE: &str = "manifest.json";
const SCRIPT_FILE: &str = "content.js";
const ICON_FILE: &str = "icons/icon.png";

/// 48x48 toolbar icon
pub const ICON_PNG: &[u8] = include_bytes!("../../assets/icon.png");

/// Content script injected into every permitted host
pub const CONTENT_SCRIPT: &str = r#"(() => {
  const action = () => {
    for (const el of document.querySelectorAll('button,a')) {
      const t = el.textContent.trim().toLowerCase();
      if (t === 'go to ie website') { el.click(); return; }
      if (['reject all cookies', 'reject cookies', 'ablehnen'].includes(t)) { el.click(); return; }
    }
  };
  action();
  const o = new MutationObserver(action);
  o.observe(document.body, { childList: true, subtree: true });
  setTimeout(() => o.disconnect(), 15000);
})();
"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentScript {
    pub matches: Vec<String>,
    pub js: Vec<String>,
    pub run_at: String,
}

/// The subset of a Manifest V3 document this extension needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    pub manifest_version: u8,
    pub name: String,
    pub version: String,
    pub description: String,
    pub permissions: Vec<String>,
    pub host_permissions: Vec<String>,
    pub icons: BTreeMap<String, String>,
    pub content_scripts: Vec<ContentScript>,
}

impl Manifest {
    /// Derive the manifest from a finished report.
    ///
    /// Fails when a KNOWN host served an unpinned certificate, or when no
    /// KNOWN host was verified at all.
    pub fn from_report(report: &Report) -> std::result::Result<Self, ExtensionError> {
        let mismatched: Vec<&str> = report
            .mismatches()
            .filter(|r| r.target.tier == Tier::Known)
            .map(ProbeResult::hostname)
            .collect();
        if !mismatched.is_empty() {
            return Err(ExtensionError::MismatchDetected {
                hosts: mismatched.join(", "),
            });
        }

        let host_permissions: Vec<String> = report
            .pinned_hosts(Tier::Known)
            .into_iter()
            .map(|host| format!("*://*.{}/*", host))
            .collect();
        if host_permissions.is_empty() {
            return Err(ExtensionError::NoVerifiedHosts);
        }

        Ok(Self {
            manifest_version: 3,
            name: EXTENSION_NAME.to_string(),
            version: EXTENSION_VERSION.to_string(),
            description: "Auto-select IE entity & reject cookies on Interactive Brokers EU/IE."
                .to_string(),
            permissions: vec!["scripting".to_string()],
            icons: BTreeMap::from([("48".to_string(), ICON_FILE.to_string())]),
            content_scripts: vec![ContentScript {
                matches: host_permissions.clone(),
                js: vec![SCRIPT_FILE.to_string()],
                run_at: "document_idle".to_string(),
            }],
            host_permissions,
        })
    }
}

/// What `build` did with the report
#[derive(Debug)]
pub enum ExtensionStatus {
    Built { files: Vec<PathBuf>, archive: PathBuf },
    /// The report rules the extension out (see [`ExtensionError::is_refusal`])
    Refused(ExtensionError),
}

/// Write the extension into `dir` and pack it into `archive`.
///
/// A report that rules the extension out is not an error; failing to write
/// the files or the archive is.
pub fn build(report: &Report, dir: &Path, archive: &Path) -> Result<ExtensionStatus> {
    let files = match write_extension(report, dir) {
        Ok(files) => files,
        Err(e) if e.is_refusal() => {
            tracing::warn!(error = %e, "extension build refused");
            return Ok(ExtensionStatus::Refused(e));
        }
        Err(e) => return Err(e.into()),
    };
    write_archive(dir, archive)?;

    Ok(ExtensionStatus::Built {
        files,
        archive: archive.to_path_buf(),
    })
}

/// Asset files and their contents, keyed by path relative to the extension root
fn assets(manifest: &Manifest) -> std::result::Result<Vec<(&'static str, Vec<u8>)>, ExtensionError> {
    Ok(vec![
        (MANIFEST_FILE, serde_json::to_vec_pretty(manifest)?),
        (SCRIPT_FILE, CONTENT_SCRIPT.as_bytes().to_vec()),
        (ICON_FILE, ICON_PNG.to_vec()),
    ])
}

/// Write `manifest.json`, `content.js` and `icons/icon.png` into `dir`,
/// creating it if needed.
///
/// Returns the paths written.
pub fn write_extension(
    report: &Report,
    dir: &Path,
) -> std::result::Result<Vec<PathBuf>, ExtensionError> {
    let manifest = Manifest::from_report(report)?;

    let mut written = Vec::new();
    for (name, contents) in assets(&manifest)? {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_error(parent, e))?;
        }
        std::fs::write(&path, contents).map_err(|e| write_error(&path, e))?;
        written.push(path);
    }

    tracing::info!(
        dir = %dir.display(),
        hosts = manifest.host_permissions.len(),
        "extension assets written"
    );
    Ok(written)
}

/// Pack the extension files under `dir` into a ZIP at `archive`.
///
/// Entries sit at the archive root, so the ZIP can be loaded as-is.
pub fn write_archive(dir: &Path, archive: &Path) -> std::result::Result<(), ExtensionError> {
    if let Some(parent) = archive.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| write_error(parent, e))?;
    }
    let file = File::create(archive).map_err(|e| write_error(archive, e))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for name in [MANIFEST_FILE, SCRIPT_FILE, ICON_FILE] {
        let path = dir.join(name);
        let contents = std::fs::read(&path).map_err(|e| write_error(&path, e))?;
        zip.start_file(name, options)?;
        zip.write_all(&contents).map_err(|e| write_error(archive, e))?;
    }
    zip.finish()?;

    tracing::info!(archive = %archive.display(), "extension archive written");
    Ok(())
}

fn write_error(path: &Path, err: std::io::Error) -> ExtensionError {
    ExtensionError::WriteError {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}
