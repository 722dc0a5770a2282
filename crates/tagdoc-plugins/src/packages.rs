//! Package metadata plugin.

use std::collections::BTreeMap;
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tagdoc_aggregator::{Output, Plugin, PluginError};
use tagdoc_compiler::{Compiler, Warning, WarningKind};
use tagdoc_source::SourceFile;

use crate::registry::RegistryClient;

/// Fields read from `package.json`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Manifest {
    name: Option<String>,
    version: Option<String>,
    description: Option<String>,
    license: Option<License>,
    homepage: Option<String>,
    repository: Option<Repository>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
    #[serde(default)]
    peer_dependencies: BTreeMap<String, String>,
    #[serde(default)]
    private: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Repository {
    Url(String),
    Object { url: String },
}

/// SPDX expression, or the legacy `{"type": ..., "url": ...}` object.
#[derive(Deserialize)]
#[serde(untagged)]
enum License {
    Expression(String),
    Object {
        #[serde(rename = "type")]
        kind: String,
    },
}

/// A documented package.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `description` rendered as markdown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    pub keywords: Vec<String>,
    pub dependencies: BTreeMap<String, String>,
    pub peer_dependencies: BTreeMap<String, String>,
    pub private: bool,
    pub source_path: String,
    /// Registry `latest` tag, when a lookup succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<String>,
    /// Registry versions, oldest first. Empty without a lookup.
    pub published_versions: Vec<String>,
}

/// Reads `package.json` manifests.
///
/// With a [`RegistryClient`] configured, every public package is looked up
/// and enriched with its published versions. A failed lookup is reported as
/// a [`WarningKind::PluginDegraded`] warning and the package keeps its
/// local data. Output key: `packages` (name to package).
#[derive(Clone, Default)]
pub struct PackagesPlugin {
    registry: Option<Arc<dyn RegistryClient>>,
}

impl PackagesPlugin {
    /// Plugin without registry lookups.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look packages up in `registry`.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<dyn RegistryClient>) -> Self {
        self.registry = Some(registry);
        self
    }

    fn read_package(
        file: &dyn SourceFile,
        compiler: &Compiler,
    ) -> Result<Option<Package>, PluginError> {
        let text = file.read()?;
        let source_path = compiler.relative_path(file.path());

        let manifest: Manifest =
            serde_json::from_str(&text).map_err(|e| PluginError::Invalid {
                path: source_path.clone(),
                message: e.to_string(),
            })?;

        let Some(name) = manifest.name.filter(|n| !n.trim().is_empty()) else {
            compiler.diagnostics().warn(Warning::new(
                WarningKind::PluginDegraded,
                format!("Skipping {source_path}: package has no name"),
            ));
            return Ok(None);
        };

        Ok(Some(Package {
            name,
            version: manifest.version,
            description_html: manifest
                .description
                .as_deref()
                .map(|d| compiler.render_markdown(d)),
            description: manifest.description,
            license: manifest.license.map(|l| match l {
                License::Expression(kind) | License::Object { kind } => kind,
            }),
            homepage: manifest.homepage,
            repository: manifest.repository.map(|r| match r {
                Repository::Url(url) | Repository::Object { url } => url,
            }),
            keywords: manifest.keywords,
            dependencies: manifest.dependencies,
            peer_dependencies: manifest.peer_dependencies,
            private: manifest.private,
            source_path,
            latest_version: None,
            published_versions: Vec::new(),
        }))
    }

    fn enrich(&self, package: &mut Package, compiler: &Compiler) {
        let Some(registry) = &self.registry else {
            return;
        };
        if package.private {
            return;
        }

        match registry.lookup(&package.name) {
            Ok(info) => {
                package.latest_version = info.latest_version;
                package.published_versions = info.published_versions;
            }
            Err(e) => compiler.diagnostics().warn(Warning::new(
                WarningKind::PluginDegraded,
                format!(
                    "Registry lookup for `{}` failed, using local package.json: {e}",
                    package.name
                ),
            )),
        }
    }
}

impl Plugin for PackagesPlugin {
    fn name(&self) -> &str {
        "packages"
    }

    fn compile(&self, files: &[&dyn SourceFile], compiler: &Compiler) -> Result<Output, PluginError> {
        let mut packages = files
            .par_iter()
            .map(|file| Self::read_package(*file, compiler))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();

        packages
            .par_iter_mut()
            .for_each(|package| self.enrich(package, compiler));

        let mut by_name: BTreeMap<String, Package> = BTreeMap::new();
        for package in packages {
            if let Some(previous) = by_name.get(&package.name) {
                compiler.diagnostics().warn(Warning::new(
                    WarningKind::DuplicateReference,
                    format!(
                        "Duplicate package `{}`: {} replaces {}",
                        package.name, package.source_path, previous.source_path
                    ),
                ));
            }
            by_name.insert(package.name.clone(), package);
        }

        tracing::info!(packages = by_name.len(), "Compiled packages");

        let mut output = Output::new();
        output.insert(
            "packages".to_owned(),
            serde_json::to_value(&by_name).map_err(PluginError::custom)?,
        );
        Ok(output)
    }
}

impl std::fmt::Debug for PackagesPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackagesPlugin")
            .field("registry", &self.registry.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tagdoc_compiler::{CollectingDiagnostics, Diagnostics};
    use tagdoc_source::MemoryFile;

    use super::*;
    use crate::as_sources;
    use crate::registry::{RegistryError, RegistryInfo};

    /// Serves versions for known names and fails for the rest.
    struct StubRegistry {
        known: BTreeMap<&'static str, RegistryInfo>,
        lookups: Mutex<Vec<String>>,
    }

    impl StubRegistry {
        fn new() -> Self {
            let mut known = BTreeMap::new();
            known.insert(
                "@acme/button",
                RegistryInfo {
                    latest_version: Some("2.1.0".to_owned()),
                    published_versions: vec!["2.0.0".to_owned(), "2.1.0".to_owned()],
                },
            );
            Self {
                known,
                lookups: Mutex::new(Vec::new()),
            }
        }
    }

    impl RegistryClient for StubRegistry {
        fn lookup(&self, name: &str) -> Result<RegistryInfo, RegistryError> {
            self.lookups.lock().unwrap().push(name.to_owned());
            self.known
                .get(name)
                .cloned()
                .ok_or_else(|| RegistryError::Status {
                    status: 404,
                    url: format!("stub/{name}"),
                })
        }
    }

    const BUTTON: &str = r#"{
        "name": "@acme/button",
        "version": "2.1.0",
        "description": "A *clickable* button",
        "license": "MIT",
        "repository": {"type": "git", "url": "https://git.example.com/button.git"},
        "keywords": ["ui", "button"],
        "dependencies": {"react": "^18.0.0"},
        "peerDependencies": {"react-dom": "^18.0.0"}
    }"#;

    fn compiler() -> (Compiler, Arc<CollectingDiagnostics>) {
        let diagnostics = Arc::new(CollectingDiagnostics::new());
        let compiler = Compiler::new("/repo")
            .with_diagnostics(Arc::clone(&diagnostics) as Arc<dyn Diagnostics>);
        (compiler, diagnostics)
    }

    #[test]
    fn test_reads_manifest_fields() {
        let (compiler, diagnostics) = compiler();
        let files = vec![MemoryFile::new("/repo/packages/button/package.json", BUTTON)];

        let output = PackagesPlugin::new()
            .compile(&as_sources(&files), &compiler)
            .unwrap();

        assert_eq!(
            output["packages"]["@acme/button"],
            json!({
                "name": "@acme/button",
                "version": "2.1.0",
                "description": "A *clickable* button",
                "descriptionHtml": "<p>A <em>clickable</em> button</p>\n",
                "license": "MIT",
                "repository": "https://git.example.com/button.git",
                "keywords": ["ui", "button"],
                "dependencies": {"react": "^18.0.0"},
                "peerDependencies": {"react-dom": "^18.0.0"},
                "private": false,
                "sourcePath": "packages/button/package.json",
                "publishedVersions": [],
            })
        );
        assert!(diagnostics.warnings().is_empty());
    }

    #[test]
    fn test_repository_as_string() {
        let (compiler, _) = compiler();
        let files = vec![MemoryFile::new(
            "/repo/package.json",
            r#"{"name": "root", "repository": "github:acme/root"}"#,
        )];

        let output = PackagesPlugin::new()
            .compile(&as_sources(&files), &compiler)
            .unwrap();
        assert_eq!(output["packages"]["root"]["repository"], "github:acme/root");
    }

    #[test]
    fn test_legacy_license_object() {
        let (compiler, diagnostics) = compiler();
        let files = vec![MemoryFile::new(
            "/repo/old/package.json",
            r#"{"name": "old", "license": {"type": "MIT", "url": "https://opensource.org/licenses/MIT"}}"#,
        )];

        let output = PackagesPlugin::new()
            .compile(&as_sources(&files), &compiler)
            .unwrap();
        assert_eq!(output["packages"]["old"]["license"], "MIT");
        assert!(diagnostics.warnings().is_empty());
    }

    #[test]
    fn test_registry_enrichment_and_degradation() {
        let (compiler, diagnostics) = compiler();
        let registry = Arc::new(StubRegistry::new());
        let files = vec![
            MemoryFile::new("/repo/button/package.json", BUTTON),
            MemoryFile::new("/repo/unknown/package.json", r#"{"name": "unknown", "version": "0.1.0"}"#),
            MemoryFile::new("/repo/app/package.json", r#"{"name": "app", "private": true}"#),
        ];

        let output = PackagesPlugin::new()
            .with_registry(Arc::clone(&registry) as Arc<dyn RegistryClient>)
            .compile(&as_sources(&files), &compiler)
            .unwrap();

        let button = &output["packages"]["@acme/button"];
        assert_eq!(button["latestVersion"], "2.1.0");
        assert_eq!(button["publishedVersions"], json!(["2.0.0", "2.1.0"]));

        let unknown = &output["packages"]["unknown"];
        assert_eq!(unknown["version"], "0.1.0");
        assert!(unknown.get("latestVersion").is_none());
        assert_eq!(diagnostics.count(WarningKind::PluginDegraded), 1);
        assert!(diagnostics.warnings()[0].message.contains("`unknown`"));

        let mut lookups = registry.lookups.lock().unwrap().clone();
        lookups.sort();
        assert_eq!(lookups, vec!["@acme/button", "unknown"]);
    }

    #[test]
    fn test_unnamed_package_skipped_with_warning() {
        let (compiler, diagnostics) = compiler();
        let files = vec![MemoryFile::new("/repo/tools/package.json", r#"{"version": "1.0.0"}"#)];

        let output = PackagesPlugin::new()
            .compile(&as_sources(&files), &compiler)
            .unwrap();

        assert_eq!(output["packages"], json!({}));
        assert_eq!(diagnostics.count(WarningKind::PluginDegraded), 1);
        assert!(diagnostics.warnings()[0].message.contains("tools/package.json"));
    }

    #[test]
    fn test_malformed_json_names_file() {
        let (compiler, _) = compiler();
        let files = vec![MemoryFile::new("/repo/broken/package.json", "{\"name\": ")];

        let err = PackagesPlugin::new()
            .compile(&as_sources(&files), &compiler)
            .unwrap_err();

        assert!(matches!(err, PluginError::Invalid { ref path, .. } if path == "broken/package.json"));
        assert!(err.to_string().starts_with("Invalid broken/package.json:"));
    }

    #[test]
    fn test_duplicate_names_warn() {
        let (compiler, diagnostics) = compiler();
        let files = vec![
            MemoryFile::new("/repo/a/package.json", r#"{"name": "dup", "version": "1.0.0"}"#),
            MemoryFile::new("/repo/b/package.json", r#"{"name": "dup", "version": "2.0.0"}"#),
        ];

        let output = PackagesPlugin::new()
            .compile(&as_sources(&files), &compiler)
            .unwrap();

        assert_eq!(output["packages"]["dup"]["version"], "2.0.0");
        assert_eq!(diagnostics.count(WarningKind::DuplicateReference), 1);
    }
}
