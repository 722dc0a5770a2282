//! Registration list and the merge pass.

use std::collections::HashMap;
use std::path::Path;

use glob::Pattern;
use rayon::prelude::*;
use tagdoc_compiler::{Compiler, Warning, WarningKind};
use tagdoc_source::SourceFile;

use crate::error::{AggregatorError, PluginError};
use crate::plugin::{Output, Plugin};

struct Registration {
    patterns: Vec<Pattern>,
    plugin: Box<dyn Plugin>,
}

impl Registration {
    /// Match the compiler-relative path first, then the absolute path.
    fn matches(&self, path: &Path, compiler: &Compiler) -> bool {
        let relative = compiler.relative_path(path);
        self.patterns
            .iter()
            .any(|p| p.matches(&relative) || p.matches_path(path))
    }
}

/// Drives one compilation pass over a file set.
///
/// Registrations are append-only. The aggregator is immutable while
/// running, so a single instance can be reused for several runs; every run
/// starts with an empty document.
pub struct Aggregator {
    compiler: Compiler,
    registrations: Vec<Registration>,
}

impl Aggregator {
    /// Create an aggregator with no plugins.
    ///
    /// `compiler` is shared by every plugin of every run.
    #[must_use]
    pub fn new(compiler: Compiler) -> Self {
        Self {
            compiler,
            registrations: Vec::new(),
        }
    }

    /// Append a plugin handling files that match `pattern`.
    ///
    /// Patterns are globs matched against the path relative to the
    /// compiler root, or against the absolute path.
    ///
    /// # Errors
    ///
    /// Returns [`AggregatorError::Pattern`] if `pattern` is not a valid glob.
    pub fn register(self, pattern: &str, plugin: impl Plugin + 'static) -> Result<Self, AggregatorError> {
        self.register_any(&[pattern], plugin)
    }

    /// Append a plugin handling files that match any of `patterns`.
    ///
    /// The plugin runs once, with the union of the matched files.
    ///
    /// # Errors
    ///
    /// Returns [`AggregatorError::Pattern`] for the first invalid glob.
    pub fn register_any<S: AsRef<str>>(
        mut self,
        patterns: &[S],
        plugin: impl Plugin + 'static,
    ) -> Result<Self, AggregatorError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Pattern::new(p.as_ref()).map_err(|source| AggregatorError::Pattern {
                    pattern: p.as_ref().to_owned(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.registrations.push(Registration {
            patterns,
            plugin: Box::new(plugin),
        });
        Ok(self)
    }

    /// Shared compiler.
    #[must_use]
    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    /// Names of the registered plugins, in registration order.
    pub fn plugin_names(&self) -> impl Iterator<Item = &str> {
        self.registrations.iter().map(|r| r.plugin.name())
    }

    /// Run every plugin and merge their outputs.
    ///
    /// Plugins run concurrently; outputs are merged in registration order,
    /// later keys overwriting earlier ones with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`AggregatorError::Plugin`] for the first failing plugin in
    /// registration order. No partial document is returned.
    pub fn run<F: SourceFile>(&self, files: &[F]) -> Result<Output, AggregatorError> {
        let results: Vec<Result<Output, PluginError>> = self
            .registrations
            .par_iter()
            .map(|registration| {
                let matched: Vec<&dyn SourceFile> = files
                    .iter()
                    .filter(|f| registration.matches(f.path(), &self.compiler))
                    .map(|f| f as &dyn SourceFile)
                    .collect();

                tracing::debug!(
                    plugin = registration.plugin.name(),
                    files = matched.len(),
                    "Running plugin"
                );
                registration.plugin.compile(&matched, &self.compiler)
            })
            .collect();

        let mut document = Output::new();
        let mut owners: HashMap<String, &str> = HashMap::new();

        for (registration, result) in self.registrations.iter().zip(results) {
            let name = registration.plugin.name();
            let output = result.map_err(|source| AggregatorError::Plugin {
                plugin: name.to_owned(),
                source,
            })?;

            for (key, value) in output {
                if let Some(previous) = owners.insert(key.clone(), name) {
                    self.compiler.diagnostics().warn(Warning::new(
                        WarningKind::OutputKeyCollision,
                        format!("Output key `{key}` from plugin `{name}` replaces the value from `{previous}`"),
                    ));
                }
                document.insert(key, value);
            }
        }

        tracing::info!(
            plugins = self.registrations.len(),
            keys = document.len(),
            "Aggregation complete"
        );
        Ok(document)
    }
}

impl std::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("compiler", &self.compiler)
            .field(
                "registrations",
                &self
                    .registrations
                    .iter()
                    .map(|r| {
                        let patterns: Vec<&str> = r.patterns.iter().map(Pattern::as_str).collect();
                        (patterns, r.plugin.name())
                    })
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use tagdoc_compiler::{CollectingDiagnostics, Diagnostics};
    use tagdoc_source::MemoryFile;

    use super::*;

    /// Returns a fixed object after an optional delay.
    struct StaticPlugin {
        name: &'static str,
        output: Value,
        delay: Duration,
    }

    impl StaticPlugin {
        fn new(name: &'static str, output: Value) -> Self {
            Self {
                name,
                output,
                delay: Duration::ZERO,
            }
        }

        fn delayed(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    impl Plugin for StaticPlugin {
        fn name(&self) -> &str {
            self.name
        }

        fn compile(&self, _: &[&dyn SourceFile], _: &Compiler) -> Result<Output, PluginError> {
            thread::sleep(self.delay);
            Ok(self.output.as_object().cloned().unwrap_or_default())
        }
    }

    /// Records the paths it receives.
    struct RecordingPlugin(Arc<Mutex<Vec<String>>>);

    impl Plugin for RecordingPlugin {
        fn name(&self) -> &str {
            "recording"
        }

        fn compile(&self, files: &[&dyn SourceFile], compiler: &Compiler) -> Result<Output, PluginError> {
            let mut seen = self.0.lock().unwrap();
            seen.extend(files.iter().map(|f| compiler.relative_path(f.path())));
            Ok(Output::new())
        }
    }

    struct FailingPlugin;

    impl Plugin for FailingPlugin {
        fn name(&self) -> &str {
            "failing"
        }

        fn compile(&self, files: &[&dyn SourceFile], _: &Compiler) -> Result<Output, PluginError> {
            for file in files {
                file.read()?;
            }
            Ok(Output::new())
        }
    }

    fn compiler() -> (Compiler, Arc<CollectingDiagnostics>) {
        let diagnostics = Arc::new(CollectingDiagnostics::new());
        let compiler = Compiler::new("/project")
            .with_diagnostics(Arc::clone(&diagnostics) as Arc<dyn Diagnostics>);
        (compiler, diagnostics)
    }

    const NO_FILES: &[MemoryFile] = &[];

    #[test]
    fn test_disjoint_outputs_are_merged() {
        let (compiler, diagnostics) = compiler();
        let document = Aggregator::new(compiler)
            .register("**/*.md", StaticPlugin::new("a", json!({"pages": 1})))
            .unwrap()
            .register("**/*.css", StaticPlugin::new("b", json!({"styleguide": 2})))
            .unwrap()
            .run(NO_FILES)
            .unwrap();

        assert_eq!(Value::Object(document), json!({"pages": 1, "styleguide": 2}));
        assert!(diagnostics.warnings().is_empty());
    }

    #[test]
    fn test_collision_later_registration_wins_with_one_warning() {
        let (compiler, diagnostics) = compiler();
        let document = Aggregator::new(compiler)
            .register("*", StaticPlugin::new("first", json!({"shared": "X"})))
            .unwrap()
            .register("*", StaticPlugin::new("second", json!({"shared": "Y"})))
            .unwrap()
            .run(NO_FILES)
            .unwrap();

        assert_eq!(Value::Object(document), json!({"shared": "Y"}));
        assert_eq!(diagnostics.count(WarningKind::OutputKeyCollision), 1);
        let warnings = diagnostics.warnings();
        let message = &warnings[0].message;
        assert!(message.contains("`shared`"));
        assert!(message.contains("`second`"));
    }

    #[test]
    fn test_merge_follows_registration_not_completion_order() {
        let (compiler, _) = compiler();
        let document = Aggregator::new(compiler)
            .register(
                "*",
                StaticPlugin::new("slow", json!({"shared": "X"})).delayed(Duration::from_millis(50)),
            )
            .unwrap()
            .register("*", StaticPlugin::new("fast", json!({"shared": "Y"})))
            .unwrap()
            .run(NO_FILES)
            .unwrap();

        assert_eq!(document["shared"], json!("Y"));
    }

    #[test]
    fn test_files_routed_by_pattern() {
        let (compiler, _) = compiler();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let files = vec![
            MemoryFile::new("/project/docs/guide.md", ""),
            MemoryFile::new("/project/styles/button.css", ""),
            MemoryFile::new("/project/index.md", ""),
        ];

        Aggregator::new(compiler)
            .register("**/*.md", RecordingPlugin(Arc::clone(&seen)))
            .unwrap()
            .run(&files)
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["docs/guide.md", "index.md"]);
    }

    #[test]
    fn test_register_any_runs_plugin_once_with_union() {
        let (compiler, _) = compiler();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let files = vec![
            MemoryFile::new("/project/a.css", ""),
            MemoryFile::new("/project/b.scss", ""),
            MemoryFile::new("/project/c.md", ""),
        ];

        let aggregator = Aggregator::new(compiler)
            .register_any(&["**/*.css", "**/*.scss"], RecordingPlugin(Arc::clone(&seen)))
            .unwrap();
        aggregator.run(&files).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["a.css", "b.scss"]);
        assert_eq!(aggregator.plugin_names().count(), 1);
    }

    #[test]
    fn test_absolute_pattern_matches() {
        let (compiler, _) = compiler();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let files = vec![MemoryFile::new("/elsewhere/notes.md", "")];

        Aggregator::new(compiler)
            .register("/elsewhere/*.md", RecordingPlugin(Arc::clone(&seen)))
            .unwrap()
            .run(&files)
            .unwrap();

        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_plugin_failure_aborts_run() {
        let (compiler, _) = compiler();
        let files = vec![MemoryFile::missing("/project/a.md")];

        let err = Aggregator::new(compiler)
            .register("*", StaticPlugin::new("ok", json!({"a": 1})))
            .unwrap()
            .register("**/*.md", FailingPlugin)
            .unwrap()
            .run(&files)
            .unwrap_err();

        let AggregatorError::Plugin { plugin, source } = &err else {
            panic!("expected plugin error, got {err:?}");
        };
        assert_eq!(plugin, "failing");
        assert!(matches!(source, PluginError::Read(_)));
        assert!(err.to_string().starts_with("Plugin `failing` failed:"));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let (compiler, _) = compiler();
        let err = Aggregator::new(compiler)
            .register("[unclosed", FailingPlugin)
            .unwrap_err();

        assert!(matches!(err, AggregatorError::Pattern { ref pattern, .. } if pattern == "[unclosed"));
    }

    #[test]
    fn test_each_run_starts_empty() {
        let (compiler, diagnostics) = compiler();
        let aggregator = Aggregator::new(compiler)
            .register("*", StaticPlugin::new("a", json!({"k": 1})))
            .unwrap();

        aggregator.run(NO_FILES).unwrap();
        let second = aggregator.run(NO_FILES).unwrap();

        assert_eq!(Value::Object(second), json!({"k": 1}));
        assert!(diagnostics.warnings().is_empty());
        assert_eq!(aggregator.plugin_names().collect::<Vec<_>>(), vec!["a"]);
    }
}
