//! `tagdoc build` command implementation.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use tagdoc_aggregator::{Aggregator, Output as Document};
use tagdoc_compiler::{Compiler, MarkdownOptions};
use tagdoc_config::{CliSettings, Config};
use tagdoc_plugins::{HttpRegistry, PackagesPlugin, PagesPlugin, StyleGuidePlugin};
use tagdoc_source::collect_files;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Glob patterns selecting input files (overrides config).
    patterns: Vec<String>,

    /// Path to configuration file (default: auto-discover tagdoc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Project root directory (overrides config).
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Disable the pages plugin.
    #[arg(long)]
    no_pages: bool,

    /// Disable the style guide plugin.
    #[arg(long)]
    no_styleguide: bool,

    /// Disable the packages plugin.
    #[arg(long)]
    no_packages: bool,

    /// Package registry URL for version lookups (overrides config).
    #[arg(long, env = "TAGDOC_REGISTRY_URL")]
    registry_url: Option<String>,

    /// Print single-line JSON.
    #[arg(long)]
    compact: bool,

    /// Enable verbose output (show progress logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, a file cannot be read or a
    /// plugin fails.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let verbose = self.verbose;
        let compact = self.compact;
        let config_path = self.config.clone();
        let cli_settings = self.into_cli_settings();

        let config = Config::load(config_path.as_deref(), Some(&cli_settings))?;
        let (document, file_count) = build_document(&config)?;

        write_document(&document, compact, io::stdout().lock())?;

        if verbose {
            output.success(&format!(
                "Compiled {file_count} files into {} top-level keys",
                document.len()
            ));
        }
        Ok(())
    }

    fn into_cli_settings(self) -> CliSettings {
        CliSettings {
            root_dir: self.root,
            patterns: (!self.patterns.is_empty()).then_some(self.patterns),
            pages_enabled: self.no_pages.then_some(false),
            styleguide_enabled: self.no_styleguide.then_some(false),
            packages_enabled: self.no_packages.then_some(false),
            registry_url: self.registry_url,
        }
    }
}

/// Register the enabled plugins in a fixed order: pages, style guide,
/// packages.
fn build_aggregator(config: &Config, compiler: Compiler) -> Result<Aggregator, CliError> {
    let mut aggregator = Aggregator::new(compiler);

    if config.pages.enabled {
        let plugin = PagesPlugin::default()
            .with_nav_root(config.pages.nav_root.clone())
            .with_reserved(config.pages.reserved.clone());
        aggregator = aggregator.register(&config.pages.pattern, plugin)?;
    }

    if config.styleguide.enabled {
        let mut plugin = StyleGuidePlugin::default();
        if let Some(reserved) = &config.styleguide.reserved {
            plugin = plugin.with_reserved(reserved.clone());
        }
        aggregator = aggregator.register_any(config.styleguide.patterns.as_slice(), plugin)?;
    }

    if config.packages.enabled {
        let mut plugin = PackagesPlugin::new();
        if let Some(url) = &config.packages.registry_url {
            let timeout = Duration::from_secs(config.packages.timeout_secs);
            plugin = plugin.with_registry(Arc::new(HttpRegistry::new(url, timeout)));
        }
        aggregator = aggregator.register(&config.packages.pattern, plugin)?;
    }

    Ok(aggregator)
}

/// Collect the configured files and run every enabled plugin.
///
/// Returns the document and the number of input files.
fn build_document(config: &Config) -> Result<(Document, usize), CliError> {
    let root = std::path::absolute(&config.source_resolved.root_dir)?;
    let files = collect_files(&root, &config.source_resolved.patterns)?;
    tracing::info!(root = %root.display(), files = files.len(), "Collected source files");

    let compiler = Compiler::new(root).with_markdown_options(MarkdownOptions {
        gfm: config.markdown.gfm,
        smart_punctuation: config.markdown.smart_punctuation,
    });
    let aggregator = build_aggregator(config, compiler)?;
    let document = aggregator.run(&files)?;

    Ok((document, files.len()))
}

fn write_document(document: &Document, compact: bool, mut out: impl Write) -> Result<(), CliError> {
    if compact {
        serde_json::to_writer(&mut out, document)?;
    } else {
        serde_json::to_writer_pretty(&mut out, document)?;
    }
    writeln!(out)?;
    Ok(())
}
