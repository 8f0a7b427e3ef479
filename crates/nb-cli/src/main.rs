//! CLI entry point for the nbayes text classification service.
//!
//! A thin adapter over [`nb_registry::ModelRegistry`]: every subcommand builds
//! an [`Observation`] or [`Model`] from its arguments, calls one registry
//! operation and prints the JSON result on stdout.
//!
//! # Usage
//!
//! ```bash
//! nbayes [OPTIONS] <COMMAND>
//!
//! # Create an empty model
//! nbayes create demo
//!
//! # Train it
//! nbayes train demo --classes China --text "Chinese Beijing Chinese"
//!
//! # Predict
//! nbayes predict demo --text "Chinese Chinese Tokyo" --best
//!
//! # List every stored model
//! nbayes list --all
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use nb_core::{Config, Model, Observation, persist};
use nb_registry::ModelRegistry;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Train named Naive Bayes text classifiers and query them.
#[derive(Debug, Parser)]
#[command(name = "nbayes", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// Directory holding one `<name>.json` file per model.
    ///
    /// Overrides `store.model_dir` from the configuration file.
    #[arg(short = 'd', long, global = true, env = "NBAYES_MODEL_DIR")]
    model_dir: Option<Utf8PathBuf>,

    /// JSON configuration file.
    #[arg(short, long, global = true, env = "NBAYES_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Store model files as indented JSON.
    #[arg(long, global = true)]
    pretty: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Create a model, empty or from a JSON payload.
    Create {
        /// Model name.
        name: String,

        /// Initialize from a model JSON file instead of an empty model.
        #[arg(long)]
        from: Option<Utf8PathBuf>,

        /// Replace an existing model of the same name.
        #[arg(long)]
        overwrite: bool,
    },

    /// List models.
    List {
        /// Load every stored model, not only those already in memory.
        #[arg(long)]
        all: bool,
    },

    /// Print one model.
    View {
        /// Model name.
        name: String,
    },

    /// Train a model with one labeled observation.
    Train {
        /// Model name.
        name: String,

        /// Comma-separated class labels.
        #[arg(short = 'l', long, value_delimiter = ',', required = true)]
        classes: Vec<String>,

        /// Observation text.
        #[arg(short, long)]
        text: String,
    },

    /// Score every class of a model for a piece of text.
    Predict {
        /// Model name.
        name: String,

        /// Text to classify.
        #[arg(short, long)]
        text: String,

        /// Print only the best-fitting class and its score.
        #[arg(long)]
        best: bool,

        /// Divide scores by their sum.
        #[arg(long)]
        normalize: bool,
    },

    /// Delete a model from memory and storage.
    Remove {
        /// Model name.
        name: String,
    },
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects `RUST_LOG` if set. Otherwise uses `debug` with `--verbose` and
/// `info` by default. Logs go to stderr so stdout stays valid JSON.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(level)
    });

    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(use_ansi)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Builds a [`Config`] from the optional configuration file and CLI overrides.
fn build_config(cli: &Cli) -> color_eyre::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    if let Some(dir) = &cli.model_dir {
        config.store.model_dir.clone_from(dir);
    }
    if cli.pretty {
        config.store.pretty = true;
    }

    config.validate()?;
    Ok(config)
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Runs one subcommand against `registry`, writing JSON output to `out`.
fn execute(
    command: &Commands,
    registry: &ModelRegistry,
    out: &mut impl Write,
) -> color_eyre::Result<()> {
    match command {
        Commands::Create {
            name,
            from,
            overwrite,
        } => {
            let model = match from {
                Some(path) => load_payload(name, path)?,
                None => Model::new(name.as_str()),
            };
            let created = registry.create(model, *overwrite)?;
            write_json(out, &*created)
        }
        Commands::List { all } => {
            let models = registry.list(*all)?;
            let models: Vec<&Model> = models.iter().map(AsRef::as_ref).collect();
            write_json(out, &models)
        }
        Commands::View { name } => {
            let model = registry.get(name)?;
            write_json(out, &*model)
        }
        Commands::Train {
            name,
            classes,
            text,
        } => {
            let observation = Observation::from_text(classes.iter().map(String::as_str), text);
            let model = registry.train(name, &observation)?;
            write_json(out, &*model)
        }
        Commands::Predict {
            name,
            text,
            best,
            normalize,
        } => {
            let observation = Observation::unlabeled(text);
            let mut prediction = registry.predict(name, &observation)?;
            if *normalize {
                prediction = prediction.normalized();
            }
            if *best {
                write_json(out, &prediction.best_fit().unwrap_or_default())
            } else {
                write_json(out, &prediction)
            }
        }
        Commands::Remove { name } => {
            registry.remove(name)?;
            write_json(out, &serde_json::json!({ "removed": name }))
        }
    }
}

/// Reads a model payload and checks it carries the requested name.
fn load_payload(name: &str, path: &Utf8Path) -> color_eyre::Result<Model> {
    let model: Model = persist::load(path)?;
    if model.name() != name {
        return Err(color_eyre::eyre::eyre!(
            "payload {path} describes model '{}', expected '{name}'",
            model.name()
        ));
    }
    debug!(path = %path, model = %name, "Loaded model payload");
    Ok(model)
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

fn write_json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> color_eyre::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing
    init_tracing(cli.verbose, cli.no_color);

    // 4. Open the registry
    let config = build_config(&cli)?;
    info!(model_dir = %config.store.model_dir, "Opening model store");
    let registry = ModelRegistry::open(&config.store)?;

    // 5. Route to the command
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    execute(&cli.command, &registry, &mut handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nb_core::StoreConfig;

    fn open_temp() -> (tempfile::TempDir, ModelRegistry) {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let registry = ModelRegistry::open(&StoreConfig::new(path)).unwrap();
        (dir, registry)
    }

    fn run(registry: &ModelRegistry, args: &[&str]) -> color_eyre::Result<serde_json::Value> {
        let cli = Cli::try_parse_from(std::iter::once("nbayes").chain(args.iter().copied()))?;
        let mut out = Vec::new();
        execute(&cli.command, registry, &mut out)?;
        Ok(serde_json::from_slice(&out)?)
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_train_parses_comma_separated_classes() {
        let cli = Cli::try_parse_from(["nbayes", "train", "demo", "-l", "a,b", "-t", "x y"]).unwrap();
        let Commands::Train { classes, text, .. } = cli.command else {
            unreachable!("expected the train command");
        };
        assert_eq!(classes, vec!["a", "b"]);
        assert_eq!(text, "x y");
    }

    #[test]
    fn test_build_config_overrides() {
        let cli = Cli::try_parse_from(["nbayes", "--model-dir", "/tmp/models", "--pretty", "list"])
            .unwrap();
        let config = build_config(&cli).unwrap();
        assert_eq!(config.store.model_dir, Utf8PathBuf::from("/tmp/models"));
        assert!(config.store.pretty);
    }

    #[test]
    fn test_full_workflow() {
        let (_dir, registry) = open_temp();

        let created = run(&registry, &["create", "demo"]).unwrap();
        assert_eq!(created["name"], "demo");
        assert_eq!(created["observationCount"], 0);

        for (class, text) in [
            ("China", "Chinese Beijing Chinese"),
            ("China", "Chinese Chinese Shanghai"),
            ("China", "Chinese Macao"),
            ("NotChina", "Tokyo Japan Chinese"),
        ] {
            run(&registry, &["train", "demo", "--classes", class, "--text", text]).unwrap();
        }

        let viewed = run(&registry, &["view", "demo"]).unwrap();
        assert_eq!(viewed["observationCount"], 4);
        assert_eq!(viewed["classes"]["China"]["totalCount"], 8);

        let scores = run(
            &registry,
            &["predict", "demo", "--text", "Chinese Chinese Chinese Tokyo Japan"],
        )
        .unwrap();
        let china = scores["China"].as_f64().unwrap();
        assert!((china - 0.000_301_213_78).abs() < 1e-10);

        let best = run(
            &registry,
            &["predict", "demo", "--text", "Chinese Chinese Chinese Tokyo Japan", "--best"],
        )
        .unwrap();
        assert_eq!(best["class"], "China");

        let listed = run(&registry, &["list"]).unwrap();
        assert_eq!(listed.as_array().unwrap().len(), 1);

        run(&registry, &["remove", "demo"]).unwrap();
        assert!(run(&registry, &["view", "demo"]).is_err());
    }

    #[test]
    fn test_create_twice_conflicts() {
        let (_dir, registry) = open_temp();
        run(&registry, &["create", "dup"]).unwrap();

        let err = run(&registry, &["create", "dup"]).unwrap_err();
        let registry_err = err.downcast_ref::<nb_registry::RegistryError>().unwrap();
        assert!(registry_err.is_conflict());

        run(&registry, &["create", "dup", "--overwrite"]).unwrap();
    }

    #[test]
    fn test_create_from_payload() {
        let (dir, registry) = open_temp();
        let mut model = Model::new("seeded");
        model.train(&Observation::from_text(["a"], "hello"));
        let payload = Utf8PathBuf::from_path_buf(dir.path().join("payload.json.in")).unwrap();
        persist::save(&payload, &model).unwrap();

        let created = run(&registry, &["create", "seeded", "--from", payload.as_str()]).unwrap();
        assert_eq!(created["observationCount"], 1);

        assert!(run(&registry, &["create", "other", "--from", payload.as_str()]).is_err());
    }

    #[test]
    fn test_predict_empty_model_best_is_sentinel() {
        let (_dir, registry) = open_temp();
        run(&registry, &["create", "blank"]).unwrap();
        let mut unlabeled = Model::new("blank");
        unlabeled.train(&Observation::unlabeled("no labels"));
        registry.create(unlabeled, true).unwrap();

        let best = run(&registry, &["predict", "blank", "--text", "x", "--best"]).unwrap();
        assert_eq!(best["class"], "");
        assert_eq!(best["score"], 0.0);
    }
}
