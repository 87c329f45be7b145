use crate::{
    chapters, extract, figures,
    config::Config,
    translate::TexTranslatePipeline,
    translator::{GoogleTranslator, Identity, Translator},
    util::ensure_dir,
};
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "bukutex")]
#[command(about = "Authoring toolkit for the genetic-algorithms textbook (extraction + figures + translation)")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./bukutex.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract text and embedded images from the textbook source PDF.
    Extract {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Map extracted pages and images to chapters.
    Analyze {
        /// Extracted content file; defaults to the extract output location.
        #[arg(long)]
        content: Option<PathBuf>,
        #[arg(long)]
        images_dir: Option<PathBuf>,
    },
    /// Render the crossover-operator figures.
    Figure {
        #[arg(long, value_enum, default_value_t = Which::All)]
        which: Which,
    },
    /// Machine-translate LaTeX chapter files in place, preserving markup.
    Translate {
        /// Directory of .tex files; defaults to paths.tex_dir.
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Run the whole transducer without calling the API or writing files.
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Which {
    Pmx,
    Cycle,
    All,
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg_path = resolve_config_path(args.config.as_deref())?;
    let cfg = Config::load(&cfg_path)?;
    let _guard = init_logging(&args, &cfg, resolve_log_path(&cfg).as_deref())?;

    match &args.cmd {
        Command::Extract { input, out_dir } => {
            let out_dir = out_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(&cfg.paths.out_dir));
            let report = extract::extract_pdf(&cfg, input, &out_dir)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::Analyze { content, images_dir } => {
            let content = content
                .clone()
                .unwrap_or_else(|| PathBuf::from(&cfg.paths.out_dir).join(&cfg.extract.content_filename));
            let images_dir = images_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(&cfg.paths.out_dir).join(&cfg.paths.images_subdir));
            let map = chapters::analyze(&cfg, &content, &images_dir)?;

            let mapping_path =
                PathBuf::from(&cfg.paths.out_dir).join(&cfg.chapters.mapping_filename);
            if let Some(parent) = mapping_path.parent() {
                ensure_dir(parent)?;
            }
            std::fs::write(&mapping_path, map.summary())
                .with_context(|| format!("writing {}", mapping_path.display()))?;
            info!("wrote {}", mapping_path.display());
            print!("{}", map.summary());
            Ok(())
        }
        Command::Figure { which } => match which {
            Which::Pmx => figures::render_pmx(&cfg),
            Which::Cycle => figures::render_cycle(&cfg),
            Which::All => figures::render_all(&cfg),
        },
        Command::Translate { dir, dry_run } => {
            let dir = dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(&cfg.paths.tex_dir));

            let google;
            let identity;
            let translator: &dyn Translator = if *dry_run {
                identity = Identity;
                &identity
            } else {
                google = GoogleTranslator::new(&cfg)?;
                &google
            };

            let pipeline = TexTranslatePipeline::new(&cfg, translator, *dry_run);
            let report = pipeline.run(&dir)?;
            info!(
                "translated {} files: {} units translated, {} kept untranslated",
                report.files.len(),
                report.translated_units(),
                report.kept_units()
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}

fn resolve_config_path(user: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = user {
        return Ok(p.to_path_buf());
    }
    let default = PathBuf::from("bukutex.toml");
    if default.exists() {
        Ok(default)
    } else {
        Ok(PathBuf::from("bukutex.example.toml"))
    }
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stdout_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }
    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }
    Some(PathBuf::from(&cfg.paths.out_dir).join("bukutex.log"))
}
