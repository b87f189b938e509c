use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use clap::Parser;
use env_logger::Builder;
use glob::glob;
use log::LevelFilter;
use rayon::iter::{IntoParallelIterator as _, ParallelIterator as _};
use serde::Serialize;
use thiserror::Error;

use pcd_core::{Placement, ScenePayload, ViewerConfig};
use pcd_parser::{Parser as _, ParseError, SceneDirParser};
use pcd_viewer::{BatchRunner, Runner as _, SceneAssemblerBuilder, SceneInput};

#[derive(Parser, Debug)]
#[command(
    name = "viewer-prep",
    about = "Prepares labeled LiDAR scenes for an interactive 3D viewer",
    version
)]
struct Cli {
    /// Scene directories, glob patterns allowed
    #[arg(short, long, required = true, num_args = 1.., value_name = "DIR")]
    input: Vec<String>,

    #[arg(short, long, required = true, value_name = "DIR")]
    output: PathBuf,

    /// JSON file overriding the default tuning constants
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long)]
    no_scale_figure: bool,

    /// Skip the planarity alpha channel
    #[arg(long)]
    no_planarity: bool,

    /// Drop context points that duplicate a labeled point
    #[arg(long)]
    dedupe_context: bool,

    /// Worker threads, defaults to the number of CPUs
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

#[derive(Debug, Error)]
enum AppError {
    #[error("invalid glob pattern '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("no scene directories matched the input")]
    NoInput,

    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Serialize)]
struct SceneSummary {
    id: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    camera: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scale_figure: Option<&'static str>,
}

impl SceneSummary {
    fn failed(id: String, error: impl ToString) -> Self {
        Self {
            id,
            status: "failed",
            output: None,
            error: Some(error.to_string()),
            camera: None,
            scale_figure: None,
        }
    }
}

fn placement_status<T>(placement: &Placement<T>) -> &'static str {
    match placement {
        Placement::NotRequested => "not_requested",
        Placement::Placed(_) => "placed",
        Placement::Unavailable { .. } => "unavailable",
    }
}

fn init_logger(level: LevelFilter) {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, level)
        .parse_env("RUST_LOG")
        .init();
}

fn expand_globs(input_patterns: &[String]) -> Result<Vec<PathBuf>, AppError> {
    let mut paths = Vec::new();
    for pattern in input_patterns {
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let entries = glob(pattern).map_err(|source| AppError::Glob {
                pattern: pattern.clone(),
                source,
            })?;
            for entry in entries {
                match entry {
                    Ok(path) if path.is_dir() => paths.push(path),
                    Ok(path) => log::debug!("skipping non-directory {:?}", path),
                    Err(e) => log::warn!("unreadable glob entry: {}", e),
                }
            }
        } else {
            paths.push(PathBuf::from(pattern));
        }
    }
    paths.sort();
    paths.dedup();
    Ok(paths)
}

fn load_config(path: Option<&Path>) -> Result<ViewerConfig, AppError> {
    let Some(path) = path else {
        return Ok(ViewerConfig::default());
    };
    let text = fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| AppError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes through a temporary file in the same directory so a reader never
/// sees a partial payload.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let write_error = |source| AppError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_error)?;

    let mut writer = BufWriter::new(tmp.as_file());
    serde_json::to_writer(&mut writer, value).map_err(|source| AppError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(write_error)?;
    drop(writer);

    tmp.persist(path).map_err(|e| write_error(e.error))?;
    Ok(())
}

fn write_payload(output_dir: &Path, id: &str, payload: &ScenePayload) -> Result<PathBuf, AppError> {
    let path = output_dir.join(format!("{}.json", id));
    write_json(&path, payload)?;
    Ok(path)
}

fn run(args: Cli) -> Result<(), AppError> {
    let threads = args.threads.unwrap_or_else(num_cpus::get).max(1);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()?;
    log::info!("worker threads: {}", threads);

    let config = load_config(args.config.as_deref())?;
    let scene_dirs = expand_globs(&args.input)?;
    if scene_dirs.is_empty() {
        return Err(AppError::NoInput);
    }
    log::info!("scene directories: {:?}", scene_dirs);
    log::info!("output folder: {:?}", args.output);
    fs::create_dir_all(&args.output).map_err(|source| AppError::Write {
        path: args.output.clone(),
        source,
    })?;

    log::info!("start parsing...");
    let start_local = std::time::Instant::now();
    let parsed: Vec<(PathBuf, Result<_, ParseError>)> = scene_dirs
        .into_par_iter()
        .map(|dir| {
            let result = SceneDirParser::new(&dir).parse();
            (dir, result)
        })
        .collect();
    log::info!("finish parsing in {:?}", start_local.elapsed());

    let mut summaries = Vec::new();
    let mut inputs = Vec::new();
    for (dir, result) in parsed {
        match result {
            Ok(bundle) => {
                let sets = if args.dedupe_context {
                    bundle.sets.dedupe_context()
                } else {
                    bundle.sets
                };
                inputs.push(SceneInput {
                    id: bundle.id,
                    sets,
                    center: bundle.center,
                    metadata: bundle.metadata,
                    include_scale_figure: !args.no_scale_figure,
                });
            }
            Err(e) => {
                log::error!("failed to load {:?}: {}", dir, e);
                summaries.push(SceneSummary::failed(dir.display().to_string(), e));
            }
        }
    }

    let mut builder = SceneAssemblerBuilder::new().config(config);
    if args.no_planarity {
        builder = builder.without_planarity();
    }
    let runner = BatchRunner::new(builder.build());

    log::info!("start assembling {} scenes...", inputs.len());
    let start_local = std::time::Instant::now();
    let outputs = runner.execute(inputs);
    log::info!("finish assembling in {:?}", start_local.elapsed());

    for output in outputs {
        let payload = match output.result {
            Ok(payload) => payload,
            Err(e) => {
                summaries.push(SceneSummary::failed(output.id, e));
                continue;
            }
        };
        match write_payload(&args.output, &output.id, &payload) {
            Ok(path) => summaries.push(SceneSummary {
                id: output.id,
                status: "ok",
                output: Some(path),
                error: None,
                camera: Some(placement_status(&payload.camera)),
                scale_figure: Some(placement_status(&payload.scale_figure)),
            }),
            Err(e) => {
                log::error!("{}", e);
                summaries.push(SceneSummary::failed(output.id, e));
            }
        }
    }

    let summary_path = args.output.join("summary.json");
    write_json(&summary_path, &summaries)?;
    log::info!("write summary: {:?}", summary_path);

    let failed = summaries.iter().filter(|s| s.status == "failed").count();
    if failed > 0 {
        log::warn!("{} of {} scenes failed", failed, summaries.len());
    }
    Ok(())
}

fn main() {
    let args = Cli::parse();
    init_logger(args.log_level);

    let start = std::time::Instant::now();
    log::info!("start processing...");
    if let Err(e) = run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
    log::info!("Elapsed: {:?}", start.elapsed());
    log::info!("Finish processing");
}
