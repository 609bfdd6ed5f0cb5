use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum, ValueHint};
use rayon::prelude::*;
use walkdir::WalkDir;

use grade_smoother::csv_io::{read_trace_csv, write_profile_csv, write_summary_csv};
use grade_smoother::gpx_io::{load_gpx, write_smoothed_gpx};
use grade_smoother::{process_batch, GradeFit, GradeProfile, RawTrace, SmoothingConfig, SummaryRow};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum PresetOpt {
    Foot,
    Vehicle,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum FitOpt {
    LeastSquares,
    Endpoint,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Adaptive grade smoothing for GPX and CSV elevation traces",
    long_about = None
)]
struct Cli {
    /// A .gpx or .csv file, or a folder searched recursively for them.
    #[arg(required = true, value_hint = ValueHint::AnyPath)]
    input: PathBuf,

    #[arg(short, long, default_value = "smoothed", value_hint = ValueHint::DirPath)]
    output: PathBuf,

    #[arg(long, value_enum, default_value_t = PresetOpt::Foot)]
    preset: PresetOpt,

    #[arg(long)]
    noise_floor: Option<f64>,

    #[arg(long)]
    min_window_span: Option<f64>,

    #[arg(long)]
    max_grade: Option<f64>,

    #[arg(long)]
    gain_noise_floor: Option<f64>,

    #[arg(long, value_enum)]
    fit: Option<FitOpt>,

    /// Worker threads (defaults to the number of cores).
    #[arg(long)]
    threads: Option<usize>,

    /// Also write a copy of every GPX input with smoothed elevations.
    #[arg(long)]
    write_gpx: bool,
}

impl Cli {
    fn config(&self) -> SmoothingConfig {
        let mut config = match self.preset {
            PresetOpt::Foot => SmoothingConfig::foot(),
            PresetOpt::Vehicle => SmoothingConfig::vehicle(),
        };
        if let Some(v) = self.noise_floor {
            config.noise_floor = v;
        }
        if let Some(v) = self.min_window_span {
            config.min_window_span = v;
        }
        if let Some(v) = self.max_grade {
            config.max_grade = v;
        }
        if let Some(v) = self.gain_noise_floor {
            config.gain_noise_floor = v;
        }
        if let Some(fit) = self.fit {
            config.grade_fit = match fit {
                FitOpt::LeastSquares => GradeFit::LeastSquares,
                FitOpt::Endpoint => GradeFit::Endpoint,
            };
        }
        config
    }
}

fn is_trace_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| matches!(s.to_lowercase().as_str(), "gpx" | "csv"))
        .unwrap_or(false)
}

fn collect_inputs(input: &Path) -> Vec<PathBuf> {
    if input.is_file() {
        return vec![input.to_path_buf()];
    }
    let mut files: Vec<PathBuf> = WalkDir::new(input)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_trace_file(entry.path()))
        .map(|entry| entry.path().to_path_buf())
        .collect();
    files.sort();
    files
}

fn is_gpx(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.eq_ignore_ascii_case("gpx"))
        .unwrap_or(false)
}

/// Path of `path` below the input root, falling back to its file name.
fn relative_path(root: &Path, path: &Path) -> PathBuf {
    match path.strip_prefix(root) {
        Ok(relative) if !relative.as_os_str().is_empty() => relative.to_path_buf(),
        _ => path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| path.to_path_buf()),
    }
}

/// Trace name used in logs and `summary.csv`, e.g. `x/run.csv`.
fn trace_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// `<output>/<subdir>/<file name with dots as underscores>_<suffix>`. The
/// extension stays in the name so `a.gpx` and `a.csv` do not collide.
fn output_path(output_dir: &Path, relative: &Path, suffix: &str) -> PathBuf {
    let base = relative
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("trace")
        .replace('.', "_");
    let dir = match relative.parent() {
        Some(parent) => output_dir.join(parent),
        None => output_dir.to_path_buf(),
    };
    dir.join(format!("{}_{}", base, suffix))
}

struct Input {
    path: PathBuf,
    relative: PathBuf,
}

fn load_trace(input: &Input) -> grade_smoother::Result<RawTrace> {
    let mut trace = if is_gpx(&input.path) {
        load_gpx(&input.path)?
    } else {
        read_trace_csv(&input.path)?
    };
    trace.name = trace_name(&input.relative);
    Ok(trace)
}

fn write_outputs(
    input: &Input,
    profile: &GradeProfile,
    output_dir: &Path,
    write_gpx: bool,
) -> grade_smoother::Result<()> {
    let profile_path = output_path(output_dir, &input.relative, "profile.csv");
    if let Some(parent) = profile_path.parent() {
        create_dir_all(parent)?;
    }
    write_profile_csv(profile, &profile_path)?;

    if write_gpx && is_gpx(&input.path) {
        let gpx_path = output_path(output_dir, &input.relative, "smoothed.gpx");
        let points = write_smoothed_gpx(&input.path, profile, &gpx_path)?;
        log::debug!("rewrote {} points into {}", points, gpx_path.display());
    }
    Ok(())
}

fn print_summary(rows: &[SummaryRow]) {
    println!("\n📊 GRADE SMOOTHING SUMMARY");
    println!("==========================");
    println!(
        "{:<32} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "trace", "km", "raw +m", "raw -m", "+m", "-m"
    );
    for row in rows {
        println!(
            "{:<32} {:>9.2} {:>9.0} {:>9.0} {:>9.0} {:>9.0}",
            row.name, row.distance_km, row.raw_gain_m, row.raw_loss_m, row.gain_m, row.loss_m
        );
    }

    let clamped: usize = rows.iter().map(|r| r.clamped_windows).sum();
    if clamped > 0 {
        println!("⚠️  {} windows hit the grade ceiling", clamped);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    config.validate()?;

    let threads = cli.threads.unwrap_or_else(num_cpus::get).max(1);
    rayon::ThreadPoolBuilder::new().num_threads(threads).build_global()?;

    let root = if cli.input.is_file() {
        cli.input.parent().unwrap_or_else(|| Path::new("")).to_path_buf()
    } else {
        cli.input.clone()
    };
    let inputs: Vec<Input> = collect_inputs(&cli.input)
        .into_iter()
        .map(|path| Input {
            relative: relative_path(&root, &path),
            path,
        })
        .collect();
    if inputs.is_empty() {
        log::warn!("no .gpx or .csv files found under {}", cli.input.display());
        return Ok(());
    }

    create_dir_all(&cli.output)?;
    log::info!(
        "processing {} traces on {} threads (noise floor {} m, min span {} m, max grade {})",
        inputs.len(),
        threads,
        config.noise_floor,
        config.min_window_span,
        config.max_grade
    );

    let start_time = std::time::Instant::now();
    let loaded: Vec<(&Input, grade_smoother::Result<RawTrace>)> = inputs
        .par_iter()
        .map(|input| (input, load_trace(input)))
        .collect();

    let mut sources = Vec::with_capacity(loaded.len());
    let mut traces = Vec::with_capacity(loaded.len());
    for (input, result) in loaded {
        match result {
            Ok(trace) => {
                sources.push(input);
                traces.push(trace);
            }
            Err(e) => log::error!("failed to load {}: {}", input.path.display(), e),
        }
    }

    let outcomes = process_batch(&traces, &config);

    let written: Vec<Option<SummaryRow>> = sources
        .par_iter()
        .zip(outcomes.par_iter())
        .map(|(input, outcome)| {
            let profile = match &outcome.result {
                Ok(profile) => profile,
                Err(e) => {
                    log::error!("failed to smooth {}: {}", outcome.name, e);
                    return None;
                }
            };
            match write_outputs(input, profile, &cli.output, cli.write_gpx) {
                Ok(()) => Some(SummaryRow::from_profile(&outcome.name, profile)),
                Err(e) => {
                    log::error!("failed to write outputs for {}: {}", outcome.name, e);
                    None
                }
            }
        })
        .collect();
    let rows: Vec<SummaryRow> = written.into_iter().flatten().collect();

    let summary_path = cli.output.join("summary.csv");
    write_summary_csv(&rows, &summary_path)?;

    log::info!(
        "processed {} of {} traces in {:.2}s, summary at {}",
        rows.len(),
        inputs.len(),
        start_time.elapsed().as_secs_f64(),
        summary_path.display()
    );
    print_summary(&rows);

    Ok(())
}
