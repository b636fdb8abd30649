use clap::{Parser, Subcommand};
use dv_photo::compliance::{self, ComplianceCheck};
use dv_photo::config::{self, ExportConfig};
use dv_photo::imaging::{self, CropRect, CropSelection, RustBackend};
use dv_photo::output;
use dv_photo::types::{ExportSummary, FileMeta, Report};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "dv-photo")]
#[command(about = "Crop a photo to a DV lottery compliant 600×600 JPEG")]
#[command(long_about = "\
Crop a photo to a DV lottery compliant 600×600 JPEG

The photo is decoded, cropped to a square, resampled to exactly 600×600
pixels, and encoded as JPEG. Quality starts at 0.92 and steps down by 0.07
(never below 0.5) until the file fits in 240KB. If it never fits, the last
attempt is still written and the size check fails; try a tighter crop.

Crop selection:
  --crop X,Y,W,H    Explicit rectangle in source pixels (clamped to the image)
  --zoom Z          Otherwise, the largest centered square shrunk by Z

Configuration is read from ./dv-photo.toml when present, or from --config.
Run 'dv-photo gen-config' to print a documented config file.

Set RUST_LOG=debug to trace each encode attempt.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./dv-photo.toml if it exists)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print a JSON report instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Crop, resample, and encode a photo into the output directory
    Export(ExportArgs),
    /// Run the compliance checklist on a photo without exporting
    Check {
        /// Photo to check
        input: PathBuf,
    },
    /// Print a stock dv-photo.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct ExportArgs {
    /// Photo to export
    input: PathBuf,

    /// Crop rectangle in source pixels; overrides --zoom
    #[arg(long, value_name = "X,Y,W,H")]
    crop: Option<CropRect>,

    /// Zoom for the default centered square crop (1.0 = largest square)
    #[arg(long, default_value_t = 1.4)]
    zoom: f64,

    /// Output directory
    #[arg(long, short, default_value = ".")]
    output: PathBuf,

    /// Exit with an error when the export misses the byte budget
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Export(args) => {
            let config = resolve_config(cli.config.as_deref())?;
            run_export(&config, &args, cli.json)?;
        }
        Command::Check { input } => {
            let config = resolve_config(cli.config.as_deref())?;
            run_check(&config, &input, cli.json)?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Explicit `--config` must exist; otherwise fall back to the working directory.
fn resolve_config(path: Option<&Path>) -> Result<ExportConfig, config::ConfigError> {
    match path {
        Some(path) => config::load_config_file(path),
        None => config::load_config(Path::new(".")),
    }
}

fn run_export(
    config: &ExportConfig,
    args: &ExportArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = std::fs::read(&args.input)?;
    let file = FileMeta::from_bytes(&args.input, &bytes);

    let selection = match args.crop {
        Some(crop) => CropSelection::Rect(crop),
        None => CropSelection::Centered { zoom: args.zoom },
    };
    let export = imaging::export(
        &RustBackend::new(),
        &bytes,
        selection,
        config.output.size,
        &config.encode_config(),
    )?;

    std::fs::create_dir_all(&args.output)?;
    let path = args.output.join(config.output_file_name());
    std::fs::write(&path, export.encoded.bytes())?;
    log::info!("wrote {}", path.display());

    let summary = ExportSummary::new(&export, &path);
    let checks = compliance::evaluate(
        config,
        Some(&file),
        Some(export.source),
        Some(&export.encoded),
    );

    if json {
        print_report(Report {
            file,
            source: Some(export.source),
            export: Some(summary),
            checks,
        })?;
    } else {
        output::print_export_output(&file, export.source, &summary);
        println!();
        output::print_guides(config.output.size);
        println!();
        output::print_checks(config, &checks);
    }

    if args.strict && !export.budget_met {
        return Err(format!(
            "export is {}KB, over the {}KB budget",
            compliance::bytes_to_kb(export.encoded.len() as u64),
            compliance::bytes_to_kb(config.output.max_bytes as u64)
        )
        .into());
    }
    Ok(())
}

fn run_check(
    config: &ExportConfig,
    input: &Path,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = std::fs::read(input)?;
    let file = FileMeta::from_bytes(input, &bytes);

    let decoded = imaging::load(&RustBackend::new(), &bytes);
    let source = decoded.as_ref().ok().map(|surface| surface.dimensions());
    let checks = compliance::evaluate(config, Some(&file), source, None);

    if json {
        print_report(Report {
            file,
            source,
            export: None,
            checks,
        })?;
    } else {
        print_check_output(config, &checks);
    }

    decoded?;
    Ok(())
}

fn print_check_output(config: &ExportConfig, checks: &[ComplianceCheck]) {
    output::print_guides(config.output.size);
    println!();
    output::print_checks(config, checks);
}

fn print_report(report: Report) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
