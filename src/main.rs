use anyhow::Context;
use bundlescope::export::{self, ExportData, ExportFormat};
use bundlescope::{Analyzer, AnalyzerOptions, ExcludeAssets};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bundlescope")]
#[command(author = "Zachary Woods <143150513+zach-fau@users.noreply.github.com>")]
#[command(version)]
#[command(about = "Webpack stats analyzer producing treemap-ready bundle size breakdowns", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a webpack stats.json file
    Analyze {
        /// Path to the stats file
        stats: PathBuf,

        /// Directory containing the emitted bundles (enables parsed and gzip sizes)
        #[arg(short, long)]
        bundle_dir: Option<PathBuf>,

        /// Regular expression of asset names to exclude (repeatable)
        #[arg(short, long = "exclude", value_name = "PATTERN")]
        exclude: Vec<String>,

        /// Output format: json or markdown
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fail when an asset references a chunk missing from the stats
        #[arg(long)]
        strict_chunks: bool,

        /// Seconds to wait for bundle parsing before giving up
        #[arg(long, default_value_t = 30)]
        parse_timeout: u64,
    },
    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Analyze {
            stats,
            bundle_dir,
            exclude,
            format,
            output,
            strict_chunks,
            parse_timeout,
        }) => {
            let mut options = AnalyzerOptions::new()
                .exclude_assets(ExcludeAssets::from_patterns(&exclude)?)
                .parse_timeout(Duration::from_secs(parse_timeout))
                .strict_chunks(strict_chunks);
            if let Some(dir) = bundle_dir {
                options = options.bundle_dir(dir);
            }

            let analysis = Analyzer::new(options)
                .analyze_file(&stats)
                .with_context(|| format!("Failed to analyze {}", stats.display()))?;
            tracing::info!(
                "Analyzed {} assets from {}",
                analysis.assets.len(),
                stats.display()
            );

            let data = ExportData::new(stats.display().to_string(), &analysis);
            match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    let mut writer = BufWriter::new(file);
                    export::export(format, &data, &mut writer)?;
                    writer.flush()?;
                }
                None => {
                    let stdout = io::stdout();
                    let mut writer = stdout.lock();
                    export::export(format, &data, &mut writer)?;
                }
            }
        }
        Some(Commands::Version) => {
            println!("bundlescope v{}", env!("CARGO_PKG_VERSION"));
        }
        None => {
            println!("BundleScope - webpack bundle size analyzer");
            println!("Run 'bundlescope analyze <stats.json>' to analyze a build");
            println!("Run 'bundlescope --help' for more information");
        }
    }

    Ok(())
}
