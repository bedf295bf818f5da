//! SqText CLI binary.
//!
//! # Commands
//!
//! - `compress` - Compress text into one of the SqText formats
//! - `decompress` - Restore text from any supported format
//! - `detect` - Report which format a text is in
//! - `select` - Show the algorithm the selector would pick

use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;
use sqtext::{
    codec::{is_chat_envelope, is_neuro_json, ultra_compact_version},
    history::{timed, MemoryHistory, OperationKind, OperationRecorder},
    Algorithm, CompressionEngine, Config, FormatTag, VERSION,
};

#[derive(Parser)]
#[command(name = "sqtext")]
#[command(version = VERSION)]
#[command(about = "SqText - text compression formats for chats and LLMs", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/sqtext/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress text
    Compress {
        /// Text input (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (raw, v1, v2, neuro, chat, plain)
        #[arg(long)]
        format: Option<FormatTag>,

        /// Compression algorithm (gzip, zstd, brotli, auto)
        #[arg(short, long, default_value = "auto")]
        algorithm: String,

        /// Recursion depth for raw and neuro formats
        #[arg(short, long)]
        depth: Option<u32>,

        /// Show compression statistics
        #[arg(short, long)]
        stats: bool,
    },

    /// Decompress any supported format
    Decompress {
        /// Compressed input (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Peel exactly this many raw codec layers instead of detecting
        #[arg(short, long)]
        depth: Option<u32>,
    },

    /// Detect the format of a text
    Detect {
        /// Text input (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the algorithm selected for a text
    Select {
        /// Text input (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let config = Config::load(cli.config.as_deref())?;
    let engine = CompressionEngine::from_config(&config.engine);

    match cli.command {
        Commands::Compress {
            input,
            file,
            output,
            format,
            algorithm,
            depth,
            stats,
        } => {
            let format = format.unwrap_or(config.engine.default_format);
            let depth = depth.unwrap_or(config.engine.default_depth);
            cmd_compress(&engine, &config, input, file, output, format, &algorithm, depth, stats)
        },

        Commands::Decompress {
            input,
            file,
            output,
            depth,
        } => cmd_decompress(&engine, input, file, output, depth),

        Commands::Detect { input, file, json } => cmd_detect(&engine, input, file, json),

        Commands::Select { input, file } => cmd_select(&engine, input, file),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_compress(
    engine: &CompressionEngine,
    config: &Config,
    input: Option<String>,
    file: Option<PathBuf>,
    output: Option<PathBuf>,
    format: FormatTag,
    algorithm: &str,
    depth: u32,
    stats: bool,
) -> anyhow::Result<()> {
    let content = read_input(input, file)?;

    let algo = match algorithm.trim().to_lowercase().as_str() {
        "auto" => None,
        name => Some(name.parse::<Algorithm>()?),
    };

    let history = MemoryHistory::new(config.history.capacity);
    let recorder: &dyn OperationRecorder = &history;

    let mut result = None;
    let data = timed(recorder, OperationKind::Compress, content.len(), || {
        let r = engine.compress(&content, format, algo, depth)?;
        let data = r.data.clone();
        result = Some(r);
        Ok(data)
    })?;

    write_output(output, &data)?;

    let Some(result) = result else {
        return Ok(());
    };

    if result.format == FormatTag::RawCodec && result.layers > 1 {
        eprintln!("Note: {} layers, decompress with --depth {}", result.layers, result.layers);
    }

    if stats {
        eprintln!();
        eprintln!("Compression Statistics:");
        eprintln!("  Format:       {}", result.format);
        eprintln!("  Algorithm:    {}", result.algorithm);
        if result.is_degraded() {
            eprintln!("  Effective:    {}", result.effective_algorithm);
        }
        eprintln!("  Layers:       {}", result.layers);
        eprintln!("  Original:     {} bytes", result.original_bytes);
        eprintln!("  Compressed:   {} bytes", result.compressed_bytes);
        eprintln!("  Ratio:        {:.2}", result.byte_ratio());
        eprintln!("  Saved:        {:.1}%", result.savings_percent());

        if !result.trace.is_empty() {
            eprintln!();
            eprintln!("Recursion:");
            for (i, step) in result.trace.steps().iter().enumerate() {
                eprintln!(
                    "  Step {:<2} {:<7} {:>8} bytes  {}",
                    i + 1,
                    step.algorithm.label(),
                    step.size_bytes,
                    if step.accepted { "kept" } else { "rejected" }
                );
            }
        }

        if config.history.enabled {
            eprintln!();
            for entry in history.entries() {
                eprintln!("{entry}");
            }
        }
    }

    Ok(())
}

fn cmd_decompress(
    engine: &CompressionEngine,
    input: Option<String>,
    file: Option<PathBuf>,
    output: Option<PathBuf>,
    depth: Option<u32>,
) -> anyhow::Result<()> {
    let content = read_input(input, file)?;
    let content = content.trim_end_matches(['\r', '\n']);

    let decompressed = match depth {
        Some(depth) => engine.decompress_recursive(content, depth)?,
        None => engine.decompress(content)?,
    };
    write_output(output, &decompressed)
}

fn cmd_detect(
    engine: &CompressionEngine,
    input: Option<String>,
    file: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let content = read_input(input, file)?;
    let content = content.trim_end_matches(['\r', '\n']);
    let format = engine.detect_format(content);

    if json {
        let report = json!({
            "format": format,
            "envelope": format.is_envelope(),
            "chat": is_chat_envelope(content),
            "neuro": is_neuro_json(content),
            "ultra_compact": ultra_compact_version(content),
            "likely_compressed": engine.is_likely_compressed(content),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{format}");
    }

    Ok(())
}

fn cmd_select(engine: &CompressionEngine, input: Option<String>, file: Option<PathBuf>) -> anyhow::Result<()> {
    let content = read_input(input, file)?;
    let chars = content.chars().count();
    let algorithm = engine.select_algorithm(&content);

    println!("{algorithm} ({chars} chars)");
    if let Some(warning) = engine.degradation(algorithm) {
        eprintln!("Warning: {warning}");
    }

    Ok(())
}

fn read_input(input: Option<String>, file: Option<PathBuf>) -> anyhow::Result<String> {
    if let Some(path) = file {
        Ok(std::fs::read_to_string(path)?)
    } else if let Some(s) = input {
        if s == "-" {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        } else {
            Ok(s)
        }
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    }
}

fn write_output(output: Option<PathBuf>, content: &str) -> anyhow::Result<()> {
    if let Some(path) = output {
        std::fs::write(path, content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}
