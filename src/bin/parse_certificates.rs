//! Parse Certificate Dumps
//!
//! Reads fragment dumps (MemoryDocument JSON) and writes the extracted
//! report data and diagnostics as JSON.
//!
//! Usage:
//!   cargo run --release --bin parse_certificates -- dumps/cert_001.json
//!   cargo run --release --bin parse_certificates -- dumps/ --output-dir reports
//!   cargo run --release --bin parse_certificates -- dumps/ --config parser.json --verbose

use cert_oxide::{MemoryDocument, ParsedReport, ParserConfig, ReportParser};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

#[derive(Debug)]
struct CliConfig {
    input: Option<PathBuf>,
    config_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    verbose: bool,
}

const USAGE: &str =
    "Usage: parse_certificates <dump.json | dir> [--config <file>] [--output-dir <dir>] [--verbose]";

/// Suffix of files written by `--output-dir`; never read back as dumps.
const REPORT_SUFFIX: &str = ".report.json";

impl CliConfig {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        Self::parse(args.get(1..).unwrap_or(&[]))
    }

    fn parse(args: &[String]) -> Result<Self, String> {
        let mut input = None;
        let mut config_path = None;
        let mut output_dir = None;
        let mut verbose = false;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                flag @ ("--config" | "--output-dir") => {
                    i += 1;
                    let value = args
                        .get(i)
                        .ok_or_else(|| format!("{} requires a value", flag))?;
                    if flag == "--config" {
                        config_path = Some(PathBuf::from(value));
                    } else {
                        output_dir = Some(PathBuf::from(value));
                    }
                },
                "--verbose" | "-v" => {
                    verbose = true;
                },
                other if other.starts_with('-') => {
                    return Err(format!("unknown option '{}'", other));
                },
                other => {
                    if input.is_some() {
                        return Err(format!("unexpected argument '{}'", other));
                    }
                    input = Some(PathBuf::from(other));
                },
            }
            i += 1;
        }

        Ok(Self {
            input,
            config_path,
            output_dir,
            verbose,
        })
    }
}

fn is_dump(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with(".json") && !name.ends_with(REPORT_SUFFIX)
}

fn discover_dumps(input: &Path) -> Vec<PathBuf> {
    if !input.is_dir() {
        return vec![input.to_path_buf()];
    }

    let mut dumps = match fs::read_dir(input) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|path| is_dump(path))
            .collect::<Vec<_>>(),
        Err(e) => {
            eprintln!("Error reading directory {}: {}", input.display(), e);
            Vec::new()
        },
    };
    dumps.sort();
    dumps
}

fn write_report(
    parsed: &ParsedReport,
    dump_path: &Path,
    output_dir: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(parsed)?;
    match output_dir {
        Some(dir) => {
            let file_stem = dump_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("unknown");
            fs::create_dir_all(dir)?;
            fs::write(dir.join(format!("{}{}", file_stem, REPORT_SUFFIX)), json)?;
        },
        None => println!("{}", json),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = match CliConfig::from_args() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("{}", USAGE);
            return ExitCode::from(2);
        },
    };

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let Some(input) = cli.input.as_deref() else {
        eprintln!("{}", USAGE);
        return ExitCode::from(2);
    };

    let config = match cli.config_path.as_deref() {
        Some(path) => match ParserConfig::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config {}: {}", path.display(), e);
                return ExitCode::from(2);
            },
        },
        None => ParserConfig::default(),
    };
    let parser = ReportParser::with_config(config);

    let dumps = discover_dumps(input);
    let start = Instant::now();
    let mut failures = 0usize;
    let mut records = 0usize;

    for dump_path in &dumps {
        let doc = match MemoryDocument::open(dump_path) {
            Ok(doc) => doc,
            Err(e) => {
                eprintln!("Error loading {}: {}", dump_path.display(), e);
                failures += 1;
                continue;
            },
        };

        let parsed = parser.parse(&doc);
        records += parsed.report.results.len();
        for page in parsed.diagnostics.failed_pages() {
            eprintln!("{}: page {} not parsed", dump_path.display(), page);
        }
        if parsed.diagnostics.unparsed_count > 0 {
            eprintln!(
                "{}: {} lot fields not parsed",
                dump_path.display(),
                parsed.diagnostics.unparsed_count
            );
        }

        if let Err(e) = write_report(&parsed, dump_path, cli.output_dir.as_deref()) {
            eprintln!("Error writing report for {}: {}", dump_path.display(), e);
            failures += 1;
        }
    }

    log::info!(
        "Processed {} documents ({} records, {} failures) in {:.2?}",
        dumps.len(),
        records,
        failures,
        start.elapsed()
    );

    if failures > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
