//! shortarray CLI - convert PHP array() calls to short [] syntax
//!
//! Input is the JSON token dump of PHP's `token_get_all()`:
//! `{"tokens": [["T_ARRAY", "array", 3], "(", ...]}`. Each dump is converted
//! back to source text with every `array(...)` construction rewritten to
//! `[...]`.

mod config;
mod output;
mod process;

use anyhow::{bail, Result};
use clap::Parser;
use colored::*;
use rayon::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use config::Config;
use output::{OutputFormat, Reporter};
use process::{output_path, process_file, process_source, write_file, ProcessResult};
use shortarray_core::Strictness;

#[derive(Parser)]
#[command(name = "shortarray")]
#[command(version)]
#[command(about = "Convert PHP array() calls to short [] syntax from lexer output")]
struct Cli {
    /// Lexer dumps or directories of dumps to process (`-` or none reads stdin)
    paths: Vec<PathBuf>,

    /// Report what would change without writing anything (default mode)
    #[arg(long, conflicts_with_all = ["fix", "print"])]
    check: bool,

    /// Write the converted source next to each dump (or into --out-dir)
    #[arg(long, conflicts_with = "print")]
    fix: bool,

    /// Print the converted source to stdout
    #[arg(long)]
    print: bool,

    /// Directory for files written by --fix
    #[arg(long, value_name = "DIR", requires = "fix")]
    out_dir: Option<PathBuf>,

    /// Reject token records that are not exactly [kind, text, line]
    #[arg(long)]
    strict: bool,

    /// Show verbose output
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Output format: text, json, diff
    #[arg(long, value_name = "FORMAT")]
    format: Option<String>,

    /// Shorthand for --format json
    #[arg(long, conflicts_with = "format")]
    json: bool,

    /// Path to config file (default: auto-detect .shortarray.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ignore config files
    #[arg(long)]
    no_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Check,
    Fix,
    Print,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    let strictness = config.strictness(cli.strict);

    if reads_stdin(&cli.paths) {
        reject_stdin_flags(&cli)?;
        return convert_stdin(strictness);
    }

    let format_name = cli
        .format
        .as_deref()
        .or(config.output.format.as_deref())
        .unwrap_or("text");
    let output_format = if cli.json {
        OutputFormat::Json
    } else {
        match OutputFormat::from_str(format_name) {
            Some(format) => format,
            None => bail!(
                "Invalid output format '{}'. Valid options: text, json, diff",
                format_name
            ),
        }
    };

    let mode = if cli.fix {
        Mode::Fix
    } else if cli.print {
        Mode::Print
    } else {
        Mode::Check
    };

    if cli.verbose && output_format == OutputFormat::Text && mode != Mode::Print {
        println!(
            "{}: {}",
            "Mode".bold(),
            match mode {
                Mode::Check => "check",
                Mode::Fix => "fix",
                Mode::Print => "print",
            }
        );
        println!();
    }

    let (file_paths, missing_paths) = collect_inputs(&cli.paths, &config);

    for path in &missing_paths {
        if output_format != OutputFormat::Json {
            eprintln!(
                "{}: Path does not exist: {}",
                "Warning".yellow(),
                path.display()
            );
        }
    }

    // Conversion is pure, so dumps are converted in parallel and reported in path order
    let mut results: Vec<(PathBuf, Result<ProcessResult>)> = file_paths
        .into_par_iter()
        .map(|path| {
            let result = process_file(&path, strictness);
            (path, result)
        })
        .collect();
    results.sort_by(|a, b| a.0.cmp(&b.0));

    if mode == Mode::Print {
        return print_results(results);
    }

    let mut reporter = Reporter::new(output_format, cli.verbose);
    for (path, result) in results {
        match result {
            Ok(result) => match mode {
                Mode::Fix => {
                    let target = output_path(
                        &path,
                        cli.out_dir.as_deref(),
                        config.output_extension(),
                    );
                    match target {
                        Ok(target) => {
                            write_file(&target, &result.new_source)?;
                            reporter.report_fix(&path, &target, result.edits);
                        }
                        Err(e) => reporter.report_error(&path, &format!("{:#}", e)),
                    }
                }
                _ => reporter.report_check(
                    &path,
                    result.edits,
                    &result.old_source,
                    &result.new_source,
                ),
            },
            Err(e) => reporter.report_error(&path, &format!("{:#}", e)),
        }
    }

    let summary = reporter.summary();
    let exit_code = if summary.errors > 0 {
        ExitCode::from(1)
    } else if mode == Mode::Check && summary.files_with_changes > 0 {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    };

    reporter.finish(mode == Mode::Check)?;

    Ok(exit_code)
}

fn load_config(cli: &Cli) -> Result<Config> {
    if cli.no_config {
        return Ok(Config::default());
    }

    if let Some(config_path) = &cli.config {
        let config = Config::load_path(config_path)?;
        if cli.verbose {
            eprintln!("{}: {}", "Using config".bold(), config_path.display());
        }
        return Ok(config);
    }

    match Config::load()? {
        Some((config, path)) => {
            if cli.verbose {
                eprintln!("{}: {}", "Using config".bold(), path.display());
            }
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}

fn reads_stdin(paths: &[PathBuf]) -> bool {
    match paths {
        [] => true,
        [only] => only.as_os_str() == "-",
        _ => false,
    }
}

/// Stdin input always prints, so report flags that would otherwise be ignored
fn reject_stdin_flags(cli: &Cli) -> Result<()> {
    let flags: Vec<&str> = [
        (cli.check, "--check"),
        (cli.fix, "--fix"),
        (cli.out_dir.is_some(), "--out-dir"),
        (cli.format.is_some(), "--format"),
        (cli.json, "--json"),
    ]
    .into_iter()
    .filter(|(set, _)| *set)
    .map(|(_, flag)| flag)
    .collect();

    if !flags.is_empty() {
        bail!(
            "{} cannot be used when reading from stdin; pass dump files instead",
            flags.join(", ")
        );
    }
    Ok(())
}

/// Convert a single dump read from stdin and print the converted source
fn convert_stdin(strictness: Strictness) -> Result<ExitCode> {
    let json = std::io::read_to_string(std::io::stdin())?;
    let result = process_source(&json, strictness)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(result.new_source.as_bytes())?;
    stdout.flush()?;

    Ok(ExitCode::SUCCESS)
}

fn print_results(results: Vec<(PathBuf, Result<ProcessResult>)>) -> Result<ExitCode> {
    let mut failed = false;
    let mut stdout = std::io::stdout().lock();

    for (path, result) in results {
        match result {
            Ok(result) => stdout.write_all(result.new_source.as_bytes())?,
            Err(e) => {
                failed = true;
                eprintln!("{}: {} - {:#}", "Warning".yellow(), path.display(), e);
            }
        }
    }
    stdout.flush()?;

    Ok(if failed {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

/// Expand directories into the dumps they contain
fn collect_inputs(paths: &[PathBuf], config: &Config) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut file_paths = Vec::new();
    let mut missing_paths = Vec::new();
    let extension = config.input_extension();

    for path in paths {
        if path.is_file() {
            file_paths.push(path.clone());
        } else if path.is_dir() {
            for entry in walkdir::WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .filter(|e| has_extension(e.path(), extension))
            {
                let file_path = entry.path();
                if !config.should_exclude(file_path) {
                    file_paths.push(file_path.to_path_buf());
                }
            }
        } else {
            missing_paths.push(path.clone());
        }
    }

    (file_paths, missing_paths)
}

/// Whether the file name ends in `.<extension>`, which may span several suffixes
fn has_extension(path: &Path, extension: &str) -> bool {
    let suffix = format!(".{}", extension.trim_start_matches('.'));
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().ends_with(&suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_reads_stdin() {
        assert!(reads_stdin(&[]));
        assert!(reads_stdin(&[PathBuf::from("-")]));
        assert!(!reads_stdin(&[PathBuf::from("a.json")]));
        assert!(!reads_stdin(&[PathBuf::from("-"), PathBuf::from("a.json")]));
    }

    #[test]
    fn test_collect_inputs_walks_directories() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("vendor/lib")).unwrap();
        fs::write(root.join("src/a.php.json"), "{}").unwrap();
        fs::write(root.join("src/a.php"), "<?php").unwrap();
        fs::write(root.join("vendor/lib/b.php.json"), "{}").unwrap();

        let config: Config = toml::from_str("[paths]\nexclude = [\"vendor/\"]\n").unwrap();
        let missing = root.join("nope.json");
        let inputs = [root.to_path_buf(), missing.clone()];
        let (files, missing_paths) = collect_inputs(&inputs, &config);

        assert_eq!(files, vec![root.join("src/a.php.json")]);
        assert_eq!(missing_paths, vec![missing]);
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension(Path::new("dumps/foo.php.json"), "json"));
        assert!(has_extension(Path::new("dumps/foo.php.json"), "php.json"));
        assert!(has_extension(Path::new("dumps/foo.php.json"), ".php.json"));
        assert!(!has_extension(Path::new("dumps/foo.json"), "php.json"));
        assert!(!has_extension(Path::new("dumps/foojson"), "json"));
    }

    #[test]
    fn test_collect_inputs_with_compound_extension() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(root.join("a.php.json"), "{}").unwrap();
        fs::write(root.join("b.json"), "{}").unwrap();

        let config: Config = toml::from_str("[input]\nextension = \"php.json\"\n").unwrap();
        let (files, _) = collect_inputs(&[root.to_path_buf()], &config);

        assert_eq!(files, vec![root.join("a.php.json")]);
    }

    #[test]
    fn test_stdin_rejects_mode_and_format_flags() {
        for args in [
            vec!["shortarray", "--fix"],
            vec!["shortarray", "--check", "-"],
            vec!["shortarray", "--json"],
            vec!["shortarray", "--format", "diff", "-"],
            vec!["shortarray", "--fix", "--out-dir", "out"],
        ] {
            let cli = Cli::try_parse_from(args.iter().copied()).unwrap();
            assert!(reads_stdin(&cli.paths));
            let err = reject_stdin_flags(&cli).err().unwrap();
            assert!(err.to_string().contains("stdin"), "{args:?}");
        }

        let cli = Cli::try_parse_from(["shortarray", "--strict", "-v", "-"]).unwrap();
        assert!(reject_stdin_flags(&cli).is_ok());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_fix_conflicts_with_print() {
        assert!(Cli::try_parse_from(["shortarray", "--fix", "--print", "a.json"]).is_err());
        assert!(Cli::try_parse_from(["shortarray", "--out-dir", "out", "a.json"]).is_err());
        assert!(Cli::try_parse_from(["shortarray", "--fix", "--out-dir", "out", "a.json"]).is_ok());
    }
}
