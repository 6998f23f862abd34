//! # sheetconf-cli
//!
//! Command-line interface for converting `_CONF` spreadsheet sheets to proto3
//! schemas and YAML data, and YAML data back into the workbook.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use sheetconf_core::{
    check_proto_syntax, create_template_workbook, default_template, export_all, export_protobuf,
    export_yaml, format_findings, import_yaml, Config, ExportOptions, WorkbookInfo,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// sheetconf - spreadsheet configuration to proto3 and YAML
#[derive(Parser)]
#[command(name = "sheetconf")]
#[command(author, version, about = "Spreadsheet config to proto3 schema and YAML data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (default: <config dir>/sheetconf/config.json)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a .proto file for every _CONF sheet
    Proto {
        /// Input workbook
        input: PathBuf,

        /// Output directory (default: configured output directory, then the workbook's directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also compile each file with protoc (warnings only)
        #[arg(long)]
        protoc: bool,
    },

    /// Export the data rows of every _CONF sheet to YAML
    Yaml {
        /// Input workbook
        input: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export proto schemas, then YAML data
    Export {
        /// Input workbook
        input: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also compile each file with protoc (warnings only)
        #[arg(long)]
        protoc: bool,
    },

    /// Write YAML data back into the workbook's _CONF sheets
    Import {
        /// Workbook to update in place
        input: PathBuf,

        /// Directory holding <sheet>.yaml files (default: configured data directory, then the workbook's directory)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },

    /// Show information about a workbook
    Info {
        /// Input workbook
        input: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a .proto file for common mistakes
    Check {
        /// Schema file
        input: PathBuf,
    },

    /// Create a new workbook with a starter _CONF sheet
    New {
        /// Workbook to create
        output: PathBuf,

        /// Sheet name (upper-case words ending with _CONF)
        #[arg(short, long, default_value = "EXAMPLE_CONF")]
        sheet: String,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show or update saved settings
    Config {
        /// Directory import reads YAML files from
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Directory exports write to
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Run protoc after every proto export
        #[arg(long)]
        protoc: Option<bool>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.clone().or_else(default_config_path);
    let config = config_path
        .as_deref()
        .map(Config::load)
        .unwrap_or_default();

    match cli.command {
        Commands::Proto {
            input,
            output,
            protoc,
        } => {
            let output = output_dir(&input, output, &config);
            let files = export_protobuf(&input, &output, export_options(&config, protoc))
                .with_context(|| format!("Failed to export proto from '{}'", input.display()))?;
            print_written("proto", &files);
            Ok(())
        }
        Commands::Yaml { input, output } => {
            let output = output_dir(&input, output, &config);
            let files = export_yaml(&input, &output)
                .with_context(|| format!("Failed to export yaml from '{}'", input.display()))?;
            print_written("yaml", &files);
            Ok(())
        }
        Commands::Export {
            input,
            output,
            protoc,
        } => {
            let output = output_dir(&input, output, &config);
            let summary = export_all(&input, &output, export_options(&config, protoc))
                .with_context(|| format!("Failed to export '{}'", input.display()))?;
            print_written("proto", &summary.proto_files);
            print_written("yaml", &summary.yaml_files);
            Ok(())
        }
        Commands::Import { input, data_dir } => run_import(&input, data_dir, &config),
        Commands::Info { input, json } => show_info(&input, json),
        Commands::Check { input } => check_file(&input),
        Commands::New {
            output,
            sheet,
            force,
        } => create_workbook(&output, sheet, force),
        Commands::Config {
            data_dir,
            output_dir,
            protoc,
        } => update_config(config_path.as_deref(), config, data_dir, output_dir, protoc),
    }
}

/// Get the default settings file path.
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut p| {
        p.push("sheetconf");
        p.push("config.json");
        p
    })
}

/// Resolve where exports write: flag, then settings, then next to the workbook.
fn output_dir(input: &Path, flag: Option<PathBuf>, config: &Config) -> PathBuf {
    flag.or_else(|| config.output_directory.clone())
        .unwrap_or_else(|| workbook_dir(input))
}

fn workbook_dir(input: &Path) -> PathBuf {
    input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

fn export_options(config: &Config, protoc: bool) -> ExportOptions {
    let mut options = config.export_options();
    options.run_protoc |= protoc;
    options
}

fn print_written(kind: &str, files: &[PathBuf]) {
    for file in files {
        println!("{} {kind} {}", "wrote".green().bold(), file.display());
    }
}

fn run_import(input: &Path, data_dir: Option<PathBuf>, config: &Config) -> Result<()> {
    let data_dir = data_dir.or_else(|| config.data_directory.clone());
    let report = import_yaml(input, data_dir.as_deref())
        .with_context(|| format!("Failed to import yaml into '{}'", input.display()))?;

    for warning in &report.warnings {
        println!("{} {warning}", "Warning:".yellow().bold());
    }
    for sheet in &report.skipped {
        println!("{} {sheet} (no data)", "skipped".dimmed());
    }
    if report.imported.is_empty() {
        println!("{}", "Nothing imported; workbook unchanged".yellow());
    } else {
        println!(
            "{} {} into {}",
            "imported".green().bold(),
            report.imported.join(", "),
            input.display()
        );
    }
    Ok(())
}

fn show_info(input: &Path, json: bool) -> Result<()> {
    let info = WorkbookInfo::from_xlsx(input)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;
    info.log();
    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        print!("{}", info.format());
    }
    Ok(())
}

fn check_file(input: &Path) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read file: {}", input.display()))?;
    let findings = check_proto_syntax(&text);
    if findings.is_empty() {
        println!("{} {}", "OK".green().bold(), input.display());
        return Ok(());
    }
    print!("{}", format_findings(&findings));
    bail!("{} has {} problem(s)", input.display(), findings.len())
}

fn create_workbook(output: &Path, sheet: String, force: bool) -> Result<()> {
    if output.exists() && !force {
        bail!("'{}' already exists (use --force to overwrite)", output.display());
    }
    let mut template = default_template();
    template.sheet_name = sheet;
    create_template_workbook(output, &template)
        .with_context(|| format!("Failed to create '{}'", output.display()))?;
    println!(
        "{} {} with sheet {}",
        "created".green().bold(),
        output.display(),
        template.sheet_name.cyan()
    );
    Ok(())
}

fn update_config(
    path: Option<&Path>,
    mut config: Config,
    data_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    protoc: Option<bool>,
) -> Result<()> {
    let changed = data_dir.is_some() || output_dir.is_some() || protoc.is_some();
    if let Some(dir) = data_dir {
        config.data_directory = Some(dir);
    }
    if let Some(dir) = output_dir {
        config.output_directory = Some(dir);
    }
    if let Some(run) = protoc {
        config.run_protoc = run;
    }

    if changed {
        let path = path.context("No config directory available; pass --config <FILE>")?;
        config
            .save(path)
            .with_context(|| format!("Failed to save config to '{}'", path.display()))?;
        println!("{} {}", "saved".green().bold(), path.display());
    }
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // ========================================================================
    // Argument parsing
    // ========================================================================

    #[test]
    fn test_parse_proto_command() {
        let cli = Cli::parse_from(["sheetconf", "proto", "game.xlsx", "-o", "out", "--protoc"]);
        match cli.command {
            Commands::Proto {
                input,
                output,
                protoc,
            } => {
                assert_eq!(input, PathBuf::from("game.xlsx"));
                assert_eq!(output, Some(PathBuf::from("out")));
                assert!(protoc);
            }
            _ => panic!("Expected proto command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "sheetconf",
            "import",
            "game.xlsx",
            "--verbose",
            "--config",
            "cfg.json",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("cfg.json")));
        assert!(matches!(cli.command, Commands::Import { data_dir: None, .. }));
    }

    #[test]
    fn test_new_defaults_to_example_sheet() {
        let cli = Cli::parse_from(["sheetconf", "new", "game.xlsx"]);
        match cli.command {
            Commands::New { sheet, force, .. } => {
                assert_eq!(sheet, "EXAMPLE_CONF");
                assert!(!force);
            }
            _ => panic!("Expected new command"),
        }
    }

    #[test]
    fn test_config_protoc_takes_a_value() {
        let cli = Cli::parse_from(["sheetconf", "config", "--protoc", "true"]);
        assert!(matches!(
            cli.command,
            Commands::Config {
                protoc: Some(true),
                ..
            }
        ));
    }

    // ========================================================================
    // Path resolution
    // ========================================================================

    #[test]
    fn test_output_dir_precedence() {
        let mut config = Config::default();
        let input = Path::new("/work/game.xlsx");
        assert_eq!(output_dir(input, None, &config), PathBuf::from("/work"));

        config.output_directory = Some(PathBuf::from("/configured"));
        assert_eq!(output_dir(input, None, &config), PathBuf::from("/configured"));
        assert_eq!(
            output_dir(input, Some(PathBuf::from("/flag")), &config),
            PathBuf::from("/flag")
        );
    }

    #[test]
    fn test_bare_file_name_uses_current_dir() {
        assert_eq!(workbook_dir(Path::new("game.xlsx")), PathBuf::from("."));
    }

    #[test]
    fn test_protoc_flag_or_config() {
        let config = Config {
            run_protoc: true,
            ..Config::default()
        };
        assert!(export_options(&config, false).run_protoc);
        assert!(export_options(&Config::default(), true).run_protoc);
        assert!(!export_options(&Config::default(), false).run_protoc);
    }

    // ========================================================================
    // Commands
    // ========================================================================

    #[test]
    fn test_new_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("game.xlsx");
        create_workbook(&path, "ITEM_CONF".to_string(), false).unwrap();
        assert!(create_workbook(&path, "ITEM_CONF".to_string(), false).is_err());
        assert!(create_workbook(&path, "ITEM_CONF".to_string(), true).is_ok());
    }

    #[test]
    fn test_check_reports_problems() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.proto");
        std::fs::write(&good, "syntax = \"proto3\";\nmessage A {\n  uint32 id = 1;\n}\n").unwrap();
        assert!(check_file(&good).is_ok());

        let bad = dir.path().join("bad.proto");
        std::fs::write(&bad, "message A {\n  uint32 id = 1;\n  uint32 x = 1;\n").unwrap();
        assert!(check_file(&bad).is_err());
    }

    #[test]
    fn test_update_config_saves() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        update_config(
            Some(&path),
            Config::default(),
            Some(PathBuf::from("/data")),
            None,
            Some(true),
        )
        .unwrap();

        let saved = Config::load(&path);
        assert_eq!(saved.data_directory, Some(PathBuf::from("/data")));
        assert!(saved.run_protoc);
    }
}
