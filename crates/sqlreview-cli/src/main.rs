use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use walkdir::WalkDir;

use sqlreview_core::{
    Advice, AdviceCode, AdviceStatus, Dialect, FileReport, ReviewConfig, ReviewReport, RuleLevel, RuleType,
    SqlReviewRule,
};
use sqlreview_engine::{AdvisorRegistry, ReviewError, SqlReviewer};
use sqlreview_sql::{convert, split_statements, SqlParser};

const DEFAULT_CONFIG: &str = "sqlreview.toml";

/// sqlreview - Review SQL migration scripts before they run
#[derive(Parser)]
#[command(name = "sqlreview")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: sqlreview.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQL dialect, overrides the config file (postgres or mysql)
    #[arg(short, long, global = true)]
    dialect: Option<Dialect>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Review SQL files against the configured rules
    Check {
        /// Files or directories to review (default: the config file's directory)
        paths: Vec<PathBuf>,

        /// Output file for report.json
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,

        /// Also output markdown report
        #[arg(short, long)]
        markdown: Option<PathBuf>,
    },

    /// Print the statements of a script with their line ranges
    Split {
        /// SQL file
        file: PathBuf,
    },

    /// Print the converted AST of a script as JSON
    Ast {
        /// SQL file
        file: PathBuf,
    },

    /// List the rules available for the dialect
    Rules,

    /// Write a config file enabling every rule as a warning
    Init {
        /// Destination (default: sqlreview.toml)
        path: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    // Load config if specified
    let mut config = if let Some(config_path) = &cli.config {
        ReviewConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()))?
    } else if Path::new(DEFAULT_CONFIG).exists() {
        ReviewConfig::from_file(Path::new(DEFAULT_CONFIG))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        ReviewConfig::default()
    };

    if let Some(dialect) = cli.dialect {
        config.dialect = dialect;
    }

    if cli.verbose {
        eprintln!("{} dialect: {}", "Using".cyan(), config.dialect);
    }

    match cli.command {
        Commands::Check { paths, output, markdown } => {
            check_command(&config, &paths, &output, markdown.as_deref(), cli.verbose)
        }
        Commands::Split { file } => split_command(&config, &file),
        Commands::Ast { file } => ast_command(&config, &file),
        Commands::Rules => rules_command(&config),
        Commands::Init { path } => init_command(&config, path.as_deref().unwrap_or(Path::new(DEFAULT_CONFIG))),
    }
}

/// Check command - review every SQL file and write the report
fn check_command(
    config: &ReviewConfig,
    paths: &[PathBuf],
    output: &Path,
    markdown: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let roots = if paths.is_empty() {
        vec![config.project_root.clone()]
    } else {
        paths.to_vec()
    };
    let files = collect_sql_files(&roots)?;

    if verbose {
        eprintln!(
            "{} {} files with {} rules...",
            "Reviewing".cyan(),
            files.len(),
            config.enabled_rules().count()
        );
    }

    let registry = AdvisorRegistry::builtin();
    let reviewer = SqlReviewer::new(&registry, config.dialect);
    let mut report = ReviewReport::new();

    for file in &files {
        let sql = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read SQL file {}", file.display()))?;
        tracing::debug!(path = %file.display(), bytes = sql.len(), "reviewing file");

        let advices = match reviewer.review(&sql, &config.rules) {
            Ok(advices) => advices,
            // Same for every file, so fail before writing a report
            Err(ReviewError::Config(e)) => return Err(e).context("Invalid rule configuration"),
            Err(e) => vec![unreviewable(&e)],
        };

        if verbose {
            let blocking = advices.iter().filter(|a| a.is_blocking()).count();
            if blocking > 0 {
                eprintln!("  {} {} errors", file.display(), blocking.to_string().red());
            } else {
                eprintln!("  {} {}", file.display(), "✓ OK".green());
            }
        }

        report.add_file(FileReport::new(file.display().to_string(), &sql, advices));
    }

    report
        .save_to_file(output)
        .with_context(|| format!("Failed to write report {}", output.display()))?;

    if verbose {
        eprintln!("{} {}", "Report saved to:".green(), output.display());
    }

    // Save markdown report if requested
    if let Some(md_path) = markdown {
        std::fs::write(md_path, generate_markdown_report(&report))
            .with_context(|| format!("Failed to write markdown report {}", md_path.display()))?;
        if verbose {
            eprintln!("{} {}", "Markdown report saved to:".green(), md_path.display());
        }
    }

    print_report_summary(&report);

    // Pipeline gate
    if report.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

/// Blocking advice for a script that could not be reviewed
fn unreviewable(error: &ReviewError) -> Advice {
    let line = match error {
        ReviewError::Convert { line, .. } => *line,
        _ => 0,
    };
    Advice::new(
        AdviceStatus::Error,
        AdviceCode::Internal,
        "Cannot review this script",
        error.to_string(),
        line,
    )
}

/// `*.sql` files under the given roots, in sorted order
fn collect_sql_files(roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for root in roots {
        if root.is_file() {
            files.push(root.clone());
            continue;
        }

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
            let is_sql = entry.path().extension().map_or(false, |ext| ext.eq_ignore_ascii_case("sql"));
            if entry.file_type().is_file() && is_sql {
                files.push(entry.into_path());
            }
        }
    }

    Ok(files)
}

/// Split command - show statement boundaries
fn split_command(config: &ReviewConfig, file: &Path) -> Result<()> {
    let sql = std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let statements = split_statements(&sql, config.dialect)?;

    for (i, statement) in statements.iter().enumerate() {
        println!(
            "{} {}",
            format!("#{} lines {}-{}", i + 1, statement.first_line, statement.last_line).bold(),
            statement.text
        );
    }

    Ok(())
}

/// AST command - dump converted statements as JSON
fn ast_command(config: &ReviewConfig, file: &Path) -> Result<()> {
    let sql = std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let parser = SqlParser::from_dialect(config.dialect);

    let mut nodes = Vec::new();
    for statement in split_statements(&sql, config.dialect)? {
        let native = parser.parse(&statement)?;
        let node = convert(&native, &statement)
            .with_context(|| format!("Failed to convert statement at line {}", statement.first_line))?;
        nodes.push(node);
    }

    println!("{}", serde_json::to_string_pretty(&nodes)?);
    Ok(())
}

/// Rules command - list registered rules
fn rules_command(config: &ReviewConfig) -> Result<()> {
    let registry = AdvisorRegistry::builtin();

    println!("{} {}", "Rules for".bold(), config.dialect.to_string().green());
    for rule_type in registry.rule_types(config.dialect) {
        let configured = config
            .rules
            .iter()
            .find(|r| r.rule_type == rule_type)
            .map(|r| format!("{:?}", r.level).to_uppercase());
        match configured {
            Some(level) => println!("  {} [{}]", rule_type, level),
            None => println!("  {}", rule_type.to_string().dimmed()),
        }
    }

    Ok(())
}

/// Init command - write a starter config
fn init_command(config: &ReviewConfig, path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }

    let registry = AdvisorRegistry::builtin();
    let starter = ReviewConfig {
        dialect: config.dialect,
        rules: registry
            .rule_types(config.dialect)
            .into_iter()
            .map(|rule_type| {
                let rule = SqlReviewRule::new(rule_type, RuleLevel::Warning);
                match default_payload(rule_type) {
                    Some(payload) => rule.with_payload(payload),
                    None => rule,
                }
            })
            .collect(),
        project_root: config.project_root.clone(),
    };

    starter
        .save_to_file(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("{} {}", "Wrote".green(), path.display());
    Ok(())
}

fn default_payload(rule_type: RuleType) -> Option<&'static str> {
    match rule_type {
        RuleType::CommentLength => Some(r#"{"required": true, "maxLength": 64}"#),
        RuleType::NamingTable => Some(r#"{"format": "^[a-z]+(_[a-z]+)*$", "maxLength": 64}"#),
        RuleType::ColumnRequired => Some(r#"{"list": ["id", "created_ts", "updated_ts"]}"#),
        _ => None,
    }
}

/// Print report summary to stdout
fn print_report_summary(report: &ReviewReport) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "SQL Review Report".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("Version: {}", report.version);
    println!("Timestamp: {}", report.timestamp);
    println!();

    println!("{}", "Summary:".bold());
    println!("  Files reviewed: {}", report.summary.files_reviewed);
    println!("  Total advice: {}", report.summary.total);

    if report.summary.errors > 0 {
        println!("  Errors:   {}", report.summary.errors.to_string().red().bold());
    } else {
        println!("  Errors:   {}", report.summary.errors.to_string().green());
    }

    if report.summary.warnings > 0 {
        println!("  Warnings: {}", report.summary.warnings.to_string().yellow());
    } else {
        println!("  Warnings: {}", report.summary.warnings.to_string().green());
    }
    println!();

    if report.summary.total == 0 {
        println!("{}", "✓ No issues found!".green().bold());
    } else {
        println!("{}", "Advice:".bold());
        for file in &report.files {
            for advice in file.advices.iter().filter(|a| a.status != AdviceStatus::Success) {
                let status = match advice.status {
                    AdviceStatus::Error => "ERROR".red().bold(),
                    AdviceStatus::Warn => "WARN".yellow().bold(),
                    AdviceStatus::Success => "OK".green(),
                };
                println!("  [{}] {} ({}): {}", status, advice.title, advice.code, advice.content);
                println!("    at {}:{}", file.path, advice.line);
            }
        }
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());
}

/// Generate markdown report
fn generate_markdown_report(report: &ReviewReport) -> String {
    let mut md = String::new();

    md.push_str("# SQL Review Report\n\n");
    md.push_str(&format!("**Version:** {}\n\n", report.version));
    md.push_str(&format!("**Timestamp:** {}\n\n", report.timestamp));

    md.push_str("## Summary\n\n");
    md.push_str(&format!("- Files reviewed: {}\n", report.summary.files_reviewed));
    md.push_str(&format!("- Total advice: {}\n", report.summary.total));
    md.push_str(&format!("- Errors: {}\n", report.summary.errors));
    md.push_str(&format!("- Warnings: {}\n", report.summary.warnings));
    md.push('\n');

    if report.summary.total == 0 {
        md.push_str("✅ **No issues found!**\n");
        return md;
    }

    md.push_str("## Advice\n\n");
    for file in &report.files {
        let findings: Vec<&Advice> = file
            .advices
            .iter()
            .filter(|a| a.status != AdviceStatus::Success)
            .collect();
        if findings.is_empty() {
            continue;
        }

        md.push_str(&format!("### `{}`\n\n", file.path));
        md.push_str(&format!("SHA-256: `{}`\n\n", file.sha256));
        for advice in findings {
            let emoji = match advice.status {
                AdviceStatus::Error => "❌",
                _ => "⚠️",
            };
            md.push_str(&format!(
                "- {} **{}** `{}` line {}: {}\n",
                emoji, advice.title, advice.code, advice.line, advice.content
            ));
        }
        md.push('\n');
    }

    md
}
