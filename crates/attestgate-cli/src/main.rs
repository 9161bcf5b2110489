//! CLI entry point for attestgate.
//!
//! This module is intentionally thin: it handles argument parsing, I/O, and exit codes.
//! All business logic lives in the `attestgate-app` crate.

use anyhow::Context;
use attestgate_app::{
    VerifyInput, error_report, parse_report_json, render_markdown, run_query, run_verify,
    serialize_report,
};
use attestgate_settings::Overrides;
use attestgate_types::{VerifyReport, ids};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "attestgate",
    version,
    about = "Evaluate Rego deny rules against supply-chain attestations"
)]
struct Cli {
    /// Root directory; the config file and relative policy paths resolve against it.
    #[arg(long, default_value = ".")]
    root: Utf8PathBuf,

    /// Path to the attestgate config TOML, relative to the root.
    #[arg(long, default_value = ids::DEFAULT_CONFIG_FILE)]
    config: Utf8PathBuf,

    /// Log debug details to stderr (ATTESTGATE_LOG takes precedence).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate an attestation against the configured policies and write a report.
    Verify {
        /// Attestation JSON file.
        #[arg(long)]
        attestation: Utf8PathBuf,

        /// Extra policy file, evaluated after configured modules. Repeatable.
        #[arg(long = "policy")]
        policies: Vec<String>,

        /// Abandon evaluation after this many milliseconds.
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Where to write the JSON report.
        #[arg(long, default_value = "artifacts/attestgate/report.json")]
        report_out: Utf8PathBuf,

        /// Write a Markdown report alongside the JSON.
        #[arg(long)]
        write_markdown: bool,

        /// Where to write the Markdown report (if enabled).
        #[arg(long, default_value = "artifacts/attestgate/comment.md")]
        markdown_out: Utf8PathBuf,
    },

    /// Print the combined deny query for the configured policies.
    Query {
        /// Extra policy file. Repeatable.
        #[arg(long = "policy")]
        policies: Vec<String>,
    },

    /// Render markdown from an existing JSON report.
    Md {
        /// Path to the JSON report file.
        #[arg(long, default_value = "artifacts/attestgate/report.json")]
        report: Utf8PathBuf,

        /// Where to write the Markdown output (if not specified, prints to stdout).
        #[arg(long, short)]
        output: Option<Utf8PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.cmd {
        Commands::Verify {
            ref attestation,
            ref policies,
            timeout_ms,
            ref report_out,
            write_markdown,
            ref markdown_out,
        } => cmd_verify(
            &cli,
            attestation,
            Overrides {
                policies: policies.clone(),
                timeout_ms,
            },
            report_out,
            write_markdown.then_some(markdown_out.as_path()),
        ),
        Commands::Query { ref policies } => cmd_query(
            &cli,
            Overrides {
                policies: policies.clone(),
                timeout_ms: None,
            },
        ),
        Commands::Md { report, output } => cmd_md(report, output),
    }
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("ATTESTGATE_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn resolve_root(cli: &Cli) -> anyhow::Result<Utf8PathBuf> {
    let root = cli
        .root
        .canonicalize_utf8()
        .unwrap_or_else(|_| cli.root.clone());
    if !root.exists() {
        anyhow::bail!("root does not exist: {}", root);
    }
    Ok(root)
}

/// Config text, or empty when the file is missing (defaults apply).
fn read_config(root: &Utf8Path, config: &Utf8Path) -> String {
    std::fs::read_to_string(root.join(config)).unwrap_or_default()
}

fn cmd_verify(
    cli: &Cli,
    attestation: &Utf8Path,
    overrides: Overrides,
    report_out: &Utf8Path,
    markdown_out: Option<&Utf8Path>,
) -> anyhow::Result<()> {
    let label = attestation.to_string();

    let result = (|| -> anyhow::Result<i32> {
        let root = resolve_root(cli)?;
        let cfg_text = read_config(&root, &cli.config);
        let attestation_text = std::fs::read_to_string(attestation)
            .with_context(|| format!("read attestation: {}", attestation))?;

        let output = run_verify(VerifyInput {
            root: &root,
            config_text: &cfg_text,
            overrides,
            attestation_text: &attestation_text,
            attestation_label: Some(label.clone()),
        })?;

        write_report_file(report_out, &output.report).context("write report json")?;
        if let Some(md_path) = markdown_out {
            write_text_file(md_path, &render_markdown(&output.report))
                .context("write markdown")?;
        }

        match &output.outcome {
            Ok(()) => {}
            Err(err) if err.is_denied() => eprintln!("{err}"),
            Err(_) => eprintln!(
                "attestgate error: {}",
                output.report.error.as_deref().unwrap_or("evaluation failed")
            ),
        }

        Ok(output.exit_code())
    })();

    match result {
        Ok(code) => {
            if code != ids::EXIT_ALLOW {
                std::process::exit(code);
            }
            Ok(())
        }
        Err(err) => {
            let report = error_report(&format!("{err:#}"), &[], Some(label));
            let _ = write_report_file(report_out, &report);
            eprintln!("attestgate error: {err:#}");
            std::process::exit(ids::EXIT_ERROR);
        }
    }
}

fn cmd_query(cli: &Cli, overrides: Overrides) -> anyhow::Result<()> {
    let root = resolve_root(cli)?;
    let cfg_text = read_config(&root, &cli.config);
    let query = run_query(&root, &cfg_text, overrides)?;
    for path in query.paths() {
        println!("{}", path);
    }
    Ok(())
}

fn write_report_file(path: &Utf8Path, report: &VerifyReport) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {}", parent))?;
    }
    let data = serialize_report(report).context("serialize report")?;
    std::fs::write(path, data).with_context(|| format!("write report: {}", path))?;
    Ok(())
}

fn write_text_file(path: &Utf8Path, text: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {}", parent))?;
    }
    std::fs::write(path, text).with_context(|| format!("write text: {}", path))?;
    Ok(())
}

fn cmd_md(report_path: Utf8PathBuf, output: Option<Utf8PathBuf>) -> anyhow::Result<()> {
    let report_text = std::fs::read_to_string(&report_path)
        .with_context(|| format!("read report: {}", report_path))?;
    let report = parse_report_json(&report_text)?;
    let md = render_markdown(&report);

    if let Some(out_path) = output {
        write_text_file(&out_path, &md).context("write markdown output")?;
    } else {
        print!("{}", md);
    }

    Ok(())
}
