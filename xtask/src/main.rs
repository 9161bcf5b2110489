//! Developer tasks (schema generation, fixture conformance).
//!
//! Keeping this separate avoids bloating the end-user CLI.

use anyhow::{Context, bail};
use attestgate_test_util::normalize_nondeterministic;
use schemars::schema_for;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the project root (parent of xtask directory).
fn project_root() -> anyhow::Result<PathBuf> {
    let manifest_dir = match std::env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => std::env::current_dir().context("determine current directory")?,
    };

    // If we're in the xtask directory, go up one level
    if manifest_dir.ends_with("xtask")
        && let Some(parent) = manifest_dir.parent()
    {
        return Ok(parent.to_path_buf());
    }
    Ok(manifest_dir)
}

fn schemas_dir() -> anyhow::Result<PathBuf> {
    Ok(project_root()?.join("schemas"))
}

/// Schema definition with its target filename.
struct SchemaSpec {
    filename: &'static str,
    generate: fn() -> schemars::Schema,
}

fn generate_report_schema() -> schemars::Schema {
    schema_for!(attestgate_types::VerifyReport)
}

fn generate_config_schema() -> schemars::Schema {
    schema_for!(attestgate_settings::AttestgateConfigV1)
}

fn schema_specs() -> Vec<SchemaSpec> {
    vec![
        SchemaSpec {
            filename: "attestgate.report.v1.json",
            generate: generate_report_schema,
        },
        SchemaSpec {
            filename: "attestgate.config.v1.json",
            generate: generate_config_schema,
        },
    ]
}

/// Serialize a schema to pretty-printed JSON with trailing newline.
fn serialize_schema(schema: &schemars::Schema) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(schema).context("Failed to serialize schema")?;
    json.push('\n');
    Ok(json)
}

fn emit_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir()?;
    fs::create_dir_all(&dir).context("Failed to create schemas directory")?;

    for spec in schema_specs() {
        let json = serialize_schema(&(spec.generate)())?;
        let path = dir.join(spec.filename);
        fs::write(&path, &json)
            .with_context(|| format!("Failed to write schema to {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    println!("\nSchemas emitted successfully.");
    Ok(())
}

/// Validate that schemas in the repo match what would be generated.
fn validate_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir()?;
    let mut missing = Vec::new();
    let mut mismatched = Vec::new();

    for spec in schema_specs() {
        let path = dir.join(spec.filename);
        if !path.exists() {
            missing.push(spec.filename);
            continue;
        }

        // Compared as JSON values: key order depends on serde_json features in the build.
        let expected =
            serde_json::to_value((spec.generate)()).context("Failed to serialize schema")?;
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let actual: serde_json::Value = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        if expected != actual {
            mismatched.push(spec.filename);
        }
    }

    if missing.is_empty() && mismatched.is_empty() {
        println!("All schemas are up to date.");
        return Ok(());
    }

    if !missing.is_empty() {
        eprintln!("Missing schemas:");
        for name in &missing {
            eprintln!("  - {}", name);
        }
    }
    if !mismatched.is_empty() {
        eprintln!("Schemas out of date:");
        for name in &mismatched {
            eprintln!("  - {}", name);
        }
    }
    eprintln!("\nRun `cargo xtask emit-schemas` to regenerate.");
    bail!("Schema validation failed")
}

fn print_help() {
    eprintln!("xtask commands:");
    eprintln!("  help              Show this message");
    eprintln!("  emit-schemas      Generate JSON schemas from Rust types to schemas/");
    eprintln!("  validate-schemas  Check if schemas/ matches generated output (for CI)");
    eprintln!("  print-schema-ids  Print known schema IDs");
    eprintln!("  conform           Run attestgate on tests/fixtures and check reports");
}

/// Check that a report path is clean: relative, no `../`, forward slashes only.
fn is_clean_path(path: &str) -> bool {
    !(path.starts_with('/')
        || path.contains("..")
        || path.contains('\\')
        || (path.len() >= 2 && path.as_bytes()[1] == b':'))
}

/// Run the built binary on every fixture and check the report it writes.
///
/// Each fixture directory holds `attestgate.toml`, `attestation.json`, and optionally
/// `expected.report.json`. Reports must validate against the generated report schema,
/// record only clean module paths, and match the golden file after normalization.
fn conform() -> anyhow::Result<()> {
    let root = project_root()?;
    let compiled = jsonschema::draft7::new(&serde_json::to_value(generate_report_schema())?)
        .map_err(|e| anyhow::anyhow!("Failed to compile schema: {}", e))?;

    let bin = root.join("target").join("debug").join("attestgate");
    #[cfg(target_os = "windows")]
    let bin = bin.with_extension("exe");
    if !bin.exists() {
        bail!(
            "attestgate binary not found at {}.\nRun `cargo build -p attestgate-cli` first.",
            bin.display()
        );
    }

    let fixtures_dir = root.join("tests").join("fixtures");
    let mut errors = Vec::new();
    let mut count = 0;

    for entry in fs::read_dir(&fixtures_dir).context("Failed to read tests/fixtures/")? {
        let fixture_dir = entry?.path();
        if !fixture_dir.join("attestation.json").exists() {
            continue;
        }
        count += 1;
        if let Err(err) = conform_fixture(&bin, &fixture_dir, &compiled) {
            errors.push(format!("{}: {err:#}", fixture_dir.display()));
        }
    }

    if count == 0 {
        bail!("No fixtures found in {}", fixtures_dir.display());
    }
    if !errors.is_empty() {
        eprintln!("\nConformance errors:");
        for err in &errors {
            eprintln!("  - {}", err);
        }
        bail!("Conformance validation failed with {} errors", errors.len());
    }

    println!("\n✓ All {} fixtures pass conformance checks!", count);
    Ok(())
}

fn conform_fixture(
    bin: &Path,
    fixture_dir: &Path,
    compiled: &jsonschema::Validator,
) -> anyhow::Result<()> {
    let temp_dir = tempfile::tempdir().context("Failed to create temp dir")?;
    let report_out = temp_dir.path().join("report.json");

    let output = std::process::Command::new(bin)
        .arg("--root")
        .arg(fixture_dir)
        .arg("verify")
        .arg("--attestation")
        .arg(fixture_dir.join("attestation.json"))
        .arg("--report-out")
        .arg(&report_out)
        .output()
        .context("Failed to run attestgate")?;

    // 0 and 2 are decisions; anything else is a fault.
    if !matches!(output.status.code(), Some(0) | Some(2)) {
        bail!(
            "attestgate exited with {:?}: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stderr)
        );
    }

    let text = fs::read_to_string(&report_out).context("read report")?;
    let report: serde_json::Value = serde_json::from_str(&text).context("parse report")?;

    if let Some(err) = compiled.iter_errors(&report).next() {
        bail!("schema validation: {err}");
    }

    for module in report["modules"].as_array().into_iter().flatten() {
        if let Some(path) = module.get("path").and_then(|v| v.as_str())
            && !is_clean_path(path)
        {
            bail!("module path '{path}' is not clean");
        }
    }

    let golden_path = fixture_dir.join("expected.report.json");
    if golden_path.exists() {
        let golden: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&golden_path)?).context("parse golden")?;
        // The attestation label is machine-specific.
        let strip = |mut v: serde_json::Value| {
            if let Some(obj) = v.as_object_mut() {
                obj.remove("attestation");
            }
            normalize_nondeterministic(v)
        };
        if strip(report) != strip(golden) {
            bail!("output differs from golden file expected.report.json");
        }
    }

    println!("  ✓ {} conforms", fixture_dir.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match cmd {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "emit-schemas" => emit_schemas(),
        "validate-schemas" => validate_schemas(),
        "conform" => conform(),
        "print-schema-ids" => {
            for spec in schema_specs() {
                println!("{}", spec.filename.trim_end_matches(".json"));
            }
            Ok(())
        }
        other => bail!("unknown xtask command: {other}\n\nRun `cargo xtask help` for usage."),
    }
    .context("xtask failed")
}
