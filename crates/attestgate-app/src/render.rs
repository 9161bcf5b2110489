//! Render use case: markdown summary of a verification report.

use attestgate_types::{Verdict, VerifyReport};

pub fn render_markdown(report: &VerifyReport) -> String {
    let mut out = String::new();

    out.push_str("# Attestgate report\n\n");
    let verdict = match report.verdict {
        Verdict::Allow => "ALLOW",
        Verdict::Deny => "DENY",
        Verdict::Error => "ERROR",
    };
    out.push_str(&format!(
        "- Verdict: **{}**\n- Modules: {}\n",
        verdict,
        report.modules.len()
    ));
    if let Some(att) = &report.attestation {
        out.push_str(&format!("- Attestation: `{}`\n", att));
    }
    out.push('\n');

    if let Some(err) = &report.error {
        out.push_str(&format!("> Error: {}\n\n", err));
    }

    if report.verdict == Verdict::Deny {
        out.push_str("## Denied\n\n");
        for reason in &report.reasons {
            out.push_str(&format!("- {}\n", reason));
        }
        out.push('\n');
    } else if report.verdict == Verdict::Allow {
        out.push_str("No denials.\n\n");
    }

    if !report.modules.is_empty() {
        out.push_str("## Modules\n\n");
        out.push_str("| Module | Namespace | Path |\n");
        out.push_str("|---|---|---|\n");
        for m in &report.modules {
            let ns = m.namespace.as_deref().unwrap_or("-");
            let path = m.path.as_ref().map(|p| p.as_str()).unwrap_or("-");
            out.push_str(&format!(
                "| `{}` | {} | `{}` |\n",
                cell(&m.name),
                cell(ns),
                cell(path)
            ));
        }
    }

    out
}

/// Pipes would split a table cell.
fn cell(text: &str) -> String {
    text.replace('|', "\\|")
}
