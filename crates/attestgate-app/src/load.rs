//! Load policy modules from disk: explicit files first, then glob matches.

use anyhow::Context;
use attestgate_domain::{PolicyModule, module_digest};
use attestgate_settings::ResolvedConfig;
use attestgate_types::RepoPath;
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSetBuilder};
use std::collections::BTreeSet;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A policy module plus where it came from.
#[derive(Clone, Debug)]
pub struct LoadedModule {
    pub module: PolicyModule,
    pub path: RepoPath,
    pub sha256: String,
}

/// Load every configured module, in evaluation order.
///
/// Explicit modules keep their configured order; glob matches follow in sorted path
/// order. A file already loaded is not loaded twice.
pub fn load_modules(root: &Utf8Path, cfg: &ResolvedConfig) -> anyhow::Result<Vec<LoadedModule>> {
    let mut loaded = Vec::new();
    let mut seen: BTreeSet<RepoPath> = BTreeSet::new();

    for source in &cfg.modules {
        let full = root.join(&source.path);
        let rel = RepoPath::relative_to(&full, root);
        if !seen.insert(rel.clone()) {
            debug!(path = %rel, "policy file listed twice; keeping first");
            continue;
        }
        let name = source.name.clone().unwrap_or_else(|| rel.to_string());
        loaded.push(read_module(&full, rel, name)?);
    }

    for full in expand_patterns(root, &cfg.patterns)? {
        let rel = RepoPath::relative_to(&full, root);
        if !seen.insert(rel.clone()) {
            continue;
        }
        let name = rel.to_string();
        loaded.push(read_module(&full, rel, name)?);
    }

    debug!(modules = loaded.len(), "loaded policy modules");
    Ok(loaded)
}

fn read_module(full: &Utf8Path, path: RepoPath, name: String) -> anyhow::Result<LoadedModule> {
    let source = std::fs::read_to_string(full)
        .with_context(|| format!("read policy module: {full}"))?;
    Ok(LoadedModule {
        sha256: module_digest(&source),
        module: PolicyModule::new(name, source),
        path,
    })
}

/// Files under `root` matching any pattern, sorted by root-relative path.
fn expand_patterns(root: &Utf8Path, patterns: &[String]) -> anyhow::Result<Vec<Utf8PathBuf>> {
    if patterns.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder = GlobSetBuilder::new();
    for p in patterns {
        builder.add(Glob::new(p).with_context(|| format!("invalid policy glob: {p}"))?);
    }
    let set = builder.build().context("build policy glob set")?;

    let mut matched = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.with_context(|| format!("walk policy root: {root}"))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(path) = Utf8Path::from_path(entry.path()) else {
            warn!(path = %entry.path().display(), "skipping non-UTF-8 path");
            continue;
        };
        let rel = RepoPath::relative_to(path, root);
        if set.is_match(rel.as_str()) {
            matched.push(path.to_path_buf());
        }
    }

    matched.sort_by(|a, b| {
        RepoPath::relative_to(a, root).cmp(&RepoPath::relative_to(b, root))
    });
    Ok(matched)
}
