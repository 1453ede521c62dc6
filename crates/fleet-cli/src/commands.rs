//! Command implementations

use std::path::Path;

use colored::Colorize;
use tracing::info;

use fleet_core::{
    DiffPlan, FingerprintStore, FleetConfig, IdentityDirectory, Reconciler, SourceSync,
    build_desired, check_tree, load_transforms,
};
use fleet_system::{GitSource, HostDeployer};
use fleet_unit::{UnitDocument, merge};

use crate::error::{CliError, Result};

/// Run one full reconciliation cycle.
pub fn run_sync(config_path: &Path, dry_run: bool) -> Result<()> {
    let config = FleetConfig::load(config_path)?;
    std::fs::create_dir_all(&config.paths.state_dir)?;

    let mut source = GitSource::new(
        &config.source.url,
        &config.source.branch,
        config.repo_dir(),
    );
    let outcome = source.sync()?;
    info!(
        root = %outcome.root.display(),
        changed = outcome.changed,
        "source tree synchronized"
    );

    let transforms = load_transforms(&config.paths.transform_dir)?;
    let desired = build_desired(&outcome.root, &transforms)?;

    let mut deployer = HostDeployer::new(&config.identity.group);
    let managed = deployer.users().managed()?;
    let store = FingerprintStore::open(&config.fingerprint_dir())?;

    if dry_run {
        print_plan(&DiffPlan::compute(&desired, &managed), &desired, &store);
        return Ok(());
    }

    let report = Reconciler::new(&store, &mut deployer).run(&desired, &managed);

    println!(
        "{} {} created, {} updated, {} unchanged, {} removed",
        "sync:".green().bold(),
        report.created.len(),
        report.updated.len(),
        report.unchanged.len(),
        report.removed.len(),
    );
    for failure in &report.failures {
        eprintln!(
            "{} {} ({:?}): {}",
            "failed".red().bold(),
            failure.name,
            failure.stage,
            failure.message
        );
    }

    if report.clean() {
        Ok(())
    } else {
        Err(CliError::user(format!(
            "{} entity action(s) failed; affected entities retry next cycle",
            report.failures.len()
        )))
    }
}

fn print_plan(plan: &DiffPlan, desired: &fleet_core::DesiredState, store: &FingerprintStore) {
    for name in &plan.to_create {
        println!("{} {}", "would create".green(), name);
    }
    for name in &plan.to_evaluate {
        if store.changed(name, &desired[name]) {
            println!("{} {}", "would update".cyan(), name);
        } else {
            println!("{} {}", "unchanged   ".dimmed(), name);
        }
    }
    for name in &plan.to_remove {
        println!("{} {}", "would remove".red(), name);
    }
    if plan.is_empty() {
        println!("nothing to do");
    }
}

/// Validate a tree of unit files, printing every finding.
pub fn run_check(dir: &Path) -> Result<()> {
    let findings = check_tree(dir)?;
    if findings.is_empty() {
        println!("{}", "All checks passed.".green());
        return Ok(());
    }
    for finding in &findings {
        eprintln!("{}", finding);
    }
    Err(CliError::user(format!(
        "{} validation finding(s)",
        findings.len()
    )))
}

/// Print the merged form of one spec file to stdout.
///
/// The transform is chosen by the file's parent directory name; with no
/// matching transform the spec is printed as parsed.
pub fn run_augment(config_path: &Path, file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .map_err(|e| CliError::user(format!("reading {}: {e}", file.display())))?;
    let spec = UnitDocument::parse(&text);

    let config = FleetConfig::load(config_path)?;
    let transforms = load_transforms(&config.paths.transform_dir)?;

    let group = file
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str());

    match group.and_then(|g| transforms.get(g)) {
        Some(transform) => print!("{}", merge(&spec, transform).render()),
        None => print!("{}", spec.render()),
    }
    Ok(())
}
