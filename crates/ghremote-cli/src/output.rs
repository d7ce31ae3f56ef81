//! Rendering of command results.

use std::path::Path;

use anyhow::Result;
use console::style;
use serde_json::{Value, json};

use ghremote_core::config::RemoteConfig;
use ghremote_core::error::RemoteError;
use ghremote_core::pipeline::{BatchItem, Built, FetchOutcome, FetchReport};
use ghremote_core::spec::RepoSpec;

use crate::OutputFormat;

fn print_failure(spec: &str, err: &dyn std::fmt::Display) {
    eprintln!("{} {}: {}", style("✗").red(), spec, err);
}

fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        println!("  {} {}", style("⚠").yellow(), warning);
    }
}

fn error_json(spec: &str, err: &RemoteError) -> Value {
    json!({
        "spec": spec,
        "error": err.to_string(),
        "status": err.status(),
    })
}

fn print_json_items(items: Vec<Value>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&Value::Array(items))?);
    Ok(())
}

fn parsed_json(items: &[BatchItem<RepoSpec>]) -> Vec<Value> {
    items
        .iter()
        .map(|item| match &item.result {
            Ok(spec) => json!({
                "spec": item.spec,
                "parsed": spec,
                "needs_lookup": spec.selector.as_ref().is_some_and(|s| s.needs_lookup()),
            }),
            Err(err) => error_json(&item.spec, err),
        })
        .collect()
}

fn resolved_json(items: &[BatchItem<Built>]) -> Vec<Value> {
    items
        .iter()
        .map(|item| match &item.result {
            Ok(built) => {
                let descriptor = &built.descriptor;
                json!({
                    "spec": item.spec,
                    "host": descriptor.host(),
                    "owner": descriptor.owner(),
                    "repo": descriptor.repo(),
                    "subdir": descriptor.subdir(),
                    "ref": descriptor.reference(),
                    "warnings": built.warnings,
                })
            }
            Err(err) => error_json(&item.spec, err),
        })
        .collect()
}

fn fetched_json(items: &[BatchItem<FetchReport>]) -> Vec<Value> {
    items
        .iter()
        .map(|item| match &item.result {
            Ok(report) => {
                let archive = match &report.outcome {
                    FetchOutcome::Fetched { archive } => Some(archive.display().to_string()),
                    FetchOutcome::UpToDate => None,
                };
                json!({
                    "spec": item.spec,
                    "up_to_date": report.is_up_to_date(),
                    "archive": archive,
                    "record": report.record,
                    "warnings": report.warnings,
                })
            }
            Err(err) => error_json(&item.spec, err),
        })
        .collect()
}

pub fn print_parsed(items: &[BatchItem<RepoSpec>], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            for item in items {
                match &item.result {
                    Ok(spec) => {
                        println!("{} {}", style("✓").green(), style(spec).bold());
                        println!("  owner:    {}", spec.owner.as_deref().unwrap_or("-"));
                        println!("  repo:     {}", spec.repo);
                        println!("  subdir:   {}", spec.subdir.as_deref().unwrap_or("-"));
                        match &spec.selector {
                            Some(selector) if selector.needs_lookup() => println!(
                                "  selector: {} ({}, resolved through the API)",
                                selector,
                                selector.kind()
                            ),
                            Some(selector) => {
                                println!("  selector: {} ({})", selector, selector.kind())
                            }
                            None => println!("  selector: -"),
                        }
                    }
                    Err(err) => print_failure(&item.spec, err),
                }
            }
        }
        OutputFormat::Json => print_json_items(parsed_json(items))?,
        OutputFormat::Quiet => print_quiet(items),
    }
    Ok(())
}

pub fn print_resolved(items: &[BatchItem<Built>], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            for item in items {
                match &item.result {
                    Ok(built) => {
                        println!(
                            "{} {} -> {}",
                            style("✓").green(),
                            item.spec,
                            style(&built.descriptor).bold()
                        );
                        print_warnings(&built.warnings);
                    }
                    Err(err) => print_failure(&item.spec, err),
                }
            }
        }
        OutputFormat::Json => print_json_items(resolved_json(items))?,
        OutputFormat::Quiet => print_quiet(items),
    }
    Ok(())
}

pub fn print_fetched(items: &[BatchItem<FetchReport>], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            for item in items {
                match &item.result {
                    Ok(report) => {
                        match &report.outcome {
                            FetchOutcome::Fetched { archive } => {
                                println!(
                                    "{} Fetched {} at {}",
                                    style("✓").green(),
                                    style(&report.descriptor).bold(),
                                    report.record.sha
                                );
                                println!("  {}", archive.display());
                            }
                            FetchOutcome::UpToDate => println!(
                                "• {} is up to date at {}",
                                report.descriptor, report.record.sha
                            ),
                        }
                        print_warnings(&report.warnings);
                    }
                    Err(err) => print_failure(&item.spec, err),
                }
            }
        }
        OutputFormat::Json => print_json_items(fetched_json(items))?,
        OutputFormat::Quiet => print_quiet(items),
    }
    Ok(())
}

pub fn print_shas(
    rows: &[(&Path, anyhow::Result<Option<String>>)],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Table => {
            for (path, sha) in rows {
                match sha {
                    Ok(Some(sha)) => println!("{}  {}", sha, path.display()),
                    Ok(None) => println!("{}  {}", style("-").dim(), path.display()),
                    Err(err) => print_failure(&path.display().to_string(), &format!("{err:#}")),
                }
            }
        }
        OutputFormat::Json => {
            let output = rows
                .iter()
                .map(|(path, sha)| match sha {
                    Ok(sha) => json!({ "archive": path.display().to_string(), "sha": sha }),
                    Err(err) => json!({
                        "archive": path.display().to_string(),
                        "error": format!("{err:#}"),
                    }),
                })
                .collect();
            print_json_items(output)?;
        }
        OutputFormat::Quiet => {
            for (path, sha) in rows {
                if let Err(err) = sha {
                    print_failure(&path.display().to_string(), &format!("{err:#}"));
                }
            }
        }
    }
    Ok(())
}

fn config_json(config: &RemoteConfig, path: &Path, saved: bool) -> Result<Value> {
    let mut value = serde_json::to_value(config)?;
    if let Value::Object(map) = &mut value {
        map.insert("authenticated".to_string(), json!(config.auth_token.is_some()));
        map.insert("path".to_string(), json!(path.display().to_string()));
        map.insert("saved".to_string(), json!(saved));
    }
    Ok(value)
}

pub fn print_config(
    config: &RemoteConfig,
    path: &Path,
    saved: bool,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Table => {
            if saved {
                println!("{} Saved {}", style("✓").green(), path.display());
            } else {
                println!("Config: {}", path.display());
            }
            println!("  host:           {}", config.host);
            println!("  token_env:      {}", config.token_env);
            println!(
                "  authenticated:  {}",
                if config.auth_token.is_some() { "yes" } else { "no" }
            );
            println!(
                "  default_owner:  {}",
                config.default_owner.as_deref().unwrap_or("-")
            );
            println!(
                "  default_subdir: {}",
                config.default_subdir.as_deref().unwrap_or("-")
            );
            println!("  default_ref:    {}", config.default_ref);
        }
        OutputFormat::Json => {
            let value = config_json(config, path, saved)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Quiet => {}
    }
    Ok(())
}

fn print_quiet<T>(items: &[BatchItem<T>]) {
    for item in items {
        if let Err(err) = &item.result {
            print_failure(&item.spec, err);
        }
    }
}
