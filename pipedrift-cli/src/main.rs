#![deny(missing_docs)]
//! Pipedrift command-line interface.
//!
//! Fetches GitHub Actions workflows for a set of repositories and prints
//! a duplication and version-drift report.

mod github;

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use github::GithubHost;
use log::info;
use pipedrift_core::{Report, generate_report};

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser)]
#[command(name = "pipedrift", version, about = "Workflow duplication report")]
struct Cli {
    /// Repositories to compare, as owner/name or full GitHub URLs.
    #[arg(required = true, num_args = 1..)]
    repos: Vec<String>,
    /// GitHub token used to authenticate API requests.
    #[arg(long, env = "GITHUB_TOKEN")]
    token: Option<String>,
    /// GitHub API base URL.
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    api_url: String,
    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Write the report to a file instead of stdout.
    #[arg(long = "report-output")]
    report_output: Option<PathBuf>,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum OutputFormat {
    /// Human-readable summary.
    Text,
    /// Full report as JSON.
    Json,
}

fn main() -> CliResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let host = GithubHost::new(&cli.api_url, cli.token.clone(), "pipedrift");
    info!("comparing {} repositories", cli.repos.len());
    let report = generate_report(&host, &cli.repos);

    let rendered = match cli.format {
        OutputFormat::Text => render_text(&report)?,
        OutputFormat::Json => serde_json::to_string_pretty(&report)?,
    };

    match &cli.report_output {
        Some(path) => fs::write(path, rendered)?,
        None => println!("{rendered}"),
    }

    Ok(())
}

/// Render the human-readable report summary.
fn render_text(report: &Report) -> CliResult<String> {
    let mut out = String::new();
    writeln!(out, "Repositories compared: {}", report.repo_count)?;
    writeln!(
        out,
        "Repositories with duplication or drift: {}",
        report.repos_with_duplication_or_drift
    )?;
    writeln!(
        out,
        "Unique contributors: {}",
        report.unique_contributors.len()
    )?;

    for (repo, comparisons) in &report.comparisons {
        let advisories = report.advisories.get(repo).map_or(0, Vec::len);
        let contributors = report.contributors.get(repo).map_or(0, Vec::len);
        writeln!(out)?;
        writeln!(
            out,
            "{repo} (advisories: {advisories}, contributors: {contributors})"
        )?;
        for (other, measurements) in comparisons {
            writeln!(out, "  vs {other}")?;
            writeln!(
                out,
                "    duplication risk steps: {}",
                measurements.duplication_risk_count
            )?;
            writeln!(
                out,
                "    different versions: {} [{}]",
                measurements.steps_with_different_versions_count,
                measurements.steps_with_different_versions.join(", ")
            )?;
            writeln!(
                out,
                "    similar config: {} [{}]",
                measurements.steps_with_similar_config_count,
                measurements.steps_with_similar_config.join(", ")
            )?;
        }
    }

    Ok(out)
}
