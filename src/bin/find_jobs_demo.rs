//! Demo: extract a CV file, analyze it and print the aggregated job list.
//! Usage: find_jobs_demo <cv-file> [location] [limit]

use anyhow::Context;
use smartcv_job_finder::{extract::extract_text, profile::analyze_cv_text, AppConfig, JobFinder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let mut args = std::env::args().skip(1);
    let path = args.next().context("usage: find_jobs_demo <cv-file> [location] [limit]")?;
    let location = args.next();
    let limit = args
        .next()
        .map(|l| l.parse::<i64>())
        .transpose()
        .context("limit must be an integer")?;

    let bytes = std::fs::read(&path).with_context(|| format!("reading {path}"))?;
    let text = extract_text(&bytes, &path, None)?;
    let profile = analyze_cv_text(&text);
    println!("{}", serde_json::to_string_pretty(&profile)?);

    let cfg = AppConfig::from_env();
    let location = location.unwrap_or_else(|| cfg.default_location.clone());
    let finder = JobFinder::from_config(&cfg);

    let result = finder.find_jobs(&profile, Some(&location), limit).await?;
    for report in &result.sources {
        println!("source {}: {:?}", report.source, report.status);
    }
    for (i, job) in result.jobs.iter().enumerate() {
        println!(
            "{:>2}. {} @ {} ({}) [{}]\n    {}",
            i + 1,
            job.title,
            job.company,
            job.location,
            job.source,
            job.apply_link
        );
    }
    println!(
        "fetched={} dropped={} duplicates={} returned={}",
        result.stats.fetched,
        result.stats.dropped,
        result.stats.duplicates,
        result.jobs.len()
    );
    Ok(())
}
