//! End-to-end pipeline: personnel API → profile pages → sort → artifacts.

use std::time::{Duration, Instant};

use tracing::{info, instrument};

use despachos_artifacts::ArtifactPaths;
use despachos_directory::{DirectoryClient, is_office_code};
use despachos_shared::{AppConfig, DirectoryConfig, ResolvedEntry, Result};

/// Configuration for a pipeline run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory endpoints and query filters.
    pub directory: DirectoryConfig,
    /// Output path prefix (`<prefix>.txt`, `<prefix>.md`, `<prefix>.csv`).
    pub prefix: String,
}

impl From<&AppConfig> for RunConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            directory: config.directory.clone(),
            prefix: config.output.prefix.clone(),
        }
    }
}

/// Result of a pipeline run.
#[derive(Debug)]
pub struct RunResult {
    /// Entries as written, sorted by name.
    pub entries: Vec<ResolvedEntry>,
    /// Files produced.
    pub paths: ArtifactPaths,
    /// Records returned by the personnel API.
    pub people: usize,
    /// Records skipped for lacking a name or an email.
    pub skipped: usize,
    /// Profile pages that could not be downloaded.
    pub failed_lookups: usize,
    /// Entries that ended up with the placeholder office.
    pub unresolved: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each person's record has been handled.
    fn person_done(&self, name: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &RunResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn person_done(&self, _name: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &RunResult) {}
}

/// Sort entries by name, ignoring case. Equal names keep their input order.
pub fn sort_entries(entries: &mut [ResolvedEntry]) {
    entries.sort_by_cached_key(|entry| entry.name.to_lowercase());
}

/// Run the full pipeline.
///
/// 1. Fetch the personnel list (fatal on failure)
/// 2. Look up each person's office, one request at a time
/// 3. Sort by name
/// 4. Write the three artifacts (fatal on failure)
#[instrument(skip_all, fields(prefix = %config.prefix))]
pub async fn run(config: &RunConfig, progress: &dyn ProgressReporter) -> Result<RunResult> {
    let start = Instant::now();
    let client = DirectoryClient::new(&config.directory)?;

    // --- Phase 1: Personnel ---
    progress.phase("Fetching personnel list");
    let people = client.fetch_personnel().await?;
    let total = people.len();

    // --- Phase 2: Offices ---
    progress.phase("Looking up offices");
    let mut entries = Vec::with_capacity(total);
    let mut skipped = 0;
    let mut failed_lookups = 0;

    for (i, person) in people.iter().enumerate() {
        match client.resolve(person).await {
            Some(resolution) => {
                if resolution.lookup.is_failed() {
                    failed_lookups += 1;
                }
                entries.push(resolution.entry);
            }
            None => skipped += 1,
        }
        progress.person_done(&person.name, i + 1, total);
    }

    // --- Phase 3: Sort ---
    sort_entries(&mut entries);

    // --- Phase 4: Artifacts ---
    progress.phase("Writing output files");
    let paths = despachos_artifacts::write_all(&entries, &config.prefix)?;

    let unresolved = entries
        .iter()
        .filter(|entry| !is_office_code(&entry.office))
        .count();

    let result = RunResult {
        entries,
        paths,
        people: total,
        skipped,
        failed_lookups,
        unresolved,
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        people = result.people,
        written = result.entries.len(),
        skipped = result.skipped,
        failed_lookups = result.failed_lookups,
        unresolved = result.unresolved,
        elapsed_ms = result.elapsed.as_millis(),
        "pipeline completed"
    );

    Ok(result)
}
