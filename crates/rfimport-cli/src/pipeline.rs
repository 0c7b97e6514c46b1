//! Import pipeline
//!
//! `list -> filter -> skip ledger members -> truncate(sample_size) ->
//! for each: sign -> upload -> record`.
//!
//! [`PipelineDriver::plan`] covers everything up to the upload loop and never
//! touches the ledger file, so `status` and `run --dry-run` share it with
//! real runs. [`PipelineDriver::execute`] works through the plan one object at
//! a time and saves the ledger after every acknowledged upload.

use crate::api::DatasetUploader;
use crate::error::Result;
use crate::filter::ObjectFilter;
use crate::ledger::UploadLedger;
use crate::store::ObjectStore;
use indicatif::ProgressBar;
use rfimport_common::{ObjectId, UploadOutcome};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Run parameters resolved from config and command line
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub container: String,
    pub filter: ObjectFilter,
    pub sample_size: Option<usize>,
    pub split: String,
    pub url_ttl: Duration,
}

/// Objects selected for upload and how the listing was narrowed down
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunPlan {
    /// Everything the store returned
    pub listed: usize,
    /// Dropped by prefix, extension or directory-marker rules
    pub filtered_out: usize,
    /// Skipped because the ledger already holds them
    pub already_uploaded: usize,
    /// Left for a later run by `sample_size`
    pub deferred: usize,
    /// To be uploaded now, in listing order
    pub pending: Vec<ObjectId>,
}

impl RunPlan {
    /// Objects not yet in the ledger, including deferred ones
    pub fn outstanding(&self) -> usize {
        self.pending.len() + self.deferred
    }
}

/// Per-object failure kept for the end-of-run report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectFailure {
    pub object_id: ObjectId,
    pub reason: String,
}

/// Counts for one executed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub listed: usize,
    pub filtered_out: usize,
    pub already_uploaded: usize,
    pub deferred: usize,
    pub attempted: usize,
    pub uploaded: usize,
    pub duplicates: usize,
    pub failed: usize,
    pub signing_errors: usize,
    pub failures: Vec<ObjectFailure>,
}

impl RunSummary {
    fn from_plan(plan: &RunPlan) -> Self {
        Self {
            listed: plan.listed,
            filtered_out: plan.filtered_out,
            already_uploaded: plan.already_uploaded,
            deferred: plan.deferred,
            ..Default::default()
        }
    }

    /// Objects newly recorded in the ledger this run
    pub fn recorded(&self) -> usize {
        self.uploaded + self.duplicates
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Drives one import from a single container into one dataset
pub struct PipelineDriver {
    store: Arc<dyn ObjectStore>,
    settings: PipelineSettings,
}

impl PipelineDriver {
    pub fn new(store: Arc<dyn ObjectStore>, settings: PipelineSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// List the container and select what this run should upload.
    ///
    /// A listing failure is fatal: nothing can be planned without it.
    #[instrument(skip(self, ledger), fields(container = %self.settings.container))]
    pub async fn plan(&self, ledger: &UploadLedger) -> Result<RunPlan> {
        let listed = self.store.list(&self.settings.container).await?;
        let listed_count = listed.len();

        let candidates = self.settings.filter.apply(listed);
        let filtered_out = listed_count - candidates.len();

        let (done, mut pending): (Vec<ObjectId>, Vec<ObjectId>) =
            candidates.into_iter().partition(|id| ledger.contains(id));

        let deferred = match self.settings.sample_size {
            Some(limit) if pending.len() > limit => {
                let deferred = pending.len() - limit;
                pending.truncate(limit);
                deferred
            }
            _ => 0,
        };

        info!(
            listed = listed_count,
            filtered_out,
            already_uploaded = done.len(),
            pending = pending.len(),
            deferred,
            "Planned run"
        );

        Ok(RunPlan {
            listed: listed_count,
            filtered_out,
            already_uploaded: done.len(),
            deferred,
            pending,
        })
    }

    /// Sign and upload every pending object in order.
    ///
    /// Signing errors and upload failures are recorded and skipped. Any other
    /// error, including a failed ledger save, aborts the run; objects already
    /// saved stay recorded.
    #[instrument(skip_all, fields(container = %self.settings.container, pending = plan.pending.len()))]
    pub async fn execute(
        &self,
        plan: RunPlan,
        ledger: &mut UploadLedger,
        uploader: &DatasetUploader,
        progress: &ProgressBar,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::from_plan(&plan);

        for object_id in plan.pending {
            progress.set_message(object_id.to_string());

            let url = match self
                .store
                .sign(&self.settings.container, &object_id, self.settings.url_ttl)
                .await
            {
                Ok(url) => url,
                Err(e) if !e.is_fatal() => {
                    warn!(object_id = %object_id, error = %e, "Skipping object that could not be signed");
                    summary.signing_errors += 1;
                    summary.failures.push(ObjectFailure {
                        object_id,
                        reason: e.to_string(),
                    });
                    progress.inc(1);
                    continue;
                }
                Err(e) => return Err(e),
            };

            debug!(object_id = %object_id, "Signed object");
            summary.attempted += 1;

            let outcome = uploader.upload(&url, None, &self.settings.split).await;
            debug!(object_id = %object_id, outcome = outcome.label(), "Upload finished");

            match outcome {
                UploadOutcome::Success { .. } => summary.uploaded += 1,
                UploadOutcome::Duplicate => summary.duplicates += 1,
                UploadOutcome::Failure { reason } => {
                    summary.failed += 1;
                    summary.failures.push(ObjectFailure { object_id, reason });
                    progress.inc(1);
                    continue;
                }
            }

            if ledger.add(object_id) {
                ledger.save()?;
            }
            progress.inc(1);
        }

        info!(
            attempted = summary.attempted,
            uploaded = summary.uploaded,
            duplicates = summary.duplicates,
            failed = summary.failed,
            signing_errors = summary.signing_errors,
            "Run complete"
        );

        Ok(summary)
    }

    /// Plan and execute in one go
    pub async fn run(
        &self,
        ledger: &mut UploadLedger,
        uploader: &DatasetUploader,
        progress: &ProgressBar,
    ) -> Result<RunSummary> {
        let plan = self.plan(ledger).await?;
        progress.set_length(plan.pending.len() as u64);
        self.execute(plan, ledger, uploader, progress).await
    }
}
