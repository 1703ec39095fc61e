use super::config::ComputeSettings;
use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use crate::core::descriptors::DescriptorProvider;
use crate::core::descriptors::config::DescriptorConfig;
use crate::core::models::descriptor::{ComputeFailure, DescriptorOutcome};
use crate::core::models::molecule::MoleculeRecord;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;
use tracing::{debug, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug)]
pub(crate) struct WorkUnit<'a> {
    pub index: usize,
    pub record: &'a MoleculeRecord,
}

type WorkResult = (usize, DescriptorOutcome);

#[instrument(skip_all, name = "descriptor_dispatch", fields(units = pending.len(), workers = settings.worker_count))]
pub(crate) fn run(
    pending: &[WorkUnit<'_>],
    provider: &dyn DescriptorProvider,
    config: &DescriptorConfig,
    settings: &ComputeSettings,
    reporter: &ProgressReporter,
) -> Result<Vec<WorkResult>, EngineError> {
    if pending.is_empty() {
        return Ok(Vec::new());
    }

    reporter.report(Progress::BatchStart {
        total_units: pending.len() as u64,
    });

    let results = if settings.worker_count <= 1 {
        run_sequential(pending, provider, config, settings, reporter)
    } else {
        run_parallel(pending, provider, config, settings, reporter)?
    };

    reporter.report(Progress::BatchFinish);
    Ok(results)
}

fn run_sequential(
    pending: &[WorkUnit<'_>],
    provider: &dyn DescriptorProvider,
    config: &DescriptorConfig,
    settings: &ComputeSettings,
    reporter: &ProgressReporter,
) -> Vec<WorkResult> {
    pending
        .iter()
        .map(|unit| compute_unit(unit, provider, config, settings, reporter))
        .collect()
}

#[cfg(feature = "parallel")]
fn run_parallel(
    pending: &[WorkUnit<'_>],
    provider: &dyn DescriptorProvider,
    config: &DescriptorConfig,
    settings: &ComputeSettings,
    reporter: &ProgressReporter,
) -> Result<Vec<WorkResult>, EngineError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(settings.worker_count)
        .thread_name(|index| format!("moldesc-worker-{index}"))
        .build()?;

    Ok(pool.install(|| {
        pending
            .par_iter()
            .map(|unit| compute_unit(unit, provider, config, settings, reporter))
            .collect()
    }))
}

#[cfg(not(feature = "parallel"))]
fn run_parallel(
    pending: &[WorkUnit<'_>],
    provider: &dyn DescriptorProvider,
    config: &DescriptorConfig,
    settings: &ComputeSettings,
    reporter: &ProgressReporter,
) -> Result<Vec<WorkResult>, EngineError> {
    warn!(
        requested_workers = settings.worker_count,
        "Parallel feature is disabled; running units sequentially."
    );
    Ok(run_sequential(pending, provider, config, settings, reporter))
}

fn compute_unit(
    unit: &WorkUnit<'_>,
    provider: &dyn DescriptorProvider,
    config: &DescriptorConfig,
    settings: &ComputeSettings,
    reporter: &ProgressReporter,
) -> WorkResult {
    let started = Instant::now();

    let outcome = match catch_unwind(AssertUnwindSafe(|| provider.compute(unit.record, config))) {
        Ok(outcome) => outcome,
        Err(payload) => {
            warn!(
                index = unit.index,
                "Descriptor computation panicked; recording failure and continuing."
            );
            Err(ComputeFailure::computation_error(format!(
                "descriptor computation panicked: {}",
                panic_message(payload.as_ref())
            )))
        }
    };

    // Cooperative deadline: an overrunning unit is marked once it returns,
    // so a result reaches the cache only after its worker fully finished.
    let outcome = match settings.unit_timeout {
        Some(budget) if started.elapsed() > budget => Err(ComputeFailure::timeout(format!(
            "computation exceeded the {budget:?} unit budget"
        ))),
        _ => outcome,
    };

    if let Err(failure) = &outcome {
        debug!(index = unit.index, %failure, "Unit finished with failure.");
    }

    reporter.report(Progress::UnitsCompleted { amount: 1 });
    (unit.index, outcome)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}
