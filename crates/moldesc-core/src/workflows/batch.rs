use crate::core::descriptors::DescriptorProvider;
use crate::core::descriptors::config::DescriptorConfig;
use crate::core::descriptors::fingerprint::FingerprintProvider;
use crate::core::descriptors::geometry::GlobalGeometryProvider;
use crate::core::descriptors::local_environment::LocalEnvironmentProvider;
use crate::core::descriptors::random::RandomProjectionProvider;
use crate::core::models::descriptor::{DescriptorOutcome, FailureKind};
use crate::core::models::molecule::MoleculeRecord;
use crate::engine::cache::{CacheKey, DescriptorCache};
use crate::engine::config::ComputeSettings;
use crate::engine::dispatcher::{self, WorkUnit};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::{debug, error, info, instrument, warn};

/// Summary counters for one batch call.
///
/// `cache_hits` counts indices answered from the cache, `computed` counts
/// units actually dispatched (identical requests are deduplicated before
/// dispatch, so this can be smaller than the number of misses), and
/// `failures` counts failure outcomes in the returned sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchStats {
    pub cache_hits: usize,
    pub computed: usize,
    pub failures: usize,
}

/// The result of a batch computation: one outcome per input molecule, in
/// input order, plus summary counters.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub outcomes: Vec<DescriptorOutcome>,
    pub stats: BatchStats,
}

/// The public entry point of moldesc.
///
/// A `DescriptorEngine` owns the descriptor cache (whose lifetime is the
/// engine instance's) and the provider registry. Optimization frameworks
/// create one engine per run and call [`compute_batch`](Self::compute_batch)
/// once per population; repeated requests across generations are answered
/// from the cache.
pub struct DescriptorEngine {
    providers: Vec<Box<dyn DescriptorProvider>>,
    cache: DescriptorCache,
}

impl Default for DescriptorEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorEngine {
    /// Creates an engine with the built-in providers and an unbounded cache.
    pub fn new() -> Self {
        Self {
            providers: builtin_providers(),
            cache: DescriptorCache::new(),
        }
    }

    /// Creates an engine with the built-in providers and a cache bounded to
    /// `capacity` entries (least-recently-used eviction).
    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self {
            providers: builtin_providers(),
            cache: DescriptorCache::with_capacity(capacity),
        }
    }

    /// Creates an engine with only the given providers, for hosts that
    /// supply their own numerical library and want no built-ins at all.
    pub fn with_providers(providers: Vec<Box<dyn DescriptorProvider>>) -> Self {
        Self {
            providers,
            cache: DescriptorCache::new(),
        }
    }

    /// Registers an additional provider. Later registrations take precedence,
    /// so an external numerical library can override the built-in provider
    /// for its variant.
    pub fn register_provider(&mut self, provider: Box<dyn DescriptorProvider>) {
        self.providers.insert(0, provider);
    }

    fn resolve_provider(
        &self,
        config: &DescriptorConfig,
    ) -> Result<&dyn DescriptorProvider, EngineError> {
        self.providers
            .iter()
            .find(|provider| provider.variant() == config.variant())
            .map(|provider| provider.as_ref())
            .ok_or_else(|| EngineError::UnknownDescriptor {
                variant: config.variant().to_string(),
            })
    }

    /// Computes descriptors for an ordered batch of molecules.
    ///
    /// The returned outcome sequence is positionally aligned with the input
    /// and always has the same length: molecule-local problems (invalid
    /// structure, computation failure, timeout) are recorded at their index
    /// and never abort the call. Only batch-level problems (empty input, a
    /// variant no provider serves, a corrupted cache) surface as an error.
    #[instrument(
        skip_all,
        name = "compute_batch",
        fields(batch_size = molecules.len(), variant = config.variant())
    )]
    pub fn compute_batch(
        &self,
        molecules: &[MoleculeRecord],
        config: &DescriptorConfig,
        settings: &ComputeSettings,
        reporter: &ProgressReporter,
    ) -> Result<BatchResult, EngineError> {
        if molecules.is_empty() {
            return Err(EngineError::EmptyBatch);
        }

        let provider = self.resolve_provider(config)?;

        // === Phase 0: Configuration validation ===
        let expected_len = match provider.descriptor_len(config) {
            Ok(len) => len,
            Err(failure) => {
                warn!(%failure, "Descriptor configuration rejected; failing every index without dispatch.");
                let failures = molecules.len();
                return Ok(BatchResult {
                    outcomes: vec![Err(failure); molecules.len()],
                    stats: BatchStats {
                        cache_hits: 0,
                        computed: 0,
                        failures,
                    },
                });
            }
        };

        // === Phase 1: Molecule validation and cache partition ===
        reporter.report(Progress::PhaseStart {
            name: "Cache Lookup",
        });

        let mut outcomes: Vec<Option<DescriptorOutcome>> = vec![None; molecules.len()];
        let mut cache_hits = 0usize;
        let mut pending: Vec<WorkUnit> = Vec::new();
        let mut fanout: HashMap<CacheKey, Vec<usize>> = HashMap::new();
        let mut key_by_representative: HashMap<usize, CacheKey> = HashMap::new();

        for (index, record) in molecules.iter().enumerate() {
            if let Err(failure) = record.validate() {
                debug!(index, %failure, "Rejecting molecule before dispatch.");
                outcomes[index] = Some(Err(failure));
                continue;
            }

            let key = CacheKey::for_request(record, config);
            if let Some(outcome) = self.cache.get(&key) {
                if let Ok(value) = &outcome {
                    if value.len() != expected_len {
                        error!(
                            index,
                            cached_len = value.len(),
                            expected_len,
                            "Cached descriptor shape does not match the configuration."
                        );
                        return Err(EngineError::CacheCorruption {
                            message: format!(
                                "cached descriptor for '{}' has {} elements, expected {}",
                                record.identity(),
                                value.len(),
                                expected_len
                            ),
                        });
                    }
                }
                outcomes[index] = Some(outcome);
                cache_hits += 1;
                continue;
            }

            match fanout.entry(key) {
                Entry::Occupied(mut entry) => entry.get_mut().push(index),
                Entry::Vacant(entry) => {
                    entry.insert(vec![index]);
                    key_by_representative.insert(index, key);
                    pending.push(WorkUnit { index, record });
                }
            }
        }

        reporter.report(Progress::PhaseFinish);
        info!(
            cache_hits,
            pending = pending.len(),
            "Cache partition complete."
        );

        // === Phase 2: Dispatch cache misses ===
        let computed = pending.len();
        let fresh = dispatcher::run(&pending, provider, config, settings, reporter)?;

        // === Phase 3: Cache writes and order restoration ===
        reporter.report(Progress::PhaseStart {
            name: "Finalization",
        });

        for (representative, outcome) in fresh {
            let key = key_by_representative
                .get(&representative)
                .copied()
                .ok_or_else(|| {
                    EngineError::Internal(format!(
                        "Dispatcher returned untracked index {representative}"
                    ))
                })?;
            let indices = fanout.get(&key).ok_or_else(|| {
                EngineError::Internal(format!(
                    "No fan-out recorded for dispatched index {representative}"
                ))
            })?;

            let cacheable = match &outcome {
                Ok(_) => true,
                Err(failure) => settings.cache_failures && failure.kind != FailureKind::Timeout,
            };
            if cacheable {
                self.cache.put(key, outcome.clone());
            }

            for &index in indices {
                outcomes[index] = Some(outcome.clone());
            }
        }

        reporter.report(Progress::PhaseFinish);

        let outcomes = outcomes
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| {
                    EngineError::Internal(format!("No outcome recorded for index {index}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let failures = outcomes.iter().filter(|outcome| outcome.is_err()).count();
        info!(cache_hits, computed, failures, "Batch complete.");

        Ok(BatchResult {
            outcomes,
            stats: BatchStats {
                cache_hits,
                computed,
                failures,
            },
        })
    }

    /// Drops the cached outcome for one (molecule, configuration) pair,
    /// forcing recomputation on the next request for that key only.
    pub fn invalidate(&self, record: &MoleculeRecord, config: &DescriptorConfig) -> bool {
        self.cache.invalidate(&CacheKey::for_request(record, config))
    }

    /// Number of cached (molecule, configuration) outcomes.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Drops every cached outcome.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

fn builtin_providers() -> Vec<Box<dyn DescriptorProvider>> {
    vec![
        Box::new(FingerprintProvider),
        Box::new(LocalEnvironmentProvider),
        Box::new(GlobalGeometryProvider),
        Box::new(RandomProjectionProvider),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::descriptor::{ComputeFailure, DescriptorValue};
    use crate::core::models::molecule::{AtomSite, MolecularStructure};
    use nalgebra::Point3;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts invocations and fails on request, standing in for an external
    /// numerical library.
    struct CountingProvider {
        calls: Arc<AtomicUsize>,
        fail_identity: Option<String>,
        output_len: usize,
    }

    impl CountingProvider {
        fn boxed(calls: &Arc<AtomicUsize>) -> Box<Self> {
            Box::new(Self {
                calls: Arc::clone(calls),
                fail_identity: None,
                output_len: 1,
            })
        }

        fn failing_for(calls: &Arc<AtomicUsize>, identity: &str) -> Box<Self> {
            Box::new(Self {
                calls: Arc::clone(calls),
                fail_identity: Some(identity.to_string()),
                output_len: 1,
            })
        }
    }

    impl DescriptorProvider for CountingProvider {
        fn variant(&self) -> &'static str {
            "fingerprint"
        }

        fn descriptor_len(&self, _config: &DescriptorConfig) -> Result<usize, ComputeFailure> {
            Ok(self.output_len)
        }

        fn compute(
            &self,
            record: &MoleculeRecord,
            _config: &DescriptorConfig,
        ) -> DescriptorOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_identity.as_deref() == Some(record.identity()) {
                return Err(ComputeFailure::computation_error(
                    "injected numerical failure",
                ));
            }
            let x = record.structure().atoms[0].position.x;
            Ok(DescriptorValue::vector(vec![x; self.output_len]))
        }
    }

    fn carbon_chain(length: usize) -> MoleculeRecord {
        let atoms = (0..length)
            .map(|i| AtomSite::new("C", Point3::new(1.5 * i as f64, 0.0, 0.0)))
            .collect();
        let bonds = (1..length).map(|i| (i - 1, i)).collect();
        MoleculeRecord::new(format!("C{length}"), MolecularStructure::new(atoms, bonds))
    }

    fn invalid_molecule() -> MoleculeRecord {
        MoleculeRecord::new(
            "bogus",
            MolecularStructure::new(vec![AtomSite::new("Xx", Point3::origin())], vec![]),
        )
    }

    fn fingerprint_config() -> DescriptorConfig {
        DescriptorConfig::Fingerprint {
            bit_length: 128,
            radius: 2,
        }
    }

    fn sequential() -> ComputeSettings {
        ComputeSettings::default()
    }

    #[test]
    fn empty_batch_is_rejected_before_any_dispatch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut engine = DescriptorEngine::new();
        engine.register_provider(CountingProvider::boxed(&calls));

        let result = engine.compute_batch(
            &[],
            &fingerprint_config(),
            &sequential(),
            &ProgressReporter::default(),
        );

        assert!(matches!(result, Err(EngineError::EmptyBatch)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unresolvable_variant_aborts_the_batch() {
        let engine = DescriptorEngine::with_providers(vec![]);
        let result = engine.compute_batch(
            &[carbon_chain(1)],
            &fingerprint_config(),
            &sequential(),
            &ProgressReporter::default(),
        );

        match result {
            Err(EngineError::UnknownDescriptor { variant }) => {
                assert_eq!(variant, "fingerprint");
            }
            other => panic!("expected UnknownDescriptor, got {other:?}"),
        }
    }

    #[test]
    fn response_is_positionally_aligned_with_request() {
        let engine = DescriptorEngine::new();
        let molecules = vec![carbon_chain(1), invalid_molecule(), carbon_chain(3)];

        let result = engine
            .compute_batch(
                &molecules,
                &fingerprint_config(),
                &sequential(),
                &ProgressReporter::default(),
            )
            .unwrap();

        assert_eq!(result.outcomes.len(), 3);
        assert!(result.outcomes[0].is_ok());
        assert!(result.outcomes[2].is_ok());
        let failure = result.outcomes[1].clone().unwrap_err();
        assert_eq!(failure.kind, FailureKind::InvalidInput);
        assert_eq!(result.stats.failures, 1);
    }

    #[test]
    fn fingerprint_scenario_with_invalid_middle_molecule() {
        let engine = DescriptorEngine::new();
        let molecules = vec![carbon_chain(2), invalid_molecule(), carbon_chain(4)];

        let first = engine
            .compute_batch(
                &molecules,
                &fingerprint_config(),
                &sequential(),
                &ProgressReporter::default(),
            )
            .unwrap();

        assert_eq!(first.outcomes[0].as_ref().unwrap().len(), 128);
        assert_eq!(first.outcomes[2].as_ref().unwrap().len(), 128);
        assert_eq!(
            first.outcomes[1].as_ref().unwrap_err().kind,
            FailureKind::InvalidInput
        );

        // Second identical call answers the valid indices from the cache.
        let second = engine
            .compute_batch(
                &molecules,
                &fingerprint_config(),
                &sequential(),
                &ProgressReporter::default(),
            )
            .unwrap();

        assert_eq!(first.outcomes, second.outcomes);
        assert_eq!(second.stats.cache_hits, 2);
        assert_eq!(second.stats.computed, 0);
    }

    #[test]
    fn second_identical_call_performs_zero_fresh_computations() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut engine = DescriptorEngine::new();
        engine.register_provider(CountingProvider::boxed(&calls));
        let molecules: Vec<MoleculeRecord> = (1..=6).map(carbon_chain).collect();

        let first = engine
            .compute_batch(
                &molecules,
                &fingerprint_config(),
                &sequential(),
                &ProgressReporter::default(),
            )
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 6);
        assert_eq!(first.stats.computed, 6);

        let second = engine
            .compute_batch(
                &molecules,
                &fingerprint_config(),
                &sequential(),
                &ProgressReporter::default(),
            )
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 6);
        assert_eq!(second.stats.cache_hits, 6);
        assert_eq!(second.stats.computed, 0);
        assert_eq!(first.outcomes, second.outcomes);
    }

    #[test]
    fn one_failing_molecule_does_not_abort_the_batch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut engine = DescriptorEngine::new();
        engine.register_provider(CountingProvider::failing_for(&calls, "C3"));
        let molecules: Vec<MoleculeRecord> = (1..=5).map(carbon_chain).collect();

        let result = engine
            .compute_batch(
                &molecules,
                &fingerprint_config(),
                &sequential(),
                &ProgressReporter::default(),
            )
            .unwrap();

        let successes = result.outcomes.iter().filter(|o| o.is_ok()).count();
        assert_eq!(successes, 4);
        assert_eq!(
            result.outcomes[2].as_ref().unwrap_err().kind,
            FailureKind::ComputationError
        );
        assert_eq!(result.stats.failures, 1);
    }

    #[test]
    fn identical_molecules_are_deduplicated_before_dispatch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut engine = DescriptorEngine::new();
        engine.register_provider(CountingProvider::boxed(&calls));
        let molecules = vec![carbon_chain(2); 100];

        let result = engine
            .compute_batch(
                &molecules,
                &fingerprint_config(),
                &ComputeSettings::with_workers(4).unwrap(),
                &ProgressReporter::default(),
            )
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.stats.computed, 1);
        assert_eq!(result.outcomes.len(), 100);
        let first = result.outcomes[0].clone();
        assert!(result.outcomes.iter().all(|outcome| *outcome == first));
    }

    #[test]
    fn worker_count_does_not_change_outcomes() {
        let molecules: Vec<MoleculeRecord> = (1..=10).map(carbon_chain).collect();
        let config = fingerprint_config();

        let sequential_engine = DescriptorEngine::new();
        let sequential_result = sequential_engine
            .compute_batch(
                &molecules,
                &config,
                &sequential(),
                &ProgressReporter::default(),
            )
            .unwrap();

        let parallel_engine = DescriptorEngine::new();
        let parallel_result = parallel_engine
            .compute_batch(
                &molecules,
                &config,
                &ComputeSettings::with_workers(4).unwrap(),
                &ProgressReporter::default(),
            )
            .unwrap();

        assert_eq!(sequential_result.outcomes, parallel_result.outcomes);
    }

    #[test]
    fn invalidation_forces_recomputation_for_that_key_only() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut engine = DescriptorEngine::new();
        engine.register_provider(CountingProvider::boxed(&calls));
        let molecules: Vec<MoleculeRecord> = (1..=3).map(carbon_chain).collect();
        let config = fingerprint_config();

        engine
            .compute_batch(
                &molecules,
                &config,
                &sequential(),
                &ProgressReporter::default(),
            )
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        assert!(engine.invalidate(&molecules[1], &config));
        assert_eq!(engine.cache_len(), 2);

        let result = engine
            .compute_batch(
                &molecules,
                &config,
                &sequential(),
                &ProgressReporter::default(),
            )
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(result.stats.cache_hits, 2);
        assert_eq!(result.stats.computed, 1);
    }

    #[test]
    fn deterministic_failures_are_cached_by_default() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut engine = DescriptorEngine::new();
        engine.register_provider(CountingProvider::failing_for(&calls, "C2"));
        let molecules = vec![carbon_chain(2)];
        let config = fingerprint_config();

        for _ in 0..3 {
            let result = engine
                .compute_batch(
                    &molecules,
                    &config,
                    &sequential(),
                    &ProgressReporter::default(),
                )
                .unwrap();
            assert!(result.outcomes[0].is_err());
        }

        // First call computed the failure; the rest were cache hits.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failure_caching_can_be_disabled() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut engine = DescriptorEngine::new();
        engine.register_provider(CountingProvider::failing_for(&calls, "C2"));
        let molecules = vec![carbon_chain(2)];
        let config = fingerprint_config();
        let settings = crate::engine::config::ComputeSettingsBuilder::new()
            .cache_failures(false)
            .build()
            .unwrap();

        for _ in 0..3 {
            engine
                .compute_batch(&molecules, &config, &settings, &ProgressReporter::default())
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(engine.cache_len(), 0);
    }

    #[test]
    fn rejected_configuration_fails_every_index_without_dispatch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut engine = DescriptorEngine::new();
        engine.register_provider(CountingProvider::boxed(&calls));
        let molecules: Vec<MoleculeRecord> = (1..=4).map(carbon_chain).collect();
        let config = DescriptorConfig::LocalEnvironment {
            cutoff_radius: 6.0,
            n_bins: 8,
            species: vec![],
        };

        let result = engine
            .compute_batch(
                &molecules,
                &config,
                &sequential(),
                &ProgressReporter::default(),
            )
            .unwrap();

        assert_eq!(result.outcomes.len(), 4);
        assert!(result.outcomes.iter().all(|outcome| matches!(
            outcome,
            Err(failure) if failure.kind == FailureKind::InvalidConfiguration
        )));
        assert_eq!(result.stats.computed, 0);
        assert_eq!(engine.cache_len(), 0);
    }

    #[test]
    fn custom_provider_overrides_the_builtin_for_its_variant() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut engine = DescriptorEngine::new();
        engine.register_provider(CountingProvider::boxed(&calls));

        let result = engine
            .compute_batch(
                &[carbon_chain(2)],
                &fingerprint_config(),
                &sequential(),
                &ProgressReporter::default(),
            )
            .unwrap();

        // The counting provider returns a single element, not 128 bits.
        assert_eq!(result.outcomes[0].as_ref().unwrap().len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn shape_mismatch_between_cache_and_provider_is_corruption() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut engine = DescriptorEngine::new();
        engine.register_provider(CountingProvider::boxed(&calls));
        let molecules = vec![carbon_chain(2)];
        let config = fingerprint_config();

        engine
            .compute_batch(
                &molecules,
                &config,
                &sequential(),
                &ProgressReporter::default(),
            )
            .unwrap();

        // A provider swap that changes the declared shape makes the cached
        // entry inconsistent with the configuration.
        engine.register_provider(Box::new(CountingProvider {
            calls: Arc::clone(&calls),
            fail_identity: None,
            output_len: 2,
        }));

        let result = engine.compute_batch(
            &molecules,
            &config,
            &sequential(),
            &ProgressReporter::default(),
        );

        assert!(matches!(result, Err(EngineError::CacheCorruption { .. })));
    }

    #[test]
    fn progress_reports_cover_lookup_and_finalization_phases() {
        let phases = std::sync::Mutex::new(Vec::new());
        {
            let reporter = ProgressReporter::with_callback(Box::new(|event| {
                if let Progress::PhaseStart { name } = event {
                    phases.lock().unwrap().push(name);
                }
            }));

            let engine = DescriptorEngine::new();
            engine
                .compute_batch(
                    &[carbon_chain(2)],
                    &fingerprint_config(),
                    &sequential(),
                    &reporter,
                )
                .unwrap();
        }

        let phases = phases.into_inner().unwrap();
        assert_eq!(phases, vec!["Cache Lookup", "Finalization"]);
    }
}
