use super::config::DescriptorConfig;
use super::{DescriptorProvider, variant_mismatch};
use crate::core::models::descriptor::{ComputeFailure, DescriptorOutcome, DescriptorValue};
use crate::core::models::molecule::MoleculeRecord;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use sha2::{Digest, Sha256};

/// Seeded Gaussian random-projection baseline descriptor.
///
/// The RNG is seeded from the configuration seed mixed with a hash of the
/// molecule identity, so a given (molecule, configuration) pair always
/// produces the same vector regardless of worker scheduling or batch
/// composition. Useful as a null model when benchmarking descriptor quality.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomProjectionProvider;

impl DescriptorProvider for RandomProjectionProvider {
    fn variant(&self) -> &'static str {
        "random-projection"
    }

    fn descriptor_len(&self, config: &DescriptorConfig) -> Result<usize, ComputeFailure> {
        match config {
            DescriptorConfig::RandomProjection { length, .. } => {
                if *length == 0 {
                    return Err(ComputeFailure::invalid_configuration(
                        "random projection length must be at least 1",
                    ));
                }
                Ok(*length)
            }
            other => Err(variant_mismatch(self.variant(), other)),
        }
    }

    fn compute(&self, record: &MoleculeRecord, config: &DescriptorConfig) -> DescriptorOutcome {
        let length = self.descriptor_len(config)?;
        let seed = match config {
            DescriptorConfig::RandomProjection { seed, .. } => *seed,
            other => return Err(variant_mismatch(self.variant(), other)),
        };
        record.validate()?;

        let digest: [u8; 32] = Sha256::digest(record.identity().as_bytes()).into();
        let mut identity_seed = [0u8; 8];
        identity_seed.copy_from_slice(&digest[..8]);

        let mut rng = StdRng::seed_from_u64(seed ^ u64::from_le_bytes(identity_seed));
        let normal = Normal::new(0.0, 1.0).map_err(|source| {
            ComputeFailure::computation_error(format!(
                "failed to construct sampling distribution: {source}"
            ))
        })?;

        let data = (0..length).map(|_| normal.sample(&mut rng)).collect();
        Ok(DescriptorValue::vector(data))
    }
}
