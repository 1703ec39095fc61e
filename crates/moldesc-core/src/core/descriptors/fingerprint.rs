use super::config::DescriptorConfig;
use super::{DescriptorProvider, variant_mismatch};
use crate::core::models::descriptor::{ComputeFailure, DescriptorOutcome, DescriptorValue};
use crate::core::models::molecule::MoleculeRecord;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Hashed circular substructure fingerprint.
///
/// Each atom is assigned an environment label from its element and bond
/// degree; labels are then iteratively rehashed with the sorted labels of
/// bonded neighbors, one round per unit of `radius`. Every label seen along
/// the way sets one bit of the output vector (modulo `bit_length`), so the
/// result is a 0/1 vector encoding which substructure environments occur in
/// the molecule.
#[derive(Debug, Default, Clone, Copy)]
pub struct FingerprintProvider;

impl DescriptorProvider for FingerprintProvider {
    fn variant(&self) -> &'static str {
        "fingerprint"
    }

    fn descriptor_len(&self, config: &DescriptorConfig) -> Result<usize, ComputeFailure> {
        match config {
            DescriptorConfig::Fingerprint { bit_length, .. } => {
                if *bit_length == 0 {
                    return Err(ComputeFailure::invalid_configuration(
                        "fingerprint bit_length must be at least 1",
                    ));
                }
                Ok(*bit_length)
            }
            other => Err(variant_mismatch(self.variant(), other)),
        }
    }

    fn compute(&self, record: &MoleculeRecord, config: &DescriptorConfig) -> DescriptorOutcome {
        let bit_length = self.descriptor_len(config)?;
        let radius = match config {
            DescriptorConfig::Fingerprint { radius, .. } => *radius,
            other => return Err(variant_mismatch(self.variant(), other)),
        };
        record.validate()?;

        let structure = record.structure();
        let atom_count = structure.atom_count();

        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); atom_count];
        for &(a, b) in &structure.bonds {
            adjacency[a].push(b);
            adjacency[b].push(a);
        }

        let mut bits = vec![0.0; bit_length];
        let mut set_bit = |label: u64| {
            bits[(label % bit_length as u64) as usize] = 1.0;
        };

        let mut labels: Vec<u64> = structure
            .atoms
            .iter()
            .enumerate()
            .map(|(index, atom)| {
                let mut hasher = DefaultHasher::new();
                atom.element.hash(&mut hasher);
                adjacency[index].len().hash(&mut hasher);
                hasher.finish()
            })
            .collect();
        for &label in &labels {
            set_bit(label);
        }

        for _ in 0..radius {
            let mut next = Vec::with_capacity(atom_count);
            for index in 0..atom_count {
                let mut neighborhood: Vec<u64> =
                    adjacency[index].iter().map(|&n| labels[n]).collect();
                neighborhood.sort_unstable();

                let mut hasher = DefaultHasher::new();
                labels[index].hash(&mut hasher);
                neighborhood.hash(&mut hasher);
                next.push(hasher.finish());
            }
            labels = next;
            for &label in &labels {
                set_bit(label);
            }
        }

        Ok(DescriptorValue::vector(bits))
    }
}
