use super::config::DescriptorConfig;
use super::{DescriptorProvider, variant_mismatch};
use crate::core::models::descriptor::{ComputeFailure, DescriptorOutcome, DescriptorValue};
use crate::core::models::molecule::MoleculeRecord;
use std::collections::HashMap;

/// Atom-centered radial environment descriptor.
///
/// For every center atom, neighbors within `cutoff_radius` are binned by
/// distance into a per-species histogram; the histograms are averaged over
/// all centers so the output size depends only on the configuration
/// (`species.len() * n_bins`), not on the molecule.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalEnvironmentProvider;

impl LocalEnvironmentProvider {
    fn parameters<'a>(
        &self,
        config: &'a DescriptorConfig,
    ) -> Result<(f64, usize, &'a [String]), ComputeFailure> {
        match config {
            DescriptorConfig::LocalEnvironment {
                cutoff_radius,
                n_bins,
                species,
            } => {
                if !cutoff_radius.is_finite() || *cutoff_radius <= 0.0 {
                    return Err(ComputeFailure::invalid_configuration(format!(
                        "cutoff_radius must be positive and finite, got {cutoff_radius}"
                    )));
                }
                if *n_bins == 0 {
                    return Err(ComputeFailure::invalid_configuration(
                        "n_bins must be at least 1",
                    ));
                }
                if species.is_empty() {
                    return Err(ComputeFailure::invalid_configuration(
                        "species set must not be empty",
                    ));
                }
                Ok((*cutoff_radius, *n_bins, species.as_slice()))
            }
            other => Err(variant_mismatch(self.variant(), other)),
        }
    }
}

impl DescriptorProvider for LocalEnvironmentProvider {
    fn variant(&self) -> &'static str {
        "local-environment"
    }

    fn descriptor_len(&self, config: &DescriptorConfig) -> Result<usize, ComputeFailure> {
        let (_, n_bins, species) = self.parameters(config)?;
        Ok(species.len() * n_bins)
    }

    fn compute(&self, record: &MoleculeRecord, config: &DescriptorConfig) -> DescriptorOutcome {
        let (cutoff, n_bins, species) = self.parameters(config)?;
        record.validate()?;

        let channel_by_species: HashMap<&str, usize> = species
            .iter()
            .enumerate()
            .map(|(channel, symbol)| (symbol.as_str(), channel))
            .collect();

        let atoms = &record.structure().atoms;
        for atom in atoms {
            if !channel_by_species.contains_key(atom.element.as_str()) {
                return Err(ComputeFailure::invalid_input(format!(
                    "element '{}' is not in the configured species set",
                    atom.element
                )));
            }
        }

        let mut histogram = vec![0.0; species.len() * n_bins];
        for (center_index, center) in atoms.iter().enumerate() {
            for (neighbor_index, neighbor) in atoms.iter().enumerate() {
                if neighbor_index == center_index {
                    continue;
                }
                let distance = (neighbor.position - center.position).norm();
                if distance >= cutoff {
                    continue;
                }
                let bin = ((distance / cutoff) * n_bins as f64) as usize;
                let bin = bin.min(n_bins - 1);
                let channel = channel_by_species[neighbor.element.as_str()];
                histogram[channel * n_bins + bin] += 1.0;
            }
        }

        // Inner average over centers keeps the shape molecule-independent.
        let center_count = atoms.len() as f64;
        for value in &mut histogram {
            *value /= center_count;
        }

        Ok(DescriptorValue::vector(histogram))
    }
}
