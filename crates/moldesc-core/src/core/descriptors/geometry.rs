use super::config::DescriptorConfig;
use super::{DescriptorProvider, variant_mismatch};
use crate::core::models::descriptor::{
    ComputeFailure, DescriptorOutcome, DescriptorShape, DescriptorValue,
};
use crate::core::models::molecule::MoleculeRecord;
use crate::core::utils::elements;

/// Global geometry descriptor in the Coulomb-matrix form.
///
/// Entry (i, j) is `Z_i * Z_j / r_ij` for distinct atoms and `0.5 * Z_i^2.4`
/// on the diagonal. Rows and columns are sorted by descending row norm to
/// make the matrix invariant to atom input order, then zero-padded to
/// `max_atoms` so the shape depends only on the configuration.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlobalGeometryProvider;

impl DescriptorProvider for GlobalGeometryProvider {
    fn variant(&self) -> &'static str {
        "global-geometry"
    }

    fn descriptor_len(&self, config: &DescriptorConfig) -> Result<usize, ComputeFailure> {
        match config {
            DescriptorConfig::GlobalGeometry { max_atoms } => {
                if *max_atoms == 0 {
                    return Err(ComputeFailure::invalid_configuration(
                        "max_atoms must be at least 1",
                    ));
                }
                Ok(max_atoms * max_atoms)
            }
            other => Err(variant_mismatch(self.variant(), other)),
        }
    }

    fn compute(&self, record: &MoleculeRecord, config: &DescriptorConfig) -> DescriptorOutcome {
        self.descriptor_len(config)?;
        let max_atoms = match config {
            DescriptorConfig::GlobalGeometry { max_atoms } => *max_atoms,
            other => return Err(variant_mismatch(self.variant(), other)),
        };
        record.validate()?;

        let atoms = &record.structure().atoms;
        let atom_count = atoms.len();
        if atom_count > max_atoms {
            return Err(ComputeFailure::invalid_input(format!(
                "molecule has {atom_count} atoms but the configuration allows at most {max_atoms}"
            )));
        }

        let charges: Vec<f64> = atoms
            .iter()
            .map(|atom| {
                elements::atomic_number(&atom.element)
                    .map(f64::from)
                    .ok_or_else(|| {
                        ComputeFailure::invalid_input(format!(
                            "unsupported element '{}'",
                            atom.element
                        ))
                    })
            })
            .collect::<Result<_, _>>()?;

        let mut matrix = vec![vec![0.0; atom_count]; atom_count];
        for i in 0..atom_count {
            matrix[i][i] = 0.5 * charges[i].powf(2.4);
            for j in (i + 1)..atom_count {
                let distance = (atoms[i].position - atoms[j].position).norm();
                if distance <= f64::EPSILON {
                    return Err(ComputeFailure::computation_error(format!(
                        "atoms {i} and {j} are coincident"
                    )));
                }
                let entry = charges[i] * charges[j] / distance;
                matrix[i][j] = entry;
                matrix[j][i] = entry;
            }
        }

        // Canonical ordering: permute rows and columns by descending row norm.
        let mut order: Vec<usize> = (0..atom_count).collect();
        let norms: Vec<f64> = matrix
            .iter()
            .map(|row| row.iter().map(|v| v * v).sum::<f64>())
            .collect();
        order.sort_by(|&a, &b| {
            norms[b]
                .partial_cmp(&norms[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut padded = vec![0.0; max_atoms * max_atoms];
        for (row, &i) in order.iter().enumerate() {
            for (col, &j) in order.iter().enumerate() {
                padded[row * max_atoms + col] = matrix[i][j];
            }
        }

        DescriptorValue::new(
            padded,
            DescriptorShape::Matrix {
                rows: max_atoms,
                cols: max_atoms,
            },
        )
    }
}
