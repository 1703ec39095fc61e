use super::descriptor::ComputeFailure;
use crate::core::utils::elements;
use nalgebra::Point3;
use sha2::{Digest, Sha256};

/// A single atom of a caller-supplied molecular structure.
///
/// The engine treats atoms as opaque geometry: an element symbol plus a 3D
/// position in Angstroms. Chemistry-level interpretation (valence, charge
/// models, aromaticity) belongs to the descriptor providers, not here.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomSite {
    /// Element symbol in standard capitalization (e.g. "C", "Cl").
    pub element: String,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
}

impl AtomSite {
    pub fn new(element: &str, position: Point3<f64>) -> Self {
        Self {
            element: element.to_string(),
            position,
        }
    }
}

/// The graph/geometry representation of a molecule as provided by the caller.
///
/// Bonds are undirected index pairs into `atoms`. The engine never mutates a
/// structure; it only reads it while computing descriptors.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MolecularStructure {
    pub atoms: Vec<AtomSite>,
    pub bonds: Vec<(usize, usize)>,
}

impl MolecularStructure {
    pub fn new(atoms: Vec<AtomSite>, bonds: Vec<(usize, usize)>) -> Self {
        Self { atoms, bonds }
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Content hash of the structure: equal structures always produce equal
    /// digests, so the hash is safe to use as a cache identity.
    pub fn structural_hash(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        for atom in &self.atoms {
            hasher.update(atom.element.as_bytes());
            hasher.update([0u8]);
            for coord in atom.position.coords.iter() {
                hasher.update(coord.to_bits().to_le_bytes());
            }
        }
        hasher.update([1u8]);
        for &(a, b) in &self.bonds {
            hasher.update((a as u64).to_le_bytes());
            hasher.update((b as u64).to_le_bytes());
        }
        hasher.finalize().into()
    }
}

/// The immutable unit of work submitted to the engine: a molecular structure
/// paired with its canonical identifier.
///
/// The identifier is the cache key component for this molecule, so it must be
/// a pure function of the structure: two records with equal structures must
/// carry equal identities. Callers with their own canonical naming (canonical
/// SMILES, InChIKey) use [`MoleculeRecord::new`]; callers without one can let
/// the engine derive a structural-hash identity via
/// [`MoleculeRecord::from_structure`].
#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeRecord {
    identity: String,
    structure: MolecularStructure,
}

impl MoleculeRecord {
    /// Creates a record with a caller-supplied canonical identity.
    pub fn new(identity: impl Into<String>, structure: MolecularStructure) -> Self {
        Self {
            identity: identity.into(),
            structure,
        }
    }

    /// Creates a record whose identity is derived from the structure itself,
    /// guaranteeing the identity-follows-structure invariant.
    pub fn from_structure(structure: MolecularStructure) -> Self {
        let digest = structure.structural_hash();
        let identity = digest.iter().map(|byte| format!("{byte:02x}")).collect();
        Self {
            identity,
            structure,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn structure(&self) -> &MolecularStructure {
        &self.structure
    }

    /// Basic structural validation applied before any descriptor work:
    /// non-empty atom list, finite coordinates, known element symbols, and
    /// in-range bond endpoints. Violations are molecule-local failures.
    pub fn validate(&self) -> Result<(), ComputeFailure> {
        if self.structure.atoms.is_empty() {
            return Err(ComputeFailure::invalid_input("molecule has no atoms"));
        }

        for (index, atom) in self.structure.atoms.iter().enumerate() {
            if !elements::is_known_element(&atom.element) {
                return Err(ComputeFailure::invalid_input(format!(
                    "atom {} has unsupported element '{}'",
                    index, atom.element
                )));
            }
            if atom.position.coords.iter().any(|c| !c.is_finite()) {
                return Err(ComputeFailure::invalid_input(format!(
                    "atom {index} has a non-finite coordinate"
                )));
            }
        }

        let atom_count = self.structure.atoms.len();
        for &(a, b) in &self.structure.bonds {
            if a >= atom_count || b >= atom_count {
                return Err(ComputeFailure::invalid_input(format!(
                    "bond ({a}, {b}) references a missing atom"
                )));
            }
            if a == b {
                return Err(ComputeFailure::invalid_input(format!(
                    "bond ({a}, {b}) connects an atom to itself"
                )));
            }
        }

        Ok(())
    }
}
