use serde::{Deserialize, Serialize};

/// Configuration for one descriptor family, reused unchanged across an
/// entire batch (and typically an entire optimization run).
///
/// The variant tag selects the provider; the parameters are interpreted by
/// that provider alone. Configurations are immutable and hashable into cache
/// keys, so identical (molecule, configuration) requests resolve to the same
/// cache entry across calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "kebab-case")]
pub enum DescriptorConfig {
    /// Hashed circular substructure fingerprint.
    Fingerprint {
        /// Output vector length in bits.
        bit_length: usize,
        /// Maximum neighbor-environment radius in bonds.
        radius: usize,
    },
    /// Atom-centered radial environment descriptor (per-species distance
    /// histograms averaged over all centers).
    LocalEnvironment {
        /// Cutoff for local regions in Angstroms.
        cutoff_radius: f64,
        /// Number of radial bins per species channel.
        n_bins: usize,
        /// Element symbols that can be encoded.
        species: Vec<String>,
    },
    /// Global geometry descriptor (sorted, zero-padded Coulomb matrix).
    GlobalGeometry {
        /// Maximum number of atoms the matrix is padded to.
        max_atoms: usize,
    },
    /// Seeded Gaussian random-projection baseline.
    RandomProjection {
        /// Output vector length.
        length: usize,
        /// Base seed mixed with the molecule identity.
        seed: u64,
    },
}

impl DescriptorConfig {
    /// Stable variant tag used for provider resolution and log fields.
    pub fn variant(&self) -> &'static str {
        match self {
            DescriptorConfig::Fingerprint { .. } => "fingerprint",
            DescriptorConfig::LocalEnvironment { .. } => "local-environment",
            DescriptorConfig::GlobalGeometry { .. } => "global-geometry",
            DescriptorConfig::RandomProjection { .. } => "random-projection",
        }
    }

    /// Canonical byte encoding hashed into cache keys.
    ///
    /// Fixed and infallible: the same configuration always encodes to the
    /// same bytes, and distinct parameter values encode differently.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(self.variant().as_bytes());
        out.push(0);
        match self {
            DescriptorConfig::Fingerprint { bit_length, radius } => {
                out.extend_from_slice(&(*bit_length as u64).to_le_bytes());
                out.extend_from_slice(&(*radius as u64).to_le_bytes());
            }
            DescriptorConfig::LocalEnvironment {
                cutoff_radius,
                n_bins,
                species,
            } => {
                out.extend_from_slice(&cutoff_radius.to_bits().to_le_bytes());
                out.extend_from_slice(&(*n_bins as u64).to_le_bytes());
                for symbol in species {
                    out.extend_from_slice(symbol.as_bytes());
                    out.push(0);
                }
            }
            DescriptorConfig::GlobalGeometry { max_atoms } => {
                out.extend_from_slice(&(*max_atoms as u64).to_le_bytes());
            }
            DescriptorConfig::RandomProjection { length, seed } => {
                out.extend_from_slice(&(*length as u64).to_le_bytes());
                out.extend_from_slice(&seed.to_le_bytes());
            }
        }
        out
    }
}
