//! # Core Models Module
//!
//! This module contains the fundamental data structures used to represent
//! molecules and descriptor results in moldesc, providing the foundation for
//! all batch-computation operations.
//!
//! ## Overview
//!
//! The models module defines the engine's units of work and units of result:
//!
//! - **Represent caller input** - Immutable molecular structures paired with
//!   canonical identities, safe to use as cache keys
//! - **Represent computed output** - Fixed-shape numeric descriptors and the
//!   typed failures that replace them when a computation cannot succeed
//! - **Maintain type safety** - Invariants (identity follows structure, data
//!   length follows shape) are enforced at construction
//!
//! ## Key Components
//!
//! - [`molecule`] - Atom sites, molecular structures, and the `MoleculeRecord`
//!   unit of work
//! - [`descriptor`] - Descriptor shapes/values, the failure taxonomy, and the
//!   `DescriptorOutcome` tagged union stored in the cache
//!
//! ## Usage
//!
//! ```ignore
//! use moldesc::core::models::molecule::{AtomSite, MolecularStructure, MoleculeRecord};
//! use nalgebra::Point3;
//!
//! let structure = MolecularStructure::new(
//!     vec![AtomSite::new("C", Point3::origin())],
//!     vec![],
//! );
//! let record = MoleculeRecord::from_structure(structure);
//! ```

pub mod descriptor;
pub mod molecule;
