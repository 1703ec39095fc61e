//! # Descriptor Providers Module
//!
//! This module defines the pluggable descriptor-computation capability and the
//! built-in provider implementations that ship with moldesc.
//!
//! ## Overview
//!
//! A descriptor provider turns a molecule and a configuration into a
//! fixed-shape numeric descriptor. The engine never looks inside a provider:
//! it resolves one by the configuration's variant tag, asks it for the
//! expected output size, and invokes it from parallel workers. Any numerical
//! library implementing [`DescriptorProvider`] is interchangeable with the
//! built-ins from the engine's point of view.
//!
//! ## Contract
//!
//! Providers must be pure functions of their inputs: safe to invoke
//! concurrently from independent workers with no shared mutable state across
//! invocations. Every failure mode is reported as a typed
//! [`ComputeFailure`](crate::core::models::descriptor::ComputeFailure) so one
//! molecule's failure never aborts a batch; panics from foreign code are
//! additionally contained by the dispatcher.
//!
//! ## Built-in Providers
//!
//! - [`fingerprint`] - Hashed circular substructure fingerprint
//! - [`local_environment`] - Atom-centered radial environment histograms
//! - [`geometry`] - Global geometry (Coulomb-matrix style) descriptor
//! - [`random`] - Seeded Gaussian random-projection baseline

pub mod config;
pub mod fingerprint;
pub mod geometry;
pub mod local_environment;
pub mod random;

use self::config::DescriptorConfig;
use crate::core::models::descriptor::{ComputeFailure, DescriptorOutcome};
use crate::core::models::molecule::MoleculeRecord;

/// The pluggable descriptor-computation capability.
///
/// Implementations must hold no cross-invocation mutable state; the engine
/// invokes `compute` concurrently from multiple workers.
pub trait DescriptorProvider: Send + Sync {
    /// The configuration variant tag this provider serves.
    fn variant(&self) -> &'static str;

    /// Validates the configuration and reports the fixed output element
    /// count. Unsupported parameter combinations are rejected here with an
    /// `InvalidConfiguration` failure.
    fn descriptor_len(&self, config: &DescriptorConfig) -> Result<usize, ComputeFailure>;

    /// Computes the descriptor for one molecule. Total by contract: every
    /// failure is a typed result, never a propagated fault.
    fn compute(&self, record: &MoleculeRecord, config: &DescriptorConfig) -> DescriptorOutcome;
}

pub(crate) fn variant_mismatch(expected: &'static str, config: &DescriptorConfig) -> ComputeFailure {
    ComputeFailure::invalid_configuration(format!(
        "provider serves variant '{}' but was given a '{}' configuration",
        expected,
        config.variant()
    ))
}
