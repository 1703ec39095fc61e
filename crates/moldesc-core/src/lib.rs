//! # moldesc Core Library
//!
//! A parallel, cache-backed descriptor computation engine for batches of
//! candidate molecules, built to serve molecular-optimization frameworks that
//! repeatedly query descriptors for evolving populations of structures.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a
//! clear separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models
//!   (`MoleculeRecord`, `DescriptorValue`), the pluggable
//!   `DescriptorProvider` capability interface with its built-in variants,
//!   and the static element tables shared by validation and providers.
//!
//! - **[`engine`]: The Logic Core.** This stateful layer orchestrates batch
//!   execution. It includes the concurrency-safe write-once `DescriptorCache`,
//!   the bounded-pool work dispatcher with per-unit fault isolation, and the
//!   execution settings and error taxonomy that govern a run.
//!
//! - **[`workflows`]: The Public API.** This is the highest-level,
//!   user-facing layer. Its `DescriptorEngine` facade ties the engine and
//!   core together: one blocking `compute_batch` call per population, with
//!   results always returned in input order and per-molecule failures
//!   recorded instead of raised.

pub mod core;
pub mod engine;
pub mod workflows;
