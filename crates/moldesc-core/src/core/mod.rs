//! # Core Module
//!
//! This module provides the fundamental building blocks for batch descriptor
//! computation in moldesc, serving as the stateless foundation of the library.
//!
//! ## Overview
//!
//! The core module implements the data structures and capability interfaces
//! the engine is built on: molecular records as immutable units of work,
//! fixed-shape descriptor results with a typed failure taxonomy, and the
//! pluggable provider interface through which descriptor algorithms are
//! supplied.
//!
//! ## Architecture
//!
//! The module is organized into specialized submodules:
//!
//! - **Data Models** ([`models`]) - Molecule records, descriptor values, and failure types
//! - **Descriptor Providers** ([`descriptors`]) - The provider capability trait,
//!   per-variant configuration, and the built-in provider implementations
//! - **Utilities** ([`utils`]) - Static element tables shared by validation and providers
//!
//! ## Key Capabilities
//!
//! - **Cache-safe molecule identity** derived from, or consistent with, structure
//! - **Fixed-shape descriptor results** whose layout depends only on configuration
//! - **Typed molecule-local failures** so a bad molecule never aborts a batch
//! - **Interchangeable descriptor algorithms** behind a single trait seam

pub mod descriptors;
pub mod models;
pub mod utils;
