//! # Workflows Module
//!
//! This module provides the high-level entry points that host frameworks use
//! to drive moldesc.
//!
//! ## Overview
//!
//! Workflows tie the engine and core layers together into complete
//! operations. The batch workflow owns the descriptor cache and provider
//! registry, validates input, partitions cache hits from misses, drives the
//! dispatcher, and reassembles results in input order, providing a single
//! blocking call per population of an iterative search.
//!
//! ## Architecture
//!
//! - **Batch Computation** ([`batch`]) - The [`batch::DescriptorEngine`]
//!   facade and its `compute_batch` entry point, plus cache management
//!   passthroughs (invalidation, clearing, size inspection).
//!
//! ## Key Capabilities
//!
//! - **Single blocking entry point** returning a full positional result sequence
//! - **Cache lifetime management** tied to the engine instance, not the process
//! - **Provider registration** letting external numerical libraries override built-ins
//! - **Progress monitoring** with phase and per-unit reporting

pub mod batch;
