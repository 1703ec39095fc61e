use std::fmt;
use thiserror::Error;

/// Describes the logical layout of a computed descriptor.
///
/// Every descriptor has a fixed shape determined solely by its configuration,
/// never by the molecule it was computed for. This is what allows results for
/// different molecules to be stacked into a single design matrix downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorShape {
    /// A flat vector of the given length.
    Vector(usize),
    /// A row-major matrix with the given dimensions.
    Matrix { rows: usize, cols: usize },
}

impl DescriptorShape {
    /// Total number of scalar elements implied by this shape.
    pub fn element_count(&self) -> usize {
        match self {
            DescriptorShape::Vector(len) => *len,
            DescriptorShape::Matrix { rows, cols } => rows * cols,
        }
    }
}

/// A successfully computed, fixed-shape numeric descriptor.
///
/// The element count of `data` always matches the declared shape; the
/// constructor enforces this so downstream consumers never need to re-check.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorValue {
    data: Vec<f64>,
    shape: DescriptorShape,
}

impl DescriptorValue {
    /// Creates a descriptor value, verifying that the data length matches
    /// the declared shape.
    pub fn new(data: Vec<f64>, shape: DescriptorShape) -> Result<Self, ComputeFailure> {
        if data.len() != shape.element_count() {
            return Err(ComputeFailure::computation_error(format!(
                "descriptor has {} elements but its shape implies {}",
                data.len(),
                shape.element_count()
            )));
        }
        Ok(Self { data, shape })
    }

    /// Convenience constructor for the common flat-vector case.
    pub fn vector(data: Vec<f64>) -> Self {
        let shape = DescriptorShape::Vector(data.len());
        Self { data, shape }
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn shape(&self) -> DescriptorShape {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_data(self) -> Vec<f64> {
        self.data
    }
}

/// Classifies why a single molecule's descriptor computation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The molecular structure itself is unusable (empty, malformed bonds,
    /// unsupported element).
    InvalidInput,
    /// The descriptor configuration names an unsupported parameter
    /// combination.
    InvalidConfiguration,
    /// The underlying numerical routine failed or panicked.
    ComputationError,
    /// The per-unit time budget was exceeded.
    Timeout,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::InvalidInput => "invalid input",
            FailureKind::InvalidConfiguration => "invalid configuration",
            FailureKind::ComputationError => "computation error",
            FailureKind::Timeout => "timeout",
        };
        f.write_str(label)
    }
}

/// A molecule-local failure, recorded at the molecule's index in the batch
/// response instead of aborting the batch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct ComputeFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl ComputeFailure {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::InvalidInput,
            message: message.into(),
        }
    }

    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::InvalidConfiguration,
            message: message.into(),
        }
    }

    pub fn computation_error(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::ComputationError,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Timeout,
            message: message.into(),
        }
    }
}

/// The per-molecule result stored in the cache and returned to callers:
/// either a fixed-shape descriptor or a typed failure.
pub type DescriptorOutcome = Result<DescriptorValue, ComputeFailure>;
