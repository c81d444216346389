//! Error types for plan construction and service resolution.

use std::fmt;

/// Resolution-time errors
///
/// Represents the error conditions that can surface from a `resolve*` call.
/// "No provider" outcomes are not errors; they are `None`/empty results so
/// callers can probe speculatively for optional services. Errors are reserved
/// for situations where a requested construction cannot be carried out.
///
/// # Examples
///
/// ```rust
/// use forge_di::DiError;
///
/// let mismatch = DiError::TypeMismatch("app.Database".to_string());
/// let ambiguous = DiError::Ambiguous("app.IHandler".to_string());
/// let failed = DiError::Construction {
///     implementation: "app.Database".to_string(),
///     message: "connection refused".to_string(),
/// };
///
/// // All errors implement Display
/// println!("Error: {}", mismatch);
/// println!("Error: {}", ambiguous);
/// println!("Error: {}", failed);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiError {
    /// Type downcast failed
    TypeMismatch(String),
    /// A dependency requested a single value of a contract with multiple
    /// unnamed providers; ambiguity is never auto-resolved
    Ambiguous(String),
    /// A constructor reported failure; propagated verbatim, never cached
    Construction {
        /// Implementation whose constructor failed
        implementation: String,
        /// Failure description reported by the constructor
        message: String,
    },
}

impl fmt::Display for DiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiError::TypeMismatch(name) => write!(f, "Type mismatch for: {}", name),
            DiError::Ambiguous(name) => {
                write!(f, "Ambiguous contract: {} has multiple unnamed providers", name)
            }
            DiError::Construction { implementation, message } => {
                write!(f, "Construction of {} failed: {}", implementation, message)
            }
        }
    }
}

impl std::error::Error for DiError {}

/// Result type for resolution operations
///
/// A convenience alias for `Result<T, DiError>` used throughout forge-di.
pub type DiResult<T> = Result<T, DiError>;

/// A single configuration defect found while building descriptors, the
/// resolution plan, or the container.
///
/// Configuration errors are fatal to the whole build and are always
/// surfaced aggregated in a [`ConfigErrors`] value, never one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Two providers of one contract carry the same service id
    DuplicateServiceId {
        /// Contract whose named subset collides
        contract: String,
        /// The colliding id
        service_id: String,
    },
    /// A constructor dependency has no possible provider
    MissingProvider {
        /// Implementation that declares the dependency
        dependent: String,
        /// The dependency's contract
        contract: String,
        /// The dependency's id, when the import is keyed
        service_id: Option<String>,
    },
    /// An exported type declares more than one eligible constructor
    AmbiguousConstructor {
        /// The declaring type
        declared_type: String,
        /// How many constructors were found
        count: usize,
    },
    /// An exported type declares an explicit contract it does not implement
    ContractNotImplemented {
        /// The declaring type
        declared_type: String,
        /// The unimplemented contract
        contract: String,
    },
    /// The plan references an implementation with no registered constructor
    MissingConstructor {
        /// The implementation lacking a constructor
        implementation: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::DuplicateServiceId { contract, service_id } => {
                write!(f, "Contract '{}' has more than one provider named '{}'", contract, service_id)
            }
            ConfigError::MissingProvider { dependent, contract, service_id } => match service_id {
                Some(id) => write!(
                    f,
                    "Service '{}' depends on contract '{}' with id '{}', which has no provider",
                    dependent, contract, id
                ),
                None => write!(
                    f,
                    "Service '{}' depends on contract '{}', which has no provider",
                    dependent, contract
                ),
            },
            ConfigError::AmbiguousConstructor { declared_type, count } => {
                write!(f, "Type '{}' declares {} eligible constructors, expected exactly one", declared_type, count)
            }
            ConfigError::ContractNotImplemented { declared_type, contract } => {
                write!(f, "Type '{}' exports contract '{}' it does not implement", declared_type, contract)
            }
            ConfigError::MissingConstructor { implementation } => {
                write!(f, "No constructor registered for implementation '{}'", implementation)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Aggregated configuration failure
///
/// Every configuration defect discovered during a build pass is collected
/// and reported as one failure, so a single build run surfaces everything
/// that needs fixing.
///
/// # Examples
///
/// ```rust
/// use forge_di::{Lifetime, ResolutionPlan, ServiceDescriptor, TypeDescriptor};
///
/// let contract = TypeDescriptor::new("app.IWorker");
/// let first = TypeDescriptor::new("app.AlphaWorker");
/// let second = TypeDescriptor::new("app.BetaWorker");
///
/// // Two providers claim the same id within one contract group.
/// let errors = ResolutionPlan::build(vec![
///     ServiceDescriptor::new(contract.clone(), first, Lifetime::Singleton)
///         .with_service_id("primary"),
///     ServiceDescriptor::new(contract.clone(), second, Lifetime::Singleton)
///         .with_service_id("primary"),
/// ]).unwrap_err();
///
/// assert_eq!(errors.len(), 1);
/// assert!(errors.to_string().contains("primary"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigErrors {
    errors: Vec<ConfigError>,
}

impl ConfigErrors {
    pub(crate) fn new(errors: Vec<ConfigError>) -> Self {
        debug_assert!(!errors.is_empty());
        Self { errors }
    }

    /// The individual defects, in discovery order.
    pub fn errors(&self) -> &[ConfigError] {
        &self.errors
    }

    /// Number of defects found.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// True when no defects were recorded. An aggregated failure is never
    /// constructed empty, so this exists for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterate over the individual defects.
    pub fn iter(&self) -> impl Iterator<Item = &ConfigError> {
        self.errors.iter()
    }
}

impl fmt::Display for ConfigErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} configuration error(s):", self.errors.len())?;
        for error in &self.errors {
            writeln!(f, "  - {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigErrors {}
