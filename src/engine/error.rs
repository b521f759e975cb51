//! Error types for entity lifecycle and component storage operations.
//!
//! This module declares focused, composable error types used across the
//! registry and storage layers. Each error carries enough context to make
//! failures actionable while remaining small and cheap to pass around or
//! convert into the aggregate [`EcsError`].
//!
//! ## Goals
//! * **Specificity:** Each error type models a single failure mode (stale
//!   identity handles, duplicate component attachments, absent components,
//!   column-level type mismatches).
//! * **Ergonomics:** All errors implement [`std::error::Error`] and
//!   [`fmt::Display`], and provide `From<T>` conversions into [`EcsError`].
//! * **Actionability:** Structured fields (the offending identity, the
//!   component name, the relation target) make logs useful without
//!   reproducing the issue.
//!
//! ## Typical flow
//! Low-level column operations return [`ColumnError`]. Registry operations
//! use `?` to bubble failures into [`EcsError`], which callers can match on
//! for control flow or log with user-readable messages.
//!
//! ## Display vs. Debug
//! * [`fmt::Display`] is optimized for operator logs (short, imperative
//!   phrasing).
//! * [`fmt::Debug`] (derived) retains full structure for diagnostics.

use std::any::TypeId;
use std::fmt;

use crate::engine::entity::Identity;

/// Returned when an [`Identity`] handle does not name a live entity:
/// typically it was despawned, its generation no longer matches the meta
/// table, or its index is out of range.
///
/// Use this to prevent use-after-free style logic errors at the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownEntityError {
    /// The stale or out-of-range identity that was supplied.
    pub identity: Identity,
}

impl fmt::Display for UnknownEntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown entity {}", self.identity)
    }
}

impl std::error::Error for UnknownEntityError {}

/// Returned when a component with the same type and relation target is
/// already attached to the entity.
///
/// ### Fields
/// * `identity` — The entity the attachment was attempted on.
/// * `component` — Diagnostic name of the component type.
/// * `target` — Relation target of the attachment ([`Identity::NONE`] for a
///   plain component).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateComponentError {
    /// Entity the attachment was attempted on.
    pub identity: Identity,
    /// Diagnostic name of the component type.
    pub component: &'static str,
    /// Relation target of the attachment.
    pub target: Identity,
}

impl fmt::Display for DuplicateComponentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.target.is_none() {
            write!(f, "entity {} already has component {}", self.identity, self.component)
        } else {
            write!(
                f,
                "entity {} already has component {} targeting {}",
                self.identity, self.component, self.target
            )
        }
    }
}

impl std::error::Error for DuplicateComponentError {}

/// Returned when an operation expects a component that the entity's current
/// archetype does not contain.
///
/// ### Fields
/// * `identity` — The entity that was probed.
/// * `component` — Diagnostic name of the component type.
/// * `target` — Relation target of the lookup ([`Identity::NONE`] for a
///   plain component).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentNotFoundError {
    /// Entity that was probed.
    pub identity: Identity,
    /// Diagnostic name of the component type.
    pub component: &'static str,
    /// Relation target of the lookup.
    pub target: Identity,
}

impl fmt::Display for ComponentNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.target.is_none() {
            write!(f, "entity {} has no component {}", self.identity, self.component)
        } else {
            write!(
                f,
                "entity {} has no component {} targeting {}",
                self.identity, self.component, self.target
            )
        }
    }
}

impl std::error::Error for ComponentNotFoundError {}

/// Error for typed column (component storage) operations.
///
/// Columns store a single element type behind a type-erased interface;
/// these errors surface when a dynamically-typed value or access does not
/// match the column's declared element type, or addresses a row outside the
/// initialized range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnError {
    /// The dynamic type of a value did not match the column's element type.
    TypeMismatch {
        /// The column's declared element type.
        expected: TypeId,
        /// Human-readable name of the declared element type.
        expected_name: &'static str,
        /// The dynamic type that was provided or requested.
        actual: TypeId,
    },

    /// A row index addressed storage outside the valid range.
    RowOutOfBounds {
        /// Row index that was addressed.
        row: usize,
        /// Number of initialized rows in the column.
        length: usize,
    },
}

impl fmt::Display for ColumnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnError::TypeMismatch { expected_name, actual, .. } => {
                write!(f, "type mismatch: column stores {expected_name}, got {actual:?}")
            }
            ColumnError::RowOutOfBounds { row, length } => {
                write!(f, "row {row} out of bounds (column length {length})")
            }
        }
    }
}

impl std::error::Error for ColumnError {}

/// Aggregate error for registry operations.
///
/// All failure modes are reported synchronously and are recoverable: the
/// registry's internal invariants (meta-table consistency, archetype
/// density) hold after any error, and no partial mutation is observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcsError {
    /// A stale or out-of-range identity was passed to an operation that
    /// expects a live entity.
    UnknownEntity(UnknownEntityError),

    /// Adding a component whose type and target are already present.
    DuplicateComponent(DuplicateComponentError),

    /// Removing or reading a component that is absent.
    ComponentNotFound(ComponentNotFoundError),

    /// A storage-level column operation failed.
    Column(ColumnError),
}

impl fmt::Display for EcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcsError::UnknownEntity(e) => write!(f, "{e}"),
            EcsError::DuplicateComponent(e) => write!(f, "{e}"),
            EcsError::ComponentNotFound(e) => write!(f, "{e}"),
            EcsError::Column(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for EcsError {}

impl From<UnknownEntityError> for EcsError {
    fn from(e: UnknownEntityError) -> Self {
        EcsError::UnknownEntity(e)
    }
}

impl From<DuplicateComponentError> for EcsError {
    fn from(e: DuplicateComponentError) -> Self {
        EcsError::DuplicateComponent(e)
    }
}

impl From<ComponentNotFoundError> for EcsError {
    fn from(e: ComponentNotFoundError) -> Self {
        EcsError::ComponentNotFound(e)
    }
}

impl From<ColumnError> for EcsError {
    fn from(e: ColumnError) -> Self {
        EcsError::Column(e)
    }
}

/// Convenience alias for registry results.
pub type EcsResult<T> = Result<T, EcsError>;
