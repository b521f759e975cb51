//! Dense typed columns and type-erased access for archetype component data.
//!
//! This module implements the column container, [`Column<T>`], which stores
//! one component type densely in row order, and the [`TypeErasedColumn`]
//! trait that lets archetypes manage heterogeneous columns behind trait
//! objects without runtime type inspection of the stored rows.
//!
//! # Storage model
//!
//! A column is a plain `Vec<T>`. Rows are addressed by `usize` index and are
//! kept dense at all times:
//!
//! - **Append**: [`push`](Column::push) writes at the end.
//! - **Remove**: [`swap_remove_row`](TypeErasedColumn::swap_remove_row)
//!   deletes a row in `O(1)` by moving the last row into the removed slot
//!   (unless the removed row is already last), reporting which row moved so
//!   callers can repair entity metadata.
//! - **Transfer**: [`move_row_into`](TypeErasedColumn::move_row_into) moves a
//!   row from one column into another column of the same element type,
//!   performing the swap-remove in the source.
//!
//! These operations preserve dense packing but do **not** preserve row order;
//! the owning archetype carries the row → entity mapping.
//!
//! # Type erasure
//!
//! [`TypeErasedColumn`] provides:
//!
//! - the element [`TypeId`] and human-readable element type name,
//! - downcasting hooks via `as_any` / `as_any_mut`,
//! - row access as `&dyn Any` / `&mut dyn Any`,
//! - mutation mirroring the typed operations (`push_erased`,
//!   `swap_remove_row`, `move_row_into`).
//!
//! Dynamically-typed operations succeed only when the provided value or
//! destination column matches the element type; mismatches return
//! [`ColumnError::TypeMismatch`] and leave both columns untouched.

use std::any::{type_name, Any, TypeId};

use crate::engine::error::ColumnError;

/// A type-erased interface over a single-component column.
///
/// Implementations must keep rows dense: every index below
/// [`length`](Self::length) is an initialized element, and removal uses
/// swap-remove semantics.
pub trait TypeErasedColumn: Any {
    /// Number of rows currently stored.
    fn length(&self) -> usize;

    /// The [`TypeId`] of the stored element type.
    fn element_type_id(&self) -> TypeId;

    /// Human-readable name of the stored element type.
    fn element_type_name(&self) -> &'static str;

    /// Immutable type-erased reference for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Mutable type-erased reference for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Appends a dynamically-typed value, returning the row it landed in.
    ///
    /// ## Errors
    /// [`ColumnError::TypeMismatch`] if the value's dynamic type does not
    /// match the element type; the column is unchanged.
    fn push_erased(&mut self, value: Box<dyn Any>) -> Result<usize, ColumnError>;

    /// Removes the row at `row`, keeping the column dense.
    ///
    /// Returns the previous index of the row that was moved into `row`,
    /// or `None` if the removed row was the last one.
    ///
    /// ## Errors
    /// [`ColumnError::RowOutOfBounds`] if `row` is out of range.
    fn swap_remove_row(&mut self, row: usize) -> Result<Option<usize>, ColumnError>;

    /// Moves the row at `row` into `destination`, swap-removing it here.
    ///
    /// Returns `(destination_row, moved_from)` where `moved_from` is the
    /// previous index of the source row that filled the hole, if any.
    ///
    /// ## Errors
    /// - [`ColumnError::TypeMismatch`] if `destination` stores a different
    ///   element type.
    /// - [`ColumnError::RowOutOfBounds`] if `row` is out of range.
    ///
    /// Both columns are unchanged on error.
    fn move_row_into(
        &mut self,
        destination: &mut dyn TypeErasedColumn,
        row: usize,
    ) -> Result<(usize, Option<usize>), ColumnError>;

    /// Borrows the value at `row`, or `None` if out of range.
    fn row_ref(&self, row: usize) -> Option<&dyn Any>;

    /// Mutably borrows the value at `row`, or `None` if out of range.
    fn row_mut(&mut self, row: usize) -> Option<&mut dyn Any>;
}

/// Dense storage for a single component type.
#[derive(Debug, Default)]
pub struct Column<T: 'static> {
    values: Vec<T>,
}

impl<T: 'static> Column<T> {
    /// Creates an empty column.
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Appends a value, returning its row.
    #[inline]
    pub fn push(&mut self, value: T) -> usize {
        self.values.push(value);
        self.values.len() - 1
    }

    /// Borrows the value at `row`.
    #[inline]
    pub fn get(&self, row: usize) -> Option<&T> {
        self.values.get(row)
    }

    /// Mutably borrows the value at `row`.
    #[inline]
    pub fn get_mut(&mut self, row: usize) -> Option<&mut T> {
        self.values.get_mut(row)
    }

    /// The stored rows, in column order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    fn mismatch(actual: TypeId) -> ColumnError {
        ColumnError::TypeMismatch {
            expected: TypeId::of::<T>(),
            expected_name: type_name::<T>(),
            actual,
        }
    }

    fn out_of_bounds(&self, row: usize) -> ColumnError {
        ColumnError::RowOutOfBounds { row, length: self.values.len() }
    }
}

impl<T: 'static> TypeErasedColumn for Column<T> {
    fn length(&self) -> usize {
        self.values.len()
    }

    fn element_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn element_type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn push_erased(&mut self, value: Box<dyn Any>) -> Result<usize, ColumnError> {
        let actual = (*value).type_id();
        let value = value.downcast::<T>().map_err(|_| Self::mismatch(actual))?;
        Ok(self.push(*value))
    }

    fn swap_remove_row(&mut self, row: usize) -> Result<Option<usize>, ColumnError> {
        if row >= self.values.len() {
            return Err(self.out_of_bounds(row));
        }

        self.values.swap_remove(row);
        if row < self.values.len() {
            Ok(Some(self.values.len()))
        } else {
            Ok(None)
        }
    }

    fn move_row_into(
        &mut self,
        destination: &mut dyn TypeErasedColumn,
        row: usize,
    ) -> Result<(usize, Option<usize>), ColumnError> {
        if row >= self.values.len() {
            return Err(self.out_of_bounds(row));
        }

        let destination_type = destination.element_type_id();
        let destination = destination
            .as_any_mut()
            .downcast_mut::<Column<T>>()
            .ok_or_else(|| Self::mismatch(destination_type))?;

        let value = self.values.swap_remove(row);
        let destination_row = destination.push(value);

        let moved_from = if row < self.values.len() {
            Some(self.values.len())
        } else {
            None
        };

        Ok((destination_row, moved_from))
    }

    fn row_ref(&self, row: usize) -> Option<&dyn Any> {
        self.values.get(row).map(|value| value as &dyn Any)
    }

    fn row_mut(&mut self, row: usize) -> Option<&mut dyn Any> {
        self.values.get_mut(row).map(|value| value as &mut dyn Any)
    }
}
