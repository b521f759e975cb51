use strata_ecs::engine::error::ColumnError;
use strata_ecs::engine::storage::{Column, TypeErasedColumn};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Mass(f64);

#[derive(Debug, Clone, Copy, PartialEq)]
struct Charge(i8);

#[test]
fn push_assigns_consecutive_rows() {
    let mut column: Column<Mass> = Column::new();

    for i in 0..16 {
        let row = column.push(Mass(i as f64));
        assert_eq!(row, i);
    }

    assert_eq!(column.length(), 16);
    assert_eq!(column.get(3), Some(&Mass(3.0)));
}

#[test]
fn swap_remove_moves_the_last_row_into_the_hole() {
    let mut column: Column<Mass> = Column::new();
    for i in 0..4 {
        column.push(Mass(i as f64));
    }

    // Row 1 is filled by the previous last row (index 3).
    let moved = column.swap_remove_row(1).unwrap();
    assert_eq!(moved, Some(3));
    assert_eq!(column.get(1), Some(&Mass(3.0)));
    assert_eq!(column.length(), 3);

    // Removing the last row moves nothing.
    let moved = column.swap_remove_row(2).unwrap();
    assert_eq!(moved, None);
    assert_eq!(column.length(), 2);
}

#[test]
fn swap_remove_out_of_bounds_is_an_error() {
    let mut column: Column<Mass> = Column::new();
    column.push(Mass(1.0));

    let result = column.swap_remove_row(5);
    assert!(matches!(result, Err(ColumnError::RowOutOfBounds { row: 5, length: 1 })));
}

#[test]
fn push_erased_rejects_mismatched_values() {
    let mut column: Column<Mass> = Column::new();

    let row = column.push_erased(Box::new(Mass(2.5))).unwrap();
    assert_eq!(row, 0);

    let result = column.push_erased(Box::new(Charge(1)));
    assert!(matches!(result, Err(ColumnError::TypeMismatch { .. })));
    assert_eq!(column.length(), 1);
}

#[test]
fn move_row_into_transfers_the_value() {
    let mut source: Column<Mass> = Column::new();
    let mut destination: Column<Mass> = Column::new();
    for i in 0..3 {
        source.push(Mass(i as f64));
    }

    let (destination_row, moved_from) = source.move_row_into(&mut destination, 0).unwrap();

    assert_eq!(destination_row, 0);
    assert_eq!(moved_from, Some(2));
    assert_eq!(destination.get(0), Some(&Mass(0.0)));
    assert_eq!(source.length(), 2);
    assert_eq!(source.get(0), Some(&Mass(2.0)));
}

#[test]
fn move_row_into_rejects_mismatched_columns() {
    let mut source: Column<Mass> = Column::new();
    let mut destination: Column<Charge> = Column::new();
    source.push(Mass(1.0));

    let result = source.move_row_into(&mut destination, 0);

    assert!(matches!(result, Err(ColumnError::TypeMismatch { .. })));
    assert_eq!(source.length(), 1);
    assert_eq!(destination.length(), 0);
}

#[test]
fn erased_row_access_downcasts_to_the_element_type() {
    let mut column: Column<Charge> = Column::new();
    column.push(Charge(-3));

    let value = column.row_ref(0).unwrap();
    assert_eq!(value.downcast_ref::<Charge>(), Some(&Charge(-3)));
    assert!(value.downcast_ref::<Mass>().is_none());

    assert!(column.row_ref(1).is_none());
}
