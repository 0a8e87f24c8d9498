use std::cmp::Ordering;

/// How one data row lines up with its table's header.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RowShape {
    /// Header or separator row.
    Skip,
    /// One cell per header column.
    Aligned,
    /// The rowspan-merged column belongs to an earlier row; its value is carried over.
    MergedColumnAbsent,
    /// An unexpected cell sits right after the merged column.
    ExtraColumn,
}

impl RowShape {
    /// Physical shift applied to every column after the merged one.
    pub fn offset(self) -> isize {
        match self {
            Self::Skip | Self::Aligned => 0,
            Self::MergedColumnAbsent => -1,
            Self::ExtraColumn => 1,
        }
    }
}

/// Column conventions of one kind of documentation table.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TableLayout {
    /// Header width of a complete table, optional trailing column excluded.
    pub required_columns: usize,
    /// Column that may be merged across rows with `rowspan`.
    pub merged_column: usize,
    /// Rows with fewer cells carry no data.
    pub min_cells: usize,
    pub shift_extra_columns: bool,
}

/// `name | params | description [| multiplayer]`
pub const KEY_EVENT_LAYOUT: TableLayout = TableLayout {
    required_columns: 3,
    merged_column: 1,
    min_cells: 2,
    shift_extra_columns: false,
};

/// `name | description | units | settable [| multiplayer]`
pub const SIMVAR_LAYOUT: TableLayout = TableLayout {
    required_columns: 4,
    merged_column: 1,
    min_cells: 3,
    shift_extra_columns: true,
};

impl TableLayout {
    pub fn classify(&self, cell_count: usize, nominal_columns: usize) -> RowShape {
        if cell_count < self.min_cells.max(2) {
            return RowShape::Skip;
        }

        // A header without the merged column at all (e.g. two-column event tables).
        if nominal_columns < self.required_columns {
            return RowShape::MergedColumnAbsent;
        }

        match cell_count.cmp(&nominal_columns) {
            Ordering::Less => RowShape::MergedColumnAbsent,
            Ordering::Equal => RowShape::Aligned,
            Ordering::Greater if self.shift_extra_columns => RowShape::ExtraColumn,
            Ordering::Greater => RowShape::Aligned,
        }
    }
}

/// Walks the rows of one table, remembering the last merged-column value.
#[derive(Debug, Clone)]
pub struct RowCursor {
    layout: TableLayout,
    nominal_columns: usize,
    carried: String,
}

impl RowCursor {
    pub fn new(layout: TableLayout, nominal_columns: usize) -> Self {
        Self {
            layout,
            nominal_columns,
            carried: String::new(),
        }
    }

    /// Classifies `cells` and returns the row with the merged-column value resolved,
    /// or `None` for rows to skip.
    pub fn advance<'r, T>(
        &mut self,
        cells: &'r [T],
        text_of: impl Fn(&T) -> String,
    ) -> Option<ShapedRow<'r, T>> {
        let shape = self.layout.classify(cells.len(), self.nominal_columns);
        if shape == RowShape::Skip {
            return None;
        }

        if shape != RowShape::MergedColumnAbsent {
            self.carried = cells
                .get(self.layout.merged_column)
                .map(&text_of)
                .unwrap_or_default();
        }

        Some(ShapedRow {
            shape,
            merged: self.carried.clone(),
            merged_column: self.layout.merged_column,
            cells,
        })
    }
}

#[derive(Debug)]
pub struct ShapedRow<'r, T> {
    pub shape: RowShape,
    /// Value of the merged column, read from this row or carried over.
    pub merged: String,
    merged_column: usize,
    cells: &'r [T],
}

impl<'r, T> ShapedRow<'r, T> {
    /// Cell at a header (logical) column index. The merged column itself is read
    /// through [`ShapedRow::merged`].
    pub fn cell(&self, logical: usize) -> Option<&'r T> {
        let physical = match logical.cmp(&self.merged_column) {
            Ordering::Less => Some(logical),
            Ordering::Equal => (self.shape != RowShape::MergedColumnAbsent).then_some(logical),
            Ordering::Greater => logical.checked_add_signed(self.shape.offset()),
        }?;
        self.cells.get(physical)
    }
}

#[cfg(test)]
mod tests {
    use super::{KEY_EVENT_LAYOUT, RowCursor, RowShape, SIMVAR_LAYOUT};

    fn text(cell: &&str) -> String {
        cell.to_string()
    }

    #[test]
    fn classify_follows_cell_count_against_nominal() {
        assert_eq!(SIMVAR_LAYOUT.classify(4, 4), RowShape::Aligned);
        assert_eq!(SIMVAR_LAYOUT.classify(3, 4), RowShape::MergedColumnAbsent);
        assert_eq!(SIMVAR_LAYOUT.classify(5, 4), RowShape::ExtraColumn);
        assert_eq!(SIMVAR_LAYOUT.classify(2, 4), RowShape::Skip);
        assert_eq!(KEY_EVENT_LAYOUT.classify(1, 3), RowShape::Skip);
        assert_eq!(KEY_EVENT_LAYOUT.classify(0, 3), RowShape::Skip);
    }

    #[test]
    fn offsets_match_shapes() {
        assert_eq!(RowShape::Aligned.offset(), 0);
        assert_eq!(RowShape::MergedColumnAbsent.offset(), -1);
        assert_eq!(RowShape::ExtraColumn.offset(), 1);
    }

    #[test]
    fn key_event_tables_do_not_shift_extra_cells() {
        assert_eq!(KEY_EVENT_LAYOUT.classify(4, 3), RowShape::Aligned);
        assert_eq!(KEY_EVENT_LAYOUT.classify(2, 3), RowShape::MergedColumnAbsent);
    }

    #[test]
    fn two_column_event_tables_have_no_params_column() {
        assert_eq!(KEY_EVENT_LAYOUT.classify(2, 2), RowShape::MergedColumnAbsent);

        let mut cursor = RowCursor::new(KEY_EVENT_LAYOUT, 2);
        let cells = ["CONCORDE_EVENT", "Toggles something"];
        let row = cursor.advance(&cells, text).expect("row should resolve");
        assert_eq!(row.merged, "");
        assert_eq!(row.cell(2), Some(&"Toggles something"));
        assert_eq!(row.cell(3), None);
    }

    #[test]
    fn rowspan_value_is_carried_to_short_rows() {
        let mut cursor = RowCursor::new(SIMVAR_LAYOUT, 4);

        let first = ["BREAKER A", "Shared description", "Bool", "Y"];
        let row = cursor.advance(&first, text).expect("aligned row");
        assert_eq!(row.shape, RowShape::Aligned);
        assert_eq!(row.merged, "Shared description");
        assert_eq!(row.cell(2), Some(&"Bool"));

        let second = ["BREAKER B", "Bool", "N"];
        let row = cursor.advance(&second, text).expect("short row");
        assert_eq!(row.shape, RowShape::MergedColumnAbsent);
        assert_eq!(row.merged, "Shared description");
        assert_eq!(row.cell(0), Some(&"BREAKER B"));
        assert_eq!(row.cell(1), None);
        assert_eq!(row.cell(2), Some(&"Bool"));
        assert_eq!(row.cell(3), Some(&"N"));
        assert_eq!(row.cell(4), None);
    }

    #[test]
    fn extra_cell_pushes_following_columns_right() {
        let mut cursor = RowCursor::new(SIMVAR_LAYOUT, 4);
        let cells = ["AI TRAFFIC", "Description", "Shared cloud", "Number", "N"];
        let row = cursor.advance(&cells, text).expect("extra row");
        assert_eq!(row.shape, RowShape::ExtraColumn);
        assert_eq!(row.merged, "Description");
        assert_eq!(row.cell(2), Some(&"Number"));
        assert_eq!(row.cell(3), Some(&"N"));
    }

    #[test]
    fn skipped_rows_do_not_touch_carried_value() {
        let mut cursor = RowCursor::new(KEY_EVENT_LAYOUT, 3);
        let first = ["EVENT_A", "[0] value", "Desc"];
        assert!(cursor.advance(&first, text).is_some());
        let separator = ["only one"];
        assert!(cursor.advance(&separator, text).is_none());
        let short = ["EVENT_B", "Other desc"];
        let row = cursor.advance(&short, text).expect("short row");
        assert_eq!(row.merged, "[0] value");
    }
}
