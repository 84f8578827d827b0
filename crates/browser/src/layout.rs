pub const MIN_TABLE_HEIGHT: usize = 300;
pub const ROW_HEIGHT: usize = 36;

/// Table height that fits `row_count` rows plus header and padding without
/// vertical scrolling, never below [`MIN_TABLE_HEIGHT`].
pub fn preferred_height(row_count: usize) -> usize {
    row_count
        .saturating_add(2)
        .saturating_mul(ROW_HEIGHT)
        .max(MIN_TABLE_HEIGHT)
}
