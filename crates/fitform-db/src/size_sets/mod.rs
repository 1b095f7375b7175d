//! Database operations for the `size_sets` and `size_set_fields` tables.

mod read;
mod types;
mod write;

pub use read::{
    count_sets_for_shop, get_set, list_fields_for_set, list_fields_for_sets, list_sets_for_shop,
    match_sets_by_tokens,
};
pub use types::{FieldRow, NewField, NewSizeSet, PresentationAxes, SizeSetRow};
pub use write::{
    create_set, delete_set, reorder_all, swap_positions, update_set, ReorderDirection,
};
