use crate::{Entry, model::ids};

/// Builds the environment block.
pub(crate) fn entries(tabular_data: bool, nested: bool) -> Vec<Entry> {
    let mut entries = Vec::new();
    if tabular_data {
        entries.push(Entry::keyword("tabular_graphics_data"));
    }
    if nested {
        entries.push(Entry::id("top_method_pointer", ids::OUTER_METHOD));
    }
    entries
}
