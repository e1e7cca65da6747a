//! Category listing.

use serde::Serialize;
use tabled::Tabled;

use storefront_core::Category;

use crate::cli::GlobalOpts;
use crate::output;

#[derive(Serialize)]
struct CategoryEntry {
    value: Category,
    label: &'static str,
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Label")]
    label: &'static str,
}

pub fn handle(global: &GlobalOpts) {
    let entries: Vec<CategoryEntry> = Category::ALL
        .iter()
        .map(|&value| CategoryEntry {
            value,
            label: value.label(),
        })
        .collect();
    let out = output::render_list(
        &global.output,
        &entries,
        |e| CategoryRow {
            value: e.value.to_string(),
            label: e.label,
        },
        |e| e.value.to_string(),
    );
    output::print_output(&out, global.quiet);
}
