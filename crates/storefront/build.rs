use std::fs;
use std::path::{Path, PathBuf};

use clap::CommandFactory;

// cli.rs only needs clap + clap_complete, both build-dependencies.
#[path = "src/cli.rs"]
mod cli;

/// Top-level commands that get their own page set. Single-shot commands
/// (`categories`, `completions`) are covered by the root page.
const PAGED_GROUPS: &[&str] = &["products", "config"];

fn main() {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let out_dir: PathBuf = std::env::var_os("OUT_DIR")
        .expect("OUT_DIR not set by Cargo")
        .into();
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).expect("failed to create man output directory");

    let root = cli::Cli::command();
    write_page(&root, &man_dir);

    for group in root
        .get_subcommands()
        .filter(|sub| PAGED_GROUPS.contains(&sub.get_name()))
    {
        let group_name = format!("storefront-{}", group.get_name());
        write_page(&group.clone().name(group_name.clone()), &man_dir);

        for action in group.get_subcommands().filter(|sub| !sub.is_hide_set()) {
            let action = action
                .clone()
                .name(format!("{group_name}-{}", action.get_name()));
            write_page(&action, &man_dir);
        }
    }
}

/// Render one command as `<name>.1` in `dir`.
fn write_page(cmd: &clap::Command, dir: &Path) {
    let path = dir.join(format!("{}.1", cmd.get_name()));
    let mut buf = Vec::new();
    clap_mangen::Man::new(cmd.clone())
        .section("1")
        .manual("storefront manual")
        .render(&mut buf)
        .unwrap_or_else(|e| panic!("failed to render {}: {e}", path.display()));
    fs::write(&path, buf).unwrap_or_else(|e| panic!("failed to write {}: {e}", path.display()));
}
