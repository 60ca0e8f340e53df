use std::fs;
use std::path::Path;

use clap::CommandFactory;

// cli.rs only depends on clap + clap_complete (both build-dependencies), so
// it compiles here without the rest of the crate.
#[path = "src/cli.rs"]
mod cli;

fn main() {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let Some(out_dir) = std::env::var_os("OUT_DIR") else {
        panic!("OUT_DIR not set by Cargo");
    };
    let man_dir = Path::new(&out_dir).join("man");
    fs::create_dir_all(&man_dir)
        .unwrap_or_else(|e| panic!("failed to create man output directory: {e}"));

    generate_manpages(&cli::Cli::command(), &man_dir);
}

/// Recursively generate man pages for a command and all its subcommands.
fn generate_manpages(cmd: &clap::Command, dir: &Path) {
    let name = cmd.get_name().to_owned();
    let path = dir.join(format!("{name}.1"));

    let mut buf = Vec::new();
    clap_mangen::Man::new(cmd.clone())
        .render(&mut buf)
        .unwrap_or_else(|e| panic!("failed to render man page for `{name}`: {e}"));
    fs::write(&path, buf).unwrap_or_else(|e| panic!("failed to write {}: {e}", path.display()));

    for sub in cmd.get_subcommands() {
        if sub.is_hide_set() {
            continue;
        }
        let sub = sub.clone().name(format!("{name}-{}", sub.get_name()));
        generate_manpages(&sub, dir);
    }
}
