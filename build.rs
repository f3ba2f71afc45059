// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::io;
use std::path::Path;

/// Required directory option
fn dir_arg(id: &'static str, short: char, help: &'static str) -> Arg {
    Arg::new(id)
        .short(short)
        .long(id)
        .value_name("DIR")
        .required(true)
        .help(help)
}

fn build_cli() -> Command {
    Command::new("pkgen")
        .version(env!("CARGO_PKG_VERSION"))
        .author("pkgen Contributors")
        .about("Run package build recipes inside a throwaway sandbox")
        .arg(
            Arg::new("log")
                .short('l')
                .long("log")
                .value_name("PATH")
                .help("Redirect standard output and error to this file"),
        )
        .arg(dir_arg("app", 'a', "Application recipes directory, mounted read-only at /app"))
        .arg(dir_arg("data", 'd', "Data directory, mounted writable at /data"))
        .arg(dir_arg("toolchain", 't', "Toolchain directory, mounted read-only at /usr"))
        .arg(
            Arg::new("root")
                .short('r')
                .long("root")
                .value_name("DIR")
                .default_value("/mnt")
                .help("Host mount point the sandbox root is assembled at"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase log verbosity (-v info, -vv debug)"),
        )
        .arg(
            Arg::new("recipes")
                .value_name("RECIPE")
                .required(true)
                .num_args(1..)
                .help("Recipes to run, in order"),
        )
}

/// Render the man page into `dir`
fn write_man_page(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)?;

    let mut page = Vec::new();
    Man::new(build_cli()).render(&mut page)?;

    fs::write(dir.join("pkgen.1"), page)
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Cargo always sets this for build scripts
    let Some(manifest_dir) = env::var_os("CARGO_MANIFEST_DIR") else {
        return;
    };

    // A missing man page must never fail the build
    if let Err(e) = write_man_page(&Path::new(&manifest_dir).join("man")) {
        println!("cargo:warning=Man page not generated: {}", e);
    }
}
