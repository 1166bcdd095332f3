#![deny(clippy::alloc_instead_of_core)]
#![deny(clippy::allow_attributes_without_reason)]
#![deny(clippy::cast_possible_truncation)]
#![deny(clippy::dbg_macro)]
#![deny(clippy::equatable_if_let)]
#![deny(clippy::filter_map_next)]
#![deny(clippy::flat_map_option)]
#![deny(clippy::map_unwrap_or)]
#![deny(clippy::missing_panics_doc)]
#![deny(clippy::option_if_let_else)]
#![deny(clippy::panic)]
#![deny(clippy::std_instead_of_alloc)]
#![deny(clippy::std_instead_of_core)]
#![deny(clippy::todo)]
#![deny(clippy::wildcard_enum_match_arm)]
#![deny(clippy::wildcard_imports)]
#![deny(macro_use_extern_crate)]
#![deny(unused_crate_dependencies)]
#![deny(unused_extern_crates)]
#![deny(unused_lifetimes)]
#![deny(unused_qualifications)]

use std::{
    io::{self, Write},
    path::PathBuf,
};

use clap::Parser;

mod generate;
use generate::generate;

#[derive(Parser)]
#[clap(
    author,
    version,
    about = "Print opcode and group table initializers generated from a tab-delimited table",
    long_about = None
)]
struct Args {
    #[clap(default_value = "8086_table.txt", help = "Tab-delimited opcode table")]
    table: PathBuf,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let mut stdout = io::stdout().lock();
    if let Err(e) = generate(&args.table, &mut stdout) {
        // lines generated before the failure stay printed, if this fails too there is nowhere
        // left to report it
        stdout.flush().ok();
        eprintln!("\x1b[1;31m{}\x1b[1;0m", e);
        std::process::exit(1);
    }
}
