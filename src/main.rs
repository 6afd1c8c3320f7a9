//! Design Token Compiler Binary

use std::process;
use tokc::TokenCli;

fn main() {
    let mut cli = TokenCli::new();

    if let Err(e) = cli.run() {
        eprintln!("❌ {}", e);
        if e.is_input_missing() {
            eprintln!("   Check the path or pass --input / --tokens explicitly");
        }
        process::exit(1);
    }
}
