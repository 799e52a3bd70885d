//! `swagts` binary.

fn main() {
    std::process::exit(swagts_cli::run_cli(std::env::args()));
}
