use plume::cli;

fn main() {
    if let Err(e) = cli::main() {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}
