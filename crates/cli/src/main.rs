fn main() {
    if let Err(e) = classdex_cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
