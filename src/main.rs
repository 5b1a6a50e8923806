fn main() {
    if let Err(err) = deepwork_tui::cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
