use arcadia_budget::cli::run_cli;

fn main() {
    arcadia_budget::init();
    if let Err(err) = run_cli() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
