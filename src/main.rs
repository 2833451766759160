fn main() {
    if let Err(err) = chart_ingest::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
