// Fixture inspector: validates and prints svt fixture files.
// Usage: svt check <PATH>... | svt show <FILE> [--json]

fn main() {
    env_logger::init();
    svt::cli::run();
}
