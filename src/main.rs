use std::io;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> io::Result<()> {
    init_tracing();

    println!("Hello! This is the Monkey programming language!");
    println!("Feel free to type in commands");

    let stdin = io::stdin();
    treemonkey::repl::start(stdin.lock(), io::stdout())
}

/// Logging is opt-in: nothing is installed unless `RUST_LOG` is set,
/// e.g. `RUST_LOG=treemonkey=trace`.
fn init_tracing() {
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }
}
