use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use wikitree::cli::commands::execute_command;
use wikitree::cli::{output, Cli};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(e) = execute_command(&cli) {
        output::error(&e);
        std::process::exit(e.exit_code());
    }
}

/// `-d` count to level.
fn verbosity_level(debug: u8) -> LevelFilter {
    match debug {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Log to stderr; `RUST_LOG` wins over `-d` when set.
fn init_logging(debug: u8) {
    let level = verbosity_level(debug);
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(debug > 1)
                .with_span_events(FmtSpan::CLOSE)
                .with_filter(filter),
        )
        .init();

    tracing::debug!(%level, "logging initialized");
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use wikitree::util::testing;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        testing::init_test_setup();
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case(0, LevelFilter::WARN)]
    #[case(1, LevelFilter::INFO)]
    #[case(2, LevelFilter::DEBUG)]
    #[case(3, LevelFilter::TRACE)]
    #[case(9, LevelFilter::TRACE)]
    fn given_debug_count_when_mapping_then_level(#[case] debug: u8, #[case] expected: LevelFilter) {
        assert_eq!(verbosity_level(debug), expected);
    }
}
