use anyhow::Result;
use simple_navigator::app::App;
use simple_navigator::cli;
use tokio::runtime::Runtime;

fn main() -> Result<()> {
    // Process CLI arguments first (before logging init for cleaner output)
    let runtime_options = match cli::process_cli() {
        cli::CliResult::Exit(code) => {
            if code == 0 {
                return Ok(());
            }
            std::process::exit(code);
        }
        cli::CliResult::Continue(options) => options,
    };
    // Routes all log::info!() etc. to the debug log file; mirrors to stderr when RUST_LOG is set.
    // CLI --log-level flag takes highest precedence, then RUST_LOG, then config (applied in App::new).
    simple_navigator::debug::init_log_bridge(runtime_options.log_level);

    log::info!("Starting simple-navigator {}", simple_navigator::VERSION);

    let runtime = Runtime::new()?;
    let app = App::new(runtime_options)?;
    let result = runtime.block_on(app.run());

    log::info!("Driver loop exited, shutting down runtime");
    runtime.shutdown_timeout(std::time::Duration::from_secs(2));

    if let Err(ref e) = result {
        eprintln!("simple-navigator: error: {e:#}");
    }
    result
}
