mod coordinator;
mod drivers;
mod error;
mod handoff;
mod logging;
mod pool;
mod sensor;
mod sim;
mod timer;
mod types;

/// Runs the line until the process is killed. Command-line arguments are
/// ignored.
fn main() -> anyhow::Result<()> {
    logging::init();
    sim::run(sim::LineTiming::default())?;
    Ok(())
}
