use std::io::Write;
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use log::LevelFilter;

fn default_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Install the stdout trace logger. Later calls are ignored.
pub fn init() {
    env_logger::Builder::new()
        .target(env_logger::Target::Stdout)
        .filter_level(default_level())
        .format(|buf, record| {
            let ts = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0);
            let current = thread::current();
            let thread_name = current.name().unwrap_or("unnamed");
            writeln!(buf, "[{ts}ms][{thread_name}] {}", record.args())
        })
        .try_init()
        .ok();
}
