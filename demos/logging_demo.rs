// SPDX-License-Identifier: Apache-2.0 OR MIT
// Example demonstrating the logging pipeline
//
// Run with: cargo run --example logging_demo

use anyhow::Result;
use rapidlog::{
    log_debug, log_error, log_fatal, log_info, log_step, log_trace, log_warning, Config, Level,
};
use std::thread;

fn main() -> Result<()> {
    let config = Config {
        log_dir: "demo_logs".into(),
        file_prefix: "demo".into(),
        min_level: Level::Trace,
        ..Config::default()
    };
    rapidlog::initialize(config)?;

    println!("--- severity levels ---");
    rapidlog::set_module_name("Demo");
    log_trace!("verbose trace detail");
    log_debug!("diagnostic detail: {} buffers", 4);
    log_info!("normal operation");
    log_warning!("memory at {}%", 87);
    log_error!("operation failed: {}", "connection reset");
    log_fatal!("cannot continue");
    log_step!(1, "startup complete");

    println!("--- concurrent producers ---");
    let workers: Vec<_> = (0..4)
        .map(|worker| {
            thread::spawn(move || {
                rapidlog::set_module_name(&format!("worker-{worker}"));
                for i in 0..1000 {
                    log_info!("worker {} message {}", worker, i);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("worker panicked");
    }

    println!("--- per-producer stats ---");
    rapidlog::get_instance()?.print_stats();

    println!("--- runtime level change ---");
    rapidlog::get_instance()?.set_log_level(Level::Error);
    log_info!("suppressed");
    log_error!("still visible");

    rapidlog::destroy_instance();
    println!("done; see demo_logs/demo.log");
    Ok(())
}
