// SPDX-License-Identifier: Apache-2.0 OR MIT
// Example demonstrating the hotlog macro surface
//
// Run with: cargo run --example logging_demo

use hotlog::{log_debug, log_error, log_info, log_warn, Config};
use std::thread;
use std::time::Duration;

fn main() {
    hotlog::init(Config::default()).expect("logger installed once");

    log_info!("Program start");

    let worker = thread::spawn(|| {
        for i in 0..100u32 {
            log_debug!("worker iteration {}", i);
            thread::sleep(Duration::from_millis(10));
        }
    });

    for i in 0..50u32 {
        log_info!("main loop {}", i);
        thread::sleep(Duration::from_millis(20));
    }

    worker.join().expect("worker finished");

    log_warn!("Shutting down after {} drops...", hotlog::dropped());
    log_error!("This is what an error looks like: code {}", 13u32);

    // Statics run no destructors; drain explicitly before exiting.
    hotlog::shutdown();
}
