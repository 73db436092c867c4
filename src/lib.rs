// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Low-latency asynchronous logging.
//!
//! Call sites carry a compile-time 32-bit identifier for their format
//! string instead of the string itself. The hot path packs up to
//! [`MAX_ARGS`] argument slots into a fixed-size record and hands it to
//! a private lock-free SPSC ring; a single background thread resolves
//! identifiers through the format registry, renders the text and writes
//! the sink. Producers never allocate, never lock and never block
//! (under the default backpressure policy).
//!
//! ```ignore
//! hotlog::init(hotlog::Config::default())?;
//! log_info!("listening on port {}", 8080);
//! log_debug!("peer {} connected", peer_id);
//! hotlog::shutdown(); // drain before the process exits
//! ```
//!
//! Rust statics run no destructors, so the final flush only happens
//! through [`shutdown`] (idempotent, safe to call from any thread).

mod config;
mod consumer;
mod format;
mod hash;
mod level;
mod logger;
#[macro_use]
mod macros;
mod producer;
mod record;
mod registry;
mod ring;

// Public exports
pub use config::{BackpressurePolicy, Config, ConfigError};
pub use consumer::{LogSink, StderrSink, StdoutSink, WriterSink};
pub use hash::{fnv1a_32, format_id};
pub use level::{Level, MIN_LEVEL};
pub use logger::{dropped, init, init_with_sink, shutdown, InitError, Logger};
pub use producer::ProducerHandle;
pub use record::{ArgSlot, LogArg, StrView, MAX_ARGS};
pub use registry::{FormatRegistry, RegistryError};
pub use ring::SpscRing;

// Macro plumbing; not part of the public API.
#[doc(hidden)]
pub use logger::register_call_site as __register;
#[doc(hidden)]
pub use producer::log_current_thread as __log;
