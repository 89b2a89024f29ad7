//! Producer/consumer decode engine.
//!
//! Two threads connected by the SPSC handoff queue: a reader that pulls raw
//! bytes from the serial transport and runs them through the assembler, and
//! a parser that drains the queue and decodes each unit in arrival order.
//! The reader never blocks on a full queue; the parser sleeps on a condition
//! variable between bursts instead of busy-polling.

use std::io::{ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, info, warn};

use vedirect_protocol::duplicate_ids;

use crate::assembler::{FrameAssembler, RawUnit};
use crate::decoder::{Decoder, SampleHook};
use crate::queue::{spsc_channel, QueueConsumer, QueueProducer, DEFAULT_QUEUE_CAPACITY};

/// How long the parser sleeps when the queue stays empty and no wakeup
/// arrives.
const PARSER_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Handoff queue capacity in units.
    pub queue_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

struct Wakeup {
    lock: Mutex<()>,
    condvar: Condvar,
}

/// A running decode engine.
///
/// Holds the reader and parser threads. [`join`](Engine::join) waits for the
/// source to reach end-of-stream and the queue to drain;
/// [`stop`](Engine::stop) shuts down early.
pub struct Engine {
    stop: Arc<AtomicBool>,
    wakeup: Arc<Wakeup>,
    reader: Option<JoinHandle<()>>,
    parser: Option<JoinHandle<()>>,
}

impl Engine {
    /// Spawn the reader and parser threads over a byte source.
    ///
    /// `on_data` fires for every decoded sample, `on_change` only when a
    /// sample differs from the cached value for its path.
    pub fn start<R>(
        source: R,
        on_data: SampleHook,
        on_change: SampleHook,
        config: EngineConfig,
    ) -> std::io::Result<Engine>
    where
        R: Read + Send + 'static,
    {
        let dups = duplicate_ids();
        if !dups.is_empty() {
            debug!(
                ids = ?dups.iter().map(|id| format!("0x{:04X}", id)).collect::<Vec<_>>(),
                "catalog contains overridden register ids, first match wins"
            );
        }

        let (producer, consumer) = spsc_channel(config.queue_capacity);
        let stop = Arc::new(AtomicBool::new(false));
        let eof = Arc::new(AtomicBool::new(false));
        let wakeup = Arc::new(Wakeup {
            lock: Mutex::new(()),
            condvar: Condvar::new(),
        });

        let reader = thread::Builder::new().name("vedirect-read".into()).spawn({
            let stop = stop.clone();
            let eof = eof.clone();
            let wakeup = wakeup.clone();
            move || {
                read_loop(source, producer, &stop, &wakeup);
                eof.store(true, Ordering::Release);
                wakeup.condvar.notify_one();
            }
        })?;

        let parser = thread::Builder::new().name("vedirect-parse".into()).spawn({
            let stop = stop.clone();
            let wakeup = wakeup.clone();
            let mut decoder = Decoder::new(on_data, on_change);
            move || parse_loop(consumer, &mut decoder, &stop, &eof, &wakeup)
        })?;

        info!("decode engine started");
        Ok(Engine {
            stop,
            wakeup,
            reader: Some(reader),
            parser: Some(parser),
        })
    }

    /// Wait for the source to end and every queued unit to be decoded.
    pub fn join(mut self) {
        self.join_threads();
    }

    /// Stop both threads and wait for them to exit. Units still queued when
    /// the stop lands may go undecoded.
    pub fn stop(mut self) {
        self.signal_stop();
        self.join_threads();
    }

    fn signal_stop(&self) {
        self.stop.store(true, Ordering::Release);
        self.wakeup.condvar.notify_one();
    }

    fn join_threads(&mut self) {
        if let Some(handle) = self.reader.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.parser.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.signal_stop();
        // No join here: a reader blocked in a transport read would hang the
        // dropping thread. It exits on its next loop iteration.
    }
}

fn read_loop<R: Read>(
    mut source: R,
    mut producer: QueueProducer<RawUnit>,
    stop: &AtomicBool,
    wakeup: &Wakeup,
) {
    let mut assembler = FrameAssembler::new();
    let mut buf = [0u8; 256];
    while !stop.load(Ordering::Acquire) {
        match source.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                let mut produced = false;
                for &byte in &buf[..n] {
                    if let Some(unit) = assembler.push(byte) {
                        if producer.push(RawUnit::now(unit)).is_err() {
                            warn!("handoff queue full, dropping unit");
                        } else {
                            produced = true;
                        }
                    }
                }
                if produced {
                    wakeup.condvar.notify_one();
                }
                // Leave room for other work between bursts.
                thread::yield_now();
            }
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => {
                warn!(%err, "transport read failed, stopping reader");
                break;
            }
        }
    }
}

fn parse_loop(
    mut consumer: QueueConsumer<RawUnit>,
    decoder: &mut Decoder,
    stop: &AtomicBool,
    eof: &AtomicBool,
    wakeup: &Wakeup,
) {
    loop {
        while let Some(raw) = consumer.pop() {
            decoder.handle_unit(&raw);
        }
        let finished = stop.load(Ordering::Acquire) || eof.load(Ordering::Acquire);
        if finished && consumer.is_empty() {
            break;
        }
        let mut guard = wakeup.lock.lock();
        wakeup
            .condvar
            .wait_for(&mut guard, PARSER_POLL_INTERVAL);
    }
    debug!("parser drained, exiting");
}

/// Feed a captured text log through the regular line-decode path.
///
/// Capture tools tend to flatten the tab separator into runs of spaces;
/// each run is collapsed back into a single tab before decoding.
pub fn replay_log(log: &str, decoder: &mut Decoder) {
    for line in log.lines() {
        let line = normalize_separators(line.trim());
        if line.is_empty() {
            continue;
        }
        decoder.handle_line(&line);
    }
}

fn normalize_separators(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_gap = false;
    for ch in line.chars() {
        if ch == ' ' || ch == '\t' {
            if !in_gap {
                out.push('\t');
            }
            in_gap = true;
        } else {
            out.push(ch);
            in_gap = false;
        }
    }
    out
}
