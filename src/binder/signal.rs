//! Waiting for the external compile step.
//!
//! Generation writes sources; some other process compiles them. Binding has to wait until
//! the generated types are loadable. [`WaitPolicy::Signal`] blocks on a channel the compile
//! host notifies, the other two policies fall back to sleeping.

use crate::binder::compilation::CompilationHost;
use crate::error::{Error, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileEvent {
    /// A compile pass finished; the listed types may now be available
    Finished { types: Vec<String> },
    Failed(String),
}

/// Sending half handed to whoever drives compilation
#[derive(Debug, Clone)]
pub struct CompileSignal {
    sender: Sender<CompileEvent>,
}

impl CompileSignal {
    /// Returns false once the waiting side has gone away
    pub fn finished(&self, types: Vec<String>) -> bool {
        self.sender.send(CompileEvent::Finished { types }).is_ok()
    }

    pub fn failed(&self, message: &str) -> bool {
        self.sender
            .send(CompileEvent::Failed(message.to_string()))
            .is_ok()
    }
}

pub fn compile_channel() -> (CompileSignal, Receiver<CompileEvent>) {
    let (sender, receiver) = unbounded();
    (CompileSignal { sender }, receiver)
}

#[derive(Debug)]
pub enum WaitPolicy {
    /// Sleep once, then check
    FixedDelay(Duration),
    /// Refresh and check every `interval` until `timeout`
    Poll { interval: Duration, timeout: Duration },
    /// Refresh and check whenever a compile event arrives, until `timeout`
    Signal {
        events: Receiver<CompileEvent>,
        timeout: Duration,
    },
}

impl WaitPolicy {
    pub fn signal(events: Receiver<CompileEvent>, timeout: Duration) -> Self {
        WaitPolicy::Signal { events, timeout }
    }
}

fn missing_types(
    host: &dyn CompilationHost,
    type_names: &[String],
    excluded: &[String],
) -> Vec<String> {
    type_names
        .iter()
        .filter(|name| !host.is_type_available(name, excluded))
        .cloned()
        .collect()
}

fn refresh_and_check(
    host: &mut dyn CompilationHost,
    type_names: &[String],
    excluded: &[String],
) -> Result<Vec<String>> {
    host.refresh()?;
    Ok(missing_types(host, type_names, excluded))
}

/// `None` when the deadline is too far away to represent
fn deadline_after(timeout: Duration) -> Option<Instant> {
    Instant::now().checked_add(timeout)
}

/// Block until every name in `type_names` is available on `host`. Types inside
/// `excluded` namespaces do not count.
///
/// Fails with [`Error::CompileTimeout`] listing the types still missing, or
/// [`Error::CompileFailed`] when the compile host reports a failure.
pub fn wait_until_available(
    host: &mut dyn CompilationHost,
    type_names: &[String],
    excluded: &[String],
    policy: &WaitPolicy,
) -> Result<()> {
    if missing_types(host, type_names, excluded).is_empty() {
        return Ok(());
    }

    match policy {
        WaitPolicy::FixedDelay(delay) => {
            thread::sleep(*delay);
            let missing = refresh_and_check(host, type_names, excluded)?;
            if missing.is_empty() {
                Ok(())
            } else {
                Err(Error::CompileTimeout(missing))
            }
        }
        WaitPolicy::Poll { interval, timeout } => {
            let deadline = deadline_after(*timeout);
            loop {
                let missing = refresh_and_check(host, type_names, excluded)?;
                if missing.is_empty() {
                    return Ok(());
                }
                let pause = match deadline {
                    Some(deadline) => {
                        let left = deadline.saturating_duration_since(Instant::now());
                        if left.is_zero() {
                            return Err(Error::CompileTimeout(missing));
                        }
                        (*interval).min(left)
                    }
                    None => *interval,
                };
                thread::sleep(pause);
            }
        }
        WaitPolicy::Signal { events, timeout } => {
            let deadline = deadline_after(*timeout);
            let mut missing = refresh_and_check(host, type_names, excluded)?;
            while !missing.is_empty() {
                let event = match deadline {
                    Some(deadline) => events
                        .recv_timeout(deadline.saturating_duration_since(Instant::now()))
                        .map_err(|_| ()),
                    None => events.recv().map_err(|_| ()),
                };
                match event {
                    Ok(CompileEvent::Finished { .. }) => {
                        missing = refresh_and_check(host, type_names, excluded)?;
                    }
                    Ok(CompileEvent::Failed(message)) => return Err(Error::CompileFailed(message)),
                    Err(()) => return Err(Error::CompileTimeout(missing)),
                }
            }
            Ok(())
        }
    }
}
