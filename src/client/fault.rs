use crate::error::{ClientError, Result};

/// Holds the first fault raised inside an event handler.
///
/// `Dispatch` handlers cannot return errors, so they report here instead. Once
/// a fault is latched every later [`run`](Self::run) is skipped, and the event
/// loop picks the fault up with [`check`](Self::check) after the batch.
#[derive(Debug, Default)]
pub struct FaultLatch {
    fault: Option<ClientError>,
}

impl FaultLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latches `err` unless an earlier fault is still pending.
    pub fn fail(&mut self, err: ClientError) {
        if self.fault.is_none() {
            self.fault = Some(err);
        }
    }

    pub fn record(&mut self, result: Result<()>) {
        if let Err(err) = result {
            self.fail(err);
        }
    }

    pub fn is_faulted(&self) -> bool {
        self.fault.is_some()
    }

    /// Runs one handler step. Skipped once faulted; a failure is latched.
    pub fn run<T>(&mut self, step: impl FnOnce() -> Result<T>) -> Option<T> {
        if self.is_faulted() {
            return None;
        }
        match step() {
            Ok(value) => Some(value),
            Err(err) => {
                self.fail(err);
                None
            }
        }
    }

    /// Hands out the latched fault, once.
    pub fn check(&mut self) -> Result<()> {
        match self.fault.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
