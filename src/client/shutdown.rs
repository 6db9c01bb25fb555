/// Set when the compositor asks the window to close. Read by the event loop
/// between dispatch batches; nothing is torn down when it flips.
#[derive(Debug, Default)]
pub struct ShutdownSignal {
    closing: bool,
}

impl ShutdownSignal {
    pub fn request(&mut self) {
        self.closing = true;
    }

    pub fn is_closing(&self) -> bool {
        self.closing
    }
}
