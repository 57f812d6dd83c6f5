// Communication channels for sequence control
use super::types::SequenceCommand;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

/// Helper function to create the command channel of a sequence engine
pub fn create_sequence_channels() -> (mpsc::Sender<SequenceCommand>, AbortSignal) {
    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    (cmd_tx, AbortSignal::new(cmd_rx))
}

/// Cooperative cancellation flag fed by the command channel
///
/// Once an abort has been received the signal stays raised. A closed channel
/// means nobody can abort any more; it does not count as an abort.
#[derive(Debug)]
pub struct AbortSignal {
    command_rx: Option<mpsc::Receiver<SequenceCommand>>,
    aborted: bool,
}

impl AbortSignal {
    pub fn new(command_rx: mpsc::Receiver<SequenceCommand>) -> Self {
        Self {
            command_rx: Some(command_rx),
            aborted: false,
        }
    }

    /// A signal that is never raised
    pub fn never() -> Self {
        Self {
            command_rx: None,
            aborted: false,
        }
    }

    /// Drain pending commands and report whether an abort was requested
    pub fn is_aborted(&mut self) -> bool {
        if self.aborted {
            return true;
        }
        if let Some(rx) = self.command_rx.as_mut() {
            loop {
                match rx.try_recv() {
                    Ok(SequenceCommand::Abort) => {
                        log::info!("🛑 Abort requested");
                        self.aborted = true;
                        break;
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        self.command_rx = None;
                        break;
                    }
                }
            }
        }
        self.aborted
    }

    /// Lower the flag so the next run starts clean
    pub fn reset(&mut self) {
        self.aborted = false;
    }
}
