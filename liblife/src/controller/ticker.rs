use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc, Mutex,
        mpsc::{self, RecvTimeoutError, Sender},
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use log::{debug, error};

use super::{Session, lock};

enum TickerMessage {
    Stop,
    SetInterval(Duration),
}

/// Owns the thread that advances the session once per interval.
///
/// Ticks run one after another on that single thread while holding the session lock,
/// so a slow tick delays the next one instead of overlapping it.
#[derive(Debug)]
pub(super) struct TickerHost {
    sender: Sender<TickerMessage>,
    handle: JoinHandle<()>,
}

impl TickerHost {
    pub fn start(session: Arc<Mutex<Session>>, mut interval: Duration) -> Self {
        let (sender, receiver) = mpsc::channel();

        let handle = thread::spawn(move || {
            let mut next_tick = Instant::now() + interval;

            loop {
                let timeout = next_tick.saturating_duration_since(Instant::now());

                match receiver.recv_timeout(timeout) {
                    Err(RecvTimeoutError::Timeout) => {
                        // A panicking subscriber costs one notification, not the timer.
                        let ticked = panic::catch_unwind(AssertUnwindSafe(|| lock(&session).tick()));
                        if ticked.is_err() {
                            error!("tick panicked, ticking continues");
                        }

                        // Fall behind rather than burst if a tick overran its slot.
                        next_tick = (next_tick + interval).max(Instant::now());
                    }
                    Ok(TickerMessage::SetInterval(new_interval)) => {
                        interval = new_interval;
                        next_tick = Instant::now() + interval;
                    }
                    Ok(TickerMessage::Stop) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }

            debug!("ticker thread finished");
        });

        Self { sender, handle }
    }

    /// Stops ticking and waits for a tick already in progress to finish.
    pub fn stop(self) {
        // A send error means the thread is already gone, and join reports why.
        let _ = self.sender.send(TickerMessage::Stop);

        if self.handle.join().is_err() {
            error!("ticker thread panicked");
        }
    }

    pub fn set_interval(&self, interval: Duration) {
        let _ = self.sender.send(TickerMessage::SetInterval(interval));
    }
}
