use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(50);

/// Messages consumed by the main loop.
#[derive(Debug)]
pub enum AppOp {
    Redraw,
    Key(KeyEvent),
    Pump,
    Quit,
}

/// Control messages for the pump thread.
#[derive(Debug)]
pub enum PumpCtl {
    Start(Duration),
    Stop,
    Quit,
}

/// Monotonic milliseconds since the app started.
pub struct Ticktimer {
    origin: Instant,
}

impl Ticktimer {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Handle to the frame pump, owned by the app.
pub struct Pump {
    conn: Option<Sender<PumpCtl>>,
    interval: Duration,
    running: bool,
}

impl Pump {
    pub fn new(conn: Sender<PumpCtl>, interval_ms: u64) -> Self {
        Self {
            conn: Some(conn),
            interval: Duration::from_millis(interval_ms),
            running: false,
        }
    }

    /// A pump with no thread behind it. State changes are tracked but
    /// nothing is sent.
    #[cfg(test)]
    pub fn detached(interval_ms: u64) -> Self {
        Self {
            conn: None,
            interval: Duration::from_millis(interval_ms),
            running: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            log::debug!("pump start, {:?} per frame", self.interval);
            self.send(PumpCtl::Start(self.interval));
        }
    }

    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            log::debug!("pump stop");
            self.send(PumpCtl::Stop);
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
        self.send(PumpCtl::Quit);
    }

    fn send(&self, msg: PumpCtl) {
        if let Some(conn) = &self.conn {
            // The thread only goes away on shutdown
            conn.send(msg).ok();
        }
    }
}

/// Emit one `AppOp::Pump` per interval while started; block while stopped.
pub fn pump_thread(ctl: Receiver<PumpCtl>, main_conn: Sender<AppOp>) {
    let mut interval = Duration::from_millis(16);
    let mut running = false;

    loop {
        let msg = if running {
            match ctl.recv_timeout(interval) {
                Ok(msg) => Some(msg),
                Err(RecvTimeoutError::Timeout) => {
                    if main_conn.send(AppOp::Pump).is_err() {
                        break;
                    }
                    None
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match ctl.recv() {
                Ok(msg) => Some(msg),
                Err(_) => break,
            }
        };

        match msg {
            Some(PumpCtl::Start(new_interval)) => {
                interval = new_interval.max(Duration::from_millis(1));
                running = true;
            }
            Some(PumpCtl::Stop) => running = false,
            Some(PumpCtl::Quit) => break,
            None => {}
        }
    }
    log::debug!("pump thread exiting");
}

/// Forward terminal key presses and resizes to the main loop.
pub fn input_thread(stop: Arc<AtomicBool>, main_conn: Sender<AppOp>) {
    while !stop.load(Ordering::Acquire) {
        let op = match event::poll(INPUT_POLL_TIMEOUT) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => AppOp::Key(key),
                Ok(Event::Resize(_, _)) => AppOp::Redraw,
                Ok(_) => continue,
                Err(e) => {
                    log::error!("terminal read failed: {}", e);
                    AppOp::Quit
                }
            },
            Ok(false) => continue,
            Err(e) => {
                log::error!("terminal poll failed: {}", e);
                AppOp::Quit
            }
        };
        let quit = matches!(op, AppOp::Quit);
        if main_conn.send(op).is_err() || quit {
            break;
        }
    }
}
