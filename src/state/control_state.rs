//! Cooperative control flags shared by the countdown, keyboard and alarm paths
//!
//! Ownership of each flag:
//! - paused, stop-alarm, force-quit: the keyboard listener (and the interrupt handler)
//! - final-alarm-active: the alarm player
//!
//! Readers poll the flags; nothing here blocks. Force-quit also goes through a
//! watch channel so sleeping loops can be woken instead of waiting out a tick.
//!
//! Problems hit by background paths while the table owns the terminal are
//! kept as notices: the table shows the latest, `main` prints all of them
//! once the terminal is back in cooked mode.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, PoisonError,
    },
    time::Duration,
};
use tokio::{sync::watch, time::sleep};
use tracing::{debug, info};

/// Process-wide control flags for one run
#[derive(Debug)]
pub struct ControlState {
    paused: AtomicBool,
    stop_alarm: AtomicBool,
    final_alarm: AtomicBool,
    interrupted: AtomicBool,
    force_quit_tx: watch::Sender<bool>,
    notices: Mutex<Vec<String>>,
}

impl ControlState {
    /// Create a control state with every flag cleared
    pub fn new() -> Self {
        let (force_quit_tx, _) = watch::channel(false);
        Self {
            paused: AtomicBool::new(false),
            stop_alarm: AtomicBool::new(false),
            final_alarm: AtomicBool::new(false),
            interrupted: AtomicBool::new(false),
            force_quit_tx,
            notices: Mutex::new(Vec::new()),
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Flip the paused flag and return the new value
    pub fn toggle_pause(&self) -> bool {
        let paused = !self.paused.fetch_xor(true, Ordering::SeqCst);
        info!("Countdown {}", if paused { "paused" } else { "resumed" });
        paused
    }

    pub fn is_alarm_stopped(&self) -> bool {
        self.stop_alarm.load(Ordering::SeqCst)
    }

    /// Ask any looping alarm to stop
    pub fn stop_alarm(&self) {
        info!("Looping alarm stop requested");
        self.stop_alarm.store(true, Ordering::SeqCst);
    }

    pub fn is_final_alarm(&self) -> bool {
        self.final_alarm.load(Ordering::SeqCst)
    }

    /// Record that the final, looping alarm is about to play
    pub fn mark_final_alarm(&self) {
        debug!("Final alarm marked active");
        self.final_alarm.store(true, Ordering::SeqCst);
    }

    pub fn is_force_quit(&self) -> bool {
        *self.force_quit_tx.borrow()
    }

    /// Stop everything: alarms end and countdowns exit at their next check
    pub fn force_quit(&self) {
        info!("Force quit requested");
        self.stop_alarm.store(true, Ordering::SeqCst);
        self.force_quit_tx.send_replace(true);
    }

    /// Force quit caused by an interrupt rather than the quit key
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
        self.force_quit();
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Record a problem to show the user without writing to the terminal
    pub fn report(&self, notice: impl Into<String>) {
        let notice = notice.into();
        debug!("Notice: {}", notice);
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }

    /// Most recent notice, if any
    pub fn latest_notice(&self) -> Option<String> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Every notice recorded so far, oldest first
    pub fn notices(&self) -> Vec<String> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Resolve once force-quit has been requested
    pub async fn force_quit_requested(&self) {
        let mut rx = self.force_quit_tx.subscribe();
        // The sender lives in self, so the channel cannot close while we wait.
        let _ = rx.wait_for(|quit| *quit).await;
    }

    /// Sleep for `duration`, returning early with `true` if force-quit arrives
    pub async fn sleep_unless_quit(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = sleep(duration) => self.is_force_quit(),
            _ = self.force_quit_requested() => true,
        }
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self::new()
    }
}
