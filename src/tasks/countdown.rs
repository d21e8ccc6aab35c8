//! Countdown engine: runs the timers one after another

use std::time::Duration;
use chrono::{DateTime, Local, TimeDelta};
use tracing::{debug, info};

use crate::{
    display::Frame,
    parser::TimerSpec,
    services::{AlarmRequest, AlarmTrigger},
    state::{ControlState, StatusBoard},
};

/// Time between countdown ticks
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// How often a paused countdown re-checks the pause flag
pub const PAUSE_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Redraw interval while waiting for the final alarm to be acknowledged
pub const ACK_REFRESH_INTERVAL: Duration = Duration::from_millis(100);

/// How a single countdown or the whole sequence ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownOutcome {
    Completed,
    ForceQuit,
}

/// Run one timer to completion, writing only into its own slot
pub async fn run_countdown<F, A>(
    index: usize,
    spec: &TimerSpec,
    is_last: bool,
    board: &mut StatusBoard,
    control: &ControlState,
    frame: &mut F,
    alarm: &A,
) -> CountdownOutcome
where
    F: Frame,
    A: AlarmTrigger,
{
    info!("Starting timer {} '{}' ({}s)", index + 1, spec.label, spec.duration_seconds);
    let mut remaining = spec.duration_seconds;

    let outcome = loop {
        if control.is_force_quit() {
            break CountdownOutcome::ForceQuit;
        }

        if control.is_paused() {
            frame.draw(board.statuses(), control);
            control.sleep_unless_quit(PAUSE_POLL_INTERVAL).await;
            continue;
        }

        if let Some(slot) = board.slot_mut(index) {
            slot.update(remaining, eta_after(remaining));
        }
        frame.draw(board.statuses(), control);

        if remaining == 0 {
            break CountdownOutcome::Completed;
        }

        if control.sleep_unless_quit(TICK_INTERVAL).await {
            continue;
        }
        remaining -= 1;
    };

    if let Some(slot) = board.slot_mut(index) {
        slot.finish();
    }
    frame.draw(board.statuses(), control);

    match outcome {
        CountdownOutcome::Completed => {
            info!("Timer {} '{}' finished", index + 1, spec.label);
            alarm.ring(AlarmRequest {
                ringtone_hint: spec.ringtone_hint.clone(),
                repeat: is_last,
                mark_final: is_last,
            });
        }
        CountdownOutcome::ForceQuit => {
            info!("Timer {} '{}' stopped by force quit", index + 1, spec.label);
        }
    }

    outcome
}

/// Wall-clock time `remaining` seconds from now, if representable
fn eta_after(remaining: u64) -> Option<DateTime<Local>> {
    let seconds = i64::try_from(remaining).ok()?;
    Local::now().checked_add_signed(TimeDelta::try_seconds(seconds)?)
}

/// Run every timer in order. Stops at the first force quit.
pub async fn run_sequence<F, A>(
    specs: &[TimerSpec],
    board: &mut StatusBoard,
    control: &ControlState,
    frame: &mut F,
    alarm: &A,
) -> CountdownOutcome
where
    F: Frame,
    A: AlarmTrigger,
{
    frame.draw(board.statuses(), control);

    for (index, spec) in specs.iter().enumerate() {
        let is_last = index + 1 == specs.len();
        let outcome = run_countdown(index, spec, is_last, board, control, frame, alarm).await;
        if outcome == CountdownOutcome::ForceQuit {
            debug!("Skipping {} queued timers", specs.len() - index - 1);
            return CountdownOutcome::ForceQuit;
        }
    }

    CountdownOutcome::Completed
}

/// Keep the table up while the final alarm loops, until stop or quit
pub async fn await_acknowledgement<F: Frame>(
    board: &StatusBoard,
    control: &ControlState,
    frame: &mut F,
) {
    if !control.is_final_alarm() {
        debug!("No looping alarm to acknowledge");
        return;
    }

    while !control.is_alarm_stopped() && !control.is_force_quit() {
        frame.draw(board.statuses(), control);
        control.sleep_unless_quit(ACK_REFRESH_INTERVAL).await;
    }
    frame.draw(board.statuses(), control);
}
