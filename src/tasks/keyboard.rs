//! Keyboard listener thread
//!
//! Polls the terminal for key events and turns them into control flag
//! changes. Keys: `w` pause/resume, `Esc` stop the looping final alarm,
//! `q` quit, `Ctrl+C` interrupt (raw mode swallows SIGINT).
//!
//! Holding the pause key toggles once. Terminals that support the keyboard
//! enhancement protocol report repeats and releases; on the others a held
//! key only shows up as a stream of presses, so it counts as released after
//! [`REPEAT_SILENCE`] without one.

use std::{
    io,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, terminal,
};
use tracing::{debug, info, warn};

use crate::state::ControlState;

/// Interval between key polls
pub const KEY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Gap in auto-repeat presses that ends a hold. Longer than the usual
/// initial auto-repeat delay (250-600ms).
pub const REPEAT_SILENCE: Duration = Duration::from_millis(600);

pub const PAUSE_KEY: KeyCode = KeyCode::Char('w');
pub const STOP_KEY: KeyCode = KeyCode::Esc;
pub const QUIT_KEY: KeyCode = KeyCode::Char('q');

/// What a key press asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    TogglePause,
    StopAlarm,
    Quit,
    Interrupt,
}

/// Map a key event to an action given the current final-alarm state
pub fn action_for(key: &KeyEvent, final_alarm: bool) -> Option<KeyAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(KeyAction::Interrupt)
        }
        code if code == PAUSE_KEY => Some(KeyAction::TogglePause),
        code if code == STOP_KEY && final_alarm => Some(KeyAction::StopAlarm),
        code if code == QUIT_KEY => Some(KeyAction::Quit),
        _ => None,
    }
}

/// Apply an action. Returns `true` when the listener should end.
pub fn apply(action: KeyAction, control: &ControlState) -> bool {
    match action {
        KeyAction::TogglePause => {
            control.toggle_pause();
            false
        }
        KeyAction::StopAlarm => {
            control.stop_alarm();
            true
        }
        KeyAction::Quit => {
            control.force_quit();
            true
        }
        KeyAction::Interrupt => {
            control.interrupt();
            true
        }
    }
}

/// How a key seen while the pause key is held affects the hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HoldStep {
    /// Still held, or noise from another key's release
    Held,
    Released,
    /// A new key to handle normally
    Other(KeyEvent),
}

fn hold_step(held: KeyCode, key: KeyEvent, enhanced: bool) -> HoldStep {
    match key.kind {
        KeyEventKind::Release if key.code == held => HoldStep::Released,
        KeyEventKind::Release => HoldStep::Held,
        KeyEventKind::Repeat => HoldStep::Held,
        // With release reporting on, a fresh press means the release was lost.
        KeyEventKind::Press if key.code == held && !enhanced => HoldStep::Held,
        KeyEventKind::Press => HoldStep::Other(key),
    }
}

/// Running listener; dropping or calling `shutdown` restores the terminal
pub struct KeyboardListener {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    enhanced: bool,
}

impl KeyboardListener {
    /// Put the terminal in raw mode and start polling on a background thread
    pub fn spawn(control: Arc<ControlState>) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let enhanced = enable_release_events();

        let running = Arc::new(AtomicBool::new(true));
        let thread_running = Arc::clone(&running);
        let handle = thread::Builder::new()
            .name("keyboard".to_string())
            .spawn(move || {
                if let Err(e) = listen(&control, &thread_running, enhanced) {
                    control.report(format!("Keyboard listener failed: {}", e));
                }
                debug!("Keyboard listener stopped");
            });

        let handle = match handle {
            Ok(handle) => handle,
            Err(e) => {
                let _ = restore_terminal(enhanced);
                return Err(e);
            }
        };

        info!("Keyboard listener started (release events: {})", enhanced);
        Ok(Self {
            running,
            handle: Some(handle),
            enhanced,
        })
    }

    /// Stop polling, wait for the thread and leave raw mode
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        let panicked = self
            .handle
            .take()
            .is_some_and(|handle| handle.join().is_err());

        // Log only once raw mode is off.
        if let Err(e) = restore_terminal(self.enhanced) {
            warn!("Failed to restore terminal mode: {}", e);
        }
        if panicked {
            warn!("Keyboard listener thread panicked");
        }
    }
}

/// Ask the terminal for repeat/release events. Returns whether it agreed.
fn enable_release_events() -> bool {
    if !matches!(terminal::supports_keyboard_enhancement(), Ok(true)) {
        return false;
    }
    execute!(
        io::stdout(),
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
    )
    .is_ok()
}

fn restore_terminal(enhanced: bool) -> io::Result<()> {
    let popped = if enhanced {
        execute!(io::stdout(), PopKeyboardEnhancementFlags)
    } else {
        Ok(())
    };
    terminal::disable_raw_mode()?;
    popped
}

impl Drop for KeyboardListener {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.stop();
        }
    }
}

fn listen(control: &ControlState, running: &AtomicBool, enhanced: bool) -> io::Result<()> {
    let mut pending: Option<KeyEvent> = None;

    while running.load(Ordering::SeqCst) && !control.is_force_quit() {
        let key = match pending.take() {
            Some(key) => key,
            None => match next_key(KEY_POLL_INTERVAL)? {
                Some(key) => key,
                None => continue,
            },
        };

        let Some(action) = action_for(&key, control.is_final_alarm()) else {
            continue;
        };
        debug!("Key {:?} -> {:?}", key.code, action);

        if apply(action, control) {
            break;
        }
        if action == KeyAction::TogglePause {
            pending = wait_for_release(key.code, enhanced, control, running)?;
        }
    }
    Ok(())
}

fn next_key(timeout: Duration) -> io::Result<Option<KeyEvent>> {
    if !event::poll(timeout)? {
        return Ok(None);
    }
    match event::read()? {
        Event::Key(key) => Ok(Some(key)),
        _ => Ok(None),
    }
}

/// Swallow auto-repeat of a held key. Returns the first different key, if any.
fn wait_for_release(
    code: KeyCode,
    enhanced: bool,
    control: &ControlState,
    running: &AtomicBool,
) -> io::Result<Option<KeyEvent>> {
    let mut last_seen = Instant::now();

    while running.load(Ordering::SeqCst) && !control.is_force_quit() {
        match next_key(KEY_POLL_INTERVAL)? {
            Some(key) => match hold_step(code, key, enhanced) {
                HoldStep::Held => last_seen = Instant::now(),
                HoldStep::Released => return Ok(None),
                HoldStep::Other(key) => return Ok(Some(key)),
            },
            None if !enhanced && last_seen.elapsed() >= REPEAT_SILENCE => return Ok(None),
            None => {}
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn pause_key_toggles() {
        assert_eq!(action_for(&press(PAUSE_KEY), false), Some(KeyAction::TogglePause));
        assert_eq!(action_for(&press(PAUSE_KEY), true), Some(KeyAction::TogglePause));
    }

    #[test]
    fn escape_only_counts_during_final_alarm() {
        assert_eq!(action_for(&press(STOP_KEY), false), None);
        assert_eq!(action_for(&press(STOP_KEY), true), Some(KeyAction::StopAlarm));
    }

    #[test]
    fn quit_and_ctrl_c() {
        assert_eq!(action_for(&press(QUIT_KEY), false), Some(KeyAction::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(action_for(&ctrl_c, false), Some(KeyAction::Interrupt));
        assert_eq!(action_for(&press(KeyCode::Char('c')), false), None);
    }

    fn with_kind(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        let mut key = press(code);
        key.kind = kind;
        key
    }

    #[test]
    fn releases_are_ignored() {
        let key = with_kind(QUIT_KEY, KeyEventKind::Release);
        assert_eq!(action_for(&key, false), None);
    }

    #[test]
    fn repeats_do_not_toggle_again() {
        let key = with_kind(PAUSE_KEY, KeyEventKind::Repeat);
        assert_eq!(action_for(&key, false), None);
    }

    #[test]
    fn auto_repeat_presses_stay_held_without_release_events() {
        assert_eq!(hold_step(PAUSE_KEY, press(PAUSE_KEY), false), HoldStep::Held);
        assert_eq!(
            hold_step(PAUSE_KEY, press(QUIT_KEY), false),
            HoldStep::Other(press(QUIT_KEY))
        );
    }

    #[test]
    fn release_events_end_the_hold() {
        let repeat = with_kind(PAUSE_KEY, KeyEventKind::Repeat);
        let release = with_kind(PAUSE_KEY, KeyEventKind::Release);
        let other_release = with_kind(QUIT_KEY, KeyEventKind::Release);

        assert_eq!(hold_step(PAUSE_KEY, repeat, true), HoldStep::Held);
        assert_eq!(hold_step(PAUSE_KEY, other_release, true), HoldStep::Held);
        assert_eq!(hold_step(PAUSE_KEY, release, true), HoldStep::Released);
        assert_eq!(
            hold_step(PAUSE_KEY, press(PAUSE_KEY), true),
            HoldStep::Other(press(PAUSE_KEY))
        );
    }

    #[test]
    fn apply_updates_flags() {
        let control = ControlState::new();

        assert!(!apply(KeyAction::TogglePause, &control));
        assert!(control.is_paused());
        assert!(!apply(KeyAction::TogglePause, &control));
        assert!(!control.is_paused());

        assert!(apply(KeyAction::StopAlarm, &control));
        assert!(control.is_alarm_stopped());
        assert!(!control.is_force_quit());

        assert!(apply(KeyAction::Quit, &control));
        assert!(control.is_force_quit());
        assert!(!control.is_interrupted());
    }

    #[test]
    fn ctrl_c_interrupts() {
        let control = ControlState::new();
        assert!(apply(KeyAction::Interrupt, &control));
        assert!(control.is_force_quit());
        assert!(control.is_interrupted());
    }
}
