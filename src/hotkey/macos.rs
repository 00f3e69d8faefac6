//! Global hotkey via macOS CGEventTap
//!
//! The tap runs on a dedicated thread with its own CFRunLoop. Registration
//! succeeds once the tap exists, which needs Accessibility permission.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc as std_mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use core_foundation::runloop::{kCFRunLoopCommonModes, kCFRunLoopDefaultMode, CFRunLoop};
use core_graphics::event::{
    CGEvent, CGEventTap, CGEventTapLocation, CGEventTapOptions, CGEventTapPlacement,
    CGEventTapProxy, CGEventType, EventField,
};
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, warn};

use crate::events::{Envelope, EventSender, InputEvent};

use super::keys::{Hotkey, ModifierState};
use super::listener::{HotkeyBackend, HotkeyError};

/// How often the listener thread checks for unregistration
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Hotkey backend owning the event tap thread
pub struct EventTapBackend {
    event_tx: EventSender,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl EventTapBackend {
    pub fn new(event_tx: EventSender) -> Self {
        Self {
            event_tx,
            running: Arc::new(AtomicBool::new(false)),
            thread: None,
        }
    }
}

impl HotkeyBackend for EventTapBackend {
    fn register(&mut self, hotkey: Hotkey) -> Result<(), HotkeyError> {
        if self.thread.is_some() {
            return Err(HotkeyError::AlreadyRegistered(hotkey.name));
        }

        self.running.store(true, Ordering::SeqCst);
        let event_tx = self.event_tx.clone();
        let running = Arc::clone(&self.running);
        let (ready_tx, ready_rx) = std_mpsc::channel();

        let handle = thread::Builder::new()
            .name("hotkey-listener".to_string())
            .spawn(move || {
                info!("hotkey listener thread started");
                run_event_loop(hotkey, event_tx, &running, ready_tx);
                running.store(false, Ordering::SeqCst);
                info!("hotkey listener thread stopped");
            })
            .map_err(|e| {
                self.running.store(false, Ordering::SeqCst);
                HotkeyError::ThreadSpawn(e.to_string())
            })?;

        // Block until the thread knows whether the tap could be created
        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.thread = Some(handle);
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(HotkeyError::ListenerExited)
            }
        }
    }

    fn unregister(&mut self) -> Result<(), HotkeyError> {
        let Some(handle) = self.thread.take() else {
            return Ok(());
        };

        self.running.store(false, Ordering::SeqCst);
        handle.join().map_err(|_| HotkeyError::ListenerExited)
    }
}

impl Drop for EventTapBackend {
    fn drop(&mut self) {
        let _ = self.unregister();
    }
}

/// Create the tap, report readiness, then pump the run loop until stopped
fn run_event_loop(
    hotkey: Hotkey,
    event_tx: EventSender,
    running: &AtomicBool,
    ready_tx: std_mpsc::Sender<Result<(), HotkeyError>>,
) {
    let (callback_tx, callback_rx) = std_mpsc::channel::<()>();

    // Must be fast and non-blocking; matching presses are handed to the loop below
    let callback = move |_proxy: CGEventTapProxy, event_type: CGEventType, event: &CGEvent| -> Option<CGEvent> {
        match event_type {
            CGEventType::KeyDown => {
                let keycode = event.get_integer_value_field(EventField::KEYBOARD_EVENT_KEYCODE) as u16;
                let autorepeat = event.get_integer_value_field(EventField::KEYBOARD_EVENT_AUTOREPEAT) != 0;
                let modifiers = ModifierState::from_flags(event.get_flags());

                if hotkey.matches(keycode, modifiers, autorepeat) {
                    let _ = callback_tx.send(());
                }
            }
            CGEventType::TapDisabledByTimeout | CGEventType::TapDisabledByUserInput => {
                warn!("event tap disabled by the system");
            }
            _ => {}
        }
        Some(event.clone())
    };

    let tap = match CGEventTap::new(
        CGEventTapLocation::Session,
        CGEventTapPlacement::HeadInsertEventTap,
        CGEventTapOptions::ListenOnly,
        vec![CGEventType::KeyDown],
        callback,
    ) {
        Ok(tap) => tap,
        Err(()) => {
            error!("failed to create event tap - is Accessibility permission granted?");
            let _ = ready_tx.send(Err(HotkeyError::EventTapCreation));
            return;
        }
    };

    let run_loop_source = match tap.mach_port.create_runloop_source(0) {
        Ok(source) => source,
        Err(()) => {
            let _ = ready_tx.send(Err(HotkeyError::RunLoopSource));
            return;
        }
    };

    unsafe {
        CFRunLoop::get_current().add_source(&run_loop_source, kCFRunLoopCommonModes);
    }
    tap.enable();

    info!(hotkey = hotkey.name, "event tap created and enabled");
    let _ = ready_tx.send(Ok(()));

    while running.load(Ordering::SeqCst) {
        unsafe {
            CFRunLoop::run_in_mode(kCFRunLoopDefaultMode, POLL_INTERVAL, true);
        }

        while callback_rx.try_recv().is_ok() {
            debug!(hotkey = hotkey.name, "hotkey pressed");

            // Never block here: the dispatcher may be joining this thread
            match event_tx.try_send(Envelope::notify(InputEvent::HotkeyTriggered)) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!("dispatcher queue full, hotkey press dropped");
                }
                Err(TrySendError::Closed(_)) => {
                    warn!("failed to send hotkey event - dispatcher gone?");
                    return;
                }
            }
        }
    }

    // Tap and run loop source are released when they go out of scope
}
