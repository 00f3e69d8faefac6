//! Global hotkey via RegisterHotKey
//!
//! The binding belongs to a dedicated thread: WM_HOTKEY is posted to the
//! queue of the thread that registered it, so that thread also runs the
//! GetMessageW loop and is the one to unregister. Stopping posts WM_QUIT.

use std::sync::mpsc as std_mpsc;
use std::thread::{self, JoinHandle};

use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, warn};
use windows::Win32::Foundation::{LPARAM, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::Input::KeyboardAndMouse::{RegisterHotKey, UnregisterHotKey, MOD_NOREPEAT};
use windows::Win32::UI::WindowsAndMessaging::{
    GetMessageW, PeekMessageW, PostThreadMessageW, MSG, PM_NOREMOVE, WM_HOTKEY, WM_QUIT, WM_USER,
};

use crate::events::{Envelope, EventSender, InputEvent};

use super::keys::Hotkey;
use super::listener::{HotkeyBackend, HotkeyError};

struct Listener {
    thread: JoinHandle<()>,
    thread_id: u32,
}

/// Hotkey backend owning the message loop thread
pub struct MessageLoopBackend {
    event_tx: EventSender,
    listener: Option<Listener>,
}

impl MessageLoopBackend {
    pub fn new(event_tx: EventSender) -> Self {
        Self {
            event_tx,
            listener: None,
        }
    }
}

impl HotkeyBackend for MessageLoopBackend {
    fn register(&mut self, hotkey: Hotkey) -> Result<(), HotkeyError> {
        if self.listener.is_some() {
            return Err(HotkeyError::AlreadyRegistered(hotkey.name));
        }

        let event_tx = self.event_tx.clone();
        let (ready_tx, ready_rx) = std_mpsc::channel();

        let handle = thread::Builder::new()
            .name("hotkey-listener".to_string())
            .spawn(move || {
                info!("hotkey listener thread started");
                run_message_loop(hotkey, event_tx, ready_tx);
                info!("hotkey listener thread stopped");
            })
            .map_err(|e| HotkeyError::ThreadSpawn(e.to_string()))?;

        // Block until the thread knows whether RegisterHotKey succeeded
        match ready_rx.recv() {
            Ok(Ok(thread_id)) => {
                self.listener = Some(Listener {
                    thread: handle,
                    thread_id,
                });
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
        let Some(listener) = self.listener.take() else {
            return Ok(());
        };

        if !listener.thread.is_finished() {
            unsafe { PostThreadMessageW(listener.thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) }
                .map_err(|e| HotkeyError::Unregistration(e.to_string()))?;
        }

        listener.thread.join().map_err(|_| HotkeyError::ListenerExited)
    }
}

impl Drop for MessageLoopBackend {
    fn drop(&mut self) {
        let _ = self.unregister();
    }
}

/// Register, report readiness with the thread id, then pump messages until WM_QUIT
fn run_message_loop(
    hotkey: Hotkey,
    event_tx: EventSender,
    ready_tx: std_mpsc::Sender<Result<u32, HotkeyError>>,
) {
    let id = hotkey.id as i32;
    let mut msg = MSG::default();

    // Creates the thread's message queue so WM_QUIT can be posted right away
    unsafe {
        let _ = PeekMessageW(&mut msg, None, WM_USER, WM_USER, PM_NOREMOVE);
    }

    if let Err(e) = unsafe { RegisterHotKey(None, id, MOD_NOREPEAT, u32::from(hotkey.win_vk)) } {
        error!(hotkey = hotkey.name, error = %e, "RegisterHotKey failed - key taken by another program?");
        let _ = ready_tx.send(Err(HotkeyError::Registration(e.to_string())));
        return;
    }

    let thread_id = unsafe { GetCurrentThreadId() };
    info!(hotkey = hotkey.name, thread_id, "hotkey registered with the system");
    let _ = ready_tx.send(Ok(thread_id));

    loop {
        match unsafe { GetMessageW(&mut msg, None, 0, 0) }.0 {
            0 => break,
            -1 => {
                error!("GetMessageW failed, stopping hotkey listener");
                break;
            }
            _ => {}
        }

        if msg.message != WM_HOTKEY || msg.wParam.0 != hotkey.id as usize {
            continue;
        }

        debug!(hotkey = hotkey.name, "hotkey pressed");

        // Never block here: the dispatcher may be joining this thread
        match event_tx.try_send(Envelope::notify(InputEvent::HotkeyTriggered)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("dispatcher queue full, hotkey press dropped");
            }
            Err(TrySendError::Closed(_)) => {
                warn!("failed to send hotkey event - dispatcher gone?");
                break;
            }
        }
    }

    if let Err(e) = unsafe { UnregisterHotKey(None, id) } {
        warn!(hotkey = hotkey.name, error = %e, "UnregisterHotKey failed");
    }
}
