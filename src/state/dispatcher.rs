//! Single owner of daemon state
//!
//! Every [`InputEvent`] goes through [`Dispatcher::dispatch`], on one task.
//! The hold controller, the hotkey binding and the settings are never
//! touched from anywhere else, so none of them need locks.

use std::time::Instant;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::events::{Envelope, InputEvent, StateEvent};
use crate::hotkey::{Hotkey, HotkeyBackend, HotkeyBinding};
use crate::i18n::Language;
use crate::inject::{MouseButton, MouseInjector};
use crate::lifecycle::BestEffort;
use crate::settings::{Settings, SettingsStore};

use super::machine::{HoldController, Transition};
use super::status::{HoldStatus, Labels};

/// Whether the event loop keeps going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Errors reported back to the UI
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The only user-visible failure
    #[error("{message}")]
    HotkeyRegistration {
        /// Localized text for the user
        message: String,
        /// Underlying backend error
        reason: String,
    },
}

impl DispatchError {
    /// Stable error code for IPC clients
    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::HotkeyRegistration { .. } => "hotkey_registration_failed",
        }
    }
}

/// Owns the hold controller, the hotkey binding and the settings
pub struct Dispatcher<I: MouseInjector, H: HotkeyBackend> {
    controller: HoldController<I>,
    hotkey: HotkeyBinding<H>,
    settings: Settings,
    store: SettingsStore,
    event_tx: broadcast::Sender<StateEvent>,
    started_at: Instant,
}

impl<I: MouseInjector, H: HotkeyBackend> Dispatcher<I, H> {
    pub fn new(
        injector: I,
        hotkey_backend: H,
        hotkey: Hotkey,
        store: SettingsStore,
        settings: Settings,
        event_tx: broadcast::Sender<StateEvent>,
    ) -> Self {
        Self {
            controller: HoldController::new(injector, settings.button),
            hotkey: HotkeyBinding::new(hotkey_backend, hotkey),
            settings,
            store,
            event_tx,
            started_at: Instant::now(),
        }
    }

    /// Consume events until shutdown is requested or every sender is gone
    pub async fn run(&mut self, mut event_rx: mpsc::Receiver<Envelope>) {
        info!(button = %self.controller.selected_button(), language = self.settings.language.code(), "dispatcher started");

        while let Some(Envelope { event, reply }) = event_rx.recv().await {
            debug!(?event, "dispatching");
            let result = self.dispatch(event);
            let flow = result.as_ref().map_or(Flow::Continue, |flow| *flow);
            if let Err(DispatchError::HotkeyRegistration { reason, .. }) = &result {
                warn!(%reason, "hotkey could not be enabled");
            }

            if let Some(reply) = reply {
                let _ = reply.send(result.map(|_| self.status()));
            }

            if flow == Flow::Exit {
                break;
            }
        }

        info!("dispatcher stopped");
    }

    /// Apply one event
    pub fn dispatch(&mut self, event: InputEvent) -> Result<Flow, DispatchError> {
        match event {
            InputEvent::UserToggleRequested => self.toggle(),
            InputEvent::HotkeyTriggered => {
                if self.hotkey.is_registered() {
                    self.toggle();
                } else {
                    debug!("hotkey trigger after unregistration ignored");
                }
            }
            InputEvent::ButtonSelectionChanged(button) => self.select_button(button),
            InputEvent::LanguageChanged(language) => self.change_language(language),
            InputEvent::HotkeyEnableRequested(true) => self.enable_hotkey()?,
            InputEvent::HotkeyEnableRequested(false) => self.disable_hotkey(),
            InputEvent::StatusRequested => {}
            InputEvent::ShutdownRequested => {
                let _ = self.shutdown();
                return Ok(Flow::Exit);
            }
        }

        Ok(Flow::Continue)
    }

    /// Release any held button, then unregister the hotkey.
    ///
    /// Safe to call more than once.
    pub fn shutdown(&mut self) -> BestEffort {
        if let Some(transition) = self.controller.force_release() {
            self.emit_transition(transition);
        }
        let outcome = self.hotkey.disable();
        if outcome != BestEffort::Skipped {
            self.emit(StateEvent::HotkeyDisabled);
        }
        outcome
    }

    pub fn status(&self) -> HoldStatus {
        let holding = self.controller.is_holding();
        HoldStatus {
            version: env!("CARGO_PKG_VERSION").to_string(),
            holding,
            selected_button: self.controller.selected_button(),
            held_button: self.controller.held_button(),
            hotkey: self.hotkey.hotkey().name.to_string(),
            hotkey_enabled: self.hotkey.is_registered(),
            language: self.settings.language,
            labels: Labels::new(self.settings.language, holding),
            uptime_secs: self.started_at.elapsed().as_secs(),
        }
    }

    fn toggle(&mut self) {
        let transition = self.controller.toggle();
        self.emit_transition(transition);
    }

    fn select_button(&mut self, button: MouseButton) {
        self.controller.select_button(button);
        if self.settings.button == button {
            return;
        }

        self.settings.button = button;
        self.persist();
        self.emit(StateEvent::ButtonSelected { button });
    }

    fn change_language(&mut self, language: Language) {
        if self.settings.language == language {
            return;
        }

        self.settings.language = language;
        self.persist();
        info!(language = language.code(), "display language changed");
        self.emit(StateEvent::LanguageChanged { language });
    }

    fn enable_hotkey(&mut self) -> Result<(), DispatchError> {
        if self.hotkey.is_registered() {
            return Ok(());
        }

        match self.hotkey.enable() {
            Ok(()) => {
                self.emit(StateEvent::HotkeyEnabled);
                Ok(())
            }
            Err(e) => {
                let message = self.settings.language.strings().hotkey_failed.to_string();
                self.emit(StateEvent::HotkeyRegistrationFailed {
                    message: message.clone(),
                });
                Err(DispatchError::HotkeyRegistration {
                    message,
                    reason: e.to_string(),
                })
            }
        }
    }

    fn disable_hotkey(&mut self) {
        if self.hotkey.disable() != BestEffort::Skipped {
            self.emit(StateEvent::HotkeyDisabled);
        }
    }

    fn persist(&self) {
        let _ = BestEffort::from_result("save settings", self.store.save(&self.settings));
    }

    fn emit_transition(&self, transition: Transition) {
        let event = match transition {
            Transition::Pressed { button } => StateEvent::HoldStarted { button },
            Transition::Released {
                button,
                duration_ms,
            } => StateEvent::HoldReleased {
                button,
                duration_ms,
            },
        };
        self.emit(event);
    }

    fn emit(&self, event: StateEvent) {
        debug!(%event, "emitting state event");
        let _ = self.event_tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::hotkey::testing::FakeHotkeyBackend;
    use crate::hotkey::TOGGLE_HOTKEY;
    use crate::inject::testing::RecordingInjector;
    use crate::inject::Direction;

    struct Harness {
        dispatcher: Dispatcher<RecordingInjector, FakeHotkeyBackend>,
        injector: RecordingInjector,
        backend: FakeHotkeyBackend,
        events: broadcast::Receiver<StateEvent>,
        store: SettingsStore,
        _dir: TempDir,
    }

    fn harness_with(backend: FakeHotkeyBackend, settings: Settings) -> Harness {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));
        let injector = RecordingInjector::new();
        let (tx, rx) = broadcast::channel(64);
        let dispatcher = Dispatcher::new(
            injector.clone(),
            backend.clone(),
            TOGGLE_HOTKEY,
            store.clone(),
            settings,
            tx,
        );
        Harness {
            dispatcher,
            injector,
            backend,
            events: rx,
            store,
            _dir: dir,
        }
    }

    fn harness() -> Harness {
        harness_with(FakeHotkeyBackend::new(), Settings::default())
    }

    fn drain(rx: &mut broadcast::Receiver<StateEvent>) -> Vec<StateEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_user_toggle_and_hotkey_share_state() {
        let mut h = harness();
        h.dispatcher.dispatch(InputEvent::HotkeyEnableRequested(true)).unwrap();

        h.dispatcher.dispatch(InputEvent::UserToggleRequested).unwrap();
        assert!(h.dispatcher.status().holding);

        h.dispatcher.dispatch(InputEvent::HotkeyTriggered).unwrap();
        assert!(!h.dispatcher.status().holding);

        assert_eq!(
            h.injector.events(),
            vec![
                (MouseButton::Left, Direction::Down),
                (MouseButton::Left, Direction::Up),
            ]
        );
    }

    #[test]
    fn test_hotkey_trigger_ignored_when_disabled() {
        let mut h = harness();
        h.dispatcher.dispatch(InputEvent::HotkeyTriggered).unwrap();
        assert!(h.injector.events().is_empty());
    }

    #[test]
    fn test_starts_with_saved_button() {
        let mut h = harness_with(
            FakeHotkeyBackend::new(),
            Settings {
                language: Language::English,
                button: MouseButton::Right,
            },
        );
        h.dispatcher.dispatch(InputEvent::UserToggleRequested).unwrap();
        assert_eq!(h.injector.events(), vec![(MouseButton::Right, Direction::Down)]);
    }

    #[test]
    fn test_button_selection_is_persisted() {
        let mut h = harness();
        h.dispatcher
            .dispatch(InputEvent::ButtonSelectionChanged(MouseButton::Right))
            .unwrap();

        assert_eq!(h.store.load().unwrap().button, MouseButton::Right);
        assert_eq!(h.dispatcher.status().selected_button, MouseButton::Right);
        assert!(drain(&mut h.events).contains(&StateEvent::ButtonSelected {
            button: MouseButton::Right
        }));
    }

    #[test]
    fn test_selection_while_held_emits_nothing() {
        let mut h = harness();
        h.dispatcher.dispatch(InputEvent::UserToggleRequested).unwrap();
        h.dispatcher
            .dispatch(InputEvent::ButtonSelectionChanged(MouseButton::Right))
            .unwrap();

        assert_eq!(h.injector.events().len(), 1);
        let status = h.dispatcher.status();
        assert_eq!(status.held_button, Some(MouseButton::Left));
        assert_eq!(status.selected_button, MouseButton::Right);

        h.dispatcher.dispatch(InputEvent::UserToggleRequested).unwrap();
        assert_eq!(h.injector.events()[1], (MouseButton::Left, Direction::Up));
    }

    #[test]
    fn test_language_change_is_presentation_only() {
        let mut h = harness();
        h.dispatcher
            .dispatch(InputEvent::ButtonSelectionChanged(MouseButton::Right))
            .unwrap();
        h.dispatcher.dispatch(InputEvent::UserToggleRequested).unwrap();
        let before = h.dispatcher.status();

        h.dispatcher
            .dispatch(InputEvent::LanguageChanged(Language::Russian))
            .unwrap();
        let after = h.dispatcher.status();

        assert_eq!(after.holding, before.holding);
        assert_eq!(after.selected_button, before.selected_button);
        assert_eq!(after.language, Language::Russian);
        assert_eq!(after.labels.status, "Статус: кнопка зажата");
        assert_eq!(h.injector.events().len(), 1);
        assert_eq!(h.store.load().unwrap().language, Language::Russian);
    }

    #[test]
    fn test_registration_failure_is_localized() {
        let mut h = harness_with(
            FakeHotkeyBackend::rejecting(),
            Settings {
                language: Language::Russian,
                button: MouseButton::Left,
            },
        );

        let err = h
            .dispatcher
            .dispatch(InputEvent::HotkeyEnableRequested(true))
            .unwrap_err();

        assert_eq!(err.code(), "hotkey_registration_failed");
        assert_eq!(err.to_string(), "Не удалось зарегистрировать клавишу F6.");
        assert!(!h.dispatcher.status().hotkey_enabled);
        assert!(matches!(
            drain(&mut h.events).last(),
            Some(StateEvent::HotkeyRegistrationFailed { .. })
        ));
    }

    #[test]
    fn test_enable_disable_enable_round_trip() {
        let mut h = harness();
        h.dispatcher.dispatch(InputEvent::HotkeyEnableRequested(true)).unwrap();
        h.dispatcher.dispatch(InputEvent::HotkeyEnableRequested(false)).unwrap();
        h.dispatcher.dispatch(InputEvent::HotkeyEnableRequested(true)).unwrap();

        assert!(h.dispatcher.status().hotkey_enabled);
        assert_eq!(h.backend.active(), 1);
    }

    #[test]
    fn test_shutdown_releases_before_unregistering() {
        let mut h = harness();
        h.dispatcher.dispatch(InputEvent::HotkeyEnableRequested(true)).unwrap();
        h.dispatcher.dispatch(InputEvent::UserToggleRequested).unwrap();
        drain(&mut h.events);

        let flow = h.dispatcher.dispatch(InputEvent::ShutdownRequested).unwrap();

        assert_eq!(flow, Flow::Exit);
        assert_eq!(h.injector.count(Direction::Up), 1);
        assert_eq!(h.backend.active(), 0);

        let events = drain(&mut h.events);
        assert!(matches!(events[0], StateEvent::HoldReleased { .. }));
        assert_eq!(events[1], StateEvent::HotkeyDisabled);
    }

    #[test]
    fn test_shutdown_twice_releases_once() {
        let mut h = harness();
        h.dispatcher.dispatch(InputEvent::UserToggleRequested).unwrap();

        h.dispatcher.dispatch(InputEvent::ShutdownRequested).unwrap();
        assert_eq!(h.dispatcher.shutdown(), BestEffort::Skipped);

        assert_eq!(h.injector.count(Direction::Up), 1);
    }

    #[tokio::test]
    async fn test_run_replies_and_exits_on_shutdown() {
        let mut h = harness();
        let (tx, rx) = mpsc::channel(8);

        let (toggle, toggle_rx) = Envelope::request(InputEvent::UserToggleRequested);
        let (shutdown, shutdown_rx) = Envelope::request(InputEvent::ShutdownRequested);
        tx.send(toggle).await.unwrap();
        tx.send(shutdown).await.unwrap();

        h.dispatcher.run(rx).await;

        assert!(toggle_rx.await.unwrap().unwrap().holding);
        assert!(!shutdown_rx.await.unwrap().unwrap().holding);
        assert_eq!(h.injector.count(Direction::Up), 1);
    }
}
