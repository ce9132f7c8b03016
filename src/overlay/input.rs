use crate::overlay::settings::OverlaySettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Discrete input event forwarded by the host's event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    PointerDown(PointerButton),
    PointerUp(PointerButton),
    KeyDown(char),
    KeyUp(char),
}

/// What the overlay did with an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventResponse {
    /// The host must not propagate the event further.
    pub consumed: bool,
    pub painted: bool,
}

impl EventResponse {
    pub const IGNORED: EventResponse = EventResponse {
        consumed: false,
        painted: false,
    };
}

/// Turns held-key and held-button levels into single trigger edges.
#[derive(Debug, Default, Clone)]
pub struct TriggerLatch {
    key_held: Option<char>,
    pointer_held: bool,
}

impl TriggerLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` exactly once per press of a configured trigger.
    pub fn is_trigger(&mut self, event: InputEvent, settings: &OverlaySettings) -> bool {
        match event {
            InputEvent::PointerDown(PointerButton::Primary) => {
                if !settings.use_left_click || self.pointer_held {
                    return false;
                }
                self.pointer_held = true;
                true
            }
            InputEvent::PointerUp(PointerButton::Primary) => {
                self.pointer_held = false;
                false
            }
            InputEvent::KeyDown(key) => {
                // A key held under a previous hotkey no longer blocks the current one.
                if self.key_held.is_some_and(|held| !settings.matches_hotkey(held)) {
                    self.key_held = None;
                }
                if !settings.matches_hotkey(key) {
                    return false;
                }
                // Auto-repeat from the OS keeps delivering key-down while held.
                if self.key_held.is_some() {
                    return false;
                }
                self.key_held = Some(key);
                true
            }
            InputEvent::KeyUp(key) => {
                if self.key_held.is_some_and(|held| same_key(held, key)) {
                    self.key_held = None;
                }
                false
            }
            _ => false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn same_key(a: char, b: char) -> bool {
    a.to_lowercase().eq(b.to_lowercase())
}
