#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderState {
    #[default]
    Idle,
    Armed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    None,
    Armed,
    Disarmed,
}

/// Hold-key and persistent-toggle flags. The overlay is armed while either is set.
#[derive(Clone, Copy, Debug, Default)]
pub struct ActivationState {
    key_held: bool,
    toggle_on: bool,
}

impl ActivationState {
    pub fn render_state(&self) -> RenderState {
        if self.key_held || self.toggle_on {
            RenderState::Armed
        } else {
            RenderState::Idle
        }
    }

    pub fn is_armed(&self) -> bool {
        self.render_state() == RenderState::Armed
    }

    pub fn key_held(&self) -> bool {
        self.key_held
    }

    pub fn toggle_on(&self) -> bool {
        self.toggle_on
    }

    pub fn key_down(&mut self) -> Transition {
        self.update(|state| state.key_held = true)
    }

    pub fn key_up(&mut self) -> Transition {
        self.update(|state| state.key_held = false)
    }

    pub fn set_toggle(&mut self, on: bool) -> Transition {
        self.update(|state| state.toggle_on = on)
    }

    fn update<F: FnOnce(&mut Self)>(&mut self, change: F) -> Transition {
        let before = self.render_state();
        change(self);
        match (before, self.render_state()) {
            (RenderState::Idle, RenderState::Armed) => Transition::Armed,
            (RenderState::Armed, RenderState::Idle) => Transition::Disarmed,
            _ => Transition::None,
        }
    }
}

/// Compares a `KeyboardEvent.key` value against the configured activation key.
pub fn matches_key(event_key: &str, activation_key: &str) -> bool {
    event_key == activation_key
}
