use crate::state::RotationState;

/// Turns "clip finished" into a single debounced advance.
///
/// At most one advance is pending at any time. Losing visibility or
/// tearing down the carousel cancels it without running it.
#[derive(Debug)]
pub struct RotationScheduler {
    debounce: f32,
    state: RotationState,
}

impl RotationScheduler {
    pub fn new(debounce: f32) -> Self {
        Self {
            debounce,
            state: RotationState::Idle,
        }
    }

    /// Returns true when this finish scheduled a new advance.
    pub fn on_media_finished(&mut self, should_play: bool) -> bool {
        match self.state {
            RotationState::Idle if should_play => {
                self.state = RotationState::PendingAdvance { elapsed: 0.0 };
                true
            }
            // Finished while hidden, or a burst while already pending
            _ => false,
        }
    }

    /// Returns true when a pending advance was canceled.
    pub fn on_visibility_changed(&mut self, should_play: bool) -> bool {
        if should_play {
            return false;
        }
        self.cancel()
    }

    /// Returns true exactly once per pending advance, when the debounce elapses.
    pub fn update(&mut self, dt: f32) -> bool {
        match self.state {
            RotationState::Idle => false,
            RotationState::PendingAdvance { elapsed } => {
                let elapsed = elapsed + dt;
                if elapsed >= self.debounce {
                    self.state = RotationState::Idle;
                    true
                } else {
                    self.state = RotationState::PendingAdvance { elapsed };
                    false
                }
            }
        }
    }

    pub fn cancel(&mut self) -> bool {
        let was_pending = self.is_pending();
        self.state = RotationState::Idle;
        was_pending
    }

    pub fn state(&self) -> RotationState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, RotationState::PendingAdvance { .. })
    }

    /// Fraction of the debounce already waited out, if pending.
    pub fn progress(&self) -> Option<f32> {
        match self.state {
            RotationState::Idle => None,
            RotationState::PendingAdvance { elapsed } => Some((elapsed / self.debounce).min(1.0)),
        }
    }
}
