use crate::state::FadePhase;

/// Opacity envelope of the media surface around a rotation.
#[derive(Debug, Clone)]
pub struct Crossfade {
    phase: FadePhase,
    timer: f32,
    from: f32,
    duration: f32,
    swap_delay: f32,
}

fn lerp(start: f32, end: f32, t: f32) -> f32 {
    start + (end - start) * t
}

fn ease_out_quad(t: f32) -> f32 {
    1.0 - (1.0 - t) * (1.0 - t)
}

impl Crossfade {
    pub fn new(duration: f32, swap_delay: f32) -> Self {
        Self {
            phase: FadePhase::Opaque,
            timer: 0.0,
            from: 1.0,
            duration,
            swap_delay,
        }
    }

    pub fn fade_out(&mut self) {
        self.from = self.opacity();
        self.phase = FadePhase::FadingOut;
        self.timer = 0.0;
    }

    /// The source was swapped; stay dark for the swap delay, then fade in.
    pub fn swap(&mut self) {
        self.phase = FadePhase::Hidden;
        self.timer = 0.0;
    }

    /// Rotation canceled; come back from wherever the fade got to.
    pub fn restore(&mut self) {
        if self.phase == FadePhase::Opaque {
            return;
        }
        self.from = self.opacity();
        self.phase = FadePhase::FadingIn;
        self.timer = 0.0;
    }

    pub fn update(&mut self, dt: f32) {
        match self.phase {
            FadePhase::Opaque => {}
            FadePhase::FadingOut => {
                // Held at zero until the rotation swaps the source
                self.timer = (self.timer + dt).min(self.duration);
            }
            FadePhase::Hidden => {
                self.timer += dt;
                if self.timer >= self.swap_delay {
                    self.from = 0.0;
                    self.phase = FadePhase::FadingIn;
                    self.timer = 0.0;
                }
            }
            FadePhase::FadingIn => {
                self.timer += dt;
                if self.timer >= self.duration {
                    self.phase = FadePhase::Opaque;
                    self.timer = 0.0;
                }
            }
        }
    }

    pub fn opacity(&self) -> f32 {
        let t = if self.duration > 0.0 {
            (self.timer / self.duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let opacity = match self.phase {
            FadePhase::Opaque => 1.0,
            FadePhase::FadingOut => lerp(self.from, 0.0, ease_out_quad(t)),
            FadePhase::Hidden => 0.0,
            FadePhase::FadingIn => lerp(self.from, 1.0, ease_out_quad(t)),
        };
        opacity.clamp(0.0, 1.0)
    }

    pub fn phase(&self) -> FadePhase {
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_cycle_returns_to_opaque() {
        let mut fade = Crossfade::new(0.8, 0.2);
        fade.fade_out();
        fade.update(0.8);
        assert_eq!(fade.opacity(), 0.0);
        fade.swap();
        fade.update(0.1);
        assert_eq!(fade.phase(), FadePhase::Hidden);
        fade.update(0.1);
        assert_eq!(fade.phase(), FadePhase::FadingIn);
        fade.update(0.4);
        assert!(fade.opacity() > 0.0 && fade.opacity() < 1.0);
        fade.update(0.4);
        assert_eq!(fade.phase(), FadePhase::Opaque);
        assert_eq!(fade.opacity(), 1.0);
    }

    #[test]
    fn restore_starts_from_current_opacity() {
        let mut fade = Crossfade::new(0.8, 0.2);
        fade.fade_out();
        fade.update(0.2);
        let midway = fade.opacity();
        assert!(midway < 1.0);
        fade.restore();
        assert_eq!(fade.opacity(), midway);
        fade.update(0.8);
        assert_eq!(fade.opacity(), 1.0);
    }

    #[test]
    fn opacity_stays_in_range() {
        let mut fade = Crossfade::new(0.8, 0.2);
        fade.fade_out();
        for _ in 0..200 {
            fade.update(0.05);
            let opacity = fade.opacity();
            assert!((0.0..=1.0).contains(&opacity));
        }
        fade.swap();
        for _ in 0..200 {
            fade.update(0.05);
            assert!((0.0..=1.0).contains(&fade.opacity()));
        }
    }

    #[test]
    fn restore_when_opaque_is_noop() {
        let mut fade = Crossfade::new(0.8, 0.2);
        fade.restore();
        assert_eq!(fade.phase(), FadePhase::Opaque);
    }
}
