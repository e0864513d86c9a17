use tracing::debug;

use crate::constants::REVEAL_START;
use crate::error::HostError;
use crate::host::{ObservationHost, Subscription};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityState {
    pub in_viewport: bool,
    pub page_foreground: bool,
}

impl VisibilityState {
    pub fn should_play(&self) -> bool {
        self.in_viewport && self.page_foreground
    }
}

/// Derives "should play" from viewport intersection and page foreground.
pub struct VisibilityTracker {
    threshold: f32,
    state: VisibilityState,
    intersection: Option<Box<dyn Subscription>>,
    visibility_listener: Option<Box<dyn Subscription>>,
}

impl VisibilityTracker {
    /// Registers both observers with the host and reads the current
    /// foreground state right away instead of assuming it.
    ///
    /// A host that refuses a registration (element already gone) leaves that
    /// observer absent; the tracker then simply never sees the element.
    pub fn attach<H: ObservationHost + ?Sized>(host: &mut H, threshold: f32) -> Self {
        let intersection = host
            .observe_intersection(threshold)
            .map_err(|e| debug!("intersection observer not attached: {e}"))
            .ok();
        let visibility_listener = host
            .listen_visibility_change()
            .map_err(|e| debug!("visibility listener not attached: {e}"))
            .ok();

        Self {
            threshold,
            state: VisibilityState {
                in_viewport: false,
                page_foreground: host.is_page_foreground(),
            },
            intersection,
            visibility_listener,
        }
    }

    /// Returns the new "should play" value when it changed.
    pub fn on_intersection(&mut self, ratio: f32) -> Option<bool> {
        let in_viewport = ratio >= self.threshold;
        self.transition(VisibilityState {
            in_viewport,
            ..self.state
        })
    }

    /// Returns the new "should play" value when it changed.
    pub fn on_page_visibility(&mut self, foreground: bool) -> Option<bool> {
        self.transition(VisibilityState {
            page_foreground: foreground,
            ..self.state
        })
    }

    fn transition(&mut self, next: VisibilityState) -> Option<bool> {
        let before = self.state.should_play();
        self.state = next;
        let after = self.state.should_play();
        (before != after).then_some(after)
    }

    pub fn should_play(&self) -> bool {
        self.state.should_play()
    }

    pub fn state(&self) -> VisibilityState {
        self.state
    }

    pub fn is_attached(&self) -> bool {
        self.intersection.is_some() || self.visibility_listener.is_some()
    }

    /// Releases both observers. Both are always attempted; the first
    /// failure is returned. Calling it again is a no-op.
    pub fn detach(&mut self) -> Result<(), HostError> {
        let intersection = self.intersection.take().map(|mut s| s.unsubscribe());
        let listener = self.visibility_listener.take().map(|mut s| s.unsubscribe());
        match (intersection, listener) {
            (Some(Err(e)), _) | (_, Some(Err(e))) => Err(e),
            _ => Ok(()),
        }
    }
}

/// Fraction of an element's height inside a viewport of the given height.
/// `top` is relative to the top of the viewport.
pub fn intersection_ratio(top: f32, height: f32, viewport_height: f32) -> f32 {
    if height <= 0.0 {
        return 0.0;
    }
    let visible = (top + height).min(viewport_height) - top.max(0.0);
    (visible / height).clamp(0.0, 1.0)
}

/// Scroll latch that fires when an element's top passes a line drawn at a
/// fraction of the viewport height.
#[derive(Debug, Clone)]
pub struct RevealTrigger {
    start: f32,
    once: bool,
    revealed: bool,
}

impl Default for RevealTrigger {
    fn default() -> Self {
        Self::new(REVEAL_START, true)
    }
}

impl RevealTrigger {
    pub fn new(start: f32, once: bool) -> Self {
        Self {
            start,
            once,
            revealed: false,
        }
    }

    /// `element_top` is measured from the top of the viewport. Returns true
    /// on the scroll that reveals the element.
    pub fn on_scroll(&mut self, element_top: f32, viewport_height: f32) -> bool {
        let past_line = element_top <= viewport_height * self.start;
        if self.revealed {
            if !past_line && !self.once {
                self.revealed = false;
            }
            return false;
        }
        self.revealed = past_line;
        past_line
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulate::SimHost;

    #[test]
    fn foreground_is_read_at_attach() {
        let mut host = SimHost::new().with_foreground(false);
        let tracker = VisibilityTracker::attach(&mut host, 0.25);
        assert!(!tracker.state().page_foreground);
        assert!(!tracker.should_play());
    }

    #[test]
    fn should_play_needs_viewport_and_foreground() {
        let mut host = SimHost::new();
        let mut tracker = VisibilityTracker::attach(&mut host, 0.25);
        assert!(!tracker.should_play());
        assert_eq!(tracker.on_intersection(0.5), Some(true));
        assert_eq!(tracker.on_page_visibility(false), Some(false));
        assert_eq!(tracker.on_page_visibility(true), Some(true));
        assert_eq!(tracker.on_intersection(0.1), Some(false));
    }

    #[test]
    fn threshold_is_inclusive_and_unchanged_values_report_nothing() {
        let mut host = SimHost::new();
        let mut tracker = VisibilityTracker::attach(&mut host, 0.25);
        assert_eq!(tracker.on_intersection(0.25), Some(true));
        assert_eq!(tracker.on_intersection(0.9), None);
        assert_eq!(tracker.on_intersection(0.24), Some(false));
        assert_eq!(tracker.on_intersection(0.0), None);
    }

    #[test]
    fn detach_is_idempotent() {
        let mut host = SimHost::new();
        let mut tracker = VisibilityTracker::attach(&mut host, 0.25);
        assert_eq!(host.active_subscriptions(), 2);
        assert!(tracker.detach().is_ok());
        assert_eq!(host.active_subscriptions(), 0);
        assert!(tracker.detach().is_ok());
        assert!(!tracker.is_attached());
    }

    #[test]
    fn unmounted_element_attaches_nothing() {
        let mut host = SimHost::new().unmounted();
        let mut tracker = VisibilityTracker::attach(&mut host, 0.25);
        assert!(!tracker.is_attached());
        assert!(tracker.detach().is_ok());
    }

    #[test]
    fn failing_unsubscribe_still_releases_the_other_observer() {
        let mut host = SimHost::new().failing_unsubscribe();
        let mut tracker = VisibilityTracker::attach(&mut host, 0.25);
        assert!(tracker.detach().is_err());
        assert!(!tracker.is_attached());
    }

    #[test]
    fn intersection_ratio_clips_to_viewport() {
        assert_eq!(intersection_ratio(100.0, 200.0, 1000.0), 1.0);
        assert_eq!(intersection_ratio(900.0, 200.0, 1000.0), 0.5);
        assert_eq!(intersection_ratio(-150.0, 200.0, 1000.0), 0.25);
        assert_eq!(intersection_ratio(1200.0, 200.0, 1000.0), 0.0);
        assert_eq!(intersection_ratio(-500.0, 200.0, 1000.0), 0.0);
        assert_eq!(intersection_ratio(0.0, 0.0, 1000.0), 0.0);
    }

    #[test]
    fn reveal_once_latches() {
        let mut trigger = RevealTrigger::new(0.8, true);
        assert!(!trigger.on_scroll(900.0, 1000.0));
        assert!(trigger.on_scroll(700.0, 1000.0));
        assert!(!trigger.on_scroll(600.0, 1000.0));
        assert!(!trigger.on_scroll(2000.0, 1000.0));
        assert!(trigger.is_revealed());
    }

    #[test]
    fn reveal_without_once_rearms_above_start_line() {
        let mut trigger = RevealTrigger::new(0.8, false);
        assert!(trigger.on_scroll(800.0, 1000.0));
        assert!(!trigger.on_scroll(900.0, 1000.0));
        assert!(!trigger.is_revealed());
        assert!(trigger.on_scroll(100.0, 1000.0));
    }
}
