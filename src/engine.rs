use tracing::{debug, info, warn};

use crate::carousel::CarouselState;
use crate::config::ShowreelConfig;
use crate::error::ShowreelError;
use crate::fade::Crossfade;
use crate::host::{MediaElement, ObservationHost, PlayTicket};
use crate::indicator;
use crate::item::RotationItem;
use crate::playback::PlaybackController;
use crate::scheduler::RotationScheduler;
use crate::state::RotationState;
use crate::visibility::VisibilityTracker;

/// One rotation step, as reported to the parent UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advance {
    pub from: usize,
    pub to: usize,
    /// Triggered by the user rather than by a finished clip.
    pub forced: bool,
}

/// An auto-advancing media carousel bound to one media element.
///
/// The host delivers its events through the `on_*` methods and drives
/// time with [`Showreel::update`]. Dropping the showreel disposes it.
pub struct Showreel<M: MediaElement> {
    carousel: CarouselState,
    tracker: VisibilityTracker,
    playback: PlaybackController<M>,
    scheduler: RotationScheduler,
    fade: Crossfade,
    disposed: bool,
}

impl<M: MediaElement> Showreel<M> {
    pub fn mount<H: ObservationHost + ?Sized>(
        host: &mut H,
        media: M,
        items: Vec<RotationItem>,
        config: &ShowreelConfig,
    ) -> Result<Self, ShowreelError> {
        config.validate()?;
        let carousel = CarouselState::new(items)?;
        let tracker = VisibilityTracker::attach(host, config.viewport_threshold);
        let mut playback = PlaybackController::new(media, &carousel.current().media_ref);
        playback.set_should_play(tracker.should_play());

        info!("showreel mounted with {} items", carousel.len());
        Ok(Self {
            carousel,
            tracker,
            playback,
            scheduler: RotationScheduler::new(config.debounce_seconds),
            fade: Crossfade::new(config.fade_seconds, config.swap_delay_seconds),
            disposed: false,
        })
    }

    pub fn on_intersection(&mut self, ratio: f32) {
        if self.disposed {
            return;
        }
        if let Some(should_play) = self.tracker.on_intersection(ratio) {
            self.apply_visibility(should_play);
        }
    }

    pub fn on_page_visibility(&mut self, foreground: bool) {
        if self.disposed {
            return;
        }
        if let Some(should_play) = self.tracker.on_page_visibility(foreground) {
            self.apply_visibility(should_play);
        }
    }

    fn apply_visibility(&mut self, should_play: bool) {
        debug!("should play: {should_play}");
        self.playback.set_should_play(should_play);
        if self.scheduler.on_visibility_changed(should_play) {
            debug!("pending rotation canceled");
            self.fade.restore();
        }
    }

    pub fn on_media_finished(&mut self) {
        if self.disposed {
            return;
        }
        if self.scheduler.on_media_finished(self.tracker.should_play()) {
            debug!("rotation scheduled after {}", self.carousel.current().id);
            self.fade.fade_out();
        }
    }

    pub fn on_play_settled(&mut self, ticket: PlayTicket, outcome: Result<(), String>) {
        if self.disposed {
            return;
        }
        self.playback.play_settled(ticket, outcome);
    }

    /// Advances timers by `dt` seconds; returns the rotation when the
    /// debounce elapses during this step.
    pub fn update(&mut self, dt: f32) -> Option<Advance> {
        if self.disposed {
            return None;
        }
        self.fade.update(dt);
        if self.scheduler.update(dt) {
            return Some(self.rotate(false));
        }
        None
    }

    /// Interaction handler: advance right now, skipping the debounce.
    pub fn select_next(&mut self) -> Option<Advance> {
        if self.disposed {
            return None;
        }
        Some(self.rotate(true))
    }

    fn rotate(&mut self, forced: bool) -> Advance {
        // The old source's pending rotation must not outlive the swap
        self.scheduler.cancel();
        let from = self.carousel.current_index();
        let media_ref = self.carousel.advance().media_ref.clone();
        self.playback.change_source(&media_ref, self.tracker.should_play());
        self.fade.swap();

        let to = self.carousel.current_index();
        debug!("rotated {from} -> {to} ({media_ref})");
        Advance { from, to, forced }
    }

    /// Cancels the pending rotation, releases both observers and rewinds
    /// the media. Every step runs even when an earlier one fails.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        self.scheduler.cancel();
        if let Err(e) = self.tracker.detach() {
            warn!("failed to release visibility observers: {e}");
        }
        if let Err(e) = self.playback.release() {
            warn!("failed to reset media element: {e}");
        }
        debug!("showreel disposed on {}", self.playback.source());
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn current_index(&self) -> usize {
        self.carousel.current_index()
    }

    pub fn current_item(&self) -> &RotationItem {
        self.carousel.current()
    }

    pub fn items(&self) -> &[RotationItem] {
        self.carousel.items()
    }

    pub fn should_play(&self) -> bool {
        self.tracker.should_play()
    }

    pub fn rotation_state(&self) -> RotationState {
        self.scheduler.state()
    }

    /// How far the pending rotation is through its debounce, in `[0, 1]`.
    pub fn rotation_progress(&self) -> Option<f32> {
        self.scheduler.progress()
    }

    pub fn opacity(&self) -> f32 {
        self.fade.opacity()
    }

    pub fn indicator(&self) -> String {
        indicator::render(self.carousel.len(), self.carousel.current_index())
    }

    pub fn media(&self) -> &M {
        self.playback.media()
    }
}

impl<M: MediaElement> Drop for Showreel<M> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulate::{SimHost, SimMedia};

    fn two_items() -> Vec<RotationItem> {
        vec![
            RotationItem::new("a", "A", "", "", "/a.mp4"),
            RotationItem::new("b", "B", "", "", "/b.mp4"),
        ]
    }

    fn mounted(host: &mut SimHost, media: &SimMedia) -> Showreel<SimMedia> {
        Showreel::mount(host, media.clone(), two_items(), &ShowreelConfig::default()).unwrap()
    }

    #[test]
    fn mount_rejects_empty_rotation() {
        let mut host = SimHost::new();
        let config = ShowreelConfig::default();
        let result = Showreel::mount(&mut host, SimMedia::new(1.0), Vec::new(), &config);
        assert!(matches!(result, Err(ShowreelError::EmptyRotation)));
    }

    #[test]
    fn mount_starts_paused_until_in_viewport() {
        let mut host = SimHost::new();
        let media = SimMedia::new(1.0);
        let mut showreel = mounted(&mut host, &media);
        assert!(media.is_paused());
        assert_eq!(media.source().as_deref(), Some("/a.mp4"));
        showreel.on_intersection(0.6);
        assert!(!media.is_paused());
    }

    #[test]
    fn finish_then_hide_before_deadline_never_advances() {
        let mut host = SimHost::new();
        let media = SimMedia::new(1.0);
        let mut showreel = mounted(&mut host, &media);
        showreel.on_intersection(1.0);
        showreel.on_media_finished();
        assert!(matches!(showreel.rotation_state(), RotationState::PendingAdvance { .. }));
        showreel.update(0.4);
        showreel.on_page_visibility(false);
        assert_eq!(showreel.rotation_state(), RotationState::Idle);
        assert_eq!(showreel.update(5.0), None);
        assert_eq!(showreel.current_index(), 0);
        assert!(media.is_paused());
    }

    #[test]
    fn select_next_bypasses_debounce_and_cancels_pending() {
        let mut host = SimHost::new();
        let media = SimMedia::new(1.0);
        let mut showreel = mounted(&mut host, &media);
        showreel.on_intersection(1.0);
        showreel.on_media_finished();

        let advance = showreel.select_next().unwrap();
        assert_eq!(advance, Advance { from: 0, to: 1, forced: true });
        assert_eq!(showreel.rotation_state(), RotationState::Idle);
        // The canceled timer must not advance past the freshly selected item
        assert_eq!(showreel.update(5.0), None);
        assert_eq!(showreel.current_index(), 1);
        assert_eq!(media.source().as_deref(), Some("/b.mp4"));
        assert!(!media.is_paused());
    }

    #[test]
    fn fade_follows_rotation() {
        let mut host = SimHost::new();
        let media = SimMedia::new(1.0);
        let mut showreel = mounted(&mut host, &media);
        showreel.on_intersection(1.0);
        assert_eq!(showreel.opacity(), 1.0);
        showreel.on_media_finished();
        showreel.update(0.4);
        assert!(showreel.opacity() < 1.0);
        showreel.update(0.4);
        assert_eq!(showreel.opacity(), 0.0);
        showreel.update(0.2);
        showreel.update(0.8);
        assert_eq!(showreel.opacity(), 1.0);
    }

    #[test]
    fn rotation_progress_follows_the_debounce() {
        let mut host = SimHost::new();
        let media = SimMedia::new(1.0);
        let mut showreel = mounted(&mut host, &media);
        showreel.on_intersection(1.0);
        assert_eq!(showreel.rotation_progress(), None);
        showreel.on_media_finished();
        assert_eq!(showreel.rotation_progress(), Some(0.0));
        showreel.update(0.4);
        assert_eq!(showreel.rotation_progress(), Some(0.5));
        showreel.update(0.4);
        assert_eq!(showreel.rotation_progress(), None);
    }

    #[test]
    fn events_after_dispose_are_ignored() {
        let mut host = SimHost::new();
        let media = SimMedia::new(1.0);
        let mut showreel = mounted(&mut host, &media);
        showreel.dispose();
        showreel.on_intersection(1.0);
        assert!(media.is_paused());
        assert_eq!(showreel.select_next(), None);
        assert_eq!(showreel.current_index(), 0);
        assert!(showreel.is_disposed());
    }

    #[test]
    fn drop_releases_observers() {
        let mut host = SimHost::new();
        let media = SimMedia::new(1.0);
        {
            let mut showreel = mounted(&mut host, &media);
            showreel.on_intersection(1.0);
            assert_eq!(host.active_subscriptions(), 2);
        }
        assert_eq!(host.active_subscriptions(), 0);
        assert!(media.is_paused());
    }

    #[test]
    fn teardown_steps_are_independent() {
        let mut host = SimHost::new().failing_unsubscribe();
        let media = SimMedia::new(1.0).with_failing_seek();
        let mut showreel = mounted(&mut host, &media);
        showreel.on_intersection(1.0);
        showreel.on_media_finished();
        showreel.dispose();
        assert_eq!(showreel.rotation_state(), RotationState::Idle);
        assert_eq!(host.active_subscriptions(), 0);
        assert!(media.is_paused());
    }

    #[test]
    fn two_showreels_do_not_interfere() {
        let mut host = SimHost::new();
        let first_media = SimMedia::new(1.0);
        let second_media = SimMedia::new(1.0);
        let mut first = mounted(&mut host, &first_media);
        let mut second = mounted(&mut host, &second_media);
        first.on_intersection(1.0);
        second.on_intersection(0.0);
        assert!(!first_media.is_paused());
        assert!(second_media.is_paused());
        first.select_next();
        assert_eq!(second.current_index(), 0);
    }
}
