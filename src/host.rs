//! Capabilities the rendering host hands to a showreel.
//!
//! Nothing here is global: every showreel receives the observation host and
//! owns its own media element, so two carousels on one page never reach
//! into each other's state.

use crate::error::HostError;

/// Identity of a single play attempt.
///
/// `generation` changes every time the media source is replaced, `attempt`
/// every time playback is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayTicket {
    pub generation: u64,
    pub attempt: u64,
}

/// Immediate answer of the host to a play request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayRequest {
    Started,
    /// The host settles later through `Showreel::on_play_settled`.
    Pending,
    /// Autoplay policy or a decode problem refused playback.
    Rejected(String),
}

/// A registration with the host that must be released explicitly.
pub trait Subscription {
    fn unsubscribe(&mut self) -> Result<(), HostError>;
}

/// Viewport and page-visibility observation.
pub trait ObservationHost {
    /// Starts delivering intersection ratios for the carousel element.
    fn observe_intersection(&mut self, threshold: f32) -> Result<Box<dyn Subscription>, HostError>;

    /// Starts delivering page foreground/background changes.
    fn listen_visibility_change(&mut self) -> Result<Box<dyn Subscription>, HostError>;

    /// Current foreground state, read once at mount.
    fn is_page_foreground(&self) -> bool;
}

/// A playable media surface owned by exactly one playback controller.
pub trait MediaElement {
    fn set_source(&mut self, media_ref: &str);
    fn play(&mut self, ticket: PlayTicket) -> PlayRequest;
    fn pause(&mut self);
    fn seek_to_start(&mut self) -> Result<(), HostError>;
    fn is_paused(&self) -> bool;
    fn position(&self) -> f32;
}
