//! Headless host: a scripted page with a media element that plays clips of
//! a fixed length. Drives the showreel at a fixed frame step.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::str::FromStr;

use rand::Rng;
use tracing::debug;

use crate::config::ShowreelConfig;
use crate::constants::{FPS, FRAME_TIME};
use crate::engine::{Advance, Showreel};
use crate::error::{HostError, ShowreelError};
use crate::host::{MediaElement, ObservationHost, PlayRequest, PlayTicket, Subscription};
use crate::item::RotationItem;

// --- Observation host ---

pub struct SimHost {
    foreground: bool,
    mounted: bool,
    fail_unsubscribe: bool,
    active: Rc<Cell<usize>>,
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SimHost {
    pub fn new() -> Self {
        Self {
            foreground: true,
            mounted: true,
            fail_unsubscribe: false,
            active: Rc::new(Cell::new(0)),
        }
    }

    pub fn with_foreground(mut self, foreground: bool) -> Self {
        self.foreground = foreground;
        self
    }

    /// Registrations fail as if the element was already removed.
    pub fn unmounted(mut self) -> Self {
        self.mounted = false;
        self
    }

    /// Every unsubscribe reports an error after releasing.
    pub fn failing_unsubscribe(mut self) -> Self {
        self.fail_unsubscribe = true;
        self
    }

    pub fn active_subscriptions(&self) -> usize {
        self.active.get()
    }

    fn subscribe(&mut self) -> Result<Box<dyn Subscription>, HostError> {
        if !self.mounted {
            return Err(HostError::Unmounted);
        }
        self.active.set(self.active.get() + 1);
        Ok(Box::new(SimSubscription {
            active: Rc::clone(&self.active),
            released: false,
            fail: self.fail_unsubscribe,
        }))
    }
}

impl ObservationHost for SimHost {
    fn observe_intersection(
        &mut self,
        _threshold: f32,
    ) -> Result<Box<dyn Subscription>, HostError> {
        self.subscribe()
    }

    fn listen_visibility_change(&mut self) -> Result<Box<dyn Subscription>, HostError> {
        self.subscribe()
    }

    fn is_page_foreground(&self) -> bool {
        self.foreground
    }
}

struct SimSubscription {
    active: Rc<Cell<usize>>,
    released: bool,
    fail: bool,
}

impl Subscription for SimSubscription {
    fn unsubscribe(&mut self) -> Result<(), HostError> {
        if !self.released {
            self.released = true;
            self.active.set(self.active.get() - 1);
        }
        if self.fail {
            return Err(HostError::Other("listener removal failed".to_string()));
        }
        Ok(())
    }
}

// --- Media element ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AutoplayPolicy {
    /// Play requests start immediately
    Allow,
    /// Every play request is refused
    Block,
    /// Play requests settle on the next frame
    Deferred,
}

struct MediaInner {
    source: Option<String>,
    paused: bool,
    position: f32,
    clip_length: f32,
    base_length: f32,
    jitter: f32,
    policy: AutoplayPolicy,
    pending: Option<PlayTicket>,
    play_requests: usize,
    fail_seek: bool,
}

/// Shared handle to a simulated media element. Clones observe the same
/// element, the way the page's media pipeline keeps running underneath
/// whoever owns the handle.
#[derive(Clone)]
pub struct SimMedia {
    inner: Rc<RefCell<MediaInner>>,
}

impl SimMedia {
    pub fn new(clip_length: f32) -> Self {
        Self {
            inner: Rc::new(RefCell::new(MediaInner {
                source: None,
                paused: true,
                position: 0.0,
                clip_length,
                base_length: clip_length,
                jitter: 0.0,
                policy: AutoplayPolicy::Allow,
                pending: None,
                play_requests: 0,
                fail_seek: false,
            })),
        }
    }

    pub fn with_policy(self, policy: AutoplayPolicy) -> Self {
        self.set_policy(policy);
        self
    }

    /// Each loaded clip gets a length of `clip_length ± jitter`. Jitter
    /// beyond the clip length is capped to it when a source is loaded.
    pub fn with_jitter(self, jitter: f32) -> Self {
        self.inner.borrow_mut().jitter = jitter;
        self
    }

    /// Checks the timing this element was built with.
    pub fn validate(&self) -> Result<(), ShowreelError> {
        let inner = self.inner.borrow();
        if !inner.base_length.is_finite() || inner.base_length <= 0.0 {
            return Err(ShowreelError::InvalidConfig(format!(
                "clip length must be a positive number of seconds, got {}",
                inner.base_length
            )));
        }
        if !(0.0..=inner.base_length).contains(&inner.jitter) {
            return Err(ShowreelError::InvalidConfig(format!(
                "clip jitter must be between 0 and the clip length ({}), got {}",
                inner.base_length, inner.jitter
            )));
        }
        Ok(())
    }

    pub fn with_failing_seek(self) -> Self {
        self.inner.borrow_mut().fail_seek = true;
        self
    }

    pub fn set_policy(&self, policy: AutoplayPolicy) {
        self.inner.borrow_mut().policy = policy;
    }

    pub fn is_paused(&self) -> bool {
        self.inner.borrow().paused
    }

    pub fn position(&self) -> f32 {
        self.inner.borrow().position
    }

    pub fn source(&self) -> Option<String> {
        self.inner.borrow().source.clone()
    }

    pub fn play_requests(&self) -> usize {
        self.inner.borrow().play_requests
    }

    /// Starts playback behind the owner's back, like a host that ignores
    /// a superseded request.
    pub fn force_playing(&self) {
        self.inner.borrow_mut().paused = false;
    }

    /// Completes a deferred play request.
    pub fn settle_pending(&self) -> Option<PlayTicket> {
        let mut inner = self.inner.borrow_mut();
        let ticket = inner.pending.take()?;
        inner.paused = false;
        Some(ticket)
    }

    /// Advances playback time. Returns true when the clip ended this step.
    pub fn tick(&self, dt: f32) -> bool {
        let mut inner = self.inner.borrow_mut();
        if inner.paused || inner.source.is_none() {
            return false;
        }
        inner.position += dt;
        if inner.position >= inner.clip_length {
            inner.position = inner.clip_length;
            inner.paused = true;
            return true;
        }
        false
    }
}

impl MediaElement for SimMedia {
    fn set_source(&mut self, media_ref: &str) {
        let mut inner = self.inner.borrow_mut();
        inner.source = Some(media_ref.to_string());
        inner.position = 0.0;
        // Replacing the source aborts an outstanding request
        inner.pending = None;
        let jitter = inner.jitter.min(inner.base_length);
        inner.clip_length = if jitter > 0.0 && jitter.is_finite() {
            (inner.base_length + rand::rng().random_range(-jitter..=jitter)).max(FRAME_TIME)
        } else {
            inner.base_length
        };
    }

    fn play(&mut self, ticket: PlayTicket) -> PlayRequest {
        let mut inner = self.inner.borrow_mut();
        inner.play_requests += 1;
        match inner.policy {
            AutoplayPolicy::Allow => {
                if inner.position >= inner.clip_length {
                    inner.position = 0.0;
                }
                inner.paused = false;
                PlayRequest::Started
            }
            AutoplayPolicy::Block => PlayRequest::Rejected("autoplay blocked".to_string()),
            AutoplayPolicy::Deferred => {
                if inner.position >= inner.clip_length {
                    inner.position = 0.0;
                }
                inner.pending = Some(ticket);
                PlayRequest::Pending
            }
        }
    }

    fn pause(&mut self) {
        let mut inner = self.inner.borrow_mut();
        inner.paused = true;
        inner.pending = None;
    }

    fn seek_to_start(&mut self) -> Result<(), HostError> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_seek {
            return Err(HostError::Other("seek failed".to_string()));
        }
        inner.position = 0.0;
        Ok(())
    }

    fn is_paused(&self) -> bool {
        SimMedia::is_paused(self)
    }

    fn position(&self) -> f32 {
        SimMedia::position(self)
    }
}

// --- Script ---

/// Half-open time window `[start, end)` in seconds, written `START..END`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub start: f32,
    pub end: f32,
}

impl Span {
    pub fn contains(&self, t: f32) -> bool {
        t >= self.start && t < self.end
    }
}

impl FromStr for Span {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once("..")
            .ok_or_else(|| format!("expected START..END, got {s:?}"))?;
        let start: f32 = start.trim().parse().map_err(|e| format!("bad start in {s:?}: {e}"))?;
        let end: f32 = end.trim().parse().map_err(|e| format!("bad end in {s:?}: {e}"))?;
        if end < start {
            return Err(format!("span {s:?} ends before it starts"));
        }
        Ok(Self { start, end })
    }
}

/// What the simulated page does over time.
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub offscreen: Vec<Span>,
    pub background: Vec<Span>,
    pub clicks: Vec<f32>,
}

impl Script {
    fn in_viewport(&self, t: f32) -> bool {
        !self.offscreen.iter().any(|span| span.contains(t))
    }

    fn foreground(&self, t: f32) -> bool {
        !self.background.iter().any(|span| span.contains(t))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RotationRecord {
    pub at: f32,
    pub advance: Advance,
    pub media_ref: String,
}

#[derive(Debug, Clone)]
pub struct SimReport {
    pub rotations: Vec<RotationRecord>,
    pub final_index: usize,
    pub frames: u64,
}

/// Number of fixed steps needed to cover `seconds` of simulated time.
pub fn frame_count(seconds: f32) -> u64 {
    (f64::from(seconds) * f64::from(FPS)).ceil() as u64
}

/// Runs the script for `seconds` of simulated time.
pub fn run(
    items: Vec<RotationItem>,
    config: &ShowreelConfig,
    media: SimMedia,
    script: &Script,
    seconds: f32,
) -> Result<SimReport, ShowreelError> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(ShowreelError::InvalidConfig(format!(
            "simulated time must be a positive number of seconds, got {seconds}"
        )));
    }
    media.validate()?;

    let mut host = SimHost::new().with_foreground(script.foreground(0.0));
    let mut showreel = Showreel::mount(&mut host, media.clone(), items, config)?;

    let mut rotations = Vec::new();
    let mut clicks: Vec<f32> = script.clicks.clone();
    clicks.sort_by(f32::total_cmp);
    let mut clicks = clicks.into_iter().peekable();

    let mut in_viewport = false;
    let mut foreground = script.foreground(0.0);
    let frames = frame_count(seconds);

    for frame in 0..frames {
        let clock = (frame as f64 / f64::from(FPS)) as f32;

        // Host events first, in the order a browser would deliver them
        let now_in_viewport = script.in_viewport(clock);
        if frame == 0 || now_in_viewport != in_viewport {
            in_viewport = now_in_viewport;
            showreel.on_intersection(if in_viewport { 1.0 } else { 0.0 });
        }
        let now_foreground = script.foreground(clock);
        if now_foreground != foreground {
            foreground = now_foreground;
            showreel.on_page_visibility(foreground);
        }
        if let Some(ticket) = media.settle_pending() {
            showreel.on_play_settled(ticket, Ok(()));
        }
        if media.tick(FRAME_TIME) {
            showreel.on_media_finished();
        }

        let mut record = |advance: Advance, showreel: &Showreel<SimMedia>| {
            let media_ref = showreel.current_item().media_ref.clone();
            debug!(
                "{clock:7.2}s  {} -> {}{}  {}  {}",
                advance.from,
                advance.to,
                if advance.forced { " (click)" } else { "" },
                showreel.indicator(),
                media_ref
            );
            rotations.push(RotationRecord {
                at: clock,
                advance,
                media_ref,
            });
        };

        while clicks.next_if(|&t| t <= clock).is_some() {
            if let Some(advance) = showreel.select_next() {
                record(advance, &showreel);
            }
        }
        if let Some(advance) = showreel.update(FRAME_TIME) {
            record(advance, &showreel);
        }
    }

    let final_index = showreel.current_index();
    showreel.dispose();

    Ok(SimReport {
        rotations,
        final_index,
        frames,
    })
}
