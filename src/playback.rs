use tracing::debug;

use crate::error::HostError;
use crate::host::{MediaElement, PlayRequest, PlayTicket};

/// Sole owner of the media element; keeps play/pause in line with intent.
pub struct PlaybackController<M: MediaElement> {
    media: M,
    source: String,
    generation: u64,
    attempts: u64,
    pending: Option<PlayTicket>,
    wants_playback: bool,
}

impl<M: MediaElement> PlaybackController<M> {
    pub fn new(mut media: M, source: &str) -> Self {
        media.pause();
        media.set_source(source);
        Self {
            media,
            source: source.to_string(),
            generation: 0,
            attempts: 0,
            pending: None,
            wants_playback: false,
        }
    }

    /// Applies a new "should play" value. Only transitions act, so repeated
    /// calls with the same value are harmless.
    pub fn set_should_play(&mut self, should_play: bool) {
        if should_play {
            if !self.wants_playback {
                self.wants_playback = true;
                self.start();
            }
        } else {
            self.wants_playback = false;
            self.pending = None;
            self.media.pause();
        }
    }

    fn start(&mut self) {
        self.attempts += 1;
        let ticket = PlayTicket {
            generation: self.generation,
            attempt: self.attempts,
        };
        match self.media.play(ticket) {
            PlayRequest::Started => self.pending = None,
            PlayRequest::Pending => self.pending = Some(ticket),
            PlayRequest::Rejected(reason) => {
                // Stays paused until the next visibility or source change
                debug!("play of {} rejected: {reason}", self.source);
                self.pending = None;
            }
        }
    }

    /// Settles a play attempt the host answered with `Pending`.
    pub fn play_settled(&mut self, ticket: PlayTicket, outcome: Result<(), String>) {
        if self.pending != Some(ticket) {
            debug!("stale play attempt {ticket:?} settled");
            if outcome.is_ok() && !self.wants_playback {
                self.media.pause();
            }
            return;
        }
        self.pending = None;
        if let Err(reason) = outcome {
            debug!("play of {} rejected: {reason}", self.source);
        }
    }

    /// Swaps in a new source. Any in-flight attempt for the old one is
    /// superseded before the source is replaced.
    pub fn change_source(&mut self, source: &str, should_play: bool) {
        self.pending = None;
        self.generation += 1;
        self.wants_playback = false;
        self.media.pause();
        self.media.set_source(source);
        self.source = source.to_string();
        self.set_should_play(should_play);
    }

    /// Pauses and rewinds so a reused element never resumes mid-clip.
    pub fn release(&mut self) -> Result<(), HostError> {
        self.wants_playback = false;
        self.pending = None;
        self.media.pause();
        self.media.seek_to_start()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn pending(&self) -> Option<PlayTicket> {
        self.pending
    }

    pub fn media(&self) -> &M {
        &self.media
    }
}
