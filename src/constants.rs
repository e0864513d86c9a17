pub const FPS: u32 = 60;                         // Frames per second
pub const FRAME_TIME: f32 = 1.0 / FPS as f32;    // Time per frame (seconds)

pub const ROTATION_DEBOUNCE: f32 = 0.8;          // From "clip ended" to the advance (seconds)
pub const FADE_DURATION: f32 = 0.8;              // Media surface fade out / in (seconds)
pub const SWAP_DELAY: f32 = 0.2;                 // Hidden hold after a source swap (seconds)
pub const VIEWPORT_THRESHOLD: f32 = 0.25;        // Visible fraction that counts as in viewport
pub const REVEAL_START: f32 = 0.8;               // Reveal line, fraction of viewport height

pub const DEFAULT_CLIP_LENGTH: f32 = 4.0;        // Simulated clip length (seconds)

pub const MEDIA_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "png", "jpg", "jpeg", "bmp", "gif"];
