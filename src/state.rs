#[derive(Debug, PartialEq, Clone, Copy)]
pub enum RotationState {
    Idle,                            // Nothing scheduled
    PendingAdvance { elapsed: f32 }, // Clip ended, waiting out the debounce
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum FadePhase {
    Opaque,    // Media surface fully shown
    FadingOut, // Rotation pending, surface going dark
    Hidden,    // Source swapped, waiting for the new media to load
    FadingIn,  // Coming back up to full opacity
}
