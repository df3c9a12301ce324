/// Navbar shadow strength
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shadow {
    Subtle,
    Pronounced,
}

/// Pronounced strictly above `threshold`, subtle otherwise. No hysteresis.
pub fn shadow_for(offset: u16, threshold: u16) -> Shadow {
    if offset > threshold {
        Shadow::Pronounced
    } else {
        Shadow::Subtle
    }
}
