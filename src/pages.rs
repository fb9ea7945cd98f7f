// src/pages.rs
//
// The fixed set of display pages and the round-robin rotation through
// them. No per-page memory beyond the index.

/// A display page. The panel cycles through these in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    Arrivals,
    Schedule,
}

pub const PAGE_MODES: [PageMode; 2] = [PageMode::Arrivals, PageMode::Schedule];

/// Strict round-robin over `PAGE_MODES`.
#[derive(Debug, Default)]
pub struct PageRotation {
    index: usize,
}

impl PageRotation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> PageMode {
        PAGE_MODES[self.index]
    }

    pub fn advance(&mut self) {
        self.index = (self.index + 1) % PAGE_MODES.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_wraps_to_first() {
        let mut rotation = PageRotation::new();
        assert_eq!(rotation.current(), PageMode::Arrivals);
        rotation.advance();
        assert_eq!(rotation.current(), PageMode::Schedule);
        rotation.advance();
        assert_eq!(rotation.current(), PageMode::Arrivals);
    }
}
