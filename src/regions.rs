//! Per-frame hit-test table for pointer routing.
//!
//! Rendering claims rectangles in paint order; the most recent claim is the
//! topmost one. The table is cleared at the start of every frame, so a
//! component that stops rendering stops receiving hits on the next frame.

use ratatui::layout::{Position, Rect};

/// A claimed rectangle and whoever owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region<O> {
    pub rect: Rect,
    pub owner: O,
}

impl<O> Region<O> {
    /// Translate an absolute position into coordinates local to this region.
    pub fn local(&self, at: Position) -> Position {
        Position {
            x: at.x.saturating_sub(self.rect.x),
            y: at.y.saturating_sub(self.rect.y),
        }
    }
}

/// Regions claimed during the current render pass, in paint order.
#[derive(Debug, Clone)]
pub struct RegionClaimRegistry<O> {
    regions: Vec<Region<O>>,
}

impl<O> Default for RegionClaimRegistry<O> {
    fn default() -> Self {
        RegionClaimRegistry {
            regions: Vec::new(),
        }
    }
}

impl<O> RegionClaimRegistry<O> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every claim. Called once at the start of each frame.
    pub fn clear(&mut self) {
        self.regions.clear();
    }

    /// Record a claim painted above everything claimed so far.
    /// Empty rectangles can never be hit and are not recorded.
    pub fn claim(&mut self, rect: Rect, owner: O) {
        if rect.width == 0 || rect.height == 0 {
            return;
        }
        self.regions.push(Region { rect, owner });
    }

    /// Owner of the topmost region containing `at`.
    pub fn hit_test(&self, at: Position) -> Option<&O> {
        self.hit(at).map(|region| &region.owner)
    }

    /// Topmost region containing `at`.
    pub fn hit(&self, at: Position) -> Option<&Region<O>> {
        self.regions.iter().rev().find(|region| contains(region.rect, at))
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

fn contains(rect: Rect, at: Position) -> bool {
    at.x >= rect.x
        && at.y >= rect.y
        && u32::from(at.x) < u32::from(rect.x) + u32::from(rect.width)
        && u32::from(at.y) < u32::from(rect.y) + u32::from(rect.height)
}

// ============================================================================
// TESTS
// ============================================================================
