use super::geometry::{Point, Rect};
use super::mode::Endpoint;

/// Last measured screen positions of the selection endpoints.
///
/// Coordinates are local to the window holding the selection, which may be a
/// subframe. `start` and `end` are visual positions: in RTL text the start is
/// the right edge of the first client rect and the end is the left edge of
/// the last one. Both sit on the bottom edge of their rect.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EndpointCache {
    pub start: Point,
    pub end: Point,
}

impl EndpointCache {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Derive endpoints from the client rects of the first selection range.
    /// Returns `None` when the range has no rects.
    pub fn measure(rects: &[Rect], rtl: bool) -> Option<Self> {
        let first = rects.first()?;
        let last = rects.last()?;

        let start = Point::new(
            if rtl { first.right() } else { first.left() },
            first.bottom(),
        );
        let end = Point::new(
            if rtl { last.left() } else { last.right() },
            last.bottom(),
        );

        Some(Self { start, end })
    }

    pub fn get(&self, endpoint: Endpoint) -> Point {
        match endpoint {
            Endpoint::Start => self.start,
            Endpoint::End => self.end,
        }
    }

    pub fn set(&mut self, endpoint: Endpoint, point: Point) {
        match endpoint {
            Endpoint::Start => self.start = point,
            Endpoint::End => self.end = point,
        }
    }
}
