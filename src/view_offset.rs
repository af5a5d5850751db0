//! Offset of a (possibly nested) window relative to the top-level viewport.

use crate::dom::{Document, WindowId};
use crate::error::DocumentError;
use crate::model::geometry::Point;

/// Sum the client-rect origins of every frame element between `window` and
/// the top-level window.
///
/// Intermediate frames scroll independently, so callers recompute this on
/// every use.
pub fn view_offset<D: Document + ?Sized>(
    document: &D,
    window: WindowId,
) -> Result<Point, DocumentError> {
    let mut offset = Point::ZERO;
    let mut current = window;

    while let Some(frame) = document.frame_element(current)? {
        let rect = document.bounding_client_rect(frame)?;
        offset.x += rect.left();
        offset.y += rect.top();

        current = document
            .parent_window(current)?
            .ok_or(DocumentError::WindowGone)?;
    }

    Ok(offset)
}
