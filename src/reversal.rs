//! Detects when a dragged handle has crossed the other endpoint.

use crate::model::cache::EndpointCache;
use crate::model::mode::Endpoint;

/// Returns true when the selection endpoints swapped roles during a drag.
///
/// Dragging the start handle past the old end makes the freshly measured end
/// move below (or, on the same line, right of) the cached end. Dragging the
/// end handle before the old start is the mirror case. Nothing can be
/// reversed without a previous measurement or a dragged endpoint.
pub fn is_reversed(
    previous: Option<&EndpointCache>,
    fresh: &EndpointCache,
    dragged: Option<Endpoint>,
) -> bool {
    let (Some(previous), Some(dragged)) = (previous, dragged) else {
        return false;
    };

    match dragged {
        Endpoint::Start => {
            fresh.end.y > previous.end.y
                || (fresh.end.y == previous.end.y && fresh.end.x > previous.end.x)
        }
        Endpoint::End => {
            fresh.start.y < previous.start.y
                || (fresh.start.y == previous.start.y && fresh.start.x < previous.start.x)
        }
    }
}
