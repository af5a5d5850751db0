//! Turns handle positions into synthetic pointer input.

use crate::dom::{Document, PointerEvent, PointerKind, SelectionChange};
use crate::error::DocumentError;
use crate::model::config::InputConfig;
use crate::model::context::SelectionContext;
use crate::model::geometry::Point;
use crate::model::mode::Mode;

/// Send a pointer-down/up pair at `point`, shift-extending when `extend`.
///
/// In cursor mode the point is first clamped into the editable field, and
/// the field is scrolled toward any edge the point overshot. In selection
/// mode the point is nudged up by `line_bias` so the click does not land on
/// the line below a handle that sits on a glyph's bottom edge.
pub fn click<D: Document>(
    document: &mut D,
    mode: Mode,
    context: &SelectionContext,
    point: Point,
    extend: bool,
    input: &InputConfig,
) -> Result<Vec<SelectionChange>, DocumentError> {
    let point = match mode {
        Mode::Cursor => clamp_to_field(document, context, point, input)?,
        Mode::Selection => Point::new(point.x, point.y - input.line_bias),
        Mode::None => point,
    };

    let mut changes = document.dispatch_pointer(PointerEvent {
        kind: PointerKind::Down,
        point,
        shift: extend,
    })?;
    changes.extend(document.dispatch_pointer(PointerEvent {
        kind: PointerKind::Up,
        point,
        shift: extend,
    })?);

    Ok(changes)
}

fn clamp_to_field<D: Document>(
    document: &mut D,
    context: &SelectionContext,
    point: Point,
    input: &InputConfig,
) -> Result<Point, DocumentError> {
    let text = document.text_bounds(context.target)?;
    let editor = document.editor_rect(context.target)?;
    let rect = text.restrict_to(&editor);
    let scope = context.scope;
    let inset = input.field_edge_inset;

    // Clicking exactly on the top or bottom edge jumps the caret to the
    // start or end of the field.
    let mut clamped = point;
    if clamped.y < rect.top() + inset {
        clamped.y = rect.top() + inset;
        document.scroll_line(scope, false)?;
    } else if clamped.y > rect.bottom() - inset {
        clamped.y = rect.bottom() - inset;
        document.scroll_line(scope, true)?;
    }

    if clamped.x < rect.left() {
        clamped.x = rect.left();
        document.scroll_character(scope, false)?;
    } else if clamped.x > rect.right() {
        clamped.x = rect.right();
        document.scroll_character(scope, true)?;
    }

    Ok(clamped)
}
