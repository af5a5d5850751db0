//! Drives a handler over the headless document from wire messages.

use crate::dom::ElementId;
use crate::handler::SelectionHandler;
use crate::model::geometry::Point;
use crate::msg::Msg;
use crate::shell::HandleShell;
use crate::sim::SimDocument;
use crate::wire::{InboundMessage, PointPayload};

pub type ReplayHandler<S> = SelectionHandler<SimDocument, S>;

fn point(payload: &PointPayload) -> Point {
    Point::new(payload.x, payload.y)
}

/// Apply one inbound message. Commands that name a point act on the
/// element under it; a point over nothing is logged and skipped.
pub fn apply<S: HandleShell>(handler: &mut ReplayHandler<S>, message: InboundMessage) {
    tracing::debug!(?message, "inbound");
    match message {
        InboundMessage::SingleTap(p) => handler.update(Msg::SingleTap(point(&p))),
        InboundMessage::WindowResize => handler.update(Msg::WindowResize),
        InboundMessage::TabSelected => handler.update(Msg::TabSelected),
        InboundMessage::ViewportChange => handler.update(Msg::ViewportChanged),
        InboundMessage::HandleMove(p) => match p.handle_type {
            Some(handle) => handler.update(Msg::HandleMove {
                handle,
                point: point(&p),
            }),
            None => tracing::warn!("handle move without a handle type"),
        },
        InboundMessage::HandlePosition(h) => handler.update(Msg::HandleRelease(h.handle_type)),
        InboundMessage::StartSelection(p) => {
            let at = point(&p);
            if let Some(element) = element_at(handler, at) {
                let started = handler.begin_selection(element, at);
                tracing::info!(started, "start selection");
            }
        }
        InboundMessage::SelectAll(p) => {
            let at = point(&p);
            if let Some(element) = element_at(handler, at) {
                handler.select_all(element, at);
            }
        }
        InboundMessage::ShowCursor(p) => {
            if let Some(element) = element_at(handler, point(&p)) {
                handler.begin_cursor(element);
            }
        }
        InboundMessage::Copy => handler.copy_selection(),
        InboundMessage::Share => handler.share_selection(),
        InboundMessage::Close => handler.close_selection(),
        InboundMessage::SubframeScrolled(p) => {
            if let Some(element) = element_at(handler, point(&p)) {
                handler.update(Msg::SubframeScrolled(element));
            }
        }
        InboundMessage::KeyDown => handler.update(Msg::KeyDown),
        InboundMessage::Blur => handler.update(Msg::Blur),
        InboundMessage::PageHide => handler.update(Msg::PageHide),
        InboundMessage::CompositionEnd => handler.update(Msg::CompositionEnd),
    }
}

fn element_at<S: HandleShell>(
    handler: &ReplayHandler<S>,
    at: Point,
) -> Option<ElementId> {
    let element = handler.document().element_at(at);
    if element.is_none() {
        tracing::warn!(x = at.x, y = at.y, "no element at point");
    }
    element
}
