use crate::dom::{ElementId, SelectionScope, WindowId};
use crate::listeners::Subscriptions;

use super::cache::EndpointCache;

/// Non-owning references to the window and element a session targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionContext {
    pub window: WindowId,
    pub target: ElementId,
    pub scope: SelectionScope,
}

/// State of the synthetic-collapse guard.
///
/// A synthesized pointer-down collapses the selection before the follow-up
/// event re-expands it. The first collapse caused by a pointer-down moves
/// the guard to `AwaitingResolution`; the next notification resolves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollapseGuard {
    #[default]
    Idle,
    AwaitingResolution,
}

/// Everything that lives exactly as long as one cursor or selection session.
#[derive(Debug)]
pub struct Session {
    pub context: SelectionContext,
    pub rtl: bool,
    /// Present once the first measurement succeeded; selection mode only.
    pub cache: Option<EndpointCache>,
    pub subscriptions: Subscriptions,
    /// Whether the selection-change listener is registered on `context.scope`.
    pub selection_listener: bool,
}

impl Session {
    pub fn new(context: SelectionContext, rtl: bool) -> Self {
        Self {
            context,
            rtl,
            cache: None,
            subscriptions: Subscriptions::default(),
            selection_listener: false,
        }
    }
}
