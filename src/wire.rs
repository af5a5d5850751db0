//! JSON message shapes exchanged with the host UI.

use serde::{Deserialize, Serialize};

use crate::model::mode::HandleType;

/// One handle's absolute position, in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandleDescriptor {
    pub handle: HandleType,
    pub left: f64,
    pub top: f64,
    pub hidden: bool,
}

/// Payload of a position-handles request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub positions: Vec<HandleDescriptor>,
    pub rtl: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastDuration {
    Short,
    Long,
}

/// Requests sent to the host UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutboundMessage {
    #[serde(rename = "TextSelection:ShowHandles")]
    ShowHandles { handles: Vec<HandleType> },
    #[serde(rename = "TextSelection:HideHandles")]
    HideHandles,
    #[serde(rename = "TextSelection:PositionHandles")]
    PositionHandles(PositionUpdate),
    #[serde(rename = "Clipboard:Copy")]
    CopyText { text: String },
    #[serde(rename = "Share:Text")]
    ShareText { text: String },
    #[serde(rename = "Toast:Show")]
    Toast {
        message: String,
        duration: ToastDuration,
    },
}

/// Point payload of taps and drags.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointPayload {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "handleType", default, skip_serializing_if = "Option::is_none")]
    pub handle_type: Option<HandleType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandlePayload {
    #[serde(rename = "handleType")]
    pub handle_type: HandleType,
}

/// Events and commands received from the host UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InboundMessage {
    #[serde(rename = "Gesture:SingleTap")]
    SingleTap(PointPayload),
    #[serde(rename = "Window:Resize")]
    WindowResize,
    #[serde(rename = "Tab:Selected")]
    TabSelected,
    #[serde(rename = "after-viewport-change")]
    ViewportChange,
    #[serde(rename = "TextSelection:Move")]
    HandleMove(PointPayload),
    #[serde(rename = "TextSelection:Position")]
    HandlePosition(HandlePayload),
    #[serde(rename = "TextSelection:Start")]
    StartSelection(PointPayload),
    #[serde(rename = "TextSelection:SelectAll")]
    SelectAll(PointPayload),
    #[serde(rename = "TextSelection:ShowCursor")]
    ShowCursor(PointPayload),
    #[serde(rename = "TextSelection:Copy")]
    Copy,
    #[serde(rename = "TextSelection:Share")]
    Share,
    #[serde(rename = "TextSelection:Close")]
    Close,
    #[serde(rename = "Subframe:Scrolled")]
    SubframeScrolled(PointPayload),
    #[serde(rename = "Window:KeyDown")]
    KeyDown,
    #[serde(rename = "Window:Blur")]
    Blur,
    #[serde(rename = "Window:PageHide")]
    PageHide,
    #[serde(rename = "Window:CompositionEnd")]
    CompositionEnd,
}
