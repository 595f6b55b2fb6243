//! Visibility and sizing state for the custom scrollbar overlay.

use crate::settings::ScrollbarSettings;
use crate::viewport::{NativeScrollbarSize, ScrollMetrics};

/// Sizing the scrollable viewport needs so native scrollbars can be hidden
/// without clipping content. All fields are CSS sizing expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewStyle {
    pub width: String,
    pub height: String,
    pub padding_right: String,
    pub padding_bottom: String,
}

impl Default for ViewStyle {
    fn default() -> Self {
        Self {
            width: "100%".to_owned(),
            height: "100%".to_owned(),
            padding_right: "0".to_owned(),
            padding_bottom: "0".to_owned(),
        }
    }
}

/// The externally observed record: whether each custom track is shown and
/// what compensating style the viewport carries.
///
/// `display_y` is true only while vertical tracking is enabled and content
/// height exceeds viewport height; symmetric for `display_x`. While the
/// controller is disabled the state is forced to [`ScrollbarState::default`]
/// regardless of measurements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScrollbarState {
    pub view_style: ViewStyle,
    pub display_x: bool,
    pub display_y: bool,
}

/// Maps measurements and configuration to the display/state record.
///
/// Pure and idempotent: equal inputs produce structurally equal output, and
/// there are no observable side effects. When a track is shown and the
/// custom scrollbar reserves layout space (non-overlay), the opposite-edge
/// padding absorbs the hidden native scrollbar's thickness; in overlay mode
/// the padding stays zero. Both axes are computed independently and may be
/// displayed at once.
///
/// The `calc(100% + size)` expansion is applied to width and height alike,
/// whichever axes are tracked, so the viewport is oversized by exactly the
/// native scrollbar thickness on both sides once those bars are hidden.
pub fn compute(
    metrics: &ScrollMetrics,
    settings: &ScrollbarSettings,
    native_size: &NativeScrollbarSize,
) -> ScrollbarState {
    let display_y = settings.track_y && metrics.overflows_y();
    let display_x = settings.track_x && metrics.overflows_x();

    let padding_right = if display_y && !settings.overlay {
        native_size.as_str().to_owned()
    } else {
        "0".to_owned()
    };
    let padding_bottom = if display_x && !settings.overlay {
        native_size.as_str().to_owned()
    } else {
        "0".to_owned()
    };

    let expanded = format!("calc(100% + {native_size})");
    ScrollbarState {
        view_style: ViewStyle {
            width: expanded.clone(),
            height: expanded,
            padding_right,
            padding_bottom,
        },
        display_x,
        display_y,
    }
}
