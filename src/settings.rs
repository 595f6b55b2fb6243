//! Configuration for a scrollbar controller attachment.

use std::time::Duration;

/// Environment viewport-size descriptor that force-disables custom scrollbars
/// while it matches (e.g. small screens). The query text is opaque to the
/// controller; the breakpoint matcher interprets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    query: String,
}

impl Breakpoint {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

/// Controller configuration, fixed for the lifetime of an attachment.
///
/// The one exception is the disabled flag:
/// [`ScrollbarController::set_disabled`] drives an enable/disable transition
/// at any time. Everything else is read once when the controller is attached.
///
/// [`ScrollbarController::set_disabled`]: crate::controller::ScrollbarController::set_disabled
#[derive(Debug, Clone)]
pub struct ScrollbarSettings {
    /// Track horizontal overflow with a custom indicator.
    pub track_x: bool,
    /// Track vertical overflow with a custom indicator.
    pub track_y: bool,
    /// Hide tracks while the viewport is idle (consumed by renderers).
    pub auto_hide: bool,
    /// Recompute on content mutations, when the environment supports
    /// observation.
    pub auto_update: bool,
    /// Float the custom tracks over content instead of reserving layout
    /// space; suppresses the compensating padding.
    pub overlay: bool,
    /// Default duration for delegated scroll-to operations.
    pub scroll_to_duration: Duration,
    /// Breakpoints that force-disable custom scrollbars while matched.
    pub breakpoints: Vec<Breakpoint>,
    /// Start disabled.
    pub disabled: bool,
}

impl Default for ScrollbarSettings {
    fn default() -> Self {
        Self {
            track_x: false,
            track_y: true,
            auto_hide: false,
            auto_update: true,
            overlay: false,
            scroll_to_duration: Duration::from_millis(300),
            breakpoints: Vec::new(),
            disabled: false,
        }
    }
}

impl ScrollbarSettings {
    pub fn builder() -> ScrollbarSettingsBuilder {
        ScrollbarSettingsBuilder::new()
    }
}

/// Builder for customizing controller settings.
#[derive(Default)]
pub struct ScrollbarSettingsBuilder {
    settings: ScrollbarSettings,
}

impl ScrollbarSettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track_x(mut self, track: bool) -> Self {
        self.settings.track_x = track;
        self
    }

    pub fn track_y(mut self, track: bool) -> Self {
        self.settings.track_y = track;
        self
    }

    pub fn auto_hide(mut self, auto_hide: bool) -> Self {
        self.settings.auto_hide = auto_hide;
        self
    }

    pub fn auto_update(mut self, auto_update: bool) -> Self {
        self.settings.auto_update = auto_update;
        self
    }

    /// Float the custom tracks over content (no reserved gutter space).
    pub fn overlay(mut self, overlay: bool) -> Self {
        self.settings.overlay = overlay;
        self
    }

    pub fn scroll_to_duration(mut self, duration: Duration) -> Self {
        self.settings.scroll_to_duration = duration;
        self
    }

    /// Add one breakpoint that force-disables custom scrollbars.
    pub fn breakpoint(mut self, breakpoint: Breakpoint) -> Self {
        self.settings.breakpoints.push(breakpoint);
        self
    }

    pub fn breakpoints(mut self, breakpoints: Vec<Breakpoint>) -> Self {
        self.settings.breakpoints = breakpoints;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.settings.disabled = disabled;
        self
    }

    pub fn build(self) -> ScrollbarSettings {
        self.settings
    }
}
