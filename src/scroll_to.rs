//! Delegation boundary to the external smooth-scroll engine.
//!
//! The controller holds no easing math or scroll primitives of its own: each
//! programmatic scroll operation is packaged into a [`ScrollRequest`] and
//! forwarded verbatim, and the engine's completion signal is returned
//! unchanged. This keeps the public surface stable if the engine's own
//! interface evolves.

use std::time::Duration;

use thiserror::Error;

use crate::easing::TimingFunction;
use crate::reactive::ReadSignal;

/// Completion signal for a delegated scroll: resolves to `true` when the
/// engine finishes the animation.
pub type Completion = ReadSignal<bool>;

/// Viewport edge for edge-targeted scrolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollEdge {
    Top,
    Bottom,
    Left,
    Right,
}

/// What a delegated scroll should reach.
#[derive(Debug, Clone, PartialEq)]
pub enum ScrollTarget {
    /// Absolute content offset in CSS pixels.
    Position { x: f32, y: f32 },
    /// First element matching a selector inside the viewport.
    Element(String),
    /// One edge of the content on either axis.
    Edge(ScrollEdge),
}

/// The request handed to the engine: target plus fully resolved duration and
/// easing (defaults already applied by the controller).
#[derive(Debug, Clone)]
pub struct ScrollRequest {
    pub target: ScrollTarget,
    pub duration: Duration,
    pub easing: TimingFunction,
}

/// Per-call overrides for a delegated scroll. Unset fields fall back to the
/// attachment settings (`scroll_to_duration`) and [`TimingFunction::default`].
#[derive(Debug, Clone, Default)]
pub struct ScrollOptions {
    pub duration: Option<Duration>,
    pub easing: Option<TimingFunction>,
}

impl ScrollOptions {
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn easing(mut self, easing: TimingFunction) -> Self {
        self.easing = Some(easing);
        self
    }
}

/// Smooth-scroll engine interface.
pub trait ScrollEngine {
    fn scroll_to(&mut self, request: ScrollRequest) -> Result<Completion, ScrollError>;
}

#[derive(Debug, Error)]
pub enum ScrollError {
    /// The selector of a [`ScrollTarget::Element`] matched nothing.
    #[error("no element matches selector `{0}`")]
    NoSuchElement(String),
    /// No smooth-scroll engine was attached to the controller.
    #[error("no smooth-scroll engine attached")]
    EngineUnavailable,
    /// The animation was cancelled before reaching its target.
    #[error("scroll animation interrupted")]
    Interrupted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_default_to_unset() {
        let options = ScrollOptions::default();
        assert!(options.duration.is_none());
        assert!(options.easing.is_none());
    }

    #[test]
    fn error_messages_name_the_selector() {
        let err = ScrollError::NoSuchElement("#missing".to_owned());
        assert_eq!(err.to_string(), "no element matches selector `#missing`");
    }
}
