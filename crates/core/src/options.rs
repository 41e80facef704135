//! Annotator options and shallow merging
//!
//! Options are merged, never replaced: a patch only overrides the keys it
//! carries. Keys the annotator does not interpret ride along in `extra` so
//! host layers can round-trip their own settings through the same object.

use std::collections::BTreeMap;

/// Default overlay thickness in pixels.
pub const DEFAULT_HEIGHT: f32 = 5.0;

/// Default overlay opacity.
pub const DEFAULT_OPACITY: f32 = 0.9;

/// Effective annotator options
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnnotatorOptions {
    /// Overlay thickness in pixels.
    pub height: f32,

    /// Overlay opacity, 0.0 (transparent) to 1.0 (opaque).
    pub opacity: f32,

    /// Uninterpreted keys, preserved across merges.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for AnnotatorOptions {
    fn default() -> Self {
        Self {
            height: DEFAULT_HEIGHT,
            opacity: DEFAULT_OPACITY,
            extra: BTreeMap::new(),
        }
    }
}

impl AnnotatorOptions {
    /// Create options with the default height and opacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shallow-merge a patch into these options.
    ///
    /// Keys absent from the patch keep their current values; extra keys are
    /// inserted or overwritten individually.
    pub fn merge(&mut self, patch: &OptionsPatch) {
        if let Some(height) = patch.height {
            self.height = height;
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = opacity;
        }
        for (key, value) in &patch.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }
}

/// Partial options for [`AnnotatorOptions::merge`]
///
/// # Example
///
/// ```
/// use overmark_core::options::{AnnotatorOptions, OptionsPatch};
///
/// let mut options = AnnotatorOptions::default();
/// options.merge(&OptionsPatch::new().with_opacity(0.5));
///
/// assert_eq!(options.opacity, 0.5);
/// assert_eq!(options.height, 5.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OptionsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl OptionsPatch {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the overlay thickness.
    pub fn with_height(mut self, height: f32) -> Self {
        self.height = Some(height);
        self
    }

    /// Set the overlay opacity.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    /// Attach a key the annotator does not interpret.
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}
