//! Controller configuration.
//!
//! Options deserialize from JSON; every field is optional and falls back to its default.
//!
//! ```rust
//! use source_view::SourceViewOptions;
//! use std::time::Duration;
//!
//! let options = SourceViewOptions::from_json_str(r#"{ "autocomplete_delay_ms": 25 }"#).unwrap();
//! assert_eq!(options.autocomplete_delay(), Duration::from_millis(25));
//! assert_eq!(options.execution_marker_class, "debug-point-hit");
//! ```

use crate::error::OptionsError;
use regex::Regex;
use serde::Deserialize;
use source_view_core::{Platform, UndoHistory};
use std::time::Duration;

/// Default pattern for characters that open the completion popup.
pub const DEFAULT_AUTOCOMPLETE_TRIGGER: &str = r"^[\w.@:]$";

/// Default CSS-like class of the execution marker.
pub const DEFAULT_EXECUTION_MARKER_CLASS: &str = "debug-point-hit";

/// Tunables of a [`crate::SourceView`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SourceViewOptions {
    /// Debounce before a triggered autocompletion opens, in milliseconds.
    pub autocomplete_delay_ms: u64,
    /// Single inserted characters matching this pattern trigger autocompletion.
    pub autocomplete_trigger: String,
    /// Which shortcut of each command descriptor is bound.
    pub platform: Platform,
    /// Maximum retained undo steps.
    pub undo_limit: usize,
    /// Class of the execution marker.
    pub execution_marker_class: String,
}

impl Default for SourceViewOptions {
    fn default() -> Self {
        Self {
            autocomplete_delay_ms: 10,
            autocomplete_trigger: DEFAULT_AUTOCOMPLETE_TRIGGER.to_string(),
            platform: Platform::current(),
            undo_limit: UndoHistory::DEFAULT_LIMIT,
            execution_marker_class: DEFAULT_EXECUTION_MARKER_CLASS.to_string(),
        }
    }
}

impl SourceViewOptions {
    /// Parse and validate options from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, OptionsError> {
        let options: Self = serde_json::from_str(json)?;
        options.trigger_pattern()?;
        Ok(options)
    }

    /// Same options for another platform.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Same options with another autocompletion debounce.
    pub fn with_autocomplete_delay(mut self, delay: Duration) -> Self {
        self.autocomplete_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Autocompletion debounce.
    pub fn autocomplete_delay(&self) -> Duration {
        Duration::from_millis(self.autocomplete_delay_ms)
    }

    /// Compile the autocomplete trigger pattern.
    pub fn trigger_pattern(&self) -> Result<Regex, OptionsError> {
        Ok(Regex::new(&self.autocomplete_trigger)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = SourceViewOptions::default();
        assert_eq!(options.autocomplete_delay(), Duration::from_millis(10));
        assert_eq!(options.undo_limit, 1000);

        let pattern = options.trigger_pattern().unwrap();
        for accepted in ["a", "Z", "_", "7", ".", "@", ":"] {
            assert!(pattern.is_match(accepted), "{accepted}");
        }
        for rejected in [" ", "(", ";", "ab", ""] {
            assert!(!pattern.is_match(rejected), "{rejected:?}");
        }
    }

    #[test]
    fn test_json_overrides() {
        let options =
            SourceViewOptions::from_json_str(r#"{ "platform": "mac", "undo_limit": 5 }"#).unwrap();
        assert_eq!(options.platform, Platform::Mac);
        assert_eq!(options.undo_limit, 5);
        assert_eq!(options.autocomplete_trigger, DEFAULT_AUTOCOMPLETE_TRIGGER);
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = SourceViewOptions::from_json_str(r#"{ "autocomplete_trigger": "[" }"#)
            .unwrap_err();
        assert!(matches!(err, OptionsError::Pattern(_)));
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let err = SourceViewOptions::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, OptionsError::Json(_)));
    }
}
