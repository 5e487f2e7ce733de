//! Construction options for composed properties.

// ---------------------------------------------------------------------------
// ComposeConfig
// ---------------------------------------------------------------------------

/// Configuration for a property composed from a stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeConfig {
    /// Optional name used in log events and construction errors.
    pub label: Option<String>,
}

impl ComposeConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the label (builder).
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label for log output; `"<unnamed>"` when none was set.
    pub(crate) fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or("<unnamed>")
    }
}
