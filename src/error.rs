//! Error type for property construction.

/// Errors raised while building a property.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    /// The upstream stream returned from `subscribe` without delivering a value.
    ///
    /// A composed property needs one value to seed its cell; a stream that goes
    /// dormant before that is a broken producer, so construction is refused.
    #[error("{} went dormant without delivering an initial value", describe(.label))]
    NoInitialValue { label: Option<String> },
}

fn describe(label: &Option<String>) -> String {
    match label {
        Some(label) => format!("upstream of `{label}`"),
        None => "upstream stream".to_string(),
    }
}

/// Result alias used by the fallible property constructors.
pub type Result<T> = std::result::Result<T, PropertyError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_without_label() {
        let err = PropertyError::NoInitialValue { label: None };
        assert_eq!(
            err.to_string(),
            "upstream stream went dormant without delivering an initial value"
        );
    }

    #[test]
    fn display_with_label() {
        let err = PropertyError::NoInitialValue {
            label: Some("title".into()),
        };
        assert_eq!(
            err.to_string(),
            "upstream of `title` went dormant without delivering an initial value"
        );
    }
}
