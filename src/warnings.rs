//! Run warnings.
//!
//! Problems that do not stop a run (an unreadable bundle, an unknown chunk,
//! a module left out of a tree) are collected here and handed back to the
//! caller with the results.

use tracing::warn;

/// Warnings collected during a run.
///
/// Each warning is logged as it is pushed and kept for the caller.
#[derive(Debug, Clone, Default)]
pub struct Warnings {
    messages: Vec<String>,
}

impl Warnings {
    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.messages.push(message);
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_order() {
        let mut warnings = Warnings::default();
        assert!(warnings.is_empty());

        warnings.push("first");
        warnings.push(format!("second {}", 2));

        assert_eq!(warnings.messages(), ["first", "second 2"]);
        assert_eq!(warnings.into_messages(), vec!["first", "second 2"]);
    }
}
