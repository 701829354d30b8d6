//! Pass and printer options.

use serde::{Deserialize, Serialize};

/// Printer options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrintOptions {
    /// Trim surrounding whitespace from every text node and omit the
    /// trailing newline
    pub trim: bool,
}

impl PrintOptions {
    pub const TRIM: Self = Self { trim: true };
}

/// Expression pass options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExpressOptions {
    /// HTML-escape evaluated text and attribute values
    pub escape: bool,
}

impl Default for ExpressOptions {
    fn default() -> Self {
        Self { escape: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        assert!(!PrintOptions::default().trim);
        assert!(ExpressOptions::default().escape);
    }

    #[test]
    fn test_deserialize_partial() {
        let print: PrintOptions = serde_json::from_str(r#"{"trim": true}"#).unwrap();
        assert!(print.trim);
        let express: ExpressOptions = serde_json::from_str("{}").unwrap();
        assert!(express.escape);
    }
}
