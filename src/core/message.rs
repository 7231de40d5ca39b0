use std::collections::HashMap;

use log::debug;

/// Translates error codes into human-readable messages.
///
/// Implementations must return exactly one message per code, in order.
pub trait MessageSource {
    fn message(&self, code: &str) -> String;

    fn messages(&self, codes: &[String]) -> Vec<String> {
        codes.iter().map(|code| self.message(code)).collect()
    }
}

impl<M: MessageSource + ?Sized> MessageSource for &M {
    fn message(&self, code: &str) -> String {
        (**self).message(code)
    }

    fn messages(&self, codes: &[String]) -> Vec<String> {
        (**self).messages(codes)
    }
}

/// In-memory message catalog. Codes without a translation map to themselves.
///
/// # Examples
///
/// ```
/// use warehouse_csv::core::message::{MessageCatalog, MessageSource};
///
/// let catalog = MessageCatalog::from_properties(
///     "# import errors\nsalePrice.empty=Sale Price is Empty\n",
/// );
/// let codes = vec!["salePrice.empty".to_string(), "name.empty".to_string()];
/// assert_eq!(catalog.messages(&codes), vec!["Sale Price is Empty", "name.empty"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageCatalog {
    messages: HashMap<String, String>,
}

impl MessageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: impl Into<String>, message: impl Into<String>) {
        self.messages.insert(code.into(), message.into());
    }

    /// Loads a flat JSON object of code → message.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let messages: HashMap<String, String> = serde_json::from_str(json)?;
        debug!("Loaded {} messages from json", messages.len());
        Ok(MessageCatalog { messages })
    }

    /// Loads `code=message` lines. Blank lines and lines starting with `#` or `!` are
    /// ignored, as are lines without a separator.
    pub fn from_properties(text: &str) -> Self {
        let messages: HashMap<String, String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with(['#', '!']))
            .filter_map(|line| line.split_once(['=', ':']))
            .map(|(code, message)| (code.trim().to_string(), message.trim().to_string()))
            .collect();
        debug!("Loaded {} messages from properties", messages.len());
        MessageCatalog { messages }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl MessageSource for MessageCatalog {
    fn message(&self, code: &str) -> String {
        self.messages
            .get(code)
            .cloned()
            .unwrap_or_else(|| code.to_string())
    }
}
