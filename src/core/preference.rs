use std::borrow::Cow;

use csv::Terminator;
use serde::{Deserialize, Serialize};

/// Characters that make a spreadsheet application treat a cell as a formula.
const FORMULA_TRIGGERS: [char; 4] = ['=', '+', '-', '@'];

/// Line terminator written after every exported row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineTerminator {
    Crlf,
    Lf,
    Cr,
}

impl LineTerminator {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineTerminator::Crlf => "\r\n",
            LineTerminator::Lf => "\n",
            LineTerminator::Cr => "\r",
        }
    }

    pub(crate) fn to_csv(self) -> Terminator {
        match self {
            LineTerminator::Crlf => Terminator::CRLF,
            LineTerminator::Lf => Terminator::Any(b'\n'),
            LineTerminator::Cr => Terminator::Any(b'\r'),
        }
    }
}

/// Encoder applied to every cell on its way out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellEncoder {
    /// Quote cells holding the delimiter, the quote character or a line break.
    #[default]
    Default,
    /// [`CellEncoder::Default`] followed by stripping of a leading formula trigger run.
    EscapeFormula,
}

impl CellEncoder {
    /// Encodes a single cell into the exact text written between delimiters.
    ///
    /// # Examples
    ///
    /// ```
    /// use warehouse_csv::core::preference::{CellEncoder, Preference};
    ///
    /// let pref = Preference::standard();
    /// assert_eq!(CellEncoder::Default.encode("a,b", &pref), "\"a,b\"");
    /// assert_eq!(CellEncoder::EscapeFormula.encode("=SUM(A1)", &pref), "SUM(A1)");
    /// assert_eq!(CellEncoder::EscapeFormula.encode("@x,y", &pref), "\"x,y\"");
    /// ```
    pub fn encode<'a>(&self, cell: &'a str, preference: &Preference) -> Cow<'a, str> {
        let encoded = quote_cell(cell, preference);
        match self {
            CellEncoder::Default => encoded,
            CellEncoder::EscapeFormula => escape_formula(encoded, preference.quote_char()),
        }
    }
}

fn quote_cell<'a>(cell: &'a str, preference: &Preference) -> Cow<'a, str> {
    let delimiter = preference.delimiter_char();
    let quote = preference.quote_char();
    let needs_quotes = cell
        .chars()
        .any(|c| c == delimiter || c == quote || c == '\r' || c == '\n');
    if !needs_quotes {
        return Cow::Borrowed(cell);
    }

    let eol = preference.terminator.as_str();
    let mut encoded = String::with_capacity(cell.len() + 2);
    encoded.push(quote);
    let mut chars = cell.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            c if c == quote => {
                encoded.push(quote);
                encoded.push(quote);
            }
            '\r' => {
                chars.next_if_eq(&'\n');
                encoded.push_str(eol);
            }
            '\n' => encoded.push_str(eol),
            c => encoded.push(c),
        }
    }
    encoded.push(quote);
    Cow::Owned(encoded)
}

/// Strips a leading run of `=`, `+`, `-`, `@` from an already encoded cell, then the same
/// run following a leading quote character.
pub fn escape_formula(encoded: Cow<'_, str>, quote: char) -> Cow<'_, str> {
    let run = trigger_run_len(&encoded);
    let encoded = if run == 0 {
        encoded
    } else {
        Cow::Owned(encoded[run..].to_owned())
    };

    if !encoded.starts_with(quote) {
        return encoded;
    }
    let body = &encoded[quote.len_utf8()..];
    let run = trigger_run_len(body);
    if run == 0 {
        encoded
    } else {
        Cow::Owned(format!("{quote}{}", &body[run..]))
    }
}

fn trigger_run_len(text: &str) -> usize {
    text.len() - text.trim_start_matches(&FORMULA_TRIGGERS[..]).len()
}

/// CSV dialect: delimiter, quote character, line terminator and cell encoder.
///
/// Preferences are plain values. Two presets exist, [`Preference::standard`] and
/// [`Preference::tab`]; anything else is built with [`PreferenceBuilder`] or loaded from
/// JSON.
///
/// # Examples
///
/// ```
/// use warehouse_csv::core::preference::{CellEncoder, LineTerminator, Preference};
///
/// let json = r#"{ "delimiter": ";", "quote": "'", "terminator": "lf" }"#;
/// let pref = Preference::from_json(json).unwrap();
/// assert_eq!(pref.delimiter, b';');
/// assert_eq!(pref.terminator, LineTerminator::Lf);
/// assert_eq!(pref.encoder, CellEncoder::Default);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    #[serde(with = "ascii_char")]
    pub delimiter: u8,
    #[serde(with = "ascii_char")]
    pub quote: u8,
    pub terminator: LineTerminator,
    #[serde(default)]
    pub encoder: CellEncoder,
    /// Trim surrounding whitespace of every cell while reading.
    #[serde(default)]
    pub ignore_surrounding_spaces: bool,
}

impl Default for Preference {
    fn default() -> Self {
        Preference::standard()
    }
}

impl Preference {
    /// Comma delimited, double quoted, CRLF terminated.
    pub const fn standard() -> Self {
        Preference {
            delimiter: b',',
            quote: b'"',
            terminator: LineTerminator::Crlf,
            encoder: CellEncoder::Default,
            ignore_surrounding_spaces: false,
        }
    }

    /// Tab delimited, double quoted, LF terminated.
    pub const fn tab() -> Self {
        Preference {
            delimiter: b'\t',
            quote: b'"',
            terminator: LineTerminator::Lf,
            encoder: CellEncoder::Default,
            ignore_surrounding_spaces: false,
        }
    }

    /// Same dialect with another cell encoder.
    pub const fn with_encoder(self, encoder: CellEncoder) -> Self {
        Preference { encoder, ..self }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn delimiter_char(&self) -> char {
        char::from(self.delimiter)
    }

    pub fn quote_char(&self) -> char {
        char::from(self.quote)
    }

    pub fn encode<'a>(&self, cell: &'a str) -> Cow<'a, str> {
        self.encoder.encode(cell, self)
    }
}

/// Builder for a [`Preference`], starting from the standard dialect.
///
/// # Examples
///
/// ```
/// use warehouse_csv::core::preference::{LineTerminator, PreferenceBuilder};
///
/// let pref = PreferenceBuilder::new()
///     .delimiter(b';')
///     .terminator(LineTerminator::Lf)
///     .build();
/// assert_eq!(pref.delimiter, b';');
/// assert_eq!(pref.quote, b'"');
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PreferenceBuilder {
    preference: Preference,
}

impl Default for PreferenceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceBuilder {
    pub fn new() -> Self {
        Self::from_preference(Preference::standard())
    }

    pub fn from_preference(preference: Preference) -> Self {
        PreferenceBuilder { preference }
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.preference.delimiter = delimiter;
        self
    }

    pub fn quote(mut self, quote: u8) -> Self {
        self.preference.quote = quote;
        self
    }

    pub fn terminator(mut self, terminator: LineTerminator) -> Self {
        self.preference.terminator = terminator;
        self
    }

    pub fn encoder(mut self, encoder: CellEncoder) -> Self {
        self.preference.encoder = encoder;
        self
    }

    pub fn ignore_surrounding_spaces(mut self, yes: bool) -> Self {
        self.preference.ignore_surrounding_spaces = yes;
        self
    }

    pub fn build(self) -> Preference {
        self.preference
    }
}

/// Serializes a single ASCII byte as a one character string.
mod ascii_char {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &u8, serializer: S) -> Result<S::Ok, S::Error> {
        let mut buf = [0u8; 4];
        serializer.serialize_str(char::from(*value).encode_utf8(&mut buf))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
        let value = String::deserialize(deserializer)?;
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii() => Ok(c as u8),
            _ => Err(D::Error::custom(format!(
                "expected a single ASCII character, got '{value}'"
            ))),
        }
    }
}
