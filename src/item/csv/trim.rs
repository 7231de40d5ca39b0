use log::{debug, warn};
use regex::Regex;

/// Removes trailing "ghost" rows made only of commas and whitespace.
///
/// See [`trim_trailing_blank_rows_with`].
///
/// # Examples
///
/// ```
/// use warehouse_csv::item::csv::trim::trim_trailing_blank_rows;
///
/// assert_eq!(trim_trailing_blank_rows("a,b\n1,2\n,\n, ,\n"), "a,b\n1,2");
/// assert_eq!(trim_trailing_blank_rows("a,b\n,\n1,2\n"), "a,b\n,\n1,2");
/// ```
pub fn trim_trailing_blank_rows(text: &str) -> String {
    trim_trailing_blank_rows_with(text, b',')
}

/// Removes a trailing run of rows made only of `delimiter` and whitespace.
///
/// The text is first stripped of surrounding whitespace (the delimiter itself is kept when it
/// is a whitespace character). Then the last run of one or more line breaks followed by
/// delimiters or whitespace is located; it is cut off when it reaches the end of the text,
/// does not start at its beginning and contains at least one delimiter. Blank rows between
/// data rows are never touched.
pub fn trim_trailing_blank_rows_with(text: &str, delimiter: u8) -> String {
    let delimiter = char::from(delimiter);
    let text = text.trim_matches(|c: char| c.is_whitespace() && c != delimiter);

    let pattern = format!(
        r"[\r\n]+[{}\s]+",
        regex::escape(delimiter.encode_utf8(&mut [0u8; 4]))
    );
    let blank_tail = match Regex::new(&pattern) {
        Ok(regex) => regex,
        Err(error) => {
            warn!("Trailing rows left untrimmed: {}", error);
            return text.to_string();
        }
    };

    match blank_tail.find_iter(text).last() {
        Some(tail)
            if tail.start() > 0
                && tail.end() == text.len()
                && tail.as_str().contains(delimiter) =>
        {
            debug!(
                "Trimmed {} trailing bytes of blank rows",
                text.len() - tail.start()
            );
            // Cut at the first line break of the run, so the last kept row has no terminator
            // and a second trim finds nothing left to remove.
            text[..tail.start()].to_string()
        }
        _ => text.to_string(),
    }
}
