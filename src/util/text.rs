use std::borrow::Cow;

use unicode_width::UnicodeWidthChar;

const ELLIPSIS: char = '…';

/// Truncate `s` to at most `max_width` terminal columns.
///
/// Width is measured with `unicode-width`, so CJK and emoji count double.
/// When text is cut, the last column is an ellipsis. Returns the input
/// borrowed when it already fits.
///
/// ```
/// use cognos::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Short", 10), "Short");
/// assert_eq!(truncate_to_width("Hello World", 6), "Hello…");
/// assert_eq!(truncate_to_width("Hello", 0), "");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    let mut width = 0;
    // Byte offset where the text must be cut to leave a column for the ellipsis
    let mut cut = None;

    for (idx, c) in s.char_indices() {
        let w = c.width().unwrap_or(0);
        if cut.is_none() && width + w > max_width.saturating_sub(1) {
            cut = Some(idx);
        }
        if width + w > max_width {
            return match (max_width, cut) {
                (0, _) => Cow::Borrowed(""),
                (_, Some(at)) => Cow::Owned(format!("{}{}", &s[..at], ELLIPSIS)),
                (_, None) => Cow::Borrowed(s),
            };
        }
        width += w;
    }

    Cow::Borrowed(s)
}

fn is_unsafe_byte(b: u8) -> bool {
    b == 0x7f || (b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r'))
}

/// Strip terminal control characters and ANSI escape sequences.
///
/// Article titles and descriptions come from third-party news sources and
/// are rendered straight into the terminal. Tab, newline and carriage return
/// survive; CSI (`ESC [`) and OSC (`ESC ]`, ended by BEL or `ESC \`)
/// sequences are removed whole.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    if !s.bytes().any(is_unsafe_byte) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\x1b' {
            match chars.peek() {
                Some('[') => {
                    chars.next();
                    // Parameters run until a final byte in 0x40..=0x7e
                    for p in chars.by_ref() {
                        if ('\x40'..='\x7e').contains(&p) {
                            break;
                        }
                    }
                }
                Some(']') => {
                    chars.next();
                    while let Some(p) = chars.next() {
                        if p == '\x07' {
                            break;
                        }
                        if p == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            }
            continue;
        }
        if c.is_ascii() && is_unsafe_byte(c as u8) {
            continue;
        }
        out.push(c);
    }

    Cow::Owned(out)
}

/// Sanitize and fold text onto one line: control characters are stripped
/// and every whitespace run (including newlines) becomes one space.
pub fn single_line(s: &str) -> String {
    strip_control_chars(s)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
