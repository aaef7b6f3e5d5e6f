//! Framing control characters.
//!
//! Messages travel with a handful of ASCII control characters around and
//! between their lines. This module names them and offers a pair of helpers
//! for making them visible while debugging.

/// Segment terminator (carriage return).
pub const CR: char = '\r';

/// Line feed, accepted as a fallback segment terminator.
pub const LF: char = '\n';

/// File separator, sent as a trailer by some transports.
pub const FS: char = '\x1c';

/// Vertical tab, sent as a start-of-block marker by some transports.
pub const VT: char = '\x0b';

/// Characters after which a header code starts a new message in a
/// multi-message blob.
pub const RECORD_BREAKS: [char; 5] = ['\n', '\r', '\x0c', '\t', '\x0b'];

/// Replace framing control characters with visible markers.
///
/// Line terminators keep a real line break after their marker so the output
/// stays readable in a terminal.
///
/// ```
/// use hl7tree_core::control::visible_control_chars;
///
/// assert_eq!(visible_control_chars("A\rB\x1c"), "A<CR>\rB<FS>");
/// ```
pub fn visible_control_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            FS => out.push_str("<FS>"),
            VT => out.push_str("<VT>"),
            LF => out.push_str("<LF>\n"),
            CR => out.push_str("<CR>\r"),
            other => out.push(other),
        }
    }
    out
}

/// Reverse [`visible_control_chars`].
///
/// Raw line breaks are dropped first, then the markers are turned back into
/// the characters they stand for. The marker strings could occur in real
/// data, so this is a debugging aid only.
pub fn restore_control_chars(text: &str) -> String {
    text.replace([LF, CR], "")
        .replace("<FS>", "\x1c")
        .replace("<VT>", "\x0b")
        .replace("<CR>", "\r")
        .replace("<LF>", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_markers() {
        let text = "\x0bMSH|^~\\&\rPID|1\n\x1c";
        assert_eq!(
            visible_control_chars(text),
            "<VT>MSH|^~\\&<CR>\rPID|1<LF>\n<FS>"
        );
    }

    #[test]
    fn test_restore_reverses_visible() {
        let text = "\x0bMSH|^~\\&\rPID|1\rOBX|2\n\x1c";
        assert_eq!(restore_control_chars(&visible_control_chars(text)), text);
    }

    #[test]
    fn test_restore_drops_raw_breaks() {
        assert_eq!(restore_control_chars("A<CR>\nB<CR>\r\n"), "A\rB\r");
    }
}
