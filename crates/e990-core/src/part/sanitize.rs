//! Linux-safe file name sanitization for names taken from URLs.

/// Sanitizes a candidate file name for safe use on Linux.
///
/// NUL, `/`, `\`, whitespace and control characters become `_` (runs collapse
/// to one). Leading/trailing dots and underscores are trimmed and the result
/// is capped at 255 bytes.
pub fn sanitize_filename_for_linux(name: &str) -> String {
    const NAME_MAX: usize = 255;

    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let unsafe_char = c == '\0' || c == '/' || c == '\\' || c.is_control() || c.is_whitespace();
        let c = if unsafe_char { '_' } else { c };
        if c == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');

    if trimmed.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed[..take].to_string()
    } else {
        trimmed.to_string()
    }
}
