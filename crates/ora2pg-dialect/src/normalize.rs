use crate::hash::short_hex;

/// PostgreSQL's unquoted-identifier byte limit.
pub const MAX_IDENTIFIER_BYTES: usize = 63;

const SUFFIX_LEN: usize = 1 + 8; // "_" + 8 hex digits

fn is_valid_tail_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '$' || c == '#'
}

fn is_valid_head_char(c: char) -> bool {
    c.is_ascii_lowercase() || c == '_'
}

fn strip_outer_quotes(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 && bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"' {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Folds `raw` to PostgreSQL's case/length rules: lowercase, every
/// character restricted to `[a-z0-9_$#]`, first character restricted to
/// `[a-z_]`, and truncated to `MAX_IDENTIFIER_BYTES` with a deterministic
/// `_<hex8>` disambiguation suffix appended when truncation occurred.
///
/// Idempotent by construction: the output always already satisfies every
/// rule this function enforces, so a second call is a no-op.
pub fn normalize_identifier(raw: &str) -> String {
    let stripped = strip_outer_quotes(raw);
    let lowered = stripped.to_lowercase();

    let mut sanitized = String::with_capacity(lowered.len());
    for (i, c) in lowered.chars().enumerate() {
        let ok = if i == 0 { is_valid_head_char(c) } else { is_valid_tail_char(c) };
        if ok {
            sanitized.push(c);
        } else if i == 0 {
            // Disallowed lead character (digit, symbol, etc.): prefix
            // rather than drop, so distinct inputs don't collide trivially.
            sanitized.push('_');
            if is_valid_tail_char(c) {
                sanitized.push(c);
            } else {
                sanitized.push('_');
            }
        } else {
            sanitized.push('_');
        }
    }
    if sanitized.is_empty() {
        sanitized.push('_');
    }

    if sanitized.len() <= MAX_IDENTIFIER_BYTES {
        return sanitized;
    }

    let suffix = format!("_{}", short_hex(sanitized.as_bytes()));
    debug_assert_eq!(suffix.len(), SUFFIX_LEN);
    let keep = MAX_IDENTIFIER_BYTES - SUFFIX_LEN;
    // `keep` is a byte count; `sanitized` is ASCII-only (every char we ever
    // push is ASCII) so byte slicing at `keep` is always a char boundary.
    let mut truncated = sanitized[..keep].to_string();
    truncated.push_str(&suffix);
    truncated
}
