//! `Range` header handling.
//!
//! Only a single `bytes=` range is honoured. A range whose last byte comes
//! before its first, or that starts past the end, is unsatisfiable. Other
//! forms fall back to the full representation.

/// How a `Range` header applies to a body of known length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    /// Serve the whole body.
    Full,

    /// Serve bytes `start..=end`.
    Partial { start: u64, end: u64 },

    /// No byte of the body lies in the requested range.
    Unsatisfiable,
}

/// Resolve a `Range` header value against a body of `len` bytes.
pub fn resolve(header: &str, len: u64) -> ByteRange {
    let Some(spec) = header.trim().strip_prefix("bytes=") else {
        return ByteRange::Full;
    };
    if spec.contains(',') {
        return ByteRange::Full;
    }
    let Some((first, last)) = spec.split_once('-') else {
        return ByteRange::Full;
    };
    let (first, last) = (first.trim(), last.trim());

    if first.is_empty() {
        // Suffix range: the final `n` bytes.
        let Ok(n) = last.parse::<u64>() else {
            return ByteRange::Full;
        };
        if n == 0 || len == 0 {
            return ByteRange::Unsatisfiable;
        }
        return ByteRange::Partial {
            start: len.saturating_sub(n),
            end: len - 1,
        };
    }

    let Ok(start) = first.parse::<u64>() else {
        return ByteRange::Full;
    };
    let end = if last.is_empty() {
        u64::MAX
    } else {
        match last.parse::<u64>() {
            Ok(end) if end < start => return ByteRange::Unsatisfiable,
            Ok(end) => end,
            Err(_) => return ByteRange::Full,
        }
    };

    if start >= len {
        return ByteRange::Unsatisfiable;
    }
    ByteRange::Partial {
        start,
        end: end.min(len - 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_range() {
        assert_eq!(resolve("bytes=0-3", 10), ByteRange::Partial { start: 0, end: 3 });
        assert_eq!(resolve("bytes=4-4", 10), ByteRange::Partial { start: 4, end: 4 });
        assert_eq!(resolve("bytes=5-100", 10), ByteRange::Partial { start: 5, end: 9 });
    }

    #[test]
    fn test_open_and_suffix_ranges() {
        assert_eq!(resolve("bytes=7-", 10), ByteRange::Partial { start: 7, end: 9 });
        assert_eq!(resolve("bytes=-3", 10), ByteRange::Partial { start: 7, end: 9 });
        assert_eq!(resolve("bytes=-30", 10), ByteRange::Partial { start: 0, end: 9 });
    }

    #[test]
    fn test_unsatisfiable() {
        assert_eq!(resolve("bytes=10-", 10), ByteRange::Unsatisfiable);
        assert_eq!(resolve("bytes=20-30", 10), ByteRange::Unsatisfiable);
        assert_eq!(resolve("bytes=-0", 10), ByteRange::Unsatisfiable);
        assert_eq!(resolve("bytes=-5", 0), ByteRange::Unsatisfiable);
        assert_eq!(resolve("bytes=5-2", 10), ByteRange::Unsatisfiable);
        assert_eq!(resolve("bytes=3-2", 10), ByteRange::Unsatisfiable);
    }

    #[test]
    fn test_ignored_ranges() {
        assert_eq!(resolve("bytes=0-1,4-5", 10), ByteRange::Full);
        assert_eq!(resolve("items=0-1", 10), ByteRange::Full);
        assert_eq!(resolve("bytes=2-x", 10), ByteRange::Full);
        assert_eq!(resolve("bytes=abc", 10), ByteRange::Full);
        assert_eq!(resolve("bytes=x-1", 10), ByteRange::Full);
    }
}
