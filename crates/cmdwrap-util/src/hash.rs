/// Length of the short content hash used in renamed filenames.
pub const SHORT_HASH_LEN: usize = 8;

/// Compute the BLAKE3 hash of a byte slice, returning the hex-encoded digest.
#[must_use]
pub fn blake3_bytes(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Short content hash of a byte slice, as substituted for `{{hash}}` in
/// rename rules.
#[must_use]
pub fn short_hash(data: &[u8]) -> String {
    let mut hex = blake3_bytes(data);
    hex.truncate(SHORT_HASH_LEN);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blake3_bytes() {
        assert_eq!(
            blake3_bytes(b"hello world"),
            "d74981efa70a0c880b8d8c1985d075dbcbf679b99a5f9914e5aaf96b831a9e24"
        );
    }

    #[test]
    fn test_short_hash_is_prefix() {
        let short = short_hash(b"hello world");
        assert_eq!(short.len(), SHORT_HASH_LEN);
        assert_eq!(short, "d74981ef");
    }
}
