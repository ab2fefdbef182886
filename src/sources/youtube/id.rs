pub const ID_LENGTH: usize = 11;

/// YouTube video ids are 11 characters of `[A-Za-z0-9_-]`.
pub fn validate_id(id: &str) -> bool {
    id.len() == ID_LENGTH
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
