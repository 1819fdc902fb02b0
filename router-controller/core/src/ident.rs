use md5::{Digest, Md5};

/// Proxy-side names are bounded like DNS labels.
pub const MAX_LEN: usize = 63;

const PREFIX_LEN: usize = 52;
const HASH_LEN: usize = 10;

/// Derives a proxy-side identifier from an arbitrary name.
///
/// Names of at most 63 bytes are returned unchanged. Longer names are
/// truncated to a 52-byte prefix and suffixed with `-` and the first 10 hex
/// characters of the MD5 digest of the whole name, so that long names sharing
/// a prefix do not collide.
///
/// Lengths are measured in UTF-8 bytes. When the 52nd byte falls inside a
/// multi-byte character the prefix is shortened to the preceding character
/// boundary, so such identifiers are shorter than 63 bytes.
pub fn dns_identifier(name: &str) -> String {
    if name.len() <= MAX_LEN {
        return name.to_string();
    }

    let mut end = PREFIX_LEN;
    while !name.is_char_boundary(end) {
        end -= 1;
    }

    let digest = hex::encode(Md5::digest(name.as_bytes()));
    format!("{}-{}", &name[..end], &digest[..HASH_LEN])
}
