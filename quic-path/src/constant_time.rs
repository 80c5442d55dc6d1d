/// OR of the pairwise XOR of two equal-length slices, zero iff they are equal
///
/// Kept out of line so the comparison against zero happens in the caller and the loop visits
/// every byte.
#[inline(never)]
fn xor_fold(a: &[u8], b: &[u8]) -> u8 {
    a.iter().zip(b).fold(0, |acc, (x, y)| acc | (x ^ y))
}

/// Compares challenge payloads without short-circuiting on the first differing byte
pub(crate) fn eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && xor_fold(a, b) == 0
}
