//! Secure erasure and constant-time copy.

use subtle::{Choice, ConditionallySelectable};
use zeroize::Zeroize;

/// Overwrite `buf` with zeros. Never resizes; no-op on empty input.
///
/// `zeroize` performs volatile writes followed by a compiler fence, so the
/// store cannot be elided even when `buf` is dead afterwards.
pub fn secure_wipe(buf: &mut [u8]) {
    if buf.is_empty() {
        return;
    }
    buf.zeroize();
}

/// Copy `src` into `dst` without data-dependent branches.
///
/// Copies `min(dst.len(), src.len())` bytes and returns that count.
pub fn ct_copy(dst: &mut [u8], src: &[u8]) -> usize {
    let n = dst.len().min(src.len());
    let take = Choice::from(1u8);
    for (d, s) in dst[..n].iter_mut().zip(&src[..n]) {
        d.conditional_assign(s, take);
    }
    n
}
