//! Out-of-bounds index policies.

/// How reads outside the image are resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BorderMode {
    /// Repeat the nearest edge sample.
    Clamp,
    /// Half-sample symmetric mirror: `d c b a | a b c d | d c b a`.
    Reflect,
}

/// Maps a possibly out-of-range index into `[0, len)`.
///
/// `len` must be non-zero.
pub fn map_index(i: isize, len: usize, mode: BorderMode) -> usize {
    debug_assert!(len > 0);
    match mode {
        BorderMode::Clamp => {
            if i < 0 {
                0
            } else {
                (i as usize).min(len - 1)
            }
        }
        BorderMode::Reflect => {
            let period = (2 * len) as isize;
            let r = i.rem_euclid(period) as usize;
            if r < len {
                r
            } else {
                2 * len - 1 - r
            }
        }
    }
}
