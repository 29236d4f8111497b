//! AMR frame-type to frame-size tables
//!
//! Sizes are in bytes and include the one-byte frame header. Indexes are the
//! 4-bit FT field of that header.

/// AMR-NB frame sizes for modes 4.75 through 12.2 kbps
pub const AMR_NB_FRAME_SIZES: [usize; 8] = [13, 14, 16, 18, 20, 21, 27, 32];

/// AMR-WB frame sizes for modes 6.60 through 23.85 kbps
pub const AMR_WB_FRAME_SIZES: [usize; 9] = [18, 24, 33, 37, 41, 47, 51, 59, 61];

/// AMR-NB bitrates in bits/second, indexed like [`AMR_NB_FRAME_SIZES`]
pub const AMR_NB_BITRATES: [u32; 8] = [4750, 5150, 5900, 6700, 7400, 7950, 10200, 12200];

/// AMR-WB bitrates in bits/second, indexed like [`AMR_WB_FRAME_SIZES`]
pub const AMR_WB_BITRATES: [u32; 9] = [6600, 8850, 12650, 14250, 15850, 18250, 19850, 23050, 23850];
