//! Alignment arithmetic shared by the chunk chain and the strategies

use crate::resource::MAX_ALIGN;

/// Rounds `value` up to the nearest multiple of `alignment`
///
/// Intended for compile-time layout constants where overflow is impossible.
///
/// # Examples
/// ```
/// use strata_memory::utils::align_up;
///
/// assert_eq!(align_up(7, 8), 8);
/// assert_eq!(align_up(16, 8), 16);
/// ```
#[inline]
#[must_use]
pub const fn align_up(value: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    (value + alignment - 1) & !(alignment - 1)
}

/// Overflow-checked [`align_up`]
///
/// # Examples
/// ```
/// use strata_memory::utils::checked_align_up;
///
/// assert_eq!(checked_align_up(9, 4), Some(12));
/// assert_eq!(checked_align_up(usize::MAX, 2), None);
/// ```
#[inline]
#[must_use]
pub const fn checked_align_up(value: usize, alignment: usize) -> Option<usize> {
    debug_assert!(alignment.is_power_of_two());
    match value.checked_add(alignment - 1) {
        Some(bumped) => Some(bumped & !(alignment - 1)),
        None => None,
    }
}

/// Whether `align` is a power of two no larger than [`MAX_ALIGN`]
#[inline]
#[must_use]
pub const fn is_supported_alignment(align: usize) -> bool {
    align.is_power_of_two() && align <= MAX_ALIGN
}
