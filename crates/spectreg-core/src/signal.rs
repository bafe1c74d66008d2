/// Circularly shift a spectrum so the zero-frequency bin moves to the center.
///
/// Operates on the flat coefficient array; for even lengths this swaps the
/// two halves and is its own inverse.
pub fn fft_shift<T>(data: &mut [T]) {
    let half = data.len() / 2;
    data.rotate_right(half);
}

/// Undo [`fft_shift`], moving the centered zero-frequency bin back to index 0.
pub fn ifft_shift<T>(data: &mut [T]) {
    let half = data.len() / 2;
    data.rotate_left(half);
}
