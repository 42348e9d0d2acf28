/// Stride that brings `len` items within `budget` (`ceil(len / budget)`).
///
/// Returns 1 when no reduction is needed and 0 when `budget` is zero.
#[must_use]
pub const fn stride_for(len: usize, budget: usize) -> usize {
    if budget == 0 {
        0
    } else if len <= budget {
        1
    } else {
        len.div_ceil(budget)
    }
}

/// Cap a chronologically ordered series at `budget` items with uniform-stride sampling.
///
/// Keeps indices `0, stride, 2*stride, ...`. When the last item does not fall on
/// the stride, it replaces the final sample so both ends of the series survive;
/// the output length is always `ceil(len / stride)`. A zero budget yields an
/// empty series. Deterministic: identical input gives identical output.
///
/// ```
/// use chartwell_core::timeseries::downsample::downsample_stride;
///
/// let v: Vec<u32> = (0..10).collect();
/// assert_eq!(downsample_stride(&v, 4), vec![0, 3, 6, 9]);
/// assert_eq!(downsample_stride(&v, 3), vec![0, 4, 9]);
/// assert_eq!(downsample_stride(&v, 20), v);
/// ```
#[must_use]
pub fn downsample_stride<T: Clone>(items: &[T], budget: usize) -> Vec<T> {
    let stride = stride_for(items.len(), budget);
    if stride == 0 {
        return Vec::new();
    }
    if stride == 1 {
        return items.to_vec();
    }
    let mut out: Vec<T> = items.iter().step_by(stride).cloned().collect();
    let last = items.len() - 1;
    if last % stride != 0
        && out.len() > 1
        && let Some(tail) = out.last_mut()
    {
        *tail = items[last].clone();
    }
    out
}
