use std::cmp::Ordering;

/// argmax returns the index of the maximum value in the array x. On ties the first occurrence
/// wins, which callers rely on to favor earlier enumerated candidates.
pub fn argmax<T: std::cmp::PartialOrd + std::marker::Copy>(x: &[T]) -> usize {
    let mut idx_max = 0;
    let mut val_max = x[0];

    for (i, &val) in x.iter().enumerate().skip(1) {
        if val > val_max {
            val_max = val;
            idx_max = i;
        }
    }

    idx_max
}

#[derive(Debug, Clone, Copy)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// argsort returns the indices that would sort an array. The sort is stable, i.e. equal values
/// keep their original order. Incomparable values (NaN) are treated as equal.
pub fn argsort<T: std::cmp::PartialOrd>(x: &[T], order: SortOrder) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..x.len()).collect();
    match order {
        SortOrder::Ascending => {
            indices.sort_by(|&a, &b| x[a].partial_cmp(&x[b]).unwrap_or(Ordering::Equal))
        }
        SortOrder::Descending => {
            indices.sort_by(|&a, &b| x[b].partial_cmp(&x[a]).unwrap_or(Ordering::Equal))
        }
    }
    indices
}

/// lin_interp returns the linearly interpolated value at x for given discrete data points xp, fp.
/// xp must be increasing. Values outside the data range are clamped to the first or last value.
/// Inspired by numpy.interp.
pub fn lin_interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    if xp.len() != fp.len() || xp.is_empty() {
        panic!("Number of items in xp and fp must be equal and non-zero!")
    }

    if x <= xp[0] {
        return fp[0];
    }

    for i in 1..xp.len() {
        if x <= xp[i] {
            return fp[i - 1] + (x - xp[i - 1]) * (fp[i] - fp[i - 1]) / (xp[i] - xp[i - 1]);
        }
    }

    fp[fp.len() - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn argmax_prefers_first_on_ties() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0, 2.0]), 1);
        assert_eq!(argmax(&[5, 5, 5]), 0);
    }

    #[test]
    fn argsort_is_stable() {
        let x = [2.0, 1.0, 2.0, 0.5];
        assert_eq!(argsort(&x, SortOrder::Descending), vec![0, 2, 1, 3]);
        assert_eq!(argsort(&x, SortOrder::Ascending), vec![3, 1, 0, 2]);
    }

    #[test]
    fn lin_interp_clamps_and_interpolates() {
        let xp = [0.0, 2.0, 8.0];
        let fp = [-10.0, 5.0, 5.0];
        assert_relative_eq!(lin_interp(-1.0, &xp, &fp), -10.0);
        assert_relative_eq!(lin_interp(1.0, &xp, &fp), -2.5);
        assert_relative_eq!(lin_interp(5.0, &xp, &fp), 5.0);
        assert_relative_eq!(lin_interp(20.0, &xp, &fp), 5.0);
    }
}
