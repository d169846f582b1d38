//! Lexicographic k-combinations of board indices.

use smallvec::SmallVec;

/// Index tuple for one candidate match (at most four cards).
pub type IndexCombo = SmallVec<[usize; 4]>;

/// Iterator over all strictly increasing `k`-tuples drawn from `0..n`,
/// in lexicographic order.
///
/// ```
/// use set_engine::rules::Combinations;
///
/// let all: Vec<Vec<usize>> = Combinations::new(4, 2).map(|c| c.to_vec()).collect();
/// assert_eq!(all, vec![
///     vec![0, 1], vec![0, 2], vec![0, 3],
///     vec![1, 2], vec![1, 3], vec![2, 3],
/// ]);
/// ```
#[derive(Clone, Debug)]
pub struct Combinations {
    n: usize,
    current: Option<IndexCombo>,
}

impl Combinations {
    /// Create the iterator. Yields nothing when `k > n` or `k == 0`.
    #[must_use]
    pub fn new(n: usize, k: usize) -> Self {
        let current = (k > 0 && k <= n).then(|| (0..k).collect());
        Self { n, current }
    }
}

impl Iterator for Combinations {
    type Item = IndexCombo;

    fn next(&mut self) -> Option<Self::Item> {
        let out = self.current.clone()?;
        let k = out.len();

        // Advance: find the rightmost slot that can still move right.
        let n = self.n;
        let advanced = self.current.as_mut().is_some_and(|current| {
            match (0..k).rev().find(|&i| current[i] < n - k + i) {
                Some(i) => {
                    current[i] += 1;
                    for j in i + 1..k {
                        current[j] = current[j - 1] + 1;
                    }
                    true
                }
                None => false,
            }
        });
        if !advanced {
            self.current = None;
        }

        Some(out)
    }
}

/// Number of `k`-combinations of `n` items.
#[must_use]
pub fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
}
