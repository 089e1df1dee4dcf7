//! Top-N consumers by usage.

use std::cmp::Ordering;

use serde::Serialize;

use super::consumer::Consumer;

/// Heaviest consumer first; ties broken by identity, ascending.
fn by_usage(a: &Consumer, b: &Consumer) -> Ordering {
    b.used.cmp(&a.used).then_with(|| a.identity.cmp(&b.identity))
}

/// Iterator over the top consumers, heaviest first.
///
/// Cloning yields an independent iterator from the same position, so a
/// fresh clone replays the whole ranking.
#[derive(Debug, Clone)]
pub struct TopN<'a> {
    inner: std::iter::Take<std::vec::IntoIter<&'a Consumer>>,
}

impl<'a> Iterator for TopN<'a> {
    type Item = &'a Consumer;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for TopN<'_> {}

/// Rank `consumers` by usage and take the first `n`.
///
/// The ordering is recomputed from the input on every call.
pub fn top_n(consumers: &[Consumer], n: usize) -> TopN<'_> {
    let mut ordered: Vec<&Consumer> = consumers.iter().collect();
    if n < ordered.len() {
        if n > 0 {
            ordered.select_nth_unstable_by(n - 1, |a, b| by_usage(a, b));
        }
        ordered.truncate(n);
    }
    ordered.sort_by(|a, b| by_usage(a, b));

    TopN {
        inner: ordered.into_iter().take(n),
    }
}

/// A consumer's position in the ranking (1-based).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedConsumer {
    pub rank: usize,
    pub identity: String,
    pub used: u64,
}

/// Owned top-N, ready to be stored in a snapshot.
pub fn rank(consumers: &[Consumer], n: usize) -> Vec<RankedConsumer> {
    top_n(consumers, n)
        .enumerate()
        .map(|(i, c)| RankedConsumer {
            rank: i + 1,
            identity: c.identity.clone(),
            used: c.used,
        })
        .collect()
}
