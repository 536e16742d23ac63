use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// A finite, indexable parameter space. Items are produced on demand from their position, so
/// composing spaces costs nothing until the sweep is iterated.
pub trait Space: Send + Sync + 'static {
    type Item;

    fn len(&self) -> usize;

    /// Item at `index`; callers guarantee `index < len()`.
    fn get(&self, index: usize) -> Self::Item;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cross product with `other`, which varies fastest.
    fn product<S: Space>(self, other: S) -> Product<Self, S>
    where
        Self: Sized,
    {
        Product { outer: self, inner: other }
    }

    fn map<T, F>(self, mapper: F) -> Mapped<Self, F>
    where
        Self: Sized,
        F: Fn(Self::Item) -> T + Send + Sync + 'static,
    {
        Mapped { space: self, mapper }
    }

    /// The whole space emitted `repetitions` times in sequence.
    fn repeat(self, repetitions: usize) -> Sweep<Self::Item>
    where
        Self: Sized,
    {
        Sweep::new(self, repetitions)
    }
}

/// One named, ordered sequence of values. Correlated parameters go in a single axis of tuples.
#[derive(Debug, Clone)]
pub struct Axis<T> {
    name: &'static str,
    values: Vec<T>,
}

impl<T: Clone + Send + Sync + 'static> Axis<T> {
    pub fn new(name: &'static str, values: impl IntoIterator<Item = T>) -> Self {
        Self {
            name,
            values: values.into_iter().collect(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: Clone + Send + Sync + 'static> Space for Axis<T> {
    type Item = T;

    fn len(&self) -> usize {
        self.values.len()
    }

    fn get(&self, index: usize) -> T {
        self.values[index].clone()
    }
}

pub struct Product<A, B> {
    outer: A,
    inner: B,
}

impl<A: Space, B: Space> Space for Product<A, B> {
    type Item = (A::Item, B::Item);

    fn len(&self) -> usize {
        self.outer.len() * self.inner.len()
    }

    fn get(&self, index: usize) -> Self::Item {
        let inner_len = self.inner.len();
        (
            self.outer.get(index / inner_len),
            self.inner.get(index % inner_len),
        )
    }
}

pub struct Mapped<S, F> {
    space: S,
    mapper: F,
}

impl<S, F, T> Space for Mapped<S, F>
where
    S: Space,
    F: Fn(S::Item) -> T + Send + Sync + 'static,
{
    type Item = T;

    fn len(&self) -> usize {
        self.space.len()
    }

    fn get(&self, index: usize) -> T {
        (self.mapper)(self.space.get(index))
    }
}

/// `[cross product] * repetitions`, lazily generated. Cloning is cheap and every call to
/// [`Sweep::iter`] starts over from the first item.
pub struct Sweep<T> {
    space: Arc<dyn Space<Item = T>>,
    repetitions: usize,
}

impl<T: 'static> Clone for Sweep<T> {
    fn clone(&self) -> Self {
        Self {
            space: self.space.clone(),
            repetitions: self.repetitions,
        }
    }
}

impl<T: 'static> Debug for Sweep<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sweep")
            .field("distinct", &self.space.len())
            .field("repetitions", &self.repetitions)
            .finish()
    }
}

impl<T: 'static> Sweep<T> {
    pub fn new<S: Space<Item = T>>(space: S, repetitions: usize) -> Self {
        Self {
            space: Arc::new(space),
            repetitions,
        }
    }

    /// A sweep of explicitly listed items, emitted once.
    pub fn of(items: Vec<T>) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        Axis::new("items", items).repeat(1)
    }

    pub fn len(&self) -> usize {
        self.space.len() * self.repetitions
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of one repetition of the cross product.
    pub fn distinct(&self) -> usize {
        self.space.len()
    }

    pub fn repetitions(&self) -> usize {
        self.repetitions
    }

    pub fn iter(&self) -> SweepIter<T> {
        SweepIter {
            sweep: self.clone(),
            position: 0,
            end: self.len(),
        }
    }
}

impl<T: 'static> IntoIterator for &Sweep<T> {
    type Item = T;
    type IntoIter = SweepIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct SweepIter<T> {
    sweep: Sweep<T>,
    position: usize,
    end: usize,
}

impl<T: 'static> Iterator for SweepIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.position >= self.end {
            return None;
        }
        let item = self.sweep.space.get(self.position % self.sweep.distinct());
        self.position += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.position;
        (remaining, Some(remaining))
    }
}

impl<T: 'static> ExactSizeIterator for SweepIter<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_should_yield_repetitions_times_product_of_axis_lengths() {
        let sweep = Axis::new("a", [1, 2])
            .product(Axis::new("b", ['x', 'y', 'z']))
            .product(Axis::new("c", [true, false]))
            .repeat(3);

        assert_eq!(sweep.len(), 3 * 2 * 3 * 2);
        assert_eq!(sweep.iter().len(), 36);
        assert_eq!(sweep.iter().count(), 36);
        assert_eq!(sweep.distinct(), 12);
    }

    #[test]
    fn first_repetition_should_match_nested_loops() {
        let sweep = Axis::new("a", [1, 2])
            .product(Axis::new("b", ['x', 'y', 'z']))
            .map(|(a, b)| format!("{a}{b}"))
            .repeat(2);

        let mut expected = Vec::new();
        for a in [1, 2] {
            for b in ['x', 'y', 'z'] {
                expected.push(format!("{a}{b}"));
            }
        }
        let items: Vec<String> = sweep.iter().collect();
        assert_eq!(items[..6], expected[..]);
        assert_eq!(items[6..], expected[..]);
    }

    #[test]
    fn sweep_should_be_restartable() {
        let sweep = Axis::new("a", 0..4).repeat(1);
        let first: Vec<i32> = sweep.iter().collect();
        let second: Vec<i32> = (&sweep).into_iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn composite_axis_should_keep_correlated_values_together() {
        let sweep = Axis::new("batching", [(1, 1), (10, 2)])
            .product(Axis::new("f", [1, 2]))
            .repeat(1);
        let items: Vec<((u32, u32), u32)> = sweep.iter().collect();
        assert_eq!(items, vec![((1, 1), 1), ((1, 1), 2), ((10, 2), 1), ((10, 2), 2)]);
    }

    #[test]
    fn empty_axis_should_yield_empty_sweep() {
        let sweep = Axis::new("a", [1, 2])
            .product(Axis::new("b", Vec::<u32>::new()))
            .repeat(5);
        assert!(sweep.is_empty());
        assert_eq!(sweep.iter().next(), None);
    }

    #[test]
    fn size_hint_should_shrink_while_iterating() {
        let sweep = Sweep::of(vec!["a", "b", "c"]);
        let mut iter = sweep.iter();
        iter.next();
        assert_eq!(iter.len(), 2);
    }

    #[test]
    fn cloned_sweep_should_iterate_independently() {
        let sweep = Axis::new("f", [1u32, 2])
            .map(|f| f * 10)
            .repeat(2);
        let clone = sweep.clone();
        let mut iter = sweep.iter();
        iter.next();

        assert_eq!(clone.iter().collect::<Vec<_>>(), vec![10, 20, 10, 20]);
        assert_eq!(iter.len(), 3);
        assert_eq!(format!("{clone:?}"), "Sweep { distinct: 2, repetitions: 2 }");
    }
}
