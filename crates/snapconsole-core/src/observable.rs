//! An ordered sequence that calls back after every mutation.
//!
//! The console binds its `logs`, `header`, `footer`, and `command_history`
//! sequences through [`ObservableSequence`] so that editing displayed content
//! repaints the screen without an explicit redraw call.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::ops::{Bound, RangeBounds};
use std::rc::Rc;

use crate::error::ConsoleError;

/// A shared, observable `Vec<T>`.
///
/// Cloning an `ObservableSequence` yields another handle to the same storage
/// and the same callback. Every successful mutating call invokes the callback
/// exactly once after the mutation completes, including bulk operations such
/// as [`extend`](Self::extend). Failed mutations (bad index, missing value,
/// popping an empty sequence) leave the sequence untouched and do not notify.
/// Reads never notify.
///
/// The storage borrow is released before the callback runs, so the callback
/// may read the sequence.
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use snapconsole_core::observable::ObservableSequence;
///
/// let changes = Rc::new(Cell::new(0));
/// let counter = changes.clone();
/// let seq = ObservableSequence::<String>::new(move || counter.set(counter.get() + 1));
///
/// seq.push("a");
/// seq.extend(["b", "c", "d"]);
/// assert_eq!(seq.len(), 4);
/// assert_eq!(changes.get(), 2);
/// ```
pub struct ObservableSequence<T> {
    items: Rc<RefCell<Vec<T>>>,
    on_change: Rc<dyn Fn()>,
}

impl<T> Clone for ObservableSequence<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            on_change: self.on_change.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObservableSequence")
            .field(&*self.items.borrow())
            .finish()
    }
}

impl<T> ObservableSequence<T> {
    /// Create an empty sequence with the given change callback.
    pub fn new(on_change: impl Fn() + 'static) -> Self {
        Self::from_vec(Vec::new(), on_change)
    }

    /// Create a sequence holding `items`. Construction does not notify.
    pub fn from_vec(items: Vec<T>, on_change: impl Fn() + 'static) -> Self {
        Self::from_shared(Rc::new(RefCell::new(items)), on_change)
    }

    /// Bind a callback to storage that is also held elsewhere.
    pub fn from_shared(items: Rc<RefCell<Vec<T>>>, on_change: impl Fn() + 'static) -> Self {
        Self {
            items,
            on_change: Rc::new(on_change),
        }
    }

    fn mutate<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> R {
        let result = f(&mut self.items.borrow_mut());
        (self.on_change)();
        result
    }

    fn out_of_range(&self, index: usize) -> ConsoleError {
        ConsoleError::IndexOutOfRange {
            index,
            len: self.len(),
        }
    }

    // ---- Mutations ----

    /// Append one item.
    pub fn push(&self, item: impl Into<T>) {
        let item = item.into();
        self.mutate(|items| items.push(item));
    }

    /// Append every item from `iter` with a single notification.
    pub fn extend<I>(&self, iter: I)
    where
        I: IntoIterator,
        I::Item: Into<T>,
    {
        let new: Vec<T> = iter.into_iter().map(Into::into).collect();
        self.mutate(|items| items.extend(new));
    }

    /// Insert `item` before position `index` (`index == len` appends).
    pub fn insert(&self, index: usize, item: impl Into<T>) -> Result<(), ConsoleError> {
        if index > self.len() {
            return Err(self.out_of_range(index));
        }
        let item = item.into();
        self.mutate(|items| items.insert(index, item));
        Ok(())
    }

    /// Remove and return the item at `index`.
    pub fn remove(&self, index: usize) -> Result<T, ConsoleError> {
        if index >= self.len() {
            return Err(self.out_of_range(index));
        }
        Ok(self.mutate(|items| items.remove(index)))
    }

    /// Remove the first item equal to `item`. Returns `false` if none matched.
    pub fn remove_item(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        let position = self.items.borrow().iter().position(|x| x == item);
        match position {
            Some(index) => {
                self.mutate(|items| items.remove(index));
                true
            }
            None => false,
        }
    }

    /// Remove and return the last item.
    pub fn pop(&self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        self.mutate(|items| items.pop())
    }

    /// Remove every item.
    pub fn clear(&self) {
        self.mutate(|items| items.clear());
    }

    /// Sort the items in ascending order.
    pub fn sort(&self)
    where
        T: Ord,
    {
        self.mutate(|items| items.sort());
    }

    /// Sort the items with a comparator.
    pub fn sort_by(&self, compare: impl FnMut(&T, &T) -> std::cmp::Ordering) {
        self.mutate(|items| items.sort_by(compare));
    }

    /// Reverse the order of the items.
    pub fn reverse(&self) {
        self.mutate(|items| items.reverse());
    }

    /// Overwrite the item at `index`, returning the previous value.
    pub fn set(&self, index: usize, item: impl Into<T>) -> Result<T, ConsoleError> {
        if index >= self.len() {
            return Err(self.out_of_range(index));
        }
        let item = item.into();
        Ok(self.mutate(|items| std::mem::replace(&mut items[index], item)))
    }

    /// Replace the items in `range` with `replace_with`, returning the removed
    /// items.
    pub fn splice<R, I>(&self, range: R, replace_with: I) -> Result<Vec<T>, ConsoleError>
    where
        R: RangeBounds<usize>,
        I: IntoIterator,
        I::Item: Into<T>,
    {
        let len = self.len();
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s.checked_add(1).ok_or_else(|| self.out_of_range(s))?,
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&e) => e.checked_add(1).ok_or_else(|| self.out_of_range(e))?,
            Bound::Excluded(&e) => e,
            Bound::Unbounded => len,
        };
        if end > len {
            return Err(self.out_of_range(end));
        }
        if start > end {
            return Err(self.out_of_range(start));
        }
        let new: Vec<T> = replace_with.into_iter().map(Into::into).collect();
        Ok(self.mutate(|items| items.splice(start..end, new).collect()))
    }

    /// Repeat the current contents `times` times in place. Zero clears.
    pub fn repeat(&self, times: usize)
    where
        T: Clone,
    {
        self.mutate(|items| {
            let once = std::mem::take(items);
            for _ in 0..times {
                items.extend(once.iter().cloned());
            }
        });
    }

    /// Swap in a whole new sequence, returning the old contents.
    ///
    /// Always notifies, even if `items` equals the current contents, so this
    /// doubles as a forced redraw.
    pub fn replace(&self, items: Vec<T>) -> Vec<T> {
        self.mutate(|current| std::mem::replace(current, items))
    }

    /// Apply an arbitrary edit with a single notification.
    pub fn update<R>(&self, edit: impl FnOnce(&mut Vec<T>) -> R) -> R {
        self.mutate(edit)
    }

    /// Notify without changing anything.
    pub fn refresh(&self) {
        (self.on_change)();
    }

    // ---- Reads ----

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Whether the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// A clone of the item at `index`.
    pub fn get(&self, index: usize) -> Option<T>
    where
        T: Clone,
    {
        self.items.borrow().get(index).cloned()
    }

    /// A clone of the last item.
    pub fn last(&self) -> Option<T>
    where
        T: Clone,
    {
        self.items.borrow().last().cloned()
    }

    /// Whether any item equals `item`.
    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.items.borrow().contains(item)
    }

    /// A snapshot of the current contents.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.borrow().clone()
    }

    /// Borrow the contents. Do not mutate the sequence while the borrow lives.
    pub fn borrow(&self) -> Ref<'_, Vec<T>> {
        self.items.borrow()
    }

    /// Run `read` against the contents.
    pub fn with<R>(&self, read: impl FnOnce(&[T]) -> R) -> R {
        read(&self.items.borrow())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counted<T>() -> (ObservableSequence<T>, Rc<Cell<usize>>) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let seq = ObservableSequence::new(move || c.set(c.get() + 1));
        (seq, count)
    }

    #[test]
    fn each_mutation_notifies_once() {
        let (seq, count) = counted::<i32>();
        seq.push(3);
        seq.push(1);
        seq.insert(0, 2).unwrap();
        seq.sort();
        seq.reverse();
        seq.set(0, 9).unwrap();
        seq.remove_item(&9);
        seq.remove(0).unwrap();
        seq.pop();
        seq.clear();
        assert_eq!(count.get(), 10);
    }

    #[test]
    fn bulk_operations_notify_once() {
        let (seq, count) = counted::<i32>();
        seq.extend(1..=50);
        assert_eq!(count.get(), 1);

        seq.splice(10..20, [0, 0]).unwrap();
        assert_eq!(count.get(), 2);
        assert_eq!(seq.len(), 42);

        seq.repeat(3);
        assert_eq!(count.get(), 3);
        assert_eq!(seq.len(), 126);

        seq.update(|items| items.retain(|x| *x != 0));
        assert_eq!(count.get(), 4);
    }

    #[test]
    fn reads_do_not_notify() {
        let (seq, count) = counted::<&str>();
        seq.extend(["a", "b"]);
        let before = count.get();

        assert_eq!(seq.len(), 2);
        assert!(!seq.is_empty());
        assert_eq!(seq.get(1), Some("b"));
        assert_eq!(seq.last(), Some("b"));
        assert!(seq.contains(&"a"));
        assert_eq!(seq.to_vec(), vec!["a", "b"]);
        assert_eq!(seq.with(|items| items.join(",")), "a,b");
        assert_eq!(seq.borrow().len(), 2);

        assert_eq!(count.get(), before);
    }

    #[test]
    fn replace_notifies_even_when_equal() {
        let (seq, count) = counted::<i32>();
        seq.extend([1, 2]);
        let old = seq.replace(vec![1, 2]);
        assert_eq!(old, vec![1, 2]);
        assert_eq!(count.get(), 2);

        seq.refresh();
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn failed_mutations_do_not_notify() {
        let (seq, count) = counted::<i32>();
        assert!(seq.pop().is_none());
        assert!(!seq.remove_item(&7));
        assert!(matches!(
            seq.remove(0),
            Err(ConsoleError::IndexOutOfRange { index: 0, len: 0 })
        ));
        assert!(seq.set(3, 1).is_err());
        assert!(seq.insert(1, 1).is_err());
        assert!(seq.splice(0..2, [1]).is_err());
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn splice_rejects_bounds_past_usize_max() {
        let (seq, count) = counted::<i32>();
        seq.extend([1, 2]);
        let before = count.get();
        assert!(matches!(
            seq.splice(..=usize::MAX, [9]),
            Err(ConsoleError::IndexOutOfRange { index, len: 2 }) if index == usize::MAX
        ));
        assert!(matches!(
            seq.splice((Bound::Excluded(usize::MAX), Bound::Unbounded), [9]),
            Err(ConsoleError::IndexOutOfRange { .. })
        ));
        assert_eq!(seq.to_vec(), vec![1, 2]);
        assert_eq!(count.get(), before);
    }

    #[test]
    fn repeat_zero_clears() {
        let (seq, _) = counted::<i32>();
        seq.extend([1, 2, 3]);
        seq.repeat(0);
        assert!(seq.is_empty());
    }

    #[test]
    fn splice_returns_removed_items() {
        let (seq, _) = counted::<i32>();
        seq.extend([1, 2, 3, 4]);
        let removed = seq.splice(1..=2, [7, 8, 9]).unwrap();
        assert_eq!(removed, vec![2, 3]);
        assert_eq!(seq.to_vec(), vec![1, 7, 8, 9, 4]);
    }

    #[test]
    fn clones_share_storage_and_callback() {
        let (seq, count) = counted::<String>();
        let other = seq.clone();
        other.push("x");
        assert_eq!(seq.to_vec(), vec!["x".to_string()]);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn callback_may_read_the_sequence() {
        let seen = Rc::new(Cell::new(0));
        let storage = Rc::new(RefCell::new(Vec::<i32>::new()));
        let (reader, s) = (storage.clone(), seen.clone());
        let seq = ObservableSequence::from_shared(storage, move || s.set(reader.borrow().len()));
        seq.extend([1, 2, 3]);
        assert_eq!(seen.get(), 3);
    }
}
