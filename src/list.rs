//! Thread-safe registries of allocated objects.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies an item in a [`List`]. Ids are never reused by the same list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u64);

/// An ordered collection of items that registers objects as they are created
/// and deregisters them as they are disposed of.
pub struct List<T> {
    items: Mutex<Vec<(ItemId, T)>>,
    next_id: AtomicU64,
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> List<T> {
    pub fn new() -> Self {
        Self { items: Mutex::new(Vec::new()), next_id: AtomicU64::new(1) }
    }

    /// Adds an item to the end of the list and returns its id.
    pub fn append(&self, value: T) -> ItemId {
        let id = ItemId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.items.lock().push((id, value));
        id
    }

    /// Removes the item. Removing an item that is not in the list does nothing.
    pub fn remove(&self, id: ItemId) -> Option<T> {
        let mut items = self.items.lock();
        let pos = items.iter().position(|(item_id, _)| *item_id == id)?;
        Some( items.remove(pos).1 )
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Calls `f` on each item in insertion order. The list is locked during the iteration.
    pub fn for_each(&self, mut f: impl FnMut(ItemId, &T)) {
        for (id, item) in self.items.lock().iter() {
            f(*id, item);
        }
    }

    /// Removes all items, returning them in insertion order.
    pub fn drain(&self) -> Vec<T> {
        let items = std::mem::take(&mut *self.items.lock());
        items.into_iter().map(|(_, item)| item).collect()
    }
}

impl<T: Clone> List<T> {
    /// Returns a copy of the first item that satisfies the predicate.
    pub fn find(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.items.lock().iter().find(|(_, item)| pred(item)).map(|(_, item)| item.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn append_and_remove() {
        let list = List::new();
        let a = list.append("a");
        let b = list.append("b");
        let c = list.append("c");
        assert_eq!(list.len(), 3);
        assert_eq!(list.remove(b), Some("b"));
        assert_eq!(list.remove(b), None);

        let mut seen = Vec::new();
        list.for_each(|id, item| seen.push((id, *item)));
        assert_eq!(seen, vec![(a, "a"), (c, "c")]);
    }

    #[test]
    fn ids_are_not_reused() {
        let list = List::new();
        let a = list.append(1);
        list.remove(a);
        let b = list.append(2);
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn find_and_drain() {
        let list = List::new();
        list.append(String::from("EMP"));
        list.append(String::from("DEPT"));
        assert_eq!(list.find(|name| name.starts_with('D')), Some(String::from("DEPT")));
        assert_eq!(list.find(|name| name.is_empty()), None);
        assert_eq!(list.drain(), vec!["EMP", "DEPT"]);
        assert!(list.is_empty());
    }

    #[test]
    fn concurrent_registration() {
        let list = Arc::new(List::new());
        let handles : Vec<_> = (0..8).map(|n| {
            let list = list.clone();
            std::thread::spawn(move || {
                for i in 0..100 {
                    let id = list.append(n * 1000 + i);
                    if i % 2 == 0 {
                        list.remove(id);
                    }
                }
            })
        }).collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(list.len(), 8 * 50);
    }
}
