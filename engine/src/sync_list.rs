//! Thread-safe ordered list shared by the spawner, movement and weapon tasks.
//!
//! Every operation goes through a single mutex. Iteration runs over a
//! snapshot taken under that mutex, so a callback may add to or remove from
//! the same list (a weapon removes the enemy it just killed).

use std::sync::{Mutex, MutexGuard};

/// Lock a std mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug)]
pub struct SyncList<T> {
    items: Mutex<Vec<T>>,
}

impl<T> Default for SyncList<T> {
    fn default() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
        }
    }
}

impl<T: Clone> SyncList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, item: T) {
        lock(&self.items).push(item);
    }

    /// Remove the first item equal to `item`.
    /// Returns false if it was not present, e.g. already removed by another task.
    pub fn remove(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.remove_where(|candidate| candidate == item)
    }

    /// Remove the first item matching `predicate`
    pub fn remove_where<F>(&self, predicate: F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        let mut items = lock(&self.items);
        match items.iter().position(predicate) {
            Some(index) => {
                items.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self) -> Vec<T> {
        lock(&self.items).clone()
    }

    /// Apply `action` to every item present when the call started
    pub fn for_each<F>(&self, mut action: F)
    where
        F: FnMut(&T),
    {
        for item in self.snapshot().iter() {
            action(item);
        }
    }

    /// Run `f` with exclusive access to the underlying storage.
    /// Do not call back into this list from inside `f`.
    pub fn with_lock<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut Vec<T>) -> R,
    {
        let mut items = lock(&self.items);
        f(&mut items)
    }

    pub fn count(&self) -> usize {
        lock(&self.items).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.items).is_empty()
    }

    pub fn any<F>(&self, predicate: F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        lock(&self.items).iter().any(predicate)
    }

    pub fn filter<F>(&self, predicate: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        lock(&self.items).iter().filter(|item| predicate(item)).cloned().collect()
    }

    pub fn get(&self, index: usize) -> Option<T> {
        lock(&self.items).get(index).cloned()
    }

    pub fn clear(&self) {
        lock(&self.items).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_basic_operations() {
        let list = SyncList::new();
        list.add(1);
        list.add(2);
        list.add(3);

        assert_eq!(list.count(), 3);
        assert_eq!(list.get(1), Some(2));
        assert_eq!(list.get(7), None);
        assert!(list.any(|v| *v == 3));
        assert_eq!(list.filter(|v| *v >= 2), vec![2, 3]);

        assert!(list.remove(&2));
        assert_eq!(list.snapshot(), vec![1, 3]);
    }

    #[test]
    fn test_second_remove_is_noop() {
        let list = SyncList::new();
        list.add("golem");
        assert!(list.remove(&"golem"));
        assert!(!list.remove(&"golem"));
        assert!(list.is_empty());
    }

    #[test]
    fn test_remove_inside_for_each() {
        let list = SyncList::new();
        for i in 0..10 {
            list.add(i);
        }

        let mut visited = 0;
        list.for_each(|item| {
            visited += 1;
            if item % 2 == 0 {
                assert!(list.remove(item));
            }
        });

        assert_eq!(visited, 10);
        assert_eq!(list.snapshot(), vec![1, 3, 5, 7, 9]);
    }

    #[test]
    fn test_concurrent_add_remove_iterate() {
        let list = Arc::new(SyncList::new());
        let mut handles = Vec::new();

        for t in 0..4 {
            let list = list.clone();
            handles.push(thread::spawn(move || {
                for i in 0..500 {
                    list.add(t * 1000 + i);
                }
                for i in 0..250 {
                    list.remove(&(t * 1000 + i));
                }
            }));
        }
        for _ in 0..2 {
            let list = list.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..200 {
                    let mut seen = 0;
                    list.for_each(|_| seen += 1);
                    let _ = list.filter(|v| v % 3 == 0);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(list.count(), 4 * 250);
    }

    #[test]
    fn test_with_lock_compound_update() {
        let list = SyncList::new();
        list.add(5);
        let len = list.with_lock(|items| {
            items.push(6);
            items.iter_mut().for_each(|v| *v *= 10);
            items.len()
        });
        assert_eq!(len, 2);
        assert_eq!(list.snapshot(), vec![50, 60]);
    }
}
