use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

/// A blocking FIFO queue shared between the coordinator and its workers.
///
/// `dequeue` parks the calling thread on a condition variable instead of
/// busy-polling; `enqueue` wakes exactly one waiter. Items are served in
/// the order they were pushed, with no priority and no notion of closing
/// the queue — workers decide when to stop pulling from it.
pub struct WorkQueue<T> {
    items: Mutex<VecDeque<T>>,
    not_empty: Condvar,
}

impl<T> WorkQueue<T> {
    pub fn new() -> Self {
        WorkQueue {
            items: Mutex::new(VecDeque::new()),
            not_empty: Condvar::new(),
        }
    }

    pub fn from_vec(items: Vec<T>) -> Self {
        WorkQueue {
            items: Mutex::new(VecDeque::from(items)),
            not_empty: Condvar::new(),
        }
    }

    /// Pushes `item` to the back of the queue and wakes one blocked dequeuer.
    pub fn enqueue(&self, item: T) {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        items.push_back(item);
        self.not_empty.notify_one();
    }

    /// Blocks until an item is available, then pops it from the front.
    pub fn dequeue(&self) -> T {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if let Some(item) = items.pop_front() {
                return item;
            }
            items = self
                .not_empty
                .wait(items)
                .unwrap_or_else(|e| e.into_inner());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().unwrap_or_else(|e| e.into_inner()).is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn enqueue_then_dequeue_is_fifo() {
        let queue = WorkQueue::new();
        queue.enqueue(1);
        queue.enqueue(2);
        queue.enqueue(3);

        assert_eq!(queue.dequeue(), 1);
        assert_eq!(queue.dequeue(), 2);
        assert_eq!(queue.dequeue(), 3);
    }

    #[test]
    fn dequeue_blocks_until_item_available() {
        let queue = Arc::new(WorkQueue::new());
        let queue_clone = queue.clone();

        let handle = thread::spawn(move || queue_clone.dequeue());

        thread::sleep(Duration::from_millis(50));
        assert!(queue.is_empty());
        queue.enqueue(42);

        let result = handle.join().unwrap();
        assert_eq!(result, 42);
    }

    #[test]
    fn len_and_is_empty_reflect_contents() {
        let queue = WorkQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);

        queue.enqueue("a");
        queue.enqueue("b");

        assert!(!queue.is_empty());
        assert_eq!(queue.len(), 2);
    }
}
