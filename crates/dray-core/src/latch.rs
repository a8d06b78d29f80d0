use std::sync::Mutex;

use tokio::sync::oneshot;

/// Single-assignment completion cell shared between the tasks of a
/// retrieval. Both the network side and the extraction side can race to
/// report an outcome; only the first write is delivered to the receiver.
pub struct CompletionLatch<T> {
    slot: Mutex<Option<oneshot::Sender<T>>>,
}

impl<T> CompletionLatch<T> {
    /// Creates a latch and the receiver its single value is delivered to.
    #[must_use]
    pub fn new() -> (Self, oneshot::Receiver<T>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                slot: Mutex::new(Some(tx)),
            },
            rx,
        )
    }

    /// Delivers `value` if nothing has been delivered yet. Returns whether
    /// this call decided the outcome; `false` means an earlier completion
    /// already won (or the receiver is gone) and `value` was dropped.
    pub fn complete(&self, value: T) -> bool {
        let Ok(mut slot) = self.slot.lock() else {
            return false;
        };
        match slot.take() {
            Some(tx) => tx.send(value).is_ok(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_completion_wins() {
        let (latch, mut rx) = CompletionLatch::new();
        assert!(latch.complete(1));
        assert!(!latch.complete(2));
        assert_eq!(rx.try_recv(), Ok(1));
    }

    #[test]
    fn test_complete_after_receiver_dropped() {
        let (latch, rx) = CompletionLatch::<u32>::new();
        drop(rx);
        assert!(!latch.complete(1));
    }

    #[test]
    fn test_shared_across_threads() {
        let (latch, mut rx) = CompletionLatch::new();
        let latch = std::sync::Arc::new(latch);

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let latch = std::sync::Arc::clone(&latch);
                std::thread::spawn(move || latch.complete(i))
            })
            .collect();

        let decided = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(decided, 1);
        assert!(rx.try_recv().is_ok());
    }
}
