//! Flush protocol tests: notify_flush / wait_flush / pop / confirm

#[cfg(test)]
mod tests {
    use super::super::test_queue;
    use crate::queue::api::QueueError;
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn test_wait_flush_released_by_confirm() {
        let queue = Arc::new(test_queue::<u32>("confirm_log", 64));
        for i in 0..10 {
            queue.add(i);
        }
        let offset = queue.notify_flush(false).unwrap();
        assert_eq!(offset, 10);

        let waiter_queue = Arc::clone(&queue);
        let waiter = thread::spawn(move || waiter_queue.wait_flush(offset));

        let mut batch = Vec::new();
        let popped = queue.pop(&mut batch);
        assert_eq!(batch.len(), 10);
        assert_eq!(popped.to_flush_end, offset);
        queue.confirm(popped.to_flush_end);

        assert!(waiter.join().unwrap().is_ok());
    }

    #[test]
    fn test_wait_flush_times_out_without_drain() {
        let queue = test_queue::<u32>("stalled_log", 64);
        queue.add(1);
        let offset = queue.notify_flush(false).unwrap();

        let start = Instant::now();
        let result = queue.wait_flush(offset);
        let elapsed = start.elapsed();

        match result {
            Err(QueueError::TimeoutExceeded { queue: name, timeout }) => {
                assert_eq!(name, "stalled_log");
                assert_eq!(timeout, Duration::from_millis(500));
            }
            other => panic!("Expected TimeoutExceeded, got {:?}", other),
        }
        assert!(elapsed >= Duration::from_millis(500));
        assert!(elapsed < Duration::from_secs(10), "Wait must be bounded");
    }

    #[test]
    fn test_timeout_message_names_queue() {
        let queue = test_queue::<u32>("named_log", 64);
        let err = queue.wait_flush(1).unwrap_err();

        assert_eq!(err.queue(), "named_log");
        assert!(err.to_string().contains("named_log"));
        assert!(err.to_string().contains("Timeout exceeded"));
    }

    #[test]
    fn test_partial_confirm_keeps_later_waiters_blocked() {
        let queue = Arc::new(test_queue::<u32>("partial_log", 64));
        queue.add(1);
        queue.add(2);
        let first = queue.notify_flush(false).unwrap();

        let mut batch = Vec::new();
        let popped = queue.pop(&mut batch);
        queue.add(3);
        let second = queue.notify_flush(false).unwrap();
        queue.confirm(popped.to_flush_end);

        assert!(queue.wait_flush(first).is_ok());
        assert!(matches!(
            queue.wait_flush(second),
            Err(QueueError::TimeoutExceeded { .. })
        ));
    }

    #[test]
    fn test_force_flag_reported_and_cleared_by_confirm() {
        let queue = test_queue::<u32>("force_log", 64);
        let offset = queue.notify_flush(true).unwrap();

        let mut batch = Vec::new();
        let popped = queue.pop(&mut batch);
        assert!(popped.should_prepare_tables_anyway);
        assert!(batch.is_empty());

        queue.confirm(popped.to_flush_end);
        assert!(queue.wait_flush(offset).is_ok());

        queue.notify_flush(false);
        let popped = queue.pop(&mut batch);
        assert!(!popped.should_prepare_tables_anyway);
    }

    #[test]
    fn test_force_request_is_sticky_across_callers() {
        let queue = test_queue::<u32>("sticky_log", 64);
        queue.notify_flush(true);
        queue.notify_flush(false);

        let mut batch = Vec::new();
        assert!(queue.pop(&mut batch).should_prepare_tables_anyway);
    }

    #[test]
    fn test_notify_flush_never_lowers_request() {
        let queue = test_queue::<u32>("request_log", 64);
        for i in 0..6 {
            queue.add(i);
        }
        queue.notify_flush(false);

        let mut batch = Vec::new();
        let popped = queue.pop(&mut batch);
        assert_eq!(popped.to_flush_end, 6);

        // Empty buffer: this caller's offset equals front_index, same as before
        assert_eq!(queue.notify_flush(false), Some(6));
        assert_eq!(queue.stats().requested_flush_up_to, 6);
    }

    #[test]
    fn test_pop_sleeps_for_flush_interval_without_request() {
        let queue = test_queue::<u32>("idle_log", 64);
        let mut batch = Vec::new();

        let start = Instant::now();
        queue.pop(&mut batch);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_pop_woken_by_notify_flush() {
        let queue = Arc::new(test_queue::<u32>("wakeup_log", 64));
        let mut batch = Vec::new();
        let popped = queue.pop(&mut batch);
        queue.confirm(popped.to_flush_end);

        let producer_queue = Arc::clone(&queue);
        let producer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(5));
            producer_queue.add(42);
            producer_queue.notify_flush(false)
        });

        let mut drained = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(5);
        while drained.is_empty() && Instant::now() < deadline {
            queue.pop(&mut batch);
            drained.extend(batch.drain(..));
        }

        assert_eq!(producer.join().unwrap(), Some(1));
        assert_eq!(drained, vec![42]);
    }
}
