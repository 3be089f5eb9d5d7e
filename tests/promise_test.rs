#[cfg(test)]
mod tests {
    use fetch_promise::{Outcome, Promise};
    use futures::executor::block_on;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::{thread, time::Duration};

    const ROUNDS: usize = 200;

    #[test]
    fn test_registration_racing_completion_fires_exactly_once() {
        for _ in 0..ROUNDS {
            let promise = Promise::<u32, String>::new();
            let fired = Arc::new(AtomicUsize::new(0));
            let barrier = Arc::new(Barrier::new(2));

            let (future, counter, gate) = (promise.future(), fired.clone(), barrier.clone());
            let registrar = thread::spawn(move || {
                gate.wait();
                future.on_success(move |value| {
                    assert_eq!(value, 7);
                    counter.fetch_add(1, Ordering::SeqCst);
                });
            });
            let gate = barrier.clone();
            let producer = promise.clone();
            let completer = thread::spawn(move || {
                gate.wait();
                producer.succeed(7)
            });

            registrar.join().expect("The registrar thread has panicked");
            assert!(completer.join().expect("The completer thread has panicked"));
            assert_eq!(fired.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn test_concurrent_completions_commit_once() {
        for _ in 0..ROUNDS {
            let promise = Promise::<usize, usize>::new();
            let fired = Arc::new(AtomicUsize::new(0));
            let counter = fired.clone();
            promise.future().on_completion(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });

            let barrier = Arc::new(Barrier::new(3));
            let handles: Vec<_> = (0..3)
                .map(|n| {
                    let (promise, barrier) = (promise.clone(), barrier.clone());
                    thread::spawn(move || {
                        barrier.wait();
                        match n {
                            0 => promise.succeed(n),
                            1 => promise.fail(n),
                            _ => promise.cancel(),
                        }
                    })
                })
                .collect();
            let committed = handles
                .into_iter()
                .map(|handle| handle.join().expect("A completer thread has panicked"))
                .filter(|committed| *committed)
                .count();

            assert_eq!(committed, 1);
            assert_eq!(fired.load(Ordering::SeqCst), 1);
            let future = promise.future();
            let states = [future.is_succeeded(), future.is_failed(), future.is_canceled()];
            assert_eq!(states.iter().filter(|state| **state).count(), 1);
        }
    }

    #[test]
    fn test_many_listeners_from_many_threads() {
        let promise = Promise::<String, ()>::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let registrars: Vec<_> = (0..8)
            .map(|_| {
                let (future, counter) = (promise.future(), fired.clone());
                thread::spawn(move || {
                    for _ in 0..50 {
                        let counter = counter.clone();
                        future.on_success(move |value| {
                            assert_eq!(value, "🍓");
                            counter.fetch_add(1, Ordering::SeqCst);
                        });
                    }
                })
            })
            .collect();
        thread::sleep(Duration::from_millis(1));
        promise.succeed(String::from("🍓"));
        for registrar in registrars {
            registrar.join().expect("A registrar thread has panicked");
        }
        assert_eq!(fired.load(Ordering::SeqCst), 8 * 50);
    }

    #[test]
    fn test_promise_resolved_from_worker_thread() {
        let promise = Promise::<i32, String>::new();
        let producer = promise.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            producer.succeed(42);
        });

        let result = block_on(promise.future()).into_result().unwrap();
        assert_eq!(result, 42);
    }

    #[test]
    fn test_failure_is_silent_without_listener() {
        let promise = Promise::<i32, String>::new();
        assert!(promise.fail("nobody listens".into()));
        assert_eq!(
            promise.future().outcome(),
            Some(Outcome::Failure("nobody listens".to_string()))
        );
    }
}
