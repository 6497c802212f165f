//! Restart-on-fault supervision for long-running background loops.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures_util::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Run `body` until `cancel` fires, restarting it whenever it returns or
/// panics.
///
/// Each restart waits at least `restart_delay`, so a body that fails
/// immediately cannot spin.
pub async fn supervise<F, Fut>(
    name: &'static str,
    restart_delay: Duration,
    cancel: CancellationToken,
    mut body: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut restarts: u64 = 0;

    loop {
        let outcome = AssertUnwindSafe(body()).catch_unwind().await;
        if cancel.is_cancelled() {
            break;
        }

        restarts += 1;
        match outcome {
            Ok(()) => warn!(name, restarts, "Background loop exited, restarting"),
            Err(payload) => error!(
                name,
                restarts,
                panic = %panic_message(payload.as_ref()),
                "Background loop panicked, restarting"
            ),
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(restart_delay) => {}
        }
    }

    info!(name, "Background loop stopped");
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn panic_message_reads_str_and_string_payloads() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn Any + Send> = Box::new(String::from("kaboom"));
        assert_eq!(panic_message(payload.as_ref()), "kaboom");

        let payload: Box<dyn Any + Send> = Box::new(42_u32);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic payload");
    }

    #[tokio::test(start_paused = true)]
    async fn restarts_after_panic_and_early_return() {
        let runs = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();

        let body = {
            let runs = Arc::clone(&runs);
            let cancel = cancel.clone();
            move || {
                let run = runs.fetch_add(1, Ordering::SeqCst);
                let cancel = cancel.clone();
                async move {
                    match run {
                        0 => panic!("first run fails"),
                        1 => {}
                        _ => cancel.cancel(),
                    }
                }
            }
        };

        supervise("test-loop", Duration::from_secs(1), cancel.clone(), body).await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_waits_for_the_delay() {
        let cancel = CancellationToken::new();
        let started = tokio::time::Instant::now();
        let runs = Arc::new(AtomicUsize::new(0));

        let body = {
            let runs = Arc::clone(&runs);
            let cancel = cancel.clone();
            move || {
                let run = runs.fetch_add(1, Ordering::SeqCst);
                let cancel = cancel.clone();
                async move {
                    if run == 1 {
                        cancel.cancel();
                    }
                }
            }
        };

        supervise("test-loop", Duration::from_secs(5), cancel, body).await;
        assert!(started.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test]
    async fn cancelled_body_is_not_restarted() {
        let cancel = CancellationToken::new();
        let runs = Arc::new(AtomicUsize::new(0));

        let body = {
            let runs = Arc::clone(&runs);
            let cancel = cancel.clone();
            move || {
                runs.fetch_add(1, Ordering::SeqCst);
                let cancel = cancel.clone();
                async move { cancel.cancelled().await }
            }
        };

        cancel.cancel();
        supervise("test-loop", Duration::from_secs(60), cancel, body).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
