//! # Feeders: input → bounded work channel.
//!
//! A feeder assigns sequential ids and pushes [`WorkItem`]s to the workers.
//! It owns the sending half; returning drops it, which closes the channel and
//! lets workers drain what is left and exit.
//!
//! Both feeders stop early when the run token is cancelled. Cancellation is
//! polled first so an aborted run does not keep enqueueing.

use tokio::select;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::tasks::WorkItem;

/// Feeds a batch in order; ids are the item indices.
pub(crate) async fn feed_batch<T>(
    tx: mpsc::Sender<WorkItem<T>>,
    items: Vec<T>,
    token: &CancellationToken,
) {
    for (id, payload) in items.into_iter().enumerate() {
        select! {
            biased;
            _ = token.cancelled() => break,
            sent = tx.send(WorkItem::new(id, payload)) => {
                if sent.is_err() {
                    break;
                }
            }
        }
    }
}

/// Feeds a caller-owned stream until it ends or the run is cancelled.
///
/// Returns the number of items pulled from `input`. An item is counted as soon
/// as it is pulled, even if cancellation prevents it from being queued.
pub(crate) async fn feed_stream<T>(
    tx: mpsc::Sender<WorkItem<T>>,
    input: &mut mpsc::Receiver<T>,
    token: &CancellationToken,
) -> usize {
    let mut pulled = 0;
    loop {
        let payload = select! {
            biased;
            _ = token.cancelled() => break,
            next = input.recv() => match next {
                Some(payload) => payload,
                None => break,
            },
        };

        let id = pulled;
        pulled += 1;

        select! {
            biased;
            _ = token.cancelled() => break,
            sent = tx.send(WorkItem::new(id, payload)) => {
                if sent.is_err() {
                    break;
                }
            }
        }
    }
    pulled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_batch_ids_are_sequential() {
        let (tx, mut rx) = mpsc::channel(8);
        let token = CancellationToken::new();

        feed_batch(tx, vec!["a", "b", "c"], &token).await;

        let mut seen = Vec::new();
        while let Some(w) = rx.recv().await {
            assert_eq!(w.attempt, 0);
            seen.push((w.id, w.payload));
        }
        assert_eq!(seen, vec![(0, "a"), (1, "b"), (2, "c")]);
    }

    #[tokio::test]
    async fn test_batch_stops_on_cancel() {
        let (tx, mut rx) = mpsc::channel(8);
        let token = CancellationToken::new();
        token.cancel();

        feed_batch(tx, vec![1, 2, 3], &token).await;
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_stream_counts_pulled_items() {
        let (in_tx, mut in_rx) = mpsc::channel(8);
        for n in 0..4 {
            in_tx.send(n).await.unwrap();
        }
        drop(in_tx);

        let (tx, mut rx) = mpsc::channel(8);
        let token = CancellationToken::new();
        let pulled = feed_stream(tx, &mut in_rx, &token).await;

        assert_eq!(pulled, 4);
        let mut ids = Vec::new();
        while let Some(w) = rx.recv().await {
            ids.push(w.id);
        }
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }
}
