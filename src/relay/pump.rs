use std::{io, sync::Arc};

use bytes::Bytes;
use futures::StreamExt;
use tokio::sync::{Semaphore, mpsc};

use crate::{
    common::types::ByteStream,
    configs::RelayConfig,
    relay::session::RelayOutcome,
};

/// Copies an upstream byte stream into a channel drained by the HTTP body.
///
/// At most `high_water_mark` bytes sit between the upstream read and the
/// client: the pump takes permits from a byte budget before queueing a chunk
/// and the downstream side returns them when the chunk leaves the queue.
/// The pump stops as soon as the downstream half is dropped.
pub struct Pump {
    upstream: ByteStream,
    tx: mpsc::Sender<io::Result<Bytes>>,
    budget: Arc<Semaphore>,
    high_water_mark: usize,
}

struct Downstream {
    rx: mpsc::Receiver<io::Result<Bytes>>,
    budget: Arc<Semaphore>,
}

/// Splits `upstream` into a pump to drive and the stream to hand to the client.
pub fn channel(upstream: ByteStream, config: &RelayConfig) -> (Pump, ByteStream) {
    // acquire_many takes a u32 count.
    let high_water_mark = config.high_water_mark.clamp(1, u32::MAX as usize);
    let (tx, rx) = mpsc::channel(config.channel_depth.max(1));
    let budget = Arc::new(Semaphore::new(high_water_mark));

    let downstream = futures::stream::unfold(
        Downstream {
            rx,
            budget: budget.clone(),
        },
        |mut state| async move {
            let item = state.rx.recv().await?;
            if let Ok(chunk) = &item {
                state.budget.add_permits(chunk.len());
            }
            Some((item, state))
        },
    )
    .boxed();

    (
        Pump {
            upstream,
            tx,
            budget,
            high_water_mark,
        },
        downstream,
    )
}

impl Pump {
    pub async fn run(mut self) -> RelayOutcome {
        let mut bytes = 0u64;

        loop {
            let item = tokio::select! {
                biased;
                _ = self.tx.closed() => return RelayOutcome::Disconnected { bytes },
                item = self.upstream.next() => item,
            };

            match item {
                None => return RelayOutcome::Completed { bytes },
                Some(Ok(mut chunk)) => {
                    while !chunk.is_empty() {
                        let piece = chunk.split_to(chunk.len().min(self.high_water_mark));
                        let len = piece.len();

                        let permit = tokio::select! {
                            biased;
                            _ = self.tx.closed() => return RelayOutcome::Disconnected { bytes },
                            permit = self.budget.acquire_many(len as u32) => permit,
                        };
                        match permit {
                            Ok(permit) => permit.forget(),
                            Err(_) => return RelayOutcome::Disconnected { bytes },
                        }

                        if self.tx.send(Ok(piece)).await.is_err() {
                            return RelayOutcome::Disconnected { bytes };
                        }
                        bytes += len as u64;
                    }
                }
                Some(Err(e)) => {
                    let error = e.to_string();
                    let _ = self.tx.send(Err(e)).await;
                    return RelayOutcome::Failed { bytes, error };
                }
            }
        }
    }
}
