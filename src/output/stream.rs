//! Artifact byte stream

use crate::error::Result;
use bytes::Bytes;
use futures::stream::{BoxStream, Stream};
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

/// The backup file as it comes off the wire
pub type ArtifactStream = BoxStream<'static, Result<Bytes>>;

/// Shared view of how many bytes a [`CountingStream`] has yielded
#[derive(Debug, Clone, Default)]
pub struct ByteCounter(Arc<AtomicU64>);

impl ByteCounter {
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    fn add(&self, n: usize) {
        self.0.fetch_add(n as u64, Ordering::Relaxed);
    }
}

pin_project! {
    /// Passes chunks through untouched while counting their bytes
    pub struct CountingStream<S> {
        #[pin]
        inner: S,
        counter: ByteCounter,
    }
}

impl<S> CountingStream<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            counter: ByteCounter::default(),
        }
    }

    /// Handle that stays readable after the stream is consumed
    pub fn counter(&self) -> ByteCounter {
        self.counter.clone()
    }
}

impl<S> Stream for CountingStream<S>
where
    S: Stream<Item = Result<Bytes>>,
{
    type Item = Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        let item = this.inner.poll_next(cx);
        if let Poll::Ready(Some(Ok(chunk))) = &item {
            this.counter.add(chunk.len());
        }
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
