use std::future::{self, Future};

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::CryptoResult;

/// Anything that can hand over its complete contents as an in-memory buffer.
///
/// In-memory buffers resolve immediately; streaming sources are read to the end.
pub trait ByteSource {
    fn materialize(self) -> impl Future<Output = CryptoResult<Vec<u8>>> + Send;
}

impl ByteSource for Vec<u8> {
    fn materialize(self) -> impl Future<Output = CryptoResult<Vec<u8>>> + Send {
        future::ready(Ok(self))
    }
}

impl ByteSource for &[u8] {
    fn materialize(self) -> impl Future<Output = CryptoResult<Vec<u8>>> + Send {
        future::ready(Ok(self.to_vec()))
    }
}

impl ByteSource for Bytes {
    fn materialize(self) -> impl Future<Output = CryptoResult<Vec<u8>>> + Send {
        future::ready(Ok(Vec::from(self)))
    }
}

/// Adapts an async reader (file, socket, pipe) into a [`ByteSource`].
#[derive(Debug)]
pub struct Reader<R>(pub R);

impl<R> Reader<R> {
    pub fn new(reader: R) -> Self {
        Self(reader)
    }
}

impl<R> ByteSource for Reader<R>
where
    R: AsyncRead + Unpin + Send,
{
    fn materialize(self) -> impl Future<Output = CryptoResult<Vec<u8>>> + Send {
        let mut reader = self.0;
        async move {
            let mut buf = Vec::new();
            reader.read_to_end(&mut buf).await?;
            Ok(buf)
        }
    }
}
