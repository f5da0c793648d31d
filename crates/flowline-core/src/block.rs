//! Fixed-size block adaptation.
//!
//! Audio callbacks and file readers often deliver data in blocks of one
//! fixed size while the graph wants arbitrary frame counts (or the other
//! way round). [`FixedBlockReader`] sits between a [`BlockProducer`] that
//! only ever fills whole blocks and a caller reading any number of bytes;
//! [`FixedBlockWriter`] does the same for a [`BlockConsumer`] on the
//! output side.
//!
//! Both keep exactly one block of storage. Whole blocks are passed straight
//! through without touching it.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

/// Fills fixed-size blocks on demand.
pub trait BlockProducer {
    /// Fills `block` (always exactly one block long) and returns the bytes
    /// written.
    ///
    /// 0 means end of stream or underrun. `timeout_nanos` is how long the
    /// producer may wait for data.
    fn produce(&mut self, block: &mut [u8], timeout_nanos: u64) -> usize;
}

impl<T> BlockProducer for T
where
    T: FnMut(&mut [u8], u64) -> usize,
{
    fn produce(&mut self, block: &mut [u8], timeout_nanos: u64) -> usize {
        self(block, timeout_nanos)
    }
}

/// Accepts fixed-size blocks.
pub trait BlockConsumer {
    /// Takes one block and returns the bytes accepted.
    fn consume(&mut self, block: &[u8]) -> usize;
}

impl<T> BlockConsumer for T
where
    T: FnMut(&[u8]) -> usize,
{
    fn consume(&mut self, block: &[u8]) -> usize {
        self(block)
    }
}

/// Reads arbitrary byte counts from a [`BlockProducer`].
#[derive(Debug, Clone)]
pub struct FixedBlockReader {
    storage: Vec<u8>,
    position: usize,
    valid: usize,
}

impl FixedBlockReader {
    /// Creates a reader for blocks of `bytes_per_block` bytes.
    pub fn new(bytes_per_block: usize) -> Self {
        Self {
            storage: vec![0; bytes_per_block],
            position: 0,
            valid: 0,
        }
    }

    /// Size of one block.
    pub fn bytes_per_block(&self) -> usize {
        self.storage.len()
    }

    /// Bytes left over from the last stored block.
    pub fn available(&self) -> usize {
        self.valid - self.position
    }

    /// Drops any stored bytes.
    pub fn reset(&mut self) {
        self.position = 0;
        self.valid = 0;
    }

    /// Fills `dest` from storage and the producer.
    ///
    /// Stored bytes go first. After that, while at least one whole block is
    /// still wanted the producer writes straight into `dest`; a smaller
    /// remainder is served by producing one block into storage. Stops early
    /// when the producer returns 0. Returns the bytes written to `dest`.
    ///
    /// The reader knows nothing about frames. A producer that returns a
    /// short block makes the count short by the same bytes, so it need not
    /// be a multiple of the caller's frame size; callers carry the partial
    /// frame themselves.
    pub fn read<P>(&mut self, dest: &mut [u8], producer: &mut P, timeout_nanos: u64) -> usize
    where
        P: BlockProducer + ?Sized,
    {
        let block = self.storage.len();
        if block == 0 {
            return 0;
        }
        let mut filled = 0;
        while filled < dest.len() {
            let wanted = dest.len() - filled;
            if self.position < self.valid {
                let count = wanted.min(self.valid - self.position);
                dest[filled..filled + count]
                    .copy_from_slice(&self.storage[self.position..self.position + count]);
                self.position += count;
                filled += count;
            } else if wanted >= block {
                let produced = producer
                    .produce(&mut dest[filled..filled + block], timeout_nanos)
                    .min(block);
                if produced == 0 {
                    break;
                }
                filled += produced;
            } else {
                let produced = producer.produce(&mut self.storage, timeout_nanos).min(block);
                self.valid = produced;
                self.position = 0;
                if produced == 0 {
                    break;
                }
            }
        }
        filled
    }
}

/// Writes arbitrary byte counts to a [`BlockConsumer`] in whole blocks.
#[derive(Debug, Clone)]
pub struct FixedBlockWriter {
    storage: Vec<u8>,
    position: usize,
}

impl FixedBlockWriter {
    /// Creates a writer for blocks of `bytes_per_block` bytes.
    pub fn new(bytes_per_block: usize) -> Self {
        Self {
            storage: vec![0; bytes_per_block],
            position: 0,
        }
    }

    /// Size of one block.
    pub fn bytes_per_block(&self) -> usize {
        self.storage.len()
    }

    /// Bytes waiting for the rest of their block.
    pub fn pending(&self) -> usize {
        self.position
    }

    /// Drops any pending bytes.
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Queues `src`, handing every completed block to `consumer`.
    ///
    /// Returns the bytes taken from `src`. Bytes that do not complete a
    /// block stay pending. If the consumer accepts less than a whole block
    /// the write stops there.
    pub fn write<C>(&mut self, src: &[u8], consumer: &mut C) -> usize
    where
        C: BlockConsumer + ?Sized,
    {
        let block = self.storage.len();
        if block == 0 {
            return 0;
        }
        let mut taken = 0;

        if self.position > 0 {
            let count = (block - self.position).min(src.len());
            self.storage[self.position..self.position + count].copy_from_slice(&src[..count]);
            self.position += count;
            taken += count;
            if self.position < block {
                return taken;
            }
            let accepted = consumer.consume(&self.storage);
            self.position = 0;
            if accepted < block {
                return taken;
            }
        }

        while src.len() - taken >= block {
            let accepted = consumer.consume(&src[taken..taken + block]).min(block);
            taken += accepted;
            if accepted < block {
                return taken;
            }
        }

        let rest = src.len() - taken;
        if rest > 0 {
            self.storage[..rest].copy_from_slice(&src[taken..]);
            self.position = rest;
            taken += rest;
        }
        taken
    }

    /// Hands the pending partial block to `consumer`, zero padded.
    ///
    /// Returns the pending byte count that was flushed.
    pub fn flush<C>(&mut self, consumer: &mut C) -> usize
    where
        C: BlockConsumer + ?Sized,
    {
        let pending = self.position;
        if pending == 0 {
            return 0;
        }
        self.storage[pending..].fill(0);
        consumer.consume(&self.storage);
        self.position = 0;
        pending
    }
}
