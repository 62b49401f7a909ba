//! B3 — fixed-capacity ring buffer.
//!
//! Ported from `examples/original_source/src/oatpp/core/data/buffer/FIFOBuffer.cpp`.
//! The original disambiguates the `readPos == writePos` empty/full tie with
//! a `canRead` flag; we keep that exact invariant rather than switching to
//! a capacity-minus-one scheme.

pub struct FifoBuffer {
    buffer: Vec<u8>,
    capacity: usize,
    read_pos: usize,
    write_pos: usize,
    can_read: bool,
}

impl FifoBuffer {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "FifoBuffer capacity must be > 0");
        Self { buffer: vec![0u8; capacity], capacity, read_pos: 0, write_pos: 0, can_read: false }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn available_to_read(&self) -> usize {
        if !self.can_read {
            return 0;
        }
        if self.read_pos < self.write_pos {
            self.write_pos - self.read_pos
        } else {
            self.capacity - self.read_pos + self.write_pos
        }
    }

    pub fn available_to_write(&self) -> usize {
        if self.can_read && self.write_pos == self.read_pos {
            return 0;
        }
        if self.write_pos < self.read_pos {
            self.read_pos - self.write_pos
        } else {
            self.capacity - self.write_pos + self.read_pos
        }
    }

    /// Invariant check used by tests: `bytesAvailable + bytesFree ==
    /// capacity`.
    #[cfg(test)]
    fn invariant_holds(&self) -> bool {
        self.available_to_read() + self.available_to_write() == self.capacity
    }

    /// Reads up to `dst.len()` bytes; returns the number actually read.
    pub fn read(&mut self, dst: &mut [u8]) -> usize {
        if !self.can_read || dst.is_empty() {
            return 0;
        }

        if self.read_pos < self.write_pos {
            let size = (self.write_pos - self.read_pos).min(dst.len());
            dst[..size].copy_from_slice(&self.buffer[self.read_pos..self.read_pos + size]);
            self.read_pos += size;
            if self.read_pos == self.write_pos {
                self.can_read = false;
            }
            return size;
        }

        let tail = self.capacity - self.read_pos;
        if tail > dst.len() {
            dst.copy_from_slice(&self.buffer[self.read_pos..self.read_pos + dst.len()]);
            self.read_pos += dst.len();
            return dst.len();
        }

        dst[..tail].copy_from_slice(&self.buffer[self.read_pos..self.capacity]);
        let remaining = dst.len() - tail;
        let head = remaining.min(self.write_pos);
        dst[tail..tail + head].copy_from_slice(&self.buffer[..head]);
        self.read_pos = head;
        if self.read_pos == self.write_pos {
            self.can_read = false;
        }
        tail + head
    }

    /// Writes up to `src.len()` bytes; returns the number actually written.
    pub fn write(&mut self, src: &[u8]) -> usize {
        if self.can_read && self.write_pos == self.read_pos {
            return 0;
        }
        if src.is_empty() {
            return 0;
        }
        self.can_read = true;

        if self.write_pos < self.read_pos {
            let size = (self.read_pos - self.write_pos).min(src.len());
            self.buffer[self.write_pos..self.write_pos + size].copy_from_slice(&src[..size]);
            self.write_pos += size;
            return size;
        }

        let tail = self.capacity - self.write_pos;
        if tail > src.len() {
            self.buffer[self.write_pos..self.write_pos + src.len()].copy_from_slice(src);
            self.write_pos += src.len();
            return src.len();
        }

        self.buffer[self.write_pos..self.capacity].copy_from_slice(&src[..tail]);
        let remaining = src.len() - tail;
        let head = remaining.min(self.read_pos);
        self.buffer[..head].copy_from_slice(&src[tail..tail + head]);
        self.write_pos = head;
        tail + head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer_reads_zero() {
        let mut fifo = FifoBuffer::new(8);
        let mut dst = [0u8; 4];
        assert_eq!(fifo.read(&mut dst), 0);
        assert!(fifo.invariant_holds());
    }

    #[test]
    fn write_then_read_round_trip() {
        let mut fifo = FifoBuffer::new(8);
        assert_eq!(fifo.write(b"abcd"), 4);
        let mut dst = [0u8; 4];
        assert_eq!(fifo.read(&mut dst), 4);
        assert_eq!(&dst, b"abcd");
        assert!(fifo.invariant_holds());
    }

    #[test]
    fn wraps_around_the_ring() {
        let mut fifo = FifoBuffer::new(4);
        assert_eq!(fifo.write(b"ab"), 2);
        let mut dst = [0u8; 1];
        assert_eq!(fifo.read(&mut dst), 1);
        assert_eq!(&dst, b"a");
        // write_pos=2, read_pos=1; writing 3 more bytes wraps past capacity.
        assert_eq!(fifo.write(b"cde"), 3);
        let mut out = [0u8; 4];
        assert_eq!(fifo.read(&mut out), 4);
        assert_eq!(&out, b"bcde");
        assert!(fifo.invariant_holds());
    }

    #[test]
    fn full_buffer_rejects_writes() {
        let mut fifo = FifoBuffer::new(4);
        assert_eq!(fifo.write(b"abcd"), 4);
        assert_eq!(fifo.available_to_write(), 0);
        assert_eq!(fifo.write(b"e"), 0);
    }

    proptest::proptest! {
        #[test]
        fn available_read_plus_write_always_equals_capacity(
            ops in proptest::collection::vec((proptest::bool::ANY, 1usize..6), 0..40)
        ) {
            let mut fifo = FifoBuffer::new(16);
            for (is_write, n) in ops {
                if is_write {
                    let data = vec![7u8; n];
                    fifo.write(&data);
                } else {
                    let mut buf = vec![0u8; n];
                    fifo.read(&mut buf);
                }
                assert_eq!(fifo.available_to_read() + fifo.available_to_write(), 16);
            }
        }
    }
}
