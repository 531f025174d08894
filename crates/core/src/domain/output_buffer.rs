// Output Buffer - append-only byte sink shared by one writer and many readers

use std::sync::{Mutex, MutexGuard};

/// Append-only byte buffer.
///
/// The process pump is the only writer; status pollers read concurrently.
/// The lock is independent of the registry lock and never held across an
/// await point.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    bytes: Mutex<Vec<u8>>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    // Poisoning is recovered: a Vec append leaves no partial state
    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.bytes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append bytes at the end of the buffer
    pub fn append(&self, chunk: &[u8]) {
        if chunk.is_empty() {
            return;
        }
        self.lock().extend_from_slice(chunk);
    }

    /// Current length in bytes
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of `[from, to)`, clamped to the current length
    pub fn read_range(&self, from: usize, to: usize) -> Vec<u8> {
        let bytes = self.lock();
        let end = to.min(bytes.len());
        if from >= end {
            return Vec::new();
        }
        bytes[from..end].to_vec()
    }

    /// Full contents decoded lossily as UTF-8
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.lock()).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_read_range_is_clamped() {
        let buffer = OutputBuffer::new();
        buffer.append(b"hello");

        assert_eq!(buffer.read_range(0, 100), b"hello".to_vec());
        assert_eq!(buffer.read_range(3, 5), b"lo".to_vec());
        assert!(buffer.read_range(5, 10).is_empty());
        assert!(buffer.read_range(9, 20).is_empty());
    }

    #[test]
    fn test_previously_read_bytes_are_stable() {
        let buffer = OutputBuffer::new();
        buffer.append(b"abc");
        let first = buffer.read_range(0, buffer.len());

        buffer.append(b"def");

        assert_eq!(buffer.read_range(0, first.len()), first);
        assert_eq!(buffer.to_string_lossy(), "abcdef");
    }

    #[test]
    fn test_concurrent_writer_and_readers() {
        let buffer = Arc::new(OutputBuffer::new());

        let writer = {
            let buffer = Arc::clone(&buffer);
            std::thread::spawn(move || {
                for _ in 0..1000 {
                    buffer.append(b"x");
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let buffer = Arc::clone(&buffer);
                std::thread::spawn(move || {
                    let mut last = 0;
                    for _ in 0..200 {
                        let len = buffer.len();
                        assert!(len >= last, "length must never shrink");
                        assert!(buffer.read_range(0, len).iter().all(|b| *b == b'x'));
                        last = len;
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }

        assert_eq!(buffer.len(), 1000);
    }
}
