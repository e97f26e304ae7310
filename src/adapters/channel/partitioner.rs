//! Key-based partition selection shared by the channel providers.

use std::sync::atomic::{AtomicU32, Ordering};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Maps message keys to partitions.
///
/// Keyed messages always land on the same partition (FNV-1a of the key);
/// keyless messages rotate over all partitions.
#[derive(Debug)]
pub struct Partitioner {
    partitions: u32,
    next: AtomicU32,
}

impl Partitioner {
    /// A partition count of zero is treated as one.
    pub fn new(partitions: u32) -> Self {
        Self {
            partitions: partitions.max(1),
            next: AtomicU32::new(0),
        }
    }

    pub fn partitions(&self) -> u32 {
        self.partitions
    }

    pub fn partition_for(&self, key: Option<&str>) -> u32 {
        match key {
            Some(key) => (fnv1a(key.as_bytes()) % u64::from(self.partitions)) as u32,
            None => self.next.fetch_add(1, Ordering::Relaxed) % self.partitions,
        }
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv1a_matches_reference_vectors() {
        assert_eq!(fnv1a(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a(b"a"), 0xaf63_dc4c_8601_ec8c);
        assert_eq!(fnv1a(b"foobar"), 0x8594_4171_f739_67e8);
    }

    #[test]
    fn same_key_same_partition() {
        let partitioner = Partitioner::new(3);
        let first = partitioner.partition_for(Some("bob"));

        for _ in 0..10 {
            assert_eq!(partitioner.partition_for(Some("bob")), first);
        }
        assert!(first < 3);
    }

    #[test]
    fn keyless_messages_rotate() {
        let partitioner = Partitioner::new(3);
        let picked: Vec<u32> = (0..6).map(|_| partitioner.partition_for(None)).collect();

        assert_eq!(picked, vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn zero_partitions_means_one() {
        let partitioner = Partitioner::new(0);

        assert_eq!(partitioner.partitions(), 1);
        assert_eq!(partitioner.partition_for(Some("anyone")), 0);
    }
}
