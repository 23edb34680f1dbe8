//! Batched penetration queries on a [`Scheduler`].
//!
//! A [`ContactBatch`] runs [`Aabb::compute_penetration`] for a list of box pairs
//! as one parallel-for job. Every index writes only its own result slot, so the
//! collected contacts come back in pair order no matter how many threads ran
//! the batch.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};

use crate::geometry::{Aabb, Penetration};
use crate::jobs::{JobError, JobHandle, Scheduler};

/// A penetrating pair: box `a` must move by `penetration` to leave box `b`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub a: usize,
    pub b: usize,
    pub penetration: Penetration,
}

/// Every unordered pair `(i, j)` with `i < j < count`, in lexicographic order.
pub fn all_pairs(count: usize) -> Vec<(usize, usize)> {
    let mut pairs = Vec::with_capacity(count * count.saturating_sub(1) / 2);
    for i in 0..count {
        for j in (i + 1)..count {
            pairs.push((i, j));
        }
    }
    pairs
}

/// Penetration queries submitted as one parallel-for job.
pub struct ContactBatch {
    pairs: Arc<[(usize, usize)]>,
    results: Arc<[OnceLock<Option<Penetration>>]>,
    handle: JobHandle,
}

impl ContactBatch {
    /// Schedules `compute_penetration(boxes[a], boxes[b])` for every `(a, b)` in
    /// `pairs`, after `depends_on`.
    ///
    /// Pair indices must be in range for `boxes`; an out-of-range pair panics
    /// inside the job and is reported as missing from the results.
    pub fn schedule(
        scheduler: &Scheduler,
        boxes: Arc<[Aabb]>,
        pairs: Arc<[(usize, usize)]>,
        depends_on: JobHandle,
    ) -> Result<Self, JobError> {
        let results: Arc<[OnceLock<Option<Penetration>>]> =
            (0..pairs.len()).map(|_| OnceLock::new()).collect();

        let job_pairs = Arc::clone(&pairs);
        let job_results = Arc::clone(&results);
        let handle = scheduler.schedule_parallel(
            move |index: usize| {
                let (a, b) = job_pairs[index];
                let _ = job_results[index].set(Aabb::compute_penetration(boxes[a], boxes[b]));
            },
            pairs.len(),
            depends_on,
        )?;

        Ok(Self { pairs, results, handle })
    }

    pub fn handle(&self) -> JobHandle {
        self.handle
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Waits for the batch and returns the penetrating pairs in pair order.
    pub fn wait(self, scheduler: &Scheduler) -> Result<Vec<Contact>, JobError> {
        scheduler.wait(self.handle)?;
        Ok(self
            .pairs
            .iter()
            .zip(self.results.iter())
            .filter_map(|(&(a, b), slot)| {
                slot.get()
                    .copied()
                    .flatten()
                    .map(|penetration| Contact { a, b, penetration })
            })
            .collect())
    }
}

/// Order-sensitive fingerprint of a contact list built from the raw fixed-point
/// bits, for comparing runs across machines.
pub fn contacts_checksum(contacts: &[Contact]) -> u64 {
    const PRIME: u64 = 0x0000_0100_0000_01B3;
    let mut hash: u64 = 0xCBF2_9CE4_8422_2325;
    let mut mix = |value: u64| {
        hash ^= value;
        hash = hash.wrapping_mul(PRIME);
    };

    for contact in contacts {
        let p = contact.penetration;
        mix(contact.a as u64);
        mix(contact.b as u64);
        mix(p.direction.x.to_bits() as u64);
        mix(p.direction.y.to_bits() as u64);
        mix(p.distance.to_bits() as u64);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;
    use crate::fixed_math::FixedVec2;

    fn boxed(min: (i32, i32), max: (i32, i32)) -> Aabb {
        Aabb::new(FixedVec2::from_ints(min.0, min.1), FixedVec2::from_ints(max.0, max.1))
    }

    #[test]
    fn test_all_pairs() {
        assert!(all_pairs(0).is_empty());
        assert!(all_pairs(1).is_empty());
        assert_eq!(all_pairs(3), vec![(0, 1), (0, 2), (1, 2)]);
        assert_eq!(all_pairs(10).len(), 45);
    }

    #[test]
    fn test_batch_reports_only_penetrating_pairs() {
        let scheduler = Scheduler::new(SchedulerConfig::default()).unwrap();
        let boxes: Arc<[Aabb]> = vec![
            boxed((0, 0), (2, 2)),
            boxed((1, 1), (3, 3)),
            boxed((10, 10), (11, 11)),
        ]
        .into();
        let pairs: Arc<[(usize, usize)]> = all_pairs(boxes.len()).into();

        let batch = ContactBatch::schedule(&scheduler, Arc::clone(&boxes), pairs, JobHandle::NONE).unwrap();
        assert_eq!(batch.len(), 3);

        let contacts = batch.wait(&scheduler).unwrap();
        assert_eq!(contacts.len(), 1);
        assert_eq!((contacts[0].a, contacts[0].b), (0, 1));
        assert_eq!(
            Some(contacts[0].penetration),
            Aabb::compute_penetration(boxes[0], boxes[1])
        );
    }

    #[test]
    fn test_checksum_is_order_sensitive() {
        let p = Aabb::compute_penetration(boxed((0, 0), (2, 2)), boxed((1, 1), (3, 3))).unwrap();
        let c1 = Contact { a: 0, b: 1, penetration: p };
        let c2 = Contact { a: 2, b: 3, penetration: p };

        assert_eq!(contacts_checksum(&[c1, c2]), contacts_checksum(&[c1, c2]));
        assert_ne!(contacts_checksum(&[c1, c2]), contacts_checksum(&[c2, c1]));
    }
}
