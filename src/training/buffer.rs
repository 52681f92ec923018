use crate::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::sync::Arc;
use std::sync::Condvar;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Duration;
use std::time::Instant;

struct Slots {
    slots: Vec<Option<Arc<Datapoint>>>,
    cursor: usize,
    eviction_started: bool,
    closed: bool,
    rng: SmallRng,
}

/// Fixed-capacity circular store of datapoints.
///
/// Many actors write, one trainer reads. A single lock covers the slots,
/// the cursor, and the eviction flag, so one episode's datapoints land
/// contiguously and a sample never observes a half-written slot.
pub struct ReplayBuffer {
    inner: Mutex<Slots>,
    ready: Condvar,
    min_size: usize,
}

impl ReplayBuffer {
    pub fn new(capacity: usize, min_size: usize, seed: u64) -> Self {
        assert!(capacity > 0, "replay buffer needs at least one slot");
        Self {
            inner: Mutex::new(Slots {
                slots: vec![None; capacity],
                cursor: 0,
                eviction_started: false,
                closed: false,
                rng: SmallRng::seed_from_u64(seed),
            }),
            ready: Condvar::new(),
            min_size,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn capacity(&self) -> usize {
        self.lock().slots.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        let inner = self.lock();
        match inner.eviction_started {
            true => inner.slots.len(),
            false => inner.cursor,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn eviction_started(&self) -> bool {
        self.lock().eviction_started
    }

    /// Write at the cursor, overwriting the oldest entries once full.
    pub fn add(&self, datapoints: Vec<Datapoint>) {
        if datapoints.is_empty() {
            return;
        }
        let mut inner = self.lock();
        let capacity = inner.slots.len();
        for datapoint in datapoints {
            let cursor = inner.cursor;
            inner.slots[cursor] = Some(Arc::new(datapoint));
            inner.cursor = (cursor + 1) % capacity;
            if inner.cursor == 0 && !inner.eviction_started {
                inner.eviction_started = true;
                log::info!("replay buffer full, eviction started");
            }
        }
        drop(inner);
        self.ready.notify_all();
    }

    /// `n` distinct entries drawn uniformly, or nothing if fewer are eligible.
    ///
    /// Before the first wrap only the filled prefix is eligible, and only
    /// once it reaches the minimum size.
    pub fn sample(&self, n: usize) -> Vec<Arc<Datapoint>> {
        Self::draw(&mut self.lock(), n, self.min_size)
    }

    fn draw(inner: &mut Slots, n: usize, min_size: usize) -> Vec<Arc<Datapoint>> {
        let pool = match inner.eviction_started {
            true => inner.slots.len(),
            false if inner.cursor >= min_size => inner.cursor,
            false => return vec![],
        };
        if n == 0 || pool < n {
            return vec![];
        }
        rand::seq::index::sample(&mut inner.rng, pool, n)
            .into_iter()
            .filter_map(|i| inner.slots[i].clone())
            .collect()
    }

    /// Block until [`sample`](Self::sample) can return `n` entries, the
    /// timeout elapses, or the buffer is closed. Empty on the latter two.
    pub fn wait(&self, n: usize, timeout: Duration) -> Vec<Arc<Datapoint>> {
        let deadline = Instant::now() + timeout;
        let mut inner = self.lock();
        loop {
            if inner.closed {
                return vec![];
            }
            let batch = Self::draw(&mut inner, n, self.min_size);
            if !batch.is_empty() {
                return batch;
            }
            let now = Instant::now();
            if now >= deadline {
                return vec![];
            }
            inner = self
                .ready
                .wait_timeout(inner, deadline - now)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|e| e.into_inner().0);
        }
    }

    /// Wake every waiter and make future waits return immediately.
    pub fn close(&self) {
        self.lock().closed = true;
        self.ready.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datapoint(target: f32) -> Datapoint {
        Datapoint {
            n_vars: 1,
            n_clauses: 0,
            incidence: vec![],
            target_var: Var::from(0u32),
            target,
        }
    }

    fn targets(batch: &[Arc<Datapoint>]) -> Vec<f32> {
        let mut targets = batch.iter().map(|d| d.target).collect::<Vec<_>>();
        targets.sort_by(f32::total_cmp);
        targets
    }

    #[test]
    fn prefix_then_wraparound() {
        let buffer = ReplayBuffer::new(5, 2, 0);
        buffer.add((0..3).map(|i| datapoint(i as f32)).collect());
        assert_eq!(buffer.len(), 3);
        assert!(!buffer.eviction_started());
        assert_eq!(targets(&buffer.sample(3)), vec![0., 1., 2.]);
        assert!(buffer.sample(4).is_empty());
        buffer.add((3..6).map(|i| datapoint(i as f32)).collect());
        assert!(buffer.eviction_started());
        assert_eq!(buffer.len(), 5);
        assert_eq!(buffer.capacity(), 5);
        assert_eq!(targets(&buffer.sample(5)), vec![1., 2., 3., 4., 5.]);
        assert!(buffer.sample(6).is_empty());
    }

    #[test]
    fn exact_fill_starts_eviction() {
        let buffer = ReplayBuffer::new(4, 4, 0);
        buffer.add((0..3).map(|i| datapoint(i as f32)).collect());
        assert!(!buffer.eviction_started());
        buffer.add(vec![datapoint(3.)]);
        assert!(buffer.eviction_started());
        assert_eq!(buffer.sample(4).len(), 4);
    }

    #[test]
    fn min_size_gates_first_samples() {
        let buffer = ReplayBuffer::new(10, 4, 0);
        buffer.add((0..3).map(|i| datapoint(i as f32)).collect());
        assert!(buffer.sample(1).is_empty());
        buffer.add(vec![datapoint(3.)]);
        assert_eq!(buffer.sample(1).len(), 1);
        assert_eq!(buffer.sample(4).len(), 4);
    }

    #[test]
    fn samples_are_distinct() {
        let buffer = ReplayBuffer::new(64, 0, 1);
        buffer.add((0..64).map(|i| datapoint(i as f32)).collect());
        for _ in 0..16 {
            let mut batch = targets(&buffer.sample(32));
            assert_eq!(batch.len(), 32);
            batch.dedup();
            assert_eq!(batch.len(), 32);
        }
    }

    #[test]
    fn wait_times_out_then_wakes() {
        let buffer = Arc::new(ReplayBuffer::new(8, 2, 0));
        assert!(buffer.wait(2, Duration::from_millis(10)).is_empty());
        let producer = {
            let buffer = buffer.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(20));
                buffer.add(vec![datapoint(0.), datapoint(1.)]);
            })
        };
        assert_eq!(buffer.wait(2, Duration::from_secs(10)).len(), 2);
        producer.join().unwrap();
    }

    #[test]
    fn close_releases_waiters() {
        let buffer = Arc::new(ReplayBuffer::new(8, 2, 0));
        let closer = {
            let buffer = buffer.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(20));
                buffer.close();
            })
        };
        let start = Instant::now();
        assert!(buffer.wait(2, Duration::from_secs(30)).is_empty());
        assert!(start.elapsed() < Duration::from_secs(30));
        closer.join().unwrap();
    }

    #[test]
    fn concurrent_producers_and_sampler() {
        let buffer = Arc::new(ReplayBuffer::new(500, 50, 2));
        let done = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let sampler = {
            let buffer = buffer.clone();
            let done = done.clone();
            std::thread::spawn(move || {
                let mut draws = 0;
                while !done.load(std::sync::atomic::Ordering::Relaxed) {
                    let batch = buffer.sample(16);
                    if !batch.is_empty() {
                        assert_eq!(batch.len(), 16);
                        for (i, a) in batch.iter().enumerate() {
                            assert!(batch[..i].iter().all(|b| !Arc::ptr_eq(a, b)));
                            assert!(a.target >= 0. && a.target < 800.);
                        }
                        draws += 1;
                    }
                }
                draws
            })
        };
        let producers = (0..8)
            .map(|p| {
                let buffer = buffer.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        buffer.add(vec![datapoint((p * 100 + i) as f32)]);
                    }
                })
            })
            .collect::<Vec<_>>();
        for producer in producers {
            producer.join().unwrap();
        }
        done.store(true, std::sync::atomic::Ordering::Relaxed);
        sampler.join().unwrap();
        assert!(buffer.eviction_started());
        assert_eq!(buffer.len(), 500);
        let all = buffer.sample(500);
        assert_eq!(all.len(), 500);
        let mut seen = targets(&all);
        seen.dedup();
        assert_eq!(seen.len(), 500);
    }
}
