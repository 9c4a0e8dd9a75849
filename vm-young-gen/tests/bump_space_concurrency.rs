//! BumpSpace 并发安全测试
//!
//! 多线程竞争同一个 bump 指针：成功的分配两两不相交，总量不超过容量，
//! 耗尽之后所有请求失败直到 reset。

#[cfg(loom)]
mod loom_tests {
    use loom::sync::Arc;
    use loom::thread;
    use vm_young_gen::{BumpSpace, HEAP_WORD_SIZE, MemRegion};

    /// 两个线程争抢只够一次分配的空间
    #[test]
    fn test_contended_last_slot() {
        loom::model(|| {
            let space = Arc::new(BumpSpace::new(
                MemRegion::with_size(0x1000, 3 * HEAP_WORD_SIZE).unwrap(),
            ));

            let handles: Vec<_> = (0..2)
                .map(|_| {
                    let space = Arc::clone(&space);
                    thread::spawn(move || space.allocate(2).map(|p| p.as_ptr().addr()))
                })
                .collect();
            let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

            let granted: Vec<_> = results.into_iter().flatten().collect();
            assert_eq!(granted, vec![0x1000]);
            assert_eq!(space.used_in_words(), 2);
        });
    }

    /// 两次不同大小的分配总能同时成功且不重叠
    #[test]
    fn test_disjoint_under_contention() {
        loom::model(|| {
            let space = Arc::new(BumpSpace::new(
                MemRegion::with_size(0x1000, 3 * HEAP_WORD_SIZE).unwrap(),
            ));

            let s1 = Arc::clone(&space);
            let t1 = thread::spawn(move || s1.allocate(1).map(|p| p.as_ptr().addr()));
            let b = space.allocate(2).map(|p| p.as_ptr().addr()).unwrap();
            let a = t1.join().unwrap().unwrap();

            assert!(a + HEAP_WORD_SIZE <= b || b + 2 * HEAP_WORD_SIZE <= a);
            assert_eq!(space.free_in_bytes(), 0);
        });
    }
}

#[cfg(not(loom))]
mod std_tests {
    use std::sync::{Arc, Barrier};
    use std::thread;

    use vm_young_gen::{BumpSpace, HEAP_WORD_SIZE, MemRegion};

    const THREADS: usize = 8;

    fn run_threads(space: &Arc<BumpSpace>, words: usize) -> Vec<(usize, usize)> {
        let barrier = Arc::new(Barrier::new(THREADS));
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let space = Arc::clone(space);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    let mut granted = Vec::new();
                    while let Some(ptr) = space.allocate(words) {
                        granted.push((ptr.as_ptr().addr(), words * HEAP_WORD_SIZE));
                    }
                    granted
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    }

    #[test]
    fn test_concurrent_allocations_are_disjoint() {
        let capacity = 64 * 1024;
        let space = Arc::new(BumpSpace::new(
            MemRegion::with_size(0x10_0000, capacity).unwrap(),
        ));

        let mut granted = run_threads(&space, 3);
        granted.sort_unstable();

        let total: usize = granted.iter().map(|(_, len)| len).sum();
        assert!(total <= capacity);
        assert_eq!(total, space.used_in_bytes());
        for pair in granted.windows(2) {
            let (a, len) = pair[0];
            assert!(a + len <= pair[1].0, "overlap at {a:#x}");
        }
        // 剩余空间放不下一次请求
        assert!(space.free_in_bytes() < 3 * HEAP_WORD_SIZE);
        assert!(space.allocate(3).is_none());
    }

    #[test]
    fn test_exhausted_until_reset() {
        let capacity = 16 * 1024;
        let space = Arc::new(BumpSpace::new(
            MemRegion::with_size(0x20_0000, capacity).unwrap(),
        ));

        let first = run_threads(&space, 1);
        assert_eq!(first.len(), capacity / HEAP_WORD_SIZE);
        assert!(run_threads(&space, 1).is_empty());

        space.reset();
        let second = run_threads(&space, 2);
        assert_eq!(second.len(), capacity / (2 * HEAP_WORD_SIZE));
    }
}
