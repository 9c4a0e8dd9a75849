//! 新生代
//!
//! [`YoungGeneration`] composes the address range controller, three bump
//! spaces and the capacity policy. The committed range is always tiled, in
//! this fixed physical order, by
//!
//! ```text
//! low                                                   high        high_boundary
//!  | eden               | survivor[0]    | survivor[1]    | uncommitted |
//! ```
//!
//! `from_index` says which survivor currently plays `from`; swapping roles
//! never moves memory.
//!
//! Structural operations (`resize`, `swap_spaces`, the compaction hooks,
//! balloon changes) require a safepoint: no mutator may allocate while they
//! run. Only [`YoungGeneration::allocate`] is safe to call concurrently.

use std::fmt;
use std::ptr::NonNull;
use std::sync::Arc;

use vm_osal::{ReservedMemory, VirtualMemory};

use crate::balloon::{Balloon, CapacityBounds, VisibleCapacityPolicy};
use crate::balloon_input::BalloonInbox;
use crate::bump_space::{BumpSpace, SpaceKind};
use crate::compaction::SpaceCompactor;
use crate::config::YoungGenConfig;
use crate::counters::{CounterSink, SpaceSnapshot, YoungGenSnapshot};
use crate::region::{MemRegion, SpaceLayout};
use crate::resize::{
    LiveExtent, ResizePlanner, SizeChange, SurvivorOrder, compute_initial_space_boundaries,
};
use crate::virtual_space::VirtualSpace;
use crate::{GcError, GcResult, HEAP_WORD_SIZE};

const K: usize = 1024;

/// Result of a [`YoungGeneration::resize`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeOutcome {
    /// Committed size before the call
    pub old_size: usize,
    /// Committed size after the call
    pub new_size: usize,
    /// Whether any space boundary moved
    pub spaces_changed: bool,
}

impl ResizeOutcome {
    pub fn changed(&self) -> bool {
        self.old_size != self.new_size || self.spaces_changed
    }
}

/// 新生代：eden + 两个 survivor 空间
pub struct YoungGeneration<M: VirtualMemory = ReservedMemory> {
    virtual_space: VirtualSpace<M>,
    eden: BumpSpace,
    /// Survivors in physical order: `[lower, upper]`
    survivors: [BumpSpace; 2],
    from_index: usize,
    min_gen_size: usize,
    max_gen_size: usize,
    capacity_policy: Box<dyn VisibleCapacityPolicy>,
    counter_sink: Option<Arc<dyn CounterSink>>,
    verify_after_resize: bool,
}

impl YoungGeneration<ReservedMemory> {
    /// Reserve `max_size` of host address space and commit `initial_size`
    ///
    /// # Errors
    ///
    /// Fails on an invalid configuration, with [`GcError::OutOfAddressSpace`]
    /// if the reservation is refused, or with [`GcError::CommitFailed`] if the
    /// initial commit is refused.
    pub fn new(config: &YoungGenConfig) -> GcResult<Self> {
        let alignment = config.effective_alignment();
        config.validate(alignment)?;
        let (_, _, max) = config.aligned_sizes(alignment);
        let virtual_space = VirtualSpace::reserve(max, alignment)?;
        Self::with_virtual_space(config, virtual_space)
    }
}

impl<M: VirtualMemory> YoungGeneration<M> {
    /// Build the generation on an existing, fully uncommitted reservation
    ///
    /// The alignment of `virtual_space` overrides the one in `config`.
    pub fn with_virtual_space(
        config: &YoungGenConfig,
        mut virtual_space: VirtualSpace<M>,
    ) -> GcResult<Self> {
        let alignment = virtual_space.alignment();
        config.validate(alignment)?;
        let (initial, min, max) = config.aligned_sizes(alignment);

        if virtual_space.committed_size() != 0 {
            return Err(GcError::invalid_config(
                "young generation reservation is already partly committed",
            ));
        }
        let reserved = virtual_space.reserved_size();
        if reserved < initial {
            return Err(GcError::invalid_config(format!(
                "reservation of {reserved} bytes cannot hold initial size {initial}"
            )));
        }

        let plan = compute_initial_space_boundaries(initial, config.survivor_ratio, alignment)?;
        if !virtual_space.expand_by(initial) {
            return Err(GcError::CommitFailed {
                committed: 0,
                requested: initial,
            });
        }
        let layout =
            SpaceLayout::from_sizes(virtual_space.low(), plan.eden, plan.lower, plan.upper)?;

        log::debug!(
            "young gen reserved {} [{:#x}, {:#x}), committed {initial} bytes: eden {}, survivors {} / {}",
            reserved,
            virtual_space.low(),
            virtual_space.high_boundary(),
            plan.eden,
            plan.lower,
            plan.upper
        );

        Ok(Self {
            virtual_space,
            eden: BumpSpace::new(layout.eden),
            survivors: [BumpSpace::new(layout.lower), BumpSpace::new(layout.upper)],
            from_index: 0,
            min_gen_size: min,
            max_gen_size: max.min(reserved),
            capacity_policy: Box::new(Balloon::new()),
            counter_sink: None,
            verify_after_resize: config.verify_after_resize,
        })
    }

    // ------------------------------------------------------------------
    // 分配与空间访问
    // ------------------------------------------------------------------

    /// Mutator fast path: bump-allocate `word_size` words in eden
    ///
    /// `None` means eden is exhausted and a collection should run.
    #[inline]
    pub fn allocate(&self, word_size: usize) -> Option<NonNull<u8>> {
        self.eden.allocate(word_size)
    }

    pub fn eden_space(&self) -> &BumpSpace {
        &self.eden
    }

    pub fn from_space(&self) -> &BumpSpace {
        &self.survivors[self.from_index]
    }

    pub fn to_space(&self) -> &BumpSpace {
        &self.survivors[1 - self.from_index]
    }

    fn space_mut(&mut self, kind: SpaceKind) -> &mut BumpSpace {
        match kind {
            SpaceKind::Eden => &mut self.eden,
            SpaceKind::From => &mut self.survivors[self.from_index],
            SpaceKind::To => &mut self.survivors[1 - self.from_index],
        }
    }

    pub fn space(&self, kind: SpaceKind) -> &BumpSpace {
        match kind {
            SpaceKind::Eden => self.eden_space(),
            SpaceKind::From => self.from_space(),
            SpaceKind::To => self.to_space(),
        }
    }

    pub fn virtual_space(&self) -> &VirtualSpace<M> {
        &self.virtual_space
    }

    /// Whether `addr` lies in committed memory
    pub fn is_in(&self, addr: usize) -> bool {
        self.virtual_space.contains(addr)
    }

    /// Whether `addr` lies anywhere in the reservation
    pub fn is_in_reserved(&self, addr: usize) -> bool {
        self.virtual_space.reserved().contains(addr)
    }

    // ------------------------------------------------------------------
    // 容量查询
    // ------------------------------------------------------------------

    /// Usable capacity: eden plus from-space (to-space is copy reserve)
    pub fn capacity_in_bytes(&self) -> usize {
        self.eden.capacity_in_bytes() + self.from_space().capacity_in_bytes()
    }

    pub fn used_in_bytes(&self) -> usize {
        self.eden.used_in_bytes() + self.from_space().used_in_bytes()
    }

    pub fn free_in_bytes(&self) -> usize {
        self.eden.free_in_bytes() + self.from_space().free_in_bytes()
    }

    pub fn capacity_in_words(&self) -> usize {
        self.capacity_in_bytes() / HEAP_WORD_SIZE
    }

    pub fn used_in_words(&self) -> usize {
        self.used_in_bytes() / HEAP_WORD_SIZE
    }

    pub fn free_in_words(&self) -> usize {
        self.free_in_bytes() / HEAP_WORD_SIZE
    }

    pub fn committed_size(&self) -> usize {
        self.virtual_space.committed_size()
    }

    pub fn alignment(&self) -> usize {
        self.virtual_space.alignment()
    }

    pub fn min_gen_size(&self) -> usize {
        self.min_gen_size
    }

    /// Configured maximum, rounded up to the alignment
    pub fn max_gen_size(&self) -> usize {
        self.max_gen_size
    }

    /// Hard ceiling of the committed size: the whole reservation
    pub fn true_max(&self) -> usize {
        self.virtual_space.reserved_size()
    }

    /// Ceiling over the reservation as seen by the sizing policy
    pub fn max_size(&self) -> usize {
        self.visible_ceiling(self.true_max())
    }

    /// Ceiling over the configured maximum as seen by the sizing policy
    pub fn gen_size_limit(&self) -> usize {
        self.visible_ceiling(self.max_gen_size)
    }

    fn visible_ceiling(&self, true_bound: usize) -> usize {
        let bounds = CapacityBounds {
            true_bound,
            committed: self.committed_size(),
            alignment: self.alignment(),
        };
        self.capacity_policy
            .visible_ceiling(bounds, &self.planner())
    }

    /// Location of live from-space data as offsets from `low`
    pub fn live_extent(&self) -> Option<LiveExtent> {
        let from = self.from_space();
        if from.is_empty() {
            return None;
        }
        let low = self.virtual_space.low();
        Some(LiveExtent {
            from_bottom: from.bottom() - low,
            from_top: from.top() - low,
            order: if self.from_index == 0 {
                SurvivorOrder::FromBelowTo
            } else {
                SurvivorOrder::ToBelowFrom
            },
        })
    }

    /// Resize arithmetic over the current state
    pub fn planner(&self) -> ResizePlanner {
        ResizePlanner::new(
            self.true_max(),
            self.committed_size(),
            self.min_gen_size,
            self.alignment(),
            self.live_extent(),
        )
    }

    // ------------------------------------------------------------------
    // 调整大小
    // ------------------------------------------------------------------

    /// Resize toward `eden_bytes + 2 * survivor_bytes`
    ///
    /// The target is clamped to `[min_gen_size, true_max]`, a shrink never
    /// reaches into live from-space data, and the new partition is computed
    /// before any memory is committed or uncommitted. The from-space keeps
    /// its live prefix.
    ///
    /// Eden and the to-space must be empty, as they are right after a
    /// scavenge. Otherwise nothing is touched and the outcome reports no
    /// change.
    ///
    /// # Errors
    ///
    /// [`GcError::CommitFailed`] if the host refuses the commit change; every
    /// boundary is then exactly as before the call.
    pub fn resize(&mut self, eden_bytes: usize, survivor_bytes: usize) -> GcResult<ResizeOutcome> {
        let planner = self.planner();
        let old_size = planner.committed_size();
        if !self.spaces_movable() {
            log::debug!(
                "young gen resize skipped: eden holds {} bytes, to-space {} bytes",
                self.eden.used_in_bytes(),
                self.to_space().used_in_bytes()
            );
            return Ok(ResizeOutcome {
                old_size,
                new_size: old_size,
                spaces_changed: false,
            });
        }
        let desired = planner.desired_generation_size(eden_bytes, survivor_bytes, self.true_max());
        let change = planner.committed_change(desired);
        let new_size = match change {
            SizeChange::Expand(bytes) => old_size + bytes,
            SizeChange::Shrink(bytes) => old_size - bytes,
            SizeChange::None => old_size,
        };

        log::debug!(
            "young gen resize: eden {eden_bytes} survivor {survivor_bytes} -> desired {desired}, \
             committed {old_size} -> {new_size}"
        );

        let layout = self.prepare_layout(&planner.with_committed(new_size), survivor_bytes)?;
        if new_size == old_size && layout == self.current_layout() {
            return Ok(ResizeOutcome {
                old_size,
                new_size,
                spaces_changed: false,
            });
        }

        let committed = match change {
            SizeChange::Expand(bytes) => self.virtual_space.expand_by(bytes),
            SizeChange::Shrink(bytes) => self.virtual_space.shrink_by(bytes),
            SizeChange::None => true,
        };
        if !committed {
            return Err(GcError::CommitFailed {
                committed: old_size,
                requested: new_size,
            });
        }

        self.install_layout(layout)?;
        if self.verify_after_resize {
            self.verify()?;
        }
        self.update_counters();

        Ok(ResizeOutcome {
            old_size,
            new_size,
            spaces_changed: true,
        })
    }

    /// Re-fit both survivors to the committed range at the smaller of their
    /// sizes
    ///
    /// A survivor reaching past the committed high boundary is truncated to
    /// it; the from-space keeps its live prefix. Does nothing unless eden
    /// and the to-space are empty. Returns whether any boundary moved.
    pub fn reset_survivors_after_shrink(&mut self) -> GcResult<bool> {
        if !self.spaces_movable() {
            return Ok(false);
        }
        let high = self.virtual_space.high();
        let fitted = |s: &BumpSpace| s.end().min(high).saturating_sub(s.bottom().min(high));
        let survivor = fitted(&self.survivors[0])
            .min(fitted(&self.survivors[1]))
            .max(self.alignment());

        let layout = self.prepare_layout(&self.planner(), survivor)?;
        if layout == self.current_layout() {
            return Ok(false);
        }
        log::debug!(
            "young gen survivors reset to {} / {} bytes",
            layout.lower.byte_size(),
            layout.upper.byte_size()
        );
        self.install_layout(layout)?;
        self.update_counters();
        Ok(true)
    }

    /// Eden and the to-space hold nothing, so their boundaries may move
    fn spaces_movable(&self) -> bool {
        self.eden.is_empty() && self.to_space().is_empty()
    }

    /// Compute the layout for `planner`'s committed size and check that the
    /// from-space can move into it without losing live data
    fn prepare_layout(&self, planner: &ResizePlanner, survivor: usize) -> GcResult<SpaceLayout> {
        let plan = planner.plan_spaces(survivor)?;
        let layout =
            SpaceLayout::from_sizes(self.virtual_space.low(), plan.eden, plan.lower, plan.upper)?;

        let from = self.from_space();
        let target = self.survivor_region(&layout, self.from_index);
        if !from.is_empty() && (target.start() != from.bottom() || target.end() < from.top()) {
            return Err(GcError::layout_violation(format!(
                "planned from-space {target} would cut live data {}",
                from.used_region()
            )));
        }
        Ok(layout)
    }

    fn install_layout(&mut self, layout: SpaceLayout) -> GcResult<()> {
        let from_index = self.from_index;
        self.eden.set_bounds(layout.eden);

        let from_region = self.survivor_region(&layout, from_index);
        let from = &mut self.survivors[from_index];
        if from.is_empty() {
            from.set_bounds(from_region);
        } else {
            from.resize_keeping_top(from_region)?;
        }
        let to_region = self.survivor_region(&layout, 1 - from_index);
        self.survivors[1 - from_index].set_bounds(to_region);

        log::debug!(
            "young gen spaces: eden {}, from {}, to {}",
            layout.eden,
            from_region,
            to_region
        );
        Ok(())
    }

    fn survivor_region(&self, layout: &SpaceLayout, index: usize) -> MemRegion {
        if index == 0 { layout.lower } else { layout.upper }
    }

    fn current_layout(&self) -> SpaceLayout {
        SpaceLayout {
            eden: self.eden.region(),
            lower: self.survivors[0].region(),
            upper: self.survivors[1].region(),
        }
    }

    // ------------------------------------------------------------------
    // 回收周期
    // ------------------------------------------------------------------

    /// Exchange the from/to roles
    ///
    /// Called after the scavenger copied every survivor into the to-space;
    /// the scavenger is responsible for emptying the old from-space.
    pub fn swap_spaces(&mut self) {
        self.from_index = 1 - self.from_index;
        log::trace!(
            "young gen survivor swap: from {:?}, to {:?}",
            self.from_space(),
            self.to_space()
        );
        self.update_counters();
    }

    /// Run `precompact` on every space
    pub fn precompact<C: SpaceCompactor + ?Sized>(&self, compactor: &mut C) {
        for kind in [SpaceKind::Eden, SpaceKind::From, SpaceKind::To] {
            compactor.precompact(kind, self.space(kind));
        }
    }

    /// Run `adjust_pointers` on every space
    pub fn adjust_pointers<C: SpaceCompactor + ?Sized>(&self, compactor: &mut C) {
        for kind in [SpaceKind::Eden, SpaceKind::From, SpaceKind::To] {
            compactor.adjust_pointers(kind, self.space(kind));
        }
    }

    /// Run `compact` on every space and move each top to the live bytes left
    ///
    /// # Errors
    ///
    /// Fails if the compactor reports more live bytes than a space holds.
    pub fn compact<C: SpaceCompactor + ?Sized>(&mut self, compactor: &mut C) -> GcResult<()> {
        for kind in [SpaceKind::Eden, SpaceKind::From, SpaceKind::To] {
            let live = compactor.compact(kind, self.space(kind));
            let space = self.space_mut(kind);
            let top = space
                .bottom()
                .checked_add(live)
                .ok_or_else(|| GcError::invalid_range(space.bottom(), usize::MAX))?;
            space.set_top(top)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // 气球与容量策略
    // ------------------------------------------------------------------

    /// Withhold `bytes` from the reported ceilings
    ///
    /// Clamped to `[0, max_gen_size]` and aligned down. Commits nothing.
    pub fn set_balloon_size(&mut self, bytes: usize) {
        self.capacity_policy
            .set_withheld(bytes, self.max_gen_size, self.alignment());
        log::debug!(
            "young gen {} policy withholds {} bytes, max_size now {}",
            self.capacity_policy.name(),
            self.capacity_policy.withheld(),
            self.max_size()
        );
        self.update_counters();
    }

    pub fn init_balloon(&mut self) {
        self.capacity_policy.reset();
        log::debug!("young gen {} policy reset", self.capacity_policy.name());
        self.update_counters();
    }

    pub fn balloon_size(&self) -> usize {
        self.capacity_policy.withheld()
    }

    /// Replace the capacity policy, returning the previous one
    pub fn set_capacity_policy(
        &mut self,
        policy: Box<dyn VisibleCapacityPolicy>,
    ) -> Box<dyn VisibleCapacityPolicy> {
        log::debug!(
            "young gen capacity policy {} -> {}",
            self.capacity_policy.name(),
            policy.name()
        );
        std::mem::replace(&mut self.capacity_policy, policy)
    }

    pub fn capacity_policy(&self) -> &dyn VisibleCapacityPolicy {
        self.capacity_policy.as_ref()
    }

    /// Apply the latest pending balloon request, if any
    ///
    /// Returns the balloon size now in effect when a request was applied.
    pub fn apply_balloon_requests(&mut self, inbox: &BalloonInbox) -> Option<usize> {
        let requested = inbox.take()?;
        self.set_balloon_size(requested);
        Some(self.balloon_size())
    }

    // ------------------------------------------------------------------
    // 校验与计数器
    // ------------------------------------------------------------------

    /// Check the partition and size invariants
    ///
    /// # Errors
    ///
    /// Returns [`GcError::LayoutViolation`] naming the first broken rule
    pub fn verify(&self) -> GcResult<()> {
        let layout = self.current_layout();
        SpaceLayout::new(
            self.virtual_space.committed(),
            layout.eden,
            layout.lower,
            layout.upper,
        )?;

        for kind in [SpaceKind::Eden, SpaceKind::From, SpaceKind::To] {
            let space = self.space(kind);
            if space.top() < space.bottom() || space.top() > space.end() {
                return Err(GcError::layout_violation(format!(
                    "{kind} top {:#x} outside {}",
                    space.top(),
                    space.region()
                )));
            }
        }

        let committed = self.committed_size();
        if committed < self.min_gen_size || committed > self.true_max() {
            return Err(GcError::layout_violation(format!(
                "committed size {committed} outside [{}, {}]",
                self.min_gen_size,
                self.true_max()
            )));
        }
        if self.balloon_size() > self.true_max() {
            return Err(GcError::layout_violation(format!(
                "balloon of {} bytes exceeds reservation",
                self.balloon_size()
            )));
        }
        Ok(())
    }

    /// Immutable view of the current sizes
    pub fn snapshot(&self) -> YoungGenSnapshot {
        YoungGenSnapshot {
            committed_bytes: self.committed_size(),
            reserved_bytes: self.true_max(),
            min_size: self.min_gen_size,
            max_size: self.max_size(),
            gen_size_limit: self.gen_size_limit(),
            balloon_bytes: self.balloon_size(),
            capacity_policy: self.capacity_policy.name(),
            eden: SpaceSnapshot::of(SpaceKind::Eden, &self.eden),
            from: SpaceSnapshot::of(SpaceKind::From, self.from_space()),
            to: SpaceSnapshot::of(SpaceKind::To, self.to_space()),
        }
    }

    pub fn set_counter_sink(&mut self, sink: Arc<dyn CounterSink>) {
        self.counter_sink = Some(sink);
    }

    /// Push a snapshot to the counter sink, if one is installed
    pub fn update_counters(&self) {
        if let Some(sink) = &self.counter_sink {
            sink.publish(&self.snapshot());
        }
    }

    /// Log the used-bytes change since `prev_used`
    pub fn print_used_change(&self, prev_used: usize) {
        log::info!(
            "young gen: {}K->{}K({}K)",
            prev_used / K,
            self.used_in_bytes() / K,
            self.capacity_in_bytes() / K
        );
    }
}

fn write_space(f: &mut fmt::Formatter<'_>, kind: SpaceKind, space: &BumpSpace) -> fmt::Result {
    let capacity = space.capacity_in_bytes();
    let percent = if capacity == 0 {
        0
    } else {
        space.used_in_bytes() * 100 / capacity
    };
    writeln!(
        f,
        "  {:<5} space {}K, {}% used [{:#x}, {:#x}, {:#x})",
        kind.name(),
        capacity / K,
        percent,
        space.bottom(),
        space.top(),
        space.end()
    )
}

impl<M: VirtualMemory> fmt::Display for YoungGeneration<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "young gen total {}K, used {}K [{:#x}, {:#x}, {:#x})",
            self.capacity_in_bytes() / K,
            self.used_in_bytes() / K,
            self.virtual_space.low(),
            self.virtual_space.high(),
            self.virtual_space.high_boundary()
        )?;
        write_space(f, SpaceKind::Eden, &self.eden)?;
        write_space(f, SpaceKind::From, self.from_space())?;
        write_space(f, SpaceKind::To, self.to_space())
    }
}

impl<M: VirtualMemory> fmt::Debug for YoungGeneration<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YoungGeneration")
            .field("reserved", &self.virtual_space.reserved())
            .field("committed", &self.virtual_space.committed())
            .field("eden", &self.eden)
            .field("from", self.from_space())
            .field("to", self.to_space())
            .field("capacity_policy", &self.capacity_policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balloon::Unrestricted;

    fn host_gen() -> YoungGeneration {
        let page = vm_osal::page_size();
        let config = YoungGenConfig {
            initial_size: 32 * page,
            min_size: 16 * page,
            max_size: 128 * page,
            survivor_ratio: 6,
            alignment: Some(page),
            verify_after_resize: true,
        };
        YoungGeneration::new(&config).unwrap()
    }

    #[test]
    fn test_new_partitions_committed_range() {
        let young = host_gen();
        young.verify().unwrap();
        let page = vm_osal::page_size();
        assert_eq!(young.committed_size(), 32 * page);
        assert_eq!(young.true_max(), 128 * page);
        assert_eq!(young.from_space().capacity_in_bytes(), 4 * page);
        assert_eq!(young.to_space().capacity_in_bytes(), 4 * page);
        assert_eq!(young.eden_space().capacity_in_bytes(), 24 * page);
        assert!(young.is_in(young.eden_space().bottom()));
        assert!(!young.is_in(young.virtual_space().high()));
        assert!(young.is_in_reserved(young.virtual_space().high()));
    }

    #[test]
    fn test_allocation_writes_committed_memory() {
        let young = host_gen();
        let ptr = young.allocate(4).unwrap();
        // 提交的内存必须可写
        unsafe { ptr.as_ptr().write_bytes(0xAB, 4 * HEAP_WORD_SIZE) };
        assert_eq!(young.used_in_words(), 4);
        assert!(young.is_in(ptr.as_ptr().addr()));
    }

    #[test]
    fn test_resize_grow_and_shrink_on_host() {
        let mut young = host_gen();
        let page = vm_osal::page_size();

        let outcome = young.resize(48 * page, 8 * page).unwrap();
        assert_eq!(outcome.new_size, 64 * page);
        assert!(outcome.changed());
        let ptr = young.allocate(1).unwrap();
        unsafe { ptr.as_ptr().write(1) };

        // eden 非空：不能移动边界
        let outcome = young.resize(10 * page, 2 * page).unwrap();
        assert!(!outcome.changed());
        assert_eq!(young.eden_space().used_in_words(), 1);
        assert!(young.eden_space().contains(ptr.as_ptr().addr()));

        young.eden_space().reset();
        let outcome = young.resize(10 * page, 2 * page).unwrap();
        assert_eq!(outcome.new_size, 16 * page);
        young.verify().unwrap();
    }

    #[test]
    fn test_capacity_policy_swap() {
        let mut young = host_gen();
        young.set_balloon_size(64 * vm_osal::page_size());
        assert!(young.max_size() < young.true_max());

        let old = young.set_capacity_policy(Box::new(Unrestricted));
        assert_eq!(old.name(), "balloon");
        assert_eq!(young.max_size(), young.true_max());
        assert_eq!(young.balloon_size(), 0);
    }

    #[test]
    fn test_display() {
        let young = host_gen();
        let text = young.to_string();
        assert!(text.starts_with("young gen total"));
        assert!(text.contains("eden  space"));
        assert!(text.contains("from  space"));
        assert!(text.contains("to    space"));
        young.print_used_change(0);
    }
}
