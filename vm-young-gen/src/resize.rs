//! Resize planning
//!
//! [`ResizePlanner`] is a snapshot of the generation's sizes plus the
//! location of live survivor data. Everything here is pure arithmetic on
//! offsets from the bottom of the reservation; nothing is committed or moved.
//!
//! Two rules bind every plan:
//! - the committed size never drops below `min_size` and never cuts into the
//!   live prefix of the from-space (see [`ResizePlanner::live_floor`]);
//! - the new partition tiles the new committed size exactly, with every
//!   space at least one alignment unit.

use crate::region::{align_down, align_up};
use crate::{GcError, GcResult};

/// Physical order of the two survivors relative to their roles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurvivorOrder {
    /// eden | from | to
    FromBelowTo,
    /// eden | to | from
    ToBelowFrom,
}

/// Where the live survivor data sits, as offsets from the generation bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveExtent {
    /// Bottom of the from-space
    pub from_bottom: usize,
    /// Allocation cursor of the from-space (end of live data)
    pub from_top: usize,
    pub order: SurvivorOrder,
}

impl LiveExtent {
    pub fn live_bytes(&self) -> usize {
        self.from_top - self.from_bottom
    }
}

/// Sizes of eden and of the lower and upper survivor, bottom to top
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpacePlan {
    pub eden: usize,
    pub lower: usize,
    pub upper: usize,
}

impl SpacePlan {
    pub fn total(&self) -> usize {
        self.eden + self.lower + self.upper
    }
}

/// Direction and size of a committed-size change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeChange {
    Expand(usize),
    Shrink(usize),
    None,
}

/// Stateless resize arithmetic over a size snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizePlanner {
    reserved_size: usize,
    committed_size: usize,
    min_size: usize,
    alignment: usize,
    live: Option<LiveExtent>,
}

impl ResizePlanner {
    /// Snapshot the sizes; `live` is `None` when the from-space is empty
    pub fn new(
        reserved_size: usize,
        committed_size: usize,
        min_size: usize,
        alignment: usize,
        live: Option<LiveExtent>,
    ) -> Self {
        debug_assert!(alignment.is_power_of_two());
        Self {
            reserved_size,
            committed_size,
            min_size,
            alignment,
            live,
        }
    }

    /// Same snapshot with a different committed size
    pub fn with_committed(self, committed_size: usize) -> Self {
        Self {
            committed_size,
            ..self
        }
    }

    pub fn committed_size(&self) -> usize {
        self.committed_size
    }

    pub fn alignment(&self) -> usize {
        self.alignment
    }

    /// Bytes that can still be committed
    pub fn available_for_expansion(&self) -> usize {
        self.reserved_size.saturating_sub(self.committed_size)
    }

    /// Bytes above the minimum size
    pub fn available_for_contraction(&self) -> usize {
        self.committed_size.saturating_sub(self.min_size)
    }

    /// Bytes from the current size down to the minimum size
    pub fn available_to_min_gen(&self) -> usize {
        debug_assert!(self.committed_size >= self.min_size);
        self.committed_size.saturating_sub(self.min_size)
    }

    /// Bytes that can be uncommitted from the high end without touching live
    /// survivor data, rounded down to the alignment
    pub fn available_to_live(&self) -> usize {
        align_down(
            self.committed_size.saturating_sub(self.live_floor()),
            self.alignment,
        )
    }

    /// Largest shrink allowed for a request of `desired` bytes
    ///
    /// Never more than requested, never below the minimum size, never into
    /// live data.
    pub fn limit_gen_shrink(&self, desired: usize) -> usize {
        let bytes = desired
            .min(self.available_to_min_gen())
            .min(self.available_to_live());
        align_down(bytes, self.alignment)
    }

    /// Clamp an expansion request to what the reservation still holds
    pub fn clamp_expansion(&self, desired: usize) -> usize {
        desired.min(self.available_for_expansion())
    }

    /// Smallest committed size that keeps a valid partition around the live
    /// from-space data
    ///
    /// With an empty from-space every space only needs one alignment unit.
    /// Otherwise the from-space keeps its bottom and at least its aligned live
    /// prefix, and a to-space above it needs one more unit.
    pub fn live_floor(&self) -> usize {
        let a = self.alignment;
        match self.live {
            None => 3 * a,
            Some(live) => {
                let from_end = self.min_from_end(&live);
                match live.order {
                    SurvivorOrder::FromBelowTo => from_end + a,
                    SurvivorOrder::ToBelowFrom => from_end,
                }
            }
        }
    }

    /// Aligned total for `eden + 2 * survivor`, clamped into `[min_size, ceiling]`
    pub fn desired_generation_size(&self, eden: usize, survivor: usize, ceiling: usize) -> usize {
        let total = eden.saturating_add(survivor.saturating_mul(2));
        let ceiling = align_down(ceiling, self.alignment);
        align_up(total.min(ceiling), self.alignment)
            .min(ceiling)
            .max(self.min_size)
    }

    /// Committed-size change needed to reach `desired`
    ///
    /// Expansion is clamped to the remaining reservation, shrinkage to
    /// [`limit_gen_shrink`](Self::limit_gen_shrink).
    pub fn committed_change(&self, desired: usize) -> SizeChange {
        use std::cmp::Ordering;

        match desired.cmp(&self.committed_size) {
            Ordering::Greater => {
                let change = align_down(
                    self.clamp_expansion(desired - self.committed_size),
                    self.alignment,
                );
                if change == 0 {
                    SizeChange::None
                } else {
                    SizeChange::Expand(change)
                }
            }
            Ordering::Less => {
                let change = self.limit_gen_shrink(self.committed_size - desired);
                if change == 0 {
                    SizeChange::None
                } else {
                    SizeChange::Shrink(change)
                }
            }
            Ordering::Equal => SizeChange::None,
        }
    }

    /// Partition the committed size into eden and the two survivors
    ///
    /// `survivor` is a goal; eden always receives whatever the survivors
    /// leave. With an empty from-space the layout is free. Otherwise the
    /// from-space keeps its bottom and live prefix:
    /// - eden | from | to: eden cannot move; the to-space is sized from the
    ///   top and the from-space absorbs the rest;
    /// - eden | to | from: the from-space runs to the top; the to-space is
    ///   carved below it with priority over eden.
    ///
    /// # Errors
    ///
    /// Fails if the committed size is below [`live_floor`](Self::live_floor).
    pub fn plan_spaces(&self, survivor: usize) -> GcResult<SpacePlan> {
        let a = self.alignment;
        let committed = self.committed_size;
        if committed < self.live_floor() {
            return Err(GcError::layout_violation(format!(
                "committed size {committed} is below the live floor {}",
                self.live_floor()
            )));
        }
        let survivor = align_up(survivor, a).max(a);

        let plan = match self.live {
            None => {
                let max_survivor = align_down((committed - a) / 2, a);
                let survivor = survivor.min(max_survivor);
                SpacePlan {
                    eden: committed - 2 * survivor,
                    lower: survivor,
                    upper: survivor,
                }
            }
            Some(live) => match live.order {
                SurvivorOrder::FromBelowTo => {
                    let min_from_end = self.min_from_end(&live);
                    let from_end = committed
                        .saturating_sub(survivor)
                        .clamp(min_from_end, committed - a);
                    SpacePlan {
                        eden: live.from_bottom,
                        lower: from_end - live.from_bottom,
                        upper: committed - from_end,
                    }
                }
                SurvivorOrder::ToBelowFrom => {
                    let to_size = survivor.clamp(a, live.from_bottom - a);
                    SpacePlan {
                        eden: live.from_bottom - to_size,
                        lower: to_size,
                        upper: committed - live.from_bottom,
                    }
                }
            },
        };

        debug_assert_eq!(plan.total(), committed);
        Ok(plan)
    }

    fn min_from_end(&self, live: &LiveExtent) -> usize {
        let a = self.alignment;
        align_up(live.from_top, a).max(live.from_bottom + a)
    }
}

/// Initial split of `total_bytes` into eden : survivor : survivor
/// = `survivor_ratio : 1 : 1`
///
/// Each survivor is rounded down to `alignment` and is at least one unit;
/// eden takes the rounding remainder.
///
/// # Errors
///
/// Fails if the ratio is zero or `total_bytes` cannot hold three units.
pub fn compute_initial_space_boundaries(
    total_bytes: usize,
    survivor_ratio: usize,
    alignment: usize,
) -> GcResult<SpacePlan> {
    if survivor_ratio == 0 {
        return Err(GcError::invalid_config("survivor_ratio must be at least 1"));
    }
    let total = align_down(total_bytes, alignment);
    if total < 3 * alignment {
        return Err(GcError::invalid_config(format!(
            "{total_bytes} bytes cannot hold eden and two survivors of alignment {alignment}"
        )));
    }

    let survivor = align_down(total / survivor_ratio.saturating_add(2), alignment)
        .max(alignment)
        .min(align_down((total - alignment) / 2, alignment));

    Ok(SpacePlan {
        eden: total - 2 * survivor,
        lower: survivor,
        upper: survivor,
    })
}
