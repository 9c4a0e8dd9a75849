//! # VM Young Generation
//!
//! Nursery space manager for the generational copying collector.
//!
//! The generation owns one fixed address reservation, commits a prefix of it,
//! and partitions the committed prefix into eden and two survivor spaces.
//! Mutators bump-allocate from eden without locks; between collection cycles
//! the heap orchestrator resizes the partition and swaps survivor roles.
//!
//! ## Architecture
//!
//! ```text
//!   adaptive sizing policy ──► SizingView / GenerationAdmin
//!   elastic controller ──► BalloonInbox ──► ElasticMemory
//!                                 │
//!                         YoungGeneration
//!            ┌──────────────┬─────┴──────┬──────────────────┐
//!      VirtualSpace    BumpSpace x3   ResizePlanner   VisibleCapacityPolicy
//!            │
//!       vm-osal (reserve / commit / uncommit)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use vm_young_gen::{YoungGenConfig, YoungGeneration};
//!
//! let mut young = YoungGeneration::new(&YoungGenConfig::default())?;
//!
//! // 变异线程：eden 上的无锁分配
//! let obj = young.allocate(4);
//!
//! // 安全点：scavenge 之后调整大小并交换 survivor 角色
//! young.swap_spaces();
//! young.resize(48 << 20, 8 << 20)?;
//! ```

pub mod admin;
pub mod balloon;
pub mod balloon_input;
pub mod bump_space;
pub mod compaction;
pub mod config;
pub mod counters;
pub mod error;
pub mod region;
pub mod resize;
pub mod virtual_space;
pub mod young_gen;

/// Size of one heap word in bytes
pub const HEAP_WORD_SIZE: usize = std::mem::size_of::<usize>();

// Re-export common types
pub use error::{GcError, GcResult};
pub use region::{MemRegion, SpaceLayout, align_down, align_up, is_aligned};

// Re-export space management types
pub use bump_space::{BumpSpace, SpaceKind};
pub use resize::{
    LiveExtent, ResizePlanner, SizeChange, SpacePlan, SurvivorOrder,
    compute_initial_space_boundaries,
};
pub use virtual_space::VirtualSpace;
pub use young_gen::{ResizeOutcome, YoungGeneration};

// Re-export policy and collaborator interfaces
pub use admin::{ElasticMemory, GenerationAdmin, SizingView};
pub use balloon::{Balloon, CapacityBounds, Unrestricted, VisibleCapacityPolicy};
pub use balloon_input::{
    BalloonInbox, DEFAULT_BALLOON_PIPE, read_balloon_requests, spawn_balloon_reader,
};
pub use compaction::SpaceCompactor;
pub use config::YoungGenConfig;
pub use counters::{CounterSink, LogCounterSink, SpaceSnapshot, YoungGenSnapshot};
