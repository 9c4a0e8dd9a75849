//! 集成测试共享的模拟虚拟内存

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use vm_osal::{MemoryError, MemoryResult, VirtualMemory};
use vm_young_gen::{VirtualSpace, YoungGenConfig, YoungGeneration};

/// 对齐单位：64 KiB
pub const A: usize = 64 * 1024;
pub const MIB: usize = 1024 * 1024;

/// 提交/撤销开关，测试可以在生成代构造之后翻转
#[derive(Debug, Clone, Default)]
pub struct FailureSwitch {
    refuse_commit: Arc<AtomicBool>,
    refuse_uncommit: Arc<AtomicBool>,
}

impl FailureSwitch {
    pub fn refuse_commit(&self, refuse: bool) {
        self.refuse_commit.store(refuse, Ordering::SeqCst);
    }

    pub fn refuse_uncommit(&self, refuse: bool) {
        self.refuse_uncommit.store(refuse, Ordering::SeqCst);
    }
}

/// 只记账、不映射真实内存的保留区
#[derive(Debug)]
pub struct SimulatedMemory {
    base: usize,
    size: usize,
    switch: FailureSwitch,
}

impl SimulatedMemory {
    pub fn new(size: usize) -> (Self, FailureSwitch) {
        let switch = FailureSwitch::default();
        let memory = Self {
            base: 0x4000_0000,
            size,
            switch: switch.clone(),
        };
        (memory, switch)
    }
}

impl VirtualMemory for SimulatedMemory {
    fn base(&self) -> usize {
        self.base
    }

    fn size(&self) -> usize {
        self.size
    }

    fn commit(&mut self, offset: usize, len: usize) -> MemoryResult<()> {
        if self.switch.refuse_commit.load(Ordering::SeqCst) {
            return Err(MemoryError::CommitFailed { offset, len, code: 12 });
        }
        Ok(())
    }

    fn uncommit(&mut self, offset: usize, len: usize) -> MemoryResult<()> {
        if self.switch.refuse_uncommit.load(Ordering::SeqCst) {
            return Err(MemoryError::UncommitFailed { offset, len, code: 12 });
        }
        Ok(())
    }
}

/// reserved 256 MiB, min 32 MiB, initial 64 MiB, 8:1:1
pub fn scenario_config() -> YoungGenConfig {
    YoungGenConfig {
        initial_size: 64 * MIB,
        min_size: 32 * MIB,
        max_size: 256 * MIB,
        survivor_ratio: 8,
        alignment: Some(A),
        verify_after_resize: true,
    }
}

pub fn simulated_gen(
    config: &YoungGenConfig,
) -> (YoungGeneration<SimulatedMemory>, FailureSwitch) {
    let alignment = config.alignment.unwrap_or(A);
    let (memory, switch) = SimulatedMemory::new(config.max_size);
    let vs = VirtualSpace::with_memory(memory, alignment).unwrap();
    (YoungGeneration::with_virtual_space(config, vs).unwrap(), switch)
}

/// Copy `words` of survivors into the to-space and swap, like a scavenge
/// that leaves eden empty
pub fn scavenge(young: &mut YoungGeneration<SimulatedMemory>, words: usize) {
    young.eden_space().reset();
    young.to_space().reset();
    if words > 0 {
        young.to_space().allocate(words).unwrap();
    }
    young.from_space().reset();
    young.swap_spaces();
}
