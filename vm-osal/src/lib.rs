//! vm-osal: 操作系统抽象层
//!
//! 为分代堆提供宿主虚拟内存原语：
//! - 保留一段不可访问的地址区间（不占用物理内存）
//! - 按对齐单位提交（可读写）/ 撤销提交（丢弃页面并恢复不可访问）
//! - 查询宿主页大小
//!
//! 上层通过 [`VirtualMemory`] trait 使用这些原语，测试可以替换为模拟实现。

mod memory;

use std::sync::OnceLock;

pub use memory::{MemoryError, MemoryResult, ReservedMemory, VirtualMemory};

// ============================================================================
// 页大小
// ============================================================================

/// 无法从系统获取页大小时使用的回退值
const FALLBACK_PAGE_SIZE: usize = 4096;

static PAGE_SIZE: OnceLock<usize> = OnceLock::new();

/// 获取宿主页大小（字节，总是 2 的幂）
pub fn page_size() -> usize {
    *PAGE_SIZE.get_or_init(query_page_size)
}

#[cfg(unix)]
fn query_page_size() -> usize {
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    match usize::try_from(size) {
        Ok(size) if size.is_power_of_two() => size,
        _ => {
            log::warn!("sysconf(_SC_PAGESIZE) returned {size}, assuming {FALLBACK_PAGE_SIZE}");
            FALLBACK_PAGE_SIZE
        }
    }
}

#[cfg(windows)]
fn query_page_size() -> usize {
    use windows_sys::Win32::System::SystemInformation::{GetSystemInfo, SYSTEM_INFO};

    let mut info: SYSTEM_INFO = unsafe { std::mem::zeroed() };
    unsafe { GetSystemInfo(&mut info) };
    let size = info.dwPageSize as usize;
    if size.is_power_of_two() {
        size
    } else {
        FALLBACK_PAGE_SIZE
    }
}
