//! 保留/提交式虚拟内存映射
//!
//! 一次性保留整段地址区间，之后在区间内部按需提交或撤销提交。
//! 撤销提交会丢弃页面内容，并把该段恢复为不可访问状态，但地址仍然保留。

use std::ptr;

/// 虚拟内存操作结果
pub type MemoryResult<T> = Result<T, MemoryError>;

/// 虚拟内存错误类型
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// 无法保留地址区间
    #[error("failed to reserve {size} bytes of address space (os error {code})")]
    ReserveFailed {
        /// 请求保留的字节数
        size: usize,
        /// 操作系统错误码
        code: i32,
    },

    /// 提交失败（例如宿主拒绝 overcommit）
    #[error("failed to commit {len} bytes at offset {offset:#x} (os error {code})")]
    CommitFailed {
        /// 保留区内偏移
        offset: usize,
        /// 字节数
        len: usize,
        /// 操作系统错误码
        code: i32,
    },

    /// 撤销提交失败
    #[error("failed to uncommit {len} bytes at offset {offset:#x} (os error {code})")]
    UncommitFailed {
        /// 保留区内偏移
        offset: usize,
        /// 字节数
        len: usize,
        /// 操作系统错误码
        code: i32,
    },

    /// 子区间超出保留区
    #[error("range at offset {offset:#x} with length {len:#x} exceeds the {size:#x}-byte reservation")]
    OutOfRange {
        /// 保留区内偏移
        offset: usize,
        /// 字节数
        len: usize,
        /// 保留区大小
        size: usize,
    },

    /// 非法的保留大小
    #[error("invalid reservation size: {0}")]
    InvalidSize(usize),
}

/// 宿主虚拟内存原语
///
/// 偏移量都相对于保留区起始地址。实现必须保证每次调用要么完全生效，要么不产生任何效果。
pub trait VirtualMemory: Send + Sync {
    /// 保留区起始地址
    fn base(&self) -> usize;

    /// 保留区大小（字节）
    fn size(&self) -> usize;

    /// 提交 `[offset, offset + len)`，使其可读写
    ///
    /// # Errors
    ///
    /// 区间越界或宿主拒绝提交时返回错误
    fn commit(&mut self, offset: usize, len: usize) -> MemoryResult<()>;

    /// 撤销提交 `[offset, offset + len)`，丢弃其内容
    ///
    /// # Errors
    ///
    /// 区间越界或宿主操作失败时返回错误
    fn uncommit(&mut self, offset: usize, len: usize) -> MemoryResult<()>;
}

fn last_os_error_code() -> i32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

// ============================================================================
// 宿主实现
// ============================================================================

/// 宿主保留的地址区间，drop 时整体释放
pub struct ReservedMemory {
    ptr: *mut u8,
    size: usize,
}

// 指针只在本结构内部用于 mprotect/mmap/VirtualAlloc，不会被解引用
unsafe impl Send for ReservedMemory {}
unsafe impl Sync for ReservedMemory {}

impl std::fmt::Debug for ReservedMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReservedMemory")
            .field("base", &format_args!("{:#x}", self.base()))
            .field("size", &self.size)
            .finish()
    }
}

#[cfg(target_os = "linux")]
const NORESERVE: libc::c_int = libc::MAP_NORESERVE;
#[cfg(all(unix, not(target_os = "linux")))]
const NORESERVE: libc::c_int = 0;

#[cfg(unix)]
const RESERVE_FLAGS: libc::c_int = libc::MAP_PRIVATE | libc::MAP_ANONYMOUS | NORESERVE;

impl ReservedMemory {
    /// 保留 `size` 字节的地址区间，初始全部不可访问
    ///
    /// # Errors
    ///
    /// `size` 为 0 或宿主无法提供地址区间时返回错误
    pub fn reserve(size: usize) -> MemoryResult<Self> {
        if size == 0 {
            return Err(MemoryError::InvalidSize(size));
        }

        #[cfg(unix)]
        let mem = Self::reserve_unix(size)?;
        #[cfg(windows)]
        let mem = Self::reserve_windows(size)?;

        log::trace!("reserved {} bytes at {:#x}", size, mem.base());
        Ok(mem)
    }

    /// 保留区起始指针
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr
    }

    fn sub_range(&self, offset: usize, len: usize) -> MemoryResult<*mut u8> {
        match offset.checked_add(len) {
            Some(end) if end <= self.size => Ok(self.ptr.wrapping_add(offset)),
            _ => Err(MemoryError::OutOfRange {
                offset,
                len,
                size: self.size,
            }),
        }
    }

    #[cfg(unix)]
    fn reserve_unix(size: usize) -> MemoryResult<Self> {
        let ptr = unsafe { libc::mmap(ptr::null_mut(), size, libc::PROT_NONE, RESERVE_FLAGS, -1, 0) };

        if ptr == libc::MAP_FAILED {
            return Err(MemoryError::ReserveFailed {
                size,
                code: last_os_error_code(),
            });
        }

        Ok(Self {
            ptr: ptr.cast::<u8>(),
            size,
        })
    }

    #[cfg(windows)]
    fn reserve_windows(size: usize) -> MemoryResult<Self> {
        use windows_sys::Win32::System::Memory::{MEM_RESERVE, PAGE_NOACCESS, VirtualAlloc};

        let ptr = unsafe { VirtualAlloc(ptr::null(), size, MEM_RESERVE, PAGE_NOACCESS) };
        if ptr.is_null() {
            return Err(MemoryError::ReserveFailed {
                size,
                code: last_os_error_code(),
            });
        }

        Ok(Self {
            ptr: ptr.cast::<u8>(),
            size,
        })
    }
}

impl VirtualMemory for ReservedMemory {
    fn base(&self) -> usize {
        self.ptr.expose_provenance()
    }

    fn size(&self) -> usize {
        self.size
    }

    fn commit(&mut self, offset: usize, len: usize) -> MemoryResult<()> {
        let addr = self.sub_range(offset, len)?;
        if len == 0 {
            return Ok(());
        }

        #[cfg(unix)]
        let ok = unsafe { libc::mprotect(addr.cast(), len, libc::PROT_READ | libc::PROT_WRITE) } == 0;

        #[cfg(windows)]
        let ok = {
            use windows_sys::Win32::System::Memory::{MEM_COMMIT, PAGE_READWRITE, VirtualAlloc};
            let committed =
                unsafe { VirtualAlloc(addr.cast_const().cast(), len, MEM_COMMIT, PAGE_READWRITE) };
            !committed.is_null()
        };

        if ok {
            Ok(())
        } else {
            Err(MemoryError::CommitFailed {
                offset,
                len,
                code: last_os_error_code(),
            })
        }
    }

    fn uncommit(&mut self, offset: usize, len: usize) -> MemoryResult<()> {
        let addr = self.sub_range(offset, len)?;
        if len == 0 {
            return Ok(());
        }

        // 以 MAP_FIXED 重新映射为 PROT_NONE：丢弃页面，地址仍保留
        #[cfg(unix)]
        let ok = unsafe {
            libc::mmap(
                addr.cast(),
                len,
                libc::PROT_NONE,
                RESERVE_FLAGS | libc::MAP_FIXED,
                -1,
                0,
            )
        } != libc::MAP_FAILED;

        #[cfg(windows)]
        let ok = {
            use windows_sys::Win32::System::Memory::{MEM_DECOMMIT, VirtualFree};
            let freed = unsafe { VirtualFree(addr.cast(), len, MEM_DECOMMIT) };
            freed != 0
        };

        if ok {
            Ok(())
        } else {
            Err(MemoryError::UncommitFailed {
                offset,
                len,
                code: last_os_error_code(),
            })
        }
    }
}

impl Drop for ReservedMemory {
    fn drop(&mut self) {
        #[cfg(unix)]
        unsafe {
            libc::munmap(self.ptr.cast(), self.size);
        }

        #[cfg(windows)]
        unsafe {
            use windows_sys::Win32::System::Memory::{MEM_RELEASE, VirtualFree};
            VirtualFree(self.ptr.cast(), 0, MEM_RELEASE);
        }
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_size;

    #[test]
    fn test_reserve_commit_write() {
        let page = page_size();
        let mut mem = ReservedMemory::reserve(16 * page).expect("Failed to reserve memory");
        assert_eq!(mem.size(), 16 * page);
        assert_ne!(mem.base(), 0);

        mem.commit(page, 2 * page).expect("Failed to commit memory");
        unsafe {
            let slice = std::slice::from_raw_parts_mut(mem.ptr.add(page), 2 * page);
            slice[0] = 42;
            slice[2 * page - 1] = 7;
            assert_eq!(slice[0], 42);
            assert_eq!(slice[2 * page - 1], 7);
        }

        mem.uncommit(page, 2 * page).expect("Failed to uncommit memory");
        // 重新提交后内容被丢弃
        mem.commit(page, page).expect("Failed to recommit memory");
        unsafe {
            assert_eq!(*mem.ptr.add(page), 0);
        }
    }

    #[test]
    fn test_zero_size_reservation_rejected() {
        assert!(matches!(
            ReservedMemory::reserve(0),
            Err(MemoryError::InvalidSize(0))
        ));
    }

    #[test]
    fn test_out_of_range() {
        let page = page_size();
        let mut mem = ReservedMemory::reserve(4 * page).expect("Failed to reserve memory");

        let err = mem.commit(3 * page, 2 * page).unwrap_err();
        assert!(matches!(err, MemoryError::OutOfRange { .. }));
        assert!(mem.uncommit(usize::MAX, page).is_err());
        // 零长度操作总是成功
        assert!(mem.commit(4 * page, 0).is_ok());
    }

    #[test]
    fn test_error_display() {
        let err = MemoryError::CommitFailed {
            offset: 0x1000,
            len: 4096,
            code: 12,
        };
        let msg = err.to_string();
        assert!(msg.contains("0x1000"));
        assert!(msg.contains("4096"));
        assert!(msg.contains("12"));
    }
}
