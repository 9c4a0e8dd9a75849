//! Young generation configuration
//!
//! Loaded from TOML or JSON, missing fields take their defaults.

use serde::{Deserialize, Serialize};

use crate::region::{align_up, is_aligned};
use crate::{GcError, GcResult, HEAP_WORD_SIZE};

const MIB: usize = 1024 * 1024;

/// 新生代配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct YoungGenConfig {
    /// 初始提交大小（字节）
    pub initial_size: usize,
    /// 最小提交大小（字节）
    pub min_size: usize,
    /// 最大大小（字节），同时决定保留区大小
    pub max_size: usize,
    /// eden : survivor : survivor = survivor_ratio : 1 : 1
    pub survivor_ratio: usize,
    /// 对齐单位（字节），缺省时使用宿主页大小
    pub alignment: Option<usize>,
    /// 每次调整大小后检查空间划分
    pub verify_after_resize: bool,
}

impl Default for YoungGenConfig {
    fn default() -> Self {
        Self {
            initial_size: 64 * MIB,
            min_size: 32 * MIB,
            max_size: 256 * MIB,
            survivor_ratio: 8,
            alignment: None,
            verify_after_resize: cfg!(debug_assertions),
        }
    }
}

impl YoungGenConfig {
    /// Alignment in effect: the configured one or the host page size
    pub fn effective_alignment(&self) -> usize {
        self.alignment.unwrap_or_else(vm_osal::page_size)
    }

    /// Check the configuration against `alignment`
    ///
    /// # Errors
    ///
    /// Returns [`GcError::InvalidConfig`] describing the first broken rule
    pub fn validate(&self, alignment: usize) -> GcResult<()> {
        if alignment == 0 || !alignment.is_power_of_two() {
            return Err(GcError::invalid_config(format!(
                "alignment {alignment} is not a power of two"
            )));
        }
        if !is_aligned(alignment, HEAP_WORD_SIZE) {
            return Err(GcError::invalid_config(format!(
                "alignment {alignment} is not a multiple of the heap word size"
            )));
        }
        if self.survivor_ratio == 0 {
            return Err(GcError::invalid_config("survivor_ratio must be at least 1"));
        }

        let (initial, min, max) = self.aligned_sizes(alignment);
        if min > initial || initial > max {
            return Err(GcError::invalid_config(format!(
                "sizes must satisfy min <= initial <= max, got {min} / {initial} / {max}"
            )));
        }
        if min < 3 * alignment {
            return Err(GcError::invalid_config(format!(
                "min_size {min} cannot hold eden and two survivors of {alignment} bytes"
            )));
        }
        Ok(())
    }

    /// `(initial, min, max)` rounded up to `alignment`
    pub fn aligned_sizes(&self, alignment: usize) -> (usize, usize, usize) {
        (
            align_up(self.initial_size, alignment),
            align_up(self.min_size, alignment),
            align_up(self.max_size, alignment),
        )
    }

    /// 从 TOML 字符串加载配置
    pub fn from_toml(toml: &str) -> GcResult<Self> {
        toml::from_str(toml).map_err(|e| GcError::ConfigParse(format!("TOML parse error: {e}")))
    }

    /// 从 JSON 字符串加载配置
    pub fn from_json(json: &str) -> GcResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| GcError::ConfigParse(format!("JSON parse error: {e}")))
    }

    /// 将配置序列化为 TOML
    pub fn to_toml(&self) -> GcResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| GcError::ConfigParse(format!("TOML serialize error: {e}")))
    }
}
