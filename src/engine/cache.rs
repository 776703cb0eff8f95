// ==========================================
// 3D打印成本报价系统 - 计算结果备忘缓存
// ==========================================
// 职责: 按归一化输入缓存计算结果, 超出容量时淘汰最老条目
// 红线: 缓存只是性能优化, 淘汰/未命中不得改变任何计算结果
// ==========================================

use std::collections::{HashMap, VecDeque};

use crate::domain::pricing::PricingResult;

/// 默认缓存容量
pub const DEFAULT_CACHE_CAPACITY: usize = 50;

// ==========================================
// QuoteMemoCache - 有界备忘缓存
// ==========================================
// 淘汰口径: 插入顺序 (最老条目先出), 命中不改变顺序
pub struct QuoteMemoCache {
    capacity: usize,
    order: VecDeque<String>,
    entries: HashMap<String, PricingResult>,
}

impl QuoteMemoCache {
    /// 创建指定容量的缓存 (容量至少为1)
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            order: VecDeque::new(),
            entries: HashMap::new(),
        }
    }

    /// 查询缓存
    pub fn get(&self, key: &str) -> Option<PricingResult> {
        self.entries.get(key).copied()
    }

    /// 写入缓存, 超出容量时淘汰最老条目
    pub fn insert(&mut self, key: String, result: PricingResult) {
        if self.entries.contains_key(&key) {
            // 同键重写不改变插入顺序 (结果本应相同)
            self.entries.insert(key, result);
            return;
        }

        self.order.push_back(key.clone());
        self.entries.insert(key, result);

        while self.entries.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            } else {
                break;
            }
        }
    }

    /// 当前条目数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 缓存容量
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for QuoteMemoCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
