//! 尾触发防抖：每次事件取消尚未触发的定时器并重新计时，
//! 静默期结束后只执行最后一次。
//!
//! 宿主环境（浏览器的 setTimeout 或测试代码）负责在 `delay_ms` 之后调用
//! [`Debouncer::fire`]，并传回调度时得到的句柄；被后续事件取代的句柄不会触发。

use std::cell::Cell;
use std::rc::Rc;

/// 毫秒时钟
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// 系统时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[cfg(target_arch = "wasm32")]
    fn now_ms(&self) -> u64 {
        js_sys::Date::now() as u64
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// 手动推进的时钟，克隆体共享同一时间
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// 定时器句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u32);

#[derive(Debug, Clone, Copy)]
struct Pending {
    handle: TimerHandle,
    deadline: u64,
}

/// 可取消的尾触发防抖器
#[derive(Debug)]
pub struct Debouncer<C: Clock = SystemClock> {
    clock: C,
    delay_ms: u64,
    pending: Option<Pending>,
    next_handle: u32,
}

impl<C: Clock> Debouncer<C> {
    pub fn new(clock: C, delay_ms: u64) -> Self {
        Self {
            clock,
            delay_ms,
            pending: None,
            next_handle: 0,
        }
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    /// 调度一次执行，取消尚未触发的上一次
    pub fn schedule(&mut self) -> TimerHandle {
        self.next_handle = self.next_handle.wrapping_add(1);
        let handle = TimerHandle(self.next_handle);
        self.pending = Some(Pending {
            handle,
            deadline: self.clock.now_ms().saturating_add(self.delay_ms),
        });
        handle
    }

    /// 取消尚未触发的执行
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// 定时器回调：句柄仍是最新且已到期时返回 true 并清除
    pub fn fire(&mut self, handle: TimerHandle) -> bool {
        match self.pending {
            Some(p) if p.handle == handle && self.clock.now_ms() >= p.deadline => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}
