//! Per-CPU engine registry.
//!
//! Applies the design's §5 "all state is process-global" requirement across
//! however many CPUs the host simulates: one [`Engine`] per `cpu_num`,
//! constructed once by [`initialize`] and looked up by [`with_engine`] on
//! every subsequent access or fill.

use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use l2pf_core::{Engine, EngineConfig, HostContext};

type Table = Vec<Option<Engine>>;

fn table() -> &'static Mutex<Table> {
    static REGISTRY: OnceLock<Mutex<Table>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(Vec::new()))
}

fn lock(m: &Mutex<Table>) -> MutexGuard<'_, Table> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Constructs (or replaces) the engine for `cpu_num`.
pub fn initialize(cpu_num: i32, config: EngineConfig, host: &dyn HostContext) {
    let mut engines = lock(table());
    let index = cpu_num.max(0) as usize;
    if engines.len() <= index {
        engines.resize_with(index + 1, || None);
    }
    engines[index] = Some(Engine::new(cpu_num, config, host));
}

/// Runs `f` against `cpu_num`'s engine, if it has been initialized.
/// Returns `None` if `cpu_num` is out of range or was never initialized.
pub fn with_engine<R>(cpu_num: i32, f: impl FnOnce(&mut Engine) -> R) -> Option<R> {
    let mut engines = lock(table());
    let index = cpu_num.max(0) as usize;
    engines.get_mut(index)?.as_mut().map(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullHost;

    impl HostContext for NullHost {
        fn prefetch_line(&mut self, _cpu: i32, _base: u64, _pf: u64, _level: l2pf_core::FillLevel) {}
        fn mshr_occupancy(&self, _cpu: i32) -> i32 {
            0
        }
        fn current_cycle(&self, _cpu: i32) -> u64 {
            0
        }
        fn knobs(&self) -> l2pf_core::HostKnobs {
            l2pf_core::HostKnobs::default()
        }
    }

    #[test]
    fn with_engine_is_none_before_initialize() {
        assert!(with_engine(17, |_| ()).is_none());
    }

    #[test]
    fn initialize_then_with_engine_reaches_the_same_cpu() {
        initialize(3, EngineConfig::default(), &NullHost);
        let active = with_engine(3, |engine| engine.active_heuristic());
        assert!(active.is_some());
    }
}
