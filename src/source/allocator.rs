// jemalloc memory pools, read through mallctl.

use crate::models::MemoryPool;

#[cfg(not(target_env = "msvc"))]
pub(super) fn read_pools() -> Vec<MemoryPool> {
    use crate::models::MemoryPoolKind;
    use std::ffi::CStr;
    use std::ptr;

    const STATS: [(MemoryPoolKind, &CStr); 5] = [
        (MemoryPoolKind::Allocated, c"stats.allocated"),
        (MemoryPoolKind::Active, c"stats.active"),
        (MemoryPoolKind::Resident, c"stats.resident"),
        (MemoryPoolKind::Mapped, c"stats.mapped"),
        (MemoryPoolKind::Retained, c"stats.retained"),
    ];

    // Stats are cached per epoch; bump it so the reads below are current.
    let mut epoch: u64 = 1;
    let mut epoch_len = std::mem::size_of::<u64>();
    // SAFETY: "epoch" is a u64 read/write control; both pointers describe `epoch`.
    unsafe {
        tikv_jemalloc_sys::mallctl(
            c"epoch".as_ptr().cast(),
            (&mut epoch as *mut u64).cast(),
            &mut epoch_len,
            (&mut epoch as *mut u64).cast(),
            std::mem::size_of::<u64>(),
        );
    }

    STATS
        .iter()
        .filter_map(|(kind, name)| {
            let mut value: usize = 0;
            let mut len = std::mem::size_of::<usize>();
            // SAFETY: every name in STATS is a size_t statistic; `value`/`len` match it.
            let rc = unsafe {
                tikv_jemalloc_sys::mallctl(
                    name.as_ptr().cast(),
                    (&mut value as *mut usize).cast(),
                    &mut len,
                    ptr::null_mut(),
                    0,
                )
            };
            (rc == 0).then_some(MemoryPool {
                kind: *kind,
                bytes: value as u64,
            })
        })
        .collect()
}

#[cfg(target_env = "msvc")]
pub(super) fn read_pools() -> Vec<MemoryPool> {
    Vec::new()
}
