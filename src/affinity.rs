//! Thread affinity and naming helpers shared by the scheduler variants.

use std::error::Error;

/// Pin the calling thread to one logical CPU.
///
/// On Linux, restricts the current thread to `cpu` via
/// `pthread_setaffinity_np`, so a NUMA scheduler constructed on its worker
/// thread stays on the CPU whose node it partitioned victims for.
///
/// On other platforms this is a no-op (`Ok(())`): macOS offers no thread-to-
/// core binding through a comparable API, and the schedulers treat pinning as
/// best-effort everywhere.
pub fn pin_current_thread(cpu: usize) -> Result<(), Box<dyn Error>> {
    #[cfg(target_os = "linux")]
    {
        use libc::{cpu_set_t, pthread_self, pthread_setaffinity_np, CPU_SET, CPU_ZERO};

        unsafe {
            let mut set: cpu_set_t = std::mem::zeroed();
            CPU_ZERO(&mut set);
            CPU_SET(cpu, &mut set);

            let rc = pthread_setaffinity_np(pthread_self(), std::mem::size_of::<cpu_set_t>(), &set);
            if rc != 0 {
                return Err(std::io::Error::from_raw_os_error(rc).into());
            }
        }
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = cpu;
    }
    Ok(())
}

/// Set the calling thread's name (helps with debugging/monitoring).
///
/// Silently does nothing if the name cannot be represented as a C string or
/// the platform has no thread-naming API.
pub fn name_current_thread(name: &str) {
    if let Ok(name_cstr) = std::ffi::CString::new(name) {
        #[cfg(target_os = "macos")]
        unsafe {
            libc::pthread_setname_np(name_cstr.as_ptr());
        }
        #[cfg(target_os = "linux")]
        unsafe {
            libc::pthread_setname_np(libc::pthread_self(), name_cstr.as_ptr());
        }
        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        let _ = name_cstr;
    }
}
