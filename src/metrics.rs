use std::io;

use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};
use thiserror::Error;

/// Bytes per gigabyte as displayed by the gauges.
pub const GIB: f64 = 1_073_741_824.0;

/// Fixed-point shift of the kernel's load averages (`SI_LOAD_SHIFT`).
pub const LOAD_SHIFT: u32 = 16;

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("sysinfo(2) failed: {0}")]
    Kernel(#[from] io::Error),
    #[error("no online CPUs reported")]
    NoCpus,
}

/// Raw counters as reported by the OS, before any scaling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawStats {
    pub total_ram: u64,
    pub free_ram: u64,
    pub total_swap: u64,
    pub free_swap: u64,
    /// Size in bytes of one memory unit above.
    pub mem_unit: u64,
    /// 1-minute load average, fixed-point with `load_shift` fractional bits.
    pub load1: u64,
    pub load_shift: u32,
    pub cpu_count: u32,
}

/// One reading of the three gauge channels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    /// 1-minute load per CPU, in percent.
    pub cpu_percent: f64,
    pub mem_used_gb: f64,
    pub mem_total_gb: f64,
    pub swap_used_gb: f64,
    pub swap_total_gb: f64,
}

impl Sample {
    pub fn from_raw(raw: &RawStats) -> Result<Self, SampleError> {
        if raw.cpu_count == 0 {
            return Err(SampleError::NoCpus);
        }
        let gb = |units: u64| units as f64 * raw.mem_unit as f64 / GIB;
        let load_scale = (1u64 << raw.load_shift) as f64;

        Ok(Self {
            cpu_percent: raw.load1 as f64 * 100.0 / f64::from(raw.cpu_count) / load_scale,
            mem_used_gb: gb(raw.total_ram.saturating_sub(raw.free_ram)),
            mem_total_gb: gb(raw.total_ram),
            swap_used_gb: gb(raw.total_swap.saturating_sub(raw.free_swap)),
            swap_total_gb: gb(raw.total_swap),
        })
    }
}

/// Somewhere raw statistics can be read from.
pub trait StatsSource {
    fn name(&self) -> &'static str;
    fn read(&mut self) -> Result<RawStats, SampleError>;
}

/// `sysinfo(2)` plus the online CPU count, straight from the kernel.
#[cfg(target_os = "linux")]
#[derive(Debug, Default)]
pub struct KernelStats;

#[cfg(target_os = "linux")]
impl StatsSource for KernelStats {
    fn name(&self) -> &'static str {
        "sysinfo(2)"
    }

    fn read(&mut self) -> Result<RawStats, SampleError> {
        // SAFETY: `libc::sysinfo` is a plain C struct for which all-zero is a
        // valid bit pattern; the syscall only writes into the struct we pass.
        let mut info: libc::sysinfo = unsafe { std::mem::zeroed() };
        if unsafe { libc::sysinfo(&mut info) } != 0 {
            return Err(io::Error::last_os_error().into());
        }
        // SAFETY: sysconf has no memory-safety preconditions.
        let cpus = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };

        Ok(RawStats {
            total_ram: u64::from(info.totalram),
            free_ram: u64::from(info.freeram),
            total_swap: u64::from(info.totalswap),
            free_swap: u64::from(info.freeswap),
            mem_unit: u64::from(info.mem_unit),
            load1: u64::from(info.loads[0]),
            load_shift: LOAD_SHIFT,
            cpu_count: u32::try_from(cpus).unwrap_or(0),
        })
    }
}

/// Cross-platform statistics through the `sysinfo` crate.
pub struct PortableStats {
    sys: System,
}

impl PortableStats {
    pub fn new() -> Self {
        let sys = System::new_with_specifics(
            RefreshKind::new()
                .with_cpu(CpuRefreshKind::new())
                .with_memory(MemoryRefreshKind::everything()),
        );
        Self { sys }
    }
}

impl Default for PortableStats {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsSource for PortableStats {
    fn name(&self) -> &'static str {
        "sysinfo crate"
    }

    fn read(&mut self) -> Result<RawStats, SampleError> {
        self.sys.refresh_memory();
        let load = System::load_average();

        Ok(RawStats {
            total_ram: self.sys.total_memory(),
            free_ram: self.sys.free_memory(),
            total_swap: self.sys.total_swap(),
            free_swap: self.sys.free_swap(),
            mem_unit: 1,
            load1: (load.one.max(0.0) * (1u64 << LOAD_SHIFT) as f64).round() as u64,
            load_shift: LOAD_SHIFT,
            cpu_count: u32::try_from(self.sys.cpus().len()).unwrap_or(u32::MAX),
        })
    }
}

/// Turns a [`StatsSource`] into gauge samples.
pub struct Sampler {
    source: Box<dyn StatsSource>,
}

impl Sampler {
    /// Prefer the kernel interface, fall back to the portable one.
    pub fn detect() -> Self {
        #[cfg(target_os = "linux")]
        {
            let mut kernel = KernelStats;
            match kernel.read() {
                Ok(_) => return Self::with_source(Box::new(kernel)),
                Err(e) => log::warn!("{e}, falling back to portable statistics"),
            }
        }
        Self::with_source(Box::new(PortableStats::new()))
    }

    pub fn with_source(source: Box<dyn StatsSource>) -> Self {
        log::debug!("sampling from {}", source.name());
        Self { source }
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    pub fn sample(&mut self) -> Result<Sample, SampleError> {
        Sample::from_raw(&self.source.read()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GB_BYTES: u64 = 1 << 30;

    fn raw() -> RawStats {
        RawStats {
            total_ram: 16 * GB_BYTES / 4096,
            free_ram: 4 * GB_BYTES / 4096,
            total_swap: 0,
            free_swap: 0,
            mem_unit: 4096,
            load1: 2 << LOAD_SHIFT,
            load_shift: LOAD_SHIFT,
            cpu_count: 4,
        }
    }

    #[test]
    fn test_cpu_percent_from_fixed_point_load() {
        let sample = Sample::from_raw(&raw()).unwrap();
        assert!((sample.cpu_percent - 50.0).abs() < 1e-9);

        let busy = RawStats { load1: 6 << LOAD_SHIFT, cpu_count: 2, ..raw() };
        let sample = Sample::from_raw(&busy).unwrap();
        assert!((sample.cpu_percent - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_memory_in_gigabytes() {
        let sample = Sample::from_raw(&raw()).unwrap();
        assert!((sample.mem_total_gb - 16.0).abs() < 1e-9);
        assert!((sample.mem_used_gb - 12.0).abs() < 1e-9);
        assert_eq!(sample.swap_total_gb, 0.0);
        assert_eq!(sample.swap_used_gb, 0.0);
    }

    #[test]
    fn test_swap_with_byte_units() {
        let stats = RawStats {
            total_swap: 2 * GB_BYTES,
            free_swap: GB_BYTES / 2,
            mem_unit: 1,
            ..raw()
        };
        let sample = Sample::from_raw(&stats).unwrap();
        assert!((sample.swap_total_gb - 2.0).abs() < 1e-9);
        assert!((sample.swap_used_gb - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_zero_cpus_is_an_error() {
        let stats = RawStats { cpu_count: 0, ..raw() };
        assert!(matches!(Sample::from_raw(&stats), Err(SampleError::NoCpus)));
    }

    #[test]
    fn test_portable_source_reads() {
        let mut source = PortableStats::new();
        let stats = source.read().unwrap();
        assert!(stats.total_ram > 0);
        assert!(stats.free_ram <= stats.total_ram);
        assert!(stats.cpu_count > 0);
        assert_eq!(stats.load_shift, LOAD_SHIFT);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_kernel_source_reads() {
        let mut source = KernelStats;
        let stats = source.read().unwrap();
        assert!(stats.total_ram > 0);
        assert!(stats.mem_unit > 0);
        assert!(stats.cpu_count > 0);
    }

    #[test]
    fn test_detected_sampler_samples() {
        let mut sampler = Sampler::detect();
        let sample = sampler.sample().unwrap();
        assert!(sample.mem_total_gb > 0.0);
        assert!(sample.mem_used_gb <= sample.mem_total_gb);
        assert!(sample.cpu_percent >= 0.0);
    }
}
