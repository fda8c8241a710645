// JVM flags - Aikar's G1GC preset sized to the heap

/// Heaps at or above this size get the large-heap G1 tuning
pub const LARGE_HEAP_THRESHOLD_GB: u32 = 12;

/// G1 settings that change with heap size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct G1Tuning {
    pub new_size_percent: u32,
    pub max_new_size_percent: u32,
    pub heap_region_size_mb: u32,
    pub reserve_percent: u32,
    pub initiating_heap_occupancy_percent: u32,
}

impl G1Tuning {
    pub fn for_heap(ram_gb: u32) -> Self {
        if ram_gb >= LARGE_HEAP_THRESHOLD_GB {
            Self {
                new_size_percent: 40,
                max_new_size_percent: 50,
                heap_region_size_mb: 16,
                reserve_percent: 15,
                initiating_heap_occupancy_percent: 20,
            }
        } else {
            Self {
                new_size_percent: 30,
                max_new_size_percent: 40,
                heap_region_size_mb: 8,
                reserve_percent: 20,
                initiating_heap_occupancy_percent: 15,
            }
        }
    }
}

/// Full JVM argument list (heap + GC + system properties) for a heap of `ram_gb`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JvmFlags {
    pub heap_gb: u32,
    pub tuning: G1Tuning,
}

impl JvmFlags {
    pub fn for_ram(ram_gb: u32) -> Self {
        Self {
            heap_gb: ram_gb,
            tuning: G1Tuning::for_heap(ram_gb),
        }
    }

    /// `-Xms` value in GB; equal to `-Xmx` so the heap is committed up front
    pub fn xms_gb(&self) -> u32 {
        self.heap_gb
    }

    pub fn xmx_gb(&self) -> u32 {
        self.heap_gb
    }

    pub fn args(&self) -> Vec<String> {
        let t = &self.tuning;
        vec![
            format!("-Xms{}G", self.xms_gb()),
            format!("-Xmx{}G", self.xmx_gb()),
            "-XX:+UseG1GC".to_string(),
            "-XX:+UnlockExperimentalVMOptions".to_string(),
            "-XX:+ParallelRefProcEnabled".to_string(),
            format!("-XX:G1NewSizePercent={}", t.new_size_percent),
            format!("-XX:G1MaxNewSizePercent={}", t.max_new_size_percent),
            format!("-XX:G1HeapRegionSize={}M", t.heap_region_size_mb),
            format!("-XX:G1ReservePercent={}", t.reserve_percent),
            "-XX:G1HeapWastePercent=5".to_string(),
            "-XX:G1MixedGCCountTarget=4".to_string(),
            format!(
                "-XX:InitiatingHeapOccupancyPercent={}",
                t.initiating_heap_occupancy_percent
            ),
            "-XX:G1MixedGCLiveThresholdPercent=85".to_string(),
            "-XX:G1RSetUpdatingPauseTimePercent=5".to_string(),
            "-XX:SurvivorRatio=32".to_string(),
            "-XX:+PerfDisableSharedMem".to_string(),
            "-XX:MaxTenuringThreshold=1".to_string(),
            "-XX:+AlwaysPreTouch".to_string(),
            "-Dusing.aikars.flags=https://mcflags.emc.gs".to_string(),
            "-Daikars.new.flags=true".to_string(),
            "-Dfile.encoding=UTF-8".to_string(),
            "-Djline.terminal=jline.UnsupportedTerminal".to_string(),
            "-Dcom.mojang.eula.agree=true".to_string(),
        ]
    }

    /// Space-separated, for `set JAVA_FLAGS=...` style lines
    pub fn joined(&self) -> String {
        self.args().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::config::MIN_RAM_GB;

    #[test]
    fn test_heap_is_monotonic_in_ram() {
        let mut previous = JvmFlags::for_ram(MIN_RAM_GB);
        for ram in MIN_RAM_GB + 1..=256 {
            let current = JvmFlags::for_ram(ram);
            assert!(current.xmx_gb() >= previous.xmx_gb());
            assert!(current.xms_gb() >= previous.xms_gb());
            previous = current;
        }
    }

    #[test]
    fn test_threshold_switches_tuning() {
        assert_eq!(G1Tuning::for_heap(11).heap_region_size_mb, 8);
        assert_eq!(G1Tuning::for_heap(12).heap_region_size_mb, 16);
        assert_eq!(G1Tuning::for_heap(12).new_size_percent, 40);
        assert_eq!(G1Tuning::for_heap(8).initiating_heap_occupancy_percent, 15);
    }

    #[test]
    fn test_args_carry_heap_and_tuning() {
        let args = JvmFlags::for_ram(24).args();
        assert_eq!(args[0], "-Xms24G");
        assert_eq!(args[1], "-Xmx24G");
        assert!(args.contains(&"-XX:G1HeapRegionSize=16M".to_string()));
        assert!(args.contains(&"-XX:G1ReservePercent=15".to_string()));

        assert!(args.contains(&"-XX:G1MixedGCLiveThresholdPercent=85".to_string()));
        assert!(args.contains(&"-Djline.terminal=jline.UnsupportedTerminal".to_string()));
        assert!(!args.iter().any(|a| a.starts_with("-XX:MaxGCPauseMillis")));
        assert!(!args.contains(&"-XX:+DisableExplicitGC".to_string()));

        let small = JvmFlags::for_ram(8).joined();
        assert!(small.contains("-XX:G1HeapRegionSize=8M"));
        assert!(small.contains("-XX:G1MaxNewSizePercent=40"));
    }
}
