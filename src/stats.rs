use alloc::vec;
use alloc::vec::Vec;
use core::hash::BuildHasher;

use crate::HashMap;
use crate::HashTable;

/// Number of entries at each probe distance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHistogram {
    counts: Vec<usize>,
}

impl ProbeHistogram {
    /// Entry counts indexed by probe distance. Trailing zero bins are
    /// trimmed, so the last bin is the longest distance present.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Longest probe distance of any entry, or `None` for an empty table.
    pub fn max_distance(&self) -> Option<usize> {
        self.counts.len().checked_sub(1)
    }

    /// Total number of entries counted.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Pretty-prints the histogram as a horizontal bar chart on stdout.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let max = self.counts.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        let total_units = max_bar * 8;
        println!("probe histogram ({} entries):", self.total());

        let make_bar = |count: usize| -> std::string::String {
            if count == 0 {
                return std::string::String::new();
            }
            let units = ((count as u128 * total_units as u128).div_ceil(max as u128)) as usize;
            let mut bar = "█".repeat(units / 8);
            let partial = match units % 8 {
                1 => Some('▏'),
                2 => Some('▎'),
                3 => Some('▍'),
                4 => Some('▌'),
                5 => Some('▋'),
                6 => Some('▊'),
                7 => Some('▉'),
                _ => None,
            };
            bar.extend(partial);
            bar
        };

        for (distance, &count) in self.counts.iter().enumerate() {
            println!("{:>3} | {} ({})", distance, make_bar(count), count);
        }
    }
}

/// Debug statistics for hash table analysis.
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of entries currently in the table
    pub populated: usize,
    /// Number of entries allowed before the table doubles
    pub threshold: usize,
    /// Total number of slots allocated
    pub total_slots: usize,
    /// Load factor (populated / threshold)
    pub load_factor: f64,
    /// Slot utilization (populated / total_slots)
    pub slot_utilization: f64,
    /// Mean probes per successful lookup
    pub average_probe_count: f64,
    /// Longest probe distance of any entry
    pub max_probe_distance: usize,
    /// Bytes held by the slot arrays plus owned key bytes
    pub total_bytes: usize,
    /// Bytes held by empty slots
    pub wasted_bytes: usize,
}

impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% of threshold)",
            self.populated,
            self.threshold,
            self.load_factor * 100.0
        );
        println!(
            "Slot Usage: {}/{} ({:.2}% utilization)",
            self.populated,
            self.total_slots,
            self.slot_utilization * 100.0
        );
        println!(
            "Probes: {:.3} average, {} max distance",
            self.average_probe_count, self.max_probe_distance
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
        println!(
            "Memory: {} bytes wasted ({:.02}%)",
            self.wasted_bytes,
            if self.total_bytes == 0 {
                0.0
            } else {
                (self.wasted_bytes as f64 / self.total_bytes as f64) * 100.0
            }
        );
    }
}

impl<V> HashTable<V> {
    /// Computes a histogram of probe distances for the current table state.
    pub fn probe_histogram(&self) -> ProbeHistogram {
        let mut counts = vec![0usize; self.capacity()];
        for distance in self.distances() {
            counts[distance] += 1;
        }

        let used = counts.iter().rposition(|&count| count != 0).map_or(0, |last| last + 1);
        counts.truncate(used);
        ProbeHistogram { counts }
    }

    /// Returns detailed utilization statistics for debugging.
    pub fn debug_stats(&self) -> DebugStats {
        let total_slots = self.capacity();
        let populated = self.len();
        let slot_bytes = Self::slot_bytes();
        let key_bytes: usize = self.iter().map(|(key, _)| key.len()).sum();

        DebugStats {
            populated,
            threshold: self.threshold(),
            total_slots,
            load_factor: if self.threshold() == 0 {
                0.0
            } else {
                populated as f64 / self.threshold() as f64
            },
            slot_utilization: populated as f64 / total_slots as f64,
            average_probe_count: self.average_probe_count(),
            max_probe_distance: self.distances().max().unwrap_or(0),
            total_bytes: total_slots * slot_bytes + key_bytes,
            wasted_bytes: (total_slots - populated) * slot_bytes,
        }
    }
}

impl<V, S> HashMap<V, S>
where
    S: BuildHasher,
{
    /// Computes a histogram of probe distances. See
    /// [`HashTable::probe_histogram`].
    pub fn probe_histogram(&self) -> ProbeHistogram {
        self.as_table().probe_histogram()
    }

    /// Returns detailed utilization statistics. See
    /// [`HashTable::debug_stats`].
    pub fn debug_stats(&self) -> DebugStats {
        self.as_table().debug_stats()
    }
}
