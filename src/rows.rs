use crate::metrics::Sample;

/// The fixed shape of one metric channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowSpec {
    pub name: &'static str,
    pub unit: &'static str,
    /// Decimal digits shown for values and max labels.
    pub precision: usize,
    /// Whether the row may carry a max-value label.
    pub supports_max: bool,
}

pub const CPU: RowSpec = RowSpec { name: "CPU", unit: "%", precision: 2, supports_max: false };
pub const MEM: RowSpec = RowSpec { name: "MEM", unit: "GB", precision: 1, supports_max: true };
pub const SWP: RowSpec = RowSpec { name: "SWP", unit: "GB", precision: 1, supports_max: true };

/// Upper bound of the CPU gauge.
pub const CPU_MAX: f64 = 100.0;

/// `value` with `precision` decimals, immediately followed by `unit`.
pub fn format_max(value: f64, precision: usize, unit: &str) -> String {
    format!("{value:.precision$}{unit}")
}

/// One gauge row: indicator, gauge and optional max label.
#[derive(Clone, Debug)]
pub struct Row {
    pub spec: RowSpec,
    /// Gauge upper bound. `None` leaves the row unconfigured and out of the layout.
    max: Option<f64>,
    value: f64,
    alert: bool,
}

impl Row {
    pub fn setup(spec: RowSpec, max: f64) -> Self {
        Self {
            spec,
            max: (max > f64::EPSILON).then_some(max),
            value: 0.0,
            alert: false,
        }
    }

    /// Push a fresh value; the indicator is on iff `value >= high`.
    pub fn update(&mut self, value: f64, high: f64) {
        self.value = value;
        self.alert = value >= high;
    }

    pub fn is_configured(&self) -> bool {
        self.max.is_some()
    }

    pub fn alert(&self) -> bool {
        self.alert
    }

    pub fn max_label(&self) -> Option<String> {
        self.max.map(|max| format_max(max, self.spec.precision, self.spec.unit))
    }

    pub fn value_label(&self) -> String {
        format_max(self.value, self.spec.precision, self.spec.unit)
    }

    /// Gauge fill in `0.0..=1.0`; empty for unconfigured rows.
    pub fn fill(&self) -> f32 {
        match self.max {
            Some(max) => (self.value / max).clamp(0.0, 1.0) as f32,
            None => 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowId {
    Cpu,
    Mem,
    Swp,
}

/// The three rows, in display order.
#[derive(Clone, Debug)]
pub struct Rows {
    pub cpu: Row,
    pub mem: Row,
    pub swp: Row,
}

impl Rows {
    /// Size every gauge from the totals of the startup sample.
    pub fn setup(sample: &Sample) -> Self {
        Self {
            cpu: Row::setup(CPU, CPU_MAX),
            mem: Row::setup(MEM, sample.mem_total_gb),
            swp: Row::setup(SWP, sample.swap_total_gb),
        }
    }

    /// Push a sample into every row, thresholds scaled by `alert`.
    pub fn update(&mut self, sample: &Sample, alert: f64) {
        self.cpu.update(sample.cpu_percent, CPU_MAX * alert);
        self.mem.update(sample.mem_used_gb, sample.mem_total_gb * alert);
        self.swp.update(sample.swap_used_gb, sample.swap_total_gb * alert);
    }

    pub fn get(&self, id: RowId) -> &Row {
        match id {
            RowId::Cpu => &self.cpu,
            RowId::Mem => &self.mem,
            RowId::Swp => &self.swp,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (RowId, &Row)> {
        [
            (RowId::Cpu, &self.cpu),
            (RowId::Mem, &self.mem),
            (RowId::Swp, &self.swp),
        ]
        .into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(cpu: f64, mem_used: f64, mem_total: f64, swap_used: f64, swap_total: f64) -> Sample {
        Sample {
            cpu_percent: cpu,
            mem_used_gb: mem_used,
            mem_total_gb: mem_total,
            swap_used_gb: swap_used,
            swap_total_gb: swap_total,
        }
    }

    #[test]
    fn test_format_max() {
        assert_eq!(format_max(16.0, 1, "GB"), "16.0GB");
        assert_eq!(format_max(100.0, 2, "%"), "100.00%");
        assert_eq!(format_max(7.25, 0, "GB"), "7GB");
        assert_eq!(format_max(0.049, 1, "GB"), "0.0GB");
    }

    #[test]
    fn test_cpu_alert_iff_value_reaches_threshold() {
        for alert in [0.0, 0.5, 0.95, 1.0, 1.5] {
            for value in [0.0, 47.5, 50.0, 94.99, 95.0, 100.0, 150.0] {
                let mut rows = Rows::setup(&sample(0.0, 1.0, 8.0, 0.0, 0.0));
                rows.update(&sample(value, 1.0, 8.0, 0.0, 0.0), alert);
                assert_eq!(rows.cpu.alert(), value >= 100.0 * alert, "v={value} a={alert}");
            }
        }
    }

    #[test]
    fn test_memory_alert_iff_used_reaches_fraction_of_total() {
        let mut rows = Rows::setup(&sample(0.0, 0.0, 16.0, 0.0, 4.0));
        rows.update(&sample(0.0, 15.0, 16.0, 3.7, 4.0), 0.95);
        assert!(!rows.mem.alert());
        assert!(!rows.swp.alert());

        rows.update(&sample(0.0, 15.5, 16.0, 3.8, 4.0), 0.95);
        assert!(rows.mem.alert());
        assert!(rows.swp.alert());
    }

    #[test]
    fn test_alert_has_no_hysteresis() {
        let mut row = Row::setup(CPU, CPU_MAX);
        let states: Vec<bool> = [95.0, 94.9, 95.0, 94.9]
            .into_iter()
            .map(|v| {
                row.update(v, 95.0);
                row.alert()
            })
            .collect();
        assert_eq!(states, vec![true, false, true, false]);
    }

    #[test]
    fn test_missing_swap_leaves_row_unconfigured() {
        let rows = Rows::setup(&sample(0.0, 1.0, 16.0, 0.0, 0.0));
        assert!(rows.cpu.is_configured());
        assert!(rows.mem.is_configured());
        assert!(!rows.swp.is_configured());
        assert_eq!(rows.swp.max_label(), None);
        assert_eq!(rows.swp.fill(), 0.0);
        assert_eq!(rows.iter().count(), 3);
        assert_eq!(rows.get(RowId::Swp).spec, SWP);
    }

    #[test]
    fn test_labels_and_fill() {
        let mut rows = Rows::setup(&sample(0.0, 0.0, 16.0, 0.0, 2.0));
        rows.update(&sample(50.0, 4.0, 16.0, 3.0, 2.0), 0.95);
        assert_eq!(rows.cpu.value_label(), "50.00%");
        assert_eq!(rows.mem.max_label().as_deref(), Some("16.0GB"));
        assert!((rows.cpu.fill() - 0.5).abs() < f32::EPSILON);
        assert!((rows.mem.fill() - 0.25).abs() < f32::EPSILON);
        assert_eq!(rows.swp.fill(), 1.0);
    }
}
