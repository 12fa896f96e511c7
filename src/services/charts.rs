//! Chart Catalog
//!
//! The analysis engine drops a set of PNG charts into each run's output
//! directory. This catalog maps the known filenames to their display
//! metadata (title, category, description, reading guidance); scanning a
//! run directory yields descriptors for every image that matches, sorted
//! by the fixed category order and then by title. Files the catalog does
//! not know are dropped silently, so engine-side additions never break
//! listing.

use crate::models::chart::{ChartCategory, ChartDescriptor};
use crate::utils::error::AppResult;
use crate::utils::paths::StorageLayout;

/// One static catalog entry keyed by the engine's output filename.
struct CatalogEntry {
    file: &'static str,
    title: &'static str,
    category: ChartCategory,
    description: &'static str,
    interpretation: &'static str,
}

/// Static catalog of every chart the engine can emit.
const CATALOG: &[CatalogEntry] = &[
    // Basic analysis
    CatalogEntry {
        file: "force_time_series.png",
        title: "Force Time Series by Target",
        category: ChartCategory::Basic,
        description: "Force readings over time, grouped by target force, with tolerance bands",
        interpretation: "\
• Solid points: readings inside tolerance; hollow points: out of tolerance\n\
• Dashed line: target force level; shaded band: absolute tolerance range\n\
Check whether readings cluster inside the band and whether outliers arrive in bursts or drift over time.",
    },
    CatalogEntry {
        file: "force_histogram.png",
        title: "Force Distribution Histogram by Target",
        category: ChartCategory::Basic,
        description: "Distribution shape and normality of each target force group",
        interpretation: "\
• Dashed line: target force; solid line: measured mean\n\
Check how far the measured mean sits from the target, how wide the spread is, and whether the shape is single-peaked.",
    },
    CatalogEntry {
        file: "force_boxplot.png",
        title: "Force Box Plot by Target",
        category: ChartCategory::Basic,
        description: "Quartile spread and statistical outliers per target force group",
        interpretation: "\
• Box: interquartile range; center line: median; diamond: mean; red points: outliers\n\
Check box height (dispersion), median alignment with the target, and outlier counts.",
    },
    // Deviation analysis
    CatalogEntry {
        file: "deviation_analysis.png",
        title: "Absolute Deviation Box Plot by Target",
        category: ChartCategory::Deviation,
        description: "Distribution of measured force minus target force",
        interpretation: "\
• Green line: zero deviation; dashed lines: absolute tolerance limits\n\
A distribution centered off zero indicates systematic offset; points beyond the limits quantify tolerance violations.",
    },
    CatalogEntry {
        file: "percentage_deviation.png",
        title: "Percentage Deviation Box Plot by Target",
        category: ChartCategory::Deviation,
        description: "Relative deviation per target, removing the effect of target magnitude",
        interpretation: "\
• Y axis: (measured - target) / target, in percent; dashed lines: percentage tolerance limits\n\
Compare relative precision across small and large targets on an equal footing.",
    },
    // Statistical process control
    CatalogEntry {
        file: "shewhart_control.png",
        title: "Shewhart Control Chart by Target",
        category: ChartCategory::ProcessControl,
        description: "Classic control chart monitoring process stability",
        interpretation: "\
• Green line: center line; red dashed: 3-sigma limits; orange dotted: 2-sigma warning lines\n\
Points beyond 3 sigma mean the process is out of control; seven consecutive points on one side of the center signal a shift.",
    },
    CatalogEntry {
        file: "moving_average.png",
        title: "Moving Average Chart by Target",
        category: ChartCategory::ProcessControl,
        description: "Smoothed long-term trend with a rolling dispersion band",
        interpretation: "\
• Thin line: raw readings; thick line: moving average; band: rolling standard deviation\n\
Watch for the average drifting away from target and for the band widening over time.",
    },
    CatalogEntry {
        file: "cusum_chart.png",
        title: "CUSUM Chart",
        category: ChartCategory::ProcessControl,
        description: "Cumulative sums sensitive to small sustained mean shifts",
        interpretation: "\
• Upper/lower cumulative sums against decision limits at ±4\n\
A sum crossing its limit flags a sustained shift well before a Shewhart chart would.",
    },
    CatalogEntry {
        file: "ewma_chart.png",
        title: "EWMA Control Chart",
        category: ChartCategory::ProcessControl,
        description: "Exponentially weighted moving average control with memory of recent history",
        interpretation: "\
• Smoothing parameter 0.2; shaded area: control band\n\
Sustained movement of the EWMA line matters more than any single point.",
    },
    CatalogEntry {
        file: "imr_chart.png",
        title: "Individuals and Moving Range Chart",
        category: ChartCategory::ProcessControl,
        description: "Control of individual readings (I) and reading-to-reading variation (MR)",
        interpretation: "\
• I panel out of control: process level shifted; MR panel out of control: variation grew\n\
Read the two panels together to separate level shifts from dispersion changes.",
    },
    CatalogEntry {
        file: "xbar_r_chart.png",
        title: "X-bar and R Chart",
        category: ChartCategory::ProcessControl,
        description: "Joint monitoring of subgroup means and ranges",
        interpretation: "\
• X-bar panel tracks the mean, R panel tracks within-subgroup range\n\
An out-of-control R panel invalidates the X-bar limits; check it first.",
    },
    CatalogEntry {
        file: "run_chart.png",
        title: "Run Chart",
        category: ChartCategory::ProcessControl,
        description: "Non-random pattern detection around the median",
        interpretation: "\
• Dashed line: median; markers indicate runs above and below it\n\
Eight or more consecutive points on one side of the median indicate a non-random pattern.",
    },
    // Spatial analysis
    CatalogEntry {
        file: "coordinate_matrix.png",
        title: "Coordinate Pair Matrix by Target",
        category: ChartCategory::Spatial,
        description: "Pairwise relationships between the probe coordinates",
        interpretation: "\
• Diagonal: per-axis density; lower triangle: scatter; upper triangle: correlation\n\
Strong axis correlations or clustered outliers point at fixture geometry effects.",
    },
    CatalogEntry {
        file: "xy_heatmap.png",
        title: "XY Density Heat Map by Target",
        category: ChartCategory::Spatial,
        description: "Sampling density and pass/fail status across the fixture plane",
        interpretation: "\
• Contours: sampling density; marker shape: pass/fail\n\
Check whether the plane was sampled evenly and whether failures concentrate in one region.",
    },
    CatalogEntry {
        file: "spatial_clustering.png",
        title: "Spatial Cluster Outlier Map",
        category: ChartCategory::Spatial,
        description: "Cluster-based detection of spatially grouped failures",
        interpretation: "\
• Color: spatial cluster; hollow markers: failures; size: absolute deviation\n\
Failures grouped inside one cluster suggest a position-dependent cause.",
    },
    CatalogEntry {
        file: "position_heatmap.png",
        title: "Position Failure-Rate Heat Map",
        category: ChartCategory::Spatial,
        description: "Failure rate per fixture region",
        interpretation: "\
• Green: healthy regions; red: problem regions\n\
Recurring hot spots across targets indicate mechanical rather than statistical causes.",
    },
    // Advanced analysis
    CatalogEntry {
        file: "correlation_matrix.png",
        title: "Variable Correlation Matrix",
        category: ChartCategory::Advanced,
        description: "Linear correlation strength between measured variables",
        interpretation: "\
• Red: positive correlation; blue: negative; numbers: coefficients\n\
Unexpected strong correlations deserve an engineering explanation before acting on them.",
    },
    CatalogEntry {
        file: "pareto_analysis.png",
        title: "Pareto Chart of Failure Causes",
        category: ChartCategory::Advanced,
        description: "Failure categories ranked by frequency with cumulative share",
        interpretation: "\
• Bars: failures per category; line: cumulative percentage\n\
Address the categories covering the first 80% of failures before anything else.",
    },
    CatalogEntry {
        file: "residual_analysis.png",
        title: "Residual Analysis",
        category: ChartCategory::Advanced,
        description: "Residuals against fitted values for systematic error checks",
        interpretation: "\
• Dashed line: zero residual; smooth curve: residual trend\n\
Residuals should scatter evenly around zero; curvature or funnel shapes indicate model violations.",
    },
    CatalogEntry {
        file: "qq_plot.png",
        title: "Normal Q-Q Plot",
        category: ChartCategory::Advanced,
        description: "Normality check of the force readings",
        interpretation: "\
• Points on the reference line indicate normality\n\
Tail departures mean heavy or light tails; a bowed pattern means skew.",
    },
    CatalogEntry {
        file: "radar_chart.png",
        title: "Quality Indicator Radar",
        category: ChartCategory::Advanced,
        description: "Combined view of success rate and capability indices per target",
        interpretation: "\
• Distance from center: indicator score; enclosed area: overall quality level\n\
Look for the short axis: the weakest indicator bounds overall quality.",
    },
    // Process capability
    CatalogEntry {
        file: "success_rate.png",
        title: "Success Rate Trend",
        category: ChartCategory::Capability,
        description: "Success rate per batch over time against quality baselines",
        interpretation: "\
• Dashed lines: 90% baseline and 95% excellence thresholds\n\
Check trend direction, baseline attainment, and batch-to-batch stability.",
    },
    CatalogEntry {
        file: "process_capability.png",
        title: "Process Capability Indices",
        category: ChartCategory::Capability,
        description: "Cp and Cpk per target force",
        interpretation: "\
• Cp: potential capability (spread only); Cpk: actual capability (spread plus offset)\n\
Cp at or above 1.33 is excellent; Cpk well below Cp reveals a centering problem.",
    },
    CatalogEntry {
        file: "capability_histogram.png",
        title: "Capability Histogram",
        category: ChartCategory::Capability,
        description: "Measured distribution against specification limits",
        interpretation: "\
• Red dashed: specification limits; green: target; blue dotted: process mean\n\
The whole distribution should sit inside the limits with the mean on target.",
    },
    // Quality dashboard
    CatalogEntry {
        file: "quality_dashboard.png",
        title: "Quality Control Dashboard",
        category: ChartCategory::Dashboard,
        description: "Gauge panel of the key quality indicators",
        interpretation: "\
• Success-rate and coefficient-of-variation gauges with exact values\n\
A quick go/no-go read; drill into the category charts for causes.",
    },
    CatalogEntry {
        file: "success_rate_trend.png",
        title: "Detailed Success Rate Trend",
        category: ChartCategory::Dashboard,
        description: "Per-target success-rate trajectories with confidence bands",
        interpretation: "\
• One line per target force; band: forecast uncertainty\n\
Diverging target lines mean a target-specific problem rather than a global one.",
    },
    // Error distribution
    CatalogEntry {
        file: "error_distribution_analysis.png",
        title: "Error Distribution Characteristics",
        category: ChartCategory::ErrorDistribution,
        description: "Error histogram against the fitted normal density",
        interpretation: "\
• Solid line: empirical density; dashed line: normal fit\n\
Skew or multiple peaks point at special-cause variation mixed into the process.",
    },
    CatalogEntry {
        file: "error_qq_plot.png",
        title: "Error Q-Q Plot",
        category: ChartCategory::ErrorDistribution,
        description: "Normality check of the measurement errors",
        interpretation: "\
• Points should follow the reference line\n\
Systematic departure invalidates tolerance calculations that assume normal errors.",
    },
    CatalogEntry {
        file: "error_spatial_distribution.png",
        title: "Error Spatial Distribution",
        category: ChartCategory::ErrorDistribution,
        description: "Error magnitude across the fixture plane, faceted by target",
        interpretation: "\
• Color from green (small error) to red (large); marker size: error magnitude\n\
Hot regions recurring across targets indicate fixture or approach-path effects.",
    },
    // Multi-source variation
    CatalogEntry {
        file: "machine_performance_comparison.png",
        title: "Per-Machine Success Rate Comparison",
        category: ChartCategory::MultiSource,
        description: "Success rate by machine against the quality baselines",
        interpretation: "\
• Orange line: 90% baseline; green line: 95% excellence\n\
A single lagging machine points at equipment maintenance rather than process design.",
    },
    CatalogEntry {
        file: "shift_performance_comparison.png",
        title: "Per-Shift Mean Error Comparison",
        category: ChartCategory::MultiSource,
        description: "Mean error by shift, faceted by target force",
        interpretation: "\
• Lower bars mean better precision\n\
Systematic shift differences usually trace to handling procedure or warm-up time.",
    },
];

/// Scans run directories and resolves chart images against the catalog.
#[derive(Debug, Clone)]
pub struct ChartCatalog {
    layout: StorageLayout,
}

impl ChartCatalog {
    /// Create a catalog over the given storage layout.
    pub fn new(layout: StorageLayout) -> Self {
        Self { layout }
    }

    /// Collect the chart descriptors for one run.
    ///
    /// Unknown image files are dropped without error; a missing run
    /// directory yields an empty list.
    pub fn collect(&self, task_id: &str) -> AppResult<Vec<ChartDescriptor>> {
        let run_dir = self.layout.run_dir(task_id);
        if !run_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut charts = Vec::new();
        for entry in std::fs::read_dir(&run_dir)?.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !file_name.ends_with(".png") {
                continue;
            }
            let Some(meta) = CATALOG.iter().find(|c| c.file == file_name) else {
                continue;
            };

            charts.push(ChartDescriptor {
                chart_id: file_name.trim_end_matches(".png").to_string(),
                title: meta.title.to_string(),
                category: meta.category,
                description: meta.description.to_string(),
                interpretation: meta.interpretation.to_string(),
                file_path: path.to_string_lossy().to_string(),
                public_path: self.layout.public_chart_path(task_id, file_name),
                file_name: file_name.to_string(),
            });
        }

        charts.sort_by(|a, b| {
            a.category
                .order()
                .cmp(&b.category.order())
                .then_with(|| a.title.cmp(&b.title))
        });
        Ok(charts)
    }
}
