//! Terminal display sinks for reports.

use colored::Colorize;

use crate::analyzer::Extraction;
use crate::chart::Chart;
use crate::controller::Report;
use crate::Error;

const PLOT_WIDTH: usize = 60;
const PLOT_HEIGHT: usize = 18;

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with an ASCII chart
    Text,
    /// The report as JSON
    Json,
}

/// Formats reports for the console.
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn format(report: &Report, format: OutputFormat) -> Result<String, Error> {
        match format {
            OutputFormat::Text => Ok(Self::format_text(report)),
            OutputFormat::Json => Self::format_json(report),
        }
    }

    pub fn format_json(report: &Report) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    pub fn format_text(report: &Report) -> String {
        let mut out = String::new();

        out.push_str(&format!("{}\n\n", report.heading.bold()));
        out.push_str(report.text.trim_end());
        out.push_str("\n\n");

        if let Some(metrics) = &report.readability {
            out.push_str(&format!("{}\n", "Readability:".bold()));
            out.push_str(&format!(
                "  Flesch-Kincaid grade: {:.1}\n  Reading ease:         {:.1}\n  Avg sentence length:  {:.1} words\n\n",
                metrics.grade_level, metrics.reading_ease, metrics.avg_sentence_length
            ));
        }

        match &report.extraction {
            Extraction::WhyQuestions { questions } => {
                out.push_str(&format!("{}\n", report.extraction.label().bold()));
                if questions.is_empty() {
                    out.push_str("  (none)\n");
                }
                for question in questions {
                    out.push_str(&format!("- {question}\n"));
                }
            }
            Extraction::ProblemCount { count } | Extraction::ApplicationCount { count } => {
                out.push_str(&format!("{} {count}\n", report.extraction.label()));
            }
        }

        if let Some(follow_up) = &report.follow_up {
            out.push_str(&format!("{follow_up}\n"));
        }

        if let Some(section) = &report.chart {
            out.push_str(&format!("\n{}\n", section.heading.bold()));
            out.push_str(&plot(&section.chart));
        }

        out
    }
}

/// Render `chart` as an ASCII line plot with axis labels and the title.
pub fn plot(chart: &Chart) -> String {
    let Some(((x_min, x_max), (y_min, y_max))) = bounds(chart) else {
        return format!("{}\n(no points)\n", chart.title);
    };

    let mut grid = vec![vec![' '; PLOT_WIDTH]; PLOT_HEIGHT];

    let column = |x: f64| scale(x, x_min, x_max, PLOT_WIDTH);
    let row = |y: f64| PLOT_HEIGHT - 1 - scale(y, y_min, y_max, PLOT_HEIGHT);

    if (y_min..=y_max).contains(&0.0) {
        let axis = row(0.0);
        grid[axis].iter_mut().for_each(|cell| *cell = '-');
    }
    if (x_min..=x_max).contains(&0.0) {
        let axis = column(0.0);
        for line in grid.iter_mut() {
            line[axis] = if line[axis] == '-' { '+' } else { '|' };
        }
    }
    for &(x, y) in &chart.points {
        grid[row(y)][column(x)] = '*';
    }

    let label_width = format!("{y_max:.1}").len().max(format!("{y_min:.1}").len());
    let mut out = format!("{}\n{:>label_width$}\n", chart.title, chart.y_label);

    for (i, line) in grid.iter().enumerate() {
        let label = match i {
            0 => format!("{y_max:.1}"),
            _ if i == PLOT_HEIGHT - 1 => format!("{y_min:.1}"),
            _ => String::new(),
        };
        out.push_str(&format!(
            "{label:>label_width$} |{}\n",
            line.iter().collect::<String>()
        ));
    }

    let left = format!("{x_min:.1}");
    let right = format!("{x_max:.1}");
    let gap = PLOT_WIDTH.saturating_sub(left.len() + right.len());
    out.push_str(&format!(
        "{:label_width$}  {left}{:gap$}{right}\n{:>width$}\n",
        "",
        "",
        chart.x_label,
        width = label_width + 2 + PLOT_WIDTH / 2
    ));

    out
}

type Range = (f64, f64);

/// Samples are in ascending x, so the x range is the first and last sample.
fn bounds(chart: &Chart) -> Option<(Range, Range)> {
    let (x_min, _) = *chart.points.first()?;
    let (x_max, _) = *chart.points.last()?;
    let (_, y_min) = chart.min_point()?;
    let (_, y_max) = chart.max_point()?;
    Some(((x_min, x_max), (y_min, y_max)))
}

/// Map `value` in `[min, max]` to a cell index in `0..cells`.
fn scale(value: f64, min: f64, max: f64, cells: usize) -> usize {
    if max <= min {
        return cells / 2;
    }
    let position = ((value - min) / (max - min) * (cells - 1) as f64).round();
    (position.max(0.0) as usize).min(cells - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, QuadraticSpec};
    use crate::chart::render;
    use crate::controller::{build_report, DisplayOptions};

    #[test]
    fn test_plot_has_title_labels_and_points() {
        let chart = render(QuadraticSpec::new(1.0, 0.0, -4.0)).unwrap();
        let rendered = plot(&chart);

        assert!(rendered.starts_with("Quadratic Function: y = 1x² + 0x + -4"));
        assert!(rendered.contains("96.0"));
        assert!(rendered.contains("-10.0"));
        assert!(rendered.contains('*'));
        assert!(rendered.lines().any(|line| line.trim() == "x"));
        assert!(rendered.lines().any(|line| line.trim() == "y"));
    }

    #[test]
    fn test_plot_is_deterministic() {
        let chart = render(QuadraticSpec::new(-4.9, 20.0, 0.0)).unwrap();
        assert_eq!(plot(&chart), plot(&chart));
    }

    #[test]
    fn test_bounds_follow_extreme_samples() {
        let chart = render(QuadraticSpec::new(1.0, 0.0, -4.0)).unwrap();
        let ((x_min, x_max), (y_min, y_max)) = bounds(&chart).unwrap();

        assert_eq!((x_min, x_max), (-10.0, 10.0));
        assert!((y_max - 96.0).abs() < 1e-9);
        assert!(y_min > -4.0 && y_min < -3.9);
    }

    #[test]
    fn test_scale_clamps() {
        assert_eq!(scale(-10.0, -10.0, 10.0, 60), 0);
        assert_eq!(scale(10.0, -10.0, 10.0, 60), 59);
        assert_eq!(scale(3.0, 1.0, 1.0, 60), 30);
    }

    #[test]
    fn test_text_report_sections() {
        colored::control::set_override(false);
        let report = build_report(
            "This works. Why does it work? Because math.",
            Category::Explanation,
            DisplayOptions::default(),
            false,
        )
        .unwrap();

        let text = ConsoleFormatter::format_text(&report);
        assert!(text.starts_with("Response for explanation:"));
        assert!(text.contains("Readability:"));
        assert!(text.contains("Questions that ask 'Why':"));
        assert!(text.contains("- Why does it work? Because math?"));
    }

    #[test]
    fn test_json_report() {
        let report = build_report(
            "Problem 1. Problem 2. Problem 3.",
            Category::Practice,
            DisplayOptions {
                show_readability: false,
                show_graph: true,
            },
            true,
        )
        .unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&ConsoleFormatter::format_json(&report).unwrap()).unwrap();
        assert_eq!(json["category"], "practice");
        assert_eq!(json["extraction"]["kind"], "problem_count");
        assert_eq!(json["extraction"]["count"], 3);
        assert!(json.get("readability").is_none());
        assert_eq!(json["chart"]["chart"]["points"].as_array().unwrap().len(), 100);
    }
}
