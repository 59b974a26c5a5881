//! Tables for the terminal and the plain-text assessment report.

use analytics::format::{format_compact, format_currency, format_probability};
use analytics::{AggregatedMetrics, Histogram};
use chrono::NaiveDate;
use comfy_table::presets::{ASCII_FULL, UTF8_FULL};
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use core_types::{Scenario, Tier};
use simulator::SimulationResult;

/// Who the assessment was prepared for and by. Empty fields are left out.
#[derive(Debug, Clone, Default)]
pub struct AssessmentDetails {
    pub company_name: Option<String>,
    pub assessor_name: Option<String>,
    pub email: Option<String>,
}

impl AssessmentDetails {
    fn rows(&self) -> Vec<(&'static str, &str)> {
        [
            ("Company Name", &self.company_name),
            ("Assessor Name", &self.assessor_name),
            ("Email", &self.email),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStyle {
    /// Box-drawing borders for the terminal.
    Terminal,
    /// ASCII borders for report files.
    Plain,
}

fn new_table(style: TableStyle) -> Table {
    let mut table = Table::new();
    match style {
        TableStyle::Terminal => table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic),
        TableStyle::Plain => table.load_preset(ASCII_FULL),
    };
    table
}

fn numeric(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// The pre-simulation point estimates, one column per tier.
pub fn metrics_table(metrics: &AggregatedMetrics, style: TableStyle) -> Table {
    let mut table = new_table(style);
    let mut header = vec!["Metric".to_string()];
    header.extend(Tier::ALL.iter().map(|tier| tier.label().to_string()));
    table.set_header(header);

    let rows: [(&str, fn(f64) -> String, _); 3] = [
        ("Aggregated Adjusted TEF", |v| format!("{v:.2}"), metrics.tef),
        ("Avg Loss per Event", format_currency, metrics.avg_loss_per_event),
        ("Expected Annual Loss", format_currency, metrics.expected_annual_loss),
    ];
    for (name, render, values) in rows {
        let mut row = vec![Cell::new(name)];
        row.extend(Tier::ALL.iter().map(|&tier| numeric(render(values.get(tier)))));
        table.add_row(row);
    }
    table
}

pub fn simulation_table(result: &SimulationResult, style: TableStyle) -> Table {
    let mut table = new_table(style);
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![Cell::new("Trials"), numeric(result.trial_count().to_string())]);
    table.add_row(vec![Cell::new("Mean Annual Loss"), numeric(format_currency(result.mean_eal))]);
    table.add_row(vec![Cell::new("P90 Loss"), numeric(format_currency(result.p90_eal))]);
    table.add_row(vec![Cell::new("P95 Loss"), numeric(format_currency(result.p95_eal))]);
    table.add_row(vec![Cell::new("Max Loss"), numeric(format_currency(result.max_loss()))]);
    table.add_row(vec![
        Cell::new("Prob. >= 1 Event"),
        numeric(format_probability(result.probability_one_plus_events)),
    ]);
    table
}

pub fn scenario_table(scenarios: &[Scenario], style: TableStyle) -> Table {
    let mut table = new_table(style);
    table.set_header(vec!["ID", "Name", "Threat", "Frequency (ml)", "Loss (ml)"]);
    for scenario in scenarios {
        table.add_row(vec![
            Cell::new(&scenario.id),
            Cell::new(&scenario.name),
            Cell::new(scenario.threat_id.as_deref().unwrap_or("-")),
            numeric(format!("{:.2}", scenario.frequency.most_likely)),
            numeric(format_currency(scenario.loss.most_likely)),
        ]);
    }
    table
}

/// Histogram as a table with a proportional bar per bucket.
pub fn histogram_table(histogram: &Histogram, style: TableStyle) -> Table {
    const BAR_WIDTH: usize = 40;

    let mut table = new_table(style);
    table.set_header(vec!["Annual Loss", "Trials", ""]);
    let tallest = histogram.buckets.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    for bucket in &histogram.buckets {
        let bar = "#".repeat(bucket.count * BAR_WIDTH / tallest);
        table.add_row(vec![
            Cell::new(format!("{} - {}", bucket.label, format_compact(bucket.upper))),
            numeric(bucket.count.to_string()),
            Cell::new(bar),
        ]);
    }
    table
}

/// Renders the full assessment report as plain text.
pub fn render_report(
    title: &str,
    generated: NaiveDate,
    details: &AssessmentDetails,
    metrics: &AggregatedMetrics,
    result: Option<&SimulationResult>,
) -> String {
    let mut out = format!("{title}\nGenerated: {}\n", generated.format("%Y-%m-%d"));

    let detail_rows = details.rows();
    if !detail_rows.is_empty() {
        let mut table = new_table(TableStyle::Plain);
        table.set_header(vec!["Field", "Value"]);
        for (field, value) in detail_rows {
            table.add_row(vec![field, value]);
        }
        out.push_str(&format!("\nAssessment Details\n{table}\n"));
    }

    out.push_str(&format!(
        "\nPre-Simulation Summary\n{}\n",
        metrics_table(metrics, TableStyle::Plain)
    ));

    if let Some(result) = result {
        out.push_str(&format!(
            "\nSimulation Results\n{}\n",
            simulation_table(result, TableStyle::Plain)
        ));
    }

    out
}
