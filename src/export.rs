//! CSV exports: per-trial annual losses, the exceedance curve and the scenario/control
//! selection.

use std::io::{self, Write};

use analytics::exceedance_curve;
use core_types::{Control, RiskModel, Scenario, normalize_id};

/// Writes one `Trial ID,Annual Loss` row per simulated year, numbered from 1.
pub fn write_trial_csv<W: Write>(mut out: W, annual_losses: &[f64]) -> io::Result<()> {
    writeln!(out, "Trial ID,Annual Loss")?;
    for (i, loss) in annual_losses.iter().enumerate() {
        writeln!(out, "{},{}", quote(&(i + 1).to_string()), quote(&loss.to_string()))?;
    }
    out.flush()
}

/// Writes the loss-exceedance curve, largest loss first.
pub fn write_exceedance_csv<W: Write>(mut out: W, annual_losses: &[f64]) -> io::Result<()> {
    writeln!(out, "Annual Loss,Exceedance Probability")?;
    for point in exceedance_curve(annual_losses) {
        writeln!(out, "{},{}", point.loss, point.probability)?;
    }
    out.flush()
}

/// Writes every scenario and control in the model with whether it is part of the
/// given selection.
pub fn write_selection_csv<W: Write>(
    mut out: W,
    model: &RiskModel,
    selected_scenarios: &[Scenario],
    selected_controls: &[Control],
) -> io::Result<()> {
    writeln!(out, "SCENARIOS")?;
    write_section(
        &mut out,
        model.scenarios.iter().map(|s| (s.id.as_str(), s.name.as_str())),
        selected_scenarios.iter().map(|s| s.id.as_str()),
    )?;
    writeln!(out)?;
    writeln!(out, "CONTROLS")?;
    write_section(
        &mut out,
        model.controls.iter().map(|c| (c.id.as_str(), c.name.as_str())),
        selected_controls.iter().map(|c| c.id.as_str()),
    )?;
    out.flush()
}

fn write_section<'a, W: Write>(
    out: &mut W,
    rows: impl Iterator<Item = (&'a str, &'a str)>,
    selected: impl Iterator<Item = &'a str>,
) -> io::Result<()> {
    let selected: Vec<String> = selected.map(normalize_id).collect();
    writeln!(out, "ID,Name,Selected")?;
    for (id, name) in rows {
        let is_selected = selected.contains(&normalize_id(id));
        writeln!(
            out,
            "{},{},{}",
            quote(id),
            quote(name),
            quote(if is_selected { "TRUE" } else { "FALSE" })
        )?;
    }
    Ok(())
}

/// Wraps a cell in double quotes, doubling any embedded quotes.
fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn trial_rows_are_numbered_from_one() {
        let file = tempfile::NamedTempFile::new().unwrap();
        write_trial_csv(file.reopen().unwrap(), &[0.0, 1250.5]).unwrap();

        let text = fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["Trial ID,Annual Loss", "\"1\",\"0\"", "\"2\",\"1250.5\""]);
    }

    #[test]
    fn exceedance_starts_at_the_largest_loss() {
        let mut buf = Vec::new();
        write_exceedance_csv(&mut buf, &[10.0, 40.0, 20.0, 30.0]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Annual Loss,Exceedance Probability");
        assert_eq!(lines[1], "40,0.25");
        assert_eq!(lines[4], "10,1");
    }

    #[test]
    fn selection_lists_every_record() {
        let mut first = Scenario::new("S-01", "T-01");
        first.name = "Ransomware on \"HMI\"".to_string();
        let model = RiskModel {
            scenarios: vec![first, Scenario::new("S-02", "T-02")],
            controls: vec![Control::new("C-01", 0.5)],
            ..Default::default()
        };

        let mut buf = Vec::new();
        let chosen = model.select_scenarios(&["s02".to_string()]);
        write_selection_csv(&mut buf, &model, &chosen, &model.controls).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let expected = "SCENARIOS\n\
            ID,Name,Selected\n\
            \"S-01\",\"Ransomware on \"\"HMI\"\"\",\"FALSE\"\n\
            \"S-02\",\"\",\"TRUE\"\n\
            \n\
            CONTROLS\n\
            ID,Name,Selected\n\
            \"C-01\",\"\",\"TRUE\"\n";
        assert_eq!(text, expected);
    }
}
