//! CSV export for dispatch traces, hourly summaries, and candidate tables.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::optimizer::problem::CandidateEvaluation;
use crate::sim::summary::HourlyDispatch;
use crate::sim::types::DispatchTimestep;

/// Column header for per-step dispatch export.
const DISPATCH_HEADER: &str = "timestep,hour,load_mw,solar_to_load_mw,battery_mw,gas_mw,\
                               curtailed_mw,unmet_mw,soc_mwh";

/// Column header for the 24-hour representative dispatch.
const SUMMARY_HEADER: &str = "hour,load_mw,solar_mw,battery_mw,gas_mw,curtailed_mw,soc_mwh";

/// Column header for the candidate table.
const CANDIDATE_HEADER: &str = "solar_multiple,duration_h,power_ratio,solar_mw,battery_mw,\
                                battery_mwh,lcoe_usd_per_mwh,gas_fraction,unmet_fraction";

fn header(h: &str) -> impl Iterator<Item = &str> {
    h.split(',').map(str::trim)
}

/// Writes a full dispatch trace to `path`.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_dispatch_csv(trace: &[DispatchTimestep], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_dispatch_csv(trace, io::BufWriter::new(file))
}

/// Writes a dispatch trace as CSV to any writer.
///
/// One row per step. Output is deterministic for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_dispatch_csv(trace: &[DispatchTimestep], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(header(DISPATCH_HEADER))?;
    for s in trace {
        wtr.write_record(&[
            s.timestep.to_string(),
            (s.timestep % 24).to_string(),
            format!("{:.4}", s.load_mw),
            format!("{:.4}", s.solar_to_load_mw),
            format!("{:.4}", s.battery_net_mw),
            format!("{:.4}", s.gas_mw),
            format!("{:.4}", s.curtailed_mw),
            format!("{:.4}", s.unmet_mw),
            format!("{:.4}", s.state_of_charge_mwh),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the 24-hour representative dispatch to `path`.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_summary_csv(hours: &[HourlyDispatch], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_summary_csv(hours, io::BufWriter::new(file))
}

/// Writes the 24-hour representative dispatch as CSV.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_summary_csv(hours: &[HourlyDispatch], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(header(SUMMARY_HEADER))?;
    for h in hours {
        wtr.write_record(&[
            h.hour.to_string(),
            format!("{:.4}", h.load_avg),
            format!("{:.4}", h.solar_avg),
            format!("{:.4}", h.batt_avg),
            format!("{:.4}", h.gas_avg),
            format!("{:.4}", h.curtailed_avg),
            format!("{:.4}", h.soc_avg),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the candidate table to `path`.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_candidates_csv(evals: &[CandidateEvaluation], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_candidates_csv(evals, io::BufWriter::new(file))
}

/// Writes one row per evaluated candidate, in search order.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_candidates_csv(evals: &[CandidateEvaluation], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(header(CANDIDATE_HEADER))?;
    for e in evals {
        let c = &e.candidate;
        wtr.write_record(&[
            format!("{:.2}", c.solar_multiple),
            format!("{:.1}", c.duration_hours),
            format!("{:.2}", c.power_ratio),
            format!("{:.3}", c.solar_mw),
            format!("{:.3}", c.battery_power_mw),
            format!("{:.3}", c.battery_energy_mwh),
            format!("{:.4}", e.lcoe),
            format!("{:.6}", e.gas_fraction),
            format!("{:.6}", e.unmet_fraction),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
