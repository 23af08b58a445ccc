//! Report rendering (table, json, csv) on stdout

use anyhow::Result;
use conso_analytics::{Breakdown, TimeSeriesData};
use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(anyhow::anyhow!(
                "unknown output format: {}. Use one of: table, json, csv",
                s
            )),
        }
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_timeseries(result: &TimeSeriesData, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(result)?,
        OutputFormat::Csv => {
            println!("date,count");
            for point in &result.points {
                println!("{},{}", point.date, point.count);
            }
        }
        OutputFormat::Table => {
            if result.is_empty() {
                println!("(no data)");
                return Ok(());
            }

            println!("{:<20} {:>15}", "Date", "Count");
            println!("{}", "-".repeat(36));
            for point in &result.points {
                println!("{:<20} {:>15}", point.date, point.count);
            }

            println!("{}", "-".repeat(36));
            println!(
                "Total: {}  Min: {}  Max: {}  Avg: {:.1}",
                result.total, result.min, result.max, result.avg
            );

            if let Some(comp) = &result.comparison {
                println!();
                println!("Comparison:");
                println!(
                    "  Previous: {}  Change: {:+} ({:+.1}%)",
                    comp.previous_total, comp.change, comp.percent_change
                );
            }
        }
    }

    Ok(())
}

pub fn print_breakdown(result: &Breakdown, format: OutputFormat) -> Result<()> {
    let with_rates = result.rows.iter().any(|r| r.rate.is_some());

    match format {
        OutputFormat::Json => print_json(result)?,
        OutputFormat::Csv => {
            if with_rates {
                println!("code,label,count,rate");
            } else {
                println!("code,label,count");
            }
            for row in &result.rows {
                let code = row.code.map(|c| c.to_string()).unwrap_or_default();
                let mut line = format!("{},{},{}", code, csv_field(&row.label), row.count);
                if let Some(rate) = row.rate {
                    line.push_str(&format!(",{:.2}", rate));
                }
                println!("{}", line);
            }
        }
        OutputFormat::Table => {
            if result.is_empty() {
                println!("(no data)");
                return Ok(());
            }

            let label_width = result
                .rows
                .iter()
                .map(|r| r.label.chars().count())
                .max()
                .unwrap_or(0)
                .clamp(10, 40);

            let header = result.dimension.as_str();
            if with_rates {
                println!("{:<w$} {:>10} {:>8}", header, "Count", "Rate", w = label_width);
            } else {
                println!("{:<w$} {:>10}", header, "Count", w = label_width);
            }
            println!("{}", "-".repeat(label_width + 20));

            for row in &result.rows {
                match row.rate {
                    Some(rate) => println!(
                        "{:<w$} {:>10} {:>7.2}%",
                        truncate(&row.label, label_width),
                        row.count,
                        rate,
                        w = label_width
                    ),
                    None => println!(
                        "{:<w$} {:>10}",
                        truncate(&row.label, label_width),
                        row.count,
                        w = label_width
                    ),
                }
            }

            println!("{}", "-".repeat(label_width + 20));
            println!("Total: {}", result.total);
        }
    }

    Ok(())
}

/// Quote a CSV field when needed
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let cut: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
