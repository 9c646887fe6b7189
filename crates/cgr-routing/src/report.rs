//! Candidate-route report
//!
//! A fixed-width table of the values the engine computed for each
//! candidate, for call logs and the simulator.

use std::fmt::{Display, Formatter};

use serde::Serialize;

use cgr_core::Route;

const RULE_WIDTH: usize = 143;

/// One row of the report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub num: u32,
    pub eto: i64,
    pub pbat: i64,
    pub route_volume_limit: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    pub overbooked_gigs: i64,
    pub overbooked_units: i64,
    pub protected_gigs: i64,
    pub protected_units: i64,
}

/// Report of a pass's candidate routes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateReport {
    pub routes: Vec<ReportRow>,
    /// Whether the loop classification column is shown
    #[serde(skip)]
    show_type: bool,
}

impl CandidateReport {
    /// Build a report; `show_type` adds the loop classification column
    pub fn new<'a>(candidates: impl IntoIterator<Item = &'a Route>, show_type: bool) -> Self {
        let routes = candidates
            .into_iter()
            .map(|r| ReportRow {
                num: r.num,
                eto: r.eto,
                pbat: r.pbat,
                route_volume_limit: r.route_volume_limit,
                kind: show_type.then(|| r.check_value.label()),
                overbooked_gigs: r.overbooked.gigs(),
                overbooked_units: r.overbooked.units(),
                protected_gigs: r.committed.gigs(),
                protected_units: r.committed.units(),
            })
            .collect();
        Self { routes, show_type }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the report has no rows
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Display for CandidateReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let title = " CANDIDATE ROUTES ";
        let side = (RULE_WIDTH - title.len()) / 2;
        writeln!(f)?;
        writeln!(f, "{}{title}{}", "-".repeat(side), "-".repeat(RULE_WIDTH - side - title.len()))?;

        if self.routes.is_empty() {
            writeln!(f, "\n0 candidate routes.")?;
        } else {
            writeln!(f)?;
            if self.show_type {
                writeln!(
                    f,
                    "{:<15} {:<15} {:<15} {:<15} {:<15} {:<15} {:<15} {:<15} {}",
                    "Route n.",
                    "ETO",
                    "PBAT",
                    "RVL",
                    "Type",
                    "Overbooked (G)",
                    "Overbooked (U)",
                    "Protected (G)",
                    "Protected (U)"
                )?;
            } else {
                writeln!(
                    f,
                    "{:<15} {:<15} {:<15} {:<15} {:<15} {:<15} {:<15} {}",
                    "Route n.",
                    "ETO",
                    "PBAT",
                    "RVL",
                    "Overbooked (G)",
                    "Overbooked (U)",
                    "Protected (G)",
                    "Protected (U)"
                )?;
            }

            for row in &self.routes {
                let num = format!("{})", row.num);
                let rvl = format_volume(row.route_volume_limit);
                if self.show_type {
                    writeln!(
                        f,
                        "{:<15} {:<15} {:<15} {:<15} {:<15} {:<15} {:<15} {:<15} {}",
                        num,
                        row.eto,
                        row.pbat,
                        rvl,
                        row.kind.unwrap_or(""),
                        row.overbooked_gigs,
                        row.overbooked_units,
                        row.protected_gigs,
                        row.protected_units
                    )?;
                } else {
                    writeln!(
                        f,
                        "{:<15} {:<15} {:<15} {:<15} {:<15} {:<15} {:<15} {}",
                        num,
                        row.eto,
                        row.pbat,
                        rvl,
                        row.overbooked_gigs,
                        row.overbooked_units,
                        row.protected_gigs,
                        row.protected_units
                    )?;
                }
            }
        }

        writeln!(f, "\n{}", "-".repeat(RULE_WIDTH))
    }
}

/// Compact rendering of a volume, switching to exponent form when large
fn format_volume(volume: f64) -> String {
    if volume.abs() >= 1e6 {
        format!("{volume:e}")
    } else {
        format!("{volume}")
    }
}
