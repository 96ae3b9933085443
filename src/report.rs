use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDateTime;

use crate::store::OsClass;

/// Classification outcome for one domain.
///
/// `available` and `not_available` partition the domain's baseline agents;
/// `total` is fixed at the baseline cardinality. `last_seen` holds an entry
/// for every agent that appeared in the availability feed, whether or not it
/// was fresh enough to count as available.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainResult {
    pub total: usize,
    pub available: BTreeSet<String>,
    pub not_available: BTreeSet<String>,
    pub last_seen: HashMap<String, NaiveDateTime>,
}

/// Per-domain results for one OS class, sorted by domain for rendering.
pub type DomainResults = BTreeMap<String, DomainResult>;

impl DomainResult {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Share of baseline agents currently available, in percent.
    ///
    /// An empty baseline reports 0 rather than dividing by zero. Rounding
    /// happens only at rendering.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.available.len() as f64 / self.total as f64 * 100.0
        }
    }
}

/// Print the availability report to the console, one block per OS/domain.
pub fn print_console_report(sections: &[(OsClass, &DomainResults)]) {
    println!("\n{}", "=".repeat(50));
    println!("AGENT AVAILABILITY REPORT");
    println!("{}\n", "=".repeat(50));

    for (os, results) in sections {
        for (domain, result) in results.iter() {
            println!("Operating System: {}", os.label());
            println!("Domain: {domain}");

            if result.not_available.is_empty() {
                println!("Hosts Not Available: None");
            } else {
                println!("Hosts Not Available:");
                for host in &result.not_available {
                    println!("\t*\t{host}");
                }
            }

            println!("Availability Percentage: {:.1}%\n", result.percentage());
        }
    }

    println!("{}", "=".repeat(50));
}
