use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use tracing::info;

use crate::config::AppConfig;
use crate::engine;
use crate::export;
use crate::ingest;
use crate::report;
use crate::store::{BaselineStore, OsClass};

const MENU_ITEMS: [&str; 5] = [
    "Load Windows baseline",
    "Load Linux baseline",
    "Check availability & generate report",
    "View database info",
    "Exit",
];

const DEFAULT_REPORT_BASE: &str = "agent_availability_report";

/// The interactive application: a menu loop over the baseline store.
pub struct App {
    config: AppConfig,
    store: BaselineStore,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let db_path = config.ensure_data_dir()?;
        let store = BaselineStore::open(&db_path)?;
        Ok(Self { config, store })
    }

    /// Run the menu until the user exits.
    ///
    /// Validation failures are displayed and the loop continues; nothing is
    /// partially committed on error.
    pub fn run(&mut self) -> Result<()> {
        if let Err(err) = self.print_store_info() {
            eprintln!("Warning: could not read database info: {err:#}");
        }

        println!("\nWelcome to the Agent Availability System!");
        println!("This tool calculates agent availability per domain and operating system.");

        loop {
            println!();
            let choice = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("Main menu")
                .items(&MENU_ITEMS)
                .default(0)
                .interact()?;

            let outcome = match choice {
                0 => self.load_baseline(OsClass::Windows),
                1 => self.load_baseline(OsClass::Linux),
                2 => self.check_availability(),
                3 => self.print_store_info(),
                _ => {
                    println!("\nGoodbye!");
                    return Ok(());
                }
            };

            if let Err(err) = outcome {
                eprintln!("Error: {err:#}");
            }
        }
    }

    fn load_baseline(&mut self, os: OsClass) -> Result<()> {
        let prompt = format!("{} baseline CSV path (empty to cancel)", os.label());
        let Some(path) = prompt_csv_path(&prompt)? else {
            return Ok(());
        };

        let records = ingest::read_baseline(&path)?;
        let count = self.store.replace_all(os, &records)?;
        println!(
            "\nSuccessfully loaded {} {} agents from {}",
            count,
            os.label(),
            path.display()
        );
        Ok(())
    }

    fn check_availability(&mut self) -> Result<()> {
        let windows_baseline = self.store.agents_by_domain(OsClass::Windows)?;
        let linux_baseline = self.store.agents_by_domain(OsClass::Linux)?;

        if windows_baseline.is_empty() && linux_baseline.is_empty() {
            println!("\nNo baseline data found in the database.");
            println!("Load a baseline first using the menu options above.");
            return Ok(());
        }

        let windows_csv = prompt_csv_path("Windows availability CSV path (empty if none)")?;
        let linux_csv = prompt_csv_path("Linux availability CSV path (empty if none)")?;

        if windows_csv.is_none() && linux_csv.is_none() {
            println!("No availability CSV provided. Operation cancelled.");
            return Ok(());
        }

        let base_name = prompt_report_base()?;

        // A cancelled input is an empty feed: every baseline agent in that
        // class simply has no last-seen entry.
        let windows_rows = match &windows_csv {
            Some(path) => ingest::read_availability(path)?,
            None => Vec::new(),
        };
        let linux_rows = match &linux_csv {
            Some(path) => ingest::read_availability(path)?,
            None => Vec::new(),
        };

        let windows_index = engine::build_availability_index(&windows_rows)?;
        let linux_index = engine::build_availability_index(&linux_rows)?;

        // The single wall-clock read for this run; classification itself
        // takes the reference instant as a parameter.
        let now = Local::now().naive_local();
        let windows_results = engine::classify(&windows_baseline, &windows_index, now);
        let linux_results = engine::classify(&linux_baseline, &linux_index, now);

        let sections = [
            (OsClass::Windows, &windows_results),
            (OsClass::Linux, &linux_results),
        ];

        report::print_console_report(&sections);

        let reports_dir = self.config.ensure_reports_dir()?;
        let sheet_paths = export::write_sheet_reports(reports_dir, &base_name, &sections)?;
        let document_path =
            export::write_document_report(reports_dir, &base_name, &sections, now)?;

        for path in &sheet_paths {
            println!("Sheet report generated: {}", path.display());
        }
        println!("Document report generated: {}", document_path.display());
        println!("\nReports saved to: {}", reports_dir.display());

        info!(
            action = "complete",
            component = "availability_check",
            report_base = base_name,
            "Availability check complete"
        );
        Ok(())
    }

    fn print_store_info(&self) -> Result<()> {
        let info = self.store.info()?;

        println!("\n{}", "=".repeat(50));
        println!("PERSISTENT DATABASE INFO");
        println!("{}", "=".repeat(50));
        println!("Location: {}", info.path.display());
        println!("Size: {:.2} KB", info.size_kb);
        println!("Last Modified: {}", info.modified.format("%Y-%m-%d %H:%M:%S"));
        println!("Windows Agents: {}", info.windows_agents);
        println!("Linux Agents: {}", info.linux_agents);
        println!("{}", "=".repeat(50));
        Ok(())
    }
}

/// Prompt for a CSV path. Empty input (or quit/exit/cancel) cancels the step.
fn prompt_csv_path(prompt: &str) -> Result<Option<PathBuf>> {
    let raw: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;

    let trimmed = raw.trim();
    if trimmed.is_empty()
        || matches!(trimmed.to_lowercase().as_str(), "quit" | "exit" | "cancel")
    {
        return Ok(None);
    }
    Ok(Some(PathBuf::from(trimmed)))
}

/// Prompt for the report base name, stripping a trailing extension if the
/// user typed one.
fn prompt_report_base() -> Result<String> {
    let raw: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Output report filename base")
        .default(DEFAULT_REPORT_BASE.to_string())
        .interact_text()?;

    let mut base = raw.trim().to_string();
    if base.is_empty() {
        base = DEFAULT_REPORT_BASE.to_string();
    }
    for extension in [".xlsx", ".docx", ".csv", ".md"] {
        if let Some(stripped) = base.strip_suffix(extension) {
            base = stripped.to_string();
            break;
        }
    }
    Ok(base)
}
