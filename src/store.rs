use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDateTime};
use rusqlite::Connection;
use tracing::info;

use crate::engine::BaselineSets;
use crate::ingest::BaselineRecord;

/// The two baseline partitions. Each OS class owns its own table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsClass {
    Windows,
    Linux,
}

impl OsClass {
    pub fn label(self) -> &'static str {
        match self {
            OsClass::Windows => "Windows",
            OsClass::Linux => "Linux",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            OsClass::Windows => "windows",
            OsClass::Linux => "linux",
        }
    }

    fn table(self) -> &'static str {
        match self {
            OsClass::Windows => "windows_agents",
            OsClass::Linux => "linux_agents",
        }
    }
}

/// Persistent baseline membership store backed by sqlite.
///
/// Holds one table per OS class with `(domain, agent_name)` unique per table.
/// The store is the only state that survives between runs.
pub struct BaselineStore {
    conn: Connection,
    path: PathBuf,
}

/// Metadata shown by the "view database info" menu entry.
#[derive(Debug)]
pub struct StoreInfo {
    pub path: PathBuf,
    pub size_kb: f64,
    pub modified: NaiveDateTime,
    pub windows_agents: u64,
    pub linux_agents: u64,
}

impl BaselineStore {
    /// Open the baseline database, creating it and its tables if needed.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open baseline database at {}", path.display()))?;

        for os in [OsClass::Windows, OsClass::Linux] {
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    domain TEXT NOT NULL,
                    agent_name TEXT NOT NULL,
                    operating_system TEXT NOT NULL DEFAULT '{}',
                    UNIQUE(domain, agent_name)
                )",
                os.table(),
                os.label()
            ))
            .context("Failed to create baseline tables")?;
        }

        info!(action = "open", component = "baseline_store", path = ?path, "Baseline store opened");
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Replace the full baseline for one OS class.
    ///
    /// Clear-then-insert runs inside a single transaction; nothing is
    /// committed if any insert fails.
    pub fn replace_all(&mut self, os: OsClass, records: &[BaselineRecord]) -> Result<usize> {
        let tx = self.conn.transaction()?;

        tx.execute(&format!("DELETE FROM {}", os.table()), [])?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} (domain, agent_name, operating_system) VALUES (?1, ?2, ?3)",
                os.table()
            ))?;
            for record in records {
                stmt.execute(rusqlite::params![
                    record.domain,
                    record.agent_name,
                    os.label()
                ])?;
            }
        }
        tx.commit()?;

        info!(
            action = "replace",
            component = "baseline_store",
            os = os.label(),
            record_count = records.len(),
            "Baseline replaced"
        );
        Ok(records.len())
    }

    /// All baseline agents for one OS class, grouped by domain.
    pub fn agents_by_domain(&self, os: OsClass) -> Result<BaselineSets> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT DISTINCT domain, agent_name FROM {}",
            os.table()
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut sets = BaselineSets::new();
        for row in rows {
            let (domain, agent_name) = row.context("Failed to read baseline row")?;
            sets.entry(domain).or_default().insert(agent_name);
        }
        Ok(sets)
    }

    pub fn agent_count(&self, os: OsClass) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", os.table()), [], |row| {
                row.get(0)
            })
            .context("Failed to count baseline agents")?;
        Ok(count as u64)
    }

    pub fn info(&self) -> Result<StoreInfo> {
        let metadata = fs::metadata(&self.path)
            .with_context(|| format!("Failed to stat database at {}", self.path.display()))?;
        let modified: DateTime<Local> = metadata
            .modified()
            .context("Failed to read database modification time")?
            .into();

        Ok(StoreInfo {
            path: self.path.clone(),
            size_kb: metadata.len() as f64 / 1024.0,
            modified: modified.naive_local(),
            windows_agents: self.agent_count(OsClass::Windows)?,
            linux_agents: self.agent_count(OsClass::Linux)?,
        })
    }
}
