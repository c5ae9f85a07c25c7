use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tempfile::NamedTempFile;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::job::{ColumnMap, JobEdits, JobField, JobPosting};

/// The in-memory job table: raw headers, resolved columns and every row.
/// Columns the service doesn't know about are carried through untouched.
#[derive(Debug, Clone)]
pub struct JobTable {
    headers: StringRecord,
    columns: ColumnMap,
    rows: Vec<StringRecord>,
}

impl JobTable {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, AppError> {
        let mut csv_reader = ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = csv_reader.headers()?.clone();
        let columns = ColumnMap::from_headers(headers.iter());

        for required in [JobField::Title, JobField::Description] {
            if !columns.contains(required) {
                return Err(AppError::Validation(format!(
                    "Jobs file is missing a '{}' column",
                    required.label()
                )));
            }
        }

        let rows = csv_reader.records().collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            headers,
            columns,
            rows,
        })
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), AppError> {
        let mut csv_writer = WriterBuilder::new().flexible(true).from_writer(writer);
        csv_writer.write_record(&self.headers)?;
        for row in &self.rows {
            csv_writer.write_record(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn posting(&self, id: usize) -> Option<JobPosting> {
        self.rows.get(id).map(|row| {
            let cells: Vec<&str> = row.iter().collect();
            JobPosting::from_cells(id, &cells, &self.columns)
        })
    }

    pub fn postings(&self) -> Vec<JobPosting> {
        (0..self.rows.len()).filter_map(|id| self.posting(id)).collect()
    }

    /// Appends a copy of row `base_id` with `edits` applied. Returns the new row's posting.
    pub fn append_edited(&mut self, base_id: usize, edits: &JobEdits) -> Result<JobPosting, AppError> {
        let base = self
            .rows
            .get(base_id)
            .ok_or_else(|| AppError::NotFound(format!("Job {base_id} not found")))?;

        let mut cells: Vec<String> = base.iter().map(str::to_string).collect();
        cells.resize(self.headers.len().max(cells.len()), String::new());

        for (field, value) in edits.changes() {
            let idx = self.columns.index_of(field).ok_or_else(|| {
                AppError::Validation(format!(
                    "Jobs file has no '{}' column to edit",
                    field.label()
                ))
            })?;
            cells[idx] = value.to_string();
        }

        self.rows.push(StringRecord::from(cells));
        let new_id = self.rows.len() - 1;
        self.posting(new_id)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("appended row {new_id} vanished")))
    }
}

/// Owns the job table and the CSV file backing it.
///
/// Reads clone a snapshot under the read lock. Appends hold the write lock
/// across the file rewrite, and the in-memory table only changes once the
/// file has been replaced.
pub struct JobStore {
    path: PathBuf,
    table: RwLock<JobTable>,
}

impl JobStore {
    /// Loads the CSV at `path`. Startup fails if it is unreadable or lacks required columns.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        info!("Loading job postings from {}", path.display());

        let file = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open jobs file '{}'", path.display()))?;
        let table = JobTable::from_reader(file)
            .with_context(|| format!("Failed to parse jobs file '{}'", path.display()))?;

        if table.is_empty() {
            warn!("Jobs file has no rows; résumé matching will fail until postings are appended");
        }
        info!("Loaded {} job postings", table.len());
        Ok(Self {
            path,
            table: RwLock::new(table),
        })
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.len()
    }

    pub async fn postings(&self) -> Vec<JobPosting> {
        self.table.read().await.postings()
    }

    pub async fn posting(&self, id: usize) -> Option<JobPosting> {
        self.table.read().await.posting(id)
    }

    /// Appends an edited copy of `base_id` and rewrites the backing file.
    pub async fn append_edited(&self, base_id: usize, edits: &JobEdits) -> Result<JobPosting, AppError> {
        let mut table = self.table.write().await;

        let mut updated = table.clone();
        let posting = updated.append_edited(base_id, edits)?;

        let path = self.path.clone();
        let updated = tokio::task::spawn_blocking(move || persist(&path, &updated).map(|()| updated))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("jobs file write task failed: {e}")))??;
        *table = updated;

        info!(
            "Appended job {} (copy of {}) to {}",
            posting.id,
            base_id,
            self.path.display()
        );
        Ok(posting)
    }
}

/// Writes to a temp file beside `path`, then renames it into place.
/// The replaced file's permissions carry over to the new one.
fn persist(path: &Path, table: &JobTable) -> Result<(), AppError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    match std::fs::metadata(path) {
        Ok(meta) => tmp.as_file().set_permissions(meta.permissions())?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    table.write_to(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| AppError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOBS_CSV: &str = "\
Job Title,Company,Job Description,Salary Range,Contact
Data Engineer,Acme,Build Spark pipelines,$60K-$90K,ann@acme.test
Chef,Bistro,Prepare meals,$30K-$40K,bob@bistro.test
";

    fn write_jobs_file(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.csv");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_table_loads_prefixed_headers() {
        let table = JobTable::from_reader(JOBS_CSV.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        let first = table.posting(0).unwrap();
        assert_eq!(first.title.as_deref(), Some("Data Engineer"));
        assert_eq!(first.company.as_deref(), Some("Acme"));
        assert_eq!(first.salary_range.as_deref(), Some("$60K-$90K"));
    }

    #[test]
    fn test_table_loads_unprefixed_headers() {
        let csv = "title,company,description,skills\nAnalyst,Co,Crunch numbers,Excel\n";
        let table = JobTable::from_reader(csv.as_bytes()).unwrap();
        let posting = table.posting(0).unwrap();
        assert_eq!(posting.title.as_deref(), Some("Analyst"));
        assert_eq!(posting.skills.as_deref(), Some("Excel"));
    }

    #[test]
    fn test_table_requires_title_and_description() {
        let err = JobTable::from_reader("Company,Job Description\nAcme,x\n".as_bytes()).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("Job Title")));

        let err = JobTable::from_reader("Job Title,Company\nX,Acme\n".as_bytes()).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("Job Description")));
    }

    #[test]
    fn test_table_tolerates_short_rows() {
        let csv = "Job Title,Job Description,Company\nAnalyst,Crunch numbers\n";
        let table = JobTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.posting(0).unwrap().company, None);
    }

    #[test]
    fn test_empty_table_is_allowed() {
        let table = JobTable::from_reader("Job Title,Job Description\n".as_bytes()).unwrap();
        assert!(table.is_empty());
        assert!(table.postings().is_empty());
    }

    #[test]
    fn test_append_edited_copies_unknown_columns() {
        let mut table = JobTable::from_reader(JOBS_CSV.as_bytes()).unwrap();
        let edits = JobEdits {
            company: Some("Globex".to_string()),
            ..Default::default()
        };
        let posting = table.append_edited(0, &edits).unwrap();
        assert_eq!(posting.id, 2);
        assert_eq!(posting.company.as_deref(), Some("Globex"));
        assert_eq!(posting.title.as_deref(), Some("Data Engineer"));

        let mut out = Vec::new();
        table.write_to(&mut out).unwrap();
        let written = String::from_utf8(out).unwrap();
        assert!(written.ends_with("Data Engineer,Globex,Build Spark pipelines,$60K-$90K,ann@acme.test\n"));
        // The base row is untouched.
        assert!(written.contains("Data Engineer,Acme,"));
    }

    #[test]
    fn test_append_edited_unknown_base_is_not_found() {
        let mut table = JobTable::from_reader(JOBS_CSV.as_bytes()).unwrap();
        let err = table.append_edited(99, &JobEdits::default()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_append_edited_absent_column_is_validation_error() {
        let mut table = JobTable::from_reader(JOBS_CSV.as_bytes()).unwrap();
        let edits = JobEdits {
            skills: Some("Rust".to_string()),
            ..Default::default()
        };
        let err = table.append_edited(0, &edits).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(table.len(), 2);
    }

    #[tokio::test]
    async fn test_store_append_persists_across_reload() {
        let (_dir, path) = write_jobs_file(JOBS_CSV);
        let store = JobStore::open(&path).unwrap();

        let edits = JobEdits {
            title: Some("Senior Data Engineer".to_string()),
            salary_range: Some("$90K-$120K".to_string()),
            ..Default::default()
        };
        let appended = store.append_edited(0, &edits).await.unwrap();
        assert_eq!(appended.id, 2);
        assert_eq!(store.len().await, 3);

        let reloaded = JobStore::open(&path).unwrap();
        let postings = reloaded.postings().await;
        assert_eq!(postings.len(), 3);
        assert_eq!(postings[2].title.as_deref(), Some("Senior Data Engineer"));
        assert_eq!(postings[2].salary_range.as_deref(), Some("$90K-$120K"));
        assert_eq!(postings[2].company.as_deref(), Some("Acme"));
    }

    #[tokio::test]
    async fn test_store_failed_append_leaves_file_and_memory_alone() {
        let (_dir, path) = write_jobs_file(JOBS_CSV);
        let store = JobStore::open(&path).unwrap();

        assert!(store.append_edited(7, &JobEdits::default()).await.is_err());
        assert_eq!(store.len().await, 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), JOBS_CSV);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_store_append_keeps_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, path) = write_jobs_file(JOBS_CSV);
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        let store = JobStore::open(&path).unwrap();

        store.append_edited(0, &JobEdits::default()).await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644, "mode after append was {mode:o}");
    }

    #[test]
    fn test_persist_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.csv");
        let table = JobTable::from_reader(JOBS_CSV.as_bytes()).unwrap();

        persist(&path, &table).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), JOBS_CSV);
    }

    #[test]
    fn test_open_missing_file_fails_with_context() {
        let err = JobStore::open("/nonexistent/jobs.csv").err().unwrap();
        assert!(err.to_string().contains("/nonexistent/jobs.csv"));
    }
}
