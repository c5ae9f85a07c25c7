use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Known job-posting columns. Files in the wild name these differently
/// ("Job Title" vs "title" vs "job_title"), so each field carries aliases
/// matched against a normalized header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobField {
    Title,
    Company,
    Qualifications,
    Preference,
    Description,
    Experience,
    SalaryRange,
    WorkType,
    PostingDate,
    Role,
    Skills,
    Responsibilities,
    Education,
}

impl JobField {
    pub const ALL: [JobField; 13] = [
        JobField::Title,
        JobField::Company,
        JobField::Qualifications,
        JobField::Preference,
        JobField::Description,
        JobField::Experience,
        JobField::SalaryRange,
        JobField::WorkType,
        JobField::PostingDate,
        JobField::Role,
        JobField::Skills,
        JobField::Responsibilities,
        JobField::Education,
    ];

    /// Header used when reporting a field back to callers.
    pub fn label(self) -> &'static str {
        match self {
            JobField::Title => "Job Title",
            JobField::Company => "Company",
            JobField::Qualifications => "Qualifications",
            JobField::Preference => "Preference",
            JobField::Description => "Job Description",
            JobField::Experience => "Experience",
            JobField::SalaryRange => "Salary Range",
            JobField::WorkType => "Work Type",
            JobField::PostingDate => "Job Posting Date",
            JobField::Role => "Role",
            JobField::Skills => "Skills",
            JobField::Responsibilities => "Responsibilities",
            JobField::Education => "Education",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            JobField::Title => &["title", "position"],
            JobField::Company => &["company", "companyname", "employer"],
            JobField::Qualifications => &["qualifications", "qualification"],
            JobField::Preference => &["preference"],
            JobField::Description => &["description", "desc"],
            JobField::Experience => &["experience"],
            JobField::SalaryRange => &["salaryrange", "salary"],
            JobField::WorkType => &["worktype"],
            JobField::PostingDate => &["postingdate", "posteddate", "date"],
            JobField::Role => &["role"],
            JobField::Skills => &["skills", "skill"],
            JobField::Responsibilities => &["responsibilities"],
            JobField::Education => &["education"],
        }
    }

    /// Resolves a raw CSV header to a known field, if any.
    pub fn from_header(header: &str) -> Option<JobField> {
        let key = normalize_header(header);
        JobField::ALL
            .into_iter()
            .find(|field| field.aliases().contains(&key.as_str()))
    }
}

/// Lowercases, keeps alphanumerics, and strips a leading "job" prefix.
fn normalize_header(header: &str) -> String {
    let squashed: String = header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    match squashed.strip_prefix("job") {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => squashed,
    }
}

/// Column index for each known field present in a file.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    columns: HashMap<JobField, usize>,
}

impl ColumnMap {
    /// First matching header wins when a file repeats a field.
    pub fn from_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> Self {
        let mut columns = HashMap::new();
        for (idx, header) in headers.into_iter().enumerate() {
            if let Some(field) = JobField::from_header(header) {
                columns.entry(field).or_insert(idx);
            }
        }
        Self { columns }
    }

    pub fn index_of(&self, field: JobField) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    pub fn contains(&self, field: JobField) -> bool {
        self.columns.contains_key(&field)
    }
}

/// A single job posting, addressed by its row position in the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: usize,
    pub title: Option<String>,
    pub company: Option<String>,
    pub qualifications: Option<String>,
    pub preference: Option<String>,
    pub description: Option<String>,
    pub experience: Option<String>,
    pub salary_range: Option<String>,
    pub work_type: Option<String>,
    pub posting_date: Option<String>,
    pub role: Option<String>,
    pub skills: Option<String>,
    pub responsibilities: Option<String>,
    pub education: Option<String>,
}

impl JobPosting {
    /// Builds a posting from raw cells. Empty or whitespace-only cells are `None`.
    pub fn from_cells(id: usize, cells: &[&str], columns: &ColumnMap) -> Self {
        let get = |field: JobField| -> Option<String> {
            columns
                .index_of(field)
                .and_then(|idx| cells.get(idx))
                .map(|cell| cell.trim())
                .filter(|cell| !cell.is_empty())
                .map(str::to_string)
        };

        JobPosting {
            id,
            title: get(JobField::Title),
            company: get(JobField::Company),
            qualifications: get(JobField::Qualifications),
            preference: get(JobField::Preference),
            description: get(JobField::Description),
            experience: get(JobField::Experience),
            salary_range: get(JobField::SalaryRange),
            work_type: get(JobField::WorkType),
            posting_date: get(JobField::PostingDate),
            role: get(JobField::Role),
            skills: get(JobField::Skills),
            responsibilities: get(JobField::Responsibilities),
            education: get(JobField::Education),
        }
    }

    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// Field overrides applied to a copy of an existing posting.
/// Unknown keys are rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobEdits {
    pub title: Option<String>,
    pub company: Option<String>,
    pub qualifications: Option<String>,
    pub preference: Option<String>,
    pub description: Option<String>,
    pub experience: Option<String>,
    pub salary_range: Option<String>,
    pub work_type: Option<String>,
    pub posting_date: Option<String>,
    pub role: Option<String>,
    pub skills: Option<String>,
    pub responsibilities: Option<String>,
    pub education: Option<String>,
}

impl JobEdits {
    /// The edited fields paired with their new values.
    pub fn changes(&self) -> Vec<(JobField, &str)> {
        [
            (JobField::Title, &self.title),
            (JobField::Company, &self.company),
            (JobField::Qualifications, &self.qualifications),
            (JobField::Preference, &self.preference),
            (JobField::Description, &self.description),
            (JobField::Experience, &self.experience),
            (JobField::SalaryRange, &self.salary_range),
            (JobField::WorkType, &self.work_type),
            (JobField::PostingDate, &self.posting_date),
            (JobField::Role, &self.role),
            (JobField::Skills, &self.skills),
            (JobField::Responsibilities, &self.responsibilities),
            (JobField::Education, &self.education),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }
}
