use crate::store::Store;

/// Fixed subject set, in the order rows are stored and rendered
pub const SUBJECTS: [&str; 3] = ["English", "Math", "Science"];

/// Highest score a subject can hold
pub const MAX_SCORE: u32 = 100;

/// Name of the per-user marks file
pub const MARKS_FILE: &str = "marks.csv";

/// One row of the marks table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkRow {
    pub subject: String,
    pub score: u32,
}

fn marks_key(username: &str) -> String {
    format!("{}/{}", username, MARKS_FILE)
}

/// Persist the marks table for a user
///
/// Writes a `Subject,Marks` CSV with one row per fixed subject, in order,
/// overwriting any prior table. Scores above [`MAX_SCORE`] are clamped; the
/// entry form is bounded to the same range.
///
/// # Arguments
/// * `store` - Storage backend
/// * `username` - Display name of the active user
/// * `scores` - One score per subject, in [`SUBJECTS`] order
///
/// # Returns
/// * `Result<(), String>` - Success or an error message
pub fn save_marks(store: &dyn Store, username: &str, scores: [u32; 3]) -> Result<(), String> {
    let mut csv = String::from("Subject,Marks\n");
    for (subject, score) in SUBJECTS.iter().zip(scores) {
        csv.push_str(&format!("{},{}\n", subject, score.min(MAX_SCORE)));
    }

    if store.put(&marks_key(username), &csv).is_err() {
        return Err("Failed to write marks data".to_string());
    }

    Ok(())
}

/// Load the marks table for a user
///
/// # Arguments
/// * `store` - Storage backend
/// * `username` - Display name of the user
///
/// # Returns
/// * `Result<Option<Vec<MarkRow>>, String>` - The table, `None` when the user
///   has never submitted marks, or an error message
///
/// # Errors
/// * Returns an error if the stored table cannot be read or parsed
pub fn load_marks(store: &dyn Store, username: &str) -> Result<Option<Vec<MarkRow>>, String> {
    let contents = match store.get(&marks_key(username)) {
        Ok(Some(contents)) => contents,
        Ok(None) => return Ok(None),
        Err(_) => return Err("Failed to read marks data".to_string()),
    };

    let mut rows = Vec::new();
    // First line is the header.
    for line in contents.lines().skip(1) {
        if line.trim().is_empty() {
            continue;
        }

        let (subject, value) = match line.split_once(',') {
            Some(parts) => parts,
            None => return Err("Failed to parse marks data".to_string()),
        };

        let score = match value.trim().parse::<u32>() {
            Ok(score) => score,
            Err(_) => return Err("Failed to parse marks data".to_string()),
        };

        rows.push(MarkRow {
            subject: subject.to_string(),
            score,
        });
    }

    Ok(Some(rows))
}
