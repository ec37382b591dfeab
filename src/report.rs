use crate::marks::{self, MarkRow};
use crate::store::Store;

/// Chart types the report emits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Single bar carrying the average over all subjects
    Bar,

    /// Score per subject, connected in fixed subject order
    Line,

    /// One slice per subject, sized by its score
    Pie,
}

impl ChartKind {
    /// Parse the URL slug used by the chart image endpoint
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "bar" => Some(ChartKind::Bar),
            "line" => Some(ChartKind::Line),
            "pie" => Some(ChartKind::Pie),
            _ => None,
        }
    }

    /// URL slug for this chart
    pub fn slug(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
        }
    }
}

/// Declarative chart description handed to the rendering layer
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// One label per value; category names on the x axis or slice labels
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// A user's report: the marks table plus its arithmetic mean
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub rows: Vec<MarkRow>,
    pub average: f64,
}

/// Build the report for a user
///
/// Loads the marks table and computes the average. A user who has never
/// submitted marks gets the not-found error; the caller renders it and stops.
///
/// # Errors
/// * `"Marks not found. Please submit your marks."` when no table exists
/// * Store error messages when the table cannot be read or parsed
pub fn build_report(store: &dyn Store, username: &str) -> Result<Report, String> {
    let rows = match marks::load_marks(store, username)? {
        Some(rows) => rows,
        None => return Err("Marks not found. Please submit your marks.".to_string()),
    };

    let average = if rows.is_empty() {
        0.0
    } else {
        rows.iter().map(|r| r.score as f64).sum::<f64>() / rows.len() as f64
    };

    Ok(Report { rows, average })
}

impl Report {
    /// The specification for one of the report's three charts
    pub fn chart(&self, kind: ChartKind) -> ChartSpec {
        match kind {
            ChartKind::Bar => ChartSpec {
                kind,
                title: "Average Marks".to_string(),
                x_label: "Category".to_string(),
                y_label: "Marks".to_string(),
                labels: vec!["Average Marks".to_string()],
                values: vec![self.average],
            },
            ChartKind::Line => ChartSpec {
                kind,
                title: "Marks per Subject".to_string(),
                x_label: "Subject".to_string(),
                y_label: "Marks".to_string(),
                labels: self.rows.iter().map(|r| r.subject.clone()).collect(),
                values: self.rows.iter().map(|r| r.score as f64).collect(),
            },
            ChartKind::Pie => ChartSpec {
                kind,
                title: "Marks Distribution per Subject".to_string(),
                x_label: String::new(),
                y_label: String::new(),
                labels: self.rows.iter().map(|r| r.subject.clone()).collect(),
                values: self.rows.iter().map(|r| r.score as f64).collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marks::save_marks;
    use crate::store::FsStore;
    use tempfile::TempDir;

    fn store_with_marks() -> (TempDir, FsStore) {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());
        save_marks(&store, "Alice", [80, 60, 100]).unwrap();
        (dir, store)
    }

    #[test]
    fn average_is_the_arithmetic_mean() {
        let (_dir, store) = store_with_marks();

        let report = build_report(&store, "Alice").unwrap();
        assert_eq!(report.average, 80.0);
    }

    #[test]
    fn missing_marks_is_the_not_found_error() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::new(dir.path());

        let err = build_report(&store, "Alice").unwrap_err();
        assert_eq!(err, "Marks not found. Please submit your marks.");
    }

    #[test]
    fn bar_chart_carries_the_average_alone() {
        let (_dir, store) = store_with_marks();
        let report = build_report(&store, "Alice").unwrap();

        let spec = report.chart(ChartKind::Bar);
        assert_eq!(spec.labels, vec!["Average Marks"]);
        assert_eq!(spec.values, vec![80.0]);
    }

    #[test]
    fn line_chart_follows_subject_order() {
        let (_dir, store) = store_with_marks();
        let report = build_report(&store, "Alice").unwrap();

        let spec = report.chart(ChartKind::Line);
        assert_eq!(spec.labels, vec!["English", "Math", "Science"]);
        assert_eq!(spec.values, vec![80.0, 60.0, 100.0]);
    }

    #[test]
    fn pie_slices_sum_to_the_total_marks() {
        let (_dir, store) = store_with_marks();
        let report = build_report(&store, "Alice").unwrap();

        let spec = report.chart(ChartKind::Pie);
        assert_eq!(spec.values.len(), 3);
        assert_eq!(spec.values.iter().sum::<f64>(), 240.0);
    }

    #[test]
    fn chart_kind_slugs_round_trip() {
        for kind in [ChartKind::Bar, ChartKind::Line, ChartKind::Pie] {
            assert_eq!(ChartKind::from_slug(kind.slug()), Some(kind));
        }
        assert_eq!(ChartKind::from_slug("histogram"), None);
    }
}
