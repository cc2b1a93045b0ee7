use crate::data::{GeneratedSchedule, PERIODS_PER_DAY};
use itertools::Itertools;

/// Renders every class's week as a bordered grid, classes sorted by name.
pub fn render_timetable(schedule: &GeneratedSchedule) -> String {
    let header: Vec<String> = std::iter::once("Day".to_string())
        .chain((1..=PERIODS_PER_DAY).map(|p| format!("Period {p}")))
        .collect();

    let mut out = String::new();
    for week in schedule.class_weeks() {
        let rows: Vec<Vec<String>> = week
            .days
            .iter()
            .map(|(day, slots)| {
                std::iter::once(format!("Day {day}"))
                    .chain(slots.iter().map(ToString::to_string))
                    .collect()
            })
            .collect();
        out.push_str(&format!(
            "\nTimetable for {}:\n{}\n",
            week.class,
            Table::new(header.clone(), rows)
        ));
    }
    out
}

/// Renders one teacher's week, or a "not found" notice.
pub fn render_teacher_schedule(schedule: &GeneratedSchedule, teacher: &str) -> String {
    let mut out = format!("Timetable for {teacher}:\n\n");
    match schedule.teacher_schedule(teacher) {
        Some(week) => {
            for (day, sessions) in week {
                out.push_str(&format!("Day {day}:\n"));
                for s in sessions {
                    out.push_str(&format!("Period {}: {} - {}\n", s.period, s.subject, s.class));
                }
                out.push('\n');
            }
        }
        None => out.push_str("No schedule found.\n"),
    }
    out
}

pub fn render_all_teacher_schedules(schedule: &GeneratedSchedule) -> String {
    schedule
        .teachers()
        .into_iter()
        .map(|t| render_teacher_schedule(schedule, t))
        .join("\n")
}

// Centered ASCII grid with a rule under the header.
struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    fn widths(&self) -> Vec<usize> {
        (0..self.header.len())
            .map(|col| {
                std::iter::once(&self.header)
                    .chain(&self.rows)
                    .filter_map(|row| row.get(col))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let widths = self.widths();
        let rule = format!("+{}+", widths.iter().map(|w| "-".repeat(w + 2)).join("+"));
        let line = |row: &[String]| {
            let cells = widths.iter().enumerate().map(|(i, &w)| {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                format!(" {cell:^w$} ")
            });
            format!("|{}|", cells.format("|"))
        };

        writeln!(f, "{rule}")?;
        writeln!(f, "{}", line(self.header.as_slice()))?;
        writeln!(f, "{rule}")?;
        for row in &self.rows {
            writeln!(f, "{}", line(row.as_slice()))?;
        }
        write!(f, "{rule}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Offering, SubjectCatalog};
    use crate::solver::generate;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn schedule() -> GeneratedSchedule {
        let catalog = SubjectCatalog::new()
            .with_class("B Class", vec![Offering::new("Math", "Mx", "lecture")])
            .with_class("A Class", vec![Offering::new("Art", "Mx", "lab")]);
        generate(&catalog, &mut StdRng::seed_from_u64(1))
    }

    #[test]
    fn test_table_layout() {
        let table = Table::new(
            vec!["Day".into(), "P".into()],
            vec![vec!["Day 1".into(), "abc".into()]],
        );
        let expected = "\
+-------+-----+
|  Day  |  P  |
+-------+-----+
| Day 1 | abc |
+-------+-----+";
        assert_eq!(table.to_string(), expected);
    }

    #[test]
    fn test_timetable_sorted_and_marks_free() {
        let text = render_timetable(&schedule());
        let a = text.find("Timetable for A Class:").unwrap();
        let b = text.find("Timetable for B Class:").unwrap();
        assert!(a < b);
        // B Class comes first in the catalog and takes Mx every period
        assert!(text.contains("Math (Mx) - lecture"));
        assert!(text.contains("- (-) - -"));
        assert!(!text.contains("Art (Mx) - lab"));
        assert!(text.contains("Period 5"));
        assert_eq!(text.matches("| Day 6 |").count(), 2);
    }

    #[test]
    fn test_timetable_block_layout() {
        let text = render_timetable(&schedule());
        assert!(text.starts_with("\nTimetable for A Class:\n+"));
        assert!(text.ends_with("-+\n"));
        // heading + 3 rules + header + 6 days, per class
        assert_eq!(text.lines().filter(|l| !l.is_empty()).count(), 2 * 11);
    }

    #[test]
    fn test_teacher_rendering() {
        let text = render_teacher_schedule(&schedule(), "Mx");
        assert!(text.starts_with("Timetable for Mx:\n\nDay 1:\nPeriod 1: Math - B Class\n"));
        assert_eq!(text.matches("Period 5: Math - B Class").count(), 6);
    }

    #[test]
    fn test_unknown_teacher_rendering() {
        let text = render_teacher_schedule(&schedule(), "Nobody");
        assert_eq!(text, "Timetable for Nobody:\n\nNo schedule found.\n");
    }

    #[test]
    fn test_all_teachers_rendering() {
        let text = render_all_teacher_schedules(&schedule());
        assert_eq!(text.matches("Timetable for ").count(), 1);
    }
}
