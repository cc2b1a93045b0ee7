use crate::data::{
    ClassDay, ClassWeek, Day, DAYS, GeneratedSchedule, Offering, PERIODS_PER_DAY, Session, Slot,
    SubjectCatalog, TeacherName, TeacherWeek,
};
use itertools::Itertools;
use log::{debug, info, trace};
use rand::Rng;
use rand::prelude::IndexedRandom;
use std::collections::HashSet;
use std::time::Instant;

/// Builds a weekly timetable with the thread-local random generator.
/// Repeated calls with the same catalog will generally differ.
pub fn generate_random(catalog: &SubjectCatalog) -> GeneratedSchedule {
    generate(catalog, &mut rand::rng())
}

/// Greedy randomized assignment, day by day.
///
/// Within a day each period keeps a set of teachers already committed to it.
/// Classes are visited in catalog order and, for each period, pick uniformly
/// among offerings whose teacher is still free in that period. A class with no
/// eligible offering gets `Slot::Free`. Nothing carries over between days.
pub fn generate<R: Rng + ?Sized>(catalog: &SubjectCatalog, rng: &mut R) -> GeneratedSchedule {
    let start_time = Instant::now();
    info!(
        "Generating timetable for {} classes over {} days x {} periods...",
        catalog.len(),
        DAYS.count(),
        PERIODS_PER_DAY
    );

    let mut schedule = GeneratedSchedule::default();
    let mut free_slots = 0usize;

    for day in DAYS {
        let mut occupied: Vec<HashSet<&str>> = vec![HashSet::new(); PERIODS_PER_DAY];
        let mut classes = Vec::with_capacity(catalog.len());

        for class in catalog.classes() {
            let mut periods = Vec::with_capacity(PERIODS_PER_DAY);
            for (period, busy) in occupied.iter_mut().enumerate() {
                let candidates: Vec<&Offering> = class
                    .offerings
                    .iter()
                    .filter(|o| !busy.contains(o.teacher.as_str()))
                    .collect();

                match candidates.choose(&mut *rng) {
                    Some(&offering) => {
                        trace!(
                            "day {} period {}: {} -> {} ({})",
                            day,
                            period + 1,
                            class.name,
                            offering.subject,
                            offering.teacher
                        );
                        busy.insert(offering.teacher.as_str());
                        teacher_week(&mut schedule, &offering.teacher)
                            .entry(day)
                            .or_default()
                            .push(Session {
                                subject: offering.subject.clone(),
                                class: class.name.clone(),
                                period: period + 1,
                            });
                        periods.push(Slot::Assigned(offering.clone()));
                    }
                    None => {
                        free_slots += 1;
                        periods.push(Slot::Free);
                    }
                }
            }
            classes.push(ClassDay {
                class: class.name.clone(),
                periods,
            });
        }
        schedule.timetable.insert(day, classes);
    }

    debug!(
        "{} teachers scheduled, {} slots left free",
        schedule.teacher_schedules.len(),
        free_slots
    );
    info!("Timetable generated in {:.2?}", start_time.elapsed());
    schedule
}

// first session for a teacher creates the whole (empty) week
fn teacher_week<'a>(schedule: &'a mut GeneratedSchedule, teacher: &str) -> &'a mut TeacherWeek {
    schedule
        .teacher_schedules
        .entry(teacher.to_string())
        .or_insert_with(|| DAYS.map(|d| (d, Vec::new())).collect())
}

impl GeneratedSchedule {
    /// Every class's weekly grid, ordered by class name.
    pub fn class_weeks(&self) -> Vec<ClassWeek<'_>> {
        let grouped = self
            .timetable
            .iter()
            .flat_map(|(&day, classes)| {
                classes
                    .iter()
                    .map(move |c| (c.class.as_str(), (day, c.periods.as_slice())))
            })
            .into_group_map();

        grouped
            .into_iter()
            .sorted_by_key(|(class, _)| *class)
            .map(|(class, mut days)| {
                days.sort_by_key(|(day, _)| *day);
                ClassWeek { class, days }
            })
            .collect()
    }

    /// A teacher's week, or `None` if they were never assigned a session.
    pub fn teacher_schedule(&self, teacher: &str) -> Option<&TeacherWeek> {
        self.teacher_schedules.get(teacher)
    }

    /// Names of all teachers with at least one session, sorted.
    pub fn teachers(&self) -> Vec<&TeacherName> {
        self.teacher_schedules.keys().collect()
    }

    pub fn day(&self, day: Day) -> Option<&[ClassDay]> {
        self.timetable.get(&day).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn math_and_science() -> Vec<Offering> {
        vec![
            Offering::new("Math", "Mx", "lecture"),
            Offering::new("Sci", "Sx", "lab"),
        ]
    }

    fn three_years() -> SubjectCatalog {
        SubjectCatalog::new()
            .with_class(
                "First Year",
                vec![
                    Offering::new("Math", "Smith", "lecture"),
                    Offering::new("Physics", "Jones", "lab"),
                    Offering::new("English", "Brown", "lecture"),
                ],
            )
            .with_class(
                "Second Year",
                vec![
                    Offering::new("Algebra", "Smith", "lecture"),
                    Offering::new("Chemistry", "Jones", "lab"),
                ],
            )
            .with_class(
                "Third Year",
                vec![
                    Offering::new("Calculus", "Smith", "lecture"),
                    Offering::new("Literature", "Brown", "lecture"),
                ],
            )
    }

    fn assert_no_double_booking(schedule: &GeneratedSchedule) {
        for (day, classes) in &schedule.timetable {
            for period in 0..PERIODS_PER_DAY {
                let teachers: Vec<&str> = classes
                    .iter()
                    .filter_map(|c| c.periods[period].offering())
                    .map(|o| o.teacher.as_str())
                    .collect();
                let unique: HashSet<&str> = teachers.iter().copied().collect();
                assert_eq!(
                    teachers.len(),
                    unique.len(),
                    "teacher double-booked on day {day} period {period}: {teachers:?}"
                );
            }
        }
    }

    #[test]
    fn test_no_teacher_double_booked() {
        let catalog = three_years();
        for seed in 0..200 {
            let schedule = generate(&catalog, &mut StdRng::seed_from_u64(seed));
            assert_no_double_booking(&schedule);
        }
    }

    #[test]
    fn test_every_class_gets_five_periods_each_day() {
        let catalog = three_years().with_class("Empty", vec![]);
        let schedule = generate(&catalog, &mut StdRng::seed_from_u64(7));

        assert_eq!(schedule.timetable.len(), 6);
        for day in DAYS {
            let classes = schedule.day(day).unwrap();
            assert_eq!(classes.len(), 4);
            for class in classes {
                assert_eq!(class.periods.len(), PERIODS_PER_DAY);
            }
        }
    }

    #[test]
    fn test_classes_keep_catalog_order() {
        let schedule = generate(&three_years(), &mut StdRng::seed_from_u64(1));
        let names: Vec<&str> = schedule.day(1).unwrap().iter().map(|c| c.class.as_str()).collect();
        assert_eq!(names, vec!["First Year", "Second Year", "Third Year"]);
    }

    #[test]
    fn test_empty_offerings_are_all_free() {
        let catalog = SubjectCatalog::new().with_class("A", vec![]);
        let schedule = generate(&catalog, &mut StdRng::seed_from_u64(3));

        for classes in schedule.timetable.values() {
            assert!(classes[0].periods.iter().all(Slot::is_free));
        }
        assert!(schedule.teacher_schedules.is_empty());
    }

    #[test]
    fn test_single_offering_fills_every_period() {
        // occupancy is per period, so one class can reuse its teacher all day
        let catalog = SubjectCatalog::new().with_class("A", vec![Offering::new("Math", "Mx", "lecture")]);
        let schedule = generate(&catalog, &mut StdRng::seed_from_u64(3));

        for classes in schedule.timetable.values() {
            assert!(classes[0].periods.iter().all(|s| !s.is_free()));
        }
        let week = schedule.teacher_schedule("Mx").unwrap();
        for sessions in week.values() {
            let periods: Vec<usize> = sessions.iter().map(|s| s.period).collect();
            assert_eq!(periods, vec![1, 2, 3, 4, 5]);
        }
    }

    #[test]
    fn test_taken_teacher_leaves_later_class_free() {
        let catalog = SubjectCatalog::new()
            .with_class("A", vec![Offering::new("Math", "Mx", "lecture")])
            .with_class("B", vec![Offering::new("Algebra", "Mx", "lecture")]);
        let schedule = generate(&catalog, &mut StdRng::seed_from_u64(11));

        for classes in schedule.timetable.values() {
            assert!(classes[0].periods.iter().all(|s| !s.is_free()));
            assert!(classes[1].periods.iter().all(Slot::is_free));
        }
        let week = schedule.teacher_schedule("Mx").unwrap();
        assert!(week.values().flatten().all(|s| s.class == "A"));
    }

    #[test]
    fn test_two_offerings_both_reachable() {
        let catalog = SubjectCatalog::new().with_class("A", math_and_science());
        let mut seen = HashSet::new();
        for seed in 0..50 {
            let schedule = generate(&catalog, &mut StdRng::seed_from_u64(seed));
            for classes in schedule.timetable.values() {
                for slot in &classes[0].periods {
                    seen.insert(slot.offering().unwrap().subject.clone());
                }
            }
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_unknown_teacher_has_no_schedule() {
        let schedule = generate(&three_years(), &mut StdRng::seed_from_u64(5));
        assert!(schedule.teacher_schedule("Nobody").is_none());
    }

    #[test]
    fn test_teacher_week_has_all_days() {
        let schedule = generate(&three_years(), &mut StdRng::seed_from_u64(5));
        for teacher in schedule.teachers() {
            let week = schedule.teacher_schedule(teacher).unwrap();
            assert_eq!(week.keys().copied().collect::<Vec<_>>(), DAYS.collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_teacher_sessions_match_grid() {
        let schedule = generate(&three_years(), &mut StdRng::seed_from_u64(9));
        for (day, classes) in &schedule.timetable {
            for class in classes {
                for (idx, slot) in class.periods.iter().enumerate() {
                    if let Some(offering) = slot.offering() {
                        let sessions = &schedule.teacher_schedule(&offering.teacher).unwrap()[day];
                        assert!(sessions.contains(&Session {
                            subject: offering.subject.clone(),
                            class: class.class.clone(),
                            period: idx + 1,
                        }));
                    }
                }
            }
        }
    }

    #[test]
    fn test_same_seed_reproduces() {
        let catalog = three_years();
        let a = generate(&catalog, &mut StdRng::seed_from_u64(42));
        let b = generate(&catalog, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_eventually_differ() {
        let catalog = three_years();
        let first = generate(&catalog, &mut StdRng::seed_from_u64(0));
        let differs = (1..20).any(|seed| generate(&catalog, &mut StdRng::seed_from_u64(seed)) != first);
        assert!(differs);
    }

    #[test]
    fn test_class_weeks_sorted_by_name() {
        let catalog = SubjectCatalog::new()
            .with_class("Zeta", math_and_science())
            .with_class("Alpha", vec![Offering::new("Art", "Ax", "lab")]);
        let schedule = generate(&catalog, &mut StdRng::seed_from_u64(2));

        let weeks = schedule.class_weeks();
        assert_eq!(weeks.iter().map(|w| w.class).collect::<Vec<_>>(), vec!["Alpha", "Zeta"]);
        for week in &weeks {
            assert_eq!(week.days.iter().map(|(d, _)| *d).collect::<Vec<_>>(), DAYS.collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_generate_random_keeps_invariant() {
        let schedule = generate_random(&three_years());
        assert_no_double_booking(&schedule);
    }
}
