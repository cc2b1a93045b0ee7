use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// Type aliases for clarity
pub type ClassName = String;
pub type TeacherName = String;
pub type Day = u8;
pub type Period = usize;

/// Days of the teaching week, Monday through Saturday.
pub const DAYS: std::ops::RangeInclusive<Day> = 1..=6;
pub const PERIODS_PER_DAY: Period = 5;

/// A subject a class can take, who teaches it and what kind of session it is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Offering {
    pub subject: String,
    pub teacher: TeacherName,
    #[serde(rename = "type")]
    pub session_type: String,
}

impl Offering {
    pub fn new(
        subject: impl Into<String>,
        teacher: impl Into<String>,
        session_type: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            teacher: teacher.into(),
            session_type: session_type.into(),
        }
    }
}

/// A class and the offerings it may be assigned, in entry order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClassSubjects {
    pub name: ClassName,
    #[serde(default)]
    pub offerings: Vec<Offering>,
}

/// Ordered collection of classes. Scheduling walks classes in insertion order,
/// so earlier classes get first pick of teachers in every period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SubjectCatalog {
    classes: Vec<ClassSubjects>,
}

impl SubjectCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a class. Re-inserting an existing name replaces its offerings
    /// but keeps the class at its original position.
    pub fn insert(&mut self, name: impl Into<ClassName>, offerings: Vec<Offering>) {
        let name = name.into();
        match self.classes.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.offerings = offerings,
            None => self.classes.push(ClassSubjects { name, offerings }),
        }
    }

    pub fn with_class(mut self, name: impl Into<ClassName>, offerings: Vec<Offering>) -> Self {
        self.insert(name, offerings);
        self
    }

    pub fn classes(&self) -> &[ClassSubjects] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl FromIterator<ClassSubjects> for SubjectCatalog {
    fn from_iter<I: IntoIterator<Item = ClassSubjects>>(iter: I) -> Self {
        let mut catalog = SubjectCatalog::new();
        for class in iter {
            catalog.insert(class.name, class.offerings);
        }
        catalog
    }
}

impl<'de> Deserialize<'de> for SubjectCatalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let classes = Vec::<ClassSubjects>::deserialize(deserializer)?;
        Ok(classes.into_iter().collect())
    }
}

/// One (day, class, period) cell of the timetable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Slot {
    Assigned(Offering),
    /// No offering could be placed; serialized as `null`.
    Free,
}

impl Slot {
    pub fn offering(&self) -> Option<&Offering> {
        match self {
            Slot::Assigned(offering) => Some(offering),
            Slot::Free => None,
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self, Slot::Free)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Assigned(o) => write!(f, "{} ({}) - {}", o.subject, o.teacher, o.session_type),
            Slot::Free => write!(f, "- (-) - -"),
        }
    }
}

/// A class's periods for one day; always `PERIODS_PER_DAY` long.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClassDay {
    pub class: ClassName,
    pub periods: Vec<Slot>,
}

/// A single session in a teacher's day.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Session {
    pub subject: String,
    pub class: ClassName,
    /// 1-indexed.
    pub period: Period,
}

/// Day -> sessions, with every day of the week present.
pub type TeacherWeek = BTreeMap<Day, Vec<Session>>;

/// A class's whole week, as returned by the grid query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassWeek<'a> {
    pub class: &'a str,
    pub days: Vec<(Day, &'a [Slot])>,
}

/// The result of one generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSchedule {
    /// Day -> classes in catalog order.
    pub timetable: BTreeMap<Day, Vec<ClassDay>>,
    pub teacher_schedules: BTreeMap<TeacherName, TeacherWeek>,
}
