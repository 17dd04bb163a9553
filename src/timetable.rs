use crate::data::{Day, Lesson, Period, TeacherId};
use crate::error::{PlanError, TimetableError};
use itertools::Itertools;
use log::{debug, info};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;

/// Read-only lesson store with typed indices for the planner's lookups.
#[derive(Debug, Clone, Default)]
pub struct Timetable {
    lessons: Vec<Lesson>,
    teachers: Vec<TeacherId>,
    // teacher -> day -> lesson indices ordered by period
    by_teacher_day: HashMap<TeacherId, HashMap<Day, Vec<usize>>>,
    teaching: HashMap<(Day, Period), HashSet<TeacherId>>,
    subjects: HashMap<TeacherId, HashSet<String>>,
}

/// Trims, collapses internal whitespace and title-cases a teacher name,
/// so `"  mary   o'neil "` becomes `"Mary O'Neil"`.
pub fn normalize_teacher_name(name: &str) -> String {
    let collapsed = name.split_whitespace().join(" ");
    let mut normalized = String::with_capacity(collapsed.len());
    let mut in_word = false;
    for ch in collapsed.chars() {
        if ch.is_alphabetic() {
            if in_word {
                normalized.extend(ch.to_lowercase());
            } else {
                normalized.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            normalized.push(ch);
            in_word = false;
        }
    }
    normalized
}

// raw CSV row; every column is optional so gaps surface as MissingField
#[derive(Debug, Deserialize)]
struct LessonRow {
    teacher: Option<String>,
    day: Option<String>,
    period: Option<String>,
    class: Option<String>,
    subject: Option<String>,
}

fn required(value: Option<String>, row: usize, field: &'static str) -> Result<String, TimetableError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(TimetableError::MissingField { row, field }),
    }
}

impl LessonRow {
    fn into_lesson(self, row: usize) -> Result<Lesson, TimetableError> {
        let teacher = required(self.teacher, row, "teacher")?;
        let label = required(self.day, row, "day")?;
        let day = label
            .parse::<Day>()
            .map_err(|_| TimetableError::UnknownDay { row, label: label.clone() })?;
        let raw_period = required(self.period, row, "period")?;
        let period = raw_period
            .parse::<Period>()
            .map_err(|_| TimetableError::InvalidPeriod { row, value: raw_period.clone() })?;
        Ok(Lesson {
            teacher,
            day,
            period,
            class_name: required(self.class, row, "class")?,
            subject: required(self.subject, row, "subject")?,
        })
    }
}

impl Timetable {
    /// Builds the store, normalizing teacher names and rejecting blank
    /// fields or a teacher booked twice in the same period.
    pub fn new(lessons: Vec<Lesson>) -> Result<Self, TimetableError> {
        let mut normalized = Vec::with_capacity(lessons.len());
        for (idx, lesson) in lessons.into_iter().enumerate() {
            let row = idx + 1;
            let teacher = normalize_teacher_name(&lesson.teacher);
            if teacher.is_empty() {
                return Err(TimetableError::MissingField { row, field: "teacher" });
            }
            let class_name = lesson.class_name.trim().to_string();
            if class_name.is_empty() {
                return Err(TimetableError::MissingField { row, field: "class" });
            }
            let subject = lesson.subject.trim().to_string();
            if subject.is_empty() {
                return Err(TimetableError::MissingField { row, field: "subject" });
            }
            normalized.push(Lesson {
                teacher,
                day: lesson.day,
                period: lesson.period,
                class_name,
                subject,
            });
        }

        let mut by_teacher_day: HashMap<TeacherId, HashMap<Day, Vec<usize>>> = HashMap::new();
        let mut teaching: HashMap<(Day, Period), HashSet<TeacherId>> = HashMap::new();
        let mut subjects: HashMap<TeacherId, HashSet<String>> = HashMap::new();

        for (idx, lesson) in normalized.iter().enumerate() {
            let newly_busy = teaching
                .entry((lesson.day, lesson.period))
                .or_default()
                .insert(lesson.teacher.clone());
            if !newly_busy {
                return Err(TimetableError::DuplicateLesson {
                    teacher: lesson.teacher.clone(),
                    day: lesson.day,
                    period: lesson.period,
                });
            }
            by_teacher_day
                .entry(lesson.teacher.clone())
                .or_default()
                .entry(lesson.day)
                .or_default()
                .push(idx);
            subjects
                .entry(lesson.teacher.clone())
                .or_default()
                .insert(lesson.subject.clone());
        }

        for days in by_teacher_day.values_mut() {
            for indices in days.values_mut() {
                indices.sort_by_key(|&i| normalized[i].period);
            }
        }

        let teachers: Vec<TeacherId> = by_teacher_day.keys().cloned().sorted().collect();
        debug!(
            "Indexed {} lessons for {} teachers",
            normalized.len(),
            teachers.len()
        );

        Ok(Self {
            lessons: normalized,
            teachers,
            by_teacher_day,
            teaching,
            subjects,
        })
    }

    /// Loads a timetable from a CSV file with `teacher,day,period,class,subject` columns.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, TimetableError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let timetable = Self::from_csv_reader(file)?;
        info!("Loaded {} timetable rows from {}", timetable.len(), path.display());
        Ok(timetable)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, TimetableError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut lessons = Vec::new();
        for (idx, result) in reader.deserialize::<LessonRow>().enumerate() {
            lessons.push(result?.into_lesson(idx + 1)?);
        }
        Self::new(lessons)
    }

    /// Loads a timetable from a JSON array of lesson objects.
    pub fn from_json_str(json: &str) -> Result<Self, TimetableError> {
        let lessons: Vec<Lesson> = serde_json::from_str(json)?;
        Self::new(lessons)
    }

    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    /// Every teacher in the timetable, sorted by name.
    pub fn teachers(&self) -> &[TeacherId] {
        &self.teachers
    }

    pub fn contains_teacher(&self, teacher: &str) -> bool {
        self.by_teacher_day.contains_key(teacher)
    }

    /// A teacher's lessons on `day`, ordered by period.
    pub fn lessons_for(&self, teacher: &str, day: Day) -> impl Iterator<Item = &Lesson> + '_ {
        self.by_teacher_day
            .get(teacher)
            .and_then(|days| days.get(&day))
            .into_iter()
            .flatten()
            .map(|&i| &self.lessons[i])
    }

    pub fn is_teaching(&self, teacher: &str, day: Day, period: Period) -> bool {
        self.teaching
            .get(&(day, period))
            .is_some_and(|busy| busy.contains(teacher))
    }

    /// Whether the teacher teaches `subject` anywhere in the week.
    pub fn teaches_subject(&self, teacher: &str, subject: &str) -> bool {
        self.subjects
            .get(teacher)
            .is_some_and(|taught| taught.contains(subject))
    }

    /// Number of the teacher's own lessons on `day`.
    pub fn daily_load(&self, teacher: &str, day: Day) -> u32 {
        self.by_teacher_day
            .get(teacher)
            .and_then(|days| days.get(&day))
            .map_or(0, |indices| indices.len() as u32)
    }

    pub fn teacher_view(&self, teacher: &str, day: Option<Day>) -> Result<Vec<&Lesson>, PlanError> {
        if !self.contains_teacher(teacher) {
            return Err(PlanError::UnknownTeacher {
                teacher: teacher.to_string(),
            });
        }
        Ok(self.view(|lesson| lesson.teacher == teacher, day))
    }

    /// Lessons of one class. Labels without a class number match nothing.
    pub fn class_view(&self, class: &ClassLabel, day: Option<Day>) -> Vec<&Lesson> {
        if class.number.is_none() {
            return Vec::new();
        }
        self.view(|lesson| ClassLabel::parse(&lesson.class_name) == *class, day)
    }

    /// Distinct class numbers, ascending.
    pub fn class_numbers(&self) -> Vec<u32> {
        self.lessons
            .iter()
            .filter_map(|lesson| ClassLabel::parse(&lesson.class_name).number)
            .unique()
            .sorted()
            .collect()
    }

    pub fn sections(&self, number: u32) -> Vec<String> {
        self.lessons
            .iter()
            .map(|lesson| ClassLabel::parse(&lesson.class_name))
            .filter(|label| label.number == Some(number))
            .filter_map(|label| label.section)
            .unique()
            .sorted()
            .collect()
    }

    fn view<F>(&self, keep: F, day: Option<Day>) -> Vec<&Lesson>
    where
        F: Fn(&Lesson) -> bool,
    {
        self.lessons
            .iter()
            .filter(|lesson| day.is_none_or(|d| lesson.day == d))
            .filter(|lesson| keep(*lesson))
            .sorted_by_key(|lesson| (lesson.day, lesson.period))
            .collect()
    }
}

/// A class label split into grade number and section, e.g. `"10b"` is 10 / `B`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassLabel {
    pub number: Option<u32>,
    pub section: Option<String>,
}

impl ClassLabel {
    pub fn parse(label: &str) -> Self {
        let number = label
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect::<String>()
            .parse()
            .ok();
        let section: String = label
            .chars()
            .skip_while(|c| !c.is_alphabetic())
            .take_while(|c| c.is_alphabetic())
            .flat_map(char::to_uppercase)
            .collect();
        Self {
            number,
            section: (!section.is_empty()).then_some(section),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson(teacher: &str, day: Day, period: Period, class: &str, subject: &str) -> Lesson {
        Lesson {
            teacher: teacher.into(),
            day,
            period,
            class_name: class.into(),
            subject: subject.into(),
        }
    }

    #[test]
    fn normalizes_teacher_names() {
        assert_eq!(normalize_teacher_name("  mary   o'neil "), "Mary O'Neil");
        assert_eq!(normalize_teacher_name("JOHN SMITH"), "John Smith");
        assert_eq!(normalize_teacher_name("anne-marie\tdu  pont"), "Anne-Marie Du Pont");
        assert_eq!(normalize_teacher_name("   "), "");
    }

    #[test]
    fn indexes_lessons_by_teacher_and_day() {
        let timetable = Timetable::new(vec![
            lesson("bob  ray", Day::Monday, 3, "7A", "Math"),
            lesson("Bob Ray", Day::Monday, 1, "8B", "Physics"),
            lesson("ann lee", Day::Tuesday, 2, "7A", "History"),
        ])
        .unwrap();

        assert_eq!(timetable.teachers(), ["Ann Lee", "Bob Ray"]);
        let periods: Vec<Period> = timetable
            .lessons_for("Bob Ray", Day::Monday)
            .map(|l| l.period)
            .collect();
        assert_eq!(periods, vec![1, 3]);
        assert_eq!(timetable.daily_load("Bob Ray", Day::Monday), 2);
        assert_eq!(timetable.daily_load("Bob Ray", Day::Friday), 0);
        assert!(timetable.is_teaching("Ann Lee", Day::Tuesday, 2));
        assert!(!timetable.is_teaching("Ann Lee", Day::Tuesday, 3));
        assert!(timetable.teaches_subject("Bob Ray", "Physics"));
        assert!(!timetable.teaches_subject("Ann Lee", "Math"));
    }

    #[test]
    fn rejects_double_booked_teacher() {
        let err = Timetable::new(vec![
            lesson("Ann Lee", Day::Monday, 1, "7A", "Math"),
            lesson("ann lee ", Day::Monday, 1, "7B", "Math"),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            TimetableError::DuplicateLesson { ref teacher, day: Day::Monday, period: 1 } if teacher == "Ann Lee"
        ));
    }

    #[test]
    fn loads_csv_and_reports_bad_rows() {
        let csv = "teacher,day,period,class,subject,room\n\
                   ann lee,Monday,1,7A,Math,101\n\
                   bob ray,tuesday,2,8B,Art,102\n";
        let timetable = Timetable::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(timetable.len(), 2);
        assert!(timetable.is_teaching("Bob Ray", Day::Tuesday, 2));

        let missing = "teacher,day,period,class,subject\nann lee,Monday,1,,Math\n";
        let err = Timetable::from_csv_reader(missing.as_bytes()).unwrap_err();
        assert!(matches!(err, TimetableError::MissingField { row: 1, field: "class" }));

        let bad_day = "teacher,day,period,class,subject\nann lee,Sunday,1,7A,Math\n";
        let err = Timetable::from_csv_reader(bad_day.as_bytes()).unwrap_err();
        assert_eq!(err.to_string(), "row 1: unknown day 'Sunday'");

        let bad_period = "teacher,day,period,class,subject\nann lee,Monday,first,7A,Math\n";
        let err = Timetable::from_csv_reader(bad_period.as_bytes()).unwrap_err();
        assert!(matches!(err, TimetableError::InvalidPeriod { row: 1, .. }));
    }

    #[test]
    fn loads_json_lessons() {
        let json = r#"[
            {"teacher": "ann lee", "day": "Monday", "period": 1, "class": "7A", "subject": "Math"}
        ]"#;
        let timetable = Timetable::from_json_str(json).unwrap();
        assert_eq!(timetable.teachers(), ["Ann Lee"]);
    }

    #[test]
    fn parses_class_labels() {
        assert_eq!(
            ClassLabel::parse("10b"),
            ClassLabel { number: Some(10), section: Some("B".into()) }
        );
        assert_eq!(
            ClassLabel::parse("Grade 7"),
            ClassLabel { number: Some(7), section: Some("GRADE".into()) }
        );
        assert_eq!(ClassLabel::parse("--"), ClassLabel { number: None, section: None });
    }

    #[test]
    fn class_and_teacher_views_are_sorted() {
        let timetable = Timetable::new(vec![
            lesson("Ann Lee", Day::Tuesday, 1, "10b", "Math"),
            lesson("Bob Ray", Day::Monday, 4, "10B", "Art"),
            lesson("Ann Lee", Day::Monday, 2, "9A", "Math"),
            lesson("Cy Dee", Day::Monday, 1, "10B", "Music"),
            lesson("Cy Dee", Day::Monday, 2, "Staff", "Meeting"),
            lesson("Dee Fox", Day::Monday, 2, "staff", "Meeting"),
        ])
        .unwrap();

        let label = ClassLabel::parse("10B");
        let view: Vec<(Day, Period)> = timetable
            .class_view(&label, None)
            .iter()
            .map(|l| (l.day, l.period))
            .collect();
        assert_eq!(view, vec![(Day::Monday, 1), (Day::Monday, 4), (Day::Tuesday, 1)]);
        assert_eq!(timetable.class_view(&label, Some(Day::Tuesday)).len(), 1);

        assert_eq!(timetable.class_numbers(), vec![9, 10]);
        assert!(timetable.class_view(&ClassLabel::parse("Staff"), None).is_empty());
        assert!(timetable.class_view(&ClassLabel::parse("--"), None).is_empty());
        assert_eq!(timetable.sections(10), vec!["B".to_string()]);

        let ann = timetable.teacher_view("Ann Lee", None).unwrap();
        assert_eq!(ann[0].class_name, "9A");
        assert!(matches!(
            timetable.teacher_view("Nobody", None),
            Err(PlanError::UnknownTeacher { .. })
        ));
    }
}
