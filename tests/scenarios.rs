//! End-to-end planning scenarios on small hand-built timetables.

use substitute_planner::solver::NO_SUBSTITUTE_REASON;
use substitute_planner::{
    AssignmentState, Day, Lesson, PlanningRules, ReplacementRequest, Timetable, assign,
    extract_slots, generate_plan,
};

fn lesson(teacher: &str, day: Day, period: u32, class: &str, subject: &str) -> Lesson {
    Lesson {
        teacher: teacher.into(),
        day,
        period,
        class_name: class.into(),
        subject: subject.into(),
    }
}

fn request(absent: &[&str], day: Day) -> ReplacementRequest {
    ReplacementRequest::new(absent.iter().copied(), day)
}

#[test]
fn same_subject_colleague_covers_both_lessons() {
    let timetable = Timetable::new(vec![
        lesson("Ann Lee", Day::Monday, 1, "7A", "Math"),
        lesson("Ann Lee", Day::Monday, 3, "7B", "Math"),
        lesson("Bob Ray", Day::Tuesday, 1, "8A", "Math"),
        lesson("Cy Dee", Day::Wednesday, 2, "9A", "Art"),
    ])
    .unwrap();

    let plan = generate_plan(&timetable, &request(&["Ann Lee"], Day::Monday), &PlanningRules::default())
        .unwrap();

    assert_eq!(plan.assignments.len(), 2);
    for record in &plan.assignments {
        assert_eq!(record.substitute_teacher.as_deref(), Some("Bob Ray"));
        assert!(record.is_same_subject);
        assert!(record.score.unwrap() >= 100);
        assert_eq!(record.reason, "Same subject, daily load 0");
    }
    assert_eq!(plan.summary.filled, 2);
    assert_eq!(plan.summary.unfilled, 0);
}

#[test]
fn simultaneous_absences_with_one_free_teacher() {
    let timetable = Timetable::new(vec![
        lesson("Ann Lee", Day::Tuesday, 2, "7A", "Math"),
        lesson("Bob Ray", Day::Tuesday, 2, "8A", "Physics"),
        lesson("Cy Dee", Day::Monday, 1, "9A", "Art"),
        lesson("Dee Fox", Day::Tuesday, 2, "10B", "History"),
    ])
    .unwrap();

    let plan = generate_plan(
        &timetable,
        &request(&["Ann Lee", "Bob Ray"], Day::Tuesday),
        &PlanningRules::default(),
    )
    .unwrap();

    assert_eq!(plan.assignments.len(), 2);
    let first = &plan.assignments[0];
    assert_eq!(first.absent_teacher, "Ann Lee");
    assert_eq!(first.substitute_teacher.as_deref(), Some("Cy Dee"));

    let second = &plan.assignments[1];
    assert_eq!(second.absent_teacher, "Bob Ray");
    assert_eq!(second.substitute_teacher, None);
    assert_eq!(second.reason, NO_SUBSTITUTE_REASON);
    assert_eq!(second.score, None);
    assert_eq!(second.daily_load, None);
    assert_eq!(plan.summary.unfilled, 1);
}

#[test]
fn teacher_at_daily_cap_is_passed_over() {
    let timetable = Timetable::new(vec![
        lesson("Ann Lee", Day::Monday, 1, "7A", "Math"),
        lesson("Ann Lee", Day::Monday, 2, "7B", "Math"),
        lesson("Ann Lee", Day::Monday, 3, "7C", "Math"),
        lesson("Bob Ray", Day::Friday, 1, "8A", "Math"),
        lesson("Cy Dee", Day::Friday, 2, "9A", "Art"),
    ])
    .unwrap();

    let plan = generate_plan(&timetable, &request(&["Ann Lee"], Day::Monday), &PlanningRules::default())
        .unwrap();

    let covering: Vec<Option<&str>> = plan
        .assignments
        .iter()
        .map(|a| a.substitute_teacher.as_deref())
        .collect();
    assert_eq!(covering, vec![Some("Bob Ray"), Some("Bob Ray"), Some("Cy Dee")]);
    assert!(!plan.assignments[2].is_same_subject);
    assert_eq!(plan.assignments[2].score, Some(10));
}

#[test]
fn ties_go_to_earlier_teacher_in_scan_order() {
    let timetable = Timetable::new(vec![
        lesson("Ann Lee", Day::Monday, 1, "7A", "Math"),
        lesson("Cy Dee", Day::Thursday, 1, "9A", "Math"),
        lesson("Bob Ray", Day::Thursday, 2, "8A", "Math"),
    ])
    .unwrap();
    let rules = PlanningRules::default();
    let req = request(&["Ann Lee"], Day::Monday);

    let first = generate_plan(&timetable, &req, &rules).unwrap();
    let second = generate_plan(&timetable, &req, &rules).unwrap();
    assert_eq!(first.assignments[0].substitute_teacher.as_deref(), Some("Bob Ray"));
    assert_eq!(first.assignments[0].score, Some(110));
    assert_eq!(first.assignments, second.assignments);

    // the scan order decides, not the name
    let absent = req.absent_teachers.clone();
    let slots = extract_slots(&timetable, &absent, Day::Monday);
    let reversed: Vec<String> = timetable.teachers().iter().rev().cloned().collect();
    let records = assign(
        &timetable,
        &slots,
        Day::Monday,
        &absent,
        &reversed,
        &rules,
        &mut AssignmentState::new(),
    );
    assert_eq!(records[0].substitute_teacher.as_deref(), Some("Cy Dee"));
}

#[test]
fn subject_match_outweighs_lighter_load() {
    let mut lessons = vec![lesson("Ann Lee", Day::Monday, 1, "7A", "Math")];
    lessons.extend((2..=8).map(|p| lesson("Bob Ray", Day::Monday, p, "8A", "Math")));
    lessons.push(lesson("Cy Dee", Day::Tuesday, 1, "9A", "Art"));
    let timetable = Timetable::new(lessons).unwrap();

    let plan = generate_plan(&timetable, &request(&["Ann Lee"], Day::Monday), &PlanningRules::default())
        .unwrap();
    let record = &plan.assignments[0];
    assert_eq!(record.substitute_teacher.as_deref(), Some("Bob Ray"));
    assert_eq!(record.daily_load, Some(7));
    assert_eq!(record.score, Some(103));
}

#[test]
fn absent_teachers_never_cover_each_other() {
    let timetable = Timetable::new(vec![
        lesson("Ann Lee", Day::Monday, 1, "7A", "Math"),
        lesson("Bob Ray", Day::Monday, 2, "8A", "Math"),
    ])
    .unwrap();

    let plan = generate_plan(
        &timetable,
        &request(&["Ann Lee", "Bob Ray"], Day::Monday),
        &PlanningRules::default(),
    )
    .unwrap();
    assert!(plan.assignments.iter().all(|a| a.substitute_teacher.is_none()));
}
