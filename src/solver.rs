use crate::config::PlanningRules;
use crate::data::{
    AssignmentRecord, Candidate, Day, Period, PlanSummary, ReplacementPlan, ReplacementRequest,
    RequiredSlot, TeacherId,
};
use crate::error::PlanError;
use crate::timetable::{Timetable, normalize_teacher_name};
use itertools::Itertools;
use log::{debug, info, trace};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Instant;

pub const NO_SUBSTITUTE_REASON: &str = "No suitable substitute available";

/// Running substitution bookkeeping for one planning run.
#[derive(Debug, Clone, Default)]
pub struct AssignmentState {
    substitutions: HashMap<Day, HashMap<TeacherId, u32>>,
    busy: HashMap<(Day, Period), HashSet<TeacherId>>,
}

impl AssignmentState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn substitutions_today(&self, teacher: &str, day: Day) -> u32 {
        self.substitutions
            .get(&day)
            .and_then(|counts| counts.get(teacher))
            .copied()
            .unwrap_or(0)
    }

    pub fn is_substituting(&self, teacher: &str, day: Day, period: Period) -> bool {
        self.busy
            .get(&(day, period))
            .is_some_and(|placed| placed.contains(teacher))
    }

    fn record(&mut self, teacher: &str, day: Day, period: Period) {
        *self
            .substitutions
            .entry(day)
            .or_default()
            .entry(teacher.to_string())
            .or_default() += 1;
        self.busy
            .entry((day, period))
            .or_default()
            .insert(teacher.to_string());
    }
}

/// Why a teacher can't cover a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligible {
    Absent,
    Teaching,
    AlreadySubstituting,
    DailyCapReached,
}

impl fmt::Display for Ineligible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Ineligible::Absent => "absent",
            Ineligible::Teaching => "teaching own lesson",
            Ineligible::AlreadySubstituting => "already covering this period",
            Ineligible::DailyCapReached => "daily substitution cap reached",
        };
        f.write_str(text)
    }
}

/// Collects the lessons of every absent teacher on `day`, ordered by
/// period. Teachers sharing a period keep the order they were supplied in.
pub fn extract_slots(
    timetable: &Timetable,
    absent_teachers: &[TeacherId],
    day: Day,
) -> Vec<RequiredSlot> {
    let mut slots: Vec<RequiredSlot> = absent_teachers
        .iter()
        .flat_map(|teacher| {
            timetable
                .lessons_for(teacher, day)
                .map(move |lesson| RequiredSlot {
                    absent_teacher: teacher.clone(),
                    period: lesson.period,
                    class_name: lesson.class_name.clone(),
                    subject: lesson.subject.clone(),
                })
        })
        .collect();
    // stable: equal periods stay in supply order
    slots.sort_by_key(|slot| slot.period);
    slots
}

// filters run in this order and stop at the first failure
fn check_eligibility(
    timetable: &Timetable,
    state: &AssignmentState,
    teacher: &str,
    absent: &HashSet<&str>,
    day: Day,
    period: Period,
    rules: &PlanningRules,
) -> Result<(), Ineligible> {
    if absent.contains(teacher) {
        return Err(Ineligible::Absent);
    }
    if timetable.is_teaching(teacher, day, period) {
        return Err(Ineligible::Teaching);
    }
    if state.is_substituting(teacher, day, period) {
        return Err(Ineligible::AlreadySubstituting);
    }
    if state.substitutions_today(teacher, day) >= rules.max_substitutions_per_day {
        return Err(Ineligible::DailyCapReached);
    }
    Ok(())
}

/// Scores an eligible teacher for a slot: the subject bonus if they teach
/// the slot's subject anywhere, plus the load baseline minus their own
/// lessons that day.
pub fn score_candidate(
    timetable: &Timetable,
    state: &AssignmentState,
    teacher: &str,
    slot: &RequiredSlot,
    day: Day,
    rules: &PlanningRules,
) -> Candidate {
    let is_same_subject = timetable.teaches_subject(teacher, &slot.subject);
    let daily_load = timetable.daily_load(teacher, day);
    let load = i32::try_from(daily_load).unwrap_or(i32::MAX);
    let bonus = if is_same_subject { rules.same_subject_bonus } else { 0 };
    let score = bonus.saturating_add(rules.load_baseline.saturating_sub(load));

    let reason = format!(
        "{}, daily load {}",
        if is_same_subject { "Same subject" } else { "Different subject" },
        daily_load
    );

    Candidate {
        teacher: teacher.to_string(),
        score,
        is_same_subject,
        daily_load,
        substitutions_today: state.substitutions_today(teacher, day),
        reason,
    }
}

/// Greedily covers each slot in order with the best-scoring eligible
/// teacher, updating `state` after every decision. Ties go to the teacher
/// earliest in `all_teachers`.
pub fn assign(
    timetable: &Timetable,
    slots: &[RequiredSlot],
    day: Day,
    absent_teachers: &[TeacherId],
    all_teachers: &[TeacherId],
    rules: &PlanningRules,
    state: &mut AssignmentState,
) -> Vec<AssignmentRecord> {
    let absent: HashSet<&str> = absent_teachers.iter().map(String::as_str).collect();
    let mut records = Vec::with_capacity(slots.len());

    for slot in slots {
        let current = &*state;
        let candidates: Vec<Candidate> = all_teachers
            .iter()
            .filter(|teacher| {
                match check_eligibility(timetable, current, teacher, &absent, day, slot.period, rules) {
                    Ok(()) => true,
                    Err(why) => {
                        trace!("Period {}: skipping {} ({})", slot.period, teacher, why);
                        false
                    }
                }
            })
            .map(|teacher| score_candidate(timetable, current, teacher, slot, day, rules))
            .collect();

        // min_by_key keeps the first of equal keys
        let best = candidates.into_iter().min_by_key(|c| Reverse(c.score));

        let record = match best {
            Some(best) => {
                state.record(&best.teacher, day, slot.period);
                debug!(
                    "Period {} ({}): {} covers for {} with score {}",
                    slot.period, slot.class_name, best.teacher, slot.absent_teacher, best.score
                );
                AssignmentRecord {
                    absent_teacher: slot.absent_teacher.clone(),
                    day,
                    period: slot.period,
                    class_name: slot.class_name.clone(),
                    subject: slot.subject.clone(),
                    substitute_teacher: Some(best.teacher),
                    is_same_subject: best.is_same_subject,
                    daily_load: Some(best.daily_load),
                    substitutions_today: Some(best.substitutions_today),
                    score: Some(best.score),
                    reason: best.reason,
                }
            }
            None => {
                debug!(
                    "Period {} ({}): no substitute for {}",
                    slot.period, slot.class_name, slot.absent_teacher
                );
                AssignmentRecord {
                    absent_teacher: slot.absent_teacher.clone(),
                    day,
                    period: slot.period,
                    class_name: slot.class_name.clone(),
                    subject: slot.subject.clone(),
                    substitute_teacher: None,
                    is_same_subject: false,
                    daily_load: None,
                    substitutions_today: None,
                    score: None,
                    reason: NO_SUBSTITUTE_REASON.to_string(),
                }
            }
        };
        records.push(record);
    }

    records
}

/// Validates the request and builds a full replacement plan for the day.
pub fn generate_plan(
    timetable: &Timetable,
    request: &ReplacementRequest,
    rules: &PlanningRules,
) -> Result<ReplacementPlan, PlanError> {
    let start_time = Instant::now();

    let day: Day = request.day.parse()?;

    // first mention wins; duplicates would otherwise double the slots
    let absent_teachers: Vec<TeacherId> = request
        .absent_teachers
        .iter()
        .map(|name| normalize_teacher_name(name))
        .unique()
        .collect();
    if absent_teachers.is_empty() {
        return Err(PlanError::NoAbsentTeachers);
    }
    if let Some(unknown) = absent_teachers
        .iter()
        .find(|teacher| !timetable.contains_teacher(teacher))
    {
        return Err(PlanError::UnknownAbsentTeacher {
            teacher: unknown.clone(),
            day,
        });
    }

    let slots = extract_slots(timetable, &absent_teachers, day);
    info!(
        "Planning cover for {} absent teacher(s) on {}: {} slot(s), {} teacher(s) on staff",
        absent_teachers.len(),
        day,
        slots.len(),
        timetable.teachers().len()
    );

    let mut state = AssignmentState::new();
    let assignments = assign(
        timetable,
        &slots,
        day,
        &absent_teachers,
        timetable.teachers(),
        rules,
        &mut state,
    );

    let filled = assignments.iter().filter(|a| a.is_filled()).count();
    let summary = PlanSummary {
        required_slots: assignments.len(),
        filled,
        unfilled: assignments.len() - filled,
    };
    info!("Plan ready in {:.2?}: {}", start_time.elapsed(), summary);

    Ok(ReplacementPlan {
        day,
        absent_teachers,
        assignments,
        summary,
    })
}
