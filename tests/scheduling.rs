use std::sync::Arc;

use u_timetable::constraints::algorithms::bookings_overlap;
use u_timetable::constraints::{
    Actor, ActivityPreferredRooms, ConstraintKind, MaxHoursDaily, NoDoubleBooking, NotAvailable,
    RoomCapacity, RoomNotAvailable,
};
use u_timetable::export::TimetableExporter;
use u_timetable::models::{
    Activity, Assignment, Exclusivity, Period, Room, StudentSet, Teacher, TimeSpan,
};
use u_timetable::scheduler::{
    derive_seeds, Scheduler, SchedulerConfig, ScopeDiscovery, PERFECT_SCORE,
};
use u_timetable::validation::validate_input;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn school(config: SchedulerConfig) -> Scheduler {
    let mut s = Scheduler::new(config).unwrap();
    s.add_room(Room::new("R1", 30));
    s.add_room(Room::new("R2", 30));
    s.add_room(Room::new("LAB", 16));
    for i in 0..12 {
        let act = Activity::new(format!("A{i:02}"), if i % 3 == 0 { 90 } else { 60 })
            .with_teacher(format!("T{}", i % 3))
            .with_student_group(format!("G{}", i % 2));
        s.add_activity(act);
    }
    s.add_time_constraint(NoDoubleBooking::new(100).unwrap());
    s
}

fn assert_conflict_free(asg: &Assignment, global: bool) {
    let placed = asg.all_placed();
    for (i, a) in placed.iter().enumerate() {
        for b in &placed[i + 1..] {
            if global || a.room == b.room {
                assert!(
                    !bookings_overlap(a, b),
                    "{} and {} overlap",
                    a.activity.id,
                    b.activity.id
                );
            }
        }
    }
}

#[test]
fn test_same_teacher_never_overlaps() {
    init_logging();
    let mut s = Scheduler::new(SchedulerConfig::default().with_max_iterations(500)).unwrap();
    s.add_room(Room::new("R1", 30));
    s.add_room(Room::new("R2", 30));
    s.add_activity(Activity::new("A1", 60).with_teacher("T1"));
    s.add_activity(Activity::new("A2", 60).with_teacher("T1"));
    s.add_time_constraint(NoDoubleBooking::new(100).unwrap());

    let result = s.generate_schedule();
    let asg = &result.assignment;
    assert!(result.is_complete());
    let a1 = asg.placement("A1").unwrap().booking();
    let a2 = asg.placement("A2").unwrap().booking();
    assert!(!bookings_overlap(&a1, &a2));
    assert_eq!(result.score, PERFECT_SCORE);
}

#[test]
fn test_preferred_start_time_is_used() {
    init_logging();
    let mut s = school(SchedulerConfig::default().with_max_iterations(0));
    s.add_activity(
        Activity::new("FIXED", 120)
            .with_teacher("T9")
            .with_preferred_start_time(Period::new(0, 9, 0)),
    );
    let result = s.generate_schedule();
    assert_eq!(
        result.assignment.period_of("FIXED"),
        Some(Period::new(0, 9, 0))
    );
}

#[test]
fn test_unsatisfiable_hard_constraint_leaves_activity_unplaced() {
    init_logging();
    let config = SchedulerConfig::default().with_max_iterations(200);
    let whole_week: Vec<TimeSpan> = (0..config.days)
        .map(|d| TimeSpan::new(Period::new(d, 0, 0), 24 * 60))
        .collect();

    let mut s = school(config);
    s.add_activity(Activity::new("BLOCKED", 60).with_teacher("AWAY"));
    s.add_time_constraint(
        NotAvailable::new(Actor::Teacher("AWAY".into()), whole_week, 100).unwrap(),
    );

    let result = s.generate_schedule();
    assert!(!result.assignment.is_placed("BLOCKED"));
    assert_eq!(result.unplaced, vec!["BLOCKED".to_string()]);

    let report = s.analyze_violations(&result.assignment);
    assert_eq!(report.unplaced, vec!["BLOCKED".to_string()]);
    assert_eq!(report.count(ConstraintKind::TeacherNotAvailable), 0);
}

#[test]
fn test_lazy_scope_cannot_block_first_placement() {
    init_logging();
    let config = SchedulerConfig::default()
        .with_max_iterations(0)
        .with_scope_discovery(ScopeDiscovery::Lazy);
    let whole_week: Vec<TimeSpan> = (0..config.days)
        .map(|d| TimeSpan::new(Period::new(d, 0, 0), 24 * 60))
        .collect();

    let mut s = Scheduler::new(config).unwrap();
    s.add_room(Room::new("R1", 30));
    s.add_activity(Activity::new("BLOCKED", 60).with_teacher("AWAY"));
    s.add_time_constraint(
        NotAvailable::new(Actor::Teacher("AWAY".into()), whole_week, 100).unwrap(),
    );

    let result = s.generate_schedule();
    assert!(result.assignment.is_placed("BLOCKED"));
    let report = s.analyze_violations(&result.assignment);
    assert_eq!(report.count(ConstraintKind::TeacherNotAvailable), 1);
}

#[test]
fn test_same_seed_is_reproducible() {
    init_logging();
    let config = SchedulerConfig::default().with_max_iterations(400).with_seed(2024);
    let build = || {
        let mut s = school(config.clone());
        for i in 0..12 {
            s.add_space_constraint(
                ActivityPreferredRooms::new(format!("A{i:02}"), vec!["LAB".into()], 30).unwrap(),
            );
        }
        s
    };
    let a = build().generate_schedule();
    let b = build().generate_schedule();
    assert_eq!(a.assignment, b.assignment);
    assert_eq!(a.score.to_bits(), b.score.to_bits());
    assert_eq!(a.accepted, b.accepted);
}

#[test]
fn test_best_score_not_below_initial() {
    init_logging();
    let mut s = school(SchedulerConfig::default().with_max_iterations(600).with_seed(9));
    let sets = vec![StudentSet::new("G0", 20), StudentSet::new("G1", 12)];
    let rooms: Vec<Room> = s.rooms().to_vec();
    s.add_space_constraint(RoomCapacity::new(&rooms, &sets, 80).unwrap());
    for t in 0..3 {
        s.add_time_constraint(
            MaxHoursDaily::new(Actor::Teacher(format!("T{t}")), 2, 60).unwrap(),
        );
    }

    let result = s.generate_schedule();
    assert!(result.score >= result.initial_score);
    assert!(result.score <= PERFECT_SCORE);
}

#[test]
fn test_conflict_free_per_room() {
    init_logging();
    let result = school(SchedulerConfig::default().with_max_iterations(300)).generate_schedule();
    assert!(result.is_complete());
    assert_conflict_free(&result.assignment, false);
}

#[test]
fn test_conflict_free_global() {
    init_logging();
    let config = SchedulerConfig::default()
        .with_max_iterations(300)
        .with_exclusivity(Exclusivity::Global);
    let result = school(config).generate_schedule();
    // 12 activities, at most 90 minutes each, 40 one-hour slots
    assert!(result.is_complete());
    assert_conflict_free(&result.assignment, true);
}

#[test]
fn test_can_place_leaves_assignment_untouched() {
    let mut s = school(SchedulerConfig::default().with_max_iterations(0));
    let result = s.generate_schedule();
    let mut asg = result.assignment.clone();
    let extra = Arc::new(Activity::new("EXTRA", 60).with_teacher("T0"));

    let grid = s.grid().to_vec();
    for period in grid {
        for room in ["R1", "R2", "LAB"] {
            s.can_place(&extra, period, room, &mut asg);
        }
    }
    assert_eq!(asg, result.assignment);
}

#[test]
fn test_room_blackout_is_respected() {
    init_logging();
    let blocked = Room::new("R1", 30).with_unavailable(TimeSpan::new(Period::new(0, 8, 0), 8 * 60));
    let mut s = Scheduler::new(SchedulerConfig::default().with_days(1).with_max_iterations(100))
        .unwrap();
    s.add_space_constraint(RoomNotAvailable::for_room(&blocked, 100).unwrap());
    s.add_room(blocked);
    s.add_room(Room::new("R2", 30));
    for i in 0..4 {
        s.add_activity(Activity::new(format!("A{i}"), 60));
    }

    let result = s.generate_schedule();
    assert!(result.is_complete());
    assert!(result.assignment.activities_in_room("R1").is_empty());
}

#[test]
fn test_best_of_parallel_runs() {
    init_logging();
    let s = school(SchedulerConfig::default().with_max_iterations(200));
    let seeds = derive_seeds(42, 4);
    let best = s.generate_best_of(&seeds).unwrap();
    assert!(seeds.contains(&best.seed));
    assert_conflict_free(&best.assignment, false);
}

#[test]
fn test_end_to_end_validate_schedule_export() {
    init_logging();
    let rooms = vec![Room::new("R1", 30).with_name("Room 1"), Room::new("R2", 30)];
    let teachers = vec![Teacher::new("T1").with_name("Ada"), Teacher::new("T2")];
    let sets = vec![StudentSet::new("G1", 25)];
    let activities = vec![
        Activity::new("A1", 60).with_teacher("T1").with_student_group("G1"),
        Activity::new("A2", 60).with_teacher("T2").with_student_group("G1"),
        Activity::new("A3", 60).with_teacher("T1"),
    ];
    assert!(validate_input(&activities, &rooms, &[], &teachers, &sets).is_ok());

    let mut s = Scheduler::new(SchedulerConfig::default().with_max_iterations(100)).unwrap();
    for r in &rooms {
        s.add_room(r.clone());
    }
    for a in &activities {
        s.add_activity(a.clone());
    }
    s.add_time_constraint(NoDoubleBooking::new(100).unwrap());
    s.add_space_constraint(RoomCapacity::new(&rooms, &sets, 100).unwrap());

    let result = s.generate_schedule();
    assert!(result.is_complete());
    assert!(s.analyze_violations(&result.assignment).is_clean());

    let export = TimetableExporter::new(&rooms, &teachers, &sets, &[]).export(&result.assignment);
    assert_eq!(export.teachers["T1"].len(), 2);
    assert_eq!(export.student_groups["G1"].len(), 2);
    assert_eq!(export.activity_count(), 3);
    assert!(export.teachers["T1"][0].teachers.contains(&"Ada".to_string()));
}
