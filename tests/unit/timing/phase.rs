use super::*;
use proptest::prelude::*;

fn speech(secs: f64) -> BTreeMap<PhaseKind, f64> {
    BTreeMap::from([(PhaseKind::Speech, secs)])
}

#[test]
fn quiz_example_lays_out_23_5_seconds() {
    let sched = schedule(&quiz_phases(&QuizTiming::default()), &speech(6.5)).unwrap();

    assert!((sched.total_duration() - 23.5).abs() < 1e-9);
    let countdown = sched.interval(PhaseKind::Countdown).unwrap();
    assert!((countdown.start - 6.5).abs() < 1e-9);
    assert!((countdown.end() - 14.5).abs() < 1e-9);
    let reveal = sched.interval(PhaseKind::AnswerReveal).unwrap();
    assert!((reveal.start - 14.5).abs() < 1e-9);
    let pause = sched.interval(PhaseKind::Pause).unwrap();
    assert!((pause.end() - 23.5).abs() < 1e-9);
}

#[test]
fn missing_derived_duration_is_invalid() {
    let err = schedule(&quiz_phases(&QuizTiming::default()), &BTreeMap::new()).unwrap_err();
    assert!(matches!(err, ReelError::InvalidDuration(_)));
}

#[test]
fn non_positive_durations_are_invalid() {
    let timing = QuizTiming::default();
    assert!(matches!(
        schedule(&quiz_phases(&timing), &speech(0.0)),
        Err(ReelError::InvalidDuration(_))
    ));
    assert!(matches!(
        schedule(&quiz_phases(&timing), &speech(-1.0)),
        Err(ReelError::InvalidDuration(_))
    ));
    let phases = [Phase::fixed(PhaseKind::Pause, 0.0)];
    assert!(schedule(&phases, &BTreeMap::new()).is_err());
}

#[test]
fn empty_phase_list_is_invalid() {
    assert!(schedule(&[], &BTreeMap::new()).is_err());
}

#[test]
fn require_reports_unscheduled_phase() {
    let phases = [Phase::derived(PhaseKind::Speech)];
    let sched = schedule(&phases, &speech(2.0)).unwrap();
    assert!(sched.require(PhaseKind::Speech).is_ok());
    assert!(matches!(
        sched.require(PhaseKind::Countdown),
        Err(ReelError::InvalidDuration(_))
    ));
}

proptest! {
    #[test]
    fn intervals_are_gap_free_and_sum_to_total(
        speech_secs in 0.01f64..120.0,
        fixed in proptest::collection::vec(0.01f64..60.0, 0..8),
    ) {
        let mut phases = vec![Phase::derived(PhaseKind::Speech)];
        phases.extend(fixed.iter().map(|&s| Phase::fixed(PhaseKind::Pause, s)));

        let sched = schedule(&phases, &speech(speech_secs)).unwrap();
        let intervals: Vec<Interval> = sched.intervals().collect();
        prop_assert_eq!(intervals.len(), phases.len());
        prop_assert_eq!(intervals[0].start, 0.0);
        for pair in intervals.windows(2) {
            prop_assert_eq!(pair[0].end(), pair[1].start);
        }

        let sum: f64 = speech_secs + fixed.iter().sum::<f64>();
        let last = intervals[intervals.len() - 1];
        prop_assert!((last.end() - sum).abs() < 1e-6);
        prop_assert_eq!(last.end(), sched.total_duration());
    }
}
