use std::collections::BTreeMap;

use crate::{
    config::settings::QuizTiming,
    foundation::error::{ReelError, ReelResult},
};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
/// Named segment kinds of a quiz item.
pub enum PhaseKind {
    /// Question narration; length comes from the audio.
    Speech,
    /// Countdown digits with the optional tick sound.
    Countdown,
    /// Answer shown and narrated.
    AnswerReveal,
    /// Hold before the next item.
    Pause,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// How long a phase lasts.
pub enum PhaseLength {
    /// Known ahead of layout.
    Fixed(f64),
    /// Looked up by phase kind at scheduling time.
    Derived,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// One entry of a declarative phase list.
pub struct Phase {
    pub kind: PhaseKind,
    pub length: PhaseLength,
}

impl Phase {
    pub fn fixed(kind: PhaseKind, secs: f64) -> Self {
        Self {
            kind,
            length: PhaseLength::Fixed(secs),
        }
    }

    pub fn derived(kind: PhaseKind) -> Self {
        Self {
            kind,
            length: PhaseLength::Derived,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Resolved placement of a phase on an item's local time axis.
pub struct Interval {
    pub start: f64,
    pub duration: f64,
}

impl Interval {
    pub fn end(self) -> f64 {
        self.start + self.duration
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Gap-free sequence of resolved phases.
pub struct PhaseSchedule {
    entries: Vec<(PhaseKind, Interval)>,
    total_duration: f64,
}

impl PhaseSchedule {
    pub fn entries(&self) -> &[(PhaseKind, Interval)] {
        &self.entries
    }

    pub fn intervals(&self) -> impl Iterator<Item = Interval> + '_ {
        self.entries.iter().map(|(_, iv)| *iv)
    }

    /// First interval scheduled for `kind`.
    pub fn interval(&self, kind: PhaseKind) -> Option<Interval> {
        self.entries
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, iv)| *iv)
    }

    /// Like [`PhaseSchedule::interval`], failing when the phase was never scheduled.
    pub fn require(&self, kind: PhaseKind) -> ReelResult<Interval> {
        self.interval(kind).ok_or_else(|| {
            ReelError::invalid_duration(format!("phase {kind:?} is missing from the schedule"))
        })
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }
}

/// Walk `phases` in order, placing each one where the previous ended.
pub fn schedule(
    phases: &[Phase],
    derived: &BTreeMap<PhaseKind, f64>,
) -> ReelResult<PhaseSchedule> {
    if phases.is_empty() {
        return Err(ReelError::invalid_duration("phase list is empty"));
    }

    let mut cursor = 0.0;
    let mut entries = Vec::with_capacity(phases.len());
    for phase in phases {
        let duration = match phase.length {
            PhaseLength::Fixed(secs) => secs,
            PhaseLength::Derived => *derived.get(&phase.kind).ok_or_else(|| {
                ReelError::invalid_duration(format!(
                    "no derived duration supplied for phase {:?}",
                    phase.kind
                ))
            })?,
        };
        if !duration.is_finite() || duration <= 0.0 {
            return Err(ReelError::invalid_duration(format!(
                "phase {:?} has non-positive duration {duration}",
                phase.kind
            )));
        }
        entries.push((
            phase.kind,
            Interval {
                start: cursor,
                duration,
            },
        ));
        cursor += duration;
    }

    Ok(PhaseSchedule {
        entries,
        total_duration: cursor,
    })
}

/// Quiz order: speech, countdown, answer reveal, pause.
pub fn quiz_phases(timing: &QuizTiming) -> Vec<Phase> {
    vec![
        Phase::derived(PhaseKind::Speech),
        Phase::fixed(PhaseKind::Countdown, timing.countdown_secs),
        Phase::fixed(PhaseKind::AnswerReveal, timing.reveal_secs),
        Phase::fixed(PhaseKind::Pause, timing.pause_secs),
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/timing/phase.rs"]
mod tests;
