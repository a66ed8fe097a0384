//! Binds session requests to the rooms, days and hours they may use.

use super::chromosome::Placement;
use super::error::{SolverError, SolverResult};
use crate::dataset::Room;
use crate::model::{Calendar, Day, SessionRequest, Timetable, TimetableEntry, GYM_ROOM};
use std::collections::HashMap;

/// A room as the solver sees it
#[derive(Debug, Clone, PartialEq)]
pub struct RoomSlot {
    pub code: String,
    pub capacity: Option<u32>,
    /// The gym hosts any number of groups at once
    pub is_gym: bool,
}

/// Where one session may be placed
#[derive(Debug, Clone, PartialEq)]
pub struct Candidates {
    pub days: Vec<Day>,
    pub hours: Vec<u8>,
    pub rooms: Vec<usize>,
}

/// Immutable scheduling problem shared by every individual
#[derive(Debug, Clone)]
pub struct Problem {
    pub trimester: u8,
    pub sessions: Vec<SessionRequest>,
    pub rooms: Vec<RoomSlot>,
    pub candidates: Vec<Candidates>,
    /// Dense group id per session
    pub group_ids: Vec<usize>,
    /// Dense (group, course) id per session
    pub course_ids: Vec<usize>,
    pub group_count: usize,
    pub course_count: usize,
}

impl Problem {
    pub fn new(
        trimester: u8,
        sessions: Vec<SessionRequest>,
        rooms: &[Room],
        calendar: &Calendar,
    ) -> SolverResult<Self> {
        if sessions.is_empty() {
            return Err(SolverError::NoSessions(trimester));
        }

        let mut slots: Vec<RoomSlot> = rooms
            .iter()
            .map(|r| RoomSlot {
                code: r.code.clone(),
                capacity: r.capacity,
                is_gym: r.code.trim().eq_ignore_ascii_case(GYM_ROOM),
            })
            .collect();

        let gym = match slots.iter().position(|r| r.is_gym) {
            Some(index) => index,
            None => {
                slots.push(RoomSlot {
                    code: GYM_ROOM.to_string(),
                    capacity: None,
                    is_gym: true,
                });
                slots.len() - 1
            }
        };

        let teaching_rooms: Vec<usize> = (0..slots.len()).filter(|i| !slots[*i].is_gym).collect();
        let needs_rooms = sessions.iter().any(|s| !s.is_physical_education());
        if needs_rooms && teaching_rooms.is_empty() {
            return Err(SolverError::NoRooms);
        }

        let all_days = calendar.days().to_vec();
        let all_hours = calendar.hours();

        let mut group_index: HashMap<&str, usize> = HashMap::new();
        let mut course_index: HashMap<(&str, &str), usize> = HashMap::new();
        let mut group_ids = Vec::with_capacity(sessions.len());
        let mut course_ids = Vec::with_capacity(sessions.len());
        let mut candidates = Vec::with_capacity(sessions.len());

        for session in &sessions {
            let next_group = group_index.len();
            group_ids.push(*group_index.entry(session.group.as_str()).or_insert(next_group));
            let next_course = course_index.len();
            course_ids.push(
                *course_index
                    .entry((session.group.as_str(), session.course_code.as_str()))
                    .or_insert(next_course),
            );

            let mut days = calendar.allowed_days(session.study_year);
            if days.is_empty() {
                days = all_days.clone();
            }
            let mut hours = calendar.allowed_hours(session.study_year);
            if hours.is_empty() {
                hours = all_hours.clone();
            }

            let rooms = if session.is_physical_education() {
                vec![gym]
            } else {
                let fitting: Vec<usize> = teaching_rooms
                    .iter()
                    .copied()
                    .filter(|i| slots[*i].capacity.map_or(true, |c| c >= session.headcount))
                    .collect();
                if fitting.is_empty() {
                    teaching_rooms.clone()
                } else {
                    fitting
                }
            };

            candidates.push(Candidates { days, hours, rooms });
        }

        let group_count = group_index.len();
        let course_count = course_index.len();

        Ok(Self {
            trimester,
            sessions,
            rooms: slots,
            candidates,
            group_ids,
            course_ids,
            group_count,
            course_count,
        })
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Turn a solved chromosome into timetable rows
    pub fn to_timetable(&self, genes: &[Placement]) -> Timetable {
        let entries = self
            .sessions
            .iter()
            .zip(genes)
            .map(|(session, placement)| {
                let room = if session.is_physical_education() {
                    GYM_ROOM.to_string()
                } else {
                    self.rooms[placement.room].code.clone()
                };
                TimetableEntry {
                    group: session.group.clone(),
                    course: session.course_name.clone(),
                    kind: session.kind,
                    day: placement.day,
                    time: placement.hour,
                    room,
                }
            })
            .collect();

        Timetable::new(self.trimester, entries)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::model::SessionKind;

    #[test]
    fn test_adds_virtual_gym() {
        let problem = Problem::new(
            1,
            vec![session("IT-2401", "Physical Education", SessionKind::Practice, 1)],
            &rooms(&[("101", Some(30))]),
            &Calendar::default(),
        )
        .unwrap();

        assert_eq!(problem.rooms.len(), 2);
        assert!(problem.rooms[1].is_gym);
        assert_eq!(problem.candidates[0].rooms, vec![1]);
    }

    #[test]
    fn test_candidates_follow_year_and_capacity() {
        let problem = Problem::new(
            1,
            vec![
                session("IT-2401", "Programming", SessionKind::Lecture, 1),
                session("IT-2201", "Networks", SessionKind::Lab, 3),
            ],
            &rooms(&[("small", Some(10)), ("big", Some(40)), ("gym", None)]),
            &Calendar::default(),
        )
        .unwrap();

        assert_eq!(problem.candidates[0].hours.last(), Some(&13));
        assert_eq!(problem.candidates[0].rooms, vec![1]);
        assert!(!problem.candidates[1].days.contains(&Day::Thu));
        assert_eq!(problem.group_count, 2);
        assert_eq!(problem.course_count, 2);
    }

    #[test]
    fn test_rejects_empty_inputs() {
        let err = Problem::new(2, Vec::new(), &[], &Calendar::default()).unwrap_err();
        assert_eq!(err, SolverError::NoSessions(2));

        let err = Problem::new(
            1,
            vec![session("IT-2401", "Programming", SessionKind::Lecture, 1)],
            &rooms(&[("Gym", None)]),
            &Calendar::default(),
        )
        .unwrap_err();
        assert_eq!(err, SolverError::NoRooms);
    }
}
