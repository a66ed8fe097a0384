use super::ExportResult;
use crate::model::format_hour;
use crate::model::Timetable;

/// Flat CSV: group, course, type, day, time, room
pub fn timetable_csv(timetable: &Timetable) -> ExportResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["group", "course", "type", "day", "time", "room"])?;

    for entries in timetable.by_group().into_values() {
        for entry in entries {
            writer.write_record([
                entry.group.as_str(),
                entry.course.as_str(),
                entry.kind.as_str(),
                entry.day.as_str(),
                format_hour(entry.time).as_str(),
                entry.room.as_str(),
            ])?;
        }
    }

    writer.into_inner().map_err(|e| e.into_error().into())
}

/// Fitness curve: one `generation,fitness` row per generation
pub fn fitness_csv(history: &[f64]) -> ExportResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["generation", "fitness"])?;
    for (generation, fitness) in history.iter().enumerate() {
        writer.write_record([(generation + 1).to_string(), fitness.to_string()])?;
    }
    writer.into_inner().map_err(|e| e.into_error().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::fixtures::sample_timetable;

    #[test]
    fn test_timetable_csv() {
        let bytes = timetable_csv(&sample_timetable()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "group,course,type,day,time,room");
        assert_eq!(lines[1], "IT-2201,Distributed Systems,Lecture,Mon,08:00,102");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_fitness_csv() {
        let text = String::from_utf8(fitness_csv(&[1008.0, 16.5]).unwrap()).unwrap();
        assert_eq!(text, "generation,fitness\n1,1008\n2,16.5\n");
    }
}
