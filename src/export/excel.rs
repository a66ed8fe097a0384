use super::ExportResult;
use crate::model::{format_hour, Timetable};
use crate::workbook::{write_workbook, Cell, Sheet, Workbook};

const COLUMNS: [&str; 5] = ["Day", "Time", "Course", "Type", "Room"];

/// One sheet per group with Day, Time, Course, Type and Room columns
pub fn timetable_workbook(timetable: &Timetable) -> Workbook {
    let mut workbook = Workbook::new();

    for (group, entries) in timetable.by_group() {
        let mut sheet = Sheet::new(group);
        sheet.push_row(COLUMNS);
        for entry in entries {
            sheet.push_row(vec![
                Cell::from(entry.day.as_str()),
                Cell::from(format_hour(entry.time)),
                Cell::from(entry.course),
                Cell::from(entry.kind.as_str()),
                Cell::from(entry.room),
            ]);
        }
        workbook.sheets.push(sheet);
    }

    workbook
}

pub fn timetable_xlsx(timetable: &Timetable) -> ExportResult<Vec<u8>> {
    Ok(write_workbook(&timetable_workbook(timetable))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::fixtures::sample_timetable;
    use crate::workbook::read_workbook;

    #[test]
    fn test_sheet_per_group() {
        let bytes = timetable_xlsx(&sample_timetable()).unwrap();
        let workbook = read_workbook(&bytes).unwrap();

        assert_eq!(workbook.sheet_names(), vec!["IT-2201", "IT-2401"]);

        let rows = &workbook.sheet("IT-2401").unwrap().rows;
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0][0], Cell::from("Day"));
        assert_eq!(
            rows[1],
            vec![
                Cell::from("Mon"),
                Cell::from("08:00"),
                Cell::from("Programming"),
                Cell::from("Lecture"),
                Cell::from("101"),
            ]
        );
        assert_eq!(rows[3][0], Cell::from("Tue"));
    }
}
