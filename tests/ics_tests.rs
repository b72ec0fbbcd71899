use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use std::io::BufReader;
use study_schedule::ics::{CalendarEmitter, PRODUCT_ID, parse_timezone};
use study_schedule::{Allocation, StudyItem, StudyWeek, allocate, emit};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn nine() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap()
}

fn sample_allocation() -> Allocation {
    let items = vec![
        StudyItem::new("todo", "Math", 90.0),
        StudyItem::new("todo", "Physics", 45.0),
    ];
    // Mondays and Wednesdays, 1 hour a day, starting Monday 2025-01-06
    let week = StudyWeek::from_iso_numbers([1, 3]).unwrap();
    allocate(&items, d(2025, 1, 6), &week, 60.0).unwrap()
}

fn emitter(capacity: f64) -> CalendarEmitter {
    let tz = parse_timezone("America/Sao_Paulo").unwrap();
    CalendarEmitter::new(nine(), tz, capacity)
        .unwrap()
        .with_dtstamp(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
}

fn property<'a>(props: &'a [ical::property::Property], name: &str) -> Option<&'a str> {
    props
        .iter()
        .find(|p| p.name == name)
        .and_then(|p| p.value.as_deref())
}

#[test]
fn events_cover_each_day_with_the_full_window() {
    let events = emitter(60.0).events(&sample_allocation()).unwrap();
    assert_eq!(events.len(), 3);

    assert_eq!(events[0].date, d(2025, 1, 6));
    assert_eq!(events[0].summary, "Study Block 2025-01-06");
    assert_eq!(events[0].description, "Classes today:\nMath");
    assert_eq!(events[0].start.naive_local(), d(2025, 1, 6).and_time(nine()));
    assert_eq!((events[0].end - events[0].start).num_minutes(), 60);

    // Wednesday holds the rest of Math followed by Physics
    assert_eq!(events[1].date, d(2025, 1, 8));
    assert_eq!(events[1].description, "Classes today:\nMath\nPhysics");
    assert_eq!(events[2].date, d(2025, 1, 13));
    assert_eq!(events[2].description, "Classes today:\nPhysics");
}

#[test]
fn rendered_calendar_parses_back() {
    let text = emitter(60.0).render(&sample_allocation()).unwrap();
    assert!(text.starts_with("BEGIN:VCALENDAR\r\n"));
    assert!(text.ends_with("END:VCALENDAR\r\n"));

    let mut parser = ical::IcalParser::new(BufReader::new(text.as_bytes()));
    let calendar = parser.next().expect("one calendar").expect("valid calendar");
    assert!(parser.next().is_none());

    assert_eq!(property(&calendar.properties, "VERSION"), Some("2.0"));
    assert_eq!(property(&calendar.properties, "PRODID"), Some(PRODUCT_ID));
    assert_eq!(
        property(&calendar.properties, "X-WR-TIMEZONE"),
        Some("America/Sao_Paulo")
    );

    assert_eq!(calendar.events.len(), 3);
    let first = &calendar.events[0].properties;
    assert_eq!(property(first, "SUMMARY"), Some("Study Block 2025-01-06"));
    // Sao Paulo is UTC-3 in January
    assert_eq!(property(first, "DTSTART"), Some("20250106T120000Z"));
    assert_eq!(property(first, "DTEND"), Some("20250106T130000Z"));
    assert_eq!(property(first, "DTSTAMP"), Some("20250101T000000Z"));
    assert_eq!(
        property(first, "UID"),
        Some("2025-01-06-study-block@study-schedule")
    );
    let description = property(first, "DESCRIPTION").unwrap();
    assert!(description.starts_with("Classes today:"));
    assert!(description.contains("Math"));
}

#[test]
fn end_follows_capacity_not_usage() {
    let items = vec![StudyItem::new("todo", "Short", 10.0)];
    let allocation = allocate(&items, d(2025, 1, 6), &StudyWeek::every_day(), 120.0).unwrap();
    let text = emitter(120.0).render(&allocation).unwrap();
    assert!(text.contains("DTSTART:20250106T120000Z\r\n"));
    assert!(text.contains("DTEND:20250106T140000Z\r\n"));
}

#[test]
fn subjects_with_reserved_characters_are_escaped() {
    let items = vec![StudyItem::new("todo", "Stats; part 1, intro", 30.0)];
    let allocation = allocate(&items, d(2025, 1, 6), &StudyWeek::every_day(), 60.0).unwrap();
    let text = emitter(60.0).render(&allocation).unwrap();
    assert!(text.contains("DESCRIPTION:Classes today:\\nStats\\; part 1\\, intro\r\n"));
}

#[test]
fn every_physical_line_fits_75_octets() {
    let subject = "Very long subject name that keeps going ".repeat(5);
    let items = vec![StudyItem::new("todo", subject, 30.0)];
    let allocation = allocate(&items, d(2025, 1, 6), &StudyWeek::every_day(), 60.0).unwrap();
    let text = emitter(60.0).render(&allocation).unwrap();
    for line in text.split("\r\n") {
        assert!(line.len() <= 75, "line exceeds 75 octets: {line:?}");
    }

    let mut parser = ical::IcalParser::new(BufReader::new(text.as_bytes()));
    let calendar = parser.next().unwrap().unwrap();
    let description = property(&calendar.events[0].properties, "DESCRIPTION").unwrap();
    assert!(description.contains("keeps going Very long subject"));
}

#[test]
fn empty_allocation_still_yields_a_calendar() {
    let text = emitter(60.0).render(&Allocation::new()).unwrap();
    assert!(text.contains("BEGIN:VCALENDAR"));
    assert!(!text.contains("BEGIN:VEVENT"));
}

#[test]
fn free_function_matches_emitter_and_validates_inputs() {
    let allocation = sample_allocation();
    let bytes = emit(&allocation, nine(), "Europe/Berlin", 60.0).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    // Berlin is UTC+1 in January
    assert!(text.contains("DTSTART:20250106T080000Z"));

    let err = emit(&allocation, nine(), "Mars/Olympus_Mons", 60.0).unwrap_err();
    assert_eq!(err.field(), Some("timezone"));

    let err = emit(&allocation, nine(), "Europe/Berlin", 0.0).unwrap_err();
    assert!(err.is_unschedulable());
}
