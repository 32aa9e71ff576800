//! Example rows for the benchmark table.
//!
//! Every backend writes the same record shape, so the timings compare the
//! data-access layer rather than the data.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Typed student record as returned by `Adapter::list`.
#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    pub student_id: i64,
    pub name: String,
    pub sex: i64,
    pub birthday: NaiveDate,
    pub birth_time: NaiveTime,
    pub enrollment_time: NaiveDateTime,
    pub major: i64,
    pub photo: Option<Vec<u8>>,
    pub remark: Option<String>,
    pub readonly: i64,
}

/// Column value produced by the generic decoding path.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// Integer column.
    Integer(i64),
    /// Floating point column.
    Real(f64),
    /// Text column.
    Text(String),
    /// Binary column.
    Blob(Vec<u8>),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// One row as ordered `(column, value)` pairs.
pub type FieldMap = Vec<(String, Value)>;

/// Look up a column in a generic row.
pub fn field<'a>(row: &'a FieldMap, column: &str) -> Option<&'a Value> {
    row.iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(column))
        .map(|(_, value)| value)
}

const PHOTO: &[u8] = &[0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date")
}

fn time(hour: u32, minute: u32, second: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, second).expect("valid wall-clock time")
}

/// The fixed row written by every single-row insert.
pub fn example_student() -> Student {
    Student {
        student_id: 10_000,
        name: "Jim".to_string(),
        sex: 1,
        birthday: date(1990, 3, 12),
        birth_time: time(8, 30, 0),
        enrollment_time: date(2008, 9, 1).and_time(time(9, 0, 0)),
        major: 10_000,
        photo: Some(PHOTO.to_vec()),
        remark: Some("remark".to_string()),
        readonly: 1,
    }
}

/// Generate `count` independent records for a batch insert.
///
/// Generation is seeded so that every backend receives identical batches.
pub fn generate_students(count: usize) -> Vec<Student> {
    const SEED: u64 = 20_150_901;
    let mut rng = StdRng::seed_from_u64(SEED);

    let names = [
        "Jim", "Lucy", "Lily", "Tom", "Kate", "Han", "Mei", "Bob", "Ann", "Joe",
    ];

    (0..count)
        .map(|i| {
            let birthday = date(1985 + rng.gen_range(0..15), rng.gen_range(1..=12), rng.gen_range(1..=28));
            let birth_time = time(rng.gen_range(0..24), rng.gen_range(0..60), rng.gen_range(0..60));

            Student {
                student_id: i as i64,
                name: format!("{}_{}", names[i % names.len()], i),
                sex: rng.gen_range(0..2),
                birthday,
                birth_time,
                enrollment_time: date(2008, 9, 1).and_time(time(9, 0, 0)),
                major: 10_000 + (i % 20) as i64,
                photo: rng.gen_bool(0.5).then(|| PHOTO.to_vec()),
                remark: Some(format!("generated row {}", i)),
                readonly: 0,
            }
        })
        .collect()
}
