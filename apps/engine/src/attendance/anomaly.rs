//! Attendance anomaly scan: classifies each day as present, late or absent and
//! turns the counts into a bounded risk score.
//!
//! risk = min(100, late × late_weight + absent × absent_weight)

use chrono::{DateTime, FixedOffset, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendancePolicy {
    /// Check-ins at or after this local hour count as late.
    pub late_hour: u32,
    pub late_weight: u32,
    pub absent_weight: u32,
}

impl Default for AttendancePolicy {
    fn default() -> Self {
        Self {
            late_hour: 10,
            late_weight: 5,
            absent_weight: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceRecord {
    pub date: NaiveDate,
    /// RFC 3339 timestamp; the hour is read in the timestamp's own offset.
    #[serde(default)]
    pub check_in: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnomalyRequest {
    #[serde(default)]
    pub records: Vec<AttendanceRecord>,
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Present,
    Late,
    Absent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayDetail {
    pub date: NaiveDate,
    pub classification: Classification,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyReport {
    pub total: usize,
    pub late: u32,
    pub absent: u32,
    pub risk: u32,
    pub details: Vec<DayDetail>,
}

pub fn classify(record: &AttendanceRecord, policy: &AttendancePolicy) -> Classification {
    match record.check_in {
        None => Classification::Absent,
        Some(at) if at.hour() >= policy.late_hour => Classification::Late,
        Some(_) => Classification::Present,
    }
}

/// Monotonic non-decreasing in both counts, capped at 100.
pub fn risk_score(late: u32, absent: u32, policy: &AttendancePolicy) -> u32 {
    late.saturating_mul(policy.late_weight)
        .saturating_add(absent.saturating_mul(policy.absent_weight))
        .min(100)
}

pub fn detect_anomalies(
    request: &AnomalyRequest,
    policy: &AttendancePolicy,
) -> Result<AnomalyReport, AppError> {
    if let (Some(from), Some(to)) = (request.from, request.to) {
        if from > to {
            return Err(AppError::Validation(
                "'from' must not be after 'to'".to_string(),
            ));
        }
    }

    let mut records: Vec<&AttendanceRecord> = request
        .records
        .iter()
        .filter(|r| request.from.map_or(true, |from| r.date >= from))
        .filter(|r| request.to.map_or(true, |to| r.date <= to))
        .collect();
    records.sort_by_key(|r| r.date);

    let details: Vec<DayDetail> = records
        .iter()
        .map(|r| DayDetail {
            date: r.date,
            classification: classify(r, policy),
        })
        .collect();

    let count = |kind: Classification| {
        details.iter().filter(|d| d.classification == kind).count() as u32
    };
    let late = count(Classification::Late);
    let absent = count(Classification::Absent);

    Ok(AnomalyReport {
        total: details.len(),
        late,
        absent,
        risk: risk_score(late, absent, policy),
        details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, check_in: Option<&str>) -> AttendanceRecord {
        AttendanceRecord {
            date: date.parse().unwrap(),
            check_in: check_in.map(|t| DateTime::parse_from_rfc3339(t).unwrap()),
        }
    }

    fn request(records: Vec<AttendanceRecord>) -> AnomalyRequest {
        AnomalyRequest {
            records,
            from: None,
            to: None,
        }
    }

    #[test]
    fn test_two_late_one_absent_scores_25() {
        let req = request(vec![
            record("2024-03-01", Some("2024-03-01T09:00:00+05:30")),
            record("2024-03-02", Some("2024-03-02T10:15:00+05:30")),
            record("2024-03-03", Some("2024-03-03T11:00:00+05:30")),
            record("2024-03-04", None),
            record("2024-03-05", Some("2024-03-05T08:45:00+05:30")),
        ]);
        let report = detect_anomalies(&req, &AttendancePolicy::default()).unwrap();
        assert_eq!(report.total, 5);
        assert_eq!(report.late, 2);
        assert_eq!(report.absent, 1);
        assert_eq!(report.risk, 25);
        assert_eq!(report.details[0].classification, Classification::Present);
        assert_eq!(report.details[3].classification, Classification::Absent);
        assert_eq!(report.details[4].classification, Classification::Present);
    }

    #[test]
    fn test_hour_read_in_record_offset() {
        // 09:30 local is 04:00 UTC; 10:00 local counts as late.
        let policy = AttendancePolicy::default();
        assert_eq!(
            classify(&record("2024-03-01", Some("2024-03-01T09:30:00+05:30")), &policy),
            Classification::Present
        );
        assert_eq!(
            classify(&record("2024-03-01", Some("2024-03-01T10:00:00-07:00")), &policy),
            Classification::Late
        );
    }

    #[test]
    fn test_risk_capped_at_100() {
        let records = (1..=20)
            .map(|d| record(&format!("2024-01-{d:02}"), None))
            .collect();
        let report = detect_anomalies(&request(records), &AttendancePolicy::default()).unwrap();
        assert_eq!(report.absent, 20);
        assert_eq!(report.risk, 100);
    }

    #[test]
    fn test_risk_monotonic() {
        let policy = AttendancePolicy::default();
        for late in 0..10 {
            for absent in 0..10 {
                assert!(risk_score(late + 1, absent, &policy) >= risk_score(late, absent, &policy));
                assert!(risk_score(late, absent + 1, &policy) >= risk_score(late, absent, &policy));
            }
        }
    }

    #[test]
    fn test_range_filter_and_date_order() {
        let req = AnomalyRequest {
            records: vec![
                record("2024-03-05", None),
                record("2024-02-28", None),
                record("2024-03-02", Some("2024-03-02T08:00:00Z")),
                record("2024-03-03", Some("2024-03-03T12:00:00Z")),
            ],
            from: Some("2024-03-01".parse().unwrap()),
            to: Some("2024-03-04".parse().unwrap()),
        };
        let report = detect_anomalies(&req, &AttendancePolicy::default()).unwrap();
        let dates: Vec<String> = report.details.iter().map(|d| d.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-03-02", "2024-03-03"]);
        assert_eq!(report.risk, 5);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let req = AnomalyRequest {
            records: vec![],
            from: Some("2024-03-05".parse().unwrap()),
            to: Some("2024-03-01".parse().unwrap()),
        };
        assert!(matches!(
            detect_anomalies(&req, &AttendancePolicy::default()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_empty_timeline() {
        let report = detect_anomalies(&request(vec![]), &AttendancePolicy::default()).unwrap();
        assert_eq!(report.total, 0);
        assert_eq!(report.risk, 0);
    }
}
