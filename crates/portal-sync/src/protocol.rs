//! # Portal Wire Protocol
//!
//! Request/response shapes for the academic-records service, and the mapping
//! from wire DTOs into domain records.
//!
//! ## Wire Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Portal Endpoints                                 │
//! │                                                                         │
//! │  TOKENS        GET  login/loader      → { "name", "value" }            │
//! │  SIGN-IN       POST login/sign_in     → Set-Cookie header              │
//! │  TERMS         GET  general/terms     → [ TermDto ]                    │
//! │  SESSIONS      GET  schedule/sessions → [ SessionDto ]                 │
//! │  EXAMS         POST exam/schedule     → [ ExamDto ]   (term in body)   │
//! │  FINANCES      GET  finance/dues      → [ FinanceDto ]                 │
//! │  SUMMARY       GET  finance/summary   → [ { "charge", "payment" } ]    │
//! │  GRADES        GET  grade/term/{term} → GradeDto                       │
//! │  PROFILE       GET  student/profile   → { "Profile": [ {...} ] }       │
//! │  RESOURCES     POST course/resources  → [ ResourceDto ]               │
//! │  BOOTSTRAP     GET  general/initialize → (body discarded)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Profile and finance-summary bodies keep the service's historical field
//! names (`ACAD_PROG_DESCR`, `NAMA`, `NIM`, ...); everything else is mapped
//! into domain records as soon as it is deserialized, with a fresh record id
//! per row.

use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};
use portal_core::{
    new_record_id, ExamRecord, FinanceRecord, FinanceSummary, GradeRecord, GradingRecord,
    Profile, ScoreRecord, SessionRecord, Term,
};

// =============================================================================
// Tokens & Auth
// =============================================================================

/// Anti-forgery token pair returned by the unauthenticated loader call.
///
/// The pair is a dynamic form field: `field_name` is the input name the
/// sign-in form must carry, `field_value` its one-time value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Tokens {
    #[serde(rename = "name")]
    pub field_name: String,

    #[serde(rename = "value")]
    pub field_value: String,
}

/// Outcome of a sign-in call.
///
/// `cookie` holds the `Set-Cookie` header value when the response carried
/// one; the agent persists it as the new session cookie. Absent means the
/// prior cookie stays valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    pub cookie: Option<String>,
}

/// Body of the exam schedule request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExamRequestBody {
    pub term: String,
}

impl ExamRequestBody {
    pub fn new(term: impl Into<String>) -> Self {
        ExamRequestBody { term: term.into() }
    }
}

// =============================================================================
// Record DTOs
// =============================================================================

/// One academic term row.
#[derive(Debug, Clone, Deserialize)]
pub struct TermDto {
    pub value: i64,
    pub description: String,
}

impl TermDto {
    /// Maps into a domain term, keeping the fetched position.
    pub fn into_term(self, position: i64) -> Term {
        Term {
            value: self.value.to_string(),
            label: self.description,
            position,
        }
    }
}

/// Maps a fetched term sequence, stamping positions in order.
pub fn into_terms(dtos: Vec<TermDto>) -> Vec<Term> {
    dtos.into_iter()
        .enumerate()
        .map(|(position, dto)| dto.into_term(position as i64))
        .collect()
}

/// One scheduled class occurrence.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionDto {
    #[serde(rename = "CLASS_DATE")]
    pub date: String,
    #[serde(rename = "CRSE_ID")]
    pub course_id: String,
    #[serde(rename = "COURSE_TITLE_LONG")]
    pub course_name: String,
    #[serde(rename = "ROOM")]
    pub room: String,
    #[serde(rename = "TIME_START")]
    pub start_time: String,
    #[serde(rename = "TIME_END")]
    pub end_time: String,
}

impl From<SessionDto> for SessionRecord {
    fn from(dto: SessionDto) -> Self {
        SessionRecord {
            id: new_record_id(),
            date: dto.date,
            course_id: dto.course_id,
            course_name: dto.course_name,
            room: dto.room,
            start_time: dto.start_time,
            end_time: dto.end_time,
        }
    }
}

/// One exam occurrence.
#[derive(Debug, Clone, Deserialize)]
pub struct ExamDto {
    #[serde(rename = "EXAM_DATE")]
    pub date: String,
    #[serde(rename = "CRSE_ID")]
    pub course_id: String,
    #[serde(rename = "COURSE_TITLE_LONG")]
    pub course_name: String,
    #[serde(rename = "ROOM")]
    pub room: String,
    #[serde(rename = "EXAM_SHIFT")]
    pub shift: String,
}

impl From<ExamDto> for ExamRecord {
    fn from(dto: ExamDto) -> Self {
        ExamRecord {
            id: new_record_id(),
            date: dto.date,
            course_id: dto.course_id,
            course_name: dto.course_name,
            room: dto.room,
            shift: dto.shift,
        }
    }
}

/// One billing due item. Amounts arrive as integer cents.
#[derive(Debug, Clone, Deserialize)]
pub struct FinanceDto {
    #[serde(rename = "DUE_DATE")]
    pub due_date: String,
    #[serde(rename = "AMOUNT")]
    pub amount_cents: i64,
    #[serde(rename = "DESCR")]
    pub description: String,
}

impl From<FinanceDto> for FinanceRecord {
    fn from(dto: FinanceDto) -> Self {
        FinanceRecord {
            id: new_record_id(),
            due_date: dto.due_date,
            amount_cents: dto.amount_cents,
            description: dto.description,
        }
    }
}

// =============================================================================
// Grades
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreditDto {
    pub credits_attempted: i64,
    pub credits_earned: i64,
    pub grade_points: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GradingDto {
    pub course_id: String,
    pub assessment: String,
    pub weight_pct: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoreDto {
    pub course_id: String,
    pub assessment: String,
    pub score: f64,
}

/// Composite grade payload for one term.
#[derive(Debug, Clone, Deserialize)]
pub struct GradeDto {
    pub credit: CreditDto,
    #[serde(default)]
    pub gradings: Vec<GradingDto>,
    #[serde(default)]
    pub scores: Vec<ScoreDto>,
}

impl GradeDto {
    /// Maps into a domain grade record, stamping the requested term onto
    /// the credit row.
    pub fn into_record(self, term: &str) -> GradeRecord {
        GradeRecord {
            term: term.to_string(),
            credit: portal_core::CreditRecord {
                term: term.to_string(),
                credits_attempted: self.credit.credits_attempted,
                credits_earned: self.credit.credits_earned,
                grade_points: self.credit.grade_points,
            },
            gradings: self
                .gradings
                .into_iter()
                .map(|dto| GradingRecord {
                    id: new_record_id(),
                    course_id: dto.course_id,
                    assessment: dto.assessment,
                    weight_pct: dto.weight_pct,
                })
                .collect(),
            scores: self
                .scores
                .into_iter()
                .map(|dto| ScoreRecord {
                    id: new_record_id(),
                    course_id: dto.course_id,
                    assessment: dto.assessment,
                    score: dto.score,
                })
                .collect(),
        }
    }
}

// =============================================================================
// Resources
// =============================================================================

/// One course resource row (RESOURCES flow).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceDto {
    pub course_id: String,
    pub title: String,
    pub url: String,
}

// =============================================================================
// Profile & Finance Summary Parsers
// =============================================================================
// These two endpoints return raw bodies with the service's historical field
// names; parsing stays here so the client hands back bodies untouched.

#[derive(Debug, Deserialize)]
struct ProfileEnvelope {
    #[serde(rename = "Profile")]
    profile: Vec<ProfileDto>,
}

#[derive(Debug, Deserialize)]
struct ProfileDto {
    #[serde(rename = "ACAD_PROG_DESCR")]
    major: String,
    #[serde(rename = "ACAD_CAREER_DESCR")]
    degree: String,
    #[serde(rename = "BIRTHDATE")]
    birthday: String,
    #[serde(rename = "NAMA")]
    name: String,
    #[serde(rename = "NIM")]
    student_id: String,
}

/// Parses the profile body (`{"Profile": [ {...} ]}`, first element).
pub fn parse_profile(body: &str) -> SyncResult<Profile> {
    let envelope: ProfileEnvelope =
        serde_json::from_str(body).map_err(|e| fetch_error("profile", e))?;

    let dto = envelope
        .profile
        .into_iter()
        .next()
        .ok_or_else(|| fetch_error("profile", "empty Profile array"))?;

    Ok(Profile {
        name: dto.name,
        student_id: dto.student_id,
        major: dto.major,
        degree: dto.degree,
        birthday: dto.birthday,
    })
}

#[derive(Debug, Deserialize)]
struct FinanceSummaryDto {
    charge: i64,
    payment: i64,
}

/// Parses the finance summary body (`[ {"charge": N, "payment": N} ]`,
/// first element).
pub fn parse_finance_summary(body: &str) -> SyncResult<FinanceSummary> {
    let rows: Vec<FinanceSummaryDto> =
        serde_json::from_str(body).map_err(|e| fetch_error("financeSummary", e))?;

    let dto = rows
        .into_iter()
        .next()
        .ok_or_else(|| fetch_error("financeSummary", "empty summary array"))?;

    Ok(FinanceSummary {
        charge_cents: dto.charge,
        payment_cents: dto.payment,
    })
}

fn fetch_error(endpoint: &str, message: impl ToString) -> SyncError {
    SyncError::Fetch {
        endpoint: endpoint.to_string(),
        message: message.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_deserialize() {
        let tokens: Tokens =
            serde_json::from_str(r#"{"name": "csrf_9a1", "value": "0f3db881"}"#).unwrap();
        assert_eq!(tokens.field_name, "csrf_9a1");
        assert_eq!(tokens.field_value, "0f3db881");
    }

    #[test]
    fn test_exam_request_body_serializes_term() {
        let body = serde_json::to_string(&ExamRequestBody::new("1610")).unwrap();
        assert_eq!(body, r#"{"term":"1610"}"#);
    }

    #[test]
    fn test_terms_keep_fetched_order() {
        let dtos = vec![
            TermDto {
                value: 1610,
                description: "Odd Semester 2024/2025".to_string(),
            },
            TermDto {
                value: 1520,
                description: "Even Semester 2023/2024".to_string(),
            },
        ];

        let terms = into_terms(dtos);
        assert_eq!(terms[0].value, "1610");
        assert_eq!(terms[0].position, 0);
        assert!(terms[0].is_current());
        assert_eq!(terms[1].position, 1);
    }

    #[test]
    fn test_session_dto_maps_to_record() {
        let dto: SessionDto = serde_json::from_str(
            r#"{
                "CLASS_DATE": "2024-03-10",
                "CRSE_ID": "COMP6047",
                "COURSE_TITLE_LONG": "Algorithm Design",
                "ROOM": "R-401",
                "TIME_START": "07:20",
                "TIME_END": "09:00"
            }"#,
        )
        .unwrap();

        let record: SessionRecord = dto.into();
        assert_eq!(record.date, "2024-03-10");
        assert_eq!(record.course_id, "COMP6047");
        assert!(!record.id.is_empty());
    }

    #[test]
    fn test_grade_dto_stamps_term_onto_credit() {
        let dto: GradeDto = serde_json::from_str(
            r#"{
                "credit": {"credits_attempted": 24, "credits_earned": 24, "grade_points": 3.5},
                "gradings": [{"course_id": "COMP6047", "assessment": "Mid Exam", "weight_pct": 30}],
                "scores": [{"course_id": "COMP6047", "assessment": "Mid Exam", "score": 85.0}]
            }"#,
        )
        .unwrap();

        let record = dto.into_record("1610");
        assert_eq!(record.term, "1610");
        assert_eq!(record.credit.term, "1610");
        assert_eq!(record.gradings.len(), 1);
        assert_eq!(record.scores.len(), 1);
    }

    #[test]
    fn test_grade_dto_defaults_missing_collections() {
        let dto: GradeDto = serde_json::from_str(
            r#"{"credit": {"credits_attempted": 20, "credits_earned": 18, "grade_points": 3.1}}"#,
        )
        .unwrap();

        let record = dto.into_record("1520");
        assert!(record.gradings.is_empty());
        assert!(record.scores.is_empty());
    }

    #[test]
    fn test_parse_profile() {
        let body = r#"{
            "Profile": [{
                "ACAD_PROG_DESCR": "Computer Science",
                "ACAD_CAREER_DESCR": "Undergraduate",
                "BIRTHDATE": "1999-05-17",
                "NAMA": "Avery Lee",
                "NIM": "2201734522"
            }]
        }"#;

        let profile = parse_profile(body).unwrap();
        assert_eq!(profile.name, "Avery Lee");
        assert_eq!(profile.student_id, "2201734522");
        assert_eq!(profile.major, "Computer Science");
        assert_eq!(profile.degree, "Undergraduate");
        assert_eq!(profile.birthday, "1999-05-17");
    }

    #[test]
    fn test_parse_profile_rejects_empty_array() {
        let err = parse_profile(r#"{"Profile": []}"#).unwrap_err();
        assert_eq!(err.endpoint(), Some("profile"));
    }

    #[test]
    fn test_parse_finance_summary() {
        let summary =
            parse_finance_summary(r#"[{"charge": 12500000, "payment": 10000000}]"#).unwrap();
        assert_eq!(summary.charge_cents, 12_500_000);
        assert_eq!(summary.payment_cents, 10_000_000);
    }

    #[test]
    fn test_parse_finance_summary_rejects_garbage() {
        let err = parse_finance_summary("<html>maintenance</html>").unwrap_err();
        assert_eq!(err.endpoint(), Some("financeSummary"));
    }
}
