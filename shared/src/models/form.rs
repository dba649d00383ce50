//! Health declaration form Model

use crate::constants::{HealthCodeStatus, Sex};
use serde::{Deserialize, Serialize};

/// Form row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Form {
    pub id: i64,
    pub name: String,
    pub sex: i64,
    pub phone: String,
    #[serde(rename = "IDCard")]
    pub id_card: String,
    pub org_name: String,
    pub car_id: String,
    pub reason: String,
    pub guarantor: String,
    pub guarantor_phone: String,
    pub health_code_status: i64,
    pub is_been_epidemic_area_in_two_weeks: bool,
    pub is_cough: bool,
    pub in_time_applied: i64,
    pub out_time_applied: i64,
    pub in_time_real: i64,
    pub out_time_real: i64,
}

/// Submission payload; every field is required
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormCreate {
    pub name: String,
    pub sex: Sex,
    pub phone: String,
    #[serde(rename = "IDCard")]
    pub id_card: String,
    pub org_name: String,
    pub car_id: String,
    pub reason: String,
    pub guarantor: String,
    pub guarantor_phone: String,
    pub health_code_status: HealthCodeStatus,
    pub is_been_epidemic_area_in_two_weeks: bool,
    pub is_cough: bool,
    pub in_time_applied: i64,
    pub out_time_applied: i64,
    pub in_time_real: i64,
    pub out_time_real: i64,
}

/// Search filters; absent fields do not filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormSearch {
    pub name: Option<String>,
    pub sex: Option<Sex>,
    pub health_code_status: Option<HealthCodeStatus>,
    pub is_been_epidemic_area_in_two_weeks: Option<bool>,
    pub is_cough: Option<bool>,
    /// Only forms that actually entered after this instant
    pub in_time: Option<i64>,
    /// Only forms that actually left before this instant
    pub out_time: Option<i64>,
}
