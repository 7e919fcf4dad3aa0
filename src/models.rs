use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// Backend rows are loosely typed: any field may be missing, null, a number
// where text was expected, or garbage. Every field lands as Option<String>
// and the aggregation functions decide what to do with it.
fn loose_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(Value::Bool(flag)) => Some(flag.to_string()),
        _ => None,
    })
}

/// A prescription row. Consultation, demographic and Rx views all read
/// from the prescription endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrescriptionRecord {
    #[serde(default, rename = "PrescriptionDate", deserialize_with = "loose_text")]
    pub prescription_date: Option<String>,
    #[serde(default, rename = "Gender", deserialize_with = "loose_text")]
    pub gender: Option<String>,
    #[serde(default, rename = "Age", deserialize_with = "loose_text")]
    pub age: Option<String>,
    #[serde(default, rename = "Symptom", deserialize_with = "loose_text")]
    pub symptom: Option<String>,
    #[serde(default, rename = "Diagnosis", deserialize_with = "loose_text")]
    pub diagnosis: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentRecord {
    #[serde(default, rename = "AppointmentDate", deserialize_with = "loose_text")]
    pub appointment_date: Option<String>,
    #[serde(default, rename = "BookingStatus", deserialize_with = "loose_text")]
    pub booking_status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BillRecord {
    #[serde(default, rename = "BillDate", deserialize_with = "loose_text")]
    pub bill_date: Option<String>,
    #[serde(default, rename = "GrossAmount", deserialize_with = "loose_text")]
    pub gross_amount: Option<String>,
    #[serde(default, rename = "PaymentReceived", deserialize_with = "loose_text")]
    pub payment_received: Option<String>,
}

/// An IPD admission row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdmissionRecord {
    #[serde(default, rename = "AdmissionDate", deserialize_with = "loose_text")]
    pub admission_date: Option<String>,
    #[serde(default, rename = "IPDStatus", deserialize_with = "loose_text")]
    pub ipd_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekCounts {
    pub week: String,
    pub counts: [u64; 3],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenderCounts {
    pub month: String,
    pub males: u64,
    pub females: u64,
    pub others: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeCounts {
    pub age_group: String,
    pub counts: [u64; 3],
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppointmentDay {
    pub date: String,
    pub approved: u64,
    pub cancelled: u64,
    pub completed: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BillingDay {
    pub date: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistrationDay {
    pub date: String,
    pub approved: u64,
    pub cancelled: u64,
    pub discharged: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RxDay {
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: u64,
}

/// A month-columned series together with the labels of its three columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySeries<T> {
    pub months: [&'static str; 3],
    pub entries: Vec<T>,
}
