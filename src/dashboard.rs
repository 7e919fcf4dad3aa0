use crate::aggregate::{
    age_summary, appointment_summary, billing_summary, billing_total, consultation_summary,
    diagnosis_summary, follow_up_summary, gender_summary, registration_summary, rx_summary,
    symptom_summary,
};
use crate::client::RemoteDataClient;
use crate::errors::ClientError;
use crate::models::{
    AdmissionRecord, AgeCounts, AppointmentDay, AppointmentRecord, BillRecord, BillingDay,
    CategoryCount, GenderCounts, MonthlySeries, PrescriptionRecord, RegistrationDay, RxDay,
    WeekCounts,
};
use crate::sources::{Domain, QueryScope};
use crate::window::{DateRange, RangePreset, TrackedMonths};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    Consultations,
    Demographic,
    RxAnalytics,
    Appointment,
    Rx,
    OpdBilling,
    IpdBilling,
    PharmacyBilling,
    IpdRegistration,
}

impl Section {
    pub const ALL: [Section; 9] = [
        Section::Consultations,
        Section::Demographic,
        Section::RxAnalytics,
        Section::Appointment,
        Section::Rx,
        Section::OpdBilling,
        Section::IpdBilling,
        Section::PharmacyBilling,
        Section::IpdRegistration,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Section::Consultations => "consultations",
            Section::Demographic => "demographic",
            Section::RxAnalytics => "rx-analytics",
            Section::Appointment => "appointment",
            Section::Rx => "rx",
            Section::OpdBilling => "opd-billing",
            Section::IpdBilling => "ipd-billing",
            Section::PharmacyBilling => "pharmacy-billing",
            Section::IpdRegistration => "ipd-registration",
        }
    }

    /// Analytics sections report on the tracked three-month window; clinics
    /// sections follow the selected date range.
    pub fn uses_tracked_window(self) -> bool {
        matches!(
            self,
            Section::Consultations | Section::Demographic | Section::RxAnalytics
        )
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.as_str() == value)
            .ok_or_else(|| format!("unknown section '{value}'"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionRequest {
    pub range: RangePreset,
    pub clinic: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SectionData {
    Consultations {
        consultations: MonthlySeries<WeekCounts>,
        #[serde(rename = "followUps")]
        follow_ups: MonthlySeries<WeekCounts>,
    },
    Demographic {
        gender: Vec<GenderCounts>,
        age: MonthlySeries<AgeCounts>,
    },
    RxAnalytics {
        symptoms: Vec<CategoryCount>,
        diagnoses: Vec<CategoryCount>,
    },
    Appointments {
        days: Vec<AppointmentDay>,
    },
    Prescriptions {
        days: Vec<RxDay>,
    },
    Billing {
        days: Vec<BillingDay>,
        total: f64,
    },
    Registrations {
        days: Vec<RegistrationDay>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionResponse {
    pub section: Section,
    pub range: DateRange,
    pub data: SectionData,
}

fn billing(rows: &[BillRecord]) -> SectionData {
    let days = billing_summary(rows);
    let total = billing_total(&days);
    SectionData::Billing { days, total }
}

/// Fetches what `section` needs and folds it into its chart series.
pub async fn load_section(
    client: &RemoteDataClient,
    doctor: Uuid,
    section: Section,
    request: SectionRequest,
    today: NaiveDate,
) -> Result<SectionResponse, ClientError> {
    let months = TrackedMonths::ending_at(today);
    let range = if section.uses_tracked_window() {
        DateRange::tracked(&months, today)
    } else {
        request.range.resolve(today)
    };
    let scope = QueryScope {
        doctor,
        range,
        clinic: request.clinic,
    };

    let data = match section {
        Section::Consultations => {
            let (prescriptions, follow_ups) = tokio::try_join!(
                client.fetch::<PrescriptionRecord>(Domain::Consultation, &scope),
                client.fetch::<AppointmentRecord>(Domain::FollowUp, &scope),
            )?;
            SectionData::Consultations {
                consultations: consultation_summary(&prescriptions, &months),
                follow_ups: follow_up_summary(&follow_ups, &months),
            }
        }
        Section::Demographic => {
            let rows: Vec<PrescriptionRecord> = client.fetch(Domain::Consultation, &scope).await?;
            SectionData::Demographic {
                gender: gender_summary(&rows),
                age: age_summary(&rows, &months),
            }
        }
        Section::RxAnalytics => {
            let rows: Vec<PrescriptionRecord> = client.fetch(Domain::Prescription, &scope).await?;
            SectionData::RxAnalytics {
                symptoms: symptom_summary(&rows),
                diagnoses: diagnosis_summary(&rows),
            }
        }
        Section::Appointment => {
            let rows: Vec<AppointmentRecord> = client.fetch(Domain::Appointment, &scope).await?;
            SectionData::Appointments {
                days: appointment_summary(&rows),
            }
        }
        Section::Rx => {
            let rows: Vec<PrescriptionRecord> = client.fetch(Domain::Prescription, &scope).await?;
            SectionData::Prescriptions {
                days: rx_summary(&rows),
            }
        }
        Section::OpdBilling => billing(&client.fetch(Domain::OpdBilling, &scope).await?),
        Section::IpdBilling => billing(&client.fetch(Domain::IpdBilling, &scope).await?),
        Section::PharmacyBilling => billing(&client.fetch(Domain::PharmacyBilling, &scope).await?),
        Section::IpdRegistration => {
            let rows: Vec<AdmissionRecord> = client.fetch(Domain::IpdRegistration, &scope).await?;
            SectionData::Registrations {
                days: registration_summary(&rows),
            }
        }
    };

    info!(%section, start = %range.start, end = %range.end, "section loaded");
    Ok(SectionResponse {
        section,
        range,
        data,
    })
}
