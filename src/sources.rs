//! Backend data sources and the query each one is asked.

use crate::query::{Clause, Literal, ODataQuery};
use crate::window::DateRange;
use std::fmt;
use uuid::Uuid;

/// Rows not tied to an inpatient stay carry the nil GUID as their IPD id.
pub const NO_IPD: Uuid = Uuid::nil();

const PHARMACY_BILL: &str = "P";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Consultation,
    FollowUp,
    Appointment,
    Prescription,
    OpdBilling,
    IpdBilling,
    PharmacyBilling,
    IpdRegistration,
}

impl Domain {
    pub const ALL: [Domain; 8] = [
        Domain::Consultation,
        Domain::FollowUp,
        Domain::Appointment,
        Domain::Prescription,
        Domain::OpdBilling,
        Domain::IpdBilling,
        Domain::PharmacyBilling,
        Domain::IpdRegistration,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Consultation => "consultation",
            Domain::FollowUp => "follow-up",
            Domain::Appointment => "appointment",
            Domain::Prescription => "prescription",
            Domain::OpdBilling => "opd-billing",
            Domain::IpdBilling => "ipd-billing",
            Domain::PharmacyBilling => "pharmacy-billing",
            Domain::IpdRegistration => "ipd-registration",
        }
    }

    /// Field the date range applies to.
    pub fn date_field(self) -> &'static str {
        match self {
            Domain::Consultation | Domain::Prescription => "PrescriptionDate",
            Domain::FollowUp | Domain::Appointment => "AppointmentDate",
            Domain::OpdBilling | Domain::IpdBilling | Domain::PharmacyBilling => "BillDate",
            Domain::IpdRegistration => "AdmissionDate",
        }
    }

    fn select(self) -> &'static [&'static str] {
        match self {
            Domain::Consultation => &["PrescriptionDate", "UserID", "Gender", "Age", "AgeUnit", "DOB"],
            Domain::FollowUp => &["AppointmentDate", "FollowUp"],
            Domain::Appointment => &[
                "AppointmentDate",
                "BookingStatus",
                "FollowUp",
                "ClinicID",
                "ClinicName",
                "DoctorID",
                "DoctorName",
            ],
            Domain::Prescription => &[
                "PrescriptionDate",
                "Symptom",
                "Diagnosis",
                "ClinicID",
                "AppointmentClinicID",
                "DoctorID",
                "DoctorName",
            ],
            Domain::OpdBilling | Domain::PharmacyBilling => &[
                "BillDate",
                "GrossAmount",
                "PaymentReceived",
                "ClinicID",
                "DoctorID",
                "DoctorName",
                "to_PRESCRIPTION/clinic_id",
            ],
            Domain::IpdBilling => &[
                "BillDate",
                "GrossAmount",
                "PaymentReceived",
                "ClinicID",
                "DoctorID",
                "DoctorName",
            ],
            Domain::IpdRegistration => &[
                "AdmissionDate",
                "IPDStatus",
                "to_DOCTOR/Name",
                "to_HOSPITAL/Name",
                "to_DOCTORINCHARGE/Name",
                "to_CONSULTINGDOCTOR/Name",
            ],
        }
    }

    fn expand(self) -> &'static [&'static str] {
        match self {
            Domain::OpdBilling | Domain::PharmacyBilling => &["to_PRESCRIPTION"],
            Domain::IpdRegistration => &[
                "to_DOCTOR",
                "to_HOSPITAL",
                "to_DOCTORINCHARGE",
                "to_CONSULTINGDOCTOR",
            ],
            _ => &[],
        }
    }

    fn ordered(self) -> bool {
        !matches!(
            self,
            Domain::Consultation | Domain::FollowUp | Domain::Appointment
        )
    }

    // A second field some sources use to link a row to a clinic.
    fn secondary_clinic_field(self) -> Option<&'static str> {
        match self {
            Domain::Consultation | Domain::Prescription => Some("AppointmentClinicID"),
            Domain::OpdBilling | Domain::PharmacyBilling => Some("to_PRESCRIPTION/clinic_id"),
            _ => None,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who and when a query is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryScope {
    pub doctor: Uuid,
    pub range: DateRange,
    pub clinic: Option<Uuid>,
}

fn clinic_clause(domain: Domain, clinic: Uuid) -> Option<Clause> {
    let primary = Clause::eq("ClinicID", Literal::Guid(clinic));
    match domain {
        // Admissions are not scoped by clinic.
        Domain::IpdRegistration => None,
        _ => Some(match domain.secondary_clinic_field() {
            Some(field) => Clause::any_of([primary, Clause::eq(field, Literal::Guid(clinic))]),
            None => primary,
        }),
    }
}

fn domain_clauses(domain: Domain, scope: &QueryScope) -> Vec<Clause> {
    match domain {
        // Only the all-clinics consultation view leaves out inpatient rows.
        Domain::Consultation if scope.clinic.is_none() => {
            vec![Clause::eq("IPDID", Literal::Guid(NO_IPD))]
        }
        Domain::FollowUp => vec![
            Clause::eq("BookingStatus", Literal::text("D")),
            Clause::eq("FollowUp", Literal::Bool(true)),
        ],
        Domain::OpdBilling => vec![
            Clause::ne("BillType", Literal::text(PHARMACY_BILL)),
            Clause::eq("IPDID", Literal::Guid(NO_IPD)),
        ],
        Domain::IpdBilling => vec![Clause::ne("IPDID", Literal::Guid(NO_IPD))],
        Domain::PharmacyBilling => vec![Clause::eq("BillType", Literal::text(PHARMACY_BILL))],
        _ => Vec::new(),
    }
}

pub fn query_for(domain: Domain, scope: &QueryScope) -> ODataQuery {
    let date_field = domain.date_field();
    let mut query = ODataQuery::new();

    if let Some(clause) = scope.clinic.and_then(|clinic| clinic_clause(domain, clinic)) {
        query = query.filter(clause);
    }

    query = query
        .filter(Clause::eq("DoctorID", Literal::Guid(scope.doctor)))
        .filter(Clause::ge(date_field, Literal::date(scope.range.start)))
        .filter(Clause::le(date_field, Literal::date(scope.range.end)))
        .filter(Clause::ne(date_field, Literal::empty()))
        .filter(Clause::all(domain_clauses(domain, scope)))
        .select(domain.select())
        .expand(domain.expand());

    if domain.ordered() {
        query = query.order_by_desc(date_field);
    }
    query
}
