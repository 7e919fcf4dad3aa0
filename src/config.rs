use crate::errors::ConfigError;
use crate::sources::Domain;
use reqwest::Url;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_REGISTRATION_PATH: &str =
    "/sap/opu/odata/sap/ZCDS_C_IPD_REGISTRATION_CDS/ZCDS_C_IPD_REGISTRATION";

#[derive(Clone)]
pub struct AppConfig {
    pub port: u16,
    pub api_base_url: Option<Url>,
    pub api_key: Option<String>,
    pub doctor_id: Uuid,
    pub request_timeout: Duration,
    pub endpoints: HashMap<Domain, String>,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("api_base_url", &self.api_base_url.as_ref().map(Url::as_str))
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("doctor_id", &self.doctor_id)
            .field("request_timeout", &self.request_timeout)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

/// Environment variable naming the endpoint of each data source.
pub fn endpoint_var(domain: Domain) -> &'static str {
    match domain {
        Domain::Consultation => "CONSULTATION_ENDPOINT",
        Domain::FollowUp => "FOLLOWUP_ENDPOINT",
        Domain::Appointment => "APPOINTMENTS_ENDPOINT",
        Domain::Prescription => "RX_ENDPOINT",
        Domain::OpdBilling => "OPD_BILLING_ENDPOINT",
        Domain::IpdBilling => "IPD_BILLING_ENDPOINT",
        Domain::PharmacyBilling => "PHARMACY_BILLING_ENDPOINT",
        Domain::IpdRegistration => "IPD_REGISTRATION_ENDPOINT",
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match get("PORT") {
            Some(value) => parse_var("PORT", value)?,
            None => DEFAULT_PORT,
        };

        let api_base_url = get("API_BASE_URL")
            .map(|value| {
                Url::parse(&value).map_err(|err| ConfigError::Invalid {
                    var: "API_BASE_URL",
                    reason: err.to_string(),
                    value,
                })
            })
            .transpose()?;

        let doctor_id = match get("DOCTOR_ID") {
            Some(value) => parse_var("DOCTOR_ID", value)?,
            None => return Err(ConfigError::Missing { var: "DOCTOR_ID" }),
        };

        let timeout_secs: u64 = match get("API_TIMEOUT_SECS") {
            Some(value) => parse_var("API_TIMEOUT_SECS", value)?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let mut endpoints = HashMap::new();
        for domain in Domain::ALL {
            if let Some(endpoint) = get(endpoint_var(domain)) {
                endpoints.insert(domain, endpoint);
            }
        }
        endpoints
            .entry(Domain::IpdRegistration)
            .or_insert_with(|| DEFAULT_REGISTRATION_PATH.to_string());

        Ok(Self {
            port,
            api_base_url,
            api_key: get("API_KEY"),
            doctor_id,
            request_timeout: Duration::from_secs(timeout_secs),
            endpoints,
        })
    }

    pub fn endpoint(&self, domain: Domain) -> Option<&str> {
        self.endpoints.get(&domain).map(String::as_str)
    }
}

fn parse_var<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    value.parse().map_err(|err: T::Err| ConfigError::Invalid {
        var,
        reason: err.to_string(),
        value,
    })
}
