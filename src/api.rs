//! Wire-level surface of the remote listing service: validated base URL,
//! endpoint builders and the request/response payload shapes.
//!
//! Response bodies that carry property or inquiry records are deliberately
//! typed as [`serde_json::Value`] and handed to [`crate::normalize`]; only
//! the stable envelope fields get strict types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::model::PropertyId;
use crate::{AppError, ErrorKind, PAGE_SIZE};

/// Externally-provided location of the REST service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    base: String,
}

impl ApiConfig {
    /// Validates the base URL: http/https only, a host, no embedded
    /// credentials. The trailing slash is normalized away so endpoint
    /// builders can join paths blindly.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, AppError> {
        let raw = base_url.as_ref().trim();
        let parsed = Url::parse(raw)
            .map_err(|e| AppError::new(ErrorKind::Validation, format!("invalid base URL: {e}")))?;

        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(AppError::new(
                    ErrorKind::Validation,
                    format!("unsupported URL scheme '{other}'"),
                ));
            }
        }
        if parsed.host_str().is_none() {
            return Err(AppError::new(ErrorKind::Validation, "base URL must have a host"));
        }
        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(AppError::new(
                ErrorKind::Validation,
                "credentials in the base URL are not allowed",
            ));
        }

        Ok(Self {
            base: raw.trim_end_matches('/').to_string(),
        })
    }

    /// `GET` — one page of the public feed, fixed page size.
    #[must_use]
    pub fn listing_url(&self, page: u32) -> String {
        format!("{}/open/property/getAll?page={page}&size={PAGE_SIZE}", self.base)
    }

    /// `GET` — one raw property record.
    #[must_use]
    pub fn property_url(&self, id: PropertyId) -> String {
        format!("{}/open/property/{id}", self.base)
    }

    /// `GET` (bearer auth) — everything the agent owns, inquiries embedded.
    #[must_use]
    pub fn agent_properties_url(&self, user_id: i64) -> String {
        format!("{}/property/findByAgentId?userId={user_id}", self.base)
    }

    /// `POST` (bearer auth) — create a listing.
    #[must_use]
    pub fn add_property_url(&self) -> String {
        format!("{}/property/add", self.base)
    }

    /// `POST` — customer inquiry.
    #[must_use]
    pub fn raise_query_url(&self) -> String {
        format!("{}/open/raise-query", self.base)
    }

    /// `POST` — credentials in, token out.
    #[must_use]
    pub fn login_url(&self) -> String {
        format!("{}/auth/login", self.base)
    }
}

/// Envelope of `GET /open/property/getAll`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ListingEnvelope {
    #[serde(default)]
    pub content: Vec<Value>,
    #[serde(default, rename = "pageNumber")]
    pub page_number: u32,
    #[serde(default, rename = "pageSize")]
    pub page_size: u32,
    #[serde(default, rename = "totalElements")]
    pub total_elements: u64,
    #[serde(default, rename = "totalPages")]
    pub total_pages: u32,
    #[serde(default)]
    pub last: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /open/raise-query`. The service expects the two ids as
/// strings, so they are serialized that way.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaiseQueryRequest {
    pub full_name: String,
    pub client_phone_number: String,
    pub client_email: String,
    pub message: String,
    pub agent_user_id: String,
    pub property_detail_id: String,
}

/// What the shell collects in the inquiry form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquiryForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub agent_user_id: i64,
    pub property_id: PropertyId,
}

impl InquiryForm {
    #[must_use]
    pub fn into_request(self) -> RaiseQueryRequest {
        RaiseQueryRequest {
            full_name: self.name,
            client_phone_number: self.phone,
            client_email: self.email,
            message: self.message,
            agent_user_id: self.agent_user_id.to_string(),
            property_detail_id: self.property_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagePayload {
    #[serde(rename = "imgbase64Format")]
    pub imgbase64_format: String,
}

/// Body of `POST /property/add`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPropertyRequest {
    pub property_name: String,
    pub description: String,
    pub price: u64,
    pub location: String,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub dimension: String,
    pub property_type: String,
    pub status: String,
    pub images: Vec<ImagePayload>,
}

/// What the shell collects in the new-listing form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDraft {
    pub title: String,
    pub description: String,
    pub price: u64,
    pub location: String,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub floor_area: String,
    pub property_type: String,
    pub status: String,
    /// Raw base64 image bodies captured by the shell.
    pub images_base64: Vec<String>,
}

impl PropertyDraft {
    #[must_use]
    pub fn into_request(self) -> AddPropertyRequest {
        AddPropertyRequest {
            property_name: self.title,
            description: self.description,
            price: self.price,
            location: self.location,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            dimension: self.floor_area,
            property_type: self.property_type,
            status: self.status,
            images: self
                .images_base64
                .into_iter()
                .map(|payload| ImagePayload {
                    imgbase64_format: payload,
                })
                .collect(),
        }
    }
}
