use serde::{Deserialize, Serialize};
use serde_json::Value;

use crux_kv::KeyValueOutput;

use crate::api::{InquiryForm, PropertyDraft};
use crate::model::{PropertyId, QueryId};

type HttpResult<T> = crux_http::Result<crux_http::Response<T>>;

/// Everything that can happen to the app. Shell-driven events are
/// serializable for the FFI bridge; the `#[serde(skip)]` variants are
/// core-internal continuations carrying capability results.
#[derive(Serialize, Deserialize)]
pub enum Event {
    /// Shell start-up, carrying the externally-provided service location.
    Started {
        api_base_url: String,
    },

    // Public listing feed
    ListingRequested {
        page: u32,
    },
    ListingRetryRequested,
    #[serde(skip)]
    ListingLoaded {
        seq: u64,
        result: Box<HttpResult<Value>>,
    },

    // Detail page
    PropertyRequested {
        id: PropertyId,
    },
    /// A property payload smuggled through navigation state rather than
    /// fetched; may be arbitrarily corrupt.
    PropertyPayloadOpened {
        json: String,
    },
    DetailClosed,
    #[serde(skip)]
    PropertyLoaded {
        id: PropertyId,
        result: Box<HttpResult<Value>>,
    },

    // Gallery
    GalleryNext,
    GalleryPrevious,
    GallerySelected {
        index: usize,
    },

    // Favorites
    FavoriteToggled {
        property_id: PropertyId,
    },

    // Inquiry form
    InquirySubmitted {
        form: InquiryForm,
    },
    InquiryAcknowledged,
    #[serde(skip)]
    InquiryDelivered {
        result: Box<HttpResult<Value>>,
    },

    // Auth
    LoginSubmitted {
        email: String,
        password: String,
    },
    LogoutRequested,
    #[serde(skip)]
    LoginCompleted {
        result: Box<HttpResult<Value>>,
    },
    #[serde(skip)]
    SessionRestored(KeyValueOutput),
    #[serde(skip)]
    SessionPersisted(KeyValueOutput),

    // Agent dashboard
    AgentPropertiesRequested,
    #[serde(skip)]
    AgentPropertiesLoaded {
        result: Box<HttpResult<Value>>,
    },
    PropertyCreateSubmitted {
        draft: PropertyDraft,
    },
    PropertyCreateAcknowledged,
    #[serde(skip)]
    PropertyCreateCompleted {
        result: Box<HttpResult<Value>>,
    },
    QueryResolveRequested {
        query_id: QueryId,
        response: String,
    },

    ErrorDismissed,
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Started { .. } => "started",
            Self::ListingRequested { .. } => "listing_requested",
            Self::ListingRetryRequested => "listing_retry_requested",
            Self::ListingLoaded { .. } => "listing_loaded",
            Self::PropertyRequested { .. } => "property_requested",
            Self::PropertyPayloadOpened { .. } => "property_payload_opened",
            Self::DetailClosed => "detail_closed",
            Self::PropertyLoaded { .. } => "property_loaded",
            Self::GalleryNext => "gallery_next",
            Self::GalleryPrevious => "gallery_previous",
            Self::GallerySelected { .. } => "gallery_selected",
            Self::FavoriteToggled { .. } => "favorite_toggled",
            Self::InquirySubmitted { .. } => "inquiry_submitted",
            Self::InquiryAcknowledged => "inquiry_acknowledged",
            Self::InquiryDelivered { .. } => "inquiry_delivered",
            Self::LoginSubmitted { .. } => "login_submitted",
            Self::LogoutRequested => "logout_requested",
            Self::LoginCompleted { .. } => "login_completed",
            Self::SessionRestored(_) => "session_restored",
            Self::SessionPersisted(_) => "session_persisted",
            Self::AgentPropertiesRequested => "agent_properties_requested",
            Self::AgentPropertiesLoaded { .. } => "agent_properties_loaded",
            Self::PropertyCreateSubmitted { .. } => "property_create_submitted",
            Self::PropertyCreateAcknowledged => "property_create_acknowledged",
            Self::PropertyCreateCompleted { .. } => "property_create_completed",
            Self::QueryResolveRequested { .. } => "query_resolve_requested",
            Self::ErrorDismissed => "error_dismissed",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::ListingRequested { .. }
                | Self::ListingRetryRequested
                | Self::PropertyRequested { .. }
                | Self::PropertyPayloadOpened { .. }
                | Self::DetailClosed
                | Self::GalleryNext
                | Self::GalleryPrevious
                | Self::GallerySelected { .. }
                | Self::FavoriteToggled { .. }
                | Self::InquirySubmitted { .. }
                | Self::InquiryAcknowledged
                | Self::LoginSubmitted { .. }
                | Self::LogoutRequested
                | Self::AgentPropertiesRequested
                | Self::PropertyCreateSubmitted { .. }
                | Self::PropertyCreateAcknowledged
                | Self::QueryResolveRequested { .. }
                | Self::ErrorDismissed
        )
    }
}
