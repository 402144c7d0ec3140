use serde::{Deserialize, Serialize};

use crate::api::ApiConfig;
use crate::favorites::Favorites;
use crate::gallery::Gallery;
use crate::pagination::Pagination;
use crate::session::Session;
use crate::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PropertyId(pub i64);

impl std::fmt::Display for PropertyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryId(pub i64);

impl std::fmt::Display for QueryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a listing. Upstream sources spell these in assorted
/// cases; unrecognized values are preserved rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    #[default]
    Active,
    Pending,
    Sold,
    Draft,
    Other(String),
}

impl PropertyStatus {
    #[must_use]
    pub fn from_raw(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "" | "active" => Self::Active,
            "pending" => Self::Pending,
            "sold" => Self::Sold,
            "draft" => Self::Draft,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Sold => "sold",
            Self::Draft => "draft",
            Self::Other(s) => s,
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    #[must_use]
    pub const fn is_sold(&self) -> bool {
        matches!(self, Self::Sold)
    }
}

/// Status of a customer inquiry. The only legal transition is
/// pending -> resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    #[default]
    Pending,
    Resolved,
    Other(String),
}

impl QueryStatus {
    /// Upstream reports "Open" (any case) for what this app calls pending.
    #[must_use]
    pub fn from_raw(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "" | "open" | "pending" => Self::Pending,
            "resolved" => Self::Resolved,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved)
    }
}

/// Reference to the agent that owns a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AgentRef {
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
}

/// The canonical, strictly-typed listing record every part of the app works
/// with, independent of upstream field naming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub title: String,
    pub description: String,
    pub price: u64,
    pub location: String,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub floor_area: String,
    pub property_type: String,
    pub status: PropertyStatus,
    /// Always non-empty; a placeholder is substituted when the source record
    /// carries nothing displayable.
    pub images: Vec<String>,
    pub agent: AgentRef,
    pub views: u64,
    pub created_at: String,
    pub updated_at: String,
}

/// A customer inquiry, hoisted out of the property record it arrived
/// embedded in and carrying a back-reference to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub id: QueryId,
    pub property_id: PropertyId,
    pub property_title: String,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub message: String,
    pub status: QueryStatus,
    pub created_at: String,
    pub resolved_at: Option<String>,
    pub agent_response: Option<String>,
}

impl Query {
    /// One-way pending -> resolved transition. Resolving anything that is
    /// not pending is a no-op, so `resolved_at` and `agent_response` are set
    /// exactly when the status is resolved.
    pub fn resolve(&mut self, response: impl Into<String>, resolved_at: impl Into<String>) -> bool {
        if !self.status.is_pending() {
            return false;
        }
        self.status = QueryStatus::Resolved;
        self.agent_response = Some(response.into());
        self.resolved_at = Some(resolved_at.into());
        true
    }
}

/// Submission state of the one-shot forms (inquiry, property create).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SubmitStatus {
    #[default]
    Idle,
    Sending,
    Sent,
    Failed(AppError),
}

impl SubmitStatus {
    #[must_use]
    pub const fn is_sending(&self) -> bool {
        matches!(self, Self::Sending)
    }
}

#[derive(Default)]
pub struct Model {
    pub api: Option<ApiConfig>,

    // Auth
    pub session: Option<Session>,
    pub is_authenticating: bool,
    pub auth_error: Option<AppError>,

    // Public listing feed
    pub listing: Vec<Property>,
    pub pagination: Pagination,
    pub is_listing_loading: bool,
    pub listing_error: Option<AppError>,

    // Detail page
    pub detail: Option<Property>,
    /// Most recently requested property; responses for anything else are
    /// superseded and must be discarded.
    pub detail_request: Option<PropertyId>,
    pub gallery: Gallery,
    pub is_detail_loading: bool,
    pub detail_error: Option<AppError>,

    // Client-local likes, scoped to this page view
    pub favorites: Favorites,

    // Inquiry form
    pub inquiry: SubmitStatus,

    // Agent dashboard
    pub agent_properties: Vec<Property>,
    pub queries: Vec<Query>,
    pub is_dashboard_loading: bool,
    pub dashboard_error: Option<AppError>,
    pub property_create: SubmitStatus,
}

impl Model {
    /// Installs a property on the detail page, resetting the gallery to the
    /// first image of the new sequence.
    pub fn show_detail(&mut self, property: Property) {
        self.gallery.reset(property.images.len());
        self.detail = Some(property);
        self.detail_error = None;
    }

    pub fn query_mut(&mut self, id: QueryId) -> Option<&mut Query> {
        self.queries.iter_mut().find(|q| q.id == id)
    }

    /// Tears down everything only an authenticated agent can see.
    pub fn clear_agent_data(&mut self) {
        self.session = None;
        self.agent_properties.clear();
        self.queries.clear();
        self.dashboard_error = None;
        self.property_create = SubmitStatus::Idle;
    }

    #[must_use]
    pub fn is_agent(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_agent)
    }
}
