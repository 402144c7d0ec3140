//! The Crux app: the update loop that turns [`Event`]s into model changes
//! and effects, and the [`ViewModel`] projection the shell renders from.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{ListingEnvelope, LoginRequest, PropertyDraft};
use crate::capabilities::Capabilities;
use crate::event::Event;
use crate::model::{Model, Property, PropertyId, Query, QueryId, SubmitStatus};
use crate::normalize;
use crate::pagination::Freshness;
use crate::session::{Session, StoredSession};
use crate::{AppError, ErrorKind, SESSION_STORE_KEY};

use crux_kv::KeyValueOutput;

#[derive(Default)]
pub struct App;

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        tracing::debug!(
            event = event.name(),
            user_initiated = event.is_user_initiated(),
        );

        match event {
            Event::Started { api_base_url } => match crate::api::ApiConfig::new(&api_base_url) {
                Ok(api) => {
                    model.api = Some(api);
                    caps.kv.read(SESSION_STORE_KEY, Event::SessionRestored);
                    self.fetch_listing(model, caps, 0);
                }
                Err(error) => {
                    tracing::error!(%error, "unusable API base URL");
                    model.listing_error = Some(error);
                }
            },

            // Public listing feed
            Event::ListingRequested { page } => {
                // Out-of-range pages are a silent no-op, nothing to redraw.
                if !self.fetch_listing(model, caps, page) {
                    return;
                }
            }
            Event::ListingRetryRequested => {
                model.listing_error = None;
                self.fetch_listing(model, caps, 0);
            }
            Event::ListingLoaded { seq, result } => {
                if model.pagination.accept(seq) == Freshness::Stale {
                    tracing::debug!(seq, "discarding superseded listing response");
                    return;
                }
                model.is_listing_loading = false;
                match *result {
                    Ok(mut response) => {
                        let status = u16::from(response.status());
                        if (200..300).contains(&status) {
                            let body = response.take_body().unwrap_or(Value::Null);
                            match serde_json::from_value::<ListingEnvelope>(body) {
                                Ok(envelope) => {
                                    model
                                        .pagination
                                        .apply(envelope.page_number, envelope.total_pages);
                                    model.listing = normalize::listing(&envelope.content);
                                }
                                Err(error) => {
                                    model.listing_error = Some(AppError::new(
                                        ErrorKind::Deserialization,
                                        format!("listing envelope: {error}"),
                                    ));
                                }
                            }
                        } else {
                            model.listing_error = Some(error_from(status, &mut response));
                        }
                    }
                    Err(error) => {
                        model.listing_error = Some(AppError::network(error.to_string()));
                    }
                }
            }

            // Detail page
            Event::PropertyRequested { id } => {
                let Some(api) = &model.api else { return };
                model.detail_request = Some(id);
                model.is_detail_loading = true;
                model.detail_error = None;
                caps.http
                    .get(api.property_url(id))
                    .expect_json::<Value>()
                    .send(move |result| Event::PropertyLoaded {
                        id,
                        result: Box::new(result),
                    });
            }
            Event::PropertyPayloadOpened { json } => {
                // A payload in hand supersedes any fetch still in flight.
                model.detail_request = None;
                match serde_json::from_str::<Value>(&json) {
                    Ok(raw) => model.show_detail(normalize::property(&raw)),
                    Err(error) => {
                        model.detail = None;
                        model.detail_error = Some(AppError::new(
                            ErrorKind::Deserialization,
                            format!("property payload: {error}"),
                        ));
                    }
                }
            }
            Event::DetailClosed => {
                model.detail = None;
                model.detail_request = None;
                model.is_detail_loading = false;
                model.detail_error = None;
                model.inquiry = SubmitStatus::Idle;
                model.gallery.reset(1);
            }
            Event::PropertyLoaded { id, result } => {
                if model.detail_request != Some(id) {
                    tracing::debug!(%id, "discarding superseded property response");
                    return;
                }
                model.detail_request = None;
                model.is_detail_loading = false;
                match *result {
                    Ok(mut response) => {
                        let status = u16::from(response.status());
                        if (200..300).contains(&status) {
                            match response.take_body() {
                                Some(raw) => model.show_detail(normalize::property(&raw)),
                                None => {
                                    model.detail_error = Some(AppError::new(
                                        ErrorKind::Deserialization,
                                        "empty property response",
                                    ));
                                }
                            }
                        } else {
                            tracing::warn!(%id, status, "property fetch rejected");
                            model.detail_error = Some(error_from(status, &mut response));
                        }
                    }
                    Err(error) => {
                        model.detail_error = Some(AppError::network(error.to_string()));
                    }
                }
            }

            // Gallery
            Event::GalleryNext => model.gallery.next(),
            Event::GalleryPrevious => model.gallery.previous(),
            Event::GallerySelected { index } => model.gallery.go_to(index),

            Event::FavoriteToggled { property_id } => {
                model.favorites.toggle(property_id);
            }

            // Inquiry form
            Event::InquirySubmitted { form } => {
                if model.inquiry.is_sending() {
                    return;
                }
                let Some(api) = &model.api else { return };
                let url = api.raise_query_url();
                model.inquiry = SubmitStatus::Sending;
                match caps.http.post(url).body_json(&form.into_request()) {
                    Ok(builder) => {
                        builder.expect_json::<Value>().send(|result| {
                            Event::InquiryDelivered {
                                result: Box::new(result),
                            }
                        });
                    }
                    Err(error) => {
                        model.inquiry = SubmitStatus::Failed(AppError::new(
                            ErrorKind::Internal,
                            error.to_string(),
                        ));
                    }
                }
            }
            Event::InquiryDelivered { result } => {
                model.inquiry = match *result {
                    Ok(mut response) => {
                        let status = u16::from(response.status());
                        if (200..300).contains(&status) {
                            SubmitStatus::Sent
                        } else {
                            SubmitStatus::Failed(error_from(status, &mut response))
                        }
                    }
                    Err(error) => SubmitStatus::Failed(AppError::network(error.to_string())),
                };
            }
            Event::InquiryAcknowledged => model.inquiry = SubmitStatus::Idle,

            // Auth
            Event::LoginSubmitted { email, password } => {
                if model.is_authenticating {
                    return;
                }
                let Some(api) = &model.api else { return };
                let url = api.login_url();
                model.is_authenticating = true;
                model.auth_error = None;
                match caps.http.post(url).body_json(&LoginRequest { email, password }) {
                    Ok(builder) => {
                        builder.expect_json::<Value>().send(|result| {
                            Event::LoginCompleted {
                                result: Box::new(result),
                            }
                        });
                    }
                    Err(error) => {
                        model.is_authenticating = false;
                        model.auth_error =
                            Some(AppError::new(ErrorKind::Internal, error.to_string()));
                    }
                }
            }
            Event::LoginCompleted { result } => {
                model.is_authenticating = false;
                match *result {
                    Ok(mut response) => {
                        let status = u16::from(response.status());
                        if (200..300).contains(&status) {
                            let body = response.take_body().unwrap_or(Value::Null);
                            match Session::from_login_response(&body) {
                                Ok(session) => {
                                    self.persist_session(&session, caps);
                                    model.session = Some(session);
                                    if model.is_agent() {
                                        self.fetch_agent_properties(model, caps);
                                    }
                                }
                                Err(error) => model.auth_error = Some(error),
                            }
                        } else {
                            model.auth_error = Some(error_from(status, &mut response));
                        }
                    }
                    Err(error) => {
                        model.auth_error = Some(AppError::network(error.to_string()));
                    }
                }
            }
            Event::LogoutRequested => {
                model.clear_agent_data();
                // An empty payload is the tombstone; restore ignores it.
                caps.kv
                    .write(SESSION_STORE_KEY, Vec::new(), Event::SessionPersisted);
            }
            Event::SessionRestored(output) => {
                if let KeyValueOutput::Read(Some(bytes)) = output {
                    match StoredSession::from_bytes(&bytes) {
                        Ok(stored) => {
                            model.session = Some(stored.into_session());
                            if model.is_agent() {
                                self.fetch_agent_properties(model, caps);
                            }
                        }
                        Err(error) => {
                            tracing::debug!(%error, "ignoring unreadable stored session");
                        }
                    }
                }
            }
            Event::SessionPersisted(output) => {
                if let KeyValueOutput::Write(false) = output {
                    tracing::warn!("session write rejected by shell storage");
                }
                return;
            }

            // Agent dashboard
            Event::AgentPropertiesRequested => self.fetch_agent_properties(model, caps),
            Event::AgentPropertiesLoaded { result } => {
                model.is_dashboard_loading = false;
                match *result {
                    Ok(mut response) => {
                        let status = u16::from(response.status());
                        if (200..300).contains(&status) {
                            let body = response.take_body().unwrap_or(Value::Null);
                            let (properties, queries) = normalize::agent_properties(&body);
                            model.agent_properties = properties;
                            model.queries = queries;
                        } else {
                            model.dashboard_error = Some(error_from(status, &mut response));
                        }
                    }
                    Err(error) => {
                        model.dashboard_error = Some(AppError::network(error.to_string()));
                    }
                }
            }
            Event::PropertyCreateSubmitted { draft } => {
                self.submit_property(model, caps, draft);
            }
            Event::PropertyCreateCompleted { result } => {
                model.property_create = match *result {
                    Ok(mut response) => {
                        let status = u16::from(response.status());
                        if (200..300).contains(&status) {
                            // The created record comes back normalized-ready;
                            // anything without an id is just an ack message.
                            if let Some(raw) = response.take_body() {
                                if raw.get("id").is_some() {
                                    model.agent_properties.push(normalize::property(&raw));
                                }
                            }
                            SubmitStatus::Sent
                        } else {
                            SubmitStatus::Failed(error_from(status, &mut response))
                        }
                    }
                    Err(error) => SubmitStatus::Failed(AppError::network(error.to_string())),
                };
            }
            Event::PropertyCreateAcknowledged => model.property_create = SubmitStatus::Idle,
            Event::QueryResolveRequested { query_id, response } => {
                let response = response.trim().to_string();
                if response.is_empty() {
                    model.dashboard_error =
                        Some(AppError::new(ErrorKind::Validation, "Please enter a response"));
                } else {
                    let resolved_at = chrono::Utc::now().to_rfc3339();
                    match model.query_mut(query_id) {
                        Some(query) => {
                            if !query.resolve(response, resolved_at) {
                                tracing::debug!(%query_id, "query already resolved");
                            }
                        }
                        None => {
                            model.dashboard_error = Some(AppError::new(
                                ErrorKind::Validation,
                                "This inquiry no longer exists.",
                            ));
                        }
                    }
                }
            }

            Event::ErrorDismissed => {
                model.listing_error = None;
                model.detail_error = None;
                model.auth_error = None;
                model.dashboard_error = None;
                if matches!(model.inquiry, SubmitStatus::Failed(_)) {
                    model.inquiry = SubmitStatus::Idle;
                }
                if matches!(model.property_create, SubmitStatus::Failed(_)) {
                    model.property_create = SubmitStatus::Idle;
                }
            }
        }

        caps.render.render();
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel::of(model)
    }
}

impl App {
    /// Issues a page fetch and reports whether one actually went out;
    /// out-of-range pages never do.
    fn fetch_listing(&self, model: &mut Model, caps: &Capabilities, page: u32) -> bool {
        let Some(api) = model.api.clone() else {
            return false;
        };
        let Some(request) = model.pagination.request(page) else {
            return false;
        };
        model.is_listing_loading = true;
        model.listing_error = None;

        let seq = request.seq;
        caps.http
            .get(api.listing_url(request.page))
            .expect_json::<Value>()
            .send(move |result| Event::ListingLoaded {
                seq,
                result: Box::new(result),
            });
        true
    }

    fn fetch_agent_properties(&self, model: &mut Model, caps: &Capabilities) {
        let Some(api) = &model.api else { return };
        let Some(session) = &model.session else {
            model.dashboard_error = Some(AppError::new(
                ErrorKind::Authentication,
                "sign in to view your dashboard",
            ));
            return;
        };
        if !session.is_agent() {
            model.dashboard_error = Some(AppError::new(
                ErrorKind::Authorization,
                "agent account required",
            ));
            return;
        }
        let url = api.agent_properties_url(session.user_id);
        let auth = session.authorization_header();
        model.is_dashboard_loading = true;
        model.dashboard_error = None;

        caps.http
            .get(url)
            .header("Authorization", auth)
            .expect_json::<Value>()
            .send(|result| Event::AgentPropertiesLoaded {
                result: Box::new(result),
            });
    }

    fn submit_property(&self, model: &mut Model, caps: &Capabilities, draft: PropertyDraft) {
        if model.property_create.is_sending() {
            return;
        }
        if let Err(error) = validate_draft(&draft) {
            model.property_create = SubmitStatus::Failed(error);
            return;
        }
        let Some(api) = &model.api else { return };
        let Some(session) = &model.session else {
            model.property_create = SubmitStatus::Failed(AppError::new(
                ErrorKind::Authentication,
                "sign in to add a listing",
            ));
            return;
        };
        if !session.is_agent() {
            model.property_create = SubmitStatus::Failed(AppError::new(
                ErrorKind::Authorization,
                "agent account required",
            ));
            return;
        }
        let url = api.add_property_url();
        let auth = session.authorization_header();
        model.property_create = SubmitStatus::Sending;

        match caps
            .http
            .post(url)
            .header("Authorization", auth)
            .body_json(&draft.into_request())
        {
            Ok(builder) => {
                builder.expect_json::<Value>().send(|result| {
                    Event::PropertyCreateCompleted {
                        result: Box::new(result),
                    }
                });
            }
            Err(error) => {
                model.property_create =
                    SubmitStatus::Failed(AppError::new(ErrorKind::Internal, error.to_string()));
            }
        }
    }

    fn persist_session(&self, session: &Session, caps: &Capabilities) {
        match StoredSession::of(session).to_bytes() {
            Ok(bytes) => caps.kv.write(SESSION_STORE_KEY, bytes, Event::SessionPersisted),
            Err(error) => tracing::warn!(%error, "session not persisted"),
        }
    }
}

fn validate_draft(draft: &PropertyDraft) -> Result<(), AppError> {
    let invalid = |message: &str| AppError::new(ErrorKind::Validation, message);
    if draft.title.trim().is_empty() {
        return Err(invalid("Property name is required"));
    }
    if draft.location.trim().is_empty() {
        return Err(invalid("Location is required"));
    }
    if draft.price == 0 {
        return Err(invalid("Price is required"));
    }
    Ok(())
}

/// Maps a non-success response to an error, draining the body so the
/// server's own `message` wins over the generic text.
fn error_from(status: u16, response: &mut crux_http::Response<Value>) -> AppError {
    let body = response
        .take_body()
        .and_then(|value| serde_json::to_vec(&value).ok());
    AppError::from_http_status(status, body.as_deref())
}

// ---------------------------------------------------------------------------
// View model

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorView {
    pub message: String,
    pub code: String,
    pub is_retryable: bool,
}

impl ErrorView {
    fn of(error: &AppError) -> Self {
        Self {
            message: error.user_facing_message(),
            code: error.code().to_string(),
            is_retryable: error.is_retryable(),
        }
    }
}

/// Shell-facing mirror of [`SubmitStatus`] with presentation-ready errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FormStatus {
    #[default]
    Idle,
    Sending,
    Sent,
    Failed(ErrorView),
}

impl FormStatus {
    fn of(status: &SubmitStatus) -> Self {
        match status {
            SubmitStatus::Idle => Self::Idle,
            SubmitStatus::Sending => Self::Sending,
            SubmitStatus::Sent => Self::Sent,
            SubmitStatus::Failed(error) => Self::Failed(ErrorView::of(error)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyCard {
    pub id: PropertyId,
    pub title: String,
    pub price: u64,
    pub price_formatted: String,
    pub location: String,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub floor_area: String,
    pub property_type: String,
    pub status: String,
    pub image: String,
    pub is_favorite: bool,
    pub views: u64,
}

impl PropertyCard {
    fn of(property: &Property, model: &Model) -> Self {
        Self {
            id: property.id,
            title: property.title.clone(),
            price: property.price,
            price_formatted: format_price(property.price),
            location: property.location.clone(),
            bedrooms: property.bedrooms,
            bathrooms: property.bathrooms,
            floor_area: property.floor_area.clone(),
            property_type: property.property_type.clone(),
            status: property.status.as_str().to_string(),
            image: property.images[0].clone(),
            is_favorite: model.favorites.contains(property.id),
            views: property.views,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PaginationView {
    pub current_page: u32,
    pub total_pages: u32,
    pub has_previous: bool,
    pub has_next: bool,
    pub is_loading: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryView {
    pub index: usize,
    pub count: usize,
    pub current_image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDetailView {
    pub id: PropertyId,
    pub title: String,
    pub description: String,
    pub price: u64,
    pub price_formatted: String,
    pub location: String,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub floor_area: String,
    pub property_type: String,
    pub status: String,
    pub images: Vec<String>,
    pub gallery: GalleryView,
    pub agent_name: String,
    pub agent_email: String,
    pub agent_user_id: Option<i64>,
    pub is_favorite: bool,
    pub views: u64,
    pub created_at: String,
}

impl PropertyDetailView {
    fn of(property: &Property, model: &Model) -> Self {
        let index = model.gallery.index().min(property.images.len() - 1);
        Self {
            id: property.id,
            title: property.title.clone(),
            description: property.description.clone(),
            price: property.price,
            price_formatted: format_price(property.price),
            location: property.location.clone(),
            bedrooms: property.bedrooms,
            bathrooms: property.bathrooms,
            floor_area: property.floor_area.clone(),
            property_type: property.property_type.clone(),
            status: property.status.as_str().to_string(),
            images: property.images.clone(),
            gallery: GalleryView {
                index,
                count: property.images.len(),
                current_image: property.images[index].clone(),
            },
            agent_name: property.agent.name.clone(),
            agent_email: property.agent.email.clone(),
            agent_user_id: property.agent.id,
            is_favorite: model.favorites.contains(property.id),
            views: property.views,
            created_at: property.created_at.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryView {
    pub id: QueryId,
    pub property_id: PropertyId,
    pub property_title: String,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
    pub message: String,
    pub status: String,
    pub is_pending: bool,
    pub created_at: String,
    pub resolved_at: Option<String>,
    pub agent_response: Option<String>,
}

impl QueryView {
    fn of(query: &Query) -> Self {
        Self {
            id: query.id,
            property_id: query.property_id,
            property_title: query.property_title.clone(),
            client_name: query.client_name.clone(),
            client_email: query.client_email.clone(),
            client_phone: query.client_phone.clone(),
            message: query.message.clone(),
            status: if query.status.is_resolved() {
                "resolved".to_string()
            } else if query.status.is_pending() {
                "pending".to_string()
            } else {
                "other".to_string()
            },
            is_pending: query.status.is_pending(),
            created_at: query.created_at.clone(),
            resolved_at: query.resolved_at.clone(),
            agent_response: query.agent_response.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DashboardStats {
    pub total_properties: usize,
    pub active_listings: usize,
    pub pending_queries: usize,
    pub resolved_queries: usize,
    pub total_views: u64,
    pub total_revenue: u64,
    pub total_revenue_formatted: String,
}

impl DashboardStats {
    fn of(properties: &[Property], queries: &[Query]) -> Self {
        let total_revenue = properties
            .iter()
            .filter(|p| p.status.is_sold())
            .map(|p| p.price)
            .sum();
        Self {
            total_properties: properties.len(),
            active_listings: properties.iter().filter(|p| p.status.is_active()).count(),
            pending_queries: queries.iter().filter(|q| q.status.is_pending()).count(),
            resolved_queries: queries.iter().filter(|q| q.status.is_resolved()).count(),
            total_views: properties.iter().map(|p| p.views).sum(),
            total_revenue,
            total_revenue_formatted: format_price(total_revenue),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SessionView {
    pub is_authenticated: bool,
    pub is_agent: bool,
    pub user_id: Option<i64>,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewModel {
    pub listing: Vec<PropertyCard>,
    pub pagination: PaginationView,
    pub is_listing_loading: bool,
    pub listing_error: Option<ErrorView>,

    pub detail: Option<PropertyDetailView>,
    pub is_detail_loading: bool,
    pub detail_error: Option<ErrorView>,

    pub inquiry: FormStatus,

    pub session: SessionView,
    pub is_authenticating: bool,
    pub auth_error: Option<ErrorView>,

    pub agent_properties: Vec<PropertyCard>,
    pub queries: Vec<QueryView>,
    pub dashboard: DashboardStats,
    pub is_dashboard_loading: bool,
    pub dashboard_error: Option<ErrorView>,
    pub property_create: FormStatus,

    pub favorites_count: usize,
}

impl ViewModel {
    fn of(model: &Model) -> Self {
        let session = match &model.session {
            Some(session) => SessionView {
                is_authenticated: true,
                is_agent: session.is_agent(),
                user_id: Some(session.user_id),
                name: session.name.clone(),
                email: session.email.clone(),
            },
            None => SessionView::default(),
        };

        Self {
            listing: model.listing.iter().map(|p| PropertyCard::of(p, model)).collect(),
            pagination: PaginationView {
                current_page: model.pagination.current_page(),
                total_pages: model.pagination.total_pages().unwrap_or(0),
                has_previous: model.pagination.has_previous(),
                has_next: model.pagination.has_next(),
                is_loading: model.is_listing_loading,
            },
            is_listing_loading: model.is_listing_loading,
            listing_error: model.listing_error.as_ref().map(ErrorView::of),

            detail: model.detail.as_ref().map(|p| PropertyDetailView::of(p, model)),
            is_detail_loading: model.is_detail_loading,
            detail_error: model.detail_error.as_ref().map(ErrorView::of),

            inquiry: FormStatus::of(&model.inquiry),

            session,
            is_authenticating: model.is_authenticating,
            auth_error: model.auth_error.as_ref().map(ErrorView::of),

            agent_properties: model
                .agent_properties
                .iter()
                .map(|p| PropertyCard::of(p, model))
                .collect(),
            queries: model.queries.iter().map(QueryView::of).collect(),
            dashboard: DashboardStats::of(&model.agent_properties, &model.queries),
            is_dashboard_loading: model.is_dashboard_loading,
            dashboard_error: model.dashboard_error.as_ref().map(ErrorView::of),
            property_create: FormStatus::of(&model.property_create),

            favorites_count: model.favorites.len(),
        }
    }
}

/// `850000` -> `"$850,000"`.
fn format_price(price: u64) -> String {
    let digits = price.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${grouped}")
}
