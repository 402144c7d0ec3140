//! Canonicalization of upstream records.
//!
//! The remote service is loose about field names and types: numerics arrive
//! as strings, images as bare URLs, URL-carrying objects or raw base64
//! payloads, and several fields have two or three historical spellings.
//! Everything here maps that mess onto the canonical [`Property`] and
//! [`Query`] shapes, enumerating every accepted source field name.
//!
//! Normalization never fails. Every coercion degrades to a safe default
//! (0, empty string, empty list) instead of raising; malformed JSON is the
//! fetch boundary's problem, not ours.

use serde_json::Value;

use crate::model::{AgentRef, Property, PropertyId, PropertyStatus, Query, QueryId, QueryStatus};
use crate::{DEFAULT_INQUIRY_MESSAGE, PLACEHOLDER_IMAGE};

/// Maps one raw record to the canonical listing shape. Inquiries embedded in
/// the record are ignored here; use [`hoist_queries`] to extract them.
#[must_use]
pub fn property(raw: &Value) -> Property {
    let images = images(raw.get("images"));

    Property {
        id: PropertyId(int(raw.get("id"))),
        title: first_text(raw, &["propertyName", "title"]),
        description: first_text(raw, &["description"]),
        price: uint(raw.get("price")),
        location: first_text(raw, &["location", "city"]),
        bedrooms: uint(raw.get("bedrooms")) as u32,
        bathrooms: uint(raw.get("bathrooms")) as u32,
        floor_area: first_text(raw, &["dimension", "sqft"]),
        property_type: non_empty_or(first_text(raw, &["propertyType", "type"]), "residential"),
        status: PropertyStatus::from_raw(&first_text(raw, &["status"])),
        images,
        agent: agent(raw),
        views: uint(raw.get("views")),
        created_at: first_text(raw, &["createdAt"]),
        updated_at: first_text(raw, &["updatedAt"]),
    }
}

/// Hoists inquiries nested under `queries` into independent entities, each
/// back-referencing its source property's id and title.
#[must_use]
pub fn hoist_queries(raw: &Value) -> Vec<Query> {
    let property_id = PropertyId(int(raw.get("id")));
    let property_title = first_text(raw, &["propertyName", "title"]);

    let Some(entries) = raw.get("queries").and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .map(|entry| {
            let status = QueryStatus::from_raw(&first_text(entry, &["status"]));
            // resolved_at/agent_response only make sense on resolved rows.
            let (resolved_at, agent_response) = if status.is_resolved() {
                (
                    optional_text(entry, &["resolvedAt"]),
                    optional_text(entry, &["agentResponse"]),
                )
            } else {
                (None, None)
            };

            Query {
                id: QueryId(int(entry.get("id"))),
                property_id,
                property_title: property_title.clone(),
                client_name: first_text(entry, &["fullName", "clientName"]),
                client_email: first_text(entry, &["clientEmail"]),
                client_phone: optional_text(entry, &["clientPhoneNumber", "clientPhone"]),
                message: non_empty_or(
                    first_text(entry, &["queryText", "message"]),
                    DEFAULT_INQUIRY_MESSAGE,
                ),
                status,
                created_at: first_text(entry, &["createdAt"]),
                resolved_at,
                agent_response,
            }
        })
        .collect()
}

/// Normalizes the `content` array of a paged listing response.
#[must_use]
pub fn listing(content: &[Value]) -> Vec<Property> {
    content.iter().map(property).collect()
}

/// Normalizes an agent-properties response, which is either a bare array or
/// a `{ "content": [...] }` wrapper, hoisting every embedded inquiry.
#[must_use]
pub fn agent_properties(body: &Value) -> (Vec<Property>, Vec<Query>) {
    let records = body
        .as_array()
        .or_else(|| body.get("content").and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut properties = Vec::with_capacity(records.len());
    let mut queries = Vec::new();
    for raw in records {
        properties.push(property(raw));
        queries.extend(hoist_queries(raw));
    }
    (properties, queries)
}

fn agent(raw: &Value) -> AgentRef {
    if let Some(user) = raw.get("user").filter(|u| u.is_object()) {
        return AgentRef {
            id: user.get("id").and_then(Value::as_i64),
            name: first_text(user, &["fullName", "name"]),
            email: first_text(user, &["email"]),
        };
    }

    // Legacy records carry only the agent's email under agentId.
    AgentRef {
        id: None,
        name: String::new(),
        email: first_text(raw, &["agentId"]),
    }
}

/// Picks a displayable URL for each image entry: a direct URL field wins
/// over decoding the raw payload, and records with no image at all get the
/// placeholder.
fn images(value: Option<&Value>) -> Vec<String> {
    let mut urls: Vec<String> = value
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(image_url).collect())
        .unwrap_or_default();

    if urls.is_empty() {
        urls.push(PLACEHOLDER_IMAGE.to_string());
    }
    urls
}

fn image_url(entry: &Value) -> Option<String> {
    if let Some(url) = entry.as_str() {
        return non_empty(url);
    }

    if let Some(url) = first_text_opt(entry, &["imageUrl", "url"]) {
        return Some(url);
    }

    let payload = entry.get("imgbase64Format")?.as_str()?.trim();
    if payload.is_empty() {
        return None;
    }
    // Already a data URI, or a raw base64 body we wrap into one.
    if payload.starts_with("data:") {
        Some(payload.to_string())
    } else {
        Some(format!("data:image/jpeg;base64,{payload}"))
    }
}

/// Unsigned numeric coercion: numbers pass through, numeric strings are
/// parsed, everything else (and any parse failure) is 0.
fn uint(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite() && *f >= 0.0)
                        .map(|f| f as u64)
                })
                .unwrap_or(0)
        }
        _ => 0,
    }
}

fn int(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// First present, non-null field among `keys`, coerced to text. Numbers are
/// rendered (floor areas and prices show up as either), anything else is
/// the empty string.
fn first_text(raw: &Value, keys: &[&str]) -> String {
    first_text_opt(raw, keys).unwrap_or_default()
}

fn first_text_opt(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match raw.get(key) {
        Some(Value::String(s)) => non_empty(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn optional_text(raw: &Value, keys: &[&str]) -> Option<String> {
    first_text_opt(raw, keys)
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn non_empty_or(s: String, fallback: &str) -> String {
    if s.is_empty() {
        fallback.to_string()
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn canonicalizes_a_well_formed_record() {
        let raw = json!({
            "id": 12,
            "propertyName": "Modern Downtown Loft",
            "description": "Floor-to-ceiling windows.",
            "price": 850_000,
            "location": "Downtown District",
            "bedrooms": 2,
            "bathrooms": 2,
            "dimension": "1200 sqft",
            "propertyType": "apartment",
            "status": "Active",
            "images": [{"id": 1, "imageUrl": "https://cdn.example.com/loft.jpg", "imgbase64Format": null}],
            "user": {"id": 4, "fullName": "John Agent", "email": "agent@example.com"},
            "views": 45,
            "createdAt": "2024-01-10",
            "updatedAt": "2024-01-10"
        });

        let p = property(&raw);
        assert_eq!(p.id, PropertyId(12));
        assert_eq!(p.title, "Modern Downtown Loft");
        assert_eq!(p.price, 850_000);
        assert_eq!(p.bedrooms, 2);
        assert_eq!(p.status, PropertyStatus::Active);
        assert_eq!(p.images, vec!["https://cdn.example.com/loft.jpg"]);
        assert_eq!(p.agent.id, Some(4));
        assert_eq!(p.agent.email, "agent@example.com");
    }

    #[test]
    fn numeric_strings_are_parsed() {
        let raw = json!({"id": "3", "price": "650000", "bedrooms": "3", "bathrooms": "2", "views": "12"});
        let p = property(&raw);
        assert_eq!(p.id, PropertyId(3));
        assert_eq!(p.price, 650_000);
        assert_eq!(p.bedrooms, 3);
        assert_eq!(p.views, 12);
    }

    #[test]
    fn malformed_numerics_fall_back_to_zero() {
        let raw = json!({
            "id": null,
            "price": "call for price",
            "bedrooms": {"count": 2},
            "bathrooms": [2],
            "views": "-3",
            "title": "Odd record"
        });
        let p = property(&raw);
        assert_eq!(p.price, 0);
        assert_eq!(p.bedrooms, 0);
        assert_eq!(p.bathrooms, 0);
        assert_eq!(p.views, 0);
        assert_eq!(p.title, "Odd record");
    }

    #[test]
    fn alternate_field_spellings_are_accepted() {
        let raw = json!({
            "id": 5,
            "title": "Cozy Suburban Home",
            "city": "Suburban Heights",
            "sqft": 1800,
            "type": "house",
            "agentId": "agent@example.com"
        });
        let p = property(&raw);
        assert_eq!(p.title, "Cozy Suburban Home");
        assert_eq!(p.location, "Suburban Heights");
        assert_eq!(p.floor_area, "1800");
        assert_eq!(p.property_type, "house");
        assert_eq!(p.agent.email, "agent@example.com");
        assert_eq!(p.agent.id, None);
    }

    #[test]
    fn missing_type_defaults_to_residential() {
        let p = property(&json!({"id": 1}));
        assert_eq!(p.property_type, "residential");
    }

    #[test]
    fn bare_url_strings_are_accepted_as_images() {
        let p = property(&json!({"id": 1, "images": ["/loft.png", "", "/terrace.png"]}));
        assert_eq!(p.images, vec!["/loft.png", "/terrace.png"]);
    }

    #[test]
    fn direct_url_wins_over_base64_payload() {
        let p = property(&json!({
            "id": 1,
            "images": [{"imageUrl": "https://cdn.example.com/a.jpg", "imgbase64Format": "AAAA"}]
        }));
        assert_eq!(p.images, vec!["https://cdn.example.com/a.jpg"]);
    }

    #[test]
    fn base64_payload_becomes_a_data_uri() {
        let p = property(&json!({"id": 1, "images": [{"imgbase64Format": "/9j/4AAQ"}]}));
        assert_eq!(p.images, vec!["data:image/jpeg;base64,/9j/4AAQ"]);

        let p = property(&json!({"id": 1, "images": [{"imgbase64Format": "data:image/png;base64,iVBOR"}]}));
        assert_eq!(p.images, vec!["data:image/png;base64,iVBOR"]);
    }

    #[test]
    fn imageless_records_get_the_placeholder() {
        assert_eq!(property(&json!({"id": 1})).images, vec![PLACEHOLDER_IMAGE]);
        assert_eq!(
            property(&json!({"id": 1, "images": []})).images,
            vec![PLACEHOLDER_IMAGE]
        );
        assert_eq!(
            property(&json!({"id": 1, "images": [{"imgbase64Format": ""}]})).images,
            vec![PLACEHOLDER_IMAGE]
        );
    }

    #[test]
    fn embedded_inquiries_are_hoisted_with_back_references() {
        let raw = json!({
            "id": 9,
            "propertyName": "Luxury Penthouse",
            "queries": [
                {
                    "id": 31,
                    "fullName": "Mike Davis",
                    "clientEmail": "mike@example.com",
                    "clientPhoneNumber": "(555) 987-6543",
                    "queryText": "Is the price negotiable?",
                    "status": "Open",
                    "createdAt": "2024-01-13T09:15:00Z"
                },
                {
                    "id": 32,
                    "clientName": "Emily Chen",
                    "clientEmail": "emily@example.com",
                    "message": "",
                    "status": "Resolved",
                    "resolvedAt": "2024-01-12T15:30:00Z",
                    "agentResponse": "Yes, parking is included."
                }
            ]
        });

        let queries = hoist_queries(&raw);
        assert_eq!(queries.len(), 2);

        assert_eq!(queries[0].property_id, PropertyId(9));
        assert_eq!(queries[0].property_title, "Luxury Penthouse");
        assert_eq!(queries[0].client_name, "Mike Davis");
        assert_eq!(queries[0].status, QueryStatus::Pending);
        assert_eq!(queries[0].resolved_at, None);
        assert_eq!(queries[0].agent_response, None);

        assert_eq!(queries[1].message, DEFAULT_INQUIRY_MESSAGE);
        assert_eq!(queries[1].status, QueryStatus::Resolved);
        assert_eq!(queries[1].resolved_at.as_deref(), Some("2024-01-12T15:30:00Z"));
        assert_eq!(
            queries[1].agent_response.as_deref(),
            Some("Yes, parking is included.")
        );
    }

    #[test]
    fn resolution_fields_are_dropped_on_pending_rows() {
        // A row claiming to be open but carrying resolution fields violates
        // the canonical invariant; the fields are discarded.
        let raw = json!({
            "id": 1,
            "queries": [{"id": 2, "status": "open", "resolvedAt": "2024-01-01", "agentResponse": "hello"}]
        });
        let queries = hoist_queries(&raw);
        assert!(queries[0].status.is_pending());
        assert_eq!(queries[0].resolved_at, None);
        assert_eq!(queries[0].agent_response, None);
    }

    #[test]
    fn agent_response_unwraps_both_envelope_shapes() {
        let bare = json!([{"id": 1, "propertyName": "A"}, {"id": 2, "propertyName": "B"}]);
        let (properties, _) = agent_properties(&bare);
        assert_eq!(properties.len(), 2);

        let wrapped = json!({"content": [{"id": 3, "propertyName": "C"}]});
        let (properties, _) = agent_properties(&wrapped);
        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0].id, PropertyId(3));

        let (properties, queries) = agent_properties(&json!("nonsense"));
        assert!(properties.is_empty());
        assert!(queries.is_empty());
    }

    fn arb_json() -> impl Strategy<Value = serde_json::Value> {
        let leaf = prop_oneof![
            Just(serde_json::Value::Null),
            any::<bool>().prop_map(serde_json::Value::from),
            any::<i64>().prop_map(serde_json::Value::from),
            any::<f64>().prop_map(|f| serde_json::Number::from_f64(f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number)),
            "[ -~]{0,16}".prop_map(serde_json::Value::from),
        ];
        leaf.prop_recursive(4, 32, 6, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..6).prop_map(serde_json::Value::Array),
                proptest::collection::btree_map(
                    prop_oneof![
                        Just("id".to_string()),
                        Just("price".to_string()),
                        Just("images".to_string()),
                        Just("queries".to_string()),
                        Just("status".to_string()),
                        Just("user".to_string()),
                        "[a-z]{1,10}",
                    ],
                    inner,
                    0..6
                )
                .prop_map(|m| serde_json::Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        /// Whatever shape the upstream invents, normalization must not panic.
        #[test]
        fn never_panics_on_arbitrary_json(raw in arb_json()) {
            let _ = property(&raw);
            let _ = hoist_queries(&raw);
            let _ = agent_properties(&raw);
        }
    }
}
