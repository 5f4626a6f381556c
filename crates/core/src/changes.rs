//! Field-level change detection for request updates.
//!
//! Every request edit flows through `detect_changes`, which compares a
//! partial update against the current snapshot and produces one
//! `RequestChange` entry per differing leaf field. The entries are what the
//! append-only log stores and what both parties' history views render, so
//! their wire shape (camelCase keys, raw JSON leaf values, epoch-millisecond
//! timestamps) is load-bearing and covered by tests.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::status::{RequestStatus, INITIAL_STATUS};
use crate::tenant::TenantType;

/// Field name of status change entries; the response-time metrics only look
/// at entries carrying this field.
pub const STATUS_FIELD: &str = "status";

/// Sparse map of authentication field name (camelCase) to customer-supplied
/// value, e.g. `customerEmail` -> `a@b.c`. `BTreeMap` gives change expansion
/// a deterministic key order.
pub type CustomerInfo = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One incorrect customer-info field cited by a provider when declining.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlaggedField {
    pub field: String,
    pub value: String,
}

/// A leaf value as it appears in a change entry: the closed set of JSON
/// shapes tracked fields can take. Serialized untagged so the wire sees the
/// raw JSON value (`"Pending"`, `1723480000000`, `null`, `[{...}]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Flags(Vec<FlaggedField>),
}

impl FieldValue {
    /// Lift an optional value, mapping `None` to the wire `null`.
    pub fn from_option<T: Into<FieldValue>>(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<FlaggedField>> for FieldValue {
    fn from(value: Vec<FlaggedField>) -> Self {
        Self::Flags(value)
    }
}

/// Who made a change: the authenticated user plus the tenant they acted for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeActor {
    pub email: String,
    pub tenant_type: TenantType,
    pub tenant_id: Uuid,
}

/// One entry in a request's append-only change log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestChange {
    /// Leaf field path: `status`, `customerInfo.<key>`, `saveOffer.<key>`, ...
    pub field: String,
    pub old_value: FieldValue,
    pub new_value: FieldValue,
    pub changed_by: ChangeActor,
    /// Epoch milliseconds. Entries from one save share one timestamp.
    pub updated_at: i64,
}

// ---------------------------------------------------------------------------
// Save offer
// ---------------------------------------------------------------------------

/// Sub-fields of an attached save offer that participate in change
/// detection. `description` is deliberately absent: edits to it are applied
/// but never logged.
pub const SAVE_OFFER_DIFF_FIELDS: &[&str] = &[
    "id",
    "title",
    "dateOffered",
    "dateAccepted",
    "dateDeclined",
    "dateConfirmed",
];

/// A retention offer attached to a cancellation request. Also serves as the
/// partial update shape: in a patch, `None` means "not mentioned".
/// Dates are epoch milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveOfferDetails {
    pub id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub date_offered: Option<i64>,
    pub date_accepted: Option<i64>,
    pub date_declined: Option<i64>,
    pub date_confirmed: Option<i64>,
}

impl SaveOfferDetails {
    /// The value of a diffable sub-field, `None` when unset here.
    fn present_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => self.id.map(|v| FieldValue::Text(v.to_string())),
            "title" => self.title.clone().map(FieldValue::Text),
            "dateOffered" => self.date_offered.map(FieldValue::Int),
            "dateAccepted" => self.date_accepted.map(FieldValue::Int),
            "dateDeclined" => self.date_declined.map(FieldValue::Int),
            "dateConfirmed" => self.date_confirmed.map(FieldValue::Int),
            _ => None,
        }
    }

    fn value_or_null(&self, field: &str) -> FieldValue {
        self.present_value(field).unwrap_or(FieldValue::Null)
    }

    /// This offer merged over by a partial update; mentioned fields win.
    pub fn merged_with(&self, patch: &SaveOfferDetails) -> SaveOfferDetails {
        SaveOfferDetails {
            id: patch.id.or(self.id),
            title: patch.title.clone().or_else(|| self.title.clone()),
            description: patch.description.clone().or_else(|| self.description.clone()),
            date_offered: patch.date_offered.or(self.date_offered),
            date_accepted: patch.date_accepted.or(self.date_accepted),
            date_declined: patch.date_declined.or(self.date_declined),
            date_confirmed: patch.date_confirmed.or(self.date_confirmed),
        }
    }

    /// Whether a patch carries enough to stand up an offer where none exists
    /// yet. A patch that only touches decision dates against a request with
    /// no offer is malformed.
    pub fn establishes_offer(&self) -> bool {
        self.id.is_some() || self.title.is_some() || self.date_offered.is_some()
    }
}

// ---------------------------------------------------------------------------
// Snapshot and patch
// ---------------------------------------------------------------------------

/// The tracked fields of a request as currently stored, in the comparison
/// units change detection works in (status enum, epoch-ms dates).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestSnapshot {
    pub status: RequestStatus,
    pub date_responded: Option<i64>,
    pub customer_info: CustomerInfo,
    pub save_offer: Option<SaveOfferDetails>,
    pub decline_reason: Option<Vec<FlaggedField>>,
    pub notes: Option<String>,
}

/// A partial request update. Fields left out of the JSON body stay `None`
/// and are untouched; `declineReason` and `notes` distinguish an explicit
/// `null` (clear) from absence via the double `Option`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestPatch {
    pub status: Option<RequestStatus>,
    pub date_responded: Option<i64>,
    pub customer_info: Option<CustomerInfo>,
    pub save_offer: Option<SaveOfferDetails>,
    #[serde(deserialize_with = "double_option")]
    pub decline_reason: Option<Option<Vec<FlaggedField>>>,
    #[serde(deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl RequestPatch {
    /// True when the body named no tracked field at all.
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.date_responded.is_none()
            && self.customer_info.is_none()
            && self.save_offer.is_none()
            && self.decline_reason.is_none()
            && self.notes.is_none()
    }
}

impl RequestSnapshot {
    /// The snapshot after applying `patch`. Mirrors `detect_changes`:
    /// `customerInfo` merges per key, the saveOffer patch merges into the
    /// current offer, `declineReason`/`notes` overwrite including explicit
    /// clearing to null.
    pub fn apply(&self, patch: &RequestPatch) -> RequestSnapshot {
        let mut next = self.clone();
        if let Some(status) = patch.status {
            next.status = status;
        }
        if let Some(ms) = patch.date_responded {
            next.date_responded = Some(ms);
        }
        if let Some(info) = &patch.customer_info {
            for (key, value) in info {
                next.customer_info.insert(key.clone(), value.clone());
            }
        }
        if let Some(offer_patch) = &patch.save_offer {
            let current = next.save_offer.take().unwrap_or_default();
            next.save_offer = Some(current.merged_with(offer_patch));
        }
        if let Some(reason) = &patch.decline_reason {
            next.decline_reason = reason.clone();
        }
        if let Some(notes) = &patch.notes {
            next.notes = notes.clone();
        }
        next
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

fn entry(
    actor: &ChangeActor,
    now_ms: i64,
    field: String,
    old_value: FieldValue,
    new_value: FieldValue,
) -> RequestChange {
    RequestChange {
        field,
        old_value,
        new_value,
        changed_by: actor.clone(),
        updated_at: now_ms,
    }
}

/// Compare a partial update against the current snapshot.
///
/// Produces one entry per differing leaf field and nothing for equal values;
/// a no-op patch yields an empty vec. `customerInfo` expands key by key over
/// the keys the patch mentions (a key missing from the current map compares
/// as null); `saveOffer` expands over `SAVE_OFFER_DIFF_FIELDS` only;
/// `declineReason` compares as one opaque list. All entries carry the same
/// actor and the same `now_ms` timestamp, which is what groups one save in
/// history views.
pub fn detect_changes(
    current: &RequestSnapshot,
    patch: &RequestPatch,
    actor: &ChangeActor,
    now_ms: i64,
) -> Vec<RequestChange> {
    let mut changes = Vec::new();

    if let Some(new_status) = patch.status {
        if new_status != current.status {
            changes.push(entry(
                actor,
                now_ms,
                STATUS_FIELD.to_string(),
                FieldValue::from(current.status.as_str()),
                FieldValue::from(new_status.as_str()),
            ));
        }
    }

    if let Some(new_ms) = patch.date_responded {
        if current.date_responded != Some(new_ms) {
            changes.push(entry(
                actor,
                now_ms,
                "dateResponded".to_string(),
                FieldValue::from_option(current.date_responded),
                FieldValue::Int(new_ms),
            ));
        }
    }

    if let Some(patch_info) = &patch.customer_info {
        for (key, new_value) in patch_info {
            let old_value = current.customer_info.get(key);
            if old_value != Some(new_value) {
                changes.push(entry(
                    actor,
                    now_ms,
                    format!("customerInfo.{key}"),
                    FieldValue::from_option(old_value.cloned()),
                    FieldValue::Text(new_value.clone()),
                ));
            }
        }
    }

    if let Some(offer_patch) = &patch.save_offer {
        for field in SAVE_OFFER_DIFF_FIELDS {
            let Some(new_value) = offer_patch.present_value(field) else {
                continue;
            };
            let old_value = current
                .save_offer
                .as_ref()
                .map(|offer| offer.value_or_null(field))
                .unwrap_or(FieldValue::Null);
            if new_value != old_value {
                changes.push(entry(
                    actor,
                    now_ms,
                    format!("saveOffer.{field}"),
                    old_value,
                    new_value,
                ));
            }
        }
    }

    if let Some(new_reason) = &patch.decline_reason {
        if *new_reason != current.decline_reason {
            changes.push(entry(
                actor,
                now_ms,
                "declineReason".to_string(),
                FieldValue::from_option(current.decline_reason.clone()),
                FieldValue::from_option(new_reason.clone()),
            ));
        }
    }

    if let Some(new_notes) = &patch.notes {
        if *new_notes != current.notes {
            changes.push(entry(
                actor,
                now_ms,
                "notes".to_string(),
                FieldValue::from_option(current.notes.clone()),
                FieldValue::from_option(new_notes.clone()),
            ));
        }
    }

    changes
}

/// The synthetic first log entry every request is born with: status moved
/// from null to the initial state, attributed to the submitting proxy user.
pub fn creation_change(actor: &ChangeActor, now_ms: i64) -> RequestChange {
    entry(
        actor,
        now_ms,
        STATUS_FIELD.to_string(),
        FieldValue::Null,
        FieldValue::from(INITIAL_STATUS.as_str()),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn actor() -> ChangeActor {
        ChangeActor {
            email: "agent@provider.io".to_string(),
            tenant_type: TenantType::Provider,
            tenant_id: Uuid::nil(),
        }
    }

    fn snapshot() -> RequestSnapshot {
        RequestSnapshot {
            status: RequestStatus::Pending,
            date_responded: None,
            customer_info: CustomerInfo::from([
                ("customerEmail".to_string(), "a@b.c".to_string()),
                ("customerName".to_string(), "Ada".to_string()),
            ]),
            save_offer: None,
            decline_reason: None,
            notes: None,
        }
    }

    #[test]
    fn no_op_patch_yields_no_changes() {
        let patch = RequestPatch {
            status: Some(RequestStatus::Pending),
            customer_info: Some(CustomerInfo::from([(
                "customerEmail".to_string(),
                "a@b.c".to_string(),
            )])),
            ..Default::default()
        };
        assert!(detect_changes(&snapshot(), &patch, &actor(), 1_000).is_empty());
    }

    #[test]
    fn status_change_records_old_and_new_wire_strings() {
        let patch = RequestPatch {
            status: Some(RequestStatus::Declined),
            ..Default::default()
        };
        let changes = detect_changes(&snapshot(), &patch, &actor(), 1_000);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "status");
        assert_eq!(changes[0].old_value, FieldValue::from("Pending"));
        assert_eq!(changes[0].new_value, FieldValue::from("Declined"));
    }

    #[test]
    fn customer_info_expands_only_differing_keys() {
        let patch = RequestPatch {
            customer_info: Some(CustomerInfo::from([
                ("customerEmail".to_string(), "new@b.c".to_string()),
                ("customerName".to_string(), "Ada".to_string()),
            ])),
            ..Default::default()
        };
        let changes = detect_changes(&snapshot(), &patch, &actor(), 1_000);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "customerInfo.customerEmail");
        assert_eq!(changes[0].old_value, FieldValue::from("a@b.c"));
        assert_eq!(changes[0].new_value, FieldValue::from("new@b.c"));
    }

    #[test]
    fn customer_info_key_missing_from_current_compares_as_null() {
        let patch = RequestPatch {
            customer_info: Some(CustomerInfo::from([(
                "accountNumber".to_string(),
                "12345".to_string(),
            )])),
            ..Default::default()
        };
        let changes = detect_changes(&snapshot(), &patch, &actor(), 1_000);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "customerInfo.accountNumber");
        assert_eq!(changes[0].old_value, FieldValue::Null);
    }

    #[test]
    fn save_offer_description_is_applied_but_never_logged() {
        let current = RequestSnapshot {
            save_offer: Some(SaveOfferDetails {
                title: Some("20% off".to_string()),
                description: Some("old copy".to_string()),
                date_offered: Some(500),
                ..Default::default()
            }),
            ..snapshot()
        };
        let patch = RequestPatch {
            save_offer: Some(SaveOfferDetails {
                description: Some("new copy".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(detect_changes(&current, &patch, &actor(), 1_000).is_empty());
        let applied = current.apply(&patch);
        assert_eq!(
            applied.save_offer.unwrap().description.as_deref(),
            Some("new copy")
        );
    }

    #[test]
    fn save_offer_sub_fields_compare_against_null_when_no_offer_exists() {
        let patch = RequestPatch {
            save_offer: Some(SaveOfferDetails {
                title: Some("20% off".to_string()),
                date_offered: Some(2_000),
                ..Default::default()
            }),
            ..Default::default()
        };
        let changes = detect_changes(&snapshot(), &patch, &actor(), 1_000);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].field, "saveOffer.title");
        assert_eq!(changes[0].old_value, FieldValue::Null);
        assert_eq!(changes[1].field, "saveOffer.dateOffered");
        assert_eq!(changes[1].new_value, FieldValue::Int(2_000));
    }

    #[test]
    fn unchanged_save_offer_sub_fields_stay_silent() {
        let current = RequestSnapshot {
            save_offer: Some(SaveOfferDetails {
                title: Some("20% off".to_string()),
                date_offered: Some(500),
                ..Default::default()
            }),
            ..snapshot()
        };
        let patch = RequestPatch {
            save_offer: Some(SaveOfferDetails {
                title: Some("20% off".to_string()),
                date_accepted: Some(900),
                ..Default::default()
            }),
            ..Default::default()
        };
        let changes = detect_changes(&current, &patch, &actor(), 1_000);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "saveOffer.dateAccepted");
    }

    #[test]
    fn stray_save_offer_keys_are_dropped_at_the_boundary() {
        let patch: RequestPatch = serde_json::from_value(json!({
            "saveOffer": { "title": "20% off", "internalRating": 5 }
        }))
        .unwrap();
        let changes = detect_changes(&snapshot(), &patch, &actor(), 1_000);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "saveOffer.title");
    }

    #[test]
    fn decline_reason_compares_as_one_opaque_list() {
        let current = RequestSnapshot {
            decline_reason: Some(vec![FlaggedField {
                field: "customerEmail".to_string(),
                value: "a@b.c".to_string(),
            }]),
            ..snapshot()
        };
        let patch = RequestPatch {
            decline_reason: Some(Some(vec![
                FlaggedField {
                    field: "customerEmail".to_string(),
                    value: "a@b.c".to_string(),
                },
                FlaggedField {
                    field: "accountNumber".to_string(),
                    value: "999".to_string(),
                },
            ])),
            ..Default::default()
        };
        let changes = detect_changes(&current, &patch, &actor(), 1_000);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "declineReason");
        assert!(matches!(changes[0].old_value, FieldValue::Flags(ref f) if f.len() == 1));
        assert!(matches!(changes[0].new_value, FieldValue::Flags(ref f) if f.len() == 2));
    }

    #[test]
    fn clearing_decline_reason_emits_null_new_value() {
        let current = RequestSnapshot {
            decline_reason: Some(vec![FlaggedField {
                field: "customerEmail".to_string(),
                value: "a@b.c".to_string(),
            }]),
            ..snapshot()
        };
        let patch = RequestPatch {
            decline_reason: Some(None),
            ..Default::default()
        };
        let changes = detect_changes(&current, &patch, &actor(), 1_000);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].new_value, FieldValue::Null);
    }

    #[test]
    fn one_save_shares_actor_and_timestamp_with_status_first() {
        let patch = RequestPatch {
            status: Some(RequestStatus::Declined),
            decline_reason: Some(Some(vec![FlaggedField {
                field: "customerEmail".to_string(),
                value: "a@b.c".to_string(),
            }])),
            ..Default::default()
        };
        let changes = detect_changes(&snapshot(), &patch, &actor(), 42_000);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].field, "status");
        assert_eq!(changes[1].field, "declineReason");
        for change in &changes {
            assert_eq!(change.updated_at, 42_000);
            assert_eq!(change.changed_by, actor());
        }
    }

    #[test]
    fn change_entry_wire_shape_is_camel_case_with_raw_values() {
        let change = creation_change(&actor(), 1_723_480_000_000);
        let value = serde_json::to_value(&change).unwrap();
        assert_eq!(
            value,
            json!({
                "field": "status",
                "oldValue": null,
                "newValue": "Pending",
                "changedBy": {
                    "email": "agent@provider.io",
                    "tenantType": "provider",
                    "tenantId": "00000000-0000-0000-0000-000000000000"
                },
                "updatedAt": 1_723_480_000_000_i64
            })
        );
    }

    #[test]
    fn patch_distinguishes_absent_from_explicit_null() {
        let absent: RequestPatch = serde_json::from_value(json!({})).unwrap();
        assert!(absent.decline_reason.is_none());
        assert!(absent.is_empty());

        let cleared: RequestPatch =
            serde_json::from_value(json!({ "declineReason": null })).unwrap();
        assert_eq!(cleared.decline_reason, Some(None));
        assert!(!cleared.is_empty());
    }

    #[test]
    fn apply_merges_sparse_maps_and_offers() {
        let current = RequestSnapshot {
            save_offer: Some(SaveOfferDetails {
                title: Some("20% off".to_string()),
                description: Some("keep me".to_string()),
                date_offered: Some(500),
                ..Default::default()
            }),
            ..snapshot()
        };
        let patch = RequestPatch {
            status: Some(RequestStatus::SaveAccepted),
            customer_info: Some(CustomerInfo::from([(
                "accountNumber".to_string(),
                "12345".to_string(),
            )])),
            save_offer: Some(SaveOfferDetails {
                date_accepted: Some(900),
                ..Default::default()
            }),
            ..Default::default()
        };
        let next = current.apply(&patch);
        assert_eq!(next.status, RequestStatus::SaveAccepted);
        assert_eq!(next.customer_info.len(), 3);
        assert_eq!(next.customer_info["customerEmail"], "a@b.c");
        let offer = next.save_offer.unwrap();
        assert_eq!(offer.title.as_deref(), Some("20% off"));
        assert_eq!(offer.description.as_deref(), Some("keep me"));
        assert_eq!(offer.date_accepted, Some(900));
    }
}
