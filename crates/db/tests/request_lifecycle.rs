//! Integration tests for the request pipelines against a real database:
//! - Batch creation with seeded logs, all-or-nothing
//! - Patch application: change detection, log append, metrics, resolution
//! - Transition and authorization rejections before any write
//! - Bulk purge

use assert_matches::assert_matches;
use proxylink_core::{
    ChangeActor, CoreError, CustomerInfo, FieldValue, RequestStatus, RequestType, TenantType,
};
use sqlx::PgPool;
use uuid::Uuid;
use proxylink_db::models::request::{CreateRequest, RequestQuery};
use proxylink_db::models::tenant::{CreateTenant, Tenant};
use proxylink_db::repositories::{RequestLogRepo, RequestRepo, TenantRepo};
use proxylink_db::StoreError;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn make_tenant(pool: &PgPool, name: &str, tenant_type: TenantType) -> Tenant {
    let fields = match tenant_type {
        TenantType::Provider => Some(vec![
            "customerName".to_string(),
            "customerEmail".to_string(),
            "accountNumber".to_string(),
        ]),
        _ => None,
    };
    TenantRepo::create(
        pool,
        &CreateTenant {
            name: name.to_string(),
            tenant_type,
            required_customer_fields: fields,
        },
    )
    .await
    .unwrap()
}

fn actor_for(tenant: &Tenant, email: &str) -> ChangeActor {
    ChangeActor {
        email: email.to_string(),
        tenant_type: tenant.tenant_type.parse().unwrap(),
        tenant_id: tenant.id,
    }
}

fn new_request(provider_tenant_id: Uuid, email: &str) -> CreateRequest {
    CreateRequest {
        request_type: RequestType::Cancellation,
        provider_tenant_id,
        customer_info: CustomerInfo::from([
            ("customerEmail".to_string(), email.to_string()),
            ("customerName".to_string(), "Ada Lovelace".to_string()),
        ]),
        notes: None,
    }
}

fn patch(json: serde_json::Value) -> proxylink_core::RequestPatch {
    serde_json::from_value(json).unwrap()
}

// ---------------------------------------------------------------------------
// Test: batch creation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_creation_seeds_the_log(pool: PgPool) {
    let proxy = make_tenant(&pool, "Assistant Co", TenantType::Proxy).await;
    let provider = make_tenant(&pool, "Streamline", TenantType::Provider).await;
    let submitter = actor_for(&proxy, "agent@assistant.io");

    let created = RequestRepo::create_batch(
        &pool,
        &submitter,
        &[new_request(provider.id, "ada@customer.io")],
    )
    .await
    .unwrap();
    assert_eq!(created.len(), 1);

    let request = &created[0];
    assert_eq!(request.status, "Pending");
    assert_eq!(request.version, 1);
    assert_eq!(request.proxy_tenant_id, proxy.id);
    assert_eq!(request.participants.0.proxy, vec!["agent@assistant.io"]);
    assert!(request.participants.0.provider.is_empty());

    let log = RequestLogRepo::find_by_request(&pool, request.id)
        .await
        .unwrap()
        .expect("log created with the request");
    assert_eq!(log.id, request.log_id);
    assert_eq!(log.changes.0.len(), 1);

    let seed = &log.changes.0[0];
    assert_eq!(seed.field, "status");
    assert_eq!(seed.old_value, FieldValue::Null);
    assert_eq!(seed.new_value, FieldValue::from("Pending"));
    assert_eq!(seed.changed_by.email, "agent@assistant.io");

    assert_eq!(log.avg_response_time.0.provider.ms, 0.0);
    assert_eq!(log.avg_response_time.0.proxy.ms, 0.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_batch_is_all_or_nothing(pool: PgPool) {
    let proxy = make_tenant(&pool, "Assistant Co", TenantType::Proxy).await;
    let provider = make_tenant(&pool, "Streamline", TenantType::Provider).await;
    let submitter = actor_for(&proxy, "agent@assistant.io");

    let mut bad = new_request(provider.id, "bob@customer.io");
    bad.customer_info
        .insert("shoeSize".to_string(), "42".to_string());

    let result = RequestRepo::create_batch(
        &pool,
        &submitter,
        &[new_request(provider.id, "ada@customer.io"), bad],
    )
    .await;
    assert_matches!(result, Err(StoreError::Core(CoreError::Validation(_))));

    let remaining = RequestRepo::list(&pool, &RequestQuery::default())
        .await
        .unwrap();
    assert!(remaining.is_empty(), "failed batch must leave no rows");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_empty_batch_is_rejected(pool: PgPool) {
    let proxy = make_tenant(&pool, "Assistant Co", TenantType::Proxy).await;
    let submitter = actor_for(&proxy, "agent@assistant.io");

    let result = RequestRepo::create_batch(&pool, &submitter, &[]).await;
    assert_matches!(result, Err(StoreError::Core(CoreError::Validation(_))));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_creation_rejects_non_provider_target(pool: PgPool) {
    let proxy = make_tenant(&pool, "Assistant Co", TenantType::Proxy).await;
    let other_proxy = make_tenant(&pool, "Other Assistant", TenantType::Proxy).await;
    let submitter = actor_for(&proxy, "agent@assistant.io");

    let result = RequestRepo::create_batch(
        &pool,
        &submitter,
        &[new_request(other_proxy.id, "ada@customer.io")],
    )
    .await;
    assert_matches!(result, Err(StoreError::Core(CoreError::Validation(_))));
}

// ---------------------------------------------------------------------------
// Test: the decline / recovery loop
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_decline_with_reason_then_recovery(pool: PgPool) {
    let proxy = make_tenant(&pool, "Assistant Co", TenantType::Proxy).await;
    let provider = make_tenant(&pool, "Streamline", TenantType::Provider).await;
    let submitter = actor_for(&proxy, "agent@assistant.io");
    let responder = actor_for(&provider, "support@streamline.io");

    let created = RequestRepo::create_batch(
        &pool,
        &submitter,
        &[new_request(provider.id, "ada@customer.io")],
    )
    .await
    .unwrap();
    let id = created[0].id;

    // Provider declines citing a wrong email.
    let outcome = RequestRepo::apply_update(
        &pool,
        id,
        &responder,
        &patch(serde_json::json!({
            "status": "Declined",
            "declineReason": [{ "field": "customerEmail", "value": "ada@customer.io" }]
        })),
    )
    .await
    .unwrap();

    assert_eq!(outcome.request.status, "Declined");
    assert_eq!(outcome.request.resolved, Some(false));
    assert_eq!(outcome.appended.len(), 2);
    assert_eq!(outcome.appended[0].field, "status");
    assert_eq!(outcome.appended[1].field, "declineReason");
    // Seed -> decline is the provider's first response sample.
    assert!(outcome.avg_response_time.provider.ms >= 0.0);
    assert_eq!(outcome.avg_response_time.proxy.ms, 0.0);
    assert_eq!(
        outcome.request.participants.0.provider,
        vec!["support@streamline.io"]
    );

    // Proxy corrects the email and resubmits.
    let outcome = RequestRepo::apply_update(
        &pool,
        id,
        &submitter,
        &patch(serde_json::json!({
            "status": "Pending",
            "customerInfo": {
                "customerName": "Ada Lovelace",
                "customerEmail": "ada.lovelace@customer.io"
            },
            "declineReason": null
        })),
    )
    .await
    .unwrap();

    assert_eq!(outcome.request.status, "Pending");
    assert_eq!(outcome.request.resolved, None);
    assert!(outcome.request.decline_reason.is_none());
    assert_eq!(outcome.appended.len(), 3);
    assert_eq!(outcome.appended[0].field, "status");
    assert_eq!(outcome.appended[1].field, "customerInfo.customerEmail");
    assert_eq!(outcome.appended[2].field, "declineReason");
    assert_eq!(outcome.appended[2].new_value, FieldValue::Null);

    // The log holds the full history: seed + 2 + 3.
    let log = RequestLogRepo::find_by_request(&pool, id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(log.changes.0.len(), 6);
    // Both sides have exactly one response sample now.
    assert!(log.avg_response_time.0.proxy.ms >= 0.0);
}

// ---------------------------------------------------------------------------
// Test: save offer flow
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_save_offer_round_trip(pool: PgPool) {
    let proxy = make_tenant(&pool, "Assistant Co", TenantType::Proxy).await;
    let provider = make_tenant(&pool, "Streamline", TenantType::Provider).await;
    let submitter = actor_for(&proxy, "agent@assistant.io");
    let responder = actor_for(&provider, "support@streamline.io");

    let created = RequestRepo::create_batch(
        &pool,
        &submitter,
        &[new_request(provider.id, "ada@customer.io")],
    )
    .await
    .unwrap();
    let id = created[0].id;
    let offer_id = Uuid::new_v4();

    // Provider answers the cancellation with a retention offer.
    let outcome = RequestRepo::apply_update(
        &pool,
        id,
        &responder,
        &patch(serde_json::json!({
            "status": "Save Offered",
            "saveOffer": {
                "id": offer_id,
                "title": "20% off for 3 months",
                "description": "Keep your plan at a discount",
                "dateOffered": 1_723_480_000_000_i64
            }
        })),
    )
    .await
    .unwrap();

    // description is applied but not logged.
    assert_eq!(outcome.appended.len(), 4);
    let fields: Vec<&str> = outcome.appended.iter().map(|c| c.field.as_str()).collect();
    assert_eq!(
        fields,
        vec!["status", "saveOffer.id", "saveOffer.title", "saveOffer.dateOffered"]
    );

    // Proxy accepts; the stored offer keeps its earlier fields.
    let outcome = RequestRepo::apply_update(
        &pool,
        id,
        &submitter,
        &patch(serde_json::json!({
            "status": "Save Accepted",
            "saveOffer": { "dateAccepted": 1_723_490_000_000_i64 }
        })),
    )
    .await
    .unwrap();

    assert_eq!(outcome.request.status, "Save Accepted");
    let offer = outcome.request.save_offer.as_ref().unwrap();
    assert_eq!(offer.0.title.as_deref(), Some("20% off for 3 months"));
    assert_eq!(offer.0.date_offered, Some(1_723_480_000_000));
    assert_eq!(offer.0.date_accepted, Some(1_723_490_000_000));

    let log = RequestLogRepo::find_by_request(&pool, id)
        .await
        .unwrap()
        .unwrap();
    // Seed + offer save (4) + acceptance (2).
    assert_eq!(log.changes.0.len(), 7);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_save_offer_patch_needs_an_offer_to_modify(pool: PgPool) {
    let proxy = make_tenant(&pool, "Assistant Co", TenantType::Proxy).await;
    let provider = make_tenant(&pool, "Streamline", TenantType::Provider).await;
    let submitter = actor_for(&proxy, "agent@assistant.io");

    let created = RequestRepo::create_batch(
        &pool,
        &submitter,
        &[new_request(provider.id, "ada@customer.io")],
    )
    .await
    .unwrap();
    let id = created[0].id;

    let result = RequestRepo::apply_update(
        &pool,
        id,
        &submitter,
        &patch(serde_json::json!({
            "saveOffer": { "dateAccepted": 1_723_490_000_000_i64 }
        })),
    )
    .await;
    assert_matches!(result, Err(StoreError::Core(CoreError::Validation(_))));

    // Rejected before any write.
    let log = RequestLogRepo::find_by_request(&pool, id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(log.changes.0.len(), 1);
}

// ---------------------------------------------------------------------------
// Test: rejections happen before any write
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_transition_is_rejected_untouched(pool: PgPool) {
    let proxy = make_tenant(&pool, "Assistant Co", TenantType::Proxy).await;
    let provider = make_tenant(&pool, "Streamline", TenantType::Provider).await;
    let submitter = actor_for(&proxy, "agent@assistant.io");
    let responder = actor_for(&provider, "support@streamline.io");

    let created = RequestRepo::create_batch(
        &pool,
        &submitter,
        &[new_request(provider.id, "ada@customer.io")],
    )
    .await
    .unwrap();
    let id = created[0].id;

    // Pending -> Save Confirmed skips the offer/acceptance steps.
    let result = RequestRepo::apply_update(
        &pool,
        id,
        &responder,
        &patch(serde_json::json!({ "status": "Save Confirmed" })),
    )
    .await;
    assert_matches!(
        result,
        Err(StoreError::Core(CoreError::InvalidTransition {
            from: RequestStatus::Pending,
            to: RequestStatus::SaveConfirmed,
            ..
        }))
    );

    let request = RequestRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(request.status, "Pending");
    let log = RequestLogRepo::find_by_request(&pool, id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(log.changes.0.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_management_cannot_drive_status(pool: PgPool) {
    let proxy = make_tenant(&pool, "Assistant Co", TenantType::Proxy).await;
    let provider = make_tenant(&pool, "Streamline", TenantType::Provider).await;
    let management = make_tenant(&pool, "Platform Ops", TenantType::Management).await;
    let submitter = actor_for(&proxy, "agent@assistant.io");
    let admin = actor_for(&management, "admin@platform.io");

    let created = RequestRepo::create_batch(
        &pool,
        &submitter,
        &[new_request(provider.id, "ada@customer.io")],
    )
    .await
    .unwrap();

    let result = RequestRepo::apply_update(
        &pool,
        created[0].id,
        &admin,
        &patch(serde_json::json!({ "status": "Canceled" })),
    )
    .await;
    assert_matches!(
        result,
        Err(StoreError::Core(CoreError::InvalidTransition { .. }))
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_foreign_tenant_is_forbidden(pool: PgPool) {
    let proxy = make_tenant(&pool, "Assistant Co", TenantType::Proxy).await;
    let provider = make_tenant(&pool, "Streamline", TenantType::Provider).await;
    let outsider = make_tenant(&pool, "Rival Provider", TenantType::Provider).await;
    let submitter = actor_for(&proxy, "agent@assistant.io");
    let rival = actor_for(&outsider, "support@rival.io");

    let created = RequestRepo::create_batch(
        &pool,
        &submitter,
        &[new_request(provider.id, "ada@customer.io")],
    )
    .await
    .unwrap();

    let result = RequestRepo::apply_update(
        &pool,
        created[0].id,
        &rival,
        &patch(serde_json::json!({ "status": "Declined" })),
    )
    .await;
    assert_matches!(result, Err(StoreError::Core(CoreError::Forbidden(_))));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_no_op_patch_writes_nothing(pool: PgPool) {
    let proxy = make_tenant(&pool, "Assistant Co", TenantType::Proxy).await;
    let provider = make_tenant(&pool, "Streamline", TenantType::Provider).await;
    let submitter = actor_for(&proxy, "agent@assistant.io");

    let created = RequestRepo::create_batch(
        &pool,
        &submitter,
        &[new_request(provider.id, "ada@customer.io")],
    )
    .await
    .unwrap();
    let id = created[0].id;

    let outcome = RequestRepo::apply_update(
        &pool,
        id,
        &submitter,
        &patch(serde_json::json!({
            "customerInfo": {
                "customerName": "Ada Lovelace",
                "customerEmail": "ada@customer.io"
            }
        })),
    )
    .await
    .unwrap();

    assert!(outcome.appended.is_empty());
    let log = RequestLogRepo::find_by_request(&pool, id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(log.changes.0.len(), 1, "no-op must not append");
}

// ---------------------------------------------------------------------------
// Test: listing and purge
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_filters_by_tenant_status_and_type(pool: PgPool) {
    let proxy = make_tenant(&pool, "Assistant Co", TenantType::Proxy).await;
    let provider = make_tenant(&pool, "Streamline", TenantType::Provider).await;
    let other_provider = make_tenant(&pool, "Altitude", TenantType::Provider).await;
    let submitter = actor_for(&proxy, "agent@assistant.io");
    let responder = actor_for(&provider, "support@streamline.io");

    let mut discount = new_request(provider.id, "ada@customer.io");
    discount.request_type = RequestType::Discount;

    let created = RequestRepo::create_batch(
        &pool,
        &submitter,
        &[
            new_request(provider.id, "ada@customer.io"),
            discount,
            new_request(other_provider.id, "bob@customer.io"),
        ],
    )
    .await
    .unwrap();

    RequestRepo::apply_update(
        &pool,
        created[0].id,
        &responder,
        &patch(serde_json::json!({ "status": "Declined" })),
    )
    .await
    .unwrap();

    let for_provider = RequestRepo::list(
        &pool,
        &RequestQuery {
            tenant_id: Some(provider.id),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(for_provider.len(), 2);

    let declined = RequestRepo::list(
        &pool,
        &RequestQuery {
            tenant_id: Some(provider.id),
            status: Some(RequestStatus::Declined),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(declined.len(), 1);
    assert_eq!(declined[0].id, created[0].id);

    let discounts = RequestRepo::list(
        &pool,
        &RequestQuery {
            request_type: Some(RequestType::Discount),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(discounts.len(), 1);

    let paged = RequestRepo::list(
        &pool,
        &RequestQuery {
            limit: Some(2),
            offset: Some(2),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(paged.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_purge_tenant_cascades_to_logs(pool: PgPool) {
    let proxy = make_tenant(&pool, "Assistant Co", TenantType::Proxy).await;
    let provider = make_tenant(&pool, "Streamline", TenantType::Provider).await;
    let submitter = actor_for(&proxy, "agent@assistant.io");

    let created = RequestRepo::create_batch(
        &pool,
        &submitter,
        &[
            new_request(provider.id, "ada@customer.io"),
            new_request(provider.id, "bob@customer.io"),
        ],
    )
    .await
    .unwrap();

    let purged = RequestRepo::purge_tenant(&pool, provider.id).await.unwrap();
    assert_eq!(purged, 2);

    for request in &created {
        assert!(RequestRepo::find_by_id(&pool, request.id)
            .await
            .unwrap()
            .is_none());
        assert!(RequestLogRepo::find_by_request(&pool, request.id)
            .await
            .unwrap()
            .is_none());
    }
}
