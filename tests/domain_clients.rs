//! Integration tests for the payments, subscriptions and GraphQL sub-clients.
//!
//! Every test runs against an in-memory `Transport` that serves canned JSON
//! per route and records each request it receives.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use daisy_sdk::domain::subscriptions::SubscriptionLookup;
use daisy_sdk::eip712::schema::{DAISY_TYPES, SUBSCRIPTION_TYPE};
use daisy_sdk::eip712::{encode, Domain};
use daisy_sdk::error::{HttpError, SdkError};
use daisy_sdk::http::{HttpRequest, Method, RawResponse, Transport};
use daisy_sdk::prelude::*;

const BASE: &str = "https://sdk.test";
const CONTRACT: &str = "0x6FB3222E6134892a622D3990E3C94D75FF772b18";
const TOKEN: &str = "0x2E6C7C6F3c1c3d4a4bA3d7F8E5C0a2b2a8E6C1d4";
const PLAN_ON_CHAIN_ID: &str = "0x4b5d2e2e8f6a4c1f9b3e0d7a6c5b4a3928171615141312111009080706050403";
const SUBSCRIBER_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
const AUTHORIZER_KEY: &str = "0xc85ef7d79691fe79573b1a7064c19c1a9819ebdbd1faaab1a8ec92344438aaf4";

// ─── Mock backend ────────────────────────────────────────────────────────────

struct Route {
    method: Method,
    path: &'static str,
    status: u16,
    body: Value,
}

#[derive(Default)]
struct MockBackend {
    routes: Vec<Route>,
    log: Mutex<Vec<HttpRequest>>,
}

impl MockBackend {
    fn route(mut self, method: Method, path: &'static str, status: u16, body: Value) -> Self {
        self.routes.push(Route {
            method,
            path,
            status,
            body,
        });
        self
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockBackend {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse, HttpError> {
        self.log.lock().unwrap().push(request.clone());

        let rest = request.url.strip_prefix(BASE).unwrap_or(&request.url);
        let path = rest.split('?').next().unwrap_or(rest);
        let (status, body) = self
            .routes
            .iter()
            .find(|r| r.method == request.method && r.path == path)
            .map(|r| (r.status, r.body.clone()))
            .unwrap_or((404, json!({ "message": "not found" })));

        Ok(RawResponse {
            status,
            status_text: if status < 300 { "OK" } else { "Error" }.to_string(),
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: body.to_string(),
        })
    }
}

fn client(backend: &Arc<MockBackend>) -> DaisyClient {
    DaisyClient::builder()
        .base_url(BASE)
        .credentials(Credentials::with_secret("manager-1", "s3cret").unwrap())
        .transport(backend.clone())
        .build()
        .unwrap()
}

fn manager_body() -> Value {
    json!({
        "data": {
            "identifier": "manager-1",
            "name": "Acme",
            "networkId": 4,
            "address": CONTRACT,
            "tokenAddress": TOKEN,
            "walletAddress": "0x9E3eF4F1f36d5CF1e4E7F4d6f0A9E1b8D0a3C2b1",
            "plans": [{
                "id": "plan-1",
                "name": "Monthly",
                "onChainId": PLAN_ON_CHAIN_ID,
                "price": "1000000",
                "periods": 1,
                "periodUnit": "MONTH",
                "maxExecutions": 12,
                "private": false
            }]
        }
    })
}

fn invoice_body(state: &str) -> Value {
    json!({
        "id": "inv-1",
        "identifier": "inv-1",
        "state": state,
        "address": "0x1111111111111111111111111111111111111111",
        "invoicedPrice": "1000000",
        "invoicedEmail": "buyer@example.com"
    })
}

// ─── Payments ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_invoice_without_price_makes_no_request() {
    let backend = Arc::new(MockBackend::default());
    let client = client(&backend);

    let err = client
        .payments()
        .create_invoice(CreateInvoice::default().email("buyer@example.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, SdkError::Validation(_)));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_create_invoice_posts_normalized_price() {
    let backend = Arc::new(MockBackend::default().route(
        Method::Post,
        "/otp/",
        201,
        json!({ "data": invoice_body("PENDING") }),
    ));
    let client = client(&backend);

    let invoice = client
        .payments()
        .create_invoice(CreateInvoice::new("0xf4240").email("buyer@example.com"))
        .await
        .unwrap();
    assert_eq!(invoice.state, InvoiceState::Pending);
    assert_eq!(invoice.invoiced_price.as_str(), "1000000");

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    let sent: Value = serde_json::from_str(requests[0].body.as_deref().unwrap()).unwrap();
    assert_eq!(
        sent,
        json!({ "invoicedPrice": "1000000", "invoicedEmail": "buyer@example.com" })
    );
    assert_eq!(
        requests[0].header("authorization"),
        Some(client.credentials().basic_auth_header().as_str())
    );
}

#[tokio::test]
async fn test_invoice_queries_hit_expected_paths() {
    let backend = Arc::new(
        MockBackend::default()
            .route(
                Method::Get,
                "/otp/invoices/",
                200,
                json!({ "data": [invoice_body("PAID")] }),
            )
            .route(
                Method::Get,
                "/otp/invoices/address/0x1111111111111111111111111111111111111111/receipts/",
                200,
                json!({ "data": [{ "id": "r1", "txHash": "0xabc", "amount": 1000000 }] }),
            ),
    );
    let client = client(&backend);

    let invoices = client
        .payments()
        .get_invoices(&InvoiceFilter::default().state(InvoiceState::Paid))
        .await
        .unwrap();
    assert_eq!(invoices.len(), 1);
    assert_eq!(invoices[0].state, InvoiceState::Paid);

    let receipts = client
        .payments()
        .get_receipts(&InvoiceLookup::Address(
            "0x1111111111111111111111111111111111111111".into(),
        ))
        .await
        .unwrap();
    assert_eq!(receipts[0].amount.as_ref().map(|a| a.as_str()), Some("1000000"));

    let requests = backend.requests();
    assert_eq!(requests[0].url, format!("{}/otp/invoices/?state=PAID", BASE));
    assert_eq!(requests[0].method, Method::Get);
    assert!(requests[0].body.is_none());
}

#[tokio::test]
async fn test_empty_invoice_lookup_rejected_locally() {
    let backend = Arc::new(MockBackend::default());
    let client = client(&backend);

    let err = client
        .payments()
        .get_invoice(&InvoiceLookup::Identifier(String::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::Validation(_)));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_payments_sync_caches_group() {
    let backend = Arc::new(MockBackend::default().route(
        Method::Get,
        "/otp/",
        200,
        json!({ "data": { "name": "Shop", "tokenAddress": TOKEN, "walletAddress": CONTRACT } }),
    ));
    let client = client(&backend);

    assert!(client.payments().manager().await.is_none());
    let group = client.payments().sync().await.unwrap();
    assert_eq!(client.payments().manager().await, Some(group));

    client.clear_cache().await;
    assert!(client.payments().manager().await.is_none());
}

// ─── Subscriptions ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_sign_subscription_recovers_to_signer() {
    let backend = Arc::new(MockBackend::default().route(Method::Get, "/", 200, manager_body()));
    let client = client(&backend);

    let manager = client.subscriptions().sync().await.unwrap();
    let plan = manager.plan("plan-1").cloned().unwrap();
    let local = LocalSigner::from_hex(SUBSCRIBER_KEY).unwrap();
    let expected = local.address();
    let signer = Signer::from(local);

    let signed = client
        .subscriptions()
        .sign_subscription(&signer, &plan, SubscriptionOptions::default())
        .await
        .unwrap();

    // Cached manager: no second GET.
    assert_eq!(backend.requests().len(), 1);

    let agreement = &signed.agreement;
    assert_eq!(agreement.subscriber, signer.address());
    assert_eq!(agreement.token, TOKEN);
    assert_eq!(agreement.price, "1000000");
    assert_eq!(agreement.periods, "1");
    assert_eq!(agreement.period_unit, "MONTH");
    assert_eq!(agreement.max_executions, "12");
    assert_eq!(agreement.plan, PLAN_ON_CHAIN_ID);
    assert_eq!(agreement.nonce.len(), 66);

    let envelope = encode(
        DAISY_TYPES.clone(),
        Domain::new(CONTRACT),
        SUBSCRIPTION_TYPE,
        agreement.to_message(),
    )
    .unwrap();
    assert_eq!(
        recover_typed_data_signer(&envelope, &signed.signature).unwrap(),
        expected
    );
}

#[tokio::test]
async fn test_authorize_any_address_uses_zero_subscriber() {
    let backend = Arc::new(MockBackend::default().route(Method::Get, "/", 200, manager_body()));
    let client = client(&backend);

    let manager = client.subscriptions().get_data().await.unwrap();
    let plan = manager.plan("plan-1").unwrap();
    let agreement = SubscriptionAgreement::for_plan(
        &manager,
        plan,
        "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826",
        SubscriptionOptions::default(),
    )
    .unwrap();

    let authorizer = LocalSigner::from_hex(AUTHORIZER_KEY).unwrap();
    let signature = client
        .subscriptions()
        .authorize(
            &authorizer,
            &agreement,
            AuthorizeOptions {
                allow_any_address: true,
            },
        )
        .await
        .unwrap();

    // `authorize` always refreshes the manager.
    assert_eq!(backend.requests().len(), 2);

    let signed_message = agreement.for_any_subscriber();
    assert_eq!(signed_message.subscriber, ZERO_ADDRESS);
    let envelope = encode(
        DAISY_TYPES.clone(),
        Domain::new(CONTRACT),
        SUBSCRIPTION_TYPE,
        signed_message.to_message(),
    )
    .unwrap();
    assert_eq!(
        recover_typed_data_signer(&envelope, &signature).unwrap(),
        authorizer.address()
    );
}

#[tokio::test]
async fn test_sign_without_deployed_contract_fails() {
    let backend = Arc::new(MockBackend::default().route(
        Method::Get,
        "/",
        200,
        json!({ "data": { "name": "Draft", "plans": [] } }),
    ));
    let client = client(&backend);
    let signer = Signer::from(LocalSigner::random());
    let subscription: Subscription = serde_json::from_value(json!({
        "daisyId": "sub-1",
        "account": signer.address(),
        "onChainId": "0x01",
        "state": "ACTIVE"
    }))
    .unwrap();

    let err = client
        .subscriptions()
        .sign_cancel(&signer, &subscription, CancelOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::Validation(_)));
}

#[tokio::test]
async fn test_submit_returns_response_body() {
    let backend = Arc::new(MockBackend::default().route(
        Method::Post,
        "/subscriptions/",
        201,
        json!({ "data": { "daisyId": "sub-1", "state": "PENDING" } }),
    ));
    let client = client(&backend);

    let submission = Submission::from(SignedAgreement {
        agreement: SubscriptionAgreement {
            subscriber: "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826".into(),
            token: TOKEN.into(),
            price: "1000000".into(),
            periods: "1".into(),
            period_unit: "MONTH".into(),
            max_executions: "12".into(),
            signature_expires_at: "1700000000".into(),
            plan: PLAN_ON_CHAIN_ID.into(),
            nonce: "0x01".into(),
        },
        signature: "0xsig".into(),
    })
    .with_auth_signature("0xauth");

    let body = client.subscriptions().submit(&submission).await.unwrap();
    assert_eq!(body["data"]["state"], "PENDING");

    let requests = backend.requests();
    let sent: Value = serde_json::from_str(requests[0].body.as_deref().unwrap()).unwrap();
    assert_eq!(sent["signature"], "0xsig");
    assert_eq!(sent["authSignature"], "0xauth");
    assert_eq!(sent["agreement"]["periodUnit"], "MONTH");
    assert!(sent.get("receipt").is_none());
}

#[tokio::test]
async fn test_subscription_lookup_by_on_chain_id() {
    let backend = Arc::new(MockBackend::default().route(
        Method::Get,
        "/subscriptions/hash/0x01/",
        200,
        json!({ "data": { "daisyId": "sub-1", "account": "0xabc", "state": "NOT_ENOUGH_FUNDS" } }),
    ));
    let client = client(&backend);

    let subscription = client
        .subscriptions()
        .get_subscription(&SubscriptionLookup::OnChainId("0x01".into()))
        .await
        .unwrap()
        .expect("subscription should be found");
    assert_eq!(subscription.state, SubscriptionState::NotEnoughFunds);
}

#[tokio::test]
async fn test_single_lookups_return_none_when_missing() {
    let backend = Arc::new(
        MockBackend::default()
            .route(
                Method::Get,
                "/subscriptions/sub-missing/",
                200,
                json!({ "data": null }),
            )
            .route(
                Method::Get,
                "/otp/invoices/inv-missing/",
                200,
                json!({ "data": null }),
            ),
    );
    let client = client(&backend);

    let subscription = client
        .subscriptions()
        .get_subscription(&SubscriptionLookup::DaisyId("sub-missing".into()))
        .await
        .unwrap();
    assert!(subscription.is_none());

    let invoice = client
        .payments()
        .get_invoice(&InvoiceLookup::Identifier("inv-missing".into()))
        .await
        .unwrap();
    assert!(invoice.is_none());
    assert_eq!(backend.requests().len(), 2);
}

#[tokio::test]
async fn test_create_invitation() {
    let backend = Arc::new(MockBackend::default().route(
        Method::Post,
        "/plans/plan-1/invitations/",
        201,
        json!({ "data": {
            "identifier": "inv-abc",
            "maxUsages": 5,
            "active": true,
            "shareURL": "https://app.daisypayments.com/i/inv-abc"
        } }),
    ));
    let client = client(&backend);

    let err = client
        .subscriptions()
        .create_invitation("", InvitationParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::Validation(_)));
    assert!(backend.requests().is_empty());

    let invitation = client
        .subscriptions()
        .create_invitation(
            "plan-1",
            InvitationParams {
                max_usages: 5,
                callback_url: Some("https://shop.example/cb".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(invitation.identifier, "inv-abc");
    assert_eq!(
        invitation.share_url.as_deref(),
        Some("https://app.daisypayments.com/i/inv-abc")
    );

    let sent: Value =
        serde_json::from_str(backend.requests()[0].body.as_deref().unwrap()).unwrap();
    assert_eq!(
        sent,
        json!({
            "maxUsages": 5,
            "active": true,
            "callbackExtra": {},
            "callbackURL": "https://shop.example/cb"
        })
    );
}

#[tokio::test]
async fn test_api_error_carries_status_and_message() {
    let backend = Arc::new(MockBackend::default().route(
        Method::Get,
        "/subscriptions/",
        403,
        json!({ "message": "Invalid credentials" }),
    ));
    let client = client(&backend);

    let err = client
        .subscriptions()
        .get_subscriptions(&SubscriptionFilter::default())
        .await
        .unwrap_err();
    match &err {
        SdkError::Http(http) => assert_eq!(http.status(), Some(403)),
        other => panic!("expected HTTP error, got {other:?}"),
    }
    assert_eq!(err.to_string(), "HTTP error: Invalid credentials");
    assert_eq!(err.api_body().unwrap()["message"], "Invalid credentials");
}

// ─── GraphQL ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_graphql_data_and_errors() {
    let backend = Arc::new(MockBackend::default().route(
        Method::Post,
        "/graphql",
        200,
        json!({ "data": { "plans": [{ "id": "plan-1" }] } }),
    ));
    let client = client(&backend);

    let data = client
        .graphql()
        .query("{ plans { id } }", None)
        .await
        .unwrap();
    assert_eq!(data["plans"][0]["id"], "plan-1");

    let failing = Arc::new(MockBackend::default().route(
        Method::Post,
        "/graphql",
        400,
        json!({ "errors": [{ "message": "Cannot query field \"nope\"" }], "data": null }),
    ));
    let err = self::client(&failing)
        .graphql()
        .query("{ nope }", None)
        .await
        .unwrap_err();
    match err {
        SdkError::GraphQl(e) => assert_eq!(e.message, "Cannot query field \"nope\""),
        other => panic!("expected GraphQL error, got {other:?}"),
    }
}
