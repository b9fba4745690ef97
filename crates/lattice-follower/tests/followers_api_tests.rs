//! HTTP-level tests for the followers surface: status-code mapping,
//! scope-dependent field sets, and existence hiding.

mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::util::ServiceExt;

use common::{ScriptedProfileClient, discoverable, profile_document, test_app};
use lattice_core::extract::Auth;
use lattice_types::meta_adapter::{MetaAdapter, UpdateFollowerData};
use lattice_types::principal::{AppAuthorization, Principal, Scope};
use lattice_types::types::Patch;

fn scoped(scopes: &[Scope]) -> Principal {
	Principal::App(AppAuthorization {
		scopes: scopes.iter().copied().collect(),
		..Default::default()
	})
}

fn router(app: &lattice_core::app::App) -> Router {
	lattice_follower::handler::routes().with_state(app.clone())
}

async fn send(
	router: Router,
	method: &str,
	uri: &str,
	principal: Option<Principal>,
	body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
	let mut builder = Request::builder().method(method).uri(uri);
	if let Some(principal) = principal {
		builder = builder.extension(Auth(principal));
	}
	let request = match body {
		Some(json) => builder
			.header(header::CONTENT_TYPE, "application/json")
			.body(Body::from(serde_json::to_vec(&json).expect("serialize body")))
			.expect("build request"),
		None => builder.body(Body::empty()).expect("build request"),
	};

	let response = router.oneshot(request).await.expect("send request");
	let status = response.status();
	let bytes = response.into_body().collect().await.expect("read body").to_bytes();
	let json = if bytes.is_empty() {
		serde_json::Value::Null
	} else {
		serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
	};
	(status, json)
}

fn register_body(entity: &str) -> serde_json::Value {
	serde_json::json!({
		"entity": entity,
		"licenses": ["http://creativecommons.org/licenses/by-nc-sa/3.0/"],
		"types": [
			"https://tent.io/types/post/status/v0.1.x#full",
			"https://tent.io/types/post/photo/v0.1.x#meta",
		],
	})
}

#[tokio::test]
async fn test_post_followers_returns_credentials() {
	let entity = "https://alex.example.org";
	let (app, _rx, _temp) = test_app(discoverable(entity)).await;

	let (status, body) =
		send(router(&app), "POST", "/followers", None, Some(register_body(entity))).await;

	assert_eq!(status, StatusCode::OK);
	assert!(body["id"].is_string());
	assert!(body["mac_key_id"].is_string());
	assert!(body["mac_key"].is_string());
	assert_eq!(body["mac_algorithm"], "hmac-sha-256");
	assert_eq!(app.meta_adapter.count_subscriptions().await.expect("count"), 2);
}

#[tokio::test]
async fn test_post_followers_discovery_failure_is_404() {
	let (app, _rx, _temp) = test_app(ScriptedProfileClient::default()).await;

	let (status, _) = send(
		router(&app),
		"POST",
		"/followers",
		None,
		Some(register_body("https://alex.example.org")),
	)
	.await;

	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(app.meta_adapter.count_followers().await.expect("count"), 0);
}

#[tokio::test]
async fn test_post_followers_identity_mismatch_is_409() {
	let client = ScriptedProfileClient {
		profile_url: Some("https://alex.example.org/tent/profile".into()),
		document: Some(profile_document("https://otherentity.example.com")),
	};
	let (app, _rx, _temp) = test_app(client).await;

	let (status, _) = send(
		router(&app),
		"POST",
		"/followers",
		None,
		Some(register_body("https://alex.example.org")),
	)
	.await;

	assert_eq!(status, StatusCode::CONFLICT);
	assert_eq!(app.meta_adapter.count_followers().await.expect("count"), 0);
}

async fn registered(app: &lattice_core::app::App, public: bool) -> (String, i64) {
	let (status, body) = send(
		router(app),
		"POST",
		"/followers",
		None,
		Some(register_body("https://alex.example.org")),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	let public_uid = body["id"].as_str().expect("follower id").to_string();

	let follower = app.meta_adapter.read_follower(&public_uid).await.expect("read follower");
	if !public {
		app.meta_adapter
			.update_follower(
				follower.follower_id,
				&UpdateFollowerData { public: Patch::Value(false), ..Default::default() },
			)
			.await
			.expect("make private");
	}
	(public_uid, follower.follower_id)
}

#[tokio::test]
async fn test_get_followers_unauthorized_lists_public_only() {
	let (app, _rx, _temp) = test_app(discoverable("https://alex.example.org")).await;
	let (_uid, _id) = registered(&app, false).await;

	let (status, body) = send(router(&app), "GET", "/followers", None, None).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body.as_array().map(Vec::len), Some(0));

	let (status, body) = send(
		router(&app),
		"GET",
		"/followers",
		Some(scoped(&[Scope::ReadFollowers])),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_get_follower_public_hides_credentials() {
	let (app, _rx, _temp) = test_app(discoverable("https://alex.example.org")).await;
	let (uid, _id) = registered(&app, true).await;

	let (status, body) = send(router(&app), "GET", &format!("/followers/{}", uid), None, None).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["entity"], "https://alex.example.org");
	assert!(body.get("mac_key_id").is_none());
	assert!(body.get("mac_key").is_none());
}

#[tokio::test]
async fn test_get_follower_scoped_field_sets() {
	let (app, _rx, _temp) = test_app(discoverable("https://alex.example.org")).await;
	let (uid, _id) = registered(&app, false).await;

	// read_followers: key id but never the key itself
	let (status, body) = send(
		router(&app),
		"GET",
		&format!("/followers/{}", uid),
		Some(scoped(&[Scope::ReadFollowers])),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert!(body["mac_key_id"].is_string());
	assert!(body.get("mac_key").is_none());

	// read_secrets alone is not enough; the caller must ask for it too
	let (_, body) = send(
		router(&app),
		"GET",
		&format!("/followers/{}", uid),
		Some(scoped(&[Scope::ReadFollowers, Scope::ReadSecrets])),
		None,
	)
	.await;
	assert!(body.get("mac_key").is_none());

	let (_, body) = send(
		router(&app),
		"GET",
		&format!("/followers/{}?read_secrets=true", uid),
		Some(scoped(&[Scope::ReadFollowers, Scope::ReadSecrets])),
		None,
	)
	.await;
	assert!(body["mac_key"].is_string());
}

#[tokio::test]
async fn test_get_follower_existence_hiding() {
	let (app, _rx, _temp) = test_app(discoverable("https://alex.example.org")).await;
	let (uid, _id) = registered(&app, false).await;

	// Unprivileged: private and missing are indistinguishable (403)
	let (status, _) = send(router(&app), "GET", &format!("/followers/{}", uid), None, None).await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	let (status, _) = send(router(&app), "GET", "/followers/invalid-id", None, None).await;
	assert_eq!(status, StatusCode::FORBIDDEN);

	// Privileged: a real 404
	let (status, _) = send(
		router(&app),
		"GET",
		"/followers/invalid-id",
		Some(scoped(&[Scope::ReadFollowers])),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_put_follower_applies_permitted_fields_only() {
	let (app, _rx, _temp) = test_app(discoverable("https://alex.example.org")).await;
	let (uid, id) = registered(&app, true).await;
	let before = app.meta_adapter.read_follower_by_id(id).await.expect("read");

	let (status, _) = send(
		router(&app),
		"PUT",
		&format!("/followers/{}", uid),
		Some(scoped(&[Scope::WriteFollowers])),
		Some(serde_json::json!({
			"licenses": ["http://creativecommons.org/licenses/by/3.0/"],
			"mac_key": "stolen",
		})),
	)
	.await;
	assert_eq!(status, StatusCode::OK);

	let after = app.meta_adapter.read_follower_by_id(id).await.expect("read");
	assert_eq!(after.mac_key, before.mac_key);
	assert_eq!(after.licenses.len(), 1);
}

#[tokio::test]
async fn test_put_follower_types_change_subscriptions() {
	let (app, _rx, _temp) = test_app(discoverable("https://alex.example.org")).await;
	let (uid, id) = registered(&app, true).await;

	let (status, _) = send(
		router(&app),
		"PUT",
		&format!("/followers/{}", uid),
		Some(scoped(&[Scope::WriteFollowers])),
		Some(serde_json::json!({
			"types": [
				"https://tent.io/types/post/status/v0.1.x#full",
				"https://tent.io/types/post/essay/v0.1.x#full",
			],
		})),
	)
	.await;
	assert_eq!(status, StatusCode::OK);

	let subs = app.meta_adapter.list_subscriptions(id).await.expect("list");
	assert_eq!(subs.len(), 2);
	assert!(subs.iter().any(|s| s.type_base.as_ref() == "https://tent.io/types/post/essay"));
	assert!(!subs.iter().any(|s| s.type_base.as_ref() == "https://tent.io/types/post/photo"));
}

#[tokio::test]
async fn test_delete_follower() {
	let (app, _rx, _temp) = test_app(discoverable("https://alex.example.org")).await;
	let (uid, _id) = registered(&app, true).await;

	// Anonymous caller cannot delete, and missing ids hide as 403
	let (status, _) = send(router(&app), "DELETE", &format!("/followers/{}", uid), None, None).await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	let (status, _) = send(router(&app), "DELETE", "/followers/invalid-id", None, None).await;
	assert_eq!(status, StatusCode::FORBIDDEN);

	let (status, _) = send(
		router(&app),
		"DELETE",
		"/followers/invalid-id",
		Some(scoped(&[Scope::WriteFollowers])),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::NOT_FOUND);

	let (status, _) = send(
		router(&app),
		"DELETE",
		&format!("/followers/{}", uid),
		Some(scoped(&[Scope::WriteFollowers])),
		None,
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(app.meta_adapter.count_followers().await.expect("count"), 0);
	assert_eq!(app.meta_adapter.count_subscriptions().await.expect("count"), 0);
}

// vim: ts=4
