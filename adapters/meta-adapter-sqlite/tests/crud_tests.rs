//! Meta adapter CRUD operation tests
//!
//! Tests create, read, update, delete operations for posts, profile info,
//! followers, and groups.

use lattice_meta_adapter_sqlite::MetaAdapterSqlite;
use lattice::meta_adapter::{
	CreateFollowerData, CreatePostData, ListFollowerOptions, ListPostOptions, MAC_ALGORITHM,
	MetaAdapter, UpdateFollowerData,
};
use lattice::type_uri::{TypeDescriptor, TypeUri};
use lattice::types::Patch;
use tempfile::TempDir;

async fn create_test_adapter() -> (MetaAdapterSqlite, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");

	let adapter = MetaAdapterSqlite::new(temp_dir.path().join("meta.db"))
		.await
		.expect("Failed to create adapter");

	(adapter, temp_dir)
}

fn status_type() -> TypeUri {
	TypeUri::parse("https://tent.io/types/post/status/v0.1.0").expect("valid type uri")
}

fn post_data(public: bool, original: bool) -> CreatePostData {
	CreatePostData {
		entity: "https://smith.example.com".into(),
		typ: status_type(),
		licenses: vec!["http://creativecommons.org/licenses/by/3.0/".into()],
		content: serde_json::json!({"text": "hello world"}),
		public,
		original,
		app_name: None,
		app_url: None,
	}
}

fn follower_data(entity: &str) -> CreateFollowerData {
	CreateFollowerData {
		entity: entity.into(),
		public: true,
		profile: None,
		licenses: vec![],
		groups: vec![],
		profile_info_types: vec!["all".into()],
		mac_key_id: "k-1234".into(),
		mac_key: "s-abcdef".into(),
		mac_algorithm: MAC_ALGORITHM.into(),
	}
}

#[tokio::test]
async fn test_create_and_read_post() {
	let (adapter, _temp) = create_test_adapter().await;

	let post = adapter.create_post(&post_data(true, true)).await.expect("Should create post");
	assert_eq!(post.public_id.len(), 24);
	assert!(post.public);
	assert!(post.original);

	let read = adapter.read_post(&post.public_id).await.expect("Should read post back");
	assert_eq!(read.post_id, post.post_id);
	assert_eq!(read.entity.as_ref(), "https://smith.example.com");
	assert_eq!(read.typ, status_type());
	assert_eq!(read.licenses.len(), 1);
	assert_eq!(read.content["text"], "hello world");
}

#[tokio::test]
async fn test_update_post_mutable_fields() {
	use lattice::meta_adapter::UpdatePostData;

	let (adapter, _temp) = create_test_adapter().await;

	let post = adapter.create_post(&post_data(false, true)).await.expect("Should create post");
	assert!(post.updated_at.is_none());

	let update = UpdatePostData {
		content: Patch::Value(serde_json::json!({"text": "edited"})),
		public: Patch::Value(true),
		..Default::default()
	};
	let updated = adapter.update_post(post.post_id, &update).await.expect("Should update post");

	assert_eq!(updated.content["text"], "edited");
	assert!(updated.public);
	assert!(updated.updated_at.is_some());
	// Fixed-at-creation fields stay put
	assert_eq!(updated.published_at, post.published_at);
	assert_eq!(updated.public_id, post.public_id);
}

#[tokio::test]
async fn test_read_missing_post() {
	let (adapter, _temp) = create_test_adapter().await;

	let res = adapter.read_post("no-such-id").await;
	assert!(matches!(res, Err(lattice::error::Error::NotFound)));
}

#[tokio::test]
async fn test_list_posts_by_type() {
	let (adapter, _temp) = create_test_adapter().await;

	adapter.create_post(&post_data(true, true)).await.expect("Should create post");
	let mut photo = post_data(true, true);
	photo.typ = TypeUri::parse("https://tent.io/types/post/photo/v0.1.0").expect("valid type uri");
	adapter.create_post(&photo).await.expect("Should create post");

	let opts = ListPostOptions {
		post_types: Some(vec!["https://tent.io/types/post/status/v0.1.0".into()]),
		..Default::default()
	};
	let posts = adapter.list_posts(&opts).await.expect("Should list posts");
	assert_eq!(posts.len(), 1);
	assert_eq!(posts[0].typ, status_type());
}

#[tokio::test]
async fn test_delete_post_cascades_permissions() {
	use lattice::meta_adapter::{CreatePermission, ResourceId};

	let (adapter, _temp) = create_test_adapter().await;

	let post = adapter.create_post(&post_data(false, true)).await.expect("Should create post");
	adapter
		.create_permission(
			ResourceId::Post(post.post_id),
			&CreatePermission { group_id: Some("g1".into()), follower_id: None },
		)
		.await
		.expect("Should create permission");

	adapter.delete_post(post.post_id).await.expect("Should delete post");

	let perms = adapter
		.list_permissions(ResourceId::Post(post.post_id))
		.await
		.expect("Should list permissions");
	assert!(perms.is_empty());
}

#[tokio::test]
async fn test_profile_info_replace_semantics() {
	let (adapter, _temp) = create_test_adapter().await;

	let typ = TypeUri::parse("https://tent.io/types/info/basic/v0.1.0").expect("valid type uri");
	let first = adapter
		.update_profile_info(&typ, true, &serde_json::json!({"name": "Smith"}))
		.await
		.expect("Should create info");
	assert!(first.updated_at.is_none());

	let newer = TypeUri::parse("https://tent.io/types/info/basic/v0.1.1").expect("valid type uri");
	let second = adapter
		.update_profile_info(&newer, false, &serde_json::json!({"name": "John Smith"}))
		.await
		.expect("Should replace info");
	assert!(second.updated_at.is_some());
	assert_eq!(second.created_at, first.created_at);

	// Exactly one row per type base survives
	let infos = adapter.list_profile_info().await.expect("Should list infos");
	assert_eq!(infos.len(), 1);
	assert_eq!(infos[0].typ.version.as_deref(), Some("v0.1.1"));
	assert_eq!(infos[0].content["name"], "John Smith");
	assert!(!infos[0].public);
}

#[tokio::test]
async fn test_create_follower_with_subscriptions() {
	let (adapter, _temp) = create_test_adapter().await;

	let descriptors = vec![
		TypeDescriptor::parse("https://tent.io/types/post/status/v0.1.x#full")
			.expect("valid descriptor"),
		TypeDescriptor::parse("https://tent.io/types/post/photo/v0.1.x#meta")
			.expect("valid descriptor"),
	];
	let follower = adapter
		.create_follower(&follower_data("https://alex.example.org"), &descriptors)
		.await
		.expect("Should create follower");

	assert_eq!(follower.entity.as_ref(), "https://alex.example.org");
	assert_eq!(adapter.count_followers().await.expect("count"), 1);

	let subs = adapter
		.list_subscriptions(follower.follower_id)
		.await
		.expect("Should list subscriptions");
	assert_eq!(subs.len(), 2);
	assert_eq!(subs[0].type_base.as_ref(), "https://tent.io/types/post/status");
	assert_eq!(subs[1].view, lattice::types::View::Meta);
}

#[tokio::test]
async fn test_create_follower_duplicate_entity_conflicts() {
	let (adapter, _temp) = create_test_adapter().await;

	adapter
		.create_follower(&follower_data("https://alex.example.org"), &[])
		.await
		.expect("Should create follower");

	let res = adapter.create_follower(&follower_data("https://alex.example.org"), &[]).await;
	assert!(matches!(res, Err(lattice::error::Error::Conflict)));
	assert_eq!(adapter.count_followers().await.expect("count"), 1);
}

#[tokio::test]
async fn test_update_follower_patch_fields() {
	let (adapter, _temp) = create_test_adapter().await;

	let follower = adapter
		.create_follower(&follower_data("https://alex.example.org"), &[])
		.await
		.expect("Should create follower");

	let update = UpdateFollowerData {
		public: Patch::Value(false),
		licenses: Patch::Value(vec!["http://creativecommons.org/licenses/by-nc-sa/3.0/".into()]),
		mac_timestamp_delta: Patch::Value(300),
		..Default::default()
	};
	let updated = adapter
		.update_follower(follower.follower_id, &update)
		.await
		.expect("Should update follower");

	assert!(!updated.public);
	assert_eq!(updated.licenses.len(), 1);
	assert_eq!(updated.mac_timestamp_delta, Some(300));
	// Untouched fields survive
	assert_eq!(updated.entity.as_ref(), "https://alex.example.org");
	assert_eq!(updated.mac_key.as_ref(), "s-abcdef");
}

#[tokio::test]
async fn test_delete_follower_cascades_subscriptions() {
	let (adapter, _temp) = create_test_adapter().await;

	let descriptors = vec![
		TypeDescriptor::parse("https://tent.io/types/post/status/v0.1.x").expect("valid descriptor"),
	];
	let follower = adapter
		.create_follower(&follower_data("https://alex.example.org"), &descriptors)
		.await
		.expect("Should create follower");
	assert_eq!(adapter.count_subscriptions().await.expect("count"), 1);

	adapter.delete_follower(follower.follower_id).await.expect("Should delete follower");

	assert_eq!(adapter.count_followers().await.expect("count"), 0);
	assert_eq!(adapter.count_subscriptions().await.expect("count"), 0);
}

#[tokio::test]
async fn test_list_followers_public_filter() {
	let (adapter, _temp) = create_test_adapter().await;

	adapter
		.create_follower(&follower_data("https://alex.example.org"), &[])
		.await
		.expect("Should create follower");
	let mut private = follower_data("https://kate.example.net");
	private.public = false;
	adapter.create_follower(&private, &[]).await.expect("Should create follower");

	let all = adapter
		.list_followers(&ListFollowerOptions::default())
		.await
		.expect("Should list followers");
	assert_eq!(all.len(), 2);

	let public = adapter
		.list_followers(&ListFollowerOptions { public_only: true, ..Default::default() })
		.await
		.expect("Should list followers");
	assert_eq!(public.len(), 1);
	assert_eq!(public[0].entity.as_ref(), "https://alex.example.org");
}

#[tokio::test]
async fn test_group_crud() {
	let (adapter, _temp) = create_test_adapter().await;

	let group = adapter.create_group("friends").await.expect("Should create group");
	let groups = adapter.list_groups().await.expect("Should list groups");
	assert_eq!(groups.len(), 1);
	assert_eq!(groups[0].name.as_ref(), "friends");

	adapter.delete_group(&group.group_id).await.expect("Should delete group");
	assert!(adapter.list_groups().await.expect("Should list groups").is_empty());
}

// vim: ts=4
