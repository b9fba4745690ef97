//! Post storage

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use lattice::meta_adapter::*;
use lattice::prelude::*;
use lattice::type_uri::TypeUri;
use lattice::utils::{PUBLIC_ID_LENGTH, random_id};

use crate::utils::*;

fn post_from_row(row: &SqliteRow) -> Result<Post, sqlx::Error> {
	let licenses: Option<&str> = row.try_get("licenses")?;
	let content: Option<&str> = row.try_get("content")?;
	Ok(Post {
		post_id: row.try_get("post_id")?,
		public_id: row.try_get("public_id")?,
		entity: row.try_get("entity")?,
		typ: TypeUri {
			base: row.try_get("type_base")?,
			version: row.try_get("type_version")?,
		},
		licenses: parse_json_list(licenses),
		content: content
			.and_then(|s| serde_json::from_str(s).ok())
			.unwrap_or(serde_json::Value::Null),
		public: row.try_get("public")?,
		original: row.try_get("original")?,
		app_name: row.try_get("app_name")?,
		app_url: row.try_get("app_url")?,
		published_at: row.try_get("published_at").map(Timestamp)?,
		received_at: row.try_get("received_at").map(Timestamp)?,
		updated_at: row.try_get::<Option<i64>, _>("updated_at")?.map(Timestamp),
	})
}

pub(crate) async fn create(db: &SqlitePool, data: &CreatePostData) -> LtResult<Post> {
	let public_id = random_id(PUBLIC_ID_LENGTH)?;
	let now = Timestamp::now();

	let res = sqlx::query(
		"INSERT INTO posts (public_id, entity, type_base, type_version, licenses, content,
		public, original, app_name, app_url, published_at, received_at)
		VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING post_id",
	)
	.bind(&public_id)
	.bind(data.entity.as_ref())
	.bind(data.typ.base.as_ref())
	.bind(data.typ.version.as_deref())
	.bind(to_json_list(&data.licenses))
	.bind(data.content.to_string())
	.bind(data.public)
	.bind(data.original)
	.bind(data.app_name.as_deref())
	.bind(data.app_url.as_deref())
	.bind(now.0)
	.bind(now.0)
	.fetch_one(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;
	let post_id: i64 = res.try_get(0).map_err(|_| Error::DbError)?;

	Ok(Post {
		post_id,
		public_id: public_id.into(),
		entity: data.entity.clone(),
		typ: data.typ.clone(),
		licenses: data.licenses.clone().into_boxed_slice(),
		content: data.content.clone(),
		public: data.public,
		original: data.original,
		app_name: data.app_name.clone(),
		app_url: data.app_url.clone(),
		published_at: now,
		received_at: now,
		updated_at: None,
	})
}

pub(crate) async fn read(db: &SqlitePool, public_id: &str) -> LtResult<Post> {
	let res = sqlx::query(
		"SELECT post_id, public_id, entity, type_base, type_version, licenses, content,
		public, original, app_name, app_url, published_at, received_at, updated_at
		FROM posts WHERE public_id = ?",
	)
	.bind(public_id)
	.fetch_one(db)
	.await;

	map_res(res, |row| post_from_row(&row))
}

pub(crate) async fn list(db: &SqlitePool, opts: &ListPostOptions) -> LtResult<Vec<Post>> {
	let mut query = sqlx::QueryBuilder::new(
		"SELECT post_id, public_id, entity, type_base, type_version, licenses, content,
		public, original, app_name, app_url, published_at, received_at, updated_at
		FROM posts WHERE 1=1",
	);

	if let Some(since) = opts.since_time {
		query.push(" AND published_at > ").push_bind(since.0);
	}
	if let Some(before) = opts.before_time {
		query.push(" AND published_at < ").push_bind(before.0);
	}
	if let Some(post_types) = &opts.post_types {
		if !post_types.is_empty() {
			// Full URI form: base plus version segment when present
			query.push(" AND (type_base || ifnull('/' || type_version, '')) IN ");
			query = push_in(query, post_types);
		}
	}
	if let Some(entity) = &opts.entity {
		query.push(" AND entity = ").push_bind(entity.as_ref());
	}

	query.push(" ORDER BY published_at DESC, post_id DESC");
	query.push(" LIMIT ").push_bind(i64::from(opts.limit.unwrap_or(50)));

	let res = query
		.build()
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	collect_res(res.iter().map(post_from_row))
}

pub(crate) async fn update(
	db: &SqlitePool,
	post_id: i64,
	data: &UpdatePostData,
) -> LtResult<Post> {
	if !data.is_empty() {
		let mut query = sqlx::QueryBuilder::new("UPDATE posts SET updated_at = ");
		query.push_bind(Timestamp::now().0);

		if let Patch::Value(typ) = &data.typ {
			query.push(", type_base = ").push_bind(typ.base.as_ref().to_string());
			query.push(", type_version = ").push_bind(typ.version.as_deref().map(String::from));
		}
		if let Patch::Value(licenses) = &data.licenses {
			query.push(", licenses = ").push_bind(to_json_list(licenses));
		}
		if let Patch::Value(content) = &data.content {
			query.push(", content = ").push_bind(content.to_string());
		}
		if let Patch::Value(public) = &data.public {
			query.push(", public = ").push_bind(*public);
		}

		query.push(" WHERE post_id = ").push_bind(post_id);

		let res = query
			.build()
			.execute(db)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;
		if res.rows_affected() == 0 {
			return Err(Error::NotFound);
		}
	}

	let res = sqlx::query(
		"SELECT post_id, public_id, entity, type_base, type_version, licenses, content,
		public, original, app_name, app_url, published_at, received_at, updated_at
		FROM posts WHERE post_id = ?",
	)
	.bind(post_id)
	.fetch_one(db)
	.await;

	map_res(res, |row| post_from_row(&row))
}

pub(crate) async fn delete(db: &SqlitePool, post_id: i64) -> LtResult<()> {
	let mut tx = db.begin().await.map_err(|_| Error::DbError)?;

	sqlx::query("DELETE FROM permissions WHERE resource_kind = 'P' AND resource_id = ?")
		.bind(post_id)
		.execute(&mut *tx)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	let res = sqlx::query("DELETE FROM posts WHERE post_id = ?")
		.bind(post_id)
		.execute(&mut *tx)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;
	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}

	tx.commit().await.map_err(|_| Error::DbError)?;
	Ok(())
}
