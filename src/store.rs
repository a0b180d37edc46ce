use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait, sea_query::OnConflict,
};

use crate::{
    entities::{user_movies, users, view_history},
    error::AppResult,
    models::Category,
};

#[derive(Debug, thiserror::Error)]
pub enum CreateUserError {
    #[error("username already taken")]
    UsernameTaken,
    #[error(transparent)]
    Db(#[from] DbErr),
}

/// Users and their movie lists.
#[derive(Clone)]
pub struct Store {
    db: DatabaseConnection,
}

impl Store {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<users::Model, CreateUserError> {
        let model = users::ActiveModel {
            id: NotSet,
            username: Set(username.to_string()),
            password_hash: Set(password_hash.to_string()),
            created_at: Set(now_sec()),
        };

        match model.insert(&self.db).await {
            Ok(user) => Ok(user),
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(CreateUserError::UsernameTaken)
            },
            Err(err) => Err(err.into()),
        }
    }

    pub async fn find_user_by_username(&self, username: &str) -> AppResult<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await?)
    }

    pub async fn find_user_by_id(&self, id: i32) -> AppResult<Option<users::Model>> {
        Ok(users::Entity::find_by_id(id).one(&self.db).await?)
    }

    /// Returns `true` if the movie was not in the list yet.
    pub async fn add_movie(
        &self,
        user_id: i32,
        movie_id: i32,
        category: Category,
    ) -> AppResult<bool> {
        let model = user_movies::ActiveModel {
            id: NotSet,
            user_id: Set(user_id),
            movie_id: Set(movie_id),
            category: Set(category),
            created_at: Set(now_sec()),
        };

        let inserted = user_movies::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    user_movies::Column::UserId,
                    user_movies::Column::MovieId,
                    user_movies::Column::Category,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(inserted > 0)
    }

    /// Returns `true` if the movie was in the list.
    pub async fn remove_movie(
        &self,
        user_id: i32,
        movie_id: i32,
        category: Category,
    ) -> AppResult<bool> {
        let res = user_movies::Entity::delete_many()
            .filter(user_movies::Column::UserId.eq(user_id))
            .filter(user_movies::Column::MovieId.eq(movie_id))
            .filter(user_movies::Column::Category.eq(category))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }

    /// Movie ids in the order they were added.
    pub async fn list_movies(&self, user_id: i32, category: Category) -> AppResult<Vec<i32>> {
        Ok(user_movies::Entity::find()
            .select_only()
            .column(user_movies::Column::MovieId)
            .filter(user_movies::Column::UserId.eq(user_id))
            .filter(user_movies::Column::Category.eq(category))
            .order_by_asc(user_movies::Column::Id)
            .into_tuple()
            .all(&self.db)
            .await?)
    }

    pub async fn contains(
        &self,
        user_id: i32,
        movie_id: i32,
        category: Category,
    ) -> AppResult<bool> {
        let row = user_movies::Entity::find()
            .filter(user_movies::Column::UserId.eq(user_id))
            .filter(user_movies::Column::MovieId.eq(movie_id))
            .filter(user_movies::Column::Category.eq(category))
            .one(&self.db)
            .await?;
        Ok(row.is_some())
    }

    /// Records a view, moving an already seen movie back to the top. The old row
    /// is replaced so the new one gets the highest id, which breaks ties between
    /// views within the same second.
    pub async fn record_history(&self, user_id: i32, movie_id: i32) -> AppResult<()> {
        let txn = self.db.begin().await?;

        view_history::Entity::delete_many()
            .filter(view_history::Column::UserId.eq(user_id))
            .filter(view_history::Column::MovieId.eq(movie_id))
            .exec(&txn)
            .await?;

        view_history::ActiveModel {
            id: NotSet,
            user_id: Set(user_id),
            movie_id: Set(movie_id),
            viewed_at: Set(now_sec()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(())
    }

    /// Most recently viewed first.
    pub async fn list_history(&self, user_id: i32) -> AppResult<Vec<i32>> {
        Ok(view_history::Entity::find()
            .select_only()
            .column(view_history::Column::MovieId)
            .filter(view_history::Column::UserId.eq(user_id))
            .order_by_desc(view_history::Column::ViewedAt)
            .order_by_desc(view_history::Column::Id)
            .into_tuple()
            .all(&self.db)
            .await?)
    }
}

fn now_sec() -> i64 {
    jiff::Timestamp::now().as_second()
}

#[cfg(test)]
mod tests {
    use sea_orm::ConnectionTrait;

    use super::*;
    use crate::db;

    async fn store() -> Store {
        Store::new(db::connect_and_migrate("sqlite::memory:").await.unwrap())
    }

    async fn user(store: &Store, name: &str) -> i32 {
        store.create_user(name, "hash").await.unwrap().id
    }

    #[tokio::test]
    async fn duplicate_username_is_reported() {
        let store = store().await;
        user(&store, "ana").await;
        let err = store.create_user("ana", "other").await.unwrap_err();
        assert!(matches!(err, CreateUserError::UsernameTaken));

        let found = store.find_user_by_username("ana").await.unwrap().unwrap();
        assert_eq!(found.password_hash, "hash");
        assert!(store.find_user_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn add_is_idempotent_and_keeps_insertion_order() {
        let store = store().await;
        let uid = user(&store, "ana").await;

        assert!(store.add_movie(uid, 680, Category::Watchlist).await.unwrap());
        assert!(store.add_movie(uid, 550, Category::Watchlist).await.unwrap());
        assert!(!store.add_movie(uid, 680, Category::Watchlist).await.unwrap());

        assert_eq!(store.list_movies(uid, Category::Watchlist).await.unwrap(), vec![680, 550]);
        assert!(store.list_movies(uid, Category::Favorites).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn lists_are_per_user_and_per_category() {
        let store = store().await;
        let ana = user(&store, "ana").await;
        let bob = user(&store, "bob").await;

        store.add_movie(ana, 13, Category::Favorites).await.unwrap();
        store.add_movie(bob, 13, Category::Watchlist).await.unwrap();

        assert!(store.contains(ana, 13, Category::Favorites).await.unwrap());
        assert!(!store.contains(ana, 13, Category::Watchlist).await.unwrap());
        assert!(!store.contains(bob, 13, Category::Favorites).await.unwrap());

        assert!(!store.remove_movie(ana, 13, Category::Watchlist).await.unwrap());
        assert!(store.remove_movie(ana, 13, Category::Favorites).await.unwrap());
        assert!(store.list_movies(ana, Category::Favorites).await.unwrap().is_empty());
        assert_eq!(store.list_movies(bob, Category::Watchlist).await.unwrap(), vec![13]);
    }

    #[tokio::test]
    async fn history_has_one_entry_per_movie() {
        let store = store().await;
        let uid = user(&store, "ana").await;

        store.record_history(uid, 1).await.unwrap();
        store.record_history(uid, 2).await.unwrap();
        store.record_history(uid, 1).await.unwrap();

        assert_eq!(store.list_history(uid).await.unwrap(), vec![1, 2]);

        store.record_history(uid, 2).await.unwrap();
        assert_eq!(store.list_history(uid).await.unwrap(), vec![2, 1]);
    }

    #[tokio::test]
    async fn unknown_stored_category_fails_to_load() {
        let store = store().await;
        let uid = user(&store, "ana").await;
        store.add_movie(uid, 550, Category::Watchlist).await.unwrap();

        store
            .db
            .execute_unprepared("UPDATE user_movies SET category = 'seen' WHERE movie_id = 550")
            .await
            .unwrap();

        assert!(store.contains(uid, 550, Category::Watchlist).await.is_ok_and(|found| !found));
        assert!(
            user_movies::Entity::find().all(&store.db).await.is_err(),
            "a row with an unknown category must not load"
        );
    }
}
