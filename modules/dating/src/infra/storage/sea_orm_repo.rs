//! SeaORM-backed repositories for the domain ports.
//!
//! Both are generic over `C: ConnectionTrait`, so they take a
//! `DatabaseConnection` or a transaction.

use anyhow::Context;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};

use crate::contract::model::pair_key;
use crate::contract::{Match, User};
use crate::domain::repo::{MatchesRepository, UsersRepository};
use crate::infra::storage::entity::{pairing, user};

pub struct SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

fn user_active_model(u: User) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(u.id),
        name: Set(u.name),
        bio: Set(u.bio),
        date_of_birth: Set(u.date_of_birth),
        password_hash: Set(u.password_hash),
        profile_picture: Set(u.profile_picture),
        created_at: Set(u.created_at),
        updated_at: Set(u.updated_at),
    }
}

#[async_trait::async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<User>> {
        let found = user::Entity::find_by_id(id.to_owned())
            .one(&self.conn)
            .await
            .context("find user by id failed")?;
        Ok(found.map(Into::into))
    }

    async fn insert(&self, u: User) -> anyhow::Result<()> {
        let _ = user_active_model(u)
            .insert(&self.conn)
            .await
            .context("insert user failed")?;
        Ok(())
    }

    async fn update(&self, u: User) -> anyhow::Result<()> {
        let _ = user_active_model(u)
            .update(&self.conn)
            .await
            .context("update user failed")?;
        Ok(())
    }
}

pub struct SeaOrmMatchesRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmMatchesRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[async_trait::async_trait]
impl<C> MatchesRepository for SeaOrmMatchesRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_pair(&self, a: &str, b: &str) -> anyhow::Result<Option<Match>> {
        let (low, high) = pair_key(a, b);
        let found = pairing::Entity::find()
            .filter(pairing::Column::PairLow.eq(low))
            .filter(pairing::Column::PairHigh.eq(high))
            .one(&self.conn)
            .await
            .context("find pair failed")?;
        Ok(found.map(Into::into))
    }

    async fn insert_if_absent(&self, m: Match) -> anyhow::Result<bool> {
        let (low, high) = {
            let (l, h) = m.pair_key();
            (l.to_owned(), h.to_owned())
        };
        let am = pairing::ActiveModel {
            id: Set(m.id),
            pair_low: Set(low),
            pair_high: Set(high),
            user_id: Set(m.user),
            other_user_id: Set(m.other_user),
            created_at: Set(m.created_at),
        };
        match am.insert(&self.conn).await {
            Ok(_) => Ok(true),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(anyhow::Error::new(e).context("insert match failed")),
        }
    }

    async fn list_for_user(&self, user_id: &str) -> anyhow::Result<Vec<Match>> {
        let rows = pairing::Entity::find()
            .filter(
                Condition::any()
                    .add(pairing::Column::UserId.eq(user_id))
                    .add(pairing::Column::OtherUserId.eq(user_id)),
            )
            .order_by_asc(pairing::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("list matches failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
