use sqlx::{Pool, Postgres};

use crate::{
    constants::DEFAULT_FAVORITE_GROUP,
    database::error::QueryError,
    error::{Error, HtmlError},
    schema::{FavoriteGroup, Id},
};

/// Creates the default group if it does not exist yet and returns it.
pub async fn ensure_default_group(pool: &Pool<Postgres>) -> Result<FavoriteGroup, Error> {
    sqlx::query("INSERT INTO favorite_groups (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
        .bind(DEFAULT_FAVORITE_GROUP)
        .execute(pool)
        .await
        .map_err(QueryError::from)?;

    let group: FavoriteGroup = sqlx::query_as("SELECT * FROM favorite_groups WHERE name = $1")
        .bind(DEFAULT_FAVORITE_GROUP)
        .fetch_one(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(group)
}

pub async fn list_groups(pool: &Pool<Postgres>) -> Result<Vec<FavoriteGroup>, Error> {
    ensure_default_group(pool).await?;

    let rows: Vec<FavoriteGroup> =
        sqlx::query_as("SELECT * FROM favorite_groups ORDER BY created_at, id")
            .fetch_all(pool)
            .await
            .map_err(QueryError::from)?;

    Ok(rows)
}

pub async fn get_group(id: Id, pool: &Pool<Postgres>) -> Result<Option<FavoriteGroup>, Error> {
    let row: Option<FavoriteGroup> = sqlx::query_as("SELECT * FROM favorite_groups WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(row)
}

pub async fn create_group(name: &str, pool: &Pool<Postgres>) -> Result<FavoriteGroup, Error> {
    let row: Option<FavoriteGroup> = sqlx::query_as(
        "
        INSERT INTO favorite_groups (name)
        VALUES ($1)
        ON CONFLICT (name) DO NOTHING
        RETURNING *
    ",
    )
    .bind(name)
    .fetch_optional(pool)
    .await
    .map_err(QueryError::from)?;

    row.ok_or_else(|| HtmlError::InvalidRequest.new("Group already exists"))
}

pub async fn delete_group(id: Id, pool: &Pool<Postgres>) -> Result<(), Error> {
    let group = get_group(id, pool)
        .await?
        .ok_or_else(|| HtmlError::NotFound.new("Group not found"))?;

    group.ensure_deletable()?;

    sqlx::query("DELETE FROM favorite_groups WHERE id = $1")
        .bind(group.id)
        .execute(pool)
        .await
        .map_err(QueryError::from)?;

    log::info!("Deleted favorite group {} ({})", group.id, group.name);

    Ok(())
}

async fn save_references(group: &FavoriteGroup, pool: &Pool<Postgres>) -> Result<(), Error> {
    sqlx::query("UPDATE favorite_groups SET recipes = $1 WHERE id = $2")
        .bind(&group.recipes)
        .bind(group.id)
        .execute(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(())
}

/// Adds a recipe reference to a group, the default group when none is given.
/// Adding a reference that is already present changes nothing.
pub async fn add_favorite(
    recipe_id: &str,
    group_id: Option<Id>,
    pool: &Pool<Postgres>,
) -> Result<FavoriteGroup, Error> {
    let mut group = match group_id {
        Some(id) => get_group(id, pool)
            .await?
            .ok_or_else(|| HtmlError::NotFound.new("Group not found"))?,
        None => ensure_default_group(pool).await?,
    };

    if group.insert_reference(recipe_id) {
        save_references(&group, pool).await?;
    }

    Ok(group)
}

/// Removes a recipe reference; `None` when the group does not exist.
pub async fn remove_favorite(
    recipe_id: &str,
    group_id: Option<Id>,
    pool: &Pool<Postgres>,
) -> Result<Option<FavoriteGroup>, Error> {
    let group = match group_id {
        Some(id) => get_group(id, pool).await?,
        None => {
            sqlx::query_as("SELECT * FROM favorite_groups WHERE name = $1")
                .bind(DEFAULT_FAVORITE_GROUP)
                .fetch_optional(pool)
                .await
                .map_err(QueryError::from)?
        }
    };

    match group {
        Some(mut group) => {
            if group.remove_reference(recipe_id) {
                save_references(&group, pool).await?;
            }
            Ok(Some(group))
        }
        None => Ok(None),
    }
}
