use sqlx::{types::Json, Pool, Postgres};

use crate::{
    database::error::QueryError,
    error::{Error, HtmlError},
    form::{NewRecipe, RecipeQuery, RecipeUpdate},
    jwt::SessionData,
    schema::{Id, Recipe},
};

/// Public recipes plus the caller's own private ones, newest first.
///
/// A private recipe owned by someone else never shows up, even when its name
/// matches the filter.
pub async fn fetch_recipes(
    query: &RecipeQuery,
    viewer: Option<Id>,
    pool: &Pool<Postgres>,
) -> Result<Vec<Recipe>, Error> {
    let rows: Vec<Recipe> = sqlx::query_as(
        "
        SELECT * FROM recipes
        WHERE (is_public OR owner_id = $1) AND name ILIKE $2
        ORDER BY created_at DESC, id DESC
    ",
    )
    .bind(viewer)
    .bind(query.name_pattern())
    .fetch_all(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(rows)
}

pub async fn list_own_recipes(user_id: Id, pool: &Pool<Postgres>) -> Result<Vec<Recipe>, Error> {
    let rows: Vec<Recipe> =
        sqlx::query_as("SELECT * FROM recipes WHERE owner_id = $1 ORDER BY created_at DESC, id DESC")
            .bind(user_id)
            .fetch_all(pool)
            .await
            .map_err(QueryError::from)?;

    Ok(rows)
}

pub async fn get_recipe(id: Id, pool: &Pool<Postgres>) -> Result<Option<Recipe>, Error> {
    let row: Option<Recipe> = sqlx::query_as("SELECT * FROM recipes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(row)
}

/// Fetches a recipe the viewer is allowed to see.
pub async fn get_visible_recipe(
    id: Id,
    viewer: Option<Id>,
    pool: &Pool<Postgres>,
) -> Result<Recipe, Error> {
    match get_recipe(id, pool).await? {
        Some(recipe) => {
            recipe.ensure_visible_to(viewer)?;
            Ok(recipe)
        }
        None => Err(HtmlError::NotFound.new("Recipe not found")),
    }
}

/// Fetches a recipe the session is allowed to modify.
pub async fn get_recipe_mut(
    id: Id,
    session: &SessionData,
    pool: &Pool<Postgres>,
) -> Result<Recipe, Error> {
    match get_recipe(id, pool).await? {
        Some(recipe) => {
            recipe.ensure_owned_by(session.user_id)?;
            Ok(recipe)
        }
        None => Err(HtmlError::NotFound.new("Recipe not found")),
    }
}

/// Anonymous callers can only publish public recipes.
pub fn authorize_visibility(is_public: bool, owner: Option<&SessionData>) -> Result<(), Error> {
    if !is_public && owner.is_none() {
        return Err(HtmlError::InvalidSession.new("You must be signed in to create a private recipe"));
    }
    Ok(())
}

/// Checks that a recipe may be stored with the given owner.
pub fn authorize_creation(recipe: &NewRecipe, owner: Option<&SessionData>) -> Result<(), Error> {
    authorize_visibility(recipe.is_public, owner)
}

pub async fn create_recipe(
    recipe: NewRecipe,
    owner: Option<&SessionData>,
    pool: &Pool<Postgres>,
) -> Result<Recipe, Error> {
    authorize_creation(&recipe, owner)?;

    let row: Recipe = sqlx::query_as(
        "
        INSERT INTO recipes (name, ingredients, instructions, glass, category, image, is_custom, owner_id, is_public)
        VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7, $8)
        RETURNING *
    ",
    )
    .bind(recipe.name)
    .bind(Json(recipe.ingredients))
    .bind(recipe.instructions)
    .bind(recipe.glass)
    .bind(recipe.category)
    .bind(recipe.image)
    .bind(owner.map(|s| s.user_id))
    .bind(recipe.is_public)
    .fetch_one(pool)
    .await
    .map_err(QueryError::from)?;

    log::info!("Created recipe {} ({})", row.id, row.name);

    Ok(row)
}

pub async fn update_recipe(
    id: Id,
    update: RecipeUpdate,
    session: &SessionData,
    pool: &Pool<Postgres>,
) -> Result<Recipe, Error> {
    let mut recipe = get_recipe_mut(id, session, pool).await?;
    update.apply(&mut recipe);

    let row: Recipe = sqlx::query_as(
        "
        UPDATE recipes
        SET name = $1, ingredients = $2, instructions = $3, glass = $4, category = $5, image = $6, is_public = $7
        WHERE id = $8
        RETURNING *
    ",
    )
    .bind(recipe.name)
    .bind(recipe.ingredients)
    .bind(recipe.instructions)
    .bind(recipe.glass)
    .bind(recipe.category)
    .bind(recipe.image)
    .bind(recipe.is_public)
    .bind(id)
    .fetch_one(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(row)
}

pub async fn set_recipe_image(
    id: Id,
    image: &str,
    pool: &Pool<Postgres>,
) -> Result<Recipe, Error> {
    let row: Recipe = sqlx::query_as("UPDATE recipes SET image = $1 WHERE id = $2 RETURNING *")
        .bind(image)
        .bind(id)
        .fetch_one(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(row)
}

pub async fn delete_recipe(
    id: Id,
    session: &SessionData,
    pool: &Pool<Postgres>,
) -> Result<(), Error> {
    let recipe = get_recipe_mut(id, session, pool).await?;

    sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(recipe.id)
        .execute(pool)
        .await
        .map_err(QueryError::from)?;

    log::info!("Deleted recipe {} ({})", recipe.id, recipe.name);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_recipe(is_public: bool) -> NewRecipe {
        NewRecipe {
            name: String::from("Gimlet"),
            ingredients: vec![],
            instructions: String::from("Shake."),
            glass: String::from("Cocktail glass"),
            category: String::from("Cocktail"),
            image: None,
            is_public,
        }
    }

    #[test]
    fn anonymous_private_recipe_is_unauthenticated() {
        let error = authorize_creation(&new_recipe(false), None).unwrap_err();
        assert_eq!(error.code, 401);
    }

    #[test]
    fn signed_in_private_recipe_is_allowed() {
        let session = SessionData {
            user_id: 1,
            username: String::from("mixer"),
        };
        assert!(authorize_creation(&new_recipe(false), Some(&session)).is_ok());
        assert!(authorize_creation(&new_recipe(true), None).is_ok());
    }

    #[test]
    fn visibility_is_checked_without_a_full_recipe() {
        assert_eq!(authorize_visibility(false, None).unwrap_err().code, 401);
        assert!(authorize_visibility(true, None).is_ok());
    }
}
