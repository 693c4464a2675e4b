use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

use super::error::TypeError;
use crate::{
    constants::DEFAULT_FAVORITE_GROUP,
    error::{Error, HtmlError},
};

pub type Id = i32;

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
pub struct User {
    pub id: Id,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Public view of a user returned next to a session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: Id,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.to_owned(),
            email: user.email.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ingredient {
    pub name: String,
    #[serde(default)]
    pub measure: String,
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: Id,
    pub name: String,
    pub ingredients: Json<Vec<Ingredient>>,
    pub instructions: String,
    pub glass: String,
    pub category: String,
    pub image: Option<String>,
    pub is_custom: bool,
    #[serde(rename = "owner")]
    pub owner_id: Option<Id>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

impl Recipe {
    pub fn is_owned_by(&self, user_id: Option<Id>) -> bool {
        match (self.owner_id, user_id) {
            (Some(owner), Some(user)) => owner == user,
            _ => false,
        }
    }

    /// Public recipes are visible to everyone, private ones only to their owner.
    pub fn is_visible_to(&self, user_id: Option<Id>) -> bool {
        self.is_public || self.is_owned_by(user_id)
    }

    pub fn ensure_visible_to(&self, user_id: Option<Id>) -> Result<(), Error> {
        if !self.is_visible_to(user_id) {
            return Err(HtmlError::Unauthorized.new("This recipe is private"));
        }
        Ok(())
    }

    pub fn ensure_owned_by(&self, user_id: Id) -> Result<(), Error> {
        if !self.is_owned_by(Some(user_id)) {
            return Err(HtmlError::Unauthorized.new("Only the owner can modify this recipe"));
        }
        Ok(())
    }

    pub fn ingredient_names(&self) -> Vec<&str> {
        self.ingredients.iter().map(|i| i.name.as_str()).collect()
    }
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteGroup {
    pub id: Id,
    pub name: String,
    pub recipes: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl FavoriteGroup {
    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_FAVORITE_GROUP
    }

    pub fn ensure_deletable(&self) -> Result<(), Error> {
        if self.is_default() {
            return Err(HtmlError::InvalidRequest.new("Cannot delete the default group"));
        }
        Ok(())
    }

    /// Returns `false` when the reference was already a member.
    pub fn insert_reference(&mut self, recipe_id: &str) -> bool {
        if self.recipes.iter().any(|r| r == recipe_id) {
            return false;
        }
        self.recipes.push(recipe_id.to_string());
        true
    }

    /// Returns `false` when the reference was not a member.
    pub fn remove_reference(&mut self, recipe_id: &str) -> bool {
        let before = self.recipes.len();
        self.recipes.retain(|r| r != recipe_id);
        self.recipes.len() != before
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, PartialOrd, sqlx::Type, Serialize, Deserialize, Eq, Ord, Hash,
)]
#[sqlx(type_name = "metadata_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MetadataType {
    Category,
    Glass,
    Ingredient,
    Alcoholic,
}

impl MetadataType {
    pub const ALL: [MetadataType; 4] = [
        MetadataType::Category,
        MetadataType::Glass,
        MetadataType::Ingredient,
        MetadataType::Alcoholic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataType::Category => "category",
            MetadataType::Glass => "glass",
            MetadataType::Ingredient => "ingredient",
            MetadataType::Alcoholic => "alcoholic",
        }
    }

    /// Query parameter and response field of the matching `list.php` call.
    pub fn list_parameter(&self) -> (&'static str, &'static str) {
        match self {
            MetadataType::Category => ("c", "strCategory"),
            MetadataType::Glass => ("g", "strGlass"),
            MetadataType::Ingredient => ("i", "strIngredient1"),
            MetadataType::Alcoholic => ("a", "strAlcoholic"),
        }
    }
}

impl FromStr for MetadataType {
    type Err = TypeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "category" => Ok(Self::Category),
            "glass" => Ok(Self::Glass),
            "ingredient" => Ok(Self::Ingredient),
            "alcoholic" => Ok(Self::Alcoholic),
            _ => Err(TypeError::new("Invalid metadata type")),
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub r#type: MetadataType,
    pub entries: Vec<String>,
    pub last_updated: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(owner_id: Option<Id>, is_public: bool) -> Recipe {
        Recipe {
            id: 1,
            name: String::from("Daiquiri"),
            ingredients: Json(vec![Ingredient {
                name: String::from("Rum"),
                measure: String::from("2 oz"),
            }]),
            instructions: String::from("Shake with ice."),
            glass: String::from("Cocktail glass"),
            category: String::from("Cocktail"),
            image: None,
            is_custom: true,
            owner_id,
            is_public,
            created_at: Utc::now(),
        }
    }

    fn group(name: &str) -> FavoriteGroup {
        FavoriteGroup {
            id: 1,
            name: name.to_string(),
            recipes: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn private_recipe_is_only_visible_to_owner() {
        let private = recipe(Some(7), false);
        assert!(private.is_visible_to(Some(7)));
        assert!(!private.is_visible_to(Some(8)));
        assert!(!private.is_visible_to(None));
        assert_eq!(private.ensure_visible_to(None).unwrap_err().code, 403);
    }

    #[test]
    fn public_recipe_is_visible_to_everyone() {
        let public = recipe(None, true);
        assert!(public.is_visible_to(None));
        assert!(public.is_visible_to(Some(3)));
    }

    #[test]
    fn anonymous_recipe_has_no_owner() {
        let public = recipe(None, true);
        assert!(!public.is_owned_by(None));
        assert_eq!(public.ensure_owned_by(1).unwrap_err().code, 403);
    }

    #[test]
    fn default_group_cannot_be_deleted() {
        let error = group(DEFAULT_FAVORITE_GROUP).ensure_deletable().unwrap_err();
        assert_eq!(error.code, 400);
        assert_eq!(error.message(), "Cannot delete the default group");
        assert!(group("Tiki night").ensure_deletable().is_ok());
    }

    #[test]
    fn references_are_a_set() {
        let mut group = group(DEFAULT_FAVORITE_GROUP);
        assert!(group.insert_reference("11007"));
        assert!(!group.insert_reference("11007"));
        assert!(group.insert_reference("42"));
        assert_eq!(group.recipes, vec!["11007", "42"]);

        assert!(group.remove_reference("11007"));
        assert!(!group.remove_reference("11007"));
        assert_eq!(group.recipes, vec!["42"]);
    }

    #[test]
    fn metadata_type_parses_known_names() {
        for r#type in MetadataType::ALL {
            assert_eq!(r#type.as_str().parse::<MetadataType>().unwrap(), r#type);
        }
        assert!("garnish".parse::<MetadataType>().is_err());
    }

    #[test]
    fn recipe_serializes_in_camel_case() {
        let value = serde_json::to_value(recipe(Some(2), false)).unwrap();
        assert_eq!(value["isPublic"], false);
        assert_eq!(value["isCustom"], true);
        assert_eq!(value["owner"], 2);
        assert_eq!(value["ingredients"][0]["measure"], "2 oz");
        assert!(value.get("createdAt").is_some());
    }
}
