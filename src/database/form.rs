use serde::Deserialize;
use serde_json::Value;

use super::{
    error::TypeError,
    schema::{Id, Ingredient, Recipe},
};
use crate::constants::{DEFAULT_CATEGORY, DEFAULT_GLASS};

fn required(value: Option<String>, message: &str) -> Result<String, TypeError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(TypeError::new(message)),
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct IngredientForm {
    pub name: Option<String>,
    pub measure: Option<String>,
}

fn parse_ingredients(ingredients: Vec<IngredientForm>) -> Result<Vec<Ingredient>, TypeError> {
    ingredients
        .into_iter()
        .map(|i| {
            Ok(Ingredient {
                name: required(i.name, "Ingredient name is required")?,
                measure: i.measure.map(|m| m.trim().to_string()).unwrap_or_default(),
            })
        })
        .collect()
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RecipeForm {
    pub name: Option<String>,
    pub ingredients: Option<Vec<IngredientForm>>,
    pub instructions: Option<String>,
    pub glass: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRecipe {
    pub name: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: String,
    pub glass: String,
    pub category: String,
    pub image: Option<String>,
    pub is_public: bool,
}

impl TryFrom<RecipeForm> for NewRecipe {
    type Error = TypeError;

    fn try_from(form: RecipeForm) -> Result<Self, Self::Error> {
        Ok(Self {
            name: required(form.name, "Recipe name is required")?,
            ingredients: parse_ingredients(form.ingredients.unwrap_or_default())?,
            instructions: required(form.instructions, "Instructions are required")?,
            glass: optional(form.glass).unwrap_or_else(|| DEFAULT_GLASS.to_string()),
            category: optional(form.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            image: optional(form.image),
            is_public: form.is_public.unwrap_or(true),
        })
    }
}

/// Validated partial update; `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeUpdate {
    pub name: Option<String>,
    pub ingredients: Option<Vec<Ingredient>>,
    pub instructions: Option<String>,
    pub glass: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub is_public: Option<bool>,
}

impl TryFrom<RecipeForm> for RecipeUpdate {
    type Error = TypeError;

    fn try_from(form: RecipeForm) -> Result<Self, Self::Error> {
        Ok(Self {
            name: form
                .name
                .map(|n| required(Some(n), "Recipe name cannot be empty"))
                .transpose()?,
            ingredients: form.ingredients.map(parse_ingredients).transpose()?,
            instructions: form
                .instructions
                .map(|i| required(Some(i), "Instructions cannot be empty"))
                .transpose()?,
            glass: optional(form.glass),
            category: optional(form.category),
            image: form.image.map(|i| i.trim().to_string()),
            is_public: form.is_public,
        })
    }
}

impl RecipeUpdate {
    pub fn apply(self, recipe: &mut Recipe) {
        if let Some(name) = self.name {
            recipe.name = name;
        }
        if let Some(ingredients) = self.ingredients {
            recipe.ingredients.0 = ingredients;
        }
        if let Some(instructions) = self.instructions {
            recipe.instructions = instructions;
        }
        if let Some(glass) = self.glass {
            recipe.glass = glass;
        }
        if let Some(category) = self.category {
            recipe.category = category;
        }
        if let Some(image) = self.image {
            recipe.image = Some(image).filter(|i| !i.is_empty());
        }
        if let Some(is_public) = self.is_public {
            recipe.is_public = is_public;
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct RecipeQuery {
    pub name: Option<String>,
}

impl RecipeQuery {
    /// `ILIKE` pattern matching the name filter as a literal substring.
    pub fn name_pattern(&self) -> String {
        let name = self.name.as_deref().map(str::trim).unwrap_or("");
        format!("%{}%", escape_like(name))
    }
}

pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct GroupForm {
    pub name: Option<String>,
}

impl GroupForm {
    pub fn name(self) -> Result<String, TypeError> {
        required(self.name, "Group name is required")
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteForm {
    pub recipe_id: Option<Value>,
    pub group_id: Option<Id>,
}

impl FavoriteForm {
    /// Recipe references arrive as strings or bare numbers.
    pub fn recipe_reference(&self) -> Result<String, TypeError> {
        match &self.recipe_id {
            Some(Value::String(id)) if !id.trim().is_empty() => Ok(id.trim().to_string()),
            Some(Value::Number(id)) => Ok(id.to_string()),
            _ => Err(TypeError::new("Recipe ID is required")),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteQuery {
    pub group_id: Option<Id>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct SignupForm {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl TryFrom<SignupForm> for NewUser {
    type Error = TypeError;

    fn try_from(form: SignupForm) -> Result<Self, Self::Error> {
        let email = required(form.email, "Email is required")?.to_lowercase();
        if !email.contains('@') {
            return Err(TypeError::new("Invalid email address"));
        }

        Ok(Self {
            username: required(form.username, "Username is required")?,
            email,
            password: form
                .password
                .filter(|p| !p.is_empty())
                .ok_or_else(|| TypeError::new("Password is required"))?,
        })
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct SigninForm {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl SigninForm {
    pub fn credentials(self) -> Result<(String, String), TypeError> {
        let email = required(self.email, "Email is required")?.to_lowercase();
        let password = self
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| TypeError::new("Password is required"))?;
        Ok((email, password))
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct IconForm {
    pub name: Option<String>,
}

impl IconForm {
    pub fn name(self) -> Result<String, TypeError> {
        required(self.name, "Ingredient name is required")
    }
}
