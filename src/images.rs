use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde_json::{json, Value};

use crate::{
    constants::{GEMINI_IMAGE_MODEL, PLACEHOLDER_INGREDIENT_ICON, PLACEHOLDER_RECIPE_IMAGE},
    error::{Error, HtmlError},
    proxy::client::fetch_json,
    schema::Recipe,
};

pub const IMAGE_ROUTE: &str = "/api/images";

fn io_error(e: std::io::Error) -> Error {
    log::error!("Image storage failed: {e}");
    HtmlError::InternalServerError.new("Failed to store image")
}

/// Lower-case alphanumerics, everything else becomes `_`.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

pub fn recipe_prompt(recipe: &Recipe) -> String {
    format!(
        "Generate a photorealistic, high-quality image of a cocktail named \"{}\". \
         It contains: {}. \
         Served in a {}. \
         The lighting should be moody and elegant, suitable for a premium bar menu.",
        recipe.name,
        recipe.ingredient_names().join(", "),
        recipe.glass
    )
}

pub fn icon_prompt(ingredient: &str) -> String {
    format!(
        "Generate a simple, flat, minimalist vector icon of \"{ingredient}\". \
         Isolated on a transparent background. \
         The style should be clean and suitable for a cocktail app ingredient list."
    )
}

fn inline_image(response: &Value) -> Option<&str> {
    response
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?
        .iter()
        .find_map(|part| part.get("inlineData")?.get("data")?.as_str())
}

fn decode(data: &str) -> Result<Vec<u8>, Error> {
    STANDARD
        .decode(data)
        .map_err(|e| HtmlError::InternalServerError.new(&format!("Invalid image data: {e}")))
}

/// Produces recipe images and ingredient icons and stores them under the
/// image directory served at [`IMAGE_ROUTE`].
#[derive(Clone)]
pub struct ImageGenerator {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    image_dir: PathBuf,
}

impl ImageGenerator {
    pub fn new(http: Client, base_url: &str, api_key: Option<String>, image_dir: PathBuf) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            image_dir,
        }
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    /// Without a key the placeholder is returned instead of calling out.
    async fn generate(&self, prompt: &str, placeholder: &str) -> Result<Vec<u8>, Error> {
        let key = match self.api_key.as_deref() {
            Some(key) => key,
            None => {
                log::warn!("GOOGLE_API_KEY is missing, using a placeholder image");
                return decode(placeholder);
            }
        };

        log::trace!("> Image prompt: {prompt}");
        let request = self
            .http
            .post(format!(
                "{}/models/{GEMINI_IMAGE_MODEL}:generateContent",
                self.base_url
            ))
            .header("x-goog-api-key", key)
            .json(&json!({ "contents": [{ "parts": [{ "text": prompt }] }] }));

        let response = fetch_json(
            request,
            |body| {
                body.get("error")?
                    .get("message")?
                    .as_str()
                    .map(String::from)
            },
            "Image generation failed",
        )
        .await?;

        let data = inline_image(&response)
            .ok_or_else(|| HtmlError::Upstream(502).new("No image data in response"))?;
        decode(data)
    }

    async fn store(&self, folder: &str, file: &str, bytes: &[u8]) -> Result<String, Error> {
        let dir = self.image_dir.join(folder);
        tokio::fs::create_dir_all(&dir).await.map_err(io_error)?;
        tokio::fs::write(dir.join(file), bytes)
            .await
            .map_err(io_error)?;

        log::info!("Stored image {folder}/{file}");
        Ok(format!("{IMAGE_ROUTE}/{folder}/{file}"))
    }

    /// Generates an image for a stored recipe and returns its URL.
    pub async fn recipe_image(&self, recipe: &Recipe) -> Result<String, Error> {
        let bytes = self
            .generate(&recipe_prompt(recipe), PLACEHOLDER_RECIPE_IMAGE)
            .await?;
        self.store("recipes", &format!("recipe-{}.png", recipe.id), &bytes)
            .await
    }

    /// Returns the icon URL, generating the icon on first request.
    pub async fn ingredient_icon(&self, name: &str) -> Result<String, Error> {
        let file = format!("{}.png", sanitize_name(name));

        let existing = self.image_dir.join("ingredients").join(&file);
        if tokio::fs::try_exists(&existing).await.unwrap_or(false) {
            return Ok(format!("{IMAGE_ROUTE}/ingredients/{file}"));
        }

        let bytes = self
            .generate(&icon_prompt(name), PLACEHOLDER_INGREDIENT_ICON)
            .await?;
        self.store("ingredients", &file, &bytes).await
    }
}
