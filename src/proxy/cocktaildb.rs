use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use warp::reply::Response;

use super::client::{fetch_json, forward, no_message};
use crate::{
    database::error::TypeError,
    error::{Error, HtmlError},
    parser::Drink,
    schema::MetadataType,
};

const REQUEST_FAILED: &str = "CocktailDB API request failed";

/// Query string accepted by the search and filter endpoints; the first
/// non-empty parameter wins.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct CocktailQuery {
    pub s: Option<String>,
    pub f: Option<String>,
    pub i: Option<String>,
    pub c: Option<String>,
    pub a: Option<String>,
    pub r#type: Option<String>,
}

impl CocktailQuery {
    fn first_of(&self, keys: &[&'static str]) -> Option<(&'static str, String)> {
        keys.iter().find_map(|key| {
            let value = match *key {
                "s" => &self.s,
                "f" => &self.f,
                "i" => &self.i,
                "c" => &self.c,
                "a" => &self.a,
                _ => return None,
            };
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (*key, v.to_string()))
        })
    }

    pub fn search_parameter(&self) -> Result<(&'static str, String), TypeError> {
        self.first_of(&["s", "f", "i"])
            .ok_or_else(|| TypeError::new("Missing search parameter: s, f, or i required"))
    }

    pub fn filter_parameter(&self) -> Result<(&'static str, String), TypeError> {
        self.first_of(&["i", "c", "a"])
            .ok_or_else(|| TypeError::new("Missing filter parameter: i, c, or a required"))
    }

    pub fn lookup_id(&self) -> Result<String, TypeError> {
        self.first_of(&["i"])
            .map(|(_, id)| id)
            .ok_or_else(|| TypeError::new("Missing parameter: i (cocktail ID) required"))
    }

    pub fn list_parameter(&self) -> Result<&'static str, TypeError> {
        match self.r#type.as_deref() {
            Some("ingredients") => Ok("i"),
            Some("categories") => Ok("c"),
            Some("glasses") => Ok("g"),
            _ => Err(TypeError::new(
                "Missing or invalid type parameter: ingredients, categories, or glasses required",
            )),
        }
    }
}

#[derive(Clone)]
pub struct CocktailDb {
    http: Client,
    base_url: String,
}

impl CocktailDb {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn get(&self, endpoint: &str, query: &[(&str, &str)]) -> reqwest::RequestBuilder {
        self.http
            .get(format!("{}/{endpoint}", self.base_url))
            .query(query)
    }

    pub async fn search(&self, query: &CocktailQuery) -> Result<Response, Error> {
        let (key, value) = query.search_parameter()?;
        forward(self.get("search.php", &[(key, &value)]), no_message, REQUEST_FAILED).await
    }

    pub async fn filter(&self, query: &CocktailQuery) -> Result<Response, Error> {
        let (key, value) = query.filter_parameter()?;
        forward(self.get("filter.php", &[(key, &value)]), no_message, REQUEST_FAILED).await
    }

    pub async fn lookup(&self, query: &CocktailQuery) -> Result<Response, Error> {
        let id = query.lookup_id()?;
        forward(self.get("lookup.php", &[("i", &id)]), no_message, REQUEST_FAILED).await
    }

    pub async fn random(&self) -> Result<Response, Error> {
        forward(self.get("random.php", &[]), no_message, REQUEST_FAILED).await
    }

    pub async fn list(&self, query: &CocktailQuery) -> Result<Response, Error> {
        let key = query.list_parameter()?;
        forward(self.get("list.php", &[(key, "list")]), no_message, REQUEST_FAILED).await
    }

    /// Looks a drink up and normalises it into ingredients and steps.
    pub async fn drink(&self, query: &CocktailQuery) -> Result<Drink, Error> {
        let id = query.lookup_id()?;
        let response = fetch_json(self.get("lookup.php", &[("i", &id)]), no_message, REQUEST_FAILED)
            .await?;

        Drink::first_in_response(&response)
            .ok_or_else(|| HtmlError::NotFound.new("Cocktail not found"))
    }

    /// Values of one `list.php` listing, e.g. every glass name.
    pub async fn list_values(&self, r#type: MetadataType) -> Result<Vec<String>, Error> {
        let (key, field) = r#type.list_parameter();
        let response = fetch_json(self.get("list.php", &[(key, "list")]), no_message, REQUEST_FAILED)
            .await?;

        Ok(list_field(&response, field))
    }
}

fn list_field(response: &Value, field: &str) -> Vec<String> {
    response
        .get("drinks")
        .and_then(Value::as_array)
        .map(|drinks| {
            drinks
                .iter()
                .filter_map(|d| d.get(field).and_then(Value::as_str))
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
