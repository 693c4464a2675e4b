//! Normalisation of TheCocktailDB drink records.
//!
//! Drinks arrive with up to fifteen `strIngredientN` / `strMeasureN` pairs and
//! a single free-text instruction field; these helpers turn them into the
//! same ingredient list used by stored recipes plus numbered steps.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    constants::{COCKTAILDB_INGREDIENT_IMAGES, COCKTAILDB_INGREDIENT_SLOTS},
    schema::Ingredient,
};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DrinkIngredient {
    pub name: String,
    pub measure: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Drink {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub glass: Option<String>,
    pub alcoholic: Option<String>,
    pub image: Option<String>,
    pub ingredients: Vec<DrinkIngredient>,
    pub instructions: Vec<String>,
}

fn field<'a>(drink: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    drink
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl Drink {
    pub fn from_record(drink: &Map<String, Value>) -> Option<Self> {
        let id = match drink.get("idDrink")? {
            Value::String(id) => id.to_owned(),
            Value::Number(id) => id.to_string(),
            _ => return None,
        };

        Some(Self {
            id,
            name: field(drink, "strDrink")?.to_string(),
            category: field(drink, "strCategory").map(String::from),
            glass: field(drink, "strGlass").map(String::from),
            alcoholic: field(drink, "strAlcoholic").map(String::from),
            image: field(drink, "strDrinkThumb").map(String::from),
            ingredients: parse_ingredients(drink)
                .into_iter()
                .map(|i| DrinkIngredient {
                    image: ingredient_image_url(&i.name),
                    name: i.name,
                    measure: i.measure,
                })
                .collect(),
            instructions: field(drink, "strInstructions")
                .map(parse_instructions)
                .unwrap_or_default(),
        })
    }

    /// First drink of a `{"drinks": [...]}` response. CocktailDB answers
    /// unknown ids with `{"drinks": null}`.
    pub fn first_in_response(response: &Value) -> Option<Self> {
        response
            .get("drinks")?
            .as_array()?
            .first()?
            .as_object()
            .and_then(Self::from_record)
    }
}

pub fn parse_ingredients(drink: &Map<String, Value>) -> Vec<Ingredient> {
    (1..=COCKTAILDB_INGREDIENT_SLOTS)
        .filter_map(|i| {
            let name = field(drink, &format!("strIngredient{i}"))?;
            let measure = field(drink, &format!("strMeasure{i}")).unwrap_or("");
            Some(Ingredient {
                name: name.to_string(),
                measure: measure.to_string(),
            })
        })
        .collect()
}

/// Splits on a period followed by whitespace, or on a newline.
pub fn parse_instructions(text: &str) -> Vec<String> {
    let mut steps = vec![];
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\n' => steps.push(std::mem::take(&mut current)),
            '.' if chars.peek().is_some_and(|n| n.is_whitespace()) => {
                while chars.peek().is_some_and(|n| n.is_whitespace()) {
                    chars.next();
                }
                steps.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    steps.push(current);

    steps
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            if s.ends_with('.') {
                s.to_string()
            } else {
                format!("{s}.")
            }
        })
        .collect()
}

pub fn ingredient_image_url(name: &str) -> Option<String> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    Some(format!(
        "{COCKTAILDB_INGREDIENT_IMAGES}/{}-Small.png",
        encode_component(name)
    ))
}

/// Percent-encodes everything outside the URI-component unreserved set
/// (`A-Z a-z 0-9 - _ . ! ~ * ' ( )`).
fn encode_component(value: &str) -> String {
    urlencoding::encode(value)
        .replace("%21", "!")
        .replace("%2A", "*")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().to_owned()
    }

    #[test]
    fn ingredients_keep_slot_order_and_skip_blanks() {
        let drink = record(json!({
            "strIngredient1": "Light rum",
            "strMeasure1": "2 oz ",
            "strIngredient2": "Lime",
            "strMeasure2": null,
            "strIngredient3": "  ",
            "strIngredient4": "Sugar",
            "strMeasure4": "2 tsp",
            "strIngredient15": "Mint"
        }));

        let names: Vec<(String, String)> = parse_ingredients(&drink)
            .into_iter()
            .map(|i| (i.name, i.measure))
            .collect();

        assert_eq!(
            names,
            vec![
                (String::from("Light rum"), String::from("2 oz")),
                (String::from("Lime"), String::new()),
                (String::from("Sugar"), String::from("2 tsp")),
                (String::from("Mint"), String::new()),
            ]
        );
    }

    #[test]
    fn instructions_split_into_terminated_steps() {
        let steps = parse_instructions("Muddle mint with sugar. Add rum\nTop with soda.  Garnish");
        assert_eq!(
            steps,
            vec![
                "Muddle mint with sugar.",
                "Add rum.",
                "Top with soda.",
                "Garnish.",
            ]
        );
    }

    #[test]
    fn decimal_measures_are_not_split() {
        assert_eq!(
            parse_instructions("Pour 1.5 oz of gin."),
            vec!["Pour 1.5 oz of gin."]
        );
    }

    #[test]
    fn empty_instructions_have_no_steps() {
        assert!(parse_instructions(" \n \n").is_empty());
    }

    #[test]
    fn ingredient_images_are_percent_encoded() {
        assert_eq!(
            ingredient_image_url(" Triple sec ").unwrap(),
            "https://www.thecocktaildb.com/images/ingredients/Triple%20sec-Small.png"
        );
        assert_eq!(ingredient_image_url(""), None);
    }

    #[test]
    fn reserved_characters_in_ingredient_names_are_escaped() {
        assert_eq!(
            ingredient_image_url("Rum & Cola, 7:3 @bar$+;=").unwrap(),
            "https://www.thecocktaildb.com/images/ingredients/\
             Rum%20%26%20Cola%2C%207%3A3%20%40bar%24%2B%3B%3D-Small.png"
        );
        assert_eq!(
            ingredient_image_url("Bitters (Angostura)").unwrap(),
            "https://www.thecocktaildb.com/images/ingredients/Bitters%20(Angostura)-Small.png"
        );
    }

    #[test]
    fn drink_is_read_from_lookup_response() {
        let response = json!({
            "drinks": [{
                "idDrink": "11007",
                "strDrink": "Margarita",
                "strCategory": "Ordinary Drink",
                "strAlcoholic": "Alcoholic",
                "strGlass": "Cocktail glass",
                "strDrinkThumb": "https://www.thecocktaildb.com/images/media/drink/5noda61589575158.jpg",
                "strInstructions": "Rub the rim of the glass with the lime slice. Shake with ice",
                "strIngredient1": "Tequila",
                "strMeasure1": "1 1/2 oz "
            }]
        });

        let drink = Drink::first_in_response(&response).unwrap();
        assert_eq!(drink.id, "11007");
        assert_eq!(drink.glass.as_deref(), Some("Cocktail glass"));
        assert_eq!(drink.ingredients[0].measure, "1 1/2 oz");
        assert_eq!(drink.instructions.len(), 2);

        assert_eq!(Drink::first_in_response(&json!({"drinks": null})), None);
    }
}
