pub const DEFAULT_FAVORITE_GROUP: &str = "My Favorites";

pub const DEFAULT_GLASS: &str = "Highball glass";
pub const DEFAULT_CATEGORY: &str = "Cocktail";

pub const SESSION_LIFETIME_DAYS: i64 = 7;

pub const MAX_BODY_BYTES: u64 = 1024 * 64;
/// Chat bodies carry the whole conversation.
pub const MAX_CHAT_BODY_BYTES: u64 = 1024 * 1024 * 2;

pub const COCKTAILDB_URL: &str = "https://www.thecocktaildb.com/api/json/v1/1";
pub const COCKTAILDB_INGREDIENT_IMAGES: &str = "https://www.thecocktaildb.com/images/ingredients";
pub const DEEPL_URL: &str = "https://api-free.deepl.com/v2";
pub const OPENAI_URL: &str = "https://api.openai.com/v1";
pub const GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const OPENAI_DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const OPENAI_TEMPERATURE: f32 = 0.7;
pub const OPENAI_MAX_TOKENS: u32 = 500;

pub const GEMINI_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Highest `strIngredientN` / `strMeasureN` index in a CocktailDB drink.
pub const COCKTAILDB_INGREDIENT_SLOTS: usize = 15;

// 1x1 PNGs handed out when no image provider key is configured
pub const PLACEHOLDER_RECIPE_IMAGE: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";
pub const PLACEHOLDER_INGREDIENT_ICON: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";
