//! Seed records for the in-memory store.

use super::{Recipe, RecipeId};

pub(super) fn sample_recipes() -> Vec<Recipe> {
    vec![
        Recipe::new("Banana Bread")
            .with_id(RecipeId(1))
            .with_image("banana-bread")
            .with_favorite(true)
            .with_ingredients([
                "3 ripe bananas",
                "1/3 cup melted butter",
                "3/4 cup sugar",
                "1 egg",
                "1 1/2 cups flour",
                "1 tsp baking soda",
            ])
            .with_directions([
                "Preheat the oven to 350°F.",
                "Mash the bananas and stir in the butter.",
                "Mix in sugar, egg, baking soda, then flour.",
                "Bake for 60 minutes.",
            ]),
        Recipe::new("Chocolate Chip Cookies")
            .with_id(RecipeId(2))
            .with_image("chocolate-chip-cookies")
            .with_ingredients([
                "1 cup butter",
                "1 cup brown sugar",
                "2 eggs",
                "2 1/4 cups flour",
                "2 cups chocolate chips",
            ])
            .with_directions([
                "Cream the butter and sugar.",
                "Beat in the eggs, then the flour.",
                "Fold in the chips and bake at 375°F for 10 minutes.",
            ]),
        Recipe::new("Gazpacho")
            .with_id(RecipeId(3))
            .with_image("gazpacho")
            .with_ingredients(["6 tomatoes", "1 cucumber", "1 red pepper", "olive oil"])
            .with_directions(["Blend everything.", "Chill for two hours."]),
        Recipe::new("Mushroom Risotto")
            .with_id(RecipeId(4))
            .with_image("mushroom-risotto")
            .with_favorite(true)
            .with_ingredients([
                "1 1/2 cups arborio rice",
                "6 cups stock",
                "1 lb mushrooms",
                "1/2 cup parmesan",
            ])
            .with_directions([
                "Saute the mushrooms and set aside.",
                "Toast the rice, then add stock a ladle at a time.",
                "Stir in mushrooms and parmesan.",
            ]),
    ]
}
