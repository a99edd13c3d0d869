use super::{MAX_DESCRIPTION_CHARS, MAX_TITLE_CHARS, SeoInput};

/// Builds the single instruction sent to the text-generation API.
pub fn build_prompt(input: &SeoInput<'_>, context: Option<&str>) -> String {
    let categories = if input.categories.is_empty() {
        "none".to_string()
    } else {
        input
            .categories
            .iter()
            .map(|category| category.label())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let context = context
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| format!("\nStore context: {value}\n"))
        .unwrap_or_default();

    format!(
        r#"You are an experienced SEO specialist and copywriter writing metadata for an online store.
{context}
I will provide a product's name, a short description, a detailed description (Markdown) and its categories.

Your task:
1. Understand the key product attributes and what sets this product apart.
2. Write an SEO-friendly meta title of at most {MAX_TITLE_CHARS} characters that clearly identifies the product and its main benefit.
3. Write an SEO-friendly meta description of at most {MAX_DESCRIPTION_CHARS} characters that explains the product, its use cases and its key features.

Output your response as valid JSON, exactly like this:

{{
  "meta_title": "Your meta title here",
  "meta_description": "Your meta description here"
}}

Important:
- The meta title must be {MAX_TITLE_CHARS} characters or fewer.
- The meta description must be {MAX_DESCRIPTION_CHARS} characters or fewer.
- Use natural, human-readable language.
- Do not include anything except the JSON object in your response.
- Ensure the JSON is valid and properly escaped.

Here is the product information:

- Product Name: {name}
- Short Description: {short_description}
- Full Description: {description}
- Categories: {categories}
"#,
        name = input.name,
        short_description = input.short_description,
        description = input.description,
    )
}
