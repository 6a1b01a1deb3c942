//! Sample products, the resource the paid feature operates on.

use rand::Rng;
use rand::seq::SliceRandom;
use serde_json::json;

use crate::shopify::{AdminApi, Session, ShopifyError, mutation_payload};

pub const DEFAULT_PRODUCTS_COUNT: usize = 5;

const ADJECTIVES: &[&str] = &[
    "autumn", "hidden", "bitter", "misty", "silent", "empty", "dry", "dark", "summer", "icy",
    "delicate", "quiet", "white", "cool", "spring", "winter", "patient", "twilight", "dawn",
    "crimson", "wispy", "weathered", "blue", "billowing", "broken", "cold", "damp", "falling",
    "frosty", "green", "long",
];

const NOUNS: &[&str] = &[
    "waterfall", "river", "breeze", "moon", "rain", "wind", "sea", "morning", "snow", "lake",
    "sunset", "pine", "shadow", "leaf", "dawn", "glitter", "forest", "hill", "cloud", "meadow",
    "sun", "glade", "bird", "brook", "butterfly", "bush", "dew", "dust", "field", "fire",
    "flower",
];

const PRODUCTS_COUNT_QUERY: &str = r#"
query productsCount {
  productsCount {
    count
  }
}
"#;

const CREATE_PRODUCT_MUTATION: &str = r#"
mutation populateProduct($input: ProductInput!) {
  productCreate(input: $input) {
    product {
      id
    }
    userErrors {
      field
      message
    }
  }
}
"#;

pub async fn count(api: &dyn AdminApi, session: &Session) -> Result<u64, ShopifyError> {
    let data = api.graphql(session, PRODUCTS_COUNT_QUERY, json!({})).await?;
    data.pointer("/productsCount/count")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| ShopifyError::MissingData("productsCount.count".to_string()))
}

pub fn random_title<R: Rng + ?Sized>(rng: &mut R) -> String {
    let adjective = ADJECTIVES.choose(rng).copied().unwrap_or("quiet");
    let noun = NOUNS.choose(rng).copied().unwrap_or("river");
    format!("{} {}", adjective, noun)
}

/// Create `count` products with random titles. Returns the new product ids.
pub async fn create_products(
    api: &dyn AdminApi,
    session: &Session,
    count: usize,
) -> Result<Vec<String>, ShopifyError> {
    let mut ids = Vec::with_capacity(count);
    for _ in 0..count {
        // ThreadRng is not Send; keep it out of the await
        let title = random_title(&mut rand::thread_rng());
        let data = api
            .graphql(
                session,
                CREATE_PRODUCT_MUTATION,
                json!({ "input": { "title": title } }),
            )
            .await?;
        let payload = mutation_payload(&data, "productCreate")?;
        let id = payload
            .pointer("/product/id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ShopifyError::MissingData("productCreate.product.id".to_string()))?;
        ids.push(id.to_string());
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::test_support::{MockAdmin, session};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_random_title_uses_word_lists() {
        let mut rng = StdRng::seed_from_u64(7);
        let title = random_title(&mut rng);
        let (adjective, noun) = title.split_once(' ').unwrap();
        assert!(ADJECTIVES.contains(&adjective));
        assert!(NOUNS.contains(&noun));
    }

    #[tokio::test]
    async fn test_count() {
        let api = MockAdmin::new(json!({"productsCount": {"count": 12}}));
        assert_eq!(count(&api, &session()).await.unwrap(), 12);

        let api = MockAdmin::new(json!({}));
        assert!(matches!(
            count(&api, &session()).await,
            Err(ShopifyError::MissingData(_))
        ));
    }

    #[tokio::test]
    async fn test_create_products() {
        let api = MockAdmin::new(json!({})).with_mutation_data(json!({
            "productCreate": {"product": {"id": "gid://shopify/Product/1"}, "userErrors": []}
        }));
        let ids = create_products(&api, &session(), DEFAULT_PRODUCTS_COUNT)
            .await
            .unwrap();
        assert_eq!(ids.len(), DEFAULT_PRODUCTS_COUNT);

        let calls = api.calls();
        assert_eq!(calls.len(), DEFAULT_PRODUCTS_COUNT);
        assert!(calls[0].1["input"]["title"].as_str().unwrap().contains(' '));
    }

    #[tokio::test]
    async fn test_create_products_stops_on_user_error() {
        let api = MockAdmin::new(json!({})).with_mutation_data(json!({
            "productCreate": {"product": null, "userErrors": [{"field": ["title"], "message": "Title is too long"}]}
        }));
        let err = create_products(&api, &session(), 3).await.unwrap_err();
        assert!(err.to_string().contains("Title is too long"));
        assert_eq!(api.calls().len(), 1);
    }
}
