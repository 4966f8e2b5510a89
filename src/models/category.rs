use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub kind: String,
}

impl Category {
    /// Lists every category, id order.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM categories ORDER BY id
            "#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM categories WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// The `{ "<id>": "<kind>" }` map every listing response carries.
    pub fn as_map(categories: &[Category]) -> BTreeMap<i64, String> {
        categories
            .iter()
            .map(|c| (c.id, c.kind.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_map_keys_by_id() {
        let categories = vec![
            Category {
                id: 2,
                kind: "Art".to_string(),
            },
            Category {
                id: 1,
                kind: "Science".to_string(),
            },
        ];

        let map = Category::as_map(&categories);
        assert_eq!(map.len(), 2);
        assert_eq!(map[&1], "Science");
        assert_eq!(map[&2], "Art");
    }
}
