use sqlx::{Executor, Sqlite};

use super::RepositoryError;
use super::models::CatalogAnimal;

/// Looks up the catalog entry whose name or species contains `label`,
/// ignoring ASCII case. The lowest id wins when several entries match.
///
/// Takes any executor, a pool or a single connection.
/// Only "no row" maps to `Ok(None)`; every other failure is an error.
pub async fn find_match<'e, E>(executor: E, label: &str) -> Result<Option<CatalogAnimal>, RepositoryError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let label = label.trim();
    if label.is_empty() {
        return Ok(None);
    }

    let pattern = format!("%{}%", escape_like(label));
    let animal = sqlx::query_as::<_, CatalogAnimal>(
        r#"
        SELECT id, name, species, habitat, diet, description
        FROM animals
        WHERE name LIKE ?1 ESCAPE '\'
           OR species LIKE ?1 ESCAPE '\'
        ORDER BY id
        LIMIT 1
        "#,
    )
    .bind(pattern)
    .fetch_optional(executor)
    .await?;

    log::debug!(
        "Catalog lookup for '{}': {}",
        label,
        animal.as_ref().map(|a| a.name.as_str()).unwrap_or("no match")
    );
    Ok(animal)
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
