use sqlx::SqlitePool;
use std::path::Path;

use super::RepositoryError;
use super::models::NewAnimal;

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), RepositoryError> {
    // Catalog, seeded out of band and only ever read by the pipeline
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS animals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            species TEXT,
            habitat TEXT,
            diet TEXT,
            description TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    // One id sequence for both result stores
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS result_ids (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            kind TEXT NOT NULL CHECK (kind IN ('identified', 'unidentified')),
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS analysis_results (
            id INTEGER PRIMARY KEY,
            image_bucket TEXT NOT NULL,
            image_key TEXT NOT NULL,
            image_url TEXT NOT NULL,
            label TEXT NOT NULL,
            confidence REAL NOT NULL,
            matched_animal_id INTEGER,
            created_at TEXT NOT NULL,
            FOREIGN KEY (id) REFERENCES result_ids(id),
            FOREIGN KEY (matched_animal_id) REFERENCES animals(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS unidentified_animals (
            id INTEGER PRIMARY KEY,
            image_bucket TEXT NOT NULL,
            image_key TEXT NOT NULL,
            image_url TEXT NOT NULL,
            label TEXT NOT NULL,
            confidence REAL NOT NULL,
            review_status TEXT NOT NULL DEFAULT 'pending',
            created_at TEXT NOT NULL,
            FOREIGN KEY (id) REFERENCES result_ids(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS analysis_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            unidentified_id INTEGER NOT NULL,
            image_url TEXT NOT NULL,
            label TEXT NOT NULL,
            confidence REAL NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY (unidentified_id) REFERENCES unidentified_animals(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_analysis_log_unidentified ON analysis_log(unidentified_id)")
        .execute(pool)
        .await?;

    log::info!("Database schema is up to date");
    Ok(())
}

pub fn load_catalog_seed(path: &Path) -> Result<Vec<NewAnimal>, RepositoryError> {
    let source = std::fs::read_to_string(path).map_err(|e| {
        RepositoryError::InvalidData(format!("cannot read {}: {}", path.display(), e))
    })?;
    serde_yaml::from_str(&source).map_err(|e| {
        RepositoryError::InvalidData(format!("cannot parse {}: {}", path.display(), e))
    })
}

/// Inserts the seed animals when the catalog is empty. Returns how many rows
/// were written; an already populated catalog is left untouched.
pub async fn seed_catalog(pool: &SqlitePool, animals: &[NewAnimal]) -> Result<u64, RepositoryError> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM animals")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        log::info!("Catalog already holds {} animals, skipping seed", existing);
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    for animal in animals {
        sqlx::query(
            r#"
            INSERT INTO animals (name, species, habitat, diet, description)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&animal.name)
        .bind(&animal.species)
        .bind(&animal.habitat)
        .bind(&animal.diet)
        .bind(&animal.description)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    log::info!("Seeded catalog with {} animals", animals.len());
    Ok(animals.len() as u64)
}
