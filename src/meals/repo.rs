use anyhow::Context;
use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use time::Date;
use uuid::Uuid;

use super::repo_types::{MealEntry, MealEntryPatch, MealEntryRow, NewMealEntry};

/// Per-user meal storage. Every call is scoped to `user_id`.
#[async_trait]
pub trait MealStore: Send + Sync {
    /// Whole history, newest first.
    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<MealEntry>>;
    /// Entries dated `from..=to`, oldest first.
    async fn list_in_range(&self, user_id: Uuid, from: Date, to: Date) -> anyhow::Result<Vec<MealEntry>>;
    async fn get(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<MealEntry>>;
    async fn insert(&self, user_id: Uuid, entry: NewMealEntry) -> anyhow::Result<MealEntry>;
    async fn update(&self, user_id: Uuid, id: Uuid, patch: MealEntryPatch) -> anyhow::Result<Option<MealEntry>>;
    async fn delete(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool>;
}

const COLUMNS: &str = "id, created_at, entry_date, original_text, protein_g, carbs_g, fat_g, \
                       calories_kcal, alcohol_g, breakdown, reasoning, validation";

#[derive(Clone)]
pub struct PgMealStore {
    db: PgPool,
}

impl PgMealStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MealStore for PgMealStore {
    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<MealEntry>> {
        let rows = sqlx::query_as::<_, MealEntryRow>(&format!(
            "SELECT {COLUMNS} FROM meal_entries WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list meal entries")?;
        Ok(rows.into_iter().map(MealEntry::from).collect())
    }

    async fn list_in_range(&self, user_id: Uuid, from: Date, to: Date) -> anyhow::Result<Vec<MealEntry>> {
        let rows = sqlx::query_as::<_, MealEntryRow>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM meal_entries
            WHERE user_id = $1 AND entry_date BETWEEN $2 AND $3
            ORDER BY entry_date ASC, created_at ASC
            "#
        ))
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.db)
        .await
        .context("list meal entries in range")?;
        Ok(rows.into_iter().map(MealEntry::from).collect())
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<MealEntry>> {
        let row = sqlx::query_as::<_, MealEntryRow>(&format!(
            "SELECT {COLUMNS} FROM meal_entries WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("get meal entry")?;
        Ok(row.map(MealEntry::from))
    }

    async fn insert(&self, user_id: Uuid, entry: NewMealEntry) -> anyhow::Result<MealEntry> {
        let row = sqlx::query_as::<_, MealEntryRow>(&format!(
            r#"
            INSERT INTO meal_entries (id, user_id, entry_date, original_text, protein_g, carbs_g,
                                      fat_g, calories_kcal, alcohol_g, breakdown, reasoning, validation)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(entry.date)
        .bind(&entry.original_text)
        .bind(i64::from(entry.macros.protein))
        .bind(i64::from(entry.macros.carbs))
        .bind(i64::from(entry.macros.fat))
        .bind(i64::from(entry.macros.calories))
        .bind(entry.macros.alcohol_info.map(|a| a.alcohol))
        .bind(Json(&entry.breakdown))
        .bind(&entry.reasoning)
        .bind(&entry.validation)
        .fetch_one(&self.db)
        .await
        .context("insert meal entry")?;
        Ok(row.into())
    }

    async fn update(&self, user_id: Uuid, id: Uuid, patch: MealEntryPatch) -> anyhow::Result<Option<MealEntry>> {
        let Some(mut entry) = self.get(user_id, id).await? else {
            return Ok(None);
        };
        patch.apply(&mut entry);

        let row = sqlx::query_as::<_, MealEntryRow>(&format!(
            r#"
            UPDATE meal_entries
            SET protein_g = $3, carbs_g = $4, fat_g = $5, calories_kcal = $6,
                alcohol_g = $7, breakdown = $8
            WHERE id = $1 AND user_id = $2
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(i64::from(entry.macros.protein))
        .bind(i64::from(entry.macros.carbs))
        .bind(i64::from(entry.macros.fat))
        .bind(i64::from(entry.macros.calories))
        .bind(entry.macros.alcohol_info.map(|a| a.alcohol))
        .bind(Json(&entry.breakdown))
        .fetch_optional(&self.db)
        .await
        .context("update meal entry")?;
        Ok(row.map(MealEntry::from))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM meal_entries WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete meal entry")?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::sync::Mutex;

    use time::OffsetDateTime;

    use super::*;

    /// In-process store for handler and service tests.
    #[derive(Default)]
    pub struct MemoryMealStore {
        rows: Mutex<Vec<(Uuid, MealEntry)>>,
        pub fail_reads: bool,
    }

    impl MemoryMealStore {
        pub fn failing() -> Self {
            Self {
                fail_reads: true,
                ..Self::default()
            }
        }

        pub fn seed(&self, user_id: Uuid, entry: MealEntry) {
            self.rows.lock().unwrap().push((user_id, entry));
        }
    }

    #[async_trait]
    impl MealStore for MemoryMealStore {
        async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<MealEntry>> {
            anyhow::ensure!(!self.fail_reads, "store unavailable");
            let rows = self.rows.lock().unwrap();
            let mut out: Vec<MealEntry> = rows
                .iter()
                .filter(|(owner, _)| *owner == user_id)
                .map(|(_, e)| e.clone())
                .collect();
            out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            Ok(out)
        }

        async fn list_in_range(&self, user_id: Uuid, from: Date, to: Date) -> anyhow::Result<Vec<MealEntry>> {
            let mut out: Vec<MealEntry> = self
                .list_for_user(user_id)
                .await?
                .into_iter()
                .filter(|e| e.date >= from && e.date <= to)
                .collect();
            out.sort_by(|a, b| (a.date, a.timestamp).cmp(&(b.date, b.timestamp)));
            Ok(out)
        }

        async fn get(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<MealEntry>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .find(|(owner, e)| *owner == user_id && e.id == id)
                .map(|(_, e)| e.clone()))
        }

        async fn insert(&self, user_id: Uuid, entry: NewMealEntry) -> anyhow::Result<MealEntry> {
            let stored = MealEntry {
                id: Uuid::new_v4(),
                timestamp: OffsetDateTime::now_utc(),
                date: entry.date,
                original_text: entry.original_text,
                macros: entry.macros,
                breakdown: entry.breakdown,
                reasoning: entry.reasoning,
                validation: entry.validation,
            };
            self.rows.lock().unwrap().push((user_id, stored.clone()));
            Ok(stored)
        }

        async fn update(&self, user_id: Uuid, id: Uuid, patch: MealEntryPatch) -> anyhow::Result<Option<MealEntry>> {
            let mut rows = self.rows.lock().unwrap();
            let Some((_, entry)) = rows.iter_mut().find(|(owner, e)| *owner == user_id && e.id == id) else {
                return Ok(None);
            };
            patch.apply(entry);
            Ok(Some(entry.clone()))
        }

        async fn delete(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|(owner, e)| !(*owner == user_id && e.id == id));
            Ok(rows.len() < before)
        }
    }
}
