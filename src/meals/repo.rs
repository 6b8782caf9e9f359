use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Meal record as stored in the `meals` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Meal {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub is_on_diet: bool,
    pub date: i64, // epoch ms
    pub user_id: String,
}

/// Replaceable columns of a meal.
#[derive(Debug, Clone)]
pub struct MealChanges {
    pub name: String,
    pub description: String,
    pub is_on_diet: bool,
    pub date: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct MealCounts {
    pub total: i64,
    pub off_diet: i64,
    pub on_diet: i64,
}

/// Every lookup and mutation is scoped to the owning session.
#[async_trait]
pub trait MealRepo: Send + Sync {
    async fn insert(&self, meal: &Meal) -> anyhow::Result<()>;
    async fn list_by_user(&self, user_id: &str) -> anyhow::Result<Vec<Meal>>;
    async fn find(&self, user_id: &str, id: Uuid) -> anyhow::Result<Option<Meal>>;
    /// Returns false when no row matched.
    async fn update(&self, user_id: &str, id: Uuid, changes: &MealChanges) -> anyhow::Result<bool>;
    /// Returns false when no row matched.
    async fn delete(&self, user_id: &str, id: Uuid) -> anyhow::Result<bool>;
    async fn counts(&self, user_id: &str) -> anyhow::Result<MealCounts>;
}

#[derive(Clone)]
pub struct PgMealRepo {
    db: PgPool,
}

impl PgMealRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MealRepo for PgMealRepo {
    async fn insert(&self, meal: &Meal) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO meals (id, name, description, is_on_diet, date, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(meal.id)
        .bind(&meal.name)
        .bind(&meal.description)
        .bind(meal.is_on_diet)
        .bind(meal.date)
        .bind(&meal.user_id)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn list_by_user(&self, user_id: &str) -> anyhow::Result<Vec<Meal>> {
        let rows = sqlx::query_as::<_, Meal>(
            r#"
            SELECT id, name, description, is_on_diet, date, user_id
            FROM meals
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find(&self, user_id: &str, id: Uuid) -> anyhow::Result<Option<Meal>> {
        let meal = sqlx::query_as::<_, Meal>(
            r#"
            SELECT id, name, description, is_on_diet, date, user_id
            FROM meals
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(meal)
    }

    async fn update(&self, user_id: &str, id: Uuid, changes: &MealChanges) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE meals
            SET name = $3, description = $4, is_on_diet = $5, date = $6
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(changes.is_on_diet)
        .bind(changes.date)
        .execute(&self.db)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete(&self, user_id: &str, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(r#"DELETE FROM meals WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn counts(&self, user_id: &str) -> anyhow::Result<MealCounts> {
        // single statement so the three numbers come from one snapshot
        let counts = sqlx::query_as::<_, MealCounts>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE NOT is_on_diet) AS off_diet,
                   COUNT(*) FILTER (WHERE is_on_diet) AS on_diet
            FROM meals
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;
        Ok(counts)
    }
}

#[cfg(test)]
mod pg_tests {
    use super::*;

    fn meal(user_id: &str, is_on_diet: bool) -> Meal {
        Meal {
            id: Uuid::new_v4(),
            name: "Lunch".into(),
            description: "Rice and beans".into(),
            is_on_diet,
            date: 1_704_110_400_000,
            user_id: user_id.into(),
        }
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL pointing at a Postgres server"]
    async fn scoped_crud_round_trip(pool: PgPool) {
        let repo = PgMealRepo::new(pool);
        let lunch = meal("u1", true);
        repo.insert(&lunch).await.unwrap();

        assert_eq!(repo.find("u1", lunch.id).await.unwrap(), Some(lunch.clone()));
        assert_eq!(repo.find("u2", lunch.id).await.unwrap(), None);
        assert_eq!(repo.list_by_user("u1").await.unwrap(), vec![lunch.clone()]);
        assert!(repo.list_by_user("u2").await.unwrap().is_empty());

        let changes = MealChanges {
            name: "Dinner".into(),
            description: "Pizza".into(),
            is_on_diet: false,
            date: 1_704_150_000_000,
        };
        assert!(!repo.update("u2", lunch.id, &changes).await.unwrap());
        assert!(repo.update("u1", lunch.id, &changes).await.unwrap());

        let stored = repo.find("u1", lunch.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Dinner");
        assert!(!stored.is_on_diet);
        assert_eq!(stored.date, 1_704_150_000_000);
        assert_eq!(stored.user_id, "u1");

        assert!(!repo.delete("u2", lunch.id).await.unwrap());
        assert!(repo.delete("u1", lunch.id).await.unwrap());
        assert_eq!(repo.find("u1", lunch.id).await.unwrap(), None);
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL pointing at a Postgres server"]
    async fn counts_split_by_flag(pool: PgPool) {
        let repo = PgMealRepo::new(pool);
        for (user, on_diet) in [("u1", true), ("u1", false), ("u1", false), ("u2", true)] {
            repo.insert(&meal(user, on_diet)).await.unwrap();
        }

        assert_eq!(
            repo.counts("u1").await.unwrap(),
            MealCounts { total: 3, off_diet: 2, on_diet: 1 }
        );
        assert_eq!(repo.counts("nobody").await.unwrap(), MealCounts::default());
    }
}
