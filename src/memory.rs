//! Repositories over plain vectors, for handler tests.

use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::meals::repo::{Meal, MealChanges, MealCounts, MealRepo};
use crate::users::repo::{EmailTaken, User, UserRepo};

#[derive(Default)]
pub struct MemoryMealRepo {
    rows: Mutex<Vec<Meal>>,
}

#[async_trait]
impl MealRepo for MemoryMealRepo {
    async fn insert(&self, meal: &Meal) -> anyhow::Result<()> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|m| m.id == meal.id) {
            anyhow::bail!("duplicate meal id {}", meal.id);
        }
        rows.push(meal.clone());
        Ok(())
    }

    async fn list_by_user(&self, user_id: &str) -> anyhow::Result<Vec<Meal>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().filter(|m| m.user_id == user_id).cloned().collect())
    }

    async fn find(&self, user_id: &str, id: Uuid) -> anyhow::Result<Option<Meal>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .find(|m| m.id == id && m.user_id == user_id)
            .cloned())
    }

    async fn update(&self, user_id: &str, id: Uuid, changes: &MealChanges) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let Some(meal) = rows.iter_mut().find(|m| m.id == id && m.user_id == user_id) else {
            return Ok(false);
        };
        meal.name = changes.name.clone();
        meal.description = changes.description.clone();
        meal.is_on_diet = changes.is_on_diet;
        meal.date = changes.date;
        Ok(true)
    }

    async fn delete(&self, user_id: &str, id: Uuid) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|m| !(m.id == id && m.user_id == user_id));
        Ok(rows.len() < before)
    }

    async fn counts(&self, user_id: &str) -> anyhow::Result<MealCounts> {
        let rows = self.rows.lock().unwrap();
        let mut counts = MealCounts::default();
        for meal in rows.iter().filter(|m| m.user_id == user_id) {
            counts.total += 1;
            if meal.is_on_diet {
                counts.on_diet += 1;
            } else {
                counts.off_diet += 1;
            }
        }
        Ok(counts)
    }
}

#[derive(Default)]
pub struct MemoryUserRepo {
    rows: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, id: Uuid, name: &str, email: &str) -> anyhow::Result<User> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|u| u.email == email) {
            return Err(EmailTaken.into());
        }
        let user = User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        rows.push(user.clone());
        Ok(user)
    }
}
