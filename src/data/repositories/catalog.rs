use chrono::Utc;
use diesel::prelude::*;
use diesel::sql_types::Integer;

use crate::data::models::{Item, Lesson, NewItem};
use crate::schema::{items, lessons};

pub struct CatalogRepository;

impl CatalogRepository {
    pub fn create_lesson(
        conn: &mut SqliteConnection,
        user_id: i32,
        title: &str,
    ) -> Result<Lesson, diesel::result::Error> {
        diesel::insert_into(lessons::table)
            .values((lessons::user_id.eq(user_id), lessons::title.eq(title)))
            .execute(conn)?;

        let lesson_id = last_insert_rowid(conn)?;
        Ok(Lesson {
            lesson_id,
            user_id,
            title: title.to_string(),
        })
    }

    pub fn list_lessons(
        conn: &mut SqliteConnection,
        user_id: i32,
    ) -> Result<Vec<Lesson>, diesel::result::Error> {
        lessons::table
            .filter(lessons::user_id.eq(user_id))
            .select(Lesson::as_select())
            .load(conn)
    }

    /// A lesson, only if it belongs to the given user.
    pub fn find_lesson(
        conn: &mut SqliteConnection,
        lesson_id: i32,
        user_id: i32,
    ) -> Result<Option<Lesson>, diesel::result::Error> {
        lessons::table
            .filter(lessons::lesson_id.eq(lesson_id))
            .filter(lessons::user_id.eq(user_id))
            .select(Lesson::as_select())
            .first(conn)
            .optional()
    }

    pub fn add_item(
        conn: &mut SqliteConnection,
        lesson_id: i32,
        kind: &str,
        prompt: &str,
        options: Option<&[String]>,
        answer: &str,
    ) -> Result<Item, diesel::result::Error> {
        let options_json = match options {
            Some(list) if !list.is_empty() => Some(
                serde_json::to_string(list)
                    .map_err(|e| diesel::result::Error::SerializationError(Box::new(e)))?,
            ),
            _ => None,
        };

        diesel::insert_into(items::table)
            .values(&NewItem {
                lesson_id,
                kind,
                prompt,
                options: options_json,
                answer,
                added_at: Utc::now().naive_utc(),
            })
            .execute(conn)?;

        let item_id = last_insert_rowid(conn)?;
        items::table
            .filter(items::item_id.eq(item_id))
            .select(Item::as_select())
            .first(conn)
    }

    pub fn lesson_items(
        conn: &mut SqliteConnection,
        lesson_id: i32,
    ) -> Result<Vec<Item>, diesel::result::Error> {
        items::table
            .filter(items::lesson_id.eq(lesson_id))
            .select(Item::as_select())
            .load(conn)
    }

    pub fn find_item(
        conn: &mut SqliteConnection,
        item_id: i32,
    ) -> Result<Option<Item>, diesel::result::Error> {
        items::table
            .filter(items::item_id.eq(item_id))
            .select(Item::as_select())
            .first(conn)
            .optional()
    }

    /// Every item across the user's lessons, for the search feature.
    pub fn user_items(
        conn: &mut SqliteConnection,
        user_id: i32,
    ) -> Result<Vec<Item>, diesel::result::Error> {
        items::table
            .inner_join(lessons::table)
            .filter(lessons::user_id.eq(user_id))
            .select(Item::as_select())
            .load(conn)
    }

    /// Deletes a lesson and its items. Review rows are not touched;
    /// learning history outlives the content it was built on.
    pub fn delete_lesson(
        conn: &mut SqliteConnection,
        lesson_id: i32,
    ) -> Result<(), diesel::result::Error> {
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::delete(items::table.filter(items::lesson_id.eq(lesson_id))).execute(conn)?;
            diesel::delete(lessons::table.filter(lessons::lesson_id.eq(lesson_id))).execute(conn)?;
            Ok(())
        })
    }
}

fn last_insert_rowid(conn: &mut SqliteConnection) -> Result<i32, diesel::result::Error> {
    diesel::select(diesel::dsl::sql::<Integer>("last_insert_rowid()")).get_result::<i32>(conn)
}
