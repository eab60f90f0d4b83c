use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Course, CreateCourseRequest, UpdateCourseRequest},
    error::{AppError, Result},
    repository::CourseRepository,
};

#[derive(FromRow)]
struct CourseRow {
    id: String,
    title: String,
    description: Option<String>,
    fee_cents: i64,
    category: Option<String>,
    course_type: Option<String>,
    image_file: String,
}

const COURSE_COLUMNS: &str =
    "id, title, description, fee_cents, category, course_type, image_file";

pub struct SqliteCourseRepository {
    pool: SqlitePool,
}

impl SqliteCourseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_course(row: CourseRow) -> Result<Course> {
        Ok(Course {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            title: row.title,
            description: row.description,
            fee_cents: row.fee_cents,
            category: row.category,
            course_type: row.course_type,
            image_file: row.image_file,
        })
    }
}

#[async_trait]
impl CourseRepository for SqliteCourseRepository {
    async fn create(&self, request: CreateCourseRequest) -> Result<Course> {
        if request.fee_cents < 0 {
            return Err(AppError::Validation("Course fee cannot be negative".to_string()));
        }

        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let image_file = request.image_file.unwrap_or_else(|| "default.jpg".to_string());

        sqlx::query(
            r#"
            INSERT INTO courses (id, title, description, fee_cents, category, course_type, image_file)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id_str)
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.fee_cents)
        .bind(&request.category)
        .bind(&request.course_type)
        .bind(&image_file)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created course".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>> {
        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?");
        let row = sqlx::query_as::<_, CourseRow>(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_course(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Course>> {
        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE title = ?");
        let row = sqlx::query_as::<_, CourseRow>(&sql)
            .bind(title)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::row_to_course(r)?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Course>> {
        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses ORDER BY title");
        let rows = sqlx::query_as::<_, CourseRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_course).collect()
    }

    async fn search(&self, query: &str) -> Result<Vec<Course>> {
        let sql = format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE title LIKE ? ORDER BY title"
        );
        let rows = sqlx::query_as::<_, CourseRow>(&sql)
            .bind(format!("%{query}%"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter().map(Self::row_to_course).collect()
    }

    async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM courses")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count)
    }

    async fn update(&self, id: Uuid, update: UpdateCourseRequest) -> Result<Course> {
        if update.fee_cents.is_some_and(|fee| fee < 0) {
            return Err(AppError::Validation("Course fee cannot be negative".to_string()));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

        sqlx::query(
            r#"
            UPDATE courses
            SET title = COALESCE(?, title),
                description = COALESCE(?, description),
                fee_cents = COALESCE(?, fee_cents),
                category = COALESCE(?, category),
                course_type = COALESCE(?, course_type),
                image_file = COALESCE(?, image_file)
            WHERE id = ?
            "#,
        )
        .bind(&update.title)
        .bind(&update.description)
        .bind(update.fee_cents)
        .bind(&update.category)
        .bind(&update.course_type)
        .bind(&update.image_file)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated course".to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        // Enrollments keep a course's payment history meaningful, so a
        // course with any enrollment row stays.
        let enrollments = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM enrollments WHERE course_id = ?",
        )
        .bind(id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if enrollments > 0 {
            return Err(AppError::Conflict(
                "Cannot delete a course that has enrollments".to_string(),
            ));
        }

        sqlx::query("DELETE FROM courses WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
