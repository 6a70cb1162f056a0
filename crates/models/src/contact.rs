use sea_orm::{entity::prelude::*, DatabaseConnection, DbErr, NotSet, QueryFilter, QueryOrder, Set};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contact")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub title: Option<String>,
    pub email: String,
    pub phone: String,
    pub filename: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { panic!("no relations defined here") }
}

impl ActiveModelBehavior for ActiveModel {}

/// Column values written by `create` and `replace`.
#[derive(Clone, Debug, PartialEq)]
pub struct ContactColumns<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub title: Option<&'a str>,
    pub email: &'a str,
    pub phone: &'a str,
    pub filename: Option<&'a str>,
}

/// Column widths of the `contact` table, in characters.
pub const MAX_NAME_LEN: usize = 128;
pub const MAX_TITLE_LEN: usize = 128;
pub const MAX_EMAIL_LEN: usize = 256;
pub const MAX_PHONE_LEN: usize = 64;

/// Every required field must be non-blank. The error names all missing ones.
pub fn validate_required(first_name: &str, last_name: &str, email: &str, phone: &str) -> Result<(), errors::ModelError> {
    let missing: Vec<&str> = [
        ("firstName", first_name),
        ("lastName", last_name),
        ("email", email),
        ("phone", phone),
    ]
    .into_iter()
    .filter(|(_, v)| v.trim().is_empty())
    .map(|(name, _)| name)
    .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(errors::ModelError::Validation(format!(
        "firstName, lastName, email and phone are required (missing: {})",
        missing.join(", ")
    )))
}

/// Values must fit the column widths; the error names every field that is too long.
pub fn validate_lengths(cols: &ContactColumns<'_>) -> Result<(), errors::ModelError> {
    let too_long: Vec<String> = [
        ("firstName", Some(cols.first_name), MAX_NAME_LEN),
        ("lastName", Some(cols.last_name), MAX_NAME_LEN),
        ("title", cols.title, MAX_TITLE_LEN),
        ("email", Some(cols.email), MAX_EMAIL_LEN),
        ("phone", Some(cols.phone), MAX_PHONE_LEN),
    ]
    .into_iter()
    .filter(|(_, v, max)| v.map_or(false, |v| v.chars().count() > *max))
    .map(|(name, _, max)| format!("{} (max {})", name, max))
    .collect();
    if too_long.is_empty() {
        return Ok(());
    }
    Err(errors::ModelError::Validation(format!("fields too long: {}", too_long.join(", "))))
}

fn validate(cols: &ContactColumns<'_>) -> Result<(), errors::ModelError> {
    validate_required(cols.first_name, cols.last_name, cols.email, cols.phone)?;
    validate_lengths(cols)
}

pub async fn list(db: &DatabaseConnection) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .order_by_asc(Column::Id)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find(db: &DatabaseConnection, id: i32) -> Result<Option<Model>, errors::ModelError> {
    Entity::find_by_id(id).one(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn create(db: &DatabaseConnection, cols: &ContactColumns<'_>) -> Result<Model, errors::ModelError> {
    validate(cols)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: NotSet,
        first_name: Set(cols.first_name.to_string()),
        last_name: Set(cols.last_name.to_string()),
        title: Set(cols.title.map(str::to_string)),
        email: Set(cols.email.to_string()),
        phone: Set(cols.phone.to_string()),
        filename: Set(cols.filename.map(str::to_string)),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Overwrite every mutable column of row `id`, provided its stored filename is
/// still `expected_filename`. `Ok(None)` when no row matches at the time of the UPDATE.
pub async fn replace(
    db: &DatabaseConnection,
    id: i32,
    expected_filename: Option<&str>,
    cols: &ContactColumns<'_>,
) -> Result<Option<Model>, errors::ModelError> {
    validate(cols)?;
    let am = ActiveModel {
        id: Set(id),
        first_name: Set(cols.first_name.to_string()),
        last_name: Set(cols.last_name.to_string()),
        title: Set(cols.title.map(str::to_string)),
        email: Set(cols.email.to_string()),
        phone: Set(cols.phone.to_string()),
        filename: Set(cols.filename.map(str::to_string)),
        created_at: NotSet,
        updated_at: Set(Utc::now().into()),
    };
    let same_file = match expected_filename {
        Some(name) => Column::Filename.eq(name),
        None => Column::Filename.is_null(),
    };
    match Entity::update(am).filter(same_file).exec(db).await {
        Ok(m) => Ok(Some(m)),
        Err(DbErr::RecordNotUpdated) => Ok(None),
        Err(e) => Err(errors::ModelError::Db(e.to_string())),
    }
}

/// Delete row `id`; returns whether a row was removed.
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, errors::ModelError> {
    let res = Entity::delete_by_id(id).exec(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(res.rows_affected > 0)
}
