use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, QueryFilter};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    /// Registration number; immutable identity key, stored uppercase.
    pub reg_no: String,
    pub course: String,
    /// RFID card UID; immutable identity key, stored uppercase.
    pub rfid_uid: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::attendance_record::Entity")]
    AttendanceRecords,
    #[sea_orm(has_many = "super::exam_enrollment::Entity")]
    Enrollments,
}

impl Related<super::attendance_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttendanceRecords.def()
    }
}

impl Related<super::exam_enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DbConn,
        name: &str,
        reg_no: &str,
        course: &str,
        rfid_uid: &str,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();
        let student = ActiveModel {
            name: Set(name.trim().to_owned()),
            reg_no: Set(reg_no.trim().to_uppercase()),
            course: Set(course.trim().to_owned()),
            rfid_uid: Set(rfid_uid.trim().to_uppercase()),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        student.insert(db).await
    }

    /// Directory lookup used by the scan reconciler. The UID is normalized the
    /// same way it is stored, so card reads match regardless of reader casing.
    pub async fn find_by_rfid(db: &DbConn, rfid_uid: &str) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::RfidUid.eq(rfid_uid.trim().to_uppercase()))
            .filter(Column::Active.eq(true))
            .one(db)
            .await
    }

    pub async fn find_by_id(db: &DbConn, id: i64) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id).one(db).await
    }
}
