use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202601050006_create_attendance_records"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("attendance_records"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("student_id"))
                            .big_integer()
                            .not_null(),
                    )
                    // NULL exam_id means general (non-exam) attendance.
                    .col(ColumnDef::new(Alias::new("exam_id")).big_integer().null())
                    .col(ColumnDef::new(Alias::new("rfid_uid")).string().not_null())
                    // entry_at stays NULL when the first-ever scan for the
                    // tuple was an exit scan.
                    .col(ColumnDef::new(Alias::new("entry_at")).timestamp().null())
                    .col(ColumnDef::new(Alias::new("entry_time")).string_len(8).null())
                    .col(ColumnDef::new(Alias::new("exit_at")).timestamp().null())
                    .col(ColumnDef::new(Alias::new("exit_time")).string_len(8).null())
                    // Civil date in the configured timezone; the reconciliation key.
                    .col(
                        ColumnDef::new(Alias::new("attendance_date"))
                            .string_len(10)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("day_of_week")).string().not_null())
                    .col(
                        ColumnDef::new(Alias::new("status"))
                            .string()
                            .not_null()
                            .default("present"),
                    )
                    // Latest scan direction, not a cumulative has-entered /
                    // has-exited pair. Kept as the original recorded it.
                    .col(
                        ColumnDef::new(Alias::new("entry_type"))
                            .string()
                            .not_null()
                            .default("entry"),
                    )
                    .col(
                        ColumnDef::new(Alias::new("seat_number"))
                            .string_len(10)
                            .null(),
                    )
                    .col(ColumnDef::new(Alias::new("exam_code")).string().null())
                    .col(ColumnDef::new(Alias::new("exam_name")).string().null())
                    .col(ColumnDef::new(Alias::new("exam_subject")).string().null())
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp()
                            .not_null()
                            .default(Expr::cust("CURRENT_TIMESTAMP")),
                    )
                    .col(
                        ColumnDef::new(Alias::new("updated_at"))
                            .timestamp()
                            .not_null()
                            .default(Expr::cust("CURRENT_TIMESTAMP")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attendance_student")
                            .from(Alias::new("attendance_records"), Alias::new("student_id"))
                            .to(Alias::new("students"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attendance_exam")
                            .from(Alias::new("attendance_records"), Alias::new("exam_id"))
                            .to(Alias::new("exams"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_attendance_student_day_exam")
                    .table(Alias::new("attendance_records"))
                    .col(Alias::new("student_id"))
                    .col(Alias::new("attendance_date"))
                    .col(Alias::new("exam_id"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        // SQL treats NULLs as distinct in unique indexes, so the composite
        // index above cannot stop two general-attendance rows for the same
        // (student, day). A partial unique index covers that case; sea-query's
        // index builder has no WHERE clause, hence raw SQL.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS uq_attendance_student_day_general \
                 ON attendance_records (student_id, attendance_date) WHERE exam_id IS NULL",
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_attendance_rfid_uid")
                    .table(Alias::new("attendance_records"))
                    .col(Alias::new("rfid_uid"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_attendance_date")
                    .table(Alias::new("attendance_records"))
                    .col(Alias::new("attendance_date"))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(Alias::new("attendance_records"))
                    .to_owned(),
            )
            .await
    }
}
