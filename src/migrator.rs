use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240601_000001_create_facilities_table::Migration)]
    }
}

mod m20240601_000001_create_facilities_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000001_create_facilities_table"
        }
    }

    // Aligned with entities::facility Model. Decimal columns carry no
    // precision so Postgres keeps the full scale of the stored value.
    pub(super) fn facilities_table() -> TableCreateStatement {
        Table::create()
            .table(Facilities::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Facilities::FacilityId)
                    .string()
                    .primary_key()
                    .not_null(),
            )
            .col(ColumnDef::new(Facilities::FacilityType).string().not_null())
            .col(ColumnDef::new(Facilities::Name).string().not_null())
            .col(
                ColumnDef::new(Facilities::Address)
                    .string()
                    .not_null()
                    .default(""),
            )
            .col(ColumnDef::new(Facilities::Lat).decimal().not_null())
            .col(ColumnDef::new(Facilities::Lon).decimal().not_null())
            .col(ColumnDef::new(Facilities::CreatedBy).string().not_null())
            .col(
                ColumnDef::new(Facilities::CreatedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .col(ColumnDef::new(Facilities::Features).json().not_null())
            .col(
                ColumnDef::new(Facilities::RatingCount)
                    .big_integer()
                    .not_null()
                    .default(0),
            )
            .col(
                ColumnDef::new(Facilities::RatingSum)
                    .decimal()
                    .not_null()
                    .default(0),
            )
            .col(
                ColumnDef::new(Facilities::RatingAverage)
                    .decimal()
                    .not_null()
                    .default(0),
            )
            .to_owned()
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager.create_table(facilities_table()).await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_facilities_facility_type")
                        .table(Facilities::Table)
                        .col(Facilities::FacilityType)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_facilities_created_at")
                        .table(Facilities::Table)
                        .col(Facilities::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Facilities::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Facilities {
        Table,
        FacilityId,
        FacilityType,
        Name,
        Address,
        Lat,
        Lon,
        CreatedBy,
        CreatedAt,
        Features,
        RatingCount,
        RatingSum,
        RatingAverage,
    }
}

#[cfg(test)]
mod tests {
    use super::m20240601_000001_create_facilities_table::facilities_table;
    use sea_orm_migration::prelude::*;

    #[test]
    fn decimal_columns_keep_full_scale_on_postgres() {
        let sql = facilities_table().to_string(PostgresQueryBuilder);
        assert!(sql.contains(r#""lat" decimal NOT NULL"#), "{}", sql);
        assert!(sql.contains(r#""lon" decimal NOT NULL"#), "{}", sql);
        assert!(sql.contains(r#""rating_sum" decimal NOT NULL"#), "{}", sql);
        assert!(!sql.contains("decimal("), "{}", sql);
    }
}
