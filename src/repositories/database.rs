use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::FacilityRepository;
use crate::entities::facility::{self, Entity as FacilityEntity};
use crate::errors::ServiceError;
use crate::models::{Facility, RatingAggregate};

/// Facility store on top of a sea-orm connection pool.
#[derive(Debug, Clone)]
pub struct DatabaseFacilityRepository {
    db: Arc<DatabaseConnection>,
}

impl DatabaseFacilityRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl FacilityRepository for DatabaseFacilityRepository {
    #[instrument(skip(self, facility), fields(facility_id = %facility.facility_id))]
    async fn insert(&self, facility: Facility) -> Result<(), ServiceError> {
        let model: facility::ActiveModel = (&facility).into();
        FacilityEntity::insert(model)
            .exec_without_returning(self.get_db())
            .await?;
        Ok(())
    }

    async fn get(&self, facility_id: &str) -> Result<Option<Facility>, ServiceError> {
        FacilityEntity::find_by_id(facility_id.to_string())
            .one(self.get_db())
            .await?
            .map(Facility::try_from)
            .transpose()
    }

    async fn scan(&self) -> Result<Vec<Facility>, ServiceError> {
        let rows = FacilityEntity::find()
            .order_by_asc(facility::Column::CreatedAt)
            .order_by_asc(facility::Column::FacilityId)
            .all(self.get_db())
            .await?;
        debug!(rows = rows.len(), "scanned facilities table");
        rows.into_iter().map(Facility::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn apply_rating(
        &self,
        facility_id: &str,
        rating: Decimal,
    ) -> Result<Option<RatingAggregate>, ServiceError> {
        let txn = self.get_db().begin().await?;

        // Increment in place; the row stays locked until commit.
        let result = FacilityEntity::update_many()
            .col_expr(
                facility::Column::RatingCount,
                Expr::col(facility::Column::RatingCount).add(1),
            )
            .col_expr(
                facility::Column::RatingSum,
                Expr::col(facility::Column::RatingSum).add(rating),
            )
            .filter(facility::Column::FacilityId.eq(facility_id))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(None);
        }

        let row = FacilityEntity::find_by_id(facility_id.to_string())
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::Internal(format!("facility {} vanished mid-update", facility_id))
            })?;
        let aggregate = Facility::try_from(row)?.rating;

        FacilityEntity::update_many()
            .col_expr(
                facility::Column::RatingAverage,
                Expr::value(aggregate.average()),
            )
            .filter(facility::Column::FacilityId.eq(facility_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(Some(aggregate))
    }

    async fn ping(&self) -> Result<(), ServiceError> {
        self.get_db().ping().await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "database"
    }
}
