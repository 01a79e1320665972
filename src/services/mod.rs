pub mod checkins;
pub mod customers;
pub mod debts;
pub mod departures;
pub mod feedbacks;
pub mod pricing;
pub mod quotes;
pub mod rbac;
pub mod service_bookings;
pub mod special_requests;
pub mod staff;
pub mod supplier_ratings;
pub mod suppliers;
pub mod tours;
pub mod transactions;

use crate::{errors::ServiceError, PaginatedResponse};
use sea_orm::{ConnectionTrait, EntityTrait, FromQueryResult, PaginatorTrait, Select};

/// Runs `select` as one page of at most `limit` rows.
pub(crate) async fn paginate<E, C>(
    select: Select<E>,
    db: &C,
    page: u64,
    limit: u64,
) -> Result<PaginatedResponse<E::Model>, ServiceError>
where
    E: EntityTrait,
    E::Model: FromQueryResult + Send + Sync + 'static,
    C: ConnectionTrait,
{
    let page = page.max(1);
    let limit = limit.max(1);
    let paginator = select.paginate(db, limit);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page - 1).await?;
    Ok(PaginatedResponse::new(items, total, page, limit))
}

/// Trims an optional text field, mapping blank input to `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
