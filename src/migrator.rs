use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_crm_tables::Migration),
            Box::new(m20250101_000002_create_catalog_tables::Migration),
            Box::new(m20250101_000003_create_departure_tables::Migration),
            Box::new(m20250101_000004_create_quotes_table::Migration),
            Box::new(m20250101_000005_create_supplier_operation_tables::Migration),
            Box::new(m20250101_000006_create_financial_tables::Migration),
            Box::new(m20250101_000007_create_feedbacks_table::Migration),
            Box::new(m20250101_000008_create_activity_checkins_table::Migration),
            Box::new(m20250101_000009_create_rbac_tables::Migration),
        ]
    }
}

/// Column helpers shared by every migration
mod cols {
    use sea_orm_migration::prelude::*;

    pub fn id<T: IntoIden>(name: T) -> ColumnDef {
        ColumnDef::new(name).uuid().not_null().primary_key().to_owned()
    }

    pub fn uuid<T: IntoIden>(name: T) -> ColumnDef {
        ColumnDef::new(name).uuid().not_null().to_owned()
    }

    pub fn uuid_null<T: IntoIden>(name: T) -> ColumnDef {
        ColumnDef::new(name).uuid().null().to_owned()
    }

    pub fn money<T: IntoIden>(name: T) -> ColumnDef {
        ColumnDef::new(name)
            .decimal_len(15, 2)
            .not_null()
            .default(0)
            .to_owned()
    }

    pub fn enum_str<T: IntoIden>(name: T) -> ColumnDef {
        ColumnDef::new(name).string_len(20).not_null().to_owned()
    }

    pub fn timestamp<T: IntoIden>(name: T) -> ColumnDef {
        ColumnDef::new(name)
            .timestamp_with_time_zone()
            .not_null()
            .to_owned()
    }

    pub fn timestamp_null<T: IntoIden>(name: T) -> ColumnDef {
        ColumnDef::new(name).timestamp_with_time_zone().null().to_owned()
    }
}

mod m20250101_000001_create_crm_tables {
    use super::cols;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000001_create_crm_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(cols::id(Customers::Id))
                        .col(ColumnDef::new(Customers::FullName).string().not_null())
                        .col(ColumnDef::new(Customers::Email).string().null())
                        .col(ColumnDef::new(Customers::Phone).string_len(50).null())
                        .col(ColumnDef::new(Customers::Address).string().null())
                        .col(ColumnDef::new(Customers::Nationality).string_len(100).null())
                        .col(ColumnDef::new(Customers::DateOfBirth).date().null())
                        .col(cols::enum_str(Customers::CustomerType))
                        .col(ColumnDef::new(Customers::Source).string_len(100).null())
                        .col(
                            ColumnDef::new(Customers::IsVip)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Customers::IsBlacklisted)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Customers::Notes).text().null())
                        .col(cols::timestamp(Customers::CreatedAt))
                        .col(cols::timestamp(Customers::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_customers_email")
                        .table(Customers::Table)
                        .col(Customers::Email)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Suppliers::Table)
                        .if_not_exists()
                        .col(cols::id(Suppliers::Id))
                        .col(ColumnDef::new(Suppliers::Name).string().not_null())
                        .col(cols::enum_str(Suppliers::SupplierType))
                        .col(ColumnDef::new(Suppliers::ContactName).string().null())
                        .col(ColumnDef::new(Suppliers::Email).string().null())
                        .col(ColumnDef::new(Suppliers::Phone).string_len(50).null())
                        .col(ColumnDef::new(Suppliers::Address).string().null())
                        .col(
                            ColumnDef::new(Suppliers::Rating)
                                .decimal_len(3, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Suppliers::RatingCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Suppliers::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(cols::timestamp(Suppliers::CreatedAt))
                        .col(cols::timestamp(Suppliers::UpdatedAt))
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Suppliers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Customers {
        Table,
        Id,
        FullName,
        Email,
        Phone,
        Address,
        Nationality,
        DateOfBirth,
        CustomerType,
        Source,
        IsVip,
        IsBlacklisted,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum Suppliers {
        Table,
        Id,
        Name,
        SupplierType,
        ContactName,
        Email,
        Phone,
        Address,
        Rating,
        RatingCount,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000002_create_catalog_tables {
    use super::cols;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000002_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Tours::Table)
                        .if_not_exists()
                        .col(cols::id(Tours::Id))
                        .col(
                            ColumnDef::new(Tours::Code)
                                .string_len(50)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Tours::Name).string().not_null())
                        .col(ColumnDef::new(Tours::Description).text().null())
                        .col(
                            ColumnDef::new(Tours::DurationDays)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(Tours::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(cols::timestamp(Tours::CreatedAt))
                        .col(cols::timestamp(Tours::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(TourVersions::Table)
                        .if_not_exists()
                        .col(cols::id(TourVersions::Id))
                        .col(cols::uuid(TourVersions::TourId))
                        .col(ColumnDef::new(TourVersions::Name).string().not_null())
                        .col(ColumnDef::new(TourVersions::Description).text().null())
                        .col(
                            ColumnDef::new(TourVersions::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(cols::timestamp(TourVersions::CreatedAt))
                        .col(cols::timestamp(TourVersions::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_tour_versions_tour")
                                .from(TourVersions::Table, TourVersions::TourId)
                                .to(Tours::Table, Tours::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(TourPrices::Table)
                        .if_not_exists()
                        .col(cols::id(TourPrices::Id))
                        .col(cols::uuid(TourPrices::TourVersionId))
                        .col(cols::enum_str(TourPrices::TravelerType))
                        .col(cols::money(TourPrices::Price))
                        .col(ColumnDef::new(TourPrices::Currency).string_len(3).not_null())
                        .col(ColumnDef::new(TourPrices::ValidFrom).date().not_null())
                        .col(ColumnDef::new(TourPrices::ValidTo).date().not_null())
                        .col(
                            ColumnDef::new(TourPrices::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(cols::timestamp(TourPrices::CreatedAt))
                        .col(cols::timestamp(TourPrices::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_tour_prices_version")
                                .from(TourPrices::Table, TourPrices::TourVersionId)
                                .to(TourVersions::Table, TourVersions::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_tour_prices_lookup")
                        .table(TourPrices::Table)
                        .col(TourPrices::TourVersionId)
                        .col(TourPrices::TravelerType)
                        .col(TourPrices::ValidFrom)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(TourPrices::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(TourVersions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Tours::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Tours {
        Table,
        Id,
        Code,
        Name,
        Description,
        DurationDays,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum TourVersions {
        Table,
        Id,
        TourId,
        Name,
        Description,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum TourPrices {
        Table,
        Id,
        TourVersionId,
        TravelerType,
        Price,
        Currency,
        ValidFrom,
        ValidTo,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000003_create_departure_tables {
    use super::cols;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000003_create_departure_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(TourDepartures::Table)
                        .if_not_exists()
                        .col(cols::id(TourDepartures::Id))
                        .col(cols::uuid(TourDepartures::TourVersionId))
                        .col(ColumnDef::new(TourDepartures::DepartureDate).date().not_null())
                        .col(ColumnDef::new(TourDepartures::ReturnDate).date().not_null())
                        .col(ColumnDef::new(TourDepartures::Capacity).integer().not_null())
                        .col(cols::enum_str(TourDepartures::Status))
                        .col(ColumnDef::new(TourDepartures::Notes).text().null())
                        .col(cols::timestamp(TourDepartures::CreatedAt))
                        .col(cols::timestamp(TourDepartures::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_tour_departures_date")
                        .table(TourDepartures::Table)
                        .col(TourDepartures::DepartureDate)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(DepartureGuests::Table)
                        .if_not_exists()
                        .col(cols::id(DepartureGuests::Id))
                        .col(cols::uuid(DepartureGuests::DepartureId))
                        .col(cols::uuid_null(DepartureGuests::CustomerId))
                        .col(ColumnDef::new(DepartureGuests::FullName).string().not_null())
                        .col(cols::enum_str(DepartureGuests::TravelerType))
                        .col(ColumnDef::new(DepartureGuests::Phone).string_len(50).null())
                        .col(cols::timestamp(DepartureGuests::CreatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_departure_guests_departure")
                                .from(DepartureGuests::Table, DepartureGuests::DepartureId)
                                .to(TourDepartures::Table, TourDepartures::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(DepartureActivities::Table)
                        .if_not_exists()
                        .col(cols::id(DepartureActivities::Id))
                        .col(cols::uuid(DepartureActivities::DepartureId))
                        .col(
                            ColumnDef::new(DepartureActivities::DayNumber)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DepartureActivities::Title).string().not_null())
                        .col(ColumnDef::new(DepartureActivities::Location).string().null())
                        .col(cols::timestamp(DepartureActivities::StartsAt))
                        .col(cols::timestamp_null(DepartureActivities::EndsAt))
                        .col(
                            ColumnDef::new(DepartureActivities::AutoCheckin)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(cols::timestamp(DepartureActivities::CreatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_departure_activities_departure")
                                .from(DepartureActivities::Table, DepartureActivities::DepartureId)
                                .to(TourDepartures::Table, TourDepartures::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_departure_activities_starts_at")
                        .table(DepartureActivities::Table)
                        .col(DepartureActivities::StartsAt)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(StaffAssignments::Table)
                        .if_not_exists()
                        .col(cols::id(StaffAssignments::Id))
                        .col(cols::uuid(StaffAssignments::DepartureId))
                        .col(cols::uuid(StaffAssignments::StaffUserId))
                        .col(cols::enum_str(StaffAssignments::Role))
                        .col(ColumnDef::new(StaffAssignments::Notes).text().null())
                        .col(cols::timestamp(StaffAssignments::CreatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .unique()
                        .name("uq_staff_assignments_departure_staff_role")
                        .table(StaffAssignments::Table)
                        .col(StaffAssignments::DepartureId)
                        .col(StaffAssignments::StaffUserId)
                        .col(StaffAssignments::Role)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(GuestSpecialRequests::Table)
                        .if_not_exists()
                        .col(cols::id(GuestSpecialRequests::Id))
                        .col(cols::uuid(GuestSpecialRequests::GuestId))
                        .col(cols::uuid(GuestSpecialRequests::DepartureId))
                        .col(cols::enum_str(GuestSpecialRequests::RequestType))
                        .col(
                            ColumnDef::new(GuestSpecialRequests::Description)
                                .text()
                                .not_null(),
                        )
                        .col(cols::enum_str(GuestSpecialRequests::Status))
                        .col(cols::uuid_null(GuestSpecialRequests::HandledBy))
                        .col(cols::timestamp_null(GuestSpecialRequests::HandledAt))
                        .col(ColumnDef::new(GuestSpecialRequests::Notes).text().null())
                        .col(cols::timestamp(GuestSpecialRequests::CreatedAt))
                        .col(cols::timestamp(GuestSpecialRequests::UpdatedAt))
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(GuestSpecialRequests::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(StaffAssignments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(DepartureActivities::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(DepartureGuests::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(TourDepartures::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum TourDepartures {
        Table,
        Id,
        TourVersionId,
        DepartureDate,
        ReturnDate,
        Capacity,
        Status,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum DepartureGuests {
        Table,
        Id,
        DepartureId,
        CustomerId,
        FullName,
        TravelerType,
        Phone,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum DepartureActivities {
        Table,
        Id,
        DepartureId,
        DayNumber,
        Title,
        Location,
        StartsAt,
        EndsAt,
        AutoCheckin,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum StaffAssignments {
        Table,
        Id,
        DepartureId,
        StaffUserId,
        Role,
        Notes,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum GuestSpecialRequests {
        Table,
        Id,
        GuestId,
        DepartureId,
        RequestType,
        Description,
        Status,
        HandledBy,
        HandledAt,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000004_create_quotes_table {
    use super::cols;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000004_create_quotes_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Quotes::Table)
                        .if_not_exists()
                        .col(cols::id(Quotes::Id))
                        .col(
                            ColumnDef::new(Quotes::QuoteNumber)
                                .string_len(32)
                                .not_null()
                                .unique_key(),
                        )
                        .col(cols::uuid(Quotes::CustomerId))
                        .col(cols::uuid(Quotes::TourVersionId))
                        .col(cols::uuid_null(Quotes::DepartureId))
                        .col(ColumnDef::new(Quotes::DepartureDate).date().not_null())
                        .col(
                            ColumnDef::new(Quotes::AdultCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Quotes::ChildCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Quotes::InfantCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Quotes::SeniorCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Quotes::AdditionalServices).json().not_null())
                        .col(ColumnDef::new(Quotes::PriceBreakdown).json().not_null())
                        .col(cols::money(Quotes::Subtotal))
                        .col(cols::money(Quotes::DiscountAmount))
                        .col(cols::money(Quotes::FinalAmount))
                        .col(ColumnDef::new(Quotes::Currency).string_len(3).not_null())
                        .col(ColumnDef::new(Quotes::ValidUntil).date().null())
                        .col(cols::enum_str(Quotes::Status))
                        .col(ColumnDef::new(Quotes::Notes).text().null())
                        .col(cols::uuid_null(Quotes::CreatedBy))
                        .col(cols::timestamp_null(Quotes::SentAt))
                        .col(cols::uuid_null(Quotes::SentBy))
                        .col(cols::timestamp_null(Quotes::AcceptedAt))
                        .col(cols::uuid_null(Quotes::AcceptedBy))
                        .col(cols::timestamp_null(Quotes::RejectedAt))
                        .col(cols::uuid_null(Quotes::RejectedBy))
                        .col(ColumnDef::new(Quotes::RejectionReason).text().null())
                        .col(cols::timestamp_null(Quotes::ExpiredAt))
                        .col(cols::timestamp(Quotes::CreatedAt))
                        .col(cols::timestamp(Quotes::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_quotes_customer_id")
                        .table(Quotes::Table)
                        .col(Quotes::CustomerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_quotes_status")
                        .table(Quotes::Table)
                        .col(Quotes::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Quotes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Quotes {
        Table,
        Id,
        QuoteNumber,
        CustomerId,
        TourVersionId,
        DepartureId,
        DepartureDate,
        AdultCount,
        ChildCount,
        InfantCount,
        SeniorCount,
        AdditionalServices,
        PriceBreakdown,
        Subtotal,
        DiscountAmount,
        FinalAmount,
        Currency,
        ValidUntil,
        Status,
        Notes,
        CreatedBy,
        SentAt,
        SentBy,
        AcceptedAt,
        AcceptedBy,
        RejectedAt,
        RejectedBy,
        RejectionReason,
        ExpiredAt,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000005_create_supplier_operation_tables {
    use super::cols;
    use super::m20250101_000001_create_crm_tables::Suppliers;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000005_create_supplier_operation_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ServiceBookings::Table)
                        .if_not_exists()
                        .col(cols::id(ServiceBookings::Id))
                        .col(cols::uuid(ServiceBookings::DepartureId))
                        .col(cols::uuid(ServiceBookings::SupplierId))
                        .col(
                            ColumnDef::new(ServiceBookings::ServiceType)
                                .string_len(50)
                                .not_null(),
                        )
                        .col(ColumnDef::new(ServiceBookings::Description).text().null())
                        .col(ColumnDef::new(ServiceBookings::ServiceDate).date().not_null())
                        .col(
                            ColumnDef::new(ServiceBookings::Quantity)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(cols::money(ServiceBookings::UnitPrice))
                        .col(cols::money(ServiceBookings::TotalAmount))
                        .col(cols::enum_str(ServiceBookings::Status))
                        .col(
                            ColumnDef::new(ServiceBookings::ConfirmationCode)
                                .string_len(100)
                                .null(),
                        )
                        .col(ColumnDef::new(ServiceBookings::Notes).text().null())
                        .col(cols::timestamp(ServiceBookings::CreatedAt))
                        .col(cols::timestamp(ServiceBookings::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_service_bookings_supplier")
                                .from(ServiceBookings::Table, ServiceBookings::SupplierId)
                                .to(Suppliers::Table, Suppliers::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_service_bookings_departure")
                        .table(ServiceBookings::Table)
                        .col(ServiceBookings::DepartureId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SupplierRatings::Table)
                        .if_not_exists()
                        .col(cols::id(SupplierRatings::Id))
                        .col(cols::uuid(SupplierRatings::SupplierId))
                        .col(cols::uuid(SupplierRatings::GuestId))
                        .col(cols::uuid_null(SupplierRatings::DepartureId))
                        .col(cols::enum_str(SupplierRatings::RatingType))
                        .col(ColumnDef::new(SupplierRatings::Score).integer().not_null())
                        .col(ColumnDef::new(SupplierRatings::Comment).text().null())
                        .col(cols::timestamp(SupplierRatings::CreatedAt))
                        .col(cols::timestamp(SupplierRatings::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_supplier_ratings_supplier")
                                .from(SupplierRatings::Table, SupplierRatings::SupplierId)
                                .to(Suppliers::Table, Suppliers::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .unique()
                        .name("uq_supplier_ratings_guest_supplier_type")
                        .table(SupplierRatings::Table)
                        .col(SupplierRatings::GuestId)
                        .col(SupplierRatings::SupplierId)
                        .col(SupplierRatings::RatingType)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SupplierRatings::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ServiceBookings::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ServiceBookings {
        Table,
        Id,
        DepartureId,
        SupplierId,
        ServiceType,
        Description,
        ServiceDate,
        Quantity,
        UnitPrice,
        TotalAmount,
        Status,
        ConfirmationCode,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum SupplierRatings {
        Table,
        Id,
        SupplierId,
        GuestId,
        DepartureId,
        RatingType,
        Score,
        Comment,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000006_create_financial_tables {
    use super::cols;
    use super::m20250101_000001_create_crm_tables::{Customers, Suppliers};
    use super::m20250101_000003_create_departure_tables::TourDepartures;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000006_create_financial_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Debts::Table)
                        .if_not_exists()
                        .col(cols::id(Debts::Id))
                        .col(cols::enum_str(Debts::DebtType))
                        .col(cols::uuid_null(Debts::CustomerId))
                        .col(cols::uuid_null(Debts::SupplierId))
                        .col(ColumnDef::new(Debts::Reference).string_len(100).null())
                        .col(ColumnDef::new(Debts::Description).text().null())
                        .col(cols::money(Debts::OriginalAmount))
                        .col(cols::money(Debts::PaidAmount))
                        .col(cols::money(Debts::RemainingAmount))
                        .col(ColumnDef::new(Debts::Currency).string_len(3).not_null())
                        .col(ColumnDef::new(Debts::DueDate).date().null())
                        .col(cols::enum_str(Debts::Status))
                        .col(cols::timestamp(Debts::CreatedAt))
                        .col(cols::timestamp(Debts::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_debts_customer")
                                .from(Debts::Table, Debts::CustomerId)
                                .to(Customers::Table, Customers::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_debts_supplier")
                                .from(Debts::Table, Debts::SupplierId)
                                .to(Suppliers::Table, Suppliers::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_debts_status_due_date")
                        .table(Debts::Table)
                        .col(Debts::Status)
                        .col(Debts::DueDate)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(DebtPayments::Table)
                        .if_not_exists()
                        .col(cols::id(DebtPayments::Id))
                        .col(cols::uuid(DebtPayments::DebtId))
                        .col(cols::money(DebtPayments::Amount))
                        .col(
                            ColumnDef::new(DebtPayments::PaymentMethod)
                                .string_len(50)
                                .null(),
                        )
                        .col(ColumnDef::new(DebtPayments::Note).text().null())
                        .col(cols::timestamp(DebtPayments::PaidAt))
                        .col(cols::timestamp(DebtPayments::CreatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_debt_payments_debt")
                                .from(DebtPayments::Table, DebtPayments::DebtId)
                                .to(Debts::Table, Debts::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Transactions::Table)
                        .if_not_exists()
                        .col(cols::id(Transactions::Id))
                        .col(cols::enum_str(Transactions::TransactionType))
                        .col(
                            ColumnDef::new(Transactions::Category)
                                .string_len(100)
                                .not_null(),
                        )
                        .col(cols::money(Transactions::Amount))
                        .col(ColumnDef::new(Transactions::Currency).string_len(3).not_null())
                        .col(
                            ColumnDef::new(Transactions::TransactionDate)
                                .date()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Transactions::Description).text().null())
                        .col(cols::uuid_null(Transactions::DepartureId))
                        .col(cols::uuid_null(Transactions::SupplierId))
                        .col(cols::uuid_null(Transactions::CustomerId))
                        .col(
                            ColumnDef::new(Transactions::PaymentMethod)
                                .string_len(50)
                                .null(),
                        )
                        .col(cols::enum_str(Transactions::Status))
                        .col(cols::uuid_null(Transactions::ApprovedBy))
                        .col(cols::timestamp_null(Transactions::ApprovedAt))
                        .col(cols::uuid_null(Transactions::RejectedBy))
                        .col(cols::timestamp_null(Transactions::RejectedAt))
                        .col(ColumnDef::new(Transactions::RejectionReason).text().null())
                        .col(cols::timestamp(Transactions::CreatedAt))
                        .col(cols::timestamp(Transactions::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_transactions_departure")
                                .from(Transactions::Table, Transactions::DepartureId)
                                .to(TourDepartures::Table, TourDepartures::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_transactions_supplier")
                                .from(Transactions::Table, Transactions::SupplierId)
                                .to(Suppliers::Table, Suppliers::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_transactions_customer")
                                .from(Transactions::Table, Transactions::CustomerId)
                                .to(Customers::Table, Customers::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transactions_date")
                        .table(Transactions::Table)
                        .col(Transactions::TransactionDate)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Transactions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(DebtPayments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Debts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Debts {
        Table,
        Id,
        DebtType,
        CustomerId,
        SupplierId,
        Reference,
        Description,
        OriginalAmount,
        PaidAmount,
        RemainingAmount,
        Currency,
        DueDate,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum DebtPayments {
        Table,
        Id,
        DebtId,
        Amount,
        PaymentMethod,
        Note,
        PaidAt,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Transactions {
        Table,
        Id,
        TransactionType,
        Category,
        Amount,
        Currency,
        TransactionDate,
        Description,
        DepartureId,
        SupplierId,
        CustomerId,
        PaymentMethod,
        Status,
        ApprovedBy,
        ApprovedAt,
        RejectedBy,
        RejectedAt,
        RejectionReason,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000007_create_feedbacks_table {
    use super::cols;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000007_create_feedbacks_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Feedbacks::Table)
                        .if_not_exists()
                        .col(cols::id(Feedbacks::Id))
                        .col(cols::uuid_null(Feedbacks::CustomerId))
                        .col(cols::uuid_null(Feedbacks::DepartureId))
                        .col(cols::enum_str(Feedbacks::FeedbackType))
                        .col(cols::enum_str(Feedbacks::Priority))
                        .col(ColumnDef::new(Feedbacks::Subject).string().not_null())
                        .col(ColumnDef::new(Feedbacks::Content).text().not_null())
                        .col(ColumnDef::new(Feedbacks::Rating).integer().null())
                        .col(cols::enum_str(Feedbacks::Status))
                        .col(cols::uuid_null(Feedbacks::AssignedTo))
                        .col(ColumnDef::new(Feedbacks::Resolution).text().null())
                        .col(cols::uuid_null(Feedbacks::ResolvedBy))
                        .col(cols::timestamp_null(Feedbacks::ResolvedAt))
                        .col(cols::timestamp(Feedbacks::CreatedAt))
                        .col(cols::timestamp(Feedbacks::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_feedbacks_status")
                        .table(Feedbacks::Table)
                        .col(Feedbacks::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Feedbacks::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Feedbacks {
        Table,
        Id,
        CustomerId,
        DepartureId,
        FeedbackType,
        Priority,
        Subject,
        Content,
        Rating,
        Status,
        AssignedTo,
        Resolution,
        ResolvedBy,
        ResolvedAt,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000008_create_activity_checkins_table {
    use super::cols;
    use super::m20250101_000003_create_departure_tables::DepartureActivities;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000008_create_activity_checkins_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ActivityCheckins::Table)
                        .if_not_exists()
                        .col(cols::id(ActivityCheckins::Id))
                        .col(cols::uuid(ActivityCheckins::ActivityId))
                        .col(cols::uuid(ActivityCheckins::DepartureId))
                        .col(cols::uuid(ActivityCheckins::GuestId))
                        .col(cols::enum_str(ActivityCheckins::Status))
                        .col(ColumnDef::new(ActivityCheckins::Method).string_len(10).null())
                        .col(cols::timestamp_null(ActivityCheckins::CheckedInAt))
                        .col(cols::uuid_null(ActivityCheckins::CheckedInBy))
                        .col(ColumnDef::new(ActivityCheckins::Latitude).double().null())
                        .col(ColumnDef::new(ActivityCheckins::Longitude).double().null())
                        .col(ColumnDef::new(ActivityCheckins::ExcuseReason).text().null())
                        .col(ColumnDef::new(ActivityCheckins::Notes).text().null())
                        .col(cols::timestamp(ActivityCheckins::CreatedAt))
                        .col(cols::timestamp(ActivityCheckins::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_activity_checkins_activity")
                                .from(ActivityCheckins::Table, ActivityCheckins::ActivityId)
                                .to(DepartureActivities::Table, DepartureActivities::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .unique()
                        .name("uq_activity_checkins_activity_guest")
                        .table(ActivityCheckins::Table)
                        .col(ActivityCheckins::ActivityId)
                        .col(ActivityCheckins::GuestId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_activity_checkins_departure")
                        .table(ActivityCheckins::Table)
                        .col(ActivityCheckins::DepartureId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ActivityCheckins::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ActivityCheckins {
        Table,
        Id,
        ActivityId,
        DepartureId,
        GuestId,
        Status,
        Method,
        CheckedInAt,
        CheckedInBy,
        Latitude,
        Longitude,
        ExcuseReason,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000009_create_rbac_tables {
    use super::cols;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000009_create_rbac_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Roles::Table)
                        .if_not_exists()
                        .col(cols::id(Roles::Id))
                        .col(ColumnDef::new(Roles::Name).string_len(100).not_null())
                        .col(
                            ColumnDef::new(Roles::Slug)
                                .string_len(100)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Roles::Description).string().null())
                        .col(cols::timestamp(Roles::CreatedAt))
                        .col(cols::timestamp(Roles::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Permissions::Table)
                        .if_not_exists()
                        .col(cols::id(Permissions::Id))
                        .col(ColumnDef::new(Permissions::Name).string_len(100).not_null())
                        .col(
                            ColumnDef::new(Permissions::Slug)
                                .string_len(100)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Permissions::GroupName).string_len(100).null())
                        .col(ColumnDef::new(Permissions::Description).string().null())
                        .col(cols::timestamp(Permissions::CreatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PermissionRole::Table)
                        .if_not_exists()
                        .col(cols::uuid(PermissionRole::RoleId))
                        .col(cols::uuid(PermissionRole::PermissionId))
                        .col(cols::timestamp(PermissionRole::CreatedAt))
                        .primary_key(
                            Index::create()
                                .col(PermissionRole::RoleId)
                                .col(PermissionRole::PermissionId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_permission_role_role")
                                .from(PermissionRole::Table, PermissionRole::RoleId)
                                .to(Roles::Table, Roles::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_permission_role_permission")
                                .from(PermissionRole::Table, PermissionRole::PermissionId)
                                .to(Permissions::Table, Permissions::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PermissionRole::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Permissions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Roles::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Roles {
        Table,
        Id,
        Name,
        Slug,
        Description,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Permissions {
        Table,
        Id,
        Name,
        Slug,
        GroupName,
        Description,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum PermissionRole {
        Table,
        RoleId,
        PermissionId,
        CreatedAt,
    }
}
