use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_event_listings_table::Migration),
            Box::new(m20240101_000002_create_tickets_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_event_listings_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_event_listings_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Catalog table aligned with entities::event_listing Model
            manager
                .create_table(
                    Table::create()
                        .table(EventListings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(EventListings::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(EventListings::Title).string().not_null())
                        .col(ColumnDef::new(EventListings::Date).string().null())
                        .col(ColumnDef::new(EventListings::Time).string().null())
                        .col(ColumnDef::new(EventListings::Venue).string().null())
                        .col(ColumnDef::new(EventListings::State).string().null())
                        .col(ColumnDef::new(EventListings::Price).string().null())
                        .col(ColumnDef::new(EventListings::EventType).string().null())
                        .col(ColumnDef::new(EventListings::Status).string().null())
                        .col(ColumnDef::new(EventListings::Img).string().null())
                        .col(
                            ColumnDef::new(EventListings::Featured)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(EventListings::Available)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(EventListings::Description).string().null())
                        .col(
                            ColumnDef::new(EventListings::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // Purchases and stats look listings up by title
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_event_listings_title")
                        .table(EventListings::Table)
                        .col(EventListings::Title)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_event_listings_state")
                        .table(EventListings::Table)
                        .col(EventListings::State)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(EventListings::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum EventListings {
        Table,
        Id,
        Title,
        Date,
        Time,
        Venue,
        State,
        Price,
        EventType,
        Status,
        Img,
        Featured,
        Available,
        Description,
        CreatedAt,
    }
}

mod m20240101_000002_create_tickets_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_tickets_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Tickets table aligned with entities::ticket Model
            manager
                .create_table(
                    Table::create()
                        .table(Tickets::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Tickets::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Tickets::VerificationCode)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Tickets::EventTitle).string().not_null())
                        .col(ColumnDef::new(Tickets::EventDate).string().not_null())
                        .col(ColumnDef::new(Tickets::EventTime).string().not_null())
                        .col(ColumnDef::new(Tickets::EventVenue).string().not_null())
                        .col(ColumnDef::new(Tickets::EventLocation).string().not_null())
                        .col(ColumnDef::new(Tickets::TicketType).string().not_null())
                        .col(
                            ColumnDef::new(Tickets::TicketQuantity)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(ColumnDef::new(Tickets::AmountPaid).string().not_null())
                        .col(ColumnDef::new(Tickets::AmountRaw).string().null())
                        .col(ColumnDef::new(Tickets::PaymentRef).string().not_null())
                        .col(ColumnDef::new(Tickets::PaymentStatus).string().not_null())
                        .col(ColumnDef::new(Tickets::PaymentDate).timestamp().not_null())
                        .col(ColumnDef::new(Tickets::CustomerEmail).string().not_null())
                        .col(ColumnDef::new(Tickets::CustomerName).string().not_null())
                        .col(ColumnDef::new(Tickets::UserId).string().not_null())
                        .col(ColumnDef::new(Tickets::Status).string().not_null())
                        .col(
                            ColumnDef::new(Tickets::VerificationStatus)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Tickets::PurchasedAt).timestamp().not_null())
                        .col(ColumnDef::new(Tickets::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            // My-tickets queries filter by owner, newest purchase first
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_tickets_user_id")
                        .table(Tickets::Table)
                        .col(Tickets::UserId)
                        .to_owned(),
                )
                .await?;

            // Check-in lookups by owner + code
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_tickets_verification_code")
                        .table(Tickets::Table)
                        .col(Tickets::VerificationCode)
                        .to_owned(),
                )
                .await?;

            // Organizer stats match tickets to listings by title
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_tickets_event_title")
                        .table(Tickets::Table)
                        .col(Tickets::EventTitle)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Tickets::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Tickets {
        Table,
        Id,
        VerificationCode,
        EventTitle,
        EventDate,
        EventTime,
        EventVenue,
        EventLocation,
        TicketType,
        TicketQuantity,
        AmountPaid,
        AmountRaw,
        PaymentRef,
        PaymentStatus,
        PaymentDate,
        CustomerEmail,
        CustomerName,
        UserId,
        Status,
        VerificationStatus,
        PurchasedAt,
        CreatedAt,
    }
}
