use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_reference_tables::Migration),
            Box::new(m20240101_000002_create_item_tables::Migration),
            Box::new(m20240101_000003_create_sales_rfq_tables::Migration),
            Box::new(m20240101_000004_create_quote_tables::Migration),
            Box::new(m20240101_000005_create_quote_method_tables::Migration),
            Box::new(m20240101_000006_create_sales_order_tables::Migration),
        ]
    }
}

/// Creates the table for `entity` unless it already exists.
async fn create_entity_table<E>(manager: &SchemaManager<'_>, entity: E) -> Result<(), DbErr>
where
    E: sea_orm::EntityTrait,
{
    let schema = sea_orm::Schema::new(manager.get_database_backend());
    manager
        .create_table(schema.create_table_from_entity(entity).if_not_exists().to_owned())
        .await
}

async fn drop_entity_table<E>(manager: &SchemaManager<'_>, entity: E) -> Result<(), DbErr>
where
    E: sea_orm::EntityTrait + Iden + 'static,
{
    manager
        .drop_table(Table::drop().table(entity).if_exists().to_owned())
        .await
}

mod m20240101_000001_create_reference_tables {
    use super::*;
    use crate::entities::{
        company, currency, customer, customer_payment, customer_shipping, opportunity, sequence,
    };

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_reference_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            create_entity_table(manager, sequence::Entity).await?;
            create_entity_table(manager, company::Entity).await?;
            create_entity_table(manager, customer::Entity).await?;
            create_entity_table(manager, customer_payment::Entity).await?;
            create_entity_table(manager, customer_shipping::Entity).await?;
            create_entity_table(manager, currency::Entity).await?;
            create_entity_table(manager, opportunity::Entity).await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            drop_entity_table(manager, opportunity::Entity).await?;
            drop_entity_table(manager, currency::Entity).await?;
            drop_entity_table(manager, customer_shipping::Entity).await?;
            drop_entity_table(manager, customer_payment::Entity).await?;
            drop_entity_table(manager, customer::Entity).await?;
            drop_entity_table(manager, company::Entity).await?;
            drop_entity_table(manager, sequence::Entity).await
        }
    }
}

mod m20240101_000002_create_item_tables {
    use super::*;
    use crate::entities::{customer_part_to_item, item, part};

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_item_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            create_entity_table(manager, item::Entity).await?;

            // Readable ids are unique per company
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_item_company_readable_id")
                        .table(item::Entity)
                        .col(item::Column::CompanyId)
                        .col(item::Column::ReadableId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            create_entity_table(manager, part::Entity).await?;
            create_entity_table(manager, customer_part_to_item::Entity).await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            drop_entity_table(manager, customer_part_to_item::Entity).await?;
            drop_entity_table(manager, part::Entity).await?;
            drop_entity_table(manager, item::Entity).await
        }
    }
}

mod m20240101_000003_create_sales_rfq_tables {
    use super::*;
    use crate::entities::{sales_rfq, sales_rfq_line};

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_sales_rfq_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            create_entity_table(manager, sales_rfq::Entity).await?;
            create_entity_table(manager, sales_rfq_line::Entity).await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_sales_rfq_line_sales_rfq_id")
                        .table(sales_rfq_line::Entity)
                        .col(sales_rfq_line::Column::SalesRfqId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            drop_entity_table(manager, sales_rfq_line::Entity).await?;
            drop_entity_table(manager, sales_rfq::Entity).await
        }
    }
}

mod m20240101_000004_create_quote_tables {
    use super::*;
    use crate::entities::{quote, quote_line, quote_line_price, quote_payment, quote_shipment};

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_quote_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            create_entity_table(manager, quote::Entity).await?;
            create_entity_table(manager, quote_payment::Entity).await?;
            create_entity_table(manager, quote_shipment::Entity).await?;
            create_entity_table(manager, quote_line::Entity).await?;
            create_entity_table(manager, quote_line_price::Entity).await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_quote_line_quote_id")
                        .table(quote_line::Entity)
                        .col(quote_line::Column::QuoteId)
                        .to_owned(),
                )
                .await?;

            // One price row per tier; the target of the price upsert
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_quote_line_price_line_quantity")
                        .table(quote_line_price::Entity)
                        .col(quote_line_price::Column::QuoteLineId)
                        .col(quote_line_price::Column::Quantity)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            drop_entity_table(manager, quote_line_price::Entity).await?;
            drop_entity_table(manager, quote_line::Entity).await?;
            drop_entity_table(manager, quote_shipment::Entity).await?;
            drop_entity_table(manager, quote_payment::Entity).await?;
            drop_entity_table(manager, quote::Entity).await
        }
    }
}

mod m20240101_000005_create_quote_method_tables {
    use super::*;
    use crate::entities::{quote_make_method, quote_material, quote_operation};

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_quote_method_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            create_entity_table(manager, quote_make_method::Entity).await?;
            create_entity_table(manager, quote_material::Entity).await?;
            create_entity_table(manager, quote_operation::Entity).await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_quote_make_method_quote_line_id")
                        .table(quote_make_method::Entity)
                        .col(quote_make_method::Column::QuoteLineId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            drop_entity_table(manager, quote_operation::Entity).await?;
            drop_entity_table(manager, quote_material::Entity).await?;
            drop_entity_table(manager, quote_make_method::Entity).await
        }
    }
}

mod m20240101_000006_create_sales_order_tables {
    use super::*;
    use crate::entities::{
        sales_order, sales_order_line, sales_order_payment, sales_order_shipment,
    };

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_sales_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            create_entity_table(manager, sales_order::Entity).await?;
            create_entity_table(manager, sales_order_payment::Entity).await?;
            create_entity_table(manager, sales_order_shipment::Entity).await?;
            create_entity_table(manager, sales_order_line::Entity).await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            drop_entity_table(manager, sales_order_line::Entity).await?;
            drop_entity_table(manager, sales_order_shipment::Entity).await?;
            drop_entity_table(manager, sales_order_payment::Entity).await?;
            drop_entity_table(manager, sales_order::Entity).await
        }
    }
}
