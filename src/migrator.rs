use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_customers_table::Migration),
            Box::new(m20240301_000002_create_employees_table::Migration),
            Box::new(m20240301_000003_create_orders_table::Migration),
            Box::new(m20240301_000004_create_measurements_table::Migration),
            Box::new(m20240301_000005_create_order_details_table::Migration),
            Box::new(m20240301_000006_create_order_stages_table::Migration),
            Box::new(m20240301_000007_create_order_stage_assignments_table::Migration),
            Box::new(m20240301_000008_create_drafts_table::Migration),
        ]
    }
}

// Migration implementations
//
// No foreign-key constraints on purpose: the calendar tolerates assignments
// whose stage (or further up the chain) no longer exists, and the conversion
// flow performs its own compensating deletes.

mod m20240301_000001_create_customers_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_customers_table"
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
                        .col(
                            ColumnDef::new(Customers::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Customers::Name).string().not_null())
                        .col(ColumnDef::new(Customers::Company).string().null())
                        .col(ColumnDef::new(Customers::PhoneNumber).string().not_null())
                        .col(ColumnDef::new(Customers::Address).string().null())
                        .col(
                            ColumnDef::new(Customers::PaidTotal)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Customers::ToBePaid)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Customers::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Customers::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            // The intake flow resolves customers by (name, phone_number)
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_customers_phone_number")
                        .table(Customers::Table)
                        .col(Customers::PhoneNumber)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_customers_created_at")
                        .table(Customers::Table)
                        .col(Customers::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Customers {
        Table,
        Id,
        Name,
        Company,
        PhoneNumber,
        Address,
        PaidTotal,
        ToBePaid,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000002_create_employees_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_employees_table"
        }
    }

    const ROSTER: [(&str, &str); 10] = [
        ("John Doe", "Technician"),
        ("Jane Smith", "Technician"),
        ("Mike Johnson", "Supervisor"),
        ("Sara Wilson", "Designer"),
        ("Ahmed Mohamed", "Installer"),
        ("Fatima Ali", "Project Manager"),
        ("Carlos Rodriguez", "Fabricator"),
        ("Maria Garcia", "Quality Control"),
        ("David Chen", "Measurement Specialist"),
        ("Omar Khaled", "Installer"),
    ];

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Employees::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Employees::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Employees::Name).string().not_null())
                        .col(ColumnDef::new(Employees::Role).string().null())
                        .to_owned(),
                )
                .await?;

            // Seed the shop roster so selection lists work out of the box
            for (name, role) in ROSTER {
                let insert = Query::insert()
                    .into_table(Employees::Table)
                    .columns([Employees::Name, Employees::Role])
                    .values_panic([name.into(), role.into()])
                    .to_owned();
                manager.exec_stmt(insert).await?;
            }

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Employees::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Employees {
        Table,
        Id,
        Name,
        Role,
    }
}

mod m20240301_000003_create_orders_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Orders::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Orders::Code).string().not_null())
                        .col(ColumnDef::new(Orders::CustomerId).big_integer().not_null())
                        .col(ColumnDef::new(Orders::CustomerName).string().not_null())
                        .col(ColumnDef::new(Orders::Company).string().null())
                        .col(ColumnDef::new(Orders::Address).string().null())
                        .col(ColumnDef::new(Orders::OrderStatus).string().not_null())
                        .col(
                            ColumnDef::new(Orders::OrderPrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Orders::WorkTypes).json().not_null())
                        .col(ColumnDef::new(Orders::CreatedBy).string().null())
                        .col(ColumnDef::new(Orders::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Orders::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_customer_id")
                        .table(Orders::Table)
                        .col(Orders::CustomerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_order_status")
                        .table(Orders::Table)
                        .col(Orders::OrderStatus)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_created_at")
                        .table(Orders::Table)
                        .col(Orders::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Orders {
        Table,
        Id,
        Code,
        CustomerId,
        CustomerName,
        Company,
        Address,
        OrderStatus,
        OrderPrice,
        WorkTypes,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000004_create_measurements_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_measurements_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Measurements::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Measurements::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Measurements::OrderId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Measurements::MaterialName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Measurements::MaterialType)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Measurements::Unit).string().not_null())
                        .col(ColumnDef::new(Measurements::Quantity).decimal().not_null())
                        .col(ColumnDef::new(Measurements::Cost).decimal().not_null())
                        .col(
                            ColumnDef::new(Measurements::TotalCost)
                                .decimal()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_measurements_order_id")
                        .table(Measurements::Table)
                        .col(Measurements::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Measurements::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Measurements {
        Table,
        Id,
        OrderId,
        MaterialName,
        MaterialType,
        Unit,
        Quantity,
        Cost,
        TotalCost,
    }
}

mod m20240301_000005_create_order_details_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000005_create_order_details_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrderDetails::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderDetails::DetailId)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(OrderDetails::OrderId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderDetails::AssignedTo).string().null())
                        .col(
                            ColumnDef::new(OrderDetails::UpdatedDate)
                                .timestamp()
                                .null(),
                        )
                        .col(ColumnDef::new(OrderDetails::DueDate).date().null())
                        .col(
                            ColumnDef::new(OrderDetails::Price)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(OrderDetails::TotalCost)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(OrderDetails::Notes).text().null())
                        .col(ColumnDef::new(OrderDetails::ImgUrl).string().null())
                        .col(ColumnDef::new(OrderDetails::ProcessStage).string().null())
                        .col(ColumnDef::new(OrderDetails::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_details_order_id")
                        .table(OrderDetails::Table)
                        .col(OrderDetails::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderDetails::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum OrderDetails {
        Table,
        DetailId,
        OrderId,
        AssignedTo,
        UpdatedDate,
        DueDate,
        Price,
        TotalCost,
        Notes,
        ImgUrl,
        ProcessStage,
        UpdatedAt,
    }
}

mod m20240301_000006_create_order_stages_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000006_create_order_stages_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrderStages::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderStages::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(OrderStages::OrderDetailId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderStages::StageName).string().not_null())
                        .col(
                            ColumnDef::new(OrderStages::Status)
                                .string()
                                .not_null()
                                .default("not_started"),
                        )
                        .col(
                            ColumnDef::new(OrderStages::PlannedStartDate)
                                .date()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(OrderStages::PlannedFinishDate)
                                .date()
                                .null(),
                        )
                        .col(ColumnDef::new(OrderStages::ActualStartDate).date().null())
                        .col(
                            ColumnDef::new(OrderStages::ActualFinishDate)
                                .date()
                                .null(),
                        )
                        .col(ColumnDef::new(OrderStages::Notes).text().null())
                        .col(
                            ColumnDef::new(OrderStages::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderStages::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_stages_order_detail_id")
                        .table(OrderStages::Table)
                        .col(OrderStages::OrderDetailId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderStages::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum OrderStages {
        Table,
        Id,
        OrderDetailId,
        StageName,
        Status,
        PlannedStartDate,
        PlannedFinishDate,
        ActualStartDate,
        ActualFinishDate,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000007_create_order_stage_assignments_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000007_create_order_stage_assignments_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Assignments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Assignments::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Assignments::OrderStageId)
                                .big_integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Assignments::EmployeeName)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Assignments::WorkDate).date().not_null())
                        .col(
                            ColumnDef::new(Assignments::IsDone)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Assignments::Note).text().null())
                        .col(ColumnDef::new(Assignments::EmployeeRate).decimal().null())
                        .col(
                            ColumnDef::new(Assignments::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // The calendar always queries by work_date range
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_stage_assignments_work_date")
                        .table(Assignments::Table)
                        .col(Assignments::WorkDate)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_stage_assignments_order_stage_id")
                        .table(Assignments::Table)
                        .col(Assignments::OrderStageId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Assignments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Assignments {
        #[sea_orm(iden = "order_stage_assignments")]
        Table,
        Id,
        OrderStageId,
        EmployeeName,
        WorkDate,
        IsDone,
        Note,
        EmployeeRate,
        CreatedAt,
    }
}

mod m20240301_000008_create_drafts_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000008_create_drafts_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Drafts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Drafts::DraftKey)
                                .string()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Drafts::Payload).json().not_null())
                        .col(ColumnDef::new(Drafts::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Drafts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Drafts {
        Table,
        DraftKey,
        Payload,
        UpdatedAt,
    }
}
