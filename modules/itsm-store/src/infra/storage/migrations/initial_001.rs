use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Slas::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Slas::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Slas::Name).string().not_null())
                    .col(ColumnDef::new(Slas::Category).string().not_null())
                    .col(ColumnDef::new(Slas::Priority).string().not_null())
                    .col(ColumnDef::new(Slas::ResponseMinutes).integer().not_null())
                    .col(ColumnDef::new(Slas::ResolutionMinutes).integer().not_null())
                    .col(ColumnDef::new(Slas::Active).boolean().not_null())
                    .col(timestamp(Slas::CreatedAt))
                    .col(timestamp(Slas::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tickets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tickets::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Tickets::Code).string().not_null())
                    .col(ColumnDef::new(Tickets::Category).string().not_null())
                    .col(ColumnDef::new(Tickets::Title).string().not_null())
                    .col(ColumnDef::new(Tickets::Description).text().not_null())
                    .col(ColumnDef::new(Tickets::Status).string().not_null())
                    .col(ColumnDef::new(Tickets::Priority).string().not_null())
                    .col(ColumnDef::new(Tickets::DepartmentId).big_integer().not_null())
                    .col(ColumnDef::new(Tickets::FilialeId).big_integer())
                    .col(ColumnDef::new(Tickets::RequesterId).uuid().not_null())
                    .col(ColumnDef::new(Tickets::AssigneeId).uuid())
                    .col(ColumnDef::new(Tickets::SlaId).uuid())
                    .col(nullable_timestamp(Tickets::ResponseDueAt))
                    .col(nullable_timestamp(Tickets::ResolutionDueAt))
                    .col(nullable_timestamp(Tickets::ResolvedAt))
                    .col(nullable_timestamp(Tickets::ClosedAt))
                    .col(timestamp(Tickets::CreatedAt))
                    .col(timestamp(Tickets::UpdatedAt))
                    .col(nullable_timestamp(Tickets::DeletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_sla")
                            .from(Tickets::Table, Tickets::SlaId)
                            .to(Slas::Table, Slas::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TicketWatchers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TicketWatchers::TicketId).uuid().not_null())
                    .col(ColumnDef::new(TicketWatchers::UserId).uuid().not_null())
                    .col(timestamp(TicketWatchers::CreatedAt))
                    .primary_key(
                        Index::create()
                            .col(TicketWatchers::TicketId)
                            .col(TicketWatchers::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_watchers_ticket")
                            .from(TicketWatchers::Table, TicketWatchers::TicketId)
                            .to(Tickets::Table, Tickets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Assets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Assets::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Assets::Code).string().not_null())
                    .col(ColumnDef::new(Assets::Name).string().not_null())
                    .col(ColumnDef::new(Assets::AssetType).string().not_null())
                    .col(ColumnDef::new(Assets::Status).string().not_null())
                    .col(ColumnDef::new(Assets::SerialNumber).string())
                    .col(ColumnDef::new(Assets::DepartmentId).big_integer())
                    .col(ColumnDef::new(Assets::FilialeId).big_integer().not_null())
                    .col(ColumnDef::new(Assets::OwnerId).uuid())
                    .col(ColumnDef::new(Assets::PurchasedAt).date())
                    .col(timestamp(Assets::CreatedAt))
                    .col(timestamp(Assets::UpdatedAt))
                    .col(nullable_timestamp(Assets::DeletedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TimeEntries::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TimeEntries::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(TimeEntries::TicketId).uuid().not_null())
                    .col(ColumnDef::new(TimeEntries::UserId).uuid().not_null())
                    .col(ColumnDef::new(TimeEntries::Minutes).integer().not_null())
                    .col(ColumnDef::new(TimeEntries::WorkDate).date().not_null())
                    .col(ColumnDef::new(TimeEntries::Description).text())
                    .col(timestamp(TimeEntries::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_time_entries_ticket")
                            .from(TimeEntries::Table, TimeEntries::TicketId)
                            .to(Tickets::Table, Tickets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Projects::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Projects::Code).string().not_null())
                    .col(ColumnDef::new(Projects::Name).string().not_null())
                    .col(ColumnDef::new(Projects::Description).text())
                    .col(ColumnDef::new(Projects::Status).string().not_null())
                    .col(ColumnDef::new(Projects::DepartmentId).big_integer().not_null())
                    .col(ColumnDef::new(Projects::ManagerId).uuid().not_null())
                    .col(ColumnDef::new(Projects::StartsOn).date())
                    .col(ColumnDef::new(Projects::EndsOn).date())
                    .col(timestamp(Projects::CreatedAt))
                    .col(timestamp(Projects::UpdatedAt))
                    .col(nullable_timestamp(Projects::DeletedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProjectTasks::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ProjectTasks::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(ProjectTasks::Code).string().not_null())
                    .col(ColumnDef::new(ProjectTasks::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(ProjectTasks::Title).string().not_null())
                    .col(ColumnDef::new(ProjectTasks::Status).string().not_null())
                    .col(ColumnDef::new(ProjectTasks::AssigneeId).uuid())
                    .col(ColumnDef::new(ProjectTasks::DueOn).date())
                    .col(timestamp(ProjectTasks::CreatedAt))
                    .col(timestamp(ProjectTasks::UpdatedAt))
                    .col(nullable_timestamp(ProjectTasks::DeletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_tasks_project")
                            .from(ProjectTasks::Table, ProjectTasks::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AuditEntries::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AuditEntries::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AuditEntries::EntityType).string().not_null())
                    .col(ColumnDef::new(AuditEntries::EntityId).uuid().not_null())
                    .col(ColumnDef::new(AuditEntries::Action).string().not_null())
                    .col(ColumnDef::new(AuditEntries::ActorId).uuid())
                    .col(ColumnDef::new(AuditEntries::DepartmentId).big_integer())
                    .col(ColumnDef::new(AuditEntries::FilialeId).big_integer())
                    .col(ColumnDef::new(AuditEntries::Details).json().not_null())
                    .col(timestamp(AuditEntries::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Codes are unique per table, soft-deleted rows included.
        for (name, table, col) in [
            ("ux_tickets_code", Tickets::Table.into_iden(), Tickets::Code.into_iden()),
            ("ux_assets_code", Assets::Table.into_iden(), Assets::Code.into_iden()),
            ("ux_projects_code", Projects::Table.into_iden(), Projects::Code.into_iden()),
            (
                "ux_project_tasks_code",
                ProjectTasks::Table.into_iden(),
                ProjectTasks::Code.into_iden(),
            ),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(table)
                        .col(col)
                        .unique()
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        for (name, table, col) in [
            ("idx_tickets_department", Tickets::Table.into_iden(), Tickets::DepartmentId.into_iden()),
            ("idx_tickets_created", Tickets::Table.into_iden(), Tickets::CreatedAt.into_iden()),
            ("idx_assets_filiale", Assets::Table.into_iden(), Assets::FilialeId.into_iden()),
            ("idx_time_entries_ticket", TimeEntries::Table.into_iden(), TimeEntries::TicketId.into_iden()),
            ("idx_project_tasks_project", ProjectTasks::Table.into_iden(), ProjectTasks::ProjectId.into_iden()),
            ("idx_audit_entries_entity", AuditEntries::Table.into_iden(), AuditEntries::EntityId.into_iden()),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(table)
                        .col(col)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            AuditEntries::Table.into_iden(),
            ProjectTasks::Table.into_iden(),
            Projects::Table.into_iden(),
            TimeEntries::Table.into_iden(),
            Assets::Table.into_iden(),
            TicketWatchers::Table.into_iden(),
            Tickets::Table.into_iden(),
            Slas::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

fn timestamp<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

fn nullable_timestamp<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).timestamp_with_time_zone().to_owned()
}

#[derive(DeriveIden)]
enum Slas {
    Table,
    Id,
    Name,
    Category,
    Priority,
    ResponseMinutes,
    ResolutionMinutes,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tickets {
    Table,
    Id,
    Code,
    Category,
    Title,
    Description,
    Status,
    Priority,
    DepartmentId,
    FilialeId,
    RequesterId,
    AssigneeId,
    SlaId,
    ResponseDueAt,
    ResolutionDueAt,
    ResolvedAt,
    ClosedAt,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum TicketWatchers {
    Table,
    TicketId,
    UserId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Assets {
    Table,
    Id,
    Code,
    Name,
    AssetType,
    Status,
    SerialNumber,
    DepartmentId,
    FilialeId,
    OwnerId,
    PurchasedAt,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum TimeEntries {
    Table,
    Id,
    TicketId,
    UserId,
    Minutes,
    WorkDate,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
    Code,
    Name,
    Description,
    Status,
    DepartmentId,
    ManagerId,
    StartsOn,
    EndsOn,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum ProjectTasks {
    Table,
    Id,
    Code,
    ProjectId,
    Title,
    Status,
    AssigneeId,
    DueOn,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum AuditEntries {
    Table,
    Id,
    EntityType,
    EntityId,
    Action,
    ActorId,
    DepartmentId,
    FilialeId,
    Details,
    CreatedAt,
}
