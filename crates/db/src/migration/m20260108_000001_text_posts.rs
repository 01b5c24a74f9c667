//! Text posts migration.
//!
//! Creates the text_posts table read and written by the post board.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(TEXT_POSTS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS text_posts CASCADE;")
            .await?;
        Ok(())
    }
}

const TEXT_POSTS_SQL: &str = r"
CREATE TABLE text_posts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    title TEXT NOT NULL,
    content TEXT NOT NULL DEFAULT '',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ,
    CONSTRAINT chk_title_not_blank CHECK (length(btrim(title)) > 0)
);

-- Listing is always newest first
CREATE INDEX idx_text_posts_created ON text_posts(created_at DESC);
";
