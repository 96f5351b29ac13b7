use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(
            r#"CREATE TABLE IF NOT EXISTS users (
                _id SERIAL PRIMARY KEY,
                full_name VARCHAR(255) NOT NULL DEFAULT '',
                email VARCHAR(255) NOT NULL DEFAULT ''
            )"#,
        )
        .await?;

        db.execute_unprepared(
            r#"CREATE TABLE IF NOT EXISTS tokens (
                _id SERIAL PRIMARY KEY,
                token VARCHAR(255) NOT NULL UNIQUE,
                "user" INTEGER NOT NULL REFERENCES users(_id) ON DELETE CASCADE,
                expire_time TIMESTAMP NOT NULL
            )"#,
        )
        .await?;

        db.execute_unprepared(
            r#"CREATE TABLE IF NOT EXISTS nodes (
                _id SERIAL PRIMARY KEY,
                node_type VARCHAR(50) NOT NULL,
                parent INTEGER REFERENCES nodes(_id) ON DELETE SET NULL,
                "user" INTEGER NOT NULL REFERENCES users(_id) ON DELETE CASCADE
            )"#,
        )
        .await?;

        db.execute_unprepared(
            r#"CREATE TABLE IF NOT EXISTS activities (
                _id SERIAL PRIMARY KEY,
                object INTEGER NOT NULL,
                object_type VARCHAR(50) NOT NULL,
                context_object INTEGER NOT NULL,
                verb VARCHAR(50) NOT NULL,
                actor_user INTEGER NOT NULL,
                _created TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )"#,
        )
        .await?;

        db.execute_unprepared(
            r#"CREATE TABLE IF NOT EXISTS notifications (
                _id SERIAL PRIMARY KEY,
                _created TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                activity INTEGER NOT NULL REFERENCES activities(_id) ON DELETE CASCADE,
                "user" INTEGER NOT NULL REFERENCES users(_id) ON DELETE CASCADE,
                is_read BOOLEAN NOT NULL DEFAULT FALSE
            )"#,
        )
        .await?;

        db.execute_unprepared(
            r#"CREATE TABLE IF NOT EXISTS "activities-subscriptions" (
                _id SERIAL PRIMARY KEY,
                "user" INTEGER NOT NULL REFERENCES users(_id) ON DELETE CASCADE,
                context_object_type VARCHAR(50) NOT NULL,
                context_object INTEGER NOT NULL,
                notifications JSONB NOT NULL DEFAULT '{}'::jsonb
            )"#,
        )
        .await?;

        // Tailer poll: user + ascending creation time.
        db.execute_unprepared(
            r#"CREATE INDEX IF NOT EXISTS idx_notifications_user_created
                ON notifications ("user", _created)"#,
        )
        .await?;

        db.execute_unprepared(
            r#"CREATE INDEX IF NOT EXISTS idx_tokens_token_expire
                ON tokens (token, expire_time)"#,
        )
        .await?;

        db.execute_unprepared(
            r#"CREATE INDEX IF NOT EXISTS idx_activities_subscriptions_lookup
                ON "activities-subscriptions" ("user", context_object_type, context_object)"#,
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        for table in [
            r#""activities-subscriptions""#,
            "notifications",
            "activities",
            "nodes",
            "tokens",
            "users",
        ] {
            db.execute_unprepared(&format!("DROP TABLE IF EXISTS {}", table))
                .await?;
        }
        Ok(())
    }
}
