use sqlx::Row;

fn database_url() -> Option<String> {
    dotenvy::dotenv().ok();

    std::env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty())
}

async fn connect() -> anyhow::Result<Option<sqlx::PgPool>> {
    let Some(database_url) = database_url() else {
        eprintln!("DATABASE_URL is not set; skipping Postgres smoke test");
        return Ok(None);
    };

    let pool =
        sqlx::postgres::PgPoolOptions::new().max_connections(1).connect(&database_url).await?;

    let migrations_dir =
        std::env::var("RESULTS_MIGRATIONS_DIR").unwrap_or_else(|_| "migrations".to_string());
    let migrator = sqlx::migrate::Migrator::new(std::path::Path::new(&migrations_dir)).await?;
    migrator.run(&pool).await?;

    Ok(Some(pool))
}

async fn insert_attempt(pool: &sqlx::PgPool, user_id: i64, quiz_id: i64) -> anyhow::Result<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO quiz_results (
            user_id, quiz_id, total_questions, correct_answers, wrong_answers, score,
            time_taken, status, start_time, end_time, created_at
         ) VALUES ($1, $2, 2, 1, 1, 50.0, 30, 'failed',
                   NOW() - INTERVAL '30 seconds', NOW(), NOW())
         RETURNING id",
    )
    .bind(user_id)
    .bind(quiz_id)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

#[tokio::test]
async fn migrations_apply_and_tables_exist() -> anyhow::Result<()> {
    let Some(pool) = connect().await? else {
        return Ok(());
    };

    for table in ["quiz_results", "question_results"] {
        let row = sqlx::query("SELECT to_regclass($1)::text").bind(table).fetch_one(&pool).await?;
        let regclass: Option<String> = row.try_get(0)?;
        assert!(regclass.is_some(), "expected table {table} to exist after migrations");
    }

    Ok(())
}

#[tokio::test]
async fn outcomes_cascade_with_their_attempt() -> anyhow::Result<()> {
    let Some(pool) = connect().await? else {
        return Ok(());
    };

    let result_id = insert_attempt(&pool, 900_001, 900_001).await?;
    sqlx::query(
        "INSERT INTO question_results (
            quiz_result_id, position, question_id, user_answer, correct_answer, is_correct,
            points_earned, max_points, time_taken
         ) VALUES ($1, 0, 1, 'a', 'a', TRUE, 2, 2, 10),
                  ($1, 1, 2, 'b', 'c', FALSE, 0, 1, 20)",
    )
    .bind(result_id)
    .execute(&pool)
    .await?;

    sqlx::query("DELETE FROM quiz_results WHERE id = $1").bind(result_id).execute(&pool).await?;

    let remaining = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM question_results WHERE quiz_result_id = $1",
    )
    .bind(result_id)
    .fetch_one(&pool)
    .await?;
    assert_eq!(remaining, 0);

    Ok(())
}

#[tokio::test]
async fn partial_credit_is_rejected() -> anyhow::Result<()> {
    let Some(pool) = connect().await? else {
        return Ok(());
    };

    let result_id = insert_attempt(&pool, 900_002, 900_002).await?;
    let inserted = sqlx::query(
        "INSERT INTO question_results (
            quiz_result_id, position, question_id, user_answer, correct_answer, is_correct,
            points_earned, max_points, time_taken
         ) VALUES ($1, 0, 1, 'a', 'a', TRUE, 1, 3, 0)",
    )
    .bind(result_id)
    .execute(&pool)
    .await;
    assert!(inserted.is_err(), "points_earned must be 0 or max_points");

    sqlx::query("DELETE FROM quiz_results WHERE id = $1").bind(result_id).execute(&pool).await?;

    Ok(())
}
